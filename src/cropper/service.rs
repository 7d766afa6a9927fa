//! # 服务层（可注入状态）
//!
//! ## 设计思路
//!
//! 使用 `WallpaperCropService` 作为壁纸选择器持有的裁剪服务，替代全局单例函数。
//! 好处：
//! 1. 生命周期清晰（由上层统一创建与销毁）
//! 2. 测试可创建独立实例，减少共享状态副作用
//! 3. 所有资产共享一份配置与解码并发额度
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<CropperConfig>>` 支持运行时动态切档。
//! - 并发额度通过共享 `DecodeSlots` 控制，设置变更时按差值增减许可，占用中的许可归还时回收。
//! - 对外暴露少量稳定 API：`open_asset` / `crop` / `crop_and_save` 与档位、设置读写。

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use chrono::Local;
use image::ImageFormat;
use tokio::runtime::Handle;

use super::slots::DecodeSlots;
use super::{
    AssetSource, Bitmap, CropError, CropQualityProfile, CropRect, CropperConfig, CropperSettings,
    DefaultBitmapCropper, ImageAsset,
};
use crate::error::AppError;
use crate::storage;

/// 壁纸裁剪服务。
pub struct WallpaperCropService {
    config: Arc<RwLock<CropperConfig>>,
    decode_slots: Arc<DecodeSlots>,
    cropper: DefaultBitmapCropper,
}

impl WallpaperCropService {
    /// 使用默认配置创建服务。
    pub fn new() -> Self {
        Self::with_config(CropperConfig::default())
    }

    /// 使用自定义配置创建服务，主要用于测试或按场景注入不同策略。
    ///
    /// # 示例
    /// ```rust
    /// use wallpaper_cropper::cropper::{CropperConfig, WallpaperCropService};
    ///
    /// let config = CropperConfig {
    ///     clamp_region_to_bounds: false,
    ///     ..CropperConfig::default()
    /// };
    /// let service = WallpaperCropService::with_config(config);
    /// assert_eq!(service.get_quality_profile().unwrap(), "balanced");
    /// ```
    pub fn with_config(config: CropperConfig) -> Self {
        let decode_slots = DecodeSlots::new(config.max_concurrent_decodes);
        Self {
            config: Arc::new(RwLock::new(config)),
            decode_slots,
            cropper: DefaultBitmapCropper::new(),
        }
    }

    /// 获取配置快照，保证单次请求链路使用一致参数。
    pub fn config_snapshot(&self) -> Result<CropperConfig, CropError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| CropError::Runtime("配置读取锁已中毒".to_string()))
    }

    /// 在当前 tokio 运行时上打开一个共享本服务配置的资产。
    pub fn open_asset(&self, source: AssetSource) -> Result<ImageAsset, CropError> {
        let runtime = Handle::try_current()
            .map_err(|e| CropError::Runtime(format!("当前线程没有 tokio 运行时：{}", e)))?;

        Ok(ImageAsset::with_shared(
            source,
            Arc::clone(&self.config),
            Arc::clone(&self.decode_slots),
            runtime,
        ))
    }

    /// 从来源加载并裁剪出最终位图。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use wallpaper_cropper::cropper::{AssetSource, CropRect, WallpaperCropService};
    ///
    /// # async fn demo() -> Result<(), wallpaper_cropper::error::AppError> {
    /// let service = WallpaperCropService::new();
    /// let bitmap = service
    ///     .crop(
    ///         AssetSource::FilePath("/tmp/wallpaper.jpg".into()),
    ///         0.5,
    ///         CropRect::new(0, 0, 540, 960),
    ///         false,
    ///     )
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn crop(
        &self,
        source: AssetSource,
        scale: f32,
        crop_rect: CropRect,
        is_rtl: bool,
    ) -> Result<Bitmap, AppError> {
        let start = Instant::now();
        let asset = self.open_asset(source)?;

        let bitmap = self
            .cropper
            .crop_and_scale(&asset, scale, crop_rect, is_rtl)
            .await?;

        log::info!(
            "✅ 壁纸裁剪完成 - 来源: {} 输出: {}x{} 耗时: {}ms",
            asset.source().hint(),
            bitmap.width(),
            bitmap.height(),
            start.elapsed().as_millis()
        );

        Ok(bitmap)
    }

    /// 裁剪并把结果保存为 PNG，返回文件路径。
    ///
    /// 文件写入 `base_dir/wallpapers/`（或 `custom_dir`），
    /// 文件名形如 `wallpaper_<时间戳>.png`，目录不存在时自动创建。
    pub async fn crop_and_save(
        &self,
        source: AssetSource,
        scale: f32,
        crop_rect: CropRect,
        is_rtl: bool,
        base_dir: &Path,
        custom_dir: Option<String>,
    ) -> Result<PathBuf, AppError> {
        let bitmap = self.crop(source, scale, crop_rect, is_rtl).await?;
        let dir = storage::get_wallpapers_dir(base_dir, custom_dir)?;

        let timestamp = Local::now().format("%Y%m%d%H%M%S%f");
        let file_path = dir.join(format!("wallpaper_{}.png", timestamp));

        let target = file_path.clone();
        tokio::task::spawn_blocking(move || bitmap.save_with_format(&target, ImageFormat::Png))
            .await
            .map_err(|e| AppError::Storage(format!("保存任务异常退出: {}", e)))?
            .map_err(|e| AppError::Storage(format!("保存壁纸失败: {}", e)))?;

        log::info!("💾 壁纸已保存 - 路径: {}", file_path.display());
        Ok(file_path)
    }

    /// 设置画质档位。
    pub fn set_quality_profile(&self, profile: &str) -> Result<(), CropError> {
        let profile = CropQualityProfile::from_str(profile)?;
        let mut config = self
            .config
            .write()
            .map_err(|_| CropError::Runtime("配置写入锁已中毒".to_string()))?;
        config.apply_quality_profile(profile);

        log::info!(
            "⚙️ 已切换裁剪画质档位：{:?}（filter={:?}, max_target_pixels={}）",
            profile,
            config.resize_filter,
            config.max_target_pixels
        );

        Ok(())
    }

    /// 获取当前生效画质档位（字符串）。
    pub fn get_quality_profile(&self) -> Result<String, CropError> {
        let config = self
            .config
            .read()
            .map_err(|_| CropError::Runtime("配置读取锁已中毒".to_string()))?;
        Ok(config.infer_quality_profile().as_str().to_string())
    }

    /// 应用用户设置，并同步调整解码并发额度。
    pub fn apply_settings(&self, settings: &CropperSettings) -> Result<(), CropError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| CropError::Runtime("配置写入锁已中毒".to_string()))?;
        config.apply_settings(settings)?;

        self.decode_slots.resize(config.max_concurrent_decodes)?;

        log::info!("⚙️ 已应用裁剪设置：{:?}", settings);
        Ok(())
    }

    /// 获取当前设置快照。
    pub fn settings(&self) -> Result<CropperSettings, CropError> {
        Ok(self.config_snapshot()?.settings())
    }
}

impl Default for WallpaperCropService {
    fn default() -> Self {
        Self::new()
    }
}
