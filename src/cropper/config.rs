//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `CropperConfig`，保证运行时行为可观测、可调整、可测试。
//! 其中画质档位（quality / balanced / speed）作为高层语义，映射到底层参数组合。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的平衡配置。
//! - `CropQualityProfile` 负责档位字符串解析与反向输出。
//! - `apply_quality_profile` 将档位转换为具体阈值。
//! - `infer_quality_profile` 用于从当前配置反推档位。
//! - `CropperSettings` 是允许用户调整的子集，带范围校验，可序列化为 JSON。

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use super::CropError;

/// 裁剪流水线配置。
///
/// 字段覆盖了加载、解码、区域收敛与输出缩放四个阶段。
#[derive(Debug, Clone)]
pub struct CropperConfig {
    /// 读取原始字节时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 源图像素上限（`width * height`），按 header 尺寸在完整解码前校验。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 输出位图的像素上限。
    pub max_target_pixels: u64,
    /// 缩放滤镜策略。
    pub resize_filter: FilterType,
    /// 裁剪框部分越界时是否收敛到图片范围内；关闭后越界直接判定失败。
    pub clamp_region_to_bounds: bool,
    /// 同时进行的区域解码数量上限。
    pub max_concurrent_decodes: usize,
}

impl Default for CropperConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            max_target_pixels: 16_000_000,
            resize_filter: FilterType::Triangle,
            clamp_region_to_bounds: true,
            max_concurrent_decodes: 2,
        }
    }
}

/// 裁剪画质档位（面向产品/用户语义）。
///
/// - `Quality`：尽量保真
/// - `Balanced`：质量与性能平衡
/// - `Speed`：优先出图速度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropQualityProfile {
    Quality,
    Balanced,
    Speed,
}

impl CropQualityProfile {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use wallpaper_cropper::cropper::CropQualityProfile;
    ///
    /// let p = CropQualityProfile::from_str("balanced")?;
    /// assert_eq!(p.as_str(), "balanced");
    /// # Ok::<(), wallpaper_cropper::cropper::CropError>(())
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(profile: &str) -> Result<Self, CropError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(CropError::InvalidFormat(format!(
                "未知画质档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    /// 将档位输出为稳定字符串，供展示与持久化。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl CropperConfig {
    /// 基于当前参数反推画质档位。
    pub fn infer_quality_profile(&self) -> CropQualityProfile {
        match self.resize_filter {
            FilterType::Lanczos3 | FilterType::CatmullRom => CropQualityProfile::Quality,
            FilterType::Nearest => CropQualityProfile::Speed,
            FilterType::Triangle | FilterType::Gaussian => CropQualityProfile::Balanced,
        }
    }

    /// 应用指定画质档位到实际参数。
    pub fn apply_quality_profile(&mut self, profile: CropQualityProfile) {
        match profile {
            CropQualityProfile::Quality => {
                self.resize_filter = FilterType::Lanczos3;
                self.max_target_pixels = self.max_decoded_pixels;
            }
            CropQualityProfile::Balanced => {
                self.resize_filter = FilterType::Triangle;
                self.max_target_pixels = 16_000_000;
            }
            CropQualityProfile::Speed => {
                self.resize_filter = FilterType::Nearest;
                self.max_target_pixels = 8_000_000;
            }
        }
    }

    /// 应用用户设置；任一字段越界时整体拒绝，不做部分写入。
    pub fn apply_settings(&mut self, settings: &CropperSettings) -> Result<(), CropError> {
        settings.validate()?;

        let profile = CropQualityProfile::from_str(&settings.quality_profile)?;
        self.max_file_size = settings.max_file_size;
        self.max_decoded_bytes = settings.max_decoded_bytes;
        self.clamp_region_to_bounds = settings.clamp_region_to_bounds;
        self.max_concurrent_decodes = settings.max_concurrent_decodes;
        self.apply_quality_profile(profile);

        Ok(())
    }

    /// 导出当前配置中可由用户调整的部分。
    pub fn settings(&self) -> CropperSettings {
        CropperSettings {
            quality_profile: self.infer_quality_profile().as_str().to_string(),
            max_file_size: self.max_file_size,
            max_decoded_bytes: self.max_decoded_bytes,
            clamp_region_to_bounds: self.clamp_region_to_bounds,
            max_concurrent_decodes: self.max_concurrent_decodes,
        }
    }
}

/// 用户可调整的裁剪设置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropperSettings {
    pub quality_profile: String,
    pub max_file_size: u64,
    pub max_decoded_bytes: u64,
    pub clamp_region_to_bounds: bool,
    pub max_concurrent_decodes: usize,
}

impl Default for CropperSettings {
    fn default() -> Self {
        CropperConfig::default().settings()
    }
}

impl CropperSettings {
    pub fn validate(&self) -> Result<(), CropError> {
        CropQualityProfile::from_str(&self.quality_profile)?;

        if !(1024..=512 * 1024 * 1024).contains(&self.max_file_size) {
            return Err(CropError::InvalidFormat(
                "max_file_size 必须在 1KB~512MB 之间".to_string(),
            ));
        }
        if self.max_decoded_bytes < 8 * 1024 * 1024 {
            return Err(CropError::InvalidFormat(
                "max_decoded_bytes 不能小于 8MB".to_string(),
            ));
        }
        if !(1..=16).contains(&self.max_concurrent_decodes) {
            return Err(CropError::InvalidFormat(
                "max_concurrent_decodes 必须在 1~16 之间".to_string(),
            ));
        }

        Ok(())
    }
}
