//! # 图片资产模块
//!
//! ## 设计思路
//!
//! `Asset` 是裁剪器唯一依赖的协作方契约：给定源图坐标系下的裁剪框、目标宽高与
//! RTL 标志，异步解码该区域，并通过一次性完成回调交付 `Some(bitmap)` 或 `None`。
//! 裁剪器不关心失败原因，失败细节只在资产内部记录日志。
//!
//! ## 实现思路
//!
//! - `ImageAsset` 是基于 `image` + `fast_image_resize` 的默认实现。
//! - 解码在 tokio 阻塞线程池中进行，用共享 `Semaphore` 限制并发解码数量，控制内存峰值。
//! - 每次解码读取一份配置快照，处理中途配置变化不影响本次请求。
//! - 取消能力放在资产层：`cancel()` 之后，排队中与后续的解码都以 `None` 结束。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use image::DynamicImage;
use tokio::runtime::Handle;

use super::geometry::CropRect;
use super::slots::DecodeSlots;
use super::source::AssetSource;
use super::{CropError, CropperConfig};

/// 裁剪输出位图。
pub type Bitmap = DynamicImage;

/// 区域解码完成回调：成功交付位图，失败交付 `None`。
pub type DecodeCompletion = Box<dyn FnOnce(Option<Bitmap>) + Send + 'static>;

/// 可按区域解码的图片资产。
pub trait Asset: Send + Sync {
    /// 异步解码 `rect` 区域并缩放到 `target_width x target_height`。
    ///
    /// `is_rtl` 为真时，`rect` 以源图宽度为轴水平镜像后再解码。
    /// `on_decoded` 必须且只能被调用一次，可在任意线程上调用。
    fn decode_bitmap_region(
        &self,
        rect: CropRect,
        target_width: u32,
        target_height: u32,
        is_rtl: bool,
        on_decoded: DecodeCompletion,
    );

    /// 读取源图原始尺寸（宽、高）。
    fn decode_raw_dimensions(&self) -> Result<(u32, u32), CropError>;
}

/// 单次区域解码请求。
#[derive(Debug, Clone, Copy)]
pub(crate) struct RegionRequest {
    pub(crate) rect: CropRect,
    pub(crate) target_width: u32,
    pub(crate) target_height: u32,
    pub(crate) is_rtl: bool,
}

/// 基于 `image` crate 的图片资产。
///
/// 克隆开销很小，克隆体共享同一份来源与取消标志。
#[derive(Clone)]
pub struct ImageAsset {
    inner: Arc<AssetInner>,
}

pub(crate) struct AssetInner {
    pub(super) source: AssetSource,
    config: Arc<RwLock<CropperConfig>>,
    decode_slots: Arc<DecodeSlots>,
    runtime: Handle,
    cancelled: AtomicBool,
}

impl ImageAsset {
    /// 在当前 tokio 运行时上创建资产。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use wallpaper_cropper::cropper::{AssetSource, CropperConfig, ImageAsset};
    ///
    /// # async fn demo() -> Result<(), wallpaper_cropper::cropper::CropError> {
    /// let asset = ImageAsset::new(
    ///     AssetSource::FilePath("/tmp/wallpaper.jpg".into()),
    ///     CropperConfig::default(),
    /// )?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(source: AssetSource, config: CropperConfig) -> Result<Self, CropError> {
        let runtime = Handle::try_current()
            .map_err(|e| CropError::Runtime(format!("当前线程没有 tokio 运行时：{}", e)))?;
        let slots = DecodeSlots::new(config.max_concurrent_decodes);
        Ok(Self::with_shared(
            source,
            Arc::new(RwLock::new(config)),
            slots,
            runtime,
        ))
    }

    /// 与服务层共享配置和解码并发额度。
    pub(crate) fn with_shared(
        source: AssetSource,
        config: Arc<RwLock<CropperConfig>>,
        decode_slots: Arc<DecodeSlots>,
        runtime: Handle,
    ) -> Self {
        Self {
            inner: Arc::new(AssetInner {
                source,
                config,
                decode_slots,
                runtime,
                cancelled: AtomicBool::new(false),
            }),
        }
    }

    /// 取消该资产上排队中和后续的解码，它们都会以 `None` 结束。
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        log::debug!("🛑 已取消资产解码 - 来源: {}", self.inner.source.hint());
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    pub fn source(&self) -> &AssetSource {
        &self.inner.source
    }
}

impl AssetInner {
    pub(super) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub(super) fn config_snapshot(&self) -> Result<CropperConfig, CropError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| CropError::Runtime("配置读取锁已中毒".to_string()))
    }

    /// 同步执行一次完整的区域解码（在阻塞线程上调用）。
    fn run_region_decode(&self, request: RegionRequest) -> Result<Bitmap, CropError> {
        if self.is_cancelled() {
            return Err(CropError::Cancelled);
        }

        let config = self.config_snapshot()?;
        let total_start = Instant::now();

        let load_start = Instant::now();
        let raw = self.load_raw(&config)?;
        let load_elapsed = load_start.elapsed();

        if self.is_cancelled() {
            return Err(CropError::Cancelled);
        }

        let decode_start = Instant::now();
        let bitmap = self.decode_region(&raw, &request, &config)?;
        let decode_elapsed = decode_start.elapsed();

        log::info!(
            "✅ 区域解码完成 - 来源: {} load={}ms decode={}ms total={}ms",
            raw.source_hint,
            load_elapsed.as_millis(),
            decode_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(bitmap)
    }
}

impl Asset for ImageAsset {
    fn decode_bitmap_region(
        &self,
        rect: CropRect,
        target_width: u32,
        target_height: u32,
        is_rtl: bool,
        on_decoded: DecodeCompletion,
    ) {
        let request = RegionRequest {
            rect,
            target_width,
            target_height,
            is_rtl,
        };
        let inner = Arc::clone(&self.inner);
        let slots = Arc::clone(&self.inner.decode_slots);

        self.inner.runtime.spawn(async move {
            let _slot = match slots.acquire().await {
                Ok(permit) => permit,
                Err(err) => {
                    log::warn!("⚠️ 解码并发额度不可用：{}", err);
                    on_decoded(None);
                    return;
                }
            };

            let worker = Arc::clone(&inner);
            let outcome = tokio::task::spawn_blocking(move || worker.run_region_decode(request))
                .await
                .unwrap_or_else(|e| Err(CropError::Runtime(format!("解码任务异常退出：{}", e))));

            match outcome {
                Ok(bitmap) => on_decoded(Some(bitmap)),
                Err(err) => {
                    log::warn!(
                        "⚠️ 区域解码失败 [{}] - 来源: {} 区域: {:?} 目标: {}x{}：{}",
                        err.code(),
                        inner.source.hint(),
                        request.rect,
                        request.target_width,
                        request.target_height,
                        err
                    );
                    on_decoded(None);
                }
            }
        });
    }

    fn decode_raw_dimensions(&self) -> Result<(u32, u32), CropError> {
        let config = self.inner.config_snapshot()?;
        let raw = self.inner.load_raw(&config)?;
        AssetInner::inspect_dimensions_from_memory(&raw.bytes)
    }
}
