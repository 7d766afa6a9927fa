//! # 位图裁剪器
//!
//! ## 设计思路
//!
//! 裁剪器本身无状态、无锁：把显示空间的裁剪请求换算成目标像素尺寸，
//! 委托资产做区域解码，再把资产的 `Option<Bitmap>` 转成恰好一次的回调信号。
//! 把目标尺寸提前告诉解码器，可以让大图直接按所需分辨率输出，节省内存。
//!
//! ## 实现思路
//!
//! - 目标尺寸 = `trunc(width / scale)`、`trunc(height / scale)`，截断为 0 也原样下发。
//! - 比例非正/非有限、或裁剪框为空时，不触碰资产，直接 `on_error(Some(InvalidRequest))`。
//! - 资产可能在任意线程完成，回调由 `CallbackGuard` 持有，保证不重复、不丢失。
//! - 不做重试，不暴露取消；取消由资产层负责。

use super::asset::{Asset, Bitmap};
use super::callback::{CallbackGuard, CropCallback, CropFuture, OneshotCallback};
use super::geometry::{CropRect, target_dimensions};
use super::CropError;

/// 裁剪并缩放位图的能力。
pub trait BitmapCropper: Send + Sync {
    /// 按 `scale` 与 `crop_rect` 裁剪 `asset`，结果通过 `callback` 异步交付。
    ///
    /// 调用本身不返回任何结果；`callback` 的两个方法中恰好有一个被调用一次。
    fn crop_and_scale_bitmap(
        &self,
        asset: &dyn Asset,
        scale: f32,
        crop_rect: CropRect,
        is_rtl: bool,
        callback: Box<dyn CropCallback>,
    );
}

/// 默认裁剪器实现。
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBitmapCropper;

impl DefaultBitmapCropper {
    pub fn new() -> Self {
        Self
    }

    /// future 形式的裁剪入口，结果单次决议。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use wallpaper_cropper::cropper::{
    ///     AssetSource, CropRect, CropperConfig, DefaultBitmapCropper, ImageAsset,
    /// };
    ///
    /// # async fn demo() -> Result<(), wallpaper_cropper::cropper::CropError> {
    /// let asset = ImageAsset::new(
    ///     AssetSource::FilePath("/tmp/wallpaper.jpg".into()),
    ///     CropperConfig::default(),
    /// )?;
    /// let bitmap = DefaultBitmapCropper::new()
    ///     .crop_and_scale(&asset, 2.0, CropRect::new(0, 0, 1080, 1920), false)
    ///     .await?;
    /// assert_eq!((bitmap.width(), bitmap.height()), (540, 960));
    /// # Ok(())
    /// # }
    /// ```
    pub fn crop_and_scale(
        &self,
        asset: &dyn Asset,
        scale: f32,
        crop_rect: CropRect,
        is_rtl: bool,
    ) -> CropFuture {
        let (callback, future) = OneshotCallback::channel();
        self.crop_and_scale_bitmap(asset, scale, crop_rect, is_rtl, Box::new(callback));
        future
    }

    fn validate_request(scale: f32, crop_rect: &CropRect) -> Result<(), CropError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(CropError::InvalidRequest(format!(
                "缩放比例必须为正数：{}",
                scale
            )));
        }
        if crop_rect.is_empty() {
            return Err(CropError::InvalidRequest(format!(
                "裁剪框宽高必须大于 0：{}x{}",
                crop_rect.width, crop_rect.height
            )));
        }
        Ok(())
    }
}

impl BitmapCropper for DefaultBitmapCropper {
    fn crop_and_scale_bitmap(
        &self,
        asset: &dyn Asset,
        scale: f32,
        crop_rect: CropRect,
        is_rtl: bool,
        callback: Box<dyn CropCallback>,
    ) {
        let guard = CallbackGuard::new(callback);

        if let Err(err) = Self::validate_request(scale, &crop_rect) {
            log::warn!("⚠️ 裁剪请求被拒绝：{}", err);
            guard.error(Some(err));
            return;
        }

        let (target_width, target_height) = target_dimensions(&crop_rect, scale);
        log::debug!(
            "📐 裁剪请求 - 区域: {:?} scale={} rtl={} 目标: {}x{}",
            crop_rect,
            scale,
            is_rtl,
            target_width,
            target_height
        );

        asset.decode_bitmap_region(
            crop_rect,
            target_width,
            target_height,
            is_rtl,
            Box::new(move |bitmap: Option<Bitmap>| match bitmap {
                Some(bitmap) => guard.bitmap_cropped(bitmap),
                None => guard.error(None),
            }),
        );
    }
}
