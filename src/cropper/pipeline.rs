//! # 区域解码流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 源图区域 → 目标尺寸位图”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先读取 header 尺寸做检查，再进行完整解码，降低超大图片触发高内存开销的风险。
//! 先只把裁剪区域转换为 RGBA，再交给 `fast_image_resize` 缩放，不复制整张全分辨率图像。
//!
//! ## 实现思路
//!
//! 1. 目标尺寸为 0 直接判定失败
//! 2. 猜测格式并读取 header 尺寸，按像素/内存上限快速拒绝
//! 3. RTL 时镜像裁剪框，再按配置收敛或拒绝越界区域
//! 4. 带 `image::Limits` 的完整解码
//! 5. 截取区域 + 缩放到目标尺寸，失败时回退 `image` 的 `crop_imm + resize_exact`

use fast_image_resize as fr;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageReader, Rgba};
use std::io::Cursor;

use super::asset::{AssetInner, RegionRequest};
use super::geometry::CropRect;
use super::source::RawImageData;
use super::{CropError, CropperConfig};

impl AssetInner {
    /// 解码请求区域并输出 `target_width x target_height` 的 RGBA 位图。
    pub(super) fn decode_region(
        &self,
        raw: &RawImageData,
        request: &RegionRequest,
        config: &CropperConfig,
    ) -> Result<DynamicImage, CropError> {
        if request.target_width == 0 || request.target_height == 0 {
            return Err(CropError::InvalidRequest(format!(
                "目标尺寸为 0：{}x{}",
                request.target_width, request.target_height
            )));
        }

        let (header_width, header_height) = Self::inspect_dimensions_from_memory(&raw.bytes)?;
        Self::validate_pixel_limits(config.max_decoded_pixels, header_width, header_height)?;
        Self::validate_decoded_memory_limits(config, header_width, header_height)?;

        let region = Self::resolve_region(request, header_width, header_height, config)?;
        Self::validate_pixel_limits(
            config.max_target_pixels,
            request.target_width,
            request.target_height,
        )?;

        log::debug!(
            "🧭 区域解码 - 源图: {}x{} 请求: {:?} rtl={} 实际区域: {:?} 目标: {}x{}",
            header_width,
            header_height,
            request.rect,
            request.is_rtl,
            region,
            request.target_width,
            request.target_height
        );

        let decoded = Self::decode_with_limits(&raw.bytes, config)?;
        let (raw_width, raw_height) = decoded.dimensions();
        if (raw_width, raw_height) != (header_width, header_height) {
            return Err(CropError::Decode(format!(
                "解码尺寸与 header 不一致：{}x{} vs {}x{}",
                raw_width, raw_height, header_width, header_height
            )));
        }

        if self.is_cancelled() {
            return Err(CropError::Cancelled);
        }

        let output = match Self::crop_and_resize_with_fast_image_resize(
            &decoded,
            region,
            request.target_width,
            request.target_height,
            config.resize_filter,
        ) {
            Ok(resized) => resized,
            Err(err) => {
                log::warn!(
                    "⚠️ fast_image_resize 裁剪缩放失败，回退 image::resize_exact：{}",
                    err
                );
                let cropped = decoded.crop_imm(
                    region.left as u32,
                    region.top as u32,
                    region.width,
                    region.height,
                );
                DynamicImage::ImageRgba8(
                    cropped
                        .resize_exact(
                            request.target_width,
                            request.target_height,
                            config.resize_filter,
                        )
                        .to_rgba8(),
                )
            }
        };

        Ok(output)
    }

    /// 仅通过内存中的图片头信息读取宽高。
    pub(super) fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), CropError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CropError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| CropError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))
    }

    /// 镜像（RTL）并把请求区域落到源图范围内。
    fn resolve_region(
        request: &RegionRequest,
        image_width: u32,
        image_height: u32,
        config: &CropperConfig,
    ) -> Result<CropRect, CropError> {
        let rect = if request.is_rtl {
            request.rect.mirrored(image_width)
        } else {
            request.rect
        };

        if rect.contains_within(image_width, image_height) {
            return Ok(rect);
        }

        let out_of_bounds = || CropError::RegionOutOfBounds {
            region: rect,
            image_size: (image_width, image_height),
        };

        if !config.clamp_region_to_bounds {
            return Err(out_of_bounds());
        }

        let clamped = rect.clamp_to(image_width, image_height).ok_or_else(out_of_bounds)?;
        log::debug!("✂️ 裁剪区域越界，已收敛：{:?} -> {:?}", rect, clamped);
        Ok(clamped)
    }

    fn validate_pixel_limits(limit: u64, width: u32, height: u32) -> Result<(), CropError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| CropError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > limit {
            return Err(CropError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, limit
            )));
        }

        Ok(())
    }

    fn validate_decoded_memory_limits(
        config: &CropperConfig,
        width: u32,
        height: u32,
    ) -> Result<(), CropError> {
        let estimated = (width as u64)
            .checked_mul(height as u64)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| CropError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

        if estimated > config.max_decoded_bytes {
            return Err(CropError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }

    fn decode_with_limits(bytes: &[u8], config: &CropperConfig) -> Result<DynamicImage, CropError> {
        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CropError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

        let mut limits = image::Limits::default();
        limits.max_alloc = Some(config.max_decoded_bytes);
        reader.limits(limits);

        reader
            .decode()
            .map_err(|e| CropError::Decode(format!("图片解码失败：{}", e)))
    }

    fn crop_and_resize_with_fast_image_resize(
        image: &DynamicImage,
        region: CropRect,
        target_width: u32,
        target_height: u32,
        filter: image::imageops::FilterType,
    ) -> Result<DynamicImage, CropError> {
        let src = image
            .crop_imm(
                region.left as u32,
                region.top as u32,
                region.width,
                region.height,
            )
            .into_rgba8();
        let (src_width, src_height) = src.dimensions();

        let src_image = fr::images::Image::from_vec_u8(
            src_width,
            src_height,
            src.into_raw(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| CropError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new()
            .resize_alg(fr::ResizeAlg::Convolution(Self::to_fast_filter(filter)));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| CropError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

        let rgba = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(
            target_width,
            target_height,
            dst_image.into_vec(),
        )
        .ok_or_else(|| CropError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))?;

        Ok(DynamicImage::ImageRgba8(rgba))
    }

    fn to_fast_filter(filter: image::imageops::FilterType) -> fr::FilterType {
        match filter {
            image::imageops::FilterType::Nearest => fr::FilterType::Box,
            image::imageops::FilterType::Triangle => fr::FilterType::Bilinear,
            image::imageops::FilterType::CatmullRom => fr::FilterType::CatmullRom,
            image::imageops::FilterType::Gaussian => fr::FilterType::Mitchell,
            image::imageops::FilterType::Lanczos3 => fr::FilterType::Lanczos3,
        }
    }
}
