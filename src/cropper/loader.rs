//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 统一处理不同来源（本地文件 / 内存字节 / Base64）的原始字节加载，
//! 并在“尽可能早”的阶段执行输入校验，尽快失败，减少不必要的内存与 CPU 消耗。
//!
//! ## 实现思路
//!
//! - 文件：存在性 + metadata 体积限制 + 读取。
//! - 字节：体积限制，直接共享 `Arc<[u8]>` 不做拷贝。
//! - Base64：格式解析 + 解码前体积估算 + 解码后体积限制。
//! - 所有来源最后都做一次文件签名校验（`infer`），拒绝非图片内容。

use base64::{Engine as _, engine::general_purpose};
use std::path::Path;
use std::sync::Arc;

use super::asset::AssetInner;
use super::source::{AssetSource, RawImageData};
use super::{CropError, CropperConfig};

impl AssetInner {
    /// 按来源加载原始字节。
    pub(super) fn load_raw(&self, config: &CropperConfig) -> Result<RawImageData, CropError> {
        let bytes = match &self.source {
            AssetSource::FilePath(path) => Self::load_from_file(path, config)?,
            AssetSource::Bytes(bytes) => Self::load_from_bytes(bytes, config)?,
            AssetSource::Base64(data) => Self::load_from_base64(data, config)?,
        };

        Ok(RawImageData {
            bytes,
            source_hint: self.source.hint(),
        })
    }

    fn load_from_file(path: &Path, config: &CropperConfig) -> Result<Arc<[u8]>, CropError> {
        log::debug!("📁 读取本地图片 - 路径: {}", path.display());

        if !path.exists() {
            return Err(CropError::FileSystem(format!(
                "文件不存在：{}",
                path.display()
            )));
        }

        let metadata = std::fs::metadata(path)
            .map_err(|e| CropError::FileSystem(format!("无法读取文件信息：{}", e)))?;

        if metadata.len() > config.max_file_size {
            return Err(CropError::ResourceLimit(format!(
                "文件过大：{:.2} MB（限制：{:.2} MB）",
                metadata.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        let bytes = std::fs::read(path)
            .map_err(|e| CropError::FileSystem(format!("无法读取图片文件：{}", e)))?;
        Self::validate_image_signature(&bytes)?;

        Ok(bytes.into())
    }

    fn load_from_bytes(bytes: &Arc<[u8]>, config: &CropperConfig) -> Result<Arc<[u8]>, CropError> {
        if bytes.len() as u64 > config.max_file_size {
            return Err(CropError::ResourceLimit(format!(
                "图片字节过大：{:.2} MB（限制：{:.2} MB）",
                bytes.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }
        Self::validate_image_signature(bytes)?;

        Ok(Arc::clone(bytes))
    }

    fn load_from_base64(data: &str, config: &CropperConfig) -> Result<Arc<[u8]>, CropError> {
        let bytes = Self::parse_base64_with_limit(data, config.max_file_size)?;

        if bytes.len() as u64 > config.max_file_size {
            return Err(CropError::ResourceLimit(format!(
                "Base64 解码后体积过大：{:.2} MB（限制：{:.2} MB）",
                bytes.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }
        Self::validate_image_signature(&bytes)?;

        Ok(bytes.into())
    }

    fn estimate_base64_decoded_upper_bound_len(base64_data: &str) -> Result<u64, CropError> {
        let len = base64_data.trim().len() as u64;
        let groups = len
            .checked_add(3)
            .ok_or_else(|| CropError::ResourceLimit("Base64 输入长度溢出".to_string()))?
            / 4;

        groups
            .checked_mul(3)
            .ok_or_else(|| CropError::ResourceLimit("Base64 解码体积估算溢出".to_string()))
    }

    fn parse_base64_with_limit(data: &str, max_file_size: u64) -> Result<Vec<u8>, CropError> {
        let normalized = data.trim();

        let payload = if normalized.starts_with("data:image/") {
            let base64_start = normalized
                .find(";base64,")
                .ok_or_else(|| CropError::InvalidFormat("缺少 base64 标记".to_string()))?;
            &normalized[base64_start + 8..]
        } else {
            normalized
        };

        let estimated_len = Self::estimate_base64_decoded_upper_bound_len(payload)?;
        if estimated_len > max_file_size {
            return Err(CropError::ResourceLimit(format!(
                "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
                estimated_len as f64 / 1024.0 / 1024.0,
                max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| CropError::Decode(format!("Base64 解码失败：{}", e)))
    }

    fn validate_image_signature(bytes: &[u8]) -> Result<(), CropError> {
        if bytes.is_empty() {
            return Err(CropError::InvalidFormat("图片内容为空".to_string()));
        }

        let kind = infer::get(bytes)
            .ok_or_else(|| CropError::InvalidFormat("无法识别图片类型".to_string()))?;

        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(CropError::InvalidFormat(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 12] = [137, 80, 78, 71, 13, 10, 26, 10, 0, 0, 0, 13];

    #[test]
    fn signature_check_accepts_png_header() {
        assert!(AssetInner::validate_image_signature(&PNG_SIGNATURE).is_ok());
    }

    #[test]
    fn signature_check_rejects_empty_and_text() {
        assert!(matches!(
            AssetInner::validate_image_signature(&[]),
            Err(CropError::InvalidFormat(_))
        ));
        assert!(matches!(
            AssetInner::validate_image_signature(b"<html><body>nope</body></html>"),
            Err(CropError::InvalidFormat(_))
        ));
    }

    #[test]
    fn base64_rejects_non_image_payload() {
        let result = AssetInner::load_from_base64("SGVsbG8=", &CropperConfig::default());

        assert!(matches!(result, Err(CropError::InvalidFormat(_))));
    }

    #[test]
    fn base64_rejects_large_payload_before_decode() {
        let huge = "A".repeat(1024 * 1024);
        let result = AssetInner::parse_base64_with_limit(&huge, 32);

        assert!(matches!(result, Err(CropError::ResourceLimit(_))));
    }

    #[test]
    fn data_url_without_marker_is_rejected() {
        let result = AssetInner::parse_base64_with_limit("data:image/png,AAAA", 1024);

        assert!(matches!(result, Err(CropError::InvalidFormat(_))));
    }

    #[test]
    fn data_url_payload_is_decoded() {
        let encoded = general_purpose::STANDARD.encode(PNG_SIGNATURE);
        let data_url = format!("data:image/png;base64,{}", encoded);

        let bytes = AssetInner::parse_base64_with_limit(&data_url, 1024).expect("decode failed");

        assert_eq!(bytes, PNG_SIGNATURE);
    }

    #[test]
    fn missing_file_is_reported() {
        let path = std::env::temp_dir().join("wallpaper-cropper-definitely-missing.png");
        let result = AssetInner::load_from_file(&path, &CropperConfig::default());

        assert!(matches!(result, Err(CropError::FileSystem(_))));
    }

    #[test]
    fn oversized_bytes_are_rejected() {
        let config = CropperConfig {
            max_file_size: 4,
            ..CropperConfig::default()
        };
        let bytes: Arc<[u8]> = PNG_SIGNATURE.to_vec().into();

        let result = AssetInner::load_from_bytes(&bytes, &config);

        assert!(matches!(result, Err(CropError::ResourceLimit(_))));
    }
}
