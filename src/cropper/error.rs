//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载裁剪链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 注意：解码器本身只上报“有图 / 无图”，因此回调里的错误原因允许为空，
//! 此处的枚举主要服务于请求预校验、资产加载日志与 future 形式的结果。

use super::geometry::CropRect;

/// 裁剪流水线统一错误类型。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CropError {
    #[error("请求参数无效：{0}")]
    InvalidRequest(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("解码错误：{0}")]
    Decode(String),

    /// 解码器未给出原因地返回了空结果。
    #[error("区域解码失败")]
    DecodeFailed,

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error(
        "裁剪区域 ({},{},{}x{}) 超出图片范围 ({}x{})",
        region.left, region.top, region.width, region.height,
        image_size.0, image_size.1
    )]
    RegionOutOfBounds {
        region: CropRect,
        image_size: (u32, u32),
    },

    #[error("解码已取消")]
    Cancelled,

    /// 资产丢弃了完成回调而没有调用它。
    #[error("解码回调被丢弃，未返回任何结果")]
    Abandoned,

    #[error("运行时错误：{0}")]
    Runtime(String),
}

impl CropError {
    /// 稳定错误码，供日志与上层诊断使用。
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "E_INVALID_REQUEST",
            Self::InvalidFormat(_) => "E_INVALID_FORMAT",
            Self::Decode(_) => "E_DECODE",
            Self::DecodeFailed => "E_DECODE_FAILED",
            Self::FileSystem(_) => "E_FILE_SYSTEM",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
            Self::RegionOutOfBounds { .. } => "E_REGION_OUT_OF_BOUNDS",
            Self::Cancelled => "E_CANCELLED",
            Self::Abandoned => "E_ABANDONED",
            Self::Runtime(_) => "E_RUNTIME",
        }
    }
}

impl From<CropError> for String {
    fn from(error: CropError) -> Self {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_message_names_region_and_image() {
        let err = CropError::RegionOutOfBounds {
            region: CropRect::new(10, 20, 30, 40),
            image_size: (16, 16),
        };

        assert_eq!(err.to_string(), "裁剪区域 (10,20,30x40) 超出图片范围 (16x16)");
        assert_eq!(err.code(), "E_REGION_OUT_OF_BOUNDS");
    }
}
