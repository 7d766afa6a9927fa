//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，服务层、存储与设置读写统一返回 `Result<T, AppError>`，
//! 替代分散的 `.map_err(|e| e.to_string())` 与 `expect()`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `CropError`、`MetadataError` 与 `std::io::Error` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize`，将错误序列化为字符串，便于上层直接回传给界面。

use serde::Serialize;

use crate::cropper::CropError;
use crate::metadata::MetadataError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 裁剪流水线错误（加载 / 解码 / 缩放）
    #[error("{0}")]
    Crop(#[from] CropError),

    /// 壁纸元数据错误
    #[error("{0}")]
    Metadata(#[from] MetadataError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 存储目录不可用或写入失败
    #[error("存储目录不可用: {0}")]
    Storage(String),

    /// 设置文件读写失败
    #[error("设置错误: {0}")]
    Settings(String),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
