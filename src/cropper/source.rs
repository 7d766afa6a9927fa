//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线中间结果”解耦：
//! - `AssetSource` 表示壁纸图片的来源语义
//! - `RawImageData` 表示已加载但未解码的字节

use std::path::PathBuf;
use std::sync::Arc;

/// 壁纸图片来源。
#[derive(Debug, Clone)]
pub enum AssetSource {
    /// 本地文件路径。
    FilePath(PathBuf),
    /// 已在内存中的编码字节。
    Bytes(Arc<[u8]>),
    /// Base64（支持 Data URL 与纯 Base64 字符串）。
    Base64(String),
}

impl AssetSource {
    /// 来源提示（用于日志与诊断）。
    pub(crate) fn hint(&self) -> &'static str {
        match self {
            Self::FilePath(_) => "file",
            Self::Bytes(_) => "bytes",
            Self::Base64(_) => "base64",
        }
    }
}

impl From<Vec<u8>> for AssetSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes.into())
    }
}

/// 加载阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Arc<[u8]>,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: &'static str,
}
