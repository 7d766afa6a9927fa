//! # 壁纸裁剪模块（cropper）
//!
//! ## 设计思路
//!
//! 该模块将“裁剪请求换算 → 资产区域解码 → 结果回调 → 服务编排”按职责拆分为多个子模块，
//! 避免单文件膨胀与耦合。
//!
//! - `bitmap_cropper`：裁剪器，换算目标尺寸并委托资产解码（核心决策点）
//! - `callback`：恰好一次的回调守卫与 future 适配
//! - `asset`：资产契约与默认的 `ImageAsset` 实现
//! - `loader`：文件/字节/Base64 加载与安全校验
//! - `pipeline`：header 检查、RTL 镜像、越界收敛、裁剪缩放
//! - `service`：承载可注入状态（`WallpaperCropService`）
//! - `slots`：服务与资产共享的解码并发额度
//! - `config/error/geometry/source`：配置、错误、几何与中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! 调用方
//!    ↓
//! service.rs（配置快照、打开资产、保存结果）
//!    ↓
//! bitmap_cropper.rs（trunc(w/scale) x trunc(h/scale)）
//!    ↓
//! asset.rs（tokio 阻塞线程 + 并发额度）
//!    ├─ loader.rs（来源加载 + 体积/签名校验）
//!    └─ pipeline.rs（header 尺寸 + 镜像 + 收敛 + 裁剪缩放）
//!    ↓
//! callback.rs（on_bitmap_cropped / on_error 恰好一次）
//! ```

mod asset;
mod bitmap_cropper;
mod callback;
mod config;
mod error;
mod geometry;
mod loader;
mod pipeline;
mod service;
mod slots;
mod source;

pub use asset::{Asset, Bitmap, DecodeCompletion, ImageAsset};
pub use bitmap_cropper::{BitmapCropper, DefaultBitmapCropper};
pub use callback::{CropCallback, CropFuture};
pub use config::{CropQualityProfile, CropperConfig, CropperSettings};
pub use error::CropError;
pub use geometry::{CropRect, target_dimensions};
pub use service::WallpaperCropService;
pub use source::AssetSource;
