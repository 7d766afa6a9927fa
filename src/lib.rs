//! # 壁纸裁剪核心：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 壁纸选择器（界面 / 持久化）               │
//! └───────┬──────────────────────────────┬───────────────────┘
//!         ↓ (asset, scale, rect, rtl)    ↓ 目录 / 设置
//! ┌───────┼──────────────────────────────┼───────────────────┐
//! │       ↓                              ↓                   │
//! │  ┌─ cropper ──── 裁剪器 + 资产 + 服务                     │
//! │  │   ├─ bitmap_cropper  目标尺寸换算 + 委托解码            │
//! │  │   ├─ asset           区域解码（tokio 阻塞线程）          │
//! │  │   └─ service         配置快照 · 裁剪 · 保存              │
//! │  ├─ metadata ─── 静态 / 动态壁纸元数据                     │
//! │  ├─ error ────── AppError (统一错误类型)                   │
//! │  ├─ storage      壁纸输出目录                              │
//! │  └─ settings     裁剪设置 JSON 持久化                      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`cropper`] | 把显示空间裁剪框 + 缩放比例换算为源图区域解码，恰好一次回调交付结果 |
//! | [`metadata`] | 壁纸署名、动作链接、合集 ID 与动态壁纸组件 |
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`storage`] | 裁剪结果输出目录的获取与自动创建 |
//! | [`settings`] | 裁剪设置的读取、校验与保存 |

pub mod cropper;
pub mod error;
pub mod metadata;
pub mod settings;
pub mod storage;

/// 初始化日志，默认级别 `info`，可通过 `RUST_LOG` 覆盖。
///
/// 重复调用是安全的，第二次起直接忽略。
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
