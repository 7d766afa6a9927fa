//! # 裁剪结果回调模块
//!
//! ## 设计思路
//!
//! 裁剪结果只有两个终止信号：`on_bitmap_cropped` 与 `on_error`，每次请求恰好触发一个。
//! - 回调方法以 `self: Box<Self>` 接收所有权，类型层面杜绝二次触发。
//! - `CallbackGuard` 采用 RAII 模式：资产丢弃完成回调而未调用时，
//!   `Drop` 自动补发 `on_error(Some(Abandoned))`，杜绝静默丢失。
//! - `CropFuture` 基于 tokio `oneshot`，把回调形式转换为单次决议的 future。

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use super::CropError;
use super::asset::Bitmap;

/// 裁剪结果回调。
pub trait CropCallback: Send {
    /// 裁剪成功，交付最终位图。
    fn on_bitmap_cropped(self: Box<Self>, bitmap: Bitmap);

    /// 裁剪失败；解码器未给出原因时 `cause` 为 `None`。
    fn on_error(self: Box<Self>, cause: Option<CropError>);
}

/// 保证回调恰好触发一次的守卫。
pub(crate) struct CallbackGuard {
    callback: Option<Box<dyn CropCallback>>,
}

impl CallbackGuard {
    pub(crate) fn new(callback: Box<dyn CropCallback>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    pub(crate) fn bitmap_cropped(mut self, bitmap: Bitmap) {
        if let Some(callback) = self.callback.take() {
            callback.on_bitmap_cropped(bitmap);
        }
    }

    pub(crate) fn error(mut self, cause: Option<CropError>) {
        if let Some(callback) = self.callback.take() {
            callback.on_error(cause);
        }
    }
}

impl Drop for CallbackGuard {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            log::warn!("⚠️ 解码完成回调未被调用即被丢弃，按失败处理");
            callback.on_error(Some(CropError::Abandoned));
        }
    }
}

/// 把回调结果转发到 oneshot 通道。
pub(crate) struct OneshotCallback {
    sender: oneshot::Sender<Result<Bitmap, CropError>>,
}

impl OneshotCallback {
    pub(crate) fn channel() -> (Self, CropFuture) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, CropFuture { receiver })
    }
}

impl CropCallback for OneshotCallback {
    fn on_bitmap_cropped(self: Box<Self>, bitmap: Bitmap) {
        // 接收端已放弃等待时直接丢弃结果
        let _ = self.sender.send(Ok(bitmap));
    }

    fn on_error(self: Box<Self>, cause: Option<CropError>) {
        let _ = self
            .sender
            .send(Err(cause.unwrap_or(CropError::DecodeFailed)));
    }
}

/// 单次决议的裁剪结果 future。
///
/// 解码器未给出原因的失败决议为 `CropError::DecodeFailed`。
#[must_use = "futures do nothing unless awaited"]
pub struct CropFuture {
    receiver: oneshot::Receiver<Result<Bitmap, CropError>>,
}

impl Future for CropFuture {
    type Output = Result<Bitmap, CropError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(CropError::Abandoned)))
    }
}
