//! # 解码并发额度
//!
//! 服务与所有资产共享一份额度。收缩时空闲许可立即回收，
//! 仍被占用的许可记为待回收，在归还时被丢弃而不是放回信号量。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

use super::CropError;

pub(crate) struct DecodeSlots {
    semaphore: Arc<Semaphore>,
    capacity: Mutex<usize>,
    pending_retire: AtomicUsize,
}

/// 一个解码额度，drop 时归还或按需回收。
pub(crate) struct DecodeSlot {
    permit: Option<OwnedSemaphorePermit>,
    slots: Arc<DecodeSlots>,
}

impl DecodeSlots {
    pub(crate) fn new(capacity: usize) -> Arc<Self> {
        let capacity = capacity.max(1);
        Arc::new(Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity: Mutex::new(capacity),
            pending_retire: AtomicUsize::new(0),
        })
    }

    pub(crate) async fn acquire(self: &Arc<Self>) -> Result<DecodeSlot, AcquireError> {
        let permit = Arc::clone(&self.semaphore).acquire_owned().await?;
        Ok(DecodeSlot {
            permit: Some(permit),
            slots: Arc::clone(self),
        })
    }

    /// 把额度调整为 `wanted`（至少为 1）。
    pub(crate) fn resize(&self, wanted: usize) -> Result<(), CropError> {
        let wanted = wanted.max(1);
        let mut capacity = self
            .capacity
            .lock()
            .map_err(|_| CropError::Runtime("并发额度锁已中毒".to_string()))?;

        if wanted > *capacity {
            let delta = wanted - *capacity;
            // 先抵消尚未回收的许可，剩余部分才新增
            let previous = self
                .pending_retire
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |pending| {
                    Some(pending - pending.min(delta))
                })
                .unwrap_or(0);
            self.semaphore.add_permits(delta - previous.min(delta));
        } else if wanted < *capacity {
            let delta = *capacity - wanted;
            let forgotten = self.semaphore.forget_permits(delta);
            if forgotten < delta {
                self.pending_retire
                    .fetch_add(delta - forgotten, Ordering::SeqCst);
                log::debug!(
                    "⏳ 并发额度收缩中：目标 {}，待回收 {}",
                    wanted,
                    delta - forgotten
                );
            }
        }

        *capacity = wanted;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    #[cfg(test)]
    pub(crate) fn pending_retire(&self) -> usize {
        self.pending_retire.load(Ordering::SeqCst)
    }

    fn take_retire(&self) -> bool {
        self.pending_retire
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |pending| {
                pending.checked_sub(1)
            })
            .is_ok()
    }
}

impl Drop for DecodeSlot {
    fn drop(&mut self) {
        if let Some(permit) = self.permit.take() {
            if self.slots.take_retire() {
                permit.forget();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn hold(slots: &Arc<DecodeSlots>, count: usize) -> Vec<DecodeSlot> {
        let mut held = Vec::with_capacity(count);
        for _ in 0..count {
            held.push(slots.acquire().await.expect("slot should be available"));
        }
        held
    }

    #[test]
    fn idle_slots_shrink_immediately() {
        let slots = DecodeSlots::new(5);

        slots.resize(2).expect("shrink should succeed");

        assert_eq!(slots.available(), 2);
        assert_eq!(slots.pending_retire(), 0);
    }

    #[tokio::test]
    async fn held_slots_are_retired_when_returned() {
        let slots = DecodeSlots::new(5);
        let held = hold(&slots, 4).await;
        assert_eq!(slots.available(), 1);

        slots.resize(1).expect("shrink should succeed");
        assert_eq!(slots.available(), 0);
        assert_eq!(slots.pending_retire(), 3);

        drop(held);

        assert_eq!(slots.available(), 1);
        assert_eq!(slots.pending_retire(), 0);
    }

    #[tokio::test]
    async fn growing_cancels_pending_retirement_first() {
        let slots = DecodeSlots::new(4);
        let held = hold(&slots, 3).await;

        slots.resize(1).expect("shrink should succeed");
        assert_eq!(slots.pending_retire(), 2);

        slots.resize(3).expect("grow should succeed");
        assert_eq!(slots.pending_retire(), 0);
        assert_eq!(slots.available(), 0);

        drop(held);
        assert_eq!(slots.available(), 3);
    }

    #[tokio::test]
    async fn zero_capacity_is_raised_to_one() {
        let slots = DecodeSlots::new(0);

        assert_eq!(slots.available(), 1);
        slots.resize(0).expect("resize should succeed");
        assert_eq!(slots.available(), 1);
    }
}
