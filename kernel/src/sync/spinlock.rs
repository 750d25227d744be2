//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 自旋锁 (Spinlock)
//!
//! 同步原语内部使用的低层互斥：
//! - 获取前关闭本地中断，释放后恢复原来的状态
//! - 忙等，只能保护很短的临界区
//! - 持有期间绝不能睡眠；唯一的例外是把守护交给 [`WaitChannel::sleep`]，
//!   由它原子地完成"入队 + 释放"
//!
//! [`WaitChannel::sleep`]: super::wchan::WaitChannel::sleep

use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};

use crate::sched;

/// 关中断的自旋锁
pub struct SpinLock<T> {
    inner: spin::Mutex<T>,
}

impl<T> SpinLock<T> {
    /// 创建自旋锁 (spinlock_init)
    pub const fn new(value: T) -> Self {
        Self {
            inner: spin::Mutex::new(value),
        }
    }

    /// 获取锁 (spinlock_acquire)
    ///
    /// 先关中断再自旋，避免本 CPU 上的中断处理程序和持锁者互相等待。
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        let irq_was_enabled = sched::irq_save();
        let guard = self.inner.lock();
        SpinLockGuard {
            guard: ManuallyDrop::new(guard),
            irq_was_enabled,
        }
    }

    /// 尝试获取锁，不自旋
    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        let irq_was_enabled = sched::irq_save();
        match self.inner.try_lock() {
            Some(guard) => Some(SpinLockGuard {
                guard: ManuallyDrop::new(guard),
                irq_was_enabled,
            }),
            None => {
                sched::irq_restore(irq_was_enabled);
                None
            }
        }
    }

    /// 当前是否被持有（仅供诊断，结果随时可能过期）
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    /// 销毁自旋锁 (spinlock_cleanup)，返回被保护的数据
    ///
    /// 仍被持有时触发致命断言。
    pub fn cleanup(self) -> T {
        assert!(!self.inner.is_locked(), "spinlock_cleanup: lock still held");
        self.inner.into_inner()
    }
}

/// 自旋锁守护（RAII）
///
/// 析构时先释放锁，再恢复中断。
pub struct SpinLockGuard<'a, T> {
    guard: ManuallyDrop<spin::MutexGuard<'a, T>>,
    irq_was_enabled: bool,
}

impl<T> Deref for SpinLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T> Drop for SpinLockGuard<'_, T> {
    fn drop(&mut self) {
        // SAFETY: guard 只在这里被释放一次，之后不再访问
        unsafe { ManuallyDrop::drop(&mut self.guard) };
        sched::irq_restore(self.irq_was_enabled);
    }
}
