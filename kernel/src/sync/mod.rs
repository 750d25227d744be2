//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 同步原语 (Synchronization Primitives)
//!
//! 分层：
//! - [`SpinLock`]: 关中断的忙等锁，只保护很短的临界区
//! - [`WaitChannel`]: 睡眠 / 唤醒队列，和自旋锁配合实现"原子地释放并睡眠"
//! - [`Semaphore`]: 计数信号量，P 操作 (down) / V 操作 (up)
//! - [`Lock`]: 记录持有者的睡眠锁
//! - [`ConditionVariable`]: 与 [`Lock`] 配合使用的条件变量
//!
//! 可能阻塞的操作都不能在中断处理程序中调用，违反时触发致命断言。

pub mod condvar;
pub mod lock;
pub mod semaphore;
pub mod spinlock;
pub mod wchan;

pub use condvar::ConditionVariable;
pub use lock::{Lock, LockGuard, LockId};
pub use semaphore::Semaphore;
pub use spinlock::{SpinLock, SpinLockGuard};
pub use wchan::WaitChannel;

use alloc::string::String;

use crate::errno::Errno;

/// 复制调试名字 (kstrdup)，内存不足时返回 `Errno::OutOfMemory`
pub(crate) fn kstrdup(name: &str) -> Result<String, Errno> {
    let mut copy = String::new();
    copy.try_reserve_exact(name.len())
        .map_err(|_| Errno::OutOfMemory)?;
    copy.push_str(name);
    Ok(copy)
}
