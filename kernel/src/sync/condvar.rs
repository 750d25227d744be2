//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 条件变量 (Condition Variable) 机制
//!
//! 核心概念：
//! - 必须与 [`Lock`] 配合使用，调用任何操作前都要持有该锁
//! - wait() 释放锁并睡眠，醒来后重新获取锁再返回
//! - signal() 唤醒最近开始等待的那个线程（LIFO）
//! - broadcast() 按开始等待的顺序唤醒所有线程
//!
//! 每次调用都把锁作为参数传入，所以条件变量为每个等待者记录它释放的是
//! 哪一把锁（[`LockId`]，只是句柄）。等待者列表和等待通道的队列在同一把
//! 自旋锁下同步增减，两者一一对应。
//!
//! 调用者在 wait() 返回后必须重新检查自己的条件。

use alloc::string::String;
use alloc::vec::Vec;
use log::{debug, trace, warn};

use super::kstrdup;
use super::lock::{Lock, LockId};
use super::spinlock::SpinLock;
use super::wchan::WaitChannel;
use crate::config;
use crate::errno::Errno;
use crate::sched;

/// 条件变量
///
/// # 使用示例
/// ```no_run
/// # use rux_synch::sync::{ConditionVariable, Lock};
/// # fn test(lock: &Lock, cv: &ConditionVariable, ready: &dyn Fn() -> bool) {
/// lock.acquire();
/// while !ready() {
///     cv.wait(lock);  // 释放锁并等待，返回时重新持有锁
/// }
/// // ... 临界区 ...
/// lock.release();
///
/// // 在另一个线程中：
/// lock.acquire();
/// // ... 修改条件 ...
/// cv.signal(lock);  // 或 broadcast()
/// lock.release();
/// # }
/// ```
pub struct ConditionVariable {
    name: String,
    wchan: WaitChannel,
    /// 等待者释放的锁，按开始等待的顺序排列
    waiters: SpinLock<Vec<LockId>>,
}

impl ConditionVariable {
    /// 创建条件变量 (cv_create)
    ///
    /// 等待者列表一次性预留到上限，wait() 不再分配内存。
    pub fn create(name: &str) -> Result<Self, Errno> {
        let name = kstrdup(name)?;
        let wchan = WaitChannel::create(&name)?;
        let mut waiters = Vec::new();
        waiters
            .try_reserve_exact(config::CV_MAX_WAITERS)
            .map_err(|_| Errno::OutOfMemory)?;
        debug!("cv_create: {}", name);
        Ok(Self {
            name,
            wchan,
            waiters: SpinLock::new(waiters),
        })
    }

    /// 销毁条件变量 (cv_destroy)
    ///
    /// 还有等待者时触发致命断言。
    pub fn destroy(self) {
        let Self {
            name,
            wchan,
            waiters,
        } = self;
        let waiters = waiters.cleanup();
        assert!(
            waiters.is_empty(),
            "cv_destroy: {} still has {} waiters",
            name,
            waiters.len()
        );
        wchan.destroy();
        debug!("cv_destroy: {}", name);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 等待 (cv_wait)
    ///
    /// # 行为
    /// 1. 在条件变量的自旋锁下记录 `lock`
    /// 2. 通过 `Lock::release()` 释放锁（会唤醒一个等待获取该锁的线程）
    /// 3. 把自旋锁交给等待通道，原子地入队并睡眠
    /// 4. 被唤醒后通过 `Lock::acquire()` 重新获取锁
    ///
    /// 记录和释放都发生在自旋锁内，之后的 signal/broadcast 一定能看到这个等待者。
    pub fn wait(&self, lock: &Lock) {
        assert!(
            !sched::in_interrupt(),
            "cv_wait: {} called in interrupt handler",
            self.name
        );
        assert!(
            lock.held_by_current(),
            "cv_wait: {} without holding {}",
            self.name,
            lock.name()
        );

        let mut waiters = self.waiters.lock();
        assert!(
            waiters.len() < config::CV_MAX_WAITERS,
            "cv_wait: {} has too many waiters",
            self.name
        );
        if waiters.iter().any(|&id| id != lock.id()) {
            warn!("cv_wait: {} used with more than one lock ({})", self.name, lock.id());
        }
        waiters.push(lock.id());

        lock.release();
        self.wchan.sleep(waiters);

        lock.acquire();
    }

    /// 唤醒最近开始等待的一个线程 (cv_signal)，没有等待者时什么也不做
    pub fn signal(&self, lock: &Lock) {
        assert!(
            lock.held_by_current(),
            "cv_signal: {} without holding {}",
            self.name,
            lock.name()
        );

        let mut waiters = self.waiters.lock();
        if let Some(parked_with) = waiters.pop() {
            trace!("cv_signal: {} wakes a waiter of {}", self.name, parked_with);
            let woken = self.wchan.wake_newest(&waiters);
            assert!(woken, "cv_signal: {} lost track of its waiters", self.name);
        }
    }

    /// 唤醒所有等待者 (cv_broadcast)
    pub fn broadcast(&self, lock: &Lock) {
        assert!(
            lock.held_by_current(),
            "cv_broadcast: {} without holding {}",
            self.name,
            lock.name()
        );

        let mut waiters = self.waiters.lock();
        let recorded = waiters.len();
        waiters.clear();
        let woken = self.wchan.wake_all(&waiters);
        assert_eq!(
            recorded, woken,
            "cv_broadcast: {} lost track of its waiters",
            self.name
        );
        if woken > 0 {
            trace!("cv_broadcast: {} woke {} waiters", self.name, woken);
        }
    }

    /// 当前等待者数量（快照）
    pub fn waiters(&self) -> usize {
        self.waiters.lock().len()
    }
}
