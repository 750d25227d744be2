//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 睡眠锁 (Lock)
//!
//! 和信号量结构相同，但记录的是持有者线程而不是计数：
//! - 锁不是二值信号量：它知道谁持有自己，因此可以回答 `held_by_current()`
//! - 锁不是自旋锁：拿不到时在等待通道上睡眠，让出 CPU
//! - 不可重入：同一线程重复获取会永远等待自己

use alloc::string::String;
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};
use log::{debug, warn};

use super::kstrdup;
use super::spinlock::SpinLock;
use super::wchan::WaitChannel;
use crate::errno::Errno;
use crate::sched::{self, ThreadId};

/// 锁标识
///
/// 条件变量用它记录等待者释放的是哪一把锁，而不持有锁本身。
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LockId(usize);

impl fmt::Display for LockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lock#{}", self.0)
    }
}

static NEXT_LOCK_ID: AtomicUsize = AtomicUsize::new(1);

/// 睡眠锁
pub struct Lock {
    id: LockId,
    name: String,
    wchan: WaitChannel,
    /// 持有者，只在持有自旋锁时读写
    owner: SpinLock<Option<ThreadId>>,
}

impl Lock {
    /// 创建锁 (lock_create)，初始为未锁定
    pub fn create(name: &str) -> Result<Self, Errno> {
        let name = kstrdup(name)?;
        let wchan = WaitChannel::create(&name)?;
        let id = LockId(NEXT_LOCK_ID.fetch_add(1, Ordering::Relaxed));
        debug!("lock_create: {} ({})", name, id);
        Ok(Self {
            id,
            name,
            wchan,
            owner: SpinLock::new(None),
        })
    }

    /// 销毁锁 (lock_destroy)
    ///
    /// 还有线程在等待时触发致命断言。
    pub fn destroy(self) {
        let Self {
            id,
            name,
            wchan,
            owner,
        } = self;
        owner.cleanup();
        wchan.destroy();
        debug!("lock_destroy: {} ({})", name, id);
    }

    pub fn id(&self) -> LockId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 获取锁 (lock_acquire)
    ///
    /// 不能在中断处理程序中调用。锁被占用时睡眠，醒来后重新检查：
    /// 在唤醒和检查之间锁可能已经被其他线程拿走。
    pub fn acquire(&self) {
        assert!(
            !sched::in_interrupt(),
            "lock_acquire: {} called in interrupt handler",
            self.name
        );
        let me = self.current_thread("lock_acquire");

        let mut owner = self.owner.lock();
        while owner.is_some() {
            self.wchan.sleep(owner);
            owner = self.owner.lock();
        }
        *owner = Some(me);
    }

    /// 释放锁 (lock_release)
    ///
    /// 不检查调用者是否持有锁，直接清空持有者并唤醒一个等待者。
    pub fn release(&self) {
        let mut owner = self.owner.lock();
        if let (Some(holder), Some(me)) = (*owner, sched::current()) {
            if holder != me {
                warn!("lock_release: {} held by {} released by {}", self.name, holder, me);
            }
        }
        *owner = None;
        self.wchan.wake_one(&owner);
    }

    /// 当前线程是否持有锁 (lock_do_i_hold)
    ///
    /// 还没有可调度的上下文时总是返回 true，早期启动阶段的断言不会误报。
    pub fn held_by_current(&self) -> bool {
        match sched::current() {
            Some(me) => *self.owner.lock() == Some(me),
            None => true,
        }
    }

    /// 尝试获取锁（非阻塞）
    ///
    /// # 返回
    /// - `Ok(())` - 成功获取锁
    /// - `Err(Errno::DeviceOrResourceBusy)` - 锁已被占用
    pub fn try_acquire(&self) -> Result<(), Errno> {
        let me = self.current_thread("lock_try_acquire");
        let mut owner = self.owner.lock();
        if owner.is_some() {
            return Err(Errno::DeviceOrResourceBusy);
        }
        *owner = Some(me);
        Ok(())
    }

    /// 获取锁守护（RAII），离开作用域时自动释放
    pub fn guard(&self) -> LockGuard<'_> {
        self.acquire();
        LockGuard { lock: self }
    }

    /// 当前持有者（快照）
    pub fn owner(&self) -> Option<ThreadId> {
        *self.owner.lock()
    }

    /// 正在等待的线程数（快照）
    pub fn waiters(&self) -> usize {
        self.wchan.sleepers()
    }

    fn current_thread(&self, op: &str) -> ThreadId {
        match sched::current() {
            Some(me) => me,
            None => panic!("{}: {} without a thread context", op, self.name),
        }
    }
}

/// 锁守护（RAII）
///
/// # 示例
/// ```no_run
/// # use rux_synch::sync::Lock;
/// # fn test(lock: &Lock) {
/// {
///     let _guard = lock.guard();
///     // ... 临界区 ...
/// } // 自动释放锁
/// # }
/// ```
pub struct LockGuard<'a> {
    lock: &'a Lock,
}

impl LockGuard<'_> {
    /// 守护对应的锁，可以交给条件变量
    pub fn lock(&self) -> &Lock {
        self.lock
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}
