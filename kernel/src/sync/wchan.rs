//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 等待通道 (Wait Channel)
//!
//! 和 Linux 的等待队列 (`include/linux/wait.h`) 类似，但更简单：
//! - 每个等待通道只是一个按名字区分的睡眠者队列
//! - 等待通道本身不保护任何条件，条件由调用者的自旋锁保护
//! - `sleep()` 在释放调用者的自旋锁之前就已经入队，
//!   所以在"释放锁"和"真正睡眠"之间发出的唤醒不会丢失
//! - 唤醒操作要求出示同一把自旋锁的守护

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};
use log::trace;

use super::spinlock::SpinLockGuard;
use super::kstrdup;
use crate::config;
use crate::errno::Errno;
use crate::sched::{self, ThreadId};

/// 睡眠者
///
/// 入队时创建，唤醒者设置 `woken` 后再 unblock 对应线程。
struct Sleeper {
    thread: ThreadId,
    woken: AtomicBool,
}

impl Sleeper {
    fn new(thread: ThreadId) -> Self {
        Self {
            thread,
            woken: AtomicBool::new(false),
        }
    }

    fn is_woken(&self) -> bool {
        self.woken.load(Ordering::Acquire)
    }

    fn wake(&self) {
        self.woken.store(true, Ordering::Release);
        sched::unblock(self.thread);
    }
}

/// 等待通道
pub struct WaitChannel {
    name: String,
    /// 队首是等待最久的睡眠者
    queue: spin::Mutex<VecDeque<Arc<Sleeper>>>,
}

impl WaitChannel {
    /// 创建等待通道 (wchan_create)
    pub fn create(name: &str) -> Result<Self, Errno> {
        let name = kstrdup(name)?;
        let mut queue = VecDeque::new();
        queue
            .try_reserve(config::WCHAN_QUEUE_RESERVE)
            .map_err(|_| Errno::OutOfMemory)?;
        Ok(Self {
            name,
            queue: spin::Mutex::new(queue),
        })
    }

    /// 销毁等待通道 (wchan_destroy)
    ///
    /// 还有线程在上面睡眠时触发致命断言（见 `Drop`）。
    pub fn destroy(self) {
        trace!("wchan_destroy: {}", self.name);
        drop(self);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 当前睡眠者数量（快照）
    pub fn sleepers(&self) -> usize {
        self.queue.lock().len()
    }

    /// 释放 `guard` 并睡眠，直到被唤醒 (wchan_sleep)
    ///
    /// 返回时不持有任何锁，调用者需要自己重新获取并重新检查条件。
    pub fn sleep<T>(&self, guard: SpinLockGuard<'_, T>) {
        assert!(
            !sched::in_interrupt(),
            "wchan_sleep: {} called in interrupt handler",
            self.name
        );
        let thread = match sched::current() {
            Some(thread) => thread,
            None => panic!("wchan_sleep: {} without a thread context", self.name),
        };

        let sleeper = Arc::new(Sleeper::new(thread));
        self.queue.lock().push_back(Arc::clone(&sleeper));
        trace!("wchan_sleep: {} {}", self.name, thread);

        // 已经入队，此后的唤醒都能看到我们
        drop(guard);

        while !sleeper.is_woken() {
            sched::block();
        }
    }

    /// 唤醒等待最久的一个睡眠者 (wchan_wakeone)，没有睡眠者时什么也不做
    pub fn wake_one<T>(&self, _held: &SpinLockGuard<'_, T>) -> bool {
        let sleeper = self.queue.lock().pop_front();
        self.wake(sleeper)
    }

    /// 唤醒最近入队的一个睡眠者
    pub fn wake_newest<T>(&self, _held: &SpinLockGuard<'_, T>) -> bool {
        let sleeper = self.queue.lock().pop_back();
        self.wake(sleeper)
    }

    /// 按入队顺序唤醒所有睡眠者 (wchan_wakeall)，返回唤醒数量
    pub fn wake_all<T>(&self, _held: &SpinLockGuard<'_, T>) -> usize {
        let mut queue = self.queue.lock();
        let mut awakened = 0;
        while let Some(sleeper) = queue.pop_front() {
            trace!("wchan_wake: {} {}", self.name, sleeper.thread);
            sleeper.wake();
            awakened += 1;
        }
        awakened
    }

    fn wake(&self, sleeper: Option<Arc<Sleeper>>) -> bool {
        match sleeper {
            Some(sleeper) => {
                trace!("wchan_wake: {} {}", self.name, sleeper.thread);
                sleeper.wake();
                true
            }
            None => false,
        }
    }
}

impl Drop for WaitChannel {
    fn drop(&mut self) {
        let sleepers = self.queue.get_mut().len();
        assert!(
            sleepers == 0,
            "wchan_destroy: {} still has {} sleepers",
            self.name,
            sleepers
        );
    }
}
