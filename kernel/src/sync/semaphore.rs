//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 信号量 (Semaphore) 机制
//!
//! 核心概念：
//! - 信号量是一个非负整数，由自旋锁保护
//! - P 操作 (down): 值为 0 时在等待通道上睡眠，否则减 1
//! - V 操作 (up): 值加 1，唤醒一个等待者
//!
//! 不保证 FIFO：刚到达的线程可能比已经等待很久的线程先拿到信号量。

use alloc::string::String;
use log::debug;

use super::kstrdup;
use super::spinlock::SpinLock;
use super::wchan::WaitChannel;
use crate::errno::Errno;
use crate::sched;

/// 计数信号量
///
/// # 示例
/// ```
/// use rux_synch::sync::Semaphore;
///
/// let sem = Semaphore::create("pool", 2).unwrap();
/// sem.down();
/// sem.down();
/// assert!(sem.try_down().is_err());
/// sem.up();
/// sem.up();
/// sem.destroy();
/// ```
pub struct Semaphore {
    name: String,
    wchan: WaitChannel,
    /// 信号量计数值，只在持有自旋锁时修改
    count: SpinLock<u32>,
}

impl Semaphore {
    /// 创建信号量 (sem_create)
    ///
    /// # 参数
    /// * `name` - 调试用名字，会被复制
    /// * `initial_count` - 初始值
    ///
    /// # 返回
    /// 内存不足时返回 `Errno::OutOfMemory`，已分配的资源随之释放
    pub fn create(name: &str, initial_count: u32) -> Result<Self, Errno> {
        let name = kstrdup(name)?;
        let wchan = WaitChannel::create(&name)?;
        debug!("sem_create: {} count={}", name, initial_count);
        Ok(Self {
            name,
            wchan,
            count: SpinLock::new(initial_count),
        })
    }

    /// 销毁信号量 (sem_destroy)
    ///
    /// 还有线程在等待时，等待通道的销毁会触发致命断言。
    pub fn destroy(self) {
        let Self { name, wchan, count } = self;
        count.cleanup();
        wchan.destroy();
        debug!("sem_destroy: {}", name);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// P 操作
    ///
    /// 不能在中断处理程序中调用；即使不需要阻塞也会检查。
    pub fn down(&self) {
        assert!(
            !sched::in_interrupt(),
            "P: {} called in interrupt handler",
            self.name
        );

        let mut count = self.count.lock();
        while *count == 0 {
            // 醒来时别人可能已经把值拿走了，必须重新检查
            self.wchan.sleep(count);
            count = self.count.lock();
        }
        *count -= 1;
    }

    /// V 操作
    ///
    /// 从不阻塞。计数溢出是致命错误。
    pub fn up(&self) {
        let mut count = self.count.lock();
        *count = match count.checked_add(1) {
            Some(next) => next,
            None => panic!("V: {} count overflow", self.name),
        };
        self.wchan.wake_one(&count);
    }

    /// `down()` 的别名
    #[inline]
    pub fn p(&self) {
        self.down();
    }

    /// `up()` 的别名
    #[inline]
    pub fn v(&self) {
        self.up();
    }

    /// 尝试 P 操作（非阻塞）
    ///
    /// # 返回
    /// - `Ok(())` - 成功获取信号量
    /// - `Err(Errno::TryAgain)` - 当前值为 0
    pub fn try_down(&self) -> Result<(), Errno> {
        let mut count = self.count.lock();
        if *count == 0 {
            return Err(Errno::TryAgain);
        }
        *count -= 1;
        Ok(())
    }

    /// 当前值（仅供参考，调用后可能立即改变）
    pub fn count(&self) -> u32 {
        *self.count.lock()
    }

    /// 正在等待的线程数（仅供参考）
    pub fn waiters(&self) -> usize {
        self.wchan.sleepers()
    }
}
