//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!

//! 执行上下文 (Execution Context)
//!
//! 同步原语只需要调度器提供很少的东西：
//! - 当前线程的标识 (curthread)
//! - 当前是否处于中断处理程序中 (t_in_interrupt)
//! - 是否已经存在可调度的上下文 (CURCPU_EXISTS)
//! - 阻塞 / 唤醒一个线程
//! - 本地中断的保存与恢复
//!
//! 这些能力通过 [`Cpu`] trait 在启动时注册一次。调度策略本身不在这里。

#[cfg(any(test, feature = "std"))]
pub mod hosted;

use core::fmt;
use spin::Once;

/// 线程标识
///
/// 只是一个句柄，不持有线程本身。锁的 owner 字段保存的就是它。
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(usize);

impl ThreadId {
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tid {}", self.0)
    }
}

/// 调度器向同步原语暴露的接口
///
/// # 约定
/// - `unblock()` 如果先于对应的 `block()` 到达，不能丢失：下一次 `block()`
///   必须立即返回（park/unpark 令牌语义）
/// - `block()` 允许虚假返回，调用者总是在循环里重新检查条件
/// - `irq_save()` 关闭本地中断并返回之前是否开启
pub trait Cpu: Sync {
    /// 当前线程；`None` 表示还没有可调度的上下文（早期启动或关机阶段）
    fn current(&self) -> Option<ThreadId>;

    /// 当前是否在中断处理程序中
    fn in_interrupt(&self) -> bool;

    /// 让出 CPU，直到被 `unblock()`
    fn block(&self);

    /// 唤醒一个被 `block()` 的线程
    fn unblock(&self, thread: ThreadId);

    /// 关闭本地中断，返回之前的状态
    fn irq_save(&self) -> bool;

    /// 恢复 `irq_save()` 保存的中断状态
    fn irq_restore(&self, enabled: bool);
}

static CPU: Once<&'static dyn Cpu> = Once::new();

/// 注册执行上下文（只有第一次调用生效）
pub fn install(cpu: &'static dyn Cpu) {
    CPU.call_once(|| cpu);
}

fn cpu() -> Option<&'static dyn Cpu> {
    CPU.get().copied()
}

/// 获取当前线程
pub fn current() -> Option<ThreadId> {
    cpu().and_then(|cpu| cpu.current())
}

/// 是否已经存在可调度的上下文
pub fn cpu_exists() -> bool {
    current().is_some()
}

/// 当前是否处于中断处理程序中
pub fn in_interrupt() -> bool {
    cpu().map_or(false, |cpu| cpu.in_interrupt())
}

pub(crate) fn block() {
    match cpu() {
        Some(cpu) => cpu.block(),
        None => panic!("sched: block() before an execution context is installed"),
    }
}

pub(crate) fn unblock(thread: ThreadId) {
    if let Some(cpu) = cpu() {
        cpu.unblock(thread);
    }
}

pub(crate) fn irq_save() -> bool {
    cpu().map_or(false, |cpu| cpu.irq_save())
}

pub(crate) fn irq_restore(enabled: bool) {
    if let Some(cpu) = cpu() {
        cpu.irq_restore(enabled);
    }
}
