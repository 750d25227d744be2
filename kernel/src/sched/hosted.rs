//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!

//! 宿主机执行上下文
//!
//! 用 `std::thread` 模拟内核线程：
//! - 线程标识在第一次使用时分配
//! - block/unblock 映射到 park/unpark（天然具备令牌语义）
//! - 中断开关和"中断上下文"标志都是线程局部的

extern crate std;

use core::cell::Cell;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::collections::BTreeMap;
use std::thread::{self, Thread};

use super::{Cpu, ThreadId};

static NEXT_TID: AtomicUsize = AtomicUsize::new(1);

/// 已注册线程表：ThreadId -> std 线程句柄
static THREADS: spin::Mutex<BTreeMap<ThreadId, Thread>> = spin::Mutex::new(BTreeMap::new());

/// 线程退出时从线程表中注销
struct Registration {
    tid: ThreadId,
}

impl Registration {
    fn register() -> Self {
        let tid = ThreadId::new(NEXT_TID.fetch_add(1, Ordering::Relaxed));
        THREADS.lock().insert(tid, thread::current());
        Self { tid }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        THREADS.lock().remove(&self.tid);
    }
}

std::thread_local! {
    static REGISTRATION: Registration = Registration::register();
    static IN_INTERRUPT: Cell<bool> = const { Cell::new(false) };
    static IRQ_ENABLED: Cell<bool> = const { Cell::new(true) };
}

/// 基于 std 线程的 [`Cpu`] 实现
#[derive(Debug)]
pub struct HostCpu;

impl Cpu for HostCpu {
    fn current(&self) -> Option<ThreadId> {
        REGISTRATION.try_with(|r| r.tid).ok()
    }

    fn in_interrupt(&self) -> bool {
        IN_INTERRUPT.try_with(Cell::get).unwrap_or(false)
    }

    fn block(&self) {
        thread::park();
    }

    fn unblock(&self, thread: ThreadId) {
        let handle = THREADS.lock().get(&thread).cloned();
        if let Some(handle) = handle {
            handle.unpark();
        }
    }

    fn irq_save(&self) -> bool {
        IRQ_ENABLED.try_with(|f| f.replace(false)).unwrap_or(false)
    }

    fn irq_restore(&self, enabled: bool) {
        let _ = IRQ_ENABLED.try_with(|f| f.set(enabled));
    }
}

static HOST_CPU: HostCpu = HostCpu;

/// 注册宿主机执行上下文
pub fn init() {
    super::install(&HOST_CPU);
}

/// 当前线程的本地中断是否开启
pub fn irqs_enabled() -> bool {
    IRQ_ENABLED.with(Cell::get)
}

/// 中断上下文作用域
///
/// 存活期间当前线程被视为在中断处理程序中执行。
#[derive(Debug)]
pub struct InterruptScope {
    was_in_interrupt: bool,
}

/// 进入（模拟的）中断处理程序
pub fn enter_interrupt() -> InterruptScope {
    InterruptScope {
        was_in_interrupt: IN_INTERRUPT.with(|f| f.replace(true)),
    }
}

impl Drop for InterruptScope {
    fn drop(&mut self) {
        let prev = self.was_in_interrupt;
        let _ = IN_INTERRUPT.try_with(|f| f.set(prev));
    }
}
