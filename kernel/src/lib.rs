//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!

//! Rux 内核同步原语
//!
//! 位于调度器的睡眠 / 唤醒机制之上，是文件系统、虚拟内存和设备驱动
//! 在并发下保持正确的基础：
//! - [`sync::Semaphore`] - 计数信号量
//! - [`sync::Lock`] - 记录持有者的睡眠锁
//! - [`sync::ConditionVariable`] - 条件变量
//!
//! 调度器通过 [`sched::Cpu`] 接入；宿主机上（测试或 `std` 特性）由
//! [`sched::hosted`] 提供基于 `std::thread` 的实现。
//!
//! 错误分两类：创建时内存不足返回 [`errno::Errno`]；
//! 其余不变量被破坏一律是致命断言（panic）。

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod config;
pub mod errno;
pub mod sched;
pub mod sync;

#[cfg(test)]
mod tests;

pub use errno::Errno;
pub use sync::{ConditionVariable, Lock, LockGuard, Semaphore};
