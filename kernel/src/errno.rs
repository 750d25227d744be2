//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 同步原语使用的错误代码
//!
//! 编号和 include/uapi/asm-generic/errno-base.h 保持一致。
//! 只有可恢复的失败才走这里；不变量被破坏一律是致命断言。

use core::fmt;

/// 标准错误代码
///
/// 使用方法：
/// ```rust
/// use rux_synch::errno::Errno;
///
/// fn reserve() -> Result<(), Errno> {
///     Err(Errno::OutOfMemory)
/// }
/// assert_eq!(reserve().unwrap_err().as_neg_i32(), -12);
/// ```
#[repr(i32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Errno {
    /// Try again (EAGAIN, 11)
    TryAgain = 11,

    /// Out of memory (ENOMEM, 12)
    OutOfMemory = 12,

    /// Device or resource busy (EBUSY, 16)
    DeviceOrResourceBusy = 16,
}

impl Errno {
    /// 获取错误代码的正数值（用于比较）
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// 获取错误代码的负数值（用于系统调用返回）
    #[inline]
    pub const fn as_neg_i32(self) -> i32 {
        -(self as i32)
    }

    /// 错误名称
    pub const fn name(self) -> &'static str {
        match self {
            Errno::TryAgain => "EAGAIN",
            Errno::OutOfMemory => "ENOMEM",
            Errno::DeviceOrResourceBusy => "EBUSY",
        }
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_i32())
    }
}

/// 原始错误码常量
pub const EAGAIN: i32 = Errno::TryAgain.as_i32();
pub const ENOMEM: i32 = Errno::OutOfMemory.as_i32();
pub const EBUSY: i32 = Errno::DeviceOrResourceBusy.as_i32();
