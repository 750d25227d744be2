//! Rux 同步原语配置（自动生成）
//!
//! 此文件由 build.rs 根据 Kernel.toml 自动生成，请勿手动修改

// ============================================================
// 同步原语配置
// ============================================================

/// 条件变量同时记录的等待者上限
pub const CV_MAX_WAITERS: usize = 64;

/// 每个等待通道创建时预留的睡眠者槽位
pub const WCHAN_QUEUE_RESERVE: usize = 4;
