//! 单元测试模块
//!
//! 在宿主机上运行：执行上下文由 `sched::hosted` 提供，内核线程就是 std 线程。
//!
//! 运行测试：
//! ```bash
//! cargo test --package rux-synch
//! ```
//!
//! "某个线程已经阻塞"通过轮询各原语的 `waiters()` 快照来判断，不靠 sleep。

use std::thread;
use std::time::{Duration, Instant};

mod errno;
mod lock;

/// 每个测试开始前调用；注册只生效一次
pub(crate) fn setup() {
    crate::sched::hosted::init();
}

/// 等待条件成立，超时则测试失败
pub(crate) fn wait_until(what: &str, mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !cond() {
        assert!(Instant::now() < deadline, "test: timed out waiting for {}", what);
        thread::yield_now();
    }
}
