// 测试：调度器注册之前（早期启动阶段）的行为
//
// 这个测试程序从不注册执行上下文：
// 1. 没有当前线程，也不在中断上下文中
// 2. held_by_current 总是为真，条件变量的持锁断言不会误报
// 3. 不需要阻塞的信号量操作照常工作
// 4. 需要线程上下文的操作是致命错误

use rux_synch::sched;
use rux_synch::sync::{ConditionVariable, Lock, Semaphore};

#[test]
fn test_no_execution_context() {
    assert!(!sched::cpu_exists());
    assert_eq!(sched::current(), None);
    assert!(!sched::in_interrupt());
}

#[test]
fn test_held_by_current_without_context() {
    let lock = Lock::create("early").unwrap();
    assert!(lock.held_by_current());
    assert_eq!(lock.owner(), None);
    lock.destroy();
}

#[test]
fn test_cv_signal_and_broadcast_without_context() {
    let lock = Lock::create("early").unwrap();
    let cv = ConditionVariable::create("early-cv").unwrap();

    cv.signal(&lock);
    cv.broadcast(&lock);
    assert_eq!(cv.waiters(), 0);

    cv.destroy();
    lock.destroy();
}

#[test]
fn test_semaphore_without_context() {
    let sem = Semaphore::create("early-sem", 0).unwrap();
    sem.up();
    sem.down();
    assert_eq!(sem.count(), 0);
    sem.destroy();
}

#[test]
#[should_panic(expected = "without a thread context")]
fn test_acquire_without_context_is_fatal() {
    let lock = Lock::create("early").unwrap();
    lock.acquire();
}
