// 测试：睡眠锁
//
// 1. 创建时未锁定，获取后记录持有者
// 2. A 持锁，B 阻塞；A 释放后 B 获得锁，held_by_current 只对 B 为真
// 3. 多线程下的互斥
// 4. try_acquire / guard
// 5. release 不检查持有者（保留的行为）
// 6. 中断上下文中获取锁是致命错误
// 7. 线程局部变量析构时仍然可以释放锁

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use super::{setup, wait_until};
use crate::errno::Errno;
use crate::sched::{self, hosted};
use crate::sync::Lock;

fn destroy_shared(lock: Arc<Lock>) {
    match Arc::try_unwrap(lock) {
        Ok(lock) => lock.destroy(),
        Err(_) => panic!("test: lock still shared"),
    }
}

#[test]
fn test_create_unlocked() {
    setup();
    let lock = Lock::create("vnode").unwrap();
    assert_eq!(lock.name(), "vnode");
    assert_eq!(lock.owner(), None);
    assert!(!lock.held_by_current());
    assert_eq!(lock.waiters(), 0);
    lock.destroy();
}

#[test]
fn test_lock_ids_are_unique() {
    setup();
    let a = Lock::create("a").unwrap();
    let b = Lock::create("b").unwrap();
    assert_ne!(a.id(), b.id());
    a.destroy();
    b.destroy();
}

#[test]
fn test_acquire_release_tracks_owner() {
    setup();
    let lock = Lock::create("owner").unwrap();

    lock.acquire();
    assert!(lock.held_by_current());
    assert_eq!(lock.owner(), sched::current());

    lock.release();
    assert!(!lock.held_by_current());
    assert_eq!(lock.owner(), None);
    lock.destroy();
}

#[test]
fn test_handoff_between_threads() {
    setup();
    let lock = Arc::new(Lock::create("handoff").unwrap());
    let (acquired_tx, acquired_rx) = mpsc::channel();
    let (done_tx, done_rx) = mpsc::channel::<()>();

    // 线程 A（当前线程）先持有锁
    lock.acquire();

    let b = {
        let lock = Arc::clone(&lock);
        thread::spawn(move || {
            lock.acquire();
            acquired_tx
                .send((sched::current(), lock.held_by_current()))
                .unwrap();
            done_rx.recv().unwrap();
            lock.release();
        })
    };

    wait_until("B to block in acquire", || lock.waiters() == 1);
    assert!(lock.held_by_current());

    lock.release();
    let (b_tid, b_holds) = acquired_rx.recv().unwrap();
    assert!(b_holds, "B holds the lock after A releases it");
    assert!(!lock.held_by_current(), "A no longer holds the lock");
    assert_eq!(lock.owner(), b_tid);

    done_tx.send(()).unwrap();
    b.join().unwrap();
    assert_eq!(lock.owner(), None);
    destroy_shared(lock);
}

#[test]
fn test_mutual_exclusion() {
    setup();
    const THREADS: usize = 8;
    const ROUNDS: usize = 200;

    let lock = Arc::new(Lock::create("counter").unwrap());
    let inside = Arc::new(AtomicBool::new(false));
    let counter = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let lock = Arc::clone(&lock);
            let inside = Arc::clone(&inside);
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                for _ in 0..ROUNDS {
                    lock.acquire();
                    assert!(!inside.swap(true, Ordering::SeqCst), "two owners at once");
                    assert!(lock.held_by_current());

                    // 非原子的读-改-写，只有互斥成立时结果才正确
                    let value = counter.load(Ordering::Relaxed);
                    thread::yield_now();
                    counter.store(value + 1, Ordering::Relaxed);

                    inside.store(false, Ordering::SeqCst);
                    lock.release();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(counter.load(Ordering::SeqCst), THREADS * ROUNDS);
    assert_eq!(lock.waiters(), 0);
    destroy_shared(lock);
}

#[test]
fn test_try_acquire() {
    setup();
    let lock = Arc::new(Lock::create("try").unwrap());

    lock.acquire();
    let other = {
        let lock = Arc::clone(&lock);
        thread::spawn(move || lock.try_acquire())
    };
    assert_eq!(other.join().unwrap(), Err(Errno::DeviceOrResourceBusy));

    lock.release();
    assert_eq!(lock.try_acquire(), Ok(()));
    assert!(lock.held_by_current());
    lock.release();
    destroy_shared(lock);
}

#[test]
fn test_guard_releases_on_drop() {
    setup();
    let lock = Lock::create("guard").unwrap();
    {
        let guard = lock.guard();
        assert!(guard.lock().held_by_current());
    }
    assert_eq!(lock.owner(), None);
    lock.destroy();
}

#[test]
fn test_release_by_other_thread_clears_owner() {
    setup();
    let lock = Arc::new(Lock::create("foreign").unwrap());

    lock.acquire();
    {
        let lock = Arc::clone(&lock);
        thread::spawn(move || lock.release()).join().unwrap();
    }

    // release 不检查持有者，锁已经被清空
    assert_eq!(lock.owner(), None);
    assert!(!lock.held_by_current());
    destroy_shared(lock);
}

#[test]
#[should_panic(expected = "interrupt handler")]
fn test_acquire_in_interrupt_is_fatal() {
    setup();
    let lock = Lock::create("irq").unwrap();
    let _irq = hosted::enter_interrupt();
    lock.acquire();
}

#[test]
fn test_release_from_thread_local_destructor() {
    setup();

    /// 线程退出时释放锁
    struct ReleaseOnExit(Arc<Lock>);

    impl Drop for ReleaseOnExit {
        fn drop(&mut self) {
            // 线程局部状态可能已经销毁，查询不能 panic
            assert!(!sched::in_interrupt());
            self.0.release();
        }
    }

    std::thread_local! {
        static HELD: RefCell<Option<ReleaseOnExit>> = const { RefCell::new(None) };
    }

    let lock = Arc::new(Lock::create("tls").unwrap());
    {
        let lock = Arc::clone(&lock);
        thread::spawn(move || {
            lock.acquire();
            HELD.with(|held| *held.borrow_mut() = Some(ReleaseOnExit(lock)));
        })
        .join()
        .unwrap();
    }

    assert_eq!(lock.owner(), None);
    destroy_shared(lock);
}
