//! A pool kept in thread-local storage is torn down together with the thread.
//!
//! This runs in its own test binary because the interesting part happens while a thread exits,
//! after the pool's own metrics events may already have been destroyed.

use std::cell::RefCell;
use std::sync::{Arc, Mutex};
use std::thread;

use object_pool::RawObjectPool;

type DropLog = Arc<Mutex<Vec<String>>>;

struct Tracked {
    name: String,
    log: DropLog,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.log.lock().unwrap().push(self.name.clone());
    }
}

thread_local! {
    static SCOPE_POOL: RefCell<RawObjectPool> = RefCell::new(RawObjectPool::new());
}

#[test]
fn thread_local_pool_is_destroyed_on_thread_exit() {
    let log: DropLog = Arc::new(Mutex::new(Vec::new()));

    let thread_log = Arc::clone(&log);
    thread::spawn(move || {
        SCOPE_POOL.with(|pool| {
            let mut pool = pool.borrow_mut();

            pool.insert(Tracked {
                name: "cleared".to_string(),
                log: Arc::clone(&thread_log),
            });
            pool.clear();

            // Still owned when the thread exits.
            pool.insert(Tracked {
                name: "torn down with thread".to_string(),
                log: thread_log,
            });
        });
    })
    .join()
    .expect("thread completed successfully");

    assert_eq!(
        *log.lock().unwrap(),
        ["cleared", "torn down with thread"]
    );
}
