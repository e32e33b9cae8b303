//! Poison-recovering lock helpers
//!
//! A panic while a store lock is held leaves the guarded data in the state of
//! the last completed statement, so the stores keep going instead of failing
//! every later call.

use std::sync::{LockResult, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

fn recover<G>(result: LockResult<G>, lock: &str) -> G {
    result.unwrap_or_else(|poisoned| {
        log::warn!("{lock} was poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Extension trait for Mutex with poison recovery
pub(crate) trait MutexExt<T> {
    fn lock_recovered(&self) -> MutexGuard<'_, T>;
}

/// Extension trait for RwLock with poison recovery
pub(crate) trait RwLockExt<T> {
    fn read_recovered(&self) -> RwLockReadGuard<'_, T>;

    fn write_recovered(&self) -> RwLockWriteGuard<'_, T>;
}

impl<T> MutexExt<T> for Mutex<T> {
    fn lock_recovered(&self) -> MutexGuard<'_, T> {
        recover(self.lock(), "Mutex")
    }
}

impl<T> RwLockExt<T> for RwLock<T> {
    fn read_recovered(&self) -> RwLockReadGuard<'_, T> {
        recover(self.read(), "RwLock (read)")
    }

    fn write_recovered(&self) -> RwLockWriteGuard<'_, T> {
        recover(self.write(), "RwLock (write)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_lock_recovers_after_panic() {
        let lock = Arc::new(Mutex::new(1));
        let poisoner = Arc::clone(&lock);

        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(lock.is_poisoned());
        *lock.lock_recovered() += 1;
        assert_eq!(*lock.lock_recovered(), 2);
    }

    #[test]
    fn test_rwlock_recovers_after_panic() {
        let lock = Arc::new(RwLock::new(vec![1]));
        let poisoner = Arc::clone(&lock);

        let _ = thread::spawn(move || {
            let _guard = poisoner.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        lock.write_recovered().push(2);
        assert_eq!(*lock.read_recovered(), vec![1, 2]);
    }
}
