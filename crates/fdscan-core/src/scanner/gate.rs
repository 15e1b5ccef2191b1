/// One-shot readiness gate that also hands the sealed value to readers.
///
/// The producer seals exactly once; every reader blocks in [`ReadyGate::wait`]
/// until that happens and then never blocks again. Sealing publishes the
/// value under the gate mutex before the condvar broadcast, so a reader that
/// observes the gate open also observes the complete value.
use parking_lot::{Condvar, Mutex};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

pub struct ReadyGate<T> {
    value: OnceLock<T>,
    lock: Mutex<()>,
    ready: Condvar,
}

impl<T> Default for ReadyGate<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ReadyGate<T> {
    pub fn new() -> Self {
        Self {
            value: OnceLock::new(),
            lock: Mutex::new(()),
            ready: Condvar::new(),
        }
    }

    /// Publish `value` and wake every waiter.
    ///
    /// Only the first call has any effect; later calls return `false` and
    /// drop their value.
    pub fn seal(&self, value: T) -> bool {
        let _guard = self.lock.lock();
        if self.value.set(value).is_err() {
            return false;
        }
        self.ready.notify_all();
        true
    }

    pub fn is_sealed(&self) -> bool {
        self.value.get().is_some()
    }

    /// The sealed value, without blocking.
    pub fn try_get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Block until sealed, then return the value.
    pub fn wait(&self) -> &T {
        if let Some(value) = self.value.get() {
            return value;
        }
        let mut guard = self.lock.lock();
        loop {
            if let Some(value) = self.value.get() {
                return value;
            }
            self.ready.wait(&mut guard);
        }
    }

    /// Block for at most `timeout`. `None` if the gate is still pending.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<&T> {
        if let Some(value) = self.value.get() {
            return Some(value);
        }
        let deadline = Instant::now() + timeout;
        let mut guard = self.lock.lock();
        loop {
            if let Some(value) = self.value.get() {
                return Some(value);
            }
            if self.ready.wait_until(&mut guard, deadline).timed_out() {
                return self.value.get();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_first_seal_wins() {
        let gate = ReadyGate::new();
        assert!(!gate.is_sealed());
        assert!(gate.try_get().is_none());

        assert!(gate.seal(1));
        assert!(!gate.seal(2));
        assert_eq!(*gate.wait(), 1);
        assert_eq!(gate.try_get(), Some(&1));
    }

    #[test]
    fn test_waiters_block_until_sealed() {
        let gate = Arc::new(ReadyGate::<Vec<u32>>::new());

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let gate = Arc::clone(&gate);
                thread::spawn(move || gate.wait().clone())
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        assert!(!gate.is_sealed());
        gate.seal(vec![1, 2, 3]);

        for reader in readers {
            assert_eq!(reader.join().unwrap(), vec![1, 2, 3]);
        }
    }

    #[test]
    fn test_wait_timeout() {
        let gate = ReadyGate::<u8>::new();
        assert!(gate.wait_timeout(Duration::from_millis(20)).is_none());
        gate.seal(7);
        assert_eq!(gate.wait_timeout(Duration::from_millis(20)), Some(&7));
    }
}
