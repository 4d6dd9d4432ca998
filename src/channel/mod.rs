//! Blocking message channel with condition-variable wake-up.
//!
//! `PhaseChannel` is an unbounded queue shared by any number of senders and
//! receivers. Every value is handed to exactly one `receive` call
//! (competing consumers); it is not a broadcast.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Unbounded FIFO queue whose receivers block while it is empty.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
/// use stoplight::{Phase, PhaseChannel};
///
/// let channel = Arc::new(PhaseChannel::new());
///
/// let producer = {
///     let channel = Arc::clone(&channel);
///     thread::spawn(move || channel.send(Phase::Green))
/// };
///
/// assert_eq!(channel.receive(), Phase::Green);
/// producer.join().unwrap();
/// ```
#[derive(Debug)]
pub struct PhaseChannel<T> {
    queue: Mutex<VecDeque<T>>,
    available: Condvar,
}

impl<T> PhaseChannel<T> {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
        }
    }

    /// Append a value and wake one blocked receiver.
    ///
    /// Only waits for the internal lock; never fails.
    pub fn send(&self, value: T) {
        let mut queue = self.lock();
        queue.push_back(value);
        self.available.notify_one();
    }

    /// Remove the oldest value, blocking while the channel is empty.
    ///
    /// There is no timeout: if nothing is ever sent this never returns.
    pub fn receive(&self) -> T {
        let mut queue = self.lock();
        loop {
            if let Some(value) = queue.pop_front() {
                return value;
            }
            queue = self
                .available
                .wait(queue)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Remove the oldest value without blocking.
    pub fn try_receive(&self) -> Option<T> {
        self.lock().pop_front()
    }

    /// Like `receive`, but gives up after `timeout`.
    ///
    /// Returns `None` if the channel stayed empty for the whole timeout. A
    /// timeout too large to represent as a deadline waits like `receive`.
    pub fn receive_timeout(&self, timeout: Duration) -> Option<T> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Some(self.receive());
        };
        let mut queue = self.lock();
        loop {
            if let Some(value) = queue.pop_front() {
                return Some(value);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            // Spurious and stolen wake-ups fall through to the re-check above.
            let (guard, _) = self
                .available
                .wait_timeout(queue, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            queue = guard;
        }
    }

    /// Number of values sent but not yet received.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no values are waiting to be received.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for PhaseChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Phase;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn send_then_receive() {
        let channel = PhaseChannel::new();
        channel.send(Phase::Green);
        assert_eq!(channel.receive(), Phase::Green);
        assert!(channel.is_empty());
    }

    #[test]
    fn receive_is_fifo() {
        let channel = PhaseChannel::new();
        channel.send(1);
        channel.send(2);
        channel.send(3);

        assert_eq!(channel.len(), 3);
        assert_eq!(channel.receive(), 1);
        assert_eq!(channel.receive(), 2);
        assert_eq!(channel.receive(), 3);
    }

    #[test]
    fn try_receive_empty() {
        let channel = PhaseChannel::<Phase>::new();
        assert_eq!(channel.try_receive(), None);
    }

    #[test]
    fn receive_timeout_expires_when_empty() {
        let channel = PhaseChannel::<Phase>::new();
        let start = Instant::now();

        assert_eq!(channel.receive_timeout(Duration::from_millis(30)), None);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn receive_timeout_accepts_unbounded_timeout() {
        let channel = Arc::new(PhaseChannel::new());
        channel.send(Phase::Red);
        assert_eq!(channel.receive_timeout(Duration::MAX), Some(Phase::Red));

        let receiver = {
            let channel = Arc::clone(&channel);
            thread::spawn(move || channel.receive_timeout(Duration::MAX))
        };
        thread::sleep(Duration::from_millis(20));
        channel.send(Phase::Green);
        assert_eq!(receiver.join().unwrap(), Some(Phase::Green));
    }

    #[test]
    fn receive_blocks_until_send() {
        let channel = Arc::new(PhaseChannel::new());

        let receiver = {
            let channel = Arc::clone(&channel);
            thread::spawn(move || channel.receive())
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!receiver.is_finished());

        channel.send(Phase::Green);
        assert_eq!(receiver.join().unwrap(), Phase::Green);
    }

    #[test]
    fn single_value_goes_to_single_receiver() {
        let channel = Arc::new(PhaseChannel::new());
        channel.send(Phase::Green);

        let receivers: Vec<_> = (0..2)
            .map(|_| {
                let channel = Arc::clone(&channel);
                thread::spawn(move || channel.receive_timeout(Duration::from_millis(100)))
            })
            .collect();

        let results: Vec<_> = receivers.into_iter().map(|h| h.join().unwrap()).collect();
        let delivered = results.iter().filter(|r| r.is_some()).count();

        assert_eq!(delivered, 1);
        assert!(results.contains(&Some(Phase::Green)));
    }

    #[test]
    fn concurrent_senders_lose_nothing() {
        let channel = Arc::new(PhaseChannel::new());

        let senders: Vec<_> = (0..4u32)
            .map(|t| {
                let channel = Arc::clone(&channel);
                thread::spawn(move || {
                    for i in 0..100 {
                        channel.send(t * 100 + i);
                    }
                })
            })
            .collect();

        let mut received: Vec<u32> = (0..400).map(|_| channel.receive()).collect();
        for sender in senders {
            sender.join().unwrap();
        }

        received.sort_unstable();
        assert_eq!(received, (0..400).collect::<Vec<_>>());
        assert!(channel.is_empty());
    }
}
