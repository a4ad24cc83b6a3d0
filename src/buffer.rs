use crate::error::{PipelineError, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A fixed-capacity sliding window of the most recent values.
///
/// When full, a push evicts the single oldest value before appending, so the
/// buffer always holds the last `capacity` values in arrival order. Clones
/// share the same storage, which is how the writer and the flusher see one
/// buffer.
#[derive(Debug)]
pub struct RingBuffer {
    window: Arc<Mutex<VecDeque<i64>>>,
    capacity: usize,
    evicted_count: Arc<AtomicU64>,
}

impl Clone for RingBuffer {
    fn clone(&self) -> Self {
        Self {
            window: Arc::clone(&self.window),
            capacity: self.capacity,
            evicted_count: Arc::clone(&self.evicted_count),
        }
    }
}

impl RingBuffer {
    /// Create a new ring buffer holding at most `capacity` values
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(PipelineError::ConfigError(
                "ring buffer capacity must be at least 1".into(),
            ));
        }
        Ok(Self {
            window: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
            evicted_count: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Append a value, evicting the oldest one if the buffer is full
    pub fn push(&self, value: i64) {
        let mut window = self.window.lock();
        if window.len() == self.capacity {
            window.pop_front();
            self.evicted_count.fetch_add(1, Ordering::Relaxed);
        }
        window.push_back(value);
    }

    /// Take the current contents in arrival order and leave the buffer empty.
    ///
    /// Returns `None` when nothing was pushed since the last drain.
    pub fn drain(&self) -> Option<Vec<i64>> {
        let mut window = self.window.lock();
        if window.is_empty() {
            return None;
        }
        Some(window.drain(..).collect())
    }

    /// Get the current number of buffered values
    pub fn len(&self) -> usize {
        self.window.lock().len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.window.lock().is_empty()
    }

    /// Get the capacity of the buffer
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the utilization of the buffer as a percentage (0-100)
    pub fn utilization(&self) -> u32 {
        ((self.len() * 100) / self.capacity).min(100) as u32
    }

    /// Get the number of values overwritten by newer ones
    pub fn evicted_count(&self) -> u64 {
        self.evicted_count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_buffer_push_drain() {
        let buffer = RingBuffer::new(10).unwrap();
        buffer.push(42);
        assert_eq!(buffer.drain(), Some(vec![42]));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_capacity_overflow_keeps_latest() {
        let buffer = RingBuffer::new(3).unwrap();
        for i in 1..=5 {
            buffer.push(i);
        }
        assert_eq!(buffer.drain(), Some(vec![3, 4, 5]));
        assert_eq!(buffer.evicted_count(), 2);
    }

    #[test]
    fn test_empty_drain_is_none() {
        let buffer = RingBuffer::new(4).unwrap();
        assert_eq!(buffer.drain(), None);

        buffer.push(7);
        assert!(buffer.drain().is_some());
        assert_eq!(buffer.drain(), None);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            RingBuffer::new(0),
            Err(PipelineError::ConfigError(_))
        ));
    }

    #[test]
    fn test_buffer_utilization() {
        let buffer = RingBuffer::new(10).unwrap();
        for i in 0..5 {
            buffer.push(i);
        }
        assert_eq!(buffer.utilization(), 50);
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn test_clones_share_storage() {
        let writer = RingBuffer::new(4).unwrap();
        let drainer = writer.clone();
        writer.push(1);
        writer.push(2);
        assert_eq!(drainer.drain(), Some(vec![1, 2]));
        assert!(writer.is_empty());
    }

    #[test]
    fn test_concurrent_push_and_drain() {
        let buffer = RingBuffer::new(8).unwrap();
        let writer = buffer.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..1000 {
                writer.push(i);
            }
        });

        let mut drained = Vec::new();
        while !handle.is_finished() {
            if let Some(batch) = buffer.drain() {
                assert!(batch.len() <= 8);
                drained.extend(batch);
            }
        }
        handle.join().unwrap();
        if let Some(batch) = buffer.drain() {
            drained.extend(batch);
        }

        assert!(drained.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(drained.last(), Some(&999));
    }

    proptest! {
        #[test]
        fn prop_drain_returns_last_capacity_values(
            capacity in 1usize..16,
            values in proptest::collection::vec(any::<i64>(), 1..64),
        ) {
            let buffer = RingBuffer::new(capacity).unwrap();
            for &v in &values {
                buffer.push(v);
            }
            let start = values.len().saturating_sub(capacity);
            prop_assert_eq!(buffer.drain(), Some(values[start..].to_vec()));
            prop_assert_eq!(buffer.drain(), None);
        }
    }
}
