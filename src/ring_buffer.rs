use crate::error::MinimizerError;

/// Fixed-capacity FIFO buffer.
///
/// Slots are allocated once; when the buffer is full a push overwrites the
/// oldest entry in place, so push and evict are O(1). Logical index 0 is the
/// oldest entry and `len() - 1` the most recent.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    buf: Vec<T>,
    head: usize,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Result<Self, MinimizerError> {
        if capacity == 0 {
            return Err(MinimizerError::InvalidParameters(
                "ring buffer capacity must be positive".to_string(),
            ));
        }
        Ok(RingBuffer {
            buf: Vec::with_capacity(capacity),
            head: 0,
            capacity,
        })
    }

    /// Append `value`, returning the evicted oldest entry if the buffer was full.
    pub fn push(&mut self, value: T) -> Option<T> {
        if self.buf.len() < self.capacity {
            self.buf.push(value);
            return None;
        }
        let evicted = std::mem::replace(&mut self.buf[self.head], value);
        self.head = (self.head + 1) % self.capacity;
        Some(evicted)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buf.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.buf.len() {
            return None;
        }
        Some(&self.buf[(self.head + index) % self.buf.len()])
    }

    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn last(&self) -> Option<&T> {
        self.buf.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Iterate from oldest to most recent.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        let len = self.buf.len();
        (0..len).map(move |i| &self.buf[(self.head + i) % len])
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.head = 0;
    }
}

impl<T> std::ops::Index<usize> for RingBuffer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!(
                "index {} out of bounds for ring buffer of length {}",
                index,
                self.len()
            ),
        }
    }
}
