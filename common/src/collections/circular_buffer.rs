//! Fixed-capacity byte ring.
//!
//! The buffer does no synchronization of its own. When a producer and a
//! consumer run in different contexts (an ISR and the foreground), the
//! caller must keep them mutually excluded, typically by masking the
//! interrupt source before touching the buffer from the foreground.

/// A ring of `N` bytes with independent read and write cursors.
///
/// All `N` slots are usable: the buffer reports full after exactly `N`
/// writes without an intervening read.
///
/// Invariant: `read < N`, `write < N`, `len <= N`, and
/// `write == (read + len) % N`.
pub struct CircularBuffer<const N: usize> {
    storage: [u8; N],
    read: usize,
    write: usize,
    len: usize,
}

impl<const N: usize> CircularBuffer<N> {
    /// An empty buffer with statically reserved storage.
    pub const fn new() -> Self {
        assert!(N > 0, "circular buffer capacity must be non-zero");
        Self {
            storage: [0; N],
            read: 0,
            write: 0,
            len: 0,
        }
    }

    /// Reset both cursors, discarding any queued bytes.
    pub fn init(&mut self) {
        self.read = 0;
        self.write = 0;
        self.len = 0;
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of queued bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Queue a byte.
    ///
    /// # Panics
    ///
    /// The caller must have checked [`is_full`](Self::is_full). Writing to
    /// a full buffer is a contract violation and panics.
    #[inline]
    pub fn write(&mut self, byte: u8) {
        assert!(!self.is_full(), "write to a full circular buffer");
        self.storage[self.write] = byte;
        self.write = (self.write + 1) % N;
        self.len += 1;
    }

    /// Take the oldest byte.
    ///
    /// # Panics
    ///
    /// The caller must have checked [`is_empty`](Self::is_empty). Reading
    /// from an empty buffer is a contract violation and panics.
    #[inline]
    pub fn read(&mut self) -> u8 {
        assert!(!self.is_empty(), "read from an empty circular buffer");
        let byte = self.storage[self.read];
        self.read = (self.read + 1) % N;
        self.len -= 1;
        byte
    }
}

impl<const N: usize> Default for CircularBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
