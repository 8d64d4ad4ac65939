//! # Receive buffering
//!
//! All bytes arriving from the module pass through a fixed-capacity FIFO.
//! The receive interrupt is the single producer, the consumer loop
//! ([poll](crate::adapter::Adapter::poll)) the single consumer. Both sides go
//! through [RxQueue], which bounds the interrupt-masked window to one O(1)
//! push or pop.
use core::cell::RefCell;
use critical_section::Mutex;

/// Fixed-capacity byte FIFO.
///
/// Overflow policy is drop-newest: a push onto a full buffer leaves the
/// buffer untouched and returns `false`. Dropping the newest byte corrupts at
/// most the frame currently in flight, while evicting the oldest byte would
/// corrupt the framing of data already queued.
pub struct RingBuffer<const N: usize> {
    buffer: [u8; N],

    /// Index of the next byte to pop
    read: usize,

    /// Index of the next free slot
    write: usize,

    /// Number of buffered bytes, never exceeds N
    used: usize,
}

impl<const N: usize> RingBuffer<N> {
    pub const fn new() -> Self {
        Self {
            buffer: [0; N],
            read: 0,
            write: 0,
            used: 0,
        }
    }

    /// Appends a byte. Returns false if the buffer is full (byte dropped).
    pub fn push(&mut self, byte: u8) -> bool {
        if self.used == N {
            return false;
        }

        self.buffer[self.write] = byte;
        self.write = (self.write + 1) % N;
        self.used += 1;
        true
    }

    /// Pops the oldest byte, if any.
    pub fn pop(&mut self) -> Option<u8> {
        if self.used == 0 {
            return None;
        }

        let byte = self.buffer[self.read];
        self.read = (self.read + 1) % N;
        self.used -= 1;
        Some(byte)
    }

    /// Number of buffered bytes
    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Interrupt-safe single-producer/single-consumer wrapper around [RingBuffer].
///
/// `const fn new()` allows placing the queue in a `static`, so the receive
/// interrupt and the adapter can share it by reference:
///
/// ````
/// use spwf_at_core::buffer::RxQueue;
///
/// static QUEUE: RxQueue<512> = RxQueue::new();
///
/// // Interrupt context:
/// QUEUE.push(b'\r');
///
/// // Consumer context:
/// assert_eq!(Some(b'\r'), QUEUE.pop());
/// ````
pub struct RxQueue<const N: usize> {
    inner: Mutex<RefCell<RingBuffer<N>>>,
}

impl<const N: usize> RxQueue<N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(RingBuffer::new())),
        }
    }

    /// Appends a received byte. Safe to call from the receive interrupt.
    ///
    /// Returns false if the queue is full, in which case the byte is dropped
    /// (see [RingBuffer] for the overflow policy).
    pub fn push(&self, byte: u8) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).push(byte))
    }

    /// Pops the oldest buffered byte.
    pub fn pop(&self) -> Option<u8> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).pop())
    }

    /// Number of buffered bytes
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow_ref(cs).len())
    }

    pub fn is_empty(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref(cs).is_empty())
    }
}

impl<const N: usize> Default for RxQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
