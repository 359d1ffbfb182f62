//! Bounded blocking transfer queue between the generation thread and the
//! delivery loop.
//!
//! Blocking waits are interruptible per side. An interrupt is a one-shot
//! flag: it makes the next (or current) blocking call on that side fail and
//! is consumed by doing so. `put` hands the rejected item back, so an
//! interrupted producer never loses audio without knowing.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::cancel::Interrupt;
use crate::error::StreamError;

/// One event travelling from generation to delivery.
pub enum QueueItem {
    /// PCM16 little-endian mono audio; only `bytes[..length]` is valid.
    Data { bytes: Vec<u8>, length: usize },
    /// Generation finished normally. Nothing follows.
    End,
    /// Generation failed. Nothing follows.
    Error(StreamError),
}

impl QueueItem {
    /// Wrap a whole buffer as a [`QueueItem::Data`].
    pub fn data(bytes: Vec<u8>) -> Self {
        let length = bytes.len();
        Self::Data { bytes, length }
    }

    /// `true` for `End` and `Error`.
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Data { .. })
    }
}

impl fmt::Debug for QueueItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data { length, .. } => f.debug_struct("Data").field("length", length).finish(),
            Self::End => f.write_str("End"),
            Self::Error(cause) => f.debug_tuple("Error").field(cause).finish(),
        }
    }
}

/// A blocking `put` was interrupted; the item is returned untouched.
pub struct PutInterrupted<T>(pub T);

impl<T> PutInterrupted<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for PutInterrupted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PutInterrupted { .. }")
    }
}

impl<T> fmt::Display for PutInterrupted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("queue put interrupted")
    }
}

impl<T> std::error::Error for PutInterrupted<T> {}

/// A blocking `take` was interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("queue take interrupted")]
pub struct TakeInterrupted;

struct State<T> {
    items: VecDeque<T>,
    producer_interrupted: bool,
    consumer_interrupted: bool,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

/// Bounded FIFO with interruptible blocking `put`/`take`.
///
/// Cloning yields another handle to the same queue.
pub struct TransferQueue<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for TransferQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for TransferQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferQueue")
            .field("capacity", &self.shared.capacity)
            .field("len", &self.len())
            .finish()
    }
}

impl<T> TransferQueue<T> {
    /// Create a queue holding at most `capacity` items (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    items: VecDeque::with_capacity(capacity),
                    producer_interrupted: false,
                    consumer_interrupted: false,
                }),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
                capacity,
            }),
        }
    }

    // Every mutation is a single push, pop or flag write, so the state is
    // consistent even if a holder panicked.
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Append `item`, blocking while the queue is full.
    pub fn put(&self, item: T) -> Result<(), PutInterrupted<T>> {
        let mut state = self.lock();
        loop {
            if state.producer_interrupted {
                state.producer_interrupted = false;
                return Err(PutInterrupted(item));
            }
            if state.items.len() < self.shared.capacity {
                state.items.push_back(item);
                drop(state);
                self.shared.not_empty.notify_one();
                return Ok(());
            }
            state = self
                .shared
                .not_full
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Remove the oldest item, blocking while the queue is empty.
    pub fn take(&self) -> Result<T, TakeInterrupted> {
        let mut state = self.lock();
        loop {
            if state.consumer_interrupted {
                state.consumer_interrupted = false;
                return Err(TakeInterrupted);
            }
            if let Some(item) = state.items.pop_front() {
                drop(state);
                self.shared.not_full.notify_one();
                return Ok(item);
            }
            state = self
                .shared
                .not_empty
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Remove the oldest item if one is ready. Never blocks and ignores
    /// pending interrupts.
    pub fn try_take(&self) -> Option<T> {
        let item = self.lock().items.pop_front();
        if item.is_some() {
            self.shared.not_full.notify_one();
        }
        item
    }

    /// Interrupt the producer side: a blocked or future `put` fails once.
    pub fn interrupt_producer(&self) {
        self.lock().producer_interrupted = true;
        self.shared.not_full.notify_all();
    }

    /// Interrupt the consumer side: a blocked or future `take` fails once.
    pub fn interrupt_consumer(&self) {
        self.lock().consumer_interrupted = true;
        self.shared.not_empty.notify_all();
    }
}

impl<T: Send> Interrupt for TransferQueue<T> {
    fn interrupt(&self) {
        self.interrupt_producer();
        self.interrupt_consumer();
    }
}
