//! Per-utterance cancellation coordinator.
//!
//! ```text
//!   Idle ──activate──► Active ──complete──► Completed
//!     │                  ├──────cancel────► Cancelled
//!     └──────cancel──────┤
//!                        └──────fail──────► Failed
//! ```
//!
//! Terminal states are sticky. Whichever of `complete`, `fail` or `cancel`
//! wins the transition out of `Active` decides what the sink is told, which
//! is how a cancel racing a natural end suppresses `complete()`.
//!
//! Alongside the state machine sits the cancellation flag the generation
//! thread polls after every chunk, and an [`Interrupt`] that unblocks both
//! ends of the transfer queue.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Something blocked waits can be woken through.
pub trait Interrupt: Send + Sync {
    /// Wake every blocked waiter; they observe the wake as an interruption.
    fn interrupt(&self);
}

struct NoInterrupt;

impl Interrupt for NoInterrupt {
    fn interrupt(&self) {}
}

/// Lifecycle of one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum UtteranceState {
    Idle = 0,
    Active = 1,
    Completed = 2,
    Cancelled = 3,
    Failed = 4,
}

impl UtteranceState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Active,
            2 => Self::Completed,
            3 => Self::Cancelled,
            _ => Self::Failed,
        }
    }

    /// `true` once the utterance can no longer change state.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

struct Inner {
    cancelled: AtomicBool,
    state: AtomicU8,
    interrupt: Box<dyn Interrupt>,
}

/// Shared cancellation token for one utterance. Clones share state.
#[derive(Clone)]
pub struct Cancellation {
    inner: Arc<Inner>,
}

impl fmt::Debug for Cancellation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cancellation")
            .field("cancelled", &self.is_cancelled())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Cancellation {
    /// Create an idle token that wakes `interrupt` when cancelled.
    pub fn new(interrupt: impl Interrupt + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                state: AtomicU8::new(UtteranceState::Idle as u8),
                interrupt: Box::new(interrupt),
            }),
        }
    }

    /// Create an idle token with nothing to interrupt.
    pub fn detached() -> Self {
        Self::new(NoInterrupt)
    }

    fn transition(&self, from: UtteranceState, to: UtteranceState) -> bool {
        let won = self
            .inner
            .state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            tracing::debug!(?from, ?to, "Utterance state transition");
        }
        won
    }

    pub fn state(&self) -> UtteranceState {
        UtteranceState::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    /// Whether generation and delivery should stop.
    ///
    /// Also `true` after the delivery loop retired the utterance, so the
    /// generation thread stops feeding a queue nobody drains.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// `Idle → Active`.
    pub fn activate(&self) -> bool {
        self.transition(UtteranceState::Idle, UtteranceState::Active)
    }

    /// Cancel the utterance. Idempotent and safe from any thread.
    ///
    /// Returns `true` if this call moved the utterance into `Cancelled`.
    /// An utterance that already completed or failed is left as it is.
    pub fn cancel(&self) -> bool {
        // Flag first: anyone who sees `Cancelled` must also see the flag.
        self.inner.cancelled.store(true, Ordering::SeqCst);
        let won = self.transition(UtteranceState::Active, UtteranceState::Cancelled)
            || self.transition(UtteranceState::Idle, UtteranceState::Cancelled);
        if won {
            self.inner.interrupt.interrupt();
        }
        won
    }

    /// `Active → Completed`. `false` means cancellation got there first and
    /// `complete()` must not be sent.
    pub fn complete(&self) -> bool {
        self.transition(UtteranceState::Active, UtteranceState::Completed)
    }

    /// `Active → Failed`. `false` means the utterance already ended and
    /// `fail()` must not be sent.
    pub fn fail(&self) -> bool {
        self.transition(UtteranceState::Active, UtteranceState::Failed)
    }

    /// Final teardown when delivery stops for any reason: raise the flag,
    /// cancel if still active, and wake a generation thread blocked on a
    /// full queue.
    pub(crate) fn retire(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.transition(UtteranceState::Active, UtteranceState::Cancelled);
        self.inner.interrupt.interrupt();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[derive(Clone, Default)]
    struct CountingInterrupt(Arc<AtomicUsize>);

    impl Interrupt for CountingInterrupt {
        fn interrupt(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counted() -> (Cancellation, Arc<AtomicUsize>) {
        let counter = CountingInterrupt::default();
        let hits = Arc::clone(&counter.0);
        (Cancellation::new(counter), hits)
    }

    #[test]
    fn starts_idle_and_uncancelled() {
        let c = Cancellation::detached();
        assert_eq!(c.state(), UtteranceState::Idle);
        assert!(!c.is_cancelled());
        assert!(c.activate());
        assert!(!c.activate());
        assert_eq!(c.state(), UtteranceState::Active);
    }

    #[test]
    fn cancel_is_idempotent_and_interrupts_once() {
        let (c, hits) = counted();
        c.activate();

        assert!(c.cancel());
        assert!(!c.cancel());
        assert!(c.is_cancelled());
        assert_eq!(c.state(), UtteranceState::Cancelled);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancel_beats_a_later_complete() {
        let c = Cancellation::detached();
        c.activate();
        c.cancel();
        assert!(!c.complete());
        assert!(!c.fail());
        assert_eq!(c.state(), UtteranceState::Cancelled);
    }

    #[test]
    fn cancel_after_complete_keeps_completed() {
        let (c, hits) = counted();
        c.activate();
        assert!(c.complete());
        assert!(!c.cancel());
        assert_eq!(c.state(), UtteranceState::Completed);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn cancel_before_activation_sticks() {
        let c = Cancellation::detached();
        assert!(c.cancel());
        assert!(!c.activate());
        assert_eq!(c.state(), UtteranceState::Cancelled);
    }

    #[test]
    fn retire_always_interrupts_and_raises_flag() {
        let (c, hits) = counted();
        c.activate();
        assert!(c.fail());
        c.retire();
        assert!(c.is_cancelled());
        assert_eq!(c.state(), UtteranceState::Failed);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn retire_cancels_an_active_utterance() {
        let c = Cancellation::detached();
        c.activate();
        c.retire();
        assert_eq!(c.state(), UtteranceState::Cancelled);
    }

    // Records whether the flag was already visible when woken.
    #[derive(Clone, Default)]
    struct ObservingInterrupt {
        token: Arc<Mutex<Option<Cancellation>>>,
        saw_flag: Arc<AtomicBool>,
    }

    impl Interrupt for ObservingInterrupt {
        fn interrupt(&self) {
            if let Some(token) = self.token.lock().unwrap().as_ref() {
                self.saw_flag.store(token.is_cancelled(), Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn woken_waiters_already_see_the_flag() {
        let observer = ObservingInterrupt::default();
        let c = Cancellation::new(observer.clone());
        *observer.token.lock().unwrap() = Some(c.clone());
        c.activate();

        assert!(c.cancel());
        assert!(observer.saw_flag.load(Ordering::SeqCst));
        observer.token.lock().unwrap().take();
    }

    #[test]
    fn clones_share_state() {
        let c = Cancellation::detached();
        let other = c.clone();
        c.activate();
        other.cancel();
        assert!(c.is_cancelled());
        assert!(UtteranceState::Cancelled.is_terminal());
        assert!(!UtteranceState::Active.is_terminal());
    }
}
