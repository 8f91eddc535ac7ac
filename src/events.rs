//! Timer-driven event queue for the main loop.
//!
//! Events are produced by the periodic timer (control tick, status
//! report) and consumed by the main control loop, which processes them
//! one at a time in FIFO order.  Other threads only raise a flag
//! ([`signal_command`]); the loop turns it into an event on its side.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Timer       │────▶│  Event Queue │────▶│  Main Loop   │
//! │ Console     │     │  (lock-free) │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Maximum number of pending events (one slot is always left empty).
const EVENT_QUEUE_CAP: usize = 16;

/// System event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    /// Control loop tick (1 Hz by default).
    ControlTick = 1,
    /// Status report timer fired.
    StatusTick = 2,
    /// A console command is waiting in the command channel.
    CommandReceived = 3,
}

impl Event {
    fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::ControlTick),
            2 => Some(Self::StatusTick),
            3 => Some(Self::CommandReceived),
            _ => None,
        }
    }
}

// ── Lock-free SPSC ring buffer ────────────────────────────────
//
// The timer writes (produces), main loop reads (consume).  Each
// slot is its own atomic, so no `static mut` is needed.

static EVENT_HEAD: AtomicU8 = AtomicU8::new(0);
static EVENT_TAIL: AtomicU8 = AtomicU8::new(0);
static EVENT_BUFFER: [AtomicU8; EVENT_QUEUE_CAP] = [const { AtomicU8::new(0) }; EVENT_QUEUE_CAP];

/// Push an event into the queue.
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    let head = EVENT_HEAD.load(Ordering::Relaxed);
    let tail = EVENT_TAIL.load(Ordering::Acquire);
    let next_head = (head + 1) % EVENT_QUEUE_CAP as u8;

    if next_head == tail {
        return false;
    }

    EVENT_BUFFER[head as usize].store(event as u8, Ordering::Relaxed);
    EVENT_HEAD.store(next_head, Ordering::Release);
    true
}

/// Pop the next event.  Returns `None` if the queue is empty.
pub fn pop_event() -> Option<Event> {
    loop {
        let tail = EVENT_TAIL.load(Ordering::Relaxed);
        let head = EVENT_HEAD.load(Ordering::Acquire);
        if tail == head {
            return None;
        }

        let raw = EVENT_BUFFER[tail as usize].load(Ordering::Relaxed);
        EVENT_TAIL.store((tail + 1) % EVENT_QUEUE_CAP as u8, Ordering::Release);
        if let Some(event) = Event::from_u8(raw) {
            return Some(event);
        }
    }
}

/// Drain all pending events into a callback, FIFO.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

// ── Cross-thread command signal ──────────────────────────────

static COMMAND_PENDING: AtomicBool = AtomicBool::new(false);

/// Note that a command is waiting.  Safe from any thread.
pub fn signal_command() {
    COMMAND_PENDING.store(true, Ordering::Release);
}

/// Take the command signal, clearing it.
pub fn take_command_signal() -> bool {
    COMMAND_PENDING.swap(false, Ordering::AcqRel)
}

pub fn queue_is_empty() -> bool {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);
    tail == head
}

/// Number of pending events.
pub fn queue_len() -> usize {
    let head = EVENT_HEAD.load(Ordering::Relaxed) as usize;
    let tail = EVENT_TAIL.load(Ordering::Relaxed) as usize;
    (head + EVENT_QUEUE_CAP - tail) % EVENT_QUEUE_CAP
}
