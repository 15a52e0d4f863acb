use std::time::Duration;

/// Handle for one scheduled debounce timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebounceTicket(u64);

/// Ticket-based coalescing of rapid triggers.
///
/// Each [`schedule`](Debouncer::schedule) replaces whatever was pending. The
/// caller starts a timer per ticket; when a timer expires only the ticket
/// that is still pending fires, so a burst of changes yields one action.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    pending: Option<DebounceTicket>,
    next: u64,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            next: 0,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Start a new quiet period, superseding any pending one
    pub fn schedule(&mut self) -> DebounceTicket {
        self.next += 1;
        let ticket = DebounceTicket(self.next);
        self.pending = Some(ticket);
        ticket
    }

    /// A timer expired. True if its ticket is the one still pending.
    pub fn fire(&mut self, ticket: DebounceTicket) -> bool {
        if self.pending == Some(ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Timer future for a ticket
pub async fn elapsed(ticket: DebounceTicket, window: Duration) -> DebounceTicket {
    tokio::time::sleep(window).await;
    ticket
}
