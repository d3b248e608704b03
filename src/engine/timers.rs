/// Cancellable single-slot timer. Scheduling supersedes any pending
/// deadline, so within a coalescing window only the last scheduled
/// invocation ever fires; cancellation on sleep/destroy is a plain `cancel`
/// that provably leaves nothing pending.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    delay_ms: u64,
    deadline: Option<u64>,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Debouncer {
            delay_ms,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: u64) {
        self.deadline = Some(now + self.delay_ms);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    /// Consume the deadline if it has passed.
    pub fn fire_due(&mut self, now: u64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
