//! Submission idempotency for auto-submitting code fields.
//!
//! A code field submits the moment it reaches its target length. The guard
//! makes that submission exactly-once: a new attempt cannot start while one
//! is in flight, and nothing can start again once an attempt has resolved
//! the challenge. Completions carry the id they were issued, so a late
//! response from an abandoned attempt is ignored instead of clobbering
//! state.

/// Identifier for one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionId(u64);

/// Gate for exactly-once auto-submission.
#[derive(Debug, Default)]
pub struct SubmissionGuard {
    next_id: u64,
    in_flight: Option<u64>,
    resolved: bool,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the right to submit. Returns `None` while a submission is in
    /// flight or after one has resolved, so trailing keystrokes and
    /// re-renders cannot fire a duplicate request.
    pub fn try_begin(&mut self) -> Option<SubmissionId> {
        if self.resolved || self.in_flight.is_some() {
            return None;
        }
        self.next_id += 1;
        self.in_flight = Some(self.next_id);
        Some(SubmissionId(self.next_id))
    }

    /// Records the outcome of a submission. A stale id (an attempt that was
    /// superseded or abandoned) is a no-op.
    pub fn finish(&mut self, id: SubmissionId, resolved: bool) {
        if self.in_flight != Some(id.0) {
            return;
        }
        self.in_flight = None;
        if resolved {
            self.resolved = true;
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn has_resolved(&self) -> bool {
        self.resolved
    }
}
