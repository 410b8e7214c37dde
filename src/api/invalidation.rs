/// Coalescing render request flag.
///
/// Any number of `request` calls between two `take` calls yield one pass;
/// `passes` counts only passes that completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invalidation {
    pending: bool,
    requests: u64,
    passes: u64,
}

impl Default for Invalidation {
    fn default() -> Self {
        Self {
            pending: true,
            requests: 0,
            passes: 0,
        }
    }
}

impl Invalidation {
    pub fn request(&mut self) {
        self.pending = true;
        self.requests += 1;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consumes the pending flag; `true` when a pass should run now.
    pub fn take(&mut self) -> bool {
        std::mem::replace(&mut self.pending, false)
    }

    /// Re-arms a pass that was taken but failed.
    pub fn restore(&mut self) {
        self.pending = true;
    }

    /// Marks a completed pass.
    pub fn mark_rendered(&mut self) {
        self.pending = false;
        self.passes += 1;
    }

    #[must_use]
    pub fn requests(&self) -> u64 {
        self.requests
    }

    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes
    }
}
