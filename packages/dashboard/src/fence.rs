//! Request tokens for discarding stale responses.
//!
//! Every fetch takes a token from its slot's [`RequestFence`] before it is
//! dispatched. When the response arrives it is applied only if its token
//! is still the latest one issued, so a slow earlier request can never
//! overwrite the result of a later one.

/// Identifies one dispatched request within a [`RequestFence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Monotonic token issuer for one piece of page state.
#[derive(Debug, Default)]
pub struct RequestFence {
    latest: u64,
}

impl RequestFence {
    /// Issues a token that supersedes every earlier one.
    pub const fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    /// Returns `true` if `token` is the most recently issued one.
    #[must_use]
    pub const fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_token_is_current() {
        let mut fence = RequestFence::default();
        let first = fence.issue();
        assert!(fence.is_current(first));

        let second = fence.issue();
        assert!(!fence.is_current(first));
        assert!(fence.is_current(second));
        assert!(second > first);
    }

    #[test]
    fn fences_are_independent() {
        let mut diario = RequestFence::default();
        let mut mensual = RequestFence::default();
        let d = diario.issue();
        let _ = mensual.issue();
        let _ = mensual.issue();
        assert!(diario.is_current(d));
    }
}
