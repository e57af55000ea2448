//! Close-once cancellation gate shared by every worker of a call.
//!
//! Caller cancellation and match-stop are the same primitive with different
//! closers: the gate latches exactly once, and the latched reason decides
//! the verdict. A match latched before external cancellation is observed
//! yields `Found`; a positive comparison that loses the latch race to an
//! external close is reported as canceled.

use std::sync::atomic::{AtomicU8, Ordering};

use parallel_query_core::cancel::CancellationToken;

const OPEN: u8 = 0;
const CLOSED_MATCH: u8 = 1;
const CLOSED_EXTERNAL: u8 = 2;

/// Why the gate latched shut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// A worker matched an element; siblings should stop early.
    MatchFound,
    /// The caller's cancellation token was observed set.
    External,
}

impl CloseReason {
    fn encode(self) -> u8 {
        match self {
            CloseReason::MatchFound => CLOSED_MATCH,
            CloseReason::External => CLOSED_EXTERNAL,
        }
    }

    fn decode(state: u8) -> Option<Self> {
        match state {
            CLOSED_MATCH => Some(CloseReason::MatchFound),
            CLOSED_EXTERNAL => Some(CloseReason::External),
            _ => None,
        }
    }
}

/// Idempotent close-once signal observed by workers between element pulls.
#[derive(Debug)]
pub struct SearchGate {
    latch: AtomicU8,
    token: Option<CancellationToken>,
}

impl SearchGate {
    /// Gate for one call, optionally wired to the caller's token.
    pub fn new(token: Option<CancellationToken>) -> Self {
        Self {
            latch: AtomicU8::new(OPEN),
            token,
        }
    }

    /// Attempt to latch the gate shut. Idempotent: the first closer wins and
    /// every caller learns the reason that actually holds the gate.
    pub fn try_close(&self, reason: CloseReason) -> CloseReason {
        match self.latch.compare_exchange(
            OPEN,
            reason.encode(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => reason,
            Err(previous) => {
                CloseReason::decode(previous).expect("closed gate must carry a reason")
            }
        }
    }

    /// Check the gate between element pulls.
    ///
    /// An externally canceled token is folded into the latch the first time
    /// it is observed, so the external close participates in the same
    /// first-closer-wins race as a match.
    pub fn is_closed(&self) -> bool {
        if self.latch.load(Ordering::SeqCst) != OPEN {
            return true;
        }
        if let Some(token) = &self.token {
            if token.is_canceled() {
                self.try_close(CloseReason::External);
                return true;
            }
        }
        false
    }

    /// Reason the gate is held shut, if it has latched.
    pub fn close_reason(&self) -> Option<CloseReason> {
        CloseReason::decode(self.latch.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_gate_is_open() {
        let gate = SearchGate::new(None);
        assert!(!gate.is_closed());
        assert_eq!(gate.close_reason(), None);
    }

    #[test]
    fn test_first_closer_wins() {
        let gate = SearchGate::new(None);
        assert_eq!(gate.try_close(CloseReason::MatchFound), CloseReason::MatchFound);
        assert_eq!(gate.try_close(CloseReason::External), CloseReason::MatchFound);
        assert_eq!(gate.close_reason(), Some(CloseReason::MatchFound));
    }

    #[test]
    fn test_external_latch_blocks_later_match() {
        let gate = SearchGate::new(None);
        assert_eq!(gate.try_close(CloseReason::External), CloseReason::External);
        assert_eq!(gate.try_close(CloseReason::MatchFound), CloseReason::External);
    }

    #[test]
    fn test_canceled_token_folds_into_latch_on_observation() {
        let token = CancellationToken::new();
        let gate = SearchGate::new(Some(token.clone()));
        assert!(!gate.is_closed());

        token.cancel();
        assert!(gate.is_closed());
        assert_eq!(gate.close_reason(), Some(CloseReason::External));
    }

    #[test]
    fn test_match_latched_before_token_observation_sticks() {
        let token = CancellationToken::new();
        let gate = SearchGate::new(Some(token.clone()));

        gate.try_close(CloseReason::MatchFound);
        token.cancel();

        assert!(gate.is_closed());
        assert_eq!(gate.close_reason(), Some(CloseReason::MatchFound));
    }

    #[test]
    fn test_concurrent_closers_latch_exactly_once() {
        use std::sync::Arc;

        let gate = Arc::new(SearchGate::new(None));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let gate = Arc::clone(&gate);
                std::thread::spawn(move || {
                    let reason = if i % 2 == 0 {
                        CloseReason::MatchFound
                    } else {
                        CloseReason::External
                    };
                    gate.try_close(reason)
                })
            })
            .collect();

        let winner = gate.close_reason();
        let mut observed = Vec::new();
        for handle in handles {
            observed.push(handle.join().expect("closer thread panicked"));
        }
        // Every closer observed the same winning reason.
        let latched = gate.close_reason().expect("gate must have latched");
        assert!(observed.iter().all(|&r| r == latched));
        assert!(winner.is_none() || winner == Some(latched));
    }
}
