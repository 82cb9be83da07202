//! Step budget for the tool-call variant.
//!
//! When the completion engine drives querying itself, loop termination is
//! no longer controlled by the orchestrator, so every engine or executor
//! step consumes from a hard per-turn budget.

use std::sync::atomic::{AtomicU32, Ordering};

/// Status returned after consuming a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    Ok,
    /// The budget is spent; the turn must terminate.
    Exhausted,
}

/// Atomic per-turn step counter with a hard cap.
#[derive(Debug)]
pub struct StepBudget {
    limit: u32,
    used: AtomicU32,
}

impl StepBudget {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            used: AtomicU32::new(0),
        }
    }

    /// Consume one step. Returns `Exhausted` once the cap is reached.
    pub fn consume(&self) -> BudgetStatus {
        let used = self.used.fetch_add(1, Ordering::SeqCst) + 1;
        if used > self.limit {
            BudgetStatus::Exhausted
        } else {
            BudgetStatus::Ok
        }
    }

    /// Steps consumed so far.
    pub fn used(&self) -> u32 {
        self.used.load(Ordering::SeqCst).min(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_within_limit_is_ok() {
        let budget = StepBudget::new(3);
        assert_eq!(budget.consume(), BudgetStatus::Ok);
        assert_eq!(budget.consume(), BudgetStatus::Ok);
        assert_eq!(budget.consume(), BudgetStatus::Ok);
        assert_eq!(budget.used(), 3);
    }

    #[test]
    fn consume_past_limit_is_exhausted() {
        let budget = StepBudget::new(2);
        budget.consume();
        budget.consume();
        assert_eq!(budget.consume(), BudgetStatus::Exhausted);
        assert_eq!(budget.used(), 2);
    }

    #[test]
    fn zero_limit_is_immediately_exhausted() {
        let budget = StepBudget::new(0);
        assert_eq!(budget.consume(), BudgetStatus::Exhausted);
    }
}
