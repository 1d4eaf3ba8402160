//! Token budget invariant type.

use std::num::NonZeroU32;

use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("token budget must be greater than zero")]
pub struct TokenBudgetError;

/// Maximum estimated token cost of one output chunk.
///
/// Zero is unrepresentable. A single record larger than the budget still
/// gets its own chunk; the budget bounds packing, it never splits records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenBudget(NonZeroU32);

impl TokenBudget {
    pub const DEFAULT_TOKENS: u32 = 15_000;

    pub fn new(tokens: u32) -> Result<Self, TokenBudgetError> {
        NonZeroU32::new(tokens).map(Self).ok_or(TokenBudgetError)
    }

    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0.get()
    }

    /// Whether `tokens` fits under the budget.
    #[must_use]
    pub const fn admits(self, tokens: u64) -> bool {
        tokens <= self.0.get() as u64
    }
}

impl Default for TokenBudget {
    fn default() -> Self {
        match NonZeroU32::new(Self::DEFAULT_TOKENS) {
            Some(tokens) => Self(tokens),
            None => unreachable!("default token budget is non-zero"),
        }
    }
}

impl std::fmt::Display for TokenBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
