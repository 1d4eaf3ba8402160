//! Greedy streaming chunk packer.
//!
//! Items are packed in a single left-to-right pass with no reordering and
//! no look-ahead. A chunk is flushed as soon as the next item would push its
//! running total past the budget. An item that alone exceeds the budget is
//! never split; it becomes a one-item chunk over the nominal budget.

use serde::Serialize;

use repomerge_types::{Chunk, TokenBudget};

use crate::token_counter::TokenCounter;

/// Incremental packer. Feed items with their estimated cost via [`push`],
/// then call [`finish`] for the trailing chunk.
///
/// [`push`]: ChunkPacker::push
/// [`finish`]: ChunkPacker::finish
#[derive(Debug)]
pub struct ChunkPacker<T> {
    budget: TokenBudget,
    current: Chunk<T>,
}

impl<T> ChunkPacker<T> {
    #[must_use]
    pub const fn new(budget: TokenBudget) -> Self {
        Self {
            budget,
            current: Chunk::new(),
        }
    }

    /// Add an item. Returns the previous chunk if this item did not fit.
    pub fn push(&mut self, item: T, tokens: u64) -> Option<Chunk<T>> {
        let running = self.current.token_count().saturating_add(tokens);
        if self.current.is_empty() || self.budget.admits(running) {
            self.current.push(item, tokens);
            return None;
        }

        let flushed = std::mem::take(&mut self.current);
        self.current.push(item, tokens);
        Some(flushed)
    }

    /// The final chunk, if any item is pending.
    #[must_use]
    pub fn finish(self) -> Option<Chunk<T>> {
        (!self.current.is_empty()).then_some(self.current)
    }
}

/// Pack `items` using a caller-supplied cost function.
pub fn pack_by<T, I, F>(items: I, budget: TokenBudget, mut estimate: F) -> Vec<Chunk<T>>
where
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> u64,
{
    let mut packer = ChunkPacker::new(budget);
    let mut chunks = Vec::new();

    for item in items {
        let tokens = estimate(&item);
        if tokens > u64::from(budget.as_u32()) {
            tracing::warn!(
                tokens,
                budget = budget.as_u32(),
                "Item exceeds token budget; emitting it as its own chunk"
            );
        }
        if let Some(chunk) = packer.push(item, tokens) {
            chunks.push(chunk);
        }
    }
    chunks.extend(packer.finish());

    chunks
}

/// Pack serializable items, estimating each with `counter`.
pub fn pack<T, I>(items: I, budget: TokenBudget, counter: &TokenCounter) -> Vec<Chunk<T>>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    pack_by(items, budget, |item| u64::from(counter.estimate(item)))
}
