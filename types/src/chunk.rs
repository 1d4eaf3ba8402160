//! Token-bounded output chunks.

/// A contiguous slice of the corpus plus its aggregate estimated token cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<T> {
    items: Vec<T>,
    token_count: u64,
}

impl<T> Chunk<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            token_count: 0,
        }
    }

    pub fn push(&mut self, item: T, tokens: u64) {
        self.items.push(item);
        self.token_count = self.token_count.saturating_add(tokens);
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    #[must_use]
    pub const fn token_count(&self) -> u64 {
        self.token_count
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for Chunk<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// File name of the `index`-th chunk (1-based), zero-padded to two digits.
///
/// ```
/// use repomerge_types::chunk_file_name;
///
/// assert_eq!(chunk_file_name("output", 1), "output-01.json");
/// assert_eq!(chunk_file_name("output", 123), "output-123.json");
/// ```
#[must_use]
pub fn chunk_file_name(prefix: &str, index: usize) -> String {
    format!("{prefix}-{index:02}.json")
}
