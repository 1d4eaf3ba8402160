//! Key-based deduplication with latest-wins resolution.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use repomerge_types::CanonicalRecord;

/// Counters for one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Records offered.
    pub input: usize,
    /// Distinct `repo` keys kept.
    pub unique: usize,
    /// Times a stored record was superseded by a strictly newer one.
    pub replaced: usize,
}

impl ReconcileStats {
    #[must_use]
    pub const fn duplicates_removed(&self) -> usize {
        self.input - self.unique
    }
}

/// Streaming reconciler keeping one record per `repo` key.
///
/// A later record replaces the stored one only when its resolved update
/// instant is strictly greater. Ties, including both-unresolved, keep the
/// first-seen record. Output order is the order in which keys first appeared.
#[derive(Debug, Default)]
pub struct Reconciler {
    records: Vec<CanonicalRecord>,
    index: HashMap<String, usize>,
    stats: ReconcileStats,
}

impl Reconciler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: CanonicalRecord) {
        self.stats.input += 1;
        match self.index.entry(record.repo.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(self.records.len());
                self.records.push(record);
            }
            Entry::Occupied(slot) => {
                let stored = &mut self.records[*slot.get()];
                // `None < Some(_)`: a resolved timestamp beats an unresolved one.
                if record.updated_at() > stored.updated_at() {
                    *stored = record;
                    self.stats.replaced += 1;
                }
            }
        }
    }

    #[must_use]
    pub fn stats(&self) -> ReconcileStats {
        ReconcileStats {
            unique: self.records.len(),
            ..self.stats
        }
    }

    #[must_use]
    pub fn finish(self) -> (Vec<CanonicalRecord>, ReconcileStats) {
        let stats = self.stats();
        (self.records, stats)
    }
}

impl Extend<CanonicalRecord> for Reconciler {
    fn extend<I: IntoIterator<Item = CanonicalRecord>>(&mut self, iter: I) {
        for record in iter {
            self.push(record);
        }
    }
}

/// Reconcile a sequence in one pass. Idempotent.
#[must_use]
pub fn reconcile(records: impl IntoIterator<Item = CanonicalRecord>) -> Vec<CanonicalRecord> {
    let mut reconciler = Reconciler::new();
    reconciler.extend(records);
    reconciler.finish().0
}
