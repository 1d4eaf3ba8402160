//! Token estimation and chunk packing

use pretty_assertions::assert_eq;

use repomerge_context::{TokenCounter, TokenEncoding, pack, pack_by};
use repomerge_types::{CanonicalRecord, Field, TokenBudget};

fn record(repo: &str, desc: &str) -> CanonicalRecord {
    CanonicalRecord::new(
        repo,
        Field::from(desc),
        Field::Unknown,
        42,
        Field::from("Rust"),
        None,
    )
}

#[test]
fn five_items_of_4000_under_15000_make_three_and_two() {
    let chunks = pack_by(1..=5, TokenBudget::new(15_000).unwrap(), |_| 4000);

    let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
    assert_eq!(sizes, vec![3, 2]);
    assert_eq!(chunks[0].token_count(), 12_000);
    assert_eq!(chunks[1].token_count(), 8000);
}

#[test]
fn estimate_is_the_token_count_of_the_compact_record() {
    let counter = TokenCounter::new();
    let item = record("a/b", "A fast \"quoted\" parser");

    let compact = serde_json::to_string(&item).unwrap();

    assert_eq!(counter.estimate(&item), counter.count_str(&compact));
    assert!(counter.estimate(&item) > 0);
}

#[test]
fn packing_preserves_order_and_respects_budget() {
    let counter = TokenCounter::with_encoding(TokenEncoding::O200kBase);
    let records: Vec<CanonicalRecord> = (0..40)
        .map(|i| record(&format!("owner/repo-{i}"), &"word ".repeat(i % 7)))
        .collect();
    let budget = TokenBudget::new(120).unwrap();

    let chunks = pack(records.clone(), budget, &counter);

    let mut rejoined = Vec::new();
    for chunk in chunks {
        if chunk.len() > 1 {
            assert!(budget.admits(chunk.token_count()));
        }
        rejoined.extend(chunk.into_items());
    }
    assert_eq!(rejoined, records);
}
