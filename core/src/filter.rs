//! Dirty-list filtering.
//!
//! A dirty list is a JSON array of `owner/name` strings whose records must be
//! dropped from the corpus. Malformed entries never block a run: they are
//! set aside and reported.

use std::collections::HashSet;

use serde_json::Value;

use repomerge_types::{CanonicalRecord, RepoKey, RepoKeyError};

#[derive(Debug, Clone, Default)]
pub struct DirtyList {
    repos: HashSet<RepoKey>,
    rejected: Vec<RepoKeyError>,
}

impl DirtyList {
    /// Build from raw entries, keeping those with an `owner/name` shape.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::default();
        for entry in entries {
            match RepoKey::parse(entry) {
                Ok(key) => {
                    list.repos.insert(key);
                }
                Err(err) => list.rejected.push(err),
            }
        }
        list
    }

    #[must_use]
    pub fn contains(&self, repo: &str) -> bool {
        self.repos.contains(repo)
    }

    /// Distinct valid entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.repos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    /// Entries skipped for lacking a slash, in input order.
    #[must_use]
    pub fn rejected(&self) -> &[RepoKeyError] {
        &self.rejected
    }
}

/// Anything carrying an optional `repo` key.
pub trait RepoKeyed {
    fn repo_key(&self) -> Option<&str>;
}

impl RepoKeyed for CanonicalRecord {
    fn repo_key(&self) -> Option<&str> {
        Some(&self.repo)
    }
}

/// Raw JSON entries are keyed by a string `repo` member, when present.
impl RepoKeyed for Value {
    fn repo_key(&self) -> Option<&str> {
        self.get("repo").and_then(Value::as_str)
    }
}

/// Drop every record listed in `dirty`, preserving order. Records without a
/// key are kept.
#[must_use]
pub fn filter_records<T: RepoKeyed>(records: Vec<T>, dirty: &DirtyList) -> Vec<T> {
    records
        .into_iter()
        .filter(|record| !record.repo_key().is_some_and(|repo| dirty.contains(repo)))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{DirtyList, filter_records};
    use repomerge_types::{CanonicalRecord, Field, RepoKeyError};

    fn record(repo: &str) -> CanonicalRecord {
        CanonicalRecord::new(repo, Field::Unknown, Field::Unknown, 0, Field::Unknown, None)
    }

    #[test]
    fn malformed_entries_are_rejected_not_fatal() {
        let dirty = DirtyList::from_entries(["spam/bot", "garbage", "", "evil/repo"]);

        assert_eq!(dirty.len(), 2);
        assert_eq!(
            dirty.rejected(),
            &[
                RepoKeyError::MissingSlash("garbage".to_string()),
                RepoKeyError::MissingSlash(String::new()),
            ]
        );
    }

    #[test]
    fn filter_drops_listed_repos_in_order() {
        let dirty = DirtyList::from_entries(["b/b"]);
        let kept = filter_records(vec![record("a/a"), record("b/b"), record("c/c")], &dirty);

        let repos: Vec<&str> = kept.iter().map(|r| r.repo.as_str()).collect();
        assert_eq!(repos, vec!["a/a", "c/c"]);
    }

    #[test]
    fn raw_entries_filter_by_repo_member() {
        let dirty = DirtyList::from_entries(["spam/bot"]);
        let entries = vec![
            json!({"repo": "a/b", "star": "1.5k"}),
            json!({"repo": "spam/bot", "star": "9"}),
            json!({"desc": "no key"}),
            json!("not an object"),
        ];

        let kept = filter_records(entries, &dirty);

        assert_eq!(
            kept,
            vec![
                json!({"repo": "a/b", "star": "1.5k"}),
                json!({"desc": "no key"}),
                json!("not an object"),
            ]
        );
    }

    #[test]
    fn empty_list_keeps_everything() {
        let dirty = DirtyList::from_entries(Vec::<String>::new());
        assert!(dirty.is_empty());
        assert_eq!(filter_records(vec![record("a/a")], &dirty).len(), 1);
    }
}
