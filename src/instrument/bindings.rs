//! Binding Tracker: the names reported in each step's context.
//!
//! An append-only, duplicate-free log of the names declared so far in the
//! traversal of one function. It is not a lexical scope: nothing is removed
//! when a block ends, so a name declared in a nested block keeps being
//! reported for the rest of the function. Whether a name can actually be
//! read at a given step is decided by the rewriter.

use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Default)]
pub struct BindingTracker {
    names: Vec<String>,
    seen: FxHashSet<String>,
}

impl BindingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with parameter names, in order
    pub fn with_params<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tracker = Self::new();
        for param in params {
            tracker.record(param);
        }
        tracker
    }

    /// Append `name` unless already tracked. Returns whether it was new.
    pub fn record(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.seen.contains(&name) {
            return false;
        }
        self.seen.insert(name.clone());
        self.names.push(name);
        true
    }

    /// The tracked names in declaration order
    pub fn snapshot(&self) -> &[String] {
        &self.names
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_dedups_and_keeps_order() {
        let mut tracker = BindingTracker::with_params(["a", "b"]);
        assert!(tracker.record("c"));
        assert!(!tracker.record("a"));
        assert!(tracker.record("d"));

        let names: Vec<&str> = tracker.names().collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_duplicate_params_tracked_once() {
        let tracker = BindingTracker::with_params(["x", "x"]);
        assert_eq!(tracker.len(), 1);
        assert!(tracker.contains("x"));
    }
}
