//! Unique temporary names: `_uid`, `_uid2`, `_uid3`, ...

use rustc_hash::FxHashSet;

#[derive(Debug, Clone)]
pub struct UidGenerator {
    prefix: String,
    taken: FxHashSet<String>,
}

impl UidGenerator {
    /// `taken` holds every name already spelled in the function; generated
    /// names never collide with them or with each other.
    pub fn new(prefix: &str, taken: FxHashSet<String>) -> Self {
        Self {
            prefix: prefix.trim_start_matches('_').to_string(),
            taken,
        }
    }

    pub fn next_uid(&mut self) -> String {
        let mut i = 1;
        loop {
            let candidate = if i > 1 {
                format!("_{}{}", self.prefix, i)
            } else {
                format!("_{}", self.prefix)
            };
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence() {
        let mut uids = UidGenerator::new("uid", FxHashSet::default());
        assert_eq!(uids.next_uid(), "_uid");
        assert_eq!(uids.next_uid(), "_uid2");
        assert_eq!(uids.next_uid(), "_uid3");
    }

    #[test]
    fn test_skips_taken_names() {
        let taken: FxHashSet<String> = ["_uid".to_string(), "_uid3".to_string()].into_iter().collect();
        let mut uids = UidGenerator::new("uid", taken);
        assert_eq!(uids.next_uid(), "_uid2");
        assert_eq!(uids.next_uid(), "_uid4");
    }
}
