//! Template assignment diff.

use itertools::Itertools;

/// Templates to assert and to clear on an existing host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateDiff {
    /// Desired ids, in desired order.
    pub assert: Vec<String>,
    /// Currently linked ids absent from the desired set, in current order.
    pub clear: Vec<String>,
}

impl TemplateDiff {
    pub fn compute(current: &[String], desired: &[String]) -> Self {
        let clear = current
            .iter()
            .filter(|id| !desired.contains(id))
            .unique()
            .cloned()
            .collect_vec();

        Self {
            assert: desired.to_vec(),
            clear,
        }
    }

    pub fn is_noop_for(&self, current: &[String]) -> bool {
        self.clear.is_empty() && self.assert.iter().all(|id| current.contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_replace_one_template() {
        let diff = TemplateDiff::compute(&ids(&["A", "B"]), &ids(&["B", "C"]));
        assert_eq!(diff.assert, ids(&["B", "C"]));
        assert_eq!(diff.clear, ids(&["A"]));
        assert!(!diff.is_noop_for(&ids(&["A", "B"])));
    }

    #[test]
    fn test_converged_host_clears_nothing() {
        let current = ids(&["A", "B"]);
        let diff = TemplateDiff::compute(&current, &ids(&["B", "A"]));
        assert!(diff.clear.is_empty());
        assert!(diff.is_noop_for(&current));
    }

    #[test]
    fn test_new_host_has_nothing_to_clear() {
        let diff = TemplateDiff::compute(&[], &ids(&["A"]));
        assert_eq!(diff.assert, ids(&["A"]));
        assert!(diff.clear.is_empty());
    }
}
