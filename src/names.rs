//! Display names for mead ids.

use std::collections::BTreeMap;

use crate::error::ReportError;

/// Read-only id to display-label lookup.
///
/// The figure composer only needs this much to relabel plot columns, so it takes any `Lookup`
/// rather than a concrete table.
pub trait Lookup {
    /// Label for `id`, or [`ReportError::UnresolvedIdentifier`].
    fn resolve(&self, id: i64) -> Result<String, ReportError>;

    /// Known ids in ascending order.
    fn ids(&self) -> Box<dyn Iterator<Item = i64> + '_>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Immutable table built from `id_name_map.csv`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdNameMap {
    names: BTreeMap<i64, String>,
}

impl IdNameMap {
    pub fn new(names: BTreeMap<i64, String>) -> Self {
        IdNameMap { names }
    }

    /// The bare name without the `(<id>)` prefix.
    pub fn name(&self, id: i64) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }
}

impl FromIterator<(i64, String)> for IdNameMap {
    fn from_iter<T: IntoIterator<Item = (i64, String)>>(iter: T) -> Self {
        IdNameMap {
            names: iter.into_iter().collect(),
        }
    }
}

impl Lookup for IdNameMap {
    fn resolve(&self, id: i64) -> Result<String, ReportError> {
        self.names
            .get(&id)
            .map(|name| format!("({id}) {name}"))
            .ok_or(ReportError::UnresolvedIdentifier { id })
    }

    fn ids(&self) -> Box<dyn Iterator<Item = i64> + '_> {
        Box::new(self.names.keys().copied())
    }

    fn len(&self) -> usize {
        self.names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_beta() -> IdNameMap {
        [(1, "Alpha".to_string()), (2, "Beta".to_string())]
            .into_iter()
            .collect()
    }

    #[test]
    fn resolves_with_id_prefix() {
        let names = alpha_beta();
        assert_eq!(names.resolve(1).unwrap(), "(1) Alpha");
        assert_eq!(names.resolve(2).unwrap(), "(2) Beta");
        assert_eq!(names.name(2), Some("Beta"));
    }

    #[test]
    fn unknown_id_fails() {
        let names = alpha_beta();
        let err = names.resolve(3).unwrap_err();
        assert!(matches!(err, ReportError::UnresolvedIdentifier { id: 3 }));
    }

    #[test]
    fn iterates_and_counts() {
        let names = alpha_beta();
        assert_eq!(names.ids().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(names.len(), 2);
        assert!(!names.is_empty());
        assert!(IdNameMap::default().is_empty());
    }
}
