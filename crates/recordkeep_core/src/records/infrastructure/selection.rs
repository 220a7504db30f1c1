//! Client-requested field sets.
use std::collections::BTreeSet;

/// Unordered, de-duplicated set of requested field names.
///
/// An empty selection means "all fields".
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct FieldSelection(BTreeSet<String>);

impl FieldSelection {
    /// Selection of every field.
    pub fn all() -> Self {
        Self::default()
    }

    /// Parses a comma-separated selector such as `"name,email"`.
    ///
    /// Segments are trimmed and empty segments dropped. Any other segment is
    /// kept, even one no field could be named after, so a selector naming
    /// something never turns into "all fields".
    pub fn parse(selector: &str) -> Self {
        selector.split(',').map(str::trim).filter(|name| !name.is_empty()).collect()
    }

    pub fn is_all(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FieldSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Option<&str>> for FieldSelection {
    fn from(selector: Option<&str>) -> Self {
        selector.map(Self::parse).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_selection_parse_trims_and_dedups() {
        assert_eq!(
            FieldSelection::parse(" name, ,email,name "),
            FieldSelection::from_iter(["email", "name"])
        );
    }

    #[test]
    fn unit_selection_parse_keeps_malformed_names() {
        let selection = FieldSelection::parse("bad-name");
        assert!(!selection.is_all());
        assert_eq!(selection.iter().collect::<Vec<_>>(), vec!["bad-name"]);
        assert_eq!(
            FieldSelection::parse("name, bad name ,x.y"),
            FieldSelection::from_iter(["bad name", "name", "x.y"])
        );
    }

    #[test]
    fn unit_selection_parse_empty_means_all() {
        assert!(FieldSelection::parse("").is_all());
        assert!(FieldSelection::parse(" , ,").is_all());
        assert!(FieldSelection::from(None).is_all());
    }

    #[test]
    fn unit_selection_is_order_independent() {
        assert_eq!(FieldSelection::parse("a,b"), FieldSelection::parse("b,a"));
        assert_eq!(FieldSelection::parse("b,a").iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
