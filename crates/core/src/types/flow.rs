//! Flow names attached to an issue report.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The flow (or flows) an issue was reported against.
///
/// A reporter writes either a single token (`flow: checkout`) or a list
/// (`flow={checkout, payment}`). The representation is kept as written:
/// it serializes to a JSON string or a JSON array respectively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flow {
    /// A single flow name.
    Single(String),
    /// An ordered list of flow names.
    List(Vec<String>),
}

impl Flow {
    /// Build a single flow, rejecting blank input.
    #[must_use]
    pub fn single(name: &str) -> Option<Self> {
        let name = name.trim();
        (!name.is_empty()).then(|| Self::Single(name.to_owned()))
    }

    /// Build a list flow from comma separated entries.
    ///
    /// Entries are trimmed and blank entries are dropped. Returns `None`
    /// when nothing is left.
    #[must_use]
    pub fn list(entries: &str) -> Option<Self> {
        let names: Vec<String> = entries
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        (!names.is_empty()).then_some(Self::List(names))
    }

    /// All flow names in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Single(name) => vec![name.as_str()],
            Self::List(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(name) => write!(f, "{name}"),
            Self::List(names) => write!(f, "{}", names.join(", ")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_single_trims() {
        assert_eq!(
            Flow::single("  checkout "),
            Some(Flow::Single("checkout".into()))
        );
        assert_eq!(Flow::single("   "), None);
    }

    #[test]
    fn test_list_trims_and_keeps_order() {
        assert_eq!(
            Flow::list(" b ,a,  c"),
            Some(Flow::List(vec!["b".into(), "a".into(), "c".into()]))
        );
    }

    #[test]
    fn test_list_drops_blank_entries() {
        assert_eq!(
            Flow::list("a, ,b,"),
            Some(Flow::List(vec!["a".into(), "b".into()]))
        );
        assert_eq!(Flow::list(" , "), None);
        assert_eq!(Flow::list(""), None);
    }

    #[test]
    fn test_single_entry_list_stays_list() {
        assert_eq!(Flow::list("a"), Some(Flow::List(vec!["a".into()])));
    }

    #[test]
    fn test_json_shape() {
        let single = Flow::Single("checkout".into());
        assert_eq!(serde_json::to_string(&single).unwrap(), "\"checkout\"");

        let list = Flow::List(vec!["a".into(), "b".into()]);
        assert_eq!(serde_json::to_string(&list).unwrap(), "[\"a\",\"b\"]");

        let parsed: Flow = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(parsed, list);
    }

    #[test]
    fn test_display() {
        assert_eq!(Flow::Single("checkout".into()).to_string(), "checkout");
        assert_eq!(
            Flow::List(vec!["a".into(), "b".into()]).to_string(),
            "a, b"
        );
    }
}
