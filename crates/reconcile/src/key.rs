//! Natural keys and alternate-key resolution

use std::fmt;

/// A caller-supplied key that locates one remote object.
pub trait NaturalKey: Clone + fmt::Debug + Send + Sync {
    /// Key segment of the resource identity, `None` for singleton kinds.
    fn segment(&self) -> Option<String>;

    /// Key as shown in log lines and error messages.
    fn display(&self) -> String {
        self.segment().unwrap_or_default()
    }
}

impl NaturalKey for String {
    fn segment(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl NaturalKey for () {
    fn segment(&self) -> Option<String> {
        None
    }
}

/// One entry of a kind's ordered list of alternate keys.
///
/// `extract` returns the tagged key when the query populates this field.
pub struct Alternative<Q, K> {
    pub field: &'static str,
    pub extract: fn(&Q) -> Option<K>,
}

/// Pick the first populated key, in list order.
pub fn resolve<Q, K>(query: &Q, alternatives: &[Alternative<Q, K>]) -> Option<K> {
    alternatives.iter().find_map(|alt| (alt.extract)(query))
}

/// Field names of an alternate-key list, for error messages.
pub fn field_names<Q, K>(alternatives: &[Alternative<Q, K>]) -> String {
    alternatives
        .iter()
        .map(|alt| alt.field)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Treat an empty string as "not supplied".
pub fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
