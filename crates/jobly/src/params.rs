//! Query-parameter key normalization.
//!
//! Raw search parameters arrive with arbitrary key casing and may contain keys
//! nobody asked for. [`normalize`] lower-cases every key and keeps only the
//! ones on the caller's allow-list. Unknown keys are dropped silently rather
//! than rejected.

/// Search parameters restricted to an allow-list, in allow-list order.
///
/// Every key is lower-case and a member of the allow-list it was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedParams {
    entries: Vec<(&'static str, String)>,
}

impl NormalizedParams {
    /// Look up the value for an (already lower-case) key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(key, value)` pairs in allow-list order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Lower-case `raw` keys and keep only those present in `allowed`.
///
/// `allowed` is expected to hold lower-case names. If two raw keys fold to
/// the same allowed key, the later one wins.
pub fn normalize<I, K, V>(allowed: &[&'static str], raw: I) -> NormalizedParams
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut slots: Vec<Option<String>> = vec![None; allowed.len()];

    for (key, value) in raw {
        let key = key.as_ref().to_lowercase();
        match allowed.iter().position(|a| *a == key) {
            Some(idx) => slots[idx] = Some(value.into()),
            None => tracing::trace!(target: "jobly.filter", key = %key, "dropping unknown filter key"),
        }
    }

    let entries = allowed
        .iter()
        .zip(slots)
        .filter_map(|(key, value)| value.map(|v| (*key, v)))
        .collect();

    NormalizedParams { entries }
}
