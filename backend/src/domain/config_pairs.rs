//! The configuration value object.
//!
//! A configuration is an ordered mapping of string keys to string values. Its
//! serialized form is the canonical hstore text representation the store
//! keeps in `config.key_value_pairs`: the empty configuration serializes to
//! `""`, a populated one to `"key"=>"value"` pairs joined by `", "`.
//! Uniqueness of configurations is uniqueness of this serialized form.
//!
//! The event handlers only ever create the empty configuration; populated
//! configurations are assigned to releases out-of-band by operator tooling
//! and re-enter the domain as opaque `ConfigId`s through the inheritance
//! lookups. [`ConfigPairs::from_pairs`] and [`ConfigPairs::push`] exist for
//! that tooling surface and for tests.

use std::fmt;

/// Ordered key/value configuration released alongside an iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPairs(Vec<(String, String)>);

impl ConfigPairs {
    /// The unit configuration with zero entries.
    #[must_use]
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build a configuration from pairs, preserving their order.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Append an entry, keeping insertion order.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// True for the unit configuration.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize to the canonical hstore text form used for storage and
    /// uniqueness comparison.
    #[must_use]
    pub fn to_storage(&self) -> String {
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|(key, value)| format!("\"{}\"=>\"{}\"", escape(key), escape(value)))
            .collect();
        rendered.join(", ")
    }
}

fn escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

impl fmt::Display for ConfigPairs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_storage())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_config_serializes_to_empty_string() {
        assert_eq!(ConfigPairs::empty().to_storage(), "");
        assert!(ConfigPairs::empty().is_empty());
    }

    #[test]
    fn single_pair_uses_hstore_text_form() {
        let config = ConfigPairs::from_pairs([("A", "a")]);
        assert_eq!(config.to_storage(), "\"A\"=>\"a\"");
    }

    #[test]
    fn pairs_keep_insertion_order() {
        let mut config = ConfigPairs::empty();
        config.push("b", "2");
        config.push("a", "1");
        assert_eq!(config.to_storage(), "\"b\"=>\"2\", \"a\"=>\"1\"");
    }

    #[rstest]
    #[case("quo\"te", "\"quo\\\"te\"=>\"v\"")]
    #[case("back\\slash", "\"back\\\\slash\"=>\"v\"")]
    fn keys_are_escaped(#[case] key: &str, #[case] expected: &str) {
        let config = ConfigPairs::from_pairs([(key, "v")]);
        assert_eq!(config.to_storage(), expected);
    }
}
