//! Text semantics shared with the backing store.

/// Truncate a value at its first embedded NUL byte.
///
/// PostgreSQL `TEXT` cannot hold NUL bytes, so every inbound string is cut at
/// the first NUL before it is compared or stored. Uniqueness and idempotence
/// are evaluated on the truncated value.
///
/// # Examples
/// ```
/// use lineage_backend::domain::truncate_at_nul;
///
/// assert_eq!(truncate_at_nul("something\0weird"), "something");
/// assert_eq!(truncate_at_nul("clean"), "clean");
/// ```
#[must_use]
pub fn truncate_at_nul(value: &str) -> &str {
    value.split('\0').next().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("plain", "plain")]
    #[case("cut\0here", "cut")]
    #[case("\0", "")]
    #[case("", "")]
    #[case("a\0b\0c", "a")]
    fn truncates_at_first_nul(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(truncate_at_nul(input), expected);
    }
}
