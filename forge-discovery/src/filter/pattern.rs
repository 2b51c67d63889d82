//! Glob-subset pattern matching for repository names.

/// Matches `value` against a pattern.
///
/// Supported forms, case-sensitive:
///
/// | Pattern   | Matches                        |
/// |-----------|--------------------------------|
/// | `*`       | everything                     |
/// | `name`    | exactly `name`                 |
/// | `*part*`  | values containing `part`       |
/// | `prefix*` | values starting with `prefix`  |
/// | `*suffix` | values ending with `suffix`    |
///
/// Anything else (e.g. `a*b`) matches nothing; patterns are not regexes.
pub fn matches_pattern(value: &str, pattern: &str) -> bool {
    if pattern == "*" || value == pattern {
        return true;
    }

    // Containment must be tested first: `*api*` also ends and starts with `*`.
    if pattern.len() > 2 && pattern.starts_with('*') && pattern.ends_with('*') {
        let inner = &pattern[1..pattern.len() - 1];
        return !inner.contains('*') && value.contains(inner);
    }

    if let Some(prefix) = pattern.strip_suffix('*') {
        return !prefix.contains('*') && value.starts_with(prefix);
    }

    if let Some(suffix) = pattern.strip_prefix('*') {
        return !suffix.contains('*') && value.ends_with(suffix);
    }

    false
}

/// Returns the first pattern matched by any of `values`.
pub fn first_match<'p>(values: &[&str], patterns: &'p [String]) -> Option<&'p str> {
    patterns
        .iter()
        .find(|pattern| values.iter().any(|value| matches_pattern(value, pattern)))
        .map(String::as_str)
}
