//! Brace expansion for rule globs.
//!
//! `Foo\{Bar,Baz}` becomes `Foo\Bar` and `Foo\Baz`. Only one group is
//! substituted per step: the last `{...}` group without nested braces that
//! has at least one character before it. Each substitution is expanded
//! again until no group matches, so multiple groups produce the cross
//! product. Patterns that do not match the grouping rule (unbalanced braces,
//! a leading group, an empty group) are returned unchanged.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

static GROUPING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+)[{]([^{}]+)[}](.*)$").expect("brace grouping pattern is valid")
});

/// Expand every brace group in `pattern`.
///
/// Results keep first-occurrence order and never contain duplicates.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let mut result = IndexSet::new();
    expand_into(pattern, &mut result);
    result.into_iter().collect()
}

fn expand_into(pattern: &str, result: &mut IndexSet<String>) {
    let Some(caps) = GROUPING_PATTERN.captures(pattern) else {
        result.insert(pattern.to_string());
        return;
    };

    let left = &caps[1];
    let right = &caps[3];
    for item in caps[2].split(',') {
        expand_into(&format!("{}{}{}", left, item, right), result);
    }
}
