//! Rule normalization applied before a rule enters the compiler.
//!
//! Separators are collapsed to a single backslash, the root is matched
//! case-insensitively against the mounted roots, and brace groups in the
//! glob fan out into one rule per alternative. Full-query rules skip all of
//! this.

use hunter_core::RegistryRule;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::glob::expand_braces;

/// Roots that correspond to virtual hives mounted by the generated artifact.
/// Rules that do not glob may leave the root empty.
pub const ALLOWED_ROOTS: &[&str] = &[
    "",
    "\\",
    "Amcache",
    "HKEY_USERS",
    "SAM",
    "HKEY_LOCAL_MACHINE\\Security",
    "HKEY_LOCAL_MACHINE\\System",
    "HKEY_LOCAL_MACHINE\\Software",
    "HKEY_LOCAL_MACHINE\\BCD00000000",
];

static PATH_SEP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[/\\]+").expect("path separator pattern is valid"));

/// Collapse every run of `/` and `\` into a single `\`.
pub fn normalize_separators(path: &str) -> String {
    PATH_SEP.replace_all(path, "\\").into_owned()
}

/// Canonical casing of `root` when it is on the allow-list.
pub fn canonical_root(root: &str) -> Option<&'static str> {
    ALLOWED_ROOTS
        .iter()
        .copied()
        .find(|allowed| allowed.eq_ignore_ascii_case(root))
}

/// Glob rules produced from one input rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// One rule per brace alternative, sharing every other field.
    pub rules: Vec<RegistryRule>,
    /// The separator-normalized root when it is not on the allow-list. It is
    /// kept as written.
    pub unsupported_root: Option<String>,
}

/// Where a rule goes after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    /// Full-query rule, untouched.
    Query(RegistryRule),
    Glob(Normalized),
}

/// Normalize a rule and decide which bucket it belongs to.
pub fn route(rule: RegistryRule) -> Routed {
    if rule.is_query() {
        Routed::Query(rule)
    } else {
        Routed::Glob(normalize_rule(rule))
    }
}

/// Normalize the root and glob of a glob rule and expand its braces.
pub fn normalize_rule(mut rule: RegistryRule) -> Normalized {
    let glob = normalize_separators(&rule.glob);
    rule.glob = glob.strip_prefix('\\').unwrap_or(&glob).to_string();

    let root = normalize_separators(&rule.root);
    let unsupported_root = match canonical_root(&root) {
        Some(canonical) => {
            rule.root = canonical.to_string();
            None
        }
        None => {
            rule.root = root.clone();
            Some(root)
        }
    };

    let rules = expand_braces(&rule.glob)
        .into_iter()
        .map(|glob| RegistryRule {
            glob,
            ..rule.clone()
        })
        .collect();

    Normalized {
        rules,
        unsupported_root,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glob_rule(root: &str, glob: &str) -> RegistryRule {
        RegistryRule {
            description: "test".to_string(),
            root: root.to_string(),
            glob: glob.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn separators_collapse_to_single_backslash() {
        assert_eq!(normalize_separators("a//b\\\\c/\\d"), "a\\b\\c\\d");
        assert_eq!(normalize_separators("plain"), "plain");
    }

    #[test]
    fn leading_separator_is_stripped_from_glob() {
        let n = normalize_rule(glob_rule("SAM", "//SAM/Domains/*"));
        assert_eq!(n.rules[0].glob, "SAM\\Domains\\*");
    }

    #[test]
    fn every_case_variant_of_allowed_roots_canonicalizes() {
        for allowed in ALLOWED_ROOTS {
            for variant in [allowed.to_uppercase(), allowed.to_lowercase(), allowed.to_string()] {
                let n = normalize_rule(glob_rule(&variant, "x"));
                assert_eq!(n.rules[0].root, *allowed, "variant {variant}");
                assert!(n.unsupported_root.is_none());
            }
        }
    }

    #[test]
    fn forward_slash_root_canonicalizes() {
        let n = normalize_rule(glob_rule("hkey_local_machine/software", "x"));
        assert_eq!(n.rules[0].root, "HKEY_LOCAL_MACHINE\\Software");

        let n = normalize_rule(glob_rule("/", "x"));
        assert_eq!(n.rules[0].root, "\\");
        assert!(n.unsupported_root.is_none());
    }

    #[test]
    fn unknown_root_passes_through() {
        let n = normalize_rule(glob_rule("SOFTWARE", "x"));
        assert_eq!(n.rules[0].root, "SOFTWARE");
        assert_eq!(n.unsupported_root.as_deref(), Some("SOFTWARE"));
    }

    #[test]
    fn braces_fan_out_into_clones() {
        let mut rule = glob_rule("HKEY_USERS", "*\\Software\\{A,B}");
        rule.category = "Cat".to_string();
        rule.preamble = vec!["LET x = 1".to_string()];

        let n = normalize_rule(rule);
        let globs: Vec<_> = n.rules.iter().map(|r| r.glob.as_str()).collect();
        assert_eq!(globs, vec!["*\\Software\\A", "*\\Software\\B"]);
        assert!(n.rules.iter().all(|r| r.category == "Cat"));
        assert!(n.rules.iter().all(|r| r.preamble == vec!["LET x = 1"]));
    }

    #[test]
    fn query_rules_are_not_normalized() {
        let mut rule = glob_rule("weird//root", "{a,b}");
        rule.query = Some("SELECT * FROM info()".to_string());

        match route(rule.clone()) {
            Routed::Query(q) => assert_eq!(q, rule),
            Routed::Glob(_) => panic!("query rule routed to glob bucket"),
        }
    }
}
