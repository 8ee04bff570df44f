//! Ordered include/exclude filter chains.
//!
//! A [`FilterChain`] decides whether a candidate path or qualified name gets
//! scanned. Rules are evaluated left to right with short-circuit semantics:
//! the chain default-accepts when empty or when its first rule is an exclude,
//! and the first matching exclusion wins.

use std::fmt;

use regex::Regex;

use crate::error::{IndexError, Result};

/// A signed regular-expression rule. Matching is anchored: the pattern must
/// cover the whole candidate, not a substring.
#[derive(Debug, Clone)]
enum Rule {
    Include(Regex),
    Exclude(Regex),
}

impl Rule {
    fn compile(pattern: &str, include: bool) -> Result<Self> {
        let regex =
            Regex::new(&format!("^(?:{pattern})$")).map_err(|source| IndexError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(if include {
            Rule::Include(regex)
        } else {
            Rule::Exclude(regex)
        })
    }

    fn is_exclude(&self) -> bool {
        matches!(self, Rule::Exclude(_))
    }

    /// The rule's vote for a candidate: an include votes to accept on match,
    /// an exclude votes to accept only on non-match.
    fn accepts(&self, candidate: &str) -> bool {
        match self {
            Rule::Include(regex) => regex.is_match(candidate),
            Rule::Exclude(regex) => !regex.is_match(candidate),
        }
    }

    /// The pattern as written, without the anchoring wrapper.
    fn pattern(&self) -> &str {
        let raw = match self {
            Rule::Include(regex) | Rule::Exclude(regex) => regex.as_str(),
        };
        &raw[4..raw.len() - 2]
    }
}

/// An ordered include/exclude predicate sequence over candidate names.
///
/// ```
/// use typedex::FilterChain;
///
/// let chain = FilterChain::new()
///     .include(r"app\..*")
///     .unwrap()
///     .exclude(r"app\.internal\..*")
///     .unwrap();
/// assert!(chain.test("app.Service"));
/// assert!(!chain.test("app.internal.Secret"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    rules: Vec<Rule>,
}

impl FilterChain {
    /// An empty chain. Accepts every candidate until rules are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an include rule for `pattern`.
    pub fn include(mut self, pattern: &str) -> Result<Self> {
        self.rules.push(Rule::compile(pattern, true)?);
        Ok(self)
    }

    /// Append an exclude rule for `pattern`.
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        self.rules.push(Rule::compile(pattern, false)?);
        Ok(self)
    }

    /// Append an include rule covering everything under the package `prefix`,
    /// for example `include_prefix("a.b")` accepts `a.b.C` and `a.b.c.D`.
    pub fn include_prefix(self, prefix: &str) -> Result<Self> {
        let pattern = prefix_pattern(prefix);
        self.include(&pattern)
    }

    /// Append an exclude rule covering everything under the package `prefix`.
    pub fn exclude_prefix(self, prefix: &str) -> Result<Self> {
        let pattern = prefix_pattern(prefix);
        self.exclude(&pattern)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Decide whether `candidate` passes the chain.
    ///
    /// Starts accepting iff the chain is empty or opens with an exclude.
    /// Walking the rules in order: an include while already accepting is a
    /// no-op, an exclude while already rejecting is a no-op, and a matching
    /// exclusion stops the walk immediately.
    pub fn test(&self, candidate: &str) -> bool {
        let mut accept = self.rules.is_empty() || self.rules[0].is_exclude();

        for rule in &self.rules {
            if accept && !rule.is_exclude() {
                continue;
            }
            if !accept && rule.is_exclude() {
                continue;
            }
            accept = rule.accepts(candidate);
            if !accept && rule.is_exclude() {
                break;
            }
        }
        accept
    }
}

impl PartialEq for FilterChain {
    fn eq(&self, other: &Self) -> bool {
        self.rules.len() == other.rules.len()
            && self.rules.iter().zip(&other.rules).all(|(a, b)| {
                a.is_exclude() == b.is_exclude() && a.pattern() == b.pattern()
            })
    }
}

impl Eq for FilterChain {}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for rule in &self.rules {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            let sign = if rule.is_exclude() { '-' } else { '+' };
            write!(f, "{sign}{}", rule.pattern())?;
        }
        Ok(())
    }
}

/// Maps a dotted name to a package-prefix pattern with a trailing dot,
/// for example `prefix_pattern("a.b") == r"a\.b\..*"`.
fn prefix_pattern(prefix: &str) -> String {
    let mut fqn = prefix.to_string();
    if !fqn.ends_with('.') {
        fqn.push('.');
    }
    format!("{}.*", fqn.replace('.', r"\.").replace('$', r"\$"))
}
