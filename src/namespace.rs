//! Inclusion/exclusion rules over dotted namespace names.
use anyhow::{Context, Result};
use regex::Regex;

pub const NAMESPACE_SEPARATOR: char = '.';
pub const PATH_SEPARATOR: char = '/';

/// A single namespace rule.
///
/// Name rules match a namespace equal to the rule or nested below it
/// (`com.acme` matches `com.acme` and `com.acme.billing`, not `com.acmeco`).
/// Pattern rules match when the regex matches the whole name.
#[derive(Debug, Clone)]
pub enum NamespaceRule {
    Include(String),
    Exclude(String),
    IncludePattern(Regex),
    ExcludePattern(Regex),
}

impl NamespaceRule {
    pub fn include(name: &str) -> Self {
        NamespaceRule::Include(name.trim().to_string())
    }

    pub fn exclude(name: &str) -> Self {
        NamespaceRule::Exclude(name.trim().to_string())
    }

    pub fn exclude_pattern(pattern: &str) -> Result<Self> {
        Ok(NamespaceRule::ExcludePattern(full_match(pattern)?))
    }

    pub fn include_pattern(pattern: &str) -> Result<Self> {
        Ok(NamespaceRule::IncludePattern(full_match(pattern)?))
    }
}

fn full_match(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})$"))
        .with_context(|| format!("invalid namespace pattern {pattern:?}"))
}

fn is_within(namespace: &str, rule: &str) -> bool {
    namespace == rule
        || namespace
            .strip_prefix(rule)
            .is_some_and(|rest| rest.starts_with(NAMESPACE_SEPARATOR))
}

/// Composed namespace predicate.
///
/// Include rules composed together are alternatives (a namespace passes if
/// any of them accepts it, or if there are none); every exclude rule must
/// also pass. Filters joined with `and` must all accept. With no rules at all
/// every namespace is accepted.
#[derive(Debug, Clone, Default)]
pub struct NamespaceFilter {
    include_groups: Vec<Vec<NamespaceRule>>,
    excludes: Vec<NamespaceRule>,
}

impl NamespaceFilter {
    pub fn accept_all() -> Self {
        Self::default()
    }

    pub fn compose<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = NamespaceRule>,
    {
        let mut includes = Vec::new();
        let mut excludes = Vec::new();
        for rule in rules {
            match rule {
                NamespaceRule::Include(_) | NamespaceRule::IncludePattern(_) => includes.push(rule),
                NamespaceRule::Exclude(_) | NamespaceRule::ExcludePattern(_) => excludes.push(rule),
            }
        }
        let include_groups = if includes.is_empty() {
            Vec::new()
        } else {
            vec![includes]
        };
        Self {
            include_groups,
            excludes,
        }
    }

    /// Filter accepting only what both `self` and `other` accept.
    pub fn and(mut self, other: NamespaceFilter) -> Self {
        self.include_groups.extend(other.include_groups);
        self.excludes.extend(other.excludes);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.include_groups.is_empty() && self.excludes.is_empty()
    }

    pub fn accepts(&self, namespace: &str) -> bool {
        let included = self.include_groups.iter().all(|group| {
            group.iter().any(|rule| match rule {
                NamespaceRule::Include(name) => is_within(namespace, name),
                NamespaceRule::IncludePattern(pattern) => pattern.is_match(namespace),
                _ => false,
            })
        });
        included
            && self.excludes.iter().all(|rule| match rule {
                NamespaceRule::Exclude(name) => !is_within(namespace, name),
                NamespaceRule::ExcludePattern(pattern) => !pattern.is_match(namespace),
                _ => true,
            })
    }
}

/// `com/acme/a.feature` -> `com.acme.a.feature`, leading separators dropped.
pub fn path_to_namespace(path: &str) -> String {
    path.replace('\\', "/")
        .trim_start_matches(PATH_SEPARATOR)
        .replace(PATH_SEPARATOR, ".")
}

/// `com.acme` -> `com/acme`.
pub fn namespace_to_path(namespace: &str) -> String {
    namespace.replace(NAMESPACE_SEPARATOR, "/")
}
