use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// How a namespace is used by the object that declares it.
///
/// Variants are ordered by strength: merging two usages keeps the
/// stronger one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NamespaceUsage {
    /// Declared, but nothing is known about its use.
    #[default]
    Indeterminate,
    /// Used inside content, e.g. in an `xsi:type` value or QName text.
    NonVisiblyUsed,
    /// Used by an element or attribute name.
    VisiblyUsed,
}

/// A namespace declaration: a prefix bound to a URI.
///
/// Equality and ordering only look at URI and prefix.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Namespace {
    uri: String,
    prefix: String,
    always_declare: bool,
    usage: NamespaceUsage,
}

impl Namespace {
    pub fn new(uri: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            prefix: prefix.into(),
            always_declare: false,
            usage: NamespaceUsage::Indeterminate,
        }
    }

    /// The same declaration with the given usage.
    pub fn with_usage(mut self, usage: NamespaceUsage) -> Self {
        self.usage = usage;
        self
    }

    /// The same declaration, emitted even when an ancestor already
    /// declares it.
    pub fn always_declared(mut self) -> Self {
        self.always_declare = true;
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The prefix; empty for the default namespace.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn always_declare(&self) -> bool {
        self.always_declare
    }

    pub fn usage(&self) -> NamespaceUsage {
        self.usage
    }

    fn key(&self) -> (&str, &str) {
        (&self.uri, &self.prefix)
    }
}

impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Namespace {}

impl PartialOrd for Namespace {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Namespace {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "xmlns=\"{}\"", self.uri)
        } else {
            write!(f, "xmlns:{}=\"{}\"", self.prefix, self.uri)
        }
    }
}

/// The namespace declarations of one object.
///
/// At most one entry exists per prefix. Adding a declaration for a prefix
/// that is already bound:
/// - to the same URI merges the flags into the existing entry (the
///   stronger usage wins, `always_declare` is sticky);
/// - to another URI is ignored, unless the new declaration must always
///   be declared, in which case it replaces the old one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespaces {
    entries: BTreeSet<Namespace>,
}

impl Namespaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration following the merge rule.
    pub fn add(&mut self, namespace: Namespace) {
        let existing = self
            .entries
            .iter()
            .find(|entry| entry.prefix == namespace.prefix)
            .cloned();
        if let Some(existing) = existing {
            if existing.uri == namespace.uri {
                let mut merged = existing;
                merged.always_declare |= namespace.always_declare;
                merged.usage = merged.usage.max(namespace.usage);
                self.entries.replace(merged);
                return;
            }
            if !namespace.always_declare {
                return;
            }
            self.entries.remove(&existing);
        }
        self.entries.insert(namespace);
    }

    /// Remove the declaration with the same URI and prefix.
    pub fn remove(&mut self, namespace: &Namespace) -> bool {
        self.entries.remove(namespace)
    }

    /// The declaration bound to a prefix.
    pub fn by_prefix(&self, prefix: &str) -> Option<&Namespace> {
        self.entries.iter().find(|entry| entry.prefix == prefix)
    }

    pub fn contains(&self, namespace: &Namespace) -> bool {
        self.entries.contains(namespace)
    }

    /// Declarations ordered by URI, then prefix.
    pub fn iter(&self) -> impl Iterator<Item = &Namespace> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<Namespace> for Namespaces {
    fn extend<T: IntoIterator<Item = Namespace>>(&mut self, iter: T) {
        for namespace in iter {
            self.add(namespace);
        }
    }
}

impl<'a> IntoIterator for &'a Namespaces {
    type Item = &'a Namespace;
    type IntoIter = std::collections::btree_set::Iter<'a, Namespace>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_order() {
        assert!(NamespaceUsage::VisiblyUsed > NamespaceUsage::NonVisiblyUsed);
        assert!(NamespaceUsage::NonVisiblyUsed > NamespaceUsage::Indeterminate);
    }

    #[test]
    fn test_always_declare_sticky() {
        let mut namespaces = Namespaces::new();
        namespaces.add(Namespace::new("urn:a", "a").always_declared());
        namespaces.add(Namespace::new("urn:a", "a"));
        assert!(namespaces.by_prefix("a").unwrap().always_declare());
    }

    #[test]
    fn test_display() {
        assert_eq!(Namespace::new("urn:a", "").to_string(), r#"xmlns="urn:a""#);
        assert_eq!(Namespace::new("urn:a", "a").to_string(), r#"xmlns:a="urn:a""#);
    }
}
