use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// A qualified name: namespace URI, local name and an optional prefix.
///
/// The prefix is presentation only. Two names with the same namespace and
/// local name are equal whatever their prefixes, and hash and order the
/// same way, so a `QName` can key hash maps and ordered containers.
///
/// An empty namespace or prefix means "not set".
///
/// ```rust
/// use xmlbind::QName;
///
/// let a = QName::with_prefix("urn:example", "item", "ex");
/// let b = QName::new("urn:example", "item");
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "ex:item");
/// assert_eq!(b.to_string(), "{urn:example}item");
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QName {
    namespace: String,
    local: String,
    prefix: String,
}

impl QName {
    /// A name in a namespace, without a prefix.
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
            prefix: String::new(),
        }
    }

    /// A name in a namespace, rendered with the given prefix.
    pub fn with_prefix(
        namespace: impl Into<String>,
        local: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
            prefix: prefix.into(),
        }
    }

    /// A name in no namespace.
    pub fn without_namespace(local: impl Into<String>) -> Self {
        Self::new("", local)
    }

    /// The namespace URI, if the name is in a namespace.
    pub fn namespace_uri(&self) -> Option<&str> {
        (!self.namespace.is_empty()).then_some(self.namespace.as_str())
    }

    /// The namespace URI, empty when not in a namespace.
    pub fn namespace_str(&self) -> &str {
        &self.namespace
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// The prefix, if one is set.
    pub fn prefix(&self) -> Option<&str> {
        (!self.prefix.is_empty()).then_some(self.prefix.as_str())
    }

    /// The prefix, empty when not set.
    pub fn prefix_str(&self) -> &str {
        &self.prefix
    }

    pub fn has_prefix(&self) -> bool {
        !self.prefix.is_empty()
    }

    pub fn has_namespace(&self) -> bool {
        !self.namespace.is_empty()
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    /// The same name with another prefix.
    pub fn prefixed(&self, prefix: impl Into<String>) -> Self {
        Self {
            namespace: self.namespace.clone(),
            local: self.local.clone(),
            prefix: prefix.into(),
        }
    }

    /// The lexical `prefix:local` form used in XML, or just `local`.
    pub fn lexical(&self) -> String {
        if self.has_prefix() {
            format!("{}:{}", self.prefix, self.local)
        } else {
            self.local.clone()
        }
    }
}

/// Split a lexical qualified name into prefix and local part.
///
/// A name without a colon has an empty prefix.
pub fn split_lexical(name: &str) -> (&str, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", name),
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.local == other.local
    }
}

impl Eq for QName {}

impl Hash for QName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.local.hash(state);
    }
}

impl PartialOrd for QName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.namespace
            .cmp(&other.namespace)
            .then_with(|| self.local.cmp(&other.local))
    }
}

impl Display for QName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.has_prefix() {
            write!(f, "{}:{}", self.prefix, self.local)
        } else if self.has_namespace() {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        } else {
            write!(f, "{}", self.local)
        }
    }
}
