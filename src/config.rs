/// Policies the engine consults while unmarshalling.
///
/// ```rust
/// use xmlbind::Config;
///
/// let config = Config::default().ignore_unknown_elements(true);
/// assert!(config.ignores_unknown_elements());
/// assert!(!config.ignores_unknown_attributes());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    ignore_unknown_elements: bool,
    ignore_unknown_attributes: bool,
}

impl Config {
    /// When set, elements without a builder are built by the default
    /// builder, and children no type claims are dropped. When unset, both
    /// fail with [`Error::UnknownElement`](crate::Error::UnknownElement).
    pub fn ignore_unknown_elements(mut self, ignore: bool) -> Self {
        self.ignore_unknown_elements = ignore;
        self
    }

    /// When set, attributes no type claims are skipped instead of failing
    /// with [`Error::UnknownAttribute`](crate::Error::UnknownAttribute).
    pub fn ignore_unknown_attributes(mut self, ignore: bool) -> Self {
        self.ignore_unknown_attributes = ignore;
        self
    }

    pub fn ignores_unknown_elements(&self) -> bool {
        self.ignore_unknown_elements
    }

    pub fn ignores_unknown_attributes(&self) -> bool {
        self.ignore_unknown_attributes
    }

    pub fn set_ignore_unknown_elements(&mut self, ignore: bool) {
        self.ignore_unknown_elements = ignore;
    }

    pub fn set_ignore_unknown_attributes(&mut self, ignore: bool) {
        self.ignore_unknown_attributes = ignore;
    }
}
