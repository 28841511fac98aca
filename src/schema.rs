//! Elements with simple schema type content.
//!
//! The value of these types is changed through
//! [`XmlObjects::assign`](crate::XmlObjects::assign) (or
//! [`XmlObjects::set_text`](crate::XmlObjects::set_text) for [`XsString`])
//! so the DOM cache stays coherent.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat};

use crate::builder::BuilderRegistry;
use crate::constants::{XSD_NS, XSD_PREFIX};
use crate::content::SimpleText;
use crate::error::Error;
use crate::namespace::{Namespace, NamespaceUsage};
use crate::object::{NamespaceScope, XmlObject};
use crate::qname::QName;
use crate::unknown::UnknownElement;

/// The `xsd:` name of a built-in schema type.
pub fn xsd_type_name(local: &str) -> QName {
    QName::with_prefix(XSD_NS, local, XSD_PREFIX)
}

/// Register builders for the simple types in this module under their
/// schema type names, and [`UnknownElement`] as the default builder.
pub fn register_schema_types(builders: &mut BuilderRegistry) {
    builders.register_type::<XsString>(xsd_type_name("string"));
    builders.register_type::<XsInteger>(xsd_type_name("integer"));
    builders.register_type::<XsQName>(xsd_type_name("QName"));
    builders.register_type::<XsDateTime>(xsd_type_name("dateTime"));
    builders.set_default_builder(|_| Ok(Box::new(UnknownElement::new())));
}

/// Text at positions other than 0 can only be whitespace.
fn simple_value(text: &str, position: usize) -> Result<Option<&str>, Error> {
    let trimmed = text.trim();
    match (position, trimmed.is_empty()) {
        (_, true) => Ok(None),
        (0, false) => Ok(Some(trimmed)),
        _ => Err(Error::UnmarshallingFailure(format!(
            "unexpected text {:?} in simple content",
            text
        ))),
    }
}

fn invalid(kind: &str, text: &str) -> Error {
    Error::UnmarshallingFailure(format!("{:?} is not a valid {}", text, kind))
}

/// `xsd:string` content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XsString {
    text: SimpleText,
}

impl XsString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> Option<&str> {
        self.text.text(0)
    }
}

impl XmlObject for XsString {
    fn simple_text(&self) -> Option<&SimpleText> {
        Some(&self.text)
    }

    fn simple_text_mut(&mut self) -> Option<&mut SimpleText> {
        Some(&mut self.text)
    }
}

/// `xsd:integer` content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XsInteger {
    value: Option<i64>,
}

impl XsInteger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> Option<i64> {
        self.value
    }

    /// The field, for [`XmlObjects::assign`](crate::XmlObjects::assign).
    pub fn value_mut(&mut self) -> &mut Option<i64> {
        &mut self.value
    }
}

impl XmlObject for XsInteger {
    fn text_content(&self, position: usize) -> Option<Cow<'_, str>> {
        match (position, self.value) {
            (0, Some(value)) => Some(Cow::Owned(value.to_string())),
            _ => None,
        }
    }

    fn process_text(
        &mut self,
        text: &str,
        position: usize,
        _scope: &NamespaceScope<'_>,
    ) -> Result<(), Error> {
        if let Some(value) = simple_value(text, position)? {
            let value = value.strip_prefix('+').unwrap_or(value);
            self.value = Some(value.parse().map_err(|_| invalid("integer", text))?);
        }
        Ok(())
    }
}

/// `xsd:QName` content. Its namespace is declared on the element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XsQName {
    value: Option<QName>,
}

impl XsQName {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> Option<&QName> {
        self.value.as_ref()
    }

    /// The field, for
    /// [`XmlObjects::assign_qname`](crate::XmlObjects::assign_qname).
    pub fn value_mut(&mut self) -> &mut Option<QName> {
        &mut self.value
    }
}

impl XmlObject for XsQName {
    fn extra_namespaces(&self) -> Vec<Namespace> {
        self.value
            .iter()
            .filter(|name| name.has_namespace() && name.has_prefix())
            .map(|name| {
                Namespace::new(name.namespace_str(), name.prefix_str())
                    .with_usage(NamespaceUsage::NonVisiblyUsed)
            })
            .collect()
    }

    fn text_content(&self, position: usize) -> Option<Cow<'_, str>> {
        match (position, &self.value) {
            (0, Some(name)) => Some(Cow::Owned(name.lexical())),
            _ => None,
        }
    }

    fn process_text(
        &mut self,
        text: &str,
        position: usize,
        scope: &NamespaceScope<'_>,
    ) -> Result<(), Error> {
        if let Some(value) = simple_value(text, position)? {
            self.value = Some(scope.resolve_qname(value)?);
        }
        Ok(())
    }
}

/// `xsd:dateTime` content.
///
/// A value without a timezone is taken to be UTC. Values are written in
/// RFC 3339 form, with `Z` for UTC.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XsDateTime {
    value: Option<DateTime<FixedOffset>>,
}

impl XsDateTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> Option<DateTime<FixedOffset>> {
        self.value
    }

    /// The field, for [`XmlObjects::assign`](crate::XmlObjects::assign).
    pub fn value_mut(&mut self) -> &mut Option<DateTime<FixedOffset>> {
        &mut self.value
    }
}

/// Parse an `xsd:dateTime` lexical value.
pub fn parse_date_time(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text).ok().or_else(|| {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}

impl XmlObject for XsDateTime {
    fn text_content(&self, position: usize) -> Option<Cow<'_, str>> {
        match (position, &self.value) {
            (0, Some(value)) => Some(Cow::Owned(
                value.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            )),
            _ => None,
        }
    }

    fn process_text(
        &mut self,
        text: &str,
        position: usize,
        _scope: &NamespaceScope<'_>,
    ) -> Result<(), Error> {
        if let Some(value) = simple_value(text, position)? {
            self.value = Some(parse_date_time(value).ok_or_else(|| invalid("dateTime", text))?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_parse_date_time_with_offset() {
        let value = parse_date_time("2024-03-01T12:30:00+02:00").unwrap();
        assert_eq!(value.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn test_parse_date_time_without_timezone_is_utc() {
        let value = parse_date_time("2024-03-01T12:30:00").unwrap();
        assert_eq!(value, Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_date_time_invalid() {
        assert_eq!(parse_date_time("yesterday"), None);
    }

    #[test]
    fn test_simple_value_positions() {
        assert_eq!(simple_value(" 5 ", 0).unwrap(), Some("5"));
        assert_eq!(simple_value("\n", 3).unwrap(), None);
        assert!(simple_value("x", 1).is_err());
    }
}
