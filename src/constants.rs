//! Namespace URIs, prefixes and names the engine treats specially.

use crate::qname::QName;

/// The namespace bound to the `xml` prefix. It is never declared.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";
pub const XML_PREFIX: &str = "xml";

/// The namespace of namespace declaration attributes.
pub const XMLNS_NS: &str = "http://www.w3.org/2000/xmlns/";
pub const XMLNS_PREFIX: &str = "xmlns";

/// XML Schema instance namespace (`xsi:type`, `xsi:nil`, ...).
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XSI_PREFIX: &str = "xsi";

/// XML Schema namespace, home of the built-in simple types.
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
pub const XSD_PREFIX: &str = "xsd";

pub(crate) const XSI_TYPE: &str = "type";
pub(crate) const XSI_NIL: &str = "nil";
pub(crate) const XSI_SCHEMA_LOCATION: &str = "schemaLocation";
pub(crate) const XSI_NO_NAMESPACE_SCHEMA_LOCATION: &str = "noNamespaceSchemaLocation";

/// `xsi:type`
pub fn xsi_type_name() -> QName {
    QName::with_prefix(XSI_NS, XSI_TYPE, XSI_PREFIX)
}

/// `xsi:nil`
pub fn xsi_nil_name() -> QName {
    QName::with_prefix(XSI_NS, XSI_NIL, XSI_PREFIX)
}

/// `xsi:schemaLocation`
pub fn xsi_schema_location_name() -> QName {
    QName::with_prefix(XSI_NS, XSI_SCHEMA_LOCATION, XSI_PREFIX)
}

/// `xsi:noNamespaceSchemaLocation`
pub fn xsi_no_namespace_schema_location_name() -> QName {
    QName::with_prefix(XSI_NS, XSI_NO_NAMESPACE_SCHEMA_LOCATION, XSI_PREFIX)
}

/// `xml:id`
pub fn xml_id_name() -> QName {
    QName::with_prefix(XML_NS, "id", XML_PREFIX)
}
