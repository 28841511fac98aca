mod common;

use common::{name, objects, register, Envelope, Item, BODY, ENVELOPE, NS};
use rstest::rstest;
use xmlbind::schema::{register_schema_types, xsd_type_name};
use xmlbind::{
    AnyElement, Config, Error, Namespace, NamespaceUsage, QName, UnknownElement, XmlObjects,
    XsString,
};

const MYSTERY: &str = r#"<t:Envelope xmlns:t="urn:test:envelope"><t:Body><t:Mystery a="1"><deep/></t:Mystery></t:Body></t:Envelope>"#;

fn permissive() -> XmlObjects {
    let mut objects = XmlObjects::with_config(Config::default().ignore_unknown_elements(true));
    register(&mut objects);
    objects
        .builders_mut()
        .set_default_builder(|_| Ok(Box::new(UnknownElement::new())));
    objects
}

#[test]
fn test_unmarshal_structure() {
    let mut objects = objects();
    let envelope = objects.parse_str(ENVELOPE).unwrap();
    assert!(objects.is::<Envelope>(envelope));
    assert_eq!(objects.element_name(envelope), &name("Envelope"));
    assert_eq!(objects.element_name(envelope).prefix(), Some("t"));
    let body = objects.child_slots(envelope)[BODY].unwrap();
    assert!(objects.is::<AnyElement>(body));
    let item = objects.children(body).next().unwrap();
    assert_eq!(objects.parent(item), Some(body));
    assert_eq!(objects.text(item, 0), Some("x"));
    assert_eq!(
        objects.value::<Item>(item).unwrap().id.as_deref(),
        Some("a1")
    );
}

#[test]
fn test_unmarshal_namespace_declarations() {
    let mut objects = objects();
    let envelope = objects.parse_str(ENVELOPE).unwrap();
    let namespace = objects.namespaces(envelope).by_prefix("t").unwrap();
    assert_eq!(namespace.uri(), NS);
    // the element name makes it visibly used, whatever the declaration says
    assert_eq!(namespace.usage(), NamespaceUsage::VisiblyUsed);

    let mut objects = XmlObjects::new();
    objects
        .builders_mut()
        .register_type::<AnyElement>(QName::without_namespace("doc"));
    let doc = objects.parse_str(r#"<doc xmlns:o="urn:other"/>"#).unwrap();
    let other = objects.namespaces(doc).by_prefix("o").unwrap();
    assert_eq!(other.usage(), NamespaceUsage::Indeterminate);
    assert!(objects.namespaces(doc).contains(&Namespace::new("urn:other", "o")));
}

#[test]
fn test_unknown_root_element() {
    let mut objects = objects();
    assert!(matches!(
        objects.parse_str(r#"<nope/>"#),
        Err(Error::UnknownElement(name)) if name == QName::without_namespace("nope")
    ));
}

#[test]
fn test_unknown_child_fails_by_default() {
    let mut objects = objects();
    objects
        .builders_mut()
        .set_default_builder(|_| Ok(Box::new(UnknownElement::new())));
    assert!(matches!(
        objects.parse_str(MYSTERY),
        Err(Error::UnknownElement(name)) if name == common::name("Mystery")
    ));
}

#[test]
fn test_unclaimed_child_fails_by_default() {
    let mut objects = objects();
    let xml = r#"<t:Envelope xmlns:t="urn:test:envelope"><t:Item>x</t:Item></t:Envelope>"#;
    assert!(matches!(
        objects.parse_str(xml),
        Err(Error::UnknownElement(name)) if name == common::name("Item")
    ));
}

#[test]
fn test_unknown_child_with_default_builder() {
    let mut objects = permissive();
    let envelope = objects.parse_str(MYSTERY).unwrap();
    let body = objects.child_slots(envelope)[BODY].unwrap();
    let mystery = objects.children(body).next().unwrap();
    assert!(objects.is::<UnknownElement>(mystery));
    assert_eq!(objects.element_name(mystery), &name("Mystery"));
    // unmodified, the tree serializes to its source
    assert_eq!(objects.to_xml_string(envelope).unwrap(), MYSTERY);
}

#[test]
fn test_unknown_content_survives_remarshal() {
    let mut objects = permissive();
    let envelope = objects.parse_str(MYSTERY).unwrap();
    let body = objects.child_slots(envelope)[BODY].unwrap();
    let item = objects.create(name("Item"), Item::default());
    objects.set_text(item, Some("new"), 0).unwrap();
    objects.push_child(body, item).unwrap();
    assert_eq!(
        objects.to_xml_string(envelope).unwrap(),
        r#"<t:Envelope xmlns:t="urn:test:envelope"><t:Body><t:Mystery xmlns:t="urn:test:envelope" a="1"><deep/></t:Mystery><t:Item>new</t:Item></t:Body></t:Envelope>"#
    );
}

#[test]
fn test_unknown_child_without_default_builder_fails() {
    let mut objects = XmlObjects::with_config(Config::default().ignore_unknown_elements(true));
    register(&mut objects);
    assert!(matches!(
        objects.parse_str(MYSTERY),
        Err(Error::UnknownElement(name)) if name == common::name("Mystery")
    ));
}

#[rstest]
#[case(r#"<t:Envelope xmlns:t="urn:test:envelope"><t:Mystery a="1"/><t:Body/></t:Envelope>"#, "Mystery")]
#[case(r#"<t:Envelope xmlns:t="urn:test:envelope"><t:Body/><t:Body/></t:Envelope>"#, "Body")]
fn test_unclaimed_child_fails_when_ignoring(#[case] xml: &str, #[case] local: &str) {
    let mut objects = permissive();
    assert!(matches!(
        objects.parse_str(xml),
        Err(Error::UnknownElement(name)) if name == common::name(local)
    ));
}

#[test]
fn test_unknown_attribute() {
    let xml = r#"<t:Item xmlns:t="urn:test:envelope" other="1">x</t:Item>"#;
    let mut objects = objects();
    assert!(matches!(
        objects.parse_str(xml),
        Err(Error::UnknownAttribute(name)) if name == QName::without_namespace("other")
    ));

    let mut objects = XmlObjects::with_config(Config::default().ignore_unknown_attributes(true));
    register(&mut objects);
    let item = objects.parse_str(xml).unwrap();
    assert_eq!(objects.text(item, 0), Some("x"));
}

#[test]
fn test_schema_instance_attributes() {
    let mut objects = XmlObjects::new();
    register_schema_types(objects.builders_mut());
    let xml = r#"<v xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="xsd:string" xsi:nil="false" xsi:noNamespaceSchemaLocation="v.xsd">text</v>"#;
    let v = objects.parse_str(xml).unwrap();
    assert!(objects.is::<XsString>(v));
    assert_eq!(objects.schema_type(v), Some(&xsd_type_name("string")));
    assert_eq!(objects.schema_type(v).unwrap().prefix(), Some("xsd"));
    assert_eq!(objects.nil_state(v), Some(false));
    assert!(!objects.nil(v));
    assert_eq!(objects.no_namespace_schema_location(v), Some("v.xsd"));
    assert_eq!(objects.value::<XsString>(v).unwrap().value(), Some("text"));

    objects.release_self(v);
    assert_eq!(objects.to_xml_string(v).unwrap(), xml);
}

#[test]
fn test_schema_type_with_unknown_prefix() {
    let mut objects = XmlObjects::new();
    register_schema_types(objects.builders_mut());
    let xml = r#"<v xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="nope:string"/>"#;
    assert!(matches!(
        objects.parse_str(xml),
        Err(Error::UnknownPrefix(prefix)) if prefix == "nope"
    ));
}

#[test]
fn test_unmarshal_as() {
    let mut objects = objects();
    let document = objects.dom_mut().parse(ENVELOPE).unwrap();
    let element = objects.dom().document_element(document).unwrap();
    assert!(matches!(
        objects.unmarshal_as::<Item>(element, false),
        Err(Error::UnmarshallingFailure(_))
    ));
    let envelope = objects.unmarshal_as::<Envelope>(element, true).unwrap();
    assert_eq!(objects.owned_document(envelope), Some(document));
}

#[test]
fn test_unmarshal_without_binding() {
    let mut objects = objects();
    let document = objects.dom_mut().parse(ENVELOPE).unwrap();
    let element = objects.dom().document_element(document).unwrap();
    let envelope = objects.unmarshal(element, false).unwrap();
    assert!(objects.owned_document(envelope).is_none());
    assert_eq!(objects.cached_node(envelope), Some(element));
}

#[test]
fn test_parse_bytes() {
    let mut objects = objects();
    let data = b"<?xml version=\"1.0\" encoding=\"iso-8859-1\"?><t:Item xmlns:t=\"urn:test:envelope\">caf\xe9</t:Item>";
    let item = objects.parse_bytes(data).unwrap();
    assert_eq!(objects.text(item, 0), Some("caf\u{e9}"));
}
