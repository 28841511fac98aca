mod common;

use common::{name, Item};
use xmlbind::schema::{register_schema_types, xsd_type_name};
use xmlbind::{
    AnyElement, BuildRequest, BuilderRegistry, Config, Error, ObjectBase, QName, XmlObjects,
    XsInteger, XsString,
};

#[test]
fn test_schema_type_wins_over_element_name() {
    let mut builders = BuilderRegistry::new();
    register_schema_types(&mut builders);
    builders.register_type::<Item>(name("Item"));
    let by_type = builders
        .build(&name("Item"), Some(&xsd_type_name("integer")))
        .unwrap();
    assert!(by_type.as_any().is::<XsInteger>());
    // an unregistered type falls back to the element name
    let by_name = builders
        .build(&name("Item"), Some(&QName::new("urn:types", "other")))
        .unwrap();
    assert!(by_name.as_any().is::<Item>());
}

#[test]
fn test_builder_sees_request() {
    let mut builders = BuilderRegistry::new();
    builders.register(name("Item"), |request: &BuildRequest| {
        if request.schema_type.is_some() {
            return Err(Error::UnmarshallingFailure("typed items are not supported".into()));
        }
        Ok(Box::new(Item::default()))
    });
    assert!(builders.build(&name("Item"), None).is_ok());
    assert!(matches!(
        builders.build(&name("Item"), Some(&QName::new("urn:types", "other"))),
        Err(Error::UnmarshallingFailure(_))
    ));
}

#[test]
fn test_deregister() {
    let mut builders = BuilderRegistry::new();
    builders.register_type::<XsString>(name("Item"));
    assert!(builders.deregister(&name("Item")));
    assert!(!builders.is_registered(&name("Item")));
    assert!(matches!(
        builders.build(&name("Item"), None),
        Err(Error::UnknownPluginType(_))
    ));
}

#[test]
fn test_deregister_all_drops_default() {
    let mut builders = BuilderRegistry::new();
    register_schema_types(&mut builders);
    assert!(builders.has_default_builder());
    builders.deregister_all();
    assert!(!builders.has_default_builder());
    assert!(!builders.is_registered(&xsd_type_name("string")));
    assert!(builders.build_default(&name("Item"), None).is_err());
}

#[test]
fn test_default_builder_only_when_ignoring() {
    let mut objects = XmlObjects::new();
    objects
        .builders_mut()
        .set_default_builder(|_| Ok(Box::new(AnyElement::new())));
    let xml = r#"<free>text</free>"#;
    assert!(matches!(
        objects.parse_str(xml),
        Err(Error::UnknownElement(_))
    ));
    objects.config_mut().set_ignore_unknown_elements(true);
    let free = objects.parse_str(xml).unwrap();
    assert!(objects.is::<AnyElement>(free));
    assert_eq!(objects.text(free, 0), Some("text"));

    objects.builders_mut().remove_default_builder();
    assert!(matches!(
        objects.parse_str(xml),
        Err(Error::UnknownElement(_))
    ));
}

#[test]
fn test_build_sets_schema_type() {
    let mut objects = XmlObjects::with_config(Config::default());
    register_schema_types(objects.builders_mut());
    let id = objects
        .build(name("Item"), Some(xsd_type_name("string")))
        .unwrap();
    assert!(objects.is::<XsString>(id));
    assert_eq!(objects.element_name(id), &name("Item"));
    assert_eq!(objects.schema_type(id), Some(&xsd_type_name("string")));
}
