#![allow(dead_code)]

use xmlbind::{
    AnyElement, ComplexContent, DomElement, Error, ObjectId, QName, SimpleText, XmlObject,
    XmlObjects,
};

pub const NS: &str = "urn:test:envelope";

pub const HEADER: usize = 0;
pub const BODY: usize = 1;

pub fn name(local: &str) -> QName {
    QName::with_prefix(NS, local, "t")
}

/// An element with two named child slots, `Header` and `Body`.
#[derive(Debug, Clone)]
pub struct Envelope {
    content: ComplexContent,
}

impl Default for Envelope {
    fn default() -> Self {
        Envelope {
            content: ComplexContent::with_named_slots(2),
        }
    }
}

impl XmlObject for Envelope {
    fn complex_content(&self) -> Option<&ComplexContent> {
        Some(&self.content)
    }

    fn complex_content_mut(&mut self) -> Option<&mut ComplexContent> {
        Some(&mut self.content)
    }

    fn process_child(&mut self, name: &QName, child: ObjectId) -> Result<bool, Error> {
        let slot = match name.local_name() {
            "Header" => HEADER,
            "Body" => BODY,
            _ => return Ok(false),
        };
        if name.namespace_str() != NS || self.content.slot(slot).is_some() {
            return Ok(false);
        }
        self.content.set_slot(slot, Some(child));
        Ok(true)
    }
}

/// Simple text content with an optional unqualified `id` attribute.
#[derive(Debug, Clone, Default)]
pub struct Item {
    text: SimpleText,
    pub id: Option<String>,
}

impl Item {
    pub fn id_mut(&mut self) -> &mut Option<String> {
        &mut self.id
    }
}

impl XmlObject for Item {
    fn simple_text(&self) -> Option<&SimpleText> {
        Some(&self.text)
    }

    fn simple_text_mut(&mut self) -> Option<&mut SimpleText> {
        Some(&mut self.text)
    }

    fn marshal_attributes(&self, element: &mut DomElement) -> Result<(), Error> {
        if let Some(id) = &self.id {
            element.set_attribute(QName::without_namespace("id"), id.as_str());
        }
        Ok(())
    }

    fn process_attribute(&mut self, name: &QName, value: &str) -> Result<bool, Error> {
        if name == &QName::without_namespace("id") {
            self.id = Some(value.to_string());
            return Ok(true);
        }
        Ok(false)
    }
}

/// Holds no content at all.
#[derive(Debug, Clone, Default)]
pub struct Marker;

impl XmlObject for Marker {}

/// Refuses to be marshalled.
#[derive(Debug, Clone, Default)]
pub struct Broken;

impl XmlObject for Broken {
    fn marshal_attributes(&self, _element: &mut DomElement) -> Result<(), Error> {
        Err(Error::MarshallingFailure("broken".into()))
    }
}

/// A context knowing the test vocabulary.
pub fn objects() -> XmlObjects {
    let mut objects = XmlObjects::new();
    register(&mut objects);
    objects
}

pub fn register(objects: &mut XmlObjects) {
    let builders = objects.builders_mut();
    builders.register_type::<Envelope>(name("Envelope"));
    builders.register_type::<AnyElement>(name("Header"));
    builders.register_type::<AnyElement>(name("Body"));
    builders.register_type::<Item>(name("Item"));
    builders.register_type::<Marker>(name("Marker"));
}

pub const ENVELOPE: &str = r#"<t:Envelope xmlns:t="urn:test:envelope"><t:Header/><t:Body><t:Item id="a1">x</t:Item></t:Body></t:Envelope>"#;

/// Envelope, Body and Item built in code.
pub fn build_envelope(objects: &mut XmlObjects) -> (ObjectId, ObjectId, ObjectId) {
    let envelope = objects.create(name("Envelope"), Envelope::default());
    let body = objects.create(name("Body"), AnyElement::new());
    let item = objects.create(name("Item"), Item::default());
    objects.set_text(item, Some("hello"), 0).unwrap();
    objects.push_child(body, item).unwrap();
    objects.set_child(envelope, BODY, Some(body)).unwrap();
    (envelope, body, item)
}
