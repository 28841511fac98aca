use tracing::debug;

use crate::constants::{
    xsi_type_name, XSI_NIL, XSI_NO_NAMESPACE_SCHEMA_LOCATION, XSI_NS, XSI_SCHEMA_LOCATION,
    XSI_TYPE,
};
use crate::dom::{DomElement, DomNode, DomValue};
use crate::error::Error;
use crate::manipulation::parse_nil_token;
use crate::namespace::{Namespace, NamespaceUsage};
use crate::object::{NamespaceScope, ObjectId, XmlObject};
use crate::objects::XmlObjects;
use crate::qname::QName;

/// ## Unmarshalling
///
/// Unmarshalling builds an object tree from DOM. Each element is built by
/// the builder registered for its `xsi:type` or its name; its attributes,
/// children and text are then offered to the hooks of the concrete type.
/// Every object caches the element it was built from.
impl XmlObjects {
    /// Unmarshal a DOM element into a new object tree.
    ///
    /// With `bind_document` the root object takes ownership of the
    /// element's document.
    pub fn unmarshal(&mut self, element: DomNode, bind_document: bool) -> Result<ObjectId, Error> {
        let id = self.unmarshal_element(element)?;
        if bind_document {
            self.set_cached_node(id, Some(element), true);
        }
        Ok(id)
    }

    /// Unmarshal a DOM element that must turn into a `T`.
    ///
    /// Fails with [`Error::UnmarshallingFailure`] if the element resolves
    /// to another type.
    pub fn unmarshal_as<T: XmlObject>(
        &mut self,
        element: DomNode,
        bind_document: bool,
    ) -> Result<ObjectId, Error> {
        let id = self.unmarshal(element, bind_document)?;
        if self.is::<T>(id) {
            return Ok(id);
        }
        let message = format!(
            "{} does not unmarshal to {}",
            self.element_name(id),
            std::any::type_name::<T>()
        );
        self.remove(id);
        Err(Error::UnmarshallingFailure(message))
    }

    /// Parse XML and unmarshal its document element. The root object owns
    /// the document.
    ///
    /// ```rust
    /// use xmlbind::{AnyElement, QName, XmlObjects};
    ///
    /// let mut objects = XmlObjects::new();
    /// objects
    ///     .builders_mut()
    ///     .register_type::<AnyElement>(QName::new("urn:example", "doc"));
    /// let root = objects.parse_str(r#"<doc xmlns="urn:example">hello</doc>"#)?;
    /// assert_eq!(objects.text(root, 0), Some("hello"));
    /// # Ok::<(), xmlbind::Error>(())
    /// ```
    pub fn parse_str(&mut self, xml: &str) -> Result<ObjectId, Error> {
        let document = self.dom.parse(xml)?;
        self.unmarshal_document(document)
    }

    /// Parse XML bytes in any encoding and unmarshal the document element.
    pub fn parse_bytes(&mut self, data: &[u8]) -> Result<ObjectId, Error> {
        let document = self.dom.parse_bytes(data)?;
        self.unmarshal_document(document)
    }

    fn unmarshal_document(&mut self, document: DomNode) -> Result<ObjectId, Error> {
        let result = match self.dom.document_element(document) {
            Some(element) => self.unmarshal(element, true),
            None => Err(Error::NoDocumentElement),
        };
        if result.is_err() {
            self.dom.release_document(document);
        }
        result
    }

    fn unmarshal_element(&mut self, element: DomNode) -> Result<ObjectId, Error> {
        self.unmarshal_element_with(element, false)
    }

    /// Unmarshal an element, building it with the default builder if
    /// `use_default` is set.
    fn unmarshal_element_with(
        &mut self,
        element: DomNode,
        use_default: bool,
    ) -> Result<ObjectId, Error> {
        let dom_element = self
            .dom
            .element(element)
            .cloned()
            .ok_or_else(|| Error::UnmarshallingFailure("DOM node is not an element".into()))?;
        let element_name = dom_element.name().clone();
        let schema_type = match dom_element.attribute(&xsi_type_name()) {
            Some(lexical) => Some(NamespaceScope::new(&self.dom, element).resolve_qname(lexical)?),
            None => None,
        };
        debug!(element = %element_name, "unmarshalling");
        let value = if use_default {
            self.builders
                .build_default(&element_name, schema_type.as_ref())
                .map_err(|_| Error::UnknownElement(element_name.clone()))?
        } else {
            self.build_for_element(&element_name, schema_type.as_ref())?
        };
        let id = self.create_boxed(element_name, value);
        match self.unmarshal_content(id, element, &dom_element, schema_type) {
            Ok(()) => Ok(id),
            Err(err) => {
                self.remove(id);
                Err(err)
            }
        }
    }

    fn unmarshal_content(
        &mut self,
        id: ObjectId,
        element: DomNode,
        dom_element: &DomElement,
        schema_type: Option<QName>,
    ) -> Result<(), Error> {
        if self.node(id).value.foreign_content().is_some() {
            self.set_cached_node(id, Some(element), false);
            if self.dom.owner_document(element).is_none() {
                // nothing keeps a fragment alive, so keep the text instead
                self.release_self(id);
            }
            return Ok(());
        }

        if let Some(schema_type) = schema_type {
            self.set_schema_type(id, Some(schema_type));
        }
        for (prefix, uri) in dom_element.namespace_declarations() {
            self.add_namespace(id, Namespace::new(uri.as_str(), prefix.as_str()));
        }
        for attribute in dom_element.attributes() {
            self.unmarshal_attribute(id, attribute.name(), attribute.value())?;
        }
        self.unmarshal_children(id, element)?;
        self.set_cached_node(id, Some(element), false);
        Ok(())
    }

    fn unmarshal_attribute(&mut self, id: ObjectId, name: &QName, value: &str) -> Result<(), Error> {
        if name.namespace_str() == XSI_NS {
            let core = self.core_mut(id);
            match name.local_name() {
                XSI_TYPE => return Ok(()),
                XSI_NIL => {
                    core.nil = parse_nil_token(value);
                    return Ok(());
                }
                XSI_SCHEMA_LOCATION => {
                    core.schema_location = Some(value.to_string());
                    return Ok(());
                }
                XSI_NO_NAMESPACE_SCHEMA_LOCATION => {
                    core.no_namespace_schema_location = Some(value.to_string());
                    return Ok(());
                }
                _ => {}
            }
        }
        if self.node_mut(id).value.process_attribute(name, value)? {
            if name.has_namespace() {
                self.add_namespace(
                    id,
                    Namespace::new(name.namespace_str(), name.prefix_str())
                        .with_usage(NamespaceUsage::VisiblyUsed),
                );
            }
            Ok(())
        } else if self.config.ignores_unknown_attributes() {
            debug!(element = %self.element_name(id), attribute = %name, "ignoring unknown attribute");
            Ok(())
        } else {
            Err(Error::UnknownAttribute(name.clone()))
        }
    }

    fn unmarshal_children(&mut self, id: ObjectId, element: DomNode) -> Result<(), Error> {
        let children: Vec<DomNode> = self.dom.children(element).collect();
        let mut position = 0;
        let mut text = String::new();
        for child in children {
            match self.dom.value(child) {
                DomValue::Element(child_element) => {
                    let name = child_element.name().clone();
                    self.unmarshal_child(id, child, name)?;
                    self.unmarshal_text(id, element, &text, position)?;
                    text.clear();
                    position += 1;
                }
                DomValue::Text(content) => text.push_str(content),
                _ => {}
            }
        }
        self.unmarshal_text(id, element, &text, position)
    }

    /// Unmarshal a child element and offer it to the parent.
    ///
    /// A child the parent does not claim is built again with the default
    /// builder when unknown elements are ignored, and offered once more.
    fn unmarshal_child(&mut self, id: ObjectId, child: DomNode, name: QName) -> Result<(), Error> {
        let child_id = self.unmarshal_element(child)?;
        if self.offer_child(id, child_id, &name)? {
            return Ok(());
        }
        if !(self.config.ignores_unknown_elements() && self.builders.has_default_builder()) {
            return Err(Error::UnknownElement(name));
        }
        debug!(element = %self.element_name(id), child = %name, "rebuilding unclaimed element with default builder");
        let child_id = self.unmarshal_element_with(child, true)?;
        if self.offer_child(id, child_id, &name)? {
            Ok(())
        } else {
            Err(Error::UnknownElement(name))
        }
    }

    /// Pass a child to the `process_child` hook of its parent. An unclaimed
    /// child is removed again.
    fn offer_child(&mut self, id: ObjectId, child_id: ObjectId, name: &QName) -> Result<bool, Error> {
        let claimed = match self.node_mut(id).value.process_child(name, child_id) {
            Ok(claimed) => claimed,
            Err(err) => {
                self.remove(child_id);
                return Err(err);
            }
        };
        if !claimed {
            self.remove(child_id);
            return Ok(false);
        }
        let stored = self
            .node(id)
            .value
            .complex_content()
            .map_or(false, |content| content.contains(child_id));
        if !stored {
            self.remove(child_id);
            return Err(Error::UnmarshallingFailure(format!(
                "{} claimed {} without storing it",
                self.element_name(id),
                name
            )));
        }
        id.get().append(child_id.get(), &mut self.arena);
        Ok(true)
    }

    fn unmarshal_text(
        &mut self,
        id: ObjectId,
        element: DomNode,
        text: &str,
        position: usize,
    ) -> Result<(), Error> {
        if text.is_empty() {
            return Ok(());
        }
        let scope = NamespaceScope::new(&self.dom, element);
        self.arena[id.get()]
            .get_mut()
            .value
            .process_text(text, position, &scope)
    }
}
