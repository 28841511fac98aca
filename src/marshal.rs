use std::borrow::Cow;

use tracing::debug;

use crate::constants::{
    xsi_nil_name, xsi_no_namespace_schema_location_name, xsi_schema_location_name,
    xsi_type_name, XML_PREFIX, XSI_NS, XSI_PREFIX,
};
use crate::dom::DomNode;
use crate::error::Error;
use crate::namespace::{Namespace, NamespaceUsage};
use crate::object::ObjectId;
use crate::objects::XmlObjects;

/// ## Marshalling
///
/// Marshalling turns an object tree into DOM. An object whose cached DOM
/// is still valid for the target document is reused as is; anything else
/// is built from the object's state.
impl XmlObjects {
    /// Marshal an object as the document element of `document`.
    ///
    /// Without a document, a new document is created and the object takes
    /// ownership of it. If marshalling fails, a document created here is
    /// released again.
    pub fn marshal(&mut self, id: ObjectId, document: Option<DomNode>) -> Result<DomNode, Error> {
        if let Some(cached) = self.cached_node(id) {
            let reusable = match document {
                None => true,
                Some(document) => self.dom.owner_document(cached) == Some(document),
            };
            if reusable {
                if let Some(document) = document {
                    self.dom.set_document_element(document, cached)?;
                }
                self.release_ancestors(id, true);
                return Ok(cached);
            }
        }
        // the rebuild may detach the old DOM, so save foreign content now
        self.release_self_and_descendants(id);

        let (document, bind_document) = match document {
            Some(document) => (document, false),
            None => (self.dom.new_document(), true),
        };
        match self.build_dom(id, document) {
            Ok(element) => {
                self.set_cached_node(id, Some(element), bind_document);
                self.release_ancestors(id, true);
                Ok(element)
            }
            Err(err) => {
                if bind_document {
                    self.dom.release_document(document);
                }
                Err(err)
            }
        }
    }

    /// Marshal an object as the last child of a DOM element.
    pub fn marshal_into(&mut self, id: ObjectId, parent: DomNode) -> Result<DomNode, Error> {
        if self.dom.element(parent).is_none() {
            return Err(Error::MarshallingFailure(
                "can only marshal into an element".into(),
            ));
        }
        if let Some(cached) = self.cached_node(id) {
            let target = self.dom.owner_document_id(parent);
            if target.is_some() && target == self.dom.owner_document_id(cached) {
                if self.dom.parent(cached) != Some(parent) {
                    self.dom.append(parent, cached)?;
                    self.release_ancestors(id, true);
                }
                return Ok(cached);
            }
        }
        self.release_self_and_descendants(id);
        let element = self.build_dom(id, parent)?;
        self.set_cached_node(id, Some(element), false);
        self.release_ancestors(id, true);
        Ok(element)
    }

    /// Marshal an object and serialize the result.
    pub fn to_xml_string(&mut self, id: ObjectId) -> Result<String, Error> {
        let element = self.marshal(id, None)?;
        self.dom.to_string(element)
    }

    /// Create the DOM element for an object under `parent`, which is either
    /// a document root or an element.
    fn build_dom(&mut self, id: ObjectId, parent: DomNode) -> Result<DomNode, Error> {
        if self.node(id).value.foreign_content().is_some() {
            return self.build_foreign_dom(id, parent);
        }
        let name = self.element_name(id).clone();
        debug!(element = %name, "marshalling");
        let element = self.dom.new_element(name);
        self.attach(parent, element)?;

        self.marshal_schema_instance(id, element)?;
        self.marshal_namespaces(id, element)?;
        self.marshal_attributes(id, element)?;

        let children: Vec<ObjectId> = self.children(id).collect();
        let mut position = 0;
        for child in children {
            self.marshal_text(id, element, position)?;
            self.marshal_into(child, element)?;
            position += 1;
        }
        self.marshal_text(id, element, position)?;
        Ok(element)
    }

    /// Rebuild preserved foreign content from its serialized form.
    fn build_foreign_dom(&mut self, id: ObjectId, parent: DomNode) -> Result<DomNode, Error> {
        let xml = self
            .node(id)
            .value
            .foreign_content()
            .and_then(|foreign| foreign.xml())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::MarshallingFailure(format!(
                    "no content preserved for {}",
                    self.element_name(id)
                ))
            })?;
        debug!(element = %self.element_name(id), "marshalling preserved content");
        let scratch = self.dom.parse(&xml)?;
        let element = match self.dom.document_element(scratch) {
            Some(source) => self.dom.import_node(source),
            None => {
                self.dom.release_document(scratch);
                return Err(Error::NoDocumentElement);
            }
        };
        self.dom.release_document(scratch);
        self.attach(parent, element)?;
        if let Some(foreign) = self.node_mut(id).value.foreign_content_mut() {
            foreign.xml = None;
        }
        Ok(element)
    }

    fn attach(&mut self, parent: DomNode, element: DomNode) -> Result<(), Error> {
        if self.dom.document_id(parent).is_some() {
            self.dom.set_document_element(parent, element)
        } else {
            self.dom.append(parent, element)
        }
    }

    /// `xsi:type`, `xsi:nil` and the schema locations.
    fn marshal_schema_instance(&mut self, id: ObjectId, element: DomNode) -> Result<(), Error> {
        let core = &self.node(id).core;
        let mut attributes = Vec::new();
        if let Some(schema_type) = &core.schema_type {
            if schema_type.local_name().is_empty() {
                return Err(Error::MarshallingFailure(format!(
                    "schema type of {} has an empty local name",
                    core.element_name
                )));
            }
            attributes.push((xsi_type_name(), schema_type.lexical()));
        }
        if let Some(nil) = core.nil {
            attributes.push((xsi_nil_name(), nil.to_string()));
        }
        if let Some(location) = &core.schema_location {
            attributes.push((xsi_schema_location_name(), location.clone()));
        }
        if let Some(location) = &core.no_namespace_schema_location {
            attributes.push((xsi_no_namespace_schema_location_name(), location.clone()));
        }
        if attributes.is_empty() {
            return Ok(());
        }
        self.add_namespace(
            id,
            Namespace::new(XSI_NS, XSI_PREFIX).with_usage(NamespaceUsage::VisiblyUsed),
        );
        let dom_element = self.dom.element_mut(element).ok_or_else(not_an_element)?;
        for (name, value) in attributes {
            dom_element.set_attribute(name, value);
        }
        Ok(())
    }

    /// Declare the namespaces of the object that are not already in scope.
    fn marshal_namespaces(&mut self, id: ObjectId, element: DomNode) -> Result<(), Error> {
        let node = self.node(id);
        let mut namespaces = node.core.namespaces.clone();
        namespaces.extend(node.value.extra_namespaces());

        let parent = self.dom.parent(element);
        let mut declarations = Vec::new();
        for namespace in namespaces.iter() {
            let prefix = namespace.prefix();
            if prefix == XML_PREFIX {
                continue;
            }
            let in_scope = parent.and_then(|parent| self.dom.lookup_namespace_uri(parent, prefix));
            if namespace.uri().is_empty() {
                // only the default namespace can be undeclared, and only if
                // an ancestor declared one
                if !prefix.is_empty() || in_scope.map_or(true, str::is_empty) {
                    continue;
                }
            }
            if in_scope == Some(namespace.uri()) && !namespace.always_declare() {
                continue;
            }
            declarations.push((prefix.to_string(), namespace.uri().to_string()));
        }

        let dom_element = self.dom.element_mut(element).ok_or_else(not_an_element)?;
        for (prefix, uri) in declarations {
            dom_element.declare_namespace(prefix, uri);
        }
        Ok(())
    }

    /// Type-specific attributes, then extension attributes.
    fn marshal_attributes(&mut self, id: ObjectId, element: DomNode) -> Result<(), Error> {
        let value = &self.arena[id.get()].get().value;
        let dom_element = self.dom.element_mut(element).ok_or_else(not_an_element)?;
        value.marshal_attributes(dom_element).map_err(|err| match err {
            err @ Error::MarshallingFailure(_) => err,
            err => Error::MarshallingFailure(err.to_string()),
        })?;
        if let Some(attributes) = value.extension_attributes() {
            for (name, attribute_value) in attributes.iter() {
                dom_element.set_attribute(name.clone(), attribute_value.as_str());
                if attributes.is_id(name) {
                    dom_element.set_id_attribute(name);
                }
            }
        }
        Ok(())
    }

    fn marshal_text(&mut self, id: ObjectId, element: DomNode, position: usize) -> Result<(), Error> {
        let text = self
            .node(id)
            .value
            .text_content(position)
            .map(Cow::into_owned);
        match text {
            Some(text) if !text.is_empty() => self.dom.append_text(element, &text),
            _ => Ok(()),
        }
    }
}

fn not_an_element() -> Error {
    Error::MarshallingFailure("DOM node is not an element".into())
}
