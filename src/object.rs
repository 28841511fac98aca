use std::any::Any;
use std::borrow::Cow;
use std::fmt::Debug;

use indextree::NodeId;

use crate::content::{ComplexContent, ForeignContent, SimpleText};
use crate::dom::{Dom, DomElement, DomNode};
use crate::error::Error;
use crate::extension::{is_registered_id_attribute, ExtensionAttributes};
use crate::namespace::{Namespace, NamespaceUsage};
use crate::qname::{split_lexical, QName};

/// An object in the tree.
/// This is a lightweight value and can be copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(NodeId);

impl ObjectId {
    #[inline]
    pub(crate) fn new(node_id: NodeId) -> Self {
        ObjectId(node_id)
    }

    #[inline]
    pub(crate) fn get(&self) -> NodeId {
        self.0
    }
}

/// Resolves prefixes against the DOM an object is unmarshalled from.
pub struct NamespaceScope<'a> {
    dom: &'a Dom,
    node: DomNode,
}

impl<'a> NamespaceScope<'a> {
    pub(crate) fn new(dom: &'a Dom, node: DomNode) -> Self {
        Self { dom, node }
    }

    /// The namespace bound to a prefix; the empty prefix gives the default
    /// namespace.
    pub fn lookup(&self, prefix: &str) -> Option<&'a str> {
        self.dom.lookup_namespace_uri(self.node, prefix)
    }

    /// Resolve a lexical `prefix:local` name.
    pub fn resolve_qname(&self, lexical: &str) -> Result<QName, Error> {
        let (prefix, local) = split_lexical(lexical.trim());
        let namespace = match self.lookup(prefix) {
            Some(uri) => uri,
            None if prefix.is_empty() => "",
            None => return Err(Error::UnknownPrefix(prefix.to_string())),
        };
        Ok(QName::with_prefix(namespace, local, prefix))
    }
}

/// Type plumbing every object needs. Implemented for any `Clone`
/// [`XmlObject`].
pub trait ObjectBase {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Copy this object's own state. Children are copied by the engine.
    fn clone_object(&self) -> Box<dyn XmlObject>;
}

impl<T: XmlObject + Clone> ObjectBase for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_object(&self) -> Box<dyn XmlObject> {
        Box::new(self.clone())
    }
}

/// A concrete element type.
///
/// The engine ([`XmlObjects`](crate::XmlObjects)) owns identity, namespaces,
/// parent links and the DOM cache of every object. The type itself decides
/// what content it holds, by exposing storage through the accessors below,
/// and how its own attributes, children and text map to and from DOM,
/// through the marshalling and unmarshalling hooks.
///
/// Children a type refers to must be kept in its [`ComplexContent`]: the
/// engine enumerates, re-parents and deep copies them from there.
pub trait XmlObject: ObjectBase + Debug + 'static {
    /// Text content storage, for simple elements.
    fn simple_text(&self) -> Option<&SimpleText> {
        None
    }

    fn simple_text_mut(&mut self) -> Option<&mut SimpleText> {
        None
    }

    /// Child and mixed text storage, for complex elements.
    fn complex_content(&self) -> Option<&ComplexContent> {
        None
    }

    fn complex_content_mut(&mut self) -> Option<&mut ComplexContent> {
        None
    }

    /// Arbitrary attribute storage, for attribute-extensible elements.
    fn extension_attributes(&self) -> Option<&ExtensionAttributes> {
        None
    }

    fn extension_attributes_mut(&mut self) -> Option<&mut ExtensionAttributes> {
        None
    }

    /// Storage for XML the engine does not model.
    ///
    /// Objects exposing this are not unmarshalled field by field: their DOM
    /// is kept as is, and serialized to a string when the cache goes away.
    fn foreign_content(&self) -> Option<&ForeignContent> {
        None
    }

    fn foreign_content_mut(&mut self) -> Option<&mut ForeignContent> {
        None
    }

    /// Namespaces this object's content needs declared, beyond its own
    /// name and schema type.
    fn extra_namespaces(&self) -> Vec<Namespace> {
        self.extension_attributes()
            .into_iter()
            .flat_map(|attributes| attributes.iter())
            .filter(|(name, _)| name.has_namespace())
            .map(|(name, _)| {
                Namespace::new(name.namespace_str(), name.prefix_str())
                    .with_usage(NamespaceUsage::VisiblyUsed)
            })
            .collect()
    }

    /// Write type-specific attributes onto a freshly created element.
    fn marshal_attributes(&self, _element: &mut DomElement) -> Result<(), Error> {
        Ok(())
    }

    /// The text to write at a position among the children.
    fn text_content(&self, position: usize) -> Option<Cow<'_, str>> {
        if let Some(simple) = self.simple_text() {
            return simple.text(position).map(Cow::Borrowed);
        }
        self.complex_content()
            .and_then(|complex| complex.text(position))
            .map(Cow::Borrowed)
    }

    /// Accept an attribute read from DOM. Returns `false` if the attribute
    /// is not one this type knows.
    fn process_attribute(&mut self, name: &QName, value: &str) -> Result<bool, Error> {
        match self.extension_attributes_mut() {
            Some(attributes) => {
                let is_id = is_registered_id_attribute(name);
                attributes.set(name.clone(), Some(value.to_string()), is_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Accept an unmarshalled child by storing it in a slot. Returns
    /// `false` if this type has no place for it.
    fn process_child(&mut self, _name: &QName, _child: ObjectId) -> Result<bool, Error> {
        Ok(false)
    }

    /// Accept text read from DOM at a position among the children.
    fn process_text(
        &mut self,
        text: &str,
        position: usize,
        _scope: &NamespaceScope<'_>,
    ) -> Result<(), Error> {
        if let Some(simple) = self.simple_text_mut() {
            return simple.set_text(Some(text), position);
        }
        if let Some(complex) = self.complex_content_mut() {
            return complex.set_text(Some(text), position);
        }
        if text.chars().all(char::is_whitespace) {
            Ok(())
        } else {
            Err(Error::UnmarshallingFailure(format!(
                "unexpected text content {:?}",
                text
            )))
        }
    }
}
