//! A small arena DOM the engine marshals into and unmarshals from.
//!
//! Every node lives in the [`Dom`] arena and is addressed by a [`DomNode`]
//! handle. A document is an arena root carrying a [`DocumentId`]; nodes
//! are only freed when their whole document is released, so a handle into
//! a live document never dangles. That includes document elements the
//! document has since replaced.

mod encoding;
mod entity;
mod parse;
mod serialize;

use ahash::HashMap;
use indextree::{Arena, NodeId};

use crate::constants::{XML_NS, XML_PREFIX};
use crate::error::Error;
use crate::qname::QName;

pub(crate) type DomArena = Arena<DomValue>;

/// A node in the DOM.
/// This is a lightweight value and can be copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomNode(NodeId);

impl DomNode {
    #[inline]
    pub(crate) fn new(node_id: NodeId) -> Self {
        DomNode(node_id)
    }

    #[inline]
    pub(crate) fn get(&self) -> NodeId {
        self.0
    }
}

/// Identity of a document.
///
/// Ids are never reused, so comparing them tells whether a node still
/// belongs to the document it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u64);

/// An attribute on a DOM element.
#[derive(Debug, Clone, PartialEq)]
pub struct DomAttribute {
    pub(crate) name: QName,
    pub(crate) value: String,
    pub(crate) is_id: bool,
}

impl DomAttribute {
    pub fn name(&self) -> &QName {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the attribute is an XML ID.
    pub fn is_id(&self) -> bool {
        self.is_id
    }
}

/// A DOM element: name, namespace declarations and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct DomElement {
    pub(crate) name: QName,
    pub(crate) declarations: Vec<(String, String)>,
    pub(crate) attributes: Vec<DomAttribute>,
}

impl DomElement {
    pub(crate) fn new(name: QName) -> Self {
        DomElement {
            name,
            declarations: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn name(&self) -> &QName {
        &self.name
    }

    /// Namespace declarations made on this element, as `(prefix, uri)`.
    /// The default namespace has an empty prefix.
    pub fn namespace_declarations(&self) -> &[(String, String)] {
        &self.declarations
    }

    /// The namespace declared for a prefix on this element only.
    pub fn declared_namespace(&self, prefix: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    /// Declare a prefix, replacing an earlier declaration of it.
    pub fn declare_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        let prefix = prefix.into();
        let uri = uri.into();
        if let Some(entry) = self.declarations.iter_mut().find(|(p, _)| *p == prefix) {
            entry.1 = uri;
        } else {
            self.declarations.push((prefix, uri));
        }
    }

    pub fn attributes(&self) -> &[DomAttribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &QName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == *name)
            .map(|attribute| attribute.value.as_str())
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attribute(&mut self, name: QName, value: impl Into<String>) {
        let value = value.into();
        if let Some(attribute) = self.attributes.iter_mut().find(|a| a.name == name) {
            attribute.name = name;
            attribute.value = value;
        } else {
            self.attributes.push(DomAttribute {
                name,
                value,
                is_id: false,
            });
        }
    }

    pub fn remove_attribute(&mut self, name: &QName) {
        self.attributes.retain(|attribute| attribute.name != *name);
    }

    /// Mark an existing attribute as an XML ID.
    pub fn set_id_attribute(&mut self, name: &QName) {
        if let Some(attribute) = self.attributes.iter_mut().find(|a| a.name == *name) {
            attribute.is_id = true;
        }
    }
}

/// The value of a DOM node.
#[derive(Debug, Clone)]
pub enum DomValue {
    /// The root of a document. Not the same as the document element.
    Document(DocumentId),
    Element(DomElement),
    Text(String),
    Comment(String),
    ProcessingInstruction { target: String, data: Option<String> },
}

/// The DOM arena holding every document and fragment.
#[derive(Debug, Default)]
pub struct Dom {
    arena: DomArena,
    next_document: u64,
    /// Document elements a document has replaced, freed with it.
    replaced: HashMap<DocumentId, Vec<DomNode>>,
}

/// ## Creation
impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document and return its root node.
    pub fn new_document(&mut self) -> DomNode {
        let id = DocumentId(self.next_document);
        self.next_document += 1;
        DomNode::new(self.arena.new_node(DomValue::Document(id)))
    }

    /// Create an unattached element.
    pub fn new_element(&mut self, name: QName) -> DomNode {
        DomNode::new(self.arena.new_node(DomValue::Element(DomElement::new(name))))
    }

    /// Create an unattached text node.
    pub fn new_text(&mut self, text: impl Into<String>) -> DomNode {
        DomNode::new(self.arena.new_node(DomValue::Text(text.into())))
    }

    pub fn new_comment(&mut self, text: impl Into<String>) -> DomNode {
        DomNode::new(self.arena.new_node(DomValue::Comment(text.into())))
    }

    pub fn new_processing_instruction(&mut self, target: &str, data: Option<&str>) -> DomNode {
        DomNode::new(self.arena.new_node(DomValue::ProcessingInstruction {
            target: target.to_string(),
            data: data.map(str::to_string),
        }))
    }
}

/// ## Access
impl Dom {
    pub fn value(&self, node: DomNode) -> &DomValue {
        self.arena[node.get()].get()
    }

    pub fn value_mut(&mut self, node: DomNode) -> &mut DomValue {
        self.arena[node.get()].get_mut()
    }

    pub fn element(&self, node: DomNode) -> Option<&DomElement> {
        match self.value(node) {
            DomValue::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, node: DomNode) -> Option<&mut DomElement> {
        match self.value_mut(node) {
            DomValue::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn text(&self, node: DomNode) -> Option<&str> {
        match self.value(node) {
            DomValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether the node has been freed by releasing its document.
    pub fn is_removed(&self, node: DomNode) -> bool {
        self.arena
            .get(node.get())
            .map_or(true, |entry| entry.is_removed())
    }

    pub fn parent(&self, node: DomNode) -> Option<DomNode> {
        self.arena[node.get()].parent().map(DomNode::new)
    }

    pub fn children(&self, node: DomNode) -> impl Iterator<Item = DomNode> + '_ {
        node.get().children(&self.arena).map(DomNode::new)
    }

    /// The node itself and then its ancestors, innermost first.
    pub fn ancestors(&self, node: DomNode) -> impl Iterator<Item = DomNode> + '_ {
        node.get().ancestors(&self.arena).map(DomNode::new)
    }

    /// Child elements, skipping text, comments and processing instructions.
    pub fn child_elements(&self, node: DomNode) -> impl Iterator<Item = DomNode> + '_ {
        self.children(node)
            .filter(move |child| matches!(self.value(*child), DomValue::Element(_)))
    }

    /// The document root a node belongs to.
    ///
    /// `None` for removed nodes and for unattached fragments.
    pub fn owner_document(&self, node: DomNode) -> Option<DomNode> {
        if self.is_removed(node) {
            return None;
        }
        let top = self.ancestors(node).last()?;
        matches!(self.value(top), DomValue::Document(_)).then_some(top)
    }

    /// The identity of the document a node belongs to.
    pub fn owner_document_id(&self, node: DomNode) -> Option<DocumentId> {
        self.owner_document(node).and_then(|document| self.document_id(document))
    }

    /// The identity of a document root.
    pub fn document_id(&self, document: DomNode) -> Option<DocumentId> {
        match self.value(document) {
            DomValue::Document(id) => Some(*id),
            _ => None,
        }
    }

    /// The element directly under a document root.
    pub fn document_element(&self, document: DomNode) -> Option<DomNode> {
        self.child_elements(document).next()
    }

    /// Resolve a prefix against the declarations in scope at `node`.
    ///
    /// The empty prefix resolves the default namespace. The `xml` prefix
    /// is always bound.
    pub fn lookup_namespace_uri(&self, node: DomNode, prefix: &str) -> Option<&str> {
        if prefix == XML_PREFIX {
            return Some(XML_NS);
        }
        self.ancestors(node).find_map(|ancestor| {
            self.element(ancestor)
                .and_then(|element| element.declared_namespace(prefix))
        })
    }

    /// All prefix declarations in scope at `node`, innermost winning.
    pub fn namespaces_in_scope(&self, node: DomNode) -> Vec<(String, String)> {
        let mut in_scope: Vec<(String, String)> = Vec::new();
        for ancestor in self.ancestors(node) {
            if let Some(element) = self.element(ancestor) {
                for (prefix, uri) in element.namespace_declarations() {
                    if !in_scope.iter().any(|(p, _)| p == prefix) {
                        in_scope.push((prefix.clone(), uri.clone()));
                    }
                }
            }
        }
        in_scope
    }

    /// The text of all descendant text nodes, concatenated.
    pub fn text_content(&self, node: DomNode) -> String {
        node.get()
            .descendants(&self.arena)
            .filter_map(|descendant| self.text(DomNode::new(descendant)))
            .collect()
    }
}

/// ## Manipulation
impl Dom {
    /// Append a child to the end of the children of `parent`, detaching it
    /// from wherever it was first.
    pub fn append(&mut self, parent: DomNode, child: DomNode) -> Result<(), Error> {
        if matches!(self.value(child), DomValue::Document(_)) {
            return Err(Error::StructuralViolation(
                "cannot move a document root".into(),
            ));
        }
        if !matches!(
            self.value(parent),
            DomValue::Element(_) | DomValue::Document(_)
        ) {
            return Err(Error::StructuralViolation(
                "cannot add children to a non-element node".into(),
            ));
        }
        child.get().detach(&mut self.arena);
        parent
            .get()
            .checked_append(child.get(), &mut self.arena)
            .map_err(|_| {
                Error::StructuralViolation("cannot append a node to its own descendant".into())
            })
    }

    /// Append text, merging it into a trailing text node if there is one.
    pub fn append_text(&mut self, parent: DomNode, text: &str) -> Result<(), Error> {
        let last = parent.get().children(&self.arena).last().map(DomNode::new);
        if let Some(last) = last {
            if let DomValue::Text(existing) = self.value_mut(last) {
                existing.push_str(text);
                return Ok(());
            }
        }
        let node = self.new_text(text);
        self.append(parent, node)
    }

    /// Take a node (and its descendants) out of the tree without freeing it.
    pub fn detach(&mut self, node: DomNode) {
        node.get().detach(&mut self.arena);
    }

    /// Declare on an element every namespace it inherits from its
    /// ancestors, so it stays valid when moved out of them.
    pub fn localize_namespaces(&mut self, element: DomNode) {
        let in_scope = self.namespaces_in_scope(element);
        if let Some(dom_element) = self.element_mut(element) {
            for (prefix, uri) in in_scope {
                if dom_element.declared_namespace(&prefix).is_none() {
                    dom_element.declare_namespace(prefix, uri);
                }
            }
        }
    }

    /// Make `element` the document element of `document`.
    ///
    /// A previous document element is detached, not freed, so handles into
    /// it stay readable until the document is released.
    pub fn set_document_element(
        &mut self,
        document: DomNode,
        element: DomNode,
    ) -> Result<(), Error> {
        let document_id = self
            .document_id(document)
            .ok_or_else(|| Error::StructuralViolation("not a document root".into()))?;
        if let Some(existing) = self.document_element(document) {
            if existing == element {
                return Ok(());
            }
            self.append(document, element)?;
            self.detach(existing);
            self.replaced.entry(document_id).or_default().push(existing);
            return Ok(());
        }
        self.append(document, element)
    }

    /// Free a document and everything in it, including document elements
    /// it replaced that nothing has taken over since.
    pub fn release_document(&mut self, document: DomNode) {
        let document_id = match self.document_id(document) {
            Some(document_id) if !self.is_removed(document) => document_id,
            _ => return,
        };
        document.get().remove_subtree(&mut self.arena);
        for element in self.replaced.remove(&document_id).unwrap_or_default() {
            if !self.is_removed(element) && self.parent(element).is_none() {
                element.get().remove_subtree(&mut self.arena);
            }
        }
    }

    /// Deep copy a subtree into a new unattached fragment.
    ///
    /// If `node` is an element, namespace declarations it inherits from its
    /// ancestors are declared on the copy so it stays self-contained.
    pub fn import_node(&mut self, node: DomNode) -> DomNode {
        let copy = self.copy_subtree(node);
        if self.element(node).is_some() {
            if let Some(parent) = self.parent(node) {
                let inherited = self.namespaces_in_scope(parent);
                if let Some(element) = self.element_mut(copy) {
                    for (prefix, uri) in inherited {
                        if element.declared_namespace(&prefix).is_none() {
                            element.declare_namespace(prefix, uri);
                        }
                    }
                }
            }
        }
        copy
    }

    fn copy_subtree(&mut self, node: DomNode) -> DomNode {
        let copy = match self.value(node).clone() {
            DomValue::Document(_) => self.new_document(),
            value => DomNode::new(self.arena.new_node(value)),
        };
        let children: Vec<DomNode> = self.children(node).collect();
        for child in children {
            let child_copy = self.copy_subtree(child);
            copy.get().append(child_copy.get(), &mut self.arena);
        }
        copy
    }
}
