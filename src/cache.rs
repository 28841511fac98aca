use tracing::{trace, warn};

use crate::dom::{DocumentId, DomNode};
use crate::object::ObjectId;
use crate::objects::XmlObjects;

/// The DOM an object was last marshalled to or unmarshalled from.
#[derive(Debug, Clone, Default)]
pub(crate) struct DomCache {
    /// The cached element, with the document it belonged to when cached.
    pub(crate) node: Option<(DomNode, Option<DocumentId>)>,
    /// The document this object owns, if any.
    pub(crate) document: Option<DomNode>,
}

/// ## DOM cache
///
/// Every object may cache the DOM element it was last marshalled to or
/// unmarshalled from. Marshalling reuses a cached element as is, so the
/// cache must be released whenever the object changes. Changing an object
/// also changes the DOM of every ancestor, so their caches go too.
///
/// A cached element is only valid while it still belongs to the document
/// it was cached from. Releasing a document therefore invalidates every
/// cache pointing into it.
impl XmlObjects {
    /// The cached DOM element, if it is still valid.
    pub fn cached_node(&self, id: ObjectId) -> Option<DomNode> {
        let (node, document_id) = self.node(id).core.cache.node?;
        (!self.dom.is_removed(node) && self.dom.owner_document_id(node) == document_id)
            .then_some(node)
    }

    /// The document this object owns.
    pub fn owned_document(&self, id: ObjectId) -> Option<DomNode> {
        self.node(id)
            .core
            .cache
            .document
            .filter(|document| !self.dom.is_removed(*document))
    }

    /// Cache a DOM element on an object, or with `None` drop the cache and
    /// release the document the object owns.
    ///
    /// With `bind_document` the object takes ownership of the element's
    /// document, releasing any other document it owned.
    pub fn set_cached_node(&mut self, id: ObjectId, node: Option<DomNode>, bind_document: bool) {
        match node {
            Some(node) => {
                let document_id = self.dom.owner_document_id(node);
                self.core_mut(id).cache.node = Some((node, document_id));
                if bind_document {
                    let document = self.dom.owner_document(node);
                    let previous = std::mem::replace(&mut self.core_mut(id).cache.document, document);
                    if let Some(previous) = previous.filter(|previous| Some(*previous) != document) {
                        self.dom.release_document(previous);
                    }
                    trace!(element = %self.element_name(id), "bound document");
                }
            }
            None => {
                self.release_descendants(id, true);
                self.release_self(id);
                if let Some(document) = self.core_mut(id).cache.document.take() {
                    self.dom.release_document(document);
                }
            }
        }
    }

    /// Drop the cached DOM of the object.
    ///
    /// An object holding foreign content serializes its DOM to a string
    /// first, so the content survives. This happens even for a cache that
    /// is no longer valid, as long as its element has not been freed.
    pub fn release_self(&mut self, id: ObjectId) {
        let node = self.arena[id.get()].get_mut();
        let (cached, _) = match node.core.cache.node.take() {
            Some(cached) => cached,
            None => return,
        };
        if let Some(foreign) = node.value.foreign_content_mut() {
            if foreign.xml.is_none() && !self.dom.is_removed(cached) {
                match self.dom.to_string(cached) {
                    Ok(xml) => foreign.xml = Some(xml),
                    Err(err) => {
                        warn!(element = %node.core.element_name, error = %err, "could not preserve foreign content")
                    }
                }
            }
        }
        trace!(element = %node.core.element_name, "released cached DOM");
    }

    /// Drop the cached DOM of the parent and, with `propagate`, of every
    /// further ancestor.
    pub fn release_ancestors(&mut self, id: ObjectId, propagate: bool) {
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            self.release_self(ancestor);
            if !propagate {
                break;
            }
            current = self.parent(ancestor);
        }
    }

    /// Drop the cached DOM of the children and, with `propagate`, of every
    /// further descendant.
    pub fn release_descendants(&mut self, id: ObjectId, propagate: bool) {
        let children: Vec<ObjectId> = self.children(id).collect();
        for child in children {
            self.release_self(child);
            if propagate {
                self.release_descendants(child, true);
            }
        }
    }

    pub fn release_self_and_ancestors(&mut self, id: ObjectId) {
        self.release_self(id);
        self.release_ancestors(id, true);
    }

    pub fn release_self_and_descendants(&mut self, id: ObjectId) {
        self.release_descendants(id, true);
        self.release_self(id);
    }
}
