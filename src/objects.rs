use indextree::Arena;
use tracing::debug;

use crate::builder::BuilderRegistry;
use crate::cache::DomCache;
use crate::config::Config;
use crate::dom::Dom;
use crate::error::Error;
use crate::namespace::{Namespace, NamespaceUsage, Namespaces};
use crate::object::{ObjectId, XmlObject};
use crate::qname::QName;

/// The state every object has, whatever its concrete type.
#[derive(Debug, Clone)]
pub(crate) struct ObjectCore {
    pub(crate) element_name: QName,
    pub(crate) schema_type: Option<QName>,
    pub(crate) namespaces: Namespaces,
    pub(crate) nil: Option<bool>,
    pub(crate) schema_location: Option<String>,
    pub(crate) no_namespace_schema_location: Option<String>,
    pub(crate) cache: DomCache,
}

impl ObjectCore {
    fn new(element_name: QName) -> Self {
        let mut namespaces = Namespaces::new();
        if element_name.has_namespace() || !element_name.has_prefix() {
            namespaces.add(
                Namespace::new(element_name.namespace_str(), element_name.prefix_str())
                    .with_usage(NamespaceUsage::VisiblyUsed),
            );
        }
        ObjectCore {
            element_name,
            schema_type: None,
            namespaces,
            nil: None,
            schema_location: None,
            no_namespace_schema_location: None,
            cache: DomCache::default(),
        }
    }

    /// A copy without the DOM cache, which stays with the original.
    fn copy(&self) -> Self {
        ObjectCore {
            cache: DomCache::default(),
            ..self.clone()
        }
    }
}

#[derive(Debug)]
pub(crate) struct ObjectNode {
    pub(crate) core: ObjectCore,
    pub(crate) value: Box<dyn XmlObject>,
}

pub(crate) type ObjectArena = Arena<ObjectNode>;

/// The `XmlObjects` struct owns object trees and the DOM they are
/// marshalled to and unmarshalled from.
///
/// Objects are addressed by [`ObjectId`] handles. Parent links are kept by
/// the context; the children of an object are the ones in its
/// [`ComplexContent`](crate::ComplexContent).
///
/// `XmlObjects` is implemented in several sections focusing on different
/// aspects: access, manipulation, the DOM cache, marshalling and
/// unmarshalling.
///
/// ```rust
/// use xmlbind::{AnyElement, QName, XmlObjects};
///
/// let mut objects = XmlObjects::new();
/// let root = objects.create(QName::with_prefix("urn:example", "root", "ex"), AnyElement::new());
/// let child = objects.create(QName::with_prefix("urn:example", "child", "ex"), AnyElement::new());
/// objects.push_child(root, child)?;
/// assert_eq!(objects.parent(child), Some(root));
/// assert_eq!(
///     objects.to_xml_string(root)?,
///     r#"<ex:root xmlns:ex="urn:example"><ex:child/></ex:root>"#
/// );
/// # Ok::<(), xmlbind::Error>(())
/// ```
pub struct XmlObjects {
    pub(crate) arena: ObjectArena,
    pub(crate) dom: Dom,
    pub(crate) builders: BuilderRegistry,
    pub(crate) config: Config,
}

impl XmlObjects {
    /// Create a new context with no builders and the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        XmlObjects {
            arena: ObjectArena::new(),
            dom: Dom::new(),
            builders: BuilderRegistry::new(),
            config,
        }
    }

    /// The DOM objects are marshalled into.
    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    pub fn builders(&self) -> &BuilderRegistry {
        &self.builders
    }

    pub fn builders_mut(&mut self) -> &mut BuilderRegistry {
        &mut self.builders
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    #[inline]
    pub(crate) fn node(&self, id: ObjectId) -> &ObjectNode {
        self.arena[id.get()].get()
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: ObjectId) -> &mut ObjectNode {
        self.arena[id.get()].get_mut()
    }

    #[inline]
    pub(crate) fn core_mut(&mut self, id: ObjectId) -> &mut ObjectCore {
        &mut self.node_mut(id).core
    }
}

impl Default for XmlObjects {
    fn default() -> Self {
        Self::new()
    }
}

/// ## Creation
impl XmlObjects {
    /// Create a new parentless object of a concrete type.
    ///
    /// The namespace of the element name is declared on the object.
    pub fn create<T: XmlObject>(&mut self, element_name: QName, value: T) -> ObjectId {
        self.create_boxed(element_name, Box::new(value))
    }

    pub fn create_boxed(&mut self, element_name: QName, value: Box<dyn XmlObject>) -> ObjectId {
        let core = ObjectCore::new(element_name);
        ObjectId::new(self.arena.new_node(ObjectNode { core, value }))
    }

    /// Create a new object with the builder registered for the schema type
    /// or element name.
    ///
    /// Fails with [`Error::UnknownPluginType`] if no builder is registered.
    pub fn build(
        &mut self,
        element_name: QName,
        schema_type: Option<QName>,
    ) -> Result<ObjectId, Error> {
        let value = self.builders.build(&element_name, schema_type.as_ref())?;
        let id = self.create_boxed(element_name, value);
        if schema_type.is_some() {
            self.set_schema_type(id, schema_type);
        }
        Ok(id)
    }

    /// Build for an element found in DOM. Falls back to the default
    /// builder only when unknown elements are ignored.
    pub(crate) fn build_for_element(
        &self,
        element_name: &QName,
        schema_type: Option<&QName>,
    ) -> Result<Box<dyn XmlObject>, Error> {
        match self.builders.build(element_name, schema_type) {
            Ok(value) => Ok(value),
            Err(Error::UnknownPluginType(_))
                if self.config.ignores_unknown_elements() && self.builders.has_default_builder() =>
            {
                self.builders.build_default(element_name, schema_type)
            }
            Err(Error::UnknownPluginType(_)) => Err(Error::UnknownElement(element_name.clone())),
            Err(err) => Err(err),
        }
    }
}

/// ## Lifetime
impl XmlObjects {
    /// Destroy an object and everything under it.
    ///
    /// The object is taken out of its parent first, which invalidates the
    /// DOM cached by the parent and its ancestors. Documents owned by
    /// objects in the subtree are released.
    pub fn remove(&mut self, id: ObjectId) {
        if self.is_removed(id) {
            return;
        }
        if let Some(parent) = self.parent(id) {
            self.release_self_and_ancestors(parent);
            if let Some(content) = self.node_mut(parent).value.complex_content_mut() {
                content.remove_child(id);
            }
        }
        let documents: Vec<_> = id
            .get()
            .descendants(&self.arena)
            .filter_map(|descendant| self.arena[descendant].get().core.cache.document)
            .collect();
        for document in documents {
            self.dom.release_document(document);
        }
        id.get().remove_subtree(&mut self.arena);
    }

    /// Whether the object has been removed.
    pub fn is_removed(&self, id: ObjectId) -> bool {
        self.arena
            .get(id.get())
            .map_or(true, |entry| entry.is_removed())
    }

    /// Take an object out of its parent and destroy the parent.
    ///
    /// Only a child of a root can be detached this way; if the parent
    /// has a parent itself this fails with
    /// [`Error::StructuralViolation`]. A document owned by the parent
    /// moves to the detached object if it caches its DOM in it.
    pub fn detach(&mut self, id: ObjectId) -> Result<(), Error> {
        let parent = match self.parent(id) {
            Some(parent) => parent,
            None => return Ok(()),
        };
        if self.has_parent(parent) {
            return Err(Error::StructuralViolation(
                "cannot detach an object whose parent has a parent".into(),
            ));
        }
        if let Some(document) = self.node(parent).core.cache.document {
            match self.cached_node(id) {
                Some(element) if self.dom.owner_document(element) == Some(document) => {
                    self.dom.localize_namespaces(element);
                    self.dom.set_document_element(document, element)?;
                    if let Some(previous) = self.core_mut(id).cache.document.take() {
                        self.dom.release_document(previous);
                    }
                    self.core_mut(parent).cache.document = None;
                    self.core_mut(parent).cache.node = None;
                    self.core_mut(id).cache.document = Some(document);
                    debug!(element = %self.element_name(id), "document moved to detached object");
                }
                _ => self.release_self_and_descendants(id),
            }
        }
        if let Some(content) = self.node_mut(parent).value.complex_content_mut() {
            content.remove_child(id);
        }
        id.get().detach(&mut self.arena);
        self.remove(parent);
        Ok(())
    }

    /// Deep copy an object.
    ///
    /// If the object has a valid DOM cache, the copy is unmarshalled from
    /// an imported copy of that DOM and owns the new document, so content
    /// the concrete types do not model survives. Otherwise the object's
    /// state is copied field by field. The copy has no parent.
    pub fn clone_object(&mut self, id: ObjectId) -> Result<ObjectId, Error> {
        if let Some(element) = self.cached_node(id) {
            let document = self.dom.new_document();
            let copy = self.dom.import_node(element);
            self.dom.set_document_element(document, copy)?;
            match self.unmarshal(copy, true) {
                Ok(clone) => return Ok(clone),
                Err(err) => {
                    debug!(element = %self.element_name(id), error = %err, "copying object state instead of DOM");
                    self.dom.release_document(document);
                }
            }
        }
        Ok(self.copy_subtree(id))
    }

    fn copy_subtree(&mut self, id: ObjectId) -> ObjectId {
        let node = self.node(id);
        let copy = ObjectNode {
            core: node.core.copy(),
            value: node.value.clone_object(),
        };
        let copy_id = ObjectId::new(self.arena.new_node(copy));
        let children: Vec<ObjectId> = self.children(id).collect();
        let mut copies = Vec::with_capacity(children.len());
        for child in children {
            let child_copy = self.copy_subtree(child);
            copy_id.get().append(child_copy.get(), &mut self.arena);
            copies.push((child, child_copy));
        }
        if let Some(content) = self.node_mut(copy_id).value.complex_content_mut() {
            content.remap_children(|original| {
                copies
                    .iter()
                    .find(|(child, _)| *child == original)
                    .map_or(original, |(_, child_copy)| *child_copy)
            });
        }
        copy_id
    }
}
