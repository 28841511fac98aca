use crate::content::NO_CHILDREN;
use crate::error::Error;
use crate::extension::ExtensionAttributes;
use crate::namespace::Namespaces;
use crate::object::{ObjectId, XmlObject};
use crate::objects::XmlObjects;
use crate::qname::QName;

/// ## Read-only access
///
/// These functions give read access to objects and their state.
impl XmlObjects {
    /// The element name of an object. It never changes.
    pub fn element_name(&self, id: ObjectId) -> &QName {
        &self.node(id).core.element_name
    }

    /// The `xsi:type` of an object.
    pub fn schema_type(&self, id: ObjectId) -> Option<&QName> {
        self.node(id).core.schema_type.as_ref()
    }

    /// The namespace declarations of an object.
    pub fn namespaces(&self, id: ObjectId) -> &Namespaces {
        &self.node(id).core.namespaces
    }

    /// Whether the object is nil. An unset nil state is not nil.
    pub fn nil(&self, id: ObjectId) -> bool {
        self.node(id).core.nil.unwrap_or(false)
    }

    /// The nil state: unset, or explicitly true or false.
    pub fn nil_state(&self, id: ObjectId) -> Option<bool> {
        self.node(id).core.nil
    }

    /// The `xsi:schemaLocation` of an object.
    pub fn schema_location(&self, id: ObjectId) -> Option<&str> {
        self.node(id).core.schema_location.as_deref()
    }

    /// The `xsi:noNamespaceSchemaLocation` of an object.
    pub fn no_namespace_schema_location(&self, id: ObjectId) -> Option<&str> {
        self.node(id).core.no_namespace_schema_location.as_deref()
    }

    /// The concrete value of an object.
    pub fn object(&self, id: ObjectId) -> &dyn XmlObject {
        self.node(id).value.as_ref()
    }

    /// The concrete value of an object as a `T`.
    ///
    /// Fails with [`Error::TypeMismatch`] if the object is of another type.
    pub fn value<T: XmlObject>(&self, id: ObjectId) -> Result<&T, Error> {
        self.node(id)
            .value
            .as_any()
            .downcast_ref::<T>()
            .ok_or(Error::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Whether the concrete value of an object is a `T`.
    pub fn is<T: XmlObject>(&self, id: ObjectId) -> bool {
        self.node(id).value.as_any().is::<T>()
    }

    pub fn parent(&self, id: ObjectId) -> Option<ObjectId> {
        self.arena[id.get()].parent().map(ObjectId::new)
    }

    pub fn has_parent(&self, id: ObjectId) -> bool {
        self.parent(id).is_some()
    }

    /// The topmost ancestor, or the object itself.
    pub fn root(&self, id: ObjectId) -> ObjectId {
        id.get()
            .ancestors(&self.arena)
            .last()
            .map_or(id, ObjectId::new)
    }

    /// The children of an object in order, skipping empty slots.
    ///
    /// Childless and simple objects have none.
    pub fn children(&self, id: ObjectId) -> impl Iterator<Item = ObjectId> + '_ {
        self.child_slots(id).iter().flatten().copied()
    }

    /// Every child slot of an object, empty named slots included.
    pub fn child_slots(&self, id: ObjectId) -> &[Option<ObjectId>] {
        self.node(id)
            .value
            .complex_content()
            .map_or(NO_CHILDREN, |content| content.slots())
    }

    pub fn has_children(&self, id: ObjectId) -> bool {
        self.node(id)
            .value
            .complex_content()
            .map_or(false, |content| content.has_children())
    }

    /// The object and all its descendants, in document order.
    pub fn descendants(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut result = vec![id];
        for child in self.children(id) {
            result.extend(self.descendants(child));
        }
        result
    }

    /// The text stored at a position among the children.
    ///
    /// Simple content only has position 0.
    pub fn text(&self, id: ObjectId, position: usize) -> Option<&str> {
        let value = &self.node(id).value;
        if let Some(simple) = value.simple_text() {
            return simple.text(position);
        }
        value
            .complex_content()
            .and_then(|content| content.text(position))
    }

    /// An extension attribute of an object.
    pub fn attribute(&self, id: ObjectId, name: &QName) -> Option<&str> {
        self.extension_attributes(id)
            .and_then(|attributes| attributes.get(name))
    }

    /// All extension attributes, for attribute-extensible objects.
    pub fn extension_attributes(&self, id: ObjectId) -> Option<&ExtensionAttributes> {
        self.node(id).value.extension_attributes()
    }

    /// The value of the attribute marked as the object's XML ID.
    pub fn xml_id(&self, id: ObjectId) -> Option<&str> {
        self.extension_attributes(id)
            .and_then(ExtensionAttributes::xml_id)
    }
}
