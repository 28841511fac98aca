use crate::error::Error;
use crate::namespace::{Namespace, NamespaceUsage};
use crate::object::{ObjectId, XmlObject};
use crate::objects::XmlObjects;
use crate::qname::QName;

/// Parse a one character nil token: `t` and `1` are true, `f` and `0`
/// are false, anything else leaves nil unset.
pub fn parse_nil_token(token: &str) -> Option<bool> {
    match token.trim().chars().next() {
        Some('t') | Some('1') => Some(true),
        Some('f') | Some('0') => Some(false),
        _ => None,
    }
}

fn childless(id: ObjectId, objects: &XmlObjects) -> Error {
    Error::StructuralViolation(format!(
        "{} is a childless object",
        objects.element_name(id)
    ))
}

/// ## Manipulation
///
/// Every change to an object goes through these functions. A change that
/// actually alters an object releases the DOM cached by the object and
/// all its ancestors before it is made; assigning a value equal to the
/// current one leaves the caches alone.
///
/// Structure is maintained:
/// - An object has at most one parent. Making an object that already has
///   a parent the child of another fails.
/// - Replacing a child destroys the old one.
impl XmlObjects {
    /// Set or clear the `xsi:type` of an object.
    ///
    /// The namespace of the type is declared on the object as used in
    /// content.
    pub fn set_schema_type(&mut self, id: ObjectId, schema_type: Option<QName>) {
        if self.schema_type(id) == schema_type.as_ref()
            && self.schema_type(id).map(QName::prefix) == schema_type.as_ref().map(QName::prefix)
        {
            return;
        }
        self.release_self_and_ancestors(id);
        if let Some(schema_type) = &schema_type {
            self.merge_content_namespace(id, schema_type);
        }
        self.core_mut(id).schema_type = schema_type;
    }

    /// Set the nil state: unset, true or false.
    pub fn set_nil(&mut self, id: ObjectId, nil: Option<bool>) {
        if self.nil_state(id) != nil {
            self.release_self_and_ancestors(id);
            self.core_mut(id).nil = nil;
        }
    }

    /// Set the nil state from a token, see [`parse_nil_token`].
    pub fn set_nil_token(&mut self, id: ObjectId, token: &str) {
        self.set_nil(id, parse_nil_token(token));
    }

    pub fn set_schema_location(&mut self, id: ObjectId, location: Option<String>) {
        if self.schema_location(id) != location.as_deref() {
            self.release_self_and_ancestors(id);
            self.core_mut(id).schema_location = location;
        }
    }

    pub fn set_no_namespace_schema_location(&mut self, id: ObjectId, location: Option<String>) {
        if self.no_namespace_schema_location(id) != location.as_deref() {
            self.release_self_and_ancestors(id);
            self.core_mut(id).no_namespace_schema_location = location;
        }
    }

    /// Add a namespace declaration, merging it with an existing declaration
    /// of the same prefix.
    ///
    /// Declarations only matter when new DOM is produced, so the DOM cache
    /// is kept.
    pub fn add_namespace(&mut self, id: ObjectId, namespace: Namespace) {
        self.core_mut(id).namespaces.add(namespace);
    }

    pub fn remove_namespace(&mut self, id: ObjectId, namespace: &Namespace) -> bool {
        self.core_mut(id).namespaces.remove(namespace)
    }

    /// Set or clear text at a position among the children.
    ///
    /// Simple content only accepts position 0 and keeps existing text that
    /// is not just whitespace. Complex content accepts any position up to
    /// the number of children.
    pub fn set_text(
        &mut self,
        id: ObjectId,
        text: Option<&str>,
        position: usize,
    ) -> Result<(), Error> {
        let value = &self.node(id).value;
        let changes = if let Some(simple) = value.simple_text() {
            simple.would_change(text, position)?
        } else if let Some(content) = value.complex_content() {
            content.would_change(text, position)?
        } else {
            return Err(childless(id, self));
        };
        if !changes {
            return Ok(());
        }
        self.release_self_and_ancestors(id);
        let value = &mut self.node_mut(id).value;
        if let Some(simple) = value.simple_text_mut() {
            simple.set_text(text, position)
        } else if let Some(content) = value.complex_content_mut() {
            content.set_text(text, position)
        } else {
            Ok(())
        }
    }

    /// Set or, with `None`, remove an extension attribute.
    ///
    /// `is_id` marks the attribute as the object's XML ID. Fails if the
    /// object does not accept extension attributes.
    pub fn set_attribute(
        &mut self,
        id: ObjectId,
        name: QName,
        value: Option<String>,
        is_id: bool,
    ) -> Result<(), Error> {
        let attributes = self
            .extension_attributes(id)
            .ok_or_else(|| Error::UnknownAttribute(name.clone()))?;
        let marks_id = is_id && value.is_some() && !attributes.is_id(&name);
        if attributes.get(&name) == value.as_deref() && !marks_id {
            return Ok(());
        }
        self.release_self_and_ancestors(id);
        if let Some(attributes) = self.node_mut(id).value.extension_attributes_mut() {
            attributes.set(name, value, is_id);
        }
        Ok(())
    }

    /// Put a child into a slot of a complex object, or empty the slot with
    /// `None`.
    ///
    /// A child previously in the slot is destroyed. Putting the object
    /// that is already in the slot there again does nothing.
    pub fn set_child(
        &mut self,
        parent: ObjectId,
        slot: usize,
        child: Option<ObjectId>,
    ) -> Result<(), Error> {
        let current = self
            .node(parent)
            .value
            .complex_content()
            .ok_or_else(|| childless(parent, self))?
            .slot(slot);
        if current == child {
            return Ok(());
        }
        if let Some(child) = child {
            self.check_adoptable(parent, child)?;
        }
        self.release_self_and_ancestors(parent);
        if let Some(current) = current {
            self.remove(current);
        }
        if let Some(content) = self.node_mut(parent).value.complex_content_mut() {
            content.set_slot(slot, child);
        }
        if let Some(child) = child {
            parent.get().append(child.get(), &mut self.arena);
        }
        Ok(())
    }

    /// Append a generic child to a complex object. Returns its slot.
    pub fn push_child(&mut self, parent: ObjectId, child: ObjectId) -> Result<usize, Error> {
        if self.node(parent).value.complex_content().is_none() {
            return Err(childless(parent, self));
        }
        self.check_adoptable(parent, child)?;
        self.release_self_and_ancestors(parent);
        let slot = match self.node_mut(parent).value.complex_content_mut() {
            Some(content) => content.push(child),
            None => return Err(childless(parent, self)),
        };
        parent.get().append(child.get(), &mut self.arena);
        Ok(slot)
    }

    /// Insert a generic child before the slot at `index`. Returns the slot
    /// it ended up in, which is never one of the named slots.
    pub fn insert_child(
        &mut self,
        parent: ObjectId,
        index: usize,
        child: ObjectId,
    ) -> Result<usize, Error> {
        if self.node(parent).value.complex_content().is_none() {
            return Err(childless(parent, self));
        }
        self.check_adoptable(parent, child)?;
        self.release_self_and_ancestors(parent);
        let slot = match self.node_mut(parent).value.complex_content_mut() {
            Some(content) => content.insert(index, child),
            None => return Err(childless(parent, self)),
        };
        parent.get().append(child.get(), &mut self.arena);
        Ok(slot)
    }

    /// Take a child out of its parent. The child is kept, without a
    /// parent and without cached DOM.
    ///
    /// Fails if the parent is childless.
    pub fn remove_child(&mut self, parent: ObjectId, child: ObjectId) -> Result<(), Error> {
        if self.node(parent).value.complex_content().is_none() {
            return Err(childless(parent, self));
        }
        if self.parent(child) != Some(parent) {
            return Ok(());
        }
        self.release_self_and_descendants(child);
        self.release_self_and_ancestors(parent);
        if let Some(content) = self.node_mut(parent).value.complex_content_mut() {
            content.remove_child(child);
        }
        child.get().detach(&mut self.arena);
        Ok(())
    }

    /// Assign a field of a concrete object.
    ///
    /// The field is selected by `field`. If the new value equals the
    /// current one nothing happens, otherwise the DOM cache of the object
    /// and its ancestors is released first.
    ///
    /// ```rust
    /// use xmlbind::{QName, XmlObjects, XsInteger};
    ///
    /// let mut objects = XmlObjects::new();
    /// let id = objects.create(QName::without_namespace("count"), XsInteger::new());
    /// objects.assign(id, XsInteger::value_mut, Some(3))?;
    /// assert_eq!(objects.value::<XsInteger>(id)?.value(), Some(3));
    /// # Ok::<(), xmlbind::Error>(())
    /// ```
    pub fn assign<T, V, F>(&mut self, id: ObjectId, field: F, value: V) -> Result<(), Error>
    where
        T: XmlObject,
        V: PartialEq,
        F: Fn(&mut T) -> &mut V,
    {
        if *field(self.value_mut_unchecked::<T>(id)?) == value {
            return Ok(());
        }
        self.release_self_and_ancestors(id);
        *field(self.value_mut_unchecked::<T>(id)?) = value;
        Ok(())
    }

    /// Assign a qualified name field. The namespace of the new name is
    /// declared on the object as used in content.
    pub fn assign_qname<T, F>(
        &mut self,
        id: ObjectId,
        field: F,
        value: Option<QName>,
    ) -> Result<(), Error>
    where
        T: XmlObject,
        F: Fn(&mut T) -> &mut Option<QName>,
    {
        if let Some(name) = &value {
            self.merge_content_namespace(id, name);
        }
        self.assign(id, field, value)
    }

    /// Mutable access to the concrete value of an object as a `T`.
    ///
    /// The object may be changed in any way, so the DOM cache of the object
    /// and its ancestors is released.
    pub fn value_mut<T: XmlObject>(&mut self, id: ObjectId) -> Result<&mut T, Error> {
        if !self.is::<T>(id) {
            return Err(Error::TypeMismatch(std::any::type_name::<T>()));
        }
        self.release_self_and_ancestors(id);
        self.value_mut_unchecked(id)
    }

    fn value_mut_unchecked<T: XmlObject>(&mut self, id: ObjectId) -> Result<&mut T, Error> {
        self.node_mut(id)
            .value
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or(Error::TypeMismatch(std::any::type_name::<T>()))
    }

    fn merge_content_namespace(&mut self, id: ObjectId, name: &QName) {
        if name.has_namespace() {
            self.add_namespace(
                id,
                Namespace::new(name.namespace_str(), name.prefix_str())
                    .with_usage(NamespaceUsage::NonVisiblyUsed),
            );
        }
    }

    fn check_adoptable(&self, parent: ObjectId, child: ObjectId) -> Result<(), Error> {
        if self.has_parent(child) {
            return Err(Error::StructuralViolation(format!(
                "{} already has a parent",
                self.element_name(child)
            )));
        }
        if parent.get().ancestors(&self.arena).any(|ancestor| ancestor == child.get()) {
            return Err(Error::StructuralViolation(format!(
                "{} cannot be its own descendant",
                self.element_name(child)
            )));
        }
        Ok(())
    }
}
