use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock};

use crate::constants::xml_id_name;
use crate::qname::QName;

/// Attribute names treated as XML IDs, for the whole process.
static ID_ATTRIBUTES: RwLock<BTreeSet<QName>> = RwLock::new(BTreeSet::new());

/// Register the built-in ID attribute, `xml:id`.
///
/// Nothing is registered until this or [`register_id_attribute`] is called.
pub fn init_id_attributes() {
    register_id_attribute(xml_id_name());
}

/// Treat attributes with this name as XML IDs.
pub fn register_id_attribute(name: QName) {
    ID_ATTRIBUTES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(name);
}

/// Stop treating attributes with this name as XML IDs.
pub fn deregister_id_attribute(name: &QName) {
    ID_ATTRIBUTES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(name);
}

/// Forget every registered ID attribute.
pub fn deregister_all_id_attributes() {
    ID_ATTRIBUTES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}

pub fn is_registered_id_attribute(name: &QName) -> bool {
    ID_ATTRIBUTES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains(name)
}

/// A snapshot of the registered ID attribute names, in order.
pub fn registered_id_attributes() -> Vec<QName> {
    ID_ATTRIBUTES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .cloned()
        .collect()
}

/// Arbitrary attributes on an attribute-extensible object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionAttributes {
    attributes: BTreeMap<QName, String>,
    id_attribute: Option<QName>,
}

impl ExtensionAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &QName) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Set or, with `None`, remove an attribute.
    ///
    /// `is_id` marks the attribute as this object's XML ID.
    pub fn set(&mut self, name: QName, value: Option<String>, is_id: bool) {
        match value {
            Some(value) => {
                // replace the key too so a new prefix sticks
                self.attributes.remove(&name);
                if is_id {
                    self.id_attribute = Some(name.clone());
                }
                self.attributes.insert(name, value);
            }
            None => {
                self.attributes.remove(&name);
                if self.id_attribute.as_ref() == Some(&name) {
                    self.id_attribute = None;
                }
            }
        }
    }

    /// Whether the attribute is an ID, either marked on this object or
    /// registered process-wide.
    pub fn is_id(&self, name: &QName) -> bool {
        self.id_attribute.as_ref() == Some(name) || is_registered_id_attribute(name)
    }

    /// The value of the attribute marked as this object's ID.
    pub fn xml_id(&self) -> Option<&str> {
        self.id_attribute.as_ref().and_then(|name| self.get(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QName, &String)> + '_ {
        self.attributes.iter()
    }

    pub fn as_map(&self) -> &BTreeMap<QName, String> {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
