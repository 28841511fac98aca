use tracing::debug;

use crate::error::Error;
use crate::object::XmlObject;
use crate::qname::QName;
use crate::registry::{Factory, PluginManager};

/// What a builder is asked to construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// The name of the element being built.
    pub element_name: QName,
    /// The `xsi:type` of the element, if it has one.
    pub schema_type: Option<QName>,
}

impl BuildRequest {
    pub fn new(element_name: QName, schema_type: Option<QName>) -> Self {
        Self {
            element_name,
            schema_type,
        }
    }
}

/// Builders for concrete element types.
///
/// A builder is registered under an element name or a schema type name.
/// Lookups try the schema type first, then the element name. A default
/// builder may be set for elements nothing else knows.
///
/// ```rust
/// use xmlbind::{AnyElement, BuilderRegistry, QName};
///
/// let mut builders = BuilderRegistry::new();
/// let name = QName::new("urn:example", "any");
/// builders.register_type::<AnyElement>(name.clone());
/// assert!(builders.is_registered(&name));
/// assert!(builders.build(&name, None).is_ok());
/// assert!(builders.build(&QName::new("urn:example", "other"), None).is_err());
/// ```
#[derive(Default)]
pub struct BuilderRegistry {
    builders: PluginManager<QName, Box<dyn XmlObject>, BuildRequest>,
    default_builder: Option<Factory<Box<dyn XmlObject>, BuildRequest>>,
}

impl BuilderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builder under an element or schema type name.
    pub fn register(
        &mut self,
        key: QName,
        builder: impl Fn(&BuildRequest) -> Result<Box<dyn XmlObject>, Error> + 'static,
    ) {
        self.builders.register(key, builder);
    }

    /// Register a builder producing `T::default()`.
    pub fn register_type<T: XmlObject + Default>(&mut self, key: QName) {
        self.register(key, |_| Ok(Box::new(T::default())));
    }

    pub fn deregister(&mut self, key: &QName) -> bool {
        self.builders.deregister(key)
    }

    /// Remove every builder, the default builder included.
    pub fn deregister_all(&mut self) {
        self.builders.deregister_all();
        self.default_builder = None;
    }

    pub fn is_registered(&self, key: &QName) -> bool {
        self.builders.is_registered(key)
    }

    /// Set the builder used for elements without a registered builder when
    /// unknown elements are ignored.
    pub fn set_default_builder(
        &mut self,
        builder: impl Fn(&BuildRequest) -> Result<Box<dyn XmlObject>, Error> + 'static,
    ) {
        self.default_builder = Some(Box::new(builder));
    }

    pub fn remove_default_builder(&mut self) {
        self.default_builder = None;
    }

    pub fn has_default_builder(&self) -> bool {
        self.default_builder.is_some()
    }

    /// Build an object for an element, keyed on its schema type if a
    /// builder is registered for it, else on its element name.
    ///
    /// Fails with [`Error::UnknownPluginType`] if neither is registered.
    pub fn build(
        &self,
        element_name: &QName,
        schema_type: Option<&QName>,
    ) -> Result<Box<dyn XmlObject>, Error> {
        let request = BuildRequest::new(element_name.clone(), schema_type.cloned());
        if let Some(schema_type) = schema_type {
            if self.builders.is_registered(schema_type) {
                debug!(element = %element_name, schema_type = %schema_type, "building by schema type");
                return self.builders.build(schema_type, &request);
            }
        }
        debug!(element = %element_name, "building by element name");
        self.builders.build(element_name, &request)
    }

    /// Build an object with the default builder.
    pub fn build_default(
        &self,
        element_name: &QName,
        schema_type: Option<&QName>,
    ) -> Result<Box<dyn XmlObject>, Error> {
        let builder = self
            .default_builder
            .as_ref()
            .ok_or_else(|| Error::UnknownPluginType(element_name.to_string()))?;
        debug!(element = %element_name, "building with default builder");
        builder(&BuildRequest::new(element_name.clone(), schema_type.cloned()))
    }
}
