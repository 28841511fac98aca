#![forbid(unsafe_code)]

//! Typed object trees that marshal to and unmarshal from XML.
//!
//! Concrete element types implement [`XmlObject`] and are registered with
//! a [`BuilderRegistry`] under their element or schema type names. An
//! [`XmlObjects`] context holds the object trees, the [`Dom`] they are
//! converted to and from, and keeps cached DOM coherent as objects change.

mod access;
mod any;
mod builder;
mod cache;
mod config;
pub mod constants;
mod content;
mod dom;
mod error;
mod extension;
mod lock;
mod manipulation;
mod marshal;
mod namespace;
mod object;
mod objects;
mod qname;
mod registry;
pub mod schema;
mod unknown;
mod unmarshal;

pub use any::AnyElement;
pub use builder::{BuildRequest, BuilderRegistry};
pub use config::Config;
pub use content::{ComplexContent, ForeignContent, SimpleText};
pub use dom::{DocumentId, Dom, DomAttribute, DomElement, DomNode, DomValue};
pub use error::Error;
pub use extension::{
    deregister_all_id_attributes, deregister_id_attribute, init_id_attributes,
    is_registered_id_attribute, register_id_attribute, registered_id_attributes,
    ExtensionAttributes,
};
pub use lock::{Lockable, Locker};
pub use manipulation::parse_nil_token;
pub use namespace::{Namespace, NamespaceUsage, Namespaces};
pub use object::{NamespaceScope, ObjectBase, ObjectId, XmlObject};
pub use objects::XmlObjects;
pub use qname::{split_lexical, QName};
pub use registry::{Factory, PluginManager};
pub use schema::{XsDateTime, XsInteger, XsQName, XsString};
pub use unknown::UnknownElement;
