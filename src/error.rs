use thiserror::Error;

use crate::qname::QName;

/// Errors produced by the object engine and its DOM.
#[derive(Debug, Error)]
pub enum Error {
    /// A structural rule of the object tree was violated: a node was given
    /// a second parent, a grandchild was detached, a childless object was
    /// asked to remove a child, or text was placed beyond the last child.
    #[error("structural violation: {0}")]
    StructuralViolation(String),
    /// The registry has no factory for the key.
    #[error("unknown plugin type: {0}")]
    UnknownPluginType(String),
    /// Producing DOM from an object failed.
    #[error("marshalling failed: {0}")]
    MarshallingFailure(String),
    /// Producing an object from DOM failed.
    #[error("unmarshalling failed: {0}")]
    UnmarshallingFailure(String),
    /// An element nobody knows how to build or claim.
    #[error("unknown element: {0}")]
    UnknownElement(QName),
    /// An attribute the target object does not accept.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(QName),
    /// Typed access asked for a concrete type the object is not.
    #[error("object is not a {0}")]
    TypeMismatch(&'static str),
    /// An entity reference without a closing `;`.
    #[error("unclosed entity: {0}")]
    UnclosedEntity(String),
    /// An entity reference that is not predefined or a character reference.
    #[error("invalid entity: {0}")]
    InvalidEntity(String),
    /// A prefix without a namespace declaration in scope.
    #[error("unknown prefix: {0}")]
    UnknownPrefix(String),
    /// An end tag that does not close the current element.
    #[error("mismatched end tag: expected {expected}, found {found}")]
    MismatchedEndTag { expected: String, found: String },
    /// An element still open at the end of the input.
    #[error("unclosed tag: {0}")]
    UnclosedTag(String),
    /// A document without a document element.
    #[error("document has no document element")]
    NoDocumentElement,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parser(#[from] xmlparser::Error),
}
