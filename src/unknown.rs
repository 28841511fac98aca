use crate::content::ForeignContent;
use crate::object::XmlObject;

/// An element no builder knows.
///
/// Its DOM is kept as is rather than unmarshalled. When the DOM cache goes
/// away the element is serialized to a string, and marshalling rebuilds
/// the DOM from that string, so the content round trips unchanged.
///
/// ```rust
/// use xmlbind::{Config, UnknownElement, XmlObjects};
///
/// let mut objects = XmlObjects::with_config(Config::default().ignore_unknown_elements(true));
/// objects.builders_mut().set_default_builder(|_| Ok(Box::new(UnknownElement::new())));
/// let root = objects.parse_str(r#"<a xmlns="urn:x"><b c="1"/></a>"#)?;
/// objects.release_self(root);
/// assert_eq!(
///     objects.value::<UnknownElement>(root)?.xml(),
///     Some(r#"<a xmlns="urn:x"><b c="1"/></a>"#)
/// );
/// # Ok::<(), xmlbind::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownElement {
    content: ForeignContent,
}

impl UnknownElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// The preserved XML, once the DOM cache has been released.
    pub fn xml(&self) -> Option<&str> {
        self.content.xml()
    }
}

impl XmlObject for UnknownElement {
    fn foreign_content(&self) -> Option<&ForeignContent> {
        Some(&self.content)
    }

    fn foreign_content_mut(&mut self) -> Option<&mut ForeignContent> {
        Some(&mut self.content)
    }
}
