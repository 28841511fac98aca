use crate::content::ComplexContent;
use crate::error::Error;
use crate::extension::ExtensionAttributes;
use crate::object::{ObjectId, XmlObject};
use crate::qname::QName;

/// A wildcard element: any attributes, any children, mixed text.
///
/// This is the type to register for elements whose content is not
/// constrained, like `xs:any` content in a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnyElement {
    content: ComplexContent,
    attributes: ExtensionAttributes,
}

impl AnyElement {
    pub fn new() -> Self {
        Self::default()
    }
}

impl XmlObject for AnyElement {
    fn complex_content(&self) -> Option<&ComplexContent> {
        Some(&self.content)
    }

    fn complex_content_mut(&mut self) -> Option<&mut ComplexContent> {
        Some(&mut self.content)
    }

    fn extension_attributes(&self) -> Option<&ExtensionAttributes> {
        Some(&self.attributes)
    }

    fn extension_attributes_mut(&mut self) -> Option<&mut ExtensionAttributes> {
        Some(&mut self.attributes)
    }

    fn process_child(&mut self, _name: &QName, child: ObjectId) -> Result<bool, Error> {
        self.content.push(child);
        Ok(true)
    }
}
