use std::io::Write;

use indextree::NodeEdge;

use super::entity::{serialize_attribute, serialize_text};
use super::{Dom, DomElement, DomNode, DomValue};
use crate::error::Error;

fn write_declaration(w: &mut impl Write, prefix: &str, uri: &str) -> Result<(), Error> {
    if prefix.is_empty() {
        write!(w, " xmlns=\"{}\"", serialize_attribute(uri))?;
    } else {
        write!(w, " xmlns:{}=\"{}\"", prefix, serialize_attribute(uri))?;
    }
    Ok(())
}

/// ## Serialization
impl Dom {
    /// Serialize a node and its descendants.
    ///
    /// When `node` is an element below another element, the namespace
    /// declarations it inherits are written on it so the output stands on
    /// its own.
    pub fn serialize(&self, node: DomNode, w: &mut impl Write) -> Result<(), Error> {
        for edge in node.get().traverse(&self.arena) {
            match edge {
                NodeEdge::Start(current) => {
                    self.handle_edge_start(node, DomNode::new(current), w)?;
                }
                NodeEdge::End(current) => {
                    self.handle_edge_end(DomNode::new(current), w)?;
                }
            }
        }
        Ok(())
    }

    /// Serialize a node to a string.
    ///
    /// ```rust
    /// use xmlbind::Dom;
    ///
    /// let mut dom = Dom::new();
    /// let document = dom.parse(r#"<doc a="1"><b>text</b></doc>"#)?;
    /// assert_eq!(dom.to_string(document)?, r#"<doc a="1"><b>text</b></doc>"#);
    /// # Ok::<(), xmlbind::Error>(())
    /// ```
    pub fn to_string(&self, node: DomNode) -> Result<String, Error> {
        let mut buf = Vec::new();
        self.serialize(node, &mut buf)?;
        // we only ever write UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn inherited_declarations(&self, node: DomNode) -> Vec<(String, String)> {
        match self.parent(node) {
            Some(parent) if self.element(parent).is_some() => self.namespaces_in_scope(parent),
            _ => Vec::new(),
        }
    }

    fn handle_edge_start(
        &self,
        top: DomNode,
        node: DomNode,
        w: &mut impl Write,
    ) -> Result<(), Error> {
        match self.value(node) {
            DomValue::Document(_) => {}
            DomValue::Element(element) => {
                write!(w, "<{}", element.name().lexical())?;
                if node == top {
                    for (prefix, uri) in self.inherited_declarations(node) {
                        if element.declared_namespace(&prefix).is_none() {
                            write_declaration(w, &prefix, &uri)?;
                        }
                    }
                }
                self.write_attributes(element, w)?;
                if node.get().children(&self.arena).next().is_none() {
                    write!(w, "/>")?;
                } else {
                    write!(w, ">")?;
                }
            }
            DomValue::Text(text) => {
                write!(w, "{}", serialize_text(text))?;
            }
            DomValue::Comment(text) => {
                write!(w, "<!--{}-->", text)?;
            }
            DomValue::ProcessingInstruction { target, data } => match data {
                Some(data) => write!(w, "<?{} {}?>", target, data)?,
                None => write!(w, "<?{}?>", target)?,
            },
        }
        Ok(())
    }

    fn write_attributes(&self, element: &DomElement, w: &mut impl Write) -> Result<(), Error> {
        for (prefix, uri) in element.namespace_declarations() {
            write_declaration(w, prefix, uri)?;
        }
        for attribute in element.attributes() {
            write!(
                w,
                " {}=\"{}\"",
                attribute.name().lexical(),
                serialize_attribute(attribute.value())
            )?;
        }
        Ok(())
    }

    fn handle_edge_end(&self, node: DomNode, w: &mut impl Write) -> Result<(), Error> {
        if let DomValue::Element(element) = self.value(node) {
            if node.get().children(&self.arena).next().is_some() {
                write!(w, "</{}>", element.name().lexical())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let mut dom = Dom::new();
        let xml = r#"<root><a>1</a><b>2</b></root>"#;
        let document = dom.parse(xml).unwrap();
        assert_eq!(dom.to_string(document).unwrap(), xml);
    }

    #[test]
    fn test_roundtrip_ns() {
        let mut dom = Dom::new();
        let xml =
            r#"<foo:root xmlns:foo="http://example.com"><foo:a>1</foo:a><foo:b>2</foo:b></foo:root>"#;
        let document = dom.parse(xml).unwrap();
        assert_eq!(dom.to_string(document).unwrap(), xml);
    }

    #[test]
    fn test_serialize_nested_node_carries_prefixes() {
        let mut dom = Dom::new();
        let document = dom
            .parse(r#"<doc xmlns:foo="http://example.com"><foo:a/></doc>"#)
            .unwrap();
        let doc_el = dom.document_element(document).unwrap();
        let a = dom.children(doc_el).next().unwrap();
        assert_eq!(
            dom.to_string(a).unwrap(),
            r#"<foo:a xmlns:foo="http://example.com"/>"#
        );
    }

    #[test]
    fn test_serialize_escapes() {
        let mut dom = Dom::new();
        let xml = r#"<doc a="&quot;x&quot; &amp; y">1 &lt; 2</doc>"#;
        let document = dom.parse(xml).unwrap();
        assert_eq!(dom.to_string(document).unwrap(), xml);
    }

    #[test]
    fn test_serialize_comment_and_pi() {
        let mut dom = Dom::new();
        let xml = r#"<doc><!--note--><?target data?></doc>"#;
        let document = dom.parse(xml).unwrap();
        assert_eq!(dom.to_string(document).unwrap(), xml);
    }
}
