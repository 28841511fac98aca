use xmlparser::{ElementEnd, Token, Tokenizer};

use super::encoding::decode;
use super::entity::parse_entities;
use super::{Dom, DomAttribute, DomElement, DomNode, DomValue};
use crate::constants::XMLNS_PREFIX;
use crate::error::Error;
use crate::qname::QName;

struct PendingElement {
    prefix: String,
    local: String,
    declarations: Vec<(String, String)>,
    attributes: Vec<(String, String, String)>,
}

struct DocumentBuilder<'a> {
    dom: &'a mut Dom,
    current: DomNode,
    pending: Option<PendingElement>,
}

impl<'a> DocumentBuilder<'a> {
    fn new(dom: &'a mut Dom, document: DomNode) -> Self {
        DocumentBuilder {
            dom,
            current: document,
            pending: None,
        }
    }

    fn element_start(&mut self, prefix: &str, local: &str) {
        self.pending = Some(PendingElement {
            prefix: prefix.to_string(),
            local: local.to_string(),
            declarations: Vec::new(),
            attributes: Vec::new(),
        });
    }

    fn attribute(&mut self, prefix: &str, local: &str, value: &str) -> Result<(), Error> {
        let value = parse_entities(value)?.into_owned();
        let Some(pending) = self.pending.as_mut() else {
            return Ok(());
        };
        if prefix == XMLNS_PREFIX {
            pending.declarations.push((local.to_string(), value));
        } else if prefix.is_empty() && local == XMLNS_PREFIX {
            pending.declarations.push((String::new(), value));
        } else {
            pending
                .attributes
                .push((prefix.to_string(), local.to_string(), value));
        }
        Ok(())
    }

    fn resolve(&self, pending: &PendingElement, prefix: &str) -> Option<String> {
        if let Some((_, uri)) = pending.declarations.iter().find(|(p, _)| p == prefix) {
            return Some(uri.clone());
        }
        self.dom
            .lookup_namespace_uri(self.current, prefix)
            .map(str::to_string)
    }

    fn open_element(&mut self) -> Result<DomNode, Error> {
        let pending = self
            .pending
            .take()
            .ok_or_else(|| Error::StructuralViolation("element end without start".into()))?;
        let namespace = match self.resolve(&pending, &pending.prefix) {
            Some(uri) => uri,
            None if pending.prefix.is_empty() => String::new(),
            None => return Err(Error::UnknownPrefix(pending.prefix.clone())),
        };
        let mut element = DomElement::new(QName::with_prefix(
            namespace,
            pending.local.clone(),
            pending.prefix.clone(),
        ));
        for (prefix, uri) in &pending.declarations {
            element.declare_namespace(prefix.clone(), uri.clone());
        }
        for (prefix, local, value) in &pending.attributes {
            // unprefixed attributes are in no namespace
            let namespace = if prefix.is_empty() {
                String::new()
            } else {
                self.resolve(&pending, prefix)
                    .ok_or_else(|| Error::UnknownPrefix(prefix.clone()))?
            };
            element.attributes.push(DomAttribute {
                name: QName::with_prefix(namespace, local.clone(), prefix.clone()),
                value: value.clone(),
                is_id: false,
            });
        }
        let node = DomNode::new(self.dom.arena.new_node(DomValue::Element(element)));
        self.dom.append(self.current, node)?;
        Ok(node)
    }

    fn close_element(&mut self, prefix: &str, local: &str) -> Result<(), Error> {
        let expected = self
            .dom
            .element(self.current)
            .map(|element| element.name().lexical())
            .unwrap_or_default();
        let found = if prefix.is_empty() {
            local.to_string()
        } else {
            format!("{}:{}", prefix, local)
        };
        if expected != found {
            return Err(Error::MismatchedEndTag { expected, found });
        }
        self.current = self
            .dom
            .parent(self.current)
            .ok_or_else(|| Error::StructuralViolation("unbalanced end tag".into()))?;
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), Error> {
        // text outside the document element is only whitespace; drop it
        if self.dom.element(self.current).is_none() {
            return Ok(());
        }
        self.dom.append_text(self.current, text)
    }

    fn leaf(&mut self, node: DomNode) -> Result<(), Error> {
        self.dom.append(self.current, node)
    }
}

/// ## Parsing
impl Dom {
    /// Parse an XML string into a new document and return the document
    /// root.
    ///
    /// ```rust
    /// use xmlbind::Dom;
    ///
    /// let mut dom = Dom::new();
    /// let document = dom.parse(r#"<doc xmlns="urn:x"><a>1</a></doc>"#)?;
    /// let doc_el = dom.document_element(document).unwrap();
    /// assert_eq!(dom.element(doc_el).unwrap().name().namespace_uri(), Some("urn:x"));
    /// # Ok::<(), xmlbind::Error>(())
    /// ```
    pub fn parse(&mut self, xml: &str) -> Result<DomNode, Error> {
        let document = self.new_document();
        match self.parse_into(document, xml) {
            Ok(()) => Ok(document),
            Err(e) => {
                self.release_document(document);
                Err(e)
            }
        }
    }

    /// Parse XML bytes, detecting their encoding first.
    pub fn parse_bytes(&mut self, data: &[u8]) -> Result<DomNode, Error> {
        let xml = decode(data);
        self.parse(&xml)
    }

    fn parse_into(&mut self, document: DomNode, xml: &str) -> Result<(), Error> {
        let mut builder = DocumentBuilder::new(self, document);
        for token in Tokenizer::from(xml) {
            match token? {
                Token::ElementStart { prefix, local, .. } => {
                    builder.element_start(prefix.as_str(), local.as_str());
                }
                Token::Attribute {
                    prefix,
                    local,
                    value,
                    ..
                } => {
                    builder.attribute(prefix.as_str(), local.as_str(), value.as_str())?;
                }
                Token::ElementEnd { end, .. } => match end {
                    ElementEnd::Open => {
                        let node = builder.open_element()?;
                        builder.current = node;
                    }
                    ElementEnd::Empty => {
                        builder.open_element()?;
                    }
                    ElementEnd::Close(prefix, local) => {
                        builder.close_element(prefix.as_str(), local.as_str())?;
                    }
                },
                Token::Text { text } => {
                    let text = parse_entities(text.as_str())?;
                    builder.text(&text)?;
                }
                Token::Cdata { text, .. } => {
                    builder.text(text.as_str())?;
                }
                Token::Comment { text, .. } => {
                    let node = builder.dom.new_comment(text.as_str());
                    builder.leaf(node)?;
                }
                Token::ProcessingInstruction {
                    target, content, ..
                } => {
                    let node = builder
                        .dom
                        .new_processing_instruction(target.as_str(), content.map(|c| c.as_str()));
                    builder.leaf(node)?;
                }
                _ => {}
            }
        }
        if let Some(element) = builder.dom.element(builder.current) {
            return Err(Error::UnclosedTag(element.name().lexical()));
        }
        if self.document_element(document).is_none() {
            return Err(Error::NoDocumentElement);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefixed() {
        let mut dom = Dom::new();
        let document = dom
            .parse(r#"<ex:doc xmlns:ex="urn:ex" ex:a="1" b="2"/>"#)
            .unwrap();
        let element = dom.element(dom.document_element(document).unwrap()).unwrap();
        assert_eq!(element.name(), &QName::new("urn:ex", "doc"));
        assert_eq!(element.name().prefix(), Some("ex"));
        assert_eq!(element.attribute(&QName::new("urn:ex", "a")), Some("1"));
        assert_eq!(element.attribute(&QName::without_namespace("b")), Some("2"));
        assert_eq!(element.declared_namespace("ex"), Some("urn:ex"));
    }

    #[test]
    fn test_parse_unknown_prefix() {
        let mut dom = Dom::new();
        assert!(matches!(
            dom.parse(r#"<ex:doc/>"#),
            Err(Error::UnknownPrefix(prefix)) if prefix == "ex"
        ));
    }

    #[test]
    fn test_parse_cdata_merges_with_text() {
        let mut dom = Dom::new();
        let document = dom.parse(r#"<doc>a<![CDATA[<b>]]>c</doc>"#).unwrap();
        let doc_el = dom.document_element(document).unwrap();
        assert_eq!(dom.children(doc_el).count(), 1);
        assert_eq!(dom.text_content(doc_el), "a<b>c");
    }

    #[test]
    fn test_parse_mismatched_end_tag() {
        let mut dom = Dom::new();
        assert!(dom.parse(r#"<a><b></a></b>"#).is_err());
    }
}
