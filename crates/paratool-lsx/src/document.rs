//! LSX parsing and writing with quick-xml.

use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::element::{Element, ElementKind};
use crate::{Error, Result};

/// XML declaration fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

/// A parsed LSX document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LsxDocument {
    pub declaration: Option<Declaration>,
    /// Comments and processing instructions before the root
    pub prolog: Vec<Element>,
    pub root: Element,
    /// Comments and processing instructions after the root
    pub epilog: Vec<Element>,
}

impl LsxDocument {
    /// Parse a document from text.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut declaration = None;
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Decl(d)) => declaration = Some(read_declaration(&d)?),
                Ok(Event::Start(e)) => stack.push(read_element(&e)?),
                Ok(Event::Empty(e)) => {
                    let element = read_element(&e)?;
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::End(_)) => {
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element);
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(element) = stack.last_mut() {
                        let text = e.unescape().map_err(|e| Error::Xml(e.to_string()))?;
                        if !text.trim().is_empty() {
                            element.text = text.into_owned();
                        }
                    }
                }
                Ok(Event::Comment(e)) => {
                    let comment = Element::comment(String::from_utf8_lossy(&e));
                    attach_misc(&mut stack, &root, &mut prolog, &mut epilog, comment);
                }
                Ok(Event::PI(e)) => {
                    let pi = Element::processing_instruction(String::from_utf8_lossy(&e));
                    attach_misc(&mut stack, &root, &mut prolog, &mut epilog, pi);
                }
                Ok(Event::Eof) => break,
                Ok(_) => {} // CDATA, doctype
                Err(e) => return Err(Error::Xml(format!("XML parse error: {}", e))),
            }
        }

        Ok(Self {
            declaration,
            prolog,
            root: root.ok_or(Error::NoRoot)?,
            epilog,
        })
    }

    /// Parse a document from UTF-8 bytes, skipping a leading byte order mark.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        Self::parse(std::str::from_utf8(bytes)?)
    }

    /// Serialize with two-space indentation.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        if let Some(decl) = &self.declaration {
            writer
                .write_event(Event::Decl(BytesDecl::new(
                    &decl.version,
                    decl.encoding.as_deref(),
                    decl.standalone.as_deref(),
                )))
                .map_err(|e| Error::Xml(e.to_string()))?;
        }
        for element in self.prolog.iter().chain([&self.root]).chain(&self.epilog) {
            write_element(&mut writer, element)?;
        }

        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::Utf8(e.utf8_error()))
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn attach_misc(
    stack: &mut [Element],
    root: &Option<Element>,
    prolog: &mut Vec<Element>,
    epilog: &mut Vec<Element>,
    element: Element,
) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => prolog.push(element),
        None => epilog.push(element),
    }
}

fn read_declaration(decl: &BytesDecl<'_>) -> Result<Declaration> {
    let text = |bytes: &[u8]| String::from_utf8_lossy(bytes).into_owned();

    let version = decl.version().map_err(|e| Error::Xml(e.to_string()))?;
    let encoding = decl
        .encoding()
        .transpose()
        .map_err(|e| Error::Xml(e.to_string()))?;
    let standalone = decl
        .standalone()
        .transpose()
        .map_err(|e| Error::Xml(e.to_string()))?;

    Ok(Declaration {
        version: text(version.as_ref()),
        encoding: encoding.as_deref().map(text),
        standalone: standalone.as_deref().map(text),
    })
}

fn read_element(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));

    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let event = match element.kind {
        ElementKind::Element => None,
        ElementKind::Comment => Some(Event::Comment(BytesText::from_escaped(
            element.text.as_str(),
        ))),
        ElementKind::ProcessingInstruction => {
            Some(Event::PI(BytesPI::new(element.text.as_str())))
        }
    };
    if let Some(event) = event {
        return writer
            .write_event(event)
            .map_err(|e| Error::Xml(e.to_string()));
    }

    let mut start = BytesStart::new(element.tag.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() && element.text.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| Error::Xml(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| Error::Xml(e.to_string()))?;
    if !element.text.is_empty() {
        writer
            .write_event(Event::Text(BytesText::new(&element.text)))
            .map_err(|e| Error::Xml(e.to_string()))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.tag.as_str())))
        .map_err(|e| Error::Xml(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<save>
    <version major="4" minor="0" revision="9" build="331"/>
    <region id="Config">
        <node id="root">
            <children>
                <node id="ModuleInfo">
                    <attribute id="Name" type="LSString" value="Rings &amp; Things"/>
                </node>
            </children>
        </node>
    </region>
</save>"#;

    #[test]
    fn test_parse_structure() {
        let doc = LsxDocument::parse(SAMPLE).unwrap();

        assert_eq!(doc.root.tag, "save");
        assert_eq!(doc.root.children.len(), 2);
        let decl = doc.declaration.as_ref().unwrap();
        assert_eq!(decl.version, "1.0");
        assert_eq!(decl.encoding.as_deref(), Some("UTF-8"));

        let info = doc.root.descendants().find(|e| e.is_node("ModuleInfo")).unwrap();
        assert_eq!(info.attribute_value("Name"), Some("Rings & Things"));
    }

    #[test]
    fn test_write_round_trip() {
        let doc = LsxDocument::parse(SAMPLE).unwrap();
        let xml = doc.to_xml_string().unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("\n  <version major=\"4\""));
        assert!(xml.contains("Rings &amp; Things"));
        assert_eq!(LsxDocument::parse(&xml).unwrap(), doc);
    }

    #[test]
    fn test_comments_and_instructions_survive() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- exported by the toolkit -->
<save>
  <?editor keep-order?>
  <region id="Config">
    <!-- module header -->
    <node id="root"/>
  </region>
</save>
<!-- end -->"#;
        let doc = LsxDocument::parse(xml).unwrap();

        assert_eq!(doc.prolog, [Element::comment(" exported by the toolkit ")]);
        assert_eq!(doc.epilog, [Element::comment(" end ")]);
        assert_eq!(
            doc.root.children[0],
            Element::processing_instruction("editor keep-order")
        );
        assert_eq!(doc.root.children[1].children[0].kind, ElementKind::Comment);

        let written = doc.to_xml_string().unwrap();
        assert!(written.contains("<!-- exported by the toolkit -->"));
        assert!(written.contains("<?editor keep-order?>"));
        assert!(written.contains("<!-- module header -->"));
        assert!(written.contains("<!-- end -->"));
        assert_eq!(LsxDocument::parse(&written).unwrap(), doc);
    }

    #[test]
    fn test_bom_is_skipped() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(b"<save/>");

        let doc = LsxDocument::from_bytes(&bytes).unwrap();
        assert_eq!(doc.root.tag, "save");
        assert!(doc.declaration.is_none());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(LsxDocument::parse(""), Err(Error::NoRoot)));
        assert!(matches!(
            LsxDocument::parse("<save><region></save>"),
            Err(Error::Xml(_))
        ));
    }
}
