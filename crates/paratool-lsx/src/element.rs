//! In-memory element tree.

/// Markup an [`Element`] stands for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ElementKind {
    #[default]
    Element,
    /// `<!--text-->`
    Comment,
    /// `<?text?>`
    ProcessingInstruction,
}

/// An XML element with ordered attributes and children.
///
/// Comments and processing instructions are kept in the tree as childless,
/// tagless entries carrying their raw content in `text`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    /// Tag name of the element.
    pub tag: String,
    /// Attributes as key-value pairs, in document order.
    pub attributes: Vec<(String, String)>,
    /// Child elements.
    pub children: Vec<Element>,
    /// Text content (usually empty for LSX).
    pub text: String,
}

impl Element {
    /// Create an element with the given tag name.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// A comment with raw content `text`.
    pub fn comment(text: impl Into<String>) -> Self {
        Self {
            kind: ElementKind::Comment,
            text: text.into(),
            ..Self::default()
        }
    }

    /// A processing instruction with raw content `text` (target and data).
    pub fn processing_instruction(text: impl Into<String>) -> Self {
        Self {
            kind: ElementKind::ProcessingInstruction,
            text: text.into(),
            ..Self::default()
        }
    }

    /// Add an attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Add a child element.
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Add multiple child elements.
    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    /// `<node id="..">` element.
    pub fn node(id: &str) -> Self {
        Self::new("node").attr("id", id)
    }

    /// `<attribute id=".." type=".." value=".."/>` element.
    pub fn attribute(id: &str, value_type: &str, value: &str) -> Self {
        Self::new("attribute")
            .attr("id", id)
            .attr("type", value_type)
            .attr("value", value)
    }

    /// Value of an attribute.
    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether this is a `<node>` with the given id.
    pub fn is_node(&self, id: &str) -> bool {
        self.tag == "node" && self.get_attr("id") == Some(id)
    }

    /// `value` of the child `<attribute>` with the given id.
    pub fn attribute_value(&self, id: &str) -> Option<&str> {
        self.children
            .iter()
            .find(|c| c.tag == "attribute" && c.get_attr("id") == Some(id))
            .and_then(|c| c.get_attr("value"))
    }

    /// Child elements with the given tag.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Pre-order iterator over this element and all descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Index path (from this element) of the first pre-order match.
    pub fn find_path<F>(&self, predicate: F) -> Option<Vec<usize>>
    where
        F: Fn(&Element) -> bool + Copy,
    {
        if predicate(self) {
            return Some(Vec::new());
        }
        self.children.iter().enumerate().find_map(|(index, child)| {
            child.find_path(predicate).map(|mut path| {
                path.insert(0, index);
                path
            })
        })
    }

    /// Element at an index path returned by [`Element::find_path`].
    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        match path.split_first() {
            None => Some(self),
            Some((&index, rest)) => self.children.get_mut(index)?.at_path_mut(rest),
        }
    }

    /// First child with the given tag, appending an empty one if absent.
    pub fn child_or_insert(&mut self, tag: &str) -> &mut Element {
        let index = match self.children.iter().position(|c| c.tag == tag) {
            Some(index) => index,
            None => {
                self.children.push(Element::new(tag));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }
}

/// Iterator returned by [`Element::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Element {
        Element::new("save").child(
            Element::new("region").attr("id", "Config").child(
                Element::node("root").child(
                    Element::new("children")
                        .child(Element::node("Dependencies"))
                        .child(
                            Element::node("ModuleInfo")
                                .child(Element::attribute("Name", "LSString", "Example")),
                        ),
                ),
            ),
        )
    }

    #[test]
    fn test_descendants_pre_order() {
        let root = tree();
        let tags: Vec<_> = root
            .descendants()
            .map(|e| e.get_attr("id").unwrap_or(&e.tag).to_string())
            .collect();

        assert_eq!(
            tags,
            ["save", "Config", "root", "children", "Dependencies", "ModuleInfo", "Name"]
        );
    }

    #[test]
    fn test_find_path_and_mutate() {
        let mut root = tree();
        let path = root.find_path(|e| e.is_node("ModuleInfo")).unwrap();
        assert_eq!(path, [0, 0, 0, 1]);

        let info = root.at_path_mut(&path).unwrap();
        assert_eq!(info.attribute_value("Name"), Some("Example"));
        info.child_or_insert("children");
        info.child_or_insert("children");
        assert_eq!(info.children_named("children").count(), 1);
    }

    #[test]
    fn test_missing_path() {
        let root = tree();
        assert!(root.find_path(|e| e.is_node("Nope")).is_none());
    }
}
