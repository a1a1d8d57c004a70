//! Module metadata and dependency declarations.

use std::collections::HashSet;

use tracing::debug;

use crate::document::LsxDocument;
use crate::element::Element;
use crate::Result;

/// `Version64` written for every added dependency.
pub const DEPENDENCY_VERSION64: &str = "36028797018963968";

/// Identity of a module as declared in its `meta.lsx`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleInfo {
    pub name: String,
    pub uuid: String,
    pub folder: String,
}

impl ModuleInfo {
    pub fn new(name: impl Into<String>, uuid: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uuid: uuid.into(),
            folder: folder.into(),
        }
    }

    /// Read `Name`, `UUID` and `Folder` from a `ModuleInfo` node.
    pub fn from_element(node: &Element) -> Option<Self> {
        Some(Self {
            name: node.attribute_value("Name")?.to_string(),
            uuid: node.attribute_value("UUID")?.to_string(),
            folder: node.attribute_value("Folder")?.to_string(),
        })
    }

    /// Module info of a parsed document, if it has a complete one.
    pub fn from_document(doc: &LsxDocument) -> Option<Self> {
        doc.root
            .descendants()
            .find(|e| e.is_node("ModuleInfo"))
            .and_then(Self::from_element)
    }

    /// Parse `meta.lsx` bytes and read the module info.
    pub fn from_lsx(bytes: &[u8]) -> Result<Option<Self>> {
        Ok(Self::from_document(&LsxDocument::from_bytes(bytes)?))
    }

    /// `ModuleShortDesc` node declaring a dependency on this module.
    pub fn short_desc(&self) -> Element {
        Element::node("ModuleShortDesc")
            .child(Element::attribute("Folder", "LSString", &self.folder))
            .child(Element::attribute("Name", "LSString", &self.name))
            .child(Element::attribute("UUID", "FixedString", &self.uuid))
            .child(Element::attribute("Version64", "int64", DEPENDENCY_VERSION64))
    }
}

/// Declare a dependency on each of `mods` in a `meta.lsx` document.
///
/// The first `Dependencies` node in the document receives the entries. If
/// there is none, one is created in the `ModuleInfo` node's `children`.
/// Modules whose UUID is already declared are skipped; existing entries are
/// never removed or reordered. A document with neither node is returned
/// unchanged.
pub fn patch_dependencies(xml: &str, mods: &[ModuleInfo]) -> Result<String> {
    let mut doc = LsxDocument::parse(xml)?;

    let dependencies = match doc.root.find_path(|e| e.is_node("Dependencies")) {
        Some(path) => doc.root.at_path_mut(&path),
        None => match doc.root.find_path(|e| e.is_node("ModuleInfo")) {
            Some(path) => doc.root.at_path_mut(&path).map(|info| {
                let children = info.child_or_insert("children");
                children.children.push(Element::node("Dependencies"));
                let last = children.children.len() - 1;
                &mut children.children[last]
            }),
            None => None,
        },
    };
    let Some(dependencies) = dependencies else {
        debug!("no ModuleInfo or Dependencies node, leaving metadata unchanged");
        return Ok(xml.to_string());
    };

    let container = dependencies.child_or_insert("children");
    let mut declared: HashSet<String> = container
        .children
        .iter()
        .filter(|e| e.is_node("ModuleShortDesc"))
        .filter_map(|e| e.attribute_value("UUID"))
        .map(str::to_string)
        .collect();

    let mut added = 0;
    for module in mods {
        if declared.insert(module.uuid.clone()) {
            container.children.push(module.short_desc());
            added += 1;
        }
    }

    debug!(added, skipped = mods.len() - added, "patched dependencies");
    doc.to_xml_string()
}
