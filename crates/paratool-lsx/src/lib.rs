//! LSX document support.
//!
//! LSX is the XML flavour used for module metadata (`meta.lsx`). Values live
//! in `<attribute id=".." type=".." value=".."/>` elements grouped under
//! `<node id="..">` elements and their `<children>` containers.
//!
//! # Example
//!
//! ```
//! use paratool_lsx::{patch_dependencies, ModuleInfo};
//!
//! let meta = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <save>
//!   <region id="Config">
//!     <node id="root">
//!       <children>
//!         <node id="ModuleInfo">
//!           <attribute id="Folder" type="LSString" value="Aggregator"/>
//!           <attribute id="Name" type="LSString" value="Aggregator"/>
//!           <attribute id="UUID" type="FixedString" value="0000-aaaa"/>
//!         </node>
//!       </children>
//!     </node>
//!   </region>
//! </save>"#;
//!
//! let dependency = ModuleInfo::new("Rings", "1111-bbbb", "Rings");
//! let patched = patch_dependencies(meta, &[dependency]).unwrap();
//! assert!(patched.contains(r#"value="1111-bbbb""#));
//! ```

mod document;
mod element;
mod error;
mod module;

pub use document::{Declaration, LsxDocument};
pub use element::{Element, ElementKind};
pub use error::{Error, Result};
pub use module::{patch_dependencies, ModuleInfo, DEPENDENCY_VERSION64};
