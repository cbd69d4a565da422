//! # Obo XML
//!
//! The hand-authoring format for drafts.
//!
//! ```xml
//! <ObojoboDraftDoc>
//!   <Module title="Intro">
//!     <Content>
//!       <Page>
//!         <Text><t indent="0">Hello <b>world</b></t></Text>
//!       </Page>
//!     </Content>
//!   </Module>
//! </ObojoboDraftDoc>
//! ```
//!
//! Reading goes source → tokens ([`lexer`]) → generic elements ([`parser`])
//! → [`OboNode`] ([`reader`]). Writing is a direct walk ([`serializer`]).

pub mod entities;
pub mod lexer;
pub mod parser;
pub mod reader;
pub mod serializer;

use crate::error::ParseErrors;
use crate::id_generator::{IdGenerator, SequentialIdGenerator};
use crate::node::OboNode;
use tracing::debug;

pub use parser::{XmlChild, XmlElement};
pub use serializer::Serializer;

/// Parse Obo XML, generating sequential ids seeded from an anonymous path
pub fn parse_xml(source: &str) -> Result<OboNode, ParseErrors> {
    parse_xml_with_path(source, "<anonymous>")
}

/// Parse Obo XML; missing ids are `crc32(path)-n`
pub fn parse_xml_with_path(source: &str, path: &str) -> Result<OboNode, ParseErrors> {
    let mut ids = SequentialIdGenerator::new(path);
    parse_xml_with_ids(source, &mut ids)
}

pub fn parse_xml_with_ids(source: &str, ids: &mut dyn IdGenerator) -> Result<OboNode, ParseErrors> {
    let root = parser::parse_element_tree(source)?;
    let node = reader::Reader::new(ids).read_document(&root)?;
    debug!(root = %node.node_type, nodes = node.count(), "Parsed Obo XML");
    Ok(node)
}

/// Serialize a tree as a complete Obo XML document
pub fn to_xml(root: &OboNode) -> String {
    serializer::serialize(root)
}
