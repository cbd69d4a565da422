//! Obojobo draft documents
//!
//! The persisted tree ([`OboNode`]), its registered chunk types, the
//! `textGroup` line model, id generation, and the Obo XML format.

pub mod chunk_type;
pub mod error;
pub mod id_generator;
pub mod node;
pub mod text_group;
pub mod xml;

pub use chunk_type::ChunkType;
pub use error::{format_errors, ParseError, ParseErrors, ParseResult};
pub use id_generator::{IdGenerator, IdStrategy, SequentialIdGenerator, UuidGenerator};
pub use node::{Content, OboNode};
pub use text_group::{LineData, TextGroup, TextGroupItem};
pub use xml::{parse_xml, parse_xml_with_ids, parse_xml_with_path, to_xml};
