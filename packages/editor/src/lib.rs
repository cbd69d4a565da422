//! # Obojobo Editor
//!
//! Editable tree, chunk converters and schema normalization for Obojobo
//! drafts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ document: OboNode tree ⇄ JSON / XML         │
//! └─────────────────────────────────────────────┘
//!                     ↓ oboToSlate
//! ┌─────────────────────────────────────────────┐
//! │ editor: editable tree                       │
//! │  - Per-chunk converters (Registry)          │
//! │  - Child schemas and normalization          │
//! │  - Path-addressed operations                │
//! │  - EditorDocument lifecycle                 │
//! └─────────────────────────────────────────────┘
//!                     ↓ slateToObo
//! ┌─────────────────────────────────────────────┐
//! │ document: OboNode tree → saved draft        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The Obo tree is what gets saved**: the editable tree is a view built
//!    for editing and converted back on save
//! 2. **Ids survive**: every chunk keeps its id through both conversions
//! 3. **Always valid**: every edit is followed by normalization
//!
//! ## Usage
//!
//! ```rust,ignore
//! use obojobo_common::RealFileSystem;
//! use obojobo_document::IdStrategy;
//! use obojobo_editor::{EditorDocument, Operation, Registry};
//!
//! let registry = Registry::new();
//! let ids = IdStrategy::Uuid.generator("module.json");
//! let mut doc = EditorDocument::load(&RealFileSystem, "module.json", &registry, ids)?;
//!
//! doc.apply(&Operation::InsertText {
//!     path: vec![0, 0, 0, 0, 0],
//!     offset: 0,
//!     text: "Welcome! ".to_string(),
//! })?;
//!
//! doc.save(&RealFileSystem, true)?;
//! ```

mod document;
mod errors;
pub mod models;
mod node;
mod normalize;
mod operations;
mod registry;
mod schema;

pub use document::{DocumentStorage, EditorDocument};
pub use errors::{ConvertError, ConvertResult, EditorError};
pub use node::{EditableElement, EditableNode, Path, Subtype};
pub use normalize::{check, NormalizeError, Normalizer, RepairResult, DEFAULT_MAX_PASSES};
pub use operations::{Operation, OperationError};
pub use registry::{ChunkModel, Registry};
pub use schema::{Matcher, Schema, Slot, Template, Violation, ViolationKind};

// Re-export common types for convenience
pub use obojobo_document::{ChunkType, OboNode};
