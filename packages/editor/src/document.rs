//! # Editor Document
//!
//! A draft opened for editing. The document owns the editable tree, keeps it
//! valid after every operation and converts back to an Obo tree on demand.
//!
//! ```text
//! Load → oboToSlate → normalize → apply ops → slateToObo → Save
//!   ↓         ↓            ↓           ↓            ↓         ↓
//! File    editable      valid       edited       OboNode    File
//! ```
//!
//! Documents are either memory-backed (tests, previews) or file-backed, in
//! which case edits mark them dirty until saved.

use crate::normalize::{Normalizer, DEFAULT_MAX_PASSES};
use crate::operations::Operation;
use crate::registry::Registry;
use crate::node::EditableElement;
use crate::EditorError;
use obojobo_common::{load_draft, save_draft, FileSystem};
use obojobo_document::{IdGenerator, OboNode};
use std::path::{Path, PathBuf};
use tracing::info;

/// Editable Obojobo draft
pub struct EditorDocument<'r> {
    /// Path of the draft on disk, or a name for memory-backed documents
    pub path: PathBuf,

    /// Incremented on each applied operation
    pub version: u64,

    storage: DocumentStorage,
    registry: &'r Registry,
    ids: Box<dyn IdGenerator>,
    max_passes: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentStorage {
    Memory { tree: EditableElement },

    File { tree: EditableElement, dirty: bool },
}

impl<'r> EditorDocument<'r> {
    /// Memory-backed document from an Obo tree
    pub fn from_obo(
        path: impl Into<PathBuf>,
        node: &OboNode,
        registry: &'r Registry,
        mut ids: Box<dyn IdGenerator>,
    ) -> Result<Self, EditorError> {
        let tree = open(node, registry, ids.as_mut(), DEFAULT_MAX_PASSES)?;
        Ok(Self {
            path: path.into(),
            version: 0,
            storage: DocumentStorage::Memory { tree },
            registry,
            ids,
            max_passes: DEFAULT_MAX_PASSES,
        })
    }

    /// File-backed document. Opening normalizes the tree, so a repaired draft
    /// starts out dirty.
    pub fn load(
        fs: &dyn FileSystem,
        path: impl Into<PathBuf>,
        registry: &'r Registry,
        mut ids: Box<dyn IdGenerator>,
    ) -> Result<Self, EditorError> {
        let path = path.into();
        let node = load_draft(fs, &path, ids.as_mut())?;
        let converted = registry.obo_to_slate(&node)?;
        let tree = Normalizer::new(registry).normalize(converted.clone(), ids.as_mut())?;
        let dirty = tree != converted;

        info!(path = %path.display(), dirty, "Opened draft for editing");
        Ok(Self {
            path,
            version: 0,
            storage: DocumentStorage::File { tree, dirty },
            registry,
            ids,
            max_passes: DEFAULT_MAX_PASSES,
        })
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn tree(&self) -> &EditableElement {
        match &self.storage {
            DocumentStorage::Memory { tree } | DocumentStorage::File { tree, .. } => tree,
        }
    }

    pub fn storage(&self) -> &DocumentStorage {
        &self.storage
    }

    /// Apply an operation and normalize. On error the tree and version are
    /// left as they were.
    pub fn apply(&mut self, op: &Operation) -> Result<u64, EditorError> {
        let mut edited = self.tree().clone();
        op.apply(&mut edited, self.ids.as_mut())?;
        let edited = Normalizer::new(self.registry)
            .with_max_passes(self.max_passes)
            .normalize(edited, self.ids.as_mut())?;

        match &mut self.storage {
            DocumentStorage::Memory { tree } => *tree = edited,
            DocumentStorage::File { tree, dirty } => {
                *tree = edited;
                *dirty = true;
            }
        }
        self.version += 1;
        Ok(self.version)
    }

    /// Apply operations in order, stopping at the first failure
    pub fn apply_all<'a>(&mut self, ops: impl IntoIterator<Item = &'a Operation>) -> Result<u64, EditorError> {
        for op in ops {
            self.apply(op)?;
        }
        Ok(self.version)
    }

    /// Current tree in Obo form
    pub fn snapshot(&self) -> Result<OboNode, EditorError> {
        Ok(self.registry.slate_to_obo(self.tree())?)
    }

    pub fn is_dirty(&self) -> bool {
        match &self.storage {
            DocumentStorage::File { dirty, .. } => *dirty,
            DocumentStorage::Memory { .. } => false,
        }
    }

    /// Save to the document's path (if file-backed). The format follows the
    /// path's extension.
    pub fn save(&mut self, fs: &dyn FileSystem, pretty: bool) -> Result<(), EditorError> {
        let node = self.snapshot()?;
        match &mut self.storage {
            DocumentStorage::File { dirty, .. } => {
                save_draft(fs, &self.path, &node, pretty)?;
                *dirty = false;
                info!(path = %self.path.display(), version = self.version, "Saved draft");
                Ok(())
            }
            DocumentStorage::Memory { .. } => Err(EditorError::NotFileBacked),
        }
    }

    /// Save a copy to another path without touching the dirty flag
    pub fn save_as(&self, fs: &dyn FileSystem, path: &Path, pretty: bool) -> Result<(), EditorError> {
        save_draft(fs, path, &self.snapshot()?, pretty)?;
        Ok(())
    }
}

impl std::fmt::Debug for EditorDocument<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorDocument")
            .field("path", &self.path)
            .field("version", &self.version)
            .field("storage", &self.storage)
            .finish()
    }
}

fn open(
    node: &OboNode,
    registry: &Registry,
    ids: &mut dyn IdGenerator,
    max_passes: usize,
) -> Result<EditableElement, EditorError> {
    let tree = registry.obo_to_slate(node)?;
    Ok(Normalizer::new(registry)
        .with_max_passes(max_passes)
        .normalize(tree, ids)?)
}
