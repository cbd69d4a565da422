use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Source of ids for nodes created by parsing or repair. Conversion itself
/// never calls this.
pub trait IdGenerator {
    fn new_id(&mut self) -> String;
}

/// Generate document seed from a file path using CRC32
pub fn get_document_id(path: &str) -> String {
    let mut buff = String::from(path);
    if !path.starts_with("file://") {
        buff = format!("file://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Deterministic `{seed}-{n}` ids, reproducible across runs
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    seed: String,
    count: u32,
}

impl SequentialIdGenerator {
    pub fn new(path: &str) -> Self {
        Self {
            seed: get_document_id(path),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }
}

/// Random v4 UUIDs, the format stored drafts use
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn new_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    #[default]
    Uuid,
    Sequential,
}

impl IdStrategy {
    /// `path` seeds the sequential strategy and is ignored otherwise
    pub fn generator(self, path: &str) -> Box<dyn IdGenerator> {
        match self {
            IdStrategy::Uuid => Box::new(UuidGenerator),
            IdStrategy::Sequential => Box::new(SequentialIdGenerator::new(path)),
        }
    }
}
