pub mod error;
pub mod filesystem;
pub mod integrity;
pub mod loader;
pub mod result;
pub mod visitor;

pub use error::*;
pub use filesystem::*;
pub use integrity::{check_unique_ids, collect_style_types, DuplicateId};
pub use loader::{load_draft, parse_draft, render_draft, save_draft, DraftFormat};
pub use result::*;
pub use visitor::*;
