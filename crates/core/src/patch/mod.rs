pub mod patch_file;
pub mod store;

pub use patch_file::PatchDirectory;
pub use store::{Patch, DEFAULT_VALUE};
