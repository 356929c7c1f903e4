//! CLI Commands

pub mod generate;
pub mod sync;

pub use generate::{generate_enum, GenerateReport};
pub use sync::sync_permissions;
