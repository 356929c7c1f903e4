//! # permgen Codegen
//!
//! Turns an expanded permission map into a Rust source module and reads
//! generated modules back.
//!
//! ## Overview
//!
//! - **Templates**: explicit path, project override, or the bundled template
//! - **Targets**: output path, derived module path and enum type name
//! - **Rendering**: placeholder substitution, one `NAME = "value";` line per case
//! - **Writing**: parent directories, overwrite confirmation
//! - **Artifacts**: re-parsing generated modules into ordered cases
//!
//! ## Usage
//!
//! ```rust
//! use permgen_codegen::{render, ArtifactTarget, GeneratedArtifact, Template};
//! use permgen_rbac::{expand, ResourceDeclaration};
//!
//! let resources = vec![ResourceDeclaration::with_actions("post", ["view", "create"])];
//! let expansion = expand(&resources, &[]);
//!
//! let target = ArtifactTarget::new("src/permissions.rs", "src", Some("crate::permissions::Permission"));
//! let source = render(&expansion.permissions, &Template::bundled(), &target);
//! assert!(source.contains("pub enum Permission"));
//! assert!(source.contains("    POST_CREATE = \"posts.create\";"));
//!
//! let artifact = GeneratedArtifact::parse(&target.type_name, &source).unwrap();
//! assert_eq!(artifact.all_values(), vec!["posts.create", "posts.view"]);
//! ```

pub mod artifact;
pub mod error;
pub mod render;
pub mod target;
pub mod template;
pub mod writer;

pub use artifact::GeneratedArtifact;
pub use error::{ArtifactError, ArtifactResult};
pub use render::{format_cases, render, EMPTY_CASES_MARKER};
pub use target::ArtifactTarget;
pub use template::{Template, TemplateOrigin};
pub use writer::{write_artifact, WriteOutcome};
