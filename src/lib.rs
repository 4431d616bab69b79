//! # structural-merge
//!
//! A structural three-way source-code merge engine. Given a common-ancestor
//! revision and two derived revisions of the same source file, it reasons at
//! the granularity of named program entities — functions, methods, types,
//! imports — rather than raw text lines, so that two branches touching
//! *different* declarations in the same file merge cleanly even when they sit
//! textually close enough to make a line-based three-way merge spuriously
//! conflict.
//!
//! ## Pipeline
//!
//! ```text
//! (path, base, ours, theirs)
//!     -> extract (per side)     entity.rs, extract.rs, lang.rs
//!     -> match by identity key  matcher.rs
//!     -> resolve per disposition  imports.rs, diff3.rs
//!     -> reconstruct             reconstruct.rs
//! ```
//!
//! [`myers`] and [`diff3`] are also exposed standalone: the entity extractor's
//! fallbacks and the orchestrator's nested-conflict resolution both recurse
//! into the line-level merge, and callers that only need a two-way or
//! three-way line diff can use them directly.
//!
//! ## Supported languages
//!
//! Go, Python, Rust, TypeScript, JavaScript, C, C++, Java. Import set-union
//! merging (as opposed to line-level fallback for import blocks) is
//! implemented for Go only; see [`imports`].
//!
//! ## Example
//!
//! ```rust
//! use std::path::Path;
//! use structural_merge::orchestrator::merge_files;
//!
//! let base = b"package m\n\nfunc A(){}\n";
//! let theirs = b"package m\n\nfunc A(){}\n\nfunc B(){}\n";
//! let result = merge_files(Path::new("main.go"), base, base, theirs);
//!
//! assert!(!result.has_conflicts);
//! ```

pub mod config;
pub mod diff3;
pub mod entity;
pub mod error;
pub mod extract;
pub mod imports;
pub mod lang;
pub mod matcher;
pub mod myers;
pub mod orchestrator;
pub mod reconstruct;
pub mod twoway;

pub use config::EngineConfig;
pub use diff3::merge as merge_lines;
pub use entity::{Entity, EntityKind, EntityList};
pub use error::ExtractError;
pub use extract::extract;
pub use imports::merge_imports;
pub use lang::Language;
pub use matcher::{build_entity_map, match_entities, ordered_identity_keys, Disposition, MatchedEntity};
pub use myers::{line_diff, myers_diff, DiffOp};
pub use orchestrator::{merge_files, merge_files_with_config, MergeResult, Stats};
pub use reconstruct::{reconstruct, ResolvedEntity};
pub use twoway::{diff_files, Change, FileDiff};
