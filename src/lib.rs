//! Cross-language project discovery for version-management tooling.
//!
//! This library locates project manifest files (`package.json`, `pom.xml`,
//! `Cargo.toml`) across a workspace while honoring the gitignore files found
//! along the way. Gitignore rules are compiled into glob patterns expressed
//! relative to the project root, merged with caller-supplied excludes, and
//! applied while walking the tree.
//!
//! # Examples
//!
//! ## Discovering project manifests
//!
//! ```no_run
//! use cross_bump::find_project_files;
//! use std::path::Path;
//!
//! let projects = find_project_files(Path::new("/repo"), &[], true).unwrap();
//! for project in projects {
//!     println!("{}: {}", project.category, project.path.display());
//! }
//! ```
//!
//! ## Compiling gitignore rules
//!
//! ```
//! use cross_bump::parse_gitignore;
//! use std::path::Path;
//!
//! let globs = parse_gitignore(
//!     "*.log\n!important.log\n",
//!     Path::new("/repo/.gitignore"),
//!     Path::new("/repo"),
//! );
//! assert_eq!(
//!     globs,
//!     ["**/*.log", "**/*.log/**", "!**/important.log", "!**/important.log/**"],
//! );
//! ```

pub mod exclude;
pub mod ignore;
pub mod project;

pub use exclude::ExcludeSet;
pub use ignore::{
    collect_gitignore_globs, parse_gitignore, DEFAULT_IGNORED_DIRS, DEFAULT_IGNORED_GLOBS,
};
pub use project::{find_project_files, project_files, ProjectCategory, ProjectFile};

pub type Result<T> = anyhow::Result<T>;
