use {
    crate::{
        exclude::ExcludeSet,
        ignore::{collect_gitignore_globs, push_unique, DEFAULT_IGNORED_DIRS, DEFAULT_IGNORED_GLOBS},
    },
    anyhow::Result,
    log::debug,
    serde::Serialize,
    std::{
        collections::HashSet,
        fmt,
        path::{Path, PathBuf},
    },
    walkdir::WalkDir,
};

/// Language ecosystem a manifest file belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectCategory {
    Java,
    JavaScript,
    Rust,
}

impl ProjectCategory {
    /// Maps a manifest file name to its category.
    pub fn from_manifest(file_name: &str) -> Option<Self> {
        match file_name {
            "pom.xml" => Some(Self::Java),
            "package.json" => Some(Self::JavaScript),
            "Cargo.toml" => Some(Self::Rust),
            _ => None,
        }
    }

    pub fn manifest_name(self) -> &'static str {
        match self {
            Self::Java => "pom.xml",
            Self::JavaScript => "package.json",
            Self::Rust => "Cargo.toml",
        }
    }
}

impl fmt::Display for ProjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Java => "java",
            Self::JavaScript => "javascript",
            Self::Rust => "rust",
        };
        f.write_str(name)
    }
}

/// A discovered project manifest.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ProjectFile {
    pub category: ProjectCategory,
    pub path: PathBuf,
}

/// Lazily yields the project manifests under `root` that survive `exclude`.
///
/// With `recursive` set to false only `root`'s direct entries are considered.
/// Excluded directories are pruned from the walk where the exclude set allows
/// it; unreadable entries are skipped.
pub fn project_files<'a>(
    root: &'a Path,
    exclude: &'a ExcludeSet,
    recursive: bool,
) -> impl Iterator<Item = ProjectFile> + 'a {
    let max_depth = if recursive { usize::MAX } else { 1 };
    WalkDir::new(root)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(move |entry| {
            if !entry.file_type().is_dir() || entry.depth() == 0 {
                return true;
            }
            match entry.path().strip_prefix(root) {
                Ok(rel) => !exclude.can_prune(rel),
                Err(_) => true,
            }
        })
        .filter_map(Result::ok)
        .filter_map(move |entry| {
            if !entry.file_type().is_file() {
                return None;
            }
            let category = entry
                .file_name()
                .to_str()
                .and_then(ProjectCategory::from_manifest)?;
            let rel = entry.path().strip_prefix(root).ok()?;
            if exclude.is_excluded(rel) {
                return None;
            }
            Some(ProjectFile {
                category,
                path: entry.path().to_path_buf(),
            })
        })
}

/// Searches `root` for project manifests (`package.json`, `pom.xml`,
/// `Cargo.toml`), honoring gitignore rules found along the way.
///
/// The exclusion set is the non-mutating union of [`DEFAULT_IGNORED_GLOBS`],
/// the globs compiled from every `.gitignore` under `root`, and the caller's
/// `excludes`. `root` must be absolute; the returned paths are then absolute
/// as well. Fails only when a caller-supplied glob does not compile.
pub fn find_project_files(
    root: &Path,
    excludes: &[String],
    recursive: bool,
) -> Result<Vec<ProjectFile>> {
    let mut globs: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for glob in DEFAULT_IGNORED_GLOBS {
        push_unique(&mut globs, &mut seen, (*glob).to_string());
    }
    for glob in collect_gitignore_globs(root, DEFAULT_IGNORED_DIRS) {
        push_unique(&mut globs, &mut seen, glob);
    }
    for glob in excludes {
        push_unique(&mut globs, &mut seen, glob.clone());
    }
    debug!("scanning {} with {} exclude globs", root.display(), globs.len());

    let exclude = ExcludeSet::new(&globs)?;
    Ok(project_files(root, &exclude, recursive).collect())
}
