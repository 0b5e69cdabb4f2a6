use {
    anyhow::{Context, Result},
    globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder},
    std::path::Path,
};

/// A compiled exclusion set: plain globs exclude paths, `!`-prefixed globs
/// re-include paths that an earlier glob excluded.
///
/// Paths are matched relative to the project root, with `*` stopping at `/`
/// as gitignore rules do.
#[derive(Debug)]
pub struct ExcludeSet {
    ignored: GlobSet,
    allowed: GlobSet,
    has_allows: bool,
}

impl ExcludeSet {
    pub fn new<I, S>(globs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ignored = GlobSetBuilder::new();
        let mut allowed = GlobSetBuilder::new();
        let mut has_allows = false;
        for glob in globs {
            let glob = glob.as_ref();
            match glob.strip_prefix('!') {
                Some(rest) => {
                    allowed.add(compile(rest)?);
                    has_allows = true;
                }
                None => {
                    ignored.add(compile(glob)?);
                }
            }
        }
        Ok(Self {
            ignored: ignored.build()?,
            allowed: allowed.build()?,
            has_allows,
        })
    }

    /// Whether `relative_path` is excluded from scanning.
    pub fn is_excluded(&self, relative_path: &Path) -> bool {
        self.ignored.is_match(relative_path) && !self.allowed.is_match(relative_path)
    }

    /// Whether a directory subtree at `relative_path` can be skipped outright.
    /// A re-include glob may point back inside an excluded directory, so
    /// pruning is only safe when no re-includes exist.
    pub fn can_prune(&self, relative_path: &Path) -> bool {
        !self.has_allows && self.ignored.is_match(relative_path)
    }
}

fn compile(glob: &str) -> Result<Glob> {
    GlobBuilder::new(glob)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid exclude glob `{glob}`"))
}
