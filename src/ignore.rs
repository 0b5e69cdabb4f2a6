use {
    log::{debug, warn},
    std::{
        collections::HashSet,
        fs,
        path::Path,
    },
    walkdir::WalkDir,
};

/// Globs excluded from every scan unless the caller overrides them.
pub const DEFAULT_IGNORED_GLOBS: &[&str] = &[
    "**/node_modules/**",
    "**/.git/**",
    "**/target/**",
    "**/build/**",
    "**/dist/**",
];

/// Directory names the gitignore aggregation walk skips by default.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &["node_modules", ".git", "target", "build", "dist"];

/// Compiles the content of one gitignore file into glob patterns expressed
/// relative to `project_root`.
///
/// Both paths must be absolute, and `project_root` must be an ancestor of (or
/// equal to) the gitignore file's directory; a file outside the root
/// contributes no patterns. Rules resolve against the gitignore file's own
/// directory, so the same rule in a nested file produces a narrower glob.
/// Negated rules keep their `!` prefix, and every resolved name is paired
/// with a `<glob>/**` entry so directory contents are excluded along with the
/// directory itself. The result is deduplicated, first occurrence winning.
///
/// ```
/// use cross_bump::parse_gitignore;
/// use std::path::Path;
///
/// let globs = parse_gitignore(
///     "dist/\n!/keep.txt\n",
///     Path::new("/repo/.gitignore"),
///     Path::new("/repo"),
/// );
/// assert_eq!(globs, ["dist", "dist/**", "!keep.txt", "!keep.txt/**"]);
/// ```
pub fn parse_gitignore(content: &str, gitignore_path: &Path, project_root: &Path) -> Vec<String> {
    let anchor_dir = gitignore_path.parent().unwrap_or_else(|| Path::new(""));
    let Some(anchor) = relative_anchor(anchor_dir, project_root) else {
        warn!(
            "{} is not under {}, ignoring its rules",
            gitignore_path.display(),
            project_root.display()
        );
        return vec![];
    };

    let mut globs = Vec::new();
    let mut seen = HashSet::new();
    for raw_line in content.lines() {
        let Some(line) = classify_line(raw_line) else {
            continue;
        };
        let (pattern, is_negative) = resolve_escapes(line);
        let pattern = normalize_separators(&pattern);
        let glob = resolve_pattern(&pattern, &anchor);

        let pair = !glob.ends_with('*') && glob != ".";
        let prefix = if is_negative { "!" } else { "" };
        push_unique(&mut globs, &mut seen, format!("{prefix}{glob}"));
        if pair {
            push_unique(&mut globs, &mut seen, format!("{prefix}{glob}/**"));
        }
    }
    globs
}

/// Collects and unions the glob patterns of every `.gitignore` below
/// `project_root`, skipping directories named in `ignored_dirs`.
///
/// Unreadable files contribute nothing; within one file rule order is kept,
/// across files the walk order applies. Duplicates are dropped, first
/// occurrence winning.
pub fn collect_gitignore_globs(project_root: &Path, ignored_dirs: &[&str]) -> Vec<String> {
    let mut globs = Vec::new();
    let mut seen = HashSet::new();
    let walker = WalkDir::new(project_root).into_iter().filter_entry(|entry| {
        entry.depth() == 0
            || !(entry.file_type().is_dir()
                && ignored_dirs.iter().any(|dir| entry.file_name() == *dir))
    });
    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_file() || entry.file_name() != ".gitignore" {
            continue;
        }
        let content = match fs::read_to_string(entry.path()) {
            Ok(content) => content,
            Err(err) => {
                debug!("skipping unreadable {}: {err}", entry.path().display());
                continue;
            }
        };
        for glob in parse_gitignore(&content, entry.path(), project_root) {
            push_unique(&mut globs, &mut seen, glob);
        }
    }
    globs
}

pub(crate) fn push_unique(globs: &mut Vec<String>, seen: &mut HashSet<String>, glob: String) {
    if seen.insert(glob.clone()) {
        globs.push(glob);
    }
}

/// Drops blank lines and comments, trims leading whitespace, and strips
/// trailing whitespace unless it is backslash-escaped.
fn classify_line(raw: &str) -> Option<&str> {
    let line = raw.trim_start();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(trim_trailing_unescaped(line))
}

/// Trailing whitespace is insignificant unless the run starts with `\ `;
/// in that case the escape and one space survive for the escape resolver.
/// The backslash only escapes the space when it is not itself escaped, so an
/// even run of backslashes leaves the whitespace unescaped.
fn trim_trailing_unescaped(line: &str) -> &str {
    let trimmed = line.trim_end();
    if trimmed.len() < line.len()
        && line[trimmed.len()..].starts_with(' ')
        && trailing_backslash_run(trimmed) % 2 == 1
    {
        &line[..trimmed.len() + 1]
    } else {
        trimmed
    }
}

fn trailing_backslash_run(s: &str) -> usize {
    s.chars().rev().take_while(|&c| c == '\\').count()
}

/// Strips one leading unescaped `!`, then resolves `\#`, `\!` and `\ ` to
/// their literal characters. Any other backslash is kept for
/// [`normalize_separators`].
fn resolve_escapes(line: &str) -> (String, bool) {
    let (rest, is_negative) = match line.strip_prefix('!') {
        Some(rest) => (rest, true),
        None => (line, false),
    };
    let mut cleaned = String::with_capacity(rest.len());
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some(&next) if matches!(next, '#' | '!' | ' ') => {
                    cleaned.push(next);
                    chars.next();
                }
                _ => cleaned.push(c),
            }
            continue;
        }
        cleaned.push(c);
    }
    (cleaned, is_negative)
}

/// Remaining backslashes are Windows-style separators, a doubled backslash
/// being one separator rather than two; a leading `./` is redundant and
/// dropped.
fn normalize_separators(pattern: &str) -> String {
    let pattern = pattern.replace("\\\\", "/").replace('\\', "/");
    match pattern.strip_prefix("./") {
        Some(rest) => rest.to_string(),
        None => pattern,
    }
}

/// Resolves one cleaned pattern into a glob relative to the project root.
/// `anchor` is the gitignore file's directory relative to the root (empty at
/// the root itself).
fn resolve_pattern(pattern: &str, anchor: &str) -> String {
    if pattern.is_empty() || pattern == "." {
        // The rule targets the gitignore file's own directory wholesale.
        return join_glob(anchor, "");
    }
    let glob = if pattern.contains('/') {
        // Anchored at the gitignore file's directory; a leading slash only
        // marks the anchoring explicitly and a trailing slash only marks a
        // directory, neither survives into the glob.
        let rel = pattern.strip_prefix('/').unwrap_or(pattern);
        let rel = rel.strip_suffix('/').unwrap_or(rel);
        join_glob(anchor, rel)
    } else if anchor.is_empty() {
        format!("**/{pattern}")
    } else {
        format!("{anchor}/**/{pattern}")
    };
    // A lone `*` or `.` refers to the gitignore file's directory, not the root.
    if glob == "*" || glob == "." {
        join_glob(anchor, &glob)
    } else {
        glob
    }
}

fn join_glob(anchor: &str, rel: &str) -> String {
    let joined = match (anchor.is_empty(), rel.is_empty()) {
        (_, true) => anchor.to_string(),
        (true, false) => rel.to_string(),
        (false, false) => format!("{anchor}/{rel}"),
    };
    if joined.is_empty() {
        ".".to_string()
    } else if let Some(stripped) = joined.strip_suffix("/.") {
        stripped.to_string()
    } else {
        joined
    }
}

fn relative_anchor(anchor_dir: &Path, project_root: &Path) -> Option<String> {
    let rel = anchor_dir.strip_prefix(project_root).ok()?;
    Some(
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
    )
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    const ROOT: &str = "/project";
    const GITIGNORE: &str = "/project/.gitignore";
    const SUB_GITIGNORE: &str = "/project/sub/.gitignore";

    fn parse(content: &str) -> Vec<String> {
        parse_gitignore(content, Path::new(GITIGNORE), Path::new(ROOT))
    }

    fn parse_sub(content: &str) -> Vec<String> {
        parse_gitignore(content, Path::new(SUB_GITIGNORE), Path::new(ROOT))
    }

    #[test]
    fn comments_and_blanks_yield_nothing() {
        assert_eq!(parse("# comment\n\n   \n  # indented comment\n"), Vec::<String>::new());
    }

    #[test]
    fn root_anchored_pattern() {
        assert_eq!(parse("/file.txt"), ["file.txt", "file.txt/**"]);
    }

    #[test]
    fn bare_name_matches_at_any_depth() {
        assert_eq!(parse("file.txt"), ["**/file.txt", "**/file.txt/**"]);
    }

    #[test]
    fn wildcard_name_matches_at_any_depth() {
        assert_eq!(parse("*.log"), ["**/*.log", "**/*.log/**"]);
    }

    #[test]
    fn subdirectory_ignore_file_narrows_the_scope() {
        assert_eq!(
            parse_sub("another.txt"),
            ["sub/**/another.txt", "sub/**/another.txt/**"]
        );
        assert_eq!(
            parse_sub("/root_level_in_sub.txt"),
            ["sub/root_level_in_sub.txt", "sub/root_level_in_sub.txt/**"]
        );
    }

    #[test]
    fn bare_slash_targets_own_directory() {
        assert_eq!(parse("/"), ["."]);
        assert_eq!(parse_sub("/"), ["sub", "sub/**"]);
    }

    #[test]
    fn negation_round_trip() {
        assert_eq!(
            parse("file.txt\n!file.txt\n"),
            [
                "**/file.txt",
                "**/file.txt/**",
                "!**/file.txt",
                "!**/file.txt/**",
            ]
        );
    }

    #[test]
    fn directory_rule_is_anchored() {
        assert_eq!(parse("node_modules/"), ["node_modules", "node_modules/**"]);
    }

    #[test]
    fn nested_path_is_anchored() {
        assert_eq!(
            parse("mydir/myfile.txt"),
            ["mydir/myfile.txt", "mydir/myfile.txt/**"]
        );
    }

    #[test]
    fn recursive_globs_are_kept() {
        assert_eq!(parse("**/foo"), ["**/foo", "**/foo/**"]);
        assert_eq!(parse("abc/**"), ["abc/**"]);
        assert_eq!(parse("a/**/b"), ["a/**/b", "a/**/b/**"]);
    }

    #[test]
    fn leading_dot_slash_is_stripped() {
        assert_eq!(parse("./foo/bar"), ["foo/bar", "foo/bar/**"]);
    }

    #[test]
    fn escaped_specials_are_literal() {
        assert_eq!(
            parse("\\#file.txt\n\\!important.log\nfile\\ with\\ spaces.doc\n"),
            [
                "**/#file.txt",
                "**/#file.txt/**",
                "**/!important.log",
                "**/!important.log/**",
                "**/file with spaces.doc",
                "**/file with spaces.doc/**",
            ]
        );
    }

    #[test]
    fn trailing_whitespace_is_stripped_unless_escaped() {
        assert_eq!(parse("file.txt   "), ["**/file.txt", "**/file.txt/**"]);
        assert_eq!(parse("file.txt\\ "), ["**/file.txt ", "**/file.txt /**"]);
        // A rule of nothing but an escaped space is not blank.
        assert_eq!(parse("\\ "), ["**/ ", "**/ /**"]);
        // An escaped backslash does not escape the space behind it; the
        // space goes, the separator stays, and the rule targets the
        // gitignore file's own directory.
        assert_eq!(parse("\\\\ "), ["."]);
    }

    #[test]
    fn stray_backslash_becomes_a_separator() {
        assert_eq!(parse("file\\.txt"), ["file/.txt", "file/.txt/**"]);
        // A doubled backslash collapses to a single separator.
        assert_eq!(parse("file\\\\.txt"), ["file/.txt", "file/.txt/**"]);
    }

    #[test]
    fn duplicate_rules_collapse() {
        assert_eq!(parse("dist/\ndist/\n/dist\n"), ["dist", "dist/**"]);
    }

    #[test]
    fn ignore_file_outside_root_yields_nothing() {
        assert_eq!(
            parse_gitignore("foo", Path::new("/elsewhere/.gitignore"), Path::new(ROOT)),
            Vec::<String>::new()
        );
    }
}
