//! Import set-union merge (§4.5): Go import blocks merge by set algebra
//! instead of line-level diff3; every other language delegates to [`diff3`].

use crate::diff3::{self, MergeResult};
use crate::lang::Language;

/// One import line's normalized token and original formatting.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct ImportLine {
    /// Normalized specifier used for set membership (alias + path, trimmed).
    key: String,
    /// Original source text, preserved verbatim in the merged output.
    raw: String,
}

/// Merge an import block across three revisions (§6 `MergeImports`).
///
/// Go import blocks merge as `(ours ∪ theirs) \ (base − ours − theirs)`: an
/// import is kept if either side still has it, or if neither side removed it.
/// Every other language has no reliable set semantics for its import syntax,
/// so it falls back to the line-level three-way merge (§4.5 step 1).
#[must_use]
pub fn merge_imports(language: Language, base: &[u8], ours: &[u8], theirs: &[u8]) -> MergeResult {
    if language != Language::Go {
        return diff3::merge(base, ours, theirs);
    }
    merge_go_imports(base, ours, theirs)
}

fn merge_go_imports(base: &[u8], ours: &[u8], theirs: &[u8]) -> MergeResult {
    let base_set = parse_import_lines(base);
    let ours_set = parse_import_lines(ours);
    let theirs_set = parse_import_lines(theirs);

    let base_keys: std::collections::HashSet<&str> = base_set.iter().map(|i| i.key.as_str()).collect();
    let ours_keys: std::collections::HashSet<&str> = ours_set.iter().map(|i| i.key.as_str()).collect();
    let theirs_keys: std::collections::HashSet<&str> = theirs_set.iter().map(|i| i.key.as_str()).collect();

    // removed-by-both = base - ours - theirs
    let removed_by_both: std::collections::HashSet<&str> = base_keys
        .iter()
        .filter(|k| !ours_keys.contains(*k) && !theirs_keys.contains(*k))
        .copied()
        .collect();

    let mut by_key: std::collections::BTreeMap<String, ImportLine> = std::collections::BTreeMap::new();
    for line in ours_set.into_iter().chain(theirs_set) {
        by_key.entry(line.key.clone()).or_insert(line);
    }

    let mut merged_keys: Vec<&String> = by_key.keys().filter(|k| !removed_by_both.contains(k.as_str())).collect();
    merged_keys.sort();

    let is_single = is_single_line_style(base) && is_single_line_style(ours) && is_single_line_style(theirs);

    let merged = render_go_imports(&merged_keys, &by_key, is_single);
    let has_conflicts = false;
    let hunks = vec![crate::diff3::Hunk::Clean {
        merged: crate::myers::split_lines(&merged),
    }];

    MergeResult {
        merged,
        has_conflicts,
        hunks,
    }
}

fn is_single_line_style(source: &[u8]) -> bool {
    let text = String::from_utf8_lossy(source);
    !text.contains('(')
}

fn render_go_imports(
    keys: &[&String],
    by_key: &std::collections::BTreeMap<String, ImportLine>,
    single: bool,
) -> Vec<u8> {
    if keys.is_empty() {
        return Vec::new();
    }
    let mut out = String::new();
    if single && keys.len() == 1 {
        let line = &by_key[keys[0]];
        out.push_str("import ");
        out.push_str(&line.raw);
        out.push('\n');
    } else {
        out.push_str("import (\n");
        for key in keys {
            let line = &by_key[*key];
            out.push('\t');
            out.push_str(&line.raw);
            out.push('\n');
        }
        out.push_str(")\n");
    }
    out.into_bytes()
}

/// Extract `"path"` or `alias "path"` specifiers from a Go import block,
/// tolerating both `import "x"` and `import (\n\t"x"\n)` forms (§4.5 step 1).
fn parse_import_lines(source: &[u8]) -> Vec<ImportLine> {
    let text = String::from_utf8_lossy(source);
    let mut lines = Vec::new();

    for raw_line in text.lines() {
        let trimmed = raw_line.trim();
        let trimmed = trimmed.strip_prefix("import").map_or(trimmed, str::trim_start);
        let trimmed = trimmed.trim_matches(|c| c == '(' || c == ')').trim();
        if trimmed.is_empty() || !trimmed.contains('"') {
            continue;
        }
        let key = normalize_spec(trimmed);
        lines.push(ImportLine {
            key,
            raw: trimmed.to_owned(),
        });
    }
    lines
}

fn normalize_spec(spec: &str) -> String {
    spec.split_whitespace().collect::<Vec<_>>().join(" ")
}
