//! Two-way entity diff (§6 `DiffFiles`): an add/remove/modify summary over two
//! revisions of the same file, built on the same identity-key model the
//! three-way matcher uses.

use std::path::Path;

use crate::entity::EntityList;
use crate::error::ExtractError;
use crate::matcher;

/// One entity-level change between two revisions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change {
    Added { key: String },
    Removed { key: String },
    Modified { key: String },
}

/// The result of [`diff_files`]: an ordered, document-order change set.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FileDiff {
    pub changes: Vec<Change>,
}

/// Diff two revisions of the same file at entity granularity (§6 `DiffFiles`).
///
/// # Errors
/// Propagates [`ExtractError`] from either side's extraction; unlike
/// [`crate::orchestrator::merge_files`], this operation does not fall back
/// (§7: "the two-way diff caller does propagate them").
#[tracing::instrument(skip(before, after), fields(path = %path.display()))]
pub fn diff_files(path: &Path, before: &[u8], after: &[u8]) -> Result<FileDiff, ExtractError> {
    let before_entities = crate::extract::extract(path, before)?;
    let after_entities = crate::extract::extract(path, after)?;
    Ok(diff_entity_lists(&before_entities, &after_entities))
}

fn diff_entity_lists(before: &EntityList, after: &EntityList) -> FileDiff {
    let before_map = matcher::build_entity_map(before);
    let after_map = matcher::build_entity_map(after);

    let mut seen = std::collections::HashSet::new();
    let mut changes = Vec::new();

    for key in matcher::ordered_identity_keys(before).into_iter().chain(matcher::ordered_identity_keys(after)) {
        if !seen.insert(key.clone()) {
            continue;
        }
        match (before_map.get(&key), after_map.get(&key)) {
            (Some(b), Some(a)) => {
                if b.body_hash != a.body_hash {
                    changes.push(Change::Modified { key });
                }
            }
            (Some(_), None) => changes.push(Change::Removed { key }),
            (None, Some(_)) => changes.push(Change::Added { key }),
            (None, None) => unreachable!("key only exists if present on at least one side"),
        }
    }

    FileDiff { changes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn identical_sources_yield_no_changes() {
        let src = b"package m\nfunc A(){}\n";
        let diff = diff_files(Path::new("f.go"), src, src).unwrap();
        assert!(diff.changes.is_empty());
    }

    #[test]
    fn added_function_is_detected() {
        let before = b"package m\nfunc A(){}\n";
        let after = b"package m\nfunc A(){}\nfunc B(){}\n";
        let diff = diff_files(Path::new("f.go"), before, after).unwrap();
        assert!(diff.changes.iter().any(|c| matches!(c, Change::Added { key } if key.contains(":B:"))));
    }

    #[test]
    fn removed_function_is_detected() {
        let before = b"package m\nfunc A(){}\nfunc B(){}\n";
        let after = b"package m\nfunc A(){}\n";
        let diff = diff_files(Path::new("f.go"), before, after).unwrap();
        assert!(diff.changes.iter().any(|c| matches!(c, Change::Removed { key } if key.contains(":B:"))));
    }

    #[test]
    fn modified_function_body_is_detected() {
        let before = b"package m\nfunc A(){return 0}\n";
        let after = b"package m\nfunc A(){return 1}\n";
        let diff = diff_files(Path::new("f.go"), before, after).unwrap();
        assert!(diff.changes.iter().any(|c| matches!(c, Change::Modified { key } if key.contains(":A:"))));
    }

    #[test]
    fn unsupported_extension_propagates_error() {
        let err = diff_files(Path::new("notes.txt"), b"a", b"b").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFileType { .. }));
    }
}
