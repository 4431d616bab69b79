//! Structural merge orchestrator (§4.6): the top-level `MergeFiles` pipeline.
//!
//! Extraction and matching are total; the two failure modes that actually
//! occur (unsupported file type, parse error) are absorbed here into
//! documented fallbacks rather than propagated, so `merge_files` itself never
//! fails (§7).

use std::path::Path;

use crate::config::EngineConfig;
use crate::diff3::{self, Hunk};
use crate::entity::{Entity, EntityKind, EntityList};
use crate::imports;
use crate::lang::Language;
use crate::matcher::{self, Disposition};
use crate::reconstruct::{self, ResolvedEntity};

/// Per-disposition resolution counters (§4.6 main path).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub unchanged: usize,
    pub ours_modified: usize,
    pub theirs_modified: usize,
    pub both_modified: usize,
    pub added: usize,
    pub deleted: usize,
    pub conflicts: usize,
}

/// Output of [`merge_files`] (§6 `MergeFiles`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeResult {
    pub merged: Vec<u8>,
    pub has_conflicts: bool,
    pub conflict_count: usize,
    pub stats: Stats,
}

/// Three-way merge a single file by path, base/ours/theirs content (§4.6,
/// §6 `MergeFiles`), using every language [`EngineConfig::default`] enables.
/// Never fails: unsupported or unparsable input degrades to a text- or
/// binary-level fallback rather than propagating an error.
#[must_use]
pub fn merge_files(path: &Path, base: &[u8], ours: &[u8], theirs: &[u8]) -> MergeResult {
    merge_files_with_config(path, base, ours, theirs, &EngineConfig::default())
}

/// [`merge_files`], but routing languages `config` does not enable for
/// structural merge straight to the text fallback (ambient config, not in
/// spec.md: see `SPEC_FULL.md` §4).
#[tracing::instrument(skip(base, ours, theirs, config), fields(path = %path.display()))]
#[must_use]
pub fn merge_files_with_config(
    path: &Path,
    base: &[u8],
    ours: &[u8],
    theirs: &[u8],
    config: &EngineConfig,
) -> MergeResult {
    if contains_zero_byte(base) || contains_zero_byte(ours) || contains_zero_byte(theirs) {
        tracing::debug!("zero byte detected, using binary fallback");
        return binary_fallback(base, ours, theirs);
    }

    let language = Language::from_path(path).filter(|lang| config.is_enabled_for(*lang));
    let extracted = language.and_then(|lang| {
        let b = crate::extract::extract(path, base).ok()?;
        let o = crate::extract::extract(path, ours).ok()?;
        let t = crate::extract::extract(path, theirs).ok()?;
        Some((lang, b, o, t))
    });

    let Some((language, base_entities, ours_entities, theirs_entities)) = extracted else {
        tracing::debug!("extraction failed or language disabled, using text fallback");
        return text_fallback(base, ours, theirs);
    };

    if !has_declarations(&base_entities) || !has_declarations(&ours_entities) || !has_declarations(&theirs_entities) {
        tracing::debug!("an input has zero declaration entities, using text fallback");
        return text_fallback(base, ours, theirs);
    }

    structural_merge(language, &base_entities, &ours_entities, &theirs_entities)
}

fn contains_zero_byte(bytes: &[u8]) -> bool {
    bytes.contains(&0)
}

fn has_declarations(list: &EntityList) -> bool {
    list.entities.iter().any(|e| e.kind == EntityKind::Declaration)
}

/// §4.6 step 1: binary fallback when any input contains a zero byte.
fn binary_fallback(base: &[u8], ours: &[u8], theirs: &[u8]) -> MergeResult {
    if ours == theirs {
        return clean(ours.to_vec());
    }
    if base == ours {
        return clean(theirs.to_vec());
    }
    if base == theirs {
        return clean(ours.to_vec());
    }
    MergeResult {
        merged: ours.to_vec(),
        has_conflicts: true,
        conflict_count: 1,
        stats: Stats {
            conflicts: 1,
            ..Stats::default()
        },
    }
}

fn clean(merged: Vec<u8>) -> MergeResult {
    MergeResult {
        merged,
        has_conflicts: false,
        conflict_count: 0,
        stats: Stats::default(),
    }
}

/// §4.6 step 2/3 fallback: run the line-level merge over raw bytes, then
/// rewrite blank-base parallel-insertion conflicts into clean merges.
fn text_fallback(base: &[u8], ours: &[u8], theirs: &[u8]) -> MergeResult {
    let result = diff3::merge(base, ours, theirs);
    let (merged, conflict_count) = postprocess_text_fallback(&result.hunks);
    MergeResult {
        merged,
        has_conflicts: conflict_count > 0,
        conflict_count,
        stats: Stats {
            conflicts: conflict_count,
            ..Stats::default()
        },
    }
}

/// A conflict hunk becomes a clean parallel insertion iff `base` is all
/// whitespace and both `ours` and `theirs` are non-whitespace (§4.6).
fn postprocess_text_fallback(hunks: &[Hunk]) -> (Vec<u8>, usize) {
    let mut out = String::new();
    let mut conflicts = 0usize;

    for hunk in hunks {
        match hunk {
            Hunk::Clean { merged } => {
                for line in merged {
                    out.push_str(line);
                    out.push('\n');
                }
            }
            Hunk::Conflict { base, ours, theirs } => {
                let base_blank = base.iter().all(|l| l.trim().is_empty());
                let ours_has_content = ours.iter().any(|l| !l.trim().is_empty());
                let theirs_has_content = theirs.iter().any(|l| !l.trim().is_empty());

                if base_blank && ours_has_content && theirs_has_content {
                    for line in ours.iter().chain(theirs.iter()) {
                        out.push_str(line);
                        out.push('\n');
                    }
                } else {
                    conflicts += 1;
                    out.push_str("<<<<<<< ours\n");
                    for line in ours {
                        out.push_str(line);
                        out.push('\n');
                    }
                    out.push_str("=======\n");
                    for line in theirs {
                        out.push_str(line);
                        out.push('\n');
                    }
                    out.push_str(">>>>>>> theirs\n");
                }
            }
        }
    }

    (out.into_bytes(), conflicts)
}

/// §4.6 main path: match entities, resolve each disposition, reconstruct.
fn structural_merge(
    language: Language,
    base: &EntityList,
    ours: &EntityList,
    theirs: &EntityList,
) -> MergeResult {
    let matches = matcher::match_entities(base, ours, theirs);
    let mut stats = Stats::default();
    let mut resolved = Vec::with_capacity(matches.len());

    for m in &matches {
        match m.disposition {
            Disposition::Unchanged => {
                let Some(e) = m.base.or(m.ours).or(m.theirs) else {
                    continue;
                };
                // (1,0,0): both sides deleted this entity. "Unchanged" here
                // means both sides agree on the deletion, not that the base
                // body survives — don't resurrect it into the output.
                if e.kind != EntityKind::Interstitial && m.ours.is_none() && m.theirs.is_none() {
                    stats.deleted += 1;
                    continue;
                }
                if e.kind != EntityKind::Interstitial {
                    stats.unchanged += 1;
                }
                resolved.push(ResolvedEntity::from_entity(e));
            }
            Disposition::OursOnly => {
                if m.ours.is_some_and(|e| e.kind != EntityKind::Interstitial) {
                    stats.ours_modified += 1;
                }
                push_entity(&mut resolved, m.ours);
            }
            Disposition::AddedOurs => {
                if m.ours.is_some_and(|e| e.kind != EntityKind::Interstitial) {
                    stats.added += 1;
                }
                push_entity(&mut resolved, m.ours);
            }
            Disposition::TheirsOnly => {
                if m.theirs.is_some_and(|e| e.kind != EntityKind::Interstitial) {
                    stats.theirs_modified += 1;
                }
                push_entity(&mut resolved, m.theirs);
            }
            Disposition::AddedTheirs => {
                if m.theirs.is_some_and(|e| e.kind != EntityKind::Interstitial) {
                    stats.added += 1;
                }
                push_entity(&mut resolved, m.theirs);
            }
            Disposition::BothSame => {
                if m.ours.is_some_and(|e| e.kind != EntityKind::Interstitial) {
                    stats.both_modified += 1;
                }
                push_entity(&mut resolved, m.ours);
            }
            Disposition::DeletedOurs | Disposition::DeletedTheirs => {
                if m.base.is_some_and(|e| e.kind == EntityKind::Interstitial) {
                    stats.unchanged += 1;
                    push_entity(&mut resolved, m.base);
                } else {
                    stats.deleted += 1;
                }
            }
            Disposition::Conflict => {
                resolve_conflict(language, m, &mut resolved, &mut stats);
            }
            Disposition::DeleteVsModify => {
                stats.conflicts += 1;
                resolved.push(ResolvedEntity::conflict(
                    m.ours.map(|e| e.body.clone()).unwrap_or_default(),
                    m.theirs.map(|e| e.body.clone()).unwrap_or_default(),
                ));
            }
        }
    }

    let merged = reconstruct::reconstruct(&resolved);
    let conflict_count = stats.conflicts;
    MergeResult {
        merged,
        has_conflicts: conflict_count > 0,
        conflict_count,
        stats,
    }
}

fn push_entity(resolved: &mut Vec<ResolvedEntity>, entity: Option<&Entity>) {
    if let Some(e) = entity {
        resolved.push(ResolvedEntity::from_entity(e));
    }
}

/// §4.6 Conflict disposition resolution: import set-union, nested diff3, or
/// verbatim conflict markers.
fn resolve_conflict(language: Language, m: &matcher::MatchedEntity<'_>, resolved: &mut Vec<ResolvedEntity>, stats: &mut Stats) {
    let (Some(ours), Some(theirs)) = (m.ours, m.theirs) else {
        stats.conflicts += 1;
        resolved.push(ResolvedEntity::conflict(
            m.ours.map(|e| e.body.clone()).unwrap_or_default(),
            m.theirs.map(|e| e.body.clone()).unwrap_or_default(),
        ));
        return;
    };

    if ours.kind == EntityKind::ImportBlock {
        let base_body = m.base.map_or(&[][..], |e| e.body.as_slice());
        let result = imports::merge_imports(language, base_body, &ours.body, &theirs.body);
        stats.both_modified += 1;
        resolved.push(ResolvedEntity::clean(result.merged));
        return;
    }

    let base_body = m.base.map_or(&[][..], |e| e.body.as_slice());
    let nested = diff3::merge(base_body, &ours.body, &theirs.body);
    if nested.has_conflicts {
        stats.conflicts += 1;
        resolved.push(ResolvedEntity::conflict(ours.body.clone(), theirs.body.clone()));
    } else {
        stats.both_modified += 1;
        let mut merged = nested.merged;
        // The orchestrator strips one trailing newline so the entity's own
        // trailing interstitial owns the whitespace (§4.6, §9).
        if merged.last() == Some(&b'\n') {
            merged.pop();
        }
        resolved.push(ResolvedEntity::clean(merged));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn p(name: &str) -> std::path::PathBuf {
        Path::new(name).to_path_buf()
    }

    #[test]
    fn added_function_merges_cleanly() {
        let base = b"package m\n\nfunc A(){}\n";
        let theirs = b"package m\n\nfunc A(){}\n\nfunc B(){}\n";
        let result = merge_files(&p("f.go"), base, base, theirs);
        assert!(!result.has_conflicts);
        let merged = String::from_utf8(result.merged).unwrap();
        assert!(merged.contains("func A()"));
        assert!(merged.contains("func B()"));
        // The new declaration also shifts two interstitial keys (the gap
        // before and after it); those must not inflate the declaration count.
        assert_eq!(result.stats.added, 1);
    }

    #[test]
    fn both_sides_deleting_a_declaration_drops_it_from_output() {
        let base = b"package m\nfunc A(){}\nfunc B(){}\n";
        let ours = b"package m\nfunc A(){}\n";
        let theirs = b"package m\nfunc A(){}\n";
        let result = merge_files(&p("f.go"), base, ours, theirs);
        assert!(!result.has_conflicts);
        let merged = String::from_utf8(result.merged).unwrap();
        assert!(merged.contains("func A()"));
        assert!(!merged.contains("func B()"), "merged: {merged}");
        assert_eq!(result.stats.deleted, 1);
    }

    #[test]
    fn independent_modifications_merge_cleanly() {
        let base = b"package m\nfunc A(){return 0}\nfunc B(){return 0}\n";
        let ours = b"package m\nfunc A(){return 1}\nfunc B(){return 0}\n";
        let theirs = b"package m\nfunc A(){return 0}\nfunc B(){return 2}\n";
        let result = merge_files(&p("f.go"), base, ours, theirs);
        assert!(!result.has_conflicts);
        let merged = String::from_utf8(result.merged).unwrap();
        assert!(merged.contains("return 1"));
        assert!(merged.contains("return 2"));
        assert!(result.stats.ours_modified >= 1);
        assert!(result.stats.theirs_modified >= 1);
    }

    #[test]
    fn same_entity_conflict_emits_markers() {
        let base = b"package m\nfunc A(){return 0}\n";
        let ours = b"package m\nfunc A(){return 1}\n";
        let theirs = b"package m\nfunc A(){return 2}\n";
        let result = merge_files(&p("f.go"), base, ours, theirs);
        assert!(result.has_conflicts);
        assert!(result.conflict_count >= 1);
        let merged = String::from_utf8(result.merged).unwrap();
        assert!(merged.contains("<<<<<<< ours"));
        assert!(merged.contains("======="));
        assert!(merged.contains(">>>>>>> theirs"));
        assert!(merged.contains("return 1"));
        assert!(merged.contains("return 2"));
    }

    #[test]
    fn import_union_merges_cleanly() {
        let base = b"package m\n\nimport (\n\t\"fmt\"\n)\n\nfunc A(){}\n";
        let ours = b"package m\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n\nfunc A(){}\n";
        let theirs = b"package m\n\nimport (\n\t\"fmt\"\n\t\"strings\"\n)\n\nfunc A(){}\n";
        let result = merge_files(&p("f.go"), base, ours, theirs);
        let merged = String::from_utf8(result.merged).unwrap();
        assert!(merged.contains("\"os\""));
        assert!(merged.contains("\"strings\""));
    }

    #[test]
    fn delete_vs_modify_is_conflicted_and_preserves_other_entities() {
        let base = b"package m\nfunc A(){}\nfunc B(){}\n";
        let ours = b"package m\nfunc A(){}\nfunc B(){return 1}\n";
        let theirs = b"package m\nfunc A(){}\n";
        let result = merge_files(&p("f.go"), base, ours, theirs);
        assert!(result.has_conflicts);
        let merged = String::from_utf8(result.merged).unwrap();
        assert!(merged.contains("func A()"));
    }

    #[test]
    fn binary_fallback_on_zero_byte() {
        let base = [0u8, 1, 2, 3];
        let ours = [0u8, 9, 2, 3];
        let theirs = [0u8, 1, 8, 3];
        let result = merge_files(&p("f.bin"), &base, &ours, &theirs);
        assert_eq!(result.conflict_count, 1);
        assert_eq!(result.merged, ours);
    }

    #[test]
    fn binary_fallback_prefers_changed_side_when_clean() {
        let base = [0u8, 1, 2];
        let ours = [0u8, 1, 2];
        let theirs = [0u8, 9, 2];
        let result = merge_files(&p("f.bin"), &base, &ours, &theirs);
        assert!(!result.has_conflicts);
        assert_eq!(result.merged, theirs);
    }

    #[test]
    fn unsupported_extension_falls_back_to_text_merge() {
        let base = b"a\nb\n";
        let ours = b"a\nb2\n";
        let theirs = b"a\nb\n";
        let result = merge_files(&p("notes.txt"), base, ours, theirs);
        assert!(!result.has_conflicts);
        assert_eq!(result.merged, b"a\nb2\n".to_vec());
    }

    #[test]
    fn merge_idempotent_when_all_sides_agree() {
        let src = b"package m\nfunc A(){}\n";
        let result = merge_files(&p("f.go"), src, src, src);
        assert!(!result.has_conflicts);
        assert_eq!(result.merged, src);
    }

    #[test]
    fn disabled_language_routes_to_text_fallback() {
        let base = b"package m\nfunc A(){return 0}\nfunc B(){return 0}\n";
        let ours = b"package m\nfunc A(){return 1}\nfunc B(){return 0}\n";
        let theirs = b"package m\nfunc A(){return 0}\nfunc B(){return 2}\n";
        let config = EngineConfig::parse(r#"structural_languages = ["python"]"#).unwrap();
        let result = merge_files_with_config(&p("f.go"), base, ours, theirs, &config);
        assert!(!result.has_conflicts);
        assert_eq!(result.stats, Stats::default(), "text fallback tracks no per-disposition stats");
    }

    #[test]
    fn both_empty_base_parallel_insert_resolves_clean_in_text_fallback() {
        let result = merge_files(&p("notes.txt"), b"", b"hello\n", b"world\n");
        assert!(!result.has_conflicts);
        let merged = String::from_utf8(result.merged).unwrap();
        assert!(merged.contains("hello"));
        assert!(merged.contains("world"));
    }
}
