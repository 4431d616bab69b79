//! Line-level three-way merge (§4.2): chunk-based diff3 over Myers edit scripts.
//!
//! The entity extractor and the structural orchestrator both recurse into this
//! module: the extractor's text fallback runs it over whole files, and the
//! orchestrator runs it over a single conflicted entity's three bodies.

use crate::myers::{self, DiffOp};

/// One contiguous hunk of the merged result (§4.2).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hunk {
    /// All sides agree (or only one side changed); `merged` is final.
    Clean { merged: Vec<String> },
    /// Both sides changed the same base region differently.
    Conflict {
        base: Vec<String>,
        ours: Vec<String>,
        theirs: Vec<String>,
    },
}

/// Result of a line-level three-way merge (§4.2).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeResult {
    pub merged: Vec<u8>,
    pub has_conflicts: bool,
    pub hunks: Vec<Hunk>,
}

/// A contiguous range of base lines with one side's replacement (§4.2 step 3).
#[derive(Clone, Debug)]
struct Chunk {
    base_start: usize,
    base_end: usize,
    lines: Vec<String>,
    changed: bool,
}

/// Turn a diff's edit script into base-aligned chunks: each `Equal` op is an
/// unchanged chunk of length 1; each maximal run of `Insert`/`Delete` becomes
/// one changed chunk spanning the deleted base lines.
fn chunkify(ops: &[DiffOp]) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut base_pos = 0usize;
    let mut i = 0usize;

    while i < ops.len() {
        match &ops[i] {
            DiffOp::Equal(line) => {
                chunks.push(Chunk {
                    base_start: base_pos,
                    base_end: base_pos + 1,
                    lines: vec![line.clone()],
                    changed: false,
                });
                base_pos += 1;
                i += 1;
            }
            DiffOp::Insert(_) | DiffOp::Delete(_) => {
                let run_start = base_pos;
                let mut replacement = Vec::new();
                while i < ops.len() {
                    match &ops[i] {
                        DiffOp::Delete(_) => {
                            base_pos += 1;
                            i += 1;
                        }
                        DiffOp::Insert(line) => {
                            replacement.push(line.clone());
                            i += 1;
                        }
                        DiffOp::Equal(_) => break,
                    }
                }
                chunks.push(Chunk {
                    base_start: run_start,
                    base_end: base_pos,
                    lines: replacement,
                    changed: true,
                });
            }
        }
    }

    chunks
}

/// Run a line-level three-way merge (§4.2, §6 `Merge`).
#[must_use]
pub fn merge(base: &[u8], ours: &[u8], theirs: &[u8]) -> MergeResult {
    let base_lines = myers::split_lines(base);
    let ours_lines = myers::split_lines(ours);
    let theirs_lines = myers::split_lines(theirs);

    let ours_ops = myers::myers_diff(&base_lines, &ours_lines);
    let theirs_ops = myers::myers_diff(&base_lines, &theirs_lines);

    let ours_chunks = chunkify(&ours_ops);
    let theirs_chunks = chunkify(&theirs_ops);

    let hunks = walk_chunks(&ours_chunks, &theirs_chunks, &base_lines);
    render(hunks)
}

/// Walk both chunk lists in parallel, advancing by base position (§4.2 step 4).
fn walk_chunks(ours: &[Chunk], theirs: &[Chunk], base_lines: &[String]) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    let mut oi = 0usize;
    let mut ti = 0usize;

    while oi < ours.len() || ti < theirs.len() {
        match (ours.get(oi), theirs.get(ti)) {
            (Some(oc), Some(tc)) if oc.base_start == tc.base_start && oc.base_end == tc.base_end => {
                hunks.push(classify_aligned(oc, tc, base_lines));
                oi += 1;
                ti += 1;
            }
            (Some(oc), None) => {
                hunks.push(Hunk::Clean { merged: oc.lines.clone() });
                oi += 1;
            }
            (None, Some(tc)) => {
                hunks.push(Hunk::Clean { merged: tc.lines.clone() });
                ti += 1;
            }
            (Some(_), Some(_)) => {
                let (hunk, new_oi, new_ti) = widen_misaligned(ours, theirs, oi, ti, base_lines);
                hunks.push(hunk);
                oi = new_oi;
                ti = new_ti;
            }
            (None, None) => break,
        }
    }

    hunks
}

fn classify_aligned(oc: &Chunk, tc: &Chunk, base_lines: &[String]) -> Hunk {
    match (oc.changed, tc.changed) {
        (false, false) => Hunk::Clean { merged: oc.lines.clone() },
        (true, false) => Hunk::Clean { merged: oc.lines.clone() },
        (false, true) => Hunk::Clean { merged: tc.lines.clone() },
        (true, true) => {
            if oc.lines == tc.lines {
                Hunk::Clean { merged: oc.lines.clone() }
            } else {
                Hunk::Conflict {
                    base: base_lines[oc.base_start..oc.base_end].to_vec(),
                    ours: oc.lines.clone(),
                    theirs: tc.lines.clone(),
                }
            }
        }
    }
}

/// Misaligned region-widening (§4.2 step 4): greedily absorb any chunk on
/// either side whose base range overlaps the current region, then reassemble
/// each side's full replacement over the widened base range.
fn widen_misaligned(
    ours: &[Chunk],
    theirs: &[Chunk],
    oi: usize,
    ti: usize,
    base_lines: &[String],
) -> (Hunk, usize, usize) {
    let mut region_start = ours[oi].base_start.min(theirs[ti].base_start);
    let mut region_end = ours[oi].base_end.max(theirs[ti].base_end);
    let mut new_oi = oi + 1;
    let mut new_ti = ti + 1;

    loop {
        let mut grew = false;
        while new_oi < ours.len() && ours[new_oi].base_start < region_end {
            region_end = region_end.max(ours[new_oi].base_end);
            new_oi += 1;
            grew = true;
        }
        while new_ti < theirs.len() && theirs[new_ti].base_start < region_end {
            region_end = region_end.max(theirs[new_ti].base_end);
            new_ti += 1;
            grew = true;
        }
        if !grew {
            break;
        }
    }

    let ours_lines = reassemble(ours, oi, new_oi);
    let theirs_lines = reassemble(theirs, ti, new_ti);
    let ours_changed = ours[oi..new_oi].iter().any(|c| c.changed);
    let theirs_changed = theirs[ti..new_ti].iter().any(|c| c.changed);

    let hunk = match (ours_changed, theirs_changed) {
        (false, false) => Hunk::Clean { merged: ours_lines },
        (true, false) => Hunk::Clean { merged: ours_lines },
        (false, true) => Hunk::Clean { merged: theirs_lines },
        (true, true) => {
            if ours_lines == theirs_lines {
                Hunk::Clean { merged: ours_lines }
            } else {
                Hunk::Conflict {
                    base: base_lines[region_start..region_end.min(base_lines.len())].to_vec(),
                    ours: ours_lines,
                    theirs: theirs_lines,
                }
            }
        }
    };

    (hunk, new_oi, new_ti)
}

fn reassemble(chunks: &[Chunk], from: usize, to: usize) -> Vec<String> {
    let mut out = Vec::new();
    for c in &chunks[from..to] {
        out.extend(c.lines.iter().cloned());
    }
    out
}

/// Serialize hunks to the final byte buffer with standard conflict markers
/// (§4.2 step 5, §6 conflict marker grammar).
fn render(hunks: Vec<Hunk>) -> MergeResult {
    let mut merged = String::new();
    let mut has_conflicts = false;

    for hunk in &hunks {
        match hunk {
            Hunk::Clean { merged: lines } => {
                for line in lines {
                    merged.push_str(line);
                    merged.push('\n');
                }
            }
            Hunk::Conflict { ours, theirs, .. } => {
                has_conflicts = true;
                merged.push_str("<<<<<<< ours\n");
                for line in ours {
                    merged.push_str(line);
                    merged.push('\n');
                }
                merged.push_str("=======\n");
                for line in theirs {
                    merged.push_str(line);
                    merged.push('\n');
                }
                merged.push_str(">>>>>>> theirs\n");
            }
        }
    }

    MergeResult {
        merged: merged.into_bytes(),
        has_conflicts,
        hunks,
    }
}
