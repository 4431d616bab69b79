//! Line-level two-way diff (§4.1): a hand-rolled Myers shortest-edit-script
//! algorithm over line sequences.

/// One step of an edit script turning `a` into `b`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffOp {
    /// The line is present, unchanged, in both sequences.
    Equal(String),
    /// The line was inserted (present only in `b`).
    Insert(String),
    /// The line was deleted (present only in `a`).
    Delete(String),
}

/// Split `text` into lines on `\n`, discarding a trailing empty element
/// produced by a final newline (§4.1).
#[must_use]
pub fn split_lines(text: &[u8]) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let text = String::from_utf8_lossy(text);
    let mut lines: Vec<String> = text.split('\n').map(str::to_owned).collect();
    if lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

/// Diff two byte buffers at line granularity (§4.1 `LineDiff`).
#[must_use]
pub fn line_diff(a: &[u8], b: &[u8]) -> Vec<DiffOp> {
    myers_diff(&split_lines(a), &split_lines(b))
}

/// Myers' O((N+M)D) shortest-edit-script diff over arbitrary string slices
/// (§4.1 `MyersDiff`).
#[must_use]
pub fn myers_diff(a: &[String], b: &[String]) -> Vec<DiffOp> {
    if a.is_empty() && b.is_empty() {
        return Vec::new();
    }
    if a.is_empty() {
        return b.iter().cloned().map(DiffOp::Insert).collect();
    }
    if b.is_empty() {
        return a.iter().cloned().map(DiffOp::Delete).collect();
    }
    if a == b {
        return a.iter().cloned().map(DiffOp::Equal).collect();
    }

    let trace = build_trace(a, b);
    backtrack(a, b, &trace)
}

/// The forward `V`-array snapshot at each `D`, as required to backtrack a
/// concrete edit path (§9: preallocate to `2*(N+M)+1`).
fn build_trace(a: &[String], b: &[String]) -> Vec<Vec<i64>> {
    let n = a.len() as i64;
    let m = b.len() as i64;
    let max_d = n + m;
    let offset = max_d as usize;
    let mut v = vec![0i64; 2 * max_d as usize + 1];
    let mut trace = Vec::new();

    for d in 0..=max_d {
        trace.push(v.clone());
        let d = d as i64;
        let mut k = -d;
        while k <= d {
            let idx = (k + offset as i64) as usize;
            let mut x = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
                v[idx + 1]
            } else {
                v[idx - 1] + 1
            };
            let mut y = x - k;
            while x < n && y < m && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }
            v[idx] = x;
            if x >= n && y >= m {
                return trace;
            }
            k += 2;
        }
    }
    trace
}

fn backtrack(a: &[String], b: &[String], trace: &[Vec<i64>]) -> Vec<DiffOp> {
    let n = a.len() as i64;
    let m = b.len() as i64;
    let max_d = n + m;
    let offset = max_d as usize;

    let mut ops = Vec::new();
    let mut x = n;
    let mut y = m;

    for d in (0..trace.len()).rev() {
        let v = &trace[d];
        let d = d as i64;
        let k = x - y;
        let idx = (k + offset as i64) as usize;

        let prev_k = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
            k + 1
        } else {
            k - 1
        };
        let prev_idx = (prev_k + offset as i64) as usize;
        let prev_x = v[prev_idx];
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            ops.push(DiffOp::Equal(a[(x - 1) as usize].clone()));
            x -= 1;
            y -= 1;
        }

        if d > 0 {
            if x == prev_x {
                ops.push(DiffOp::Insert(b[(y - 1) as usize].clone()));
            } else {
                ops.push(DiffOp::Delete(a[(x - 1) as usize].clone()));
            }
        }
        x = prev_x;
        y = prev_y;

        if x <= 0 && y <= 0 {
            break;
        }
    }

    ops.reverse();
    ops
}
