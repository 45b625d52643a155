//! Comment stripping and backslash-continuation joining.
//!
//! The output keeps one slot per physical line. A line that was folded into
//! the line above it becomes an empty string, so indices in the result are
//! the same line numbers the editor shows.

/// Produces the logical lines of `content`.
pub fn logical_lines(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = content
        .split('\n')
        .map(|line| strip_comment(line.strip_suffix('\r').unwrap_or(line)).to_string())
        .collect();

    // Bottom-up, so `a \`, `b \`, `c` folds `c` into `b` before `b` into `a`.
    for i in (0..lines.len()).rev() {
        let Some(head) = continuation_head(&lines[i]) else {
            continue;
        };
        if i + 1 >= lines.len() {
            continue;
        }
        let head_len = head.len();
        let next = std::mem::take(&mut lines[i + 1]);
        let line = &mut lines[i];
        line.truncate(head_len);
        line.push_str(next.trim_start());
    }

    lines
}

/// Everything before the first `#` that is not preceded by a backslash.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'#' && (i == 0 || bytes[i - 1] != b'\\') {
            return &line[..i];
        }
    }
    line
}

/// If `line` ends with a backslash plus optional trailing whitespace,
/// returns the part before the backslash.
fn continuation_head(line: &str) -> Option<&str> {
    line.trim_end().strip_suffix('\\')
}
