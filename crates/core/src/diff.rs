//! Line-level diff between two revisions of the same content.

use serde::Serialize;

/// How a line changed between the older and the newer text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineChange {
    Added,
    Removed,
    Unchanged,
}

/// A single line in a diff result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub change: LineChange,
    pub content: String,
}

/// Added/removed line totals for a diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
}

/// Diff `older` against `newer` line by line.
///
/// Uses a longest-common-subsequence table, so the output is minimal in the
/// number of added plus removed lines. Removals are emitted before additions
/// when a line is replaced.
pub fn diff_lines(older: &str, newer: &str) -> Vec<DiffLine> {
    let old: Vec<&str> = older.lines().collect();
    let new: Vec<&str> = newer.lines().collect();

    // lcs[i][j] = LCS length of old[i..] and new[j..]
    let mut lcs = vec![vec![0usize; new.len() + 1]; old.len() + 1];
    for i in (0..old.len()).rev() {
        for j in (0..new.len()).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut out = Vec::with_capacity(old.len().max(new.len()));
    let (mut i, mut j) = (0, 0);
    while i < old.len() && j < new.len() {
        if old[i] == new[j] {
            out.push(line(LineChange::Unchanged, old[i]));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            out.push(line(LineChange::Removed, old[i]));
            i += 1;
        } else {
            out.push(line(LineChange::Added, new[j]));
            j += 1;
        }
    }
    out.extend(old[i..].iter().map(|l| line(LineChange::Removed, l)));
    out.extend(new[j..].iter().map(|l| line(LineChange::Added, l)));
    out
}

/// Count added and removed lines in a diff.
pub fn diff_stats(lines: &[DiffLine]) -> DiffStats {
    lines
        .iter()
        .fold(DiffStats::default(), |mut stats, l| {
            match l.change {
                LineChange::Added => stats.added += 1,
                LineChange::Removed => stats.removed += 1,
                LineChange::Unchanged => {}
            }
            stats
        })
}

fn line(change: LineChange, content: &str) -> DiffLine {
    DiffLine {
        change,
        content: content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes(lines: &[DiffLine]) -> Vec<(LineChange, &str)> {
        lines
            .iter()
            .map(|l| (l.change, l.content.as_str()))
            .collect()
    }

    #[test]
    fn identical_texts_are_unchanged() {
        let d = diff_lines("a\nb", "a\nb");
        assert_eq!(
            changes(&d),
            vec![(LineChange::Unchanged, "a"), (LineChange::Unchanged, "b")]
        );
        assert_eq!(diff_stats(&d), DiffStats::default());
    }

    #[test]
    fn appended_line_is_added() {
        let d = diff_lines("a", "a\nb");
        assert_eq!(
            changes(&d),
            vec![(LineChange::Unchanged, "a"), (LineChange::Added, "b")]
        );
    }

    #[test]
    fn replaced_line_removes_then_adds() {
        let d = diff_lines("a\nold\nc", "a\nnew\nc");
        assert_eq!(
            changes(&d),
            vec![
                (LineChange::Unchanged, "a"),
                (LineChange::Removed, "old"),
                (LineChange::Added, "new"),
                (LineChange::Unchanged, "c"),
            ]
        );
        assert_eq!(
            diff_stats(&d),
            DiffStats {
                added: 1,
                removed: 1
            }
        );
    }

    #[test]
    fn empty_previous_adds_everything() {
        let d = diff_lines("", "x\ny");
        assert_eq!(diff_stats(&d), DiffStats { added: 2, removed: 0 });
    }
}
