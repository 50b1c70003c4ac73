//! Line-based edits applied as one atomic replacement.

use std::fs;

use super::error::{FsError, FsResult};
use super::write::atomic_write;
use crate::core::security::{Intent, ResolvedPath, check_size_limit};

/// Replace lines `start_line..=end_line` (1-based) with `new_text`.
///
/// `end_line == start_line - 1` inserts before `start_line` without
/// removing anything. When `old_text` is given, the replaced lines must
/// currently read exactly that (a missing final newline is tolerated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEdit {
    pub start_line: usize,
    pub end_line: usize,
    pub new_text: String,
    pub old_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOutcome {
    pub edits_applied: usize,
    pub new_size: u64,
}

/// Apply `edits` to the text file at `target`.
///
/// Either every edit lands or the file is left as it was.
pub fn edit_file(target: &ResolvedPath, edits: &[LineEdit], max_size: u64) -> FsResult<EditOutcome> {
    let path = target.require(Intent::Write)?;

    let metadata = fs::metadata(path).map_err(|e| FsError::from_io("stat file", e))?;
    if metadata.is_dir() {
        return Err(FsError::IsADirectory);
    }
    check_size_limit(metadata.len(), max_size)?;

    let bytes = fs::read(path).map_err(|e| FsError::from_io("read file", e))?;
    let original =
        String::from_utf8(bytes).map_err(|_| FsError::conflict("file is not valid UTF-8 text"))?;

    let updated = apply_edits(&original, edits)?;
    check_size_limit(updated.len() as u64, max_size)?;
    let new_size = atomic_write(path, updated.as_bytes(), max_size)?;

    Ok(EditOutcome {
        edits_applied: edits.len(),
        new_size,
    })
}

/// Apply ascending, non-overlapping edits to `content`.
pub fn apply_edits(content: &str, edits: &[LineEdit]) -> FsResult<String> {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let total = lines.len();

    let mut consumed = 0;
    for (index, edit) in edits.iter().enumerate() {
        let number = index + 1;
        if edit.start_line == 0
            || edit.start_line > total + 1
            || edit.end_line > total
            || edit.end_line < edit.start_line - 1
        {
            return Err(FsError::conflict(format!(
                "edit {number}: lines {}-{} are outside the file ({total} lines)",
                edit.start_line, edit.end_line
            )));
        }
        if edit.start_line <= consumed {
            return Err(FsError::conflict(format!(
                "edit {number}: overlaps or precedes the previous edit"
            )));
        }
        if let Some(expected) = &edit.old_text {
            let current: String = lines[edit.start_line - 1..edit.end_line].concat();
            if !same_text(&current, expected) {
                return Err(FsError::conflict(format!(
                    "edit {number}: lines {}-{} no longer match the expected text",
                    edit.start_line, edit.end_line
                )));
            }
        }
        consumed = edit.end_line;
    }

    let file_terminated = content.is_empty() || content.ends_with('\n');
    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;

    for edit in edits {
        let start = edit.start_line - 1;
        for line in &lines[cursor..start] {
            out.push_str(line);
        }
        cursor = edit.end_line.max(start);

        if edit.new_text.is_empty() {
            continue;
        }
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&edit.new_text);
        let at_eof = cursor == total;
        if !edit.new_text.ends_with('\n') && (!at_eof || file_terminated) {
            out.push('\n');
        }
    }
    for line in &lines[cursor..] {
        out.push_str(line);
    }

    Ok(out)
}

fn same_text(current: &str, expected: &str) -> bool {
    if current == expected {
        return true;
    }
    let trimmed = current
        .strip_suffix("\r\n")
        .or_else(|| current.strip_suffix('\n'))
        .unwrap_or(current);
    trimmed == expected
}
