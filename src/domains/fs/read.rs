//! Reading file content, whole or by line range.

use std::fs;

use super::error::{FsError, FsResult};
use crate::core::security::{Intent, ResolvedPath, check_size_limit};

/// 1-based inclusive line window. `end: None` reads to end of file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: Option<usize>,
}

/// Decoded file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    /// Content that is not valid UTF-8.
    Binary(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    pub content: FileContent,
    /// Size of the whole file on disk.
    pub size: u64,
    /// Total number of lines, when the content is text.
    pub total_lines: Option<usize>,
}

/// Read a file, optionally restricted to a line range.
///
/// Line ranges apply to text only; binary content is returned whole.
pub fn read_file(target: &ResolvedPath, range: Option<LineRange>, max_size: u64) -> FsResult<ReadOutcome> {
    let path = target.require(Intent::Read)?;

    let metadata = fs::metadata(path).map_err(|e| FsError::from_io("stat file", e))?;
    if metadata.is_dir() {
        return Err(FsError::IsADirectory);
    }
    check_size_limit(metadata.len(), max_size)?;

    let bytes = fs::read(path).map_err(|e| FsError::from_io("read file", e))?;
    let size = bytes.len() as u64;

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            return Ok(ReadOutcome {
                content: FileContent::Binary(e.into_bytes()),
                size,
                total_lines: None,
            });
        }
    };

    let total_lines = text.split_inclusive('\n').count();
    let content = match range {
        Some(range) => select_lines(&text, range),
        None => text,
    };

    Ok(ReadOutcome {
        content: FileContent::Text(content),
        size,
        total_lines: Some(total_lines),
    })
}

/// Lines `start..=end` of `text`, keeping their line terminators.
pub fn select_lines(text: &str, range: LineRange) -> String {
    let skip = range.start.saturating_sub(1);
    let take = match range.end {
        Some(end) => end.saturating_sub(skip),
        None => usize::MAX,
    };
    text.split_inclusive('\n').skip(skip).take(take).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::security::{SecurityPolicy, authorize};
    use std::path::Path;
    use tempfile::TempDir;

    fn read_target(root: &Path, name: &str) -> ResolvedPath {
        let policy =
            SecurityPolicy::new(vec![root.to_path_buf()], 1024, Vec::<String>::new()).unwrap();
        authorize(&root.join(name).to_string_lossy(), &policy, Intent::Read).unwrap()
    }

    #[test]
    fn test_read_whole_text() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "one\ntwo\n").unwrap();

        let outcome = read_file(&read_target(temp_dir.path(), "a.txt"), None, 1024).unwrap();
        assert_eq!(outcome.content, FileContent::Text("one\ntwo\n".into()));
        assert_eq!(outcome.size, 8);
        assert_eq!(outcome.total_lines, Some(2));
    }

    #[test]
    fn test_read_line_range() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "1\n2\n3\n4").unwrap();
        let target = read_target(temp_dir.path(), "a.txt");

        let range = LineRange { start: 2, end: Some(3) };
        let outcome = read_file(&target, Some(range), 1024).unwrap();
        assert_eq!(outcome.content, FileContent::Text("2\n3\n".into()));

        let range = LineRange { start: 3, end: None };
        let outcome = read_file(&target, Some(range), 1024).unwrap();
        assert_eq!(outcome.content, FileContent::Text("3\n4".into()));

        let range = LineRange { start: 9, end: Some(12) };
        let outcome = read_file(&target, Some(range), 1024).unwrap();
        assert_eq!(outcome.content, FileContent::Text(String::new()));
    }

    #[test]
    fn test_read_binary() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.bin"), [0xff, 0xfe, 0x00]).unwrap();

        let outcome = read_file(&read_target(temp_dir.path(), "b.bin"), None, 1024).unwrap();
        assert_eq!(outcome.content, FileContent::Binary(vec![0xff, 0xfe, 0x00]));
        assert_eq!(outcome.total_lines, None);
    }

    #[test]
    fn test_read_errors() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("d")).unwrap();
        fs::write(temp_dir.path().join("big.txt"), "0123456789").unwrap();

        let missing = read_file(&read_target(temp_dir.path(), "nope.txt"), None, 1024);
        assert!(matches!(missing, Err(FsError::NotFound)));

        let dir = read_file(&read_target(temp_dir.path(), "d"), None, 1024);
        assert!(matches!(dir, Err(FsError::IsADirectory)));

        let big = read_file(&read_target(temp_dir.path(), "big.txt"), None, 4).unwrap_err();
        assert_eq!(big.kind(), crate::core::protocol::ErrorKind::FileTooLarge);
    }
}
