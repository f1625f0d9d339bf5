//! Reading and rewriting phrase files.

use std::path::Path;

use crate::error::Result;

/// Read phrases from a text file, one per line.
///
/// Lines are trimmed and blank lines dropped, so a file holding only
/// whitespace yields an empty list.
pub fn read_phrases(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_phrases(&content))
}

/// Rewrite a phrase file. An empty slice truncates it.
pub fn write_phrases(path: impl AsRef<Path>, phrases: &[String]) -> Result<()> {
    let mut content = phrases.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    std::fs::write(path, content)?;
    Ok(())
}

pub(crate) fn parse_phrases(content: &str) -> Vec<String> {
    content
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_skips_blank_lines() {
        let phrases = parse_phrases("  The Russian research vessel.  \n\n\t\r\nLet's reconvene.\r\n");
        assert_eq!(
            phrases,
            vec!["The Russian research vessel.", "Let's reconvene."]
        );
    }

    #[test]
    fn whitespace_only_is_empty() {
        assert!(parse_phrases(" \n \n\t").is_empty());
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phrases.txt");
        write_phrases(&path, &["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(read_phrases(&path).unwrap(), vec!["a", "b"]);

        write_phrases(&path, &[]).unwrap();
        assert!(read_phrases(&path).unwrap().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_phrases("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
