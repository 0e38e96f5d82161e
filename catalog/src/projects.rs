//! Project list file

use std::path::Path;

use crate::error::CatalogError;

/// Project names from the contents of a project list file
///
/// One name per line. Carriage returns left by CRLF files are stripped and
/// blank lines dropped; order is preserved.
pub fn parse_project_list(contents: &str) -> Vec<String> {
    contents
        .split('\n')
        .map(|line| line.replace('\r', ""))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Read and parse the project list at `path`
pub fn read_project_list(path: &Path) -> Result<Vec<String>, CatalogError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
    Ok(parse_project_list(&contents))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_name_per_line() {
        assert_eq!(
            parse_project_list("alpha\nbeta\ngamma\n"),
            ["alpha", "beta", "gamma"]
        );
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        assert_eq!(
            parse_project_list("alpha\r\n\r\nbeta\r\n\n\ngamma"),
            ["alpha", "beta", "gamma"]
        );
    }

    #[test]
    fn test_empty_file() {
        assert!(parse_project_list("").is_empty());
        assert!(parse_project_list("\n\r\n").is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_project_list(&dir.path().join("active-repos")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
        assert!(err.to_string().contains("active-repos"));
    }
}
