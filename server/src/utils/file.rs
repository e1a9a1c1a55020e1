//! File and path helpers

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Expand `~` and make relative paths absolute against the working directory.
///
/// Absolute paths pass through unchanged. An empty string is the working
/// directory itself.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let expanded = match path.strip_prefix('~') {
        Some("") => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => match dirs::home_dir() {
            Some(home) => home.join(&rest[1..]),
            None => PathBuf::from(path),
        },
        _ => PathBuf::from(path),
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

/// Resolve a filter-list argument to its JSON text.
///
/// `-` reads stdin, `@path` reads a file (with [`expand_path`]), anything else
/// is taken as inline JSON.
pub fn read_json_arg(arg: &str) -> Result<String> {
    read_json_arg_from(arg, std::io::stdin())
}

fn read_json_arg_from(arg: &str, mut stdin: impl Read) -> Result<String> {
    if arg == "-" {
        let mut buf = String::new();
        stdin
            .read_to_string(&mut buf)
            .context("Failed to read filters from stdin")?;
        return Ok(buf);
    }

    if let Some(path) = arg.strip_prefix('@') {
        let path = expand_path(path);
        return std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read filters file: {}", path.display()));
    }

    Ok(arg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_absolute() {
        assert_eq!(expand_path("/absolute/path"), PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_expand_path_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~"), home);
            assert_eq!(expand_path("~/.pqviewer"), home.join(".pqviewer"));
        }
    }

    #[test]
    fn test_expand_path_tilde_user_is_relative() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(expand_path("~other"), cwd.join("~other"));
    }

    #[test]
    fn test_expand_path_relative_and_empty() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(expand_path("data"), cwd.join("data"));
        assert_eq!(expand_path("  "), cwd);
    }

    #[test]
    fn test_read_json_arg_inline() {
        let json = read_json_arg_from(r#"[{"type":"integer"}]"#, std::io::empty()).unwrap();
        assert_eq!(json, r#"[{"type":"integer"}]"#);
    }

    #[test]
    fn test_read_json_arg_stdin() {
        let json = read_json_arg_from("-", "[]".as_bytes()).unwrap();
        assert_eq!(json, "[]");
    }

    #[test]
    fn test_read_json_arg_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.json");
        std::fs::write(&path, "[1]").unwrap();
        let json = read_json_arg_from(&format!("@{}", path.display()), std::io::empty()).unwrap();
        assert_eq!(json, "[1]");
    }

    #[test]
    fn test_read_json_arg_missing_file() {
        let err = read_json_arg_from("@/nonexistent/filters.json", std::io::empty()).unwrap_err();
        assert!(err.to_string().contains("Failed to read filters file"));
    }
}
