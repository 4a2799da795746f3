//! Keep the lock file out of version control.

use std::path::Path;

use anyhow::Context;

/// Append `entry` to the project's `.gitignore` if it is not listed yet.
///
/// Does nothing when the project has no `.gitignore`. Returns `true` when
/// the file was modified.
pub fn ensure_gitignore_entry(project_root: &Path, entry: &str) -> anyhow::Result<bool> {
    let path = project_root.join(".gitignore");
    if !path.exists() {
        return Ok(false);
    }

    let mut content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if content.lines().any(|line| line.trim() == entry) {
        return Ok(false);
    }

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(entry);
    content.push('\n');

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to update {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn no_gitignore_is_a_no_op() {
        let temp = TempDir::new().unwrap();
        assert!(!ensure_gitignore_entry(temp.path(), "sklfile.lock").unwrap());
        assert!(!temp.path().join(".gitignore").exists());
    }

    #[test]
    fn appends_missing_entry() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".gitignore");
        std::fs::write(&path, "target").unwrap();

        assert!(ensure_gitignore_entry(temp.path(), "sklfile.lock").unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "target\nsklfile.lock\n"
        );
    }

    #[test]
    fn existing_entry_is_left_alone() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".gitignore");
        std::fs::write(&path, "target/\n  sklfile.lock  \n").unwrap();

        assert!(!ensure_gitignore_entry(temp.path(), "sklfile.lock").unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "target/\n  sklfile.lock  \n"
        );
    }
}
