//! Git queries for change-set based project selection.
//!
//! Shells out to the `git` binary rather than linking a git library; only
//! read-only plumbing commands are used.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;

/// Runs read-only git queries against one repository.
#[derive(Debug)]
pub struct GitDiffClient {
    repo_root: PathBuf,
}

impl GitDiffClient {
    pub fn new(repo_root: PathBuf) -> Self {
        Self { repo_root }
    }

    /// Paths (relative to the repository root) that differ from the merge
    /// base of `HEAD` and `target_ref`, plus untracked files.
    pub fn changed_files(&self, target_ref: &str) -> anyhow::Result<Vec<PathBuf>> {
        let merge_base = self.merge_base("HEAD", target_ref)?;

        let mut files = self.run_for_lines(&["diff", "--name-only", &merge_base])?;
        let untracked =
            self.run_for_lines(&["ls-files", "--others", "--exclude-standard"])?;
        for path in untracked {
            if !files.contains(&path) {
                files.push(path);
            }
        }
        Ok(files)
    }

    fn merge_base(&self, a: &str, b: &str) -> anyhow::Result<String> {
        let output = Command::new("git")
            .arg("merge-base")
            .arg(a)
            .arg(b)
            .current_dir(&self.repo_root)
            .output()
            .context("Failed to invoke git merge-base")?;
        if !output.status.success() {
            anyhow::bail!(
                "git merge-base {} {} failed: {}",
                a,
                b,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn run_for_lines(&self, args: &[&str]) -> anyhow::Result<Vec<PathBuf>> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_root)
            .output()
            .with_context(|| format!("Failed to invoke git {}", args.join(" ")))?;
        if !output.status.success() {
            anyhow::bail!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect())
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }
}
