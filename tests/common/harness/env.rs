//! Isolated test environment with temp directory.

#![allow(dead_code)]

use super::{GroveCommand, TestNote};
use grove::{Notebook, NotebookOptions};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Ids returned by `grove new`.
#[derive(Debug, Clone)]
pub struct CreatedNote {
    pub note_id: String,
    pub branch_id: String,
}

/// Isolated test environment with a temporary notebook.
///
/// Creates a temp directory that is automatically cleaned up on drop. The
/// notebook file and the config directory both live inside it.
pub struct TestEnv {
    /// The temporary directory (kept for lifetime management)
    _temp_dir: TempDir,
    root: PathBuf,
}

impl TestEnv {
    /// Creates a new isolated test environment without a notebook.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Creates an environment and runs `grove init`.
    pub fn initialized() -> Self {
        let env = Self::new();
        env.cmd().init().assert().success();
        env
    }

    /// Creates an environment and runs `grove init` with a password.
    pub fn with_password(password: &str) -> Self {
        let env = Self::new();
        env.cmd().password(password).init().assert().success();
        env
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path of the notebook database.
    pub fn db_path(&self) -> PathBuf {
        self.root.join("notebook.db")
    }

    /// Returns the directory used as `XDG_CONFIG_HOME`.
    pub fn config_home(&self) -> PathBuf {
        self.root.join("config")
    }

    /// Creates a GroveCommand configured for this test environment.
    pub fn cmd(&self) -> GroveCommand {
        GroveCommand::new()
            .config_home(&self.config_home())
            .db(&self.db_path())
    }

    /// Creates a note through the CLI and returns its ids.
    pub fn add_note(&self, note: &TestNote) -> CreatedNote {
        self.add_note_with(self.cmd(), note)
    }

    /// Like [`add_note`](Self::add_note), passing a password.
    pub fn add_protected_note(&self, note: &TestNote, password: &str) -> CreatedNote {
        self.add_note_with(self.cmd().password(password), note)
    }

    fn add_note_with(&self, cmd: GroveCommand, note: &TestNote) -> CreatedNote {
        let output: serde_json::Value = cmd.args(note.to_args()).format_json().output_json();
        CreatedNote {
            note_id: output["data"]["note"]["id"]
                .as_str()
                .expect("note id in output")
                .to_string(),
            branch_id: output["data"]["branch"]["branchId"]
                .as_str()
                .expect("branch id in output")
                .to_string(),
        }
    }

    /// Opens the notebook directly, without background threads.
    pub fn notebook(&self) -> Notebook {
        Notebook::open(&self.db_path(), NotebookOptions::manual()).expect("Failed to open notebook")
    }

    /// Writes the config file for this environment.
    pub fn write_config(&self, contents: &str) -> PathBuf {
        let dir = self.config_home().join("grove");
        std::fs::create_dir_all(&dir).expect("Failed to create config dir");
        let path = dir.join("config.toml");
        std::fs::write(&path, contents).expect("Failed to write config");
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_creates_temp_directory() {
        let env = TestEnv::new();
        assert!(env.root().is_dir());
        assert!(!env.db_path().exists(), "no notebook before init");
    }

    #[test]
    fn test_env_cleanup_on_drop() {
        let path = {
            let env = TestEnv::new();
            env.root().to_path_buf()
        };
        assert!(!path.exists(), "temp directory should be cleaned up on drop");
    }

    #[test]
    fn test_env_provides_command() {
        let env = TestEnv::new();
        let cmd = env.cmd();
        let args = cmd.get_args();
        assert_eq!(args[0], "--db");
        assert_eq!(args[1], env.db_path().to_string_lossy());
    }

    #[test]
    fn test_env_initialized_creates_db() {
        let env = TestEnv::initialized();
        assert!(env.db_path().exists());
    }

    #[test]
    fn test_env_add_note_returns_ids() {
        let env = TestEnv::initialized();
        let created = env.add_note(&TestNote::new("Harness Note").content("body"));

        let notebook = env.notebook();
        let note = notebook
            .get_note(&created.note_id.parse().unwrap())
            .unwrap()
            .expect("note should exist");
        assert_eq!(note.title(), "Harness Note");

        let branch = notebook.branch(&created.branch_id.parse().unwrap()).unwrap();
        assert_eq!(branch.note_id.as_str(), created.note_id);
    }
}
