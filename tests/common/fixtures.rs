//! Test fixture helpers for creating temporary test data.
//!
//! Provides a scratch workspace holding a store, bulk inputs and parser
//! rules that is removed when dropped.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A small store with one rebrand chain and two records sharing a name.
pub const SAMPLE_STORE: &str = r"device_models:
  Samsung:
    GT-I9000:
      name: Galaxy S
      size: 4
      type: smartphone
      date: 2010
    SGH-T959:
      name: Galaxy S
      size: 4
      type: smartphone
  Vodafone:
    Smart 4:
      brand: Alcatel
      model: OT-4030
  Alcatel:
    OT-4030:
      name: One Touch S'Pop
      size: 4
";

/// Parser rules recognizing the sample user agents.
pub const SAMPLE_RULES: &str = r"device_parsers:
  - regex: '; *(GT-[A-Z0-9]+) Build'
    regex_flag: i
    brand_replacement: Samsung
  - regex: '; *(ALCATEL ONE TOUCH) (\d+)'
    regex_flag: i
    brand_replacement: Alcatel
    model_replacement: 'OT-$2'
  - regex: '; *(Nexus \d+) Build'
    brand_replacement: LG
";

/// User agents matching [`SAMPLE_RULES`], with one repeat and one unknown.
pub const SAMPLE_USER_AGENTS: &str = "\
Mozilla/5.0 (Linux; Android 4.4; GT-I9300 Build/KOT49H) AppleWebKit/537.36 Mobile Safari/537.36
Mozilla/5.0 (Linux; Android 4.4; gt-i9300 Build/KOT49H) AppleWebKit/537.36 Mobile Safari/537.36
Mozilla/5.0 (Linux; Android 4.2; Nexus 7 Build/JOP40D) AppleWebKit/535.19 Safari/535.19
curl/7.64.1
";

/// Temporary directory with helpers for writing test files.
pub struct Workspace {
    /// The temporary directory.
    pub dir: TempDir,
}

impl Workspace {
    /// Create an empty workspace.
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Create a workspace with `models.yaml` holding [`SAMPLE_STORE`] and
    /// `regexes.yaml` holding [`SAMPLE_RULES`].
    #[must_use]
    pub fn with_sample_store() -> Self {
        let ws = Self::new();
        ws.write("models.yaml", SAMPLE_STORE);
        ws.write("regexes.yaml", SAMPLE_RULES);
        ws
    }

    /// Workspace root.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a file in the workspace.
    #[must_use]
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Absolute path of a file in the workspace, as a string.
    #[must_use]
    pub fn arg(&self, name: &str) -> String {
        self.file(name).display().to_string()
    }

    /// Write a file and return its path.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.file(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content)
            .unwrap_or_else(|_| panic!("Failed to write {}", path.display()));
        path
    }

    /// Read a file from the workspace.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be read.
    #[must_use]
    pub fn read(&self, name: &str) -> String {
        let path = self.file(name);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Failed to read {}", path.display()))
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}
