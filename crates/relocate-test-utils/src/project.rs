//! [`TestProject`] builder for relocation scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Manifest location used by [`TestProject`], relative to the project root
pub const MANIFEST: &str = "Packages/manifest.json";
/// Destination root used by [`TestProject`], relative to the project root
pub const DESTINATION: &str = "Assets/CodeSmile/Packages";
/// Package filter used by [`TestProject`]
pub const FILTER: &str = "de.codesmile.";

/// A temporary project plus a separate "outside" directory that holds the
/// package sources (`pkgs/`) and relocate's state (`state/`).
///
/// # Example
///
/// ```rust,no_run
/// use relocate_test_utils::project::TestProject;
///
/// let project = TestProject::new();
/// let foo = project.add_package("foo", &[("package.json", "{}")]);
/// project.write_manifest(&format!("\"de.codesmile.foo\": \"file:{foo}\"\n"));
/// project.write_config("test-box\\maintainer");
/// ```
pub struct TestProject {
    project: TempDir,
    outside: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    pub fn new() -> Self {
        let project = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::create_dir_all(outside.path().join("pkgs")).unwrap();
        Self { project, outside }
    }

    /// Project root
    pub fn root(&self) -> &Path {
        self.project.path()
    }

    /// Directory holding package sources
    pub fn packages_dir(&self) -> PathBuf {
        self.outside.path().join("pkgs")
    }

    /// State directory configured by [`TestProject::write_config`]
    pub fn state_dir(&self) -> PathBuf {
        self.outside.path().join("state")
    }

    /// Source prefix that maps `pkgs/de.codesmile.<name>` to `<name>`
    pub fn source_prefix(&self) -> String {
        forward_slashes(&self.packages_dir().join(FILTER))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root().join(MANIFEST)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.root().join(format!("{MANIFEST}.backup"))
    }

    pub fn destination_root(&self) -> PathBuf {
        self.root().join(DESTINATION)
    }

    pub fn write_manifest(&self, content: &str) {
        let path = self.manifest_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn read_manifest(&self) -> String {
        fs::read_to_string(self.manifest_path()).unwrap()
    }

    /// Write `.relocate/config.toml` pointing at this fixture's layout.
    pub fn write_config(&self, identity: &str) {
        self.write_config_with(identity, "");
    }

    /// Like [`TestProject::write_config`], appending `extra` TOML verbatim.
    pub fn write_config_with(&self, identity: &str, extra: &str) {
        let config = format!(
            r#"[manifest]
path = "{MANIFEST}"
package_filter = "{FILTER}"

[packages]
destination = "{DESTINATION}"
source_prefix = "{prefix}"

[operator]
identity = '{identity}'

[state]
dir = "{state}"
{extra}"#,
            prefix = self.source_prefix(),
            state = forward_slashes(&self.state_dir()),
        );
        let dir = self.root().join(".relocate");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), config).unwrap();
    }

    /// Create `pkgs/de.codesmile.<name>` with the given relative files.
    ///
    /// Returns the package path in forward-slash form, as it would appear in
    /// a manifest.
    pub fn add_package(&self, name: &str, files: &[(&str, &str)]) -> String {
        let root = self.packages_dir().join(format!("{FILTER}{name}"));
        fs::create_dir_all(&root).unwrap();
        for (relative, content) in files {
            let path = root.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        forward_slashes(&root)
    }

    /// Assert that a path relative to the project root exists.
    pub fn assert_exists(&self, relative: &str) {
        let path = self.root().join(relative);
        assert!(path.exists(), "expected {} to exist", path.display());
    }

    /// Assert that a path relative to the project root does not exist.
    pub fn assert_missing(&self, relative: &str) {
        let path = self.root().join(relative);
        assert!(!path.exists(), "expected {} to be absent", path.display());
    }
}

fn forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
