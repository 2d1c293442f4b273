//! Project root detection
//!
//! Commands work from anywhere inside a project: the root is the nearest
//! ancestor holding `.relocate/config.toml` (or `config.json`).

use std::path::{Path, PathBuf};

use relocate_fs::RelocatePath;

/// Walk up from `start` to the first directory with a relocate config.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start.ancestors().find(|dir| has_config(dir)).map(Path::to_path_buf)
}

fn has_config(dir: &Path) -> bool {
    let config_dir = dir.join(RelocatePath::ConfigDir.as_str());
    config_dir.join(RelocatePath::ConfigFile.as_str()).is_file()
        || config_dir.join(RelocatePath::ConfigFileJson.as_str()).is_file()
}
