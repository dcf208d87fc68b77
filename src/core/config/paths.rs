use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub project_root: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        Self::with_root(discover_project_root())
    }

    pub fn with_root(project_root: PathBuf) -> Self {
        let log_dir = project_root.join("storage").join("logs");
        let _ = fs::create_dir_all(&log_dir);

        AppPaths {
            project_root,
            log_dir,
        }
    }

    /// Resolves `path` against the project root unless it is already absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        self.project_root.join(path)
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_project_root() -> PathBuf {
    if let Ok(root) = env::var("CLINIC_ROOT") {
        return PathBuf::from(root);
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let cwd = env::current_dir().unwrap_or_else(|_| manifest_dir.clone());
    if cwd.join("config.yml").exists() {
        return cwd;
    }
    if manifest_dir.join("config.yml").exists() {
        return manifest_dir;
    }

    cwd
}
