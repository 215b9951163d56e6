//! `.marketplan/` scaffolding.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use super::config::{PersistenceConfig, PlannerConfig, StoreBackend, write_config};

/// Canonical paths within `.marketplan/` for a project root.
#[derive(Debug, Clone)]
pub struct MarketplanPaths {
    pub root: PathBuf,
    pub dir: PathBuf,
    pub config_path: PathBuf,
    pub session_path: PathBuf,
    pub gitignore_path: PathBuf,
}

impl MarketplanPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let dir = root.join(".marketplan");
        Self {
            root: root.clone(),
            config_path: dir.join("config.toml"),
            session_path: dir.join("session.json"),
            gitignore_path: dir.join(".gitignore"),
            dir,
        }
    }

    /// Resolve a configured path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InitOptions {
    /// Overwrite an existing config and session.
    pub force: bool,
}

/// Config written by `init`: defaults, except plans are kept on disk so
/// they survive between CLI invocations.
pub fn project_config() -> PlannerConfig {
    PlannerConfig {
        persistence: PersistenceConfig {
            backend: StoreBackend::File,
            ..PersistenceConfig::default()
        },
        ..PlannerConfig::default()
    }
}

/// Create `.marketplan/` with [`project_config`].
///
/// Fails if the config already exists unless `options.force` is set.
pub fn init_project(root: &Path, options: InitOptions) -> Result<MarketplanPaths> {
    let paths = MarketplanPaths::new(root);
    if paths.dir.exists() && !paths.dir.is_dir() {
        return Err(anyhow!("marketplan init: .marketplan exists but is not a directory"));
    }
    if paths.config_path.exists() && !options.force {
        return Err(anyhow!(
            "marketplan init: .marketplan already exists (use --force to overwrite)"
        ));
    }

    fs::create_dir_all(&paths.dir)
        .with_context(|| format!("create directory {}", paths.dir.display()))?;
    write_config(&paths.config_path, &project_config())?;
    fs::write(&paths.gitignore_path, GITIGNORE)
        .with_context(|| format!("write file {}", paths.gitignore_path.display()))?;
    if options.force && paths.session_path.exists() {
        fs::remove_file(&paths.session_path)
            .with_context(|| format!("remove {}", paths.session_path.display()))?;
    }
    Ok(paths)
}

const GITIGNORE: &str = "session.json\nplans/\n";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config::load_config;

    /// Verifies init creates the directory, a loadable default config and the gitignore.
    #[test]
    fn init_creates_expected_layout() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = init_project(temp.path(), InitOptions { force: false }).expect("init");

        assert!(paths.dir.is_dir());
        let config = load_config(&paths.config_path).expect("config");
        assert_eq!(config, project_config());
        assert_eq!(config.persistence.backend, StoreBackend::File);
        assert_eq!(
            fs::read_to_string(&paths.gitignore_path).expect("gitignore"),
            GITIGNORE
        );
    }

    /// Verifies a second init without --force is refused.
    #[test]
    fn init_without_force_refuses_existing_project() {
        let temp = tempfile::tempdir().expect("tempdir");
        init_project(temp.path(), InitOptions { force: false }).expect("init");
        let err = init_project(temp.path(), InitOptions { force: false }).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    /// Verifies --force restores the default config and drops the session.
    #[test]
    fn init_with_force_resets_config_and_session() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = init_project(temp.path(), InitOptions { force: false }).expect("init");
        fs::write(&paths.config_path, "app_id = \"custom\"\n").expect("write");
        fs::write(&paths.session_path, "{}").expect("write");

        init_project(temp.path(), InitOptions { force: true }).expect("re-init");
        assert_eq!(
            load_config(&paths.config_path).expect("config").app_id,
            PlannerConfig::default().app_id
        );
        assert!(!paths.session_path.exists());
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let paths = MarketplanPaths::new("/project");
        assert_eq!(
            paths.resolve(Path::new("plans")),
            PathBuf::from("/project/plans")
        );
        assert_eq!(paths.resolve(Path::new("/data")), PathBuf::from("/data"));
    }
}
