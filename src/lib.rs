//! atse - controller/view navigation for angular-typescript-seed projects
//!
//! This library links an AngularJS controller (`*.controller.ts`) to its view
//! template (`*.html`) using the base paths the project declares in its
//! `AngularApp` class, and offers completion of controller members inside
//! templates. It is consumed by:
//! - The CLI binary (src/bin/atse.rs)
//! - Editor integrations, which own the UI and call into [`Project`]
//!
//! # Architecture
//!
//! This crate follows the "Library-First" pattern:
//! - **lib.rs** (this file): `Project`, the composition of everything below
//! - **core/**: resolver, mapper, navigator, member analysis, completion
//! - **bin/atse.rs**: Thin wrapper that calls the library
//!
//! # Example
//!
//! ```rust,no_run
//! use atse::{Config, DocumentKind, Project};
//! use std::path::Path;
//!
//! let project = Project::open(Path::new("."), Config::default()).unwrap();
//! if project.is_valid() {
//!     let navigator = project.navigator().unwrap();
//!     let view = navigator.counterpart(
//!         Path::new("src/app/controllers/home.controller.ts"),
//!         DocumentKind::Controller,
//!     );
//!     println!("{:?}", view);
//! }
//! ```

pub mod core;

use std::path::Path;

pub use crate::core::{
    AtseError, BasePaths, CompletionEngine, CompletionItem, Config, ControllerAnalyzer,
    DocumentKind, EnvironmentResolver, Navigator, PathMapper, PathMapping, ProjectEnvironment,
    Result, TemplateCompletion,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A resolved project: configuration plus the environment scanned from it
#[derive(Debug, Clone)]
pub struct Project {
    config: Config,
    environment: ProjectEnvironment,
}

impl Project {
    /// Scan `root` with `config`
    pub fn open(root: &Path, config: Config) -> Result<Self> {
        config.validate()?;
        let environment = EnvironmentResolver::new(config.clone()).resolve(root)?;
        Ok(Self {
            config,
            environment,
        })
    }

    /// Scan `root`, reading `.atse.json` (or `config_path`) for settings
    pub fn discover(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::load(path)?,
            None => Config::discover(root)?,
        };
        Self::open(root, config)
    }

    pub fn from_parts(config: Config, environment: ProjectEnvironment) -> Self {
        Self {
            config,
            environment,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn environment(&self) -> &ProjectEnvironment {
        &self.environment
    }

    pub fn root(&self) -> &Path {
        &self.environment.root
    }

    /// Whether any descriptor was recognized
    pub fn is_valid(&self) -> bool {
        self.environment.is_valid_project()
    }

    /// Mapper for this project; base paths match anywhere in a path, so
    /// absolute and root-relative paths both translate
    pub fn mapper(&self) -> Result<PathMapper> {
        PathMapper::from_environment(&self.environment, &self.config)
    }

    pub fn navigator(&self) -> Result<Navigator> {
        Ok(Navigator::new(self.mapper()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn seed_project() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("src/app/controllers")).unwrap();
        fs::create_dir_all(root.join("src/app/views")).unwrap();
        fs::write(
            root.join("src/app/app.ts"),
            r#"
export class AngularApp {
    public static run(): void {
        AngularApp.controllersBasePath = "src/app/controllers";
        AngularApp.viewsBasePath = "src/app/views";
    }
}
"#,
        )
        .unwrap();
        tmp
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_open_seed_project() {
        let tmp = seed_project();
        let project = Project::open(tmp.path(), Config::default()).unwrap();
        assert!(project.is_valid());
        let mapper = project.mapper().unwrap();
        assert_eq!(
            mapper.controller_path_to_view_path("src/app/controllers/home.controller.ts"),
            "src/app/views/home.html"
        );
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let tmp = seed_project();
        let config = Config {
            controller_suffix: String::new(),
            ..Config::default()
        };
        assert!(Project::open(tmp.path(), config).is_err());
    }

    #[test]
    fn test_open_plain_directory_is_not_valid() {
        let tmp = TempDir::new().unwrap();
        let project = Project::open(tmp.path(), Config::default()).unwrap();
        assert!(!project.is_valid());
        assert!(matches!(project.mapper(), Err(AtseError::BasePathsUnresolved)));
    }

    #[test]
    fn test_discover_with_explicit_config() {
        let tmp = seed_project();
        let config_path = tmp.path().join("custom.json");
        fs::write(&config_path, r#"{"candidate_glob": "lib/*.ts"}"#).unwrap();
        let project = Project::discover(tmp.path(), Some(&config_path)).unwrap();
        assert_eq!(project.config().candidate_glob, "lib/*.ts");
        assert!(!project.is_valid());
    }
}
