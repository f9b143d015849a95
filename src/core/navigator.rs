//! Switching between a controller and its view
//!
//! The "change view/controller" command: it applies to TypeScript and HTML
//! documents, and resolves to the paired file when that file exists.

use crate::core::error::{AtseError, Result};
use crate::core::mapper::{PathMapper, PathMapping};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Kind of the active document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// TypeScript source
    Controller,
    /// HTML template
    View,
    Other,
}

impl DocumentKind {
    /// From an editor language id (`typescript`, `html`)
    pub fn from_language_id(id: &str) -> Self {
        match id.to_lowercase().as_str() {
            "typescript" | "ts" => DocumentKind::Controller,
            "html" | "htm" => DocumentKind::View,
            _ => DocumentKind::Other,
        }
    }

    /// From a file extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_language_id)
            .unwrap_or(DocumentKind::Other)
    }
}

/// Resolves the counterpart of controllers and views
#[derive(Debug, Clone)]
pub struct Navigator {
    mapper: PathMapper,
}

impl Navigator {
    pub fn new(mapper: PathMapper) -> Self {
        Self { mapper }
    }

    pub fn mapper(&self) -> &PathMapper {
        &self.mapper
    }

    /// Whether the command is available for a document of this kind
    pub fn can_execute(kind: DocumentKind) -> bool {
        matches!(kind, DocumentKind::Controller | DocumentKind::View)
    }

    /// Mapping for `path` without checking the filesystem
    pub fn mapping(&self, path: &Path, kind: DocumentKind) -> PathMapping {
        let path = path.to_string_lossy();
        match kind {
            DocumentKind::Controller => self.mapper.map_controller_to_view(&path),
            DocumentKind::View => self.mapper.map_view_to_controller(&path),
            DocumentKind::Other => PathMapping::Unchanged(path.into_owned()),
        }
    }

    /// Paired file of `path`; an error when there is no pair on disk
    pub fn counterpart(&self, path: &Path, kind: DocumentKind) -> Result<PathBuf> {
        match self.mapping(path, kind) {
            PathMapping::Mapped { to, .. } => {
                let target = PathBuf::from(&to);
                if target.is_file() {
                    tracing::debug!("{} -> {}", path.display(), target.display());
                    Ok(target)
                } else {
                    tracing::info!("counterpart {} does not exist", target.display());
                    Err(AtseError::CounterpartNotFound { path: target })
                }
            }
            PathMapping::Unchanged(_) => Err(AtseError::CounterpartNotFound {
                path: path.to_path_buf(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::BasePaths;
    use std::fs;
    use tempfile::TempDir;

    fn navigator_for(root: &Path) -> Navigator {
        let base = root.to_string_lossy().replace('\\', "/");
        Navigator::new(PathMapper::new(
            BasePaths {
                controllers: format!("{}/src/app/controllers", base),
                views: format!("{}/src/app/views", base),
            },
            ".controller.ts",
            ".html",
        ))
    }

    #[test]
    fn test_document_kind() {
        assert_eq!(DocumentKind::from_language_id("typescript"), DocumentKind::Controller);
        assert_eq!(DocumentKind::from_language_id("HTML"), DocumentKind::View);
        assert_eq!(DocumentKind::from_language_id("css"), DocumentKind::Other);
        assert_eq!(DocumentKind::from_path(Path::new("a/b.controller.ts")), DocumentKind::Controller);
        assert_eq!(DocumentKind::from_path(Path::new("a/b.html")), DocumentKind::View);
        assert_eq!(DocumentKind::from_path(Path::new("Makefile")), DocumentKind::Other);
    }

    #[test]
    fn test_can_execute() {
        assert!(Navigator::can_execute(DocumentKind::Controller));
        assert!(Navigator::can_execute(DocumentKind::View));
        assert!(!Navigator::can_execute(DocumentKind::Other));
    }

    #[test]
    fn test_counterpart_both_directions() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src/app/controllers")).unwrap();
        fs::create_dir_all(tmp.path().join("src/app/views")).unwrap();
        let controller = tmp.path().join("src/app/controllers/home.controller.ts");
        let view = tmp.path().join("src/app/views/home.html");
        fs::write(&controller, "export class HomeController {}").unwrap();
        fs::write(&view, "<h1>{{vm.title}}</h1>").unwrap();

        let nav = navigator_for(tmp.path());
        let found = nav.counterpart(&controller, DocumentKind::Controller).unwrap();
        assert!(found.ends_with("src/app/views/home.html"));
        let back = nav.counterpart(&view, DocumentKind::View).unwrap();
        assert!(back.ends_with("src/app/controllers/home.controller.ts"));
    }

    #[test]
    fn test_counterpart_missing_file() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src/app/controllers")).unwrap();
        let controller = tmp.path().join("src/app/controllers/lonely.controller.ts");
        fs::write(&controller, "").unwrap();

        let nav = navigator_for(tmp.path());
        let err = nav.counterpart(&controller, DocumentKind::Controller).unwrap_err();
        assert_eq!(err.to_string(), "Not found view/controller");
    }

    #[test]
    fn test_counterpart_unmappable() {
        let tmp = TempDir::new().unwrap();
        let nav = navigator_for(tmp.path());
        let result = nav.counterpart(Path::new("/elsewhere/readme.md"), DocumentKind::Other);
        assert!(matches!(result, Err(AtseError::CounterpartNotFound { .. })));
        assert!(!nav
            .mapping(Path::new("/elsewhere/x.controller.ts"), DocumentKind::Controller)
            .is_mapped());
    }
}
