//! Controller/view path translation
//!
//! A controller `src/app/controllers/users.controller.ts` pairs with the view
//! `src/app/views/users.html`: swap the base path segment, swap the suffix.
//! Everything here is string manipulation; nothing touches the filesystem.

use crate::core::error::{AtseError, Result};
use crate::core::models::{BasePaths, Config, ProjectEnvironment};
use crate::core::walker::normalize_path;
use serde::Serialize;

/// Outcome of translating a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PathMapping {
    /// The path is a controller (or view) and this is its counterpart
    Mapped { from: String, to: String },
    /// No counterpart exists by convention; carries the input untouched
    Unchanged(String),
}

impl PathMapping {
    pub fn is_mapped(&self) -> bool {
        matches!(self, PathMapping::Mapped { .. })
    }

    /// Translated path, or the input when nothing applied
    pub fn into_path(self) -> String {
        match self {
            PathMapping::Mapped { to, .. } => to,
            PathMapping::Unchanged(path) => path,
        }
    }

    pub fn mapped(&self) -> Option<&str> {
        match self {
            PathMapping::Mapped { to, .. } => Some(to),
            PathMapping::Unchanged(_) => None,
        }
    }
}

/// Translates between controller and view paths of one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapper {
    base_paths: BasePaths,
    controller_suffix: String,
    view_suffix: String,
}

impl PathMapper {
    pub fn new(
        base_paths: BasePaths,
        controller_suffix: impl Into<String>,
        view_suffix: impl Into<String>,
    ) -> Self {
        Self {
            base_paths,
            controller_suffix: controller_suffix.into(),
            view_suffix: view_suffix.into(),
        }
    }

    /// Mapper for a resolved environment; fails when no main descriptor was found
    pub fn from_environment(env: &ProjectEnvironment, config: &Config) -> Result<Self> {
        let base_paths = env.base_paths.clone().ok_or(AtseError::BasePathsUnresolved)?;
        Ok(Self::new(
            base_paths,
            config.controller_suffix.clone(),
            config.view_suffix.clone(),
        ))
    }

    pub fn base_paths(&self) -> &BasePaths {
        &self.base_paths
    }

    pub fn map_controller_to_view(&self, controller_path: &str) -> PathMapping {
        Self::translate(
            controller_path,
            &self.base_paths.controllers,
            &self.base_paths.views,
            &self.controller_suffix,
            &self.view_suffix,
        )
    }

    pub fn map_view_to_controller(&self, view_path: &str) -> PathMapping {
        Self::translate(
            view_path,
            &self.base_paths.views,
            &self.base_paths.controllers,
            &self.view_suffix,
            &self.controller_suffix,
        )
    }

    /// View path of a controller, or the input unchanged
    pub fn controller_path_to_view_path(&self, controller_path: &str) -> String {
        self.map_controller_to_view(controller_path).into_path()
    }

    /// Controller path of a view, or the input unchanged
    pub fn view_path_to_controller_path(&self, view_path: &str) -> String {
        self.map_view_to_controller(view_path).into_path()
    }

    /// `users.controller.ts` -> `users`; key for looking up the controller class
    pub fn class_name_from_controller_path(&self, path: &str) -> String {
        controller_stem(path, &self.controller_suffix)
    }

    /// Path of the controller below the controllers base, suffix stripped:
    /// `src/app/controllers/admin/users.controller.ts` -> `admin/users`
    pub fn route_key_from_controller_path(&self, path: &str) -> Option<String> {
        let normalized = normalize_path(path);
        let start = find_segment(&normalized, &self.base_paths.controllers)?;
        let rest = &normalized[start + self.base_paths.controllers.len()..];
        let rest = rest.trim_start_matches('/');
        rest.strip_suffix(&self.controller_suffix)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }

    /// Alias the routes table declares for a controller
    ///
    /// Tries the route key, the key with a leading `/`, then the bare file stem.
    pub fn route_alias_for_controller<'e>(
        &self,
        path: &str,
        env: &'e ProjectEnvironment,
    ) -> Option<&'e str> {
        let key = self.route_key_from_controller_path(path)?;
        let stem = self.class_name_from_controller_path(path);
        [key.clone(), format!("/{}", key), stem]
            .iter()
            .find_map(|candidate| env.route_alias(candidate))
    }

    fn translate(
        path: &str,
        from_base: &str,
        to_base: &str,
        from_suffix: &str,
        to_suffix: &str,
    ) -> PathMapping {
        let normalized = normalize_path(path);
        let Some(start) = find_segment(&normalized, from_base) else {
            return PathMapping::Unchanged(path.to_string());
        };
        let Some(without_suffix) = normalized.strip_suffix(from_suffix) else {
            return PathMapping::Unchanged(path.to_string());
        };
        let end = start + from_base.len();
        let rest = without_suffix.get(end..).unwrap_or("");
        if rest.trim_start_matches('/').is_empty() || rest.ends_with('/') {
            return PathMapping::Unchanged(path.to_string());
        }

        let to = format!("{}{}{}{}", &normalized[..start], to_base, rest, to_suffix);
        PathMapping::Mapped {
            from: normalized,
            to,
        }
    }
}

/// File name of `path` without the controller suffix (or, failing that,
/// without its last extension)
pub fn controller_stem(path: &str, controller_suffix: &str) -> String {
    let normalized = normalize_path(path);
    let file_name = normalized.rsplit('/').next().unwrap_or(&normalized);
    match file_name.strip_suffix(controller_suffix) {
        Some(stem) => stem.to_string(),
        None => file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(file_name)
            .to_string(),
    }
}

/// Byte offset of the last occurrence of `segment` in `path` that starts
/// and ends on a `/` boundary; the one closest to the file name wins.
fn find_segment(path: &str, segment: &str) -> Option<usize> {
    if segment.is_empty() || segment == "." {
        return None;
    }
    path.rmatch_indices(segment).map(|(idx, _)| idx).find(|&idx| {
        let end = idx + segment.len();
        let starts_clean = idx == 0 || path[..idx].ends_with('/') || segment.starts_with('/');
        let ends_clean = end == path.len() || path[end..].starts_with('/');
        starts_clean && ends_clean
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{ScannedSource, SourceOutcome};

    fn mapper() -> PathMapper {
        PathMapper::new(
            BasePaths {
                controllers: "src/app/controllers".to_string(),
                views: "src/app/views".to_string(),
            },
            ".controller.ts",
            ".html",
        )
    }

    #[test]
    fn test_controller_to_view() {
        assert_eq!(
            mapper().controller_path_to_view_path("src/app/controllers/users.controller.ts"),
            "src/app/views/users.html"
        );
    }

    #[test]
    fn test_view_to_controller() {
        assert_eq!(
            mapper().view_path_to_controller_path("src/app/views/users.html"),
            "src/app/controllers/users.controller.ts"
        );
    }

    #[test]
    fn test_absolute_and_nested_paths() {
        let m = mapper();
        assert_eq!(
            m.controller_path_to_view_path("/home/dev/shop/src/app/controllers/admin/orders.controller.ts"),
            "/home/dev/shop/src/app/views/admin/orders.html"
        );
        assert_eq!(
            m.view_path_to_controller_path(r"C:\shop\src\app\views\home.html"),
            "C:/shop/src/app/controllers/home.controller.ts"
        );
    }

    #[test]
    fn test_round_trips() {
        let m = mapper();
        for controller in [
            "src/app/controllers/users.controller.ts",
            "/srv/src/app/controllers/a/b/c.controller.ts",
            "src/app/controllers/my.users.controller.ts",
        ] {
            let view = m.controller_path_to_view_path(controller);
            assert_ne!(view, controller);
            assert_eq!(m.view_path_to_controller_path(&view), controller);
        }
        for view in ["src/app/views/users.html", "/x/src/app/views/deep/er/page.html"] {
            let controller = m.view_path_to_controller_path(view);
            assert_ne!(controller, view);
            assert_eq!(m.controller_path_to_view_path(&controller), view);
        }
    }

    #[test]
    fn test_unchanged_without_base_segment() {
        let m = mapper();
        for path in [
            "src/lib/users.controller.ts",
            "src/app/controllersX/users.controller.ts",
            "src/app/views/users.html",
            "README.md",
        ] {
            assert_eq!(m.controller_path_to_view_path(path), path);
            assert!(!m.map_controller_to_view(path).is_mapped());
        }
        for path in ["src/app/controllers/users.controller.ts", "src/app/viewsOld/a.html"] {
            assert_eq!(m.view_path_to_controller_path(path), path);
        }
    }

    #[test]
    fn test_unchanged_without_suffix() {
        let m = mapper();
        let path = "src/app/controllers/users.service.ts";
        assert_eq!(m.map_controller_to_view(path), PathMapping::Unchanged(path.to_string()));
        // suffix alone, with no file name, is not a controller
        assert!(!m.map_controller_to_view("src/app/controllers/.controller.ts").is_mapped());
    }

    #[test]
    fn test_unchanged_returns_input_verbatim() {
        let m = mapper();
        let path = r"src\lib\users.controller.ts";
        assert_eq!(m.controller_path_to_view_path(path), path);
    }

    #[test]
    fn test_mapping_reports_normalized_source() {
        let mapping = mapper().map_controller_to_view("./src/app/controllers/users.controller.ts");
        assert_eq!(
            mapping,
            PathMapping::Mapped {
                from: "src/app/controllers/users.controller.ts".to_string(),
                to: "src/app/views/users.html".to_string(),
            }
        );
        assert_eq!(mapping.mapped(), Some("src/app/views/users.html"));
    }

    #[test]
    fn test_class_name_from_controller_path() {
        let m = mapper();
        assert_eq!(m.class_name_from_controller_path("src/app/controllers/users.controller.ts"), "users");
        assert_eq!(m.class_name_from_controller_path(r"a\b\home.controller.ts"), "home");
        assert_eq!(m.class_name_from_controller_path("src/app/other.ts"), "other");
    }

    #[test]
    fn test_route_key_from_controller_path() {
        let m = mapper();
        assert_eq!(
            m.route_key_from_controller_path("src/app/controllers/admin/users.controller.ts"),
            Some("admin/users".to_string())
        );
        assert_eq!(m.route_key_from_controller_path("src/lib/users.controller.ts"), None);
    }

    #[test]
    fn test_route_alias_for_controller() {
        let m = mapper();
        let mut env = ProjectEnvironment::empty("/p");
        env.sources.push(ScannedSource {
            path: "src/app/routes.ts".into(),
            outcome: SourceOutcome::Routes { count: 2 },
        });
        env.route_aliases.insert("/home".into(), "vm".into());
        env.route_aliases.insert("orders".into(), "ctrl".into());

        assert_eq!(
            m.route_alias_for_controller("src/app/controllers/home.controller.ts", &env),
            Some("vm")
        );
        assert_eq!(
            m.route_alias_for_controller("src/app/controllers/admin/orders.controller.ts", &env),
            Some("ctrl")
        );
        assert_eq!(
            m.route_alias_for_controller("src/app/controllers/missing.controller.ts", &env),
            None
        );
    }

    #[test]
    fn test_from_environment_requires_base_paths() {
        let env = ProjectEnvironment::empty("/p");
        let result = PathMapper::from_environment(&env, &Config::default());
        assert!(matches!(result, Err(AtseError::BasePathsUnresolved)));
    }

    #[test]
    fn test_find_segment_boundaries() {
        assert_eq!(find_segment("src/app/views/a.html", "src/app/views"), Some(0));
        assert_eq!(find_segment("/x/src/app/views/a.html", "src/app/views"), Some(3));
        assert_eq!(find_segment("xsrc/app/views/a.html", "src/app/views"), None);
        assert_eq!(find_segment("src/app/views", "src/app/views"), Some(0));
        assert_eq!(find_segment("anything", ""), None);
    }

    #[test]
    fn test_round_trip_with_both_bases_in_path() {
        let m = mapper();
        let view = "/work/src/app/controllers/legacy/src/app/views/home.html";
        let controller = m.view_path_to_controller_path(view);
        assert_eq!(
            controller,
            "/work/src/app/controllers/legacy/src/app/controllers/home.controller.ts"
        );
        assert_eq!(m.controller_path_to_view_path(&controller), view);
    }

    #[test]
    fn test_find_segment_prefers_last_occurrence() {
        assert_eq!(
            find_segment("src/app/views/x/src/app/views/a.html", "src/app/views"),
            Some(16)
        );
    }
}
