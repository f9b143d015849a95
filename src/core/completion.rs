//! Template completion
//!
//! Inside a view, the controller instance is reachable through its route
//! alias (`vm` by default): `{{vm.title}}`, `ng-click="vm.load()"`. When the
//! text before the cursor ends in such an access, the public members of the
//! controller are offered. One level of `vm.member.` is followed when the
//! member's declared type is a class or interface of the same file.

use crate::core::error::{AtseError, Result};
use crate::core::mapper::{PathMapper, PathMapping};
use crate::core::members::{ControllerAnalyzer, Member, MemberKind, SourceTypes, TypeDefinition};
use crate::core::models::{Config, ProjectEnvironment};
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where the cursor is inside an alias access
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionContext {
    /// Members already typed between the alias and the cursor
    pub chain: Vec<String>,
    /// Identifier prefix under the cursor
    pub partial: String,
}

/// One suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionItem {
    pub label: String,
    pub kind: MemberKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub is_static: bool,
}

impl From<&Member> for CompletionItem {
    fn from(member: &Member) -> Self {
        Self {
            label: member.name.clone(),
            kind: member.kind,
            detail: member.detail.clone().or_else(|| member.type_name.clone()),
            is_static: member.is_static,
        }
    }
}

/// Detects alias accesses and turns controller members into suggestions
#[derive(Debug, Clone)]
pub struct CompletionEngine {
    alias: String,
    pattern: Regex,
}

impl CompletionEngine {
    pub fn new(alias: &str) -> Result<Self> {
        let pattern = Regex::new(&format!(
            r"(?:^|[^\w$.]){}\.((?:[A-Za-z_$][\w$]*\.)*)([A-Za-z_$][\w$]*)?$",
            regex::escape(alias)
        ))?;
        Ok(Self {
            alias: alias.to_string(),
            pattern,
        })
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Completion context at the end of `text_before_cursor`, if any
    pub fn context(&self, text_before_cursor: &str) -> Option<CompletionContext> {
        let caps = self.pattern.captures(text_before_cursor)?;
        let chain = caps
            .get(1)
            .map(|m| {
                m.as_str()
                    .split('.')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let partial = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
        Some(CompletionContext { chain, partial })
    }

    /// Suggestions for `text_before_cursor` given the controller's types
    pub fn complete(
        &self,
        text_before_cursor: &str,
        types: &SourceTypes,
        controller_class: &str,
    ) -> Vec<CompletionItem> {
        let Some(context) = self.context(text_before_cursor) else {
            return Vec::new();
        };
        let Some(target) = Self::resolve_chain(types, controller_class, &context.chain) else {
            tracing::debug!("cannot follow {}.{}", self.alias, context.chain.join("."));
            return Vec::new();
        };

        let mut items: Vec<CompletionItem> = target
            .public_members()
            .filter(|m| m.name.starts_with(&context.partial))
            .map(CompletionItem::from)
            .collect();
        items.sort_by(|a, b| a.label.cmp(&b.label));
        items
    }

    fn resolve_chain<'t>(
        types: &'t SourceTypes,
        controller_class: &str,
        chain: &[String],
    ) -> Option<&'t TypeDefinition> {
        let mut current = types.find(controller_class)?;
        for segment in chain {
            let member = current
                .public_members()
                .find(|m| m.name == *segment && m.kind != MemberKind::Method)?;
            current = types.find(member.type_name.as_deref()?.trim())?;
        }
        Some(current)
    }
}

/// Completion for a view file, wired to the project it belongs to
pub struct TemplateCompletion<'a> {
    env: &'a ProjectEnvironment,
    mapper: &'a PathMapper,
    config: &'a Config,
    analyzer: ControllerAnalyzer,
}

impl<'a> TemplateCompletion<'a> {
    pub fn new(env: &'a ProjectEnvironment, mapper: &'a PathMapper, config: &'a Config) -> Self {
        Self {
            env,
            mapper,
            config,
            analyzer: ControllerAnalyzer::new(),
        }
    }

    /// Controller file paired with `view_path`, if it exists
    pub fn controller_for_view(&self, view_path: &Path) -> Result<PathBuf> {
        match self.mapper.map_view_to_controller(&view_path.to_string_lossy()) {
            PathMapping::Mapped { to, .. } if Path::new(&to).is_file() => Ok(PathBuf::from(to)),
            PathMapping::Mapped { to, .. } => Err(AtseError::CounterpartNotFound { path: to.into() }),
            PathMapping::Unchanged(_) => Err(AtseError::CounterpartNotFound {
                path: view_path.to_path_buf(),
            }),
        }
    }

    /// Alias the view uses for its controller
    pub fn alias_for(&self, controller_path: &Path) -> &str {
        self.mapper
            .route_alias_for_controller(&controller_path.to_string_lossy(), self.env)
            .unwrap_or(self.config.fallback_alias.as_str())
    }

    /// Suggestions at byte `offset` of `view_text`
    pub fn complete(
        &self,
        view_path: &Path,
        view_text: &str,
        offset: usize,
    ) -> Result<Vec<CompletionItem>> {
        let controller = self.controller_for_view(view_path)?;
        let key = self
            .mapper
            .class_name_from_controller_path(&controller.to_string_lossy());
        let (types, class_name) = self.analyzer.controller_class(&controller, &key)?;

        let engine = CompletionEngine::new(self.alias_for(&controller))?;
        let before = &view_text[..floor_char_boundary(view_text, offset)];
        Ok(engine.complete(before, &types, &class_name))
    }
}

fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut idx = offset.min(text.len());
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::BasePaths;
    use std::fs;
    use tempfile::TempDir;

    const CONTROLLER: &str = r#"
export interface IUser {
    name: string;
    email: string;
}

export class HomeController {
    public title = "Home";
    public user: IUser;
    public items: string[] = [];
    private secret = "";

    public load(): void {}
    public static create(): HomeController { return new HomeController(); }
}
"#;

    fn types() -> SourceTypes {
        ControllerAnalyzer::new().analyze_source(CONTROLLER).unwrap()
    }

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|i| i.label.as_str()).collect()
    }

    #[test]
    fn test_context_after_alias_dot() {
        let engine = CompletionEngine::new("vm").unwrap();
        for text in ["<h1>{{vm.", "<a ng-click=\"vm.", "{ active: vm.", "vm."] {
            let ctx = engine.context(text).unwrap();
            assert!(ctx.chain.is_empty(), "{}", text);
            assert_eq!(ctx.partial, "", "{}", text);
        }
    }

    #[test]
    fn test_context_with_chain_and_partial() {
        let engine = CompletionEngine::new("vm").unwrap();
        let ctx = engine.context("{{vm.user.na").unwrap();
        assert_eq!(ctx.chain, vec!["user".to_string()]);
        assert_eq!(ctx.partial, "na");
    }

    #[test]
    fn test_context_rejects_other_identifiers() {
        let engine = CompletionEngine::new("vm").unwrap();
        assert!(engine.context("{{xvm.").is_none());
        assert!(engine.context("{{other.vm.").is_none());
        assert!(engine.context("{{vm.title }}").is_none());
        assert!(engine.context("{{vm").is_none());
    }

    #[test]
    fn test_context_escapes_alias() {
        let engine = CompletionEngine::new("$ctrl").unwrap();
        assert!(engine.context("{{$ctrl.").is_some());
        assert!(engine.context("{{ctrl.").is_none());
        assert_eq!(engine.alias(), "$ctrl");
    }

    #[test]
    fn test_complete_controller_members() {
        let engine = CompletionEngine::new("vm").unwrap();
        let items = engine.complete("{{vm.", &types(), "HomeController");
        assert_eq!(labels(&items), vec!["create", "items", "load", "title", "user"]);
        let create = items.iter().find(|i| i.label == "create").unwrap();
        assert!(create.is_static);
        assert_eq!(create.kind, MemberKind::Method);
    }

    #[test]
    fn test_complete_filters_by_partial() {
        let engine = CompletionEngine::new("vm").unwrap();
        let items = engine.complete("{{vm.ti", &types(), "HomeController");
        assert_eq!(labels(&items), vec!["title"]);
    }

    #[test]
    fn test_complete_follows_typed_property() {
        let engine = CompletionEngine::new("vm").unwrap();
        let items = engine.complete("{{vm.user.", &types(), "HomeController");
        assert_eq!(labels(&items), vec!["email", "name"]);
        assert_eq!(items[0].detail.as_deref(), Some("string"));
    }

    #[test]
    fn test_complete_unresolvable_chain_is_empty() {
        let engine = CompletionEngine::new("vm").unwrap();
        let t = types();
        assert!(engine.complete("{{vm.items.", &t, "HomeController").is_empty());
        assert!(engine.complete("{{vm.load.", &t, "HomeController").is_empty());
        assert!(engine.complete("{{vm.", &t, "MissingController").is_empty());
        assert!(engine.complete("plain text", &t, "HomeController").is_empty());
    }

    #[test]
    fn test_floor_char_boundary() {
        let text = "é{{vm.";
        assert_eq!(floor_char_boundary(text, 1), 0);
        assert_eq!(floor_char_boundary(text, 100), text.len());
    }

    #[test]
    fn test_template_completion_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("src/app/controllers")).unwrap();
        fs::create_dir_all(root.join("src/app/views")).unwrap();
        fs::write(root.join("src/app/controllers/home.controller.ts"), CONTROLLER).unwrap();
        let view_path = root.join("src/app/views/home.html");
        let view = "<h1>{{ctrl.ti</h1>";
        fs::write(&view_path, view).unwrap();

        let base = root.to_string_lossy().replace('\\', "/");
        let mut env = ProjectEnvironment::empty(root);
        env.base_paths = Some(BasePaths {
            controllers: format!("{}/src/app/controllers", base),
            views: format!("{}/src/app/views", base),
        });
        env.route_aliases.insert("home".to_string(), "ctrl".to_string());
        let config = Config::default();
        let mapper = PathMapper::from_environment(&env, &config).unwrap();

        let completion = TemplateCompletion::new(&env, &mapper, &config);
        let offset = view.find("</h1>").unwrap();
        let items = completion.complete(&view_path, view, offset).unwrap();
        assert_eq!(labels(&items), vec!["title"]);
    }

    #[test]
    fn test_template_completion_without_controller() {
        let tmp = TempDir::new().unwrap();
        let env = ProjectEnvironment::empty(tmp.path());
        let config = Config::default();
        let mapper = PathMapper::new(
            BasePaths {
                controllers: "src/app/controllers".into(),
                views: "src/app/views".into(),
            },
            ".controller.ts",
            ".html",
        );
        let completion = TemplateCompletion::new(&env, &mapper, &config);
        let result = completion.complete(Path::new("src/app/views/none.html"), "{{vm.", 5);
        assert!(matches!(result, Err(AtseError::CounterpartNotFound { .. })));
        assert_eq!(completion.alias_for(Path::new("src/app/controllers/none.controller.ts")), "vm");
    }
}
