//! Descriptor recognition
//!
//! Two files of an angular-typescript-seed project carry the configuration
//! atse needs:
//!
//! - the main application descriptor, `class AngularApp`, which assigns
//!   `controllersBasePath` and `viewsBasePath`;
//! - the routes descriptor, a series of route definitions carrying `path`
//!   and `controllerAs` string properties.
//!
//! `SyntaxRecognizer` reads them from a tree-sitter TypeScript tree.
//! `PatternRecognizer` reads them with regular expressions and tolerates
//! files the grammar cannot make sense of. `Recognizer` combines the two
//! according to a [`ScanStrategy`].

use crate::core::error::{AtseError, Result};
use crate::core::models::ScanStrategy;
use lazy_static::lazy_static;
use regex::Regex;

/// Name of the class holding the base path assignments
pub const APP_CLASS_NAME: &str = "AngularApp";
const CONTROLLERS_FIELD: &str = "controllersBasePath";
const VIEWS_FIELD: &str = "viewsBasePath";

lazy_static! {
    static ref MAIN_APP_PATTERN: Regex = Regex::new(
        r#"[\s\S]*class AngularApp[\s\S]*\.controllersBasePath\s*=\s*"(.*)";[\s\S]*.viewsBasePath\s*=\s*"(.*)";[\s\S]*"#
    )
    .unwrap();
    static ref ROUTE_ALIAS_PATTERN: Regex = Regex::new(concat!(
        r#"controllerAs\s*:\s*"(?P<alias_a>(?:\\"|[^"])*)".*path\s*:\s*"(?P<path_a>(?:\\"|[^"])*)""#,
        "|",
        r#"path\s*:\s*"(?P<path_b>(?:\\"|[^"])*)".*controllerAs\s*:\s*"(?P<alias_b>(?:\\"|[^"])*)""#,
    ))
    .unwrap();
}

/// Base paths exactly as written in the descriptor (not yet normalized)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainDescriptor {
    pub controllers_base_path: String,
    pub views_base_path: String,
}

/// One `path`/`controllerAs` pair of the routes descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteAlias {
    pub path: String,
    pub alias: String,
}

/// What a candidate file turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognized {
    Main(MainDescriptor),
    Routes(Vec<RouteAlias>),
    Nothing,
}

// =============================================================================
// Pattern recognizer
// =============================================================================

/// Regex-based recognizer
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternRecognizer;

impl PatternRecognizer {
    pub fn main_descriptor(&self, source: &str) -> Option<MainDescriptor> {
        let caps = MAIN_APP_PATTERN.captures(source)?;
        Some(MainDescriptor {
            controllers_base_path: caps.get(1)?.as_str().to_string(),
            views_base_path: caps.get(2)?.as_str().to_string(),
        })
    }

    /// All non-overlapping route pairs, in either property order
    pub fn route_aliases(&self, source: &str) -> Vec<RouteAlias> {
        ROUTE_ALIAS_PATTERN
            .captures_iter(source)
            .filter_map(|caps| {
                let path = caps.name("path_a").or_else(|| caps.name("path_b"))?;
                let alias = caps.name("alias_a").or_else(|| caps.name("alias_b"))?;
                Some(RouteAlias {
                    path: path.as_str().to_string(),
                    alias: alias.as_str().to_string(),
                })
            })
            .collect()
    }

    pub fn recognize(&self, source: &str) -> Recognized {
        if let Some(main) = self.main_descriptor(source) {
            return Recognized::Main(main);
        }
        let routes = self.route_aliases(source);
        if routes.is_empty() {
            Recognized::Nothing
        } else {
            Recognized::Routes(routes)
        }
    }
}

// =============================================================================
// Syntax recognizer
// =============================================================================

/// Tree-sitter based recognizer
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntaxRecognizer;

impl SyntaxRecognizer {
    /// Parse TypeScript source into a tree
    pub fn parse(&self, source: &str) -> Result<tree_sitter::Tree> {
        parse_typescript(source)
    }

    pub fn main_descriptor(&self, tree: &tree_sitter::Tree, source: &str) -> Option<MainDescriptor> {
        let bytes = source.as_bytes();
        let mut has_app_class = false;
        let mut controllers: Option<String> = None;
        let mut views: Option<String> = None;

        visit(tree.root_node(), &mut |node| match node.kind() {
            "class_declaration" | "abstract_class_declaration" => {
                let is_app = node
                    .child_by_field_name("name")
                    .is_some_and(|n| node_text(n, bytes) == APP_CLASS_NAME);
                if !is_app {
                    return;
                }
                has_app_class = true;
                let Some(body) = node.child_by_field_name("body") else {
                    return;
                };
                let mut cursor = body.walk();
                for member in body.children(&mut cursor) {
                    if member.kind() != "public_field_definition" || !has_child_kind(member, "static") {
                        continue;
                    }
                    let name = member.child_by_field_name("name").map(|n| node_text(n, bytes));
                    let value = member
                        .child_by_field_name("value")
                        .and_then(|v| string_literal(v, bytes));
                    match (name, value) {
                        (Some(CONTROLLERS_FIELD), Some(v)) => controllers = Some(v),
                        (Some(VIEWS_FIELD), Some(v)) => views = Some(v),
                        _ => {}
                    }
                }
            }
            "assignment_expression" => {
                let (Some(left), Some(right)) =
                    (node.child_by_field_name("left"), node.child_by_field_name("right"))
                else {
                    return;
                };
                if left.kind() != "member_expression" {
                    return;
                }
                let object = left.child_by_field_name("object").map(|n| node_text(n, bytes));
                let property = left.child_by_field_name("property").map(|n| node_text(n, bytes));
                if object != Some(APP_CLASS_NAME) {
                    return;
                }
                let Some(value) = string_literal(right, bytes) else {
                    return;
                };
                match property {
                    Some(CONTROLLERS_FIELD) => controllers = Some(value),
                    Some(VIEWS_FIELD) => views = Some(value),
                    _ => {}
                }
            }
            _ => {}
        });

        match (has_app_class, controllers, views) {
            (true, Some(controllers_base_path), Some(views_base_path)) => Some(MainDescriptor {
                controllers_base_path,
                views_base_path,
            }),
            _ => None,
        }
    }

    /// Every object literal carrying both `path` and `controllerAs` strings
    pub fn route_aliases(&self, tree: &tree_sitter::Tree, source: &str) -> Vec<RouteAlias> {
        let bytes = source.as_bytes();
        let mut routes = Vec::new();

        visit(tree.root_node(), &mut |node| {
            if node.kind() != "object" {
                return;
            }
            let mut path = None;
            let mut alias = None;
            let mut cursor = node.walk();
            for pair in node.children(&mut cursor) {
                if pair.kind() != "pair" {
                    continue;
                }
                let (Some(key), Some(value)) =
                    (pair.child_by_field_name("key"), pair.child_by_field_name("value"))
                else {
                    continue;
                };
                let key = match key.kind() {
                    "string" => string_literal(key, bytes),
                    _ => Some(node_text(key, bytes).to_string()),
                };
                match key.as_deref() {
                    Some("path") => path = string_literal(value, bytes),
                    Some("controllerAs") => alias = string_literal(value, bytes),
                    _ => {}
                }
            }
            if let (Some(path), Some(alias)) = (path, alias) {
                routes.push(RouteAlias { path, alias });
            }
        });

        routes
    }

    pub fn recognize(&self, source: &str) -> Result<Recognized> {
        let tree = self.parse(source)?;
        if let Some(main) = self.main_descriptor(&tree, source) {
            return Ok(Recognized::Main(main));
        }
        let routes = self.route_aliases(&tree, source);
        Ok(if routes.is_empty() {
            Recognized::Nothing
        } else {
            Recognized::Routes(routes)
        })
    }
}

// =============================================================================
// Combined recognizer
// =============================================================================

/// Recognizer dispatching on a [`ScanStrategy`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Recognizer {
    strategy: ScanStrategy,
    syntax: SyntaxRecognizer,
    pattern: PatternRecognizer,
}

impl Recognizer {
    pub fn new(strategy: ScanStrategy) -> Self {
        Self {
            strategy,
            syntax: SyntaxRecognizer,
            pattern: PatternRecognizer,
        }
    }

    pub fn strategy(&self) -> ScanStrategy {
        self.strategy
    }

    pub fn recognize(&self, source: &str) -> Result<Recognized> {
        match self.strategy {
            ScanStrategy::Syntax => self.syntax.recognize(source),
            ScanStrategy::Pattern => Ok(self.pattern.recognize(source)),
            ScanStrategy::Auto => Ok(self.recognize_auto(source)),
        }
    }

    /// Structural first; each descriptor falls back to its pattern on its own
    fn recognize_auto(&self, source: &str) -> Recognized {
        let tree = match self.syntax.parse(source) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::debug!("structural scan unavailable ({}), using patterns", e);
                return self.pattern.recognize(source);
            }
        };

        if let Some(main) = self
            .syntax
            .main_descriptor(&tree, source)
            .or_else(|| self.pattern.main_descriptor(source))
        {
            return Recognized::Main(main);
        }

        let mut routes = self.syntax.route_aliases(&tree, source);
        if routes.is_empty() {
            routes = self.pattern.route_aliases(source);
        }
        if routes.is_empty() {
            Recognized::Nothing
        } else {
            Recognized::Routes(routes)
        }
    }
}

// =============================================================================
// Tree-sitter helpers
// =============================================================================

/// Parse TypeScript source with tree-sitter
pub(crate) fn parse_typescript(source: &str) -> Result<tree_sitter::Tree> {
    let language: tree_sitter::Language = tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into();
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| AtseError::parse(e.to_string()))?;
    parser
        .parse(source, None)
        .ok_or_else(|| AtseError::parse("tree-sitter returned no tree"))
}

/// Pre-order traversal of `node` and all its descendants.
///
/// Iterative: generated sources can nest far deeper than the call stack allows.
pub(crate) fn visit<'t, F>(node: tree_sitter::Node<'t>, f: &mut F)
where
    F: FnMut(tree_sitter::Node<'t>),
{
    let mut cursor = node.walk();
    loop {
        f(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

pub(crate) fn node_text<'s>(node: tree_sitter::Node, source: &'s [u8]) -> &'s str {
    node.utf8_text(source).unwrap_or("")
}

pub(crate) fn has_child_kind(node: tree_sitter::Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == kind);
    found
}

/// Contents of a string literal node, quotes removed, escapes kept verbatim
pub(crate) fn string_literal(node: tree_sitter::Node, source: &[u8]) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let text = node_text(node, source);
    if text.len() < 2 {
        return None;
    }
    Some(text[1..text.len() - 1].to_string())
}
