//! Controller member analysis
//!
//! Collects the classes and interfaces declared in a controller source file
//! together with their members, so templates can be offered the public
//! members of their controller. This is a syntactic view: no type checking,
//! no imports followed.

use crate::core::descriptor::{has_child_kind, node_text, parse_typescript, visit};
use crate::core::error::{AtseError, Result, ResultExt};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Method,
    Property,
    /// `get`/`set` accessor pair
    Accessor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Public,
    Protected,
    Private,
}

impl Scope {
    fn from_modifier(text: &str) -> Self {
        match text.trim() {
            "private" => Scope::Private,
            "protected" => Scope::Protected,
            _ => Scope::Public,
        }
    }
}

/// A member of a class or interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
    pub scope: Scope,
    pub is_static: bool,
    /// Declared type of a property or accessor, as written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Signature of a method, e.g. `(id: number): void`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Member {
    pub fn is_public(&self) -> bool {
        self.scope == Scope::Public
    }
}

/// A class or interface declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDefinition {
    pub name: String,
    pub kind: TypeKind,
    pub members: Vec<Member>,
}

impl TypeDefinition {
    pub fn public_members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.is_public())
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Everything declared in one source file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceTypes {
    pub types: Vec<TypeDefinition>,
}

impl SourceTypes {
    pub fn find(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Class named after a controller lookup key: `users` matches `Users`
    /// and `UsersController`; `-`, `_` and `.` in the key are ignored.
    pub fn find_controller_class(&self, key: &str) -> Option<&TypeDefinition> {
        let key = simplify(key);
        let with_suffix = format!("{}controller", key);
        self.types
            .iter()
            .filter(|t| t.kind == TypeKind::Class)
            .find(|t| {
                let name = simplify(&t.name);
                name == key || name == with_suffix
            })
    }
}

fn simplify(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Extracts [`SourceTypes`] from TypeScript sources
#[derive(Debug, Default, Clone, Copy)]
pub struct ControllerAnalyzer;

impl ControllerAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze_file(&self, path: &Path) -> Result<SourceTypes> {
        let source = std::fs::read_to_string(path)?;
        self.analyze_source(&source)
            .context(format!("analyzing {}", path.display()))
    }

    pub fn analyze_source(&self, source: &str) -> Result<SourceTypes> {
        let tree = parse_typescript(source)?;
        let bytes = source.as_bytes();
        let mut types = Vec::new();

        visit(tree.root_node(), &mut |node| match node.kind() {
            "class_declaration" | "abstract_class_declaration" | "class" => {
                let Some(name) = node.child_by_field_name("name") else {
                    return;
                };
                let members = node
                    .child_by_field_name("body")
                    .map(|body| class_members(body, bytes))
                    .unwrap_or_default();
                types.push(TypeDefinition {
                    name: node_text(name, bytes).to_string(),
                    kind: TypeKind::Class,
                    members,
                });
            }
            "interface_declaration" => {
                let Some(name) = node.child_by_field_name("name") else {
                    return;
                };
                let members = node
                    .child_by_field_name("body")
                    .map(|body| interface_members(body, bytes))
                    .unwrap_or_default();
                types.push(TypeDefinition {
                    name: node_text(name, bytes).to_string(),
                    kind: TypeKind::Interface,
                    members,
                });
            }
            _ => {}
        });

        Ok(SourceTypes { types })
    }

    /// Parse a controller file and pick the class for `key`
    pub fn controller_class(&self, path: &Path, key: &str) -> Result<(SourceTypes, String)> {
        let types = self.analyze_file(path)?;
        let class_name = types
            .find_controller_class(key)
            .map(|t| t.name.clone())
            .ok_or_else(|| AtseError::ControllerClassNotFound {
                key: key.to_string(),
                path: path.to_path_buf(),
            })?;
        Ok((types, class_name))
    }
}

fn class_members(body: tree_sitter::Node, source: &[u8]) -> Vec<Member> {
    let mut members: Vec<Member> = Vec::new();
    let mut cursor = body.walk();

    for child in body.children(&mut cursor) {
        match child.kind() {
            "method_definition" | "abstract_method_signature" | "method_signature" => {
                let Some(name_node) = child.child_by_field_name("name") else {
                    continue;
                };
                let name = node_text(name_node, source).to_string();
                if name == "constructor" {
                    members.extend(parameter_properties(child, source));
                    continue;
                }

                let is_accessor = has_child_kind(child, "get") || has_child_kind(child, "set");
                let return_type = child
                    .child_by_field_name("return_type")
                    .map(|t| annotation_text(t, source));
                let (kind, type_name, detail) = if is_accessor {
                    (MemberKind::Accessor, return_type, None)
                } else {
                    let params = child
                        .child_by_field_name("parameters")
                        .map(|p| node_text(p, source).to_string())
                        .unwrap_or_else(|| "()".to_string());
                    let detail = match return_type {
                        Some(ret) => format!("{}: {}", params, ret),
                        None => params,
                    };
                    (MemberKind::Method, None, Some(detail))
                };

                push_unique(
                    &mut members,
                    Member {
                        scope: member_scope(child, name_node, source),
                        is_static: has_child_kind(child, "static"),
                        name,
                        kind,
                        type_name,
                        detail,
                    },
                );
            }
            "public_field_definition" | "field_definition" => {
                let Some(name_node) = child
                    .child_by_field_name("name")
                    .or_else(|| child.child_by_field_name("property"))
                else {
                    continue;
                };
                push_unique(
                    &mut members,
                    Member {
                        name: node_text(name_node, source).to_string(),
                        kind: MemberKind::Property,
                        scope: member_scope(child, name_node, source),
                        is_static: has_child_kind(child, "static"),
                        type_name: child
                            .child_by_field_name("type")
                            .map(|t| annotation_text(t, source)),
                        detail: None,
                    },
                );
            }
            _ => {}
        }
    }

    members
}

/// `constructor(public users: UsersService)` declares a property
fn parameter_properties(constructor: tree_sitter::Node, source: &[u8]) -> Vec<Member> {
    let Some(params) = constructor.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut properties = Vec::new();
    let mut cursor = params.walk();
    for param in params.children(&mut cursor) {
        if !matches!(param.kind(), "required_parameter" | "optional_parameter") {
            continue;
        }
        let mut inner = param.walk();
        let modifier = param
            .children(&mut inner)
            .find(|c| c.kind() == "accessibility_modifier")
            .map(|m| node_text(m, source).to_string());
        let is_readonly = has_child_kind(param, "readonly");
        if modifier.is_none() && !is_readonly {
            continue;
        }
        let Some(pattern) = param.child_by_field_name("pattern") else {
            continue;
        };
        properties.push(Member {
            name: node_text(pattern, source).to_string(),
            kind: MemberKind::Property,
            scope: modifier
                .as_deref()
                .map(Scope::from_modifier)
                .unwrap_or(Scope::Public),
            is_static: false,
            type_name: param
                .child_by_field_name("type")
                .map(|t| annotation_text(t, source)),
            detail: None,
        });
    }
    properties
}

fn interface_members(body: tree_sitter::Node, source: &[u8]) -> Vec<Member> {
    let mut members = Vec::new();
    let mut cursor = body.walk();
    for child in body.children(&mut cursor) {
        let Some(name_node) = child.child_by_field_name("name") else {
            continue;
        };
        let name = node_text(name_node, source).to_string();
        let member = match child.kind() {
            "property_signature" => Member {
                name,
                kind: MemberKind::Property,
                scope: Scope::Public,
                is_static: false,
                type_name: child
                    .child_by_field_name("type")
                    .map(|t| annotation_text(t, source)),
                detail: None,
            },
            "method_signature" => {
                let params = child
                    .child_by_field_name("parameters")
                    .map(|p| node_text(p, source).to_string())
                    .unwrap_or_else(|| "()".to_string());
                let detail = match child.child_by_field_name("return_type") {
                    Some(ret) => format!("{}: {}", params, annotation_text(ret, source)),
                    None => params,
                };
                Member {
                    name,
                    kind: MemberKind::Method,
                    scope: Scope::Public,
                    is_static: false,
                    type_name: None,
                    detail: Some(detail),
                }
            }
            _ => continue,
        };
        push_unique(&mut members, member);
    }
    members
}

fn member_scope(member: tree_sitter::Node, name: tree_sitter::Node, source: &[u8]) -> Scope {
    if name.kind() == "private_property_identifier" {
        return Scope::Private;
    }
    let mut cursor = member.walk();
    let modifier = member
        .children(&mut cursor)
        .find(|c| c.kind() == "accessibility_modifier")
        .map(|m| Scope::from_modifier(node_text(m, source)))
        .unwrap_or(Scope::Public);
    modifier
}

/// `: Foo` -> `Foo`
fn annotation_text(node: tree_sitter::Node, source: &[u8]) -> String {
    node_text(node, source)
        .trim_start()
        .trim_start_matches(':')
        .trim()
        .to_string()
}

/// Getter and setter of the same name are one member; a static and an
/// instance member of the same name are two
fn push_unique(members: &mut Vec<Member>, member: Member) {
    if !members
        .iter()
        .any(|m| m.name == member.name && m.is_static == member.is_static)
    {
        members.push(member);
    }
}
