//! Core module for atse
//!
//! # Architecture
//!
//! - `models`: Configuration and the resolved `ProjectEnvironment`
//! - `error`: Error types using thiserror
//! - `walker`: Candidate discovery (`ProjectSource` trait) and path normalization
//! - `descriptor`: AngularApp and routes descriptor recognizers (tree-sitter + regex)
//! - `resolver`: `EnvironmentResolver`, the sequential scan producing the environment
//! - `mapper`: Controller <-> view path translation
//! - `navigator`: The "change view/controller" command
//! - `members`: Public members of controller classes
//! - `completion`: Alias-based completion inside view templates

pub mod models;
pub mod error;
pub mod walker;
pub mod descriptor;
pub mod resolver;
pub mod mapper;
pub mod navigator;
pub mod members;
pub mod completion;

// Re-export commonly used types
pub use models::{
    BasePaths, Config, ProjectEnvironment, ReadFailurePolicy, ScanStrategy, ScannedSource,
    SourceOutcome, CONFIG_FILE_NAME,
};
pub use error::{AtseError, Result, ResultExt};
pub use walker::{normalize_path, normalize_path_separators, CandidateFile, FsProjectSource, ProjectSource};
pub use descriptor::{MainDescriptor, PatternRecognizer, Recognized, Recognizer, RouteAlias, SyntaxRecognizer};
pub use resolver::EnvironmentResolver;
pub use mapper::{controller_stem, PathMapper, PathMapping};
pub use navigator::{DocumentKind, Navigator};
pub use members::{ControllerAnalyzer, Member, MemberKind, Scope, SourceTypes, TypeDefinition, TypeKind};
pub use completion::{CompletionContext, CompletionEngine, CompletionItem, TemplateCompletion};
