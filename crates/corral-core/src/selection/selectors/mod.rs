//! Selector parsers: scope-prefixed expressions resolved to project sets.
//!
//! A selector is written `scope:value` (for example `tag:infra` or
//! `git:origin/main`); a bare value uses the `name` scope. New selector
//! kinds are added by registering a parser for a new scope prefix, never by
//! modifying existing parsers.

mod git;
mod name;
mod tag;
mod version_policy;

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

use crate::error::SelectionError;
use crate::selection::Selection;
use crate::workspace::WorkspaceGraph;

pub use git::GitChangedProjectSelectorParser;
pub use name::NamedProjectSelectorParser;
pub use tag::TagProjectSelectorParser;
pub use version_policy::VersionPolicyProjectSelectorParser;

/// Shared evaluation inputs for selector parsers.
pub struct SelectorContext<'a> {
    pub graph: &'a WorkspaceGraph,
    /// Workspace root, used by parsers that inspect the repository.
    pub workspace_root: &'a Path,
    /// Directory the command was invoked from; resolves the `.` shorthand.
    pub current_dir: &'a Path,
    /// CLI parameter the selector was passed to, for error messages.
    pub parameter_name: &'a str,
}

/// One pluggable selector kind.
#[async_trait]
pub trait SelectorParser: Send + Sync {
    /// Resolve the unscoped selector value into a set of projects.
    async fn evaluate_selector(
        &self,
        unscoped_selector: &str,
        context: &SelectorContext<'_>,
    ) -> Result<Selection, SelectionError>;

    /// Candidate values for shell completion.
    fn completions(&self, graph: &WorkspaceGraph) -> Vec<String>;
}

/// Maps scope prefixes to parsers. Populated at process start.
pub struct SelectorRegistry {
    parsers: HashMap<&'static str, Box<dyn SelectorParser>>,
}

impl SelectorRegistry {
    /// Registry with the built-in scopes: `name`, `git`, `tag`, `version-policy`.
    pub fn with_default_parsers() -> Self {
        let mut registry = Self {
            parsers: HashMap::new(),
        };
        registry.register("name", Box::new(NamedProjectSelectorParser));
        registry.register("git", Box::new(GitChangedProjectSelectorParser));
        registry.register("tag", Box::new(TagProjectSelectorParser));
        registry.register("version-policy", Box::new(VersionPolicyProjectSelectorParser));
        registry
    }

    pub fn register(&mut self, scope: &'static str, parser: Box<dyn SelectorParser>) {
        self.parsers.insert(scope, parser);
    }

    /// Evaluate one raw selector, dispatching on its scope prefix.
    ///
    /// The special value `.` resolves to the project owning the current
    /// working directory, and fails when the directory is outside every
    /// project folder.
    pub async fn evaluate(
        &self,
        raw_selector: &str,
        context: &SelectorContext<'_>,
    ) -> Result<Selection, SelectionError> {
        if raw_selector == "." {
            return match context.graph.project_owning(context.current_dir) {
                Some(id) => Ok(Selection::single(id)),
                None => Err(SelectionError::NotInProject {
                    parameter: context.parameter_name.to_string(),
                }),
            };
        }

        let (scope, unscoped) = match raw_selector.split_once(':') {
            Some((scope, unscoped)) => (scope, unscoped),
            None => ("name", raw_selector),
        };

        let parser = self.parsers.get(scope).ok_or_else(|| {
            let mut supported: Vec<String> =
                self.parsers.keys().map(|s| format!("\"{s}:\"")).collect();
            supported.sort();
            SelectionError::UnsupportedSelector {
                scope: scope.to_string(),
                raw: raw_selector.to_string(),
                parameter: context.parameter_name.to_string(),
                supported: supported.join(", "),
            }
        })?;

        parser.evaluate_selector(unscoped, context).await
    }

    /// All completion candidates: `.`, scoped values, and bare project names.
    pub fn completions(&self, graph: &WorkspaceGraph) -> Vec<String> {
        let mut completions: Vec<String> = vec![".".to_string()];
        let mut scopes: Vec<&&'static str> = self.parsers.keys().collect();
        scopes.sort();
        for scope in scopes {
            if let Some(parser) = self.parsers.get(*scope) {
                for completion in parser.completions(graph) {
                    completions.push(format!("{scope}:{completion}"));
                }
            }
        }
        if let Some(name_parser) = self.parsers.get("name") {
            completions.extend(name_parser.completions(graph));
        }
        completions
    }
}
