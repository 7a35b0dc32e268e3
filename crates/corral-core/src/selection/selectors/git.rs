//! Selects the projects touched by a git change-set.
//!
//! `git:REF` resolves to every project whose folder contains a file that
//! changed relative to the merge base of `HEAD` and `REF`. Changes outside
//! any project folder are ignored, so an empty result is legitimate.

use async_trait::async_trait;

use crate::error::SelectionError;
use crate::git::GitDiffClient;
use crate::selection::Selection;
use crate::workspace::WorkspaceGraph;

use super::{SelectorContext, SelectorParser};

pub struct GitChangedProjectSelectorParser;

#[async_trait]
impl SelectorParser for GitChangedProjectSelectorParser {
    async fn evaluate_selector(
        &self,
        unscoped_selector: &str,
        context: &SelectorContext<'_>,
    ) -> Result<Selection, SelectionError> {
        let client = GitDiffClient::new(context.workspace_root.to_path_buf());
        let changed = client.changed_files(unscoped_selector).map_err(|error| {
            SelectionError::EvaluationFailed {
                raw: format!("git:{unscoped_selector}"),
                parameter: context.parameter_name.to_string(),
                details: format!("{error:#}"),
            }
        })?;

        let mut selection = Selection::new();
        for relative in changed {
            let absolute = context.workspace_root.join(relative);
            if let Some(id) = context.graph.project_owning(&absolute) {
                selection.insert(id);
            }
        }
        Ok(selection)
    }

    fn completions(&self, _graph: &WorkspaceGraph) -> Vec<String> {
        // Branch names are unbounded; completion is a no-op for this scope.
        Vec::new()
    }
}
