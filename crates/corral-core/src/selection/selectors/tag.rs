//! Selects every project carrying a given tag.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::SelectionError;
use crate::selection::Selection;
use crate::workspace::WorkspaceGraph;

use super::{SelectorContext, SelectorParser};

pub struct TagProjectSelectorParser;

#[async_trait]
impl SelectorParser for TagProjectSelectorParser {
    async fn evaluate_selector(
        &self,
        unscoped_selector: &str,
        context: &SelectorContext<'_>,
    ) -> Result<Selection, SelectionError> {
        let selection: Selection = context
            .graph
            .ids()
            .filter(|&id| context.graph.project(id).tags.contains(unscoped_selector))
            .collect();

        // A tag that no project carries is a user error, not an empty result.
        if selection.is_empty() {
            return Err(SelectionError::SelectorNotFound {
                kind: "tag",
                value: unscoped_selector.to_string(),
                parameter: context.parameter_name.to_string(),
            });
        }
        Ok(selection)
    }

    fn completions(&self, graph: &WorkspaceGraph) -> Vec<String> {
        let tags: BTreeSet<&str> = graph
            .projects()
            .flat_map(|p| p.tags.iter().map(String::as_str))
            .collect();
        tags.into_iter().map(str::to_string).collect()
    }
}
