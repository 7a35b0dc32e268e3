//! The default selector scope: exact package name lookup.

use async_trait::async_trait;

use crate::error::SelectionError;
use crate::selection::Selection;
use crate::workspace::WorkspaceGraph;

use super::{SelectorContext, SelectorParser};

pub struct NamedProjectSelectorParser;

#[async_trait]
impl SelectorParser for NamedProjectSelectorParser {
    async fn evaluate_selector(
        &self,
        unscoped_selector: &str,
        context: &SelectorContext<'_>,
    ) -> Result<Selection, SelectionError> {
        match context.graph.get_project_by_name(unscoped_selector) {
            Some(id) => Ok(Selection::single(id)),
            None => Err(SelectionError::SelectorNotFound {
                kind: "project name",
                value: unscoped_selector.to_string(),
                parameter: context.parameter_name.to_string(),
            }),
        }
    }

    fn completions(&self, graph: &WorkspaceGraph) -> Vec<String> {
        graph.projects().map(|p| p.package_name.clone()).collect()
    }
}
