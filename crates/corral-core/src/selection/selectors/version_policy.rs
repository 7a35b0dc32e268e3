//! Selects every project governed by a named version policy.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::SelectionError;
use crate::selection::Selection;
use crate::workspace::WorkspaceGraph;

use super::{SelectorContext, SelectorParser};

pub struct VersionPolicyProjectSelectorParser;

#[async_trait]
impl SelectorParser for VersionPolicyProjectSelectorParser {
    async fn evaluate_selector(
        &self,
        unscoped_selector: &str,
        context: &SelectorContext<'_>,
    ) -> Result<Selection, SelectionError> {
        let selection: Selection = context
            .graph
            .ids()
            .filter(|&id| {
                context.graph.project(id).version_policy_name.as_deref() == Some(unscoped_selector)
            })
            .collect();

        if selection.is_empty() {
            return Err(SelectionError::SelectorNotFound {
                kind: "version policy",
                value: unscoped_selector.to_string(),
                parameter: context.parameter_name.to_string(),
            });
        }
        Ok(selection)
    }

    fn completions(&self, graph: &WorkspaceGraph) -> Vec<String> {
        let policies: BTreeSet<&str> = graph
            .projects()
            .filter_map(|p| p.version_policy_name.as_deref())
            .collect();
        policies.into_iter().map(str::to_string).collect()
    }
}
