//! Composition of the named selector-list parameters into one selection.
//!
//! This is the authoritative precedence rule of the whole tool. "Safe"
//! parameters (`--to`, `--to-except`, `--from`) always pull in the full
//! dependency closure so an install can never omit a needed dependency.
//! "Unsafe" parameters (`--only`, `--impacted-by`, `--impacted-by-except`)
//! deliberately skip that closure at the caller's risk.

use tracing::debug;

use crate::error::SelectionError;
use crate::selection::engine;
use crate::selection::selectors::{SelectorContext, SelectorRegistry};
use crate::selection::Selection;

pub const TO_PARAMETER: &str = "--to";
pub const TO_EXCEPT_PARAMETER: &str = "--to-except";
pub const FROM_PARAMETER: &str = "--from";
pub const ONLY_PARAMETER: &str = "--only";
pub const IMPACTED_BY_PARAMETER: &str = "--impacted-by";
pub const IMPACTED_BY_EXCEPT_PARAMETER: &str = "--impacted-by-except";
pub const TO_VERSION_POLICY_PARAMETER: &str = "--to-version-policy";
pub const FROM_VERSION_POLICY_PARAMETER: &str = "--from-version-policy";

/// Raw selector values for each selection parameter, as given on the
/// command line.
#[derive(Debug, Clone, Default)]
pub struct SelectionParameterSet {
    pub to: Vec<String>,
    pub to_except: Vec<String>,
    pub from: Vec<String>,
    pub only: Vec<String>,
    pub impacted_by: Vec<String>,
    pub impacted_by_except: Vec<String>,
    pub to_version_policy: Vec<String>,
    pub from_version_policy: Vec<String>,
}

/// The selection rendered as package-manager `--filter` arguments.
#[derive(Debug, Clone)]
pub struct FilterArguments {
    /// Filter arguments for ordinary workspace projects.
    pub arguments: Vec<String>,
    /// Filter arguments for the isolated split sub-workspace.
    pub split_workspace_arguments: Vec<String>,
    /// The resolved selection; `None` when no selection was specified
    /// (full install, no filtering needed).
    pub selected: Option<Selection>,
    /// Whether the selection touches any split-workspace project.
    pub has_split_workspace_selection: bool,
}

/// The six core selector lists after version-policy desugaring.
struct ResolvedSelectors {
    to: Vec<String>,
    to_except: Vec<String>,
    from: Vec<String>,
    only: Vec<String>,
    impacted_by: Vec<String>,
    impacted_by_except: Vec<String>,
}

impl SelectionParameterSet {
    /// Desugar `--to-version-policy P` into `--to version-policy:P` (and the
    /// `--from` equivalent), preserving order: explicit values first, then
    /// the rewritten policy selectors.
    fn resolved(&self) -> ResolvedSelectors {
        let mut to = self.to.clone();
        to.extend(
            self.to_version_policy
                .iter()
                .map(|policy| format!("version-policy:{policy}")),
        );
        let mut from = self.from.clone();
        from.extend(
            self.from_version_policy
                .iter()
                .map(|policy| format!("version-policy:{policy}")),
        );
        ResolvedSelectors {
            to,
            to_except: self.to_except.clone(),
            from,
            only: self.only.clone(),
            impacted_by: self.impacted_by.clone(),
            impacted_by_except: self.impacted_by_except.clone(),
        }
    }

    /// Whether any selection parameter has a value.
    pub fn is_selection_specified(&self) -> bool {
        let resolved = self.resolved();
        !(resolved.to.is_empty()
            && resolved.to_except.is_empty()
            && resolved.from.is_empty()
            && resolved.only.is_empty()
            && resolved.impacted_by.is_empty()
            && resolved.impacted_by_except.is_empty())
    }

    /// Compute the final selection.
    ///
    /// With no parameters specified, this is every project in the workspace.
    pub async fn get_selected_projects(
        &self,
        registry: &SelectorRegistry,
        context: &SelectorContext<'_>,
    ) -> Result<Selection, SelectionError> {
        if !self.is_selection_specified() {
            return Ok(context.graph.full_selection());
        }

        let resolved = self.resolved();

        // Each list is a pure read over the shared graph, so the lists are
        // evaluated concurrently and combined only after all complete.
        let (to_raw, to_except, from, only, impacted_by, impacted_by_except) = tokio::try_join!(
            evaluate_list(&resolved.to, TO_PARAMETER, registry, context),
            evaluate_list(&resolved.to_except, TO_EXCEPT_PARAMETER, registry, context),
            evaluate_list(&resolved.from, FROM_PARAMETER, registry, context),
            evaluate_list(&resolved.only, ONLY_PARAMETER, registry, context),
            evaluate_list(&resolved.impacted_by, IMPACTED_BY_PARAMETER, registry, context),
            evaluate_list(
                &resolved.impacted_by_except,
                IMPACTED_BY_EXCEPT_PARAMETER,
                registry,
                context,
            ),
        )?;

        let graph = context.graph;

        let safe_selection = engine::expand_all_dependencies(
            graph,
            &engine::union([
                &to_raw,
                &engine::direct_dependencies_of(graph, &to_except),
                &engine::expand_all_consumers(graph, &from),
            ]),
        );

        let impacted = engine::expand_all_consumers(
            graph,
            &engine::union([
                &impacted_by,
                &engine::direct_consumers_of(graph, &impacted_by_except),
            ]),
        );

        Ok(engine::union([&safe_selection, &only, &impacted]))
    }

    /// Render the selection as package-manager filter arguments.
    ///
    /// Without split-workspace projects the rendering relies on the package
    /// manager's ellipsis filters, which is more concise than enumerating
    /// the resolved selection. With split-workspace projects the selection
    /// is computed here and partitioned into two explicit filter lists; a
    /// list that would name every project of its partition is omitted.
    pub async fn get_filter_arguments(
        &self,
        registry: &SelectorRegistry,
        context: &SelectorContext<'_>,
    ) -> Result<FilterArguments, SelectionError> {
        let graph = context.graph;
        let mut arguments: Vec<String> = Vec::new();
        let mut split_workspace_arguments: Vec<String> = Vec::new();
        let mut has_split_workspace_selection = false;

        if graph.has_split_workspace_projects() {
            let selection = self.get_selected_projects(registry, context).await?;

            let mut ordinary = Selection::new();
            let mut split = Selection::new();
            for id in &selection {
                if graph.project(id).split_workspace {
                    has_split_workspace_selection = true;
                    split.insert(id);
                } else {
                    ordinary.insert(id);
                }
            }

            if ordinary.len() != graph.partition_len(false) {
                for id in &ordinary {
                    arguments.push("--filter".to_string());
                    arguments.push(graph.project(id).package_name.clone());
                }
            }
            if split.len() != graph.partition_len(true) {
                for id in &split {
                    split_workspace_arguments.push("--filter".to_string());
                    split_workspace_arguments.push(graph.project(id).package_name.clone());
                }
            }
        } else {
            let resolved = self.resolved();

            for id in &evaluate_list(&resolved.only, ONLY_PARAMETER, registry, context).await? {
                arguments.push("--filter".to_string());
                arguments.push(graph.project(id).package_name.clone());
            }

            let from = evaluate_list(&resolved.from, FROM_PARAMETER, registry, context).await?;
            let to = evaluate_list(&resolved.to, TO_PARAMETER, registry, context).await?;
            // `--from` means "everything that consumes it", and each of
            // those plus its dependencies; the consumer expansion happens
            // here, the dependency part in the filter syntax.
            for id in &engine::union([&to, &engine::expand_all_consumers(graph, &from)]) {
                arguments.push("--filter".to_string());
                arguments.push(format!("{}...", graph.project(id).package_name));
            }

            for id in
                &evaluate_list(&resolved.to_except, TO_EXCEPT_PARAMETER, registry, context).await?
            {
                arguments.push("--filter".to_string());
                arguments.push(format!("{}^...", graph.project(id).package_name));
            }

            for id in
                &evaluate_list(&resolved.impacted_by, IMPACTED_BY_PARAMETER, registry, context)
                    .await?
            {
                arguments.push("--filter".to_string());
                arguments.push(format!("...{}", graph.project(id).package_name));
            }

            for id in &evaluate_list(
                &resolved.impacted_by_except,
                IMPACTED_BY_EXCEPT_PARAMETER,
                registry,
                context,
            )
            .await?
            {
                arguments.push("--filter".to_string());
                arguments.push(format!("...^{}", graph.project(id).package_name));
            }
        }

        let selected = if self.is_selection_specified() {
            Some(self.get_selected_projects(registry, context).await?)
        } else {
            None
        };

        Ok(FilterArguments {
            arguments,
            split_workspace_arguments,
            selected,
            has_split_workspace_selection,
        })
    }

    /// Re-render the raw selector values as CLI arguments, for forwarding a
    /// selection to a nested invocation.
    pub fn to_arguments(&self) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();
        let lists: [(&str, &[String]); 6] = [
            (ONLY_PARAMETER, &self.only),
            (FROM_PARAMETER, &self.from),
            (TO_PARAMETER, &self.to),
            (TO_EXCEPT_PARAMETER, &self.to_except),
            (IMPACTED_BY_PARAMETER, &self.impacted_by),
            (IMPACTED_BY_EXCEPT_PARAMETER, &self.impacted_by_except),
        ];
        for (name, values) in lists {
            for value in values {
                args.push(name.to_string());
                args.push(value.clone());
            }
        }
        args
    }

    /// Log which selection parameters were used.
    pub fn log_usage(&self) {
        debug!(
            to = !self.to.is_empty(),
            to_except = !self.to_except.is_empty(),
            from = !self.from.is_empty(),
            only = !self.only.is_empty(),
            impacted_by = !self.impacted_by.is_empty(),
            impacted_by_except = !self.impacted_by_except.is_empty(),
            to_version_policy = !self.to_version_policy.is_empty(),
            from_version_policy = !self.from_version_policy.is_empty(),
            "selection parameters"
        );
    }
}

/// Union the referents of every raw selector in one parameter list.
async fn evaluate_list(
    values: &[String],
    parameter_name: &str,
    registry: &SelectorRegistry,
    context: &SelectorContext<'_>,
) -> Result<Selection, SelectionError> {
    let scoped = SelectorContext {
        graph: context.graph,
        workspace_root: context.workspace_root,
        current_dir: context.current_dir,
        parameter_name,
    };
    let mut selection = Selection::new();
    for raw in values {
        for id in &registry.evaluate(raw, &scoped).await? {
            selection.insert(id);
        }
    }
    Ok(selection)
}
