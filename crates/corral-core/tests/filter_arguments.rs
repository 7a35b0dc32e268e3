//! Tests for rendering selections as package-manager filter arguments.

mod support;

use std::path::Path;

use corral_core::selection::selectors::{SelectorContext, SelectorRegistry};
use corral_core::selection::{FilterArguments, SelectionParameterSet};
use corral_core::workspace::WorkspaceGraph;

use support::{graph_of, seed};

fn context<'a>(graph: &'a WorkspaceGraph) -> SelectorContext<'a> {
    SelectorContext {
        graph,
        workspace_root: Path::new("/ws"),
        current_dir: Path::new("/ws"),
        parameter_name: "",
    }
}

async fn filters(graph: &WorkspaceGraph, parameters: SelectionParameterSet) -> FilterArguments {
    let registry = SelectorRegistry::with_default_parsers();
    parameters
        .get_filter_arguments(&registry, &context(graph))
        .await
        .unwrap()
}

#[tokio::test]
async fn to_renders_package_with_dependencies_syntax() {
    let graph = graph_of(&[("a", &["b"]), ("b", &[])]);
    let parameters = SelectionParameterSet {
        to: vec!["a".into()],
        ..Default::default()
    };
    let result = filters(&graph, parameters).await;
    assert_eq!(result.arguments, ["--filter", "a..."]);
    assert!(result.split_workspace_arguments.is_empty());
}

#[tokio::test]
async fn only_renders_the_bare_package_name() {
    let graph = graph_of(&[("a", &["b"]), ("b", &[])]);
    let parameters = SelectionParameterSet {
        only: vec!["b".into()],
        ..Default::default()
    };
    let result = filters(&graph, parameters).await;
    assert_eq!(result.arguments, ["--filter", "b"]);
}

#[tokio::test]
async fn to_except_renders_dependencies_only_syntax() {
    let graph = graph_of(&[("a", &["b"]), ("b", &[])]);
    let parameters = SelectionParameterSet {
        to_except: vec!["a".into()],
        ..Default::default()
    };
    let result = filters(&graph, parameters).await;
    assert_eq!(result.arguments, ["--filter", "a^..."]);
}

#[tokio::test]
async fn impacted_by_renders_consumer_syntax() {
    let graph = graph_of(&[("a", &["b"]), ("b", &[])]);

    let result = filters(
        &graph,
        SelectionParameterSet {
            impacted_by: vec!["b".into()],
            ..Default::default()
        },
    )
    .await;
    assert_eq!(result.arguments, ["--filter", "...b"]);

    let except = filters(
        &graph,
        SelectionParameterSet {
            impacted_by_except: vec!["b".into()],
            ..Default::default()
        },
    )
    .await;
    assert_eq!(except.arguments, ["--filter", "...^b"]);
}

#[tokio::test]
async fn from_expands_consumers_before_rendering() {
    // b's consumers are {a, b}; each renders as "name...".
    let graph = graph_of(&[("a", &["b"]), ("b", &[]), ("c", &[])]);
    let parameters = SelectionParameterSet {
        from: vec!["b".into()],
        ..Default::default()
    };
    let result = filters(&graph, parameters).await;
    assert_eq!(result.arguments, ["--filter", "a...", "--filter", "b..."]);
}

#[tokio::test]
async fn no_selection_means_no_filters() {
    let graph = graph_of(&[("a", &[]), ("b", &[])]);
    let result = filters(&graph, SelectionParameterSet::default()).await;
    assert!(result.arguments.is_empty());
    assert!(result.selected.is_none());
}

#[tokio::test]
async fn selection_is_reported_when_specified() {
    let graph = graph_of(&[("a", &["b"]), ("b", &[])]);
    let parameters = SelectionParameterSet {
        to: vec!["a".into()],
        ..Default::default()
    };
    let result = filters(&graph, parameters).await;
    let selected = result.selected.expect("selection was specified");
    assert_eq!(selected.names(&graph), ["a", "b"]);
}

/// ordinary: app -> lib; split: legacy-app -> legacy-lib
fn split_workspace() -> WorkspaceGraph {
    let mut seeds = vec![
        seed("app", &["lib"]),
        seed("lib", &[]),
        seed("legacy-app", &["legacy-lib"]),
        seed("legacy-lib", &[]),
    ];
    seeds[2].split_workspace = true;
    seeds[3].split_workspace = true;
    support::graph(seeds)
}

#[tokio::test]
async fn split_workspace_partitions_into_explicit_filter_lists() {
    let graph = split_workspace();
    let parameters = SelectionParameterSet {
        to: vec!["legacy-lib".into()],
        ..Default::default()
    };
    let result = filters(&graph, parameters).await;

    // The ellipsis syntax is never used with a split workspace; the partial
    // split selection is enumerated explicitly.
    assert!(result.arguments.is_empty());
    assert_eq!(result.split_workspace_arguments, ["--filter", "legacy-lib"]);
    assert!(result.has_split_workspace_selection);
}

#[tokio::test]
async fn fully_selected_split_partition_needs_no_filter() {
    let graph = split_workspace();
    // legacy-app plus its dependency covers the whole split partition.
    let parameters = SelectionParameterSet {
        to: vec!["legacy-app".into()],
        ..Default::default()
    };
    let result = filters(&graph, parameters).await;

    assert!(result.arguments.is_empty());
    assert!(result.split_workspace_arguments.is_empty());
    assert!(result.has_split_workspace_selection);
}

#[tokio::test]
async fn full_partition_selection_omits_its_filter_list() {
    let graph = split_workspace();
    // Selects both ordinary projects (the whole ordinary partition) and one
    // split project.
    let parameters = SelectionParameterSet {
        to: vec!["app".into(), "legacy-lib".into()],
        ..Default::default()
    };
    let result = filters(&graph, parameters).await;

    // The ordinary partition is fully selected, so its list is omitted.
    assert!(result.arguments.is_empty());
    assert_eq!(result.split_workspace_arguments, ["--filter", "legacy-lib"]);
    assert!(result.has_split_workspace_selection);
}

#[tokio::test]
async fn split_workspace_selection_flag_is_false_without_split_projects() {
    let graph = split_workspace();
    let parameters = SelectionParameterSet {
        to: vec!["lib".into()],
        ..Default::default()
    };
    let result = filters(&graph, parameters).await;
    assert!(!result.has_split_workspace_selection);
    assert_eq!(result.arguments, ["--filter", "lib"]);
    assert!(result.split_workspace_arguments.is_empty());
}
