//! Pure set-algebra operations over the workspace graph.
//!
//! All operations are deterministic for a given graph and input, never
//! mutate the graph, and map an empty input to an empty output. The
//! "no selection means everything" policy belongs to the caller, not here.

use std::collections::VecDeque;

use crate::workspace::{ProjectId, WorkspaceGraph};

use super::set::Selection;

/// Set union of any number of selections.
pub fn union<'a>(selections: impl IntoIterator<Item = &'a Selection>) -> Selection {
    let mut result = Selection::new();
    for selection in selections {
        for id in selection {
            result.insert(id);
        }
    }
    result
}

/// Projects directly referenced as dependencies by members of `selection`.
///
/// Members themselves are excluded unless also reachable as a dependency of
/// another member.
pub fn direct_dependencies_of(graph: &WorkspaceGraph, selection: &Selection) -> Selection {
    neighbors(graph, selection, Direction::Dependencies)
}

/// Projects that directly declare a member of `selection` as a dependency.
pub fn direct_consumers_of(graph: &WorkspaceGraph, selection: &Selection) -> Selection {
    neighbors(graph, selection, Direction::Consumers)
}

/// Transitive closure along dependency edges, including the original members.
pub fn expand_all_dependencies(graph: &WorkspaceGraph, selection: &Selection) -> Selection {
    closure(graph, selection, Direction::Dependencies)
}

/// Transitive closure along consumer (reverse) edges, including the original members.
pub fn expand_all_consumers(graph: &WorkspaceGraph, selection: &Selection) -> Selection {
    closure(graph, selection, Direction::Consumers)
}

#[derive(Clone, Copy)]
enum Direction {
    Dependencies,
    Consumers,
}

fn edges(graph: &WorkspaceGraph, id: ProjectId, direction: Direction) -> &[ProjectId] {
    let project = graph.project(id);
    match direction {
        Direction::Dependencies => &project.dependencies,
        Direction::Consumers => &project.consumers,
    }
}

fn neighbors(graph: &WorkspaceGraph, selection: &Selection, direction: Direction) -> Selection {
    let mut result = Selection::new();
    for id in selection {
        for &edge in edges(graph, id, direction) {
            result.insert(edge);
        }
    }
    result
}

/// Breadth-first fixpoint with a visited set, so dependency cycles terminate.
fn closure(graph: &WorkspaceGraph, selection: &Selection, direction: Direction) -> Selection {
    let mut result = Selection::new();
    let mut queue: VecDeque<ProjectId> = VecDeque::new();
    for id in selection {
        if result.insert(id) {
            queue.push_back(id);
        }
    }
    while let Some(id) = queue.pop_front() {
        for &edge in edges(graph, id, direction) {
            if result.insert(edge) {
                queue.push_back(edge);
            }
        }
    }
    result
}
