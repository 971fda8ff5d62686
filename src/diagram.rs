//! State-graph snapshots for visualization.
//!
//! [`Solver::graph`] copies the explored graph into a
//! [`petgraph::graph::DiGraph`] whose edges carry input labels;
//! [`to_dot`]/[`write_dot`] turn it into graphviz dot with each node styled
//! by its last-computed [`Progress`].

use std::collections::HashMap;

use petgraph::graph::DiGraph;

use crate::game::{Game, Progress};
use crate::solver::Solver;

/// Node weight in a solver graph snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhostNode {
    /// Debug rendering of the configuration.
    pub label: String,
    /// Classification at snapshot time.
    pub progress: Progress,
}

impl std::fmt::Display for GhostNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

impl<G: Game> Solver<G> {
    /// Snapshot the explored graph. Call after
    /// [`Solver::calc_view_state`] if the progress styling should be
    /// meaningful.
    pub fn graph(&self) -> DiGraph<GhostNode, usize> {
        let mut graph = DiGraph::new();
        let mut index_of = HashMap::new();
        for state in self.states() {
            let node = GhostNode {
                label: format!("{state:?}"),
                progress: self.progress(state).unwrap_or(Progress::DeadEnd),
            };
            index_of.insert(state, graph.add_node(node));
        }
        for (from, input, to) in self.edges() {
            if let (Some(&from), Some(&to)) = (index_of.get(from), index_of.get(to)) {
                graph.add_edge(from, to, input);
            }
        }
        graph
    }
}

/// Render a snapshot as graphviz dot, goal path highlighted.
pub fn to_dot(graph: &DiGraph<GhostNode, usize>) -> String {
    use petgraph::dot::Dot;

    let dot = format!(
        "{}",
        Dot::with_attr_getters(
            graph,
            &[],
            &|_, _| "fontcolor = \"#777777\" color = \"#777777\" ".to_string(),
            &|_, (_, node)| {
                let color = match node.progress {
                    Progress::Goal => "#ffcc33",
                    Progress::InProcess => "#cccccc",
                    Progress::DeadEnd => "#555555",
                };
                format!("fontcolor = \"{color}\" color = \"{color}\" ")
            }
        )
    );
    dot.replace("digraph {", "digraph {\n    bgcolor=\"#131313\" ")
}

/// Write a snapshot to a dot file.
pub fn write_dot(filename: &str, graph: &DiGraph<GhostNode, usize>) -> std::io::Result<()> {
    std::fs::write(filename, to_dot(graph))
}
