//! Dependency graph layout on top of `petgraph`.

use std::collections::{BTreeMap, HashMap};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use tracing::{debug, instrument};

use gas_core::{
    application::ports::DependencyGrapher,
    domain::{DomainError, GraphLayout, NameToDeps, ResourceId},
    error::GasResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Lays out resources by depth.
///
/// Edges point from dependent to dependency. A resource's layer is the length
/// of the longest dependency chain below it, so layer 0 holds resources
/// without internal dependencies.
#[derive(Debug, Clone, Copy, Default)]
pub struct PetgraphGrapher;

impl PetgraphGrapher {
    pub fn new() -> Self {
        Self
    }
}

impl DependencyGrapher for PetgraphGrapher {
    #[instrument(skip_all, fields(resources = deps.len()))]
    fn layout(&self, deps: &NameToDeps) -> GasResult<GraphLayout> {
        let graph = ResourceGraph::build(deps)?;

        if let Some(cycle) = graph.find_cycle() {
            return Err(DomainError::DependencyCycle { cycle }.into());
        }

        let layout = GraphLayout::new(graph.layers()?, graph.groups(), graph.roots());
        debug!(
            depth = layout.depth(),
            groups = layout.groups().len(),
            "laid out dependency graph"
        );
        Ok(layout)
    }
}

struct ResourceGraph {
    graph: DiGraph<ResourceId, ()>,
}

impl ResourceGraph {
    fn build(deps: &NameToDeps) -> Result<Self, DomainError> {
        let mut graph = DiGraph::with_capacity(deps.len(), deps.values().map(Vec::len).sum());
        let mut node_map: HashMap<&ResourceId, NodeIndex> = HashMap::with_capacity(deps.len());

        for id in deps.keys() {
            node_map.insert(id, graph.add_node(id.clone()));
        }

        for (id, dependencies) in deps {
            let from = node_map[id];
            for dependency in dependencies {
                let Some(&to) = node_map.get(dependency) else {
                    return Err(DomainError::UnknownDependency {
                        resource: id.to_string(),
                        dependency: dependency.to_string(),
                    });
                };
                if !graph.contains_edge(from, to) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        Ok(Self { graph })
    }

    /// First cycle found by a coloured DFS, closed by repeating its start.
    fn find_cycle(&self) -> Option<Vec<String>> {
        let mut colors = vec![Color::White; self.graph.node_count()];
        let mut path = Vec::new();

        for node in self.graph.node_indices() {
            if colors[node.index()] == Color::White {
                if let Some(cycle) = self.visit(node, &mut colors, &mut path) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    fn visit(
        &self,
        node: NodeIndex,
        colors: &mut [Color],
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<String>> {
        colors[node.index()] = Color::Gray;
        path.push(node);

        for neighbor in self.graph.neighbors(node) {
            match colors[neighbor.index()] {
                Color::Gray => {
                    let start = path.iter().position(|&n| n == neighbor).unwrap_or(0);
                    let mut cycle: Vec<String> = path[start..]
                        .iter()
                        .map(|&n| self.graph[n].to_string())
                        .collect();
                    cycle.push(self.graph[neighbor].to_string());
                    return Some(cycle);
                }
                Color::White => {
                    if let Some(cycle) = self.visit(neighbor, colors, path) {
                        return Some(cycle);
                    }
                }
                Color::Black => {}
            }
        }

        path.pop();
        colors[node.index()] = Color::Black;
        None
    }

    fn layers(&self) -> Result<Vec<Vec<ResourceId>>, DomainError> {
        let order = toposort(&self.graph, None).map_err(|cycle| DomainError::DependencyCycle {
            cycle: vec![self.graph[cycle.node_id()].to_string()],
        })?;

        // Reversed topological order visits dependencies before dependents.
        let mut layer_of = vec![0usize; self.graph.node_count()];
        for &node in order.iter().rev() {
            layer_of[node.index()] = self
                .graph
                .neighbors(node)
                .map(|dependency| layer_of[dependency.index()] + 1)
                .max()
                .unwrap_or(0);
        }

        let depth = layer_of.iter().max().map_or(0, |deepest| deepest + 1);
        let mut layers = vec![Vec::new(); depth];
        for node in self.graph.node_indices() {
            layers[layer_of[node.index()]].push(self.graph[node].clone());
        }
        Ok(layers)
    }

    fn groups(&self) -> Vec<Vec<ResourceId>> {
        let mut components = UnionFind::<usize>::new(self.graph.node_count());
        for edge in self.graph.raw_edges() {
            components.union(edge.source().index(), edge.target().index());
        }

        let mut groups: BTreeMap<usize, Vec<ResourceId>> = BTreeMap::new();
        for (index, label) in components.into_labeling().into_iter().enumerate() {
            groups
                .entry(label)
                .or_default()
                .push(self.graph[NodeIndex::new(index)].clone());
        }
        groups.into_values().collect()
    }

    fn roots(&self) -> Vec<ResourceId> {
        self.graph
            .node_indices()
            .filter(|&node| {
                self.graph
                    .neighbors_directed(node, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|node| self.graph[node].clone())
            .collect()
    }
}
