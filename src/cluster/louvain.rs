//! Louvain modularity optimisation
//!
//! Greedy local moves followed by graph coarsening, repeated until modularity
//! stops improving (Blondel et al., "Fast unfolding of communities in large
//! networks", 2008).
//!
//! All iteration follows node and edge insertion order, so identical input
//! always yields the identical partition.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::error::ClusterError;

/// Minimum modularity improvement for a pass or a level to count as progress
const MIN_GAIN: f64 = 1e-7;

/// A weighted undirected edge between two node keys
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}

impl Edge {
    pub fn new(from: usize, to: usize, weight: f64) -> Self {
        Self { from, to, weight }
    }
}

/// Weighted undirected graph over dense node indices.
///
/// Parallel edges are merged by adding their weights.
#[derive(Debug, Clone, Default)]
struct Graph {
    node_count: usize,
    edges: Vec<(usize, usize, f64)>,
    /// Per node: (neighbour, edge index)
    adjacency: Vec<Vec<(usize, usize)>>,
    edge_index: HashMap<(usize, usize), usize>,
}

impl Graph {
    fn new(node_count: usize) -> Self {
        Self {
            node_count,
            edges: Vec::new(),
            adjacency: vec![Vec::new(); node_count],
            edge_index: HashMap::new(),
        }
    }

    fn add_edge(&mut self, a: usize, b: usize, weight: f64) {
        let key = (a.min(b), a.max(b));
        if let Some(&index) = self.edge_index.get(&key) {
            self.edges[index].2 += weight;
            return;
        }
        let index = self.edges.len();
        self.edge_index.insert(key, index);
        self.edges.push((a, b, weight));
        self.adjacency[a].push((b, index));
        if a != b {
            self.adjacency[b].push((a, index));
        }
    }

    fn neighbours(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.adjacency[node]
            .iter()
            .map(move |&(neighbour, edge)| (neighbour, self.edges[edge].2))
    }

    /// Weighted degree; a self-loop counts twice
    fn degree(&self, node: usize) -> f64 {
        self.neighbours(node)
            .map(|(neighbour, weight)| if neighbour == node { weight * 2.0 } else { weight })
            .sum()
    }

    fn self_loop(&self, node: usize) -> f64 {
        self.edge_index
            .get(&(node, node))
            .map(|&index| self.edges[index].2)
            .unwrap_or(0.0)
    }

    /// Sum of edge weights, self-loops counted once
    fn size(&self) -> f64 {
        self.edges.iter().map(|&(_, _, weight)| weight).sum()
    }

    /// Coarsen the graph: one node per community, edges summed per community pair
    fn induced(&self, partition: &[usize]) -> Graph {
        let count = partition.iter().max().map_or(0, |max| max + 1);
        let mut graph = Graph::new(count);
        for &(a, b, weight) in &self.edges {
            graph.add_edge(partition[a], partition[b], weight);
        }
        graph
    }
}

/// Mutable state of one optimisation level
#[derive(Debug, Clone)]
struct Status {
    node_to_com: Vec<usize>,
    /// Internal weight per community
    internals: Vec<f64>,
    /// Total degree per community
    degrees: Vec<f64>,
    node_degrees: Vec<f64>,
    loops: Vec<f64>,
    total_weight: f64,
}

impl Status {
    fn empty(graph: &Graph) -> Self {
        let n = graph.node_count;
        Self {
            node_to_com: vec![0; n],
            internals: vec![0.0; n],
            degrees: vec![0.0; n],
            node_degrees: (0..n).map(|node| graph.degree(node)).collect(),
            loops: (0..n).map(|node| graph.self_loop(node)).collect(),
            total_weight: graph.size(),
        }
    }

    fn singletons(graph: &Graph) -> Self {
        let mut status = Self::empty(graph);
        for node in 0..graph.node_count {
            status.node_to_com[node] = node;
            status.degrees[node] = status.node_degrees[node];
            status.internals[node] = status.loops[node];
        }
        status
    }

    /// Seed from a partition whose community ids are all below the node count
    fn from_partition(graph: &Graph, partition: &[usize]) -> Self {
        let mut status = Self::empty(graph);
        for node in 0..graph.node_count {
            let com = partition[node];
            status.node_to_com[node] = com;
            status.degrees[com] += status.node_degrees[node];
            let internal: f64 = graph
                .neighbours(node)
                .filter(|&(neighbour, _)| partition[neighbour] == com)
                .map(|(neighbour, weight)| if neighbour == node { weight } else { weight / 2.0 })
                .sum();
            status.internals[com] += internal;
        }
        status
    }

    fn modularity(&self) -> f64 {
        let links = self.total_weight;
        if links <= 0.0 {
            return 0.0;
        }
        let mut seen = vec![false; self.degrees.len()];
        let mut result = 0.0;
        for &com in &self.node_to_com {
            if std::mem::replace(&mut seen[com], true) {
                continue;
            }
            result += self.internals[com] / links - (self.degrees[com] / (2.0 * links)).powi(2);
        }
        result
    }

    /// Edge weight from `node` to each neighbouring community, in first-seen order
    fn neighbour_communities(&self, node: usize, graph: &Graph) -> Vec<(usize, f64)> {
        let mut weights: Vec<(usize, f64)> = Vec::new();
        for (neighbour, weight) in graph.neighbours(node) {
            if neighbour == node {
                continue;
            }
            let com = self.node_to_com[neighbour];
            match weights.iter_mut().find(|(c, _)| *c == com) {
                Some(entry) => entry.1 += weight,
                None => weights.push((com, weight)),
            }
        }
        weights
    }

    fn remove(&mut self, node: usize, com: usize, weight: f64) {
        self.degrees[com] -= self.node_degrees[node];
        self.internals[com] -= weight + self.loops[node];
    }

    fn insert(&mut self, node: usize, com: usize, weight: f64) {
        self.node_to_com[node] = com;
        self.degrees[com] += self.node_degrees[node];
        self.internals[com] += weight + self.loops[node];
    }
}

/// Run local moves until a pass changes nothing or stops paying off
fn one_level(graph: &Graph, status: &mut Status) {
    let mut current = status.modularity();
    loop {
        let mut modified = false;
        for node in 0..graph.node_count {
            let com_node = status.node_to_com[node];
            let degc_totw = status.node_degrees[node] / (status.total_weight * 2.0);
            let neighbours = status.neighbour_communities(node, graph);
            let weight_to = |com: usize| {
                neighbours
                    .iter()
                    .find(|(c, _)| *c == com)
                    .map_or(0.0, |&(_, weight)| weight)
            };

            status.remove(node, com_node, weight_to(com_node));

            let mut best_com = com_node;
            let mut best_increase = 0.0;
            for &(com, weight) in &neighbours {
                let increase = weight - status.degrees[com] * degc_totw;
                if increase > best_increase {
                    best_increase = increase;
                    best_com = com;
                }
            }

            status.insert(node, best_com, weight_to(best_com));
            if best_com != com_node {
                modified = true;
            }
        }

        let new = status.modularity();
        if !modified || new - current < MIN_GAIN {
            break;
        }
        current = new;
    }
}

/// Relabel communities densely from zero in first-seen order
fn renumber(communities: &[usize]) -> Vec<usize> {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    communities
        .iter()
        .map(|&com| {
            let next = mapping.len();
            *mapping.entry(com).or_insert(next)
        })
        .collect()
}

/// Final assignment of every node to a community
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    nodes: Vec<usize>,
    communities: Vec<usize>,
}

impl Partition {
    pub fn new(nodes: Vec<usize>, communities: Vec<usize>) -> Self {
        debug_assert_eq!(nodes.len(), communities.len());
        Self { nodes, communities }
    }

    /// Node keys in insertion order
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// Community ids aligned with [`Partition::nodes`]
    pub fn communities(&self) -> &[usize] {
        &self.communities
    }

    pub fn community_of(&self, node: usize) -> Option<usize> {
        self.nodes
            .iter()
            .position(|&n| n == node)
            .map(|index| self.communities[index])
    }

    pub fn community_count(&self) -> usize {
        let mut ids = self.communities.clone();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes.iter().copied().zip(self.communities.iter().copied())
    }
}

/// Partitions produced at each coarsening level.
///
/// Level 0 maps original nodes to communities; each later level maps the
/// previous level's communities to coarser ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dendrogram {
    nodes: Vec<usize>,
    levels: Vec<Vec<usize>>,
}

impl Dendrogram {
    pub fn levels(&self) -> &[Vec<usize>] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Compose levels `0..=level` into an original node -> community mapping
    pub fn partition_at_level(&self, level: usize) -> Partition {
        let mut communities = self.levels.first().cloned().unwrap_or_default();
        let last = level.min(self.levels.len().saturating_sub(1));
        for mapping in self.levels.iter().take(last + 1).skip(1) {
            for com in communities.iter_mut() {
                *com = mapping[*com];
            }
        }
        Partition::new(self.nodes.clone(), communities)
    }

    /// The partition at the top of the dendrogram
    pub fn best_partition(&self) -> Partition {
        self.partition_at_level(self.levels.len().saturating_sub(1))
    }
}

/// Louvain community detection.
///
/// # Example
///
/// ```rust
/// use narrative_layout::cluster::{Edge, Louvain};
///
/// let partition = Louvain::new()
///     .with_nodes(0..4)
///     .with_edges(vec![Edge::new(0, 1, 1.0), Edge::new(2, 3, 1.0)])
///     .unwrap()
///     .run();
///
/// assert_eq!(partition.community_count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Louvain {
    nodes: Option<Vec<usize>>,
    index: HashMap<usize, usize>,
    graph: Option<Graph>,
    initial: Option<Vec<usize>>,
}

impl Louvain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the node set. Duplicate keys collapse; edges and hints are reset.
    pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = usize>) -> Self {
        let mut list = Vec::new();
        self.index.clear();
        for node in nodes {
            if !self.index.contains_key(&node) {
                self.index.insert(node, list.len());
                list.push(node);
            }
        }
        self.nodes = Some(list);
        self.graph = None;
        self.initial = None;
        self
    }

    /// Set the weighted edges. Nodes must already be set.
    pub fn with_edges(mut self, edges: impl IntoIterator<Item = Edge>) -> Result<Self, ClusterError> {
        let node_count = self.nodes.as_ref().ok_or(ClusterError::MissingNodes)?.len();
        let mut graph = Graph::new(node_count);
        for edge in edges {
            if !(edge.weight.is_finite() && edge.weight > 0.0) {
                return Err(ClusterError::non_positive(edge.from, edge.to, edge.weight));
            }
            let a = self.lookup(edge.from)?;
            let b = self.lookup(edge.to)?;
            graph.add_edge(a, b, edge.weight);
        }
        self.graph = Some(graph);
        Ok(self)
    }

    /// Seed the first level with `(node, community)` hints.
    ///
    /// Nodes without a hint start as singletons.
    pub fn with_initial_partition(
        mut self,
        hints: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self, ClusterError> {
        let node_count = self.nodes.as_ref().ok_or(ClusterError::MissingNodes)?.len();
        let mut hinted: Vec<Option<usize>> = vec![None; node_count];
        for (node, com) in hints {
            hinted[self.lookup(node)?] = Some(com);
        }
        // Hinted and singleton keys share one dense id space
        let keys: Vec<(bool, usize)> = hinted
            .iter()
            .enumerate()
            .map(|(index, hint)| match hint {
                Some(com) => (true, *com),
                None => (false, index),
            })
            .collect();
        let mut mapping: HashMap<(bool, usize), usize> = HashMap::new();
        let partition = keys
            .iter()
            .map(|key| {
                let next = mapping.len();
                *mapping.entry(*key).or_insert(next)
            })
            .collect();
        self.initial = Some(partition);
        Ok(self)
    }

    fn lookup(&self, node: usize) -> Result<usize, ClusterError> {
        self.index
            .get(&node)
            .copied()
            .ok_or(ClusterError::UnknownNode { node })
    }

    pub fn nodes(&self) -> &[usize] {
        self.nodes.as_deref().unwrap_or(&[])
    }

    /// Compute every level of the community hierarchy
    pub fn dendrogram(&self) -> Dendrogram {
        let nodes = self.nodes().to_vec();
        let n = nodes.len();
        let graph = match &self.graph {
            Some(graph) if !graph.edges.is_empty() => graph,
            _ => {
                return Dendrogram {
                    nodes,
                    levels: vec![(0..n).collect()],
                }
            }
        };

        let mut status = match &self.initial {
            Some(partition) => Status::from_partition(graph, partition),
            None => Status::singletons(graph),
        };
        one_level(graph, &mut status);
        let mut modularity = status.modularity();
        let partition = renumber(&status.node_to_com);
        let mut current = graph.induced(&partition);
        let mut levels = vec![partition];
        trace!(level = 0, modularity, communities = current.node_count, "louvain level");

        loop {
            let mut status = Status::singletons(&current);
            one_level(&current, &mut status);
            let new_modularity = status.modularity();
            if new_modularity - modularity < MIN_GAIN {
                break;
            }
            let partition = renumber(&status.node_to_com);
            current = current.induced(&partition);
            levels.push(partition);
            modularity = new_modularity;
            trace!(level = levels.len() - 1, modularity, communities = current.node_count, "louvain level");
        }

        debug!(
            nodes = n,
            levels = levels.len(),
            communities = current.node_count,
            modularity,
            "louvain converged"
        );
        Dendrogram { nodes, levels }
    }

    /// Run the full algorithm and flatten the dendrogram
    pub fn run(&self) -> Partition {
        self.dendrogram().best_partition()
    }

    /// Modularity of an arbitrary partition of this graph.
    ///
    /// Nodes missing from `partition` count as singletons.
    pub fn modularity(&self, partition: &Partition) -> f64 {
        let Some(graph) = &self.graph else {
            return 0.0;
        };
        let keys: Vec<(bool, usize)> = self
            .nodes()
            .iter()
            .enumerate()
            .map(|(index, &node)| match partition.community_of(node) {
                Some(com) => (true, com),
                None => (false, index),
            })
            .collect();
        let mut mapping: HashMap<(bool, usize), usize> = HashMap::new();
        let dense: Vec<usize> = keys
            .iter()
            .map(|key| {
                let next = mapping.len();
                *mapping.entry(*key).or_insert(next)
            })
            .collect();
        Status::from_partition(graph, &dense).modularity()
    }
}
