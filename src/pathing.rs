use bit_set::BitSet;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::errors::*;
use crate::graph::{MazeGraph, MazeNode, NodeId};
use crate::priority_queue::IndexMinPriorityQueue;
use crate::utils::{fnv_hashmap, FnvHashMap};

/// Total cost reported when there is no route.
pub const NO_PATH_COST: f64 = -1.0;

/// Which weights a step contributes to the cost of a path.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CostMode {
    /// Every edge costs 1: plain hop count.
    None,
    /// Edge weights only.
    EdgesOnly,
    /// The weight of every node entered, plus the start node once.
    NodesOnly,
    /// Edge weight plus the weight of the node entered on every step, plus the start node once.
    Both,
}

impl CostMode {
    fn start_cost(self, start: &MazeNode) -> f64 {
        match self {
            CostMode::None | CostMode::EdgesOnly => 0.0,
            CostMode::NodesOnly | CostMode::Both => start.weight(),
        }
    }

    fn step_cost(self, edge_weight: f64, entered: &MazeNode) -> f64 {
        match self {
            CostMode::None => 1.0,
            CostMode::EdgesOnly => edge_weight,
            CostMode::NodesOnly => entered.weight(),
            CostMode::Both => edge_weight + entered.weight(),
        }
    }
}

impl FromStr for CostMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<CostMode> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(CostMode::None),
            "edges" | "edgesonly" => Ok(CostMode::EdgesOnly),
            "nodes" | "nodesonly" => Ok(CostMode::NodesOnly),
            "both" => Ok(CostMode::Both),
            _ => Err(ErrorKind::UnknownCostMode(s.to_string()).into()),
        }
    }
}

impl fmt::Display for CostMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            CostMode::None => "none",
            CostMode::EdgesOnly => "edges",
            CostMode::NodesOnly => "nodes",
            CostMode::Both => "both",
        };
        f.write_str(name)
    }
}

/// A route from start to end inclusive, or an empty path costing `NO_PATH_COST`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    pub path: Vec<NodeId>,
    pub cost: f64,
}

impl ShortestPath {
    pub fn unreachable() -> ShortestPath {
        ShortestPath {
            path: vec![],
            cost: NO_PATH_COST,
        }
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        !self.path.is_empty()
    }
}

pub fn find_shortest_path(graph: &MazeGraph,
                          start: NodeId,
                          end: NodeId,
                          mode: CostMode)
                          -> Result<ShortestPath> {
    find_shortest_path_where(graph, start, end, mode, |_| true)
}

/// Dijkstra from `start` to `end` over directed edges, pricing each step by `mode`.
///
/// Nodes failing `can_traverse` are treated as absent for this query, endpoints included.
/// Among equal cost routes the first one relaxed wins; callers should not rely on which.
/// Weights are assumed non-negative.
pub fn find_shortest_path_where<F>(graph: &MazeGraph,
                                   start: NodeId,
                                   end: NodeId,
                                   mode: CostMode,
                                   can_traverse: F)
                                   -> Result<ShortestPath>
    where F: Fn(&MazeNode) -> bool
{
    let start_node = graph.node(start)?;
    let end_node = graph.node(end)?;

    if !can_traverse(start_node) || !can_traverse(end_node) {
        return Ok(ShortestPath::unreachable());
    }
    let start_cost = mode.start_cost(start_node);
    if start == end {
        return Ok(ShortestPath {
            path: vec![start],
            cost: start_cost,
        });
    }

    let capacity = graph.id_bound();
    let mut cost_to: Vec<f64> = vec![f64::INFINITY; capacity];
    let mut came_from: Vec<Option<NodeId>> = vec![None; capacity];
    let mut settled = BitSet::with_capacity(capacity);
    let mut frontier = IndexMinPriorityQueue::new(capacity);

    cost_to[start.index()] = start_cost;
    frontier.insert(start.index(), start_cost)?;

    while !frontier.is_empty() {
        let index = frontier.delete_min()?;
        settled.insert(index);
        if index == end.index() {
            break;
        }

        let current = match graph.node_by_index(index) {
            Some(node) => node,
            None => continue,
        };
        for edge in current.edges() {
            let next = graph.node(edge.to())?;
            let next_index = next.id().index();
            if settled.contains(next_index) || !can_traverse(next) {
                continue;
            }

            let candidate = cost_to[index] + mode.step_cost(edge.weight(), next);
            if candidate < cost_to[next_index] {
                cost_to[next_index] = candidate;
                came_from[next_index] = Some(current.id());
                if frontier.contains(next_index) {
                    frontier.decrease_key(next_index, candidate)?;
                } else {
                    frontier.insert(next_index, candidate)?;
                }
            }
        }
    }

    if !settled.contains(end.index()) {
        debug!(%start, %end, %mode, "no path");
        return Ok(ShortestPath::unreachable());
    }

    let mut path = vec![end];
    let mut cursor = end;
    while let Some(previous) = came_from[cursor.index()] {
        path.push(previous);
        cursor = previous;
    }
    path.reverse();

    let cost = cost_to[end.index()];
    debug!(%start, %end, %mode, steps = path.len() - 1, cost, "found path");
    Ok(ShortestPath { path, cost })
}

/// Breadth first flood fill over edges: the number of steps from a start node to every node
/// reachable from it.
#[derive(Debug, Clone)]
pub struct Distances {
    start: NodeId,
    distances: FnvHashMap<NodeId, usize>,
    max_distance: usize,
}

impl Distances {
    pub fn new(graph: &MazeGraph, start: NodeId) -> Result<Distances> {
        graph.node(start)?;

        let mut distances = fnv_hashmap(graph.node_count());
        let mut max = 0;
        distances.insert(start, 0);

        // Every step costs one, so the first time a node is reached is the shortest; the map
        // doubles as the visited set.
        let mut frontier = vec![start];
        while !frontier.is_empty() {
            let mut new_frontier = vec![];
            for id in &frontier {
                let distance_to_node = distances[id];
                if distance_to_node > max {
                    max = distance_to_node;
                }

                for link in graph.node(*id)?.edges() {
                    if !distances.contains_key(&link.to()) {
                        distances.insert(link.to(), distance_to_node + 1);
                        new_frontier.push(link.to());
                    }
                }
            }
            frontier = new_frontier;
        }

        Ok(Distances {
            start,
            distances,
            max_distance: max,
        })
    }

    #[inline]
    pub fn start(&self) -> NodeId {
        self.start
    }

    #[inline]
    pub fn max(&self) -> usize {
        self.max_distance
    }

    #[inline]
    pub fn distance_from_start_to(&self, id: NodeId) -> Option<usize> {
        self.distances.get(&id).cloned()
    }

    pub fn reachable_count(&self) -> usize {
        self.distances.len()
    }

    /// Every node at the maximum distance, in id order.
    pub fn furthest_nodes(&self) -> Vec<NodeId> {
        let mut furthest = self.distances
            .iter()
            .filter(|&(_, distance)| *distance == self.max_distance)
            .map(|(id, _)| *id)
            .collect::<Vec<_>>();
        furthest.sort();
        furthest
    }
}

/// Steps along existing edges from `a` to `b`, `None` when `b` is unreachable.
pub fn edge_distance(graph: &MazeGraph, a: NodeId, b: NodeId) -> Result<Option<usize>> {
    graph.node(a)?;
    graph.node(b)?;
    if a == b {
        return Ok(Some(0));
    }

    let mut visited = BitSet::with_capacity(graph.id_bound());
    let mut queue = VecDeque::new();
    visited.insert(a.index());
    queue.push_back((a, 0));

    while let Some((id, distance)) = queue.pop_front() {
        for link in graph.node(id)?.edges() {
            let next = link.to();
            if next == b {
                return Ok(Some(distance + 1));
            }
            if visited.insert(next.index()) {
                queue.push_back((next, distance + 1));
            }
        }
    }
    Ok(None)
}

/// The longest shortest path in the part of the graph reachable from the root (or the first
/// node when there is no root), found by flooding twice.
///
/// Exact only for a perfect maze; with cycles you get a long path, not necessarily the longest.
pub fn longest_path(graph: &MazeGraph) -> Result<Vec<NodeId>> {
    let arbitrary_start = match graph.root().or_else(|| graph.node_ids().next()) {
        Some(id) => id,
        None => return Ok(vec![]),
    };

    let first_distances = Distances::new(graph, arbitrary_start)?;
    let long_path_start = first_distances.furthest_nodes()[0];
    let distances_from_start = Distances::new(graph, long_path_start)?;
    let end = distances_from_start.furthest_nodes()[0];

    Ok(find_shortest_path(graph, long_path_start, end, CostMode::None)?.path)
}
