//! Finding places to knock extra holes in a perfect maze.
//!
//! A grown maze is a spanning tree: exactly one route between any two cells. Pairs of cells that
//! sit next to each other on the grid without an edge between them are candidate shortcuts.
//! Adding one closes a loop. Only pairs that are far apart along the maze are worth it, so each
//! candidate carries a distance measured either along the spine (parent links) or along the
//! current edges.
//!
//! Augmenting only adds edges. Parent links are left alone so the spine stays a tree.

use rand::seq::IteratorRandom;
use rand::Rng;
use tracing::debug;

use crate::coordinates::Direction;
use crate::errors::*;
use crate::graph::{MazeGraph, MazeNode, NodeId, DEFAULT_WEIGHT};
use crate::pathing::edge_distance;

/// How far apart two cells are considered to be.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DistanceMeasure {
    /// Steps up the parent links to the lowest common ancestor and back down.
    Parent,
    /// Breadth first search over the edges currently in the graph.
    Edge,
}

impl From<bool> for DistanceMeasure {
    /// `true` selects the parent (spine) distance.
    fn from(use_parent_distance: bool) -> DistanceMeasure {
        if use_parent_distance {
            DistanceMeasure::Parent
        } else {
            DistanceMeasure::Edge
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PotentialCycle {
    pub a: NodeId,
    pub b: NodeId,
    /// `None` when `b` cannot be reached from `a` with the chosen measure at all.
    pub distance: Option<usize>,
}

impl PotentialCycle {
    /// Unreachable pairs are further apart than any bound.
    #[inline]
    pub fn exceeds(&self, min_distance: usize) -> bool {
        self.distance.map_or(true, |d| d > min_distance)
    }
}

/// The candidate shortcuts of a graph. Nothing is computed until iterated, and every call to
/// `iter` starts over from the first node.
#[derive(Debug, Copy, Clone)]
pub struct PotentialCycles<'a> {
    graph: &'a MazeGraph,
    measure: DistanceMeasure,
}

pub fn potential_cycles(graph: &MazeGraph, measure: DistanceMeasure) -> PotentialCycles {
    PotentialCycles { graph, measure }
}

impl<'a> PotentialCycles<'a> {
    pub fn iter(&self) -> PotentialCyclesIter<'a> {
        PotentialCyclesIter {
            graph: self.graph,
            measure: self.measure,
            next_index: 0,
            next_direction: 0,
        }
    }

    /// Only the candidates whose distance is strictly more than `min_distance`.
    pub fn greater_than(&self, min_distance: usize) -> impl Iterator<Item = PotentialCycle> + 'a {
        self.iter().filter(move |candidate| candidate.exceeds(min_distance))
    }
}

impl<'a> IntoIterator for PotentialCycles<'a> {
    type Item = PotentialCycle;
    type IntoIter = PotentialCyclesIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, 'b> IntoIterator for &'b PotentialCycles<'a> {
    type Item = PotentialCycle;
    type IntoIter = PotentialCyclesIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Each unordered grid pair is visited once by only looking right and down.
const FORWARD_DIRECTIONS: [Direction; 2] = [Direction::Right, Direction::Down];

/// Walks the nodes in id order, yielding the unconnected right and down neighbours of each.
#[derive(Debug, Clone)]
pub struct PotentialCyclesIter<'a> {
    graph: &'a MazeGraph,
    measure: DistanceMeasure,
    next_index: usize,
    next_direction: usize,
}

impl<'a> PotentialCyclesIter<'a> {
    fn distance(&self, a: NodeId, b: NodeId) -> Option<usize> {
        // both ids were just read out of the graph so neither lookup can fail
        let distance = match self.measure {
            DistanceMeasure::Parent => self.graph.spine_distance(a, b),
            DistanceMeasure::Edge => edge_distance(self.graph, a, b),
        };
        distance.ok().and_then(|d| d)
    }

    fn candidate_from(&self, node: &MazeNode, direction: Direction) -> Option<PotentialCycle> {
        let neighbour = node.position()
            .offset(direction)
            .and_then(|position| self.graph.node_at_or_none(position))?;
        let (a, b) = (node.id(), neighbour.id());
        if self.graph.is_connected(a, b) {
            return None;
        }
        Some(PotentialCycle { a, b, distance: self.distance(a, b) })
    }
}

impl<'a> Iterator for PotentialCyclesIter<'a> {
    type Item = PotentialCycle;

    fn next(&mut self) -> Option<PotentialCycle> {
        while self.next_index < self.graph.id_bound() {
            let index = self.next_index;
            let direction = FORWARD_DIRECTIONS[self.next_direction];

            self.next_direction += 1;
            if self.next_direction == FORWARD_DIRECTIONS.len() {
                self.next_direction = 0;
                self.next_index += 1;
            }

            let candidate = self.graph
                .node_by_index(index)
                .and_then(|node| self.candidate_from(node, direction));
            if candidate.is_some() {
                return candidate;
            }
        }
        None
    }
}

/// Connects every candidate in both directions with the default weight. Parent links are not
/// touched. Returns the number of pairs connected.
///
/// The candidates usually borrow the graph, so collect them before calling this.
pub fn augment_cycles<I>(graph: &mut MazeGraph, candidates: I) -> Result<usize>
    where I: IntoIterator<Item = PotentialCycle>
{
    let mut connected = 0;
    for candidate in candidates {
        graph.connect_bidirectional(candidate.a, candidate.b, DEFAULT_WEIGHT)?;
        connected += 1;
    }
    debug!(connected, edges = graph.edge_count(), "cycles added");
    Ok(connected)
}

/// Picks up to `amount` candidates uniformly at random, for when adding every long shortcut
/// would make the maze too open. The order of the result is not specified.
pub fn choose_cycles<I, R>(candidates: I, amount: usize, rng: &mut R) -> Vec<PotentialCycle>
    where I: IntoIterator<Item = PotentialCycle>,
          R: Rng
{
    candidates.into_iter().choose_multiple(rng, amount)
}
