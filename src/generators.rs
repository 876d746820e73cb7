use error_chain::bail;
use rand::Rng;
use tracing::{debug, trace};

use crate::coordinates::{Direction, GridPosition};
use crate::errors::*;
use crate::graph::{MazeGraph, MazeNode, NodeId, DEFAULT_WEIGHT};

/// Chooses where the carver goes next from the free positions around the current node.
///
/// The choice must be one of `candidates`, which is never empty. The graph must not be touched
/// from inside `select`.
pub trait DirectionSelector {
    fn select(&mut self, current: &MazeNode, candidates: &[GridPosition]) -> GridPosition;
}

impl<F> DirectionSelector for F
    where F: FnMut(&MazeNode, &[GridPosition]) -> GridPosition
{
    fn select(&mut self, current: &MazeNode, candidates: &[GridPosition]) -> GridPosition {
        self(current, candidates)
    }
}

/// Uniformly random choice.
#[derive(Debug)]
pub struct RandomDirectionSelector<'r, R: Rng> {
    rng: &'r mut R,
}

impl<'r, R: Rng> RandomDirectionSelector<'r, R> {
    pub fn new(rng: &'r mut R) -> RandomDirectionSelector<'r, R> {
        RandomDirectionSelector { rng }
    }
}

impl<'r, R: Rng> DirectionSelector for RandomDirectionSelector<'r, R> {
    fn select(&mut self, _: &MazeNode, candidates: &[GridPosition]) -> GridPosition {
        candidates[self.rng.gen_range(0..candidates.len())]
    }
}

/// Keeps carving in the direction it arrived from with probability `straightness`, otherwise
/// picks uniformly. Higher values give longer corridors.
#[derive(Debug)]
pub struct CorridorSelector<'r, R: Rng> {
    rng: &'r mut R,
    straightness: f64,
    previous: Option<(GridPosition, Direction)>,
}

impl<'r, R: Rng> CorridorSelector<'r, R> {
    pub fn new(rng: &'r mut R, straightness: f64) -> CorridorSelector<'r, R> {
        CorridorSelector {
            rng,
            straightness: straightness.max(0.0).min(1.0),
            previous: None,
        }
    }
}

impl<'r, R: Rng> DirectionSelector for CorridorSelector<'r, R> {
    fn select(&mut self, current: &MazeNode, candidates: &[GridPosition]) -> GridPosition {
        let here = current.position();

        // The heading only carries over if we are standing where the last step landed,
        // not somewhere we backtracked to.
        let heading = self.previous
            .filter(|&(landed, _)| landed == here)
            .map(|(_, dir)| dir);
        let straight_on = heading.and_then(|dir| here.offset(dir))
            .filter(|ahead| candidates.contains(ahead));

        let chosen = match straight_on {
            Some(ahead) if self.rng.gen_bool(self.straightness) => ahead,
            _ => candidates[self.rng.gen_range(0..candidates.len())],
        };
        self.previous = chosen.checked_sub(here)
            .and_then(Direction::from_offset)
            .map(|dir| (chosen, dir));
        chosen
    }
}

/// Limits and strategy for `grow`.
#[derive(Debug)]
pub struct GrowthConstraints<S> {
    /// Growth stops once this many nodes have been carved, the root included. The root is
    /// always carved, so anything below 2 gives a lone root.
    pub max_total_cells: usize,
    pub direction_selector: S,
}

impl<S: DirectionSelector> GrowthConstraints<S> {
    /// Unlimited growth: carves everything reachable from the origin.
    pub fn new(direction_selector: S) -> GrowthConstraints<S> {
        GrowthConstraints {
            max_total_cells: usize::MAX,
            direction_selector,
        }
    }

    pub fn max_total_cells(mut self, max_total_cells: usize) -> GrowthConstraints<S> {
        self.max_total_cells = max_total_cells;
        self
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct GrowthReport {
    pub root: NodeId,
    pub cells_carved: usize,
}

/// Carves a spanning tree from `origin` by randomised depth first search with backtracking.
///
/// Each new node is connected to the current one in both directions and gets it as its spine
/// parent. When the current node has no free neighbours the carver walks up the spine to the
/// nearest node that does. Growth ends at `max_total_cells` or when the spine is exhausted.
/// The origin becomes the graph root; it must be a valid, unoccupied position.
pub fn grow<S>(graph: &mut MazeGraph,
               origin: GridPosition,
               constraints: &mut GrowthConstraints<S>)
               -> Result<GrowthReport>
    where S: DirectionSelector
{
    if !graph.is_valid_position(origin) || graph.has_node_at(origin) {
        bail!(ErrorKind::InvalidStart(origin));
    }

    let root = graph.create_node(origin, DEFAULT_WEIGHT)?;
    graph.set_root(Some(root))?;
    let mut cells_carved = 1;
    let mut current = root;

    while cells_carved < constraints.max_total_cells {
        let candidates = graph.valid_free_adjacent_positions(graph.node(current)?.position());
        if candidates.is_empty() {
            match backtrack(graph, current)? {
                Some(resume_from) => {
                    trace!(from = %current, to = %resume_from, "backtracked");
                    current = resume_from;
                    continue;
                }
                None => break,
            }
        }

        let chosen = constraints.direction_selector.select(graph.node(current)?, &candidates);
        if !candidates.contains(&chosen) {
            bail!(ErrorKind::InvalidSelection(chosen));
        }

        let next = graph.create_node(chosen, DEFAULT_WEIGHT)?;
        graph.connect_bidirectional(current, next, DEFAULT_WEIGHT)?;
        graph.set_parent(next, Some(current))?;
        trace!(from = %current, to = %next, position = %chosen, "carved");
        current = next;
        cells_carved += 1;
    }

    debug!(%origin, cells_carved, "growth finished");
    Ok(GrowthReport { root, cells_carved })
}

/// `grow` with a uniformly random selector drawing from `rng`.
pub fn grow_random<R: Rng>(graph: &mut MazeGraph,
                           origin: GridPosition,
                           max_cells: usize,
                           rng: &mut R)
                           -> Result<GrowthReport> {
    let mut constraints = GrowthConstraints::new(RandomDirectionSelector::new(rng))
        .max_total_cells(max_cells);
    grow(graph, origin, &mut constraints)
}

/// The nearest spine ancestor of `from` that still has a free neighbour.
fn backtrack(graph: &MazeGraph, from: NodeId) -> Result<Option<NodeId>> {
    for ancestor in graph.ancestors(from)? {
        let position = graph.node(ancestor)?.position();
        if !graph.valid_free_adjacent_positions(position).is_empty() {
            return Ok(Some(ancestor));
        }
    }
    Ok(None)
}
