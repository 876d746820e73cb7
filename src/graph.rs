//! The maze graph: an arena of nodes over integer grid positions.
//!
//! Two independent relations live over the one arena. Directed edges, cached per cardinal
//! direction on each node, form the traversal graph which may contain cycles. `parent` links form
//! the spine, a spanning tree used for hierarchy queries. Adding an edge never touches the spine.

use error_chain::bail;
use smallvec::SmallVec;
use std::any::Any;
use std::fmt;
use std::iter;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::trace;

use crate::coordinates::{Direction, GridPosition, PositionSmallVec};
use crate::errors::*;
use crate::masks::BinaryMask2D;
use crate::units::{Height, Width};
use crate::utils::{fnv_hashmap, FnvHashMap};

pub const DEFAULT_WEIGHT: f64 = 1.0;

// Upper bound on what `MazeGraph::new` reserves up front. Nodes are sparse over the bounds.
const INITIAL_CAPACITY_LIMIT: usize = 1024;

// Distinguishes the ids of one graph instance from another's.
static NEXT_GRAPH_STAMP: AtomicU32 = AtomicU32::new(0);

/// Handle to a node in a `MazeGraph`.
///
/// The index is sequential from 0 in creation order and never reused by the same graph, even
/// after the node is removed. Handles from another graph are rejected rather than aliased.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct NodeId {
    stamp: u32,
    index: usize,
}

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// A directed edge. Connecting two nodes both ways takes two of these.
#[derive(Debug, Clone)]
pub struct MazeEdge {
    from: NodeId,
    to: NodeId,
    direction: GridPosition,
    weight: f64,
    metadata: Option<Rc<dyn Any>>,
}

impl MazeEdge {
    #[inline]
    pub fn from(&self) -> NodeId {
        self.from
    }

    #[inline]
    pub fn to(&self) -> NodeId {
        self.to
    }

    /// `to.position - from.position`
    #[inline]
    pub fn direction(&self) -> GridPosition {
        self.direction
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn metadata(&self) -> Option<&dyn Any> {
        self.metadata.as_deref()
    }

    pub fn metadata_as<T: Any>(&self) -> Option<&T> {
        self.metadata().and_then(|data| data.downcast_ref::<T>())
    }
}

#[derive(Debug, Clone)]
pub struct MazeNode {
    id: NodeId,
    position: GridPosition,
    weight: f64,
    parent: Option<NodeId>,
    // indexed by `Direction::slot`
    directional: [Option<MazeEdge>; 4],
    // edges whose direction is not a unit cardinal step
    other_edges: SmallVec<[MazeEdge; 2]>,
}

impl MazeNode {
    fn new(id: NodeId, position: GridPosition, weight: f64) -> MazeNode {
        MazeNode {
            id,
            position,
            weight,
            parent: None,
            directional: [None, None, None, None],
            other_edges: SmallVec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn position(&self) -> GridPosition {
        self.position
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// The spine parent, if any. Not an edge: it says nothing about traversability.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The outgoing edge cached for a cardinal direction.
    #[inline]
    pub fn edge(&self, direction: Direction) -> Option<&MazeEdge> {
        self.directional[direction.slot()].as_ref()
    }

    /// All outgoing edges: the cardinal slots in `Direction::ALL` order, then any others.
    pub fn edges(&self) -> impl Iterator<Item = &MazeEdge> {
        self.directional.iter().flatten().chain(self.other_edges.iter())
    }

    pub fn edge_to(&self, target: NodeId) -> Option<&MazeEdge> {
        self.edges().find(|edge| edge.to == target)
    }

    #[inline]
    pub fn has_edge_to(&self, target: NodeId) -> bool {
        self.edge_to(target).is_some()
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    fn attach(&mut self, edge: MazeEdge) {
        match Direction::from_offset(edge.direction) {
            Some(dir) => self.directional[dir.slot()] = Some(edge),
            None => {
                if let Some(existing) = self.other_edges.iter_mut().find(|e| e.to == edge.to) {
                    *existing = edge;
                } else {
                    self.other_edges.push(edge);
                }
            }
        }
    }

    /// Drops any edge to `target`, returning whether there was one.
    fn detach(&mut self, target: NodeId) -> bool {
        let mut detached = false;
        for slot in self.directional.iter_mut() {
            if slot.as_ref().map_or(false, |edge| edge.to == target) {
                *slot = None;
                detached = true;
            }
        }
        let before = self.other_edges.len();
        self.other_edges.retain(|edge| edge.to != target);
        detached || self.other_edges.len() != before
    }
}

/// Clones share the original's stamp, so ids taken from one are valid in the other.
#[derive(Clone)]
pub struct MazeGraph {
    stamp: u32,
    width: usize,
    height: usize,
    mask: Option<BinaryMask2D>,
    // slot `i` holds the node with index `i`, `None` once removed
    nodes: Vec<Option<MazeNode>>,
    by_position: FnvHashMap<GridPosition, usize>,
    node_count: usize,
    root: Option<NodeId>,
}

impl fmt::Debug for MazeGraph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "MazeGraph :: width: {}, height: {}, nodes: {}, edges: {}, root: {:?}",
               self.width,
               self.height,
               self.node_count,
               self.edge_count(),
               self.root)
    }
}

impl MazeGraph {
    pub fn new(width: Width, height: Height) -> MazeGraph {
        let (Width(w), Height(h)) = (width, height);
        let capacity = w.saturating_mul(h).min(INITIAL_CAPACITY_LIMIT);
        MazeGraph {
            stamp: NEXT_GRAPH_STAMP.fetch_add(1, Ordering::Relaxed),
            width: w,
            height: h,
            mask: None,
            nodes: Vec::with_capacity(capacity),
            by_position: fnv_hashmap(capacity),
            node_count: 0,
            root: None,
        }
    }

    /// A graph whose legal positions are the valid cells of `mask`, looked up as `mask[y][x]`.
    pub fn with_mask(mask: BinaryMask2D) -> MazeGraph {
        let mut graph = MazeGraph::new(Width(mask.width), Height(mask.height));
        graph.mask = Some(mask);
        graph
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn mask(&self) -> Option<&BinaryMask2D> {
        self.mask.as_ref()
    }

    /// Within bounds and, when there is a mask, not masked off.
    pub fn is_valid_position(&self, position: GridPosition) -> bool {
        let in_bounds = position.x >= 0 && position.y >= 0 &&
                        (position.x as usize) < self.width &&
                        (position.y as usize) < self.height;
        in_bounds && self.mask.as_ref().map_or(true, |mask| mask.is_valid(position))
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// One past the highest node index handed out so far. Removal and `clear` never lower it, and
    /// per-query buffers in the path finders are sized by it.
    #[inline]
    pub fn id_bound(&self) -> usize {
        self.nodes.len()
    }

    /// Directed edge count over all nodes.
    pub fn edge_count(&self) -> usize {
        self.nodes().map(MazeNode::edge_count).sum()
    }

    /// Live nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &MazeNode> {
        self.nodes.iter().flatten()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes().map(MazeNode::id)
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: Option<NodeId>) -> Result<()> {
        if let Some(id) = root {
            self.check(id)?;
        }
        self.root = root;
        Ok(())
    }

    /// Fails with `PositionOccupied` if there is already a node at `position`.
    ///
    /// Bounds are not checked here; only growth is limited to valid positions.
    pub fn create_node(&mut self, position: GridPosition, weight: f64) -> Result<NodeId> {
        if self.by_position.contains_key(&position) {
            bail!(ErrorKind::PositionOccupied(position));
        }

        Ok(self.allocate(position, weight))
    }

    pub fn get_or_create_node(&mut self, position: GridPosition) -> NodeId {
        match self.node_id_at(position) {
            Some(id) => id,
            None => self.allocate(position, DEFAULT_WEIGHT),
        }
    }

    // Callers have checked that `position` is free.
    fn allocate(&mut self, position: GridPosition, weight: f64) -> NodeId {
        let id = NodeId {
            stamp: self.stamp,
            index: self.nodes.len(),
        };
        self.nodes.push(Some(MazeNode::new(id, position, weight)));
        self.by_position.insert(position, id.index);
        self.node_count += 1;
        trace!(node = %id, %position, "created node");
        id
    }

    pub fn node(&self, id: NodeId) -> Result<&MazeNode> {
        let index = self.check(id)?;
        self.nodes[index].as_ref().ok_or_else(|| ErrorKind::NodeNotFound(id).into())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut MazeNode> {
        let index = self.check(id)?;
        self.nodes[index].as_mut().ok_or_else(|| ErrorKind::NodeNotFound(id).into())
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.check(id).is_ok()
    }

    pub fn node_at(&self, position: GridPosition) -> Result<&MazeNode> {
        self.node_at_or_none(position)
            .ok_or_else(|| ErrorKind::PositionNotFound(position).into())
    }

    pub fn node_at_or_none(&self, position: GridPosition) -> Option<&MazeNode> {
        self.by_position
            .get(&position)
            .and_then(|index| self.nodes[*index].as_ref())
    }

    #[inline]
    pub fn node_id_at(&self, position: GridPosition) -> Option<NodeId> {
        self.node_at_or_none(position).map(MazeNode::id)
    }

    #[inline]
    pub fn has_node_at(&self, position: GridPosition) -> bool {
        self.by_position.contains_key(&position)
    }

    pub(crate) fn node_by_index(&self, index: usize) -> Option<&MazeNode> {
        self.nodes.get(index).and_then(Option::as_ref)
    }

    /// Creates or replaces the single directed edge `a -> b`. The reverse edge is left alone.
    pub fn connect_nodes(&mut self, a: NodeId, b: NodeId, weight: f64) -> Result<()> {
        self.set_edge(a, b, weight, None)
    }

    /// `connect_nodes` in both directions with the same weight.
    pub fn connect_bidirectional(&mut self, a: NodeId, b: NodeId, weight: f64) -> Result<()> {
        self.connect_nodes(a, b, weight)?;
        self.connect_nodes(b, a, weight)
    }

    /// Creates or replaces the directed edge `a -> b`, carrying optional caller metadata.
    ///
    /// A unit cardinal step lands in the matching directional slot of `a`, anything else in its
    /// general edge list. Fails with `EdgeOutOfRange` when `b - a` does not fit in a position.
    pub fn set_edge(&mut self,
                    a: NodeId,
                    b: NodeId,
                    weight: f64,
                    metadata: Option<Rc<dyn Any>>)
                    -> Result<()> {
        if a == b {
            self.check(a)?;
            bail!(ErrorKind::SelfLink(a));
        }
        let to_position = self.node(b)?.position;
        let from = self.node_mut(a)?;
        let direction = match to_position.checked_sub(from.position) {
            Some(direction) => direction,
            None => bail!(ErrorKind::EdgeOutOfRange(from.position, to_position)),
        };
        let edge = MazeEdge {
            from: a,
            to: b,
            direction,
            weight,
            metadata,
        };
        from.attach(edge);
        Ok(())
    }

    /// Removes the directed edge `a -> b`. Returns whether there was one to remove.
    pub fn disconnect_nodes(&mut self, a: NodeId, b: NodeId) -> Result<bool> {
        self.check(b)?;
        Ok(self.node_mut(a)?.detach(b))
    }

    pub fn edge(&self, a: NodeId, b: NodeId) -> Option<&MazeEdge> {
        self.node(a).ok().and_then(|node| node.edge_to(b))
    }

    /// Is there an edge between `a` and `b` in either direction?
    pub fn is_connected(&self, a: NodeId, b: NodeId) -> bool {
        self.edge(a, b).is_some() || self.edge(b, a).is_some()
    }

    /// Removes a node and everything that refers to it: edges from other nodes into it, spine
    /// links from its children and the root, if it was the root. Its position becomes free.
    pub fn remove_node(&mut self, id: NodeId) -> Result<MazeNode> {
        let index = self.check(id)?;
        let removed = self.nodes[index].take().ok_or_else(|| Error::from(ErrorKind::NodeNotFound(id)))?;
        self.by_position.remove(&removed.position);
        self.node_count -= 1;

        for node in self.nodes.iter_mut().flatten() {
            node.detach(id);
            if node.parent == Some(id) {
                node.parent = None;
            }
        }
        if self.root == Some(id) {
            self.root = None;
        }

        trace!(node = %id, position = %removed.position, "removed node");
        Ok(removed)
    }

    /// Sets or clears the spine parent of `child`. Refuses links that would close a loop in the
    /// spine, so ancestor walks always terminate.
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> Result<()> {
        if let Some(p) = parent {
            self.check(p)?;
            let closes_loop = p == child || self.ancestors(p)?.any(|ancestor| ancestor == child);
            if closes_loop {
                bail!(ErrorKind::SpineCycle(child, p));
            }
        }
        self.node_mut(child)?.parent = parent;
        Ok(())
    }

    /// Walks the spine upwards from `id`, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Result<Ancestors> {
        let first = self.node(id)?.parent;
        Ok(Ancestors {
            graph: self,
            next: first,
        })
    }

    /// Nodes whose spine parent is `id`.
    pub fn children(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.check(id)?;
        Ok(self.nodes()
            .filter(|node| node.parent == Some(id))
            .map(MazeNode::id)
            .collect())
    }

    /// Steps along the spine from `a` up to the lowest common ancestor and back down to `b`.
    ///
    /// `None` when the two are in different spine trees. Edges are ignored entirely.
    pub fn spine_distance(&self, a: NodeId, b: NodeId) -> Result<Option<usize>> {
        let mut depths_from_a = fnv_hashmap(16);
        for (depth, id) in iter::once(a).chain(self.ancestors(a)?).enumerate() {
            depths_from_a.insert(id, depth);
        }

        for (depth_b, id) in iter::once(b).chain(self.ancestors(b)?).enumerate() {
            if let Some(depth_a) = depths_from_a.get(&id) {
                return Ok(Some(depth_a + depth_b));
            }
        }
        Ok(None)
    }

    /// The cardinal neighbours of `position` that are valid and not yet holding a node, in
    /// `Direction::ALL` order. This is the growth frontier.
    pub fn valid_free_adjacent_positions(&self, position: GridPosition) -> PositionSmallVec {
        position.neighbours()
            .into_iter()
            .filter(|p| self.is_valid_position(*p) && !self.has_node_at(*p))
            .collect()
    }

    /// The position one step away in `direction`, if it is valid for this graph.
    pub fn neighbour_at_direction(&self,
                                  position: GridPosition,
                                  direction: Direction)
                                  -> Option<GridPosition> {
        position.offset(direction).filter(|neighbour| self.is_valid_position(*neighbour))
    }

    /// Empties the graph. Node indices carry on from where they were, they are never reused, so
    /// `id_bound` and the path finders' per-query buffers keep their size. Build a new graph
    /// rather than clearing one over and over.
    pub fn clear(&mut self) {
        for slot in self.nodes.iter_mut() {
            *slot = None;
        }
        self.by_position.clear();
        self.node_count = 0;
        self.root = None;
    }

    /// Validates a handle, returning its arena index.
    fn check(&self, id: NodeId) -> Result<usize> {
        if id.stamp != self.stamp {
            bail!(ErrorKind::ForeignNode(id));
        }
        match self.nodes.get(id.index) {
            Some(Some(_)) => Ok(id.index),
            _ => bail!(ErrorKind::NodeNotFound(id)),
        }
    }
}

pub struct Ancestors<'a> {
    graph: &'a MazeGraph,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.graph.node(current).ok().and_then(MazeNode::parent);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use quickcheck::quickcheck;

    fn gp(x: i32, y: i32) -> GridPosition {
        GridPosition::new(x, y)
    }

    fn graph(w: usize, h: usize) -> MazeGraph {
        MazeGraph::new(Width(w), Height(h))
    }

    #[test]
    fn ids_are_sequential_from_zero() {
        let mut g = graph(3, 3);
        let ids = (0..3).map(|x| g.create_node(gp(x, 0), DEFAULT_WEIGHT).unwrap()).collect::<Vec<_>>();
        assert_eq!(ids.iter().map(|id| id.index()).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(g.node_count(), 3);
    }

    #[test]
    fn node_at_returns_the_created_node() {
        let mut g = graph(3, 3);
        let id = g.create_node(gp(1, 2), 2.5).unwrap();
        let node = g.node_at(gp(1, 2)).unwrap();
        assert_eq!(node.id(), id);
        assert_eq!(node.position(), gp(1, 2));
        assert_eq!(node.weight(), 2.5);
        assert_eq!(node.parent(), None);
        assert!(g.has_node_at(gp(1, 2)));
        assert!(g.has_node(id));
        assert!(g.node_at_or_none(gp(0, 0)).is_none());
        assert!(matches!(g.node_at(gp(0, 0)).unwrap_err().kind(),
                         ErrorKind::PositionNotFound(_)));
    }

    #[test]
    fn create_on_occupied_position_fails_without_mutation() {
        let mut g = graph(3, 3);
        let first = g.create_node(gp(1, 1), DEFAULT_WEIGHT).unwrap();
        let err = g.create_node(gp(1, 1), 7.0).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::PositionOccupied(p) if *p == gp(1, 1)));
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.id_bound(), 1);
        assert_eq!(g.node_at(gp(1, 1)).unwrap().id(), first);
        assert_eq!(g.node_at(gp(1, 1)).unwrap().weight(), DEFAULT_WEIGHT);
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let mut g = graph(3, 3);
        let a = g.get_or_create_node(gp(2, 2));
        let b = g.get_or_create_node(gp(2, 2));
        assert_eq!(a, b);
        assert_eq!(g.node_count(), 1);

        // shares id allocation with create_node
        let c = g.create_node(gp(0, 0), 3.0).unwrap();
        let d = g.get_or_create_node(gp(1, 0));
        assert_eq!((a.index(), c.index(), d.index()), (0, 1, 2));
        assert_eq!(g.node(d).unwrap().weight(), DEFAULT_WEIGHT);
        assert_eq!(g.node_at(gp(1, 0)).unwrap().id(), d);
    }

    #[test]
    fn huge_bounds_do_not_reserve_every_cell() {
        let mut g = graph(1_000_000, 1_000_000);
        let a = g.create_node(gp(0, 0), DEFAULT_WEIGHT).unwrap();
        let b = g.create_node(gp(999_999, 999_999), DEFAULT_WEIGHT).unwrap();
        g.connect_bidirectional(a, b, DEFAULT_WEIGHT).unwrap();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 2);

        let overflowing = graph(usize::MAX, usize::MAX);
        assert!(overflowing.is_empty());
        assert!(overflowing.is_valid_position(gp(i32::MAX, i32::MAX)));
    }

    #[test]
    fn positions_at_the_integer_limits() {
        let mut g = graph(4, 4);
        let far = g.create_node(gp(i32::MAX, 0), DEFAULT_WEIGHT).unwrap();
        let low = g.create_node(gp(i32::MIN, 0), DEFAULT_WEIGHT).unwrap();
        let near = g.create_node(gp(0, 0), DEFAULT_WEIGHT).unwrap();

        assert!(g.valid_free_adjacent_positions(gp(i32::MAX, 0)).is_empty());
        assert_eq!(g.neighbour_at_direction(gp(i32::MAX, 0), Direction::Right), None);

        g.connect_nodes(far, near, DEFAULT_WEIGHT).unwrap();
        assert_eq!(g.edge(far, near).unwrap().direction(), gp(-i32::MAX, 0));

        let err = g.connect_nodes(far, low, DEFAULT_WEIGHT).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::EdgeOutOfRange(_, _)));
        let err = g.connect_nodes(low, far, DEFAULT_WEIGHT).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::EdgeOutOfRange(_, _)));
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn neighbour_at_direction_is_bounded() {
        let g = graph(2, 2);
        assert_eq!(g.neighbour_at_direction(gp(0, 0), Direction::Right), Some(gp(1, 0)));
        assert_eq!(g.neighbour_at_direction(gp(0, 0), Direction::Up), None);
        assert_eq!(g.neighbour_at_direction(gp(1, 1), Direction::Down), None);

        let masked = MazeGraph::with_mask(BinaryMask2D::from_rows(&[vec![true, false]]));
        assert_eq!(masked.neighbour_at_direction(gp(0, 0), Direction::Right), None);
    }

    #[test]
    fn bidirectional_connection_needs_two_edges() {
        let mut g = graph(3, 3);
        let a = g.create_node(gp(0, 0), DEFAULT_WEIGHT).unwrap();
        let b = g.create_node(gp(1, 0), DEFAULT_WEIGHT).unwrap();

        g.connect_nodes(a, b, DEFAULT_WEIGHT).unwrap();
        assert!(g.node(a).unwrap().has_edge_to(b));
        assert!(!g.node(b).unwrap().has_edge_to(a));
        assert!(g.is_connected(b, a));

        g.connect_nodes(b, a, DEFAULT_WEIGHT).unwrap();
        assert!(g.node(b).unwrap().has_edge_to(a));

        let ab = g.edge(a, b).unwrap();
        assert_eq!(ab.direction(), gp(1, 0) - gp(0, 0));
        assert_eq!(ab.from(), a);
        assert_eq!(ab.to(), b);
        assert_eq!(g.node(a).unwrap().edge(Direction::Right).map(MazeEdge::to), Some(b));
        assert_eq!(g.node(b).unwrap().edge(Direction::Left).map(MazeEdge::to), Some(a));
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn reconnecting_overwrites_the_edge() {
        let mut g = graph(3, 3);
        let a = g.create_node(gp(0, 0), DEFAULT_WEIGHT).unwrap();
        let b = g.create_node(gp(0, 1), DEFAULT_WEIGHT).unwrap();
        g.connect_nodes(a, b, 1.0).unwrap();
        g.connect_nodes(a, b, 4.0).unwrap();
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edge(a, b).unwrap().weight(), 4.0);
        assert_eq!(g.node(a).unwrap().edge(Direction::Down).unwrap().weight(), 4.0);
    }

    #[test]
    fn non_cardinal_edges_use_the_general_list() {
        let mut g = graph(5, 5);
        let a = g.create_node(gp(0, 0), DEFAULT_WEIGHT).unwrap();
        let b = g.create_node(gp(2, 3), DEFAULT_WEIGHT).unwrap();
        g.set_edge(a, b, 3.0, Some(Rc::new("portal"))).unwrap();

        let node = g.node(a).unwrap();
        assert!(Direction::ALL.iter().all(|dir| node.edge(*dir).is_none()));
        let edge = node.edge_to(b).unwrap();
        assert_eq!(edge.direction(), gp(2, 3));
        assert_eq!(edge.metadata_as::<&str>(), Some(&"portal"));
        assert_eq!(edge.metadata_as::<u32>(), None);

        g.set_edge(a, b, 5.0, None).unwrap();
        assert_eq!(g.node(a).unwrap().edge_count(), 1);
        assert!(g.edge(a, b).unwrap().metadata().is_none());
    }

    #[test]
    fn self_links_are_rejected() {
        let mut g = graph(2, 2);
        let a = g.create_node(gp(0, 0), DEFAULT_WEIGHT).unwrap();
        assert!(matches!(g.connect_nodes(a, a, 1.0).unwrap_err().kind(), ErrorKind::SelfLink(_)));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn disconnect() {
        let mut g = graph(2, 2);
        let a = g.create_node(gp(0, 0), DEFAULT_WEIGHT).unwrap();
        let b = g.create_node(gp(1, 0), DEFAULT_WEIGHT).unwrap();
        g.connect_bidirectional(a, b, 1.0).unwrap();

        assert!(g.disconnect_nodes(a, b).unwrap());
        assert!(!g.node(a).unwrap().has_edge_to(b));
        assert!(g.node(b).unwrap().has_edge_to(a));

        // nothing left to remove is not an error
        assert!(!g.disconnect_nodes(a, b).unwrap());
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn foreign_and_missing_nodes_fail_fast() {
        let mut g = graph(2, 2);
        let mut other = graph(2, 2);
        let a = g.create_node(gp(0, 0), DEFAULT_WEIGHT).unwrap();
        let foreign = other.create_node(gp(1, 0), DEFAULT_WEIGHT).unwrap();
        // same index in both graphs
        assert_eq!(a.index(), foreign.index());

        assert!(matches!(g.node(foreign).unwrap_err().kind(), ErrorKind::ForeignNode(_)));
        assert!(matches!(g.connect_nodes(a, foreign, 1.0).unwrap_err().kind(),
                         ErrorKind::ForeignNode(_)));
        assert!(matches!(g.set_parent(a, Some(foreign)).unwrap_err().kind(),
                         ErrorKind::ForeignNode(_)));

        g.remove_node(a).unwrap();
        assert!(matches!(g.node(a).unwrap_err().kind(), ErrorKind::NodeNotFound(_)));
        assert!(matches!(g.remove_node(a).unwrap_err().kind(), ErrorKind::NodeNotFound(_)));
    }

    #[test]
    fn remove_node_cascades() {
        let mut g = graph(3, 3);
        let centre = g.create_node(gp(1, 1), DEFAULT_WEIGHT).unwrap();
        let up = g.create_node(gp(1, 0), DEFAULT_WEIGHT).unwrap();
        let left = g.create_node(gp(0, 1), DEFAULT_WEIGHT).unwrap();
        let far = g.create_node(gp(2, 2), DEFAULT_WEIGHT).unwrap();
        g.connect_bidirectional(centre, up, 1.0).unwrap();
        g.connect_bidirectional(centre, left, 1.0).unwrap();
        g.connect_nodes(far, centre, 1.0).unwrap();
        g.set_parent(up, Some(centre)).unwrap();
        g.set_parent(left, Some(centre)).unwrap();
        g.set_root(Some(centre)).unwrap();

        let removed = g.remove_node(centre).unwrap();
        assert_eq!(removed.position(), gp(1, 1));
        assert_eq!(removed.edge_count(), 2);

        assert!(g.node(up).unwrap().edge(Direction::Down).is_none());
        assert!(g.node(left).unwrap().edge(Direction::Right).is_none());
        assert_eq!(g.node(far).unwrap().edge_count(), 0);
        assert_eq!(g.node(up).unwrap().parent(), None);
        assert_eq!(g.node(left).unwrap().parent(), None);
        assert_eq!(g.root(), None);
        assert_eq!(g.edge_count(), 0);
        assert!(!g.has_node_at(gp(1, 1)));

        // the position is free again, the index is not reused
        let replacement = g.create_node(gp(1, 1), DEFAULT_WEIGHT).unwrap();
        assert_eq!(replacement.index(), 4);
        assert_ne!(replacement, centre);
    }

    #[test]
    fn spine_is_independent_of_edges() {
        let mut g = graph(3, 1);
        let a = g.create_node(gp(0, 0), DEFAULT_WEIGHT).unwrap();
        let b = g.create_node(gp(1, 0), DEFAULT_WEIGHT).unwrap();
        let c = g.create_node(gp(2, 0), DEFAULT_WEIGHT).unwrap();
        g.set_parent(b, Some(a)).unwrap();
        g.set_parent(c, Some(b)).unwrap();

        assert_eq!(g.ancestors(c).unwrap().collect::<Vec<_>>(), vec![b, a]);
        assert_eq!(g.children(a).unwrap(), vec![b]);
        assert_eq!(g.spine_distance(a, c).unwrap(), Some(2));
        assert_eq!(g.spine_distance(c, c).unwrap(), Some(0));

        g.connect_bidirectional(a, c, 1.0).unwrap();
        assert_eq!(g.spine_distance(a, c).unwrap(), Some(2));
        assert_eq!(g.node(c).unwrap().parent(), Some(b));
    }

    #[test]
    fn spine_distance_through_common_ancestor() {
        let mut g = graph(3, 3);
        let root = g.create_node(gp(1, 0), DEFAULT_WEIGHT).unwrap();
        let left = g.create_node(gp(0, 0), DEFAULT_WEIGHT).unwrap();
        let right = g.create_node(gp(2, 0), DEFAULT_WEIGHT).unwrap();
        let right_down = g.create_node(gp(2, 1), DEFAULT_WEIGHT).unwrap();
        let loner = g.create_node(gp(0, 2), DEFAULT_WEIGHT).unwrap();
        g.set_parent(left, Some(root)).unwrap();
        g.set_parent(right, Some(root)).unwrap();
        g.set_parent(right_down, Some(right)).unwrap();

        assert_eq!(g.spine_distance(left, right_down).unwrap(), Some(3));
        assert_eq!(g.spine_distance(right_down, left).unwrap(), Some(3));
        assert_eq!(g.spine_distance(left, loner).unwrap(), None);
    }

    #[test]
    fn spine_cycles_are_rejected() {
        let mut g = graph(3, 1);
        let a = g.create_node(gp(0, 0), DEFAULT_WEIGHT).unwrap();
        let b = g.create_node(gp(1, 0), DEFAULT_WEIGHT).unwrap();
        let c = g.create_node(gp(2, 0), DEFAULT_WEIGHT).unwrap();
        g.set_parent(b, Some(a)).unwrap();
        g.set_parent(c, Some(b)).unwrap();

        assert!(matches!(g.set_parent(a, Some(c)).unwrap_err().kind(),
                         ErrorKind::SpineCycle(_, _)));
        assert!(matches!(g.set_parent(a, Some(a)).unwrap_err().kind(),
                         ErrorKind::SpineCycle(_, _)));
        assert_eq!(g.node(a).unwrap().parent(), None);

        g.set_parent(c, None).unwrap();
        g.set_parent(a, Some(c)).unwrap();
        assert_eq!(g.ancestors(b).unwrap().collect::<Vec<_>>(), vec![a, c]);
    }

    #[test]
    fn free_adjacent_positions_respect_bounds_and_occupancy() {
        let mut g = graph(3, 2);
        let sorted = |g: &MazeGraph, p| -> Vec<GridPosition> {
            g.valid_free_adjacent_positions(p).into_iter().sorted().collect()
        };
        assert_eq!(sorted(&g, gp(0, 0)), vec![gp(0, 1), gp(1, 0)]);
        assert_eq!(sorted(&g, gp(1, 1)), vec![gp(0, 1), gp(1, 0), gp(2, 1)]);

        g.create_node(gp(1, 0), DEFAULT_WEIGHT).unwrap();
        assert_eq!(sorted(&g, gp(0, 0)), vec![gp(0, 1)]);
        assert_eq!(sorted(&g, gp(5, 5)), vec![]);
    }

    #[test]
    fn mask_rows_are_y_and_columns_are_x() {
        // 3 columns, 2 rows
        let mask = BinaryMask2D::from_rows(&[vec![true, true, false], vec![false, true, true]]);
        let g = MazeGraph::with_mask(mask);
        assert_eq!(g.width(), 3);
        assert_eq!(g.height(), 2);
        assert!(g.is_valid_position(gp(1, 0)));
        assert!(!g.is_valid_position(gp(2, 0)));
        assert!(!g.is_valid_position(gp(0, 1)));
        assert!(g.is_valid_position(gp(2, 1)));
        assert!(!g.is_valid_position(gp(1, 2)));
        assert_eq!(g.valid_free_adjacent_positions(gp(1, 1)).into_iter().sorted().collect::<Vec<_>>(),
                   vec![gp(1, 0), gp(2, 1)]);
    }

    #[test]
    fn clear_keeps_counting_ids() {
        let mut g = graph(2, 2);
        let a = g.create_node(gp(0, 0), DEFAULT_WEIGHT).unwrap();
        g.set_root(Some(a)).unwrap();
        g.clear();
        assert!(g.is_empty());
        assert_eq!(g.root(), None);
        assert!(!g.has_node(a));
        let b = g.create_node(gp(0, 0), DEFAULT_WEIGHT).unwrap();
        assert_eq!(b.index(), 1);
        assert_eq!(g.id_bound(), 2);
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn clones_accept_the_same_ids() {
        let mut g = graph(2, 1);
        let a = g.create_node(gp(0, 0), DEFAULT_WEIGHT).unwrap();
        let b = g.create_node(gp(1, 0), DEFAULT_WEIGHT).unwrap();
        let mut copy = g.clone();
        copy.connect_bidirectional(a, b, DEFAULT_WEIGHT).unwrap();
        assert_eq!(copy.edge_count(), 2);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn distinct_positions_map_back_to_their_nodes() {
        fn prop(raw: Vec<(i8, i8)>) -> bool {
            let mut g = graph(0, 0);
            let positions = raw.into_iter()
                .map(|(x, y)| gp(x as i32, y as i32))
                .unique()
                .collect::<Vec<_>>();
            let ids = positions.iter()
                .map(|p| g.create_node(*p, DEFAULT_WEIGHT).unwrap())
                .collect::<Vec<_>>();
            positions.iter().zip(ids.iter()).all(|(p, id)| {
                g.node_at(*p).map(MazeNode::id).ok() == Some(*id) &&
                g.create_node(*p, DEFAULT_WEIGHT).is_err()
            }) && g.node_count() == positions.len()
        }
        quickcheck(prop as fn(Vec<(i8, i8)>) -> bool);
    }
}
