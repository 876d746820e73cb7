// Create the Error, ErrorKind, ResultExt, and Result types.
// Every module does `use crate::errors::*;` to get at them.
use error_chain::*;

use crate::coordinates::GridPosition;
use crate::graph::NodeId;

error_chain! {
    errors {
        PositionOccupied(position: GridPosition) {
            description("position already holds a node")
            display("a node already exists at {}", position)
        }
        PositionNotFound(position: GridPosition) {
            description("no node at position")
            display("there is no node at {}", position)
        }
        NodeNotFound(id: NodeId) {
            description("node is not in the graph")
            display("node {} is not in the graph", id)
        }
        ForeignNode(id: NodeId) {
            description("node belongs to a different graph")
            display("node {} belongs to a different graph", id)
        }
        SelfLink(id: NodeId) {
            description("a node cannot be connected to itself")
            display("node {} cannot be connected to itself", id)
        }
        EdgeOutOfRange(from: GridPosition, to: GridPosition) {
            description("edge direction does not fit in an i32 position")
            display("the step from {} to {} overflows an i32 position", from, to)
        }
        SpineCycle(child: NodeId, parent: NodeId) {
            description("parent link would create a cycle in the spine")
            display("making {} the parent of {} would create a spine cycle", parent, child)
        }
        InvalidStart(position: GridPosition) {
            description("growth origin is out of bounds or occupied")
            display("cannot grow from {}: out of bounds or already occupied", position)
        }
        InvalidSelection(position: GridPosition) {
            description("direction selector chose a position that was not offered")
            display("direction selector chose {} which was not a candidate", position)
        }
        QueueIndexOutOfRange(index: usize, capacity: usize) {
            description("priority queue index out of range")
            display("index {} is out of range for a queue of capacity {}", index, capacity)
        }
        QueueIndexPresent(index: usize) {
            description("index is already in the priority queue")
            display("index {} is already in the priority queue", index)
        }
        QueueIndexAbsent(index: usize) {
            description("index is not in the priority queue")
            display("index {} is not in the priority queue", index)
        }
        EmptyQueue {
            description("priority queue is empty")
            display("priority queue is empty")
        }
        KeyNotDecreased(index: usize) {
            description("new key is not strictly smaller")
            display("decrease_key at index {} given a key that is not strictly smaller", index)
        }
        KeyNotIncreased(index: usize) {
            description("new key is not strictly larger")
            display("increase_key at index {} given a key that is not strictly larger", index)
        }
        UnknownCostMode(name: String) {
            description("unknown cost mode")
            display("unknown cost mode '{}', expected one of none, edges, nodes, both", name)
        }
    }
}
