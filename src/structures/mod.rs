// private sub-modules defined in other files
mod flow_graph;
mod grid;

// exports identifiers from private sub-modules in the current module namespace
pub use self::flow_graph::FlowGraph;
pub use self::grid::{Grid, NeighborMode};
