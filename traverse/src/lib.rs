pub mod find;
pub mod grid;
pub mod social;
pub mod util;

pub use find::{
    BreadthFirst, DepthFirst, ExploreState, Graph, NodeReference, PathFinderState, PathResult,
};
pub use grid::{Direction, Maze, Point, PositionGraph, Tile};
pub use social::{Adjacency, Connection, Person, RejectedLine, RelationshipGraph};
