use std::{
    collections::{HashSet, VecDeque},
    fmt::Debug,
    hash::Hash,
    marker::PhantomData,
};

use log::debug;
use serde::Serialize;

/// Supertrait that collects all the requirements on the NodeReference values
/// Must be hashable, comparable and not references (hence 'static)
pub trait NodeReference: Clone + Eq + Hash + Debug + 'static {}

impl NodeReference for String {}

pub trait Graph {
    /// The type that can be used to reference nodes in the graph
    type Reference: NodeReference;

    /// The label carried by an edge, e.g. the direction of a move
    type Edge: Copy + Eq + Debug + 'static;

    /// Return an iterator over the neighbors of the provided node and the edge leading there.
    /// A node that is not part of the graph has no neighbors.
    fn neighbors_of(
        &self,
        node: &Self::Reference,
    ) -> impl Iterator<Item = (Self::Reference, Self::Edge)>;
}

#[derive(Debug, PartialEq, Clone, Eq, Serialize)]
pub struct PathResult<E, R> {
    pub path: Vec<E>,
    pub start: R,
    pub goal: R,
}

impl<E, R> PathResult<E, R> {
    /// Number of edges walked from start to goal
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PathFinderState<E, R> {
    Computing,
    NoPathFound,
    PathFound(PathResult<E, R>),
}

impl<E, R> PathFinderState<E, R> {
    pub fn is_done(&self) -> bool {
        !matches!(self, PathFinderState::Computing)
    }
}

/// A cell on the current search path together with the neighbors not tried yet
#[derive(Debug)]
struct Frame<R, E> {
    node: R,
    neighbors: std::vec::IntoIter<(R, E)>,
}

/// Depth-first search with backtracking.
///
/// Neighbors are tried in the order the graph yields them and the first path reaching the goal
/// wins, so the result is not necessarily the shortest one. Only the cells on the current search
/// path count as visited: a cell is released again when its branch is abandoned.
#[derive(Debug)]
pub struct DepthFirst<G: Graph> {
    start: G::Reference,
    goal: G::Reference,
    visited: HashSet<G::Reference>,
    stack: Vec<Frame<G::Reference, G::Edge>>,
    path: Vec<G::Edge>,
    // cell chosen in the previous step, entered on the next one
    pending: Option<G::Reference>,
    state: PathFinderState<G::Edge, G::Reference>,
    _graph: PhantomData<G>,
}

impl<G: Graph> DepthFirst<G> {
    pub fn new(start: G::Reference, goal: G::Reference) -> Self {
        let state = if start == goal {
            PathFinderState::PathFound(PathResult {
                path: Vec::new(),
                start: start.clone(),
                goal: goal.clone(),
            })
        } else {
            PathFinderState::Computing
        };

        Self {
            pending: Some(start.clone()),
            start,
            goal,
            visited: HashSet::new(),
            stack: Vec::new(),
            path: Vec::new(),
            state,
            _graph: PhantomData,
        }
    }

    pub fn finish(mut self, graph: &G) -> PathFinderState<G::Edge, G::Reference> {
        loop {
            match self.step(graph) {
                PathFinderState::Computing => {}
                s => return s,
            }
        }
    }

    pub fn step(&mut self, graph: &G) -> PathFinderState<G::Edge, G::Reference> {
        if self.state.is_done() {
            return self.state.clone();
        }

        // enter the cell picked last step
        if let Some(node) = self.pending.take() {
            self.visited.insert(node.clone());
            let neighbors: Vec<_> = graph.neighbors_of(&node).collect();
            self.stack.push(Frame {
                node,
                neighbors: neighbors.into_iter(),
            });
            return self.state.clone();
        }

        let Some(frame) = self.stack.last_mut() else {
            self.state = PathFinderState::NoPathFound;
            return self.state.clone();
        };

        match frame.neighbors.next() {
            Some((next, edge)) if next == self.goal => {
                self.path.push(edge);
                debug!(
                    "path found from {:?} to {:?} with {} moves",
                    self.start,
                    self.goal,
                    self.path.len()
                );
                self.state = PathFinderState::PathFound(PathResult {
                    path: std::mem::take(&mut self.path),
                    start: self.start.clone(),
                    goal: self.goal.clone(),
                });
            }
            Some((next, edge)) => {
                if !self.visited.contains(&next) {
                    self.path.push(edge);
                    self.pending = Some(next);
                }
            }
            None => {
                // dead end, give the cell back and undo the move that led here
                if let Some(frame) = self.stack.pop() {
                    self.visited.remove(&frame.node);
                }
                self.path.pop();

                if self.stack.is_empty() {
                    debug!("no path from {:?} to {:?}", self.start, self.goal);
                    self.state = PathFinderState::NoPathFound;
                }
            }
        }

        self.state.clone()
    }

    pub fn state(&self) -> &PathFinderState<G::Edge, G::Reference> {
        &self.state
    }

    /// The cells on the current search path
    pub fn get_visited(&self) -> &HashSet<G::Reference> {
        &self.visited
    }

    pub fn start(&self) -> &G::Reference {
        &self.start
    }

    pub fn goal(&self) -> &G::Reference {
        &self.goal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExploreState {
    Exploring,
    Complete,
}

/// Breadth-first exploration collecting every node reachable from a start node.
#[derive(Debug)]
pub struct BreadthFirst<G: Graph> {
    start: G::Reference,
    visited: HashSet<G::Reference>,
    queue: VecDeque<G::Reference>,
    state: ExploreState,
    _graph: PhantomData<G>,
}

impl<G: Graph> BreadthFirst<G> {
    pub fn new(graph: &G, start: G::Reference) -> Self {
        let queue = graph.neighbors_of(&start).map(|(n, _)| n).collect();
        Self {
            visited: HashSet::from([start.clone()]),
            start,
            queue,
            state: ExploreState::Exploring,
            _graph: PhantomData,
        }
    }

    pub fn finish(mut self, graph: &G) -> HashSet<G::Reference> {
        while self.step(graph) == ExploreState::Exploring {}
        debug!(
            "explored {} nodes reachable from {:?}",
            self.visited.len(),
            self.start
        );
        self.visited
    }

    pub fn step(&mut self, graph: &G) -> ExploreState {
        if self.state == ExploreState::Complete {
            return self.state;
        }

        let Some(node) = self.queue.pop_front() else {
            self.state = ExploreState::Complete;
            return self.state;
        };

        // the same node may have been queued several times before it was reached
        if self.visited.contains(&node) {
            return self.state;
        }

        for (neighbor, _) in graph.neighbors_of(&node) {
            if !self.visited.contains(&neighbor) {
                self.queue.push_back(neighbor);
            }
        }
        self.visited.insert(node);

        self.state
    }

    pub fn state(&self) -> ExploreState {
        self.state
    }

    pub fn get_visited(&self) -> &HashSet<G::Reference> {
        &self.visited
    }

    pub fn start(&self) -> &G::Reference {
        &self.start
    }
}
