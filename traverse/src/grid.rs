use crate::find::{DepthFirst, Graph, NodeReference, PathFinderState};
use std::collections::BTreeMap;
use std::{fmt::Display, str::FromStr};

use anyhow::bail;
use log::{debug, warn};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Offsets probed around every walkable cell. The order decides which path the solver finds first.
const NEIGHBOR_OFFSETS: [(isize, isize); 4] = [(-1, 0), (0, 1), (0, -1), (1, 0)];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Maps a unit offset onto the direction of the move. `y` grows downwards.
    ///
    /// Panics for anything but the four unit offsets, only those are ever probed.
    pub fn from_offset(dx: isize, dy: isize) -> Self {
        match (dx, dy) {
            (-1, 0) => Direction::Left,
            (1, 0) => Direction::Right,
            (0, 1) => Direction::Down,
            (0, -1) => Direction::Up,
            _ => panic!("({}, {}) is not a unit offset", dx, dy),
        }
    }

    pub fn offset(&self) -> (isize, isize) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Up => (0, -1),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Direction::Up => "up",
                Direction::Down => "down",
                Direction::Left => "left",
                Direction::Right => "right",
            }
        )
    }
}

impl FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(anyhow::anyhow!("Invalid direction: {}", s)),
        }
    }
}

/// Column and row of a cell, counted from the first non-empty row of the maze
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The point one move away, `None` if that would leave the first quadrant
    pub fn step(self, direction: Direction) -> Option<Point> {
        let (dx, dy) = direction.offset();
        self.offset(dx, dy)
    }

    fn offset(self, dx: isize, dy: isize) -> Option<Point> {
        Some(Point {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl NodeReference for Point {}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Tile {
    Wall,
    Floor,
    Start,
    End,
}

impl Tile {
    pub fn is_walkable(&self) -> bool {
        !matches!(self, Tile::Wall)
    }

    /// Whether a move may end on this tile. The start is never stepped back onto.
    fn accepts_move(&self) -> bool {
        matches!(self, Tile::Floor | Tile::End)
    }
}

impl From<char> for Tile {
    fn from(c: char) -> Self {
        match c {
            '.' => Tile::Floor,
            'S' => Tile::Start,
            'E' => Tile::End,
            _ => Tile::Wall,
        }
    }
}

impl Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Tile::Wall => "#",
                Tile::Floor => ".",
                Tile::Start => "S",
                Tile::End => "E",
            }
        )
    }
}

/// A maze read from a character grid. Rows may differ in length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    pub rows: Vec<Vec<Tile>>,
    pub start: Option<Point>,
    pub end: Option<Point>,
}

impl Maze {
    pub fn tile(&self, point: Point) -> Option<Tile> {
        self.rows.get(point.y)?.get(point.x).copied()
    }

    /// Iterate over every cell of the grid together with its tile
    pub fn cells(&self) -> impl Iterator<Item = (Point, Tile)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, tile)| (Point { x, y }, *tile))
        })
    }

    pub fn position_graph(&self) -> PositionGraph {
        PositionGraph::build(self)
    }

    /// Search a path from the start to the end marker. A maze missing either marker has no path.
    pub fn solve(&self) -> PathFinderState<Direction, Point> {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            warn!("maze is missing its start or end marker");
            return PathFinderState::NoPathFound;
        };

        DepthFirst::new(start, end).finish(&self.position_graph())
    }

    /// Replay a sequence of moves, returns where it ends or `None` if it runs into a wall or off
    /// the grid.
    pub fn walk(&self, from: Point, moves: &[Direction]) -> Option<Point> {
        moves.iter().try_fold(from, |point, direction| {
            let next = point.step(*direction)?;
            self.tile(next)?.is_walkable().then_some(next)
        })
    }
}

impl FromStr for Maze {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<Vec<Tile>> = s
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().map(Tile::from).collect())
            .collect();

        let (mut start, mut end) = (None, None);
        for (y, row) in rows.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                let marker = match tile {
                    Tile::Start => &mut start,
                    Tile::End => &mut end,
                    _ => continue,
                };
                let point = Point { x, y };
                if let Some(previous) = marker.replace(point) {
                    bail!("Maze has a second {} marker at {} (first at {})", tile, point, previous);
                }
            }
        }

        Ok(Maze { rows, start, end })
    }
}

impl Display for Maze {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.rows {
            for tile in row {
                write!(f, "{}", tile)?;
            }
            write!(f, "\n")?;
        }

        Ok(())
    }
}

/// Every walkable cell of a maze mapped to the cells reachable with one move, in probing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionGraph {
    neighbors: BTreeMap<Point, Vec<(Point, Direction)>>,
}

impl PositionGraph {
    pub fn build(maze: &Maze) -> Self {
        let mut neighbors = BTreeMap::new();

        for (point, tile) in maze.cells() {
            if !tile.is_walkable() {
                continue;
            }

            let moves: Vec<_> = NEIGHBOR_OFFSETS
                .iter()
                .filter_map(|&(dx, dy)| {
                    let candidate = point.offset(dx, dy)?;
                    maze.tile(candidate)?
                        .accepts_move()
                        .then(|| (candidate, Direction::from_offset(dx, dy)))
                })
                .collect();

            neighbors.insert(point, moves);
        }

        debug!("built position graph with {} cells", neighbors.len());

        Self { neighbors }
    }

    /// The neighbors of a cell, empty for walls and points outside the maze
    pub fn neighbors(&self, point: Point) -> &[(Point, Direction)] {
        self.neighbors.get(&point).map_or(&[], Vec::as_slice)
    }

    pub fn contains(&self, point: Point) -> bool {
        self.neighbors.contains_key(&point)
    }

    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        self.neighbors.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

impl Graph for PositionGraph {
    type Reference = Point;
    type Edge = Direction;

    fn neighbors_of(&self, node: &Point) -> impl Iterator<Item = (Point, Direction)> {
        self.neighbors(*node).iter().copied()
    }
}

/// Serialized as `{"x,y": {"x,y": direction}}` so the keys stay plain strings
impl Serialize for PositionGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Moves<'a>(&'a [(Point, Direction)]);

        impl Serialize for Moves<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (point, direction) in self.0 {
                    map.serialize_entry(&point.to_string(), direction)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(self.neighbors.len()))?;
        for (point, moves) in &self.neighbors {
            map.serialize_entry(&point.to_string(), &Moves(moves))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::find::PathResult;

    fn create_basic_maze() -> Maze {
        [
            "#######", //
            "#S###E#", //
            "#.###.#", //
            "#.#...#", //
            "#.#.###", //
            "#......", //
            "#######",
        ]
        .join("\n")
        .parse()
        .unwrap()
    }

    fn path_of(state: PathFinderState<Direction, Point>) -> Vec<Direction> {
        match state {
            PathFinderState::PathFound(PathResult { path, .. }) => path,
            s => panic!("expected a path, got {:?}", s),
        }
    }

    #[test]
    fn test_direction_from_offset() {
        assert_eq!(Direction::from_offset(-1, 0), Direction::Left);
        assert_eq!(Direction::from_offset(1, 0), Direction::Right);
        assert_eq!(Direction::from_offset(0, 1), Direction::Down);
        assert_eq!(Direction::from_offset(0, -1), Direction::Up);

        for direction in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            let (dx, dy) = direction.offset();
            assert_eq!(Direction::from_offset(dx, dy), direction);
            assert_eq!(direction.to_string().parse::<Direction>().unwrap(), direction);
            assert_eq!(
                serde_json::to_value(direction).unwrap(),
                serde_json::Value::String(direction.to_string())
            );
        }
        assert!("north".parse::<Direction>().is_err());
    }

    #[test]
    #[should_panic]
    fn test_direction_from_diagonal_offset() {
        Direction::from_offset(1, 1);
    }

    #[test]
    fn test_parse_skips_blank_rows() {
        let maze: Maze = "\n\nS.E\n\n.#.\n".parse().unwrap();

        assert_eq!(maze.rows.len(), 2);
        assert_eq!(maze.start, Some(Point::new(0, 0)));
        assert_eq!(maze.end, Some(Point::new(2, 0)));
        assert_eq!(maze.tile(Point::new(1, 1)), Some(Tile::Wall));
        assert_eq!(maze.to_string(), "S.E\n.#.\n");
    }

    #[test]
    fn test_row_of_spaces_is_a_wall() {
        let maze: Maze = "S\n \nE".parse().unwrap();

        assert_eq!(maze.rows.len(), 3);
        assert_eq!(maze.tile(Point::new(0, 1)), Some(Tile::Wall));
        assert_eq!(maze.end, Some(Point::new(0, 2)));
        assert_eq!(maze.to_string(), "S\n#\nE\n");
        assert_eq!(maze.solve(), PathFinderState::NoPathFound);
    }

    #[test]
    fn test_parse_rejects_second_marker() {
        assert!("S.S\n..E".parse::<Maze>().is_err());
        assert!("S.E\n..E".parse::<Maze>().is_err());
    }

    #[test]
    fn test_build_graph() {
        let maze: Maze = "S..\n.#.\n..E".parse().unwrap();
        let graph = maze.position_graph();

        // the wall is neither a cell nor a neighbor
        assert_eq!(graph.len(), 8);
        assert!(!graph.contains(Point::new(1, 1)));
        assert!(graph
            .cells()
            .all(|p| graph.neighbors(p).iter().all(|(n, _)| *n != Point::new(1, 1))));

        // probing order is left, down, up, right
        assert_eq!(
            graph.neighbors(Point::new(1, 0)),
            &[(Point::new(2, 0), Direction::Right)]
        );
        assert_eq!(
            graph.neighbors(Point::new(2, 1)),
            &[
                (Point::new(2, 2), Direction::Down),
                (Point::new(2, 0), Direction::Up),
            ]
        );
        assert_eq!(
            graph.neighbors(Point::new(0, 1)),
            &[(Point::new(0, 2), Direction::Down)]
        );
        // the end is a valid neighbor, the start is not
        assert_eq!(
            graph.neighbors(Point::new(1, 2)),
            &[(Point::new(0, 2), Direction::Left), (Point::new(2, 2), Direction::Right)]
        );
    }

    #[test]
    fn test_build_graph_ragged_rows() {
        let maze: Maze = "S...\n.\n...E".parse().unwrap();
        let graph = maze.position_graph();

        // (1, 1) is past the end of the short row
        assert_eq!(
            graph.neighbors(Point::new(1, 0)),
            &[(Point::new(2, 0), Direction::Right)]
        );
        assert_eq!(
            graph.neighbors(Point::new(0, 1)),
            &[(Point::new(0, 2), Direction::Down)]
        );
        assert!(graph.neighbors(Point::new(1, 1)).is_empty());
    }

    #[test]
    fn test_isolated_cell_has_no_neighbors() {
        let maze: Maze = "S#\n##\n#E".parse().unwrap();
        let graph = maze.position_graph();

        assert!(graph.contains(Point::new(0, 0)));
        assert!(graph.neighbors(Point::new(0, 0)).is_empty());
    }

    #[test]
    fn test_small_route() {
        let maze: Maze = "S..\n.#.\n..E".parse().unwrap();
        let path = path_of(maze.solve());

        assert_eq!(
            path,
            vec![Direction::Down, Direction::Down, Direction::Right, Direction::Right]
        );
        assert_eq!(maze.walk(Point::new(0, 0), &path), maze.end);
    }

    #[test]
    fn test_basic_route() {
        let maze = create_basic_maze();
        let path = path_of(maze.solve());

        // not the shortest route, the first one in probing order
        assert_eq!(path.len(), 12);
        assert_eq!(maze.walk(maze.start.unwrap(), &path), maze.end);

        // no cell is passed twice
        let mut point = maze.start.unwrap();
        let mut seen = vec![point];
        for direction in &path {
            point = point.step(*direction).unwrap();
            assert!(!seen.contains(&point));
            seen.push(point);
        }
    }

    #[test]
    fn test_route_after_dead_end() {
        // going down first leads into a dead end
        let maze: Maze = "S.E\n.##".parse().unwrap();

        assert_eq!(
            path_of(maze.solve()),
            vec![Direction::Right, Direction::Right]
        );
    }

    #[test]
    fn test_basic_no_route() {
        let maze: Maze = "S#E".parse().unwrap();
        assert_eq!(maze.solve(), PathFinderState::NoPathFound);

        let mut maze = create_basic_maze();
        // wall off the end
        maze.rows[2][5] = Tile::Wall;
        assert_eq!(maze.solve(), PathFinderState::NoPathFound);
    }

    #[test]
    fn test_missing_markers() {
        let maze: Maze = "S..\n...".parse().unwrap();
        assert_eq!(maze.end, None);
        assert_eq!(maze.solve(), PathFinderState::NoPathFound);

        let maze: Maze = "...\n..E".parse().unwrap();
        assert_eq!(maze.solve(), PathFinderState::NoPathFound);
    }

    #[test]
    fn test_walk_into_wall() {
        let maze: Maze = "S..\n.#.\n..E".parse().unwrap();

        assert_eq!(maze.walk(Point::new(0, 0), &[Direction::Right, Direction::Down]), None);
        assert_eq!(maze.walk(Point::new(0, 0), &[Direction::Up]), None);
        assert_eq!(maze.walk(Point::new(0, 0), &[]), Some(Point::new(0, 0)));
    }

    #[test]
    fn test_serialize_graph() {
        let maze: Maze = "S.E".parse().unwrap();
        let json = serde_json::to_value(maze.position_graph()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "0,0": { "1,0": "right" },
                "1,0": { "2,0": "right" },
                "2,0": { "1,0": "left" },
            })
        );
    }
}
