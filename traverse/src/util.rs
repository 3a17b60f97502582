use std::{fs, path::Path};

use anyhow::Context;

use crate::{Maze, RejectedLine, RelationshipGraph};

pub fn read_maze(path: impl AsRef<Path>) -> Result<Maze, anyhow::Error> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read maze from {}", path.display()))?;

    text.parse::<Maze>()
        .with_context(|| format!("Failed to parse maze in {}", path.display()))
}

pub fn read_relationships(
    path: impl AsRef<Path>,
) -> Result<(RelationshipGraph, Vec<RejectedLine>), anyhow::Error> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read connections from {}", path.display()))?;

    Ok(RelationshipGraph::from_lines(text.lines()))
}
