use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;
use traverse::{
    util::{read_maze, read_relationships},
    PathFinderState,
};

#[derive(Debug, Parser)]
#[command(about = "Solve mazes and find friend groups")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Find a path from S to E in a maze of `.`, `#`, `S` and `E`
    Maze {
        input_path: PathBuf,
        /// Print the position graph as JSON instead of solving
        #[arg(long)]
        graph: bool,
    },
    /// List everyone connected to a person through `name1,name2` lines
    Friends {
        input_path: PathBuf,
        person: String,
        /// Print the relationship graph in Graphviz format instead
        #[arg(long)]
        dot: bool,
    },
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let args = CliArgs::parse();

    match args.command {
        Command::Maze { input_path, graph } => {
            let maze = read_maze(&input_path)?;
            info!("loaded maze from {}:\n{}", input_path.display(), maze);

            if graph {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&maze.position_graph())?
                );
                return Ok(());
            }

            match maze.solve() {
                PathFinderState::PathFound(result) => {
                    let moves: Vec<String> = result.path.iter().map(|d| d.to_string()).collect();
                    println!("Path of {} moves: {}", result.len(), moves.join(" "));
                }
                _ => println!("No path from start to end"),
            }
        }
        Command::Friends {
            input_path,
            person,
            dot,
        } => {
            let (graph, rejected) = read_relationships(&input_path)?;
            for line in &rejected {
                eprintln!("Skipped line {} ({:?}): {}", line.line, line.text, line.reason);
            }

            if dot {
                print!("{}", graph.to_dot());
                return Ok(());
            }

            let mut friends: Vec<_> = graph
                .adjacency()
                .find_friend_group(&person)
                .into_iter()
                .collect();
            friends.sort();
            println!("Friend group of {}: {}", person, friends.join(", "));
        }
    }

    Ok(())
}
