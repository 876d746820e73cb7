use docopt::Docopt;
use itertools::Itertools;
use mazegraph::{
    coordinates::{GridPosition, PositionSmallVec},
    cycles::{self, DistanceMeasure},
    generators,
    graph::{MazeGraph, NodeId},
    grid_displays::{self, GridDisplay, PathDisplay, StartEndPointsDisplay},
    pathing::{self, CostMode},
    units::{Height, Width},
};
use rand::{rngs::SmallRng, SeedableRng};
use serde_derive::Deserialize;
use std::{
    fs::File,
    io::{self, prelude::*},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Maze graphs

Usage:
    mazegraph_driver -h | --help
    mazegraph_driver [--width=<w> --height=<h>] [--max-cells=<n>] [--seed=<s>] [--min-cycle-distance=<d> [--cycles=<n>] [--edge-distance]] [--cost-mode=<mode>] [--show-path | --show-distances] [--text-out=<path>] [--save-edges=<path>]

Options:
    -h --help                 Show this screen.
    --width=<w>               The grid width in a w*h grid [default: 20].
    --height=<h>              The grid height in a w*h grid [default: 20].
    --max-cells=<n>           Stop carving after n cells.
    --seed=<s>                Seed for the random number generator, random if not given.
    --min-cycle-distance=<d>  Add a passage between every pair of neighbouring cells that are more than d steps apart.
    --cycles=<n>              Only add n of those passages, chosen at random.
    --edge-distance           Measure the distance between neighbours along passages rather than along the carving tree.
    --cost-mode=<mode>        How the route between the ends of the longest path is costed: none, edges, nodes or both [default: none].
    --show-path               Mark the route between the ends of the longest path.
    --show-distances          Show the distance from the start of the longest path to every other cell, in hex.
    --text-out=<path>         Output file path for a textual rendering of the maze, stdout if not given.
    --save-edges=<path>       Serialize the maze to a text file. Line 1: n(#vertices) m(#edges). Line 2+: a directed edge between two 1-based vertex indices.
";

#[derive(Debug, Deserialize)]
struct MazeArgs {
    flag_width: usize,
    flag_height: usize,
    flag_max_cells: Option<usize>,
    flag_seed: Option<u64>,
    flag_min_cycle_distance: Option<usize>,
    flag_cycles: Option<usize>,
    flag_edge_distance: bool,
    flag_cost_mode: String,
    flag_show_path: bool,
    flag_show_distances: bool,
    flag_text_out: String,
    flag_save_edges: String,
}

// The driver's own errors, with the library's chained in.
mod errors {
    use error_chain::*;
    error_chain! {
        links {
            Graph(::mazegraph::errors::Error, ::mazegraph::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;
    let cost_mode = args.flag_cost_mode.parse::<CostMode>()?;

    let mut rng = match args.flag_seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    let mut graph = MazeGraph::new(Width(args.flag_width), Height(args.flag_height));
    let report = generators::grow_random(&mut graph,
                                         GridPosition::new(0, 0),
                                         args.flag_max_cells.unwrap_or(usize::MAX),
                                         &mut rng)?;
    info!(cells = report.cells_carved, "maze carved");

    if let Some(min_distance) = args.flag_min_cycle_distance {
        let measure = if args.flag_edge_distance {
            DistanceMeasure::Edge
        } else {
            DistanceMeasure::Parent
        };
        let candidates = cycles::potential_cycles(&graph, measure)
            .greater_than(min_distance)
            .collect::<Vec<_>>();
        let chosen = match args.flag_cycles {
            Some(count) => cycles::choose_cycles(candidates, count, &mut rng),
            None => candidates,
        };
        let added = cycles::augment_cycles(&mut graph, chosen)?;
        info!(added, min_distance, "loops added");
    }

    let longest = pathing::longest_path(&graph)?;
    let route = match (longest.first(), longest.last()) {
        (Some(&start), Some(&end)) => {
            let route = pathing::find_shortest_path(&graph, start, end, cost_mode)?;
            info!(steps = route.path.len(), cost = route.cost, %cost_mode, "route found");
            route.path
        }
        _ => vec![],
    };

    let overlay = maze_overlay(&args, &graph, &route)?;
    let text = grid_displays::render(&graph, overlay.as_deref());
    if args.flag_text_out.is_empty() {
        println!("{}", text);
    } else {
        write_text_to_file(&text, &args.flag_text_out)
            .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
    }

    if !args.flag_save_edges.is_empty() {
        save_maze_graph(&graph, &args.flag_save_edges)?;
    }

    Ok(())
}

/// Distances from the route start, the route itself or just its end points.
fn maze_overlay(args: &MazeArgs,
                graph: &MazeGraph,
                route: &[NodeId])
                -> Result<Option<Box<dyn GridDisplay>>> {
    let (start, end) = match (route.first(), route.last()) {
        (Some(&start), Some(&end)) => (start, end),
        _ => return Ok(None),
    };

    let overlay: Box<dyn GridDisplay> = if args.flag_show_distances {
        Box::new(pathing::Distances::new(graph, start)?)
    } else if args.flag_show_path {
        Box::new(PathDisplay::from_nodes(graph, route)?)
    } else {
        let as_smallvec = |id| -> Result<PositionSmallVec> {
            Ok(std::iter::once(graph.node(id)?.position()).collect())
        };
        Box::new(StartEndPointsDisplay::new(as_smallvec(start)?, as_smallvec(end)?))
    };
    Ok(Some(overlay))
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}

fn save_maze_graph(graph: &MazeGraph, file_path: &str) -> Result<()> {
    let edges = graph.nodes()
        .flat_map(|node| node.edges())
        .map(|edge| format!("{} {}", edge.from().index() + 1, edge.to().index() + 1))
        .join("\n");
    let graph_data = format!("{} {}\n{}\n", graph.id_bound(), graph.edge_count(), edges);

    write_text_to_file(&graph_data, file_path)
        .chain_err(|| format!("Failed to write maze graph to text file {}", file_path))?;
    Ok(())
}
