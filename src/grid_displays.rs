use std::fmt;

use crate::coordinates::{Direction, GridPosition, PositionSmallVec};
use crate::errors::*;
use crate::graph::{MazeGraph, NodeId};
use crate::pathing::Distances;
use crate::utils::FnvHashSet;

/// Text for the inside of a cell. Bodies are three characters wide.
pub trait GridDisplay {
    fn render_cell_body(&self, graph: &MazeGraph, position: GridPosition) -> String;
}

impl GridDisplay for Distances {
    fn render_cell_body(&self, graph: &MazeGraph, position: GridPosition) -> String {
        graph.node_id_at(position)
            .and_then(|id| self.distance_from_start_to(id))
            // centre align, padding 3, lowercase hexadecimal
            .map_or_else(|| String::from("   "), |d| format!("{:^3x}", d))
    }
}

#[derive(Debug, Clone)]
pub struct PathDisplay {
    on_path_positions: FnvHashSet<GridPosition>,
}

impl PathDisplay {
    pub fn new(path: &[GridPosition]) -> PathDisplay {
        PathDisplay { on_path_positions: path.iter().cloned().collect() }
    }

    /// From a path of node ids, as returned by the path finders.
    pub fn from_nodes(graph: &MazeGraph, path: &[NodeId]) -> Result<PathDisplay> {
        let positions = path.iter()
            .map(|id| graph.node(*id).map(|node| node.position()))
            .collect::<Result<Vec<_>>>()?;
        Ok(PathDisplay::new(&positions))
    }
}

impl GridDisplay for PathDisplay {
    fn render_cell_body(&self, _: &MazeGraph, position: GridPosition) -> String {
        if self.on_path_positions.contains(&position) {
            String::from(" . ")
        } else {
            String::from("   ")
        }
    }
}

#[derive(Debug, Clone)]
pub struct StartEndPointsDisplay {
    start_positions: PositionSmallVec,
    end_positions: PositionSmallVec,
}

impl StartEndPointsDisplay {
    pub fn new(starts: PositionSmallVec, ends: PositionSmallVec) -> StartEndPointsDisplay {
        StartEndPointsDisplay {
            start_positions: starts,
            end_positions: ends,
        }
    }
}

impl GridDisplay for StartEndPointsDisplay {
    fn render_cell_body(&self, _: &MazeGraph, position: GridPosition) -> String {
        if self.start_positions.contains(&position) {
            String::from(" S ")
        } else if self.end_positions.contains(&position) {
            String::from(" E ")
        } else {
            String::from("   ")
        }
    }
}

/// Box drawing of the whole `width` x `height` area. A wall is drawn between two neighbouring
/// cells unless there is an edge between their nodes in either direction. Cells outside the mask
/// are shaded.
pub fn render(graph: &MazeGraph, overlay: Option<&dyn GridDisplay>) -> String {
    const WALL_L: &str = "╴";
    const WALL_R: &str = "╶";
    const WALL_U: &str = "╵";
    const WALL_D: &str = "╷";
    const WALL_LR_3: &str = "───";
    const WALL_LR: &str = "─";
    const WALL_UD: &str = "│";
    const WALL_LD: &str = "┐";
    const WALL_RU: &str = "└";
    const WALL_LU: &str = "┘";
    const WALL_RD: &str = "┌";
    const WALL_LRU: &str = "┴";
    const WALL_LRD: &str = "┬";
    const WALL_LRUD: &str = "┼";
    const WALL_RUD: &str = "├";
    const WALL_LUD: &str = "┤";
    const DEFAULT_BODY: &str = "   ";
    const MASKED_BODY: &str = "░░░";

    let (columns_count, rows_count) = (graph.width(), graph.height());
    if columns_count == 0 || rows_count == 0 {
        return String::new();
    }
    let at = |x: usize, y: usize| GridPosition::new(x as i32, y as i32);
    let linked = |position: GridPosition, direction| is_neighbour_linked(graph, position, direction);

    // The north most boundary is special cased, every row after draws only its own south side.
    let mut output = String::from(WALL_RD);
    for x in 0..columns_count {
        output.push_str(WALL_LR_3);
        if linked(at(x, 0), Direction::Right) {
            output.push_str(WALL_LR);
        } else if x == columns_count - 1 {
            output.push_str(WALL_LD);
        } else {
            output.push_str(WALL_LRD);
        }
    }
    output.push('\n');

    for y in 0..rows_count {
        let is_last_row = y == rows_count - 1;

        let mut row_middle_section_render = String::from(WALL_UD);
        let mut row_bottom_section_render = String::new();

        for x in 0..columns_count {
            let position = at(x, y);
            let is_last_column = x == columns_count - 1;
            let east_open = linked(position, Direction::Right);
            let south_open = linked(position, Direction::Down);

            let body = if !graph.is_valid_position(position) {
                String::from(MASKED_BODY)
            } else {
                overlay.map_or_else(|| String::from(DEFAULT_BODY),
                                    |displayer| displayer.render_cell_body(graph, position))
            };
            row_middle_section_render.push_str(&body);
            row_middle_section_render.push_str(if east_open { " " } else { WALL_UD });

            if x == 0 {
                row_bottom_section_render.push_str(if is_last_row {
                    WALL_RU
                } else if south_open {
                    WALL_UD
                } else {
                    WALL_RUD
                });
            }
            row_bottom_section_render.push_str(if south_open { "   " } else { WALL_LR_3 });

            let corner = match (is_last_row, is_last_column) {
                (true, true) => WALL_LU,
                (true, false) => if east_open { WALL_LR } else { WALL_LRU },
                (false, true) => if south_open { WALL_UD } else { WALL_LUD },
                (false, false) => {
                    let access_se_from_east = position.offset(Direction::Right)
                        .map_or(false, |east| linked(east, Direction::Down));
                    let access_se_from_south = position.offset(Direction::Down)
                        .map_or(false, |south| linked(south, Direction::Right));
                    let show_right_section = !access_se_from_east;
                    let show_down_section = !access_se_from_south;
                    let show_up_section = !east_open;
                    let show_left_section = !south_open;

                    match (show_left_section,
                           show_right_section,
                           show_up_section,
                           show_down_section) {
                        (true, true, true, true) => WALL_LRUD,
                        (true, true, true, false) => WALL_LRU,
                        (true, true, false, true) => WALL_LRD,
                        (true, false, true, true) => WALL_LUD,
                        (false, true, true, true) => WALL_RUD,
                        (true, true, false, false) => WALL_LR,
                        (false, false, true, true) => WALL_UD,
                        (false, true, true, false) => WALL_RU,
                        (true, false, false, true) => WALL_LD,
                        (true, false, true, false) => WALL_LU,
                        (false, true, false, true) => WALL_RD,
                        (true, false, false, false) => WALL_L,
                        (false, true, false, false) => WALL_R,
                        (false, false, true, false) => WALL_U,
                        (false, false, false, true) => WALL_D,
                        _ => " ",
                    }
                }
            };
            row_bottom_section_render.push_str(corner);
        }

        output.push_str(&row_middle_section_render);
        output.push('\n');
        output.push_str(&row_bottom_section_render);
        output.push('\n');
    }

    output
}

// Only neighbours inside the drawable area count, so edges leaving the grid keep their wall.
fn is_neighbour_linked(graph: &MazeGraph, position: GridPosition, direction: Direction) -> bool {
    let neighbour = graph.neighbour_at_direction(position, direction)
        .and_then(|neighbour| graph.node_id_at(neighbour));
    match (graph.node_id_at(position), neighbour) {
        (Some(a), Some(b)) => graph.is_connected(a, b),
        _ => false,
    }
}

impl fmt::Display for MazeGraph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", render(self, None))
    }
}
