//! Grid traversal planning
//!
//! Position/orientation state machine deciding, cell by cell, what to do
//! next. Consumes localizer estimates to correct its belief and turns the
//! next target into an ordered command sequence. Performs no I/O and
//! never calls the localizer or executor directly.

use crate::config::GridConfig;
use crate::error::{DishaError, Result};
use crate::grid::{GridCoordinate, Orientation};
use crate::motion::DriveCommand;
use std::collections::HashSet;

/// Read-only snapshot of traversal progress
#[derive(Debug, Clone)]
pub struct NavigationStatus {
    pub position: GridCoordinate,
    pub orientation: Orientation,
    pub visited: usize,
    pub total: usize,
    pub percent_complete: f32,
    pub is_complete: bool,
}

/// Traversal state machine
///
/// Owns the traversal state exclusively; mutations happen only through
/// the methods below, from the orchestrator's single thread of control.
pub struct NavigationPlanner {
    rows: u32,
    cols: u32,
    position: GridCoordinate,
    orientation: Orientation,
    visited: HashSet<GridCoordinate>,
    targets: Vec<GridCoordinate>,
}

impl NavigationPlanner {
    /// Create a planner with the default snake traversal order.
    pub fn new(grid: &GridConfig) -> Result<Self> {
        Self::with_targets(grid, snake_order(grid.rows, grid.cols))
    }

    /// Create a planner with an injected traversal order.
    ///
    /// The order must cover every cell of the grid exactly once; anything
    /// else is a configuration error and prevents startup.
    pub fn with_targets(grid: &GridConfig, targets: Vec<GridCoordinate>) -> Result<Self> {
        validate_coverage(grid, &targets)?;

        log::info!(
            "NavigationPlanner: Initialized - {}x{} grid, {} targets",
            grid.rows,
            grid.cols,
            targets.len()
        );

        Ok(Self {
            rows: grid.rows,
            cols: grid.cols,
            position: GridCoordinate::new(0, 0),
            orientation: Orientation::North,
            visited: HashSet::new(),
            targets,
        })
    }

    /// Accept a localizer position estimate.
    ///
    /// In-bounds estimates overwrite the current position and mark it
    /// visited. Out-of-bounds estimates are rejected without touching any
    /// state, so localization noise can never corrupt the traversal.
    pub fn update_position(&mut self, row: u32, col: u32) -> bool {
        if row >= self.rows || col >= self.cols {
            log::debug!(
                "NavigationPlanner: Rejected out-of-bounds estimate ({}, {})",
                row,
                col
            );
            return false;
        }
        self.position = GridCoordinate::new(row, col);
        self.visited.insert(self.position);
        true
    }

    /// First entry of the fixed order not yet visited
    pub fn next_target(&self) -> Option<GridCoordinate> {
        self.targets
            .iter()
            .find(|t| !self.visited.contains(t))
            .copied()
    }

    /// Command sequence from the current cell to `target`.
    ///
    /// Paths are unit grid-steps, row difference first, then column - a
    /// deliberate policy, not a shortest-path search. Each physical
    /// direction change emits at most two turns; a 180° change resolves
    /// to two right turns as a fixed tie-break. The recorded orientation
    /// is committed as soon as the turns are appended because commands
    /// execute strictly in emitted order.
    pub fn commands_to(&mut self, target: GridCoordinate) -> Vec<DriveCommand> {
        let mut commands = Vec::new();
        let mut row = self.position.row;
        let mut col = self.position.col;

        while row != target.row {
            let step = if row < target.row {
                row += 1;
                Orientation::South
            } else {
                row -= 1;
                Orientation::North
            };
            self.face(step, &mut commands);
            commands.push(DriveCommand::MoveForward);
        }

        while col != target.col {
            let step = if col < target.col {
                col += 1;
                Orientation::East
            } else {
                col -= 1;
                Orientation::West
            };
            self.face(step, &mut commands);
            commands.push(DriveCommand::MoveForward);
        }

        commands
    }

    fn face(&mut self, target: Orientation, commands: &mut Vec<DriveCommand>) {
        match self.orientation.quarter_turns_to(target) {
            0 => {}
            1 => commands.push(DriveCommand::TurnRight90),
            2 => {
                // Both rotation senses cost two turns; fixed tie-break
                commands.push(DriveCommand::TurnRight90);
                commands.push(DriveCommand::TurnRight90);
            }
            _ => commands.push(DriveCommand::TurnLeft90),
        }
        self.orientation = target;
    }

    /// True iff every target coordinate has been visited
    pub fn is_complete(&self) -> bool {
        self.targets.iter().all(|t| self.visited.contains(t))
    }

    /// Current traversal snapshot for observability
    pub fn status(&self) -> NavigationStatus {
        let total = self.targets.len();
        let visited = self.visited.len();
        NavigationStatus {
            position: self.position,
            orientation: self.orientation,
            visited,
            total,
            percent_complete: if total > 0 {
                visited as f32 / total as f32 * 100.0
            } else {
                0.0
            },
            is_complete: self.is_complete(),
        }
    }

    /// Clear position, orientation, and visit history; the fixed target
    /// order is untouched.
    pub fn reset(&mut self) {
        self.position = GridCoordinate::new(0, 0);
        self.orientation = Orientation::North;
        self.visited.clear();
        log::info!("NavigationPlanner: Reset");
    }

    /// Replace the traversal order and clear the visit history.
    pub fn set_targets(&mut self, targets: Vec<GridCoordinate>) -> Result<()> {
        let grid = GridConfig {
            rows: self.rows,
            cols: self.cols,
        };
        validate_coverage(&grid, &targets)?;
        log::info!("NavigationPlanner: Custom targets set ({} cells)", targets.len());
        self.targets = targets;
        self.visited.clear();
        Ok(())
    }

    /// Not-yet-visited targets, in traversal order
    pub fn remaining_targets(&self) -> Vec<GridCoordinate> {
        self.targets
            .iter()
            .filter(|t| !self.visited.contains(t))
            .copied()
            .collect()
    }

    pub fn position(&self) -> GridCoordinate {
        self.position
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }
}

/// Boustrophedon coverage order: even rows left-to-right, odd rows
/// right-to-left, every cell exactly once.
pub fn snake_order(rows: u32, cols: u32) -> Vec<GridCoordinate> {
    let mut order = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows {
        if row % 2 == 0 {
            for col in 0..cols {
                order.push(GridCoordinate::new(row, col));
            }
        } else {
            for col in (0..cols).rev() {
                order.push(GridCoordinate::new(row, col));
            }
        }
    }
    order
}

fn validate_coverage(grid: &GridConfig, targets: &[GridCoordinate]) -> Result<()> {
    let expected = (grid.rows * grid.cols) as usize;
    if targets.len() != expected {
        return Err(DishaError::Config(format!(
            "Target order has {} entries, expected {} for a {}x{} grid",
            targets.len(),
            expected,
            grid.rows,
            grid.cols
        )));
    }

    let mut seen = HashSet::with_capacity(expected);
    for target in targets {
        if target.row >= grid.rows || target.col >= grid.cols {
            return Err(DishaError::Config(format!(
                "Target {} outside {}x{} grid",
                target, grid.rows, grid.cols
            )));
        }
        if !seen.insert(*target) {
            return Err(DishaError::Config(format!(
                "Target {} appears more than once",
                target
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: u32, cols: u32) -> GridConfig {
        GridConfig { rows, cols }
    }

    #[test]
    fn test_snake_order_covers_every_cell_once() {
        for (rows, cols) in [(1, 1), (2, 3), (4, 5), (7, 2)] {
            let order = snake_order(rows, cols);
            assert_eq!(order.len(), (rows * cols) as usize);

            let unique: HashSet<_> = order.iter().copied().collect();
            assert_eq!(unique.len(), order.len());
            for row in 0..rows {
                for col in 0..cols {
                    assert!(unique.contains(&GridCoordinate::new(row, col)));
                }
            }
        }
    }

    #[test]
    fn test_snake_order_alternates_direction() {
        let order = snake_order(4, 5);
        assert_eq!(order[0], GridCoordinate::new(0, 0));
        assert_eq!(order[4], GridCoordinate::new(0, 4));
        // Odd row starts at its rightmost cell
        assert_eq!(order[5], GridCoordinate::new(1, 4));
        assert_eq!(order[9], GridCoordinate::new(1, 0));
        assert_eq!(order[10], GridCoordinate::new(2, 0));
    }

    #[test]
    fn test_update_position_bounds() {
        let mut planner = NavigationPlanner::new(&grid(4, 5)).unwrap();

        assert!(planner.update_position(2, 3));
        assert_eq!(planner.position(), GridCoordinate::new(2, 3));
        assert_eq!(planner.status().visited, 1);

        // Out-of-bounds input leaves everything untouched
        assert!(!planner.update_position(4, 0));
        assert!(!planner.update_position(0, 5));
        assert_eq!(planner.position(), GridCoordinate::new(2, 3));
        assert_eq!(planner.status().visited, 1);
    }

    #[test]
    fn test_next_target_follows_fixed_order() {
        let mut planner = NavigationPlanner::new(&grid(4, 5)).unwrap();
        assert_eq!(planner.next_target(), Some(GridCoordinate::new(0, 0)));

        planner.update_position(0, 0);
        assert_eq!(planner.next_target(), Some(GridCoordinate::new(0, 1)));
    }

    #[test]
    fn test_commands_to_adjacent_cell() {
        let mut planner = NavigationPlanner::new(&grid(4, 5)).unwrap();
        planner.update_position(0, 0);

        let commands = planner.commands_to(GridCoordinate::new(0, 1));
        assert_eq!(
            commands,
            vec![DriveCommand::TurnRight90, DriveCommand::MoveForward]
        );
        assert_eq!(planner.orientation(), Orientation::East);
    }

    #[test]
    fn test_commands_to_reverse_direction() {
        let mut planner = NavigationPlanner::new(&grid(4, 5)).unwrap();
        planner.update_position(1, 3);
        // Face east first
        planner.commands_to(GridCoordinate::new(1, 4));
        planner.update_position(1, 3);
        assert_eq!(planner.orientation(), Orientation::East);

        let commands = planner.commands_to(GridCoordinate::new(1, 1));
        assert_eq!(
            commands,
            vec![
                DriveCommand::TurnRight90,
                DriveCommand::TurnRight90,
                DriveCommand::MoveForward,
                DriveCommand::MoveForward,
            ]
        );
        assert_eq!(planner.orientation(), Orientation::West);
    }

    #[test]
    fn test_commands_to_row_then_column() {
        let mut planner = NavigationPlanner::new(&grid(4, 5)).unwrap();
        planner.update_position(0, 0);

        let commands = planner.commands_to(GridCoordinate::new(2, 1));
        assert_eq!(
            commands,
            vec![
                // Close the row difference first: face south (180° from north)
                DriveCommand::TurnRight90,
                DriveCommand::TurnRight90,
                DriveCommand::MoveForward,
                DriveCommand::MoveForward,
                // Then the column: east is one left turn from south
                DriveCommand::TurnLeft90,
                DriveCommand::MoveForward,
            ]
        );
        assert_eq!(planner.orientation(), Orientation::East);
    }

    #[test]
    fn test_one_forward_per_unit_step() {
        let mut planner = NavigationPlanner::new(&grid(6, 6)).unwrap();
        planner.update_position(0, 0);

        let commands = planner.commands_to(GridCoordinate::new(4, 3));
        let forwards = commands
            .iter()
            .filter(|c| **c == DriveCommand::MoveForward)
            .count();
        assert_eq!(forwards, 7); // 4 row steps + 3 column steps

        // Same-facing target emits no turns at all
        planner.update_position(4, 3);
        let straight = planner.commands_to(GridCoordinate::new(4, 5));
        assert_eq!(
            straight,
            vec![DriveCommand::MoveForward, DriveCommand::MoveForward]
        );
    }

    #[test]
    fn test_completion_is_monotonic() {
        let mut planner = NavigationPlanner::new(&grid(2, 2)).unwrap();
        assert!(!planner.is_complete());

        planner.update_position(0, 0);
        planner.update_position(0, 1);
        planner.update_position(1, 0);
        assert!(!planner.is_complete());

        planner.update_position(1, 1);
        assert!(planner.is_complete());

        // Re-visiting never un-completes
        planner.update_position(0, 0);
        assert!(planner.is_complete());
        assert_eq!(planner.status().percent_complete, 100.0);
    }

    #[test]
    fn test_reset_clears_state_keeps_targets() {
        let mut planner = NavigationPlanner::new(&grid(2, 2)).unwrap();
        planner.update_position(1, 1);
        planner.commands_to(GridCoordinate::new(1, 0));
        planner.reset();

        assert_eq!(planner.position(), GridCoordinate::new(0, 0));
        assert_eq!(planner.orientation(), Orientation::North);
        assert_eq!(planner.status().visited, 0);
        assert_eq!(planner.status().total, 4);
    }

    #[test]
    fn test_custom_targets_validated() {
        let mut planner = NavigationPlanner::new(&grid(2, 2)).unwrap();

        // Missing a cell
        let short = vec![
            GridCoordinate::new(0, 0),
            GridCoordinate::new(0, 1),
            GridCoordinate::new(1, 0),
        ];
        assert!(planner.set_targets(short).is_err());

        // Duplicate cell
        let duped = vec![
            GridCoordinate::new(0, 0),
            GridCoordinate::new(0, 0),
            GridCoordinate::new(1, 0),
            GridCoordinate::new(1, 1),
        ];
        assert!(planner.set_targets(duped).is_err());

        // Reverse snake is a valid covering order
        let mut reversed = snake_order(2, 2);
        reversed.reverse();
        assert!(planner.set_targets(reversed.clone()).is_ok());
        assert_eq!(planner.next_target(), Some(reversed[0]));
    }

    #[test]
    fn test_remaining_targets_in_order() {
        let mut planner = NavigationPlanner::new(&grid(2, 2)).unwrap();
        planner.update_position(0, 0);
        planner.update_position(0, 1);

        let remaining = planner.remaining_targets();
        assert_eq!(
            remaining,
            vec![GridCoordinate::new(1, 1), GridCoordinate::new(1, 0)]
        );
    }
}
