//! Small synthetic games used by tests and documentation.
//!
//! `TableGame` is a literal finite state machine: ideal for pinning down the
//! solver's behavior edge by edge. `GridGame` is a toy version of the kind of
//! puzzle the solver exists for: a walker on a grid of walls, traps, and one
//! goal.

use anyhow::ensure;

use crate::game::Game;

/// A game given by an explicit transition table.
///
/// States are indices into the table; row `s` holds the successor for each
/// input label, `None` where the input does nothing.
pub struct TableGame {
    num_inputs: usize,
    transitions: Vec<Vec<Option<usize>>>,
    goals: Vec<bool>,
}

impl TableGame {
    /// Panics when a row's width disagrees with `num_inputs` or the goal
    /// vector's length disagrees with the table; these are literals written
    /// in tests, not runtime inputs.
    pub fn new(num_inputs: usize, transitions: Vec<Vec<Option<usize>>>, goals: Vec<bool>) -> Self {
        assert_eq!(transitions.len(), goals.len());
        for row in &transitions {
            assert_eq!(row.len(), num_inputs);
        }
        Self {
            num_inputs,
            transitions,
            goals,
        }
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_states(&self) -> usize {
        self.transitions.len()
    }
}

impl Game for TableGame {
    type State = usize;

    fn transition(&self, state: &usize, input: usize) -> Option<usize> {
        *self.transitions.get(*state)?.get(input)?
    }

    fn has_won(&self, state: &usize) -> bool {
        self.goals.get(*state).copied().unwrap_or(false)
    }
}

/*        █████               █████
         ░░███               ░░███
  █████  ███████    ██████   ███████    ██████
 ███░░  ░░░███░    ░░░░░███ ░░░███░    ███░░███
░░█████   ░███      ███████   ░███    ░███████
 ░░░░███  ░███ ███ ███░░███   ░███ ███░███░░░
 ██████   ░░█████ ░░████████  ░░█████ ░░██████
░░░░░░     ░░░░░   ░░░░░░░░    ░░░░░   ░░░░░░  */

/// Where the walker is and whether the walk has ended.
///
/// Dead and won states are absorbing: no input applies to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridState {
    pub x: usize,
    pub y: usize,
    pub dead: bool,
    pub won: bool,
}

/// Input labels for [`GridGame`].
pub const GRID_INPUTS: usize = 4;

// up, down, left, right
const MOVES: [(isize, isize); GRID_INPUTS] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Floor,
    Wall,
    Trap,
    Goal,
}

/*                            █████          ████
                             ░░███          ░░███
 █████████████    ██████   ███████   ██████  ░███
░░███░░███░░███  ███░░███ ███░░███  ███░░███ ░███
 ░███ ░███ ░███ ░███ ░███░███ ░███ ░███████  ░███
 ░███ ░███ ░███ ░███ ░███░███ ░███ ░███░░░   ░███
 █████░███ █████░░██████ ░░████████░░██████  █████
░░░░░ ░░░ ░░░░░  ░░░░░░   ░░░░░░░░  ░░░░░░  ░░░░░  */

/// A walker on a fixed grid. Walls block, traps kill, the goal wins.
pub struct GridGame {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl GridGame {
    /// Parse a map: `#` wall, `^` trap, `0` goal, `@` start (on floor),
    /// space floor. Returns the game and the start state.
    pub fn parse(map: &str) -> anyhow::Result<(Self, GridState)> {
        let rows: Vec<&str> = map.lines().filter(|line| !line.is_empty()).collect();
        ensure!(!rows.is_empty(), "empty map");
        let height = rows.len();
        let width = rows
            .iter()
            .map(|row| row.chars().count())
            .max()
            .unwrap_or(0);

        let mut cells = vec![Cell::Wall; width * height];
        let mut start = None;
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                cells[y * width + x] = match ch {
                    '#' => Cell::Wall,
                    '^' => Cell::Trap,
                    '0' => Cell::Goal,
                    '@' => {
                        ensure!(start.is_none(), "more than one start position");
                        start = Some((x, y));
                        Cell::Floor
                    }
                    ' ' => Cell::Floor,
                    other => anyhow::bail!("unknown map character {other:?}"),
                };
            }
        }
        let (x, y) = start.ok_or_else(|| anyhow::anyhow!("no start position"))?;

        let game = Self {
            width,
            height,
            cells,
        };
        let state = GridState {
            x,
            y,
            dead: false,
            won: false,
        };
        Ok((game, state))
    }

    /// Cell count; a reasonable intern-bucket count for this game.
    pub fn num_cells(&self) -> usize {
        self.width * self.height
    }

    fn cell(&self, x: usize, y: usize) -> Cell {
        if x >= self.width || y >= self.height {
            return Cell::Wall;
        }
        self.cells[y * self.width + x]
    }
}

impl Game for GridGame {
    type State = GridState;

    fn transition(&self, state: &GridState, input: usize) -> Option<GridState> {
        if state.dead || state.won {
            return None;
        }
        let (dx, dy) = *MOVES.get(input)?;
        let x = state.x.checked_add_signed(dx)?;
        let y = state.y.checked_add_signed(dy)?;
        match self.cell(x, y) {
            Cell::Wall => None,
            Cell::Floor => Some(GridState { x, y, ..*state }),
            Cell::Trap => Some(GridState {
                x,
                y,
                dead: true,
                won: false,
            }),
            Cell::Goal => Some(GridState {
                x,
                y,
                dead: false,
                won: true,
            }),
        }
    }

    fn has_won(&self, state: &GridState) -> bool {
        state.won
    }
}
