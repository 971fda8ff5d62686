//! Exhaustive exploration of a puzzle's reachable state graph, with
//! per-configuration classification for rendering ghost previews of
//! possible futures.

pub mod game;
pub mod solver;

mod intern;
mod node;
mod queue;
mod view;

#[cfg(feature = "diagrams")]
pub mod diagram;

#[cfg(feature = "example-games")]
pub mod example_games;

pub use game::{Game, Progress};
pub use solver::{Solver, SolverStats};

pub mod prelude {
    pub use crate::game::{Game, Progress};
    pub use crate::solver::{Solver, SolverStats};
}
