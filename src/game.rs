//! The capability a puzzle must provide so that its state space can be
//! explored.

use std::fmt::Debug;
use std::hash::Hash;

/// Classification of a configuration relative to the current one.
///
/// Recomputed by [`Solver::calc_view_state`](crate::Solver::calc_view_state);
/// renderers typically use it to pick how loudly to draw a ghost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Progress {
    /// No goal configuration is reachable from here.
    #[display("dead-end")]
    DeadEnd,
    /// Something is still reachable from here: a goal, or unexplored
    /// territory.
    #[display("in-process")]
    InProcess,
    /// On the chosen shortest path from the current configuration to a goal.
    #[display("goal")]
    Goal,
}

/// A deterministic, turn-based puzzle with a finite input alphabet.
///
/// The solver knows nothing about the puzzle besides this trait: states are
/// opaque values compared with `Eq` and bucketed by `Hash`, and the input
/// alphabet is the integers `0..num_transitions` handed to the solver at
/// construction time.
pub trait Game {
    /// One configuration of the puzzle. Two states that compare equal must
    /// hash identically and behave identically under [`Game::transition`]
    /// and [`Game::has_won`].
    type State: Eq + Hash + Debug;

    /// The effect of one input on a state: a newly-owned successor, or
    /// `None` when the input does nothing from here.
    ///
    /// Must be deterministic: calling twice with the same input on equal
    /// states must return equal states.
    fn transition(&self, state: &Self::State, input: usize) -> Option<Self::State>;

    /// Goal predicate.
    fn has_won(&self, state: &Self::State) -> bool;

    /// Rendering hook for ghost previews, invoked only from
    /// [`Solver::render`](crate::Solver::render). `current` is the state the
    /// player is actually in. Must not call back into the solver.
    fn render_ghost(&self, state: &Self::State, progress: Progress, current: &Self::State) {
        let _ = (state, progress, current);
    }
}
