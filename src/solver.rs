//! Incremental construction and classification of the reachable state graph.
//!
//! A [`Solver`] is seeded with one start configuration and driven by the
//! host: every [`Solver::process`] call expands one queued configuration by
//! asking the [`Game`] for its successors, interning each so that every
//! distinct configuration has exactly one node no matter how many paths lead
//! to it. Expansion is breadth-first and deterministic: the queue is FIFO and
//! transition slots are filled in ascending input order.
//!
//! Independently of exploration, the host moves the *current* node along
//! already-expanded transitions with [`Solver::update`], reclassifies every
//! node relative to it with [`Solver::calc_view_state`], and draws ghost
//! previews of the futures at a chosen look-ahead with [`Solver::render`].

use std::time::Instant;

use anyhow::ensure;
use colored::Colorize;
use human_repr::HumanCount;

use crate::game::{Game, Progress};
use crate::intern::InternTable;
use crate::node::{Arena, NodeId, MAX_STEPS};
use crate::queue::ExploreQueue;
use crate::view;

/// The state-graph solver. See the [module docs](self).
pub struct Solver<G: Game> {
    game: G,
    num_transitions: usize,
    nodes: Arena<G::State>,
    table: InternTable,
    queue: ExploreQueue,
    current: Option<NodeId>,
    view_valid: bool,
    trace_every: Option<usize>,
    processed: usize,
    last_trace: TraceSnapshot,
}

impl<G: Game> Solver<G> {
    /// A solver with `num_hash_buckets` intern buckets for a game with the
    /// input alphabet `0..num_transitions`.
    ///
    /// Bucket count is a pure sizing knob (expected reachable-state count
    /// divided by a small load factor works well); the input count is part
    /// of the game's contract and fixed for the solver's lifetime.
    pub fn new(game: G, num_hash_buckets: usize, num_transitions: usize) -> anyhow::Result<Self> {
        ensure!(num_hash_buckets >= 1, "need at least one hash bucket");
        ensure!(num_transitions >= 1, "need at least one input label");
        Ok(Self {
            game,
            num_transitions,
            nodes: Arena::new(),
            table: InternTable::new(num_hash_buckets),
            queue: ExploreQueue::new(),
            current: None,
            view_valid: false,
            trace_every: None,
            processed: 0,
            last_trace: TraceSnapshot::default(),
        })
    }

    /// Log a progress line after every `every` expansions.
    /// Useful to watch long explorations from the outside.
    pub fn trace_every(mut self, every: usize) -> Self {
        self.trace_every = Some(every.max(1));
        self
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    /// Seed the solver: intern `state`, make it the current node, and queue
    /// it for expansion. Must be called exactly once, before anything else;
    /// repeat calls are a caller error and are ignored.
    pub fn add_start_point(&mut self, state: G::State) {
        if self.current.is_some() {
            tracing::warn!("start point already set; ignoring");
            return;
        }
        let id = self.intern(state);
        self.current = Some(id);
    }

    /// Expand the node at the head of the exploration queue: compute every
    /// successor, intern the new ones (queueing them for their own
    /// expansion), and link all of them into the node's transition slots.
    ///
    /// Returns `true` when the queue is empty afterwards. Calling with an
    /// empty queue is a caller error and returns `true`.
    pub fn process(&mut self) -> bool {
        let Some(id) = self.queue.pop(&mut self.nodes) else {
            tracing::warn!("process called with nothing left to explore");
            return true;
        };
        let mut slots = vec![None; self.num_transitions].into_boxed_slice();
        for (input, slot) in slots.iter_mut().enumerate() {
            let Some(succ) = self.game.transition(&self.nodes[id].state, input) else {
                continue;
            };
            let target = match self.table.find(&self.nodes, &succ) {
                // Already interned: drop the fresh copy, share the node.
                Some(existing) => existing,
                None => self.intern(succ),
            };
            *slot = Some(target);
        }
        self.nodes[id].transitions = Some(slots);
        self.processed += 1;
        self.maybe_trace();
        self.done()
    }

    /// True when every interned configuration has been expanded.
    pub fn done(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drive [`Solver::process`] until the queue is empty or `budget`
    /// expansions have been spent. Returns [`Solver::done`].
    pub fn explore(&mut self, budget: Option<usize>) -> bool {
        let started = Instant::now();
        let before = self.processed;
        let mut remaining = budget.unwrap_or(usize::MAX);
        while remaining > 0 && !self.done() {
            self.process();
            remaining -= 1;
        }
        tracing::debug!(
            processed = self.processed - before,
            interned = self.nodes.len(),
            elapsed = ?started.elapsed(),
            done = self.done(),
            "explore finished",
        );
        self.done()
    }

    /// Advance the current node along transition `input`.
    ///
    /// The graph is untouched. Advancing along a transition that does not
    /// exist, or out of a node that has not been expanded yet, is a caller
    /// error: the current node stays put.
    pub fn update(&mut self, input: usize) {
        let Some(current) = self.current else {
            tracing::warn!("update before add_start_point");
            return;
        };
        if input >= self.num_transitions {
            tracing::warn!(input, "input out of range");
            return;
        }
        match self.nodes[current].transitions.as_deref() {
            None => tracing::warn!(input, "current node not expanded yet; input dropped"),
            Some(slots) => match slots[input] {
                Some(next) => self.current = Some(next),
                None => tracing::warn!(input, "no transition for input from the current state"),
            },
        }
    }

    /// Reclassify every interned node relative to the current node and
    /// return the minimum number of inputs from the current configuration to
    /// any goal configuration, or `None` while no goal is reachable.
    ///
    /// Idempotent; call it whenever the current node or the explored graph
    /// has changed and fresh classification is needed.
    pub fn calc_view_state(&mut self) -> Option<usize> {
        let Some(current) = self.current else {
            tracing::warn!("calc_view_state before add_start_point");
            return None;
        };
        view::label_progress(&mut self.nodes, current);
        let min = view::minimum_goal_distance(&self.nodes);
        if let Some(min_steps) = min {
            if !view::mark_goal_path(&mut self.nodes, current, min_steps) {
                tracing::debug!(min_steps, "goal distance known but no path marked");
            }
        }
        self.view_valid = true;
        min
    }

    /// Invoke the game's render hook on every ghost at exactly `distance`
    /// inputs from the current configuration, in intern order, passing each
    /// node's [`Progress`] and the current state.
    pub fn render(&self, distance: usize) {
        let Some(current) = self.current else {
            tracing::warn!("render before add_start_point");
            return;
        };
        if !self.view_valid {
            tracing::warn!("render before calc_view_state");
            return;
        }
        let current_state = &self.nodes[current].state;
        for node in self.nodes.iter() {
            if node.steps == distance {
                self.game
                    .render_ghost(&node.state, node.progress, current_state);
            }
        }
    }

    /// The configuration the player is considered to be in.
    pub fn current_state(&self) -> Option<&G::State> {
        self.current.map(|id| &self.nodes[id].state)
    }

    /// Number of interned configurations.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every interned configuration, in intern order. Interning is
    /// breadth-first from the start point, so distances from the start are
    /// non-decreasing along this iterator.
    pub fn states(&self) -> impl Iterator<Item = &G::State> {
        self.nodes.iter().map(|node| &node.state)
    }

    /// Every expanded transition as `(from, input, to)`, in intern order of
    /// `from` and ascending input within a node.
    pub fn edges(&self) -> impl Iterator<Item = (&G::State, usize, &G::State)> {
        self.nodes.iter().flat_map(move |node| {
            let slots = node.transitions.as_deref().unwrap_or(&[]);
            slots.iter().enumerate().filter_map(move |(input, &slot)| {
                slot.map(|target| (&node.state, input, &self.nodes[target].state))
            })
        })
    }

    /// Classification of an interned configuration, as of the last
    /// [`Solver::calc_view_state`]. `None` when never interned.
    pub fn progress(&self, state: &G::State) -> Option<Progress> {
        self.table
            .find(&self.nodes, state)
            .map(|id| self.nodes[id].progress)
    }

    /// Minimum input distance from the current configuration, as of the last
    /// [`Solver::calc_view_state`]. `None` when not interned or not
    /// reachable from the current node.
    pub fn distance(&self, state: &G::State) -> Option<usize> {
        self.table.find(&self.nodes, state).and_then(|id| {
            let steps = self.nodes[id].steps;
            (steps != MAX_STEPS).then_some(steps)
        })
    }

    /// A snapshot of the solver's size.
    pub fn stats(&self) -> SolverStats {
        SolverStats {
            interned: self.nodes.len(),
            expanded: self.nodes.iter().filter(|node| node.is_expanded()).count(),
            queued: self.queue.len(),
            goal_states: self.nodes.iter().filter(|node| node.won).count(),
            longest_bucket_chain: self.table.longest_chain(&self.nodes),
        }
    }

    fn intern(&mut self, state: G::State) -> NodeId {
        let won = self.game.has_won(&state);
        let id = self.nodes.alloc(state, won);
        self.table.insert(&mut self.nodes, id);
        self.queue.push(&mut self.nodes, id);
        id
    }

    fn maybe_trace(&mut self) {
        let Some(every) = self.trace_every else {
            return;
        };
        if self.processed % every != 0 {
            return;
        }
        let trace = TraceSnapshot {
            processed: self.processed,
            interned: self.nodes.len(),
            queued: self.queue.len(),
        };
        let interned_diff = diff_str(trace.interned as isize - self.last_trace.interned as isize);
        let queued_diff = diff_str(trace.queued as isize - self.last_trace.queued as isize);
        tracing::info!(
            "processed={:<8} │ interned={:<8} Δ={:<8} │ queued={:<8} Δ={:<8}",
            trace.processed.human_count_bare().to_string(),
            trace.interned.human_count_bare().to_string(),
            interned_diff,
            trace.queued.human_count_bare().to_string(),
            queued_diff,
        );
        self.last_trace = trace;
    }
}

fn diff_str(diff: isize) -> String {
    if diff == 0 {
        "0".white().to_string()
    } else if diff > 0 {
        format!("+{}", diff.human_count_bare()).green().to_string()
    } else {
        format!("{}", diff.human_count_bare()).red().to_string()
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct TraceSnapshot {
    processed: usize,
    interned: usize,
    queued: usize,
}

/// Size snapshot returned by [`Solver::stats`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverStats {
    /// Distinct configurations interned so far.
    pub interned: usize,
    /// How many of them have had their successors computed.
    pub expanded: usize,
    /// How many still wait in the exploration queue.
    pub queued: usize,
    /// Interned configurations satisfying the goal predicate.
    pub goal_states: usize,
    /// Longest intern-bucket chain (hash quality indicator).
    pub longest_bucket_chain: usize,
}

#[cfg(all(test, feature = "example-games"))]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::example_games::TableGame;

    fn drained(game: TableGame, buckets: usize, inputs: usize) -> Solver<TableGame> {
        let mut solver = Solver::new(game, buckets, inputs).expect("valid sizes");
        solver.add_start_point(0);
        while !solver.done() {
            solver.process();
        }
        solver
    }

    /// Two-node chain: start leads to a goal in one input.
    #[test]
    fn chain_to_goal() {
        let game = TableGame::new(
            1,
            vec![vec![Some(1)], vec![None]],
            vec![false, true],
        );
        let mut solver = Solver::new(game, 8, 1).expect("valid sizes");
        solver.add_start_point(0);

        assert!(!solver.process());
        assert!(solver.process());
        assert!(solver.done());
        assert_eq!(solver.node_count(), 2);

        assert_eq!(solver.calc_view_state(), Some(1));
        assert_eq!(solver.progress(&0), Some(Progress::Goal));
        assert_eq!(solver.progress(&1), Some(Progress::Goal));
        assert_eq!(solver.distance(&0), Some(0));
        assert_eq!(solver.distance(&1), Some(1));
    }

    /// A single non-goal state looping into itself.
    #[test]
    fn self_loop_is_a_dead_end() {
        let game = TableGame::new(1, vec![vec![Some(0)]], vec![false]);
        let mut solver = drained(game, 8, 1);

        assert_eq!(solver.node_count(), 1);
        let edges: Vec<_> = solver.edges().map(|(f, i, t)| (*f, i, *t)).collect();
        assert_eq!(edges, vec![(0, 0, 0)]);

        assert_eq!(solver.calc_view_state(), None);
        assert_eq!(solver.progress(&0), Some(Progress::DeadEnd));
    }

    fn diamond() -> TableGame {
        // 0 -> {1, 2}; 1 -> 3; 2 -> 3; 3 is the goal.
        TableGame::new(
            2,
            vec![
                vec![Some(1), Some(2)],
                vec![Some(3), None],
                vec![Some(3), None],
                vec![None, None],
            ],
            vec![false, false, false, true],
        )
    }

    /// Two paths to one shared goal: the shared node is interned once, and
    /// only the input-0 path gets the goal marking.
    #[test]
    fn diamond_marks_one_path() {
        let mut solver = drained(diamond(), 8, 2);

        assert_eq!(solver.node_count(), 4);
        assert_eq!(solver.calc_view_state(), Some(2));
        assert_eq!(solver.progress(&0), Some(Progress::Goal));
        assert_eq!(solver.progress(&1), Some(Progress::Goal));
        assert_eq!(solver.progress(&3), Some(Progress::Goal));
        assert_eq!(solver.progress(&2), Some(Progress::InProcess));
        assert_eq!(solver.distance(&1), Some(1));
        assert_eq!(solver.distance(&2), Some(1));
        assert_eq!(solver.distance(&3), Some(2));
    }

    /// A goal that no transition reaches is never interned.
    #[test]
    fn unreachable_goal() {
        let game = TableGame::new(1, vec![vec![Some(0)], vec![None]], vec![false, true]);
        let mut solver = drained(game, 8, 1);

        assert_eq!(solver.node_count(), 1);
        assert_eq!(solver.calc_view_state(), None);
        assert_eq!(solver.progress(&0), Some(Progress::DeadEnd));
        assert_eq!(solver.progress(&1), None);
    }

    /// Moving the current node reclassifies everything relative to it.
    #[test]
    fn current_node_shift() {
        let mut solver = drained(diamond(), 8, 2);
        solver.update(1);
        assert_eq!(solver.current_state(), Some(&2));

        assert_eq!(solver.calc_view_state(), Some(1));
        assert_eq!(solver.progress(&2), Some(Progress::Goal));
        assert_eq!(solver.progress(&3), Some(Progress::Goal));
        assert_eq!(solver.progress(&0), Some(Progress::DeadEnd));
        assert_eq!(solver.progress(&1), Some(Progress::DeadEnd));
        assert_eq!(solver.distance(&0), None);
        assert_eq!(solver.distance(&1), None);
    }

    /// One bucket forces every lookup through a full chain scan; results are
    /// identical to the spread-out table.
    #[test]
    fn single_bucket_collisions() {
        let mut solver = drained(diamond(), 1, 2);

        assert_eq!(solver.node_count(), 4);
        assert_eq!(solver.stats().longest_bucket_chain, 4);
        assert_eq!(solver.calc_view_state(), Some(2));
        assert_eq!(solver.progress(&0), Some(Progress::Goal));
        assert_eq!(solver.progress(&1), Some(Progress::Goal));
        assert_eq!(solver.progress(&3), Some(Progress::Goal));
        assert_eq!(solver.progress(&2), Some(Progress::InProcess));
    }

    /// Classification straight from the start, before the queue drains:
    /// the frontier counts as in-process, and no goal distance is known yet.
    #[test]
    fn classify_mid_exploration() {
        let game = diamond();
        let mut solver = Solver::new(game, 8, 2).expect("valid sizes");
        solver.add_start_point(0);
        solver.process();

        assert!(!solver.done());
        assert_eq!(solver.calc_view_state(), None);
        assert_eq!(solver.progress(&0), Some(Progress::InProcess));
        assert_eq!(solver.progress(&1), Some(Progress::InProcess));
        assert_eq!(solver.progress(&2), Some(Progress::InProcess));
    }

    #[test]
    fn caller_errors_leave_the_solver_intact() {
        let mut solver = Solver::new(diamond(), 8, 2).expect("valid sizes");
        solver.add_start_point(0);

        // Input before the start node is expanded.
        solver.update(0);
        assert_eq!(solver.current_state(), Some(&0));

        solver.process();
        // Out-of-range input, and an input with no transition.
        solver.update(7);
        assert_eq!(solver.current_state(), Some(&0));
        let mut solver = drained(diamond(), 8, 2);
        solver.update(1);
        solver.update(1);
        assert_eq!(solver.current_state(), Some(&2));

        // A second start point is ignored.
        solver.add_start_point(3);
        assert_eq!(solver.node_count(), 4);

        // Processing an empty queue reports done without side effects.
        assert!(solver.process());
        assert_eq!(solver.node_count(), 4);
    }

    #[test]
    fn rejects_zero_sizes() {
        assert!(Solver::new(diamond(), 0, 2).is_err());
        assert!(Solver::new(diamond(), 8, 0).is_err());
    }

    #[test]
    fn stats_track_exploration() {
        let mut solver = Solver::new(diamond(), 8, 2).expect("valid sizes");
        solver.add_start_point(0);
        solver.process();

        let stats = solver.stats();
        assert_eq!(stats.interned, 3);
        assert_eq!(stats.expanded, 1);
        assert_eq!(stats.queued, 2);
        assert_eq!(stats.goal_states, 0);

        solver.explore(None);
        let stats = solver.stats();
        assert_eq!(stats.interned, 4);
        assert_eq!(stats.expanded, 4);
        assert_eq!(stats.queued, 0);
        assert_eq!(stats.goal_states, 1);
    }

    /// Repeated classification is stable.
    #[test]
    fn calc_view_state_is_idempotent() {
        let mut solver = drained(diamond(), 8, 2);

        let first = solver.calc_view_state();
        let labels: Vec<_> = (0..4).map(|s| (solver.progress(&s), solver.distance(&s))).collect();
        let second = solver.calc_view_state();
        let again: Vec<_> = (0..4).map(|s| (solver.progress(&s), solver.distance(&s))).collect();

        assert_eq!(first, second);
        assert_eq!(labels, again);
    }
}
