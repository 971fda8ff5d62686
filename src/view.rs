//! The classification passes.
//!
//! [`Solver::calc_view_state`](crate::Solver::calc_view_state) runs three
//! passes over the node graph, all rooted at the current node:
//!
//! 1. [`label_progress`]: label every node dead-end or in-process and record
//!    its minimum edge distance from the current node in `steps`.
//! 2. [`minimum_goal_distance`]: the shortest distance to any goal node, if
//!    one is reachable.
//! 3. [`mark_goal_path`]: upgrade one shortest current-to-goal path to
//!    [`Progress::Goal`], lowest input label first.
//!
//! The graph is cyclic and its diameter is unbounded, so every pass runs on
//! an explicit stack rather than native recursion.

use crate::game::Progress;
use crate::node::{Arena, NodeId, MAX_STEPS};

/// Probing one transition slot of an expanded node.
enum SlotProbe {
    /// The slot holds a successor.
    Child(NodeId),
    /// The slot exists but the input does nothing from this state.
    Empty,
    /// Past the last slot.
    End,
}

fn slot_at<S>(nodes: &Arena<S>, id: NodeId, input: usize) -> SlotProbe {
    match nodes[id].transitions.as_deref() {
        Some(slots) if input < slots.len() => match slots[input] {
            Some(child) => SlotProbe::Child(child),
            None => SlotProbe::Empty,
        },
        _ => SlotProbe::End,
    }
}

/// Pass 1. Depth-first from the current node, re-entering a node only when
/// arriving on a strictly shorter path, so `steps` converges to the exact
/// minimum distance and total work stays bounded by distance improvements.
///
/// Arriving at a node on a path no shorter than its recorded `steps` reports
/// the node's stored label instead of descending: goal nodes and unexpanded
/// frontier nodes store in-process, so a shared successor counts as progress
/// for every parent that reaches it, not only the first one.
pub(crate) fn label_progress<S>(nodes: &mut Arena<S>, current: NodeId) {
    for node in nodes.iter_mut() {
        node.steps = MAX_STEPS;
        node.progress = Progress::DeadEnd;
    }

    struct Frame {
        id: NodeId,
        depth: usize,
        next_input: usize,
        agg: Progress,
    }

    /// Start a visit of `id` at `depth`. Returns the visit's result when it
    /// resolves without descending, or pushes a frame and returns `None`.
    fn begin<S>(
        nodes: &mut Arena<S>,
        stack: &mut Vec<Frame>,
        id: NodeId,
        depth: usize,
    ) -> Option<Progress> {
        let node = &mut nodes[id];
        if depth >= node.steps {
            return Some(node.progress);
        }
        node.steps = depth;
        if !node.is_expanded() {
            // Frontier: unexplored territory is always worth walking toward.
            node.progress = Progress::InProcess;
            return Some(Progress::InProcess);
        }
        stack.push(Frame {
            id,
            depth,
            next_input: 0,
            agg: Progress::DeadEnd,
        });
        None
    }

    let mut stack: Vec<Frame> = Vec::new();
    let mut pending = begin(nodes, &mut stack, current, 0);

    while let Some(frame) = stack.last_mut() {
        if let Some(result) = pending.take() {
            if result != Progress::DeadEnd {
                frame.agg = Progress::InProcess;
            }
        }
        let id = frame.id;
        let depth = frame.depth;
        let input = frame.next_input;
        let agg = frame.agg;
        frame.next_input += 1;
        match slot_at(nodes, id, input) {
            SlotProbe::Child(child) => {
                pending = begin(nodes, &mut stack, child, depth + 1);
            }
            SlotProbe::Empty => {}
            SlotProbe::End => {
                stack.pop();
                let node = &mut nodes[id];
                let result = if node.won { Progress::InProcess } else { agg };
                node.progress = result;
                pending = Some(result);
            }
        }
    }
}

/// Pass 2. Pass 1 left `steps` at the exact minimum distance on every node it
/// reached and [`MAX_STEPS`] elsewhere, so the minimum goal distance reads
/// straight off the arena. Unexpanded goal nodes do not count: their
/// transitions are unknown, and the host has not finished processing.
pub(crate) fn minimum_goal_distance<S>(nodes: &Arena<S>) -> Option<usize> {
    nodes
        .iter()
        .filter(|node| node.won && node.is_expanded() && node.steps != MAX_STEPS)
        .map(|node| node.steps)
        .min()
}

/// Pass 3. Walk the shortest-path DAG (edges that arrive at a node exactly at
/// its recorded `steps`), lowest input label first, and mark every node on
/// the first path that reaches a goal node at distance `min_steps`. Siblings
/// after the first success are not explored, so exactly one path is marked.
pub(crate) fn mark_goal_path<S>(nodes: &mut Arena<S>, current: NodeId, min_steps: usize) -> bool {
    enum Probe {
        Success,
        Fail,
        Descend,
    }

    fn probe<S>(
        nodes: &Arena<S>,
        failed: &[bool],
        id: NodeId,
        depth: usize,
        min_steps: usize,
    ) -> Probe {
        let node = &nodes[id];
        if depth > node.steps || !node.is_expanded() || failed[id.0] {
            return Probe::Fail;
        }
        if node.won && node.steps == min_steps {
            return Probe::Success;
        }
        Probe::Descend
    }

    struct Frame {
        id: NodeId,
        next_input: usize,
    }

    // A node that failed once fails forever: it is only ever re-entered at
    // the same depth (its own `steps`), with the same `min_steps`.
    let mut failed = vec![false; nodes.len()];
    let mut stack: Vec<Frame> = Vec::new();

    match probe(nodes, &failed, current, 0, min_steps) {
        Probe::Success => {
            nodes[current].progress = Progress::Goal;
            return true;
        }
        Probe::Fail => return false,
        Probe::Descend => stack.push(Frame {
            id: current,
            next_input: 0,
        }),
    }

    while let Some(frame) = stack.last_mut() {
        let id = frame.id;
        let input = frame.next_input;
        frame.next_input += 1;
        let depth = stack.len() - 1;
        match slot_at(nodes, id, input) {
            SlotProbe::Child(child) => match probe(nodes, &failed, child, depth + 1, min_steps) {
                Probe::Success => {
                    nodes[child].progress = Progress::Goal;
                    for frame in &stack {
                        nodes[frame.id].progress = Progress::Goal;
                    }
                    return true;
                }
                Probe::Fail => {}
                Probe::Descend => stack.push(Frame {
                    id: child,
                    next_input: 0,
                }),
            },
            SlotProbe::Empty => {}
            SlotProbe::End => {
                failed[id.0] = true;
                stack.pop();
            }
        }
    }
    false
}
