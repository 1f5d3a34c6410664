use crate::graph::{NodeId, PortGraph};
use crate::solver::Solution;
use crate::SolveError;

/// Observer of a running search. Every hook defaults to doing nothing.
pub trait Reporter {
    /// Called before the search starts
    fn starting(&self, _abstract_graph: &PortGraph, _concrete_graph: &PortGraph) {}

    /// Called before each pin attempt
    fn starting_round(&self, _index: u64) {}

    /// Called when an abstract node is placed onto a concrete node
    fn pinning(&self, _abstract_node: NodeId, _concrete_node: NodeId) {}

    /// Called when the search abandons the alternatives of a node and steps back
    fn backtracked(&self, _steps: u64) {}

    /// Called after the search ends successfully
    fn ending(&self, _solution: &Solution) {}

    /// Called after the search ends unsuccessfully, with the error that is about to be returned
    fn failed(&self, _error: &SolveError) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpReporter;

impl Reporter for NoOpReporter {}
