mod assignment;
mod config;
mod error;
mod graph;
mod reporter;
mod solver;

pub use assignment::{Assignment, AssignmentSnapshot, Binding};
pub use config::SolverConfig;
pub use error::{GraphError, MatchError, SolveError};
pub use graph::{Node, NodeId, Port, PortGraph, PortId, PortKind};
pub use reporter::{NoOpReporter, Reporter};
pub use solver::{Solution, Solver};
