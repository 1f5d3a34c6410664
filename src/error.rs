use itertools::Itertools;
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use thiserror::Error;

use crate::assignment::{AssignmentSnapshot, Binding};
use crate::graph::{NodeId, PortId};

/// Why a solve attempt was unsatisfiable, together with the largest partial assignment the search
/// found before giving up.
///
/// The displayed message is the full report:
///
/// ```text
/// Could not satisfy "pattern" from "target": <cause>
/// Max assignment:
/// Node "A" is assigned to "C"
/// Node "B" was not assigned
/// ```
///
/// The cause clause and the assignment section are only present when the corresponding value is.
/// Bindings are listed sorted by label, nodes before ports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolveError<C = MatchError> {
    abstract_desc: String,
    concrete_desc: String,
    cause: Option<C>,
    max_assignment: Option<AssignmentSnapshot>,
}

impl<C> SolveError<C> {
    pub fn new(
        abstract_desc: impl Into<String>,
        concrete_desc: impl Into<String>,
        cause: Option<C>,
        max_assignment: Option<AssignmentSnapshot>,
    ) -> Self {
        Self {
            abstract_desc: abstract_desc.into(),
            concrete_desc: concrete_desc.into(),
            cause,
            max_assignment,
        }
    }

    pub fn abstract_desc(&self) -> &str {
        &self.abstract_desc
    }

    pub fn concrete_desc(&self) -> &str {
        &self.concrete_desc
    }

    /// The underlying reason, if the search identified one
    pub fn cause(&self) -> Option<&C> {
        self.cause.as_ref()
    }

    pub fn max_assignment(&self) -> Option<&AssignmentSnapshot> {
        self.max_assignment.as_ref()
    }
}

fn write_binding(f: &mut Formatter<'_>, element: &str, binding: &Binding) -> std::fmt::Result {
    match &binding.concrete_desc {
        Some(concrete) => writeln!(
            f,
            "{element} {:?} is assigned to {:?}",
            binding.abstract_desc, concrete
        ),
        None => writeln!(f, "{element} {:?} was not assigned", binding.abstract_desc),
    }
}

impl<C: Display> Display for SolveError<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Could not satisfy {:?} from {:?}",
            self.abstract_desc, self.concrete_desc
        )?;

        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }

        if let Some(max_assignment) = &self.max_assignment {
            f.write_str("\nMax assignment:\n")?;
            for binding in max_assignment.nodes().iter().sorted() {
                write_binding(f, "Node", binding)?;
            }
            for binding in max_assignment.ports().iter().sorted() {
                write_binding(f, "Port", binding)?;
            }
        }

        Ok(())
    }
}

impl<C: StdError + 'static> StdError for SolveError<C> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

/// Lower-level reasons a solve can fail, reported as the cause of a [`SolveError`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("the abstract graph has {abstract_nodes} nodes but the concrete graph only has {concrete_nodes}")]
    TooFewNodes {
        abstract_nodes: usize,
        concrete_nodes: usize,
    },
    #[error("node {node:?} needs {needed} ports but no concrete node has more than {available}")]
    InsufficientPorts {
        node: String,
        needed: usize,
        available: usize,
    },
    #[error("no concrete node offers enough ports of kind {kind:?} for port {port:?}")]
    IncompatiblePortKind { port: String, kind: String },
    #[error("no concrete node has a compatible set of ports for node {node:?}")]
    NoCompatibleNode { node: String },
    #[error("search gave up after {0} rounds")]
    SearchLimit(u64),
}

/// Errors raised while building a [`crate::PortGraph`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("{0} description must not be empty")]
    EmptyDescription(&'static str),
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("unknown port {0:?}")]
    UnknownPort(PortId),
    #[error("port {0:?} cannot be connected to itself")]
    SelfLoop(PortId),
    #[error("ports {0:?} and {1:?} are already connected")]
    DuplicateEdge(PortId, PortId),
}
