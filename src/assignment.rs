use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::graph::{NodeId, PortGraph, PortId};

/// A possibly partial mapping from the elements of an abstract graph to those of a concrete graph.
///
/// Every abstract node and port is present; the ones the search has not placed (yet) map to
/// `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment {
    nodes: FxHashMap<NodeId, Option<NodeId>>,
    ports: FxHashMap<PortId, Option<PortId>>,
}

impl Assignment {
    /// An assignment in which nothing of `abstract_graph` has been placed
    pub fn unassigned(abstract_graph: &PortGraph) -> Self {
        Self {
            nodes: abstract_graph.nodes().map(|n| (n, None)).collect(),
            ports: abstract_graph.ports().map(|p| (p, None)).collect(),
        }
    }

    pub fn node(&self, abstract_node: NodeId) -> Option<NodeId> {
        self.nodes.get(&abstract_node).copied().flatten()
    }

    pub fn port(&self, abstract_port: PortId) -> Option<PortId> {
        self.ports.get(&abstract_port).copied().flatten()
    }

    pub fn assign_node(&mut self, abstract_node: NodeId, concrete_node: NodeId) {
        self.nodes.insert(abstract_node, Some(concrete_node));
    }

    pub fn assign_port(&mut self, abstract_port: PortId, concrete_port: PortId) {
        self.ports.insert(abstract_port, Some(concrete_port));
    }

    /// Removes the node's placement, together with the placement of every port it owns
    pub fn unassign_node(&mut self, abstract_graph: &PortGraph, abstract_node: NodeId) {
        self.nodes.insert(abstract_node, None);
        for &port in abstract_graph.node_ports(abstract_node) {
            self.ports.insert(port, None);
        }
    }

    pub fn assigned_nodes(&self) -> usize {
        self.nodes.values().filter(|c| c.is_some()).count()
    }

    pub fn assigned_ports(&self) -> usize {
        self.ports.values().filter(|c| c.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.nodes.values().all(Option::is_some) && self.ports.values().all(Option::is_some)
    }

    /// Resolves the assignment into display labels, so it can outlive the graphs
    pub fn snapshot(
        &self,
        abstract_graph: &PortGraph,
        concrete_graph: &PortGraph,
    ) -> AssignmentSnapshot {
        let nodes = self
            .nodes
            .iter()
            .sorted_by_key(|(&a, _)| a)
            .filter_map(|(&a, c)| {
                let abstract_desc = abstract_graph.node(a)?.desc().to_string();
                let concrete_desc = c
                    .and_then(|c| concrete_graph.node(c))
                    .map(|c| c.desc().to_string());
                Some(Binding {
                    abstract_desc,
                    concrete_desc,
                })
            })
            .collect();

        let ports = self
            .ports
            .iter()
            .sorted_by_key(|(&a, _)| a)
            .filter_map(|(&a, c)| {
                let abstract_desc = abstract_graph.port(a)?.desc().to_string();
                let concrete_desc = c
                    .and_then(|c| concrete_graph.port(c))
                    .map(|c| c.desc().to_string());
                Some(Binding {
                    abstract_desc,
                    concrete_desc,
                })
            })
            .collect();

        AssignmentSnapshot { nodes, ports }
    }
}

/// The placement of a single abstract node or port, by label
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Binding {
    pub abstract_desc: String,
    pub concrete_desc: Option<String>,
}

/// A read-only, label-level copy of an [`Assignment`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssignmentSnapshot {
    nodes: Vec<Binding>,
    ports: Vec<Binding>,
}

impl AssignmentSnapshot {
    pub fn new(nodes: Vec<Binding>, ports: Vec<Binding>) -> Self {
        Self { nodes, ports }
    }

    pub fn assigned_node(mut self, abstract_desc: &str, concrete_desc: &str) -> Self {
        self.nodes.push(Binding {
            abstract_desc: abstract_desc.to_string(),
            concrete_desc: Some(concrete_desc.to_string()),
        });
        self
    }

    pub fn unassigned_node(mut self, abstract_desc: &str) -> Self {
        self.nodes.push(Binding {
            abstract_desc: abstract_desc.to_string(),
            concrete_desc: None,
        });
        self
    }

    pub fn assigned_port(mut self, abstract_desc: &str, concrete_desc: &str) -> Self {
        self.ports.push(Binding {
            abstract_desc: abstract_desc.to_string(),
            concrete_desc: Some(concrete_desc.to_string()),
        });
        self
    }

    pub fn unassigned_port(mut self, abstract_desc: &str) -> Self {
        self.ports.push(Binding {
            abstract_desc: abstract_desc.to_string(),
            concrete_desc: None,
        });
        self
    }

    pub fn nodes(&self) -> &[Binding] {
        &self.nodes
    }

    pub fn ports(&self) -> &[Binding] {
        &self.ports
    }
}
