use petgraph::graphmap::UnGraphMap;
use std::fmt::{Display, Formatter};
use std::ops::Index;

use crate::error::GraphError;

/// Index of a node within a single [`PortGraph`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a port within a single [`PortGraph`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortId(u32);

impl PortId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The type of a connection point. An abstract port can only be assigned to a concrete port of
/// the same kind.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortKind(String);

impl PortKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PortKind {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

impl From<String> for PortKind {
    fn from(kind: String) -> Self {
        Self(kind)
    }
}

impl Display for PortKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    desc: String,
    ports: Vec<PortId>,
}

impl Node {
    pub fn desc(&self) -> &str {
        &self.desc
    }

    /// The ports owned by this node, in insertion order
    pub fn ports(&self) -> &[PortId] {
        &self.ports
    }
}

#[derive(Clone, Debug)]
pub struct Port {
    desc: String,
    node: NodeId,
    kind: PortKind,
}

impl Port {
    pub fn desc(&self) -> &str {
        &self.desc
    }

    /// The node this port belongs to
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn kind(&self) -> &PortKind {
        &self.kind
    }
}

/// A graph of nodes that expose typed ports, where edges connect ports rather than nodes.
///
/// The same type describes both sides of a solve: the abstract pattern and the concrete target.
/// Every node and port carries a non-empty description, which is how it shows up in diagnostics.
#[derive(Clone, Debug)]
pub struct PortGraph {
    desc: String,
    nodes: Vec<Node>,
    ports: Vec<Port>,
    edges: UnGraphMap<PortId, ()>,
}

impl PortGraph {
    pub fn new(desc: impl Into<String>) -> Self {
        Self {
            desc: desc.into(),
            nodes: Vec::new(),
            ports: Vec::new(),
            edges: UnGraphMap::new(),
        }
    }

    /// The description of the graph as a whole, used verbatim in failure reports
    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn add_node(&mut self, desc: impl Into<String>) -> Result<NodeId, GraphError> {
        let desc = desc.into();
        if desc.is_empty() {
            return Err(GraphError::EmptyDescription("node"));
        }

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            desc,
            ports: Vec::new(),
        });
        Ok(id)
    }

    pub fn add_port(
        &mut self,
        node: NodeId,
        desc: impl Into<String>,
        kind: impl Into<PortKind>,
    ) -> Result<PortId, GraphError> {
        let desc = desc.into();
        if desc.is_empty() {
            return Err(GraphError::EmptyDescription("port"));
        }

        let id = PortId(self.ports.len() as u32);
        self.nodes
            .get_mut(node.index())
            .ok_or(GraphError::UnknownNode(node))?
            .ports
            .push(id);
        self.ports.push(Port {
            desc,
            node,
            kind: kind.into(),
        });
        self.edges.add_node(id);
        Ok(id)
    }

    /// Connects two ports with an undirected edge
    pub fn connect(&mut self, a: PortId, b: PortId) -> Result<(), GraphError> {
        for port in [a, b] {
            if self.port(port).is_none() {
                return Err(GraphError::UnknownPort(port));
            }
        }
        if a == b {
            return Err(GraphError::SelfLoop(a));
        }
        if self.edges.contains_edge(a, b) {
            return Err(GraphError::DuplicateEdge(a, b));
        }

        self.edges.add_edge(a, b, ());
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id.index())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.edge_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }

    pub fn ports(&self) -> impl Iterator<Item = PortId> + '_ {
        (0..self.ports.len()).map(|i| PortId(i as u32))
    }

    /// Ports owned by `node`; empty if the node is unknown
    pub fn node_ports(&self, node: NodeId) -> &[PortId] {
        self.node(node).map(Node::ports).unwrap_or_default()
    }

    /// Ports that share an edge with `port`
    pub fn neighbors(&self, port: PortId) -> impl Iterator<Item = PortId> + '_ {
        self.edges.neighbors(port)
    }

    pub fn are_connected(&self, a: PortId, b: PortId) -> bool {
        self.edges.contains_edge(a, b)
    }
}

impl Index<NodeId> for PortGraph {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl Index<PortId> for PortGraph {
    type Output = Port;

    fn index(&self, id: PortId) -> &Port {
        &self.ports[id.index()]
    }
}
