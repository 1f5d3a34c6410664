use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::HashMap;
use tracing::{debug, info, trace};

use crate::assignment::Assignment;
use crate::config::SolverConfig;
use crate::error::{MatchError, SolveError};
use crate::graph::{NodeId, PortGraph, PortId, PortKind};
use crate::reporter::{NoOpReporter, Reporter};

/// A complete assignment of an abstract graph onto a concrete graph
#[derive(Clone, Debug)]
pub struct Solution {
    nodes: FxHashMap<NodeId, NodeId>,
    ports: FxHashMap<PortId, PortId>,
    rounds: u64,
}

impl Solution {
    pub fn node(&self, abstract_node: NodeId) -> Option<NodeId> {
        self.nodes.get(&abstract_node).copied()
    }

    pub fn port(&self, abstract_port: PortId) -> Option<PortId> {
        self.ports.get(&abstract_port).copied()
    }

    /// `(abstract, concrete)` node pairs, ordered by abstract node
    pub fn nodes(&self) -> Vec<(NodeId, NodeId)> {
        self.nodes.iter().map(|(&a, &c)| (a, c)).sorted().collect()
    }

    /// `(abstract, concrete)` port pairs, ordered by abstract port
    pub fn ports(&self) -> Vec<(PortId, PortId)> {
        self.ports.iter().map(|(&a, &c)| (a, c)).sorted().collect()
    }

    /// The number of pins it took to find this solution
    pub fn rounds(&self) -> u64 {
        self.rounds
    }
}

/// One way of placing an abstract node: the concrete node and the image of each of its ports
#[derive(Clone, Debug)]
struct Pin {
    concrete_node: NodeId,
    ports: Vec<(PortId, PortId)>,
}

/// The untried placements of one abstract node, produced one at a time
struct Frame {
    abstract_node: NodeId,
    candidates: Vec<NodeId>,
    next_candidate: usize,
    port_maps: Option<PortMaps>,
}

impl Frame {
    fn new(abstract_node: NodeId, candidates: Vec<NodeId>) -> Self {
        Self {
            abstract_node,
            candidates,
            next_candidate: 0,
            port_maps: None,
        }
    }

    fn next_pin<R: Reporter>(&mut self, search: &Search<'_, R>) -> Option<Pin> {
        loop {
            if let Some(port_maps) = &mut self.port_maps {
                if let Some(ports) = port_maps.next(search, self.abstract_node) {
                    return Some(Pin {
                        concrete_node: port_maps.concrete_node,
                        ports,
                    });
                }
            }

            let concrete_node = *self.candidates.get(self.next_candidate)?;
            self.next_candidate += 1;
            self.port_maps = Some(PortMaps::new(
                concrete_node,
                search.concrete_graph.node_ports(concrete_node).len(),
            ));
        }
    }
}

/// Depth-first enumeration of the injective, kind-preserving maps from the ports of an abstract
/// node into the ports of `concrete_node` that keep every edge towards an already placed port.
///
/// The enumeration is resumable: each call to [`PortMaps::next`] walks only as far as the next
/// complete map.
struct PortMaps {
    concrete_node: NodeId,
    partial: Vec<(PortId, PortId)>,
    /// Position in the concrete port list chosen at each depth of `partial`
    slots: Vec<usize>,
    taken: Vec<bool>,
    /// First concrete position to try at the current depth
    start: usize,
    done: bool,
}

impl PortMaps {
    fn new(concrete_node: NodeId, concrete_ports: usize) -> Self {
        Self {
            concrete_node,
            partial: Vec::new(),
            slots: Vec::new(),
            taken: vec![false; concrete_ports],
            start: 0,
            done: false,
        }
    }

    /// Drops the deepest choice so the next search resumes right after it
    fn retreat(&mut self) {
        match self.slots.pop() {
            Some(slot) => {
                self.taken[slot] = false;
                self.partial.pop();
                self.start = slot + 1;
            }
            None => self.done = true,
        }
    }

    fn next<R: Reporter>(
        &mut self,
        search: &Search<'_, R>,
        abstract_node: NodeId,
    ) -> Option<Vec<(PortId, PortId)>> {
        let abstract_ports = search.abstract_graph.node_ports(abstract_node);
        let concrete_ports = search.concrete_graph.node_ports(self.concrete_node);

        while !self.done {
            let port = match abstract_ports.get(self.partial.len()) {
                Some(&port) => port,
                None => {
                    let ports = self.partial.clone();
                    self.retreat();
                    return Some(ports);
                }
            };

            let kind = search.abstract_graph[port].kind();
            let found = (self.start..concrete_ports.len()).find(|&i| {
                !self.taken[i]
                    && search.concrete_graph[concrete_ports[i]].kind() == kind
                    && search.edges_preserved(port, concrete_ports[i], &self.partial)
            });

            match found {
                Some(i) => {
                    self.taken[i] = true;
                    self.slots.push(i);
                    self.partial.push((port, concrete_ports[i]));
                    self.start = 0;
                }
                None => self.retreat(),
            }
        }

        None
    }
}

/// Searches for an assignment of every node and port of an abstract graph onto a concrete graph.
///
/// A valid assignment maps abstract nodes injectively onto concrete nodes, maps every port of an
/// abstract node onto a distinct port of the same kind on the chosen concrete node, and preserves
/// edges: if two abstract ports are connected, so are their images.
pub struct Solver<'g, R = NoOpReporter> {
    abstract_graph: &'g PortGraph,
    concrete_graph: &'g PortGraph,
    config: SolverConfig,
    reporter: R,
}

impl<'g> Solver<'g> {
    pub fn new(abstract_graph: &'g PortGraph, concrete_graph: &'g PortGraph) -> Self {
        Self {
            abstract_graph,
            concrete_graph,
            config: SolverConfig::default(),
            reporter: NoOpReporter,
        }
    }
}

impl<'g, R: Reporter> Solver<'g, R> {
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_reporter<R2: Reporter>(self, reporter: R2) -> Solver<'g, R2> {
        Solver {
            abstract_graph: self.abstract_graph,
            concrete_graph: self.concrete_graph,
            config: self.config,
            reporter,
        }
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Runs the search.
    ///
    /// On failure, the returned [`SolveError`] carries the largest partial assignment that was
    /// found and, when the search could pin it down, the reason no full assignment exists.
    pub fn solve(&self) -> Result<Solution, SolveError> {
        info!(
            event = "solve_start",
            abstract_graph = %self.abstract_graph.desc(),
            concrete_graph = %self.concrete_graph.desc(),
            abstract_nodes = self.abstract_graph.node_count(),
            concrete_nodes = self.concrete_graph.node_count(),
            max_rounds = self.config.max_rounds,
        );
        self.reporter
            .starting(self.abstract_graph, self.concrete_graph);

        let search = Search::new(
            self.abstract_graph,
            self.concrete_graph,
            &self.reporter,
            self.config.max_rounds,
        );

        match search.run() {
            Ok(solution) => {
                info!(event = "solve_end", rounds = solution.rounds());
                self.reporter.ending(&solution);
                Ok(solution)
            }
            Err(error) => {
                info!(event = "solve_failed", cause = ?error.cause());
                self.reporter.failed(&error);
                Err(error)
            }
        }
    }
}

struct Search<'a, R> {
    abstract_graph: &'a PortGraph,
    concrete_graph: &'a PortGraph,
    reporter: &'a R,
    max_rounds: u64,
    rounds: u64,
    assignment: Assignment,
    used: FxHashSet<NodeId>,
    best: Assignment,
}

fn kind_counts(graph: &PortGraph, node: NodeId) -> HashMap<&PortKind, usize> {
    graph
        .node_ports(node)
        .iter()
        .map(|&p| graph[p].kind())
        .counts()
}

fn score(assignment: &Assignment) -> (usize, usize) {
    (assignment.assigned_nodes(), assignment.assigned_ports())
}

impl<'a, R: Reporter> Search<'a, R> {
    fn new(
        abstract_graph: &'a PortGraph,
        concrete_graph: &'a PortGraph,
        reporter: &'a R,
        max_rounds: u64,
    ) -> Self {
        let assignment = Assignment::unassigned(abstract_graph);
        Self {
            abstract_graph,
            concrete_graph,
            reporter,
            max_rounds,
            rounds: 0,
            best: assignment.clone(),
            assignment,
            used: FxHashSet::default(),
        }
    }

    fn fail(&self, cause: Option<MatchError>) -> SolveError {
        SolveError::new(
            self.abstract_graph.desc(),
            self.concrete_graph.desc(),
            cause,
            Some(self.best.snapshot(self.abstract_graph, self.concrete_graph)),
        )
    }

    fn run(mut self) -> Result<Solution, SolveError> {
        if self.abstract_graph.node_count() > self.concrete_graph.node_count() {
            return Err(self.fail(Some(MatchError::TooFewNodes {
                abstract_nodes: self.abstract_graph.node_count(),
                concrete_nodes: self.concrete_graph.node_count(),
            })));
        }

        let candidates = self.candidates()?;

        // Most constrained nodes first, so dead ends show up near the root of the search
        let order = self
            .abstract_graph
            .nodes()
            .sorted_by_key(|n| (candidates[n].len(), *n))
            .collect::<Vec<_>>();

        let mut stack: Vec<Frame> = Vec::new();
        loop {
            if stack.len() == order.len() {
                return Ok(self.into_solution());
            }

            let abstract_node = order[stack.len()];
            let available = candidates[&abstract_node]
                .iter()
                .copied()
                .filter(|c| !self.used.contains(c))
                .collect();
            stack.push(Frame::new(abstract_node, available));

            // Find the deepest frame that still has an untried placement, and pin it
            loop {
                let frame = match stack.last_mut() {
                    Some(frame) => frame,
                    None => {
                        debug!(event = "exhausted", rounds = self.rounds);
                        return Err(self.fail(None));
                    }
                };

                if let Some(pin) = frame.next_pin(&self) {
                    if self.rounds >= self.max_rounds {
                        return Err(self.fail(Some(MatchError::SearchLimit(self.max_rounds))));
                    }
                    self.rounds += 1;
                    self.reporter.starting_round(self.rounds);

                    let abstract_node = frame.abstract_node;
                    self.pin(abstract_node, &pin);
                    break;
                }

                stack.pop();
                self.reporter.backtracked(1);
                if let Some(parent) = stack.last() {
                    debug!(
                        event = "backtrack",
                        depth = stack.len(),
                        node = %self.abstract_graph[parent.abstract_node].desc(),
                    );
                    self.unpin(parent.abstract_node);
                }
            }
        }
    }

    /// Concrete nodes whose ports, counted per kind, cover the ports of each abstract node
    fn candidates(&self) -> Result<FxHashMap<NodeId, Vec<NodeId>>, SolveError> {
        let supply = self
            .concrete_graph
            .nodes()
            .map(|c| (c, kind_counts(self.concrete_graph, c)))
            .collect::<Vec<_>>();

        let mut candidates = FxHashMap::default();
        for node in self.abstract_graph.nodes() {
            let demand = kind_counts(self.abstract_graph, node);
            let matching = supply
                .iter()
                .filter(|(_, available)| {
                    demand
                        .iter()
                        .all(|(kind, &n)| available.get(kind).copied().unwrap_or(0) >= n)
                })
                .map(|&(c, _)| c)
                .collect::<Vec<_>>();

            if matching.is_empty() {
                return Err(self.fail(Some(self.explain(node, &demand, &supply))));
            }
            candidates.insert(node, matching);
        }

        Ok(candidates)
    }

    /// Picks the most specific reason why no concrete node can host `node`
    fn explain(
        &self,
        node: NodeId,
        demand: &HashMap<&PortKind, usize>,
        supply: &[(NodeId, HashMap<&PortKind, usize>)],
    ) -> MatchError {
        let needed = self.abstract_graph.node_ports(node).len();
        let available = self
            .concrete_graph
            .nodes()
            .map(|c| self.concrete_graph.node_ports(c).len())
            .max()
            .unwrap_or(0);
        if needed > available {
            return MatchError::InsufficientPorts {
                node: self.abstract_graph[node].desc().to_string(),
                needed,
                available,
            };
        }

        for &port in self.abstract_graph.node_ports(node) {
            let kind = self.abstract_graph[port].kind();
            let most = supply
                .iter()
                .map(|(_, available)| available.get(kind).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);
            if most < demand[kind] {
                return MatchError::IncompatiblePortKind {
                    port: self.abstract_graph[port].desc().to_string(),
                    kind: kind.to_string(),
                };
            }
        }

        MatchError::NoCompatibleNode {
            node: self.abstract_graph[node].desc().to_string(),
        }
    }

    fn edges_preserved(&self, port: PortId, candidate: PortId, partial: &[(PortId, PortId)]) -> bool {
        self.abstract_graph.neighbors(port).all(|neighbor| {
            let image = partial
                .iter()
                .find(|&&(a, _)| a == neighbor)
                .map(|&(_, c)| c)
                .or_else(|| self.assignment.port(neighbor));
            image.map_or(true, |image| {
                self.concrete_graph.are_connected(candidate, image)
            })
        })
    }

    fn pin(&mut self, abstract_node: NodeId, pin: &Pin) {
        trace!(
            event = "pin",
            round = self.rounds,
            abstract_node = %self.abstract_graph[abstract_node].desc(),
            concrete_node = %self.concrete_graph[pin.concrete_node].desc(),
        );
        self.reporter.pinning(abstract_node, pin.concrete_node);

        self.assignment.assign_node(abstract_node, pin.concrete_node);
        self.used.insert(pin.concrete_node);
        for &(a, c) in &pin.ports {
            self.assignment.assign_port(a, c);
        }

        if score(&self.assignment) > score(&self.best) {
            self.best = self.assignment.clone();
        }
    }

    fn unpin(&mut self, abstract_node: NodeId) {
        if let Some(concrete_node) = self.assignment.node(abstract_node) {
            self.used.remove(&concrete_node);
        }
        self.assignment
            .unassign_node(self.abstract_graph, abstract_node);
    }

    fn into_solution(self) -> Solution {
        let nodes = self
            .abstract_graph
            .nodes()
            .filter_map(|a| Some((a, self.assignment.node(a)?)))
            .collect();
        let ports = self
            .abstract_graph
            .ports()
            .filter_map(|a| Some((a, self.assignment.port(a)?)))
            .collect();

        Solution {
            nodes,
            ports,
            rounds: self.rounds,
        }
    }
}
