//! Dependency graph construction and queries.
//!
//! Builds an immutable DAG over operator ids plus a synthetic `ROOT` from
//! a flat, declaration-ordered operator list with `run_after` hints, and
//! exposes the queries the scheduler needs: successors, predecessors,
//! roots, and a declaration-order-stable topological iteration.

use maestro_core::config::OperatorConfig;
use maestro_core::error::GraphError;
use maestro_core::id::OperatorId;
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// The operator dependency graph, including the synthetic `ROOT` node.
///
/// Immutable once built — safe to read from any context, including
/// concurrently from worker tasks that only ever call [`Graph::successors`]
/// or [`Graph::predecessors`] (the scheduler is the only caller, but the
/// type imposes no interior mutability either way).
pub struct Graph {
    graph: DiGraph<OperatorId, ()>,
    index_of: HashMap<OperatorId, NodeIndex>,
    declaration_order: HashMap<OperatorId, usize>,
}

impl Graph {
    /// Build the graph from a declaration-ordered operator list.
    ///
    /// Implements the build algorithm in four passes:
    /// 1. Validate every id is unique and not the reserved `ROOT` literal.
    /// 2. Insert `ROOT` plus one node per operator.
    /// 3. For each operator, in declaration order: if it has `run_after`,
    ///    wire an edge from every named predecessor (replacing, not
    ///    augmenting, the default chain edge — `run_after` is
    ///    authoritative); otherwise wire a single edge from the previous
    ///    node in declaration order (`ROOT` for the first).
    /// 4. Validate every `run_after` id exists, the result is acyclic, and
    ///    `ROOT` has no incoming edges.
    pub fn build(operators: &[OperatorConfig]) -> Result<Self, GraphError> {
        let mut graph = DiGraph::new();
        let mut index_of = HashMap::with_capacity(operators.len() + 1);
        let mut declaration_order = HashMap::with_capacity(operators.len() + 1);

        let root_id = OperatorId::root();
        let root_idx = graph.add_node(root_id.clone());
        index_of.insert(root_id.clone(), root_idx);
        declaration_order.insert(root_id, 0);

        let mut order: Vec<OperatorId> = Vec::with_capacity(operators.len() + 1);
        order.push(OperatorId::root());

        for (i, op) in operators.iter().enumerate() {
            let id = OperatorId::new(op.id.clone());
            if id.is_root() {
                return Err(GraphError::ProtectedIdUsed);
            }
            if index_of.contains_key(&id) {
                return Err(GraphError::DuplicateOperatorId(id.0));
            }
            let idx = graph.add_node(id.clone());
            index_of.insert(id.clone(), idx);
            declaration_order.insert(id.clone(), i + 1);
            order.push(id);
        }

        for (i, op) in operators.iter().enumerate() {
            let id = &order[i + 1];
            let v_idx = index_of[id];

            match &op.run_after {
                Some(run_after) => {
                    for pred in run_after.ids() {
                        let pred_id = OperatorId::new(pred);
                        let pred_idx = *index_of
                            .get(&pred_id)
                            .ok_or_else(|| GraphError::UnknownRunAfter(pred.to_string()))?;
                        graph.add_edge(pred_idx, v_idx, ());
                    }
                }
                None => {
                    let prev_idx = index_of[&order[i]];
                    graph.add_edge(prev_idx, v_idx, ());
                }
            }
        }

        if is_cyclic_directed(&graph) {
            return Err(GraphError::CycleDetected);
        }

        let incoming_to_root = graph
            .neighbors_directed(root_idx, petgraph::Direction::Incoming)
            .count();
        if incoming_to_root > 0 {
            return Err(GraphError::CycleDetected);
        }

        Ok(Self {
            graph,
            index_of,
            declaration_order,
        })
    }

    fn index(&self, id: &OperatorId) -> Result<NodeIndex, GraphError> {
        self.index_of
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::NoSuchNode(id.as_str().to_string()))
    }

    /// Ids of every direct successor of `id`, in declaration order.
    pub fn successors(&self, id: &OperatorId) -> Result<Vec<OperatorId>, GraphError> {
        let idx = self.index(id)?;
        let mut out: Vec<OperatorId> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .map(|n| self.graph[n].clone())
            .collect();
        self.sort_by_declaration(&mut out);
        Ok(out)
    }

    /// Ids of every direct predecessor of `id`, in declaration order.
    pub fn predecessors(&self, id: &OperatorId) -> Result<Vec<OperatorId>, GraphError> {
        let idx = self.index(id)?;
        let mut out: Vec<OperatorId> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .map(|n| self.graph[n].clone())
            .collect();
        self.sort_by_declaration(&mut out);
        Ok(out)
    }

    /// The sources of the user's DAG: `successors(ROOT)`.
    pub fn roots(&self) -> Vec<OperatorId> {
        self.successors(&OperatorId::root())
            .expect("ROOT is always present")
    }

    /// A topological ordering of every node (including `ROOT`), with ties
    /// broken by declaration order.
    pub fn topological_iter(&self) -> Vec<OperatorId> {
        let mut order =
            toposort(&self.graph, None).expect("acyclic by construction; validated in build()");
        order.sort_by_key(|idx| self.declaration_order[&self.graph[*idx]]);
        order.into_iter().map(|idx| self.graph[idx].clone()).collect()
    }

    /// Every operator id in the graph, excluding `ROOT`.
    pub fn operator_ids(&self) -> Vec<OperatorId> {
        self.index_of
            .keys()
            .filter(|id| !id.is_root())
            .cloned()
            .collect()
    }

    fn sort_by_declaration(&self, ids: &mut [OperatorId]) {
        ids.sort_by_key(|id| self.declaration_order[id]);
    }
}
