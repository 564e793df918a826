use crate::activity::{Activity, ActivityId};
use crate::instance::StructuralError;
use petgraph::Direction;
use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

/// Precedence network with one node per activity; node index == activity id.
pub struct PrecedenceDag {
    pub graph: DiGraph<ActivityId, ()>,
}

impl PrecedenceDag {
    /// Builds the graph from successor lists. Successor ids must already be in range.
    pub fn build(activities: &[Activity]) -> Self {
        let mut graph: DiGraph<ActivityId, ()> =
            DiGraph::with_capacity(activities.len(), activities.len());

        for activity in activities {
            graph.add_node(activity.id);
        }

        // Add edges: activity -> successor
        for activity in activities {
            for &succ in &activity.successors {
                graph.add_edge(NodeIndex::new(activity.id), NodeIndex::new(succ), ());
            }
        }

        Self { graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn successors(&self, id: ActivityId) -> impl Iterator<Item = ActivityId> + '_ {
        self.graph
            .neighbors_directed(NodeIndex::new(id), Direction::Outgoing)
            .map(|ix| self.graph[ix])
    }

    pub fn predecessors(&self, id: ActivityId) -> impl Iterator<Item = ActivityId> + '_ {
        self.graph
            .neighbors_directed(NodeIndex::new(id), Direction::Incoming)
            .map(|ix| self.graph[ix])
    }

    /// Activities in an order where every edge points forward.
    ///
    /// A cycle is reported with the activity where the sort stopped and every
    /// member of its strongly connected component.
    pub fn topological_order(&self) -> Result<Vec<ActivityId>, StructuralError> {
        match toposort(&self.graph, None) {
            Ok(order) => Ok(order.into_iter().map(|ix| self.graph[ix]).collect()),
            Err(cycle) => {
                let activity = self.graph[cycle.node_id()];
                Err(StructuralError::Cycle {
                    activity,
                    members: self.cycle_members(activity),
                })
            }
        }
    }

    fn cycle_members(&self, activity: ActivityId) -> Vec<ActivityId> {
        let target = NodeIndex::new(activity);
        let mut members = kosaraju_scc(&self.graph)
            .into_iter()
            .find(|component| component.contains(&target))
            .map(|component| component.into_iter().map(|ix| self.graph[ix]).collect())
            .unwrap_or_else(|| vec![activity]);
        members.sort_unstable();
        members
    }
}
