//! Flow level assignment
//!
//! Breadth-first dependency leveling: each round levels every service whose
//! incoming connections all come from services leveled in earlier rounds.

use std::collections::{HashMap, HashSet};
use tracing::{debug, span, trace, Level};

use super::ArchitectureDatabase;
use crate::core::Database;

/// Flow level per service identifier, iterable in service order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowLevels {
    order: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl FlowLevels {
    pub fn level(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.order.iter().map(|(id, level)| (id.as_str(), *level))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn max_level(&self) -> Option<usize> {
        self.order.iter().map(|(_, level)| *level).max()
    }

    fn assign(&mut self, id: &str, level: usize) {
        self.index.insert(id.to_string(), level);
    }
}

/// Assign every service a flow level
///
/// A round with no qualifying service forces the first unprocessed one, so
/// cycles terminate in at most one round per service.
pub fn assign_flow_levels(database: &ArchitectureDatabase) -> FlowLevels {
    let span = span!(Level::DEBUG, "assign_flow_levels", services = database.node_count());
    let _enter = span.enter();

    let ids: Vec<&str> = database.nodes().map(|s| s.id.as_str()).collect();
    let incoming: HashMap<&str, Vec<&str>> = ids
        .iter()
        .map(|&id| (id, database.predecessors(id)))
        .collect();

    let mut levels = FlowLevels::default();
    let mut processed: HashSet<&str> = HashSet::new();
    let mut level = 0;

    while processed.len() < ids.len() {
        let mut ready: Vec<&str> = ids
            .iter()
            .copied()
            .filter(|id| !processed.contains(id))
            .filter(|id| {
                incoming
                    .get(id)
                    .map_or(true, |preds| preds.iter().all(|p| processed.contains(p)))
            })
            .collect();

        if ready.is_empty() {
            if let Some(&forced) = ids.iter().find(|id| !processed.contains(*id)) {
                trace!(id = forced, level, "Breaking leveling stall");
                ready.push(forced);
            }
        }

        for &id in &ready {
            trace!(id, level, "Assigned flow level");
            levels.assign(id, level);
            processed.insert(id);
        }
        level += 1;
    }

    levels.order = ids
        .iter()
        .filter_map(|&id| levels.level(id).map(|l| (id.to_string(), l)))
        .collect();

    debug!(levels = level, "Flow leveling completed");
    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Connection, ServiceInstance};

    fn db(ids: &[&str], edges: &[(&str, &str)]) -> ArchitectureDatabase {
        let mut db = ArchitectureDatabase::new();
        for id in ids {
            db.add_node(ServiceInstance::new(*id, "Lambda")).unwrap();
        }
        for (from, to) in edges {
            db.add_edge(Connection::new(*from, *to)).unwrap();
        }
        db
    }

    #[test]
    fn test_chain_levels() {
        let levels = assign_flow_levels(&db(&["a", "b", "c"], &[("a", "b"), ("b", "c")]));
        assert_eq!(levels.level("a"), Some(0));
        assert_eq!(levels.level("b"), Some(1));
        assert_eq!(levels.level("c"), Some(2));
    }

    #[test]
    fn test_round_uses_snapshot_of_processed() {
        // b and c both depend only on a; d depends on b and c
        let levels = assign_flow_levels(&db(
            &["d", "c", "b", "a"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        ));
        assert_eq!(levels.level("a"), Some(0));
        assert_eq!(levels.level("b"), Some(1));
        assert_eq!(levels.level("c"), Some(1));
        assert_eq!(levels.level("d"), Some(2));
    }

    #[test]
    fn test_cycle_terminates() {
        let levels = assign_flow_levels(&db(&["a", "b"], &[("a", "b"), ("b", "a")]));
        assert_eq!(levels.len(), 2);
        assert_eq!(levels.level("a"), Some(0));
        assert_eq!(levels.level("b"), Some(1));
    }

    #[test]
    fn test_self_loop_is_forced() {
        let levels = assign_flow_levels(&db(&["solo", "free"], &[("solo", "solo")]));
        assert_eq!(levels.level("free"), Some(0));
        assert_eq!(levels.level("solo"), Some(1));
    }

    #[test]
    fn test_disconnected_services_share_level_zero() {
        let levels = assign_flow_levels(&db(&["x", "y", "z"], &[]));
        assert!(levels.iter().all(|(_, level)| level == 0));
        assert_eq!(levels.max_level(), Some(0));
    }

    #[test]
    fn test_empty_database() {
        let levels = assign_flow_levels(&ArchitectureDatabase::new());
        assert!(levels.is_empty());
        assert_eq!(levels.max_level(), None);
    }
}
