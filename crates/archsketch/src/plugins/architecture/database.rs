//! Architecture database implementation
//!
//! Stores parsed services, clusters and connections. Insertion order is kept
//! for every collection so layout is deterministic.

use anyhow::Result;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, trace};

use crate::core::policy::{Condition, Policy, Response};
use crate::core::{Cluster, Connection, ConvertError, Database, ServiceInstance};

/// Parsed architecture graph
#[derive(Debug, Default, Clone)]
pub struct ArchitectureDatabase {
    /// Services indexed by identifier
    services: HashMap<String, ServiceInstance>,
    /// Service identifiers in insertion order
    service_order: Vec<String>,
    /// Clusters in first-seen order
    clusters: Vec<Cluster>,
    /// Connections in source order
    connections: Vec<Connection>,
    /// Counter for naming unnamed clusters
    cluster_counter: usize,
    /// Responses to unexpected content while filling and laying out
    policy: Policy,
}

impl ArchitectureDatabase {
    /// Create a new empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty database that answers conditions with `policy`
    pub fn with_policy(policy: Policy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Register a cluster, creating it if unseen; returns its effective name
    ///
    /// Unnamed clusters get `cluster_<n>`.
    pub fn open_cluster(&mut self, name: Option<&str>) -> String {
        let name = match name {
            Some(name) => name.to_string(),
            None => {
                self.cluster_counter += 1;
                format!("cluster_{}", self.cluster_counter)
            }
        };
        if self.cluster(&name).is_none() {
            trace!(cluster = %name, "Registering cluster");
            self.clusters.push(Cluster::new(name.clone()));
        }
        name
    }

    pub fn cluster(&self, name: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.name == name)
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn has_service(&self, id: &str) -> bool {
        self.services.contains_key(id)
    }

    /// Services without an owning cluster, in insertion order
    pub fn standalone_services(&self) -> impl Iterator<Item = &ServiceInstance> {
        self.nodes().filter(|s| s.cluster.is_none())
    }

    /// Identifiers with a connection into `id`
    pub fn predecessors(&self, id: &str) -> Vec<&str> {
        self.connections
            .iter()
            .filter(|c| c.to == id)
            .map(|c| c.from.as_str())
            .collect()
    }

    pub fn has_connection(&self, from: &str, to: &str) -> bool {
        self.connections.iter().any(|c| c.from == from && c.to == to)
    }

    /// Topological sort using Kahn's algorithm
    ///
    /// Ready nodes are taken in insertion order. Nodes left over by a cycle
    /// are appended in insertion order.
    pub fn topological_sort(&self) -> Vec<&str> {
        trace!(
            node_count = self.node_count(),
            edge_count = self.edge_count(),
            "Starting topological sort"
        );
        let mut in_degree: HashMap<&str, usize> = self
            .service_order
            .iter()
            .map(|id| (id.as_str(), 0))
            .collect();

        for conn in &self.connections {
            if let Some(deg) = in_degree.get_mut(conn.to.as_str()) {
                *deg += 1;
            }
        }

        let mut queue: VecDeque<&str> = self
            .service_order
            .iter()
            .map(String::as_str)
            .filter(|id| in_degree.get(id) == Some(&0))
            .collect();

        let mut result = Vec::with_capacity(self.service_order.len());
        let mut placed: HashSet<&str> = HashSet::new();

        while let Some(node) = queue.pop_front() {
            result.push(node);
            placed.insert(node);

            for conn in self.connections.iter().filter(|c| c.from == node) {
                if let Some(deg) = in_degree.get_mut(conn.to.as_str()) {
                    *deg = deg.saturating_sub(1);
                    if *deg == 0 && !placed.contains(conn.to.as_str()) {
                        queue.push_back(conn.to.as_str());
                    }
                }
            }
        }

        if result.len() < self.service_order.len() {
            debug!(
                sorted_count = result.len(),
                total_nodes = self.service_order.len(),
                "Cycle detected in graph"
            );
            for id in &self.service_order {
                if !placed.contains(id.as_str()) {
                    result.push(id.as_str());
                }
            }
        }

        result
    }
}

impl Database for ArchitectureDatabase {
    type Node = ServiceInstance;
    type Edge = Connection;

    /// Insert a service, or update kind and label of an existing one
    ///
    /// Cluster ownership is fixed by the first definition.
    fn add_node(&mut self, node: ServiceInstance) -> Result<()> {
        if let Some(existing) = self.services.get_mut(&node.id) {
            trace!(id = %node.id, kind = %node.kind, "Rebinding service");
            existing.kind = node.kind;
            if node.label.is_some() {
                existing.label = node.label;
            }
            return Ok(());
        }

        if let Some(cluster_name) = node.cluster.as_deref() {
            if self.cluster(cluster_name).is_none() {
                self.clusters.push(Cluster::new(cluster_name));
            }
            if let Some(cluster) = self.clusters.iter_mut().find(|c| c.name == cluster_name) {
                cluster.members.push(node.id.clone());
            }
        }

        trace!(id = %node.id, kind = %node.kind, cluster = ?node.cluster, "Adding service");
        self.service_order.push(node.id.clone());
        self.services.insert(node.id.clone(), node);
        Ok(())
    }

    /// Record a connection; endpoints must already be services
    fn add_edge(&mut self, edge: Connection) -> Result<()> {
        if !self.has_service(&edge.from) || !self.has_service(&edge.to) {
            let detail = format!("{} >> {}", edge.from, edge.to);
            return match self.policy.apply(Condition::DanglingConnection, &detail) {
                Response::Skip | Response::FallBack => Ok(()),
                Response::Fail => Err(ConvertError::rejected(Condition::DanglingConnection, detail).into()),
            };
        }
        trace!(from = %edge.from, to = %edge.to, "Adding connection");
        self.connections.push(edge);
        Ok(())
    }

    fn get_node(&self, id: &str) -> Option<&ServiceInstance> {
        self.services.get(id)
    }

    fn nodes(&self) -> impl Iterator<Item = &ServiceInstance> {
        self.service_order
            .iter()
            .filter_map(|id| self.services.get(id))
    }

    fn edges(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    fn clear(&mut self) {
        self.services.clear();
        self.service_order.clear();
        self.clusters.clear();
        self.connections.clear();
        self.cluster_counter = 0;
    }

    fn node_count(&self) -> usize {
        self.services.len()
    }

    fn edge_count(&self) -> usize {
        self.connections.len()
    }
}
