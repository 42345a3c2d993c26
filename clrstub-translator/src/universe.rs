//! Type universe built from the loaded assemblies using petgraph
//!
//! Every declared type (nested types included) gets a `TypeId` in a flat arena. Inheritance and
//! interface implementation form a directed graph, and the closures the emitter needs are
//! precomputed per type:
//!
//! - ancestors, nearest first
//! - publicly visible interfaces, own declarations plus the interfaces those extend
//! - every publicly visible interface including the ancestors'
//! - names required by the public interfaces
//! - instance method names eligible for emission across the whole hierarchy

use crate::visibility::VisibilityResolver;
use clrstub_metadata::{Assembly, Method, TypeEntity, TypeName, TypeRef};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeFiltered, EdgeRef};
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Index of a declared type in the universe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

impl TypeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A declared type with its position in the assembly set
#[derive(Debug, Clone)]
pub struct TypeEntry<'a> {
    pub entity: &'a TypeEntity,
    pub name: TypeName,
    /// Index of the owning assembly in load order
    pub assembly: usize,
    pub declaring: Option<TypeId>,
}

impl TypeEntry<'_> {
    pub fn is_public(&self) -> bool {
        self.entity.visibility.is_public()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Inherits,
    Implements,
}

/// Hierarchy facts for one type
#[derive(Debug, Clone, Default)]
pub struct TypeClosure {
    pub ancestors: Vec<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub all_interfaces: Vec<TypeId>,
    pub contract_names: HashSet<String>,
    pub instance_names: BTreeSet<String>,
}

/// Arena of every type declared by the loaded assemblies
#[derive(Debug)]
pub struct TypeUniverse<'a> {
    entries: Vec<TypeEntry<'a>>,
    by_lookup_name: HashMap<String, TypeId>,
    closures: Vec<TypeClosure>,
    namespaces: BTreeSet<String>,
}

impl<'a> TypeUniverse<'a> {
    /// Discover every type and precompute the hierarchy closures
    pub fn build(assemblies: &'a [Assembly]) -> Self {
        let mut universe = Self {
            entries: Vec::new(),
            by_lookup_name: HashMap::new(),
            closures: Vec::new(),
            namespaces: BTreeSet::new(),
        };

        for (assembly_idx, assembly) in assemblies.iter().enumerate() {
            universe
                .namespaces
                .extend(assembly.namespaces().map(str::to_string));
            for entity in &assembly.types {
                universe.register(entity, assembly_idx, None);
            }
        }

        universe.closures = universe.compute_closures();

        let instance_names: Vec<BTreeSet<String>> = {
            let resolver = VisibilityResolver::new(&universe);
            universe
                .ids()
                .map(|id| resolver.eligible_instance_names(id))
                .collect()
        };
        for (closure, names) in universe.closures.iter_mut().zip(instance_names) {
            closure.instance_names = names;
        }

        tracing::debug!(
            types = universe.entries.len(),
            namespaces = universe.namespaces.len(),
            "built type universe"
        );

        universe
    }

    fn register(&mut self, entity: &'a TypeEntity, assembly: usize, declaring: Option<TypeId>) {
        let id = TypeId(self.entries.len());
        let name = entity.type_name();
        // A later assembly redeclaring a name shadows the earlier one
        self.by_lookup_name.insert(name.lookup_name(), id);
        self.entries.push(TypeEntry {
            entity,
            name,
            assembly,
            declaring,
        });

        for nested in &entity.nested_types {
            self.register(nested, assembly, Some(id));
        }
    }

    fn compute_closures(&self) -> Vec<TypeClosure> {
        let mut graph: DiGraph<TypeId, Relation> = DiGraph::with_capacity(self.entries.len(), 0);
        let nodes: Vec<NodeIndex> = self.ids().map(|id| graph.add_node(id)).collect();

        for id in self.ids() {
            let entity = self.entity(id);
            if let Some(base) = entity.base_type.as_ref().and_then(|base| self.resolve(base)) {
                graph.add_edge(nodes[id.0], nodes[base.0], Relation::Inherits);
            }
            for interface in &entity.interfaces {
                if let Some(target) = self.resolve(interface) {
                    graph.add_edge(nodes[id.0], nodes[target.0], Relation::Implements);
                }
            }
        }

        let implements = EdgeFiltered::from_fn(&graph, |edge| *edge.weight() == Relation::Implements);

        self.ids()
            .map(|id| {
                let start = nodes[id.0];

                let mut ancestors = Vec::new();
                let mut visited = HashSet::from([start]);
                let mut current = start;
                while let Some(base) = graph
                    .edges_directed(current, Direction::Outgoing)
                    .find(|edge| *edge.weight() == Relation::Inherits)
                    .map(|edge| edge.target())
                {
                    if !visited.insert(base) {
                        break;
                    }
                    ancestors.push(graph[base]);
                    current = base;
                }

                let interfaces = self.public_interfaces_reached(&implements, start, id);
                let all_interfaces = self.public_interfaces_reached(&graph, start, id);

                let contract_names = interfaces
                    .iter()
                    .flat_map(|&interface| self.entity(interface).methods.iter())
                    .map(|method| method.exposed_name().to_string())
                    .collect();

                TypeClosure {
                    ancestors,
                    interfaces,
                    all_interfaces,
                    contract_names,
                    instance_names: BTreeSet::new(),
                }
            })
            .collect()
    }

    fn public_interfaces_reached<G>(&self, graph: G, start: NodeIndex, id: TypeId) -> Vec<TypeId>
    where
        G: petgraph::visit::IntoNeighbors<NodeId = NodeIndex> + petgraph::visit::Visitable<NodeId = NodeIndex>,
    {
        let mut dfs = Dfs::new(graph, start);
        let mut found = Vec::new();
        while let Some(node) = dfs.next(graph) {
            let reached = TypeId(node.index());
            if reached != id && self.entity(reached).is_interface() && self.entry(reached).is_public() {
                found.push(reached);
            }
        }
        found
    }

    pub fn ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        (0..self.entries.len()).map(TypeId)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, id: TypeId) -> &TypeEntry<'a> {
        &self.entries[id.0]
    }

    pub fn entity(&self, id: TypeId) -> &'a TypeEntity {
        self.entries[id.0].entity
    }

    pub fn closure(&self, id: TypeId) -> &TypeClosure {
        &self.closures[id.0]
    }

    /// Namespaces declared by top-level types of the loaded assemblies
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.iter().map(String::as_str)
    }

    pub fn lookup(&self, name: &TypeName) -> Option<TypeId> {
        self.by_lookup_name.get(&name.lookup_name()).copied()
    }

    /// Resolve a nominal, generic-instance or primitive reference to its declaration
    pub fn resolve(&self, reference: &TypeRef) -> Option<TypeId> {
        reference.type_name().and_then(|name| self.lookup(&name))
    }

    /// Public top-level types, in assembly then declaration order
    pub fn top_level_public(&self) -> Vec<TypeId> {
        self.ids()
            .filter(|&id| {
                let entry = self.entry(id);
                entry.declaring.is_none() && entry.is_public()
            })
            .collect()
    }

    /// Public nested types directly declared by `id`
    pub fn public_nested(&self, id: TypeId) -> Vec<TypeId> {
        self.ids()
            .filter(|&nested| {
                let entry = self.entry(nested);
                entry.declaring == Some(id) && entry.is_public()
            })
            .collect()
    }

    /// Methods declared by each ancestor of `id`, nearest ancestor first
    pub fn hierarchy_methods(&self, id: TypeId) -> impl Iterator<Item = (TypeId, &'a Method)> + '_ {
        self.closure(id)
            .ancestors
            .iter()
            .flat_map(move |&ancestor| {
                self.entity(ancestor)
                    .methods
                    .iter()
                    .map(move |method| (ancestor, method))
            })
    }
}
