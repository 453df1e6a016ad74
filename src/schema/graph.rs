//! Table dependency graph built from foreign keys.
//!
//! Provides:
//! - Dependency graph construction from schema FK relationships
//! - Cycle detection with path reconstruction (iterative DFS, explicit stack)
//! - Topological ordering for generation order (referenced tables first)

use super::Schema;
use std::collections::{BTreeMap, BTreeSet};
use std::iter::Flatten;
use std::option;

/// Foreign-key dependency graph.
///
/// An edge `child → parent` exists when `child` has a foreign key referencing
/// `parent`. Self-references are excluded: a table referencing itself never
/// blocks its own generation. References to tables missing from the schema are
/// dropped here and reported by the validator instead.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// table → tables it references
    parents: BTreeMap<String, BTreeSet<String>>,
    /// table → tables referencing it
    children: BTreeMap<String, BTreeSet<String>>,
}

/// Result of a topological sort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopoOrder {
    /// Tables in dependency order (referenced tables first)
    pub order: Vec<String>,
    /// Tables that are part of, or depend on, a cycle
    pub cyclic: Vec<String>,
}

impl TopoOrder {
    /// Ordered tables followed by the leftover cyclic tables.
    pub fn into_full_order(self) -> Vec<String> {
        let mut all = self.order;
        all.extend(self.cyclic);
        all
    }
}

type Pending<'a> = Flatten<option::IntoIter<&'a BTreeSet<String>>>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

impl DependencyGraph {
    pub fn from_schema(schema: &Schema) -> Self {
        let mut parents: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut children: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for name in schema.tables.keys() {
            parents.entry(name.clone()).or_default();
            children.entry(name.clone()).or_default();
        }

        for (name, table) in &schema.tables {
            for fk in &table.foreign_keys {
                if fk.referenced_table == *name
                    || !schema.tables.contains_key(&fk.referenced_table)
                {
                    continue;
                }
                parents
                    .entry(name.clone())
                    .or_default()
                    .insert(fk.referenced_table.clone());
                children
                    .entry(fk.referenced_table.clone())
                    .or_default()
                    .insert(name.clone());
            }
        }

        Self { parents, children }
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Tables `table` references (excluding itself)
    pub fn parents(&self, table: &str) -> impl Iterator<Item = &str> {
        self.parents
            .get(table)
            .into_iter()
            .flat_map(|s| s.iter().map(|t| t.as_str()))
    }

    /// Tables referencing `table` (excluding itself)
    pub fn children(&self, table: &str) -> impl Iterator<Item = &str> {
        self.children
            .get(table)
            .into_iter()
            .flat_map(|s| s.iter().map(|t| t.as_str()))
    }

    /// Find the first dependency cycle.
    ///
    /// Runs a depth-first search in lexicographic table order keeping the
    /// current path on an explicit stack, so deep FK chains cannot exhaust
    /// the call stack. The first back-edge found closes a cycle; the path is
    /// returned starting and ending at the same table, e.g. `["a", "b", "a"]`.
    /// Search stops there.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut marks: BTreeMap<&str, Mark> = self
            .parents
            .keys()
            .map(|k| (k.as_str(), Mark::Unvisited))
            .collect();

        for start in self.parents.keys() {
            if marks.get(start.as_str()) == Some(&Mark::Unvisited) {
                if let Some(cycle) = self.walk(start, &mut marks) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    fn pending<'a>(&'a self, node: &str) -> Pending<'a> {
        self.parents.get(node).into_iter().flatten()
    }

    fn walk<'a>(
        &'a self,
        start: &'a str,
        marks: &mut BTreeMap<&'a str, Mark>,
    ) -> Option<Vec<String>> {
        // Each frame is a table on the current path and its unexplored parents.
        let mut frames: Vec<(&'a str, Pending<'a>)> = vec![(start, self.pending(start))];
        marks.insert(start, Mark::OnStack);

        while let Some((_, parents)) = frames.last_mut() {
            let Some(next) = parents.next() else {
                if let Some((node, _)) = frames.pop() {
                    marks.insert(node, Mark::Done);
                }
                continue;
            };
            match marks.get(next.as_str()).copied().unwrap_or(Mark::Unvisited) {
                Mark::OnStack => {
                    let from = frames.iter().position(|(t, _)| *t == next.as_str())?;
                    let mut path: Vec<String> =
                        frames[from..].iter().map(|(t, _)| t.to_string()).collect();
                    path.push(next.clone());
                    return Some(path);
                }
                Mark::Unvisited => {
                    marks.insert(next.as_str(), Mark::OnStack);
                    frames.push((next.as_str(), self.pending(next)));
                }
                Mark::Done => {}
            }
        }
        None
    }

    /// Topological sort using Kahn's algorithm.
    ///
    /// The frontier is an ordered set, so among tables whose dependencies are
    /// satisfied the lexicographically smallest is emitted first. Tables whose
    /// in-degree never drops to zero are returned in `cyclic`, sorted.
    pub fn topo_order(&self) -> TopoOrder {
        let mut in_degree: BTreeMap<&str, usize> = self
            .parents
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .collect();

        let mut ready: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, &d)| d == 0)
            .map(|(k, _)| *k)
            .collect();

        let mut order = Vec::with_capacity(self.len());

        while let Some(table) = ready.pop_first() {
            order.push(table.to_string());
            for child in self.children(table) {
                if let Some(d) = in_degree.get_mut(child) {
                    *d -= 1;
                    if *d == 0 {
                        ready.insert(child);
                    }
                }
            }
        }

        let cyclic = in_degree
            .into_iter()
            .filter(|(_, d)| *d > 0)
            .map(|(k, _)| k.to_string())
            .collect();

        TopoOrder { order, cyclic }
    }
}
