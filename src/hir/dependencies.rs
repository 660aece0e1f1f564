//! Import graph and the selection of modules to re-check.
//!
//! A change to one module can only affect modules that import it, directly
//! or through a chain of imports. [`DependencySelector`] closes a set of
//! invalidated modules over the reverse import edges; [`check_order`]
//! orders the result so imported modules are checked before importers.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::db::Database;
use super::ids::ModuleId;

/// Import edges between the modules of a [`Database`].
#[derive(Clone, Debug, Default)]
pub struct ImportGraph {
    imports: IndexMap<ModuleId, IndexSet<ModuleId>>,
    importers: IndexMap<ModuleId, IndexSet<ModuleId>>,
    /// Importers keyed by the imported name, including names no module has.
    by_name: FxHashMap<SmolStr, IndexSet<ModuleId>>,
}

impl ImportGraph {
    pub fn build(db: &Database) -> Self {
        let mut graph = Self::default();
        for (id, module) in db.modules() {
            graph.imports.entry(id).or_default();
            for import in module.imports() {
                let name = import.module.identifier.key();
                graph.by_name.entry(name.clone()).or_default().insert(id);
                let Some(target) = db.module_by_name(&name) else {
                    continue;
                };
                if target == id {
                    continue;
                }
                graph.imports.entry(id).or_default().insert(target);
                graph.importers.entry(target).or_default().insert(id);
            }
        }
        tracing::debug!(
            "[DEPS] import graph: {} modules, {} edges",
            graph.imports.len(),
            graph.imports.values().map(IndexSet::len).sum::<usize>()
        );
        graph
    }

    /// Modules imported by `module`.
    pub fn imports_of(&self, module: ModuleId) -> impl Iterator<Item = ModuleId> + '_ {
        self.imports.get(&module).into_iter().flatten().copied()
    }

    /// Modules importing `module`.
    pub fn importers_of(&self, module: ModuleId) -> impl Iterator<Item = ModuleId> + '_ {
        self.importers.get(&module).into_iter().flatten().copied()
    }

    /// Modules with an import clause naming `name`, whether or not such a
    /// module exists.
    pub fn importers_of_name(&self, name: &str) -> impl Iterator<Item = ModuleId> + '_ {
        self.by_name.get(name).into_iter().flatten().copied()
    }

    pub fn contains(&self, module: ModuleId) -> bool {
        self.imports.contains_key(&module)
    }
}

/// Closes a set of invalidated modules over "is imported by".
pub struct DependencySelector<'a> {
    graph: &'a ImportGraph,
}

impl<'a> DependencySelector<'a> {
    pub fn new(graph: &'a ImportGraph) -> Self {
        Self { graph }
    }

    /// The least set containing `invalidated` and every importer of a
    /// member. Seeds come first, in the order given.
    pub fn select(&self, invalidated: impl IntoIterator<Item = ModuleId>) -> IndexSet<ModuleId> {
        let mut selected: IndexSet<ModuleId> = IndexSet::new();
        let mut worklist: VecDeque<ModuleId> = VecDeque::new();
        for seed in invalidated {
            if !self.graph.contains(seed) {
                tracing::warn!("[DEPS] ignoring unknown module {}", seed);
                continue;
            }
            if selected.insert(seed) {
                worklist.push_back(seed);
            }
        }
        let seeds = selected.len();
        while let Some(module) = worklist.pop_front() {
            for importer in self.graph.importers_of(module) {
                if selected.insert(importer) {
                    worklist.push_back(importer);
                }
            }
        }
        tracing::debug!(
            "[DEPS] {} invalidated, {} selected",
            seeds,
            selected.len()
        );
        selected
    }
}

/// `selected` ordered so that imported modules come before their
/// importers. Modules on an import cycle, or importing one, follow in
/// name order.
pub fn check_order(db: &Database, graph: &ImportGraph, selected: &IndexSet<ModuleId>) -> Vec<ModuleId> {
    let mut indegree: IndexMap<ModuleId, usize> = selected.iter().map(|id| (*id, 0)).collect();
    for module in selected {
        let inside = graph
            .imports_of(*module)
            .filter(|imported| selected.contains(imported))
            .count();
        indegree.insert(*module, inside);
    }

    let mut ready: VecDeque<ModuleId> = indegree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut order = Vec::with_capacity(selected.len());
    while let Some(module) = ready.pop_front() {
        order.push(module);
        for importer in graph.importers_of(module) {
            let Some(degree) = indegree.get_mut(&importer) else {
                continue;
            };
            if *degree > 0 {
                *degree -= 1;
                if *degree == 0 {
                    ready.push_back(importer);
                }
            }
        }
    }

    if order.len() < selected.len() {
        let mut cyclic: Vec<ModuleId> = selected
            .iter()
            .copied()
            .filter(|id| !order.contains(id))
            .collect();
        cyclic.sort_by(|a, b| {
            let name = |id: &ModuleId| db.module(*id).map(|m| m.name().to_string()).unwrap_or_default();
            name(a).cmp(&name(b)).then(a.cmp(b))
        });
        tracing::debug!("[DEPS] {} modules on import cycles", cyclic.len());
        order.extend(cyclic);
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::hir::lower::lower_module;
    use crate::parser::parse_module;

    fn database(sources: &[&str]) -> (Database, Vec<ModuleId>) {
        let mut db = Database::new();
        let ids = sources
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let parsed = parse_module(FileId::new(i as u32), text);
                db.insert(lower_module(parsed.content.unwrap()))
            })
            .collect();
        (db, ids)
    }

    fn names(db: &Database, ids: impl IntoIterator<Item = ModuleId>) -> Vec<String> {
        ids.into_iter()
            .map(|id| db.module(id).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_selection_follows_importers_transitively() {
        let (db, ids) = database(&[
            "module A { }",
            "module B { import from A all; }",
            "module C { import from B all; }",
            "module D { import from A all; }",
            "module E { }",
        ]);
        let graph = ImportGraph::build(&db);
        let selected = DependencySelector::new(&graph).select([ids[1]]);
        assert_eq!(names(&db, selected.iter().copied()), vec!["B", "C"]);

        let selected = DependencySelector::new(&graph).select([ids[0]]);
        assert_eq!(names(&db, selected.iter().copied()), vec!["A", "B", "D", "C"]);
    }

    #[test]
    fn test_selection_terminates_on_cycles() {
        let (db, ids) = database(&[
            "module A { import from B all; }",
            "module B { import from A all; }",
            "module C { import from A all; }",
        ]);
        let graph = ImportGraph::build(&db);
        let selected = DependencySelector::new(&graph).select([ids[0]]);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_importers_of_missing_name() {
        let (db, ids) = database(&["module A { import from Later all; }", "module B { }"]);
        let graph = ImportGraph::build(&db);
        assert_eq!(graph.importers_of_name("Later").collect::<Vec<_>>(), vec![ids[0]]);
        assert_eq!(graph.imports_of(ids[0]).count(), 0);
        assert_eq!(graph.importers_of_name("B").count(), 0);
    }

    #[test]
    fn test_self_import_adds_no_edge() {
        let (db, ids) = database(&["module A { import from A all; }"]);
        let graph = ImportGraph::build(&db);
        assert_eq!(graph.importers_of(ids[0]).count(), 0);
    }

    #[test]
    fn test_check_order_imported_first() {
        let (db, ids) = database(&[
            "module App { import from Lib all; import from Types all; }",
            "module Lib { import from Types all; }",
            "module Types { }",
        ]);
        let graph = ImportGraph::build(&db);
        let selected: IndexSet<ModuleId> = ids.iter().copied().collect();
        let order = check_order(&db, &graph, &selected);
        assert_eq!(names(&db, order), vec!["Types", "Lib", "App"]);
    }

    #[test]
    fn test_check_order_appends_cycles_by_name() {
        let (db, ids) = database(&[
            "module Z { import from Y all; }",
            "module Y { import from Z all; }",
            "module Base { }",
            "module Top { import from Z all; import from Base all; }",
        ]);
        let graph = ImportGraph::build(&db);
        let selected: IndexSet<ModuleId> = ids.iter().copied().collect();
        let order = check_order(&db, &graph, &selected);
        assert_eq!(names(&db, order), vec!["Base", "Top", "Y", "Z"]);
    }
}
