//! Dependency analysis over parsed formulas
//!
//! Lifts the per-cell ASTs into a workbook-wide graph, finds every cell
//! caught in a reference cycle, and produces the evaluation order the
//! emitter writes assignments in. Cycle members never appear in the order;
//! the emitter renders them as error sentinels instead.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use ahash::AHashMap;

use crate::ast::AstNode;
use crate::normalize::{normalize_reference, split_reference};

/// Parsed formulas keyed by canonical cell id (`Sheet!A1`)
///
/// Membership is the "has an AST" invariant: a formula cell whose parse
/// failed is absent here and the pipeline treats it as a literal.
pub type FormulaSet = BTreeMap<String, AstNode>;

/// One formula-bearing cell in the graph
#[derive(Debug)]
pub struct DependencyNode<'a> {
    /// Canonical cell id (`Sheet!A1`)
    pub id: String,
    /// Owning sheet name
    pub sheet: String,
    /// Normalized ids this cell's formula reads. Range references are kept
    /// verbatim (`Sheet!A1:A10`) and never expanded here; references to
    /// plain literal cells stay in the set even though they never become
    /// graph nodes.
    pub dependencies: BTreeSet<String>,
    /// The cell's parsed formula
    pub ast: &'a AstNode,
}

/// The workbook dependency graph
///
/// Nodes live in an arena in sorted-id order; a side map resolves ids to
/// arena indices and a bitset marks cycle membership. An instance caches
/// its cycle set and evaluation order, so it is built once per workbook and
/// dropped with it, never reused.
#[derive(Debug)]
pub struct DependencyGraph<'a> {
    nodes: Vec<DependencyNode<'a>>,
    index: AHashMap<String, usize>,
    in_cycle: Vec<bool>,
    order: Vec<String>,
}

impl<'a> DependencyGraph<'a> {
    /// Build the graph from the parsed formulas, detect cycles, and fix the
    /// evaluation order
    pub fn build(formulas: &'a FormulaSet) -> Self {
        let mut nodes = Vec::with_capacity(formulas.len());
        let mut index = AHashMap::with_capacity(formulas.len());

        for (id, ast) in formulas {
            let sheet = split_reference(id)
                .map(|(sheet, _)| sheet.to_string())
                .unwrap_or_default();

            let mut dependencies = BTreeSet::new();
            ast.for_each_ref(&mut |raw| {
                dependencies.insert(normalize_reference(raw, &sheet));
            });

            index.insert(id.clone(), nodes.len());
            nodes.push(DependencyNode {
                id: id.clone(),
                sheet,
                dependencies,
                ast,
            });
        }

        let mut graph = Self {
            in_cycle: vec![false; nodes.len()],
            order: Vec::with_capacity(nodes.len()),
            nodes,
            index,
        };
        graph.detect_cycles();
        graph.compute_order();
        graph
    }

    /// Number of nodes in the graph
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate nodes in sorted-id order
    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode<'a>> {
        self.nodes.iter()
    }

    /// Look up a node by canonical id
    pub fn node(&self, id: &str) -> Option<&DependencyNode<'a>> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Whether the id is part of any reference cycle
    pub fn is_cycle_member(&self, id: &str) -> bool {
        self.index.get(id).is_some_and(|&i| self.in_cycle[i])
    }

    /// All cycle members, in sorted-id order
    pub fn cycle_members(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| self.in_cycle[*i])
            .map(|(_, n)| n.id.as_str())
            .collect()
    }

    /// The evaluation order: a linear extension of the cycle-free subgraph.
    /// Cycle members are not in it.
    pub fn evaluation_order(&self) -> &[String] {
        &self.order
    }

    /// Cells whose formula reads the given id directly
    pub fn direct_dependents(&self, id: &str) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.dependencies.contains(id))
            .map(|n| n.id.as_str())
            .collect()
    }

    /// Everything the given cell reads, directly or through other formula
    /// cells. Includes non-formula cells and ranges, which are reported but
    /// not expanded further.
    pub fn transitive_dependencies(&self, id: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        let mut stack: Vec<String> = match self.node(id) {
            Some(node) => node.dependencies.iter().cloned().collect(),
            None => return out,
        };

        while let Some(dep) = stack.pop() {
            if !out.insert(dep.clone()) {
                continue;
            }
            if let Some(node) = self.node(&dep) {
                for next in &node.dependencies {
                    if !out.contains(next) {
                        stack.push(next.clone());
                    }
                }
            }
        }
        out
    }

    /// Every formula cell that reads the given id, directly or transitively
    pub fn transitive_dependents(&self, id: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        let mut stack: Vec<String> = self
            .direct_dependents(id)
            .into_iter()
            .map(String::from)
            .collect();

        while let Some(dep_id) = stack.pop() {
            if !out.insert(dep_id.clone()) {
                continue;
            }
            for next in self.direct_dependents(&dep_id) {
                if !out.contains(next) {
                    stack.push(next.to_string());
                }
            }
        }
        out
    }

    /// Three-color DFS. A back-edge marks everything on the current stack
    /// from the target onward as a cycle member; detection keeps going so
    /// disjoint cycles all get found.
    fn detect_cycles(&mut self) {
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Gray,
            Black,
        }

        fn dfs(
            v: usize,
            nodes: &[DependencyNode<'_>],
            index: &AHashMap<String, usize>,
            colors: &mut [Color],
            stack: &mut Vec<usize>,
            in_cycle: &mut [bool],
        ) {
            colors[v] = Color::Gray;
            stack.push(v);

            for dep in &nodes[v].dependencies {
                let Some(&w) = index.get(dep) else {
                    continue; // literal cell or range: not a graph node
                };
                match colors[w] {
                    Color::White => dfs(w, nodes, index, colors, stack, in_cycle),
                    Color::Gray => {
                        if let Some(pos) = stack.iter().position(|&x| x == w) {
                            for &member in &stack[pos..] {
                                in_cycle[member] = true;
                            }
                        }
                    }
                    Color::Black => {}
                }
            }

            stack.pop();
            colors[v] = Color::Black;
        }

        let mut colors = vec![Color::White; self.nodes.len()];
        let mut stack = Vec::new();
        for v in 0..self.nodes.len() {
            if colors[v] == Color::White {
                dfs(
                    v,
                    &self.nodes,
                    &self.index,
                    &mut colors,
                    &mut stack,
                    &mut self.in_cycle,
                );
            }
        }
    }

    /// Dependency-first DFS over the cycle-free subgraph
    fn compute_order(&mut self) {
        fn visit(
            v: usize,
            nodes: &[DependencyNode<'_>],
            index: &AHashMap<String, usize>,
            in_cycle: &[bool],
            visited: &mut [bool],
            order: &mut Vec<String>,
        ) {
            if visited[v] || in_cycle[v] {
                return;
            }
            visited[v] = true;

            for dep in &nodes[v].dependencies {
                if let Some(&w) = index.get(dep) {
                    visit(w, nodes, index, in_cycle, visited, order);
                }
            }

            order.push(nodes[v].id.clone());
        }

        let mut visited = vec![false; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        for v in 0..self.nodes.len() {
            visit(
                v,
                &self.nodes,
                &self.index,
                &self.in_cycle,
                &mut visited,
                &mut order,
            );
        }
        self.order = order;
    }
}
