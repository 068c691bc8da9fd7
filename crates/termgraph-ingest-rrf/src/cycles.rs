//! Hierarchy cycle repair.
//!
//! Source hierarchies are not guaranteed to be acyclic. Within one
//! terminology, every maximal cycle is resolved either by electing a
//! dominant member as the parent of all others, or, when no member clearly
//! dominates, by declaring the members equivalent and giving all of them the
//! union of their outside parents.

use roaring::RoaringBitmap;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use termgraph_store::StrId;

/// Child → parent sets.
pub type Parents = BTreeMap<StrId, BTreeSet<StrId>>;

/// Weighted child → parent edges of one terminology.
///
/// Weights count how often an edge was asserted; only the cycle vote reads
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentGraph {
    edges: BTreeMap<StrId, BTreeMap<StrId, u32>>,
}

impl ParentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `child → parent` with set semantics (weight 1).
    pub fn add_edge(&mut self, child: StrId, parent: StrId) {
        self.edges
            .entry(child)
            .or_default()
            .entry(parent)
            .or_insert(1);
    }

    /// Add `count` to the weight of `child → parent`.
    pub fn add_support(&mut self, child: StrId, parent: StrId, count: u32) {
        *self
            .edges
            .entry(child)
            .or_default()
            .entry(parent)
            .or_insert(0) += count;
    }

    pub fn parents(&self, child: StrId) -> impl Iterator<Item = StrId> + '_ {
        self.edges
            .get(&child)
            .into_iter()
            .flat_map(|parents| parents.keys().copied())
    }

    pub fn weight(&self, child: StrId, parent: StrId) -> u32 {
        self.edges
            .get(&child)
            .and_then(|parents| parents.get(&parent))
            .copied()
            .unwrap_or(0)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn unweighted(&self) -> Parents {
        self.edges
            .iter()
            .map(|(child, parents)| (*child, parents.keys().copied().collect()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleDecision {
    /// This member became the parent of every other member.
    Dominant(StrId),
    /// No member dominated; the members are equivalent.
    Equivalent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCycle {
    pub members: BTreeSet<StrId>,
    /// In-cycle parent votes, strongest first.
    pub votes: Vec<(StrId, u32)>,
    pub decision: CycleDecision,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleResolution {
    /// Repaired parent sets. Children absent from the input graph are absent
    /// here too.
    pub parents: Parents,
    /// Member sets resolved as equivalent.
    pub equivalences: Vec<BTreeSet<StrId>>,
    /// Every maximal cycle found, with how it was resolved.
    pub cycles: Vec<ResolvedCycle>,
}

impl CycleResolution {
    pub fn cycle_count(&self) -> usize {
        self.cycles.len()
    }

    pub fn parents_of(&self, child: StrId) -> Option<&BTreeSet<StrId>> {
        self.parents.get(&child).filter(|p| !p.is_empty())
    }

    /// `true` when the repaired edges contain no cycle.
    pub fn is_acyclic(&self) -> bool {
        let mut done = BTreeSet::new();
        for start in self.parents.keys() {
            let mut on_path = BTreeSet::new();
            if reaches_cycle(&self.parents, *start, &mut on_path, &mut done) {
                return false;
            }
        }
        true
    }
}

fn reaches_cycle(
    parents: &Parents,
    node: StrId,
    on_path: &mut BTreeSet<StrId>,
    done: &mut BTreeSet<StrId>,
) -> bool {
    if done.contains(&node) {
        return false;
    }
    if !on_path.insert(node) {
        return true;
    }
    for parent in parents.get(&node).into_iter().flatten() {
        if reaches_cycle(parents, *parent, on_path, done) {
            return true;
        }
    }
    on_path.remove(&node);
    done.insert(node);
    false
}

/// Enumerate simple upward paths breadth-first from every unvisited child and
/// collect the node set of each back edge.
fn find_cycles(parents: &Parents) -> BTreeSet<BTreeSet<StrId>> {
    let mut found = BTreeSet::new();
    let mut visited = RoaringBitmap::new();

    for root in parents.keys().copied() {
        if visited.contains(root.raw()) {
            continue;
        }
        let mut paths: VecDeque<Vec<StrId>> = VecDeque::from([vec![root]]);
        while let Some(path) = paths.pop_front() {
            let Some(&last) = path.last() else {
                continue;
            };
            visited.insert(last.raw());
            for next in parents.get(&last).into_iter().flatten().copied() {
                if let Some(pos) = path.iter().position(|n| *n == next) {
                    found.insert(path[pos..].iter().copied().collect());
                } else {
                    let mut extended = path.clone();
                    extended.push(next);
                    paths.push_back(extended);
                }
            }
        }
    }
    found
}

/// Drop every candidate that is a strict subset of another.
fn maximal(candidates: BTreeSet<BTreeSet<StrId>>) -> Vec<BTreeSet<StrId>> {
    candidates
        .iter()
        .filter(|cycle| {
            !candidates
                .iter()
                .any(|other| other != *cycle && other.is_superset(cycle))
        })
        .cloned()
        .collect()
}

/// Weighted count of in-cycle parents, strongest first, ties by id.
///
/// `edges` is the parent map at the start of the round. Weights come from the
/// input graph; an edge added by an earlier repair counts once.
fn votes(graph: &ParentGraph, edges: &Parents, members: &BTreeSet<StrId>) -> Vec<(StrId, u32)> {
    let mut counts: BTreeMap<StrId, u32> = BTreeMap::new();
    for member in members {
        for parent in edges.get(member).into_iter().flatten() {
            if members.contains(parent) {
                *counts.entry(*parent).or_default() += graph.weight(*member, *parent).max(1);
            }
        }
    }
    let mut ranked: Vec<(StrId, u32)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}

/// Rounds in which an equivalence hands its members the union of their
/// outside parents. After that, each round resolves a single cycle and an
/// equivalence only cuts its in-cycle edges, so every round removes edges.
const UNION_ROUNDS: usize = 32;

/// Repair `graph` so that its cycles are resolved.
///
/// A member dominates when its vote is at least twice the runner-up's.
/// Resolving overlapping cycles can close new ones through the merged parent
/// sets, so resolution repeats on the repaired edges until none are left.
pub fn break_cycles(graph: &ParentGraph) -> CycleResolution {
    let mut resolution = CycleResolution {
        parents: graph.unweighted(),
        ..CycleResolution::default()
    };

    for round in 0.. {
        let cycles = maximal(find_cycles(&resolution.parents));
        if cycles.is_empty() {
            break;
        }
        let union = round < UNION_ROUNDS;
        let batch = if union { cycles.len() } else { 1 };
        let edges = resolution.parents.clone();
        for members in cycles.into_iter().take(batch) {
            let ranked = votes(graph, &edges, &members);
            resolution.resolve(members, ranked, union);
        }
    }
    resolution
}

impl CycleResolution {
    fn resolve(&mut self, members: BTreeSet<StrId>, ranked: Vec<(StrId, u32)>, union: bool) {
        let parents = &mut self.parents;
        for member in &members {
            if let Some(set) = parents.get_mut(member) {
                set.retain(|p| !members.contains(p));
            }
        }

        let top = ranked.first().copied();
        let runner_up = ranked.get(1).map_or(0, |(_, count)| *count);
        let decision = match top {
            Some((winner, count)) if count >= 2 * runner_up => {
                for member in &members {
                    if *member != winner {
                        parents.entry(*member).or_default().insert(winner);
                    }
                }
                CycleDecision::Dominant(winner)
            }
            _ => {
                if union {
                    let outside: BTreeSet<StrId> = members
                        .iter()
                        .filter_map(|m| parents.get(m))
                        .flatten()
                        .copied()
                        .collect();
                    for member in &members {
                        parents
                            .entry(*member)
                            .or_default()
                            .extend(outside.iter().copied());
                    }
                }
                self.equivalences.push(members.clone());
                CycleDecision::Equivalent
            }
        };
        self.cycles.push(ResolvedCycle {
            members,
            votes: ranked,
            decision,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(raw: u32) -> StrId {
        StrId::new(raw)
    }

    fn graph(edges: &[(u32, u32)]) -> ParentGraph {
        let mut g = ParentGraph::new();
        for (child, parent) in edges {
            g.add_edge(id(*child), id(*parent));
        }
        g
    }

    fn set(raw: &[u32]) -> BTreeSet<StrId> {
        raw.iter().map(|r| id(*r)).collect()
    }

    #[test]
    fn add_edge_is_idempotent_but_support_accumulates() {
        let mut g = graph(&[(1, 2), (1, 2)]);
        assert_eq!(g.weight(id(1), id(2)), 1);
        g.add_support(id(1), id(2), 3);
        assert_eq!(g.weight(id(1), id(2)), 4);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn acyclic_graph_is_untouched() {
        let g = graph(&[(2, 1), (3, 1), (4, 2), (4, 3)]);
        let r = break_cycles(&g);
        assert_eq!(r.cycle_count(), 0);
        assert_eq!(r.parents_of(id(4)), Some(&set(&[2, 3])));
        assert!(r.is_acyclic());
    }

    #[test]
    fn only_maximal_cycles_are_reported() {
        // 1 ⇄ 2 is contained in 1 → 2 → 3 → 1.
        let g = graph(&[(1, 2), (2, 1), (2, 3), (3, 1)]);
        let r = break_cycles(&g);
        assert_eq!(r.cycle_count(), 1);
        assert_eq!(r.cycles[0].members, set(&[1, 2, 3]));
    }

    #[test]
    fn two_node_cycle_with_equal_votes_becomes_equivalence() {
        let g = graph(&[(1, 2), (2, 1), (1, 10), (2, 11)]);
        let r = break_cycles(&g);
        assert_eq!(r.cycles[0].decision, CycleDecision::Equivalent);
        assert_eq!(r.equivalences, vec![set(&[1, 2])]);
        assert_eq!(r.parents_of(id(1)), Some(&set(&[10, 11])));
        assert_eq!(r.parents_of(id(2)), Some(&set(&[10, 11])));
        assert!(r.is_acyclic());
    }

    #[test]
    fn dominant_member_becomes_parent_of_the_rest() {
        // A=1, B=2, C=3: A→B, B→C, C→A, plus B→A. Votes: A=2, B=1, C=1.
        let g = graph(&[(1, 2), (2, 3), (3, 1), (2, 1)]);
        let r = break_cycles(&g);
        assert_eq!(r.cycle_count(), 1);
        assert_eq!(r.cycles[0].decision, CycleDecision::Dominant(id(1)));
        assert_eq!(r.parents_of(id(1)), None);
        assert_eq!(r.parents_of(id(2)), Some(&set(&[1])));
        assert_eq!(r.parents_of(id(3)), Some(&set(&[1])));
        assert!(r.equivalences.is_empty());
    }

    #[test]
    fn weights_decide_the_vote() {
        let mut g = graph(&[(1, 2), (2, 1)]);
        g.add_support(id(2), id(1), 5);
        let r = break_cycles(&g);
        assert_eq!(r.cycles[0].decision, CycleDecision::Dominant(id(1)));
        assert_eq!(r.parents_of(id(2)), Some(&set(&[1])));
    }

    #[test]
    fn outside_edges_into_a_cycle_do_not_vote() {
        // 4 → 1 points into the cycle from outside and is kept as is.
        let g = graph(&[(1, 2), (2, 3), (3, 1), (4, 1)]);
        let r = break_cycles(&g);
        assert_eq!(r.cycles[0].decision, CycleDecision::Equivalent);
        assert_eq!(r.parents_of(id(4)), Some(&set(&[1])));
        assert_eq!(r.parents_of(id(1)), None);
    }

    #[test]
    fn overlapping_equivalences_are_repaired_until_no_cycle_remains() {
        // {0,2}, {0,4} and {1,2} tie; their merged parents close 1 ⇄ 4.
        let g = graph(&[(2, 0), (2, 1), (1, 2), (4, 0), (0, 4), (0, 2)]);
        let r = break_cycles(&g);
        assert!(r.is_acyclic());
        assert_eq!(r.cycle_count(), 4);
        assert_eq!(r.cycles[3].members, set(&[1, 4]));
        assert_eq!(r.cycles[3].decision, CycleDecision::Equivalent);
        assert_eq!(r.parents_of(id(0)), Some(&set(&[1])));
        assert_eq!(r.parents_of(id(2)), Some(&set(&[4])));
        assert_eq!(r.parents_of(id(1)), None);
        assert_eq!(r.parents_of(id(4)), None);
    }

    fn single_cycle() -> impl Strategy<Value = (Vec<u32>, Vec<u32>, Vec<Option<u32>>)> {
        (2usize..7).prop_flat_map(|n| {
            (
                Just((1..=n as u32).collect::<Vec<_>>()),
                prop::collection::vec(1u32..5, n),
                prop::collection::vec(prop::option::of(100u32..105), n),
            )
        })
    }

    proptest! {
        #[test]
        fn a_single_cycle_is_always_repaired((members, weights, outside) in single_cycle()) {
            let mut g = ParentGraph::new();
            let n = members.len();
            for i in 0..n {
                let next = members[(i + 1) % n];
                g.add_support(id(members[i]), id(next), weights[i]);
                if let Some(p) = outside[i] {
                    g.add_edge(id(members[i]), id(p));
                }
            }
            let r = break_cycles(&g);
            prop_assert_eq!(r.cycle_count(), 1);
            prop_assert!(r.is_acyclic());
            let all: BTreeSet<StrId> = members.iter().map(|m| id(*m)).collect();
            if !r.equivalences.is_empty() {
                for member in &all {
                    let parents = r.parents.get(member).cloned().unwrap_or_default();
                    prop_assert!(parents.iter().all(|p| !all.contains(p)));
                }
            }
        }

        #[test]
        fn random_graphs_become_acyclic(
            edges in prop::collection::vec((0u32..6, 0u32..6), 0..18)
        ) {
            let mut g = ParentGraph::new();
            for (child, parent) in edges {
                if child != parent {
                    g.add_edge(id(child), id(parent));
                }
            }
            let r = break_cycles(&g);
            prop_assert!(r.is_acyclic());
        }

        #[test]
        fn dags_are_left_unchanged(edges in prop::collection::vec((0u32..20, 0u32..20), 0..40)) {
            // Orient every edge from the higher id to the lower one.
            let mut g = ParentGraph::new();
            for (a, b) in edges {
                if a != b {
                    g.add_edge(id(a.max(b)), id(a.min(b)));
                }
            }
            let r = break_cycles(&g);
            prop_assert_eq!(r.cycle_count(), 0);
            prop_assert_eq!(r.parents, g.unweighted());
        }
    }
}
