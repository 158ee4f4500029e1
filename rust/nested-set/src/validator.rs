use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt::Display,
};

use nested_set_storage::{Boundary, NestedSetNode, NodeFilter, NodeQuery, ScopeKey};

use crate::{Interval, NestedSetConfig, NestedSetError, TreeStore};

/// A single structural problem found in a stored tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation<Id> {
    /// A node is missing one or both boundaries
    Unallocated {
        /// The offending node
        id: Id,
    },
    /// A node's left boundary is not below its right boundary
    Inverted {
        /// The offending node
        id: Id,
        /// Its interval
        interval: Interval,
    },
    /// A node's interval is not strictly inside its parent's, or its parent
    /// belongs to another scope
    EscapesParent {
        /// The offending node
        id: Id,
        /// The parent it should nest inside
        parent_id: Id,
    },
    /// The same boundary number is used more than once in a scope
    DuplicateBoundary {
        /// The scope the duplicate was found in
        scope: ScopeKey,
        /// The repeated boundary
        boundary: Boundary,
        /// How many times it occurs
        count: usize,
    },
    /// Of two consecutive roots, the later one does not have both a greater
    /// left and a greater right boundary
    RootsOverlap {
        /// The root with the smaller left boundary
        id: Id,
        /// The root that follows it
        next_id: Id,
    },
}

impl<Id> Display for Violation<Id>
where
    Id: Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::Unallocated { id } => write!(f, "{id} has no boundaries"),
            Violation::Inverted { id, interval } => write!(
                f,
                "{id} has left {} not below right {}",
                interval.left, interval.right
            ),
            Violation::EscapesParent { id, parent_id } => {
                write!(f, "{id} is not nested inside its parent {parent_id}")
            }
            Violation::DuplicateBoundary {
                scope,
                boundary,
                count,
            } => write!(f, "boundary {boundary} occurs {count} times in {scope}"),
            Violation::RootsOverlap { id, next_id } => {
                write!(f, "root {next_id} does not follow root {id}")
            }
        }
    }
}

/// Everything [validate] found wrong with a tree. An empty report means the
/// tree is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport<Id> {
    /// The problems found, grouped by scope
    pub violations: Vec<Violation<Id>>,
}

impl<Id> Default for ValidationReport<Id> {
    fn default() -> Self {
        Self {
            violations: Vec::new(),
        }
    }
}

impl<Id> ValidationReport<Id> {
    /// True if no problem was found
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check every scope in `store`.
///
/// A tree is valid when every node has `left < right` and nests strictly
/// inside a parent of the same scope, no boundary number repeats within a
/// scope, and the roots of each scope, taken in order of their left
/// boundary, have strictly increasing right boundaries too. A parent
/// reference to a node that is not in the store is not checked.
pub async fn validate<Store>(
    store: &Store,
    config: &NestedSetConfig,
) -> Result<ValidationReport<Store::Id>, NestedSetError>
where
    Store: TreeStore,
{
    let records = store.find(&NodeQuery::from(NodeFilter::default())).await?;
    let stored: HashSet<Store::Id> = records.iter().map(|record| record.id().clone()).collect();

    let mut report = ValidationReport::default();
    for (scope, records) in group_by_scope(config, records) {
        check_scope(&scope, &records, &stored, &mut report);
    }
    Ok(report)
}

/// Check the single scope `scope`
pub async fn validate_scope<Store>(
    store: &Store,
    scope: &ScopeKey,
) -> Result<ValidationReport<Store::Id>, NestedSetError>
where
    Store: TreeStore,
{
    let records = store
        .find(&NodeQuery::from(NodeFilter::in_scope(scope.clone())))
        .await?;
    let stored = stored_parents(store, &records).await?;

    let mut report = ValidationReport::default();
    check_scope(scope, &records, &stored, &mut report);
    Ok(report)
}

/// True if [validate] finds nothing wrong
pub async fn valid<Store>(store: &Store, config: &NestedSetConfig) -> Result<bool, NestedSetError>
where
    Store: TreeStore,
{
    Ok(validate(store, config).await?.is_valid())
}

pub(crate) fn group_by_scope<Record>(
    config: &NestedSetConfig,
    records: Vec<Record>,
) -> BTreeMap<ScopeKey, Vec<Record>>
where
    Record: NestedSetNode,
{
    let mut groups: BTreeMap<ScopeKey, Vec<Record>> = BTreeMap::new();
    for record in records {
        groups
            .entry(config.scope_of(&record))
            .or_default()
            .push(record);
    }
    groups
}

/// The ids of `records` plus every parent they reference that exists
/// elsewhere in the store
pub(crate) async fn stored_parents<Store>(
    store: &Store,
    records: &[Store::Record],
) -> Result<HashSet<Store::Id>, NestedSetError>
where
    Store: TreeStore,
{
    let mut stored: HashSet<Store::Id> = records.iter().map(|record| record.id().clone()).collect();
    let outside: Vec<Store::Id> = records
        .iter()
        .filter_map(|record| record.parent_id())
        .filter(|parent_id| !stored.contains(*parent_id))
        .cloned()
        .collect();

    for parent_id in outside {
        if store.get(&parent_id).await?.is_some() {
            stored.insert(parent_id);
        }
    }
    Ok(stored)
}

/// Check one scope group. `stored` holds the ids known to exist in the
/// store, so that a parent outside the group can be told apart from a
/// missing one.
pub(crate) fn check_scope<Record>(
    scope: &ScopeKey,
    records: &[Record],
    stored: &HashSet<Record::Id>,
    report: &mut ValidationReport<Record::Id>,
) where
    Record: NestedSetNode,
{
    check_boundaries(records, stored, report);
    check_duplicates(scope, records, report);
    check_roots(records, report);
}

fn check_boundaries<Record>(
    records: &[Record],
    stored: &HashSet<Record::Id>,
    report: &mut ValidationReport<Record::Id>,
) where
    Record: NestedSetNode,
{
    let members: HashSet<&Record::Id> = records.iter().map(|record| record.id()).collect();

    let intervals: HashMap<&Record::Id, Interval> = records
        .iter()
        .filter_map(|record| {
            Interval::of(record)
                .ok()
                .map(|interval| (record.id(), interval))
        })
        .collect();

    for record in records {
        let Some(interval) = intervals.get(record.id()) else {
            report.violations.push(Violation::Unallocated {
                id: record.id().clone(),
            });
            continue;
        };

        if interval.left >= interval.right {
            report.violations.push(Violation::Inverted {
                id: record.id().clone(),
                interval: *interval,
            });
        }

        if let Some(parent_id) = record.parent_id() {
            let escapes = match intervals.get(parent_id) {
                Some(parent) => interval.left <= parent.left || interval.right >= parent.right,
                None => !members.contains(parent_id) && stored.contains(parent_id),
            };
            if escapes {
                report.violations.push(Violation::EscapesParent {
                    id: record.id().clone(),
                    parent_id: parent_id.clone(),
                });
            }
        }
    }
}

fn check_duplicates<Record>(
    scope: &ScopeKey,
    records: &[Record],
    report: &mut ValidationReport<Record::Id>,
) where
    Record: NestedSetNode,
{
    let mut counts: BTreeMap<Boundary, usize> = BTreeMap::new();
    for boundary in records
        .iter()
        .flat_map(|record| [record.left(), record.right()])
        .flatten()
    {
        *counts.entry(boundary).or_default() += 1;
    }

    for (boundary, count) in counts {
        if count > 1 {
            report.violations.push(Violation::DuplicateBoundary {
                scope: scope.clone(),
                boundary,
                count,
            });
        }
    }
}

fn check_roots<Record>(records: &[Record], report: &mut ValidationReport<Record::Id>)
where
    Record: NestedSetNode,
{
    let mut roots: Vec<(&Record::Id, Interval)> = records
        .iter()
        .filter(|record| record.parent_id().is_none())
        .filter_map(|record| {
            Interval::of(record)
                .ok()
                .map(|interval| (record.id(), interval))
        })
        .collect();
    roots.sort_by(|(a_id, a), (b_id, b)| a.cmp(b).then_with(|| a_id.cmp(b_id)));

    for pair in roots.windows(2) {
        let (id, interval) = pair[0];
        let (next_id, next) = pair[1];
        if next.left <= interval.left || next.right <= interval.right {
            report.violations.push(Violation::RootsOverlap {
                id: id.clone(),
                next_id: next_id.clone(),
            });
        }
    }
}
