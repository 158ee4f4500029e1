use std::collections::{HashMap, HashSet};

use nested_set_storage::{Boundary, FieldUpdate, NestedSetNode, NodeFilter, NodeQuery, ScopeKey};

use crate::{
    NestedSetConfig, NestedSetError, TreeStore, ValidationReport, check_scope, group_by_scope,
    stored_parents,
};

/// The result of a [rebuild] or [rebuild_scope] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// Every scope checked was valid, so nothing was touched
    AlreadyValid,
    /// Boundaries were renumbered
    Rebuilt {
        /// How many records had at least one boundary rewritten
        updated: usize,
    },
}

enum Step<'a, Record> {
    Enter(&'a Record),
    Leave(&'a Record),
}

fn stable_order<Record>(a: &&Record, b: &&Record) -> std::cmp::Ordering
where
    Record: NestedSetNode,
{
    a.left()
        .cmp(&b.left())
        .then_with(|| a.right().cmp(&b.right()))
        .then_with(|| a.id().cmp(b.id()))
}

/// Recompute boundaries from the parent references, scope by scope.
///
/// Each scope group is checked on its own and left alone if it is valid.
/// An invalid scope is renumbered from 1 by a depth-first walk: roots in
/// order of their current `(left, right, id)`, children in the same order
/// beneath their parent. A left boundary is assigned on entering a node and
/// a right boundary on leaving it. Nodes whose parent is not in the scope
/// are numbered as extra roots after the real ones. Nodes caught in a parent
/// cycle are never reached and keep their boundaries.
///
/// The writes are not atomic; if the call fails part way, call it again.
pub async fn rebuild<Store>(
    store: &mut Store,
    config: &NestedSetConfig,
) -> Result<RebuildOutcome, NestedSetError>
where
    Store: TreeStore,
{
    let records = store.find(&NodeQuery::from(NodeFilter::default())).await?;
    let stored: HashSet<Store::Id> = records.iter().map(|record| record.id().clone()).collect();

    let mut outcome = RebuildOutcome::AlreadyValid;
    for (scope, records) in group_by_scope(config, records) {
        let mut report = ValidationReport::default();
        check_scope(&scope, &records, &stored, &mut report);
        if report.is_valid() {
            continue;
        }

        tracing::warn!(
            %scope,
            violations = report.violations.len(),
            "Scope is invalid, rebuilding boundaries"
        );
        outcome = outcome.add(renumber(store, &scope, &records).await?);
    }

    Ok(outcome)
}

/// Recompute the boundaries of the single scope `scope`, if it is invalid
pub async fn rebuild_scope<Store>(
    store: &mut Store,
    scope: &ScopeKey,
) -> Result<RebuildOutcome, NestedSetError>
where
    Store: TreeStore,
{
    let records = store
        .find(&NodeQuery::from(NodeFilter::in_scope(scope.clone())))
        .await?;
    let stored = stored_parents(store, &records).await?;

    let mut report = ValidationReport::default();
    check_scope(scope, &records, &stored, &mut report);
    if report.is_valid() {
        return Ok(RebuildOutcome::AlreadyValid);
    }

    tracing::warn!(
        %scope,
        violations = report.violations.len(),
        "Scope is invalid, rebuilding boundaries"
    );
    let updated = renumber(store, scope, &records).await?;
    Ok(RebuildOutcome::Rebuilt { updated })
}

impl RebuildOutcome {
    fn add(self, updated: usize) -> Self {
        match self {
            RebuildOutcome::AlreadyValid => RebuildOutcome::Rebuilt { updated },
            RebuildOutcome::Rebuilt { updated: before } => RebuildOutcome::Rebuilt {
                updated: before + updated,
            },
        }
    }
}

/// Number one scope group depth first, returning how many records changed
async fn renumber<Store>(
    store: &mut Store,
    scope: &ScopeKey,
    records: &[Store::Record],
) -> Result<usize, NestedSetError>
where
    Store: TreeStore,
{
    let ids: HashSet<&Store::Id> = records.iter().map(|record| record.id()).collect();

    let mut roots = Vec::new();
    let mut orphans = Vec::new();
    let mut children: HashMap<&Store::Id, Vec<&Store::Record>> = HashMap::new();
    for record in records.iter() {
        match record.parent_id() {
            None => roots.push(record),
            Some(parent_id) if ids.contains(parent_id) => {
                children.entry(parent_id).or_default().push(record)
            }
            Some(_) => orphans.push(record),
        }
    }
    roots.sort_by(stable_order);
    orphans.sort_by(stable_order);
    for siblings in children.values_mut() {
        siblings.sort_by(stable_order);
    }

    let mut counter: Boundary = 0;
    let mut stack: Vec<Step<'_, Store::Record>> = roots
        .into_iter()
        .chain(orphans)
        .rev()
        .map(Step::Enter)
        .collect();
    let mut visited = HashSet::new();
    let mut touched = HashSet::new();

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(record) => {
                if !visited.insert(record.id()) {
                    continue;
                }
                counter += 1;
                if record.left() != Some(counter) {
                    store
                        .update(record.id(), FieldUpdate::Left(counter))
                        .await?;
                    touched.insert(record.id());
                }
                stack.push(Step::Leave(record));
                if let Some(siblings) = children.get(record.id()) {
                    stack.extend(siblings.iter().rev().map(|child| Step::Enter(*child)));
                }
            }
            Step::Leave(record) => {
                counter += 1;
                if record.right() != Some(counter) {
                    store
                        .update(record.id(), FieldUpdate::Right(counter))
                        .await?;
                    touched.insert(record.id());
                }
            }
        }
    }

    tracing::debug!(%scope, boundaries = counter, "Renumbered scope");
    Ok(touched.len())
}
