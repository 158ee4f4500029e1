use nested_set_storage::NestedSetNode;

use crate::MovePosition;

/// What a move observer is shown.
#[derive(Debug)]
pub struct MoveEvent<'a, Record>
where
    Record: NestedSetNode,
{
    /// The node being moved. Before a move this is the node as it was
    /// reloaded from the store; after a move it is the node as it now is.
    pub node: &'a Record,
    /// Where the node is (or was) going
    pub position: &'a MovePosition<Record::Id>,
}

/// Whether a pre-move observer lets the move proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookDecision {
    /// Carry on
    Proceed,
    /// Abandon the move before anything is written
    Veto,
}

type BeforeMove<Record> = Box<dyn Fn(&MoveEvent<'_, Record>) -> HookDecision + Send + Sync>;
type AfterMove<Record> = Box<dyn Fn(&MoveEvent<'_, Record>) + Send + Sync>;
type OnDestroy<Record> = Box<dyn Fn(&Record) + Send + Sync>;

/// Callback slots fired around structural changes.
///
/// Observers are registered explicitly; nothing is triggered by merely
/// changing a field on a record.
pub struct TreeHooks<Record>
where
    Record: NestedSetNode,
{
    before_move: Vec<BeforeMove<Record>>,
    after_move: Vec<AfterMove<Record>>,
    on_destroy: Vec<OnDestroy<Record>>,
}

impl<Record> Default for TreeHooks<Record>
where
    Record: NestedSetNode,
{
    fn default() -> Self {
        Self {
            before_move: Vec::new(),
            after_move: Vec::new(),
            on_destroy: Vec::new(),
        }
    }
}

impl<Record> std::fmt::Debug for TreeHooks<Record>
where
    Record: NestedSetNode,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeHooks")
            .field("before_move", &self.before_move.len())
            .field("after_move", &self.after_move.len())
            .field("on_destroy", &self.on_destroy.len())
            .finish()
    }
}

impl<Record> TreeHooks<Record>
where
    Record: NestedSetNode,
{
    /// No observers
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe moves before they happen. Returning [HookDecision::Veto]
    /// abandons the move.
    pub fn before_move<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&MoveEvent<'_, Record>) -> HookDecision + Send + Sync + 'static,
    {
        self.before_move.push(Box::new(callback));
        self
    }

    /// Observe moves after they complete
    pub fn after_move<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&MoveEvent<'_, Record>) + Send + Sync + 'static,
    {
        self.after_move.push(Box::new(callback));
        self
    }

    /// Observe each record that is destroyed individually. Records removed by
    /// a bulk delete are not reported.
    pub fn on_destroy<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&Record) + Send + Sync + 'static,
    {
        self.on_destroy.push(Box::new(callback));
        self
    }

    /// Run every pre-move observer; the first veto wins
    pub fn run_before_move(&self, event: &MoveEvent<'_, Record>) -> HookDecision {
        for callback in self.before_move.iter() {
            if callback(event) == HookDecision::Veto {
                return HookDecision::Veto;
            }
        }
        HookDecision::Proceed
    }

    /// Run every post-move observer
    pub fn run_after_move(&self, event: &MoveEvent<'_, Record>) {
        for callback in self.after_move.iter() {
            callback(event);
        }
    }

    /// Run every destroy observer
    pub fn run_on_destroy(&self, record: &Record) {
        for callback in self.on_destroy.iter() {
            callback(record);
        }
    }
}
