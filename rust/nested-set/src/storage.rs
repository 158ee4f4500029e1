use nested_set_storage::{NestedSetStoreError, NodeStore};

/// The stores a nested set tree can be maintained in: any [NodeStore] whose
/// failures are reported as [NestedSetStoreError].
pub trait TreeStore: NodeStore<Error = NestedSetStoreError> {}

impl<Store> TreeStore for Store where Store: NodeStore<Error = NestedSetStoreError> {}
