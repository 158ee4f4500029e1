#![warn(missing_docs)]

//! This crate describes the record store that a nested set tree lives in.
//!
//! A nested set tree does not own its storage. It only needs a flat
//! collection of records that can be looked up by id, scanned with range
//! filters over their boundaries, partially updated one field at a time and
//! bulk deleted by filter. Those capabilities are captured by the
//! [NodeStore] trait, and the shape of each record by [NestedSetNode] and
//! [NestedSetRecord].
//!
//! A trivial in-memory backend is provided for tests and embedding:
//!
//! ```rust
//! # tokio_test::block_on(async {
//! use nested_set_storage::{
//!     Direction, Field, MemoryNodeStore, Node, NodeFilter, NodeQuery, NodeStore, Operator,
//! };
//!
//! let mut store = MemoryNodeStore::<Node<u64>>::default();
//!
//! store.put(Node::new(1).with_bounds(1, 4)).await.unwrap();
//! store.put(Node::new(2).with_parent(1).with_bounds(2, 3)).await.unwrap();
//!
//! let query = NodeQuery::from(NodeFilter::default().left(Operator::Gt, 1))
//!     .order_by(Field::Left, Direction::Ascending);
//! let found = store.find(&query).await.unwrap();
//!
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].id, 2);
//! # })
//! ```

mod error;
pub use error::*;

mod sync;
pub use sync::*;

mod scope;
pub use scope::*;

mod record;
pub use record::*;

mod query;
pub use query::*;

mod store;
pub use store::*;

#[cfg(any(test, feature = "helpers"))]
mod helpers;
#[cfg(any(test, feature = "helpers"))]
pub use helpers::*;
