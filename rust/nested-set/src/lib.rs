#![warn(missing_docs)]

//! Maintenance of trees stored with the nested set (modified preorder)
//! encoding.
//!
//! Every node holds two integer boundaries, `left` and `right`, such that the
//! interval of each descendant sits strictly inside the interval of its
//! ancestors. That makes subtree, ancestor and sibling reads single range
//! scans over a flat record collection, at the price of renumbering
//! boundaries on every structural change. This crate keeps those boundaries
//! consistent:
//!
//! - [allocate] picks boundaries for a node about to be inserted
//! - [move_node] relocates a node and its subtree by swapping two adjacent
//!   boundary ranges, touching only records inside them
//! - [destroy] removes a subtree and closes the gap it leaves
//! - [validate] and [rebuild] detect and repair a damaged tree
//! - the query functions ([self_and_descendants], [ancestors], [siblings]
//!   and friends) read the tree back
//!
//! A tree lives in any [nested_set_storage::NodeStore]. Records may be
//! partitioned into independently numbered forests ("scopes") by naming the
//! attributes that identify them in a [NestedSetConfig].
//!
//! [NestedSet] bundles a store with its configuration and observers:
//!
//! ```
//! # tokio_test::block_on(async {
//! use nested_set::{NestedSet, NestedSetConfig};
//! use nested_set_storage::{MemoryNodeStore, Node};
//!
//! let mut tree = NestedSet::new(MemoryNodeStore::default(), NestedSetConfig::new());
//!
//! tree.create(Node::new("a".to_owned())).await.unwrap();
//! tree.create(Node::new("b".to_owned()).with_parent("a".to_owned())).await.unwrap();
//! tree.create(Node::new("c".to_owned()).with_parent("b".to_owned())).await.unwrap();
//!
//! tree.move_to_root(&"c".to_owned()).await.unwrap();
//!
//! let a = tree.get(&"a".to_owned()).await.unwrap().unwrap();
//! assert_eq!(tree.to_text(&a).await.unwrap(), "* a (-, 3, 6)\n** b (a, 4, 5)");
//! assert!(tree.valid().await.unwrap());
//! # })
//! ```
//!
//! None of the structural operations is atomic. Callers that mutate a tree
//! from several tasks must serialize those mutations (per tree, or per
//! scope), and a mutation that fails part way leaves the tree for [rebuild]
//! to repair.

mod error;
pub use error::*;

mod config;
pub use config::*;

mod storage;
pub use storage::*;

mod interval;
pub use interval::*;

mod allocator;
pub use allocator::*;

mod query;
pub use query::*;

mod level;
pub use level::*;

mod position;
pub use position::*;

mod hooks;
pub use hooks::*;

mod mover;
pub use mover::*;

mod validator;
pub use validator::*;

mod rebuilder;
pub use rebuilder::*;

mod pruner;
pub use pruner::*;

mod nested_set;
pub use nested_set::*;
