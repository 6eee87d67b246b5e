//! T-tree in-memory indexes for Rust.
//!
//! This crate provides [`TTree`], an ordered index in the style of main-memory database systems: a
//! balanced binary tree whose nodes each hold a bounded, sorted array of keys. Keys are ordered
//! only through a caller-supplied [`Comparator`], so a tree usually stores references to records it
//! does not own, and several trees can index the same records by different fields.
//!
//! - [`insert`](TTree::insert) - Unique or non-unique insertion; a failed insert changes nothing
//! - [`get`](TTree::get) - Point lookup with a forward, backward, or binary intra-node search
//! - [`get_by`](TTree::get_by) - Lookup by a closure over the stored key, for searching by field
//! - [`remove`](TTree::remove) - Deletion with node borrowing, merging, and rebalancing
//! - [`iter`](TTree::iter) - In-order traversal
//!
//! # Example
//!
//! ```
//! use ttree::{Config, Error, TTree};
//!
//! struct Order {
//!     id: u64,
//!     customer: u32,
//! }
//!
//! let orders: Vec<Order> = (0..100).map(|id| Order { id, customer: (id % 7) as u32 }).collect();
//!
//! // A unique primary index and a non-unique secondary index over the same records.
//! let mut by_id = TTree::with_config(|a: &&Order, b: &&Order| a.id.cmp(&b.id), Config::new())?;
//! let mut by_customer = TTree::with_config(
//!     |a: &&Order, b: &&Order| a.customer.cmp(&b.customer),
//!     Config::new().with_unique(false),
//! )?;
//!
//! for order in &orders {
//!     by_id.insert(order)?;
//!     by_customer.insert(order)?;
//! }
//!
//! assert_eq!(by_id.insert(&orders[0]), Err(Error::DuplicateKey));
//!
//! // Look records up by a field value; no `Order` has to be built for the search.
//! assert!(core::ptr::eq(*by_id.get_by(|o| o.id.cmp(&42)).unwrap(), &orders[42]));
//! assert_eq!(by_customer.len(), 100);
//!
//! let removed = by_customer.remove_by(|o| o.customer.cmp(&3)).unwrap();
//! assert_eq!(removed.customer, 3);
//! # Ok::<(), Error>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Non-owning** - Records stay with the caller; the borrow checker keeps them alive
//! - **Atomic insertion** - Allocation happens before the tree is touched
//!
//! # Implementation
//!
//! Nodes live in an arena and refer to each other by index. Each node holds up to `C` keys (see
//! [`Config::with_node_capacity`]) with one spare slot for the key displaced when a full node
//! overflows. Lookups compare against each node's minimum and maximum on the way down, then search
//! inside a single node. Heights are maintained AVL-style and restored with single and double
//! rotations.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod comparator;
mod config;
mod cursor;
mod error;
mod raw;

pub mod search;
pub mod ttree;

pub use comparator::{Comparator, NaturalOrder};
pub use config::Config;
pub use cursor::KeyCursor;
pub use error::{Error, Result};
pub use search::{SearchResult, SearchStrategy};
pub use ttree::{Iter, NodeRef, TTree};
