//! An ownership registry that batches and orders the destruction of heterogeneous values.
//!
//! Values of any `'static` type are handed to a pool as a [`Box`] (or a boxed slice) right after
//! construction. The pool owns them from then on and destroys them all at once, when it is
//! cleared or dropped, in exact reverse registration order. The most recently registered value
//! is destroyed first, so a value may safely point into any value registered before it.
//!
//! This crate provides two pool types:
//!
//! - [`ObjectPool`] is thread-safe. All operations take `&self` and can run concurrently.
//! - [`RawObjectPool`] is the unsynchronized form for single-owner use. Mutations take
//!   `&mut self`.
//!
//! # Key Features
//!
//! - **Type erasure**: values of unrelated types share one pool without a common trait
//! - **Reverse-order teardown**: destruction mirrors construction order, like a stack
//! - **Array support**: boxed slices are registered as one entry and dropped element by element
//! - **Ownership transfer**: [`acquire_data()`][ObjectPool::acquire_data] moves every entry of
//!   one pool into another without destroying or moving any value
//! - **Stable addresses**: registration returns a pointer that stays valid until the value is
//!   destroyed, regardless of transfers
//! - **Drop policies**: optionally forbid implicit destruction when a non-empty pool is dropped
//!
//! The pool is not an allocator (values are allocated by the caller) and not a garbage
//! collector. Ownership of each value is singular: registration consumes the `Box`, so a value
//! can never be registered twice.
//!
//! # Examples
//!
//! ```rust
//! use object_pool::ObjectPool;
//!
//! struct Schema {
//!     columns: Vec<String>,
//! }
//!
//! let pool = ObjectPool::new();
//!
//! let schema = pool.add(Box::new(Schema {
//!     columns: vec!["id".to_string(), "name".to_string()],
//! }));
//! let row_buffer = pool.add_array(vec![0_i64; 1024].into_boxed_slice());
//!
//! // SAFETY: The pool has not been cleared, so both values are alive.
//! let column_count = unsafe { schema.as_ref() }.columns.len();
//! // SAFETY: As above.
//! let buffer_len = unsafe { row_buffer.as_ref() }.len();
//!
//! assert_eq!(column_count, 2);
//! assert_eq!(buffer_len, 1024);
//! assert_eq!(pool.len(), 2);
//!
//! // Destroys the row buffer, then the schema.
//! pool.clear();
//! ```
//!
//! # Observability
//!
//! The pools emit `tracing` events (registration at `trace` level, teardown and transfer at
//! `debug` level) and record `nm` metrics:
//!
//! - `object_pool_entries_registered`
//! - `object_pool_clear_entries`
//! - `object_pool_transfer_entries`

mod builder;
mod constants;
mod drop_policy;
mod dropper;
mod metrics;
mod pool;
mod raw;

pub use builder::*;
pub use drop_policy::*;
pub(crate) use dropper::*;
pub use pool::ObjectPool;
pub use raw::RawObjectPool;
