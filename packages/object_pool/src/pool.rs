use std::ptr::{self, NonNull};
use std::sync::{Mutex, MutexGuard};

use crate::constants::ERR_POISONED_LOCK;
use crate::raw::destroy_entries;
use crate::{DropPolicy, ObjectPoolBuilder, RawObjectPool};

/// A thread-safe ownership registry that destroys the values it owns in reverse registration
/// order.
///
/// This is a mutex-guarded wrapper around [`RawObjectPool`]. Every operation takes `&self`, so
/// one pool can be shared (e.g. via [`Arc`][std::sync::Arc]) by all the threads that produce
/// values whose lifetime is bound to a common scope.
///
/// Registered values must be [`Send`] because they are destroyed on whichever thread clears or
/// drops the pool.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
///
/// use object_pool::ObjectPool;
///
/// let pool = Arc::new(ObjectPool::new());
///
/// let workers = (0..4)
///     .map(|worker| {
///         let pool = Arc::clone(&pool);
///         thread::spawn(move || {
///             pool.insert(format!("scratch buffer of worker {worker}"));
///         })
///     })
///     .collect::<Vec<_>>();
///
/// for worker in workers {
///     worker.join().unwrap();
/// }
///
/// assert_eq!(pool.len(), 4);
///
/// pool.clear();
/// assert!(pool.is_empty());
/// ```
///
/// # Nested scopes
///
/// A nested scope can collect its values in a pool of its own and hand them to the enclosing
/// scope with [`acquire_data()`][Self::acquire_data], which extends their lifetime without
/// destroying anything.
///
/// ```rust
/// use object_pool::ObjectPool;
///
/// let query_pool = ObjectPool::new();
/// query_pool.insert("plan".to_string());
///
/// {
///     let fragment_pool = ObjectPool::new();
///     fragment_pool.insert(vec![1_u32, 2, 3]);
///
///     query_pool.acquire_data(&fragment_pool);
///     assert!(fragment_pool.is_empty());
/// }
///
/// // The fragment's vector now lives until the query pool is cleared.
/// assert_eq!(query_pool.len(), 2);
/// ```
#[derive(Debug)]
pub struct ObjectPool {
    /// Same as the ID of the inner pool. Kept outside the mutex so lock order can be decided
    /// before locking anything.
    pool_id: u64,

    inner: Mutex<RawObjectPool>,
}

impl ObjectPool {
    /// Creates a new empty pool with default configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use object_pool::ObjectPool;
    ///
    /// let pool = ObjectPool::new();
    /// assert!(pool.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Returns a builder for creating a pool with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use object_pool::{DropPolicy, ObjectPool};
    ///
    /// let pool = ObjectPool::builder()
    ///     .drop_policy(DropPolicy::MustNotDropItems)
    ///     .build();
    /// ```
    pub fn builder() -> ObjectPoolBuilder {
        ObjectPoolBuilder::new()
    }

    fn lock(&self) -> MutexGuard<'_, RawObjectPool> {
        self.inner.lock().expect(ERR_POISONED_LOCK)
    }

    /// Takes ownership of a boxed value. The value is destroyed when the pool is cleared or
    /// dropped.
    ///
    /// Returns a pointer to the same allocation, valid until the value is destroyed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use object_pool::ObjectPool;
    ///
    /// let pool = ObjectPool::new();
    ///
    /// let ptr = pool.add(Box::new(42_u64));
    ///
    /// // SAFETY: The pool has not been cleared yet.
    /// assert_eq!(unsafe { *ptr.as_ref() }, 42);
    /// ```
    pub fn add<T>(&self, value: Box<T>) -> NonNull<T>
    where
        T: Send + 'static,
    {
        self.lock().add(value)
    }

    /// Takes ownership of a boxed slice. All elements are destroyed, and the slice storage is
    /// released, when the pool is cleared or dropped.
    pub fn add_array<T>(&self, values: Box<[T]>) -> NonNull<[T]>
    where
        T: Send + 'static,
    {
        self.lock().add_array(values)
    }

    /// Registers a value that may be absent. An absent value still counts as an entry and its
    /// destruction is a no-op.
    pub fn add_nullable<T>(&self, value: Option<Box<T>>) -> Option<NonNull<T>>
    where
        T: Send + 'static,
    {
        self.lock().add_nullable(value)
    }

    /// Moves a value into a new heap allocation owned by the pool.
    ///
    /// This is a shorthand for `add(Box::new(value))`. The allocation happens before the lock
    /// is taken.
    pub fn insert<T>(&self, value: T) -> NonNull<T>
    where
        T: Send + 'static,
    {
        self.add(Box::new(value))
    }

    /// Destroys every owned value, most recently registered first, leaving the pool empty.
    ///
    /// The entries are detached under the lock and destroyed after it has been released, so the
    /// destructors may themselves use this pool. Values registered by other threads while the
    /// destructors run are not part of this batch.
    ///
    /// Calling this on an empty pool does nothing.
    ///
    /// # Panics
    ///
    /// If a destructor panics, the panic is propagated. The pool is already empty and remains
    /// usable. The remaining values of the batch are still dropped during unwinding but their
    /// order is not guaranteed.
    pub fn clear(&self) {
        let entries = self.lock().take_entries();

        destroy_entries(self.pool_id, entries.into_iter());
    }

    /// Takes ownership of every entry of `other`, appending them after the entries of this pool
    /// while preserving their relative order. Afterwards `other` is empty.
    ///
    /// No value is destroyed and no value moves in memory. Both pools are locked for the
    /// duration of the transfer, always in the same global order, so concurrent transfers in
    /// opposite directions cannot deadlock. Transferring a pool into itself does nothing.
    pub fn acquire_data(&self, other: &Self) {
        if ptr::eq(self, other) {
            return;
        }

        let (mut target, mut source) = if self.pool_id < other.pool_id {
            let target = self.lock();
            let source = other.lock();
            (target, source)
        } else {
            let source = other.lock();
            let target = self.lock();
            (target, source)
        };

        target.acquire_data(&mut source);
    }

    /// Takes ownership of every entry of an unsynchronized pool, as
    /// [`acquire_data()`][Self::acquire_data] does for another [`ObjectPool`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use object_pool::{ObjectPool, RawObjectPool};
    ///
    /// let shared = ObjectPool::new();
    ///
    /// let mut local = RawObjectPool::new();
    /// local.insert(1_u8);
    /// local.insert(2_u8);
    ///
    /// shared.acquire_raw(&mut local);
    ///
    /// assert_eq!(shared.len(), 2);
    /// assert!(local.is_empty());
    /// ```
    pub fn acquire_raw(&self, other: &mut RawObjectPool) {
        self.lock().acquire_data(other);
    }

    /// The number of registered entries.
    ///
    /// Other threads may change the count at any time, so the result is only a snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the pool owns no entries. Only a snapshot, as with [`len()`][Self::len].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The drop policy the pool was created with.
    #[must_use]
    pub fn drop_policy(&self) -> DropPolicy {
        self.lock().drop_policy()
    }

    /// Unwraps the pool into its unsynchronized form without destroying anything.
    ///
    /// # Example
    ///
    /// ```rust
    /// use object_pool::ObjectPool;
    ///
    /// let pool = ObjectPool::new();
    /// pool.insert(7_i32);
    ///
    /// let raw = pool.into_raw();
    /// assert_eq!(raw.len(), 1);
    /// ```
    #[must_use]
    pub fn into_raw(self) -> RawObjectPool {
        self.inner.into_inner().expect(ERR_POISONED_LOCK)
    }
}

impl From<RawObjectPool> for ObjectPool {
    /// Wraps an existing unsynchronized pool, keeping its entries and configuration.
    fn from(pool: RawObjectPool) -> Self {
        Self {
            pool_id: pool.pool_id(),
            inner: Mutex::new(pool),
        }
    }
}

impl Default for ObjectPool {
    fn default() -> Self {
        Self::new()
    }
}
