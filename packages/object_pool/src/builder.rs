use std::cell::Cell;
use std::marker::PhantomData;

use crate::{DropPolicy, ObjectPool, RawObjectPool};

/// Builder for creating an instance of [`ObjectPool`] or [`RawObjectPool`].
///
/// All settings are optional.
///
/// # Examples
///
/// ```
/// use object_pool::{DropPolicy, ObjectPool};
///
/// let pool = ObjectPool::builder()
///     .capacity(64)
///     .drop_policy(DropPolicy::MustNotDropItems)
///     .build();
///
/// assert!(pool.is_empty());
/// ```
///
/// # Thread safety
///
/// The builder is thread-mobile ([`Send`]) and can be safely transferred between threads,
/// allowing pool configuration to happen on different threads than where the pool is used.
/// However, it is not thread-safe ([`Sync`]) as it contains mutable configuration state.
#[derive(Debug)]
#[must_use]
pub struct ObjectPoolBuilder {
    capacity: usize,
    drop_policy: DropPolicy,

    // Prevents Sync while allowing Send - builders are thread-mobile but not thread-safe
    _not_sync: PhantomData<Cell<()>>,
}

impl ObjectPoolBuilder {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            capacity: 0,
            drop_policy: DropPolicy::default(),
            _not_sync: PhantomData,
        }
    }

    /// Sets how many entries the pool can hold before it needs to grow its entry list.
    ///
    /// This only affects the bookkeeping storage of the pool. The values themselves are
    /// always allocated by the caller.
    ///
    /// # Examples
    ///
    /// ```
    /// use object_pool::RawObjectPool;
    ///
    /// let pool = RawObjectPool::builder().capacity(16).build_raw();
    ///
    /// assert!(pool.capacity() >= 16);
    /// ```
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the [drop policy][DropPolicy] for the pool. This governs how
    /// to treat remaining entries when the pool is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use object_pool::{DropPolicy, ObjectPool};
    ///
    /// let pool = ObjectPool::builder()
    ///     .drop_policy(DropPolicy::MustNotDropItems)
    ///     .build();
    /// ```
    #[inline]
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.drop_policy = policy;
        self
    }

    /// Builds a thread-safe [`ObjectPool`] with the specified configuration.
    #[must_use]
    #[inline]
    pub fn build(self) -> ObjectPool {
        ObjectPool::from(self.build_raw())
    }

    /// Builds an unsynchronized [`RawObjectPool`] with the specified configuration.
    #[must_use]
    #[inline]
    pub fn build_raw(self) -> RawObjectPool {
        RawObjectPool::new_inner(self.capacity, self.drop_policy)
    }
}
