use std::fmt;
use std::mem;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use tracing::{debug, trace};

use crate::metrics::{CLEAR_ENTRIES, ENTRIES_REGISTERED, TRANSFER_ENTRIES};
use crate::{DropPolicy, Dropper, ObjectPoolBuilder};

/// Global counter for generating unique pool IDs.
static POOL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generates a unique pool ID.
fn generate_pool_id() -> u64 {
    POOL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// An ownership registry that destroys the values it owns in reverse registration order.
///
/// Values are registered by handing over a [`Box`]. The pool returns a pointer to the value,
/// which stays valid until the pool destroys it, either via [`clear()`][Self::clear] or
/// when the pool is dropped. The most recently registered value is destroyed first, so a value
/// may safely point into any value that was registered before it.
///
/// The pool never creates references to the values it owns. The only way to access them is via
/// the returned pointers, using `unsafe` code.
///
/// # Example
///
/// ```rust
/// use object_pool::RawObjectPool;
///
/// let mut pool = RawObjectPool::new();
///
/// let config = pool.add(Box::new("config".to_string()));
/// let buffers = pool.add_array(vec![0_u8; 128].into_boxed_slice());
///
/// // SAFETY: The pool still owns both values.
/// let config_value = unsafe { config.as_ref() };
/// // SAFETY: The pool still owns both values.
/// let buffers_value = unsafe { buffers.as_ref() };
///
/// assert_eq!(config_value, "config");
/// assert_eq!(buffers_value.len(), 128);
/// assert_eq!(pool.len(), 2);
///
/// // Destroys `buffers` first, then `config`.
/// pool.clear();
/// assert!(pool.is_empty());
/// ```
///
/// # Thread safety
///
/// This type is thread-mobile ([`Send`]) but not thread-safe ([`Sync`]). Every mutation takes
/// `&mut self`. For a pool that can be shared between threads, use
/// [`ObjectPool`][crate::ObjectPool] instead.
pub struct RawObjectPool {
    /// Identifies the pool in log output and orders lock acquisition in `ObjectPool`.
    pool_id: u64,

    /// In registration order.
    entries: Vec<Dropper>,

    drop_policy: DropPolicy,
}

impl RawObjectPool {
    /// Creates a new empty pool with default configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use object_pool::RawObjectPool;
    ///
    /// let pool = RawObjectPool::new();
    /// assert!(pool.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build_raw()
    }

    /// Returns a builder for creating a pool with custom configuration.
    pub fn builder() -> ObjectPoolBuilder {
        ObjectPoolBuilder::new()
    }

    pub(crate) fn new_inner(capacity: usize, drop_policy: DropPolicy) -> Self {
        Self {
            pool_id: generate_pool_id(),
            entries: Vec::with_capacity(capacity),
            drop_policy,
        }
    }

    pub(crate) fn pool_id(&self) -> u64 {
        self.pool_id
    }

    /// Takes ownership of a boxed value. The value is destroyed when the pool is cleared or
    /// dropped.
    ///
    /// Returns a pointer to the same allocation. Moving the pool or transferring the entry to
    /// another pool does not move the value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use object_pool::RawObjectPool;
    ///
    /// let mut pool = RawObjectPool::new();
    ///
    /// let value = Box::new(42_u64);
    /// let address = &raw const *value;
    ///
    /// let ptr = pool.add(value);
    /// assert_eq!(ptr.as_ptr().cast_const(), address);
    /// ```
    pub fn add<T>(&mut self, value: Box<T>) -> NonNull<T>
    where
        T: Send + 'static,
    {
        let (dropper, ptr) = Dropper::for_box(value);
        self.push(dropper);
        ptr
    }

    /// Takes ownership of a boxed slice. All elements are destroyed, and the slice storage is
    /// released, when the pool is cleared or dropped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use object_pool::RawObjectPool;
    ///
    /// let mut pool = RawObjectPool::new();
    ///
    /// let names = pool.add_array(vec!["a".to_string(), "b".to_string()].into_boxed_slice());
    ///
    /// // SAFETY: The pool still owns the slice.
    /// assert_eq!(unsafe { names.as_ref() }, ["a", "b"]);
    /// ```
    pub fn add_array<T>(&mut self, values: Box<[T]>) -> NonNull<[T]>
    where
        T: Send + 'static,
    {
        let (dropper, ptr) = Dropper::for_boxed_slice(values);
        self.push(dropper);
        ptr
    }

    /// Registers a value that may be absent.
    ///
    /// An absent value still occupies an entry (it counts towards [`len()`][Self::len]) and its
    /// destruction is a no-op.
    ///
    /// # Example
    ///
    /// ```rust
    /// use object_pool::RawObjectPool;
    ///
    /// let mut pool = RawObjectPool::new();
    ///
    /// assert!(pool.add_nullable::<String>(None).is_none());
    /// assert!(pool.add_nullable(Some(Box::new(1_u8))).is_some());
    /// assert_eq!(pool.len(), 2);
    /// ```
    pub fn add_nullable<T>(&mut self, value: Option<Box<T>>) -> Option<NonNull<T>>
    where
        T: Send + 'static,
    {
        match value {
            Some(value) => Some(self.add(value)),
            None => {
                self.push(Dropper::null());
                None
            }
        }
    }

    /// Moves a value into a new heap allocation owned by the pool.
    ///
    /// This is a shorthand for `add(Box::new(value))`.
    pub fn insert<T>(&mut self, value: T) -> NonNull<T>
    where
        T: Send + 'static,
    {
        self.add(Box::new(value))
    }

    fn push(&mut self, dropper: Dropper) {
        self.entries.push(dropper);

        // The event is already gone if this runs while thread-local storage is being torn down.
        _ = ENTRIES_REGISTERED.try_with(|event| event.observe_once());
        trace!(
            pool_id = self.pool_id,
            entries = self.entries.len(),
            "registered entry"
        );
    }

    /// Destroys every owned value, most recently registered first, leaving the pool empty.
    ///
    /// Calling this on an empty pool does nothing. The pool can be reused afterwards.
    ///
    /// # Panics
    ///
    /// If a destructor panics, the panic is propagated after the pool has already been emptied.
    /// The remaining values of the batch are still dropped during unwinding but their order is
    /// not guaranteed.
    pub fn clear(&mut self) {
        destroy_entries(self.pool_id, self.entries.drain(..));
    }

    /// Detaches all entries without destroying them.
    pub(crate) fn take_entries(&mut self) -> Vec<Dropper> {
        mem::take(&mut self.entries)
    }

    /// Takes ownership of every entry of `other`, appending them after the entries of this pool
    /// while preserving their relative order. Afterwards `other` is empty.
    ///
    /// No value is destroyed and no value moves in memory, so pointers returned when the values
    /// were registered into `other` remain valid. The values are now destroyed when this pool is
    /// cleared or dropped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use object_pool::RawObjectPool;
    ///
    /// let mut parent = RawObjectPool::new();
    /// let mut child = RawObjectPool::new();
    ///
    /// child.insert(1_u32);
    /// child.insert(2_u32);
    ///
    /// parent.acquire_data(&mut child);
    ///
    /// assert_eq!(parent.len(), 2);
    /// assert!(child.is_empty());
    /// ```
    pub fn acquire_data(&mut self, other: &mut Self) {
        let count = other.entries.len();

        if count == 0 {
            return;
        }

        self.entries.append(&mut other.entries);

        _ = TRANSFER_ENTRIES.try_with(|event| event.observe(count));
        debug!(
            pool_id = self.pool_id,
            source_pool_id = other.pool_id,
            entries = count,
            "acquired entries from another pool"
        );
    }

    /// The number of registered entries, including absent values registered via
    /// [`add_nullable()`][Self::add_nullable].
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool owns no entries.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many entries the pool can hold before its entry list has to grow.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Reserves room for at least `additional` more entries.
    #[cfg_attr(test, mutants::skip)] // Only affects capacity, which is not observable in detail.
    pub fn reserve(&mut self, additional: usize) {
        self.entries.reserve(additional);
    }

    /// Releases unused capacity of the entry list.
    #[cfg_attr(test, mutants::skip)] // Only affects capacity, which is not observable in detail.
    pub fn shrink_to_fit(&mut self) {
        self.entries.shrink_to_fit();
    }

    /// The drop policy the pool was created with.
    #[must_use]
    #[inline]
    pub fn drop_policy(&self) -> DropPolicy {
        self.drop_policy
    }
}

/// Drops the entries in reverse order of the iterator.
pub(crate) fn destroy_entries<I>(pool_id: u64, entries: I)
where
    I: DoubleEndedIterator<Item = Dropper> + ExactSizeIterator,
{
    let count = entries.len();

    if count == 0 {
        return;
    }

    // A pool stored in a thread-local may be dropped after the event has been torn down.
    _ = CLEAR_ENTRIES.try_with(|event| event.observe(count));
    debug!(pool_id, entries = count, "destroying entries");

    for dropper in entries.rev() {
        drop(dropper);
    }
}

impl Default for RawObjectPool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RawObjectPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawObjectPool")
            .field("pool_id", &self.pool_id)
            .field("len", &self.entries.len())
            .field("drop_policy", &self.drop_policy)
            .finish_non_exhaustive()
    }
}

impl Drop for RawObjectPool {
    fn drop(&mut self) {
        if self.drop_policy == DropPolicy::MustNotDropItems
            && !self.entries.is_empty()
            && !thread::panicking()
        {
            // The values are leaked, not dropped, so pointers into them stay valid.
            let leaked = self.take_entries();
            let count = leaked.len();
            mem::forget(leaked);

            panic!(
                "dropped object pool {} while it still owned {count} entries, which the drop policy forbids",
                self.pool_id
            );
        }

        self.clear();
    }
}
