/// Determines what happens to remaining entries when a pool is dropped.
///
/// By default, the pool destroys its entries when it is dropped, exactly as if
/// [`clear()`][crate::ObjectPool::clear] had been called.
///
/// # Examples
///
/// ```
/// use object_pool::{DropPolicy, ObjectPool};
///
/// // The drop policy is set at pool creation time.
/// let pool = ObjectPool::builder()
///     .drop_policy(DropPolicy::MustNotDropItems)
///     .build();
///
/// pool.insert(42_u32);
///
/// // The owner is expected to clear the pool at a known point.
/// pool.clear();
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum DropPolicy {
    /// The pool destroys its entries in reverse registration order when it is dropped.
    /// This is the default.
    #[default]
    MayDropItems,

    /// The pool will panic if it still owns entries when it is dropped.
    ///
    /// The remaining values are leaked rather than destroyed, so any pointers into them stay
    /// valid. They are still destroyed normally if the pool is dropped while the thread is
    /// already panicking.
    ///
    /// This may be valuable if the owned values must be destroyed at a well-defined point
    /// in the owner's lifecycle, e.g. before some resource they reference is torn down.
    /// Explicitly calling `clear()` is always permitted.
    MustNotDropItems,
}
