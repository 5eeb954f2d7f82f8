//! Metrics for object pool activity.
//!
//! The events are per-thread to avoid contention between threads registering into the same pool.

use nm::{Event, Magnitude};

/// Histogram buckets for the number of entries handled by one `clear()` or transfer.
///
/// Scoped pools usually hold a handful of values but a long query context can collect thousands.
const BATCH_SIZE_BUCKETS: &[Magnitude] = &[0, 1, 2, 5, 10, 50, 100, 500, 1000, 10000];

thread_local! {
    /// Observed once for every value registered into any pool, including null registrations.
    pub(crate) static ENTRIES_REGISTERED: Event = Event::builder()
        .name("object_pool_entries_registered")
        .build();

    /// Observed once per non-empty teardown batch (`clear()` or pool drop).
    ///
    /// The magnitude is the number of entries destroyed.
    pub(crate) static CLEAR_ENTRIES: Event = Event::builder()
        .name("object_pool_clear_entries")
        .histogram(BATCH_SIZE_BUCKETS)
        .build();

    /// Observed once per non-empty ownership transfer between pools.
    ///
    /// The magnitude is the number of entries transferred.
    pub(crate) static TRANSFER_ENTRIES: Event = Event::builder()
        .name("object_pool_transfer_entries")
        .histogram(BATCH_SIZE_BUCKETS)
        .build();
}
