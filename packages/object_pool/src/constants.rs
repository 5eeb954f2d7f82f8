// A poisoned lock means a panic interrupted a registry mutation. The entry list may no longer
// describe what the pool owns, so we refuse to continue (we panic).
pub(crate) const ERR_POISONED_LOCK: &str = "encountered poisoned lock - continued execution \
    is not safe because the pool can no longer guarantee that every owned value is destroyed once";
