use std::ptr::{self, NonNull};

/// Owns a boxed value while forgetting its type.
///
/// Drops its target (and releases the target's heap allocation) when it is itself dropped.
/// Moving a `Dropper` around never touches the target.
#[derive(Debug)]
pub(crate) struct Dropper {
    /// The type-erased target and the function that knows its real type.
    ///
    /// `None` if a null handle was registered, in which case dropping is a no-op.
    target: Option<(NonNull<()>, DropFn)>,

    /// Number of elements for the array form. Ignored by the single value form.
    len: usize,
}

type DropFn = unsafe fn(NonNull<()>, usize);

// SAFETY: The constructors only accept `Send` targets and the target is only ever accessed by
// `drop_fn`, which runs on whatever thread drops the `Dropper`.
unsafe impl Send for Dropper {}

impl Dropper {
    /// Takes ownership of a single boxed value.
    ///
    /// Returns the dropper together with a pointer to the value, which stays valid until the
    /// dropper is dropped.
    pub(crate) fn for_box<T>(value: Box<T>) -> (Self, NonNull<T>)
    where
        T: Send + 'static,
    {
        let target = NonNull::from(Box::leak(value));

        let dropper = Self {
            target: Some((target.cast(), drop_box::<T> as DropFn)),
            len: 0,
        };

        (dropper, target)
    }

    /// Takes ownership of a boxed slice. Every element is dropped and the slice storage is
    /// released with the slice layout when the dropper is dropped.
    pub(crate) fn for_boxed_slice<T>(values: Box<[T]>) -> (Self, NonNull<[T]>)
    where
        T: Send + 'static,
    {
        let len = values.len();
        let target = NonNull::from(Box::leak(values));

        let dropper = Self {
            target: Some((target.cast(), drop_boxed_slice::<T> as DropFn)),
            len,
        };

        (dropper, target)
    }

    /// A dropper that owns nothing.
    pub(crate) fn null() -> Self {
        Self {
            target: None,
            len: 0,
        }
    }
}

impl Drop for Dropper {
    fn drop(&mut self) {
        if let Some((ptr, drop_fn)) = self.target.take() {
            // SAFETY: `ptr` and `len` were produced by the constructor that selected `drop_fn`
            // and `take()` guarantees we hand them over at most once.
            unsafe {
                drop_fn(ptr, self.len);
            }
        }
    }
}

/// # Safety
///
/// `ptr` must come from leaking a `Box<T>` and must not be used again afterwards.
unsafe fn drop_box<T>(ptr: NonNull<()>, _len: usize) {
    // SAFETY: Forwarded from the caller.
    drop(unsafe { Box::from_raw(ptr.cast::<T>().as_ptr()) });
}

/// # Safety
///
/// `ptr` must come from leaking a `Box<[T]>` of exactly `len` elements and must not be used
/// again afterwards.
unsafe fn drop_boxed_slice<T>(ptr: NonNull<()>, len: usize) {
    let slice = ptr::slice_from_raw_parts_mut(ptr.cast::<T>().as_ptr(), len);

    // SAFETY: Forwarded from the caller.
    drop(unsafe { Box::from_raw(slice) });
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(Dropper: Send, std::fmt::Debug);
    assert_not_impl_any!(Dropper: Sync, Clone);

    /// Test helper that counts how many times it has been dropped.
    struct DropCounter {
        drops: Arc<AtomicUsize>,
    }

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn dropper_drops_box_target_when_dropped() {
        let drops = Arc::new(AtomicUsize::new(0));

        let (dropper, _ptr) = Dropper::for_box(Box::new(DropCounter {
            drops: Arc::clone(&drops),
        }));

        assert_eq!(drops.load(Ordering::Relaxed), 0);

        drop(dropper);

        assert_eq!(drops.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn dropper_returns_pointer_to_boxed_value() {
        let (dropper, ptr) = Dropper::for_box(Box::new(String::from("hello")));

        // SAFETY: The dropper is still alive, so the value is too.
        let value = unsafe { ptr.as_ref() };
        assert_eq!(value, "hello");

        drop(dropper);
    }

    #[test]
    fn dropper_drops_every_slice_element() {
        let drops = Arc::new(AtomicUsize::new(0));

        let values = (0..5)
            .map(|_| DropCounter {
                drops: Arc::clone(&drops),
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        let (dropper, ptr) = Dropper::for_boxed_slice(values);

        // SAFETY: The dropper is still alive, so the slice is too.
        assert_eq!(unsafe { ptr.as_ref() }.len(), 5);
        assert_eq!(drops.load(Ordering::Relaxed), 0);

        drop(dropper);

        assert_eq!(drops.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn dropper_handles_empty_slice() {
        let (dropper, ptr) = Dropper::for_boxed_slice(Vec::<String>::new().into_boxed_slice());

        // SAFETY: The dropper is still alive, so the slice is too.
        assert!(unsafe { ptr.as_ref() }.is_empty());

        drop(dropper);
    }

    #[test]
    fn dropper_handles_zero_sized_types() {
        let drops = Arc::new(AtomicUsize::new(0));

        let (dropper, _ptr) = Dropper::for_box(Box::new((
            (),
            DropCounter {
                drops: Arc::clone(&drops),
            },
        )));

        drop(dropper);
        assert_eq!(drops.load(Ordering::Relaxed), 1);

        let (dropper, _ptr) = Dropper::for_box(Box::new(()));
        drop(dropper);
    }

    #[test]
    fn null_dropper_drops_nothing() {
        let dropper = Dropper::null();
        assert!(dropper.target.is_none());

        drop(dropper);
    }

    #[test]
    fn owning_droppers_have_target() {
        let (single, _ptr) = Dropper::for_box(Box::new(1_u32));
        assert!(single.target.is_some());

        let (array, _ptr) = Dropper::for_boxed_slice(vec![1_u32, 2].into_boxed_slice());
        assert!(array.target.is_some());
        assert_eq!(array.len, 2);
    }

    #[test]
    fn dropper_works_with_complex_types() {
        struct ComplexType {
            _data: Vec<String>,
            _nested: Vec<i32>,
            log: Arc<Mutex<Vec<&'static str>>>,
        }

        impl Drop for ComplexType {
            fn drop(&mut self) {
                self.log.lock().unwrap().push("complex");
            }
        }

        let log = Arc::new(Mutex::new(Vec::new()));

        let (dropper, _ptr) = Dropper::for_box(Box::new(ComplexType {
            _data: vec!["hello".to_string(), "world".to_string()],
            _nested: vec![1, 2, 3, 4, 5],
            log: Arc::clone(&log),
        }));

        assert!(log.lock().unwrap().is_empty());
        drop(dropper);
        assert_eq!(*log.lock().unwrap(), vec!["complex"]);
    }

    #[test]
    fn moving_dropper_does_not_drop_target() {
        let drops = Arc::new(AtomicUsize::new(0));

        let (dropper, _ptr) = Dropper::for_box(Box::new(DropCounter {
            drops: Arc::clone(&drops),
        }));

        let mut holder = Vec::new();
        holder.push(dropper);
        let moved = holder.pop().unwrap();

        assert_eq!(drops.load(Ordering::Relaxed), 0);
        drop(moved);
        assert_eq!(drops.load(Ordering::Relaxed), 1);
    }
}
