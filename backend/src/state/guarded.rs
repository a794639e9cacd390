use parking_lot::Mutex;

/// A value that is only reachable while its lock is held.
///
/// Callers pass a closure that runs inside the critical section, so a
/// compound update can never be split across two acquisitions. The closure
/// must not block or await; the guard is not `Send` across await points.
pub(crate) struct Guarded<T> {
    inner: Mutex<T>,
}

impl<T> Guarded<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Runs `f` with exclusive access and returns its result.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut g = self.inner.lock();
        f(&mut g)
    }

    /// Runs `f` against a consistent view of the value.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let g = self.inner.lock();
        f(&g)
    }
}

impl<T: Default> Default for Guarded<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
