//! Cache invalidation for structures holding derived connectivity.

/// Anything that caches derived topology (vertex links, element neighbors)
/// implements this.
pub trait InvalidateCache {
    /// Drop *all* cached data so future queries recompute it.
    fn invalidate_cache(&mut self);
}

impl<T: InvalidateCache + ?Sized> InvalidateCache for Box<T> {
    #[inline]
    fn invalidate_cache(&mut self) {
        (**self).invalidate_cache();
    }
}
