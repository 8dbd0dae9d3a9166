use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crossbeam_queue::ArrayQueue;

use crate::error::PoolError;
use crate::invariants::debug_assert_idle_bounded;
use crate::permits::Permits;

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;
type Validator<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
type ReleaseHook<T> = Box<dyn Fn(T) + Send + Sync>;

struct Inner<T> {
    idle: ArrayQueue<T>,
    permits: Permits,
    factory: Factory<T>,
    validator: Validator<T>,
    release_hook: ReleaseHook<T>,
    min: usize,
    max: usize,
}

/// A bounded pool of reusable resources.
///
/// Borrowed resources come back through [`Guard::release`], or automatically
/// when a [`Guard`] is dropped. A resource that fails validation on its way
/// back is discarded; the pool then tops itself back up to `min` warm
/// instances on a best-effort basis.
pub struct Pool<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Pool<T> {
    /// Creates a pool with `min` pre-warmed resources and room for up to
    /// `max` outstanding at once. Resources that fail `validator` on release
    /// are discarded rather than returned to the idle set.
    pub fn new<F, V>(min: usize, max: usize, factory: F, validator: V) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        V: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::with_release_hook(min, max, factory, validator, |_| {})
    }

    /// Like [`Pool::new`], but runs `release_hook` on every resource that is
    /// discarded, either because it failed validation or because the pool was
    /// closed while the resource was idle.
    pub fn with_release_hook<F, V, R>(
        min: usize,
        max: usize,
        factory: F,
        validator: V,
        release_hook: R,
    ) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        V: Fn(&T) -> bool + Send + Sync + 'static,
        R: Fn(T) + Send + Sync + 'static,
    {
        assert!(max > 0, "pool max must be positive");
        assert!(min <= max, "pool min must not exceed max");

        let idle = ArrayQueue::new(max);
        for _ in 0..min {
            let _ = idle.push(factory());
        }

        Self {
            inner: Arc::new(Inner {
                idle,
                permits: Permits::new(max),
                factory: Box::new(factory),
                validator: Box::new(validator),
                release_hook: Box::new(release_hook),
                min,
                max,
            }),
        }
    }

    /// Borrows a resource, blocking until one is available or the pool is
    /// closed.
    pub fn borrow(&self) -> Result<Guard<T>, PoolError> {
        self.inner.permits.acquire()?;
        self.take_permitted()
    }

    /// Borrows a resource without blocking, failing with
    /// [`PoolError::WouldBlock`] if none is immediately available.
    pub fn try_borrow(&self) -> Result<Guard<T>, PoolError> {
        self.inner.permits.try_acquire()?;
        self.take_permitted()
    }

    /// Runs after a permit has already been acquired: races against `close()`
    /// are resolved here rather than inside [`Permits`], so the permit
    /// bookkeeping stays in one place.
    fn take_permitted(&self) -> Result<Guard<T>, PoolError> {
        if self.inner.permits.is_closed() {
            self.inner.permits.release();
            return Err(PoolError::Closed);
        }
        let resource = self
            .inner
            .idle
            .pop()
            .unwrap_or_else(|| (self.inner.factory)());
        Ok(Guard {
            pool: Arc::clone(&self.inner),
            resource: Some(resource),
        })
    }

    /// Number of resources currently idle and ready to be borrowed.
    pub fn available_count(&self) -> usize {
        self.inner.idle.len()
    }

    /// The minimum warm population this pool maintains on a best-effort
    /// basis.
    pub fn min_capacity(&self) -> usize {
        self.inner.min
    }

    /// The maximum number of resources this pool will ever hand out at once.
    pub fn max_capacity(&self) -> usize {
        self.inner.max
    }

    /// Whether the pool has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.permits.is_closed()
    }

    /// Closes the pool: further `borrow`/`try_borrow` calls fail with
    /// [`PoolError::Closed`], and every currently idle resource is drained
    /// and passed to the release hook. Idempotent.
    pub fn close(&self) {
        self.inner.permits.close();
        while let Some(resource) = self.inner.idle.pop() {
            (self.inner.release_hook)(resource);
        }
    }
}

impl<T> Inner<T> {
    /// Returns a resource that was previously borrowed. Called from
    /// [`Guard::drop`] and [`Guard::release`]; always releases exactly one
    /// permit, on every path, so a panicking validator or factory is the only
    /// way a permit can fail to come back.
    fn return_resource(&self, resource: T) -> bool {
        if self.permits.is_closed() {
            (self.release_hook)(resource);
            self.permits.release();
            return false;
        }

        if (self.validator)(&resource) {
            let pushed = self.idle.push(resource).is_ok();
            debug_assert_idle_bounded!(self.idle.len(), self.max);
            debug_assert!(pushed, "idle queue full despite a released permit");
            self.permits.release();
            pushed
        } else {
            (self.release_hook)(resource);
            if self.idle.len() < self.min {
                let _ = self.idle.push((self.factory)());
            }
            self.permits.release();
            false
        }
    }
}

/// An RAII handle to a resource borrowed from a [`Pool`].
///
/// Dropping the guard returns the resource to its pool automatically. Call
/// [`Guard::release`] instead if the caller wants to know whether the
/// resource was re-pooled or discarded.
pub struct Guard<T> {
    pool: Arc<Inner<T>>,
    resource: Option<T>,
}

impl<T> Guard<T> {
    /// Returns the resource to the pool now, rather than waiting for drop.
    /// Returns `true` if the resource passed validation and went back to the
    /// idle set, `false` if it was discarded.
    pub fn release(mut self) -> bool {
        let resource = self.resource.take().expect("guard already released");
        self.pool.return_resource(resource)
    }
}

impl<T> Deref for Guard<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.resource.as_ref().expect("guard already released")
    }
}

impl<T> DerefMut for Guard<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.resource.as_mut().expect("guard already released")
    }
}

impl<T> Drop for Guard<T> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            self.pool.return_resource(resource);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn single_resource_is_reused() {
        let created = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&created);
        let pool: Pool<usize> = Pool::new(
            1,
            1,
            move || {
                c.fetch_add(1, Ordering::SeqCst);
                0
            },
            |_| true,
        );

        for _ in 0..5 {
            let guard = pool.borrow().unwrap();
            assert_eq!(*guard, 0);
        }
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn try_borrow_fails_when_exhausted() {
        let pool: Pool<u8> = Pool::new(1, 1, || 0u8, |_| true);
        let guard = pool.borrow().unwrap();
        assert_eq!(pool.try_borrow().unwrap_err(), PoolError::WouldBlock);
        drop(guard);
        assert!(pool.try_borrow().is_ok());
    }

    #[test]
    fn failed_validation_discards_and_replenishes() {
        let validations = Arc::new(AtomicUsize::new(0));
        let v = Arc::clone(&validations);
        let pool: Pool<u8> = Pool::new(1, 2, || 0u8, move |_| {
            v.fetch_add(1, Ordering::SeqCst) == 0
        });

        let guard = pool.borrow().unwrap();
        assert!(!guard.release());
        // the resource was discarded, but min-warm replenishment keeps one idle
        assert_eq!(pool.available_count(), 1);
    }

    #[test]
    fn close_drains_idle_and_rejects_new_borrows() {
        let pool: Pool<u8> = Pool::new(2, 2, || 0u8, |_| true);
        pool.close();
        assert_eq!(pool.available_count(), 0);
        assert_eq!(pool.borrow().unwrap_err(), PoolError::Closed);
        assert!(pool.is_closed());
        pool.close(); // idempotent
    }

    #[test]
    fn available_count_never_negative_under_contention() {
        let pool: Arc<Pool<u8>> = Arc::new(Pool::new(1, 4, || 0u8, |_| true));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        let guard = pool.borrow().unwrap();
                        drop(guard);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(pool.available_count() <= pool.max_capacity());
    }
}
