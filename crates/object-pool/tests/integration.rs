use object_pool::{Pool, PoolError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn scenario_c_single_slot_reuse_and_close() {
    let pool: Pool<String> = Pool::new(1, 1, || String::from("conn"), |_| true);

    let first = pool.borrow().unwrap();
    let ptr_before = first.as_ptr();
    drop(first);

    let second = pool.borrow().unwrap();
    assert_eq!(second.as_ptr(), ptr_before, "the same backing allocation is reused");
    drop(second);

    pool.close();
    assert!(pool.is_closed());
    assert_eq!(pool.borrow().unwrap_err(), PoolError::Closed);
}

#[test]
fn scenario_d_validator_driven_invalidation_under_load() {
    let generation = Arc::new(AtomicUsize::new(0));
    let bad_generation = Arc::new(AtomicUsize::new(usize::MAX));

    let g = Arc::clone(&generation);
    let factory = move || g.fetch_add(1, Ordering::SeqCst);

    let bad = Arc::clone(&bad_generation);
    let validator = move |id: &usize| *id != bad.load(Ordering::SeqCst);

    let pool: Arc<Pool<usize>> = Arc::new(Pool::new(1, 2, factory, validator));

    // Poison whichever instance is currently idle so the next borrower's
    // release is guaranteed to hit the invalidation path at least once.
    if let Ok(guard) = pool.try_borrow() {
        bad_generation.store(*guard, Ordering::SeqCst);
        drop(guard);
    }

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for _ in 0..500 {
                    let guard = pool.borrow().unwrap();
                    let _ = *guard;
                    drop(guard);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let available = pool.available_count();
    assert!((1..=2).contains(&available), "available_count was {available}");
    assert!(available > 0, "min-warm invariant: at least one instance stays ready");
}

#[test]
fn explicit_release_reports_whether_resource_survived() {
    let pool: Pool<u8> = Pool::new(1, 1, || 0u8, |_| false);
    let guard = pool.borrow().unwrap();
    assert!(!guard.release());
}
