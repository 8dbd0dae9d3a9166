use lru_cache::Cache;
use std::sync::Arc;
use std::thread;

#[test]
fn size_never_exceeds_capacity_under_contention() {
    let cache: Arc<Cache<u64, u64>> = Arc::new(Cache::new(16));
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..2000u64 {
                    let key = t * 10_000 + i;
                    cache.put(key, key);
                    let _ = cache.get(&key, || Ok::<_, ()>(None));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert!(cache.size() <= cache.capacity());
}

#[test]
fn repeated_gets_on_same_key_keep_it_resident() {
    let cache: Arc<Cache<u32, u32>> = Arc::new(Cache::new(4));
    for i in 0..4 {
        cache.put(i, i);
    }

    let hot_key_cache = Arc::clone(&cache);
    let hammer = thread::spawn(move || {
        for _ in 0..5000 {
            let _ = hot_key_cache.get(&0, || Ok::<_, ()>(None));
        }
    });
    let filler_cache = Arc::clone(&cache);
    let filler = thread::spawn(move || {
        for i in 100..5100u32 {
            filler_cache.put(i, i);
        }
    });

    hammer.join().unwrap();
    filler.join().unwrap();

    assert!(cache.contains_key(&0), "hot key should have survived the churn");
    assert!(cache.size() <= cache.capacity());
}

#[test]
fn compute_function_runs_at_most_once_per_miss() {
    let cache: Cache<&str, u32> = Cache::new(2);
    let calls = std::sync::atomic::AtomicUsize::new(0);

    let first = cache.get(&"k", || {
        calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok::<_, ()>(Some(7))
    });
    let second = cache.get(&"k", || {
        calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok::<_, ()>(Some(99))
    });

    assert_eq!(first.unwrap(), Some(7));
    assert_eq!(second.unwrap(), Some(7));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}
