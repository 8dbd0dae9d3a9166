use pubsub_log::PubSub;
use std::sync::Arc;
use std::thread;

#[test]
fn scenario_f_independent_groups_drain_independently() {
    let bus: PubSub<&str, &str> = PubSub::new();
    bus.producer("a").send("a", "1");

    let g1 = bus.consumer("a", "g1");
    let g2 = bus.consumer("a", "g2");

    let batch1 = g1.poll(10);
    let batch2 = g2.poll(10);
    assert_eq!(batch1.len(), 1);
    assert_eq!(batch2.len(), 1);
    assert_eq!(batch1[0].value, "1");

    g1.commit(1);
    g2.commit(1);

    assert!(g1.poll(10).is_empty());
    assert!(g2.poll(10).is_empty());
}

#[test]
fn poll_on_unknown_group_lazily_creates_it_at_zero() {
    let bus: PubSub<&str, u32> = PubSub::new();
    bus.producer("t").send("k", 1);
    bus.producer("t").send("k", 2);

    let consumer = bus.consumer("t", "fresh-group");
    assert_eq!(consumer.offset(), 0);
    assert_eq!(consumer.poll(0).len(), 0);
    assert_eq!(consumer.poll(10).len(), 2);
}

#[test]
fn commit_is_monotonic_and_ignores_regressions() {
    let bus: PubSub<&str, u32> = PubSub::new();
    for i in 0..5 {
        bus.producer("t").send("k", i);
    }
    let consumer = bus.consumer("t", "g");
    consumer.commit(3);
    assert_eq!(consumer.offset(), 3);
    consumer.commit(1); // regression, ignored
    assert_eq!(consumer.offset(), 3);
    consumer.commit(5);
    assert_eq!(consumer.offset(), 5);
}

#[test]
fn groups_never_observe_each_others_offsets_under_contention() {
    let bus: Arc<PubSub<u32, u32>> = Arc::new(PubSub::new());
    for i in 0..2000u32 {
        bus.producer("t").send(i, i);
    }

    let producer_side = Arc::clone(&bus);
    let writer = thread::spawn(move || {
        for i in 2000..4000u32 {
            producer_side.producer("t").send(i, i);
        }
    });

    let committer_side = Arc::clone(&bus);
    let committer = thread::spawn(move || {
        let consumer = committer_side.consumer("t", "fast");
        for n in (0..4000u64).step_by(200) {
            consumer.commit(n);
        }
    });

    writer.join().unwrap();
    committer.join().unwrap();

    // A group never touched by the committer thread must still read 0.
    assert_eq!(bus.group_offset("t", "untouched"), 0);
    assert!(bus.group_offset("t", "fast") <= bus.topic_len("t"));
}
