use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use classref::refcount::{ClassKey, RefCount, KEY_MAX};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_walkthrough() {
    init_logger();

    let reported: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = Arc::clone(&reported);
    let rc = RefCount::builder()
        .with_name("R")
        .with_imbalance_action(move |key: &ClassKey, _count: isize| {
            sink.lock().unwrap().push(key.to_string());
        })
        .build();

    // Resolve "A" and take two references.
    let a = rc.resolve("A");
    a.inc();
    a.inc();
    assert_eq!(a.read(), 2);
    assert_eq!(rc.read(), 2);

    // Resolve "B" and take one reference.
    let b = rc.resolve("B");
    b.inc();
    assert_eq!(b.read(), 1);
    assert_eq!(rc.read(), 3);

    // Drop both references of "A".
    a.dec();
    a.dec();
    assert_eq!(a.read(), 0);
    assert_eq!(rc.read(), 1);

    // The last reference goes through "B".
    assert!(b.dec_and_test());
    assert_eq!(b.read(), 0);
    assert_eq!(rc.read(), 0);

    // A stray decrement on "A" is reported and does not reach the global count.
    a.dec();
    assert_eq!(a.read(), -1);
    assert_eq!(rc.read(), 0);
    assert_eq!(*reported.lock().unwrap(), vec!["A".to_string()]);
    assert_eq!(rc.imbalanced(), vec![ClassKey::new("A")]);

    // Destroy releases both class records.
    assert_eq!(rc.destroy(), 2);
}

#[test]
fn test_attribution_across_keys() {
    init_logger();

    let rc = RefCount::new();
    let plan: [(&str, usize, usize); 4] = [
        ("net", 10, 4),
        ("disk", 3, 3),
        ("ctl", 7, 0),
        ("timer", 1, 1),
    ];

    for (key, incs, decs) in plan {
        let class = rc.resolve(key);
        for _ in 0..incs {
            class.inc();
        }
        for _ in 0..decs {
            class.dec();
        }
    }

    let total: isize = rc.classes().iter().map(|class| class.read()).sum();
    assert_eq!(rc.read(), total);
    assert_eq!(rc.read(), 13);
    assert!(rc.imbalanced().is_empty());
}

#[test]
fn test_identity_with_truncation() {
    let rc = RefCount::new();
    let long_a = format!("{}-alpha", "k".repeat(KEY_MAX));
    let long_b = format!("{}-beta", "k".repeat(KEY_MAX));

    let first = rc.resolve(&long_a);
    let second = rc.resolve(&long_b);
    let exact = rc.resolve(&"k".repeat(KEY_MAX));
    assert!(first.same_class(&second));
    assert!(first.same_class(&exact));
    assert_eq!(rc.len(), 1);
}

#[test]
fn test_zero_signal_only_at_zero() {
    let rc = RefCount::new();
    let a = rc.resolve("A");
    a.add(3);

    assert!(!a.dec_and_test());
    assert!(!a.dec_and_test());
    assert!(a.dec_and_test());
}

#[test]
fn test_containment_never_signals_early() {
    init_logger();

    let hits = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&hits);
    let rc = RefCount::builder()
        .with_imbalance_action(move |_: &ClassKey, _: isize| {
            seen.fetch_add(1, Ordering::Relaxed);
        })
        .build();

    let holder = rc.resolve("holder");
    let buggy = rc.resolve("buggy");
    holder.add(2);

    // However many stray decrements the buggy path issues, the object stays alive.
    for _ in 0..5 {
        assert!(!buggy.dec_and_test());
        assert_eq!(rc.read(), 2);
    }
    assert_eq!(hits.load(Ordering::Relaxed), 5);

    assert!(!holder.dec_and_test());
    assert!(holder.dec_and_test());
}

#[test]
#[should_panic(expected = "global invariant violated")]
fn test_fatal_boundary() {
    let rc = RefCount::new();
    let a = rc.resolve("A");
    let b = rc.resolve("B");
    a.inc();
    // Drain the global count behind A's back.
    b.add(-1);
    a.dec();
}

#[test]
fn test_threads_balanced() {
    use std::thread;

    let rc = RefCount::new();
    thread::scope(|s| {
        for t in 0..8 {
            let rc = &rc;
            s.spawn(move || {
                let class = rc.resolve(if t % 2 == 0 { "even" } else { "odd" });
                for _ in 0..1_000 {
                    class.inc();
                }
                for _ in 0..1_000 {
                    class.dec();
                }
            });
        }
    });

    assert_eq!(rc.read(), 0);
    assert_eq!(rc.len(), 2);
    assert!(rc.classes().iter().all(|class| class.read() == 0));
}
