//! Concurrent registration, lookup and first-use compilation

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use stache::{ParseError, PartialError, PartialRegistry, Template};

#[test]
fn test_concurrent_registration_unique_names() {
    let registry = Arc::new(PartialRegistry::new());
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..50 {
                    registry
                        .register_partial(format!("p{}_{}", t, i), "x")
                        .unwrap();
                    assert!(registry.find_partial(&format!("p{}_{}", t, i)).is_some());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(registry.len(), 400);
}

#[test]
fn test_concurrent_duplicate_exactly_one_wins() {
    let registry = Arc::new(PartialRegistry::new());
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.register_partial("shared", format!("from {}", t))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let wins = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(PartialError::Duplicate { .. })))
        .count();

    assert_eq!(wins, 1);
    assert_eq!(duplicates, 7);
}

#[test]
fn test_concurrent_first_use_compiles_once() {
    let counter = Arc::new(AtomicUsize::new(0));
    let compiles = Arc::clone(&counter);
    let registry = Arc::new(PartialRegistry::new().with_compiler(
        move |source: &str| -> Result<Template, Vec<ParseError>> {
            compiles.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(20));
            stache::parse(source)
        },
    ));
    registry.register_partial("slow", "Hello {{name}}").unwrap();

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let partial = registry.find_partial("slow").unwrap();
                barrier.wait();
                partial.template().unwrap()
            })
        })
        .collect();

    let templates: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(templates.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[test]
fn test_lookups_during_remove_all() {
    let registry = Arc::new(PartialRegistry::new());
    registry
        .register_partials((0..100).map(|i| (format!("p{}", i), "x")))
        .unwrap();

    let reader = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for _ in 0..1000 {
                if let Some(partial) = registry.find_partial("p42") {
                    assert_eq!(partial.source(), "x");
                }
            }
        })
    };
    registry.remove_all_partials();
    reader.join().unwrap();

    assert!(registry.is_empty());
}
