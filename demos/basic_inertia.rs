use std::time::Duration;

use inertia_cache::metrics::CounterTarget;
use inertia_cache::InertiaCache;

fn main() {
    let cache: InertiaCache<&str, String, String, _> = InertiaCache::new(
        2,
        Duration::from_secs(60),
        Duration::from_secs(5),
        CounterTarget::new(),
    );

    let first = cache.get("config", || Ok("loaded from upstream".to_string()));
    println!("first lookup: {:?}", first);

    let second = cache.get("config", || Ok("never evaluated".to_string()));
    println!("second lookup: {:?}", second);

    let failed = cache.get("broken", || Err("upstream unavailable".to_string()));
    println!("failed lookup: {:?}", failed);

    // The error is memoized too; this fetch does not run.
    let cached_failure = cache.get("broken", || Ok("recovered".to_string()));
    println!("cached failure: {:?}", cached_failure);

    // Capacity is 2, so a third key evicts the least recently used one.
    let _ = cache.get("third", || Ok("newcomer".to_string()));
    println!("still cached 'config'? {}", cache.contains(&"config"));

    let snap = cache.target().snapshot();
    println!(
        "hits={} successes={} failures={}",
        snap.get_hits, snap.get_successes, snap.get_failures
    );
}

// Expected output:
// first lookup: Ok("loaded from upstream")
// second lookup: Ok("loaded from upstream")
// failed lookup: Err("upstream unavailable")
// cached failure: Err("upstream unavailable")
// still cached 'config'? false
// hits=2 successes=2 failures=1
//
// Explanation: capacity=2; after the lookups for "broken", the entries are
// ["broken", "config"] in recency order. Inserting "third" evicts "config",
// the least recently used key.
