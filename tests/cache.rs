use std::cell::Cell;

use redapp_bridge::cache::{HandleCache, LookupCache};

#[test]
fn enabled_lookup_memoizes() {
    let mut cache: LookupCache<u32> = LookupCache::default();
    let resolutions = Cell::new(0u32);
    let resolve = || {
        resolutions.set(resolutions.get() + 1);
        Some(7)
    };

    assert_eq!(cache.lookup(true, &["java/lang/String"], resolve), Some(7));
    assert_eq!(cache.lookup(true, &["java/lang/String"], resolve), Some(7));
    assert_eq!(resolutions.get(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn disabled_lookup_resolves_every_time() {
    let mut cache: LookupCache<u32> = LookupCache::default();
    let resolutions = Cell::new(0u32);
    let resolve = || {
        resolutions.set(resolutions.get() + 1);
        Some(7)
    };

    assert_eq!(cache.lookup(false, &["java/lang/String"], resolve), Some(7));
    assert_eq!(cache.lookup(false, &["java/lang/String"], resolve), Some(7));
    assert_eq!(resolutions.get(), 2);
    // nothing is stored either
    assert!(cache.is_empty());
}

#[test]
fn failed_resolutions_are_never_stored() {
    let mut cache: LookupCache<u32> = LookupCache::default();
    assert_eq!(cache.lookup(true, &["no/such/Class"], || None), None);
    assert!(cache.is_empty());

    // a later successful resolution for the same key still runs
    assert_eq!(cache.lookup(true, &["no/such/Class"], || Some(9)), Some(9));
    assert_eq!(cache.len(), 1);
}

#[test]
fn member_keys_include_name_and_signature() {
    let mut cache: LookupCache<u32> = LookupCache::default();
    cache.insert(&["C", "get", "()I"], 1);
    cache.insert(&["C", "get", "()J"], 2);
    cache.insert(&["C", "set", "()I"], 3);

    assert_eq!(cache.get(&["C", "get", "()I"]), Some(1));
    assert_eq!(cache.get(&["C", "get", "()J"]), Some(2));
    assert_eq!(cache.get(&["C", "set", "()I"]), Some(3));
    assert_eq!(cache.get(&["D", "get", "()I"]), None);
}

#[test]
fn clear_forces_re_resolution() {
    let mut cache: LookupCache<u32> = LookupCache::default();
    let resolutions = Cell::new(0u32);
    let resolve = || {
        resolutions.set(resolutions.get() + 1);
        Some(7)
    };

    cache.lookup(true, &["k"], resolve);
    cache.clear();
    cache.lookup(true, &["k"], resolve);
    assert_eq!(resolutions.get(), 2);
}

#[test]
fn clear_all_empties_every_table() {
    let mut cache: HandleCache<u32, u32, u32> = HandleCache::with_enabled(true);
    cache.classes.insert(&["C"], 1);
    cache.methods.insert(&["C", "m", "()V"], 2);
    cache.fields.insert(&["C", "f", "I"], 3);

    cache.clear_all();
    assert!(cache.classes.is_empty());
    assert!(cache.methods.is_empty());
    assert!(cache.fields.is_empty());
    // the flag survives a clear
    assert!(cache.enabled);
}
