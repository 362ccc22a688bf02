// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{CATEGORY_LABEL, Classification, TraitClassifier};
use nunit_adapter_metadata::Trait;
use nunit_engine_xml::TestNode;
use serde::Serialize;
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::{Mutex, MutexGuard, PoisonError},
};

/// Traits recorded for one test across discovery passes.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CachedTestCaseInfo {
    /// The recorded traits. Recording an equal trait twice keeps a single copy.
    pub traits: BTreeSet<Trait>,

    /// Whether the test is explicit. Once set, never reset.
    pub explicit: bool,
}

impl CachedTestCaseInfo {
    /// Iterates over the recorded categories, in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = &str> + '_ {
        self.traits
            .iter()
            .filter(|t| t.name == CATEGORY_LABEL)
            .map(|t| t.value.as_str())
    }

    /// Classifies the property records and run state of `node` into a new entry.
    pub fn from_node(classifier: TraitClassifier, node: &TestNode) -> Self {
        let mut info = Self::default();
        for property in &node.properties {
            info.insert(classifier.classify_property(property));
        }
        if node.is_explicit() {
            info.insert(Classification::ExplicitTrait);
        }
        info
    }

    /// Adds the traits of `other` to this entry. The explicit flag is sticky.
    pub fn merge(&mut self, other: &Self) {
        self.traits.extend(other.traits.iter().cloned());
        self.explicit |= other.explicit;
    }

    fn insert(&mut self, classification: Classification<'_>) {
        let Some(t) = classification.to_trait() else {
            return;
        };
        if classification == Classification::ExplicitTrait {
            self.explicit = true;
        }
        self.traits.insert(t);
    }
}

/// Per-session cache of classified traits, keyed by test identity.
///
/// Entries are created lazily on first write and live as long as the cache. The cache is `Sync`:
/// several discovery workers may record into it at once, each under its own keys.
#[derive(Debug, Default)]
pub struct TraitsCache {
    classifier: TraitClassifier,
    entries: Mutex<HashMap<String, CachedTestCaseInfo>>,
}

impl TraitsCache {
    /// Creates a new, empty cache that classifies records with `classifier`.
    pub fn new(classifier: TraitClassifier) -> Self {
        Self {
            classifier,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Classifies a property record and records the result under `key`.
    ///
    /// Ignored records leave the cache untouched: no entry is created for them.
    pub fn record_trait(&self, key: &str, name: &str, value: &str) {
        self.record(key, self.classifier.classify(name, value));
    }

    /// Records an already-classified property record under `key`.
    ///
    /// An explicit marker is recorded as by [`Self::record_explicit`].
    pub fn record(&self, key: &str, classification: Classification<'_>) {
        if classification == Classification::Ignore {
            return;
        }
        entry_mut(&mut self.lock(), key).insert(classification);
    }

    /// Marks the test under `key` as explicit, and records the explicit trait for it.
    pub fn record_explicit(&self, key: &str) {
        self.record(key, Classification::ExplicitTrait);
    }

    /// Returns a copy of the entry for `key`, creating an empty entry if there is none.
    pub fn get_or_create(&self, key: &str) -> CachedTestCaseInfo {
        let mut entries = self.lock();
        entry_mut(&mut entries, key).clone()
    }

    /// Returns a copy of the entry for `key`, inserting the result of `scan` if there is none.
    ///
    /// `scan` runs without the lock held. If two callers race on the same key, the first entry
    /// inserted wins, so every caller sees a complete entry.
    pub fn get_or_insert_with(
        &self,
        key: &str,
        scan: impl FnOnce() -> CachedTestCaseInfo,
    ) -> CachedTestCaseInfo {
        if let Some(info) = self.get(key) {
            return info;
        }
        let info = scan();
        self.lock().entry(key.to_owned()).or_insert(info).clone()
    }

    /// Adds the traits of `info` to the entry for `key`, creating it if needed.
    pub fn merge(&self, key: &str, info: &CachedTestCaseInfo) {
        entry_mut(&mut self.lock(), key).merge(info);
    }

    /// Returns a copy of the entry for `key`, if there is one.
    pub fn get(&self, key: &str) -> Option<CachedTestCaseInfo> {
        self.lock().get(key).cloned()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns a copy of every entry, sorted by key.
    pub fn snapshot(&self) -> BTreeMap<String, CachedTestCaseInfo> {
        self.lock()
            .iter()
            .map(|(key, info)| (key.clone(), info.clone()))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CachedTestCaseInfo>> {
        // Writers only insert or extend sets, so a panicking writer can't leave an entry half-done.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn entry_mut<'a>(
    entries: &'a mut HashMap<String, CachedTestCaseInfo>,
    key: &str,
) -> &'a mut CachedTestCaseInfo {
    // Avoid allocating the key on the common path where the entry already exists.
    if !entries.contains_key(key) {
        entries.insert(key.to_owned(), CachedTestCaseInfo::default());
    }
    entries
        .get_mut(key)
        .expect("entry was inserted above if missing")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::EXPLICIT_TRAIT_NAME;
    use maplit::btreeset;
    use nunit_engine_xml::RunState;
    use pretty_assertions::assert_eq;

    #[test]
    fn ignored_records_create_no_entry() {
        let cache = TraitsCache::new(TraitClassifier::new(false));
        cache.record_trait("Ns.A", "_PID", "4242");
        cache.record_trait("Ns.A", "Timeout", "500");
        cache.record_trait("Ns.A", "Owner", "");
        assert!(cache.is_empty());
        assert_eq!(cache.get("Ns.A"), None);
    }

    #[test]
    fn get_or_create_creates_empty_entry() {
        let cache = TraitsCache::default();
        assert_eq!(cache.get_or_create("Ns.A"), CachedTestCaseInfo::default());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn records_traits_and_categories() {
        let cache = TraitsCache::new(TraitClassifier::new(false));
        cache.record_trait("Ns.A", "Category", "Smoke");
        cache.record_trait("Ns.A", "Owner", "ada");
        cache.record_trait("Ns.B", "Category", "Slow");

        let a = cache.get("Ns.A").expect("entry exists");
        assert_eq!(
            a.traits,
            btreeset! { Trait::new("Category", "Smoke"), Trait::new("Owner", "ada") }
        );
        assert!(!a.explicit);
        assert_eq!(a.categories().collect::<Vec<_>>(), ["Smoke"]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn repeated_passes_keep_one_category() {
        let cache = TraitsCache::new(TraitClassifier::new(false));
        for _pass in 0..2 {
            cache.record_trait("Ns.A", "Category", "Smoke");
            cache.record_trait("Ns.A", "Owner", "ada");
        }

        let a = cache.get("Ns.A").unwrap();
        assert_eq!(a.categories().collect::<Vec<_>>(), ["Smoke"]);
        assert_eq!(a.traits.len(), 2, "generic traits are deduplicated too");
    }

    #[test]
    fn explicit_is_sticky() {
        let cache = TraitsCache::new(TraitClassifier::new(false));
        cache.record_explicit("Ns.A");
        cache.record_explicit("Ns.A");
        cache.record_trait("Ns.A", "Category", "Smoke");

        let a = cache.get("Ns.A").unwrap();
        assert!(a.explicit);
        assert_eq!(
            a.traits,
            btreeset! { Trait::new("Category", "Smoke"), Trait::new(EXPLICIT_TRAIT_NAME, "") }
        );
    }

    #[test]
    fn explicit_property_record_marks_explicit() {
        let cache = TraitsCache::new(TraitClassifier::new(false));
        cache.record_trait("Ns.A", "Explicit", "because");

        let a = cache.get("Ns.A").unwrap();
        assert!(a.explicit);
        assert_eq!(a.traits, btreeset! { Trait::new(EXPLICIT_TRAIT_NAME, "") });
    }

    #[test]
    fn from_node_matches_recording() {
        let classifier = TraitClassifier::new(false);
        let mut node = TestNode::test_suite("TestFixture", "Fixture", "Ns.Fixture");
        node.add_properties([
            ("Category", "Slow"),
            ("Owner", "ada"),
            ("Author", "grace"),
            ("Category", "Slow"),
        ]);
        node.set_runstate(RunState::Explicit);

        let cache = TraitsCache::new(classifier);
        for property in &node.properties {
            cache.record_trait("Ns.Fixture", &property.name, &property.value);
        }
        cache.record_explicit("Ns.Fixture");

        let info = CachedTestCaseInfo::from_node(classifier, &node);
        assert_eq!(Some(&info), cache.get("Ns.Fixture").as_ref());
        assert_eq!(
            info.traits,
            btreeset! {
                Trait::new("Category", "Slow"),
                Trait::new(EXPLICIT_TRAIT_NAME, ""),
                Trait::new("Owner", "ada"),
            }
        );
    }

    #[test]
    fn get_or_insert_with_prefers_existing_entry() {
        let cache = TraitsCache::new(TraitClassifier::new(false));
        cache.record_trait("Ns.Fixture", "Category", "Cached");

        let info = cache.get_or_insert_with("Ns.Fixture", || panic!("entry exists, no scan needed"));
        assert_eq!(info.categories().collect::<Vec<_>>(), ["Cached"]);

        let empty = cache.get_or_insert_with("Ns.Other", CachedTestCaseInfo::default);
        assert_eq!(empty, CachedTestCaseInfo::default());
        assert_eq!(cache.get("Ns.Other"), Some(empty), "empty scans are cached too");
    }

    #[test]
    fn merge_unions_traits() {
        let cache = TraitsCache::new(TraitClassifier::new(false));
        cache.record_trait("Ns.A", "Category", "Smoke");

        let inherited = CachedTestCaseInfo {
            traits: btreeset! {
                Trait::new("Category", "Smoke"),
                Trait::new("Category", "Slow"),
                Trait::new(EXPLICIT_TRAIT_NAME, ""),
            },
            explicit: true,
        };
        cache.merge("Ns.A", &inherited);
        cache.merge("Ns.A", &CachedTestCaseInfo::default());

        let a = cache.get("Ns.A").unwrap();
        assert!(a.explicit);
        assert_eq!(a.categories().collect::<Vec<_>>(), ["Slow", "Smoke"]);
        assert_eq!(a.traits.len(), 3);
    }

    #[test]
    fn concurrent_writers() {
        let cache = TraitsCache::new(TraitClassifier::new(false));
        std::thread::scope(|s| {
            for worker in 0..4 {
                let cache = &cache;
                s.spawn(move || {
                    for test in 0..50 {
                        let key = format!("Worker{worker}.Test{test}");
                        cache.record_trait(&key, "Category", "Smoke");
                        cache.record_trait(&key, "Category", "Smoke");
                        if test % 2 == 0 {
                            cache.record_explicit(&key);
                        }
                    }
                });
            }
        });

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.len(), 200);
        assert_eq!(
            snapshot.values().filter(|info| info.explicit).count(),
            100
        );
        assert!(
            snapshot
                .values()
                .all(|info| info.categories().collect::<Vec<_>>() == ["Smoke"])
        );
    }
}
