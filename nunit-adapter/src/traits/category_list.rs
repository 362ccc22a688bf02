// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    CATEGORY_LABEL, CachedTestCaseInfo, Classification, EXPLICIT_TRAIT_NAME,
    EXPLICIT_TRAIT_VALUE, TraitClassifier, TraitsCache,
};
use crate::settings::AdapterSettings;
use indexmap::IndexSet;
use nunit_adapter_metadata::{NUNIT_EXPLICIT_PROPERTY, TestCase, VsTestCategoryType};
use nunit_engine_xml::TestNode;
use tracing::debug;

/// Where a [`CategoryList`] is in processing a single test case.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum ProcessingState {
    /// No property records have been scanned yet.
    Unprocessed,

    /// At least one node's property records have been scanned.
    PropertiesScanned,

    /// Categories have been written to the test case.
    CategoriesFlushed,
}

/// A cache entry that classified property records are mirrored into.
#[derive(Copy, Clone, Debug)]
pub struct CacheTarget<'c> {
    /// The cache to record into.
    pub cache: &'c TraitsCache,

    /// The key of the entry to record into.
    pub key: &'c str,
}

impl<'c> CacheTarget<'c> {
    /// Creates a new cache target.
    pub fn new(cache: &'c TraitsCache, key: &'c str) -> Self {
        Self { cache, key }
    }
}

/// Accumulates the categories of one test case while its property records are applied.
///
/// Traits are added to the test case as records are scanned. Categories are collected, and only
/// written to the test case by [`Self::update_categories_to_vs`].
#[derive(Debug)]
pub struct CategoryList<'a> {
    test_case: &'a mut TestCase,
    classifier: TraitClassifier,
    category_type: VsTestCategoryType,
    categories: Vec<String>,
    last_node_list_count: usize,
    state: ProcessingState,
}

impl<'a> CategoryList<'a> {
    /// Creates a new, empty category list for `test_case`.
    pub fn new(
        test_case: &'a mut TestCase,
        classifier: TraitClassifier,
        category_type: VsTestCategoryType,
    ) -> Self {
        Self {
            test_case,
            classifier,
            category_type,
            categories: Vec::new(),
            last_node_list_count: 0,
            state: ProcessingState::Unprocessed,
        }
    }

    /// Creates a new category list configured by `settings`.
    pub fn from_settings(test_case: &'a mut TestCase, settings: &AdapterSettings) -> Self {
        Self::new(
            test_case,
            TraitClassifier::from_settings(settings),
            settings.category_type,
        )
    }

    /// Appends categories obtained elsewhere. Duplicates are kept until the flush.
    pub fn add_range(&mut self, categories: impl IntoIterator<Item = impl Into<String>>) {
        self.categories.extend(categories.into_iter().map(Into::into));
    }

    /// Applies the property records of `node` to the test case, and mirrors them into `cache` if
    /// given.
    ///
    /// Each record is classified once. Generic traits are added to the test case, categories are
    /// accumulated, and explicit markers mark the test case as explicit. A node whose run state is
    /// `Explicit` marks the test case explicit too.
    ///
    /// This may be called for several nodes, such as a test and its enclosing suites. Returns all
    /// categories accumulated so far.
    pub fn process_test_case_properties(
        &mut self,
        node: &TestNode,
        cache: Option<CacheTarget<'_>>,
    ) -> &[String] {
        self.last_node_list_count = node.properties.len();

        for property in &node.properties {
            let classification = self.classifier.classify_property(property);
            if let Some(target) = cache {
                target.cache.record(target.key, classification);
            }

            match classification {
                Classification::Ignore => {}
                Classification::Category(value) => self.categories.push(value.to_owned()),
                Classification::ExplicitTrait => apply_explicit(self.test_case),
                Classification::GenericTrait { name, value } => {
                    self.test_case.add_trait(name, value);
                }
            }
        }

        if node.is_explicit() {
            debug!(
                test = %self.test_case.fully_qualified_name,
                node = %node.fullname,
                "node has run state Explicit",
            );
            apply_explicit(self.test_case);
            if let Some(target) = cache {
                target.cache.record_explicit(target.key);
            }
        }

        if self.state == ProcessingState::Unprocessed {
            self.state = ProcessingState::PropertiesScanned;
        }
        &self.categories
    }

    /// Applies a cached entry in place of scanning the node it was recorded from.
    ///
    /// Cached categories are accumulated, other traits are added to the test case in the cache's
    /// order, and an explicit entry marks the test case explicit.
    pub fn apply_cached(&mut self, info: &CachedTestCaseInfo) {
        self.add_range(info.categories());
        for t in &info.traits {
            if t.name != CATEGORY_LABEL && t.name != EXPLICIT_TRAIT_NAME {
                self.test_case.add_trait(t.name.as_str(), t.value.as_str());
            }
        }
        if info.explicit {
            apply_explicit(self.test_case);
        }

        if self.state == ProcessingState::Unprocessed {
            self.state = ProcessingState::PropertiesScanned;
        }
    }

    /// Returns the number of property records on the node most recently passed to
    /// [`Self::process_test_case_properties`].
    pub fn last_node_list_count(&self) -> usize {
        self.last_node_list_count
    }

    /// Returns the categories accumulated so far, duplicates included.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Returns the processing state.
    pub fn state(&self) -> ProcessingState {
        self.state
    }

    /// Writes the accumulated categories to the test case. See [`flush_categories`].
    ///
    /// Flushing again writes the same set, so it is harmless. Categories accumulated after a flush
    /// are only exposed by flushing again.
    pub fn update_categories_to_vs(&mut self) -> bool {
        self.state = ProcessingState::CategoriesFlushed;
        flush_categories(self.test_case, &self.categories, self.category_type)
    }
}

/// Sets the distinct values of `categories` as the category property selected by
/// `category_type`.
///
/// If `categories` is empty the test case is left untouched, so the property stays unset rather
/// than being set to an empty array. Returns true if the property was set.
pub fn flush_categories(
    test_case: &mut TestCase,
    categories: &[String],
    category_type: VsTestCategoryType,
) -> bool {
    if categories.is_empty() {
        return false;
    }

    let distinct: IndexSet<&String> = categories.iter().collect();
    let values: Vec<String> = distinct.into_iter().cloned().collect();
    test_case.set_property_value(category_type.category_property(), values);
    true
}

/// Marks `test_case` as explicit.
///
/// Adds the `Explicit` UI grouping trait unless a trait with that name is already present, and
/// sets [`NUNIT_EXPLICIT_PROPERTY`]. Several things lead to the same grouping, so the property is
/// what records that the test is actually explicit.
pub fn apply_explicit(test_case: &mut TestCase) {
    if !test_case.has_trait(EXPLICIT_TRAIT_NAME) {
        test_case.add_trait(EXPLICIT_TRAIT_NAME, EXPLICIT_TRAIT_VALUE);
    }
    test_case.set_property_value(&NUNIT_EXPLICIT_PROPERTY, true);
}
