// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Converting the engine's discovery output into host test cases.
//!
//! A [`DiscoverySession`] owns the settings and the [`TraitsCache`] for one discovery session. It
//! is `Sync`, so several assemblies may be discovered against one session from different threads.

use crate::{
    errors::DiscoveryError,
    settings::AdapterSettings,
    traits::{CacheTarget, CachedTestCaseInfo, CategoryList, TraitClassifier, TraitsCache},
};
use camino::Utf8Path;
use nunit_adapter_metadata::{NUNIT_EXECUTOR_URI, TestCase};
use nunit_engine_xml::{TestCaseRef, TestNode};
use std::fs;
use tracing::debug;

/// Turns discovered `test-case` nodes into host test cases.
#[derive(Debug)]
pub struct DiscoverySession {
    settings: AdapterSettings,
    classifier: TraitClassifier,
    cache: TraitsCache,
}

impl DiscoverySession {
    /// Creates a new discovery session with an empty traits cache.
    pub fn new(settings: AdapterSettings) -> Self {
        let classifier = TraitClassifier::from_settings(&settings);
        Self {
            settings,
            classifier,
            cache: TraitsCache::new(classifier),
        }
    }

    /// Returns the settings this session was created with.
    pub fn settings(&self) -> &AdapterSettings {
        &self.settings
    }

    /// Returns the traits cache.
    ///
    /// Test cases are cached under their fully qualified names, and enclosing suites under their
    /// full names. A test's entry holds its own traits and everything it inherits.
    pub fn traits_cache(&self) -> &TraitsCache {
        &self.cache
    }

    /// Consumes the session, returning its traits cache.
    pub fn into_traits_cache(self) -> TraitsCache {
        self.cache
    }

    /// Converts a single `test-case` node into a host test case.
    pub fn convert_test_case(&self, test: &TestCaseRef<'_>) -> TestCase {
        let node = test.node();
        // The assembly suite's full name is the path to the assembly.
        let source = test
            .assembly()
            .or_else(|| test.ancestors().last().copied())
            .map_or("", |source| source.fullname.as_str());

        let mut test_case = TestCase::new(node.fullname.as_str(), NUNIT_EXECUTOR_URI, source);
        test_case.set_display_name(node.name.as_str());

        let mut categories = CategoryList::new(
            &mut test_case,
            self.classifier,
            self.settings.category_type,
        );
        categories.process_test_case_properties(node, self.cache_target(&node.fullname));
        let property_count = categories.last_node_list_count();

        let inherited = if self.settings.inherit_categories {
            self.apply_enclosing_suites(&mut categories, test)
        } else {
            CachedTestCaseInfo::default()
        };
        categories.update_categories_to_vs();

        if self.settings.cache_traits {
            // The test's own entry also holds what it inherits, so it matches the live test case.
            self.cache.merge(&node.fullname, &inherited);
        }

        debug!(
            test = %test_case.fully_qualified_name,
            property_count,
            trait_count = test_case.traits.len(),
            "converted test",
        );
        test_case
    }

    /// Converts every `test-case` node under `root`, in document order.
    pub fn discover(&self, root: &TestNode) -> Vec<TestCase> {
        let tests = root.test_cases();
        debug!(
            root = %root.fullname,
            test_count = tests.len(),
            "converting discovered tests",
        );

        tests
            .iter()
            .map(|test| self.convert_test_case(test))
            .collect()
    }

    /// Reads discovery XML from `path` and converts every `test-case` node in it.
    pub fn discover_path(&self, path: &Utf8Path) -> Result<Vec<TestCase>, DiscoveryError> {
        let xml = fs::read_to_string(path).map_err(|error| DiscoveryError::Read {
            path: path.to_owned(),
            error,
        })?;
        let root = TestNode::parse(&xml).map_err(|error| DiscoveryError::Parse {
            path: path.to_owned(),
            error,
        })?;
        Ok(self.discover(&root))
    }

    /// Applies the enclosing suites of `test`, closest first, and returns what they contributed.
    ///
    /// With caching on, later tests in the same suite reuse the suite's entry instead of scanning
    /// it again. Suites without any traits get an empty entry for the same reason. Threads racing
    /// on a new suite may each scan it, but only the first entry is kept.
    fn apply_enclosing_suites(
        &self,
        categories: &mut CategoryList<'_>,
        test: &TestCaseRef<'_>,
    ) -> CachedTestCaseInfo {
        let mut inherited = CachedTestCaseInfo::default();
        for suite in test.enclosing_suites() {
            if self.settings.cache_traits {
                let info = self.cache.get_or_insert_with(&suite.fullname, || {
                    debug!(suite = %suite.fullname, "scanning suite properties");
                    CachedTestCaseInfo::from_node(self.classifier, suite)
                });
                categories.apply_cached(&info);
                inherited.merge(&info);
            } else {
                categories.process_test_case_properties(suite, None);
            }
        }
        inherited
    }

    fn cache_target<'c>(&'c self, key: &'c str) -> Option<CacheTarget<'c>> {
        self.settings
            .cache_traits
            .then(|| CacheTarget::new(&self.cache, key))
    }
}
