// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Translating the host's test selection into an engine filter.
//!
//! The host selects tests either by running its own filter over the loaded test cases, or with a
//! where clause in the engine's selection language. Either way the result is a [`TestFilter`]
//! built by the engine's filter service.

use crate::errors::{TestFilterBuilderError, WhereClauseError};
use nunit_adapter_metadata::TestCase;
use nunit_engine_xml::{TestFilter, XmlFilterBuilder};
use std::{fmt, sync::Arc};
use tracing::debug;

/// A service that hands out engine filter builders.
pub trait TestFilterService: fmt::Debug + Send + Sync {
    /// Returns a new, empty filter builder.
    fn filter_builder(&self) -> Box<dyn EngineFilterBuilder>;
}

/// Builds a single engine filter.
pub trait EngineFilterBuilder {
    /// Selects a test by fully qualified name.
    fn add_test(&mut self, fully_qualified_name: &str);

    /// Selects tests with a where clause in the engine's selection language.
    fn select_where(&mut self, where_clause: &str) -> Result<(), WhereClauseError>;

    /// Builds the filter.
    fn build(&self) -> TestFilter;
}

impl EngineFilterBuilder for XmlFilterBuilder {
    fn add_test(&mut self, fully_qualified_name: &str) {
        XmlFilterBuilder::add_test(self, fully_qualified_name);
    }

    fn select_where(&mut self, where_clause: &str) -> Result<(), WhereClauseError> {
        Err(WhereClauseError::new(
            where_clause,
            "where clauses need the engine's filter parser",
        ))
    }

    fn build(&self) -> TestFilter {
        self.to_filter()
    }
}

/// The filter service bundled with this crate. Its builders are [`XmlFilterBuilder`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct XmlFilterService;

impl TestFilterService for XmlFilterService {
    fn filter_builder(&self) -> Box<dyn EngineFilterBuilder> {
        Box::new(XmlFilterBuilder::new())
    }
}

/// A filter the host runs over its loaded test cases.
pub trait HostTestFilter {
    /// Returns the test cases that match, in order.
    fn check_filter<'a>(&self, test_cases: &'a [TestCase]) -> Vec<&'a TestCase>;
}

impl<F> HostTestFilter for F
where
    F: Fn(&TestCase) -> bool,
{
    fn check_filter<'a>(&self, test_cases: &'a [TestCase]) -> Vec<&'a TestCase> {
        test_cases.iter().filter(|&test_case| self(test_case)).collect()
    }
}

/// Builds engine filters from host selections.
#[derive(Clone, Debug)]
pub struct NUnitTestFilterBuilder {
    service: Arc<dyn TestFilterService>,
}

impl NUnitTestFilterBuilder {
    /// Creates a new filter builder.
    ///
    /// Fails if `service` is `None`: that means the engine in use is an incompatible version.
    pub fn new(
        service: Option<Arc<dyn TestFilterService>>,
    ) -> Result<Self, TestFilterBuilderError> {
        let service = service.ok_or(TestFilterBuilderError::ServiceUnavailable)?;
        Ok(Self { service })
    }

    /// Creates a filter builder backed by [`XmlFilterService`].
    pub fn with_xml_service() -> Self {
        Self {
            service: Arc::new(XmlFilterService),
        }
    }

    /// Runs `host_filter` over `loaded` and returns a filter selecting the matches.
    ///
    /// If nothing matches this is [`TestFilter::NO_TESTS_FOUND`], never the empty filter (which
    /// would select every test).
    pub fn convert_host_filter(
        &self,
        host_filter: &dyn HostTestFilter,
        loaded: &[TestCase],
    ) -> TestFilter {
        let matches = host_filter.check_filter(loaded);
        debug!(
            loaded = loaded.len(),
            matched = matches.len(),
            "host filter applied to loaded test cases",
        );

        if matches.is_empty() {
            TestFilter::NO_TESTS_FOUND
        } else {
            self.filter_by_list(matches)
        }
    }

    /// Returns a filter for a where clause. An empty clause gives [`TestFilter::EMPTY`].
    pub fn filter_by_where(&self, where_clause: &str) -> Result<TestFilter, WhereClauseError> {
        if where_clause.is_empty() {
            return Ok(TestFilter::EMPTY);
        }

        let mut builder = self.service.filter_builder();
        builder.select_where(where_clause)?;
        Ok(builder.build())
    }

    /// Returns a filter selecting each of `test_cases` by fully qualified name.
    ///
    /// With no test cases this is whatever the service builds for an empty builder; for
    /// [`XmlFilterService`] that is [`TestFilter::EMPTY`].
    pub fn filter_by_list<'a>(
        &self,
        test_cases: impl IntoIterator<Item = &'a TestCase>,
    ) -> TestFilter {
        let mut builder = self.service.filter_builder();
        for test_case in test_cases {
            builder.add_test(&test_case.fully_qualified_name);
        }
        builder.build()
    }
}
