// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine filter XML.

use quick_xml::escape::escape;
use std::{borrow::Cow, fmt};

static FILTER_TAG: &str = "filter";
static OR_TAG: &str = "or";
static TEST_TAG: &str = "test";

/// A test filter, in the XML form the NUnit engine accepts.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TestFilter {
    xml: Cow<'static, str>,
}

impl TestFilter {
    /// The filter that selects every test.
    pub const EMPTY: TestFilter = TestFilter {
        xml: Cow::Borrowed("<filter/>"),
    };

    /// The filter used when a host-side filter matched nothing. The engine runs no tests for it.
    pub const NO_TESTS_FOUND: TestFilter = TestFilter {
        xml: Cow::Borrowed("<notestsfound/>"),
    };

    /// Creates a filter from its XML text. The text is not validated.
    pub fn new(xml: impl Into<String>) -> Self {
        Self {
            xml: Cow::Owned(xml.into()),
        }
    }

    /// Returns true if this filter selects every test.
    pub fn is_empty(&self) -> bool {
        self.xml == Self::EMPTY.xml
    }

    /// Returns the XML text of this filter.
    pub fn as_str(&self) -> &str {
        &self.xml
    }

    /// Converts this filter into its XML text.
    pub fn into_string(self) -> String {
        self.xml.into_owned()
    }
}

impl fmt::Display for TestFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.xml)
    }
}

/// Builds a [`TestFilter`] that selects tests by their fully qualified names.
///
/// A single test is written as `<filter><test>name</test></filter>`; several tests are wrapped in
/// an `<or>` element. Names are XML-escaped.
#[derive(Clone, Debug, Default)]
pub struct XmlFilterBuilder {
    tests: Vec<String>,
}

impl XmlFilterBuilder {
    /// Creates a new, empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a test by fully qualified name.
    pub fn add_test(&mut self, fully_qualified_name: impl Into<String>) -> &mut Self {
        self.tests.push(fully_qualified_name.into());
        self
    }

    /// Adds several tests by fully qualified name.
    pub fn add_tests(
        &mut self,
        fully_qualified_names: impl IntoIterator<Item = impl Into<String>>,
    ) -> &mut Self {
        for name in fully_qualified_names {
            self.add_test(name);
        }
        self
    }

    /// Returns the number of tests added so far.
    pub fn test_count(&self) -> usize {
        self.tests.len()
    }

    /// Builds the filter. With no tests added, this is [`TestFilter::EMPTY`].
    pub fn to_filter(&self) -> TestFilter {
        if self.tests.is_empty() {
            return TestFilter::EMPTY;
        }

        let mut xml = String::new();
        push_start_tag(&mut xml, FILTER_TAG);
        let wrap = self.tests.len() > 1;
        if wrap {
            push_start_tag(&mut xml, OR_TAG);
        }
        for test in &self.tests {
            push_start_tag(&mut xml, TEST_TAG);
            xml.push_str(&escape(test));
            push_end_tag(&mut xml, TEST_TAG);
        }
        if wrap {
            push_end_tag(&mut xml, OR_TAG);
        }
        push_end_tag(&mut xml, FILTER_TAG);

        TestFilter::new(xml)
    }
}

fn push_start_tag(xml: &mut String, tag: &str) {
    xml.push('<');
    xml.push_str(tag);
    xml.push('>');
}

fn push_end_tag(xml: &mut String, tag: &str) {
    xml.push_str("</");
    xml.push_str(tag);
    xml.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&[], "<filter/>" ; "no tests")]
    #[test_case(&["Ns.A"], "<filter><test>Ns.A</test></filter>" ; "one test")]
    #[test_case(
        &["Ns.A", "Ns.B"],
        "<filter><or><test>Ns.A</test><test>Ns.B</test></or></filter>"
        ; "several tests"
    )]
    #[test_case(
        &["Ns.A(\"<x>\",1)"],
        "<filter><test>Ns.A(&quot;&lt;x&gt;&quot;,1)</test></filter>"
        ; "escaped"
    )]
    fn filter_xml(tests: &[&str], expected: &str) {
        let mut builder = XmlFilterBuilder::new();
        builder.add_tests(tests.iter().copied());
        assert_eq!(builder.test_count(), tests.len());
        assert_eq!(builder.to_filter().as_str(), expected);
    }

    #[test]
    fn empty_filter() {
        assert!(TestFilter::EMPTY.is_empty());
        assert!(TestFilter::new("<filter/>").is_empty());
        assert!(!TestFilter::NO_TESTS_FOUND.is_empty());
        assert_eq!(TestFilter::NO_TESTS_FOUND.to_string(), "<notestsfound/>");
    }
}
