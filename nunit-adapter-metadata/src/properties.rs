// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// How the host treats a registered [`TestProperty`].
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
    pub struct TestPropertyAttributes: u8 {
        /// The property is not shown in the host's property grid.
        const HIDDEN = 1 << 0;

        /// The property cannot be changed once set.
        const IMMUTABLE = 1 << 1;

        /// The property's values are surfaced as traits, for grouping and filtering.
        const TRAIT = 1 << 2;
    }
}

/// The type of value a [`TestProperty`] holds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyValueKind {
    /// A boolean.
    Bool,

    /// A single string.
    String,

    /// An array of strings.
    StringArray,
}

impl fmt::Display for PropertyValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::String => write!(f, "string"),
            Self::StringArray => write!(f, "string[]"),
        }
    }
}

/// A property registered with the host test platform.
///
/// Registrations live for the whole process, so they are `static` items rather than values
/// created at runtime. They are immutable and may be read from any thread.
#[derive(Debug, Eq, PartialEq, Hash)]
pub struct TestProperty {
    id: &'static str,
    label: &'static str,
    value_kind: PropertyValueKind,
    attributes: TestPropertyAttributes,
}

impl TestProperty {
    /// Creates a new property registration.
    pub const fn new(
        id: &'static str,
        label: &'static str,
        value_kind: PropertyValueKind,
        attributes: TestPropertyAttributes,
    ) -> Self {
        Self {
            id,
            label,
            value_kind,
            attributes,
        }
    }

    /// The unique id of this property, e.g. `NUnit.TestCategory`.
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// The label the host displays for this property.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// The type of value this property holds.
    pub fn value_kind(&self) -> PropertyValueKind {
        self.value_kind
    }

    /// The attributes this property was registered with.
    pub fn attributes(&self) -> TestPropertyAttributes {
        self.attributes
    }
}

/// The category property used when categories are reported NUnit-style.
pub static NUNIT_TEST_CATEGORY_PROPERTY: TestProperty = TestProperty::new(
    "NUnit.TestCategory",
    "TestCategory",
    PropertyValueKind::StringArray,
    TestPropertyAttributes::HIDDEN.union(TestPropertyAttributes::TRAIT),
);

/// The category property used when categories are reported MSTest-style, so that hosts which only
/// understand MSTest categories can still filter on them.
pub static MSTEST_TEST_CATEGORY_PROPERTY: TestProperty = TestProperty::new(
    "MSTestDiscoverer.TestCategory",
    "TestCategory",
    PropertyValueKind::StringArray,
    TestPropertyAttributes::HIDDEN.union(TestPropertyAttributes::TRAIT),
);

/// Set to true on tests that are actually explicit.
///
/// Several things put a test under the "Explicit" trait grouping; this property tells them apart.
pub static NUNIT_EXPLICIT_PROPERTY: TestProperty = TestProperty::new(
    "NUnit.Explicit",
    "Explicit",
    PropertyValueKind::Bool,
    TestPropertyAttributes::HIDDEN,
);

/// The URI of the NUnit test executor, stored on every test case.
pub const NUNIT_EXECUTOR_URI: &str = "executor://NUnit3TestExecutor";

/// Which property categories are reported under.
///
/// Chosen once per discovery session from the adapter settings.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum VsTestCategoryType {
    /// Report categories under [`NUNIT_TEST_CATEGORY_PROPERTY`].
    #[default]
    #[serde(rename = "nunit")]
    NUnit,

    /// Report categories under [`MSTEST_TEST_CATEGORY_PROPERTY`].
    #[serde(rename = "mstest")]
    MsTest,
}

impl VsTestCategoryType {
    /// Returns the property categories are stored under.
    pub fn category_property(self) -> &'static TestProperty {
        match self {
            Self::NUnit => &NUNIT_TEST_CATEGORY_PROPERTY,
            Self::MsTest => &MSTEST_TEST_CATEGORY_PROPERTY,
        }
    }

    /// Returns the name used in settings files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NUnit => "nunit",
            Self::MsTest => "mstest",
        }
    }
}

impl fmt::Display for VsTestCategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(VsTestCategoryType::NUnit, "NUnit.TestCategory" ; "nunit")]
    #[test_case(VsTestCategoryType::MsTest, "MSTestDiscoverer.TestCategory" ; "mstest")]
    fn category_property_ids(category_type: VsTestCategoryType, id: &str) {
        let property = category_type.category_property();
        assert_eq!(property.id(), id);
        assert_eq!(property.label(), "TestCategory");
        assert_eq!(property.value_kind(), PropertyValueKind::StringArray);
        assert!(property.attributes().contains(TestPropertyAttributes::TRAIT));
    }

    #[test]
    fn category_type_serde_names() {
        assert_eq!(
            serde_json::to_string(&VsTestCategoryType::MsTest).unwrap(),
            "\"mstest\""
        );
        assert_eq!(
            serde_json::from_str::<VsTestCategoryType>("\"nunit\"").unwrap(),
            VsTestCategoryType::NUnit
        );
    }
}
