// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{PropertyValueKind, TestProperty};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A name/value annotation on a test case.
///
/// The host groups tests by trait in its UI. Several traits with the same name may be present on
/// one test case.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Trait {
    /// The name of the trait.
    pub name: String,

    /// The value of the trait. May be empty.
    pub value: String,
}

impl Trait {
    /// Creates a new trait.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The value of a [`TestProperty`] on a test case.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum PropertyValue {
    /// A boolean.
    Bool(bool),

    /// A single string.
    String(String),

    /// An array of strings.
    StringArray(Vec<String>),
}

impl PropertyValue {
    /// Returns the kind of this value.
    pub fn kind(&self) -> PropertyValueKind {
        match self {
            Self::Bool(_) => PropertyValueKind::Bool,
            Self::String(_) => PropertyValueKind::String,
            Self::StringArray(_) => PropertyValueKind::StringArray,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        Self::StringArray(value)
    }
}

/// A test case, as the host test platform sees it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestCase {
    /// The fully qualified name of the test. Unique within a source.
    pub fully_qualified_name: String,

    /// The name shown in the host's UI.
    pub display_name: String,

    /// The URI of the executor that runs this test.
    pub executor_uri: String,

    /// The source (typically an assembly path) the test was discovered in.
    pub source: String,

    /// Traits, in the order they were added.
    pub traits: Vec<Trait>,

    /// Values of registered properties, keyed by property id.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    properties: IndexMap<String, PropertyValue>,
}

impl TestCase {
    /// Creates a new test case. The display name defaults to the fully qualified name.
    pub fn new(
        fully_qualified_name: impl Into<String>,
        executor_uri: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        let fully_qualified_name = fully_qualified_name.into();
        Self {
            display_name: fully_qualified_name.clone(),
            fully_qualified_name,
            executor_uri: executor_uri.into(),
            source: source.into(),
            traits: vec![],
            properties: IndexMap::new(),
        }
    }

    /// Sets the display name.
    pub fn set_display_name(&mut self, display_name: impl Into<String>) -> &mut Self {
        self.display_name = display_name.into();
        self
    }

    /// Adds a trait. Traits with the same name and value are not merged.
    pub fn add_trait(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.traits.push(Trait::new(name, value));
        self
    }

    /// Returns true if a trait with the given name is present.
    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.iter().any(|t| t.name == name)
    }

    /// Sets the value of a registered property, replacing any previous value.
    ///
    /// # Panics
    ///
    /// Panics if the value's kind doesn't match the kind the property was registered with.
    pub fn set_property_value(
        &mut self,
        property: &TestProperty,
        value: impl Into<PropertyValue>,
    ) -> &mut Self {
        let value = value.into();
        assert_eq!(
            property.value_kind(),
            value.kind(),
            "property {} holds {} values",
            property.id(),
            property.value_kind(),
        );
        self.properties.insert(property.id().to_owned(), value);
        self
    }

    /// Returns the value of a registered property, if set.
    pub fn property_value(&self, property: &TestProperty) -> Option<&PropertyValue> {
        self.properties.get(property.id())
    }

    /// Returns the value of a boolean property, if set.
    pub fn bool_property(&self, property: &TestProperty) -> Option<bool> {
        match self.property_value(property)? {
            PropertyValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value of a string array property, if set.
    pub fn string_array_property(&self, property: &TestProperty) -> Option<&[String]> {
        match self.property_value(property)? {
            PropertyValue::StringArray(values) => Some(values),
            _ => None,
        }
    }

    /// Iterates over all property values that are set, keyed by property id.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyValue)> + '_ {
        self.properties.iter().map(|(id, value)| (id.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NUNIT_EXECUTOR_URI, NUNIT_EXPLICIT_PROPERTY, NUNIT_TEST_CATEGORY_PROPERTY};

    #[test]
    fn property_values() {
        let mut test_case = TestCase::new("Ns.A", NUNIT_EXECUTOR_URI, "Ns.dll");
        assert_eq!(test_case.display_name, "Ns.A");
        assert_eq!(test_case.bool_property(&NUNIT_EXPLICIT_PROPERTY), None);

        test_case.set_property_value(&NUNIT_EXPLICIT_PROPERTY, true);
        test_case.set_property_value(
            &NUNIT_TEST_CATEGORY_PROPERTY,
            vec!["Smoke".to_owned(), "Slow".to_owned()],
        );
        assert_eq!(test_case.bool_property(&NUNIT_EXPLICIT_PROPERTY), Some(true));
        assert_eq!(
            test_case.string_array_property(&NUNIT_TEST_CATEGORY_PROPERTY),
            Some(&["Smoke".to_owned(), "Slow".to_owned()][..])
        );
        assert_eq!(
            test_case.properties().map(|(id, _)| id).collect::<Vec<_>>(),
            ["NUnit.Explicit", "NUnit.TestCategory"]
        );
    }

    #[test]
    #[should_panic(expected = "property NUnit.Explicit holds bool values")]
    fn property_kind_mismatch() {
        let mut test_case = TestCase::new("Ns.A", NUNIT_EXECUTOR_URI, "Ns.dll");
        test_case.set_property_value(&NUNIT_EXPLICIT_PROPERTY, "yes".to_owned());
    }

    #[test]
    fn traits_keep_duplicates() {
        let mut test_case = TestCase::new("Ns.A", NUNIT_EXECUTOR_URI, "Ns.dll");
        test_case.add_trait("Owner", "ada").add_trait("Owner", "ada");
        assert_eq!(test_case.traits.len(), 2);
        assert!(test_case.has_trait("Owner"));
        assert!(!test_case.has_trait("owner"));
    }

    #[test]
    fn json_round_trip() {
        let mut test_case = TestCase::new("Ns.A", NUNIT_EXECUTOR_URI, "Ns.dll");
        test_case
            .set_display_name("A")
            .add_trait("Explicit", "")
            .set_property_value(&NUNIT_EXPLICIT_PROPERTY, true);

        let json = serde_json::to_value(&test_case).unwrap();
        assert_eq!(json["fully-qualified-name"], "Ns.A");
        assert_eq!(json["traits"][0]["value"], "");
        assert_eq!(json["properties"]["NUnit.Explicit"]["value"], true);

        let back: TestCase = serde_json::from_value(json).unwrap();
        assert_eq!(back, test_case);
    }
}
