// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::settings::AdapterSettings;
use nunit_adapter_metadata::Trait;
use nunit_engine_xml::Property;

/// The name of property records that hold a category.
pub const CATEGORY_LABEL: &str = "Category";

/// The name of the trait (and property record) that marks a test as explicit.
pub const EXPLICIT_TRAIT_NAME: &str = "Explicit";

/// The value of the explicit trait.
///
/// This must be the empty string: with no value the host doesn't show the trait at all, and with a
/// non-empty value the grouping reads "Explicit [value]".
pub const EXPLICIT_TRAIT_VALUE: &str = "";

/// Well-known engine-internal property names.
///
/// Properties with these names (compared ASCII case-insensitively) are hidden unless
/// [`AdapterSettings::show_internal_properties`] is set. See NUnit's `PropertyNames`.
pub static INTERNAL_PROPERTY_NAMES: &[&str] = &[
    "Author",
    "ApartmentState",
    "Description",
    "IgnoreUntilDate",
    "LevelOfParallelism",
    "MaxTime",
    "Order",
    "ParallelScope",
    "Repeat",
    "RequiresThread",
    "SetCulture",
    "SetUICulture",
    "TestOf",
    "Timeout",
];

/// Returns true if `name` is one of [`INTERNAL_PROPERTY_NAMES`], ignoring ASCII case.
pub fn is_internal_property_name(name: &str) -> bool {
    INTERNAL_PROPERTY_NAMES
        .iter()
        .any(|internal| internal.eq_ignore_ascii_case(name))
}

/// What a single property record means for a test.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Classification<'a> {
    /// The record is hidden.
    Ignore,

    /// The record holds a category.
    Category(&'a str),

    /// The record marks the test as explicit.
    ExplicitTrait,

    /// The record is surfaced as a trait with the same name and value.
    GenericTrait {
        /// The trait name.
        name: &'a str,

        /// The trait value. Never empty.
        value: &'a str,
    },
}

impl Classification<'_> {
    /// Returns the trait this classification is cached as, or `None` for [`Self::Ignore`].
    ///
    /// Categories are cached as `Category` traits, and explicit markers as the explicit trait.
    pub fn to_trait(&self) -> Option<Trait> {
        match *self {
            Self::Ignore => None,
            Self::Category(value) => Some(Trait::new(CATEGORY_LABEL, value)),
            Self::ExplicitTrait => Some(Trait::new(EXPLICIT_TRAIT_NAME, EXPLICIT_TRAIT_VALUE)),
            Self::GenericTrait { name, value } => Some(Trait::new(name, value)),
        }
    }
}

/// Classifies property records.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TraitClassifier {
    show_internal_properties: bool,
}

impl TraitClassifier {
    /// Creates a new classifier.
    pub fn new(show_internal_properties: bool) -> Self {
        Self {
            show_internal_properties,
        }
    }

    /// Creates a classifier configured by the given settings.
    pub fn from_settings(settings: &AdapterSettings) -> Self {
        Self::new(settings.show_internal_properties)
    }

    /// Returns true if internal properties are surfaced as traits.
    pub fn show_internal_properties(&self) -> bool {
        self.show_internal_properties
    }

    /// Classifies a property record by name and value.
    ///
    /// The rules are checked in order, and the first one that applies wins:
    ///
    /// 1. the explicit trait name is always [`Classification::ExplicitTrait`], even with an empty
    ///    value;
    /// 2. internal property names are ignored unless internal properties are shown;
    /// 3. empty names, names starting with `_`, and empty values are ignored;
    /// 4. [`CATEGORY_LABEL`] is a category;
    /// 5. anything else is a generic trait.
    pub fn classify<'a>(&self, name: &'a str, value: &'a str) -> Classification<'a> {
        if name == EXPLICIT_TRAIT_NAME {
            return Classification::ExplicitTrait;
        }
        if !self.show_internal_properties && is_internal_property_name(name) {
            return Classification::Ignore;
        }
        if name.is_empty() || name.starts_with('_') || value.is_empty() {
            return Classification::Ignore;
        }
        if name == CATEGORY_LABEL {
            return Classification::Category(value);
        }
        Classification::GenericTrait { name, value }
    }

    /// Classifies a property record.
    pub fn classify_property<'a>(&self, property: &'a Property) -> Classification<'a> {
        self.classify(&property.name, &property.value)
    }
}
