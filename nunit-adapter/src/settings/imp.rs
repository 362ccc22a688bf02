// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::AdapterSettingsError;
use camino::Utf8Path;
use nunit_adapter_metadata::VsTestCategoryType;
use serde::{Deserialize, de::DeserializeOwned};
use std::{collections::BTreeSet, fs, io};
use tracing::{debug, warn};

/// The path of the settings file, relative to the project root.
pub const ADAPTER_SETTINGS_PATH: &str = ".config/nunit-adapter.toml";

/// Specifies where to load adapter settings from.
#[derive(Clone, Copy, Debug)]
pub enum SettingsLocation<'a> {
    /// Look for [`ADAPTER_SETTINGS_PATH`] under the given project root. A missing file is not an
    /// error.
    Default(&'a Utf8Path),

    /// Skip settings files entirely, using only built-in defaults.
    ///
    /// This is useful for test isolation.
    Isolated,

    /// Load settings from an explicit path.
    ///
    /// Returns an error if the file does not exist.
    Explicit(&'a Utf8Path),
}

impl<'a> SettingsLocation<'a> {
    /// Picks a location from an optional explicit path, falling back to the project root.
    pub fn new(root: &'a Utf8Path, explicit: Option<&'a Utf8Path>) -> Self {
        match explicit {
            Some(path) => Self::Explicit(path),
            None => Self::Default(root),
        }
    }
}

/// Adapter settings after the settings file has been applied over the defaults.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdapterSettings {
    /// Whether engine-internal properties such as `Author` or `Timeout` are surfaced as traits.
    pub show_internal_properties: bool,

    /// Which host property categories are reported under.
    pub category_type: VsTestCategoryType,

    /// Whether classified traits are mirrored into the traits cache.
    pub cache_traits: bool,

    /// Whether categories and properties of enclosing suites apply to the tests inside them.
    pub inherit_categories: bool,
}

impl AdapterSettings {
    /// Loads settings from the given location.
    pub fn load(location: SettingsLocation<'_>) -> Result<Self, AdapterSettingsError> {
        Self::load_with_warnings(location, &mut DefaultSettingsWarnings)
    }

    fn load_with_warnings(
        location: SettingsLocation<'_>,
        warnings: &mut impl SettingsWarnings,
    ) -> Result<Self, AdapterSettingsError> {
        let file = match location {
            SettingsLocation::Isolated => {
                debug!("adapter settings: isolated, using built-in defaults only");
                None
            }
            SettingsLocation::Default(root) => {
                read_settings_file(&root.join(ADAPTER_SETTINGS_PATH), false, warnings)?
            }
            SettingsLocation::Explicit(path) => read_settings_file(path, true, warnings)?,
        };

        Ok(Self::resolve(
            &DefaultAdapterSettings::from_embedded(),
            file.as_ref(),
        ))
    }

    fn resolve(
        defaults: &DefaultAdapterSettings,
        file: Option<&DeserializedAdapterSettings>,
    ) -> Self {
        let mut settings = Self {
            show_internal_properties: defaults.show_internal_properties,
            category_type: defaults.category_type,
            cache_traits: defaults.discovery.cache_traits,
            inherit_categories: defaults.discovery.inherit_categories,
        };

        if let Some(file) = file {
            if let Some(show) = file.show_internal_properties {
                settings.show_internal_properties = show;
            }
            if let Some(category_type) = file.category_type {
                settings.category_type = category_type;
            }
            if let Some(cache_traits) = file.discovery.cache_traits {
                settings.cache_traits = cache_traits;
            }
            if let Some(inherit) = file.discovery.inherit_categories {
                settings.inherit_categories = inherit;
            }
        }

        settings
    }

    /// Overrides whether internal properties are shown.
    pub fn set_show_internal_properties(&mut self, show: bool) -> &mut Self {
        self.show_internal_properties = show;
        self
    }

    /// Overrides the category property style.
    pub fn set_category_type(&mut self, category_type: VsTestCategoryType) -> &mut Self {
        self.category_type = category_type;
        self
    }
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self::resolve(&DefaultAdapterSettings::from_embedded(), None)
    }
}

/// Handles warnings produced while loading a settings file.
trait SettingsWarnings {
    /// Handle unknown keys found in a settings file.
    fn unknown_settings_keys(&mut self, settings_file: &Utf8Path, unknown: &BTreeSet<String>);
}

/// Logs settings warnings using the tracing crate.
struct DefaultSettingsWarnings;

impl SettingsWarnings for DefaultSettingsWarnings {
    fn unknown_settings_keys(&mut self, settings_file: &Utf8Path, unknown: &BTreeSet<String>) {
        let noun = if unknown.len() == 1 { "key" } else { "keys" };
        let keys: Vec<&str> = unknown.iter().map(String::as_str).collect();
        warn!(
            "in adapter settings file {settings_file}, ignoring unknown {noun}: {}",
            keys.join(", ")
        );
    }
}

/// Reads and parses the settings file at `path`.
///
/// A missing file is `Ok(None)` unless the file is `required`.
fn read_settings_file(
    path: &Utf8Path,
    required: bool,
    warnings: &mut impl SettingsWarnings,
) -> Result<Option<DeserializedAdapterSettings>, AdapterSettingsError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            if required {
                return Err(AdapterSettingsError::FileNotFound {
                    path: path.to_owned(),
                });
            }
            debug!("adapter settings: no settings file at {path}");
            return Ok(None);
        }
        Err(error) => {
            return Err(AdapterSettingsError::Read {
                path: path.to_owned(),
                error,
            });
        }
    };

    let (settings, unknown) =
        parse_toml(&contents).map_err(|error| AdapterSettingsError::Parse {
            path: path.to_owned(),
            error,
        })?;
    if !unknown.is_empty() {
        warnings.unknown_settings_keys(path, &unknown);
    }
    debug!("adapter settings: applied settings file {path}");
    Ok(Some(settings))
}

/// Parses settings TOML, collecting the dotted paths of keys that `T` doesn't know about.
fn parse_toml<T: DeserializeOwned>(
    contents: &str,
) -> Result<(T, BTreeSet<String>), toml::de::Error> {
    let mut unknown = BTreeSet::new();
    let value = serde_ignored::deserialize(toml::Deserializer::parse(contents)?, |path| {
        unknown.insert(path.to_string());
    })?;
    Ok((value, unknown))
}

/// A settings file, as deserialized. Every key is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedAdapterSettings {
    #[serde(default)]
    show_internal_properties: Option<bool>,

    #[serde(default)]
    category_type: Option<VsTestCategoryType>,

    #[serde(default)]
    discovery: DeserializedDiscoverySettings,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedDiscoverySettings {
    #[serde(default)]
    cache_traits: Option<bool>,

    #[serde(default)]
    inherit_categories: Option<bool>,
}

/// The embedded default settings. Every key is required.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DefaultAdapterSettings {
    show_internal_properties: bool,
    category_type: VsTestCategoryType,
    discovery: DefaultDiscoverySettings,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DefaultDiscoverySettings {
    cache_traits: bool,
    inherit_categories: bool,
}

impl DefaultAdapterSettings {
    const DEFAULT_SETTINGS: &'static str = include_str!("../../default-adapter-settings.toml");

    /// Parses the embedded default settings.
    ///
    /// Panics if the embedded TOML is invalid or has unknown keys: the defaults ship with this
    /// crate, so either is a bug.
    fn from_embedded() -> Self {
        let (settings, unknown): (Self, _) =
            parse_toml(Self::DEFAULT_SETTINGS).unwrap_or_else(|error| {
                panic!("embedded default adapter settings are invalid: {error}")
            });
        assert!(
            unknown.is_empty(),
            "embedded default adapter settings have unknown keys: {unknown:?}"
        );
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use camino_tempfile::tempdir;
    use indoc::indoc;

    #[derive(Default)]
    struct TestSettingsWarnings {
        unknown_keys: Option<(Utf8PathBuf, BTreeSet<String>)>,
    }

    impl SettingsWarnings for TestSettingsWarnings {
        fn unknown_settings_keys(&mut self, settings_file: &Utf8Path, unknown: &BTreeSet<String>) {
            self.unknown_keys = Some((settings_file.to_owned(), unknown.clone()));
        }
    }

    #[test]
    fn default_settings_are_valid() {
        let settings = AdapterSettings::default();
        assert_eq!(
            settings,
            AdapterSettings {
                show_internal_properties: false,
                category_type: VsTestCategoryType::NUnit,
                cache_traits: true,
                inherit_categories: true,
            }
        );
    }

    #[test]
    fn settings_file_overrides_defaults() {
        let temp_dir = tempdir().unwrap();
        let settings_path = temp_dir.path().join(ADAPTER_SETTINGS_PATH);
        std::fs::create_dir_all(settings_path.parent().unwrap()).unwrap();
        std::fs::write(
            &settings_path,
            indoc! {r#"
                show-internal-properties = true
                category-type = "mstest"

                [discovery]
                inherit-categories = false
            "#},
        )
        .unwrap();

        let mut warnings = TestSettingsWarnings::default();
        let settings = AdapterSettings::load_with_warnings(
            SettingsLocation::Default(temp_dir.path()),
            &mut warnings,
        )
        .expect("settings valid");

        assert!(warnings.unknown_keys.is_none(), "no unknown keys");
        assert_eq!(
            settings,
            AdapterSettings {
                show_internal_properties: true,
                category_type: VsTestCategoryType::MsTest,
                cache_traits: true,
                inherit_categories: false,
            }
        );
    }

    #[test]
    fn missing_default_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let settings = AdapterSettings::load(SettingsLocation::Default(temp_dir.path()))
            .expect("missing file is fine");
        assert_eq!(settings, AdapterSettings::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nope.toml");
        let err = AdapterSettings::load(SettingsLocation::Explicit(&path)).unwrap_err();
        assert!(
            matches!(&err, AdapterSettingsError::FileNotFound { path: p } if *p == path),
            "{err:?}"
        );
    }

    #[test]
    fn unreadable_file_is_a_read_error() {
        let temp_dir = tempdir().unwrap();
        let err = AdapterSettings::load(SettingsLocation::Explicit(temp_dir.path())).unwrap_err();
        assert!(
            matches!(&err, AdapterSettingsError::Read { path, .. } if path == temp_dir.path()),
            "a directory can't be read as a settings file: {err:?}"
        );
    }

    #[test]
    fn isolated_ignores_files() {
        let settings = AdapterSettings::load(SettingsLocation::Isolated).unwrap();
        assert_eq!(settings, AdapterSettings::default());
    }

    #[test]
    fn ignored_keys() {
        let temp_dir = tempdir().unwrap();
        let settings_path = temp_dir.path().join("settings.toml");
        std::fs::write(
            &settings_path,
            indoc! {r#"
                ignored1 = "test"
                show-internal-properties = true

                [discovery]
                cache-traits = false
                ignored2 = "hi"
            "#},
        )
        .unwrap();

        let mut warnings = TestSettingsWarnings::default();
        let settings = AdapterSettings::load_with_warnings(
            SettingsLocation::Explicit(&settings_path),
            &mut warnings,
        )
        .expect("settings valid");
        assert!(settings.show_internal_properties);
        assert!(!settings.cache_traits);

        let (path, unknown) = warnings.unknown_keys.expect("should have unknown keys");
        assert_eq!(path, settings_path);
        assert_eq!(
            unknown,
            maplit::btreeset! {
                "ignored1".to_owned(),
                "discovery.ignored2".to_owned(),
            },
        );
    }

    #[test]
    fn invalid_category_type() {
        let temp_dir = tempdir().unwrap();
        let settings_path = temp_dir.path().join("settings.toml");
        std::fs::write(&settings_path, "category-type = \"xunit\"\n").unwrap();

        let err = AdapterSettings::load(SettingsLocation::Explicit(&settings_path)).unwrap_err();
        assert!(
            matches!(err, AdapterSettingsError::Parse { .. }),
            "unknown category types are rejected: {err:?}"
        );
    }

    #[test]
    fn location_from_explicit_path() {
        let root = Utf8Path::new("/project");
        let explicit = Utf8Path::new("/elsewhere/settings.toml");
        assert!(matches!(
            SettingsLocation::new(root, None),
            SettingsLocation::Default(r) if r == root
        ));
        assert!(matches!(
            SettingsLocation::new(root, Some(explicit)),
            SettingsLocation::Explicit(p) if p == explicit
        ));
    }
}
