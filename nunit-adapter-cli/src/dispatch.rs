// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError,
    output::{OutputContext, OutputOpts, StdoutStyles, help_styles},
};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use nunit_adapter::{
    discovery::DiscoverySession,
    settings::{AdapterSettings, SettingsLocation},
    test_filter::{NUnitTestFilterBuilder, XmlFilterService},
    traits::{CATEGORY_LABEL, CachedTestCaseInfo},
};
use nunit_adapter_metadata::{
    NUNIT_EXPLICIT_PROPERTY, TestCase, TestProperty, VsTestCategoryType,
};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::{
    collections::{BTreeMap, HashSet},
    io::Write,
    sync::Arc,
};
use tracing::info;

/// Classifies NUnit discovery output and builds engine filters, the way the NUnit test adapter
/// does for its host.
#[derive(Debug, Parser)]
#[command(version, name = "nunit-adapter", styles = help_styles())]
pub struct NUnitAdapterApp {
    #[command(flatten)]
    output: OutputOpts,

    #[command(flatten)]
    settings_opts: SettingsOpts,

    #[command(subcommand)]
    command: Command,
}

impl NUnitAdapterApp {
    /// Initializes the output context, installing the logger.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, writing command output to `writer`.
    pub fn exec(self, output: OutputContext, writer: &mut dyn Write) -> Result<(), ExpectedError> {
        let settings = self.settings_opts.make_settings()?;
        match self.command {
            Command::Discover(opts) => opts.exec(settings, output, writer),
            Command::Filter(opts) => opts.exec(settings, writer),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert discovered tests, showing their traits and categories
    Discover(DiscoverOpts),

    /// Build an engine filter that selects tests
    Filter(FilterOpts),
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Settings options")]
struct SettingsOpts {
    /// Directory containing `.config/nunit-adapter.toml`
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    root: Utf8PathBuf,

    /// Settings file [default: <DIR>/.config/nunit-adapter.toml]
    #[arg(long, global = true, value_name = "PATH")]
    settings_file: Option<Utf8PathBuf>,

    /// Ignore settings files and use the built-in defaults
    #[arg(long, global = true, conflicts_with = "settings_file")]
    no_settings: bool,

    /// Surface engine-internal properties (Author, Timeout, and so on) as traits
    #[arg(long, global = true)]
    show_internal_properties: bool,

    /// Host property that categories are reported under
    #[arg(long, global = true, value_enum, value_name = "TYPE")]
    category_type: Option<CategoryTypeOpt>,
}

impl SettingsOpts {
    fn make_settings(&self) -> Result<AdapterSettings, ExpectedError> {
        let location = if self.no_settings {
            SettingsLocation::Isolated
        } else {
            SettingsLocation::new(&self.root, self.settings_file.as_deref())
        };

        let mut settings = AdapterSettings::load(location)?;
        if self.show_internal_properties {
            settings.set_show_internal_properties(true);
        }
        if let Some(category_type) = self.category_type {
            settings.set_category_type(category_type.into());
        }
        Ok(settings)
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CategoryTypeOpt {
    /// NUnit.TestCategory
    Nunit,
    /// MSTestDiscoverer.TestCategory
    Mstest,
}

impl From<CategoryTypeOpt> for VsTestCategoryType {
    fn from(opt: CategoryTypeOpt) -> Self {
        match opt {
            CategoryTypeOpt::Nunit => VsTestCategoryType::NUnit,
            CategoryTypeOpt::Mstest => VsTestCategoryType::MsTest,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum MessageFormat {
    /// A readable listing
    #[default]
    Human,
    /// Pretty-printed JSON
    Json,
}

#[derive(Debug, Args)]
struct DiscoverOpts {
    /// Discovery XML written by the NUnit engine
    #[arg(value_name = "XML")]
    xml: Utf8PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t, value_name = "FMT")]
    message_format: MessageFormat,

    /// Also show the traits cache
    #[arg(long)]
    show_cache: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct DiscoverOutput<'a> {
    tests: &'a [TestCase],
    #[serde(skip_serializing_if = "Option::is_none")]
    traits_cache: Option<BTreeMap<String, CachedTestCaseInfo>>,
}

impl DiscoverOpts {
    fn exec(
        self,
        settings: AdapterSettings,
        output: OutputContext,
        writer: &mut dyn Write,
    ) -> Result<(), ExpectedError> {
        let category_property = settings.category_type.category_property();
        let session = DiscoverySession::new(settings);
        let tests = session.discover_path(&self.xml)?;
        info!("discovered {} tests in {}", tests.len(), self.xml);

        let traits_cache = self
            .show_cache
            .then(|| session.traits_cache().snapshot());

        match self.message_format {
            MessageFormat::Human => {
                let styles = output.stdout_styles();
                for test in &tests {
                    write_test_human(test, category_property, &styles, output.verbose, writer)
                        .map_err(|err| ExpectedError::WriteOutputError { err })?;
                }
                if let Some(cache) = &traits_cache {
                    write_cache_human(cache, &styles, writer)
                        .map_err(|err| ExpectedError::WriteOutputError { err })?;
                }
            }
            MessageFormat::Json => {
                let out = DiscoverOutput {
                    tests: &tests,
                    traits_cache,
                };
                serde_json::to_writer_pretty(&mut *writer, &out)
                    .map_err(|err| ExpectedError::SerializeOutputError { err })?;
                writeln!(writer).map_err(|err| ExpectedError::WriteOutputError { err })?;
            }
        }

        Ok(())
    }
}

fn write_test_human(
    test: &TestCase,
    category_property: &TestProperty,
    styles: &StdoutStyles,
    verbose: bool,
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    write!(writer, "{}", test.fully_qualified_name.style(styles.test_name))?;
    if test.bool_property(&NUNIT_EXPLICIT_PROPERTY) == Some(true) {
        write!(writer, " {}", "(explicit)".style(styles.explicit))?;
    }
    writeln!(writer)?;

    if verbose {
        writeln!(writer, "    {}: {}", "source".style(styles.label), test.source)?;
    }
    if let Some(categories) = test.string_array_property(category_property) {
        writeln!(
            writer,
            "    {}: {}",
            "categories".style(styles.label),
            categories.join(", ")
        )?;
    }
    for t in &test.traits {
        writeln!(writer, "    {} {}={}", "trait".style(styles.label), t.name, t.value)?;
    }
    Ok(())
}

fn write_cache_human(
    cache: &BTreeMap<String, CachedTestCaseInfo>,
    styles: &StdoutStyles,
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "traits cache: {} entries",
        cache.len().style(styles.count)
    )?;
    for (key, info) in cache {
        write!(writer, "  {}", key.style(styles.test_name))?;
        if info.explicit {
            write!(writer, " {}", "(explicit)".style(styles.explicit))?;
        }
        writeln!(writer)?;

        let categories: Vec<_> = info.categories().collect();
        if !categories.is_empty() {
            writeln!(
                writer,
                "    {}: {}",
                "categories".style(styles.label),
                categories.join(", ")
            )?;
        }
        for t in info.traits.iter().filter(|t| t.name != CATEGORY_LABEL) {
            writeln!(writer, "    {} {}={}", "trait".style(styles.label), t.name, t.value)?;
        }
    }
    Ok(())
}

#[derive(Debug, Args)]
struct FilterOpts {
    /// Discovery XML written by the NUnit engine, needed to resolve --test names
    #[arg(value_name = "XML")]
    xml: Option<Utf8PathBuf>,

    /// Select a test by fully qualified name (may be repeated)
    #[arg(
        long = "test",
        value_name = "NAME",
        conflicts_with = "where_clause",
        requires = "xml"
    )]
    tests: Vec<String>,

    /// Select tests with a where clause in the engine's selection language
    #[arg(long = "where", value_name = "CLAUSE")]
    where_clause: Option<String>,
}

impl FilterOpts {
    fn exec(self, settings: AdapterSettings, writer: &mut dyn Write) -> Result<(), ExpectedError> {
        let builder = NUnitTestFilterBuilder::new(Some(Arc::new(XmlFilterService)))?;

        let filter = match (&self.where_clause, &self.xml) {
            (Some(where_clause), _) => builder.filter_by_where(where_clause)?,
            (None, Some(xml)) if !self.tests.is_empty() => {
                let session = DiscoverySession::new(settings);
                let loaded = session.discover_path(xml)?;
                let selected: HashSet<&str> = self.tests.iter().map(String::as_str).collect();
                builder.convert_host_filter(
                    &|test: &TestCase| selected.contains(test.fully_qualified_name.as_str()),
                    &loaded,
                )
            }
            // No selection: the empty filter selects every test.
            _ => builder.filter_by_where("")?,
        };

        writeln!(writer, "{filter}").map_err(|err| ExpectedError::WriteOutputError { err })
    }
}
