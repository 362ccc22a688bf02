// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::{Args, ValueEnum};
use owo_colors::{OwoColorize, Style, style};
use std::{fmt, sync::Once};
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
    level_filters::LevelFilter,
};
use tracing_subscriber::{
    Layer,
    filter::Targets,
    fmt::{FmtContext, FormatEvent, FormatFields, format},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Events logged with this target are printed without an `error:`/`warning:` heading.
pub(crate) const NO_HEADING_TARGET: &str = "nunit_adapter_cli::no_heading";

static LOG_ENV_VAR: &str = "NUNIT_ADAPTER_LOG";

/// Styles for `--help` output, matching the palette of command output.
pub(crate) const fn help_styles() -> clap::builder::Styles {
    use clap::builder::{
        Styles,
        styling::{AnsiColor, Style as HelpStyle},
    };

    let heading = HelpStyle::new().bold().underline();
    let literal = AnsiColor::Cyan.on_default().bold();
    Styles::styled()
        .header(heading)
        .usage(heading)
        .literal(literal)
        .placeholder(AnsiColor::Cyan.on_default())
        .error(AnsiColor::Red.on_default().bold())
        .valid(literal)
        .invalid(AnsiColor::Yellow.on_default().bold())
}

#[derive(Copy, Clone, Debug, Args)]
#[must_use]
pub(crate) struct OutputOpts {
    /// Log debug messages and show test sources
    #[arg(long, short, global = true, env = "NUNIT_ADAPTER_VERBOSE")]
    pub(crate) verbose: bool,

    /// When to color output
    #[arg(
        long,
        value_enum,
        default_value_t,
        global = true,
        value_name = "WHEN",
        env = "NUNIT_ADAPTER_COLOR"
    )]
    pub(crate) color: Color,
}

impl OutputOpts {
    pub(crate) fn init(self) -> OutputContext {
        let OutputOpts { verbose, color } = self;
        color.init(verbose);
        OutputContext { verbose, color }
    }
}

/// Output settings for a single invocation.
#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct OutputContext {
    pub(crate) verbose: bool,
    pub(crate) color: Color,
}

impl OutputContext {
    /// Output settings with colors and logging turned off. Doesn't install a logger.
    pub fn plain() -> Self {
        Self {
            verbose: false,
            color: Color::Never,
        }
    }

    pub(crate) fn stdout_styles(&self) -> StdoutStyles {
        let mut styles = StdoutStyles::default();
        if self.color.should_colorize(supports_color::Stream::Stdout) {
            styles.colorize();
        }
        styles
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
#[must_use]
pub enum Color {
    #[default]
    Auto,
    Always,
    Never,
}

static INIT_LOGGER: Once = Once::new();

impl Color {
    fn init(self, verbose: bool) {
        let log_styles = LogStyles {
            colorize: self.should_colorize(supports_color::Stream::Stderr),
        };

        INIT_LOGGER.call_once(|| {
            let default_level = if verbose {
                LevelFilter::DEBUG
            } else {
                LevelFilter::INFO
            };

            let level_str = std::env::var(LOG_ENV_VAR).unwrap_or_default();
            // An empty or invalid level string means the standard level filter.
            let (targets, invalid) = if level_str.is_empty() {
                (Targets::new().with_default(default_level), None)
            } else {
                match level_str.parse::<Targets>() {
                    Ok(targets) => (targets, None),
                    Err(error) => (Targets::new().with_default(default_level), Some(error)),
                }
            };

            let layer = tracing_subscriber::fmt::layer()
                .event_format(SimpleFormatter { styles: log_styles })
                .with_writer(std::io::stderr)
                .with_filter(targets);
            tracing_subscriber::registry().with(layer).init();

            if let Some(error) = invalid {
                tracing::warn!("ignoring invalid {LOG_ENV_VAR} value `{level_str}`: {error}");
            }
        });
    }

    pub(crate) fn should_colorize(self, stream: supports_color::Stream) -> bool {
        match self {
            Color::Auto => supports_color::on_cached(stream).is_some(),
            Color::Always => true,
            Color::Never => false,
        }
    }
}

struct SimpleFormatter {
    styles: LogStyles,
}

impl<S, N> FormatEvent<S, N> for SimpleFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        if metadata.target() != NO_HEADING_TARGET {
            let (heading, style) = self.styles.heading(*metadata.level());
            write!(writer, "{}: ", heading.style(style))?;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        write!(writer, "{}", visitor.message)?;
        for (name, value) in &visitor.fields {
            write!(writer, " {name}={value}")?;
        }
        writeln!(writer)
    }
}

static MESSAGE_FIELD: &str = "message";

/// Collects the message and any other fields of an event.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<(&'static str, String)>,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == MESSAGE_FIELD {
            self.message = format!("{value:?}");
        } else {
            self.fields.push((field.name(), format!("{value:?}")));
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct LogStyles {
    colorize: bool,
}

impl LogStyles {
    fn heading(self, level: Level) -> (&'static str, Style) {
        let (heading, colored) = match level {
            Level::ERROR => ("error", style().red().bold()),
            Level::WARN => ("warning", style().yellow().bold()),
            Level::INFO => ("info", style().bold()),
            Level::DEBUG => ("debug", style().bold()),
            Level::TRACE => ("trace", style().dimmed()),
        };
        (heading, if self.colorize { colored } else { style() })
    }
}

#[derive(Debug, Default)]
pub(crate) struct StdoutStyles {
    pub(crate) test_name: Style,
    pub(crate) label: Style,
    pub(crate) explicit: Style,
    pub(crate) count: Style,
}

impl StdoutStyles {
    fn colorize(&mut self) {
        self.test_name = style().bold();
        self.label = style().cyan();
        self.explicit = style().yellow();
        self.count = style().bold();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_headings() {
        let styles = LogStyles { colorize: false };
        let headings: Vec<_> = [Level::ERROR, Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE]
            .into_iter()
            .map(|level| styles.heading(level).0)
            .collect();
        assert_eq!(headings, ["error", "warning", "info", "debug", "trace"]);
    }
}
