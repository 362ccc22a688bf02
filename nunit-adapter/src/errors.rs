// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by the NUnit adapter.

use camino::Utf8PathBuf;
use nunit_engine_xml::ParseError;
use std::io;
use thiserror::Error;

/// An error that occurred while loading adapter settings.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdapterSettingsError {
    /// An explicitly requested settings file doesn't exist.
    #[error("adapter settings file not found at `{path}`")]
    FileNotFound {
        /// The path that was requested.
        path: Utf8PathBuf,
    },

    /// A settings file exists but couldn't be read.
    #[error("failed to read adapter settings file `{path}`")]
    Read {
        /// The path to the settings file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// A settings file couldn't be parsed.
    #[error("failed to parse adapter settings file `{path}`")]
    Parse {
        /// The path to the settings file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: toml::de::Error,
    },
}

/// An error that occurred while reading discovery output.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiscoveryError {
    /// The discovery XML couldn't be read.
    #[error("failed to read discovery XML from `{path}`")]
    Read {
        /// The path to the discovery XML.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The discovery XML couldn't be parsed.
    #[error("failed to parse discovery XML from `{path}`")]
    Parse {
        /// The path to the discovery XML.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: ParseError,
    },
}

/// An error that occurred while creating a
/// [`NUnitTestFilterBuilder`](crate::test_filter::NUnitTestFilterBuilder).
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum TestFilterBuilderError {
    /// The engine doesn't provide a test filter service.
    ///
    /// This means the engine in use is an incompatible version.
    #[error("test filter service is not available: engine in use is incorrect version")]
    ServiceUnavailable,
}

/// A filter service rejected a where clause.
#[derive(Clone, Debug, Error)]
#[error("where clause `{where_clause}` was rejected: {reason}")]
pub struct WhereClauseError {
    where_clause: String,
    reason: String,
}

impl WhereClauseError {
    /// Creates a new `WhereClauseError`.
    pub fn new(where_clause: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            where_clause: where_clause.into(),
            reason: reason.into(),
        }
    }

    /// Returns the where clause that was rejected.
    pub fn where_clause(&self) -> &str {
        &self.where_clause
    }

    /// Returns the reason the clause was rejected.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
