// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::NO_HEADING_TARGET;
use nunit_adapter::errors::{
    AdapterSettingsError, DiscoveryError, TestFilterBuilderError, WhereClauseError,
};
use nunit_adapter_metadata::AdapterExitCode;
use std::error::Error;
use thiserror::Error;
use tracing::error;

// The #[error()] strings are placeholders: errors are meant to be printed with display_to_stderr.

/// An expected failure of an adapter invocation.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("settings load error")]
    SettingsLoadError {
        #[from]
        err: AdapterSettingsError,
    },
    #[error("discovery error")]
    DiscoveryError {
        #[from]
        err: DiscoveryError,
    },
    #[error("test filter build error")]
    TestFilterBuilderError {
        #[from]
        err: TestFilterBuilderError,
    },
    #[error("where clause error")]
    WhereClauseError {
        #[from]
        err: WhereClauseError,
    },
    #[error("error serializing output")]
    SerializeOutputError {
        #[source]
        err: serde_json::Error,
    },
    #[error("error writing output")]
    WriteOutputError {
        #[source]
        err: std::io::Error,
    },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::SettingsLoadError { .. } => AdapterExitCode::SETUP_ERROR,
            Self::DiscoveryError { .. } => AdapterExitCode::DISCOVERY_FAILED,
            Self::TestFilterBuilderError { .. } | Self::WhereClauseError { .. } => {
                AdapterExitCode::INVALID_FILTER
            }
            Self::SerializeOutputError { .. } | Self::WriteOutputError { .. } => {
                AdapterExitCode::WRITE_OUTPUT_ERROR
            }
        }
    }

    /// Displays this error to stderr, followed by its chain of causes.
    pub fn display_to_stderr(&self) {
        let mut next_error = match self {
            Self::SettingsLoadError { err } => {
                error!("{err}");
                err.source()
            }
            Self::DiscoveryError { err } => {
                error!("{err}");
                err.source()
            }
            Self::TestFilterBuilderError { err } => {
                error!("{err}");
                None
            }
            Self::WhereClauseError { err } => {
                error!("{err}");
                None
            }
            Self::SerializeOutputError { err } => {
                error!("failed to serialize output");
                Some(err as &dyn Error)
            }
            Self::WriteOutputError { err } => {
                error!("failed to write output");
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {err}");
            next_error = err.source();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        let err = ExpectedError::from(TestFilterBuilderError::ServiceUnavailable);
        assert_eq!(err.process_exit_code(), AdapterExitCode::INVALID_FILTER);

        let err = ExpectedError::WriteOutputError {
            err: std::io::Error::other("pipe closed"),
        };
        assert_eq!(err.process_exit_code(), AdapterExitCode::WRITE_OUTPUT_ERROR);
    }
}
