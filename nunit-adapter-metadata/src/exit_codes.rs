// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `nunit-adapter` failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum AdapterExitCode {}

impl AdapterExitCode {
    /// No errors occurred and the adapter exited normally.
    pub const OK: i32 = 0;

    /// Discovery XML couldn't be read or parsed.
    pub const DISCOVERY_FAILED: i32 = 104;

    /// Writing data to stdout or stderr produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;

    /// The engine filter couldn't be built.
    pub const INVALID_FILTER: i32 = 94;

    /// A user issue happened while setting up an adapter invocation, such as an unreadable
    /// settings file.
    pub const SETUP_ERROR: i32 = 96;
}
