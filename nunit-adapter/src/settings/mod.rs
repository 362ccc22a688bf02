// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter settings.
//!
//! Settings are layered: the defaults embedded in this crate, then an optional TOML settings
//! file, then any overrides the caller applies (for example from the command line).

mod imp;

pub use imp::*;
