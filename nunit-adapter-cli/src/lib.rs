// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line frontend for the NUnit test adapter.
//!
//! `nunit-adapter discover` converts the NUnit engine's discovery XML into host test cases and
//! shows their traits and categories. `nunit-adapter filter` builds the engine filter for a
//! selection of tests.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
pub use output::OutputContext;
