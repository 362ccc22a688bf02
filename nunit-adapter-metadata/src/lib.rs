// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! The host test platform's object model, as used by the NUnit test adapter.
//!
//! The NUnit adapter turns the engine's discovery XML into [`TestCase`] instances. Traits are plain
//! name/value pairs on the test case; categories and the explicit marker are stored as values of
//! registered [`TestProperty`] instances.

mod exit_codes;
mod properties;
mod test_case;

pub use exit_codes::*;
pub use properties::*;
pub use test_case::*;
