// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality of the NUnit test adapter.
//!
//! The basic flow: the engine's discovery XML is read into a
//! [`TestNode`](nunit_engine_xml::TestNode) tree, and a [`discovery::DiscoverySession`] turns each
//! `test-case` node into a host [`TestCase`](nunit_adapter_metadata::TestCase). Property records
//! are classified by [`traits::TraitClassifier`], applied through a [`traits::CategoryList`], and
//! mirrored into the session's [`traits::TraitsCache`].
//!
//! In the other direction, [`test_filter::NUnitTestFilterBuilder`] turns the host's selection of
//! tests into an engine filter.

pub mod discovery;
pub mod errors;
pub mod settings;
pub mod test_filter;
pub mod traits;
