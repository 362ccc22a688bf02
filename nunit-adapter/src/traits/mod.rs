// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning engine property records into host traits and categories.
//!
//! Every property record goes through [`TraitClassifier::classify`] exactly once. The resulting
//! [`Classification`] is applied to the live test case by a [`CategoryList`], and mirrored into a
//! [`TraitsCache`] when one is in use.

mod cache;
mod category_list;
mod classify;

pub use cache::*;
pub use category_list::*;
pub use classify::*;
