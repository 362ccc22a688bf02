// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Read the XML the NUnit engine emits during test discovery, and write the XML filters it
//! accepts back.

mod deserialize;
mod errors;
mod filter;
mod test_node;

pub use errors::*;
pub use filter::*;
pub use test_node::*;
