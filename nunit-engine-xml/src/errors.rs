// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::io;
use thiserror::Error;

/// An error that occurs while reading NUnit engine XML.
///
/// Returned by [`TestNode::parse`](crate::TestNode::parse) and
/// [`TestNode::from_reader`](crate::TestNode::from_reader).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Reading the input failed.
    #[error("error reading NUnit XML")]
    Read(#[source] io::Error),

    /// The input is not well-formed XML.
    #[error("malformed NUnit XML near byte {position}")]
    Xml {
        /// The byte offset at which the error was detected.
        position: usize,

        /// The underlying error.
        #[source]
        error: quick_xml::Error,
    },

    /// An element appeared somewhere it isn't allowed.
    #[error("unexpected `{element}` element near byte {position}")]
    UnexpectedElement {
        /// The name of the element.
        element: &'static str,

        /// The byte offset of the element.
        position: usize,
    },

    /// The input ended before an element was closed.
    #[error("`{element}` element was never closed")]
    UnclosedElement {
        /// The name of the innermost unclosed element.
        element: &'static str,
    },

    /// The input contained no `test-run`, `test-suite` or `test-case` element.
    #[error("no test-run, test-suite or test-case element found")]
    NoRootNode,
}
