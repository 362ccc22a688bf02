// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read a `TestNode` tree from NUnit engine XML.

use crate::{NodeKind, ParseError, Property, RunState, TestNode};
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

static TEST_RUN_TAG: &[u8] = b"test-run";
static TEST_SUITE_TAG: &[u8] = b"test-suite";
static TEST_CASE_TAG: &[u8] = b"test-case";
static PROPERTIES_TAG: &[u8] = b"properties";
static PROPERTY_TAG: &[u8] = b"property";

pub(crate) fn deserialize_test_node(xml: &str) -> Result<TestNode, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    // Nodes that have been opened but not closed yet. The last entry is the innermost one.
    let mut stack: Vec<TestNode> = Vec::new();
    let mut root: Option<TestNode> = None;

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|error| ParseError::Xml { position, error })?;

        match event {
            Event::Start(start) => {
                let name = start.name();
                if let Some(node) = read_node(&start, position)? {
                    stack.push(node);
                } else if name.as_ref() == PROPERTY_TAG {
                    let property = read_property(&start, position)?;
                    push_property(&mut stack, property, position)?;
                    skip_element(&mut reader, &start, position)?;
                } else if name.as_ref() != PROPERTIES_TAG {
                    // Elements such as `reason`, `output` or `settings` carry nothing we model.
                    skip_element(&mut reader, &start, position)?;
                }
            }
            Event::Empty(start) => {
                if let Some(node) = read_node(&start, position)? {
                    attach(&mut stack, &mut root, node, position)?;
                } else if start.name().as_ref() == PROPERTY_TAG {
                    let property = read_property(&start, position)?;
                    push_property(&mut stack, property, position)?;
                }
            }
            Event::End(end) => {
                let name = end.name();
                if is_node_tag(name.as_ref()) {
                    // quick-xml checks that end tags match start tags, so the innermost open node
                    // is the one being closed.
                    if let Some(node) = stack.pop() {
                        attach(&mut stack, &mut root, node, position)?;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = stack.pop() {
        return Err(ParseError::UnclosedElement {
            element: element_name(&unclosed.kind),
        });
    }

    root.ok_or(ParseError::NoRootNode)
}

fn is_node_tag(name: &[u8]) -> bool {
    name == TEST_RUN_TAG || name == TEST_SUITE_TAG || name == TEST_CASE_TAG
}

fn element_name(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::TestRun => "test-run",
        NodeKind::TestSuite { .. } => "test-suite",
        NodeKind::TestCase => "test-case",
    }
}

/// Reads a `test-run`, `test-suite` or `test-case` element. Returns `None` for other elements.
fn read_node(start: &BytesStart<'_>, position: usize) -> Result<Option<TestNode>, ParseError> {
    let name = start.name();
    let kind = if name.as_ref() == TEST_RUN_TAG {
        NodeKind::TestRun
    } else if name.as_ref() == TEST_SUITE_TAG {
        NodeKind::TestSuite {
            suite_type: String::new(),
        }
    } else if name.as_ref() == TEST_CASE_TAG {
        NodeKind::TestCase
    } else {
        return Ok(None);
    };

    let mut node = TestNode::new(kind);
    for attr in start.attributes() {
        let attr = attr.map_err(|error| ParseError::Xml {
            position,
            error: error.into(),
        })?;
        let value = attr
            .unescape_value()
            .map_err(|error| ParseError::Xml { position, error })?
            .into_owned();

        match attr.key.as_ref() {
            b"id" => node.id = value,
            b"name" => node.name = value,
            b"fullname" => node.fullname = value,
            b"classname" => node.classname = Some(value),
            b"methodname" => node.methodname = Some(value),
            b"runstate" => node.runstate = Some(RunState::new(&value)),
            b"type" => {
                if let NodeKind::TestSuite { suite_type } = &mut node.kind {
                    *suite_type = value;
                }
            }
            _ => {}
        }
    }

    Ok(Some(node))
}

fn read_property(start: &BytesStart<'_>, position: usize) -> Result<Property, ParseError> {
    let mut property = Property::new("", "");
    for attr in start.attributes() {
        let attr = attr.map_err(|error| ParseError::Xml {
            position,
            error: error.into(),
        })?;
        match attr.key.as_ref() {
            b"name" => {
                property.name = attr
                    .unescape_value()
                    .map_err(|error| ParseError::Xml { position, error })?
                    .into_owned();
            }
            b"value" => {
                property.value = attr
                    .unescape_value()
                    .map_err(|error| ParseError::Xml { position, error })?
                    .into_owned();
            }
            _ => {}
        }
    }
    Ok(property)
}

fn push_property(
    stack: &mut [TestNode],
    property: Property,
    position: usize,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(node) => {
            node.properties.push(property);
            Ok(())
        }
        None => Err(ParseError::UnexpectedElement {
            element: "property",
            position,
        }),
    }
}

fn attach(
    stack: &mut [TestNode],
    root: &mut Option<TestNode>,
    node: TestNode,
    position: usize,
) -> Result<(), ParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }

    if root.is_some() {
        return Err(ParseError::UnexpectedElement {
            element: element_name(&node.kind),
            position,
        });
    }
    *root = Some(node);
    Ok(())
}

fn skip_element(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
    position: usize,
) -> Result<(), ParseError> {
    let end = start.to_end().into_owned();
    reader
        .read_to_end(end.name())
        .map_err(|error| ParseError::Xml { position, error })?;
    Ok(())
}
