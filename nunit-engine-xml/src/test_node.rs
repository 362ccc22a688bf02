// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{deserialize::deserialize_test_node, errors::ParseError};
use std::{fmt, io};

/// The element a [`TestNode`] was read from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NodeKind {
    /// The root `test-run` element.
    TestRun,

    /// A `test-suite` element. The suite type is the value of its `type` attribute, for example
    /// `Assembly`, `TestSuite`, `TestFixture` or `ParameterizedMethod`.
    TestSuite {
        /// The value of the `type` attribute. Empty if the attribute is missing.
        suite_type: String,
    },

    /// A `test-case` element.
    TestCase,
}

impl NodeKind {
    /// Returns true if this is a `test-suite` element of type `Assembly`.
    pub fn is_assembly(&self) -> bool {
        matches!(self, NodeKind::TestSuite { suite_type } if suite_type == "Assembly")
    }
}

/// The run state the engine assigned to a test or suite.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum RunState {
    /// The test can be run.
    Runnable,

    /// The test cannot be run, typically because of a problem with its definition.
    NotRunnable,

    /// The test only runs when selected explicitly.
    Explicit,

    /// The test is ignored.
    Ignored,

    /// A run state this crate doesn't know about, kept verbatim.
    Unknown(String),
}

impl RunState {
    /// Parses the value of a `runstate` attribute.
    pub fn new(s: &str) -> Self {
        match s {
            "Runnable" => RunState::Runnable,
            "NotRunnable" => RunState::NotRunnable,
            "Explicit" => RunState::Explicit,
            "Ignored" => RunState::Ignored,
            other => RunState::Unknown(other.to_owned()),
        }
    }

    /// Returns the run state as it appears in the XML.
    pub fn as_str(&self) -> &str {
        match self {
            RunState::Runnable => "Runnable",
            RunState::NotRunnable => "NotRunnable",
            RunState::Explicit => "Explicit",
            RunState::Ignored => "Ignored",
            RunState::Unknown(s) => s,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `<property name=".." value=".."/>` record attached to a test or suite.
///
/// Missing attributes are read as empty strings.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Property {
    /// The name of the property.
    pub name: String,

    /// The value of the property.
    pub value: String,
}

impl Property {
    /// Creates a new `Property` instance.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<T> From<(T, T)> for Property
where
    T: Into<String>,
{
    fn from((k, v): (T, T)) -> Self {
        Property::new(k, v)
    }
}

/// A node in the tree the engine reports during discovery.
///
/// The tree is fully materialized in memory: a `test-run` contains `test-suite` elements, which
/// contain further suites and `test-case` elements.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct TestNode {
    /// The element this node was read from.
    pub kind: NodeKind,

    /// The engine-assigned id, e.g. `0-1001`.
    pub id: String,

    /// The short name of the test or suite.
    pub name: String,

    /// The full name. For test cases this is the fully qualified test name; for assemblies it is
    /// the path to the assembly.
    pub fullname: String,

    /// The `classname` attribute, if present.
    pub classname: Option<String>,

    /// The `methodname` attribute, if present.
    pub methodname: Option<String>,

    /// The `runstate` attribute, if present.
    pub runstate: Option<RunState>,

    /// Property records, in document order.
    pub properties: Vec<Property>,

    /// Child suites and test cases, in document order.
    pub children: Vec<TestNode>,
}

impl TestNode {
    /// Creates a new node of the given kind with empty attributes.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            id: String::new(),
            name: String::new(),
            fullname: String::new(),
            classname: None,
            methodname: None,
            runstate: None,
            properties: vec![],
            children: vec![],
        }
    }

    /// Creates a new `test-case` node with the given name and full name.
    pub fn test_case(name: impl Into<String>, fullname: impl Into<String>) -> Self {
        let mut node = Self::new(NodeKind::TestCase);
        node.name = name.into();
        node.fullname = fullname.into();
        node
    }

    /// Creates a new `test-suite` node of the given type.
    pub fn test_suite(
        suite_type: impl Into<String>,
        name: impl Into<String>,
        fullname: impl Into<String>,
    ) -> Self {
        let mut node = Self::new(NodeKind::TestSuite {
            suite_type: suite_type.into(),
        });
        node.name = name.into();
        node.fullname = fullname.into();
        node
    }

    /// Reads a node tree from a string.
    ///
    /// The root element may be `test-run`, `test-suite` or `test-case`.
    pub fn parse(xml: &str) -> Result<Self, ParseError> {
        deserialize_test_node(xml)
    }

    /// Reads a node tree from a reader.
    pub fn from_reader(mut reader: impl io::Read) -> Result<Self, ParseError> {
        let mut xml = String::new();
        reader.read_to_string(&mut xml).map_err(ParseError::Read)?;
        Self::parse(&xml)
    }

    /// Sets the run state.
    pub fn set_runstate(&mut self, runstate: RunState) -> &mut Self {
        self.runstate = Some(runstate);
        self
    }

    /// Adds a property record.
    pub fn add_property(&mut self, property: impl Into<Property>) -> &mut Self {
        self.properties.push(property.into());
        self
    }

    /// Adds several property records.
    pub fn add_properties(
        &mut self,
        properties: impl IntoIterator<Item = impl Into<Property>>,
    ) -> &mut Self {
        for property in properties {
            self.add_property(property);
        }
        self
    }

    /// Adds a child node.
    pub fn add_child(&mut self, child: TestNode) -> &mut Self {
        self.children.push(child);
        self
    }

    /// Returns true if the engine marked this node as explicit.
    pub fn is_explicit(&self) -> bool {
        self.runstate == Some(RunState::Explicit)
    }

    /// Returns every `test-case` node in this tree, in document order, along with the suites that
    /// enclose it.
    pub fn test_cases(&self) -> Vec<TestCaseRef<'_>> {
        let mut out = Vec::new();
        let mut ancestors = Vec::new();
        collect_test_cases(self, &mut ancestors, &mut out);
        out
    }
}

fn collect_test_cases<'a>(
    node: &'a TestNode,
    ancestors: &mut Vec<&'a TestNode>,
    out: &mut Vec<TestCaseRef<'a>>,
) {
    if node.kind == NodeKind::TestCase {
        out.push(TestCaseRef {
            node,
            // Closest suite first.
            ancestors: ancestors.iter().rev().copied().collect(),
        });
        return;
    }

    ancestors.push(node);
    for child in &node.children {
        collect_test_cases(child, ancestors, out);
    }
    ancestors.pop();
}

/// A `test-case` node together with the nodes that enclose it.
#[derive(Clone, Debug)]
pub struct TestCaseRef<'a> {
    node: &'a TestNode,
    ancestors: Vec<&'a TestNode>,
}

impl<'a> TestCaseRef<'a> {
    /// Returns the `test-case` node.
    pub fn node(&self) -> &'a TestNode {
        self.node
    }

    /// Returns the enclosing nodes, closest first. The last entry is the root of the tree.
    pub fn ancestors(&self) -> &[&'a TestNode] {
        &self.ancestors
    }

    /// Returns the enclosing `test-suite` nodes, closest first.
    pub fn enclosing_suites(&self) -> impl Iterator<Item = &'a TestNode> + '_ {
        self.ancestors
            .iter()
            .copied()
            .filter(|node| matches!(node.kind, NodeKind::TestSuite { .. }))
    }

    /// Returns the closest enclosing `Assembly` suite, if any.
    pub fn assembly(&self) -> Option<&'a TestNode> {
        self.ancestors
            .iter()
            .copied()
            .find(|node| node.kind.is_assembly())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> TestNode {
        let mut fixture = TestNode::test_suite("TestFixture", "Fixture", "Ns.Fixture");
        fixture
            .add_child(TestNode::test_case("A", "Ns.Fixture.A"))
            .add_child(TestNode::test_case("B", "Ns.Fixture.B"));

        let mut assembly = TestNode::test_suite("Assembly", "Ns.dll", "/bin/Ns.dll");
        assembly.add_child(fixture);
        assembly.add_child(TestNode::test_case("Top", "Top"));

        let mut run = TestNode::new(NodeKind::TestRun);
        run.add_child(assembly);
        run
    }

    #[test]
    fn test_cases_in_document_order() {
        let run = sample_tree();
        let names: Vec<_> = run
            .test_cases()
            .iter()
            .map(|case| case.node().fullname.as_str())
            .collect();
        assert_eq!(names, ["Ns.Fixture.A", "Ns.Fixture.B", "Top"]);
    }

    #[test]
    fn ancestors_closest_first() {
        let run = sample_tree();
        let cases = run.test_cases();

        let ancestors: Vec<_> = cases[0]
            .ancestors()
            .iter()
            .map(|node| node.fullname.as_str())
            .collect();
        assert_eq!(ancestors, ["Ns.Fixture", "/bin/Ns.dll", ""]);

        let suites: Vec<_> = cases[0]
            .enclosing_suites()
            .map(|node| node.name.as_str())
            .collect();
        assert_eq!(suites, ["Fixture", "Ns.dll"], "test-run is not a suite");

        assert_eq!(
            cases[2].assembly().map(|node| node.fullname.as_str()),
            Some("/bin/Ns.dll")
        );
    }

    #[test]
    fn run_state_round_trips_unknown_values() {
        assert_eq!(RunState::new("Explicit"), RunState::Explicit);
        assert_eq!(
            RunState::new("Skipped").as_str(),
            "Skipped",
            "unknown run states are kept verbatim"
        );
        assert!(!RunState::new("explicit").eq(&RunState::Explicit), "case-sensitive");
    }
}
