// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use nunit_engine_xml::{NodeKind, Property, RunState, TestNode};
use pretty_assertions::assert_eq;

#[track_caller]
fn load_discovery() -> TestNode {
    let f = std::fs::File::open("tests/fixtures/discovery.xml").expect("fixture exists");
    TestNode::from_reader(f).expect("fixture is valid NUnit XML")
}

#[test]
fn discovery_fixture() {
    let run = load_discovery();
    assert_eq!(run.kind, NodeKind::TestRun);
    assert_eq!(run.children.len(), 1, "one assembly");

    let cases = run.test_cases();
    let names: Vec<_> = cases
        .iter()
        .map(|case| case.node().fullname.as_str())
        .collect();
    assert_eq!(
        names,
        [
            "Calculator.AdditionTests.AddsTwoNumbers",
            "Calculator.AdditionTests.OverflowsLoudly",
            "Calculator.AdditionTests.AddsNegatives",
            "Calculator.ManualTests.Prints",
            "Calculator.ManualTests.Beeps",
        ]
    );

    for case in &cases {
        assert_eq!(
            case.assembly().map(|node| node.fullname.as_str()),
            Some("/work/bin/Calculator.Tests.dll"),
        );
    }

    let adds = cases[0].node();
    assert_eq!(adds.runstate, Some(RunState::Runnable));
    assert_eq!(adds.properties.len(), 4);
    assert_eq!(adds.properties[3], Property::new("Priority", "High"));

    let overflows = cases[1].node();
    assert!(overflows.is_explicit());

    let fixture = cases[3].enclosing_suites().next().expect("has a fixture");
    assert_eq!(fixture.name, "ManualTests");
    assert!(fixture.is_explicit());
    assert!(fixture.properties.is_empty(), "reason is not a property");

    let beeps = cases[4].node();
    assert_eq!(beeps.properties, vec![Property::new("Explicit", "")]);
}
