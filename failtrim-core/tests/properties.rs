// Copyright (c) The failtrim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property-based tests for counting and rendering.

use failtrim_core::{
    collector::{Disposition, FailureCollector, OutcomeListener},
    config::TrimConfig,
    identity::FailureIdentity,
};
use failtrim_metadata::{FailureEvent, FailureKind};
use fixture_data::models::failure_at;
use proptest::{collection::vec, prelude::*};
use std::collections::HashMap;
use test_strategy::proptest;

const EXCEPTION_TYPES: [&str; 3] = ["AttributeError", "KeyError", "ValueError"];

/// (exception type index, line, is error, test index)
type EventInput = (usize, u32, bool, u8);

fn make_event((type_index, line, _, test_index): EventInput) -> FailureEvent {
    failure_at(
        format!("tests.test_{test_index:03}"),
        EXCEPTION_TYPES[type_index],
        "app/module_a.py",
        line,
    )
}

fn run(inputs: &[EventInput]) -> (String, Vec<Disposition>, HashMap<FailureIdentity, usize>) {
    let config = TrimConfig::default();
    let mut ledger = config.new_ledger();
    let mut collector = FailureCollector::new(&config, &mut ledger);

    collector.on_run_start();
    let mut dispositions = Vec::new();
    for input in inputs {
        let event = make_event(*input);
        let disposition = if input.2 {
            collector.on_error(event).unwrap()
        } else {
            collector.on_failure(event).unwrap()
        };
        dispositions.push(disposition);
    }
    let report = collector.on_run_end().unwrap();

    let counts = ledger
        .ledger(FailureKind::Error)
        .iter()
        .map(|(identity, count)| (identity.clone(), count.get()))
        .collect();
    (report, dispositions, counts)
}

fn event_inputs() -> impl Strategy<Value = Vec<EventInput>> {
    vec((0..3usize, 1..4u32, any::<bool>(), any::<u8>()), 0..48)
}

#[proptest(cases = 64)]
fn render_is_deterministic(#[strategy(event_inputs())] inputs: Vec<EventInput>) {
    let (first, _, _) = run(&inputs);
    let (second, _, _) = run(&inputs);
    prop_assert_eq!(first, second);
}

#[proptest(cases = 64)]
fn counts_match_events(#[strategy(event_inputs())] inputs: Vec<EventInput>) {
    let (_, dispositions, counts) = run(&inputs);

    let mut expected: HashMap<FailureIdentity, usize> = HashMap::new();
    for input in &inputs {
        let event = make_event(*input);
        let identity = FailureIdentity::from_stack(&event.exception_type, &event.stack);
        *expected.entry(identity).or_default() += 1;
    }
    prop_assert_eq!(&counts, &expected);
    prop_assert_eq!(counts.values().sum::<usize>(), inputs.len());

    // Exactly one event per identity is recorded; the rest are suppressed.
    let recorded = dispositions
        .iter()
        .filter(|d| **d == Disposition::Recorded)
        .count();
    prop_assert_eq!(recorded, expected.len());
}

#[proptest(cases = 64)]
fn one_entry_per_identity(#[strategy(event_inputs())] inputs: Vec<EventInput>) {
    let (report, _, counts) = run(&inputs);

    let headers = report
        .lines()
        .filter(|line| line.starts_with("FAIL: ") || line.starts_with("ERROR: "))
        .count();
    prop_assert_eq!(headers, counts.len());

    // Identities seen exactly once have no "more" line.
    let more_lines = report.lines().filter(|line| line.ends_with(" more")).count();
    let repeated = counts.values().filter(|count| **count > 1).count();
    prop_assert_eq!(more_lines, repeated);
}
