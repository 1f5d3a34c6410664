use std::error::Error;

use portgraph::{AssignmentSnapshot, Binding, MatchError, SolveError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
enum Cause {
    #[error("port type mismatch")]
    PortTypeMismatch,
}

fn pattern_snapshot() -> AssignmentSnapshot {
    AssignmentSnapshot::default()
        .assigned_node("A", "C")
        .unassigned_node("B")
}

#[test]
fn header_only() {
    let err = SolveError::<MatchError>::new("pattern", "target", None, None);
    assert_eq!(err.to_string(), r#"Could not satisfy "pattern" from "target""#);
}

#[test]
fn header_quotes_descriptions() {
    let err = SolveError::<MatchError>::new("my \"graph\"", "tab\there", None, None);
    assert_eq!(
        err.to_string(),
        r#"Could not satisfy "my \"graph\"" from "tab\there""#
    );
}

#[test]
fn cause_is_appended_on_the_header_line() {
    let err = SolveError::new("pattern", "target", Some(Cause::PortTypeMismatch), None);

    let report = err.to_string();
    assert_eq!(
        report,
        r#"Could not satisfy "pattern" from "target": port type mismatch"#
    );
    assert_eq!(report.lines().count(), 1);
    assert_eq!(err.cause(), Some(&Cause::PortTypeMismatch));
}

#[test]
fn source_returns_the_cause() {
    let err = SolveError::new("pattern", "target", Some(Cause::PortTypeMismatch), None);

    let source = err.source().expect("a cause was supplied");
    assert_eq!(
        source.downcast_ref::<Cause>(),
        Some(&Cause::PortTypeMismatch)
    );
    assert_eq!(source.to_string(), "port type mismatch");
}

#[test]
fn no_cause_unwraps_to_nothing() {
    let err = SolveError::<Cause>::new("pattern", "target", None, Some(pattern_snapshot()));
    assert!(err.cause().is_none());
    assert!(err.source().is_none());
}

#[test]
fn max_assignment_scenario() {
    let err = SolveError::<Cause>::new("pattern", "target", None, Some(pattern_snapshot()));
    assert_eq!(
        err.to_string(),
        "Could not satisfy \"pattern\" from \"target\"\n\
         Max assignment:\n\
         Node \"A\" is assigned to \"C\"\n\
         Node \"B\" was not assigned\n"
    );
}

#[test]
fn max_assignment_scenario_with_cause() {
    let err = SolveError::new(
        "pattern",
        "target",
        Some(Cause::PortTypeMismatch),
        Some(pattern_snapshot()),
    );
    insta::assert_snapshot!(err.to_string(), @r###"
    Could not satisfy "pattern" from "target": port type mismatch
    Max assignment:
    Node "A" is assigned to "C"
    Node "B" was not assigned
    "###);
}

#[test]
fn empty_snapshot_renders_only_the_section_title() {
    let err = SolveError::<Cause>::new(
        "pattern",
        "target",
        None,
        Some(AssignmentSnapshot::default()),
    );
    assert_eq!(
        err.to_string(),
        "Could not satisfy \"pattern\" from \"target\"\nMax assignment:\n"
    );
}

#[test]
fn counts_assigned_and_unassigned_nodes() {
    let assigned = 4;
    let unassigned = 3;

    let mut snapshot = AssignmentSnapshot::default();
    for i in 0..assigned {
        snapshot = snapshot.assigned_node(&format!("a{i}"), &format!("c{i}"));
    }
    for i in 0..unassigned {
        snapshot = snapshot.unassigned_node(&format!("u{i}"));
    }

    let err = SolveError::<Cause>::new("pattern", "target", None, Some(snapshot));
    let report = err.to_string();
    let lines = report.lines().skip(2).collect::<Vec<_>>();

    assert_eq!(lines.len(), assigned + unassigned);
    assert_eq!(
        lines.iter().filter(|l| l.contains(" is assigned to ")).count(),
        assigned
    );
    assert_eq!(
        lines.iter().filter(|l| l.ends_with(" was not assigned")).count(),
        unassigned
    );
    assert!(lines.iter().all(|l| l.starts_with("Node ")));
}

#[test]
fn bindings_are_sorted_by_label_nodes_before_ports() {
    let snapshot = AssignmentSnapshot::new(
        vec![
            Binding {
                abstract_desc: "zeta".to_string(),
                concrete_desc: None,
            },
            Binding {
                abstract_desc: "alpha".to_string(),
                concrete_desc: Some("one".to_string()),
            },
        ],
        vec![
            Binding {
                abstract_desc: "out".to_string(),
                concrete_desc: Some("p2".to_string()),
            },
            Binding {
                abstract_desc: "in".to_string(),
                concrete_desc: None,
            },
        ],
    );

    let err = SolveError::<Cause>::new("pattern", "target", None, Some(snapshot));
    insta::assert_snapshot!(err.to_string(), @r###"
    Could not satisfy "pattern" from "target"
    Max assignment:
    Node "alpha" is assigned to "one"
    Node "zeta" was not assigned
    Port "in" was not assigned
    Port "out" is assigned to "p2"
    "###);
}

#[test]
fn rendering_is_idempotent() {
    let snapshot = pattern_snapshot()
        .assigned_port("A.out", "C.in")
        .unassigned_port("B.in");
    let err = SolveError::new(
        "pattern",
        "target",
        Some(Cause::PortTypeMismatch),
        Some(snapshot.clone()),
    );

    assert_eq!(err.to_string(), err.to_string());
    assert_eq!(format!("{err}"), err.to_string());

    // Rendering leaves the stored snapshot untouched
    assert_eq!(err.max_assignment(), Some(&snapshot));
    assert_eq!(err.abstract_desc(), "pattern");
    assert_eq!(err.concrete_desc(), "target");
}

#[test]
fn labels_use_rust_string_escapes() {
    let snapshot =
        AssignmentSnapshot::default().assigned_node("del\u{7f}", "zero\u{200b}width");
    let err = SolveError::<Cause>::new("line\nbreak", "target", None, Some(snapshot));
    assert_eq!(
        err.to_string(),
        "Could not satisfy \"line\\nbreak\" from \"target\"\n\
         Max assignment:\n\
         Node \"del\\u{7f}\" is assigned to \"zero\\u{200b}width\"\n"
    );
}
