//! Boundary behaviors and invariants that aren't already covered by the
//! scenario tests.

use texcore::category::Category;
use texcore::chars::InputSource;
use texcore::command::Command;
use texcore::env::Environment;
use texcore::mouth::Mouth;

fn commands_for(source: &str) -> Vec<Command> {
    let mut env = Environment::new("boundary");
    env.inputs.push(InputSource::new(source, None));
    let mut mouth = Mouth::new();
    let mut commands = Vec::new();
    while let Some(positioned) = mouth.next_command(&mut env).unwrap() {
        commands.push(positioned.command);
    }
    commands
}

#[test]
fn catcode_out_of_range_is_a_range_error() {
    let mut env = Environment::new("boundary");
    env.inputs.push(InputSource::new(r"\catcode`a=16 ", None));
    let mut mouth = Mouth::new();
    let mut out = Vec::new();
    let err = texcore::stomach::run(&mut mouth, &mut env, &mut out).unwrap_err();
    assert!(matches!(err, texcore::Error::Range { .. }));
}

#[test]
fn input_of_a_missing_file_is_an_io_error() {
    let mut env = Environment::new("boundary");
    env.inputs
        .push(InputSource::new(r"\input does-not-exist-anywhere.tex", None));
    let mut mouth = Mouth::new();
    let err = mouth.next_command(&mut env).unwrap_err();
    assert!(matches!(err, texcore::Error::InputNotFound { .. }));
}

#[test]
fn eof_inside_a_macro_argument_is_a_recoverable_error() {
    let mut env = Environment::new("boundary");
    env.inputs.push(InputSource::new(r"\def\foo#1{#1}\foo{AB", None));
    let mut mouth = Mouth::new();
    let err = mouth.next_command(&mut env).unwrap_err();
    assert!(err.position().is_some());
}

#[test]
fn ifcase_past_the_last_case_selects_else() {
    let commands = commands_for(r"\ifcase 5 a\or b\else c\fi");
    let chars: String = commands
        .iter()
        .filter_map(|c| match c {
            Command::Typeset(ch) => Some(*ch),
            _ => None,
        })
        .collect();
    assert_eq!(chars, "c");
}

#[test]
fn pushback_round_trips_in_order() {
    let mut env = Environment::new("boundary");
    env.inputs.push(InputSource::new("", None));
    let mut mouth = Mouth::new();

    let pos = || texcore::Position::new(1, 1, None);
    let a = texcore::Token::character('a', Category::Letter, pos());
    let b = texcore::Token::character('b', Category::Letter, pos());
    let c = texcore::Token::character('c', Category::Letter, pos());
    mouth.push_back(vec![a.clone(), b.clone(), c.clone()]);

    assert_eq!(mouth.read(&mut env).unwrap().unwrap(), a);
    assert_eq!(mouth.read(&mut env).unwrap().unwrap(), b);
    assert_eq!(mouth.read(&mut env).unwrap().unwrap(), c);
}

#[test]
fn group_scoping_reverts_local_writes_but_keeps_global_ones() {
    let mut env = Environment::new("boundary");
    env.set_counter(0, 1, false);
    env.enter_group();
    env.set_counter(0, 2, false);
    env.set_counter(1, 9, true);
    assert_eq!(env.counter(0), 2);
    env.leave_group();
    assert_eq!(env.counter(0), 1, "local write reverted on leaving the group");
    assert_eq!(env.counter(1), 9, "global write persists");
}
