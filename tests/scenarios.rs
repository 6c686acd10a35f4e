//! End-to-end pipeline scenarios: feed raw source through the
//! Eyes/Mouth/Stomach stack and check the resulting `Command`/typeset
//! stream.

use texcore::category::Category;
use texcore::chars::InputSource;
use texcore::command::Command;
use texcore::env::Environment;
use texcore::mouth::Mouth;

fn commands_for(source: &str) -> Vec<Command> {
    let mut env = Environment::new("scenario");
    env.inputs.push(InputSource::new(source, None));
    let mut mouth = Mouth::new();
    let mut commands = Vec::new();
    while let Some(positioned) = mouth.next_command(&mut env).unwrap() {
        commands.push(positioned.command);
    }
    commands
}

fn typeset_chars(commands: &[Command]) -> String {
    commands
        .iter()
        .filter_map(|c| match c {
            Command::Typeset(ch) => Some(*ch),
            _ => None,
        })
        .collect()
}

#[test]
fn scenario_1_macro_argument_substitution() {
    let commands = commands_for(r"\def\foo#1{x#1x}\foo{AB}");
    assert_eq!(typeset_chars(&commands), "xABx");
}

#[test]
fn scenario_2_count_register_and_number() {
    let commands = commands_for(r"\count0=5 \number\count0");
    assert_eq!(typeset_chars(&commands), "5");
}

#[test]
fn scenario_3_ifnum_true_branch() {
    let commands = commands_for(r"\ifnum 1<2 yes\else no\fi");
    assert_eq!(typeset_chars(&commands), "yes");
}

#[test]
fn scenario_4_let_aliases_a_macro() {
    let commands = commands_for(r"\def\a{A}\let\b=\a \b");
    assert_eq!(typeset_chars(&commands), "A");
}

#[test]
fn scenario_5_active_character_scoped_to_its_group() {
    let mut env = Environment::new("scenario");
    env.inputs.push(InputSource::new("{\\catcode`!=13 !}!", None));
    let mut mouth = Mouth::new();

    let mut tokens = Vec::new();
    while let Some(token) = mouth.read(&mut env).unwrap() {
        tokens.push(token);
    }

    // Inside the group, `!` was made active (catcode 13) and read back as a
    // control sequence named "!"; outside, the second `!` is plain Other.
    let active = tokens
        .iter()
        .find_map(|t| t.cs_name().filter(|name| *name == "!"));
    assert_eq!(active, Some("!"));

    let plain = tokens.iter().rev().find_map(|t| t.as_character());
    assert_eq!(plain, Some(('!', Category::Other)));
}

#[test]
fn scenario_6_romannumeral_renders_lowercase_roman() {
    let commands = commands_for(r"\romannumeral 1994");
    assert_eq!(typeset_chars(&commands), "mcmxciv");
}

#[test]
fn scenario_7_expandafter_csname() {
    let commands = commands_for(r"\expandafter\def\csname foo\endcsname{42}\foo");
    assert_eq!(typeset_chars(&commands), "42");
}
