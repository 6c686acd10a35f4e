//! The Stomach: executes the [`Command`] stream the Mouth's command driver
//! produces, writing typeset output and terminal messages to a sink and
//! applying assignments to the [`Environment`].
//!
//! Box layout, paragraph building, and alignment are out of scope;
//! `Par`/`StartBox` are therefore accepted and pass through as markers
//! rather than producing any layout.

use crate::command::{Assignment, Command, DimenVariable, IntVariable, PositionedCommand};
use crate::env::{CsDef, Environment};
use crate::error::{Error, Result};
use crate::mouth::{meaning_text, render_tokens, Mouth};
use crate::token::{Token, TokenKind};
use std::io::Write;

/// Runs the full pipeline (Eyes → Mouth → Stomach) to completion, writing
/// typeset characters and terminal output to `out`. Stops at `\end` or at
/// end of input, whichever comes first.
pub fn run(mouth: &mut Mouth, env: &mut Environment, out: &mut dyn Write) -> Result<()> {
    while let Some(positioned) = mouth.next_command(env)? {
        if execute(mouth, env, positioned, out)?.is_end() {
            break;
        }
    }
    Ok(())
}

/// Whether the command loop should keep going or stop, per `Command::End`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    End,
}

impl Flow {
    fn is_end(self) -> bool {
        self == Self::End
    }
}

fn io(e: std::io::Error) -> Error {
    Error::Io(e)
}

/// Executes a single [`Command`] against `env`, writing any output to `out`.
fn execute(mouth: &mut Mouth, env: &mut Environment, positioned: PositionedCommand, out: &mut dyn Write) -> Result<Flow> {
    let PositionedCommand { command, position } = positioned;
    match command {
        Command::Typeset(c) => {
            write!(out, "{c}").map_err(io)?;
            Ok(Flow::Continue)
        }
        Command::Par => {
            writeln!(out).map_err(io)?;
            writeln!(out).map_err(io)?;
            Ok(Flow::Continue)
        }
        Command::Relax => Ok(Flow::Continue),
        Command::End => Ok(Flow::End),
        Command::Cs(name) => {
            // `\noindent`/`\indent` affect paragraph shape only, which is
            // out of scope; they're otherwise harmless no-ops here.
            if name == "noindent" || name == "indent" {
                Ok(Flow::Continue)
            } else {
                Err(Error::Expansion {
                    position,
                    message: format!("Undefined control sequence \\{name}"),
                })
            }
        }
        Command::Message { tokens, error } => {
            let text = render_tokens(&tokens);
            if error {
                write!(out, "! {text}").map_err(io)?;
            } else {
                write!(out, "{text}").map_err(io)?;
            }
            Ok(Flow::Continue)
        }
        Command::Showthe(tokens) => {
            write!(out, ">").map_err(io)?;
            for token in &tokens {
                if let Some((c, _)) = token.as_character() {
                    write!(out, "{c}").map_err(io)?;
                }
            }
            writeln!(out, ".").map_err(io)?;
            Ok(Flow::Continue)
        }
        Command::Show(token) => {
            writeln!(out, "> {}.", meaning_text(env, &token)).map_err(io)?;
            Ok(Flow::Continue)
        }
        Command::Uppercase(tokens) => {
            mouth.push_back(map_case(tokens, env, Case::Upper));
            Ok(Flow::Continue)
        }
        Command::Lowercase(tokens) => {
            mouth.push_back(map_case(tokens, env, Case::Lower));
            Ok(Flow::Continue)
        }
        Command::Ignorespaces => Ok(Flow::Continue),
        Command::StartBox { .. } => Ok(Flow::Continue),
        Command::Assignment { assignment, global } => {
            apply_assignment(env, assignment, global, &position)?;
            if let Some(after) = env.after_assignment.take() {
                mouth.push_back(vec![after]);
            }
            Ok(Flow::Continue)
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Case {
    Upper,
    Lower,
}

/// Walks `tokens`, mapping each character by its `uccode`/`lccode` (a code
/// of 0 means "leave unchanged"), leaving control sequences untouched and
/// descending into groups. Groups are flattened back to their raw
/// begin/end tokens so the command driver re-enters/leaves scope normally
/// once this is read back.
fn map_case(tokens: Vec<Token>, env: &Environment, case: Case) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        let Token { kind, position } = token;
        match kind {
            TokenKind::Character(c, cat) => {
                let code = match case {
                    Case::Upper => env.uccode_of(c),
                    Case::Lower => env.lccode_of(c),
                };
                let mapped = if code > 0 {
                    char::from_u32(code as u32).unwrap_or(c)
                } else {
                    c
                };
                out.push(Token::character(mapped, cat, position));
            }
            TokenKind::Group { open, inner, close } => {
                out.push(*open);
                out.extend(map_case(inner, env, case));
                out.push(*close);
            }
            other => out.push(Token::new(other, position)),
        }
    }
    out
}

/// Applies one [`Assignment`] to `env`; `global` picks the root scope over
/// the leaf scope for the write.
fn apply_assignment(env: &mut Environment, assignment: Assignment, global: bool, position: &crate::position::Position) -> Result<()> {
    match assignment {
        Assignment::Counter { register, value } => env.set_counter(register, value, global),
        Assignment::Dimension { register, value } => env.set_dimen(register, value, global),
        Assignment::Skip { register, value } => env.set_skip(register, value, global),
        Assignment::Muskip { register, value } => env.set_muskip(register, value, global),
        Assignment::Tokens { register, value } => env.set_toks(register, value, global),
        Assignment::CatCode { ch, value } => {
            let category = crate::category::Category::try_from(value).map_err(|_| Error::Range {
                position: position.clone(),
                value: i64::from(value),
                range: "0..=15",
            })?;
            env.set_category(ch, category, global);
        }
        Assignment::MathCode { ch, value } => env.set_mathcode(ch, value, global),
        Assignment::LcCode { ch, value } => env.set_lccode(ch, value, global),
        Assignment::UcCode { ch, value } => env.set_uccode(ch, value, global),
        Assignment::SfCode { ch, value } => env.set_sfcode(ch, value, global),
        Assignment::DelCode { ch, value } => env.set_delcode(ch, value, global),
        Assignment::CharDef { name, value } => {
            let c = char::from_u32(value as u32).ok_or_else(|| Error::Range {
                position: position.clone(),
                value: i64::from(value),
                range: "0..=0x10FFFF",
            })?;
            env.define_cs(name, CsDef::CharAlias(c, env.category_of(c)), global);
        }
        Assignment::CounterDef { name, register } => env.define_cs(name, CsDef::CounterRef(register), global),
        Assignment::DimensionDef { name, register } => env.define_cs(name, CsDef::DimensionRef(register), global),
        Assignment::SkipDef { name, register } => env.define_cs(name, CsDef::GlueRef(register), global),
        Assignment::MuskipDef { name, register } => env.define_cs(name, CsDef::MuglueRef(register), global),
        Assignment::ToksDef { name, register } => env.define_cs(name, CsDef::TokenListRef(register), global),
        Assignment::MathCharDef { name, value } => env.define_cs(name, CsDef::MathCharRef(value), global),
        Assignment::Let { name, target } => bind_let(env, name, *target, global),
        Assignment::FutureLet { name, target } => bind_let(env, name, *target, global),
        Assignment::Advance { variable, by } => {
            let current = read_int_variable(env, &variable);
            write_int_variable(env, variable, current.wrapping_add(by), global);
        }
        Assignment::Multiply { variable, by } => {
            let current = read_int_variable(env, &variable);
            write_int_variable(env, variable, current.wrapping_mul(by), global);
        }
        Assignment::Divide { variable, by } => {
            let current = read_int_variable(env, &variable);
            write_int_variable(env, variable, current.checked_div(by).unwrap_or(0), global);
        }
        Assignment::AdvanceDimen { variable, by } => {
            let current = read_dimen_variable(env, &variable);
            write_dimen_variable(env, variable, current.wrapping_add(by), global);
        }
        Assignment::MultiplyDimen { variable, by } => {
            let current = read_dimen_variable(env, &variable);
            write_dimen_variable(env, variable, current.wrapping_mul(by), global);
        }
        Assignment::DivideDimen { variable, by } => {
            let current = read_dimen_variable(env, &variable);
            write_dimen_variable(env, variable, current.checked_div(by).unwrap_or(0), global);
        }
        Assignment::Font { name, family, at, scaled } => {
            env.define_cs(
                name.clone(),
                CsDef::FontRef {
                    family: family.clone(),
                    magnification: scaled,
                },
                global,
            );
            let record = env.font_mut(&name);
            record.at = at;
            record.scaled = scaled;
        }
        Assignment::TextFont { family, font } => env.set_text_font(family, font, global),
        Assignment::ScriptFont { family, font } => env.set_script_font(family, font, global),
        Assignment::ScriptScriptFont { family, font } => env.set_scriptscript_font(family, font, global),
        Assignment::FontDimen { index, font, value } => {
            env.font_mut(&font).dimens.insert(index, value);
        }
        Assignment::HyphenChar { font, value } => env.font_mut(&font).hyphenchar = value,
        Assignment::SkewChar { font, value } => env.font_mut(&font).skewchar = value,
        Assignment::BoxDimen { variable, value } => match variable {
            DimenVariable::BoxHeight(n) => env.set_box_height(n, value, global),
            DimenVariable::BoxWidth(n) => env.set_box_width(n, value, global),
            DimenVariable::BoxDepth(n) => env.set_box_depth(n, value, global),
            DimenVariable::Register(n) => env.set_dimen(n, value, global),
        },
        Assignment::SetBox { register, kind } => {
            // Box construction/layout is out of scope; only the fact
            // that a box was assigned to this register is kept,
            // by zeroing its dimensions the way an empty box would read.
            let _ = kind;
            env.set_box_height(register, 0, global);
            env.set_box_width(register, 0, global);
            env.set_box_depth(register, 0, global);
        }
        Assignment::Read { stream, name } => {
            let _ = stream;
            env.define_cs(name, CsDef::Macro(empty_macro()), global);
        }
    }
    Ok(())
}

/// `\let`/`\futurelet`'s binding rule: bind to the RHS
/// control sequence's existing definition when it has one, otherwise alias
/// the raw token itself (so a character token, or a still-undefined name,
/// is resolved dynamically the next time it's used).
fn bind_let(env: &mut Environment, name: String, target: Token, global: bool) {
    let def = target
        .cs_name()
        .and_then(|target_name| env.lookup_cs(target_name).cloned())
        .unwrap_or(CsDef::CsAlias(Box::new(target)));
    env.define_cs(name, def, global);
}

fn empty_macro() -> crate::env::MacroDef {
    crate::env::MacroDef {
        name: String::new(),
        parameter_text: Vec::new(),
        replacement_reversed: Vec::new(),
        long: false,
        outer: false,
    }
}

fn read_int_variable(env: &Environment, variable: &IntVariable) -> i32 {
    match variable {
        IntVariable::Counter(n) => env.counter(*n),
        IntVariable::SpecialInteger(name) => match *name {
            "spacefactor" => env.space_factor,
            "inputlineno" => env.input_line_no,
            "badness" => env.badness,
            _ => 0,
        },
        IntVariable::CatCode(c) => env.category_of(*c) as i32,
        IntVariable::MathCode(c) => env.mathcode_of(*c),
        IntVariable::LcCode(c) => env.lccode_of(*c),
        IntVariable::UcCode(c) => env.uccode_of(*c),
        IntVariable::SfCode(c) => env.sfcode_of(*c),
        IntVariable::DelCode(c) => env.delcode_of(*c),
        IntVariable::HyphenChar(font) => env.font(font).map_or(-1, |f| f.hyphenchar),
        IntVariable::SkewChar(font) => env.font(font).map_or(-1, |f| f.skewchar),
    }
}

fn write_int_variable(env: &mut Environment, variable: IntVariable, value: i32, global: bool) {
    match variable {
        IntVariable::Counter(n) => env.set_counter(n, value, global),
        IntVariable::SpecialInteger("spacefactor") => env.space_factor = value,
        IntVariable::SpecialInteger("inputlineno") => env.input_line_no = value,
        IntVariable::SpecialInteger("badness") => env.badness = value,
        IntVariable::SpecialInteger(_) => {}
        IntVariable::CatCode(c) => {
            if let Ok(category) = crate::category::Category::try_from(value) {
                env.set_category(c, category, global);
            }
        }
        IntVariable::MathCode(c) => env.set_mathcode(c, value, global),
        IntVariable::LcCode(c) => env.set_lccode(c, value, global),
        IntVariable::UcCode(c) => env.set_uccode(c, value, global),
        IntVariable::SfCode(c) => env.set_sfcode(c, value, global),
        IntVariable::DelCode(c) => env.set_delcode(c, value, global),
        IntVariable::HyphenChar(font) => env.font_mut(&font).hyphenchar = value,
        IntVariable::SkewChar(font) => env.font_mut(&font).skewchar = value,
    }
}

fn read_dimen_variable(env: &Environment, variable: &DimenVariable) -> crate::dimension::Dimension {
    match *variable {
        DimenVariable::Register(n) => env.dimen(n),
        DimenVariable::BoxHeight(n) => env.box_height(n),
        DimenVariable::BoxWidth(n) => env.box_width(n),
        DimenVariable::BoxDepth(n) => env.box_depth(n),
    }
}

fn write_dimen_variable(env: &mut Environment, variable: DimenVariable, value: crate::dimension::Dimension, global: bool) {
    match variable {
        DimenVariable::Register(n) => env.set_dimen(n, value, global),
        DimenVariable::BoxHeight(n) => env.set_box_height(n, value, global),
        DimenVariable::BoxWidth(n) => env.set_box_width(n, value, global),
        DimenVariable::BoxDepth(n) => env.set_box_depth(n, value, global),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chars::InputSource;

    fn run_source(source: &str) -> String {
        let mut env = Environment::new("job");
        env.inputs.push(InputSource::new(source, None));
        let mut mouth = Mouth::new();
        let mut out = Vec::new();
        run(&mut mouth, &mut env, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn typesets_plain_characters() {
        assert_eq!(run_source("ab\\end"), "ab");
    }

    #[test]
    fn macro_expansion_feeds_typesetting() {
        assert_eq!(run_source("\\def\\foo#1{x#1x}\\foo{AB}\\end"), "xABx");
    }

    #[test]
    fn counter_assignment_and_number_roundtrip() {
        assert_eq!(run_source("\\count0=5 \\number\\count0\\end"), "5");
    }

    #[test]
    fn conditional_selects_true_branch() {
        assert_eq!(run_source("\\ifnum 1<2 yes\\else no\\fi\\end"), "yes");
    }

    #[test]
    fn let_aliases_a_macro() {
        assert_eq!(run_source("\\def\\a{A}\\let\\b=\\a \\b\\end"), "A");
    }

    #[test]
    fn romannumeral_renders_lowercase_roman() {
        assert_eq!(run_source("\\romannumeral 1994\\end"), "mcmxciv");
    }

    #[test]
    fn expandafter_builds_a_csname_then_calls_it() {
        assert_eq!(
            run_source("\\expandafter\\def\\csname foo\\endcsname{42}\\foo\\end"),
            "42"
        );
    }

    #[test]
    fn uppercase_maps_letters_and_skips_control_sequences() {
        assert_eq!(run_source("\\uppercase{ab\\relax c}\\end"), "AB C");
    }

    #[test]
    fn undefined_control_sequence_is_an_error() {
        let mut env = Environment::new("job");
        env.inputs.push(InputSource::new("\\nosuchcs\\end", None));
        let mut mouth = Mouth::new();
        let mut out = Vec::new();
        assert!(run(&mut mouth, &mut env, &mut out).is_err());
    }
}
