//! The assignment grammar: the closed set of simple
//! assignments, `\advance`/`\multiply`/`\divide`, `\let`/`\futurelet`, the
//! `...def`-family register aliases, and font selection.

use super::numeric::{
    check_bit24, check_bit8, check_char_range, parse_char_argument, parse_dimension, parse_glue, parse_number,
    peek_char, skip_spaces,
};
use super::Mouth;
use crate::command::{Assignment, BoxKind, DimenVariable, IntVariable};
use crate::env::{CsDef, Environment};
use crate::error::{Error, Result};
use crate::position::Position;
use crate::primitives::Primitive;
use crate::token::Token;

/// Consumes an optional `=` (surrounded by optional spaces), per TeX's
/// assignment grammar.
fn eat_equals(mouth: &mut Mouth, env: &mut Environment) -> Result<()> {
    skip_spaces(mouth, env)?;
    if matches!(peek_char(mouth, env)?, Some('=')) {
        mouth.read(env)?;
    }
    Ok(())
}

pub(super) fn read_cs_name(mouth: &mut Mouth, env: &mut Environment, position: &Position) -> Result<String> {
    let Some(token) = mouth.read(env)? else {
        return Err(eof(position));
    };
    token
        .cs_name()
        .map(str::to_owned)
        .ok_or_else(|| Error::Parse {
            position: token.position.clone(),
            message: "expected a control sequence here".to_owned(),
        })
}

fn eof(position: &Position) -> Error {
    Error::Parse {
        position: position.clone(),
        message: "end of input while reading an assignment".to_owned(),
    }
}

/// Parses one simple assignment; the defining primitive itself is already
/// consumed by the caller (the command driver).
pub fn parse_assignment(
    mouth: &mut Mouth,
    env: &mut Environment,
    primitive: Primitive,
    position: &Position,
) -> Result<Assignment> {
    match primitive {
        Primitive::Count => {
            let n = check_bit8(parse_number(mouth, env)?, position)?;
            eat_equals(mouth, env)?;
            let value = parse_number(mouth, env)?;
            Ok(Assignment::Counter { register: n, value })
        }
        Primitive::Dimen => {
            let n = check_bit8(parse_number(mouth, env)?, position)?;
            eat_equals(mouth, env)?;
            let value = parse_dimension(mouth, env)?;
            Ok(Assignment::Dimension { register: n, value })
        }
        Primitive::Skip => {
            let n = check_bit8(parse_number(mouth, env)?, position)?;
            eat_equals(mouth, env)?;
            let value = parse_glue(mouth, env)?;
            Ok(Assignment::Skip { register: n, value })
        }
        Primitive::Muskip => {
            let n = check_bit8(parse_number(mouth, env)?, position)?;
            eat_equals(mouth, env)?;
            let value = parse_glue(mouth, env)?;
            Ok(Assignment::Muskip { register: n, value })
        }
        Primitive::Toks => {
            let n = check_bit8(parse_number(mouth, env)?, position)?;
            eat_equals(mouth, env)?;
            let value = super::group::parse_group(
                mouth,
                env,
                read_begin_group(mouth, env, position)?,
                false,
                false,
                false,
                false,
                false,
            )
            .map(unwrap_group_inner)?;
            Ok(Assignment::Tokens { register: n, value })
        }
        Primitive::Catcode => {
            let ch = parse_char_argument(mouth, env)?;
            eat_equals(mouth, env)?;
            let value = check_category_value(parse_number(mouth, env)?, position)?;
            Ok(Assignment::CatCode { ch, value })
        }
        Primitive::Mathcode => {
            let ch = parse_char_argument(mouth, env)?;
            eat_equals(mouth, env)?;
            let value = i32::from(check_bit15(parse_number(mouth, env)?, position)?);
            Ok(Assignment::MathCode { ch, value })
        }
        Primitive::Lccode => {
            let ch = parse_char_argument(mouth, env)?;
            eat_equals(mouth, env)?;
            let value = i32::from(check_char_range(parse_number(mouth, env)?, position)?);
            Ok(Assignment::LcCode { ch, value })
        }
        Primitive::Uccode => {
            let ch = parse_char_argument(mouth, env)?;
            eat_equals(mouth, env)?;
            let value = i32::from(check_char_range(parse_number(mouth, env)?, position)?);
            Ok(Assignment::UcCode { ch, value })
        }
        Primitive::Sfcode => {
            let ch = parse_char_argument(mouth, env)?;
            eat_equals(mouth, env)?;
            let value = check_bit24(parse_number(mouth, env)?, position)?;
            Ok(Assignment::SfCode { ch, value })
        }
        Primitive::Delcode => {
            let ch = parse_char_argument(mouth, env)?;
            eat_equals(mouth, env)?;
            let value = parse_number(mouth, env)?;
            Ok(Assignment::DelCode { ch, value })
        }
        Primitive::Chardef => {
            let name = read_cs_name(mouth, env, position)?;
            eat_equals(mouth, env)?;
            let value = parse_number(mouth, env)?;
            Ok(Assignment::CharDef { name, value })
        }
        Primitive::Countdef => {
            let name = read_cs_name(mouth, env, position)?;
            eat_equals(mouth, env)?;
            let register = check_bit8(parse_number(mouth, env)?, position)?;
            Ok(Assignment::CounterDef { name, register })
        }
        Primitive::Dimendef => {
            let name = read_cs_name(mouth, env, position)?;
            eat_equals(mouth, env)?;
            let register = check_bit8(parse_number(mouth, env)?, position)?;
            Ok(Assignment::DimensionDef { name, register })
        }
        Primitive::Skipdef => {
            let name = read_cs_name(mouth, env, position)?;
            eat_equals(mouth, env)?;
            let register = check_bit8(parse_number(mouth, env)?, position)?;
            Ok(Assignment::SkipDef { name, register })
        }
        Primitive::Muskipdef => {
            let name = read_cs_name(mouth, env, position)?;
            eat_equals(mouth, env)?;
            let register = check_bit8(parse_number(mouth, env)?, position)?;
            Ok(Assignment::MuskipDef { name, register })
        }
        Primitive::Toksdef => {
            let name = read_cs_name(mouth, env, position)?;
            eat_equals(mouth, env)?;
            let register = check_bit8(parse_number(mouth, env)?, position)?;
            Ok(Assignment::ToksDef { name, register })
        }
        Primitive::Mathchardef => {
            let name = read_cs_name(mouth, env, position)?;
            eat_equals(mouth, env)?;
            let value = i32::from(check_bit15(parse_number(mouth, env)?, position)?);
            Ok(Assignment::MathCharDef { name, value })
        }
        Primitive::Let => {
            let name = read_cs_name(mouth, env, position)?;
            skip_spaces(mouth, env)?;
            if matches!(peek_char(mouth, env)?, Some('=')) {
                mouth.read(env)?;
                if matches!(peek_char(mouth, env)?, Some(' ')) {
                    mouth.read(env)?;
                }
            }
            let target = mouth.read_raw(env)?.ok_or_else(|| eof(position))?;
            Ok(Assignment::Let { name, target: Box::new(target) })
        }
        Primitive::Futurelet => {
            let name = read_cs_name(mouth, env, position)?;
            let first = mouth.read_raw(env)?.ok_or_else(|| eof(position))?;
            let second = mouth.read_raw(env)?.ok_or_else(|| eof(position))?;
            mouth.push_back(vec![first.clone(), second.clone()]);
            Ok(Assignment::FutureLet { name, target: Box::new(second) })
        }
        Primitive::Advance | Primitive::Multiply | Primitive::Divide => {
            parse_arith_assignment(mouth, env, primitive, position)
        }
        Primitive::Font => {
            let name = read_cs_name(mouth, env, position)?;
            eat_equals(mouth, env)?;
            let family = read_filename(mouth, env)?;
            let at = if eat_keyword_local(mouth, env, "at")? {
                Some(parse_dimension(mouth, env)?)
            } else {
                None
            };
            let scaled = if at.is_none() && eat_keyword_local(mouth, env, "scaled")? {
                Some(parse_number(mouth, env)?)
            } else {
                None
            };
            Ok(Assignment::Font { name, family, at, scaled })
        }
        Primitive::Textfont | Primitive::Scriptfont | Primitive::Scriptscriptfont => {
            let family = check_bit8(parse_number(mouth, env)?, position)?;
            eat_equals(mouth, env)?;
            let font = read_cs_name(mouth, env, position)?;
            Ok(match primitive {
                Primitive::Textfont => Assignment::TextFont { family, font },
                Primitive::Scriptfont => Assignment::ScriptFont { family, font },
                _ => Assignment::ScriptScriptFont { family, font },
            })
        }
        Primitive::Fontdimen => {
            let index = parse_number(mouth, env)?;
            let font = read_cs_name(mouth, env, position)?;
            eat_equals(mouth, env)?;
            let value = parse_dimension(mouth, env)?;
            Ok(Assignment::FontDimen { index, font, value })
        }
        Primitive::Hyphenchar => {
            let font = read_cs_name(mouth, env, position)?;
            eat_equals(mouth, env)?;
            let value = parse_number(mouth, env)?;
            Ok(Assignment::HyphenChar { font, value })
        }
        Primitive::Skewchar => {
            let font = read_cs_name(mouth, env, position)?;
            eat_equals(mouth, env)?;
            let value = parse_number(mouth, env)?;
            Ok(Assignment::SkewChar { font, value })
        }
        Primitive::Setbox => {
            let register = check_bit8(parse_number(mouth, env)?, position)?;
            eat_equals(mouth, env)?;
            let kind = read_box_kind(mouth, env, position)?;
            Ok(Assignment::SetBox { register, kind })
        }
        Primitive::Read => {
            let stream = parse_number(mouth, env)?;
            let _ = eat_keyword_local(mouth, env, "to")?;
            let name = read_cs_name(mouth, env, position)?;
            Ok(Assignment::Read { stream, name })
        }
        Primitive::Ht | Primitive::Wd | Primitive::Dp => {
            let register = check_bit8(parse_number(mouth, env)?, position)?;
            eat_equals(mouth, env)?;
            let value = parse_dimension(mouth, env)?;
            let variable = match primitive {
                Primitive::Ht => DimenVariable::BoxHeight(register),
                Primitive::Wd => DimenVariable::BoxWidth(register),
                _ => DimenVariable::BoxDepth(register),
            };
            Ok(Assignment::BoxDimen { variable, value })
        }
        _ => Err(Error::Internal(format!("{} does not start an assignment", primitive.name()))),
    }
}

fn unwrap_group_inner(group: Token) -> Vec<Token> {
    match group.kind {
        crate::token::TokenKind::Group { inner, .. } => inner,
        _ => unreachable!("parse_group always returns a Group"),
    }
}

fn read_begin_group(mouth: &mut Mouth, env: &mut Environment, position: &Position) -> Result<Token> {
    skip_spaces(mouth, env)?;
    let Some(open) = mouth.read_raw(env)? else {
        return Err(eof(position));
    };
    if open.as_character().map(|(_, c)| c) != Some(crate::category::Category::BeginGroup) {
        return Err(Error::Parse {
            position: open.position.clone(),
            message: "missing { inserted".to_owned(),
        });
    }
    Ok(open)
}

fn read_box_kind(mouth: &mut Mouth, env: &mut Environment, position: &Position) -> Result<BoxKind> {
    skip_spaces(mouth, env)?;
    let Some(token) = mouth.read(env)? else {
        return Err(eof(position));
    };
    let Some(name) = token.cs_name() else {
        return Err(Error::Parse {
            position: token.position.clone(),
            message: "a box was supposed to be here".to_owned(),
        });
    };
    match env.lookup_cs(name).cloned() {
        Some(CsDef::Primitive("hbox")) => Ok(BoxKind::Hbox),
        Some(CsDef::Primitive("vbox")) => Ok(BoxKind::Vbox),
        Some(CsDef::Primitive("vtop")) => Ok(BoxKind::Vtop),
        _ => Err(Error::Parse {
            position: token.position.clone(),
            message: "a box was supposed to be here".to_owned(),
        }),
    }
}

fn check_category_value(value: i32, position: &Position) -> Result<i32> {
    super::numeric::check_category_range(value, position)?;
    Ok(value)
}

fn check_bit15(value: i32, position: &Position) -> Result<i32> {
    super::numeric::check_bit15(value, position)
}

fn eat_keyword_local(mouth: &mut Mouth, env: &mut Environment, keyword: &str) -> Result<bool> {
    skip_spaces(mouth, env)?;
    let mut consumed = Vec::new();
    for expected in keyword.chars() {
        match mouth.peek(env)? {
            Some(token) => match token.as_character() {
                Some((c, _)) if c.eq_ignore_ascii_case(&expected) => {
                    consumed.push(mouth.read(env)?.expect("just peeked"));
                }
                _ => {
                    mouth.push_back(consumed);
                    return Ok(false);
                }
            },
            None => {
                mouth.push_back(consumed);
                return Ok(false);
            }
        }
    }
    Ok(true)
}

fn read_filename(mouth: &mut Mouth, env: &mut Environment) -> Result<String> {
    skip_spaces(mouth, env)?;
    let mut name = String::new();
    loop {
        match mouth.peek(env)? {
            Some(token) => match token.as_character() {
                Some((' ', _)) => {
                    mouth.read(env)?;
                    break;
                }
                Some((c, _)) => {
                    mouth.read(env)?;
                    name.push(c);
                }
                None => break,
            },
            None => break,
        }
    }
    Ok(name)
}

fn parse_arith_assignment(
    mouth: &mut Mouth,
    env: &mut Environment,
    primitive: Primitive,
    position: &Position,
) -> Result<Assignment> {
    let (variable, dimen_variable) = read_arith_variable(mouth, env, position)?;
    let _ = eat_keyword_local(mouth, env, "by")?;
    if let Some(variable) = variable {
        let by = parse_number(mouth, env)?;
        return Ok(match primitive {
            Primitive::Advance => Assignment::Advance { variable, by },
            Primitive::Multiply => Assignment::Multiply { variable, by },
            _ => Assignment::Divide { variable, by },
        });
    }
    let variable = dimen_variable.expect("one of the two variable kinds is always set");
    match primitive {
        Primitive::Advance => {
            let by = parse_dimension(mouth, env)?;
            Ok(Assignment::AdvanceDimen { variable, by })
        }
        Primitive::Multiply => {
            let by = parse_number(mouth, env)?;
            Ok(Assignment::MultiplyDimen { variable, by })
        }
        _ => {
            let by = parse_number(mouth, env)?;
            Ok(Assignment::DivideDimen { variable, by })
        }
    }
}

/// Reads the variable `\advance`/`\multiply`/`\divide` targets: either an
/// integer-valued variable or a dimension-valued one.
fn read_arith_variable(
    mouth: &mut Mouth,
    env: &mut Environment,
    position: &Position,
) -> Result<(Option<IntVariable>, Option<DimenVariable>)> {
    skip_spaces(mouth, env)?;
    let Some(token) = mouth.read(env)? else {
        return Err(eof(position));
    };
    let Some(name) = token.cs_name() else {
        return Err(Error::Parse {
            position: token.position.clone(),
            message: "you can't use that after \\advance".to_owned(),
        });
    };
    match env.lookup_cs(name).cloned() {
        Some(CsDef::CounterRef(n)) => Ok((Some(IntVariable::Counter(n)), None)),
        Some(CsDef::DimensionRef(n)) => Ok((None, Some(DimenVariable::Register(n)))),
        Some(CsDef::Primitive("count")) => {
            let n = check_bit8(parse_number(mouth, env)?, position)?;
            Ok((Some(IntVariable::Counter(n)), None))
        }
        Some(CsDef::Primitive("dimen")) => {
            let n = check_bit8(parse_number(mouth, env)?, position)?;
            Ok((None, Some(DimenVariable::Register(n))))
        }
        Some(CsDef::Primitive("catcode")) => {
            let ch = parse_char_argument(mouth, env)?;
            Ok((Some(IntVariable::CatCode(ch)), None))
        }
        Some(CsDef::Primitive("mathcode")) => {
            let ch = parse_char_argument(mouth, env)?;
            Ok((Some(IntVariable::MathCode(ch)), None))
        }
        Some(CsDef::Primitive("lccode")) => {
            let ch = parse_char_argument(mouth, env)?;
            Ok((Some(IntVariable::LcCode(ch)), None))
        }
        Some(CsDef::Primitive("uccode")) => {
            let ch = parse_char_argument(mouth, env)?;
            Ok((Some(IntVariable::UcCode(ch)), None))
        }
        Some(CsDef::Primitive("sfcode")) => {
            let ch = parse_char_argument(mouth, env)?;
            Ok((Some(IntVariable::SfCode(ch)), None))
        }
        Some(CsDef::Primitive("delcode")) => {
            let ch = parse_char_argument(mouth, env)?;
            Ok((Some(IntVariable::DelCode(ch)), None))
        }
        Some(CsDef::Primitive("spacefactor")) => Ok((Some(IntVariable::SpecialInteger("spacefactor")), None)),
        Some(CsDef::Primitive("inputlineno")) => Ok((Some(IntVariable::SpecialInteger("inputlineno")), None)),
        Some(CsDef::Primitive("badness")) => Ok((Some(IntVariable::SpecialInteger("badness")), None)),
        _ => Err(Error::Parse {
            position: token.position.clone(),
            message: format!("you can't use `\\{name}' after \\advance, \\multiply, or \\divide"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chars::InputSource;

    fn mouth_with(source: &str) -> (Mouth, Environment) {
        let mut env = Environment::new("job");
        env.inputs.push(InputSource::new(source, None));
        (Mouth::new(), env)
    }

    #[test]
    fn parses_count_assignment() {
        let (mut mouth, mut env) = mouth_with("5=42 ");
        let assignment = parse_assignment(&mut mouth, &mut env, Primitive::Count, &Position::initial()).unwrap();
        assert_eq!(assignment, Assignment::Counter { register: 5, value: 42 });
    }

    #[test]
    fn parses_let_to_primitive() {
        let (mut mouth, mut env) = mouth_with("\\foo=\\relax");
        let assignment = parse_assignment(&mut mouth, &mut env, Primitive::Let, &Position::initial()).unwrap();
        match assignment {
            Assignment::Let { name, target } => {
                assert_eq!(name, "foo");
                assert_eq!(target.cs_name(), Some("relax"));
            }
            _ => panic!("expected Let"),
        }
    }

    #[test]
    fn parses_advance_on_counter() {
        let (mut mouth, mut env) = mouth_with("\\count0 by 3 ");
        let assignment = parse_assignment(&mut mouth, &mut env, Primitive::Advance, &Position::initial()).unwrap();
        assert_eq!(
            assignment,
            Assignment::Advance { variable: IntVariable::Counter(0), by: 3 }
        );
    }
}
