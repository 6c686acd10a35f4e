//! Conditional evaluation and branch skipping: `\if`-family
//! primitives, `\ifcase`, and the raw-token skip-scanner shared by both.

use super::numeric::parse_number;
use super::Mouth;
use crate::env::{CsDef, Environment};
use crate::error::{Error, Result};
use crate::position::Position;
use crate::primitives::Primitive;
use crate::token::{Token, TokenKind};

/// Evaluates the conditional named by `primitive` (the `\if...` token
/// itself already consumed) and pushes back whichever branch it selects.
pub fn evaluate(mouth: &mut Mouth, env: &mut Environment, primitive: Primitive, position: Position) -> Result<()> {
    if primitive == Primitive::Ifcase {
        return evaluate_ifcase(mouth, env, position);
    }
    let condition = evaluate_boolean(mouth, env, primitive, &position)?;
    let (then_branch, else_branch) = skip_branches(mouth, env, 1)?;
    mouth.push_back(if condition { then_branch } else { else_branch });
    Ok(())
}

fn evaluate_boolean(mouth: &mut Mouth, env: &mut Environment, primitive: Primitive, position: &Position) -> Result<bool> {
    match primitive {
        Primitive::Iftrue => Ok(true),
        Primitive::Iffalse => Ok(false),
        Primitive::Ifnum => {
            let a = parse_number(mouth, env)?;
            let relation = read_relation(mouth, env)?;
            let b = parse_number(mouth, env)?;
            Ok(compare(a, b, relation))
        }
        Primitive::Ifdim => {
            let a = super::numeric::parse_dimension(mouth, env)?;
            let relation = read_relation(mouth, env)?;
            let b = super::numeric::parse_dimension(mouth, env)?;
            Ok(compare(a, b, relation))
        }
        Primitive::Ifodd => {
            let n = parse_number(mouth, env)?;
            Ok(n % 2 != 0)
        }
        Primitive::Ifvmode => Ok(matches!(env.mode, crate::env::Mode::VerticalMode { .. })),
        Primitive::Ifhmode => Ok(matches!(env.mode, crate::env::Mode::HorizontalMode { .. })),
        Primitive::Ifmmode => Ok(matches!(env.mode, crate::env::Mode::MathMode { .. })),
        Primitive::Ifinner => Ok(env.mode.is_inner()),
        Primitive::If => {
            let a = char_code_of(mouth, env)?;
            let b = char_code_of(mouth, env)?;
            Ok(a == b)
        }
        Primitive::Ifcat => {
            let a = category_code_of(mouth, env)?;
            let b = category_code_of(mouth, env)?;
            Ok(a == b)
        }
        Primitive::Ifx => {
            let a = mouth.read_raw(env)?.ok_or_else(|| unexpected_eof(position))?;
            let b = mouth.read_raw(env)?.ok_or_else(|| unexpected_eof(position))?;
            Ok(same_meaning(env, &a, &b))
        }
        _ => Err(Error::Internal(format!("{} is not a boolean conditional", primitive.name()))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Less,
    Equal,
    Greater,
}

fn compare<T: PartialOrd>(a: T, b: T, relation: Relation) -> bool {
    match relation {
        Relation::Less => a < b,
        Relation::Equal => a == b,
        Relation::Greater => a > b,
    }
}

fn read_relation(mouth: &mut Mouth, env: &mut Environment) -> Result<Relation> {
    while matches!(mouth_peek_char(mouth, env)?, Some(' ')) {
        mouth.read(env)?;
    }
    match mouth.read(env)? {
        Some(token) => match token.as_character() {
            Some(('<', _)) => Ok(Relation::Less),
            Some(('=', _)) => Ok(Relation::Equal),
            Some(('>', _)) => Ok(Relation::Greater),
            _ => Err(Error::Parse {
                position: token.position.clone(),
                message: "missing = inserted for ifnum/ifdim".to_owned(),
            }),
        },
        None => Err(unexpected_eof(&Position::initial())),
    }
}

fn mouth_peek_char(mouth: &mut Mouth, env: &mut Environment) -> Result<Option<char>> {
    Ok(mouth.peek(env)?.and_then(|t| t.as_character().map(|(c, _)| c)))
}

/// Character code of a raw token per `\if`'s comparison rule: a control
/// sequence compares as its `\let`-aliased character if any, else as code
/// 255.
fn char_code_of(mouth: &mut Mouth, env: &mut Environment) -> Result<u32> {
    let Some(token) = mouth.read(env)? else {
        return Err(unexpected_eof(&Position::initial()));
    };
    Ok(match &token.kind {
        TokenKind::Character(c, _) => *c as u32,
        TokenKind::ControlSequence { name, .. } => match env.lookup_cs(name) {
            Some(CsDef::CharAlias(c, _)) => *c as u32,
            _ => 255,
        },
        _ => 255,
    })
}

fn category_code_of(mouth: &mut Mouth, env: &mut Environment) -> Result<u8> {
    let Some(token) = mouth.read(env)? else {
        return Err(unexpected_eof(&Position::initial()));
    };
    Ok(match &token.kind {
        TokenKind::Character(_, cat) => u8::from(*cat),
        _ => 16,
    })
}

/// `\ifx`: deep equality on the meaning of two raw (unexpanded) tokens.
fn same_meaning(env: &Environment, a: &Token, b: &Token) -> bool {
    match (&a.kind, &b.kind) {
        (TokenKind::Character(c1, cat1), TokenKind::Character(c2, cat2)) => c1 == c2 && cat1 == cat2,
        (TokenKind::Parameter(i1), TokenKind::Parameter(i2)) => i1 == i2,
        (TokenKind::ControlSequence { name: n1, .. }, TokenKind::ControlSequence { name: n2, .. }) => {
            match (env.lookup_cs(n1), env.lookup_cs(n2)) {
                (None, None) => true,
                (Some(d1), Some(d2)) => same_def(d1, d2),
                _ => false,
            }
        }
        _ => false,
    }
}

fn same_def(a: &CsDef, b: &CsDef) -> bool {
    match (a, b) {
        (CsDef::Macro(m1), CsDef::Macro(m2)) => {
            m1.long == m2.long && m1.outer == m2.outer && m1.parameter_text == m2.parameter_text
                && m1.replacement_reversed == m2.replacement_reversed
        }
        (CsDef::Primitive(p1), CsDef::Primitive(p2)) => p1 == p2,
        (CsDef::CharAlias(c1, cat1), CsDef::CharAlias(c2, cat2)) => c1 == c2 && cat1 == cat2,
        (CsDef::CounterRef(a), CsDef::CounterRef(b)) => a == b,
        (CsDef::DimensionRef(a), CsDef::DimensionRef(b)) => a == b,
        (CsDef::GlueRef(a), CsDef::GlueRef(b)) => a == b,
        (CsDef::MuglueRef(a), CsDef::MuglueRef(b)) => a == b,
        (CsDef::TokenListRef(a), CsDef::TokenListRef(b)) => a == b,
        (CsDef::MathCharRef(a), CsDef::MathCharRef(b)) => a == b,
        _ => false,
    }
}

fn unexpected_eof(position: &Position) -> Error {
    Error::Expansion {
        position: position.clone(),
        message: "end of input while reading a conditional".to_owned(),
    }
}

/// Scans raw tokens (expansion disabled) starting just after an `\if...`
/// head, tracking nested `\if`-openers, splitting on `\else`/`\fi` at
/// level 0, and returning `(then, else)` lists (either may be empty).
fn skip_branches(mouth: &mut Mouth, env: &mut Environment, start_level: u32) -> Result<(Vec<Token>, Vec<Token>)> {
    let mut then_branch = Vec::new();
    let mut else_branch = Vec::new();
    let mut in_else = false;
    let mut level = start_level;

    loop {
        let Some(token) = mouth.read_raw(env)? else {
            return Err(Error::Expansion {
                position: Position::initial(),
                message: "file ended while scanning a conditional".to_owned(),
            });
        };
        if let Some(name) = token.cs_name() {
            if let Some(CsDef::Primitive(prim_name)) = env.lookup_cs(name) {
                if let Some(primitive) = Primitive::from_name(prim_name) {
                    if primitive.is_if_opener() {
                        level += 1;
                    } else if primitive == Primitive::Fi {
                        level -= 1;
                        if level == 0 {
                            break;
                        }
                    } else if primitive == Primitive::Else && level == 1 && !in_else {
                        in_else = true;
                        continue;
                    }
                }
            }
        }
        if in_else {
            else_branch.push(token);
        } else {
            then_branch.push(token);
        }
    }
    Ok((then_branch, else_branch))
}

/// `\ifcase n`: same scanner, but `\or` at level 1 separates case lists.
fn evaluate_ifcase(mouth: &mut Mouth, env: &mut Environment, position: Position) -> Result<()> {
    let n = parse_number(mouth, env)?;
    let mut cases: Vec<Vec<Token>> = vec![Vec::new()];
    let mut else_branch = Vec::new();
    let mut in_else = false;
    let mut level = 1u32;

    loop {
        let Some(token) = mouth.read_raw(env)? else {
            return Err(Error::Expansion {
                position: position.clone(),
                message: "file ended while scanning \\ifcase".to_owned(),
            });
        };
        if let Some(name) = token.cs_name() {
            if let Some(CsDef::Primitive(prim_name)) = env.lookup_cs(name) {
                if let Some(primitive) = Primitive::from_name(prim_name) {
                    if primitive.is_if_opener() {
                        level += 1;
                    } else if primitive == Primitive::Fi {
                        level -= 1;
                        if level == 0 {
                            break;
                        }
                    } else if primitive == Primitive::Or && level == 1 && !in_else {
                        cases.push(Vec::new());
                        continue;
                    } else if primitive == Primitive::Else && level == 1 && !in_else {
                        in_else = true;
                        continue;
                    }
                }
            }
        }
        if in_else {
            else_branch.push(token);
        } else {
            cases.last_mut().expect("always at least one case").push(token);
        }
    }

    let selected = usize::try_from(n).ok().and_then(|i| cases.get(i)).cloned().unwrap_or(else_branch);
    mouth.push_back(selected);
    Ok(())
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

    fn read_chars(mouth: &mut Mouth, env: &mut Environment) -> Vec<char> {
        let mut out = Vec::new();
        while let Some(t) = mouth.read(env).unwrap() {
            out.push(t.as_character().unwrap().0);
        }
        out
    }

    #[test]
    fn ifnum_true_takes_then_branch() {
        let (mut mouth, mut env) = mouth_with("1<2 yes\\else no\\fi");
        evaluate(&mut mouth, &mut env, Primitive::Ifnum, Position::initial()).unwrap();
        assert_eq!(read_chars(&mut mouth, &mut env), vec!['y', 'e', 's']);
    }

    #[test]
    fn ifnum_false_takes_else_branch() {
        let (mut mouth, mut env) = mouth_with("2<1 yes\\else no\\fi");
        evaluate(&mut mouth, &mut env, Primitive::Ifnum, Position::initial()).unwrap();
        assert_eq!(read_chars(&mut mouth, &mut env), vec!['n', 'o']);
    }

    #[test]
    fn ifcase_out_of_range_selects_else() {
        let (mut mouth, mut env) = mouth_with("5 a\\or b\\else c\\fi");
        evaluate_ifcase(&mut mouth, &mut env, Position::initial()).unwrap();
        assert_eq!(read_chars(&mut mouth, &mut env), vec!['c']);
    }

    #[test]
    fn ifcase_selects_nth_case() {
        let (mut mouth, mut env) = mouth_with("1 a\\or b\\else c\\fi");
        evaluate_ifcase(&mut mouth, &mut env, Position::initial()).unwrap();
        assert_eq!(read_chars(&mut mouth, &mut env), vec!['b']);
    }
}
