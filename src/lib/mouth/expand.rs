//! The non-conditional expandable primitives: `\input`/`\endinput`,
//! `\jobname`, `\romannumeral`, `\number`, `\string`, `\meaning`,
//! `\csname`, and `\the`.

use super::numeric::{check_bit8, parse_char_argument, parse_number};
use super::Mouth;
use crate::category::Category;
use crate::chars::InputSource;
use crate::dimension::{Amount, Dimension};
use crate::env::{CsDef, Environment, MacroDef};
use crate::error::{Error, Result};
use crate::position::Position;
use crate::primitives::Primitive;
use crate::token::{Token, TokenKind};

/// Builds character tokens for `s`, reclassifying every character as
/// [`Category::Other`] except space, which becomes [`Category::Space`] —
/// the rule TeX gives for `\string`, applied uniformly to every
/// text-producing expansion here.
fn text_tokens(s: &str, position: &Position) -> Vec<Token> {
    s.chars()
        .map(|c| {
            let category = if c == ' ' { Category::Space } else { Category::Other };
            Token::character(c, category, position.clone())
        })
        .collect()
}

/// `\jobname`: pushes the job name as character tokens.
pub fn jobname(mouth: &mut Mouth, env: &mut Environment, position: Position) -> Result<()> {
    let tokens = text_tokens(&env.jobname.clone(), &position);
    mouth.push_back(tokens);
    Ok(())
}

/// `\romannumeral n`: pushes `n` spelled in lowercase Roman numerals.
pub fn romannumeral(mouth: &mut Mouth, env: &mut Environment, position: Position) -> Result<()> {
    let n = parse_number(mouth, env)?;
    let spelled = to_roman(n);
    mouth.push_back(text_tokens(&spelled, &position));
    Ok(())
}

fn to_roman(mut n: i32) -> String {
    const TABLE: &[(i32, &str)] = &[
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    if n <= 0 {
        return out;
    }
    for (value, symbol) in TABLE {
        while n >= *value {
            out.push_str(symbol);
            n -= value;
        }
    }
    out
}

/// `\number n`: pushes the decimal digits of `n`, with a leading `-` if
/// negative.
pub fn number(mouth: &mut Mouth, env: &mut Environment, position: Position) -> Result<()> {
    let n = parse_number(mouth, env)?;
    mouth.push_back(text_tokens(&n.to_string(), &position));
    Ok(())
}

/// `\string t`.
pub fn string(mouth: &mut Mouth, env: &mut Environment, position: Position) -> Result<()> {
    let Some(token) = mouth.read_raw(env)? else {
        return Err(eof(&position, "\\string"));
    };
    let rendered = match &token.kind {
        TokenKind::ControlSequence { name, active } => {
            if *active {
                name.clone()
            } else {
                let escape = char::from_u32(u32::try_from(env.escapechar).unwrap_or(u32::from(b'\\')))
                    .unwrap_or('\\');
                format!("{escape}{name}")
            }
        }
        TokenKind::Character(c, _) => c.to_string(),
        _ => String::new(),
    };
    mouth.push_back(text_tokens(&rendered, &position));
    Ok(())
}

/// `\meaning t`.
pub fn meaning(mouth: &mut Mouth, env: &mut Environment, position: Position) -> Result<()> {
    let Some(token) = mouth.read_raw(env)? else {
        return Err(eof(&position, "\\meaning"));
    };
    let rendered = meaning_text(env, &token);
    mouth.push_back(text_tokens(&rendered, &position));
    Ok(())
}

fn category_description(c: Category) -> &'static str {
    match c {
        Category::Escape => "escape character",
        Category::BeginGroup => "begin-group character",
        Category::EndGroup => "end-group character",
        Category::MathShift => "math shift character",
        Category::AlignmentTab => "alignment tab character",
        Category::EndOfLine => "end-of-line character",
        Category::Parameter => "macro parameter character",
        Category::Superscript => "superscript character",
        Category::Subscript => "subscript character",
        Category::Ignored => "the character",
        Category::Space => "space character",
        Category::Letter => "the letter",
        Category::Other => "the character",
        Category::Active => "active character",
        Category::Comment => "comment character",
        Category::Invalid => "invalid character",
    }
}

pub(crate) fn meaning_text(env: &Environment, token: &Token) -> String {
    match &token.kind {
        TokenKind::Character(c, cat) => format!("{} {c}", category_description(*cat)),
        TokenKind::Parameter(i) => format!("macro parameter character #{i}"),
        TokenKind::Group { .. } => "a group".to_owned(),
        TokenKind::ControlSequence { name, .. } => match env.lookup_cs(name) {
            None => "undefined".to_owned(),
            Some(CsDef::Primitive(p)) => format!("\\{p}"),
            Some(CsDef::Macro(def)) => format_macro_meaning(def),
            Some(CsDef::CharAlias(c, _)) => format!("\\char\"{:X}", *c as u32),
            Some(CsDef::CsAlias(target)) => meaning_text(env, target),
            Some(CsDef::CounterRef(n)) => format!("\\count{n}"),
            Some(CsDef::DimensionRef(n)) => format!("\\dimen{n}"),
            Some(CsDef::GlueRef(n)) => format!("\\skip{n}"),
            Some(CsDef::MuglueRef(n)) => format!("\\muskip{n}"),
            Some(CsDef::TokenListRef(n)) => format!("\\toks{n}"),
            Some(CsDef::MathCharRef(n)) => format!("\\mathchar\"{n:X}"),
            Some(CsDef::FontRef { family, .. }) => format!("select font {family}"),
        },
    }
}

fn format_macro_meaning(def: &MacroDef) -> String {
    let mut forward_replacement = def.replacement_reversed.clone();
    forward_replacement.reverse();
    let prefix = match (def.long, def.outer) {
        (true, true) => "\\long\\outer macro:",
        (true, false) => "\\long macro:",
        (false, true) => "\\outer macro:",
        (false, false) => "macro:",
    };
    format!(
        "{prefix}{}->{}",
        render_tokens(&def.parameter_text),
        render_tokens(&forward_replacement)
    )
}

pub(crate) fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        match &token.kind {
            TokenKind::Character(c, _) => out.push(*c),
            TokenKind::Parameter(i) => {
                out.push('#');
                out.push_str(&i.to_string());
            }
            TokenKind::ControlSequence { name, .. } => {
                out.push('\\');
                out.push_str(name);
                out.push(' ');
            }
            TokenKind::Group { inner, .. } => {
                out.push('{');
                out.push_str(&render_tokens(inner));
                out.push('}');
            }
        }
    }
    out
}

/// `\csname ... \endcsname`: reads expanded tokens until `\endcsname`,
/// concatenating character tokens into a control-sequence name.
pub fn csname(mouth: &mut Mouth, env: &mut Environment, position: Position) -> Result<()> {
    let mut name = String::new();
    loop {
        let Some(token) = mouth.read(env)? else {
            return Err(eof(&position, "\\csname"));
        };
        if token.cs_name() == Some("endcsname") {
            break;
        }
        match token.as_character() {
            Some((c, _)) => name.push(c),
            None => {
                return Err(Error::Expansion {
                    position: token.position.clone(),
                    message: "missing \\endcsname inserted".to_owned(),
                });
            }
        }
    }
    mouth.push_back(vec![Token::control_sequence(name, false, position)]);
    Ok(())
}

/// `\input`: reads a filename as the longest run of character tokens
/// terminated by a space or control sequence, pushes the file onto the
/// environment's input stack.
pub fn input(mouth: &mut Mouth, env: &mut Environment, position: Position) -> Result<()> {
    let mut name = String::new();
    loop {
        match mouth.read(env)? {
            Some(token) => match token.as_character() {
                Some((' ', _)) => break,
                Some((c, _)) => name.push(c),
                None => {
                    mouth.push_back(vec![token]);
                    break;
                }
            },
            None => break,
        }
    }
    if !name.contains('.') {
        name.push_str(".tex");
    }
    let contents = env
        .allow_input
        .then(|| read_input_file(env, &name))
        .flatten()
        .ok_or_else(|| Error::InputNotFound {
            position: position.clone(),
            filename: name.clone(),
        })?;
    log::debug!("including file {name} at {position}");
    env.inputs.push(InputSource::new(contents, Some(name)));
    Ok(())
}

/// Resolves `name` against the current directory, then each entry of
/// `env.input_path` in order, returning the first file that exists.
fn read_input_file(env: &Environment, name: &str) -> Option<String> {
    std::fs::read_to_string(name).ok().or_else(|| {
        env.input_path
            .iter()
            .find_map(|dir| std::fs::read_to_string(dir.join(name)).ok())
    })
}

/// `\endinput`: the eyes close the current input at the next end-of-line.
pub fn endinput(env: &mut Environment) {
    env.endinput_pending = true;
}

fn eof(position: &Position, what: &str) -> Error {
    Error::Expansion {
        position: position.clone(),
        message: format!("end of input while reading the argument of {what}"),
    }
}

/// `\the`: the textual representation of an internal quantity. Token-list
/// registers are pushed back verbatim; everything else is rendered as
/// character tokens.
pub fn the(mouth: &mut Mouth, env: &mut Environment, position: Position) -> Result<()> {
    let Some(token) = mouth.read_raw(env)? else {
        return Err(eof(&position, "\\the"));
    };
    let Some(name) = token.cs_name() else {
        return Err(Error::Parse {
            position: token.position.clone(),
            message: "you can't use `\\the' here except with an internal quantity".to_owned(),
        });
    };
    match env.lookup_cs(name).cloned() {
        Some(CsDef::CounterRef(n)) => push_int(mouth, env.counter(n), &position),
        Some(CsDef::DimensionRef(n)) => push_dimen(mouth, env.dimen(n), &position),
        Some(CsDef::GlueRef(n)) => push_glue(mouth, env.skip(n), &position),
        Some(CsDef::MuglueRef(n)) => push_glue(mouth, env.muskip(n), &position),
        Some(CsDef::TokenListRef(n)) => {
            mouth.push_back(env.toks(n));
            Ok(())
        }
        Some(CsDef::CharAlias(c, _)) => push_int(mouth, c as i32, &position),
        Some(CsDef::Primitive(prim_name)) => {
            let Some(primitive) = Primitive::from_name(prim_name) else {
                return unsupported(&token.position, name);
            };
            the_primitive(mouth, env, primitive, &position)
        }
        _ => unsupported(&token.position, name),
    }
}

fn unsupported(position: &Position, name: &str) -> Result<()> {
    Err(Error::Parse {
        position: position.clone(),
        message: format!("you can't use `\\{name}' after \\the"),
    })
}

fn the_primitive(mouth: &mut Mouth, env: &mut Environment, primitive: Primitive, position: &Position) -> Result<()> {
    match primitive {
        Primitive::Count => {
            let n = check_bit8(parse_number(mouth, env)?, position)?;
            push_int(mouth, env.counter(n), position)
        }
        Primitive::Dimen => {
            let n = check_bit8(parse_number(mouth, env)?, position)?;
            push_dimen(mouth, env.dimen(n), position)
        }
        Primitive::Skip => {
            let n = check_bit8(parse_number(mouth, env)?, position)?;
            push_glue(mouth, env.skip(n), position)
        }
        Primitive::Muskip => {
            let n = check_bit8(parse_number(mouth, env)?, position)?;
            push_glue(mouth, env.muskip(n), position)
        }
        Primitive::Toks => {
            let n = check_bit8(parse_number(mouth, env)?, position)?;
            mouth.push_back(env.toks(n));
            Ok(())
        }
        Primitive::Catcode => {
            let c = parse_char_argument(mouth, env)?;
            push_int(mouth, env.category_of(c) as i32, position)
        }
        Primitive::Mathcode => {
            let c = parse_char_argument(mouth, env)?;
            push_int(mouth, env.mathcode_of(c), position)
        }
        Primitive::Lccode => {
            let c = parse_char_argument(mouth, env)?;
            push_int(mouth, env.lccode_of(c), position)
        }
        Primitive::Uccode => {
            let c = parse_char_argument(mouth, env)?;
            push_int(mouth, env.uccode_of(c), position)
        }
        Primitive::Sfcode => {
            let c = parse_char_argument(mouth, env)?;
            push_int(mouth, env.sfcode_of(c), position)
        }
        Primitive::Delcode => {
            let c = parse_char_argument(mouth, env)?;
            push_int(mouth, env.delcode_of(c), position)
        }
        Primitive::Spacefactor => push_int(mouth, env.space_factor, position),
        Primitive::Inputlineno => push_int(mouth, env.input_line_no, position),
        Primitive::Badness => push_int(mouth, env.badness, position),
        _ => unsupported(position, primitive.name()),
    }
}

fn push_int(mouth: &mut Mouth, value: i32, position: &Position) -> Result<()> {
    mouth.push_back(text_tokens(&value.to_string(), position));
    Ok(())
}

fn push_dimen(mouth: &mut Mouth, value: Dimension, position: &Position) -> Result<()> {
    mouth.push_back(text_tokens(&format_dimension(value), position));
    Ok(())
}

fn push_glue(mouth: &mut Mouth, glue: crate::dimension::Glue, position: &Position) -> Result<()> {
    let mut s = format_dimension(glue.value);
    if glue.stretch != Amount::zero() {
        s.push_str(" plus ");
        s.push_str(&format_amount(glue.stretch));
    }
    if glue.shrink != Amount::zero() {
        s.push_str(" minus ");
        s.push_str(&format_amount(glue.shrink));
    }
    mouth.push_back(text_tokens(&s, position));
    Ok(())
}

fn format_amount(amount: Amount) -> String {
    match amount {
        Amount::Fixed(d) => format_dimension(d),
        Amount::Infinite { factor, order } => {
            let suffix = match order {
                1 => "fil",
                2 => "fill",
                _ => "filll",
            };
            format!("{}.0{suffix}", factor / 65536)
        }
    }
}

/// Renders a scaled-point value the way TeX prints dimensions: up to five
/// fractional decimal digits, trailing zeros trimmed, `pt` suffix.
fn format_dimension(sp: Dimension) -> String {
    let negative = sp < 0;
    let magnitude = i64::from(sp.unsigned_abs());
    let whole = magnitude / 65536;
    let mut remainder = (magnitude % 65536) * 10;
    let mut digits = String::new();
    for _ in 0..5 {
        let digit = remainder / 65536;
        digits.push(char::from_digit(u32::try_from(digit).unwrap_or(0), 10).unwrap_or('0'));
        remainder = (remainder % 65536) * 10;
    }
    while digits.ends_with('0') {
        digits.pop();
    }
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&whole.to_string());
    out.push('.');
    out.push_str(if digits.is_empty() { "0" } else { &digits });
    out.push_str("pt");
    out
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
    fn roman_numeral_1994() {
        assert_eq!(to_roman(1994), "mcmxciv");
    }

    #[test]
    fn number_pushes_decimal_digits() {
        let (mut mouth, mut env) = mouth_with("-42 ");
        number(&mut mouth, &mut env, Position::initial()).unwrap();
        let mut chars = Vec::new();
        while let Some(t) = mouth.read(&mut env).unwrap() {
            chars.push(t.as_character().unwrap().0);
        }
        assert_eq!(chars, vec!['-', '4', '2']);
    }

    #[test]
    fn dimension_formats_as_decimal_points() {
        assert_eq!(format_dimension(65536), "1.0pt");
        assert_eq!(format_dimension(65536 / 2), "0.5pt");
    }

    #[test]
    fn meaning_of_undefined_cs() {
        let env = Environment::new("job");
        let token = Token::control_sequence("frobnicate", false, Position::initial());
        assert_eq!(meaning_text(&env, &token), "undefined");
    }

    #[test]
    fn meaning_of_primitive() {
        let env = Environment::new("job");
        let token = Token::control_sequence("relax", false, Position::initial());
        assert_eq!(meaning_text(&env, &token), "\\relax");
    }
}
