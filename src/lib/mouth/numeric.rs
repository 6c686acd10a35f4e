//! Number, dimension, and glue parsing: consumes
//! expanded tokens from the [`Mouth`] and produces integers, scaled-point
//! dimensions, and glue triples, honoring internal registers and unit
//! keywords.

use super::Mouth;
use crate::category::Category;
use crate::dimension::{Amount, Dimension, Glue, Unit, MAX_DIMEN};
use crate::env::{CsDef, Environment};
use crate::error::{Error, Result};
use crate::primitives::Primitive;
use crate::token::Token;
use itertools::Itertools;

/// `bit8`: 0..255.
pub fn check_bit8(value: i32, position: &crate::position::Position) -> Result<u8> {
    u8::try_from(value).map_err(|_| range_error(position, value, "0..255"))
}

/// `bit15`: 0..32767.
pub fn check_bit15(value: i32, position: &crate::position::Position) -> Result<i32> {
    if (0..=32767).contains(&value) {
        Ok(value)
    } else {
        Err(range_error(position, value, "0..32767"))
    }
}

/// `bit24`: 0..2^24-1.
pub fn check_bit24(value: i32, position: &crate::position::Position) -> Result<i32> {
    if (0..(1 << 24)).contains(&value) {
        Ok(value)
    } else {
        Err(range_error(position, value, "0..2^24-1"))
    }
}

/// `char`: 0..65535.
pub fn check_char_range(value: i32, position: &crate::position::Position) -> Result<u16> {
    u16::try_from(value).map_err(|_| range_error(position, value, "0..65535"))
}

/// `catNumber`: 0..15.
pub fn check_category_range(value: i32, position: &crate::position::Position) -> Result<Category> {
    Category::try_from(value).map_err(|_| range_error(position, value, "0..15"))
}

fn range_error(position: &crate::position::Position, value: i32, range: &'static str) -> Error {
    Error::Range {
        position: position.clone(),
        value: i64::from(value),
        range,
    }
}

/// Reads a signed integer: `signs · unsigned-integer`.
pub fn parse_number(mouth: &mut Mouth, env: &mut Environment) -> Result<i32> {
    let negative = parse_signs(mouth, env)?;
    let value = parse_unsigned_integer(mouth, env)?;
    Ok(if negative { -value } else { value })
}

/// Reads `signs · (internal-dimension | numeric-constant unit)`.
pub fn parse_dimension(mouth: &mut Mouth, env: &mut Environment) -> Result<Dimension> {
    let negative = parse_signs(mouth, env)?;
    let sp = parse_unsigned_dimension(mouth, env)?;
    let sp = if negative { -sp } else { sp };
    Ok(clamp_dimen(sp))
}

/// Reads `dimen [ plus amount ] [ minus amount ]`.
pub fn parse_glue(mouth: &mut Mouth, env: &mut Environment) -> Result<Glue> {
    let value = parse_dimension(mouth, env)?;
    let stretch = if eat_keyword(mouth, env, "plus")? {
        parse_amount(mouth, env)?
    } else {
        Amount::zero()
    };
    let shrink = if eat_keyword(mouth, env, "minus")? {
        parse_amount(mouth, env)?
    } else {
        Amount::zero()
    };
    Ok(Glue { value, stretch, shrink })
}

fn parse_amount(mouth: &mut Mouth, env: &mut Environment) -> Result<Amount> {
    let negative = parse_signs(mouth, env)?;
    let (magnitude, is_decimal) = parse_decimal_constant(mouth, env)?;
    let _ = is_decimal;
    let order = if eat_keyword(mouth, env, "filll")? {
        3
    } else if eat_keyword(mouth, env, "fill")? {
        2
    } else if eat_keyword(mouth, env, "fil")? {
        1
    } else {
        0
    };
    if order > 0 {
        let factor = i32::try_from(magnitude >> 16).unwrap_or(i32::MAX);
        let factor = if negative { -factor } else { factor };
        return Ok(Amount::Infinite { factor, order });
    }
    let sp = apply_unit(mouth, env, magnitude)?;
    Ok(Amount::Fixed(clamp_dimen(if negative { -sp } else { sp })))
}

fn clamp_dimen(sp: i64) -> Dimension {
    sp.clamp(-MAX_DIMEN, MAX_DIMEN) as Dimension
}

fn parse_signs(mouth: &mut Mouth, env: &mut Environment) -> Result<bool> {
    let mut negative = false;
    loop {
        skip_spaces(mouth, env)?;
        match peek_char(mouth, env)? {
            Some('+') => {
                mouth.read(env)?;
            }
            Some('-') => {
                mouth.read(env)?;
                negative = !negative;
            }
            _ => break,
        }
    }
    Ok(negative)
}

pub(crate) fn skip_spaces(mouth: &mut Mouth, env: &mut Environment) -> Result<()> {
    while matches!(peek_char(mouth, env)?, Some(' ')) {
        mouth.read(env)?;
    }
    Ok(())
}

fn skip_one_optional_space(mouth: &mut Mouth, env: &mut Environment) -> Result<()> {
    if matches!(peek_char(mouth, env)?, Some(' ')) {
        mouth.read(env)?;
    }
    Ok(())
}

pub(crate) fn peek_char(mouth: &mut Mouth, env: &mut Environment) -> Result<Option<char>> {
    Ok(mouth.peek(env)?.and_then(|t| t.as_character().map(|(c, _)| c)))
}

/// Consumes `keyword` case-insensitively if it is next in the stream
/// (honoring leading spaces); otherwise leaves the stream untouched.
fn eat_keyword(mouth: &mut Mouth, env: &mut Environment, keyword: &str) -> Result<bool> {
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

fn parse_unsigned_integer(mouth: &mut Mouth, env: &mut Environment) -> Result<i32> {
    let (value, _) = parse_unsigned_integer_raw(mouth, env)?;
    i32::try_from(value).map_err(|_| Error::Internal(format!("integer constant {value} overflows i32")))
}

/// Returns the magnitude and whether a trailing optional space was
/// already consumed as part of reading an internal quantity (which does
/// not swallow a trailing space, unlike an explicit numeric constant).
fn parse_unsigned_integer_raw(mouth: &mut Mouth, env: &mut Environment) -> Result<(i64, bool)> {
    skip_spaces(mouth, env)?;
    let Some(token) = mouth.peek(env)? else {
        return Err(Error::Parse {
            position: crate::position::Position::initial(),
            message: "missing number, treated as zero".to_owned(),
        });
    };

    if let Some(value) = try_internal_integer(mouth, env, &token)? {
        return Ok((i64::from(value), true));
    }

    match token.as_character() {
        Some(('\'', _)) => {
            mouth.read(env)?;
            let v = read_digit_run(mouth, env, 8)?;
            skip_one_optional_space(mouth, env)?;
            Ok((v, true))
        }
        Some(('"', _)) => {
            mouth.read(env)?;
            let v = read_digit_run(mouth, env, 16)?;
            skip_one_optional_space(mouth, env)?;
            Ok((v, true))
        }
        Some(('`', _)) => {
            mouth.read(env)?;
            let v = read_char_code(mouth, env)?;
            skip_one_optional_space(mouth, env)?;
            Ok((v, true))
        }
        Some((c, _)) if c.is_ascii_digit() => {
            let v = read_digit_run(mouth, env, 10)?;
            skip_one_optional_space(mouth, env)?;
            Ok((v, true))
        }
        _ => Err(Error::Parse {
            position: token.position.clone(),
            message: "missing number, treated as zero".to_owned(),
        }),
    }
}

fn read_digit_run(mouth: &mut Mouth, env: &mut Environment, radix: u32) -> Result<i64> {
    let mut value: i64 = 0;
    let mut any = false;
    loop {
        match peek_char(mouth, env)? {
            Some(c) if c.is_digit(radix) => {
                mouth.read(env)?;
                value = value * i64::from(radix) + i64::from(c.to_digit(radix).unwrap());
                any = true;
            }
            _ => break,
        }
    }
    if any {
        Ok(value)
    } else {
        Err(Error::Parse {
            position: crate::position::Position::initial(),
            message: "missing number, treated as zero".to_owned(),
        })
    }
}

fn read_char_code(mouth: &mut Mouth, env: &mut Environment) -> Result<i64> {
    let Some(token) = mouth.read(env)? else {
        return Err(Error::Parse {
            position: crate::position::Position::initial(),
            message: "end of input while reading a character code".to_owned(),
        });
    };
    match &token.kind {
        crate::token::TokenKind::Character(c, _) => Ok(i64::from(*c as u32)),
        crate::token::TokenKind::ControlSequence { name, .. } if name.chars().count() == 1 => {
            Ok(i64::from(name.chars().next().unwrap() as u32))
        }
        _ => Err(Error::Parse {
            position: token.position.clone(),
            message: "improper alphabetic constant".to_owned(),
        }),
    }
}

/// Tries to read an internal integer quantity: a register, a code-table
/// lookup, a `\chardef`/`\countdef`-bound control sequence, or a special
/// integer. Returns `None` (without consuming anything) if the head
/// token is not one of these.
fn try_internal_integer(mouth: &mut Mouth, env: &mut Environment, token: &Token) -> Result<Option<i32>> {
    let Some(name) = token.cs_name() else { return Ok(None) };

    if let Some(def) = env.lookup_cs(name).cloned() {
        match def {
            CsDef::CounterRef(n) => {
                mouth.read(env)?;
                return Ok(Some(env.counter(n)));
            }
            CsDef::CharAlias(c, _) => {
                mouth.read(env)?;
                return Ok(Some(c as i32));
            }
            CsDef::Primitive(prim_name) => {
                let Some(primitive) = Primitive::from_name(prim_name) else {
                    return Ok(None);
                };
                return read_primitive_internal_integer(mouth, env, primitive);
            }
            _ => return Ok(None),
        }
    }
    Ok(None)
}

fn read_primitive_internal_integer(
    mouth: &mut Mouth,
    env: &mut Environment,
    primitive: Primitive,
) -> Result<Option<i32>> {
    match primitive {
        Primitive::Count => {
            mouth.read(env)?;
            let n = parse_number(mouth, env)?;
            let position = crate::position::Position::initial();
            let n = check_bit8(n, &position)?;
            Ok(Some(env.counter(n)))
        }
        Primitive::Catcode => {
            mouth.read(env)?;
            let c = parse_char_argument(mouth, env)?;
            Ok(Some(env.category_of(c) as i32))
        }
        Primitive::Mathcode => {
            mouth.read(env)?;
            let c = parse_char_argument(mouth, env)?;
            Ok(Some(env.mathcode_of(c)))
        }
        Primitive::Lccode => {
            mouth.read(env)?;
            let c = parse_char_argument(mouth, env)?;
            Ok(Some(env.lccode_of(c)))
        }
        Primitive::Uccode => {
            mouth.read(env)?;
            let c = parse_char_argument(mouth, env)?;
            Ok(Some(env.uccode_of(c)))
        }
        Primitive::Sfcode => {
            mouth.read(env)?;
            let c = parse_char_argument(mouth, env)?;
            Ok(Some(env.sfcode_of(c)))
        }
        Primitive::Delcode => {
            mouth.read(env)?;
            let c = parse_char_argument(mouth, env)?;
            Ok(Some(env.delcode_of(c)))
        }
        Primitive::Spacefactor => {
            mouth.read(env)?;
            Ok(Some(env.space_factor))
        }
        Primitive::Inputlineno => {
            mouth.read(env)?;
            Ok(Some(env.input_line_no))
        }
        Primitive::Badness => {
            mouth.read(env)?;
            Ok(Some(env.badness))
        }
        Primitive::Hyphenchar => {
            mouth.read(env)?;
            let position = crate::position::Position::initial();
            let font = super::assignment::read_cs_name(mouth, env, &position)?;
            Ok(Some(env.font(&font).map_or(-1, |f| f.hyphenchar)))
        }
        Primitive::Skewchar => {
            mouth.read(env)?;
            let position = crate::position::Position::initial();
            let font = super::assignment::read_cs_name(mouth, env, &position)?;
            Ok(Some(env.font(&font).map_or(-1, |f| f.skewchar)))
        }
        _ => Ok(None),
    }
}

/// Parses a character used to index a code table: either a literal
/// character token or a number giving its character code.
pub(crate) fn parse_char_argument(mouth: &mut Mouth, env: &mut Environment) -> Result<char> {
    skip_spaces(mouth, env)?;
    if let Some(c) = peek_char(mouth, env)? {
        if !c.is_ascii_digit() {
            mouth.read(env)?;
            return Ok(c);
        }
    }
    let code = parse_number(mouth, env)?;
    char::from_u32(u32::try_from(code).unwrap_or(0)).ok_or_else(|| Error::Range {
        position: crate::position::Position::initial(),
        value: i64::from(code),
        range: "0..1114111",
    })
}

/// `numeric-constant`: digits and an optional fractional part written
/// with `,` or `.`. Returns the value scaled by 2^16, and whether a
/// fractional part was present.
fn parse_decimal_constant(mouth: &mut Mouth, env: &mut Environment) -> Result<(i64, bool)> {
    skip_spaces(mouth, env)?;
    let mut integer_part: i64 = 0;
    let mut any_digit = false;
    while let Some(c) = peek_char(mouth, env)? {
        if c.is_ascii_digit() {
            mouth.read(env)?;
            integer_part = integer_part * 10 + i64::from(c.to_digit(10).unwrap());
            any_digit = true;
        } else {
            break;
        }
    }
    let mut fractional = 0i64;
    let mut is_decimal = false;
    if matches!(peek_char(mouth, env)?, Some('.') | Some(',')) {
        mouth.read(env)?;
        is_decimal = true;
        let mut digits = Vec::new();
        while let Some(c) = peek_char(mouth, env)? {
            if c.is_ascii_digit() && digits.len() < 17 {
                mouth.read(env)?;
                digits.push(c.to_digit(10).unwrap());
            } else {
                break;
            }
        }
        let mut acc: i64 = 0;
        for d in digits.iter().rev() {
            acc = (acc + i64::from(*d) * 131_072) / 10;
        }
        fractional = (acc + 1) / 2;
    }
    if !any_digit && !is_decimal {
        return Err(Error::Parse {
            position: crate::position::Position::initial(),
            message: "missing number, treated as zero".to_owned(),
        });
    }
    Ok(((integer_part << 16) + fractional, is_decimal))
}

fn apply_unit(mouth: &mut Mouth, env: &mut Environment, magnitude: i64) -> Result<i64> {
    if let Some(internal) = try_internal_dimension_as_unit(mouth, env, magnitude)? {
        return Ok(internal);
    }
    let _ = eat_keyword(mouth, env, "true")?;
    const UNITS: [&str; 9] = ["pt", "pc", "in", "bp", "cm", "mm", "dd", "cc", "sp"];
    for keyword in UNITS {
        if eat_keyword(mouth, env, keyword)? {
            let unit = Unit::from_keyword(keyword).expect("keyword list matches Unit::from_keyword");
            skip_one_optional_space(mouth, env)?;
            return Ok(unit.to_scaled_points(magnitude));
        }
    }
    Err(Error::Parse {
        position: crate::position::Position::initial(),
        message: format!(
            "illegal unit of measure (expected one of {})",
            UNITS.iter().format(", ")
        ),
    })
}

/// Handles `em`/`ex` and internal-integer/-dimension/-glue units used as
/// a multiplier, e.g. `\dimen0=2\wd3`.
fn try_internal_dimension_as_unit(
    mouth: &mut Mouth,
    env: &mut Environment,
    magnitude: i64,
) -> Result<Option<i64>> {
    for keyword in ["em", "ex"] {
        if eat_keyword(mouth, env, keyword)? {
            let quad = 10 * 65536i64;
            let factor = if keyword == "em" { quad } else { quad / 2 };
            return Ok(Some(magnitude * factor / 65536));
        }
    }
    let Some(token) = mouth.peek(env)? else { return Ok(None) };
    let Some(name) = token.cs_name() else { return Ok(None) };
    if let Some(CsDef::DimensionRef(n)) = env.lookup_cs(name).cloned() {
        mouth.read(env)?;
        return Ok(Some(magnitude * i64::from(env.dimen(n)) / 65536));
    }
    if let Some(CsDef::Primitive("dimen")) = env.lookup_cs(name).cloned() {
        mouth.read(env)?;
        let n = parse_number(mouth, env)?;
        let n = check_bit8(n, &crate::position::Position::initial())?;
        return Ok(Some(magnitude * i64::from(env.dimen(n)) / 65536));
    }
    Ok(None)
}

fn parse_unsigned_dimension(mouth: &mut Mouth, env: &mut Environment) -> Result<i64> {
    skip_spaces(mouth, env)?;
    if let Some(token) = mouth.peek(env)? {
        if let Some(value) = try_internal_integer(mouth, env, &token)? {
            // An internal integer used where a dimension is expected is
            // already in sp (e.g. `\dimen0=\count0 sp` is unusual; the
            // common case is a register holding a dimension already).
            return Ok(i64::from(value));
        }
        if let Some(name) = token.cs_name() {
            if let Some(CsDef::DimensionRef(n)) = env.lookup_cs(name).cloned() {
                mouth.read(env)?;
                return Ok(i64::from(env.dimen(n)));
            }
            if matches!(env.lookup_cs(name).cloned(), Some(CsDef::Primitive("dimen"))) {
                mouth.read(env)?;
                let n = parse_number(mouth, env)?;
                let n = check_bit8(n, &crate::position::Position::initial())?;
                return Ok(i64::from(env.dimen(n)));
            }
        }
    }
    let (magnitude, _) = parse_decimal_constant(mouth, env)?;
    apply_unit(mouth, env, magnitude)
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
    fn parses_plain_decimal() {
        let (mut mouth, mut env) = mouth_with("42 ");
        assert_eq!(parse_number(&mut mouth, &mut env).unwrap(), 42);
    }

    #[test]
    fn parses_negative_with_double_sign() {
        let (mut mouth, mut env) = mouth_with("- -7");
        assert_eq!(parse_number(&mut mouth, &mut env).unwrap(), 7);
    }

    #[test]
    fn parses_octal_and_hex() {
        let (mut mouth, mut env) = mouth_with("'17");
        assert_eq!(parse_number(&mut mouth, &mut env).unwrap(), 15);
        let (mut mouth, mut env) = mouth_with("\"FF");
        assert_eq!(parse_number(&mut mouth, &mut env).unwrap(), 255);
    }

    #[test]
    fn parses_backtick_char_code() {
        let (mut mouth, mut env) = mouth_with("`A");
        assert_eq!(parse_number(&mut mouth, &mut env).unwrap(), 65);
    }

    #[test]
    fn parses_counter_as_internal_integer() {
        let (mut mouth, mut env) = mouth_with("\\count5 ");
        env.set_counter(5, 99, false);
        assert_eq!(parse_number(&mut mouth, &mut env).unwrap(), 99);
    }

    #[test]
    fn parses_simple_dimension_in_points() {
        let (mut mouth, mut env) = mouth_with("2pt");
        assert_eq!(parse_dimension(&mut mouth, &mut env).unwrap(), 2 * 65536);
    }

    #[test]
    fn parses_glue_with_fil_stretch() {
        let (mut mouth, mut env) = mouth_with("1pt plus 2fil minus 3pt");
        let glue = parse_glue(&mut mouth, &mut env).unwrap();
        assert_eq!(glue.value, 65536);
        assert_eq!(glue.stretch, Amount::Infinite { factor: 2, order: 1 });
        assert_eq!(glue.shrink, Amount::Fixed(3 * 65536));
    }
}
