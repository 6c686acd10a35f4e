//! The Eyes: turns the character stream owned by the [`Environment`]'s
//! input stack into a stream of [`Token`]s, consulting the environment's
//! category-code table and reading state on every character.
//!
//! Modeled as a plain function rather than an `Iterator` impl: it takes
//! `&mut Environment` and returns the next token, reading scoped category
//! codes on every call instead of matching against a fixed table.

use crate::category::Category;
use crate::env::{Environment, ReadingState};
use crate::error::{Error, Result};
use crate::position::Position;
use crate::token::Token;

fn position_of(env: &Environment, line: usize, column: usize) -> Position {
    Position::new(line, column, env.inputs.current_name().map(str::to_owned))
}

/// Reads one character from the environment's input stack, applying
/// TeX's `^^`-escape preprocessing (two identical superscript-category
/// characters followed by a hex pair or an ASCII character).
fn next_preprocessed_char(env: &mut Environment) -> Option<(char, Position)> {
    let superscript = |env: &Environment, c: char| env.category_of(c) == Category::Superscript;

    if let (Some(c0), Some(c1)) = (env.inputs.peek(), env.inputs.peek_at(1)) {
        if c0 == c1 && superscript(env, c0) {
            if let (Some(h0), Some(h1)) = (env.inputs.peek_at(2), env.inputs.peek_at(3)) {
                if is_lower_hex(h0) && is_lower_hex(h1) {
                    let (_, line, column, _) = env.inputs.advance().unwrap();
                    env.inputs.advance();
                    env.inputs.advance();
                    env.inputs.advance();
                    let code = hex_value(h0) * 16 + hex_value(h1);
                    let c = char::from_u32(code).unwrap_or('\u{fffd}');
                    return Some((c, position_of(env, line, column)));
                }
            }
            if let Some(c2) = env.inputs.peek_at(2) {
                if (c2 as u32) < 128 {
                    let (_, line, column, _) = env.inputs.advance().unwrap();
                    env.inputs.advance();
                    env.inputs.advance();
                    let flipped = ((c2 as u8) ^ 0x40) as char;
                    return Some((flipped, position_of(env, line, column)));
                }
            }
        }
    }

    let (c, line, column, _) = env.inputs.advance()?;
    Some((c, position_of(env, line, column)))
}

fn is_lower_hex(c: char) -> bool {
    c.is_ascii_digit() || ('a'..='f').contains(&c)
}

fn hex_value(c: char) -> u32 {
    c.to_digit(16).unwrap_or(0)
}

/// Returns the next [`Token`], `Ok(None)` on end-of-all-input (not an
/// error), or `Err` for a lexical error.
pub fn next_token(env: &mut Environment) -> Result<Option<Token>> {
    loop {
        let Some((c, pos)) = next_preprocessed_char(env) else {
            return Ok(None);
        };
        let category = env.category_of(c);

        match category {
            Category::Ignored => continue,
            Category::Space => match env.reading_state {
                ReadingState::NewLine | ReadingState::SkippingBlanks => continue,
                ReadingState::MiddleOfLine => {
                    env.reading_state = ReadingState::SkippingBlanks;
                    return Ok(Some(Token::character(' ', Category::Space, pos)));
                }
            },
            Category::Comment => {
                env.inputs.skip_to_end_of_line();
                continue;
            }
            Category::Active => {
                env.reading_state = ReadingState::SkippingBlanks;
                return Ok(Some(Token::control_sequence(c.to_string(), true, pos)));
            }
            Category::Escape => {
                env.reading_state = ReadingState::SkippingBlanks;
                return read_control_sequence(env, pos);
            }
            Category::EndOfLine => match env.reading_state {
                ReadingState::NewLine => {
                    env.reading_state = ReadingState::NewLine;
                    maybe_close_finished_input(env);
                    return Ok(Some(Token::control_sequence("par", false, pos)));
                }
                ReadingState::MiddleOfLine => {
                    env.reading_state = ReadingState::NewLine;
                    maybe_close_finished_input(env);
                    return Ok(Some(Token::character(' ', Category::Space, pos)));
                }
                ReadingState::SkippingBlanks => {
                    env.reading_state = ReadingState::NewLine;
                    maybe_close_finished_input(env);
                    continue;
                }
            },
            other => {
                env.reading_state = ReadingState::MiddleOfLine;
                return Ok(Some(Token::character(c, other, pos)));
            }
        }
    }
}

/// `\endinput` arranges for the innermost input to be dropped the next
/// time its end-of-line is processed.
fn maybe_close_finished_input(env: &mut Environment) {
    if env.endinput_pending && env.inputs.current_is_at_end() {
        env.inputs.pop();
        env.endinput_pending = false;
    }
}

fn read_control_sequence(env: &mut Environment, pos: Position) -> Result<Option<Token>> {
    let Some((first, _)) = next_preprocessed_char(env) else {
        return Err(Error::Lexical {
            position: pos,
            message: "end of input while reading a control sequence name".to_owned(),
        });
    };

    if env.category_of(first) != Category::Letter {
        return Ok(Some(Token::control_sequence(first.to_string(), false, pos)));
    }

    let mut name = String::new();
    name.push(first);
    loop {
        match peek_preprocessed(env) {
            Some(c) if env.category_of(c) == Category::Letter => {
                next_preprocessed_char(env);
                name.push(c);
            }
            _ => break,
        }
    }
    Ok(Some(Token::control_sequence(name, false, pos)))
}

/// Peeks the next preprocessed character without consuming it. `^^`
/// sequences are short enough that re-deriving this from the raw stack is
/// acceptable; we only need the resulting character, not its position.
fn peek_preprocessed(env: &mut Environment) -> Option<char> {
    let snapshot = env.inputs.clone();
    let result = next_preprocessed_char(env).map(|(c, _)| c);
    env.inputs = snapshot;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chars::InputSource;

    fn env_with(source: &str) -> Environment {
        let mut env = Environment::new("job");
        env.inputs.push(InputSource::new(source, None));
        env
    }

    fn tokens(source: &str) -> Vec<Token> {
        let mut env = env_with(source);
        let mut out = Vec::new();
        while let Some(tok) = next_token(&mut env).unwrap() {
            out.push(tok);
        }
        out
    }

    #[test]
    fn letters_and_spaces() {
        let toks = tokens("ab cd");
        assert_eq!(toks.len(), 5);
        assert_eq!(toks[0].as_character(), Some(('a', Category::Letter)));
        assert_eq!(toks[2].as_character(), Some((' ', Category::Space)));
    }

    #[test]
    fn repeated_spaces_collapse_to_one() {
        let toks = tokens("a   b");
        assert_eq!(toks.len(), 3);
        assert_eq!(toks[1].as_character(), Some((' ', Category::Space)));
    }

    #[test]
    fn blank_line_becomes_par() {
        let toks = tokens("a\n\nb");
        let names: Vec<_> = toks.iter().filter_map(Token::cs_name).collect();
        assert_eq!(names, vec!["par"]);
    }

    #[test]
    fn control_word_reads_maximal_letter_run() {
        let toks = tokens(r"\foo bar");
        assert_eq!(toks[0].cs_name(), Some("foo"));
    }

    #[test]
    fn control_symbol_is_single_char() {
        let toks = tokens(r"\@ x");
        assert_eq!(toks[0].cs_name(), Some("@"));
    }

    #[test]
    fn comment_is_dropped_through_end_of_line() {
        let toks = tokens("a% comment\nb");
        assert_eq!(toks.len(), 2);
    }

    #[test]
    fn double_superscript_hex_escape() {
        let toks = tokens("^^41");
        assert_eq!(toks[0].as_character(), Some(('A', Category::Letter)));
    }

    #[test]
    fn double_superscript_xor_escape() {
        // ^^? == 0x3f XOR 0x40 == 0x7f (DEL, category Other per our defaults)
        let toks = tokens("^^?");
        assert_eq!(toks[0].as_character(), Some(('\x7f', Category::Other)));
    }
}
