//! A small `logos`-generated lexer over already-rendered text (the output
//! of [`crate::mouth::meaning_text`] or a `\show` line), used to colorize
//! `\meaning`/`\show` output on a terminal. This is one of the "static"
//! sub-lexers kept around for `logos`: unlike the Eyes, the text it runs
//! over is a fixed string with no runtime category-code state, so a
//! compile-time grammar is a good fit.

use logos::{Lexer, Logos};
use std::io;
use termcolor::{ColorSpec, WriteColor};

fn slice<'s>(lex: &mut Lexer<'s, Segment<'s>>) -> &'s str {
    lex.slice()
}

/// A segment of a rendered meaning/show string, as produced by
/// [`logos`] over the plain text (not the original TeX source).
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'s> {
    /// A control word or symbol, e.g. `\foo` or `\#`.
    #[regex(r"\\([a-zA-Z]+|.)", slice)]
    ControlWord(&'s str),

    /// A run of whitespace.
    #[regex(r"[ \t]+", slice)]
    Whitespace(&'s str),

    /// A `macro parameter #n` reference.
    #[regex(r"#[0-9]", slice)]
    Parameter(&'s str),

    /// Anything else: literal characters.
    #[regex(r"[^\\ \t#]+", slice)]
    Text(&'s str),

    #[error]
    Error,
}

impl<'s> Segment<'s> {
    fn as_str(self) -> &'s str {
        match self {
            Segment::ControlWord(s)
            | Segment::Whitespace(s)
            | Segment::Parameter(s)
            | Segment::Text(s) => s,
            Segment::Error => "",
        }
    }
}

/// Writes `text` to `out`, colorizing control words with `control` (the
/// user-chosen [`ColorSpec`], typically derived from the CLI's
/// `--fg`/`--bold`/... flags) and macro parameters with an underline.
/// Used by the `expand` CLI command when writing the expanded token
/// stream to a terminal.
pub fn write_colorized(text: &str, control: &ColorSpec, out: &mut dyn WriteColor) -> io::Result<()> {
    let mut parameter = ColorSpec::new();
    parameter.set_underline(true);

    for segment in Segment::lexer(text) {
        match segment {
            Segment::ControlWord(s) => {
                out.set_color(control)?;
                write!(out, "{s}")?;
                out.reset()?;
            }
            Segment::Parameter(s) => {
                out.set_color(&parameter)?;
                write!(out, "{s}")?;
                out.reset()?;
            }
            other => write!(out, "{}", other.as_str())?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_control_words_from_text() {
        let segments: Vec<_> = Segment::lexer(r"\foo bar#1").collect();
        assert_eq!(
            segments,
            vec![
                Segment::ControlWord(r"\foo"),
                Segment::Whitespace(" "),
                Segment::Text("bar"),
                Segment::Parameter("#1"),
            ]
        );
    }
}
