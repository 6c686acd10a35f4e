//! Category codes.
//!
//! Category codes, as defined in TeX by Topic (section 2.3). Each of the
//! 256 character codes has an associated category code, though not
//! necessarily always the same one: the category-code table is scoped
//! mutable state (`\catcode`), not a compile-time grammar, so it cannot
//! be a [`logos`]-derived static lexer the way [`crate::explain::Segment`]
//! is. It is looked up by the Eyes on every character, in the current
//! scope of the [`crate::env::Environment`].

/// One of the sixteen category codes a character can be assigned.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    /// Escape character; signals the start of a control sequence.
    Escape = 0,
    /// Beginning of group; enters a new level of grouping.
    BeginGroup = 1,
    /// End of group; closes the current level of grouping.
    EndGroup = 2,
    /// Math shift; opening/closing delimiter for math formulas.
    MathShift = 3,
    /// Alignment tab; column/row separator in `\halign`/`\valign`.
    AlignmentTab = 4,
    /// End of line; signals TeX that an input line has ended.
    EndOfLine = 5,
    /// Parameter character; indicates parameters for macros.
    Parameter = 6,
    /// Superscript; precedes superscript expressions in math mode, or
    /// introduces a `^^`-escape.
    Superscript = 7,
    /// Subscript; precedes subscript expressions in math mode.
    Subscript = 8,
    /// Ignored; removed from the input with no further effect.
    Ignored = 9,
    /// Space; receives special treatment by the reading-state machine.
    Space = 10,
    /// Letter; can be used to spell a control-sequence name.
    Letter = 11,
    /// Other; everything not in the other fifteen categories.
    Other = 12,
    /// Active; behaves as a control sequence without an escape character.
    Active = 13,
    /// Comment character; the rest of the line is discarded.
    Comment = 14,
    /// Invalid character; should not appear in well-formed input.
    Invalid = 15,
}

impl Category {
    /// The default category code for `c`, matching IniTeX: `\` escape,
    /// `{` begin-group, `}` end-group, `%` comment, `\n` end-of-line,
    /// ` ` space, `\0` invalid, letters letter, everything else other.
    #[must_use]
    pub fn default_for(c: char) -> Self {
        match c {
            '\\' => Self::Escape,
            '{' => Self::BeginGroup,
            '}' => Self::EndGroup,
            '%' => Self::Comment,
            '\n' => Self::EndOfLine,
            ' ' => Self::Space,
            '\0' => Self::Invalid,
            c if c.is_ascii_alphabetic() => Self::Letter,
            _ => Self::Other,
        }
    }
}

macro_rules! impl_try_from {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl TryFrom<$ty> for Category {
                type Error = $ty;

                #[inline]
                fn try_from(code: $ty) -> Result<Self, Self::Error> {
                    match code {
                        0 => Ok(Category::Escape),
                        1 => Ok(Category::BeginGroup),
                        2 => Ok(Category::EndGroup),
                        3 => Ok(Category::MathShift),
                        4 => Ok(Category::AlignmentTab),
                        5 => Ok(Category::EndOfLine),
                        6 => Ok(Category::Parameter),
                        7 => Ok(Category::Superscript),
                        8 => Ok(Category::Subscript),
                        9 => Ok(Category::Ignored),
                        10 => Ok(Category::Space),
                        11 => Ok(Category::Letter),
                        12 => Ok(Category::Other),
                        13 => Ok(Category::Active),
                        14 => Ok(Category::Comment),
                        15 => Ok(Category::Invalid),
                        x => Err(x),
                    }
                }
            }
        )*
    };
}

impl_try_from!(u8, u16, u32, i32, i64, usize);

impl From<Category> for u8 {
    #[inline]
    fn from(cat: Category) -> Self {
        cat as Self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_categories_match_initex() {
        assert_eq!(Category::default_for('\\'), Category::Escape);
        assert_eq!(Category::default_for('{'), Category::BeginGroup);
        assert_eq!(Category::default_for('}'), Category::EndGroup);
        assert_eq!(Category::default_for('%'), Category::Comment);
        assert_eq!(Category::default_for('\n'), Category::EndOfLine);
        assert_eq!(Category::default_for(' '), Category::Space);
        assert_eq!(Category::default_for('\0'), Category::Invalid);
        assert_eq!(Category::default_for('$'), Category::Other);
        assert_eq!(Category::default_for('A'), Category::Letter);
        assert_eq!(Category::default_for('z'), Category::Letter);
        assert_eq!(Category::default_for('9'), Category::Other);
    }

    #[test]
    fn round_trips_through_u8() {
        for code in 0u8..=15 {
            let cat = Category::try_from(code).unwrap();
            assert_eq!(u8::from(cat), code);
        }
        assert!(Category::try_from(16u8).is_err());
    }
}
