//! The closed set of primitive control-sequence names the engine ships
//! with, and their classification into expandable / assignment-starting /
//! structural primitives used by the Mouth and command driver.
//!
//! Kept as a single static table (rather than scattering `match "foo"`
//! arms across the Mouth) so [`crate::env::Environment::new`] can seed
//! every primitive into the root frame's control-sequence table once,
//! letting `\let\x=\relax` and `\meaning\relax` go through the ordinary
//! [`crate::env::CsDef::Primitive`] lookup path like any other binding.

/// One primitive control sequence IniTeX defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    If,
    Ifnum,
    Ifdim,
    Ifodd,
    Ifvmode,
    Ifhmode,
    Ifmmode,
    Ifinner,
    Ifcat,
    Ifx,
    Iftrue,
    Iffalse,
    Ifcase,
    Fi,
    Else,
    Or,
    Input,
    Endinput,
    Jobname,
    Romannumeral,
    Number,
    String,
    Meaning,
    Csname,
    Endcsname,
    Expandafter,
    Noexpand,
    The,

    Par,
    Relax,
    End,
    Message,
    Errmessage,
    Showthe,
    Show,
    Uppercase,
    Lowercase,
    Ignorespaces,
    Noindent,
    Indent,

    Def,
    Gdef,
    Edef,
    Xdef,
    Long,
    Outer,
    Global,

    Chardef,
    Countdef,
    Dimendef,
    Skipdef,
    Muskipdef,
    Toksdef,
    Mathchardef,
    Let,
    Futurelet,

    Count,
    Dimen,
    Skip,
    Muskip,
    Toks,
    Catcode,
    Mathcode,
    Lccode,
    Uccode,
    Sfcode,
    Delcode,

    Advance,
    Multiply,
    Divide,
    By,

    Font,
    Textfont,
    Scriptfont,
    Scriptscriptfont,
    Fontdimen,
    Hyphenchar,
    Skewchar,

    Ht,
    Wd,
    Dp,
    Setbox,
    Read,
    Hbox,
    Vbox,
    Vtop,

    Spacefactor,
    Inputlineno,
    Badness,
}

impl Primitive {
    /// The control-sequence name this primitive is bound to (without the
    /// leading escape character).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Ifnum => "ifnum",
            Self::Ifdim => "ifdim",
            Self::Ifodd => "ifodd",
            Self::Ifvmode => "ifvmode",
            Self::Ifhmode => "ifhmode",
            Self::Ifmmode => "ifmmode",
            Self::Ifinner => "ifinner",
            Self::Ifcat => "ifcat",
            Self::Ifx => "ifx",
            Self::Iftrue => "iftrue",
            Self::Iffalse => "iffalse",
            Self::Ifcase => "ifcase",
            Self::Fi => "fi",
            Self::Else => "else",
            Self::Or => "or",
            Self::Input => "input",
            Self::Endinput => "endinput",
            Self::Jobname => "jobname",
            Self::Romannumeral => "romannumeral",
            Self::Number => "number",
            Self::String => "string",
            Self::Meaning => "meaning",
            Self::Csname => "csname",
            Self::Endcsname => "endcsname",
            Self::Expandafter => "expandafter",
            Self::Noexpand => "noexpand",
            Self::The => "the",
            Self::Par => "par",
            Self::Relax => "relax",
            Self::End => "end",
            Self::Message => "message",
            Self::Errmessage => "errmessage",
            Self::Showthe => "showthe",
            Self::Show => "show",
            Self::Uppercase => "uppercase",
            Self::Lowercase => "lowercase",
            Self::Ignorespaces => "ignorespaces",
            Self::Noindent => "noindent",
            Self::Indent => "indent",
            Self::Def => "def",
            Self::Gdef => "gdef",
            Self::Edef => "edef",
            Self::Xdef => "xdef",
            Self::Long => "long",
            Self::Outer => "outer",
            Self::Global => "global",
            Self::Chardef => "chardef",
            Self::Countdef => "countdef",
            Self::Dimendef => "dimendef",
            Self::Skipdef => "skipdef",
            Self::Muskipdef => "muskipdef",
            Self::Toksdef => "toksdef",
            Self::Mathchardef => "mathchardef",
            Self::Let => "let",
            Self::Futurelet => "futurelet",
            Self::Count => "count",
            Self::Dimen => "dimen",
            Self::Skip => "skip",
            Self::Muskip => "muskip",
            Self::Toks => "toks",
            Self::Catcode => "catcode",
            Self::Mathcode => "mathcode",
            Self::Lccode => "lccode",
            Self::Uccode => "uccode",
            Self::Sfcode => "sfcode",
            Self::Delcode => "delcode",
            Self::Advance => "advance",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::By => "by",
            Self::Font => "font",
            Self::Textfont => "textfont",
            Self::Scriptfont => "scriptfont",
            Self::Scriptscriptfont => "scriptscriptfont",
            Self::Fontdimen => "fontdimen",
            Self::Hyphenchar => "hyphenchar",
            Self::Skewchar => "skewchar",
            Self::Ht => "ht",
            Self::Wd => "wd",
            Self::Dp => "dp",
            Self::Setbox => "setbox",
            Self::Read => "read",
            Self::Hbox => "hbox",
            Self::Vbox => "vbox",
            Self::Vtop => "vtop",
            Self::Spacefactor => "spacefactor",
            Self::Inputlineno => "inputlineno",
            Self::Badness => "badness",
        }
    }

    /// Looks up a primitive by its control-sequence name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        ALL.iter().copied().find(|p| p.name() == name)
    }

    /// Whether this primitive is expandable, i.e. handled by the Mouth's
    /// `read` rather than by the command driver or assignment grammar.
    #[must_use]
    pub fn is_expandable(self) -> bool {
        matches!(
            self,
            Self::If
                | Self::Ifnum
                | Self::Ifdim
                | Self::Ifodd
                | Self::Ifvmode
                | Self::Ifhmode
                | Self::Ifmmode
                | Self::Ifinner
                | Self::Ifcat
                | Self::Ifx
                | Self::Iftrue
                | Self::Iffalse
                | Self::Ifcase
                | Self::Fi
                | Self::Else
                | Self::Or
                | Self::Input
                | Self::Endinput
                | Self::Jobname
                | Self::Romannumeral
                | Self::Number
                | Self::String
                | Self::Meaning
                | Self::Csname
                | Self::Expandafter
                | Self::Noexpand
                | Self::The
        )
    }

    /// Whether this primitive opens an `\if...\fi` conditional (used by
    /// the branch-skipping scanner to track nesting depth).
    #[must_use]
    pub fn is_if_opener(self) -> bool {
        matches!(
            self,
            Self::If
                | Self::Ifnum
                | Self::Ifdim
                | Self::Ifodd
                | Self::Ifvmode
                | Self::Ifhmode
                | Self::Ifmmode
                | Self::Ifinner
                | Self::Ifcat
                | Self::Ifx
                | Self::Iftrue
                | Self::Iffalse
                | Self::Ifcase
        )
    }
}

/// Every primitive IniTeX defines, used to seed a fresh [`Environment`]
/// and to implement [`Primitive::from_name`].
///
/// [`Environment`]: crate::env::Environment
pub const ALL: &[Primitive] = &[
    Primitive::If,
    Primitive::Ifnum,
    Primitive::Ifdim,
    Primitive::Ifodd,
    Primitive::Ifvmode,
    Primitive::Ifhmode,
    Primitive::Ifmmode,
    Primitive::Ifinner,
    Primitive::Ifcat,
    Primitive::Ifx,
    Primitive::Iftrue,
    Primitive::Iffalse,
    Primitive::Ifcase,
    Primitive::Fi,
    Primitive::Else,
    Primitive::Or,
    Primitive::Input,
    Primitive::Endinput,
    Primitive::Jobname,
    Primitive::Romannumeral,
    Primitive::Number,
    Primitive::String,
    Primitive::Meaning,
    Primitive::Csname,
    Primitive::Endcsname,
    Primitive::Expandafter,
    Primitive::Noexpand,
    Primitive::The,
    Primitive::Par,
    Primitive::Relax,
    Primitive::End,
    Primitive::Message,
    Primitive::Errmessage,
    Primitive::Showthe,
    Primitive::Show,
    Primitive::Uppercase,
    Primitive::Lowercase,
    Primitive::Ignorespaces,
    Primitive::Noindent,
    Primitive::Indent,
    Primitive::Def,
    Primitive::Gdef,
    Primitive::Edef,
    Primitive::Xdef,
    Primitive::Long,
    Primitive::Outer,
    Primitive::Global,
    Primitive::Chardef,
    Primitive::Countdef,
    Primitive::Dimendef,
    Primitive::Skipdef,
    Primitive::Muskipdef,
    Primitive::Toksdef,
    Primitive::Mathchardef,
    Primitive::Let,
    Primitive::Futurelet,
    Primitive::Count,
    Primitive::Dimen,
    Primitive::Skip,
    Primitive::Muskip,
    Primitive::Toks,
    Primitive::Catcode,
    Primitive::Mathcode,
    Primitive::Lccode,
    Primitive::Uccode,
    Primitive::Sfcode,
    Primitive::Delcode,
    Primitive::Advance,
    Primitive::Multiply,
    Primitive::Divide,
    Primitive::By,
    Primitive::Font,
    Primitive::Textfont,
    Primitive::Scriptfont,
    Primitive::Scriptscriptfont,
    Primitive::Fontdimen,
    Primitive::Hyphenchar,
    Primitive::Skewchar,
    Primitive::Ht,
    Primitive::Wd,
    Primitive::Dp,
    Primitive::Setbox,
    Primitive::Read,
    Primitive::Hbox,
    Primitive::Vbox,
    Primitive::Vtop,
    Primitive::Spacefactor,
    Primitive::Inputlineno,
    Primitive::Badness,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trips_through_from_name() {
        for p in ALL {
            assert_eq!(Primitive::from_name(p.name()), Some(*p));
        }
    }

    #[test]
    fn def_family_is_not_expandable() {
        assert!(!Primitive::Def.is_expandable());
        assert!(!Primitive::Relax.is_expandable());
    }

    #[test]
    fn if_family_are_if_openers() {
        assert!(Primitive::Ifnum.is_if_opener());
        assert!(!Primitive::Fi.is_if_opener());
    }
}
