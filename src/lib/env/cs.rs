//! Control-sequence definitions, as stored in the environment's `cs_table`.

use crate::token::Token;

/// A user-defined macro: `\def`, `\gdef`, `\edef`, `\xdef`.
#[derive(Debug, Clone)]
pub struct MacroDef {
    pub name: String,
    pub parameter_text: Vec<Token>,
    /// Stored in reverse order, so that substituting it onto the pushback
    /// stack is an O(1) append rather than an O(n) prepend-per-token.
    pub replacement_reversed: Vec<Token>,
    pub long: bool,
    pub outer: bool,
}

/// What a control sequence currently means, looked up by name on every
/// expansion (definitions are purely nominal; there is no in-memory cycle
/// to manage).
#[derive(Debug, Clone)]
pub enum CsDef {
    Macro(MacroDef),
    /// `\chardef`-bound: aliases a single character-code/category pair.
    CharAlias(char, crate::category::Category),
    /// `\let cs = token`: aliases the meaning of `token` at definition time.
    CsAlias(Box<Token>),
    /// `\countdef`-bound.
    CounterRef(u8),
    /// `\dimendef`-bound.
    DimensionRef(u8),
    /// `\skipdef`-bound.
    GlueRef(u8),
    /// `\muskipdef`-bound.
    MuglueRef(u8),
    /// `\toksdef`-bound.
    TokenListRef(u8),
    /// A math-character code, as bound by `\mathchardef`.
    MathCharRef(i32),
    /// `\font`-bound.
    FontRef {
        family: String,
        magnification: Option<i32>,
    },
    /// A primitive control sequence recognized by name in the expansion
    /// and command-driver dispatch tables; kept in the table too so
    /// `\let\foo=\relax` and `\meaning\relax` work uniformly with user
    /// definitions.
    Primitive(&'static str),
}
