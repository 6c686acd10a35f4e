//! [`Command`]: the tagged variant the Mouth emits and the Stomach
//! consumes, plus the closed enumeration of assignment forms TeX
//! supports.

use crate::dimension::{Dimension, Glue};
use crate::position::Position;
use crate::token::Token;

/// A register or internal-quantity reference that an assignment, or
/// `\advance`/`\multiply`/`\divide`, targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntVariable {
    Counter(u8),
    SpecialInteger(&'static str),
    CatCode(char),
    MathCode(char),
    LcCode(char),
    UcCode(char),
    SfCode(char),
    DelCode(char),
    HyphenChar(String),
    SkewChar(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimenVariable {
    Register(u8),
    BoxHeight(u8),
    BoxWidth(u8),
    BoxDepth(u8),
}

/// What kind of box a `\setbox`'s construction starts: the Mouth
/// parses the full box-construction grammar without performing any
/// layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    Hbox,
    Vbox,
    Vtop,
}

/// One of the closed set of simple assignments TeX supports. `global`
/// records whether `\global` preceded the assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Counter { register: u8, value: i32 },
    Dimension { register: u8, value: Dimension },
    Skip { register: u8, value: Glue },
    Muskip { register: u8, value: Glue },
    Tokens { register: u8, value: Vec<Token> },
    CatCode { ch: char, value: i32 },
    MathCode { ch: char, value: i32 },
    LcCode { ch: char, value: i32 },
    UcCode { ch: char, value: i32 },
    SfCode { ch: char, value: i32 },
    DelCode { ch: char, value: i32 },
    CharDef { name: String, value: i32 },
    CounterDef { name: String, register: u8 },
    DimensionDef { name: String, register: u8 },
    SkipDef { name: String, register: u8 },
    MuskipDef { name: String, register: u8 },
    ToksDef { name: String, register: u8 },
    MathCharDef { name: String, value: i32 },
    Let { name: String, target: Box<Token> },
    FutureLet { name: String, target: Box<Token> },
    Advance { variable: IntVariable, by: i32 },
    AdvanceDimen { variable: DimenVariable, by: Dimension },
    Multiply { variable: IntVariable, by: i32 },
    MultiplyDimen { variable: DimenVariable, by: i32 },
    Divide { variable: IntVariable, by: i32 },
    DivideDimen { variable: DimenVariable, by: i32 },
    Font { name: String, family: String, at: Option<Dimension>, scaled: Option<i32> },
    TextFont { family: u8, font: String },
    ScriptFont { family: u8, font: String },
    ScriptScriptFont { family: u8, font: String },
    FontDimen { index: i32, font: String, value: Dimension },
    HyphenChar { font: String, value: i32 },
    SkewChar { font: String, value: i32 },
    BoxDimen { variable: DimenVariable, value: Dimension },
    SetBox { register: u8, kind: BoxKind },
    Read { stream: i32, name: String },
}

/// The output of the Mouth: a primitive instruction for the Stomach.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Typeset(char),
    Par,
    Relax,
    End,
    /// Fallthrough for a control sequence the command driver does not
    /// recognize; the Stomach decides what, if anything, it means.
    Cs(String),
    Message { tokens: Vec<Token>, error: bool },
    Showthe(Vec<Token>),
    Show(Box<Token>),
    Uppercase(Vec<Token>),
    Lowercase(Vec<Token>),
    Ignorespaces,
    StartBox { register: Option<u8>, kind: BoxKind },
    Assignment { assignment: Assignment, global: bool },
}

/// A [`Command`] with the position of the token that produced it, used by
/// the Stomach to report an undefined control sequence at the position it
/// was read, rather than wherever execution happens to notice it.
#[derive(Debug, Clone)]
pub struct PositionedCommand {
    pub command: Command,
    pub position: Position,
}
