//! The process-wide mutable state: a stack of lexical scopes holding
//! category-code/control-sequence/register maps, plus global settings.
//!
//! Grounded on the scoped-lookup idea sketched by `ScopedMap` in the
//! `jamespfennell-texide` reference engine, re-expressed with the explicit
//! frame stack this design calls for: keep a stack of frames, each
//! holding a delta from its parent; reads walk the stack; writes go to the
//! top (or to the root for `\global`).

mod cs;
mod registers;

pub use cs::{CsDef, MacroDef};
pub use registers::Frame;

use crate::category::Category;
use crate::chars::InputStack;
use crate::dimension::Dimension;
use crate::token::Token;
use std::collections::HashMap;

/// Per-font-identifier state that isn't scoped by group: `\fontdimen`
/// parameters, `\hyphenchar`, `\skewchar`, and the `at`/`scaled` clause a
/// `\font` assignment carried. Font metric file decoding is out of
/// scope; only the values the Mouth must be
/// able to parse and the Stomach write back are tracked.
#[derive(Debug, Clone, Default)]
pub struct FontRecord {
    pub dimens: HashMap<i32, Dimension>,
    pub hyphenchar: i32,
    pub skewchar: i32,
    pub at: Option<Dimension>,
    pub scaled: Option<i32>,
}

/// Typesetting mode, inspected by `\ifvmode`/`\ifhmode`/`\ifmmode`/`\ifinner`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    VerticalMode { inner: bool },
    HorizontalMode { inner: bool },
    MathMode { inner: bool },
}

impl Mode {
    #[must_use]
    pub fn is_inner(self) -> bool {
        match self {
            Self::VerticalMode { inner } | Self::HorizontalMode { inner } | Self::MathMode { inner } => {
                inner
            }
        }
    }
}

/// The tri-state reading state the Eyes is in: beginning of a line,
/// middle of a line, or skipping blanks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReadingState {
    NewLine,
    MiddleOfLine,
    SkippingBlanks,
}

/// Process-wide mutable state shared by the Eyes, Mouth, and Stomach.
pub struct Environment {
    frames: Vec<Frame>,
    pub jobname: String,
    pub mode: Mode,
    pub reading_state: ReadingState,
    pub escapechar: i32,
    pub endlinechar: i32,
    pub current_font: Option<String>,
    /// Set by `\afterassignment`; consumed (pushed back) once the next
    /// assignment completes.
    pub after_assignment: Option<Token>,
    /// Set by `\aftergroup` calls made inside the current group; consumed
    /// (pushed back, in call order) when the group closes.
    pub after_group: Vec<Vec<Token>>,
    /// `\inputlineno`.
    pub input_line_no: i32,
    /// `\badness`.
    pub badness: i32,
    /// `\spacefactor`.
    pub space_factor: i32,
    /// Set when `\endinput` is seen; the Eyes close the current input at
    /// the next end-of-line.
    pub endinput_pending: bool,
    /// The stack of line-oriented character readers: the main file (or
    /// string) plus anything pushed by `\input`.
    pub inputs: InputStack,
    /// Per-font-identifier records (`\fontdimen`, `\hyphenchar`,
    /// `\skewchar`, `at`/`scaled`), keyed by the control-sequence name a
    /// `\font` assignment bound. Not scoped: font metrics, like the real
    /// engine's font memory, live for the whole job.
    pub fonts: HashMap<String, FontRecord>,
    /// Additional directories `\input`/`\openin` search, in order, after
    /// the current directory, as supplied by [`crate::config::Config`].
    pub input_path: Vec<std::path::PathBuf>,
    /// Whether `\input`/`\endinput` are honored; set to `false` to make
    /// `\input` fail as though the named file never exists, per the CLI's
    /// `--follow-includes=never`.
    pub allow_input: bool,
}

impl Environment {
    #[must_use]
    pub fn new(jobname: impl Into<String>) -> Self {
        let mut root = Frame::default();
        for primitive in crate::primitives::ALL {
            root.cs_table
                .insert(primitive.name().to_owned(), CsDef::Primitive(primitive.name()));
        }
        // INITEX seeds lccode/uccode for ASCII letters so \lowercase/\uppercase
        // work out of the box; every other character defaults to 0 (no-op).
        for lower in 'a'..='z' {
            let upper = lower.to_ascii_uppercase();
            root.lccodes.insert(lower, lower as i32);
            root.lccodes.insert(upper, lower as i32);
            root.uccodes.insert(lower, upper as i32);
            root.uccodes.insert(upper, upper as i32);
        }
        Self {
            frames: vec![root],
            jobname: jobname.into(),
            mode: Mode::VerticalMode { inner: false },
            reading_state: ReadingState::NewLine,
            escapechar: i64::from(b'\\') as i32,
            endlinechar: i64::from(b'\r') as i32,
            current_font: None,
            after_assignment: None,
            after_group: vec![Vec::new()],
            input_line_no: 1,
            badness: 0,
            space_factor: 1000,
            endinput_pending: false,
            inputs: InputStack::new(),
            fonts: HashMap::new(),
            input_path: Vec::new(),
            allow_input: true,
        }
    }

    /// Pushes a new, empty frame: the lexical scope of a `{`.
    pub fn enter_group(&mut self) {
        self.frames.push(Frame::default());
        self.after_group.push(Vec::new());
        log::trace!("entered group, depth now {}", self.group_depth());
    }

    /// Pops the leaf frame, reverting every non-`\global` write made since
    /// the matching `enter_group`, and returns the `\aftergroup` tokens
    /// queued in that scope (in the order they were queued).
    ///
    /// # Panics
    /// Panics if called without a matching `enter_group` (the root frame
    /// must never be popped); callers must check `group_depth() > 0`
    /// first, which the command driver's "too many }'s" check already does.
    pub fn leave_group(&mut self) -> Vec<Token> {
        assert!(self.frames.len() > 1, "leave_group without enter_group");
        self.frames.pop();
        log::trace!("left group, depth now {}", self.group_depth());
        self.after_group.pop().unwrap_or_default()
    }

    #[must_use]
    pub fn group_depth(&self) -> usize {
        self.frames.len() - 1
    }

    fn leaf(&self) -> &Frame {
        self.frames.last().expect("at least one frame always present")
    }

    fn leaf_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("at least one frame always present")
    }

    fn root_mut(&mut self) -> &mut Frame {
        &mut self.frames[0]
    }

    /// The frame a write should land in: the root frame for `\global`
    /// writes, the leaf frame otherwise.
    fn write_target(&mut self, global: bool) -> &mut Frame {
        if global {
            self.root_mut()
        } else {
            self.leaf_mut()
        }
    }

    // -- category-like char tables: catcode, lccode, uccode, mathcode,
    // delcode, sfcode --------------------------------------------------

    #[must_use]
    pub fn category_of(&self, c: char) -> Category {
        for frame in self.frames.iter().rev() {
            if let Some(cat) = frame.catcodes.get(&c) {
                return *cat;
            }
        }
        Category::default_for(c)
    }

    pub fn set_category(&mut self, c: char, cat: Category, global: bool) {
        self.write_target(global).catcodes.insert(c, cat);
    }

    #[must_use]
    pub fn lccode_of(&self, c: char) -> i32 {
        self.lookup_code(|f| &f.lccodes, c).unwrap_or(0)
    }

    pub fn set_lccode(&mut self, c: char, value: i32, global: bool) {
        self.write_target(global).lccodes.insert(c, value);
    }

    #[must_use]
    pub fn uccode_of(&self, c: char) -> i32 {
        self.lookup_code(|f| &f.uccodes, c).unwrap_or(0)
    }

    pub fn set_uccode(&mut self, c: char, value: i32, global: bool) {
        self.write_target(global).uccodes.insert(c, value);
    }

    #[must_use]
    pub fn mathcode_of(&self, c: char) -> i32 {
        self.lookup_code(|f| &f.mathcodes, c)
            .unwrap_or(i32::from(c as u32 as u16))
    }

    pub fn set_mathcode(&mut self, c: char, value: i32, global: bool) {
        self.write_target(global).mathcodes.insert(c, value);
    }

    #[must_use]
    pub fn delcode_of(&self, c: char) -> i32 {
        self.lookup_code(|f| &f.delcodes, c).unwrap_or(-1)
    }

    pub fn set_delcode(&mut self, c: char, value: i32, global: bool) {
        self.write_target(global).delcodes.insert(c, value);
    }

    #[must_use]
    pub fn sfcode_of(&self, c: char) -> i32 {
        self.lookup_code(|f| &f.sfcodes, c).unwrap_or(1000)
    }

    pub fn set_sfcode(&mut self, c: char, value: i32, global: bool) {
        self.write_target(global).sfcodes.insert(c, value);
    }

    fn lookup_code<F>(&self, select: F, c: char) -> Option<i32>
    where
        F: Fn(&Frame) -> &std::collections::HashMap<char, i32>,
    {
        self.frames.iter().rev().find_map(|f| select(f).get(&c).copied())
    }

    // -- control sequences ------------------------------------------------

    #[must_use]
    pub fn lookup_cs(&self, name: &str) -> Option<&CsDef> {
        self.frames.iter().rev().find_map(|f| f.cs_table.get(name))
    }

    pub fn define_cs(&mut self, name: impl Into<String>, def: CsDef, global: bool) {
        self.write_target(global).cs_table.insert(name.into(), def);
    }

    // -- numeric/token-list registers --------------------------------------

    #[must_use]
    pub fn counter(&self, n: u8) -> i32 {
        self.frames.iter().rev().find_map(|f| f.counters.get(&n).copied()).unwrap_or(0)
    }

    pub fn set_counter(&mut self, n: u8, value: i32, global: bool) {
        self.write_target(global).counters.insert(n, value);
    }

    #[must_use]
    pub fn dimen(&self, n: u8) -> i32 {
        self.frames.iter().rev().find_map(|f| f.dimens.get(&n).copied()).unwrap_or(0)
    }

    pub fn set_dimen(&mut self, n: u8, value: i32, global: bool) {
        self.write_target(global).dimens.insert(n, value);
    }

    #[must_use]
    pub fn skip(&self, n: u8) -> crate::dimension::Glue {
        self.frames.iter().rev().find_map(|f| f.glues.get(&n).copied()).unwrap_or_default()
    }

    pub fn set_skip(&mut self, n: u8, value: crate::dimension::Glue, global: bool) {
        self.write_target(global).glues.insert(n, value);
    }

    #[must_use]
    pub fn muskip(&self, n: u8) -> crate::dimension::Glue {
        self.frames.iter().rev().find_map(|f| f.muglues.get(&n).copied()).unwrap_or_default()
    }

    pub fn set_muskip(&mut self, n: u8, value: crate::dimension::Glue, global: bool) {
        self.write_target(global).muglues.insert(n, value);
    }

    #[must_use]
    pub fn toks(&self, n: u8) -> Vec<Token> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.toks.get(&n).cloned())
            .unwrap_or_default()
    }

    pub fn set_toks(&mut self, n: u8, value: Vec<Token>, global: bool) {
        self.write_target(global).toks.insert(n, value);
    }

    // -- box dimensions and font family tables -----------------------------

    #[must_use]
    pub fn box_height(&self, n: u8) -> Dimension {
        self.frames.iter().rev().find_map(|f| f.box_heights.get(&n).copied()).unwrap_or(0)
    }

    #[must_use]
    pub fn box_width(&self, n: u8) -> Dimension {
        self.frames.iter().rev().find_map(|f| f.box_widths.get(&n).copied()).unwrap_or(0)
    }

    #[must_use]
    pub fn box_depth(&self, n: u8) -> Dimension {
        self.frames.iter().rev().find_map(|f| f.box_depths.get(&n).copied()).unwrap_or(0)
    }

    pub fn set_box_height(&mut self, n: u8, value: Dimension, global: bool) {
        self.write_target(global).box_heights.insert(n, value);
    }

    pub fn set_box_width(&mut self, n: u8, value: Dimension, global: bool) {
        self.write_target(global).box_widths.insert(n, value);
    }

    pub fn set_box_depth(&mut self, n: u8, value: Dimension, global: bool) {
        self.write_target(global).box_depths.insert(n, value);
    }

    #[must_use]
    pub fn text_font(&self, family: u8) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.text_fonts.get(&family))
            .map(String::as_str)
    }

    pub fn set_text_font(&mut self, family: u8, font: impl Into<String>, global: bool) {
        self.write_target(global).text_fonts.insert(family, font.into());
    }

    #[must_use]
    pub fn script_font(&self, family: u8) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.script_fonts.get(&family))
            .map(String::as_str)
    }

    pub fn set_script_font(&mut self, family: u8, font: impl Into<String>, global: bool) {
        self.write_target(global).script_fonts.insert(family, font.into());
    }

    #[must_use]
    pub fn scriptscript_font(&self, family: u8) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.scriptscript_fonts.get(&family))
            .map(String::as_str)
    }

    pub fn set_scriptscript_font(&mut self, family: u8, font: impl Into<String>, global: bool) {
        self.write_target(global).scriptscript_fonts.insert(family, font.into());
    }

    /// The [`FontRecord`] for `font` (the control-sequence name `\font`
    /// bound it to), inserting a default one if this is the first write.
    pub fn font_mut(&mut self, font: &str) -> &mut FontRecord {
        self.fonts.entry(font.to_owned()).or_default()
    }

    #[must_use]
    pub fn font(&self, font: &str) -> Option<&FontRecord> {
        self.fonts.get(font)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_reverts_local_writes_but_keeps_global_ones() {
        let mut env = Environment::new("job");
        env.set_counter(0, 1, false);
        env.enter_group();
        env.set_counter(0, 2, false);
        env.set_counter(1, 9, true);
        assert_eq!(env.counter(0), 2);
        env.leave_group();
        assert_eq!(env.counter(0), 1, "local write reverted on leave_group");
        assert_eq!(env.counter(1), 9, "global write persists after leave_group");
    }

    #[test]
    fn category_lookup_falls_back_to_default() {
        let env = Environment::new("job");
        assert_eq!(env.category_of('A'), Category::Letter);
        assert_eq!(env.category_of('\\'), Category::Escape);
    }

    #[test]
    fn primitives_are_preseeded() {
        let env = Environment::new("job");
        assert!(matches!(env.lookup_cs("relax"), Some(CsDef::Primitive("relax"))));
        assert!(env.lookup_cs("nosuchcs").is_none());
    }

    #[test]
    fn category_override_is_scoped() {
        let mut env = Environment::new("job");
        env.enter_group();
        env.set_category('!', Category::Active, false);
        assert_eq!(env.category_of('!'), Category::Active);
        env.leave_group();
        assert_eq!(env.category_of('!'), Category::Other);
    }
}
