//! One scope's delta over the six scoped maps this engine tracks:
//! category-ish char tables, the control-sequence table, and the
//! counter/dimen/glue/muglue/toks registers.

use super::cs::CsDef;
use crate::category::Category;
use crate::dimension::Glue;
use crate::token::Token;
use std::collections::HashMap;

/// A single lexical scope's writes. [`super::Environment`] keeps a stack of
/// these; a lookup walks the stack leaf-to-root, a `\global` write lands in
/// the root frame, any other write lands in the leaf frame.
#[derive(Default)]
pub struct Frame {
    pub catcodes: HashMap<char, Category>,
    pub lccodes: HashMap<char, i32>,
    pub uccodes: HashMap<char, i32>,
    pub mathcodes: HashMap<char, i32>,
    pub delcodes: HashMap<char, i32>,
    pub sfcodes: HashMap<char, i32>,
    pub cs_table: HashMap<String, CsDef>,
    pub counters: HashMap<u8, i32>,
    pub dimens: HashMap<u8, i32>,
    pub glues: HashMap<u8, Glue>,
    pub muglues: HashMap<u8, Glue>,
    pub toks: HashMap<u8, Vec<Token>>,
    /// `\textfont`/`\scriptfont`/`\scriptscriptfont` family assignments:
    /// font family number to the control-sequence name of the selected font.
    pub text_fonts: HashMap<u8, String>,
    pub script_fonts: HashMap<u8, String>,
    pub scriptscript_fonts: HashMap<u8, String>,
    /// `\ht`/`\wd`/`\dp` box-dimension registers.
    pub box_heights: HashMap<u8, i32>,
    pub box_widths: HashMap<u8, i32>,
    pub box_depths: HashMap<u8, i32>,
}
