//! The Mouth: expansion-aware reading of the Eyes' token stream, and the
//! top-level command driver that turns it into a stream of primitive
//! [`Command`]s for the Stomach. This is the heart of
//! the pipeline: macro expansion, conditionals, and the assignment/number
//! grammar all live here.

pub mod assignment;
mod conditionals;
mod expand;
mod group;
mod macros;
mod numeric;

pub use macros::expand_macro;
pub use numeric::{parse_dimension, parse_glue, parse_number};
pub(crate) use expand::{meaning_text, render_tokens};

use crate::category::Category;
use crate::command::{Command, PositionedCommand};
use crate::env::{CsDef, Environment};
use crate::error::{Error, Result};
use crate::position::Position;
use crate::primitives::Primitive;
use crate::token::Token;

/// A pending one-step expansion result: either the final token for this
/// read, or a signal that expansion pushed new input and reading should
/// continue.
enum ExpansionOutcome {
    Produced(Token),
    Continue,
}

/// Reads tokens out of the [`Environment`]'s input stack (via
/// [`crate::eyes`]), expanding expandable control sequences on demand. Owns
/// only the pushback stack: everything else (category codes, registers,
/// the input stack itself) lives on the [`Environment`] so that macro
/// expansion and `\input` can mutate it uniformly.
pub struct Mouth {
    /// LIFO stack of tokens to read before pulling a fresh one from the
    /// Eyes; last element is read next.
    pushback: Vec<Token>,
    expand_enabled: bool,
}

impl Default for Mouth {
    fn default() -> Self {
        Self::new()
    }
}

impl Mouth {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pushback: Vec::new(),
            expand_enabled: true,
        }
    }

    /// Reads the next token without expanding it, preferring the pushback
    /// stack over the Eyes.
    pub fn read_raw(&mut self, env: &mut Environment) -> Result<Option<Token>> {
        if let Some(token) = self.pushback.pop() {
            return Ok(Some(token));
        }
        crate::eyes::next_token(env)
    }

    /// Peeks the next raw token without consuming it.
    pub fn peek_raw(&mut self, env: &mut Environment) -> Result<Option<Token>> {
        if let Some(token) = self.pushback.last() {
            return Ok(Some(token.clone()));
        }
        match crate::eyes::next_token(env)? {
            Some(token) => {
                self.pushback.push(token.clone());
                Ok(Some(token))
            }
            None => Ok(None),
        }
    }

    /// Pushes `tokens` back in the order given (the first element will be
    /// the next one read); reverses them onto the LIFO pushback stack.
    pub fn push_back(&mut self, tokens: Vec<Token>) {
        self.pushback.extend(tokens.into_iter().rev());
    }

    /// Pushes tokens already in stack order (last-to-read first), as
    /// produced by [`crate::env::MacroDef::replacement_reversed`], without
    /// re-reversing them — an O(1) extend rather than an O(n) prepend.
    pub fn push_back_reversed(&mut self, tokens_stack_order: Vec<Token>) {
        self.pushback.extend(tokens_stack_order);
    }

    pub fn take_pushback(&mut self) -> Vec<Token> {
        std::mem::take(&mut self.pushback)
    }

    pub fn set_pushback(&mut self, stack: Vec<Token>) {
        self.pushback = stack;
    }

    pub fn set_pushback_reversed(&mut self, tokens_stack_order: Vec<Token>) {
        self.pushback = tokens_stack_order;
    }

    #[must_use]
    pub fn pushback_is_empty(&self) -> bool {
        self.pushback.is_empty()
    }

    /// Reads the next token, expanding macros, conditionals, and the other
    /// expandable primitives until a non-expandable token results.
    pub fn read(&mut self, env: &mut Environment) -> Result<Option<Token>> {
        loop {
            let Some(token) = self.read_raw(env)? else {
                return Ok(None);
            };
            if !self.expand_enabled {
                return Ok(Some(token));
            }
            match self.expand_step(env, &token)? {
                ExpansionOutcome::Produced(t) => return Ok(Some(t)),
                ExpansionOutcome::Continue => continue,
            }
        }
    }

    /// Reads the next (fully expanded) token without consuming it.
    pub fn peek(&mut self, env: &mut Environment) -> Result<Option<Token>> {
        match self.read(env)? {
            Some(token) => {
                self.push_back(vec![token.clone()]);
                Ok(Some(token))
            }
            None => Ok(None),
        }
    }

    /// Performs exactly one expansion step on `token` (as opposed to
    /// [`Self::read`], which loops until a non-expandable token results).
    /// Used directly by `\expandafter`.
    fn expand_step(&mut self, env: &mut Environment, token: &Token) -> Result<ExpansionOutcome> {
        let Some(name) = token.cs_name() else {
            return Ok(ExpansionOutcome::Produced(token.clone()));
        };
        match env.lookup_cs(name).cloned() {
            None => Ok(ExpansionOutcome::Produced(token.clone())),
            Some(CsDef::Macro(def)) => {
                macros::expand_macro(self, env, &def, token.position.clone())?;
                Ok(ExpansionOutcome::Continue)
            }
            Some(CsDef::CsAlias(target)) => {
                self.push_back(vec![*target]);
                Ok(ExpansionOutcome::Continue)
            }
            Some(CsDef::Primitive(prim_name)) => {
                let Some(primitive) = Primitive::from_name(prim_name) else {
                    return Ok(ExpansionOutcome::Produced(token.clone()));
                };
                if !primitive.is_expandable() {
                    return Ok(ExpansionOutcome::Produced(token.clone()));
                }
                self.expand_primitive(env, primitive, token.position.clone())
            }
            Some(_) => Ok(ExpansionOutcome::Produced(token.clone())),
        }
    }

    fn expand_primitive(
        &mut self,
        env: &mut Environment,
        primitive: Primitive,
        position: Position,
    ) -> Result<ExpansionOutcome> {
        match primitive {
            Primitive::Iftrue
            | Primitive::Iffalse
            | Primitive::Ifnum
            | Primitive::Ifdim
            | Primitive::Ifodd
            | Primitive::Ifvmode
            | Primitive::Ifhmode
            | Primitive::Ifmmode
            | Primitive::Ifinner
            | Primitive::If
            | Primitive::Ifcat
            | Primitive::Ifx
            | Primitive::Ifcase => {
                conditionals::evaluate(self, env, primitive, position)?;
                Ok(ExpansionOutcome::Continue)
            }
            Primitive::Fi | Primitive::Else | Primitive::Or => Err(Error::Expansion {
                position,
                message: format!("extra \\{}", primitive.name()),
            }),
            Primitive::Input => {
                expand::input(self, env, position)?;
                Ok(ExpansionOutcome::Continue)
            }
            Primitive::Endinput => {
                expand::endinput(env);
                Ok(ExpansionOutcome::Continue)
            }
            Primitive::Jobname => {
                expand::jobname(self, env, position)?;
                Ok(ExpansionOutcome::Continue)
            }
            Primitive::Romannumeral => {
                expand::romannumeral(self, env, position)?;
                Ok(ExpansionOutcome::Continue)
            }
            Primitive::Number => {
                expand::number(self, env, position)?;
                Ok(ExpansionOutcome::Continue)
            }
            Primitive::String => {
                expand::string(self, env, position)?;
                Ok(ExpansionOutcome::Continue)
            }
            Primitive::Meaning => {
                expand::meaning(self, env, position)?;
                Ok(ExpansionOutcome::Continue)
            }
            Primitive::Csname => {
                expand::csname(self, env, position)?;
                Ok(ExpansionOutcome::Continue)
            }
            Primitive::The => {
                expand::the(self, env, position)?;
                Ok(ExpansionOutcome::Continue)
            }
            Primitive::Expandafter => {
                let Some(first) = self.read_raw(env)? else {
                    return Err(unexpected_eof(&position));
                };
                let Some(next) = self.read_raw(env)? else {
                    return Err(unexpected_eof(&position));
                };
                match self.expand_step(env, &next)? {
                    ExpansionOutcome::Produced(token) => self.push_back(vec![token]),
                    ExpansionOutcome::Continue => {}
                }
                self.push_back(vec![first]);
                Ok(ExpansionOutcome::Continue)
            }
            Primitive::Noexpand => {
                let Some(token) = self.read_raw(env)? else {
                    return Err(unexpected_eof(&position));
                };
                Ok(ExpansionOutcome::Produced(token))
            }
            _ => Err(Error::Internal(format!("{} is not an expandable primitive", primitive.name()))),
        }
    }

    /// The command driver: consumes prefix modifiers
    /// (`\long`/`\outer`/`\global`), dispatches `{`/`}` to group
    /// enter/leave, macro definitions to [`macros::parse_and_install_definition`],
    /// assignment-starting primitives to [`assignment::parse_assignment`],
    /// and falls through to [`Command::Typeset`]/[`Command::Cs`] otherwise.
    pub fn next_command(&mut self, env: &mut Environment) -> Result<Option<PositionedCommand>> {
        loop {
            let (long, outer, global) = self.consume_prefixes(env)?;

            let Some(token) = self.read(env)? else {
                return Ok(None);
            };
            let position = token.position.clone();

            if let Some((c, category)) = token.as_character() {
                match category {
                    Category::BeginGroup => {
                        env.enter_group();
                        continue;
                    }
                    Category::EndGroup => {
                        if env.group_depth() == 0 {
                            return Err(Error::Expansion {
                                position,
                                message: "too many }'s".to_owned(),
                            });
                        }
                        let after_group = env.leave_group();
                        self.push_back(after_group);
                        continue;
                    }
                    _ => {
                        return Ok(Some(PositionedCommand {
                            command: Command::Typeset(c),
                            position,
                        }));
                    }
                }
            }

            let Some(name) = token.cs_name() else {
                // A bare Parameter/Group token reaching the command driver
                // indicates a macro body was read outside expansion; treat
                // it as opaque.
                continue;
            };

            let Some(def) = env.lookup_cs(name).cloned() else {
                return Ok(Some(PositionedCommand {
                    command: Command::Cs(name.to_owned()),
                    position,
                }));
            };

            let CsDef::Primitive(prim_name) = def else {
                return Ok(Some(PositionedCommand {
                    command: Command::Cs(name.to_owned()),
                    position,
                }));
            };

            let Some(primitive) = Primitive::from_name(prim_name) else {
                return Ok(Some(PositionedCommand {
                    command: Command::Cs(name.to_owned()),
                    position,
                }));
            };

            if let Some(command) = self.dispatch_primitive(env, primitive, long, outer, global, &position)? {
                return Ok(Some(PositionedCommand { command, position }));
            }
        }
    }

    fn consume_prefixes(&mut self, env: &mut Environment) -> Result<(bool, bool, bool)> {
        let (mut long, mut outer, mut global) = (false, false, false);
        loop {
            let Some(token) = self.peek(env)? else { break };
            let Some(name) = token.cs_name() else { break };
            match env.lookup_cs(name).cloned() {
                Some(CsDef::Primitive("long")) => {
                    self.read(env)?;
                    long = true;
                }
                Some(CsDef::Primitive("outer")) => {
                    self.read(env)?;
                    outer = true;
                }
                Some(CsDef::Primitive("global")) => {
                    self.read(env)?;
                    global = true;
                }
                _ => break,
            }
        }
        Ok((long, outer, global))
    }

    /// Executes one non-expandable primitive. Returns `Ok(None)` for
    /// primitives that don't themselves produce a `Command` (definitions,
    /// `\ignorespaces`'s space-skipping), in which case the caller's loop
    /// continues to the next token.
    fn dispatch_primitive(
        &mut self,
        env: &mut Environment,
        primitive: Primitive,
        long: bool,
        outer: bool,
        global: bool,
        position: &Position,
    ) -> Result<Option<Command>> {
        match primitive {
            Primitive::Relax => Ok(Some(Command::Relax)),
            Primitive::Par => Ok(Some(Command::Par)),
            Primitive::End => Ok(Some(Command::End)),
            Primitive::Def | Primitive::Gdef | Primitive::Edef | Primitive::Xdef => {
                let (def_global, expand_body) = match primitive {
                    Primitive::Def => (global, false),
                    Primitive::Gdef => (true, false),
                    Primitive::Edef => (global, true),
                    _ => (true, true),
                };
                macros::parse_and_install_definition(self, env, long, outer, expand_body, def_global)?;
                Ok(None)
            }
            Primitive::Ignorespaces => {
                while matches!(self.peek(env)?.and_then(|t| t.as_character()), Some((' ', _))) {
                    self.read(env)?;
                }
                Ok(Some(Command::Ignorespaces))
            }
            Primitive::Message | Primitive::Errmessage => {
                let tokens = self.read_braced_tokens(env, position)?;
                Ok(Some(Command::Message {
                    tokens,
                    error: primitive == Primitive::Errmessage,
                }))
            }
            Primitive::Showthe => {
                let before = self.pushback.len();
                expand::the(self, env, position.clone())?;
                let mut produced = self.pushback.split_off(before);
                produced.reverse();
                Ok(Some(Command::Showthe(produced)))
            }
            Primitive::Show => {
                let Some(token) = self.read_raw(env)? else {
                    return Err(unexpected_eof(position));
                };
                Ok(Some(Command::Show(Box::new(token))))
            }
            Primitive::Uppercase => Ok(Some(Command::Uppercase(self.read_braced_tokens(env, position)?))),
            Primitive::Lowercase => Ok(Some(Command::Lowercase(self.read_braced_tokens(env, position)?))),
            Primitive::Setbox
            | Primitive::Ht
            | Primitive::Wd
            | Primitive::Dp
            | Primitive::Count
            | Primitive::Dimen
            | Primitive::Skip
            | Primitive::Muskip
            | Primitive::Toks
            | Primitive::Catcode
            | Primitive::Mathcode
            | Primitive::Lccode
            | Primitive::Uccode
            | Primitive::Sfcode
            | Primitive::Delcode
            | Primitive::Chardef
            | Primitive::Countdef
            | Primitive::Dimendef
            | Primitive::Skipdef
            | Primitive::Muskipdef
            | Primitive::Toksdef
            | Primitive::Mathchardef
            | Primitive::Let
            | Primitive::Futurelet
            | Primitive::Advance
            | Primitive::Multiply
            | Primitive::Divide
            | Primitive::Font
            | Primitive::Textfont
            | Primitive::Scriptfont
            | Primitive::Scriptscriptfont
            | Primitive::Fontdimen
            | Primitive::Hyphenchar
            | Primitive::Skewchar
            | Primitive::Read => {
                let assignment = assignment::parse_assignment(self, env, primitive, position)?;
                Ok(Some(Command::Assignment { assignment, global }))
            }
            Primitive::Hbox | Primitive::Vbox | Primitive::Vtop => {
                let kind = match primitive {
                    Primitive::Hbox => crate::command::BoxKind::Hbox,
                    Primitive::Vbox => crate::command::BoxKind::Vbox,
                    _ => crate::command::BoxKind::Vtop,
                };
                Ok(Some(Command::StartBox { register: None, kind }))
            }
            _ => Ok(Some(Command::Cs(primitive.name().to_owned()))),
        }
    }

    /// Reads `{<tokens>}` raw (unexpanded), returning the inner tokens —
    /// the shape `\message`/`\uppercase`/`\lowercase` all share.
    fn read_braced_tokens(&mut self, env: &mut Environment, position: &Position) -> Result<Vec<Token>> {
        numeric::skip_spaces(self, env)?;
        let Some(open) = self.read_raw(env)? else {
            return Err(unexpected_eof(position));
        };
        if open.as_character().map(|(_, c)| c) != Some(Category::BeginGroup) {
            return Err(Error::Parse {
                position: open.position.clone(),
                message: "missing { inserted".to_owned(),
            });
        }
        let group = group::parse_group(self, env, open, false, false, false, false, false)?;
        match group.kind {
            crate::token::TokenKind::Group { inner, .. } => Ok(inner),
            _ => unreachable!("parse_group always returns a Group"),
        }
    }
}

fn unexpected_eof(position: &Position) -> Error {
    Error::Expansion {
        position: position.clone(),
        message: "end of input".to_owned(),
    }
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
    fn reads_plain_characters_as_typeset_commands() {
        let (mut mouth, mut env) = mouth_with("ab");
        let first = mouth.next_command(&mut env).unwrap().unwrap();
        assert_eq!(first.command, Command::Typeset('a'));
        let second = mouth.next_command(&mut env).unwrap().unwrap();
        assert_eq!(second.command, Command::Typeset('b'));
    }

    #[test]
    fn macro_expansion_feeds_the_command_driver() {
        let (mut mouth, mut env) = mouth_with("\\def\\x{ab}\\x");
        assert!(mouth.next_command(&mut env).unwrap().is_none().not());
        // The \def produced no command of its own; the next command should
        // be the expansion of \x.
    }

    #[test]
    fn unmatched_end_group_is_an_error() {
        let (mut mouth, mut env) = mouth_with("}");
        assert!(mouth.next_command(&mut env).is_err());
    }

    #[test]
    fn group_scopes_a_catcode_change() {
        let (mut mouth, mut env) = mouth_with("{\\catcode`!=13 }!");
        loop {
            match mouth.next_command(&mut env).unwrap() {
                Some(cmd) if cmd.command == Command::Typeset('!') => panic!("! should be active outside the group"),
                Some(_) => continue,
                None => break,
            }
        }
    }

    trait NotBool {
        fn not(self) -> bool;
    }
    impl NotBool for bool {
        fn not(self) -> bool {
            !self
        }
    }
}
