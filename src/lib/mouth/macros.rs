//! Macro definition parsing (`\def`/`\gdef`/`\edef`/`\xdef`) and argument
//! matching/substitution against a [`MacroDef`].

use super::group::parse_group;
use super::Mouth;
use crate::category::Category;
use crate::env::{CsDef, Environment, MacroDef};
use crate::error::{Error, Result};
use crate::position::Position;
use crate::token::{Token, TokenKind};

/// Parses `\def<cs><param text>{<replacement>}` (the `\def` token itself
/// already consumed by the caller) and installs the resulting macro.
pub fn parse_and_install_definition(
    mouth: &mut Mouth,
    env: &mut Environment,
    long: bool,
    outer: bool,
    expand_body: bool,
    global: bool,
) -> Result<()> {
    let Some(name_token) = mouth.read_raw(env)? else {
        return Err(Error::Parse {
            position: Position::initial(),
            message: "file ended while reading a macro name".to_owned(),
        });
    };
    let name = name_token.cs_name().ok_or_else(|| Error::Parse {
        position: name_token.position.clone(),
        message: "macro name must be a control sequence".to_owned(),
    })?;
    let name = name.to_owned();

    let (mut parameter_text, reused_brace) = parse_parameter_text(mouth, env)?;

    let open = match reused_brace {
        Some(brace) => brace,
        None => {
            let Some(open) = mouth.read_raw(env)? else {
                return Err(Error::Parse {
                    position: name_token.position.clone(),
                    message: "file ended before a macro's replacement text".to_owned(),
                });
            };
            if open.as_character().map(|(_, c)| c) != Some(Category::BeginGroup) {
                return Err(Error::Parse {
                    position: open.position.clone(),
                    message: "missing { inserted before macro's replacement text".to_owned(),
                });
            }
            open
        }
    };

    let group = parse_group(mouth, env, open, false, false, false, true, false)?;
    let TokenKind::Group { inner, .. } = group.kind else {
        unreachable!("parse_group always returns a Group")
    };

    let mut replacement_reversed = inner;
    replacement_reversed.reverse();
    // `#{` rule: that same brace is also the first token of the
    // replacement text.
    if let Some(last) = parameter_text.last() {
        if last.as_character().map(|(_, c)| c) == Some(Category::BeginGroup) {
            replacement_reversed.push(last.clone());
        }
    }

    let def = MacroDef {
        name: name.clone(),
        parameter_text: std::mem::take(&mut parameter_text),
        replacement_reversed,
        long,
        outer,
    };

    let def = if expand_body {
        expand_replacement_text(mouth, env, def)?
    } else {
        def
    };

    env.define_cs(name, CsDef::Macro(def), global);
    Ok(())
}

/// Parses the parameter text preceding a macro's replacement group: a run
/// of literal tokens and `#n` parameter tokens, ending at the `{` that
/// opens the replacement (not consumed), unless the `#{` special rule
/// fires, in which case the consumed brace is returned as the second
/// element so the caller can reuse it as the replacement's opening brace.
fn parse_parameter_text(mouth: &mut Mouth, env: &mut Environment) -> Result<(Vec<Token>, Option<Token>)> {
    let mut template = Vec::new();
    let mut expected_index = 1u8;
    loop {
        let Some(token) = mouth.peek_raw(env)? else {
            return Err(Error::Parse {
                position: Position::initial(),
                message: "file ended while reading a macro's parameter text".to_owned(),
            });
        };
        if token.as_character().map(|(_, c)| c) == Some(Category::BeginGroup) {
            return Ok((template, None));
        }
        mouth.read_raw(env)?;
        if token.as_character().map(|(_, c)| c) == Some(Category::Parameter) {
            let Some(follow) = mouth.read_raw(env)? else {
                return Err(Error::Parse {
                    position: token.position.clone(),
                    message: "file ended while reading a parameter token".to_owned(),
                });
            };
            match follow.as_character() {
                Some((c, _)) if c.is_ascii_digit() && c != '0' => {
                    let index = c.to_digit(10).unwrap() as u8;
                    if index != expected_index {
                        return Err(Error::Parse {
                            position: follow.position.clone(),
                            message: "parameters must be numbered consecutively".to_owned(),
                        });
                    }
                    expected_index += 1;
                    template.push(Token::parameter(index, token.position.clone()));
                }
                Some((_, Category::BeginGroup)) => {
                    // `#{`: append `{` to the template (and, by the
                    // caller, to the replacement).
                    template.push(follow.clone());
                    return Ok((template, Some(follow)));
                }
                _ => {
                    return Err(Error::Parse {
                        position: follow.position.clone(),
                        message: "parameters must be numbered 1 through 9".to_owned(),
                    });
                }
            }
        } else {
            template.push(token);
        }
    }
}

/// Fully (and recursively) expands the tokens of a macro's replacement
/// text for `\edef`/`\xdef`, leaving `Parameter` tokens untouched.
///
/// Expansion is performed against a local buffer rather than the shared
/// pushback stack so it cannot read past the replacement text; should an
/// expandable primitive inside it need more raw tokens than the buffer
/// holds (e.g. an unterminated `\csname`), expansion falls through to the
/// live input stack, matching the surprising-but-real TeX behavior where
/// `\edef`'s body can, in principle, read past its own closing brace.
fn expand_replacement_text(mouth: &mut Mouth, env: &mut Environment, def: MacroDef) -> Result<MacroDef> {
    let saved = mouth.take_pushback();
    mouth.set_pushback_reversed(def.replacement_reversed.clone());

    let mut expanded = Vec::new();
    while !mouth.pushback_is_empty() {
        match mouth.read(env)? {
            Some(token) => expanded.push(token),
            None => break,
        }
    }
    mouth.set_pushback(saved);

    expanded.reverse();
    Ok(MacroDef {
        replacement_reversed: expanded,
        ..def
    })
}

/// Matches the macro's parameter template against raw input and expands
/// its replacement text, pushing the substituted tokens back onto the
/// mouth. `call_site` is the position of the control sequence that
/// triggered this expansion.
pub fn expand_macro(mouth: &mut Mouth, env: &mut Environment, def: &MacroDef, call_site: Position) -> Result<()> {
    log::debug!("expanding \\{} at {call_site}", def.name);
    let mut args: Vec<Vec<Token>> = Vec::new();
    let mut index = 0usize;
    while index < def.parameter_text.len() {
        let tmpl_token = &def.parameter_text[index];
        match &tmpl_token.kind {
            TokenKind::Parameter(_) => {
                let next_is_delimiter = def
                    .parameter_text
                    .get(index + 1)
                    .map(|t| !matches!(t.kind, TokenKind::Parameter(_)));
                match next_is_delimiter {
                    Some(true) => {
                        let delimiter = def.parameter_text[index + 1].clone();
                        args.push(collect_delimited_argument(mouth, env, &delimiter, def.long)?);
                        index += 2;
                    }
                    _ => {
                        args.push(collect_undelimited_argument(mouth, env, def.long)?);
                        index += 1;
                    }
                }
            }
            _ => {
                let Some(next) = mouth.read_raw(env)? else {
                    return Err(Error::Parse {
                        position: call_site,
                        message: format!("file ended while matching \\{}'s parameter text", def.name),
                    });
                };
                if next.kind != tmpl_token.kind {
                    return Err(Error::Parse {
                        position: next.position.clone(),
                        message: format!("use of \\{} doesn't match its definition", def.name),
                    });
                }
                index += 1;
            }
        }
    }

    let mut output = Vec::with_capacity(def.replacement_reversed.len());
    for token in &def.replacement_reversed {
        match &token.kind {
            TokenKind::Parameter(i) => {
                let arg = args.get(usize::from(*i).saturating_sub(1)).ok_or_else(|| {
                    Error::Internal(format!("\\{} has no argument #{i}", def.name))
                })?;
                for t in arg.iter().rev() {
                    output.push(t.clone().stacked_at(call_site.clone()));
                }
            }
            _ => output.push(token.clone().stacked_at(call_site.clone())),
        }
    }

    mouth.push_back_reversed(output);
    Ok(())
}

fn collect_undelimited_argument(mouth: &mut Mouth, env: &mut Environment, long: bool) -> Result<Vec<Token>> {
    let Some(peeked) = mouth.peek_raw(env)? else {
        return Err(Error::Parse {
            position: Position::initial(),
            message: "file ended while reading a macro argument".to_owned(),
        });
    };
    if peeked.as_character().map(|(_, c)| c) == Some(Category::BeginGroup) {
        let open = mouth.read_raw(env)?.expect("just peeked");
        let group = parse_group(mouth, env, open, false, true, !long, false, false)?;
        let TokenKind::Group { inner, .. } = group.kind else {
            unreachable!()
        };
        return Ok(inner);
    }
    let token = mouth.read_raw(env)?.expect("just peeked");
    check_argument_token(env, &token, long)?;
    Ok(vec![token])
}

fn collect_delimited_argument(
    mouth: &mut Mouth,
    env: &mut Environment,
    delimiter: &Token,
    long: bool,
) -> Result<Vec<Token>> {
    let mut collected = Vec::new();
    let mut level: u32 = 0;
    loop {
        let Some(token) = mouth.read_raw(env)? else {
            return Err(Error::Parse {
                position: Position::initial(),
                message: "file ended while matching a delimited macro argument".to_owned(),
            });
        };
        if level == 0 && token == *delimiter {
            break;
        }
        check_argument_token(env, &token, long)?;
        match token.as_character() {
            Some((_, Category::BeginGroup)) => level += 1,
            Some((_, Category::EndGroup)) => {
                if level == 0 {
                    return Err(Error::Parse {
                        position: token.position.clone(),
                        message: "argument of macro has an extra }".to_owned(),
                    });
                }
                level -= 1;
            }
            _ => {}
        }
        collected.push(token);
    }
    Ok(strip_enclosing_braces(collected))
}

/// TeX strips one level of braces when a delimited argument turns out to
/// be a single balanced group spanning the whole argument.
fn strip_enclosing_braces(tokens: Vec<Token>) -> Vec<Token> {
    if tokens.len() < 2 {
        return tokens;
    }
    let starts_group = tokens.first().and_then(Token::as_character).map(|(_, c)| c) == Some(Category::BeginGroup);
    let ends_group = tokens.last().and_then(Token::as_character).map(|(_, c)| c) == Some(Category::EndGroup);
    if !starts_group || !ends_group {
        return tokens;
    }
    let mut level = 0i32;
    for (i, token) in tokens.iter().enumerate() {
        match token.as_character().map(|(_, c)| c) {
            Some(Category::BeginGroup) => level += 1,
            Some(Category::EndGroup) => {
                level -= 1;
                if level == 0 && i != tokens.len() - 1 {
                    return tokens;
                }
            }
            _ => {}
        }
    }
    tokens[1..tokens.len() - 1].to_vec()
}

fn check_argument_token(env: &Environment, token: &Token, long: bool) -> Result<()> {
    let Some(name) = token.cs_name() else { return Ok(()) };
    if name == "par" && !long {
        return Err(Error::Expansion {
            position: token.position.clone(),
            message: "paragraph ended before macro argument was complete".to_owned(),
        });
    }
    if let Some(CsDef::Macro(def)) = env.lookup_cs(name) {
        if def.outer {
            return Err(Error::Expansion {
                position: token.position.clone(),
                message: format!("\\{name} is \\outer and cannot appear in a macro argument"),
            });
        }
    }
    Ok(())
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
    fn defines_and_expands_simple_macro() {
        let (mut mouth, mut env) = mouth_with("\\def\\foo#1{x#1x}\\foo{AB}");
        mouth.read_raw(&mut env).unwrap(); // \def
        parse_and_install_definition(&mut mouth, &mut env, false, false, false, false).unwrap();
        let head = mouth.read_raw(&mut env).unwrap().unwrap();
        assert_eq!(head.cs_name(), Some("foo"));
        let CsDef::Macro(def) = env.lookup_cs("foo").unwrap().clone() else {
            panic!("expected macro");
        };
        expand_macro(&mut mouth, &mut env, &def, head.position.clone()).unwrap();
        let mut chars = Vec::new();
        while let Some(t) = mouth.read_raw(&mut env).unwrap() {
            chars.push(t.as_character().unwrap().0);
        }
        assert_eq!(chars, vec!['x', 'A', 'B', 'x']);
    }

    #[test]
    fn delimited_argument_stops_at_delimiter() {
        let (mut mouth, mut env) = mouth_with("\\def\\a#1;{[#1]}\\a hello;");
        mouth.read_raw(&mut env).unwrap();
        parse_and_install_definition(&mut mouth, &mut env, false, false, false, false).unwrap();
        let head = mouth.read_raw(&mut env).unwrap().unwrap();
        let CsDef::Macro(def) = env.lookup_cs("a").unwrap().clone() else {
            panic!("expected macro");
        };
        expand_macro(&mut mouth, &mut env, &def, head.position.clone()).unwrap();
        let mut chars = Vec::new();
        while let Some(t) = mouth.read_raw(&mut env).unwrap() {
            chars.push(t.as_character().unwrap().0);
        }
        assert_eq!(chars, vec!['[', 'h', 'e', 'l', 'l', 'o', ']']);
    }
}
