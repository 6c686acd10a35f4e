//! Balanced-group parsing: collects the tokens between a
//! begin-group character and its matching end-group character into a
//! [`TokenKind::Group`].

use super::Mouth;
use crate::category::Category;
use crate::env::{CsDef, Environment};
use crate::error::{Error, Result};
use crate::token::{Token, TokenKind};

/// Parses the balanced group that follows an already-consumed begin-group
/// token `open`.
///
/// - `expand`: read expanded tokens (`mouth.read`) rather than raw ones.
/// - `forbid_outer`: an `\outer` macro reference anywhere inside is an error.
/// - `forbid_par`: a bare `\par` anywhere inside is an error.
/// - `with_params`: a parameter character switches to parsing a parameter
///   token (`#n` → `Parameter(n)`, `##` → a literal `#`), for collecting a
///   macro's replacement text.
/// - `reverted`: store `inner` in reverse order instead of forward order.
#[allow(clippy::too_many_arguments)]
pub fn parse_group(
    mouth: &mut Mouth,
    env: &mut Environment,
    open: Token,
    expand: bool,
    forbid_outer: bool,
    forbid_par: bool,
    with_params: bool,
    reverted: bool,
) -> Result<Token> {
    let mut inner = Vec::new();
    let mut level: u32 = 0;

    loop {
        let next = if expand { mouth.read(env)? } else { mouth.read_raw(env)? };
        let Some(token) = next else {
            return Err(Error::Parse {
                position: open.position.clone(),
                message: "file ended while scanning a group".to_owned(),
            });
        };

        match token.as_character() {
            Some((_, Category::BeginGroup)) => {
                level += 1;
                inner.push(token);
            }
            Some((_, Category::EndGroup)) if level == 0 => {
                if reverted {
                    inner.reverse();
                }
                let position = open.position.clone();
                return Ok(Token::new(
                    TokenKind::Group {
                        open: Box::new(open),
                        inner,
                        close: Box::new(token),
                    },
                    position,
                ));
            }
            Some((_, Category::EndGroup)) => {
                level -= 1;
                inner.push(token);
            }
            Some((_, Category::Parameter)) if with_params && level == 0 => {
                let Some(follow) = mouth.read_raw(env)? else {
                    return Err(Error::Parse {
                        position: token.position.clone(),
                        message: "file ended while reading a parameter token".to_owned(),
                    });
                };
                match follow.as_character() {
                    Some((_, Category::Parameter)) => {
                        inner.push(Token::character('#', Category::Other, token.position.clone()));
                    }
                    Some((c, _)) if c.is_ascii_digit() && c != '0' => {
                        let index = c.to_digit(10).unwrap() as u8;
                        inner.push(Token::parameter(index, token.position.clone()));
                    }
                    _ => {
                        return Err(Error::Parse {
                            position: follow.position.clone(),
                            message: "parameters must be numbered consecutively".to_owned(),
                        });
                    }
                }
            }
            _ => {
                check_forbidden(env, &token, forbid_outer, forbid_par)?;
                inner.push(token);
            }
        }
    }
}

fn check_forbidden(env: &Environment, token: &Token, forbid_outer: bool, forbid_par: bool) -> Result<()> {
    let Some(name) = token.cs_name() else { return Ok(()) };
    if forbid_par && name == "par" {
        return Err(Error::Expansion {
            position: token.position.clone(),
            message: "paragraph ended before a group was complete".to_owned(),
        });
    }
    if forbid_outer {
        if let Some(CsDef::Macro(def)) = env.lookup_cs(name) {
            if def.outer {
                return Err(Error::Expansion {
                    position: token.position.clone(),
                    message: format!("\\{name} is \\outer and cannot appear here"),
                });
            }
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
    fn collects_balanced_inner_tokens() {
        let (mut mouth, mut env) = mouth_with("ab{c}d}");
        // Consume 'a', 'b' first.
        mouth.read_raw(&mut env).unwrap();
        mouth.read_raw(&mut env).unwrap();
        let open = mouth.read_raw(&mut env).unwrap().unwrap();
        let group = parse_group(&mut mouth, &mut env, open, false, false, false, false, false).unwrap();
        match group.kind {
            TokenKind::Group { inner, .. } => {
                assert_eq!(inner.len(), 3);
            }
            _ => panic!("expected a group"),
        }
    }

    #[test]
    fn nested_groups_are_tracked() {
        let (mut mouth, mut env) = mouth_with("{a{b}c}");
        let open = mouth.read_raw(&mut env).unwrap().unwrap();
        let group = parse_group(&mut mouth, &mut env, open, false, false, false, false, false).unwrap();
        match group.kind {
            TokenKind::Group { inner, .. } => assert_eq!(inner.len(), 5),
            _ => panic!("expected a group"),
        }
    }
}
