//! Schema-driven argument decoding over a `TextReader`.

use std::cmp::Ordering;

use chatcmd_core::{Directory, MessageContext};
use tracing::debug;

use crate::args::{ArgValue, ArgumentMap};
use crate::error::ParseError;
use crate::reader::TextReader;
use crate::types::{ArgDefault, ArgKind, ArgumentSpec};

const TRUE_TOKENS: [&str; 3] = ["yes", "true", "1"];
const FALSE_TOKENS: [&str; 3] = ["no", "false", "0"];

/// Decodes message text against an argument schema.
///
/// `user` and `channel` arguments are resolved through the directory;
/// `current_user` / `current_channel` defaults come from the message context.
pub struct ArgumentParser<'a> {
    directory: &'a dyn Directory,
    ctx: &'a MessageContext,
}

impl<'a> ArgumentParser<'a> {
    pub fn new(directory: &'a dyn Directory, ctx: &'a MessageContext) -> Self {
        Self { directory, ctx }
    }

    /// Decode every slot of `schema` in declared order.
    ///
    /// Each optional slot that runs out of input gets its own default, if it
    /// declares one; otherwise it is left out of the map.
    pub async fn parse(
        &self,
        schema: &[ArgumentSpec],
        reader: &mut TextReader<'_>,
    ) -> Result<ArgumentMap, ParseError> {
        let mut parsed = ArgumentMap::new();

        for spec in schema {
            let token = match spec.kind {
                ArgKind::Remaining => Some(reader.read_remaining()).filter(|r| !r.is_empty()),
                _ => reader.next_token(),
            };

            let value = match token {
                Some(token) => self.decode(spec, token).await?,
                None if spec.optional => match self.default_for(spec) {
                    Some(value) => value,
                    None => {
                        debug!(symbol = %spec.symbol, "optional argument omitted");
                        continue;
                    }
                },
                None => {
                    return Err(ParseError::NotEnoughArguments {
                        symbol: spec.symbol.clone(),
                        kind: spec.kind,
                    });
                }
            };
            parsed.insert(spec.symbol.clone(), value);
        }

        Ok(parsed)
    }

    async fn decode(&self, spec: &ArgumentSpec, token: String) -> Result<ArgValue, ParseError> {
        // A choice's display name stands in for its value.
        if let Some(choice) = spec.choices.iter().flatten().find(|c| c.name == token) {
            if let Some(value) = choice.value.to_value(spec.kind) {
                check_limits(spec, &value)?;
                return Ok(value);
            }
        }

        let value = self.coerce(spec, &token).await?;
        check_limits(spec, &value)?;

        if let Some(choices) = &spec.choices {
            let listed = choices.iter().any(|c| c.value.to_value(spec.kind).as_ref() == Some(&value));
            if !listed {
                return Err(ParseError::InvalidChoice {
                    symbol: spec.symbol.clone(),
                    token,
                    choices: choices.iter().map(|c| c.name.clone()).collect(),
                });
            }
        }
        Ok(value)
    }

    async fn coerce(&self, spec: &ArgumentSpec, token: &str) -> Result<ArgValue, ParseError> {
        let symbol = || spec.symbol.clone();

        match spec.kind {
            ArgKind::String | ArgKind::Remaining => Ok(ArgValue::String(token.to_string())),
            ArgKind::Integer => {
                let value = token.parse::<i64>().map_err(|_| ParseError::InvalidInteger {
                    symbol: symbol(),
                    token: token.to_string(),
                })?;
                Ok(ArgValue::Integer(value))
            }
            ArgKind::Number => {
                let value = token
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .ok_or_else(|| ParseError::InvalidNumber {
                        symbol: symbol(),
                        token: token.to_string(),
                    })?;
                Ok(ArgValue::Number(value))
            }
            ArgKind::Boolean => {
                if TRUE_TOKENS.contains(&token) {
                    Ok(ArgValue::Boolean(true))
                } else if FALSE_TOKENS.contains(&token) {
                    Ok(ArgValue::Boolean(false))
                } else {
                    Err(ParseError::InvalidBoolean { symbol: symbol(), token: token.to_string() })
                }
            }
            ArgKind::User => {
                let user = self
                    .directory
                    .resolve_user(token)
                    .await
                    .map_err(|cause| ParseError::Directory { symbol: symbol(), cause })?;
                user.map(ArgValue::User)
                    .ok_or_else(|| ParseError::UserNotFound { symbol: symbol(), token: token.to_string() })
            }
            ArgKind::Channel => {
                let channel = self
                    .directory
                    .resolve_channel(token)
                    .await
                    .map_err(|cause| ParseError::Directory { symbol: symbol(), cause })?;
                channel.map(ArgValue::Channel).ok_or_else(|| ParseError::ChannelNotFound {
                    symbol: symbol(),
                    token: token.to_string(),
                })
            }
        }
    }

    fn default_for(&self, spec: &ArgumentSpec) -> Option<ArgValue> {
        match spec.default.as_ref()? {
            ArgDefault::CurrentUser => Some(ArgValue::User(self.ctx.author.clone())),
            ArgDefault::CurrentChannel => Some(ArgValue::Channel(self.ctx.channel.clone())),
            ArgDefault::Literal(literal) => literal.to_value(spec.kind),
        }
    }
}

/// Apply `max_length` and `min_value`/`max_value` to a decoded value.
///
/// Runs on every value, whether typed out or picked by choice name.
pub(crate) fn check_limits(spec: &ArgumentSpec, value: &ArgValue) -> Result<(), ParseError> {
    let (below, above, shown) = match *value {
        ArgValue::String(ref text) => {
            let length = text.chars().count();
            return match spec.max_length {
                Some(max) if length > max => Err(ParseError::MaxLengthExceeded {
                    symbol: spec.symbol.clone(),
                    max,
                    length,
                }),
                _ => Ok(()),
            };
        }
        ArgValue::Integer(n) => (
            spec.min_value.is_some_and(|min| compare_integer(n, min) == Ordering::Less),
            spec.max_value.is_some_and(|max| compare_integer(n, max) == Ordering::Greater),
            n as f64,
        ),
        ArgValue::Number(n) => (
            spec.min_value.is_some_and(|min| n < min),
            spec.max_value.is_some_and(|max| n > max),
            n,
        ),
        _ => return Ok(()),
    };
    if below || above {
        return Err(ParseError::OutOfRange {
            symbol: spec.symbol.clone(),
            value: shown,
            min: spec.min_value,
            max: spec.max_value,
        });
    }
    Ok(())
}

/// Compare an integer with a float bound without rounding the integer.
fn compare_integer(value: i64, bound: f64) -> Ordering {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

    if bound >= TWO_POW_63 {
        Ordering::Less
    } else if bound < -TWO_POW_63 {
        Ordering::Greater
    } else if bound.fract() == 0.0 {
        value.cmp(&(bound as i64))
    } else if value <= bound.floor() as i64 {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}
