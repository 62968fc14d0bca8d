/// Decoded argument values handed to command handlers.
use std::collections::HashMap;

use chatcmd_core::{ChannelRef, UserRef};
use serde::Serialize;

/// A single decoded argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User(UserRef),
    Channel(ChannelRef),
}

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ArgValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Number(n) => Some(*n),
            ArgValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&UserRef> {
        match self {
            ArgValue::User(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_channel(&self) -> Option<&ChannelRef> {
        match self {
            ArgValue::Channel(c) => Some(c),
            _ => None,
        }
    }
}

/// Decoded arguments keyed by symbol.
///
/// Optional slots without a token and without a default are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArgumentMap {
    values: HashMap<String, ArgValue>,
}

impl ArgumentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, value: ArgValue) {
        self.values.insert(symbol.into(), value);
    }

    pub fn get(&self, symbol: &str) -> Option<&ArgValue> {
        self.values.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.values.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn str(&self, symbol: &str) -> Option<&str> {
        self.get(symbol).and_then(ArgValue::as_str)
    }

    pub fn i64(&self, symbol: &str) -> Option<i64> {
        self.get(symbol).and_then(ArgValue::as_i64)
    }

    pub fn f64(&self, symbol: &str) -> Option<f64> {
        self.get(symbol).and_then(ArgValue::as_f64)
    }

    pub fn bool(&self, symbol: &str) -> Option<bool> {
        self.get(symbol).and_then(ArgValue::as_bool)
    }

    pub fn user(&self, symbol: &str) -> Option<&UserRef> {
        self.get(symbol).and_then(ArgValue::as_user)
    }

    pub fn channel(&self, symbol: &str) -> Option<&ChannelRef> {
        self.get(symbol).and_then(ArgValue::as_channel)
    }
}

/// What a handler receives in place of its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    /// The command declares a schema.
    Parsed(ArgumentMap),
    /// No schema: the remainder split on whitespace, verbatim.
    Raw(Vec<String>),
}

impl Arguments {
    pub fn parsed(&self) -> Option<&ArgumentMap> {
        match self {
            Arguments::Parsed(map) => Some(map),
            Arguments::Raw(_) => None,
        }
    }

    pub fn words(&self) -> &[String] {
        match self {
            Arguments::Raw(words) => words,
            Arguments::Parsed(_) => &[],
        }
    }
}
