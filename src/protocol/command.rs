//! Command definitions
//!
//! A command as sent to the store: a name followed by binary arguments.

use crate::buffer::Buffer;

/// A request ready for encoding
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Command name, e.g. `HSET`
    name: &'static str,

    /// Arguments following the name
    args: Vec<Buffer>,
}

impl Command {
    /// Start a command with no arguments
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            args: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<Buffer>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append every argument yielded by `args`
    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Buffer>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn arguments(&self) -> &[Buffer] {
        &self.args
    }
}
