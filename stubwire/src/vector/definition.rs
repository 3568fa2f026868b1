//! Vector definitions: one concrete technique per variant.

use std::fmt;
use std::sync::Arc;

use super::template::{FormatArgs, Template};
use super::{Os, Output};
use crate::channel::Channel;
use crate::error::{Result, VectorError};
use crate::transport::Transport;

/// Converts the raw text returned by the stub into a typed output.
pub type Postprocess = Arc<dyn Fn(String) -> Output + Send + Sync>;

fn finish(raw: Option<String>, postprocess: Option<&Postprocess>) -> Option<Output> {
    raw.map(|text| match postprocess {
        Some(f) => f(text),
        None => Output::Text(text),
    })
}

/// Code evaluated by the stub as-is after template substitution.
#[derive(Clone)]
pub struct CodeVector {
    name: String,
    os: Os,
    template: Template,
    postprocess: Option<Postprocess>,
}

impl CodeVector {
    /// Create a code vector from a template.
    pub fn new(name: impl Into<String>, template: &str) -> std::result::Result<Self, VectorError> {
        Ok(Self {
            name: name.into(),
            os: Os::Any,
            template: Template::new(template)?,
            postprocess: None,
        })
    }

    /// Restrict the vector to one target OS family.
    pub fn with_os(mut self, os: Os) -> Self {
        self.os = os;
        self
    }

    /// Set the postprocess step applied to the raw result.
    pub fn with_postprocess(mut self, f: impl Fn(String) -> Output + Send + Sync + 'static) -> Self {
        self.postprocess = Some(Arc::new(f));
        self
    }

    /// Vector name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// OS constraint.
    pub fn os(&self) -> Os {
        self.os
    }

    /// The payload template.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Render the payload for the given arguments.
    pub fn render(&self, args: &FormatArgs) -> std::result::Result<String, VectorError> {
        self.template.render(&self.name, args)
    }

    /// Send the rendered payload and return the raw reply text.
    async fn run_raw<T: Transport>(
        &self,
        channel: &Channel<T>,
        args: &FormatArgs,
    ) -> Result<Option<String>> {
        let payload = self.render(args)?;
        let reply = channel.send(payload.as_bytes()).await?;
        Ok(reply.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Execute the vector.
    pub async fn execute<T: Transport>(
        &self,
        channel: &Channel<T>,
        args: &FormatArgs,
    ) -> Result<Option<Output>> {
        let raw = self.run_raw(channel, args).await?;
        Ok(finish(raw, self.postprocess.as_ref()))
    }
}

impl fmt::Debug for CodeVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeVector")
            .field("name", &self.name)
            .field("os", &self.os)
            .field("template", &self.template.as_str())
            .field(
                "postprocess",
                &self.postprocess.as_ref().map(|_| "<Postprocess>"),
            )
            .finish()
    }
}

/// A shell command line carried through a code vector.
///
/// The rendered command has its single quotes escaped and is passed to the
/// carrier as its `command` argument, so the carrier's template must contain
/// `${command}` inside single quotes. The carrier is usually the code vector a
/// shell module pinned during negotiation.
#[derive(Clone)]
pub struct ShellVector {
    name: String,
    os: Os,
    command: Template,
    carrier: CodeVector,
    postprocess: Option<Postprocess>,
}

impl ShellVector {
    /// Create a shell vector running `command` through `carrier`.
    pub fn new(
        name: impl Into<String>,
        command: &str,
        carrier: CodeVector,
    ) -> std::result::Result<Self, VectorError> {
        Ok(Self {
            name: name.into(),
            os: Os::Any,
            command: Template::new(command)?,
            carrier,
            postprocess: None,
        })
    }

    /// Restrict the vector to one target OS family.
    pub fn with_os(mut self, os: Os) -> Self {
        self.os = os;
        self
    }

    /// Set the postprocess step applied to the raw result.
    pub fn with_postprocess(mut self, f: impl Fn(String) -> Output + Send + Sync + 'static) -> Self {
        self.postprocess = Some(Arc::new(f));
        self
    }

    /// Vector name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// OS constraint.
    pub fn os(&self) -> Os {
        self.os
    }

    /// The code vector that runs the command.
    pub fn carrier(&self) -> &CodeVector {
        &self.carrier
    }

    /// Render the command line with single quotes escaped.
    pub fn render_command(&self, args: &FormatArgs) -> std::result::Result<String, VectorError> {
        // Does not protect against a literal \' in the input, but keeps an
        // unescaped quote from breaking the carrier's string literal.
        Ok(self.command.render(&self.name, args)?.replace('\'', "\\'"))
    }

    /// Execute the vector.
    pub async fn execute<T: Transport>(
        &self,
        channel: &Channel<T>,
        args: &FormatArgs,
    ) -> Result<Option<Output>> {
        let command = self.render_command(args)?;
        let carrier_args = args.clone().with("command", command);
        let raw = self.carrier.run_raw(channel, &carrier_args).await?;
        Ok(finish(raw, self.postprocess.as_ref()))
    }
}

impl fmt::Debug for ShellVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShellVector")
            .field("name", &self.name)
            .field("os", &self.os)
            .field("command", &self.command.as_str())
            .field("carrier", &self.carrier.name())
            .field(
                "postprocess",
                &self.postprocess.as_ref().map(|_| "<Postprocess>"),
            )
            .finish()
    }
}

/// One remote-execution technique.
#[derive(Debug, Clone)]
pub enum Vector {
    /// Code evaluated directly by the stub.
    Code(CodeVector),

    /// Shell command carried by a code vector.
    Shell(ShellVector),
}

impl Vector {
    /// Vector name.
    pub fn name(&self) -> &str {
        match self {
            Vector::Code(v) => v.name(),
            Vector::Shell(v) => v.name(),
        }
    }

    /// OS constraint.
    pub fn os(&self) -> Os {
        match self {
            Vector::Code(v) => v.os(),
            Vector::Shell(v) => v.os(),
        }
    }

    /// Get the code vector, if this is one.
    pub fn as_code(&self) -> Option<&CodeVector> {
        match self {
            Vector::Code(v) => Some(v),
            Vector::Shell(_) => None,
        }
    }

    /// Execute the vector through the channel.
    ///
    /// `Ok(None)` means the stub produced no framed payload.
    pub async fn execute<T: Transport>(
        &self,
        channel: &Channel<T>,
        args: &FormatArgs,
    ) -> Result<Option<Output>> {
        match self {
            Vector::Code(v) => v.execute(channel, args).await,
            Vector::Shell(v) => v.execute(channel, args).await,
        }
    }
}

impl From<CodeVector> for Vector {
    fn from(vector: CodeVector) -> Self {
        Vector::Code(vector)
    }
}

impl From<ShellVector> for Vector {
    fn from(vector: ShellVector) -> Self {
        Vector::Shell(vector)
    }
}
