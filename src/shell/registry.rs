//! Fixed command table: name → descriptor, built once at startup.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::api::Api;
use crate::config::Config;
use crate::{Error, Result};

use super::elevation::ElevationContext;
use super::stdin::Stdin;
use super::transcript::Transcript;

pub type HandlerFuture = BoxFuture<'static, Result<()>>;

/// Entry point of a command. Receives its context by value.
pub type Handler = fn(CommandContext) -> HandlerFuture;

#[derive(Debug, Clone, Copy)]
pub struct CommandDescriptor {
    /// Literal, case-sensitive command line that invokes the command.
    pub name: &'static str,
    pub summary: &'static str,
    pub requires_elevation: bool,
    /// Left out of help listings.
    pub hidden: bool,
    pub run: Handler,
}

impl CommandDescriptor {
    pub const fn new(name: &'static str, summary: &'static str, run: Handler) -> Self {
        Self {
            name,
            summary,
            requires_elevation: false,
            hidden: false,
            run,
        }
    }

    pub const fn elevated(self) -> Self {
        Self {
            requires_elevation: true,
            ..self
        }
    }

    pub const fn hidden(self) -> Self {
        Self {
            hidden: true,
            ..self
        }
    }
}

/// Everything a running handler may touch.
pub struct CommandContext {
    pub out: Transcript,
    pub stdin: Stdin,
    pub api: Arc<dyn Api>,
    pub config: Arc<Config>,
    pub registry: Arc<Registry>,
    elevation: Option<ElevationContext>,
}

impl CommandContext {
    pub fn new(
        out: Transcript,
        stdin: Stdin,
        api: Arc<dyn Api>,
        config: Arc<Config>,
        registry: Arc<Registry>,
        elevation: Option<ElevationContext>,
    ) -> Self {
        Self {
            out,
            stdin,
            api,
            config,
            registry,
            elevation,
        }
    }

    /// The verified credential for this invocation.
    pub fn elevation(&self) -> Result<&ElevationContext> {
        self.elevation.as_ref().ok_or(Error::NotElevated)
    }

    /// Print `question` and wait for the user's answer.
    pub async fn ask(&self, question: &str) -> Result<String> {
        self.out.info(question);
        self.stdin.request_line(question).await
    }
}

#[derive(Debug)]
pub struct Registry {
    commands: HashMap<&'static str, CommandDescriptor>,
    order: Vec<&'static str>,
}

impl Registry {
    /// Build the table. Names must be unique and non-blank.
    pub fn new(descriptors: impl IntoIterator<Item = CommandDescriptor>) -> Result<Self> {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for descriptor in descriptors {
            if descriptor.name.trim().is_empty() || descriptor.name.trim() != descriptor.name {
                return Err(Error::Validation(format!(
                    "invalid command name {:?}",
                    descriptor.name
                )));
            }
            if commands.insert(descriptor.name, descriptor).is_some() {
                return Err(Error::Validation(format!(
                    "duplicate command {:?}",
                    descriptor.name
                )));
            }
            order.push(descriptor.name);
        }
        Ok(Self { commands, order })
    }

    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.order.iter().filter_map(|name| self.commands.get(name))
    }

    /// Visible commands, filtered by privilege.
    pub fn listed(&self, privileged: bool) -> impl Iterator<Item = &CommandDescriptor> {
        self.iter()
            .filter(move |d| !d.hidden && d.requires_elevation == privileged)
    }
}
