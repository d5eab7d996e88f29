//! Shell command construction
//!
//! Commands are built argv-style and only flattened to a string at the
//! transport boundary, with quoting applied per argument at render time.
//! `CommandBatch` coalesces several operations into one `&&`-joined remote
//! invocation so a multi-step change costs a single round-trip.

/// Characters that never need quoting in a POSIX shell word.
fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '-' | '+' | ':' | '=' | '@' | '%' | ',')
}

/// Quote a string for safe use as a single shell word.
///
/// Plain words (paths, flags) pass through unchanged; anything else is
/// wrapped in single quotes with embedded quotes escaped.
pub fn quote(s: &str) -> String {
    if !s.is_empty() && s.chars().all(is_safe_char) {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', "'\\''"))
    }
}

/// A single shell command, rendered at the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Argv-style command; every element is quoted when rendered
    Argv(Vec<String>),
    /// Pre-rendered fragment passed through untouched.
    ///
    /// Only for trusted text that intentionally contains shell syntax,
    /// such as a `$(...)` substitution probing the application environment.
    Raw(String),
}

impl ShellCommand {
    /// Start an argv-style command with the given program name
    pub fn program(name: impl Into<String>) -> Self {
        ShellCommand::Argv(vec![name.into()])
    }

    /// Create a raw, pre-rendered command fragment
    pub fn raw(text: impl Into<String>) -> Self {
        ShellCommand::Raw(text.into())
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        let arg = arg.into();
        match &mut self {
            ShellCommand::Argv(parts) => parts.push(arg),
            ShellCommand::Raw(text) => {
                text.push(' ');
                text.push_str(&quote(&arg));
            }
        }
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Flatten to a shell string, quoting each argv element as needed
    pub fn render(&self) -> String {
        match self {
            ShellCommand::Argv(parts) => parts
                .iter()
                .map(|p| quote(p))
                .collect::<Vec<_>>()
                .join(" "),
            ShellCommand::Raw(text) => text.clone(),
        }
    }
}

/// An ordered batch of shell commands submitted as one remote invocation.
///
/// Commands are joined with `&&`, so a failure at any point stops the rest
/// of the batch on the remote side and surfaces as a single failed call.
#[derive(Debug, Clone, Default)]
pub struct CommandBatch {
    commands: Vec<ShellCommand>,
}

impl CommandBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one command
    pub fn push(&mut self, command: ShellCommand) {
        self.commands.push(command);
    }

    /// Append several commands, preserving order
    pub fn extend(&mut self, commands: impl IntoIterator<Item = ShellCommand>) {
        self.commands.extend(commands);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Render the batch as a single `&&`-joined command string.
    ///
    /// Returns `None` for an empty batch; callers must not issue a remote
    /// call in that case.
    pub fn render(&self) -> Option<String> {
        if self.commands.is_empty() {
            return None;
        }
        Some(
            self.commands
                .iter()
                .map(|c| c.render())
                .collect::<Vec<_>>()
                .join(" && "),
        )
    }
}

impl FromIterator<ShellCommand> for CommandBatch {
    fn from_iter<I: IntoIterator<Item = ShellCommand>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}
