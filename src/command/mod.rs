//! Command stream
//!
//! Every externally observable effect of a run is appended to a
//! [`CommandStream`] as a [`Command`]. Records are never modified after they
//! are emitted; each carries a logical timestamp equal to its position in the
//! stream, which keeps streams from independent runs byte-comparable.
//!
//! # Wire format
//!
//! Commands serialize to flat JSON objects:
//!
//! ```json
//! {"type":"VAR_SET","variable":"arr[2]","value":30,"timestamp":7,"message":"arr[2] = 30"}
//! ```
//!
//! Value encoding is defined in [`wire`].

pub mod wire;

use crate::interpreter::errors::ErrorKind;
use crate::memory::value::Value;
use serde::Serialize;

/// Final status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
    Completed,
    LoopLimitReached,
    FatalError,
}

/// Which branch an `if` took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    Then,
    Else,
}

/// Position within a loop's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPhase {
    Start,
    Iteration,
    End,
}

/// Kind-specific payload of a command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    VersionInfo {
        component: String,
        version: String,
        status: String,
    },
    ProgramStart,
    ProgramEnd {
        status: ExitStatus,
    },
    SetupStart,
    SetupEnd,
    LoopStart {
        iteration: u32,
    },
    LoopEnd {
        iteration: u32,
    },
    VarSet {
        variable: String,
        value: Value,
    },
    FunctionCall {
        function: String,
        arguments: Vec<Value>,
    },
    IfStatement {
        condition: Value,
        branch: Branch,
    },
    WhileLoop {
        phase: LoopPhase,
        iteration: u32,
    },
    ForLoop {
        phase: LoopPhase,
        iteration: u32,
    },
    DoWhileLoop {
        phase: LoopPhase,
        iteration: u32,
    },
    SwitchStatement {
        discriminant: Value,
    },
    SwitchCase {
        value: Value,
        matched: bool,
    },
    BreakStatement,
    ContinueStatement,
    Delay {
        milliseconds: u32,
    },
    DelayMicroseconds {
        microseconds: u32,
    },
    LoopLimitReached {
        phase: String,
        iterations: u32,
    },
    Error {
        error_type: ErrorKind,
        fatal: bool,
    },
}

impl CommandKind {
    /// The `type` tag as it appears on the wire
    pub fn type_name(&self) -> &'static str {
        match self {
            CommandKind::VersionInfo { .. } => "VERSION_INFO",
            CommandKind::ProgramStart => "PROGRAM_START",
            CommandKind::ProgramEnd { .. } => "PROGRAM_END",
            CommandKind::SetupStart => "SETUP_START",
            CommandKind::SetupEnd => "SETUP_END",
            CommandKind::LoopStart { .. } => "LOOP_START",
            CommandKind::LoopEnd { .. } => "LOOP_END",
            CommandKind::VarSet { .. } => "VAR_SET",
            CommandKind::FunctionCall { .. } => "FUNCTION_CALL",
            CommandKind::IfStatement { .. } => "IF_STATEMENT",
            CommandKind::WhileLoop { .. } => "WHILE_LOOP",
            CommandKind::ForLoop { .. } => "FOR_LOOP",
            CommandKind::DoWhileLoop { .. } => "DO_WHILE_LOOP",
            CommandKind::SwitchStatement { .. } => "SWITCH_STATEMENT",
            CommandKind::SwitchCase { .. } => "SWITCH_CASE",
            CommandKind::BreakStatement => "BREAK_STATEMENT",
            CommandKind::ContinueStatement => "CONTINUE_STATEMENT",
            CommandKind::Delay { .. } => "DELAY",
            CommandKind::DelayMicroseconds { .. } => "DELAY_MICROSECONDS",
            CommandKind::LoopLimitReached { .. } => "LOOP_LIMIT_REACHED",
            CommandKind::Error { .. } => "ERROR",
        }
    }
}

/// One emitted record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    #[serde(flatten)]
    pub kind: CommandKind,
    pub timestamp: u64,
    pub message: String,
}

/// Append-only, ordered record of a run
#[derive(Debug, Clone, Default)]
pub struct CommandStream {
    commands: Vec<Command>,
    next_timestamp: u64,
}

impl CommandStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, kind: CommandKind, message: impl Into<String>) {
        let command = Command {
            kind,
            timestamp: self.next_timestamp,
            message: message.into(),
        };
        self.next_timestamp += 1;
        tracing::trace!(
            kind = command.kind.type_name(),
            timestamp = command.timestamp,
            "{}",
            command.message
        );
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    pub fn last(&self) -> Option<&Command> {
        self.commands.last()
    }

    /// Commands whose wire type equals `type_name`
    pub fn of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a Command> + 'a {
        self.commands
            .iter()
            .filter(move |c| c.kind.type_name() == type_name)
    }

    /// One JSON object per line
    pub fn to_json_lines(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for command in &self.commands {
            out.push_str(&serde_json::to_string(command)?);
            out.push('\n');
        }
        Ok(out)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.commands)
    }
}

impl<'a> IntoIterator for &'a CommandStream {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
