// Execution engine for the sketch interpreter

use crate::command::{CommandKind, CommandStream, ExitStatus};
use crate::interpreter::constants::{COMPONENT, VERSION};
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::interpreter::options::InterpreterOptions;
use crate::interpreter::provider::{DataProvider, DeterministicProvider};
use crate::memory::pointer::PointerIds;
use crate::memory::registry::TypeRegistry;
use crate::memory::scope::ScopeManager;
use crate::memory::value::Value;
use crate::tree::ast::{AstNode, FunctionDef, Program};
use crate::tree::{lower_program, RawNode, TreeError};
use rustc_hash::FxHashMap;
use std::rc::Rc;
use std::time::Instant;

/// How a statement finished
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ControlSignal {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// Scheduler progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Halted(ExitStatus),
    Finished(ExitStatus),
}

/// The interpreter: owns the program, all runtime state and the command stream
pub struct Interpreter {
    pub(crate) program: Rc<Program>,
    pub(crate) options: InterpreterOptions,

    pub(crate) scopes: ScopeManager,
    pub(crate) types: TypeRegistry,
    pub(crate) functions: FxHashMap<String, Rc<FunctionDef>>,
    pub(crate) pointer_ids: PointerIds,

    pub(crate) commands: CommandStream,
    pub(crate) provider: Box<dyn DataProvider>,

    /// Lowering failure carried from construction, reported by `start`
    load_error: Option<TreeError>,

    phase: Phase,
    loop_cycles_run: u32,
    steps: u64,
    started_at: Option<Instant>,
}

impl Interpreter {
    pub fn new(program: Program) -> Self {
        Self::with_options(program, InterpreterOptions::default())
    }

    pub fn with_options(program: Program, options: InterpreterOptions) -> Self {
        Interpreter {
            program: Rc::new(program),
            options,
            scopes: ScopeManager::new(),
            types: TypeRegistry::new(),
            functions: FxHashMap::default(),
            pointer_ids: PointerIds::default(),
            commands: CommandStream::new(),
            provider: Box::new(DeterministicProvider::new()),
            load_error: None,
            phase: Phase::Idle,
            loop_cycles_run: 0,
            steps: 0,
            started_at: None,
        }
    }

    /// Lower a node tree. A malformed tree still yields an interpreter; the
    /// failure is reported as a fatal `MalformedTree` once the run starts.
    pub fn from_tree(root: &RawNode, options: InterpreterOptions) -> Self {
        match lower_program(root) {
            Ok(program) => Self::with_options(program, options),
            Err(err) => Self::failed(err, options),
        }
    }

    pub fn from_json(text: &str, options: InterpreterOptions) -> Self {
        match RawNode::from_json(text) {
            Ok(root) => Self::from_tree(&root, options),
            Err(err) => Self::failed(err, options),
        }
    }

    fn failed(err: TreeError, options: InterpreterOptions) -> Self {
        let mut interp = Self::with_options(Program::new(), options);
        interp.load_error = Some(err);
        interp
    }

    pub fn with_provider(mut self, provider: Box<dyn DataProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn commands(&self) -> &CommandStream {
        &self.commands
    }

    pub fn options(&self) -> &InterpreterOptions {
        &self.options
    }

    /// Final status once the run has been closed with [`Interpreter::finish`]
    pub fn status(&self) -> Option<ExitStatus> {
        match self.phase {
            Phase::Finished(status) => Some(status),
            _ => None,
        }
    }

    /// Current value of a global variable
    pub fn global(&self, name: &str) -> Option<Value> {
        self.scopes
            .variable_in(Default::default(), name)
            .map(|var| var.value.clone())
    }

    pub fn loop_cycles_run(&self) -> u32 {
        self.loop_cycles_run
    }

    /// Run the whole program: prelude, `setup`, every `loop` cycle, close
    pub fn run(&mut self) -> ExitStatus {
        self.start();
        while self.resume() {}
        self.finish()
    }

    /// Emit the prelude, register declarations, initialize globals and run
    /// `setup` (or `main` for programs without `setup`/`loop`).
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            return;
        }
        self.phase = Phase::Running;
        self.started_at = Some(Instant::now());

        self.commands.emit(
            CommandKind::VersionInfo {
                component: COMPONENT.to_string(),
                version: VERSION.to_string(),
                status: "started".to_string(),
            },
            format!("{} {} started", COMPONENT, VERSION),
        );
        self.commands
            .emit(CommandKind::ProgramStart, "Program execution started");

        if let Some(err) = self.load_error.take() {
            self.halt(RuntimeError::from(err));
            return;
        }

        let result = self.prepare_and_setup();
        if let Err(err) = result {
            self.halt(err);
        }
    }

    fn prepare_and_setup(&mut self) -> RuntimeResult<()> {
        self.register_declarations();
        self.initialize_globals()?;

        if let Some(setup) = self.functions.get("setup").cloned() {
            self.commands.emit(CommandKind::SetupStart, "Executing setup()");
            self.invoke(&setup, Vec::new())?;
            self.commands.emit(CommandKind::SetupEnd, "Completed setup()");
        } else if !self.functions.contains_key("loop") {
            if let Some(main) = self.functions.get("main").cloned() {
                self.invoke(&main, Vec::new())?;
            }
        }
        Ok(())
    }

    /// Run one `loop()` cycle. Returns false once no further cycle can run.
    pub fn resume(&mut self) -> bool {
        if self.phase == Phase::Idle {
            self.start();
        }
        if self.phase != Phase::Running || self.loop_cycles_run >= self.options.loop_cycles {
            return false;
        }
        let Some(body) = self.functions.get("loop").cloned() else {
            return false;
        };

        self.loop_cycles_run += 1;
        let iteration = self.loop_cycles_run;
        tracing::debug!(iteration, "loop cycle");
        self.commands.emit(
            CommandKind::LoopStart { iteration },
            format!("Loop iteration {}", iteration),
        );
        match self.invoke(&body, Vec::new()) {
            Ok(_) => {
                self.commands.emit(
                    CommandKind::LoopEnd { iteration },
                    format!("Completed loop iteration {}", iteration),
                );
                true
            }
            Err(err) => {
                self.halt(err);
                false
            }
        }
    }

    /// Close the stream with `PROGRAM_END`. Idempotent.
    pub fn finish(&mut self) -> ExitStatus {
        if self.phase == Phase::Idle {
            self.start();
        }
        let status = match self.phase {
            Phase::Finished(status) => return status,
            Phase::Halted(status) => status,
            _ => {
                if self.functions.contains_key("loop")
                    && self.loop_cycles_run >= self.options.loop_cycles
                {
                    self.commands.emit(
                        CommandKind::LoopLimitReached {
                            phase: "loop".to_string(),
                            iterations: self.loop_cycles_run,
                        },
                        format!(
                            "Loop limit reached: completed {} iterations",
                            self.loop_cycles_run
                        ),
                    );
                }
                ExitStatus::Completed
            }
        };

        self.commands.emit(
            CommandKind::ProgramEnd { status },
            format!("Program ended: {:?}", status),
        );
        self.phase = Phase::Finished(status);
        tracing::debug!(?status, commands = self.commands.len(), "run finished");
        status
    }

    /// Stop after a fatal error. Iteration limits already emitted their
    /// `LOOP_LIMIT_REACHED` record.
    fn halt(&mut self, err: RuntimeError) {
        tracing::debug!(error = %err, "halting");
        let status = match err {
            RuntimeError::IterationLimit { .. } => ExitStatus::LoopLimitReached,
            err => {
                self.commands.emit(
                    CommandKind::Error {
                        error_type: err.kind(),
                        fatal: true,
                    },
                    err.to_string(),
                );
                ExitStatus::FatalError
            }
        };
        self.phase = Phase::Halted(status);
    }

    /// Single pass over top-level definitions
    fn register_declarations(&mut self) {
        self.register_library_classes();
        let program = Rc::clone(&self.program);
        for node in &program.nodes {
            self.register_definition(node);
        }
    }

    pub(crate) fn register_definition(&mut self, node: &AstNode) {
        match node {
            AstNode::StructDef(def) => self.types.define_struct(def.clone()),
            AstNode::Typedef { alias, target } => self.types.define_typedef(alias, target.clone()),
            AstNode::FunctionDef(def) => {
                self.functions.insert(def.name.clone(), Rc::clone(def));
            }
            _ => {}
        }
    }

    fn initialize_globals(&mut self) -> RuntimeResult<()> {
        let program = Rc::clone(&self.program);
        for node in &program.nodes {
            if let AstNode::VarDecl { declarators } = node {
                self.execute_var_decl(declarators)?;
            }
        }
        Ok(())
    }

    /// Count one executed statement against the step and time budgets
    pub(crate) fn tick(&mut self) -> RuntimeResult<()> {
        self.steps += 1;
        if self.steps > self.options.max_steps {
            return Err(RuntimeError::StepLimit {
                limit: self.options.max_steps,
            });
        }
        if let (Some(limit), Some(started)) = (self.options.timeout_ms, self.started_at) {
            if started.elapsed().as_millis() > u128::from(limit) {
                return Err(RuntimeError::Timeout { millis: limit });
            }
        }
        Ok(())
    }

    /// Report a recoverable error where its statement consumes it. Fatal
    /// errors pass through untouched.
    pub(crate) fn recover<T: Default>(&mut self, result: RuntimeResult<T>) -> RuntimeResult<T> {
        match result {
            Ok(value) => Ok(value),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                self.report(&err);
                Ok(T::default())
            }
        }
    }

    pub(crate) fn report(&mut self, err: &RuntimeError) {
        tracing::debug!(kind = %err.kind(), "{}", err);
        self.commands.emit(
            CommandKind::Error {
                error_type: err.kind(),
                fatal: false,
            },
            err.to_string(),
        );
    }

    pub(crate) fn emit_var_set(&mut self, variable: String, value: &Value) {
        if !self.options.emit_var_set {
            return;
        }
        let message = format!("{} = {}", variable, value);
        self.commands.emit(
            CommandKind::VarSet {
                variable,
                value: value.clone(),
            },
            message,
        );
    }
}
