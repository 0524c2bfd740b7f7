//! Workflow graph wire types
//!
//! These types serialize to the JSON document the execution service accepts:
//!
//! ```text
//! { "processes": [...], "signals": [...], "ins": [...], "outs": [...] }
//! ```

use crate::naming::START_SIGNAL;
use serde::{Deserialize, Serialize};

/// Function tag of the remote-execution adapter
pub const AMQP_COMMAND: &str = "amqpCommand";

/// Process type tag understood by the execution service
pub const DATAFLOW: &str = "dataflow";

/// Executable description of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowGraph {
    /// Processes in append order
    pub processes: Vec<ProcessNode>,
    /// Signal declarations in append order
    pub signals: Vec<SignalDecl>,
    /// Signals expected from outside the graph
    #[serde(rename = "ins")]
    pub inputs: Vec<String>,
    /// Signals the graph declares as its results
    #[serde(rename = "outs")]
    pub outputs: Vec<String>,
}

impl WorkflowGraph {
    /// Graph containing only the `start` input and its signal
    #[must_use]
    pub fn with_start() -> Self {
        Self {
            processes: Vec::new(),
            signals: vec![SignalDecl::with_data(START_SIGNAL, vec![START_SIGNAL.to_string()])],
            inputs: vec![START_SIGNAL.to_string()],
            outputs: Vec::new(),
        }
    }

    /// Append a process
    pub fn push_process(&mut self, process: ProcessNode) {
        self.processes.push(process);
    }

    /// Append a signal declaration
    pub fn declare_signal(&mut self, signal: SignalDecl) {
        self.signals.push(signal);
    }

    /// Append a declared output
    pub fn declare_output(&mut self, name: impl Into<String>) {
        self.outputs.push(name.into());
    }

    /// Look up a process by name
    #[must_use]
    pub fn process(&self, name: &str) -> Option<&ProcessNode> {
        self.processes.iter().find(|p| p.name == name)
    }

    /// Look up a signal declaration by name
    #[must_use]
    pub fn signal(&self, name: &str) -> Option<&SignalDecl> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// Processes whose name starts with `prefix`
    pub fn processes_named<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a ProcessNode> + 'a {
        self.processes
            .iter()
            .filter(move |p| p.name.starts_with(prefix))
    }

    /// Signals produced by some process and consumed by none
    #[must_use]
    pub fn sink_signals(&self) -> Vec<&str> {
        let mut sinks = Vec::new();
        for process in &self.processes {
            for out in &process.outs {
                let consumed = self
                    .processes
                    .iter()
                    .any(|p| p.ins.iter().any(|i| i == out));
                if !consumed {
                    sinks.push(out.as_str());
                }
            }
        }
        sinks
    }

    /// Whether the graph has no processes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Pretty JSON body as posted to the execution service
    ///
    /// # Errors
    /// Propagates serializer failures.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// One process of the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessNode {
    /// Unique process name
    pub name: String,
    /// Remote-execution adapter tag
    pub function: String,
    /// Process type tag
    #[serde(rename = "type")]
    pub kind: String,
    /// Adapter configuration
    pub config: ProcessConfig,
    /// Consumed signals
    pub ins: Vec<String>,
    /// Produced signals
    pub outs: Vec<String>,
}

impl ProcessNode {
    /// Dataflow process running `executable` with `args` through the AMQP adapter
    #[must_use]
    pub fn command(
        name: impl Into<String>,
        executable: impl Into<String>,
        args: Vec<String>,
        ins: Vec<String>,
        outs: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            function: AMQP_COMMAND.to_string(),
            kind: DATAFLOW.to_string(),
            config: ProcessConfig {
                executor: Executor {
                    executable: executable.into(),
                    args,
                },
            },
            ins,
            outs,
        }
    }

    /// Positional arguments passed to the executable
    #[inline]
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.config.executor.args
    }
}

/// Adapter configuration block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Command to run
    pub executor: Executor,
}

/// Executable path and ordered arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Executor {
    /// Path of the executable on the worker
    pub executable: String,
    /// Positional arguments
    pub args: Vec<String>,
}

/// Signal declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalDecl {
    /// Unique signal name
    pub name: String,
    /// Initial payload (only the start signal carries one)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<String>>,
}

impl SignalDecl {
    /// Signal without payload
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: None,
        }
    }

    /// Signal with an initial payload
    #[must_use]
    pub fn with_data(name: impl Into<String>, data: Vec<String>) -> Self {
        Self {
            name: name.into(),
            data: Some(data),
        }
    }
}
