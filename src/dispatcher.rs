/*!
`dispatcher.rs`

The process dispatcher: resolves a tool name (or role) to a registered
descriptor, spawns the external program as a child process, captures its
stdout/stderr/exit status, and returns a structured result or a structured
`DispatchError`. Nothing is retried, and no spawn failure escapes an
operation as a panic or a raw I/O error.

Invocation contract (explicit per operation, since tools differ):
  - run_code      : launch command + descriptor args + [code_flag?, code]
  - analyze_file  : launch command + descriptor args + [path, contents]
  - format_file   : launch command + descriptor args + [path, contents]
  - chat          : launch command + descriptor args + [code_flag?, instruction]

The working directory is passed per spawn (`Command::current_dir`), never by
mutating the process-wide cwd, so two in-flight invocations cannot race on
it. Conversation memory sits behind a mutex for the same reason.
*/

use anyhow::anyhow;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

use crate::log_debug;
use crate::registry::{Registry, ToolDescriptor, ToolRole};

/// Wait limit for `run_code` invocations. File and chat operations are not
/// bounded; their tools are expected to terminate on their own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Context handed to the assistant when neither an explicit context nor a
/// remembered conversation turn is available.
const DEFAULT_CONTEXT: &str =
    "General development assistance for the project in the working directory.";

/// Trailing arguments for an inline payload (code or chat instruction),
/// honoring the tool's configured `code_flag`.
fn inline_args(tool: &ToolDescriptor, payload: &str) -> Vec<String> {
    match &tool.code_flag {
        Some(flag) => vec![flag.clone(), payload.to_string()],
        None => vec![payload.to_string()],
    }
}

/// Structured failure returned (never thrown) by dispatcher operations.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("tool {name} not found")]
    ToolNotFound { name: String },

    #[error("file {path} not found")]
    FileNotFound { path: String },

    // anyhow::Error does not implement std::error::Error, so the chain is
    // carried as a plain field rather than a #[source].
    #[error("execution failed for {tool}: {cause}")]
    ExecutionFailed { tool: String, cause: anyhow::Error },
}

impl DispatchError {
    /// The implicated tool name, where one is known.
    pub fn tool(&self) -> Option<&str> {
        match self {
            DispatchError::ToolNotFound { name } => Some(name),
            DispatchError::FileNotFound { .. } => None,
            DispatchError::ExecutionFailed { tool, .. } => Some(tool),
        }
    }

    /// JSON error shape: `{"error": "...", "tool": "..."}`.
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({ "error": self.to_string() });
        if let Some(tool) = self.tool() {
            obj["tool"] = serde_json::Value::String(tool.to_string());
        }
        obj
    }
}

/// Successful `run_code` outcome.
#[derive(Debug, Serialize)]
pub struct ExecutionOutput {
    pub success: bool,
    pub output: String,
    pub stderr: String,
    pub exit_code: i32,
    pub language: String,
    pub tool: String,
}

/// Successful `analyze_file` outcome: analyzer stdout is the analysis,
/// stderr carries its suggestions channel.
#[derive(Debug, Serialize)]
pub struct Analysis {
    pub success: bool,
    pub analysis: String,
    pub suggestions: String,
    pub tool: String,
}

/// `format_file` outcome. `success` mirrors the formatter's exit status; the
/// file is rewritten only when it is true.
#[derive(Debug, Serialize)]
pub struct Formatted {
    pub success: bool,
    pub formatted: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
    pub tool: String,
}

/// Successful `chat` outcome.
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub success: bool,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub tool: String,
}

/// Resolves tool names to descriptors and manages their invocation
/// lifecycle. One child process at a time per dispatcher call; callers
/// wanting parallelism must run separate invocations, which is safe because
/// no process-wide state is mutated.
pub struct Dispatcher {
    registry: Registry,
    workdir: PathBuf,
    timeout: Duration,
    memory: Mutex<HashMap<String, String>>,
}

impl Dispatcher {
    pub fn new(registry: Registry, workdir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            workdir: workdir.into(),
            timeout: DEFAULT_TIMEOUT,
            memory: Mutex::new(HashMap::new()),
        }
    }

    /// Override the `run_code` wait limit.
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = limit;
        self
    }

    /// All registered descriptors, in registration order. Infallible and
    /// side-effect free.
    pub fn list_tools(&self) -> &[ToolDescriptor] {
        self.registry.all()
    }

    /// Execute an inline code snippet on the named tool.
    ///
    /// `conversation_id` is accepted for call-site parity with `chat` but is
    /// not consulted: only `chat` reads or writes conversation memory.
    pub async fn run_code(
        &self,
        tool_name: &str,
        code: &str,
        language: &str,
        _conversation_id: Option<&str>,
    ) -> Result<ExecutionOutput, DispatchError> {
        let tool = self.lookup(tool_name)?;
        let trailing = inline_args(tool, code);
        let output = self.spawn(tool, &trailing, Some(self.timeout)).await?;

        Ok(ExecutionOutput {
            success: true,
            output: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
            language: language.to_string(),
            tool: tool.name.clone(),
        })
    }

    /// Run the analyzer-role tool over a file. The path must exist before
    /// any process is spawned.
    pub async fn analyze_file(&self, path: &str) -> Result<Analysis, DispatchError> {
        let tool = self.lookup_role(ToolRole::Analyzer)?;
        let (abs, contents) = self.read_target(path, tool).await?;
        let trailing = vec![abs.to_string_lossy().into_owned(), contents];
        let output = self.spawn(tool, &trailing, None).await?;

        Ok(Analysis {
            success: true,
            analysis: String::from_utf8_lossy(&output.stdout).into_owned(),
            suggestions: String::from_utf8_lossy(&output.stderr).into_owned(),
            tool: tool.name.clone(),
        })
    }

    /// Run the formatter-role tool over a file and, only when the formatter
    /// exits successfully, overwrite the file with its stdout. The single
    /// operation with a persistent side effect.
    pub async fn format_file(&self, path: &str) -> Result<Formatted, DispatchError> {
        let tool = self.lookup_role(ToolRole::Formatter)?;
        let (abs, contents) = self.read_target(path, tool).await?;
        let trailing = vec![abs.to_string_lossy().into_owned(), contents];
        let output = self.spawn(tool, &trailing, None).await?;

        let success = output.status.success();
        let formatted = String::from_utf8_lossy(&output.stdout).into_owned();
        if success {
            tokio::fs::write(&abs, &formatted)
                .await
                .map_err(|e| DispatchError::ExecutionFailed {
                    tool: tool.name.clone(),
                    cause: anyhow!("failed to write formatted file: {e}"),
                })?;
        }

        Ok(Formatted {
            success,
            formatted,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            tool: tool.name.clone(),
        })
    }

    /// Send a message to the assistant-role tool.
    ///
    /// Context resolution: explicit argument, else the remembered response
    /// for `conversation_id`, else a process-wide default. On success the
    /// trimmed response is stored under `conversation_id` (when supplied) so
    /// the next turn can pick it up.
    pub async fn chat(
        &self,
        message: &str,
        context: Option<&str>,
        conversation_id: Option<&str>,
    ) -> Result<ChatReply, DispatchError> {
        let tool = self.lookup_role(ToolRole::Assistant)?;

        let resolved = match context {
            Some(c) => c.to_string(),
            None => conversation_id
                .and_then(|id| self.memory().get(id).cloned())
                .unwrap_or_else(|| DEFAULT_CONTEXT.to_string()),
        };

        let instruction = format!("{message}\n\ncontext:\n{resolved}");
        let trailing = inline_args(tool, &instruction);
        let output = self.spawn(tool, &trailing, None).await?;

        let response = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if let Some(id) = conversation_id {
            self.memory().insert(id.to_string(), response.clone());
        }

        Ok(ChatReply {
            success: true,
            response,
            conversation_id: conversation_id.map(str::to_string),
            tool: tool.name.clone(),
        })
    }

    /* ---- internal helpers ---- */

    fn lookup(&self, name: &str) -> Result<&ToolDescriptor, DispatchError> {
        self.registry
            .get(name)
            .ok_or_else(|| DispatchError::ToolNotFound {
                name: name.to_string(),
            })
    }

    fn lookup_role(&self, role: ToolRole) -> Result<&ToolDescriptor, DispatchError> {
        self.registry
            .by_role(role)
            .ok_or_else(|| DispatchError::ToolNotFound {
                name: role.to_string(),
            })
    }

    fn memory(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // Recover from poisoning; the map holds plain strings, a panicked
        // writer cannot leave it in a torn state.
        self.memory.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Existence check + read for analyze/format targets. Relative paths
    /// resolve against the configured working directory.
    async fn read_target(
        &self,
        path: &str,
        tool: &ToolDescriptor,
    ) -> Result<(PathBuf, String), DispatchError> {
        let abs = self.workdir.join(Path::new(path));
        if !abs.is_file() {
            return Err(DispatchError::FileNotFound {
                path: path.to_string(),
            });
        }
        let contents =
            tokio::fs::read_to_string(&abs)
                .await
                .map_err(|e| DispatchError::ExecutionFailed {
                    tool: tool.name.clone(),
                    cause: anyhow!("failed to read {}: {e}", abs.display()),
                })?;
        Ok((abs, contents))
    }

    /// Spawn a tool with trailing arguments, wait for completion (bounded
    /// when `limit` is set), and capture its output streams.
    async fn spawn(
        &self,
        tool: &ToolDescriptor,
        trailing: &[String],
        limit: Option<Duration>,
    ) -> Result<std::process::Output, DispatchError> {
        let (program, mut args) =
            tool.launch().map_err(|e| DispatchError::ExecutionFailed {
                tool: tool.name.clone(),
                cause: e,
            })?;
        args.extend_from_slice(trailing);

        log_debug!(
            "spawning tool '{}': {} ({} args, cwd={})",
            tool.name,
            program,
            args.len(),
            self.workdir.display()
        );

        let mut cmd = Command::new(&program);
        cmd.args(&args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the future on timeout must reap the child.
            .kill_on_drop(true);

        let wait = cmd.output();
        let output = match limit {
            Some(d) => timeout(d, wait)
                .await
                .map_err(|_| DispatchError::ExecutionFailed {
                    tool: tool.name.clone(),
                    cause: anyhow!("timed out after {}s", d.as_secs()),
                })?,
            None => wait.await,
        }
        .map_err(|e| DispatchError::ExecutionFailed {
            tool: tool.name.clone(),
            cause: anyhow!("failed to spawn '{program}': {e}"),
        })?;

        Ok(output)
    }
}
