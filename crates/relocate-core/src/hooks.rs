//! Host integration hooks
//!
//! Dependency resolution, reloading and asset import belong to the host
//! environment. The controller only talks to the [`Host`] trait; the
//! shipped [`CommandHost`] maps each request onto `[[hooks]]` entries from
//! the config and runs them as subprocesses.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use relocate_fs::NormalizedPath;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Host requests a hook can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookEvent {
    /// Resolve the project's dependencies from the manifest
    Resolve,
    /// Reload scripts / restart the host process
    Reload,
    /// Import or refresh a path inside the project
    Import,
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve => write!(f, "resolve"),
            Self::Reload => write!(f, "reload"),
            Self::Import => write!(f, "import"),
        }
    }
}

/// Configuration for a single hook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookConfig {
    /// The event that triggers this hook
    pub event: HookEvent,
    /// The command to execute
    pub command: String,
    /// Arguments to pass to the command
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory override (defaults to the project root)
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

/// Variables substituted into hook args and exported to the environment
#[derive(Debug, Clone, Default)]
pub struct HookContext {
    pub vars: HashMap<String, String>,
}

impl HookContext {
    /// Base context shared by every hook of a project
    pub fn for_project(project_root: &NormalizedPath, manifest: &NormalizedPath) -> Self {
        let mut vars = HashMap::new();
        vars.insert("PROJECT_ROOT".to_string(), project_root.to_string());
        vars.insert("MANIFEST_PATH".to_string(), manifest.to_string());
        Self { vars }
    }

    /// Add the path an import hook should refresh
    pub fn with_import_path(mut self, path: &str) -> Self {
        self.vars.insert("IMPORT_PATH".to_string(), path.to_string());
        self
    }
}

/// Result of running a single hook
#[derive(Debug)]
pub struct HookResult {
    pub event: HookEvent,
    pub command: String,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// Run all hooks bound to `event`, in order, stopping at the first failure.
pub fn run_hooks(
    hooks: &[HookConfig],
    event: HookEvent,
    context: &HookContext,
    default_dir: &Path,
) -> Result<Vec<HookResult>> {
    let mut results = Vec::new();

    for hook in hooks.iter().filter(|h| h.event == event) {
        tracing::info!(%event, command = %hook.command, "Running hook");
        let result = execute_hook(hook, context, default_dir)?;

        if !result.success {
            let stderr_snippet = result.stderr.trim();
            let message = if stderr_snippet.is_empty() {
                format!("exited with status {:?}", result.exit_code)
            } else {
                format!("exited with status {:?}: {}", result.exit_code, stderr_snippet)
            };
            return Err(Error::HookFailed {
                event: event.to_string(),
                command: hook.command.clone(),
                message,
            });
        }

        let stdout = result.stdout.trim();
        if !stdout.is_empty() {
            tracing::debug!(%event, command = %hook.command, %stdout, "Hook output");
        }
        results.push(result);
    }

    Ok(results)
}

fn execute_hook(hook: &HookConfig, context: &HookContext, default_dir: &Path) -> Result<HookResult> {
    let work_dir = hook.working_dir.as_deref().unwrap_or(default_dir);

    let args: Vec<String> = hook
        .args
        .iter()
        .map(|arg| substitute_vars(arg, &context.vars))
        .collect();

    let output = Command::new(&hook.command)
        .args(&args)
        .current_dir(work_dir)
        .envs(&context.vars)
        .output()
        .map_err(|e| Error::HookFailed {
            event: hook.event.to_string(),
            command: hook.command.clone(),
            message: e.to_string(),
        })?;

    Ok(HookResult {
        event: hook.event,
        command: hook.command.clone(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code(),
    })
}

/// Substitute ${VAR_NAME} patterns in a string with context variables
fn substitute_vars(input: &str, vars: &HashMap<String, String>) -> String {
    let mut result = input.to_string();
    for (key, value) in vars {
        let pattern = format!("${{{}}}", key);
        result = result.replace(&pattern, value);
    }
    result
}

/// External collaborators of the relocation workflow.
pub trait Host {
    /// Ask the host to resolve dependencies from the (rewritten) manifest.
    fn resolve_dependencies(&self) -> Result<()>;

    /// Ask the host to reload; in-memory state is assumed lost afterwards.
    fn request_reload(&self) -> Result<()>;

    /// Ask the host to import/refresh a path given relative to the project root.
    fn import_path(&self, relative_path: &str) -> Result<()>;
}

/// [`Host`] backed by configured subprocess hooks.
#[derive(Debug, Clone)]
pub struct CommandHost {
    hooks: Vec<HookConfig>,
    project_root: NormalizedPath,
    context: HookContext,
}

impl CommandHost {
    pub fn new(hooks: Vec<HookConfig>, project_root: NormalizedPath, manifest: &NormalizedPath) -> Self {
        let context = HookContext::for_project(&project_root, manifest);
        Self {
            hooks,
            project_root,
            context,
        }
    }

    fn dispatch(&self, event: HookEvent, context: &HookContext) -> Result<()> {
        if !self.hooks.iter().any(|h| h.event == event) {
            tracing::debug!(%event, "No hook configured, skipping");
            return Ok(());
        }
        run_hooks(&self.hooks, event, context, &self.project_root.to_native())?;
        Ok(())
    }
}

impl Host for CommandHost {
    fn resolve_dependencies(&self) -> Result<()> {
        self.dispatch(HookEvent::Resolve, &self.context)
    }

    fn request_reload(&self) -> Result<()> {
        self.dispatch(HookEvent::Reload, &self.context)
    }

    fn import_path(&self, relative_path: &str) -> Result<()> {
        let context = self.context.clone().with_import_path(relative_path);
        self.dispatch(HookEvent::Import, &context)
    }
}
