// crates/firefly-smoke-core/src/process/command.rs
// ============================================================================
// Module: Command Templates
// Description: Program plus argument templates with `{name}` placeholders.
// Purpose: Describe external build and runtime tools without hardcoding paths.
// Dependencies: serde, thiserror, std::process
// ============================================================================

//! ## Overview
//! A [`CommandTemplate`] names a program and its arguments. Arguments may
//! contain `{vfs}`, `{root}`, and `{id}` placeholders, bound per invocation
//! through [`TemplateBindings`]. Literal braces are not supported; any `{`
//! must open a known placeholder.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::app_id::AppId;

// ============================================================================
// SECTION: Placeholders
// ============================================================================

/// Placeholder names recognised in template arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Work area VFS root.
    Vfs,
    /// Example directory being built.
    Root,
    /// App id being launched.
    Id,
}

impl Placeholder {
    /// Returns the placeholder name without braces.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vfs => "vfs",
            Self::Root => "root",
            Self::Id => "id",
        }
    }

    /// Parses a placeholder name without braces.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "vfs" => Some(Self::Vfs),
            "root" => Some(Self::Root),
            "id" => Some(Self::Id),
            _ => None,
        }
    }
}

/// Placeholders a build template may use.
pub const BUILD_PLACEHOLDERS: &[Placeholder] = &[Placeholder::Vfs, Placeholder::Root];

/// Placeholders a runtime template may use.
pub const RUNTIME_PLACEHOLDERS: &[Placeholder] = &[Placeholder::Vfs, Placeholder::Id];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Template validation and rendering errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The program is empty.
    #[error("command program must not be empty")]
    EmptyProgram,
    /// A `{` has no matching `}`.
    #[error("unterminated placeholder in `{0}`")]
    Unterminated(String),
    /// A placeholder name is unknown or not allowed here.
    #[error("placeholder `{{{name}}}` is not allowed in `{arg}`")]
    NotAllowed {
        /// Placeholder name.
        name: String,
        /// Argument containing it.
        arg: String,
    },
    /// A placeholder has no value for this invocation.
    #[error("placeholder `{{{0}}}` has no value")]
    Unbound(&'static str),
    /// A bound path is not valid UTF-8.
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(String),
}

// ============================================================================
// SECTION: Bindings
// ============================================================================

/// Values substituted into a template for one invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateBindings<'a> {
    /// Value for `{vfs}`.
    pub vfs: Option<&'a Path>,
    /// Value for `{root}`.
    pub root: Option<&'a Path>,
    /// Value for `{id}`.
    pub id: Option<&'a AppId>,
}

impl TemplateBindings<'_> {
    /// Returns the rendered value of `placeholder`.
    fn value(&self, placeholder: Placeholder) -> Result<String, TemplateError> {
        let path = |path: Option<&Path>| -> Result<String, TemplateError> {
            let path = path.ok_or(TemplateError::Unbound(placeholder.name()))?;
            path.to_str()
                .map(str::to_string)
                .ok_or_else(|| TemplateError::NonUtf8Path(path.display().to_string()))
        };
        match placeholder {
            Placeholder::Vfs => path(self.vfs),
            Placeholder::Root => path(self.root),
            Placeholder::Id => self
                .id
                .map(ToString::to_string)
                .ok_or(TemplateError::Unbound(placeholder.name())),
        }
    }
}

// ============================================================================
// SECTION: Template
// ============================================================================

/// External command with placeholder arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandTemplate {
    /// Program name or path.
    pub program: String,
    /// Argument templates.
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment variables for the child.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl CommandTemplate {
    /// Creates a template with no extra environment.
    #[must_use]
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|arg| (*arg).to_string()).collect(),
            env: BTreeMap::new(),
        }
    }

    /// Checks the template uses only `allowed` placeholders.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] for an empty program or a bad placeholder.
    pub fn validate(&self, allowed: &[Placeholder]) -> Result<(), TemplateError> {
        if self.program.trim().is_empty() {
            return Err(TemplateError::EmptyProgram);
        }
        for arg in &self.args {
            for name in placeholders(arg)? {
                match Placeholder::parse(name) {
                    Some(placeholder) if allowed.contains(&placeholder) => {}
                    _ => {
                        return Err(TemplateError::NotAllowed {
                            name: name.to_string(),
                            arg: arg.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Renders the argument list with `bindings`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] for unknown or unbound placeholders.
    pub fn render_args(&self, bindings: &TemplateBindings<'_>) -> Result<Vec<String>, TemplateError> {
        self.args.iter().map(|arg| render_arg(arg, bindings)).collect()
    }

    /// Builds a [`Command`] with rendered arguments and extra environment.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] when rendering fails.
    pub fn command(&self, bindings: &TemplateBindings<'_>) -> Result<Command, TemplateError> {
        if self.program.trim().is_empty() {
            return Err(TemplateError::EmptyProgram);
        }
        let mut command = Command::new(&self.program);
        command.args(self.render_args(bindings)?);
        command.envs(&self.env);
        Ok(command)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the placeholder names used in `arg`, in order.
fn placeholders(arg: &str) -> Result<Vec<&str>, TemplateError> {
    let mut names = Vec::new();
    let mut rest = arg;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| TemplateError::Unterminated(arg.to_string()))?;
        names.push(&after[..close]);
        rest = &after[close + 1..];
    }
    Ok(names)
}

/// Substitutes every placeholder in `arg`.
fn render_arg(arg: &str, bindings: &TemplateBindings<'_>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(arg.len());
    let mut rest = arg;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| TemplateError::Unterminated(arg.to_string()))?;
        let name = &after[..close];
        let placeholder = Placeholder::parse(name).ok_or_else(|| TemplateError::NotAllowed {
            name: name.to_string(),
            arg: arg.to_string(),
        })?;
        out.push_str(&bindings.value(placeholder)?);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
