//! PowerShell script templates.
//!
//! Templates are handlebars documents. Every interpolated value is escaped
//! for a PowerShell single-quoted string literal, so templates must only
//! place `{{value}}` between single quotes. JSON arguments are passed the
//! same way and parsed on the host with `ConvertFrom-Json`.

use crate::error::{Error, Result};
use handlebars::Handlebars;
use serde::Serialize;

/// Prepended to every script: stop on the first error, keep progress bars
/// out of the output stream, and turn an uncaught error into stderr plus a
/// non-zero exit code.
pub const PRELUDE: &str = r"$ErrorActionPreference = 'Stop'
$ProgressPreference = 'SilentlyContinue'
trap {
    [Console]::Error.WriteLine($_.Exception.Message)
    exit 1
}
";

/// A named script template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Script {
    /// Name used in errors and logs
    pub name: &'static str,
    /// Handlebars body, without the prelude
    pub body: &'static str,
}

impl Script {
    /// Declare a script.
    pub const fn new(name: &'static str, body: &'static str) -> Self {
        Self { name, body }
    }
}

/// Escape a value for a PowerShell single-quoted string.
///
/// PowerShell also treats the typographic single quotes as quote
/// characters, so they are doubled too.
pub fn escape_single_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\'' | '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}') {
            out.push(c);
        }
        out.push(c);
    }
    out
}

/// Compiled templates for a set of scripts.
pub struct Scripts {
    registry: Handlebars<'static>,
}

impl Scripts {
    /// Compile `scripts`. Fails on the first template that does not parse.
    pub fn new(scripts: &[Script]) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(escape_single_quoted);

        for script in scripts {
            let source = format!("{PRELUDE}\n{}", script.body);
            registry
                .register_template_string(script.name, source)
                .map_err(|e| Error::Template {
                    script: script.name,
                    message: e.to_string(),
                })?;
        }
        Ok(Self { registry })
    }

    /// Render `script` with named arguments.
    pub fn render<A: Serialize>(&self, script: &Script, args: &A) -> Result<String> {
        self.registry
            .render(script.name, args)
            .map_err(|e| Error::Template {
                script: script.name,
                message: e.to_string(),
            })
    }
}

/// Serialize `value` to JSON for a `ConvertFrom-Json` argument.
pub fn json_argument<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}
