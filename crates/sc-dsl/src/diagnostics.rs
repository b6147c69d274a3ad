use ariadne::{Color, Label, Report, ReportKind, Source};
use std::fmt;

use crate::ast::Span;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The call could not be read at all.
    Error,
    /// The call was read but dropped by schema checks.
    Warning,
}

/// Why a call was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// Unreadable characters or an unterminated string inside a call.
    Lex,
    /// The call does not match `verb(arg, ...)`.
    Syntax,
    /// Too few or too many arguments for the verb.
    Arity,
    /// The path names no declared parameter.
    UnknownParameter,
    /// The path's segment count disagrees with the parameter's scope.
    ScopeMismatch,
    /// A subject, target, character or location is not declared.
    UnknownEntity,
    /// An action, tier or literal argument is not acceptable.
    InvalidArgument,
}

impl DiagnosticCode {
    /// Stable short name, used in rendered reports and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lex => "lex",
            Self::Syntax => "syntax",
            Self::Arity => "arity",
            Self::UnknownParameter => "unknown-parameter",
            Self::ScopeMismatch => "scope-mismatch",
            Self::UnknownEntity => "unknown-entity",
            Self::InvalidArgument => "invalid-argument",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dropped-call report with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Error or warning.
    pub severity: Severity,
    /// Category of the problem.
    pub code: DiagnosticCode,
    /// Byte range in the parsed block.
    pub span: Span,
    /// Human-readable description.
    pub message: String,
    /// Optional short label shown under the span.
    pub label: Option<String>,
}

impl Diagnostic {
    /// An error diagnostic.
    pub fn error(code: DiagnosticCode, span: Span, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            span,
            message: message.into(),
            label: None,
        }
    }

    /// A warning diagnostic.
    pub fn warning(code: DiagnosticCode, span: Span, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            span,
            message: message.into(),
            label: None,
        }
    }

    /// Attach a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{prefix}[{}]: {}", self.code, self.message)
    }
}

/// Render diagnostics with ariadne for terminal output.
pub fn render_diagnostics(source: &str, filename: &str, diagnostics: &[Diagnostic]) -> String {
    let mut output = Vec::new();

    for diag in diagnostics {
        let (kind, color) = match diag.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
        };

        let span = (filename, diag.span.clone());
        let label_text = diag.label.as_deref().unwrap_or(&diag.message);
        Report::build(kind, span)
            .with_code(diag.code.as_str())
            .with_message(&diag.message)
            .with_label(
                Label::new((filename, diag.span.clone()))
                    .with_message(label_text)
                    .with_color(color),
            )
            .finish()
            .write((filename, Source::from(source)), &mut output)
            .ok();
    }

    String::from_utf8(output).unwrap_or_default()
}
