use std::fmt::Display;

use serde::Serialize;

/// Everything that can go wrong while reading a names file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    TokenTooLong,
    MissingName,
    BadAttributeName,
    DuplicateAttributeName,
    UnknownAttributeInDirective,
    EndOfInputInAttribute,
    BadDiscreteCount,
    SingleAttributeValue,
    CaseWeightNotContinuous,
    BadDefinition,
    NoTarget,
    BadTarget,
}

impl DiagnosticKind {
    /// Fatal kinds abort the load; recoverable ones accumulate so a single
    /// pass can surface as many problems as possible.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DiagnosticKind::EndOfInputInAttribute
                | DiagnosticKind::NoTarget
                | DiagnosticKind::BadTarget
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 1-based line of the names file the problem was detected on.
    pub line: u32,
    pub context: String,
    pub detail: String,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[line {}] ", self.line)?;
        match self.kind {
            DiagnosticKind::TokenTooLong => write!(
                f,
                "name starting `{}` exceeds the maximum name length",
                self.context.chars().take(20).collect::<String>()
            ),
            DiagnosticKind::MissingName => {
                write!(f, "expected a name, found `{}`", self.detail)
            }
            DiagnosticKind::BadAttributeName => {
                write!(
                    f,
                    "attribute name `{}` is not followed by `:` or `=`",
                    self.context
                )
            }
            DiagnosticKind::DuplicateAttributeName => {
                write!(f, "attribute `{}` is declared more than once", self.context)
            }
            DiagnosticKind::UnknownAttributeInDirective => {
                write!(
                    f,
                    "unknown attribute `{}` in include/exclude list",
                    self.context
                )
            }
            DiagnosticKind::EndOfInputInAttribute => {
                write!(
                    f,
                    "unexpected end of file while reading attribute `{}`",
                    self.context
                )
            }
            DiagnosticKind::BadDiscreteCount => {
                write!(
                    f,
                    "bad number of discrete values for attribute `{}`: `{}`",
                    self.context, self.detail
                )
            }
            DiagnosticKind::SingleAttributeValue => {
                write!(
                    f,
                    "attribute `{}` has a single value `{}`",
                    self.context, self.detail
                )
            }
            DiagnosticKind::CaseWeightNotContinuous => {
                write!(f, "the case weight attribute must be continuous")
            }
            DiagnosticKind::BadDefinition => {
                write!(
                    f,
                    "invalid definition for attribute `{}`: {}",
                    self.context, self.detail
                )
            }
            DiagnosticKind::NoTarget => {
                write!(f, "target attribute `{}` is not declared", self.context)
            }
            DiagnosticKind::BadTarget => {
                write!(
                    f,
                    "target attribute `{}` must be declared `continuous`",
                    self.context
                )
            }
        }
    }
}

/// Sink the scanner and parser report into while a load is in flight.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn report(&mut self, kind: DiagnosticKind, line: u32, context: &str, detail: &str) {
        let diagnostic = Diagnostic {
            kind,
            line,
            context: context.to_owned(),
            detail: detail.to_owned(),
        };
        log::debug!("{}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Diagnostic> {
        self.items
    }
}

/// Failure value of a whole names-file load: every diagnostic recorded before
/// the load gave up. Downcast from `anyhow::Error` to get at the list.
#[derive(Debug)]
pub struct NamesError {
    diagnostics: Vec<Diagnostic>,
}

impl NamesError {
    pub(crate) fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl Display for NamesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "names file has {} error(s):", self.diagnostics.len())?;
        for diagnostic in &self.diagnostics {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl std::error::Error for NamesError {}
