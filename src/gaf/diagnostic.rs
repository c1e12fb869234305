use std::fmt;

use crate::path_parser::PathError;

/// How ingestion reacts to a record it has to skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserTolerance {
    /// Skip bad records without recording a diagnostic for them.
    IgnoreAll,
    /// Skip bad records, recording one diagnostic each.
    Safe,
    /// Record the first bad record's diagnostic and stop reading.
    Pedantic,
}

impl Default for ParserTolerance {
    fn default() -> Self {
        Self::Safe
    }
}

/// Why a line (or the whole source) produced no alignment. The
/// Display output is safe to show to users verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The record had fewer than the six mandatory fields.
    NotEnoughFields { line: usize },
    /// The path field could not be parsed.
    PathSyntax { line: usize, error: PathError },
    /// The parsed walk was rejected by path validation.
    InvalidPath { line: usize, reason: String },
    /// Reading failed partway through the source.
    ReadFailed { line: usize, message: String },
    /// The source could not be opened at all.
    SourceUnavailable { source: String },
    /// Nothing was loaded and nothing else was reported.
    NoAlignments,
}

impl Diagnostic {
    /// An empty reason is replaced by the generic one.
    pub fn invalid_path(line: usize, reason: String) -> Self {
        let reason = if reason.is_empty() {
            "the nodes do not form a path".to_string()
        } else {
            reason
        };
        Diagnostic::InvalidPath { line, reason }
    }

    /// The 1-based line the diagnostic refers to, if it refers to one
    pub fn line(&self) -> Option<usize> {
        use Diagnostic as D;
        match self {
            D::NotEnoughFields { line }
            | D::PathSyntax { line, .. }
            | D::InvalidPath { line, .. }
            | D::ReadFailed { line, .. } => Some(*line),
            D::SourceUnavailable { .. } | D::NoAlignments => None,
        }
    }

    /// Whether ingestion may keep reading after this diagnostic.
    pub fn can_safely_continue(&self, tol: &ParserTolerance) -> bool {
        use ParserTolerance as Tol;
        match self {
            Diagnostic::ReadFailed { .. } => false,
            Diagnostic::SourceUnavailable { .. } => false,
            _ => match tol {
                Tol::IgnoreAll | Tol::Safe => true,
                Tol::Pedantic => false,
            },
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Diagnostic as D;
        match self {
            D::NotEnoughFields { line } => {
                write!(f, "Line {}: not enough fields, skipped.", line)
            }
            D::PathSyntax { line, error } => {
                write!(f, "Line {}: failed to parse path ({}).", line, error)
            }
            D::InvalidPath { line, reason } => {
                write!(f, "Line {}: invalid path ({}).", line, reason)
            }
            D::ReadFailed { line, message } => {
                write!(f, "Line {}: could not be read ({}).", line, message)
            }
            D::SourceUnavailable { source } => {
                write!(f, "Cannot open GAF file: {}", source)
            }
            D::NoAlignments => write!(f, "No alignments were found in the file."),
        }
    }
}
