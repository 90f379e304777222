// This file is part of subas, an assembler.
//
// SPDX-License-Identifier: GPL-3.0-or-later
//
// subas is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published
// by the Free Software Foundation, either version 3 of the License,
// or (at your option) any later version.
//
// subas is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See
// the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with subas.  If not, see <http://www.gnu.org/licenses/>.

//! Diagnostic codes and the process-wide error sink.

use std::fmt::{self, Display, Formatter};
use colored::Colorize;

/// A diagnostic code, partitioned by phase: 1xxx lexical, 2xxx
/// syntax/semantic, 3xxx system.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Code {
    LexInvalidChar    = 1001,
    LexUnclosedString = 1002,
    LexInvalidNumber  = 1003,

    ParseExpectedOperand  = 2001,
    ParseInvalidRegister  = 2002,
    ParseUnknownMnemonic  = 2003,
    ParseDuplicateLabel   = 2004,
    ParseUndefinedLabel   = 2005,

    SysOutOfMemory = 3001,
    SysFileIo      = 3002,
}

impl Code {
    /// The fixed human-readable message associated with this code.
    pub fn message(self) -> &'static str {
        use Code::*;
        match self {
            LexInvalidChar        => "Lexical Error: Invalid character encountered",
            LexUnclosedString     => "Lexical Error: Unclosed string literal",
            LexInvalidNumber      => "Lexical Error: Invalid numeric constant",
            ParseExpectedOperand  => "Syntax Error: Expected operand missing",
            ParseInvalidRegister  => "Syntax Error: Invalid register name",
            ParseUnknownMnemonic  => "Syntax Error: Unknown instruction mnemonic",
            ParseDuplicateLabel   => "Symbol Error: Duplicate label definition",
            ParseUndefinedLabel   => "Symbol Error: Undefined reference to label",
            SysOutOfMemory        => "System Error: Memory allocation failed",
            SysFileIo             => "System Error: File I/O operation failed",
        }
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", *self as u32)
    }
}

/// A single reported diagnostic.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub line:   u32,
    pub code:   Code,
    pub detail: Option<String>,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let prefix = format!("Error E{}:", self.code as u32);
        write!(f, "[Line {}] {} {}", self.line, prefix.red(), self.code.message())?;
        if let Some(detail) = &self.detail {
            write!(f, " -> {}", detail)?;
        }
        Ok(())
    }
}

/// Collects diagnostics reported during assembly and tracks the total
/// error count that the driver uses to decide whether to abort.
///
/// There is exactly one sink per assembly run; it is threaded by
/// mutable reference through the lexer and both passes rather than kept
/// as global state, so that multiple assemblies can run within one
/// process (e.g. a test suite) without interfering with each other.
#[derive(Default, Debug)]
pub struct ErrorSink {
    diagnostics: Vec<Diagnostic>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports an error at `line` with no further detail.
    pub fn report(&mut self, line: u32, code: Code) {
        self.diagnostics.push(Diagnostic { line, code, detail: None });
    }

    /// Reports an error at `line` with an additional detail string,
    /// rendered after a `->` arrow.
    pub fn report_detail(&mut self, line: u32, code: Code, detail: impl Into<String>) {
        self.diagnostics.push(Diagnostic { line, code, detail: Some(detail.into()) });
    }

    /// The number of diagnostics reported so far.
    pub fn count(&self) -> usize {
        self.diagnostics.len()
    }

    /// Whether any diagnostic has been reported.
    pub fn has_failed(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Iterates the diagnostics in report order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Prints every diagnostic to `writer`, one per line.
    pub fn emit(&self, writer: &mut impl std::io::Write) -> std::io::Result<()> {
        for d in &self.diagnostics {
            writeln!(writer, "{}", d)?;
        }
        Ok(())
    }
}

/// Fatal conditions that abort the current call rather than accumulate
/// in an [`ErrorSink`]: these are host/environment failures, not
/// problems with the assembled source, so the driver propagates them
/// with `?` instead of continuing to the next phase.
#[derive(thiserror::Error, Debug)]
pub enum Fatal {
    #[error("could not read '{path}': {source}")]
    Read { path: String, #[source] source: std::io::Error },

    #[error("could not write '{path}': {source}")]
    Write { path: String, #[source] source: std::io::Error },

    #[error("code buffer overflow: assembled output exceeds {limit} bytes")]
    BufferOverflow { limit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_format_without_detail() {
        let d = Diagnostic { line: 12, code: Code::ParseUndefinedLabel, detail: None };
        let s = format!("{}", d);
        assert!(s.contains("[Line 12]"));
        assert!(s.contains("E2005"));
        assert!(s.contains("Undefined reference to label"));
        assert!(!s.contains("->"));
    }

    #[test]
    fn diagnostic_format_with_detail() {
        let d = Diagnostic {
            line: 3,
            code: Code::ParseUnknownMnemonic,
            detail: Some("FROB".into()),
        };
        let s = format!("{}", d);
        assert!(s.contains("-> FROB"));
    }

    #[test]
    fn sink_counts_reports() {
        let mut sink = ErrorSink::new();
        assert!(!sink.has_failed());
        sink.report(1, Code::LexInvalidChar);
        sink.report_detail(2, Code::ParseDuplicateLabel, "FOO");
        assert_eq!(sink.count(), 2);
        assert!(sink.has_failed());
    }
}
