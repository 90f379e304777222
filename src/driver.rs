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

//! Top-level assembler interface: sequences the phases and aborts
//! after any phase that ended with a non-zero error count.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info};

use crate::error::{Code, ErrorSink, Fatal};
use crate::lexer;
use crate::passes::{pass_one, pass_two};
use crate::token::Token;

/// Statistics gathered during a successful assembly, surfaced to the
/// caller for `-v` reporting.
#[derive(Debug, Default)]
pub struct Statistics {
    pub source_bytes:  usize,
    pub token_count:   usize,
    pub instructions:  usize,
    pub symbols:       usize,
    pub relocations:   usize,
    pub code_size:     usize,
    pub elapsed_ms:    u128,
}

/// The outcome of one assembly run.
pub struct Assembly {
    pub code: Vec<u8>,
    pub stats: Statistics,
}

/// Top-level assembler. Owns the error sink for the duration of one
/// translation; a second translation starts with a fresh instance.
#[derive(Default)]
pub struct Assembler {
    errors: ErrorSink,
}

impl Assembler {
    pub fn new() -> Self {
        Self { errors: ErrorSink::new() }
    }

    pub fn errors(&self) -> &ErrorSink {
        &self.errors
    }

    /// Assembles `path`, returning the code buffer on success. On any
    /// reported (non-fatal) error, returns `Ok(None)` — the caller
    /// should consult `errors()` for diagnostics and must not write an
    /// output file. Fatal conditions (I/O, buffer overflow) propagate
    /// as `Err`.
    pub fn assemble_file(&mut self, path: &Path) -> Result<Option<Assembly>, Fatal> {
        let source = fs::read_to_string(path).map_err(|source| Fatal::Read {
            path: path.display().to_string(),
            source,
        })?;
        self.assemble_source(&source)
    }

    /// Assembles source text already in memory.
    pub fn assemble_source(&mut self, source: &str) -> Result<Option<Assembly>, Fatal> {
        let started = Instant::now();

        debug!("phase: lex");
        let tokens: Vec<Token> = lexer::lex_all(source, &mut self.errors);
        if self.errors.has_failed() {
            info!("aborting after lex phase: {} error(s)", self.errors.count());
            return Ok(None);
        }

        debug!("phase: pass one ({} tokens)", tokens.len());
        let pass_one_output = pass_one::run(&tokens, &mut self.errors);
        if self.errors.has_failed() {
            info!("aborting after pass one: {} error(s)", self.errors.count());
            return Ok(None);
        }

        debug!("phase: pass two ({} instructions)", pass_one_output.instructions.len());
        let code = pass_two::run(&pass_one_output, &mut self.errors)?;
        if self.errors.has_failed() {
            info!("aborting after pass two: {} error(s)", self.errors.count());
            return Ok(None);
        }

        let stats = Statistics {
            source_bytes: source.len(),
            token_count:  tokens.len(),
            instructions: pass_one_output.instructions.len(),
            symbols:      pass_one_output.symtab.len(),
            relocations:  0,
            code_size:    code.len(),
            elapsed_ms:   started.elapsed().as_millis(),
        };

        Ok(Some(Assembly { code, stats }))
    }

    /// Writes `code` to `path`. Per the spec's output contract, no
    /// output file should be written when assembly failed; callers are
    /// expected to gate this on `errors().has_failed()` themselves.
    pub fn write_output(&mut self, path: &Path, code: &[u8]) -> Result<(), Fatal> {
        fs::write(path, code).map_err(|source| Fatal::Write {
            path: path.display().to_string(),
            source,
        })
    }

    /// Prints accumulated diagnostics to `writer`.
    pub fn emit_diagnostics(&self, writer: &mut impl std::io::Write) -> std::io::Result<()> {
        self.errors.emit(writer)
    }
}

/// Derives the default output path by replacing `input`'s extension
/// with `.com`, or appending `.com` if it has none.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("com")
}

/// A reported error with no associated line, used for driver-level
/// conditions that are not about a specific line of source (there are
/// none currently reachable from normal operation, but the code for
/// it matches the taxonomy's system partition).
pub fn report_system_error(errors: &mut ErrorSink, detail: impl Into<String>) {
    errors.report_detail(0, Code::SysFileIo, detail);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_path_replaces_extension() {
        assert_eq!(default_output_path(Path::new("prog.asm")), PathBuf::from("prog.com"));
    }

    #[test]
    fn default_output_path_appends_when_no_extension() {
        assert_eq!(default_output_path(Path::new("prog")), PathBuf::from("prog.com"));
    }

    #[test]
    fn assemble_source_succeeds_on_simple_program() {
        let mut assembler = Assembler::new();
        let result = assembler.assemble_source("RET\n").unwrap();
        let assembly = result.expect("assembly should succeed");
        assert_eq!(assembly.code, vec![0xC3]);
        assert_eq!(assembly.stats.instructions, 1);
    }

    #[test]
    fn assemble_source_fails_cleanly_on_duplicate_label() {
        let mut assembler = Assembler::new();
        let result = assembler.assemble_source("L1: RET\nL1: RET\n").unwrap();
        assert!(result.is_none());
        assert_eq!(assembler.errors().count(), 1);
    }

    #[test]
    fn assemble_source_fails_cleanly_on_undefined_symbol() {
        let mut assembler = Assembler::new();
        let result = assembler.assemble_source("JMP NOWHERE\n").unwrap();
        assert!(result.is_none());
        assert_eq!(assembler.errors().count(), 1);
    }

    #[test]
    fn empty_source_assembles_to_empty_output() {
        let mut assembler = Assembler::new();
        let assembly = assembler.assemble_source("").unwrap().unwrap();
        assert!(assembly.code.is_empty());
    }
}
