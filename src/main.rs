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

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use subas::driver::{self, Assembler};
use subas::lexer;
use subas::passes::pass_one;

/// A two-pass assembler for a 16-bit MASM-compatible instruction subset.
#[derive(Parser, Debug)]
#[command(name = "subas", version, about)]
struct Cli {
    /// Source file path.
    input: PathBuf,

    /// Output file path (default: INPUT with a .com extension).
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print per-phase statistics.
    #[arg(short, long)]
    verbose: bool,

    /// Print the token stream and exit, without assembling.
    #[arg(long)]
    dump_tokens: bool,

    /// Print pass-one instruction records and exit, without assembling.
    #[arg(long)]
    dump_instructions: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(fatal) => {
            eprintln!("subas: {fatal}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(true)` on a clean run, `Ok(false)` when diagnostics were
/// reported, and `Err` on a fatal (I/O, overflow) condition.
fn run(cli: &Cli) -> Result<bool, subas::error::Fatal> {
    let source = std::fs::read_to_string(&cli.input).map_err(|source| {
        subas::error::Fatal::Read { path: cli.input.display().to_string(), source }
    })?;

    if cli.dump_tokens {
        let mut errors = subas::error::ErrorSink::new();
        let tokens = lexer::lex_all(&source, &mut errors);
        for token in &tokens {
            println!("{:>5}  {:?}  {:?}", token.line, token.kind, token.text);
        }
        errors.emit(&mut std::io::stderr()).ok();
        return Ok(!errors.has_failed());
    }

    if cli.dump_instructions {
        let mut errors = subas::error::ErrorSink::new();
        let tokens = lexer::lex_all(&source, &mut errors);
        if !errors.has_failed() {
            let output = pass_one::run(&tokens, &mut errors);
            for record in &output.instructions {
                println!(
                    "{:>5}  {:#06x}  {:<5}  {:?}",
                    record.line, record.address, record.mnemonic, record.operands
                );
            }
        }
        errors.emit(&mut std::io::stderr()).ok();
        return Ok(!errors.has_failed());
    }

    let mut assembler = Assembler::new();
    let result = assembler.assemble_source(&source)?;

    let assembly = match result {
        Some(assembly) => assembly,
        None => {
            assembler.emit_diagnostics(&mut std::io::stderr()).ok();
            return Ok(false);
        }
    };

    let output_path = cli.output.clone().unwrap_or_else(|| driver::default_output_path(&cli.input));
    assembler.write_output(&output_path, &assembly.code)?;

    if cli.verbose {
        let stats = &assembly.stats;
        println!("instructions : {}", stats.instructions);
        println!("symbols      : {}", stats.symbols);
        println!("code size    : {} bytes", stats.code_size);
        println!("elapsed      : {} ms", stats.elapsed_ms);
    }

    info!("wrote {} bytes to {}", assembly.code.len(), output_path.display());
    Ok(true)
}
