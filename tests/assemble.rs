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

//! End-to-end assembly checks driven through [`subas::driver::Assembler`],
//! mirroring the reference implementation's semantic+codegen integration
//! tests rather than unit-testing each phase in isolation.

use subas::driver::Assembler;

fn assemble_ok(source: &str) -> Vec<u8> {
    let mut assembler = Assembler::new();
    let assembly = assembler
        .assemble_source(source)
        .expect("no fatal condition")
        .expect("assembly should succeed");
    assert_eq!(assembler.errors().count(), 0);
    assembly.code
}

fn assemble_err(source: &str) -> usize {
    let mut assembler = Assembler::new();
    let result = assembler.assemble_source(source).expect("no fatal condition");
    assert!(result.is_none(), "expected assembly to fail");
    assembler.errors().count()
}

#[test]
fn two_simple_instructions_advance_address_and_code_length() {
    let mut assembler = Assembler::new();
    let assembly = assembler
        .assemble_source("MOV\nRET\n")
        .unwrap()
        .expect("assembly should succeed");
    assert_eq!(assembly.stats.instructions, 2);
    assert!(assembly.code.len() > 0);
}

#[test]
fn a_label_followed_by_an_instruction_registers_one_symbol() {
    let mut assembler = Assembler::new();
    let assembly = assembler
        .assemble_source("LABEL: MOV\nRET\n")
        .unwrap()
        .expect("assembly should succeed");
    assert_eq!(assembly.stats.symbols, 1);
    assert_eq!(assembly.stats.instructions, 2);
}

#[test]
fn forward_reference_resolves_to_the_labels_final_address() {
    let code = assemble_ok("JMP FOO\nFOO: RET\n");
    assert_eq!(code, vec![0xEB, 0x03, 0x00, 0xC3]);
}

#[test]
fn db_directives_emit_one_byte_each_with_no_operand_encoding_overhead() {
    let code = assemble_ok("DB 0x41\nDB 0x42\nDB 0x43\n");
    assert_eq!(code, vec![0x41, 0x42, 0x43]);
}

#[test]
fn duplicate_label_definitions_are_rejected() {
    let count = assemble_err("DUP: RET\nDUP: RET\n");
    assert_eq!(count, 1);
}

#[test]
fn references_to_undefined_labels_are_rejected() {
    let count = assemble_err("JMP NOWHERE\n");
    assert_eq!(count, 1);
}

#[test]
fn unknown_mnemonics_are_rejected_in_pass_one() {
    let count = assemble_err("FROBNICATE\n");
    assert_eq!(count, 1);
}

#[test]
fn a_blank_source_file_assembles_to_an_empty_program() {
    let code = assemble_ok("\n\n; just a comment\n\n");
    assert!(code.is_empty());
}

#[test]
fn procedure_and_variable_symbols_are_distinguished_from_plain_labels() {
    let mut assembler = Assembler::new();
    let assembly = assembler
        .assemble_source("MAIN PROC\nRET\nMAIN ENDP\nCOUNTER DB 0x00\n")
        .unwrap()
        .expect("assembly should succeed");
    assert_eq!(assembly.stats.symbols, 2);
}
