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

//! Pass one: statement recognition, address assignment, symbol
//! registration.

use crate::error::{Code, ErrorSink};
use crate::instruction::{InstructionRecord, MAX_OPERANDS};
use crate::mnemonic;
use crate::operand::{self, MemoryRef, Operand};
use crate::symtab::{InsertResult, SymbolKind, SymbolTable};
use crate::token::{Token, TokenKind};

/// The result of pass one: the recognized instruction records, the
/// symbol table built while recognizing them, and the final location
/// counter (the size of the program image).
pub struct PassOneOutput {
    pub instructions: Vec<InstructionRecord>,
    pub symtab: SymbolTable,
    pub code_length: u32,
}

/// Runs pass one over a complete token stream. Always completes
/// (recoverable errors are reported through `errors`, not returned);
/// the caller checks `errors.has_failed()` before proceeding to pass
/// two, per the driver's phase-gating contract.
pub fn run(tokens: &[Token], errors: &mut ErrorSink) -> PassOneOutput {
    let mut symtab = SymbolTable::new();
    let mut instructions = Vec::new();
    let mut address: u32 = 0;
    let mut i = 0usize;

    while i < tokens.len() && tokens[i].kind != TokenKind::Eof {
        if tokens[i].kind == TokenKind::Newline {
            i += 1;
            continue;
        }

        match parse_statement(tokens, &mut i, address, &mut symtab, errors) {
            Some(record) => {
                address += record.length;
                instructions.push(record);
            }
            None => {
                while i < tokens.len()
                    && !matches!(tokens[i].kind, TokenKind::Newline | TokenKind::Eof)
                {
                    i += 1;
                }
            }
        }
    }

    PassOneOutput { instructions, symtab, code_length: address }
}

fn insert_label(
    symtab: &mut SymbolTable,
    errors: &mut ErrorSink,
    name: &str,
    kind: SymbolKind,
    address: u32,
    line: u32,
) {
    if symtab.insert(name, kind, address, line) == InsertResult::AlreadyPresent {
        errors.report_detail(line, Code::ParseDuplicateLabel, name.to_string());
    }
}

fn length_of(mnemonic: &str) -> u32 {
    match mnemonic {
        "DB" => 1,
        "ORG" | "SEGMENT" | "ENDS" | "PROC" | "ENDP" | "END" => 0,
        _ => 3,
    }
}

fn peek_kind(tokens: &[Token], i: usize) -> Option<TokenKind> {
    tokens.get(i).map(|t| t.kind.clone())
}

/// Recognizes and parses a single statement starting at `*i`, advancing
/// `*i` past the consumed tokens. Returns `None` (without appending a
/// record) if the statement could not be recognized at all.
fn parse_statement(
    tokens: &[Token],
    i: &mut usize,
    address: u32,
    symtab: &mut SymbolTable,
    errors: &mut ErrorSink,
) -> Option<InstructionRecord> {
    let line = tokens[*i].line;
    let mut label: Option<(String, SymbolKind)> = None;

    // 1. "IDENT ':'" -- a label prefix.
    if tokens[*i].kind == TokenKind::Ident && peek_kind(tokens, *i + 1) == Some(TokenKind::Colon) {
        let name = tokens[*i].text.clone();
        *i += 2;

        if *i >= tokens.len() || matches!(tokens[*i].kind, TokenKind::Newline | TokenKind::Eof) {
            insert_label(symtab, errors, &name, SymbolKind::Label, address, line);
            let mut record = InstructionRecord::new(address, length_of("NOP"), line, "NOP");
            record.label = Some(name);
            return Some(record);
        }

        label = Some((name, SymbolKind::Label));
    }

    if *i >= tokens.len() || tokens[*i].kind != TokenKind::Ident {
        errors.report_detail(line, Code::ParseExpectedOperand, "expected instruction or directive");
        return None;
    }

    let mut pending_operand: Option<Operand> = None;
    let mnemonic_name: String;

    // 2. "IDENT IDENT ..." -- the second identifier may itself be a
    //    recognized mnemonic, in which case the first is a label-like
    //    prefix (for PROC/DB) or a plain operand (everything else).
    if peek_kind(tokens, *i + 1) == Some(TokenKind::Ident) {
        let second_text = tokens[*i + 1].text.clone();
        if let Some(descriptor) = mnemonic::lookup(&second_text) {
            let first_name = tokens[*i].text.clone();
            match descriptor.name {
                "PROC" => label = Some((first_name, SymbolKind::Procedure)),
                "DB" => label = Some((first_name, SymbolKind::Variable)),
                _ => pending_operand = Some(Operand::Label(first_name)),
            }
            mnemonic_name = descriptor.name.to_string();
            *i += 2;
        } else {
            mnemonic_name = tokens[*i].text.to_uppercase();
            *i += 1;
        }
    } else {
        mnemonic_name = tokens[*i].text.to_uppercase();
        *i += 1;
    }

    let descriptor = match mnemonic::lookup(&mnemonic_name) {
        Some(d) => d,
        None => {
            errors.report_detail(line, Code::ParseUnknownMnemonic, mnemonic_name);
            return None;
        }
    };

    let mut operands = Vec::new();
    if let Some(op) = pending_operand.take() {
        operands.push(op);
    }
    if !parse_operands(tokens, i, line, &mut operands, errors) {
        return None;
    }

    // MOV's destination may not be an immediate.
    if descriptor.name == "MOV" {
        if let Some(Operand::Immediate(_)) = operands.first() {
            errors.report_detail(line, Code::ParseInvalidRegister, "MOV destination cannot be an immediate value");
            return None;
        }
    }

    let mut record = InstructionRecord::new(address, length_of(descriptor.name), line, descriptor.name);
    record.operands = operands;

    if let Some((name, kind)) = label {
        insert_label(symtab, errors, &name, kind, address, line);
        record.label = Some(name);
    }

    Some(record)
}

/// Parses comma-separated operands until end-of-line, end-of-input, or
/// a non-operand token. At most [`MAX_OPERANDS`] operands are kept; a
/// fourth is a reported error, the rest of the statement is dropped,
/// and `false` is returned so the caller discards the whole statement.
fn parse_operands(
    tokens: &[Token],
    i: &mut usize,
    line: u32,
    operands: &mut Vec<Operand>,
    errors: &mut ErrorSink,
) -> bool {
    loop {
        if *i >= tokens.len() || matches!(tokens[*i].kind, TokenKind::Newline | TokenKind::Eof) {
            return true;
        }

        if operands.len() >= MAX_OPERANDS {
            errors.report_detail(line, Code::ParseExpectedOperand, "too many operands");
            while *i < tokens.len() && !matches!(tokens[*i].kind, TokenKind::Newline | TokenKind::Eof) {
                *i += 1;
            }
            return false;
        }

        let operand = match tokens[*i].kind {
            TokenKind::Ident => {
                let text = tokens[*i].text.clone();
                // A colon-qualified identifier ("segreg:label", as in
                // ASSUME's "CS:CODE") is always a label reference, even
                // when the identifier itself also names a segment
                // register -- the merge below only ever fires on
                // `Operand::Label`, so register classification must not
                // pre-empt it.
                let is_colon_qualified = peek_kind(tokens, *i + 1) == Some(TokenKind::Colon)
                    && peek_kind(tokens, *i + 2) == Some(TokenKind::Ident);
                *i += 1;
                if is_colon_qualified {
                    Operand::Label(text)
                } else {
                    match operand::lookup_register(&text) {
                        Some(reg) => Operand::Register(reg),
                        None => Operand::Label(text),
                    }
                }
            }
            TokenKind::Number => {
                let value = tokens[*i].value;
                *i += 1;
                Operand::Immediate(value)
            }
            TokenKind::LBracket => {
                *i += 1;
                let memory = if *i < tokens.len() && tokens[*i].kind == TokenKind::Number {
                    let value = tokens[*i].value;
                    *i += 1;
                    MemoryRef::Literal(value)
                } else if *i < tokens.len() && tokens[*i].kind == TokenKind::Ident {
                    let name = tokens[*i].text.clone();
                    *i += 1;
                    MemoryRef::Symbolic(name)
                } else {
                    MemoryRef::Literal(0)
                };
                if *i < tokens.len() && tokens[*i].kind == TokenKind::RBracket {
                    *i += 1;
                }
                Operand::Memory(memory)
            }
            _ => return true,
        };

        operands.push(operand);

        // "segreg:label" colon-merge, e.g. ASSUME's "CS:CODE".
        if matches!(operands.last(), Some(Operand::Label(_)))
            && peek_kind(tokens, *i) == Some(TokenKind::Colon)
            && peek_kind(tokens, *i + 1) == Some(TokenKind::Ident)
        {
            let suffix = tokens[*i + 1].text.clone();
            if let Some(Operand::Label(name)) = operands.last_mut() {
                name.push(':');
                name.push_str(&suffix);
            }
            *i += 2;
        }

        if *i < tokens.len() && tokens[*i].kind == TokenKind::Comma {
            *i += 1;
        } else {
            return true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex_all;

    fn run_source(source: &str) -> (PassOneOutput, ErrorSink) {
        let mut errors = ErrorSink::new();
        let tokens = lex_all(source, &mut errors);
        let output = run(&tokens, &mut errors);
        (output, errors)
    }

    #[test]
    fn ret_alone_is_one_zero_operand_instruction() {
        let (out, errors) = run_source("RET\n");
        assert_eq!(errors.count(), 0);
        assert_eq!(out.instructions.len(), 1);
        assert_eq!(out.instructions[0].mnemonic, "RET");
        assert_eq!(out.instructions[0].address, 0);
        assert_eq!(out.instructions[0].length, 3);
    }

    #[test]
    fn label_alone_gets_synthetic_nop() {
        let (out, errors) = run_source("FOO:\n");
        assert_eq!(errors.count(), 0);
        assert_eq!(out.instructions.len(), 1);
        assert_eq!(out.instructions[0].mnemonic, "NOP");
        assert_eq!(out.instructions[0].label.as_deref(), Some("FOO"));
        assert_eq!(out.symtab.lookup("FOO").unwrap().address, 0);
    }

    #[test]
    fn db_prefixed_identifier_becomes_a_variable_symbol() {
        let (out, errors) = run_source("COUNT DB 5\n");
        assert_eq!(errors.count(), 0);
        let symbol = out.symtab.lookup("COUNT").unwrap();
        assert_eq!(symbol.kind, SymbolKind::Variable);
        assert_eq!(out.instructions[0].mnemonic, "DB");
        assert_eq!(out.instructions[0].length, 1);
    }

    #[test]
    fn proc_prefixed_identifier_becomes_a_procedure_symbol() {
        let (out, errors) = run_source("MAIN PROC\n");
        assert_eq!(errors.count(), 0);
        let symbol = out.symtab.lookup("MAIN").unwrap();
        assert_eq!(symbol.kind, SymbolKind::Procedure);
        assert_eq!(out.instructions[0].length, 0);
    }

    #[test]
    fn duplicate_label_is_reported() {
        let (_out, errors) = run_source("L1: RET\nL1: RET\n");
        assert_eq!(errors.count(), 1);
    }

    #[test]
    fn unknown_mnemonic_is_reported_and_record_dropped() {
        let (out, errors) = run_source("FROB AX\n");
        assert_eq!(errors.count(), 1);
        assert_eq!(out.instructions.len(), 0);
    }

    #[test]
    fn addresses_accumulate_with_length() {
        let (out, errors) = run_source("DB 1\nDB 2\nRET\n");
        assert_eq!(errors.count(), 0);
        assert_eq!(out.instructions[0].address, 0);
        assert_eq!(out.instructions[1].address, 1);
        assert_eq!(out.instructions[2].address, 2);
        assert_eq!(out.code_length, 5);
    }

    #[test]
    fn jmp_to_forward_label_is_a_label_operand() {
        let (out, errors) = run_source("JMP FOO\nFOO: RET\n");
        assert_eq!(errors.count(), 0);
        assert_eq!(out.instructions[0].mnemonic, "JMP");
        assert_eq!(out.instructions[0].operands, vec![Operand::Label("FOO".into())]);
        assert_eq!(out.symtab.lookup("FOO").unwrap().address, 3);
    }

    #[test]
    fn mov_with_immediate_destination_is_rejected() {
        let (out, errors) = run_source("MOV 5, AX\n");
        assert_eq!(errors.count(), 1);
        assert_eq!(out.instructions.len(), 0);
    }

    #[test]
    fn too_many_operands_drops_the_rest_of_the_line() {
        let (out, errors) = run_source("MOV AX, BX, CX, DX\n");
        assert_eq!(errors.count(), 1);
        assert_eq!(out.instructions.len(), 0);
    }

    #[test]
    fn assume_segreg_colon_label_merges_into_one_operand() {
        let (out, errors) = run_source("ASSUME CS:CODE\n");
        assert_eq!(errors.count(), 0);
        assert_eq!(out.instructions.len(), 1);
        assert_eq!(out.instructions[0].operands, vec![Operand::Label("CS:CODE".into())]);
    }

    #[test]
    fn segment_register_without_colon_is_still_a_register_operand() {
        let (out, errors) = run_source("MOV ES, AX\n");
        assert_eq!(errors.count(), 0);
        assert_eq!(out.instructions[0].operands[0], Operand::Register(0));
    }

    #[test]
    fn blank_and_comment_only_lines_produce_nothing() {
        let (out, errors) = run_source("; just a comment\n\n");
        assert_eq!(errors.count(), 0);
        assert_eq!(out.instructions.len(), 0);
    }
}
