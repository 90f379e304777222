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

//! Pass two: byte emission and relocation patching.

use crate::error::{Code, ErrorSink, Fatal};
use crate::mnemonic::{self, MnemonicKind};
use crate::operand::{MemoryRef, Operand};
use crate::passes::pass_one::PassOneOutput;

/// The static cap on assembled output, matching the reference's flat
/// code section.
pub const CODE_BUFFER_CAP: usize = 0x10000;

/// A queued patch: the referenced symbol's resolved address still
/// needs to be written at `offset` once the symbol table is complete.
#[derive(Clone, Debug)]
pub struct Relocation {
    pub offset: usize,
    pub instruction_index: usize,
    pub operand_index: usize,
    pub symbol_name: String,
}

/// Emits every instruction record into a code buffer and patches all
/// queued relocations. Buffer overflow is the only fatal condition;
/// an undefined symbol is reported through `errors` and leaves the
/// buffer's placeholder bytes unpatched, matching the "fails the pass"
/// contract -- the driver is responsible for not writing output when
/// `errors.has_failed()`.
pub fn run(pass_one: &PassOneOutput, errors: &mut ErrorSink) -> Result<Vec<u8>, Fatal> {
    let mut buffer = Vec::with_capacity(pass_one.code_length as usize);
    let mut relocations = Vec::new();

    for (index, record) in pass_one.instructions.iter().enumerate() {
        emit_instruction(record, index, &mut buffer, &mut relocations)?;
    }

    resolve_relocations(&mut buffer, &relocations, pass_one, errors);

    Ok(buffer)
}

fn emit_instruction(
    record: &crate::instruction::InstructionRecord,
    index: usize,
    buffer: &mut Vec<u8>,
    relocations: &mut Vec<Relocation>,
) -> Result<(), Fatal> {
    if buffer.len() + record.length as usize > CODE_BUFFER_CAP {
        return Err(Fatal::BufferOverflow { limit: CODE_BUFFER_CAP });
    }

    let descriptor = mnemonic::lookup(&record.mnemonic)
        .expect("pass one only ever appends records for recognized mnemonics");

    let start = buffer.len();

    match descriptor.kind {
        MnemonicKind::Directive => {
            if descriptor.name == "DB" {
                if let Some(Operand::Immediate(value)) = record.operands.first() {
                    buffer.push((*value & 0xFF) as u8);
                }
            }
            // Every other directive contributes no bytes of its own.
        }
        MnemonicKind::Instruction => {
            buffer.push(descriptor.opcode);

            for (operand_index, operand) in record.operands.iter().enumerate() {
                match operand {
                    Operand::Immediate(value) => {
                        if *value <= 0xFF {
                            buffer.push(*value as u8);
                        } else {
                            buffer.push((*value & 0xFF) as u8);
                            buffer.push(((*value >> 8) & 0xFF) as u8);
                        }
                    }
                    Operand::Register(_) => {
                        // A stand-in mod/R/M byte: the operand's position,
                        // not the register itself, is what's encoded here.
                        buffer.push(0b1100_0000 | (operand_index as u8 & 0b111));
                    }
                    Operand::Label(name) => {
                        relocations.push(Relocation {
                            offset: buffer.len(),
                            instruction_index: index,
                            operand_index,
                            symbol_name: name.clone(),
                        });
                        buffer.push(0);
                        buffer.push(0);
                    }
                    Operand::Memory(MemoryRef::Symbolic(name)) => {
                        relocations.push(Relocation {
                            offset: buffer.len(),
                            instruction_index: index,
                            operand_index,
                            symbol_name: name.clone(),
                        });
                        buffer.push(0);
                        buffer.push(0);
                    }
                    Operand::Memory(MemoryRef::Literal(value)) => {
                        buffer.push((*value & 0xFF) as u8);
                        buffer.push(((*value >> 8) & 0xFF) as u8);
                    }
                    Operand::None | Operand::Invalid => {}
                }
            }
        }
    }

    let emitted = buffer.len() - start;
    let reserved = record.length as usize;
    assert!(
        emitted <= reserved,
        "emitted {emitted} bytes for '{}' at line {} but only {reserved} were reserved",
        record.mnemonic, record.line,
    );
    buffer.resize(start + reserved, 0);

    Ok(())
}

fn resolve_relocations(
    buffer: &mut [u8],
    relocations: &[Relocation],
    pass_one: &PassOneOutput,
    errors: &mut ErrorSink,
) {
    for reloc in relocations {
        let line = pass_one.instructions[reloc.instruction_index].line;
        match pass_one.symtab.lookup(&reloc.symbol_name) {
            Some(symbol) if symbol.defined => {
                let address = symbol.address;
                buffer[reloc.offset] = (address & 0xFF) as u8;
                buffer[reloc.offset + 1] = ((address >> 8) & 0xFF) as u8;
            }
            _ => {
                errors.report_detail(line, Code::ParseUndefinedLabel, reloc.symbol_name.clone());
            }
        }
    }
}
