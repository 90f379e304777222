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

//! The static mnemonic table.
//!
//! Every mnemonic the assembler recognizes, along with its opcode and
//! whether it is an ordinary instruction or a directive (pseudo-op), is
//! fixed at compile time. Lookup is a case-insensitive linear scan; the
//! table is small enough that a hash map would not earn its keep.

/// Whether a mnemonic names an ordinary instruction or a directive.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum MnemonicKind {
    /// An ordinary instruction, encoded as an opcode byte plus operands.
    Instruction,

    /// A pseudo-op that the emitter handles specially (`ORG`, `DB`, ...).
    Directive,
}

/// A single entry in the mnemonic table.
#[derive(Copy, Clone, Debug)]
pub struct MnemonicDescriptor {
    /// The canonical (upper-case) spelling of the mnemonic.
    pub name: &'static str,

    /// Instruction vs. directive.
    pub kind: MnemonicKind,

    /// The opcode byte emitted for this mnemonic. Directives that emit no
    /// opcode of their own carry `0x00` here; it is unused in that case.
    pub opcode: u8,

    /// The number of operands this mnemonic expects.
    pub operand_count: u32,

    /// A short human-readable description, surfaced in `--help`-adjacent
    /// diagnostics and in verbose statistics output.
    pub description: &'static str,
}

use MnemonicKind::*;

/// The complete mnemonic table, in declaration order.
pub static MNEMONICS: &[MnemonicDescriptor] = &[
    // Data movement and arithmetic
    MnemonicDescriptor { name: "MOV", kind: Instruction, opcode: 0x88, operand_count: 2, description: "Move data between registers or memory" },
    MnemonicDescriptor { name: "ADD", kind: Instruction, opcode: 0x04, operand_count: 2, description: "Add two operands" },
    MnemonicDescriptor { name: "SUB", kind: Instruction, opcode: 0x2C, operand_count: 2, description: "Subtract second operand from first" },
    MnemonicDescriptor { name: "MUL", kind: Instruction, opcode: 0xF6, operand_count: 1, description: "Multiply accumulator by operand" },
    MnemonicDescriptor { name: "DIV", kind: Instruction, opcode: 0xF6, operand_count: 1, description: "Divide accumulator by operand" },
    MnemonicDescriptor { name: "CMP", kind: Instruction, opcode: 0x3C, operand_count: 2, description: "Compare two operands and set flags" },

    // Bitwise operations
    MnemonicDescriptor { name: "AND", kind: Instruction, opcode: 0x24, operand_count: 2, description: "Bitwise AND" },
    MnemonicDescriptor { name: "OR",  kind: Instruction, opcode: 0x0C, operand_count: 2, description: "Bitwise OR" },
    MnemonicDescriptor { name: "XOR", kind: Instruction, opcode: 0x34, operand_count: 2, description: "Bitwise XOR" },
    MnemonicDescriptor { name: "SHL", kind: Instruction, opcode: 0xD0, operand_count: 1, description: "Shift left" },
    MnemonicDescriptor { name: "SHR", kind: Instruction, opcode: 0xD0, operand_count: 1, description: "Shift right" },

    // Control flow
    MnemonicDescriptor { name: "JMP",  kind: Instruction, opcode: 0xEB, operand_count: 1, description: "Unconditional jump" },
    MnemonicDescriptor { name: "JZ",   kind: Instruction, opcode: 0x74, operand_count: 1, description: "Jump if zero" },
    MnemonicDescriptor { name: "JNZ",  kind: Instruction, opcode: 0x75, operand_count: 1, description: "Jump if not zero" },
    MnemonicDescriptor { name: "JC",   kind: Instruction, opcode: 0x72, operand_count: 1, description: "Jump if carry" },
    MnemonicDescriptor { name: "JNC",  kind: Instruction, opcode: 0x73, operand_count: 1, description: "Jump if not carry" },
    MnemonicDescriptor { name: "LOOP", kind: Instruction, opcode: 0xE2, operand_count: 1, description: "Loop while CX != 0" },

    // Stack and subroutines
    MnemonicDescriptor { name: "PUSH", kind: Instruction, opcode: 0x50, operand_count: 1, description: "Push operand onto stack" },
    MnemonicDescriptor { name: "POP",  kind: Instruction, opcode: 0x58, operand_count: 1, description: "Pop from stack" },
    MnemonicDescriptor { name: "CALL", kind: Instruction, opcode: 0xE8, operand_count: 1, description: "Call subroutine" },
    MnemonicDescriptor { name: "RET",  kind: Instruction, opcode: 0xC3, operand_count: 0, description: "Return from subroutine" },
    MnemonicDescriptor { name: "NOP",  kind: Instruction, opcode: 0x90, operand_count: 0, description: "No operation" },

    // Flags
    MnemonicDescriptor { name: "CLC", kind: Instruction, opcode: 0xF8, operand_count: 0, description: "Clear carry flag" },
    MnemonicDescriptor { name: "STC", kind: Instruction, opcode: 0xF9, operand_count: 0, description: "Set carry flag" },

    // Interrupts
    MnemonicDescriptor { name: "INT", kind: Instruction, opcode: 0xCD, operand_count: 1, description: "Call interrupt handler" },

    // Directives
    MnemonicDescriptor { name: "SEGMENT", kind: Directive, opcode: 0x00, operand_count: 0, description: "Define memory segment" },
    MnemonicDescriptor { name: "ENDS",    kind: Directive, opcode: 0x00, operand_count: 0, description: "End segment definition" },
    MnemonicDescriptor { name: "ASSUME",  kind: Directive, opcode: 0x00, operand_count: 1, description: "Assume register segment association" },
    MnemonicDescriptor { name: "ORG",     kind: Directive, opcode: 0x00, operand_count: 1, description: "Set origin address" },
    MnemonicDescriptor { name: "DB",      kind: Directive, opcode: 0x00, operand_count: 1, description: "Define byte(s)" },
    MnemonicDescriptor { name: "PROC",    kind: Directive, opcode: 0x00, operand_count: 0, description: "Define procedure" },
    MnemonicDescriptor { name: "ENDP",    kind: Directive, opcode: 0x00, operand_count: 0, description: "End procedure" },
    MnemonicDescriptor { name: "END",     kind: Directive, opcode: 0x00, operand_count: 0, description: "End assembly" },
];

/// Looks up a mnemonic by name, case-insensitively.
pub fn lookup(name: &str) -> Option<&'static MnemonicDescriptor> {
    MNEMONICS.iter().find(|m| m.name.eq_ignore_ascii_case(name))
}

/// Returns whether `name` is a directive. `None` if `name` is not a
/// recognized mnemonic at all.
pub fn is_directive(name: &str) -> Option<bool> {
    lookup(name).map(|m| m.kind == Directive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(lookup("mov").is_some());
        assert!(lookup("Mov").is_some());
        assert!(lookup("MOV").is_some());
    }

    #[test]
    fn lookup_unknown_mnemonic() {
        assert!(lookup("FROB").is_none());
    }

    #[test]
    fn ret_has_no_operands() {
        let m = lookup("RET").unwrap();
        assert_eq!(m.operand_count, 0);
        assert_eq!(m.opcode, 0xC3);
    }

    #[test]
    fn db_is_a_directive() {
        assert_eq!(is_directive("DB"), Some(true));
        assert_eq!(is_directive("mov"), Some(false));
        assert_eq!(is_directive("nope"), None);
    }
}
