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

//! The instruction record produced by pass one and consumed by pass two.

use crate::operand::Operand;

pub const MAX_OPERANDS: usize = 3;

/// One recognized statement: a directive or ordinary instruction,
/// located and sized, awaiting emission.
#[derive(Clone, Debug)]
pub struct InstructionRecord {
    /// Address assigned during pass one.
    pub address: u32,

    /// Encoded length in bytes, fixed by the length-estimation table.
    pub length: u32,

    /// Source line this statement began on.
    pub line: u32,

    /// The mnemonic, upper-cased, as looked up in the mnemonic table.
    pub mnemonic: String,

    /// Up to [`MAX_OPERANDS`] operands, in source order.
    pub operands: Vec<Operand>,

    /// The label defined at this instruction's address, if the
    /// statement carried a label prefix.
    pub label: Option<String>,
}

impl InstructionRecord {
    pub fn new(address: u32, length: u32, line: u32, mnemonic: impl Into<String>) -> Self {
        Self {
            address,
            length,
            line,
            mnemonic: mnemonic.into(),
            operands: Vec::new(),
            label: None,
        }
    }
}
