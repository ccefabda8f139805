//! Baseline analysis of legacy EVM code: a packed bitset of the valid
//! `JUMPDEST` positions, built once per deployment and queried by the
//! interpreter on every jump.

use bytes::Bytes;

pub const OP_JUMPDEST: u8 = 0x5b;
pub const OP_PUSH1: u8 = 0x60;
pub const OP_PUSH32: u8 = 0x7f;

/// A bitset packed into 64-bit words.
#[derive(Debug, Clone, Default)]
struct JumpdestBitset {
    words: Vec<u64>,
}

impl JumpdestBitset {
    fn new(bit_len: usize) -> Self {
        Self {
            words: vec![0; bit_len.div_ceil(64)],
        }
    }

    fn set(&mut self, index: usize) {
        self.words[index / 64] |= 1 << (index % 64);
    }

    fn test(&self, index: usize) -> bool {
        self.words[index / 64] & (1 << (index % 64)) != 0
    }
}

/// Pre-processed legacy code: the raw bytes plus the jump-destination map.
#[derive(Debug, Clone)]
pub struct CodeAnalysis {
    code: Bytes,
    jumpdest_bitset: JumpdestBitset,
}

impl CodeAnalysis {
    /// Walks the code marking every `JUMPDEST` opcode, skipping the
    /// immediate data bytes that follow each `PUSH1..PUSH32`.
    pub fn analyze(code: Bytes) -> Self {
        let mut bitset = JumpdestBitset::new(code.len());

        let mut pc = 0;
        while let Some(&opcode) = code.get(pc) {
            if opcode == OP_JUMPDEST {
                bitset.set(pc);
            } else if (OP_PUSH1..=OP_PUSH32).contains(&opcode) {
                pc += usize::from(opcode - OP_PUSH1) + 1;
            }
            pc += 1;
        }

        Self {
            code,
            jumpdest_bitset: bitset,
        }
    }

    pub fn raw_code(&self) -> &Bytes {
        &self.code
    }

    /// Whether `position` is a valid jump destination. Positions at or past
    /// the end of the code are not.
    pub fn check_jumpdest(&self, position: u64) -> bool {
        if position >= self.code.len() as u64 {
            return false;
        }
        self.jumpdest_bitset.test(position as usize)
    }
}
