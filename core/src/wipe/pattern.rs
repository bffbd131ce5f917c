//! # Overwrite Patterns
//!
//! Every pass of every method maps to one of three fills: a repeated byte, a
//! repeated three-byte sequence, or bytes from a CSPRNG. Random passes draw
//! fresh bytes for every buffer they fill.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use umbra_common::deletion::DeletionMethod;

/// Three-byte sequences used by the patterned Gutmann passes.
pub const GUTMANN_PATTERNS: [[u8; 3]; 16] = [
    [0x92, 0x49, 0x24],
    [0x49, 0x24, 0x92],
    [0x24, 0x92, 0x49],
    [0x00, 0x00, 0x00],
    [0x11, 0x11, 0x11],
    [0x22, 0x22, 0x22],
    [0x33, 0x33, 0x33],
    [0x44, 0x44, 0x44],
    [0x55, 0x55, 0x55],
    [0x66, 0x66, 0x66],
    [0x77, 0x77, 0x77],
    [0x88, 0x88, 0x88],
    [0x99, 0x99, 0x99],
    [0xAA, 0xAA, 0xAA],
    [0xBB, 0xBB, 0xBB],
    [0xCC, 0xCC, 0xCC],
];

/// What a single pass writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassFill {
    Byte(u8),
    /// Tiled from offset 0 of every buffer.
    Sequence([u8; 3]),
    Random,
}

impl PassFill {
    pub fn for_pass(method: DeletionMethod, pass_index: usize) -> Self {
        match method {
            DeletionMethod::SinglePass => PassFill::Byte(0x00),
            DeletionMethod::Dod3Pass => match pass_index {
                0 => PassFill::Byte(0x00),
                1 => PassFill::Byte(0xFF),
                _ => PassFill::Random,
            },
            DeletionMethod::Random7Pass => PassFill::Random,
            DeletionMethod::Gutmann35Pass => gutmann_fill(pass_index),
        }
    }
}

// The 9..=24 and 25..=27 ranges both restart at entry 0 of the table.
fn gutmann_fill(pass_index: usize) -> PassFill {
    match pass_index {
        4 => PassFill::Byte(0x55),
        5 => PassFill::Byte(0xAA),
        6..=8 => PassFill::Sequence(GUTMANN_PATTERNS[(pass_index - 6) % 16]),
        9..=24 => PassFill::Sequence(GUTMANN_PATTERNS[(pass_index - 9) % 16]),
        25..=27 => PassFill::Sequence(GUTMANN_PATTERNS[(pass_index - 25) % 16]),
        _ => PassFill::Random,
    }
}

/// Fills overwrite buffers. The overwrite engine calls it once per chunk.
pub trait PatternSource: Send {
    fn fill_pass(&mut self, buffer: &mut [u8], pass_index: usize, method: DeletionMethod);
}

/// Default [`PatternSource`], backed by an OS-seeded ChaCha generator.
pub struct PatternGenerator {
    rng: StdRng,
}

impl PatternGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl Default for PatternGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternSource for PatternGenerator {
    fn fill_pass(&mut self, buffer: &mut [u8], pass_index: usize, method: DeletionMethod) {
        match PassFill::for_pass(method, pass_index) {
            PassFill::Byte(byte) => buffer.fill(byte),
            PassFill::Sequence(sequence) => {
                for chunk in buffer.chunks_mut(sequence.len()) {
                    chunk.copy_from_slice(&sequence[..chunk.len()]);
                }
            }
            PassFill::Random => self.rng.fill_bytes(buffer),
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(method: DeletionMethod, pass_index: usize, len: usize) -> Vec<u8> {
        let mut buffer = vec![0x5Au8; len];
        PatternGenerator::new().fill_pass(&mut buffer, pass_index, method);
        buffer
    }

    #[test]
    fn single_pass_writes_zeros_for_any_pass() {
        assert!(filled(DeletionMethod::SinglePass, 0, 4096).iter().all(|&b| b == 0));
        assert!(filled(DeletionMethod::SinglePass, 9, 17).iter().all(|&b| b == 0));
    }

    #[test]
    fn dod_passes_are_zeros_ones_then_random() {
        assert!(filled(DeletionMethod::Dod3Pass, 0, 1024).iter().all(|&b| b == 0x00));
        assert!(filled(DeletionMethod::Dod3Pass, 1, 1024).iter().all(|&b| b == 0xFF));
        assert_eq!(PassFill::for_pass(DeletionMethod::Dod3Pass, 2), PassFill::Random);
    }

    #[test]
    fn dod_final_pass_differs_between_runs() {
        let first = filled(DeletionMethod::Dod3Pass, 2, 1024);
        let second = filled(DeletionMethod::Dod3Pass, 2, 1024);
        assert_eq!(first.len(), 1024);
        assert_eq!(second.len(), 1024);
        assert_ne!(first, second);
    }

    #[test]
    fn random_pass_covers_whole_buffer() {
        // 4 KiB of CSPRNG output is never a single repeated byte in practice.
        let buffer = filled(DeletionMethod::Random7Pass, 3, 4096);
        assert!(buffer.iter().any(|&b| b != buffer[0]));
        assert!(buffer.iter().any(|&b| b != 0x5A));
    }

    #[test]
    fn random_passes_differ_between_chunks() {
        let mut generator = PatternGenerator::new();
        let mut first = vec![0u8; 256];
        let mut second = vec![0u8; 256];
        generator.fill_pass(&mut first, 0, DeletionMethod::Random7Pass);
        generator.fill_pass(&mut second, 0, DeletionMethod::Random7Pass);
        assert_ne!(first, second);
    }

    #[test]
    fn gutmann_pass_four_is_0x55_for_every_size() {
        for len in [1usize, 63, 64, 65, 1_000_000] {
            let buffer = filled(DeletionMethod::Gutmann35Pass, 4, len);
            assert_eq!(buffer.len(), len);
            assert!(buffer.iter().all(|&b| b == 0x55), "size {len}");
        }
    }

    #[test]
    fn gutmann_pass_five_is_0xaa() {
        assert!(filled(DeletionMethod::Gutmann35Pass, 5, 65).iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn gutmann_sequences_tile_from_offset_zero() {
        let buffer = filled(DeletionMethod::Gutmann35Pass, 6, 8);
        assert_eq!(buffer, vec![0x92, 0x49, 0x24, 0x92, 0x49, 0x24, 0x92, 0x49]);

        let buffer = filled(DeletionMethod::Gutmann35Pass, 7, 4);
        assert_eq!(buffer, vec![0x49, 0x24, 0x92, 0x49]);
    }

    #[test]
    fn gutmann_table_mapping() {
        let method = DeletionMethod::Gutmann35Pass;
        assert_eq!(PassFill::for_pass(method, 9), PassFill::Sequence([0x92, 0x49, 0x24]));
        assert_eq!(PassFill::for_pass(method, 12), PassFill::Sequence([0x00; 3]));
        assert_eq!(PassFill::for_pass(method, 24), PassFill::Sequence([0xCC; 3]));
        assert_eq!(PassFill::for_pass(method, 25), PassFill::Sequence([0x92, 0x49, 0x24]));
        assert_eq!(PassFill::for_pass(method, 27), PassFill::Sequence([0x24, 0x92, 0x49]));
    }

    #[test]
    fn gutmann_outer_passes_are_random() {
        let method = DeletionMethod::Gutmann35Pass;
        for pass in (0..4).chain(28..35).chain([35, 100]) {
            assert_eq!(PassFill::for_pass(method, pass), PassFill::Random, "pass {pass}");
        }
    }
}
