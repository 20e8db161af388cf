/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

//! The dataset's one owned source of randomness (§4.6): a 32-bit
//! Mersenne-Twister-equivalent generator, seeded explicitly or from the
//! wall clock when the caller passes a negative seed. All bootstrap draws
//! and contrast permutations go through this generator so that a fixed
//! seed reproduces byte-identical output.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngCore;

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;

/// MT19937, the classic 32-bit Mersenne Twister.
pub struct Mt19937 {
    state: [u32; N],
    index: usize,
}

impl Mt19937 {
    pub fn new(seed: u32) -> Mt19937 {
        let mut state = [0u32; N];
        state[0] = seed;
        for i in 1..N {
            state[i] = 1_812_433_253u32
                .wrapping_mul(state[i - 1] ^ (state[i - 1] >> 30))
                .wrapping_add(i as u32);
        }
        Mt19937 { state, index: N }
    }

    /// Build a generator from an explicit seed, or from the wall clock if
    /// `seed` is negative (the "reproducible unless you ask otherwise"
    /// rule from §4.6).
    pub fn from_seed_or_time(seed: i64) -> Mt19937 {
        let seed32 = if seed < 0 {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("system clock before epoch");
            now.subsec_nanos() ^ (now.as_secs() as u32)
        } else {
            seed as u32
        };
        Mt19937::new(seed32)
    }

    fn generate(&mut self) {
        for i in 0..N {
            let x = (self.state[i] & UPPER_MASK) | (self.state[(i + 1) % N] & LOWER_MASK);
            let mut x_a = x >> 1;
            if x & 1 != 0 {
                x_a ^= MATRIX_A;
            }
            self.state[i] = self.state[(i + M) % N] ^ x_a;
        }
        self.index = 0;
    }

    fn next_u32_raw(&mut self) -> u32 {
        if self.index >= N {
            self.generate();
        }
        let mut y = self.state[self.index];
        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c_5680;
        y ^= (y << 15) & 0xefc6_0000;
        y ^= y >> 18;
        self.index += 1;
        y
    }

    /// Fisher-Yates shuffle of `buffer`, driven entirely by this generator.
    pub fn shuffle<T>(&mut self, buffer: &mut [T]) {
        let n = buffer.len();
        for i in (1..n).rev() {
            let j = (self.next_u32_raw() as u64 % (i as u64 + 1)) as usize;
            buffer.swap(i, j);
        }
    }

    /// Uniform integer in `[0, bound)`. `bound` must be non-zero.
    pub fn uniform_below(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0);
        (self.next_u32_raw() as u64 % bound as u64) as usize
    }
}

impl RngCore for Mt19937 {
    fn next_u32(&mut self) -> u32 {
        self.next_u32_raw()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32_raw() as u64;
        let lo = self.next_u32_raw() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut i = 0;
        while i < dest.len() {
            let word = self.next_u32_raw().to_le_bytes();
            let take = usize::min(4, dest.len() - i);
            dest[i..i + take].copy_from_slice(&word[..take]);
            i += take;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
