//! Seedable randomness. Every consumer draws from a named stream derived from
//! one master seed, so a run is reproducible no matter which stream is touched
//! first.

use std::collections::HashMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub struct RngManager {
    seed: u64,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            streams: HashMap::new(),
        }
    }

    pub fn stream(&mut self, name: &str) -> SystemRng<'_> {
        SystemRng {
            inner: self.entry(name),
        }
    }

    /// A copy of the named stream at its current position. Draws from the copy
    /// only count once it is handed back through [`RngManager::commit`].
    pub fn fork(&mut self, name: &str) -> ChaCha8Rng {
        self.entry(name).clone()
    }

    pub fn commit(&mut self, name: &str, rng: ChaCha8Rng) {
        self.streams.insert(name.to_string(), rng);
    }

    fn entry(&mut self, name: &str) -> &mut ChaCha8Rng {
        let seed = derive_seed(self.seed, name);
        self.streams
            .entry(name.to_string())
            .or_insert_with(|| ChaCha8Rng::seed_from_u64(seed))
    }
}

fn derive_seed(master: u64, name: &str) -> u64 {
    let mut seed = master
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    for byte in name.bytes() {
        seed ^= u64::from(byte);
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
    }
    seed
}

pub struct SystemRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl<'a> RngCore for SystemRng<'a> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}
