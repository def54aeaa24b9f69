// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// A minimal, zero-dependency, completely insecure PRNG for drawing
/// questions. Seeded explicitly so a selection can be replayed.
pub struct TinyRng {
    state: u64,
}

const A: u64 = 6364136223846793005;
const C: u64 = 1442695040888963407;

impl TinyRng {
    /// Initialize the RNG from a seed.
    pub fn from_seed(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        let new = self.state.wrapping_mul(A).wrapping_add(C);
        self.state = new;
        (new >> 32) as u32
    }

    // Generate random number in range [0, max). `max` must be non-zero.
    pub fn generate(&mut self, max: usize) -> usize {
        debug_assert!(max > 0);
        (self.next_u32() as usize) % max
    }
}

/// Draw `k` items uniformly at random without replacement, using a partial
/// Fisher-Yates shuffle. Returns every item (in random order) when
/// `k >= v.len()`.
pub fn sample<T>(v: Vec<T>, k: usize, rng: &mut TinyRng) -> Vec<T> {
    let mut v = v;
    let len = v.len();
    let k = k.min(len);
    for i in 0..k {
        let j = i + rng.generate(len - i);
        v.swap(i, j);
    }
    v.truncate(k);
    v
}
