use std::collections::{BTreeSet, VecDeque};

use rand::rngs::StdRng;
use rand::Rng as _;

use crate::error::SubsetError;

pub trait RandomSource {
    /// Uniform index in `0..len`. Returns `0` when `len <= 1`.
    fn pick_index(&mut self, len: usize) -> usize;
}

#[derive(Clone, Debug)]
pub struct Rng {
    seed: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn next_f32(&mut self) -> f32 {
        self.seed = self.seed.wrapping_add(0x6d2b79f5);
        let mut t = self.seed;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        let out = t ^ (t >> 14);
        (out as f64 / 4_294_967_296.0) as f32
    }

    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as f32;
        (min + (self.next_f32() * span).floor() as i32).min(max)
    }

    pub fn bool(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }

    pub fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        (self.next_f32() * len as f32).floor().min((len - 1) as f32) as usize
    }
}

impl RandomSource for Rng {
    fn pick_index(&mut self, len: usize) -> usize {
        Rng::pick_index(self, len)
    }
}

impl RandomSource for StdRng {
    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.random_range(0..len)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ScriptedRng {
    picks: VecDeque<usize>,
}

impl ScriptedRng {
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.picks.len()
    }
}

impl RandomSource for ScriptedRng {
    fn pick_index(&mut self, len: usize) -> usize {
        let pick = self.picks.pop_front().unwrap_or(0);
        if len <= 1 {
            return 0;
        }
        pick.min(len - 1)
    }
}

pub fn unique_random_subset<R: RandomSource + ?Sized>(
    min: i32,
    max: i32,
    count: usize,
    rng: &mut R,
) -> Result<BTreeSet<i32>, SubsetError> {
    if max <= min {
        return Err(SubsetError::EmptyRange { min, max });
    }
    if count == 0 {
        return Err(SubsetError::ZeroCount);
    }
    let mut pool: Vec<i32> = (min..max).collect();
    if count > pool.len() {
        return Err(SubsetError::CountExceedsRange {
            count,
            available: pool.len(),
        });
    }

    let mut picked = BTreeSet::new();
    for _ in 0..count {
        let idx = rng.pick_index(pool.len());
        picked.insert(pool.remove(idx));
    }
    Ok(picked)
}
