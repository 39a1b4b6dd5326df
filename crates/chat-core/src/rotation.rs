//! Selection among interchangeable models.
//!
//! Providers backed by several free-tier models pick one per call. The choice
//! carries no memory of earlier outcomes; it only goes through a [`ModelPicker`]
//! so tests can make it deterministic.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Chooses an index in `0..count`.
pub trait ModelPicker: Send + Sync + fmt::Debug {
    /// Pick an index. Callers never pass `count == 0`.
    fn pick(&self, count: usize) -> usize;

    /// Pick one model name from a non-empty list.
    fn pick_model<'a>(&self, models: &'a [String]) -> Option<&'a str> {
        match models.len() {
            0 => None,
            1 => Some(models[0].as_str()),
            n => models.get(self.pick(n)).map(String::as_str),
        }
    }
}

/// Uniform random choice on the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl ModelPicker for RandomPicker {
    fn pick(&self, count: usize) -> usize {
        rand::thread_rng().gen_range(0..count)
    }
}

/// Cycles through models in order.
#[derive(Debug, Default)]
pub struct RoundRobinPicker {
    next: AtomicUsize,
}

impl RoundRobinPicker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelPicker for RoundRobinPicker {
    fn pick(&self, count: usize) -> usize {
        self.next.fetch_add(1, Ordering::Relaxed) % count
    }
}

/// Reproducible random choice from a fixed seed.
pub struct SeededPicker {
    rng: Mutex<StdRng>,
}

impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl fmt::Debug for SeededPicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededPicker").finish_non_exhaustive()
    }
}

impl ModelPicker for SeededPicker {
    fn pick(&self, count: usize) -> usize {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..count),
            Err(poisoned) => poisoned.into_inner().gen_range(0..count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models() -> Vec<String> {
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    }

    #[test]
    fn test_round_robin_cycles() {
        let picker = RoundRobinPicker::new();
        let models = models();
        let picked: Vec<_> = (0..4).filter_map(|_| picker.pick_model(&models)).collect();
        assert_eq!(picked, vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let first = SeededPicker::new(7);
        let second = SeededPicker::new(7);
        let a: Vec<_> = (0..10).map(|_| first.pick(5)).collect();
        let b: Vec<_> = (0..10).map(|_| second.pick(5)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_in_range() {
        for _ in 0..50 {
            assert!(RandomPicker.pick(3) < 3);
        }
    }

    #[test]
    fn test_empty_and_single() {
        let picker = RandomPicker;
        assert_eq!(picker.pick_model(&[]), None);
        assert_eq!(picker.pick_model(&["only".to_string()]), Some("only"));
    }
}
