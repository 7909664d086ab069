//! Unbiased shuffling and sampling over an injectable random source.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// A source of uniformly distributed numbers in `[0, 1)`.
///
/// Every shuffle in the engine takes one of these instead of reaching for a
/// global generator, so tests can script the exact sequence.
pub trait RandomSource {
    /// Next number in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `[0, upper]`.
    fn pick_index(&mut self, upper: usize) -> usize {
        let scaled = self.next_unit() * (upper as f64 + 1.0);
        (scaled as usize).min(upper)
    }
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// Adapter exposing any [`rand::Rng`] as a [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }
}

impl RngSource<StdRng> {
    /// Generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    /// Reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Fisher–Yates shuffle in place.
///
/// Walks from the last index down to 1 and swaps each element with a
/// uniformly chosen element at or before it.
pub fn shuffle<T, R>(items: &mut [T], rng: &mut R)
where
    R: RandomSource + ?Sized,
{
    for i in (1..items.len()).rev() {
        let j = rng.pick_index(i);
        items.swap(i, j);
    }
}

/// Shuffle `items` and keep the first `count`.
///
/// Asking for more than available returns everything, shuffled.
pub fn sample<T, R>(mut items: Vec<T>, count: usize, rng: &mut R) -> Vec<T>
where
    R: RandomSource + ?Sized,
{
    shuffle(&mut items, rng);
    items.truncate(count);
    items
}

/// Scripted source for deterministic tests: cycles through fixed values.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct ScriptedSource {
    values: Vec<f64>,
    position: usize,
}

#[cfg(test)]
impl ScriptedSource {
    pub(crate) fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            position: 0,
        }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value
    }
}
