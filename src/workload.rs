use std::{thread, time::Duration};
use tracing::trace;


/// Полезная нагрузка бенчмарка: CPU-часть, задержка и вывод.
///
/// Strategies never look inside the payload; they only decide on which
/// thread each part runs. [`Workload::process`] is the monolithic form used
/// by single-pool strategies; the staged pipeline calls the parts separately.
pub trait Workload: Send + Sync + 'static {
    fn compute(&self, index: usize) -> u64;

    fn delay(&self, index: usize);

    fn output(&self, index: usize, value: u64);

    fn process(&self, index: usize) {
        let value = self.compute(index);
        self.delay(index);
        self.output(index, value);
    }
}


/// Counts the `index`-th prime and sleeps a fixed pause.
#[derive(Debug, Clone)]
pub struct PrimeWorkload {
    pub delay: Duration,
    /// Print every result to stdout.
    pub echo: bool,
}

impl Default for PrimeWorkload {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(10),
            echo: true,
        }
    }
}

impl PrimeWorkload {
    pub fn new(delay: Duration, echo: bool) -> Self {
        Self { delay, echo }
    }
}

impl Workload for PrimeWorkload {
    #[inline]
    fn compute(&self, index: usize) -> u64 {
        nth_prime(index)
    }

    fn delay(&self, _index: usize) {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }

    fn output(&self, index: usize, value: u64) {
        trace!(index, value, "item output");
        if self.echo {
            println!("{}", value);
        }
    }
}


/// Trial division on purpose: the point is to burn CPU.
///
/// `nth_prime(0)` is 1 (nothing counted yet), then 2, 3, 5, ...
pub fn nth_prime(nth: usize) -> u64 {
    let mut num: u64 = 1;
    let mut count = 0usize;

    while count < nth {
        num += 1;
        if (2..num).all(|d| num % d != 0) {
            count += 1;
        }
    }
    num
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_primes() {
        let got: Vec<u64> = (0..8).map(nth_prime).collect();
        assert_eq!(got, vec![1, 2, 3, 5, 7, 11, 13, 17]);
        assert_eq!(nth_prime(100), 541);
    }

    #[test]
    fn zero_delay_skips_sleep() {
        let w = PrimeWorkload::new(Duration::ZERO, false);
        let start = std::time::Instant::now();
        w.process(10);
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
