/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Destination-side aggregation of fine-grained remote updates.
//!
//! A BFS iteration produces an enormous number of tiny per-vertex updates,
//! each directed at the locale owning the target vertex. Issuing them one by
//! one would be dominated by per-message latency, so an [`Aggregator`]
//! buffers values per destination locale and ships each buffer as a single
//! bulk transfer when it fills; the receiving side applies the batch through
//! a [`Sink`] bound to the aggregator type.
//!
//! Aggregators are held by one task each and are not durable: everything
//! buffered is applied by [`flush`](Aggregator::flush), which runs at the
//! latest when the aggregator is dropped.

use log::warn;

/// Name of the environment variable overriding the per-destination buffer
/// capacity.
pub const DST_BUFFER_SIZE_ENV: &str = "CHPL_AGGREGATION_DST_BUFF_SIZE";
/// Name of the environment variable overriding the yield frequency.
pub const YIELD_FREQUENCY_ENV: &str = "CHPL_AGGREGATION_YIELD_FREQUENCY";

/// Default per-destination buffer capacity.
pub const DEFAULT_DST_BUFFER_SIZE: usize = 4096;
/// Default number of buffered values between cooperative yields.
pub const DEFAULT_YIELD_FREQUENCY: usize = 1024;

/// Tuning knobs of an [`Aggregator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationConfig {
    /// Values buffered per destination locale before a flush is forced.
    pub buffer_size: usize,
    /// Number of `put`s between cooperative yields, so that co-scheduled
    /// tasks holding buffers directed at this locale get a chance to flush
    /// them.
    pub yield_frequency: usize,
}

impl AggregationConfig {
    /// Creates a configuration with the given knobs.
    ///
    /// # Panics
    ///
    /// If either knob is zero.
    pub fn new(buffer_size: usize, yield_frequency: usize) -> Self {
        assert!(buffer_size > 0, "the buffer capacity must be positive");
        assert!(yield_frequency > 0, "the yield frequency must be positive");
        Self {
            buffer_size,
            yield_frequency,
        }
    }

    /// Reads the configuration from the environment, falling back to the
    /// defaults for unset or unparsable variables.
    pub fn from_env() -> Self {
        Self {
            buffer_size: env_or(DST_BUFFER_SIZE_ENV, DEFAULT_DST_BUFFER_SIZE),
            yield_frequency: env_or(YIELD_FREQUENCY_ENV, DEFAULT_YIELD_FREQUENCY),
        }
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_or(var: &str, default: usize) -> usize {
    match std::env::var(var) {
        Ok(value) => match value.parse::<usize>() {
            Ok(parsed) if parsed > 0 => parsed,
            _ => {
                warn!("Ignoring unparsable value {:?} of {}", value, var);
                default
            }
        },
        Err(_) => default,
    }
}

/// The destination side of an aggregator: applies batches of values to the
/// state of the destination locale.
///
/// `absorb` is invoked once per bulk transfer, with the destination locale
/// and the whole batch; implementations must be safe to call concurrently
/// from many tasks for the same destination.
pub trait Sink: Sync {
    /// The type of the aggregated values.
    type Item: Copy + Send;

    /// Applies `batch` on locale `locale`.
    fn absorb(&self, locale: usize, batch: &[Self::Item]);
}

/// A destination-side buffered communicator.
///
/// Each [`put`](Aggregator::put) appends a value to the local buffer of its
/// destination locale; a full buffer is shipped as one bulk transfer and
/// consumed by the [`Sink`]. Dropping the aggregator flushes every
/// non-empty buffer, so no submitted value is ever lost; after
/// [`flush`](Aggregator::flush) returns, every `(locale, value)` pair
/// previously submitted has been applied at its destination.
pub struct Aggregator<'a, S: Sink> {
    sink: &'a S,
    buffers: Vec<Vec<S::Item>>,
    buffer_size: usize,
    yield_frequency: usize,
    until_yield: usize,
}

impl<'a, S: Sink> Aggregator<'a, S> {
    /// Creates an aggregator shipping to `num_locales` destinations through
    /// `sink`.
    ///
    /// Buffer backing stores are allocated on first use per destination.
    pub fn new(sink: &'a S, num_locales: usize, config: &AggregationConfig) -> Self {
        Self {
            sink,
            buffers: (0..num_locales).map(|_| Vec::new()).collect(),
            buffer_size: config.buffer_size,
            yield_frequency: config.yield_frequency,
            until_yield: config.yield_frequency,
        }
    }

    /// Submits `value` for destination locale `locale`.
    #[inline]
    pub fn put(&mut self, locale: usize, value: S::Item) {
        let buffer = &mut self.buffers[locale];
        if buffer.capacity() == 0 {
            buffer.reserve_exact(self.buffer_size);
        }
        buffer.push(value);
        if buffer.len() == self.buffer_size {
            self.sink.absorb(locale, buffer);
            buffer.clear();
        } else {
            self.until_yield -= 1;
            if self.until_yield == 0 {
                self.until_yield = self.yield_frequency;
                // Let tasks with buffers directed at this locale run.
                let _ = rayon::yield_local();
            }
        }
    }

    /// Drains every non-empty buffer.
    pub fn flush(&mut self) {
        for locale in 0..self.buffers.len() {
            let buffer = &mut self.buffers[locale];
            if !buffer.is_empty() {
                self.sink.absorb(locale, buffer);
                buffer.clear();
            }
        }
    }
}

impl<S: Sink> Drop for Aggregator<'_, S> {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Collecting {
        batches: Vec<Mutex<Vec<Vec<u64>>>>,
    }

    impl Collecting {
        fn new(num_locales: usize) -> Self {
            Self {
                batches: (0..num_locales).map(|_| Mutex::new(Vec::new())).collect(),
            }
        }
    }

    impl Sink for Collecting {
        type Item = u64;

        fn absorb(&self, locale: usize, batch: &[u64]) {
            self.batches[locale].lock().unwrap().push(batch.to_vec());
        }
    }

    #[test]
    fn test_full_buffers_ship_whole() {
        let sink = Collecting::new(2);
        let config = AggregationConfig::new(8, 1024);
        let mut aggregator = Aggregator::new(&sink, 2, &config);
        for i in 0..20 {
            aggregator.put(0, i);
        }
        aggregator.put(1, 99);
        drop(aggregator);

        let to_zero = sink.batches[0].lock().unwrap();
        assert_eq!(
            to_zero.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![8, 8, 4]
        );
        assert_eq!(
            to_zero.concat(),
            (0..20).collect::<Vec<_>>(),
            "values must arrive in submission order per destination"
        );
        assert_eq!(*sink.batches[1].lock().unwrap(), vec![vec![99]]);
    }

    #[test]
    fn test_explicit_flush() {
        let sink = Collecting::new(3);
        let config = AggregationConfig::new(1000, 1000);
        let mut aggregator = Aggregator::new(&sink, 3, &config);
        aggregator.put(2, 1);
        aggregator.put(2, 2);
        aggregator.flush();
        assert_eq!(*sink.batches[2].lock().unwrap(), vec![vec![1, 2]]);
        // A second flush has nothing left to ship.
        aggregator.flush();
        assert_eq!(sink.batches[2].lock().unwrap().len(), 1);
        assert!(sink.batches[0].lock().unwrap().is_empty());
    }

    #[test]
    fn test_config_from_env() {
        std::env::set_var(DST_BUFFER_SIZE_ENV, "17");
        std::env::set_var(YIELD_FREQUENCY_ENV, "nonsense");
        let config = AggregationConfig::from_env();
        assert_eq!(config.buffer_size, 17);
        assert_eq!(config.yield_frequency, DEFAULT_YIELD_FREQUENCY);
        std::env::remove_var(DST_BUFFER_SIZE_ENV);
        std::env::remove_var(YIELD_FREQUENCY_ENV);
        let config = AggregationConfig::from_env();
        assert_eq!(config.buffer_size, DEFAULT_DST_BUFFER_SIZE);
    }
}
