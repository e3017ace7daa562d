//! # Delay Line (Ring Buffer)
//!
//! A delay line stores one channel's recent history and lets the
//! modulation engine read it back at any (fractional) distance behind the
//! newest sample. Chorus and flanger are both just a delay line whose
//! read distance is swept by an LFO.
//!
//! ## Ring Buffer
//!
//! The buffer is a fixed-length `Vec<f32>` and `write_pos` is the slot the
//! next sample goes into. Every write stores one sample and moves
//! `write_pos` forward by exactly one, wrapping to 0 at the end:
//!
//! ```text
//!   slot:    0     1     2     3     4     5
//!          [ e ] [ f ] [ a ] [ b ] [ c ] [ d ]
//!                       ▲                 ▲
//!                   write_pos          newest
//!                  (oldest slot)     (delay 0)
//! ```
//!
//! Reads are measured from the newest sample: delay 0 is the sample that
//! was just written, delay 1 the one before it, and so on up to
//! `len - 1` (the oldest sample still held).
//!
//! ## Linear Interpolation
//!
//! The LFO sweeps the delay continuously, so the delay is almost never a
//! whole number. For a delay `n + f` we blend the samples `n` and `n + 1`
//! behind the newest one:
//!
//! ```text
//! result = (1 - f) * history[n] + f * history[n + 1]
//! ```
//!
//! Slot indices wrap at both ends of the buffer. The result always lies
//! between the two neighbours, and with `f = 0` it is exactly
//! `history[n]`.

use crate::error::EngineError;

/// A per-channel ring buffer with interpolated readback.
///
/// A new delay line holds no buffer at all; [`configure()`](Self::configure)
/// allocates it once the sample rate is known. The buffer is owned by the
/// `Vec`, so reconfiguring or dropping the delay line releases it.
#[derive(Debug, Default)]
pub struct DelayLine {
    /// Sample history. Empty until `configure()` succeeds.
    buffer: Vec<f32>,

    /// Slot the next sample is written to. Always in `[0, len)` while the
    /// buffer is allocated.
    write_pos: usize,
}

impl DelayLine {
    /// Create an unconfigured delay line. Reads return silence until
    /// [`configure()`](Self::configure) succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)allocate the buffer to `floor(sample_rate * max_delay_seconds)`
    /// samples, zero-filled, with the write head back at 0.
    ///
    /// The previous buffer is released before the new one is reserved, so
    /// a failed call leaves the delay line empty rather than half-sized.
    /// This is the only method that allocates; call it from the host's
    /// setup path, never from `process()`.
    pub fn configure(
        &mut self,
        sample_rate: f32,
        max_delay_seconds: f32,
    ) -> Result<(), EngineError> {
        self.buffer = Vec::new();
        self.write_pos = 0;

        let length = (sample_rate * max_delay_seconds).floor();
        if !length.is_finite() || length < 1.0 {
            return Err(EngineError::InvalidLength {
                sample_rate,
                max_delay_seconds,
            });
        }

        // `as` saturates, so an absurd length turns into a failed
        // reservation below instead of wrapping around.
        let samples = length as usize;

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(samples)
            .map_err(|_| EngineError::Allocation { samples })?;
        buffer.resize(samples, 0.0);

        self.buffer = buffer;
        Ok(())
    }

    /// Number of samples of history the buffer holds.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// `true` until a `configure()` call succeeds.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Slot the next call to [`write_and_advance()`](Self::write_and_advance)
    /// will write to.
    pub fn write_head(&self) -> usize {
        self.write_pos
    }

    /// Store `sample` at the write head, then advance the head by one,
    /// wrapping at the end of the buffer.
    ///
    /// Does nothing on an unconfigured delay line.
    #[inline]
    pub fn write_and_advance(&mut self, sample: f32) {
        let len = self.buffer.len();
        if len == 0 {
            return;
        }

        self.buffer[self.write_pos] = sample;
        self.write_pos += 1;
        if self.write_pos >= len {
            self.write_pos = 0;
        }
    }

    /// Read the history `delay_samples` behind the newest sample, linearly
    /// interpolating between the two nearest slots.
    ///
    /// Valid delays are `0.0 <= delay_samples < len()`. Anything else is a
    /// caller bug, but it still can't index out of bounds: the whole part
    /// of the delay is wrapped into the buffer, so a negative or oversized
    /// delay just reads some other part of the history, and a non-finite
    /// one reads silence.
    #[inline]
    pub fn read_interpolated(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        if len == 0 {
            return 0.0;
        }

        // NaN and infinities have no meaningful position in the history.
        if !delay_samples.is_finite() {
            return 0.0;
        }

        // Split the delay before touching any index, so the fraction keeps
        // full precision no matter how far into the buffer the head is.
        //
        // For delay_samples = 441.3:
        //   whole = 441   (which slots to look at)
        //   frac  = 0.3   (how much of the older slot to blend in)
        let whole = delay_samples.floor();
        let frac = delay_samples - whole;

        // Wrapping in integer space turns negative or oversized delays into
        // some other valid slot instead of an out-of-bounds index.
        let delay_int = (whole as i64).rem_euclid(len as i64) as usize;

        let newest = (self.write_pos + len - 1) % len;
        let index_a = (newest + len - delay_int) % len;
        let index_b = (index_a + len - 1) % len;

        (1.0 - frac) * self.buffer[index_a] + frac * self.buffer[index_b]
    }

    /// Zero the history and move the write head back to 0 without
    /// touching the allocation.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Start of the current allocation, for checking it survives a reset.
    #[cfg(test)]
    pub(crate) fn buffer_ptr(&self) -> *const f32 {
        self.buffer.as_ptr()
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// A delay line holding exactly `len` samples.
    fn delay_line(len: usize) -> DelayLine {
        let mut dl = DelayLine::new();
        dl.configure(len as f32, 1.0).unwrap();
        dl
    }

    #[test]
    fn test_configure_allocates_floor_length() {
        let mut dl = DelayLine::new();
        assert!(dl.is_empty());

        dl.configure(48000.0, 2.0).unwrap();
        assert_eq!(dl.len(), 96000);

        // 44100 * 0.0101 = 445.41 → floor to 445
        dl.configure(44100.0, 0.0101).unwrap();
        assert_eq!(dl.len(), 445);
        assert_eq!(dl.write_head(), 0);
    }

    /// Reconfiguring must wipe the previous history and rewind the head.
    #[test]
    fn test_reconfigure_zeroes_buffer() {
        let mut dl = delay_line(16);
        for _ in 0..5 {
            dl.write_and_advance(0.9);
        }
        assert_eq!(dl.write_head(), 5);

        dl.configure(16.0, 1.0).unwrap();
        assert_eq!(dl.write_head(), 0);
        for delay in 0..16 {
            assert_eq!(dl.read_interpolated(delay as f32), 0.0);
        }
    }

    #[test]
    fn test_zero_length_is_rejected() {
        let mut dl = delay_line(8);

        let err = dl.configure(0.0, 2.0).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidLength {
                sample_rate: 0.0,
                max_delay_seconds: 2.0
            }
        );
        // The old buffer is released even though the new one failed.
        assert!(dl.is_empty());

        assert!(dl.configure(f32::NAN, 2.0).is_err());
        assert!(dl.configure(48000.0, -1.0).is_err());
    }

    /// A length no allocator can satisfy fails cleanly instead of aborting.
    #[test]
    fn test_unreservable_length_is_allocation_error() {
        let mut dl = DelayLine::new();
        let err = dl.configure(1.0e30, 1.0).unwrap_err();
        assert!(
            matches!(err, EngineError::Allocation { .. }),
            "Expected allocation error, got {err:?}"
        );
        assert!(dl.is_empty());
    }

    #[test]
    fn test_unconfigured_reads_silence() {
        let mut dl = DelayLine::new();
        dl.write_and_advance(1.0);
        assert_eq!(dl.read_interpolated(0.0), 0.0);
        assert_eq!(dl.write_head(), 0);
    }

    /// Delay 0 is the sample just written.
    #[test]
    fn test_write_and_read_exact() {
        let mut dl = delay_line(100);

        dl.write_and_advance(0.75);
        let result = dl.read_interpolated(0.0);
        assert!((result - 0.75).abs() < 1e-6, "Expected 0.75, got {result}");
    }

    #[test]
    fn test_write_head_wraps() {
        let mut dl = delay_line(3);
        let heads: Vec<usize> = (0..7)
            .map(|i| {
                dl.write_and_advance(i as f32);
                dl.write_head()
            })
            .collect();
        assert_eq!(heads, vec![1, 2, 0, 1, 2, 0, 1]);
    }

    /// After `len + k` writes, delay `d` returns the sample written `d`
    /// steps before the newest one, for every `d` in range.
    #[test]
    fn test_wraparound_history() {
        let len = 8;
        for extra in 0..12 {
            let mut dl = delay_line(len);
            let total = len + extra;
            for i in 1..=total {
                dl.write_and_advance(i as f32);
            }

            for delay in 0..len {
                let expected = (total - delay) as f32;
                let result = dl.read_interpolated(delay as f32);
                assert_eq!(
                    result, expected,
                    "len {len}, {total} writes, delay {delay}: expected {expected}, got {result}"
                );
            }
        }
    }

    /// Whole-number delays must not blend in the neighbour at all.
    #[test]
    fn test_integral_delay_is_exact() {
        let mut dl = delay_line(32);
        for i in 0..50 {
            // Values with no exact relation to each other.
            dl.write_and_advance((i as f32 * 0.731).sin());
        }

        for delay in 0..32 {
            let written_at = 49 - delay;
            let expected = (written_at as f32 * 0.731).sin();
            assert_eq!(dl.read_interpolated(delay as f32), expected);
        }
    }

    #[test]
    fn test_interpolation_midpoint() {
        let mut dl = delay_line(100);

        dl.write_and_advance(0.0);
        dl.write_and_advance(1.0);

        // Newest is 1.0 at delay 0, 0.0 at delay 1: halfway is 0.5.
        let result = dl.read_interpolated(0.5);
        assert!((result - 0.5).abs() < 1e-6, "Expected 0.5, got {result}");

        // A quarter of the way from the newest sample toward the older one.
        let result = dl.read_interpolated(0.25);
        assert!((result - 0.75).abs() < 1e-6, "Expected 0.75, got {result}");
    }

    /// Linear interpolation never leaves the range of its two neighbours.
    #[test]
    fn test_interpolation_stays_between_neighbours() {
        let len = 64;
        let mut dl = delay_line(len);
        for i in 0..len {
            dl.write_and_advance(((i * 37 % 11) as f32 - 5.0) * 0.2);
        }

        for whole in 0..(len - 1) {
            let newer = dl.read_interpolated(whole as f32);
            let older = dl.read_interpolated((whole + 1) as f32);
            let lo = newer.min(older);
            let hi = newer.max(older);

            for step in 0..16 {
                let frac = step as f32 / 16.0;
                let result = dl.read_interpolated(whole as f32 + frac);
                assert!(
                    result >= lo - 1e-6 && result <= hi + 1e-6,
                    "delay {}: {result} outside [{lo}, {hi}]",
                    whole as f32 + frac
                );
            }
        }
    }

    /// Reading between the last and the first slot pairs them up across
    /// the end of the buffer.
    #[test]
    fn test_interpolation_across_buffer_end() {
        let mut dl = delay_line(4);
        for value in [10.0, 20.0, 30.0, 40.0] {
            dl.write_and_advance(value);
        }
        // Head is back at 0, newest sample (40.0) sits in the last slot.
        assert_eq!(dl.write_head(), 0);

        // The oldest sample (10.0, slot 0) is 3 behind the newest.
        assert_eq!(dl.read_interpolated(3.0), 10.0);

        // Delay 0.5 blends slot 2 (30.0) and slot 3 (40.0).
        let result = dl.read_interpolated(0.5);
        assert!((result - 35.0).abs() < 1e-4, "Expected 35.0, got {result}");

        dl.write_and_advance(50.0);
        // Newest is now slot 0; delay 0.5 blends slot 3 (40.0) and slot 0.
        let result = dl.read_interpolated(0.5);
        assert!((result - 45.0).abs() < 1e-4, "Expected 45.0, got {result}");
    }

    /// The fraction must stay exact with the head deep into a long
    /// buffer, where an absolute f32 read position only resolves 1/128 of
    /// a sample.
    #[test]
    fn test_fraction_precise_far_into_buffer() {
        let mut dl = DelayLine::new();
        dl.configure(48000.0, 2.0).unwrap();

        // Alternate 0/1 so the newest sample (index 94999) is 1.0.
        for i in 0..95_000 {
            dl.write_and_advance((i % 2) as f32);
        }

        let result = dl.read_interpolated(0.3);
        assert!((result - 0.7).abs() < 1e-6, "Expected 0.7, got {result}");

        // Delay 839 holds 0.0 and delay 840 holds 1.0, so the result is
        // exactly the fractional part.
        let delay = 839.99994_f32;
        let expected = delay - 839.0;
        let result = dl.read_interpolated(delay);
        assert!(
            (result - expected).abs() < 1e-6,
            "Expected {expected}, got {result}"
        );
    }

    /// A delay a hair past a whole number still blends in a sliver of the
    /// older slot when the pair straddles the end of a long buffer.
    #[test]
    fn test_tiny_fraction_across_buffer_end() {
        let mut dl = DelayLine::new();
        dl.configure(192000.0, 2.0).unwrap();
        let len = dl.len();

        // Put a lone 1.0 in the last slot, then wrap around with 10 zeros.
        for _ in 0..(len - 1) {
            dl.write_and_advance(0.0);
        }
        dl.write_and_advance(1.0);
        for _ in 0..10 {
            dl.write_and_advance(0.0);
        }

        // Delay 9 is slot 0, delay 10 is the last slot holding the 1.0.
        let result = dl.read_interpolated(9.0 + 1.0 / 64.0);
        assert!(
            (result - 1.0 / 64.0).abs() < 1e-6,
            "Expected {}, got {result}",
            1.0 / 64.0
        );
    }

    /// Out-of-range delays are a caller bug, but must never panic.
    #[test]
    fn test_out_of_range_delay_does_not_panic() {
        let mut dl = delay_line(10);
        for i in 0..10 {
            dl.write_and_advance(i as f32);
        }

        for delay in [-25.5, -1.0, -1.0e-9, 10.0, 10.5, 1234.25, 1.0e9] {
            let result = dl.read_interpolated(delay);
            assert!(
                result.is_finite(),
                "delay {delay} produced non-finite {result}"
            );
        }
        assert_eq!(dl.read_interpolated(f32::NAN), 0.0);
        assert_eq!(dl.read_interpolated(f32::INFINITY), 0.0);
        assert_eq!(dl.read_interpolated(f32::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_clear() {
        let mut dl = delay_line(10);

        dl.write_and_advance(0.5);
        dl.clear();

        assert_eq!(dl.len(), 10);
        assert_eq!(dl.write_head(), 0);
        let result = dl.read_interpolated(1.0);
        assert!(
            result.abs() < 1e-6,
            "Expected 0.0 after clear, got {result}"
        );
    }
}
