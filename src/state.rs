
use crate::step_table::MAX_STEP_INDEX;

/// The largest value the predictor can reach.
pub const PREDICTOR_MAX: i32 = 0x7fff_ffff;

/// The smallest value the predictor can reach. The range is symmetric, so `i32::MIN` is never
/// produced.
pub const PREDICTOR_MIN: i32 = -0x7fff_ffff;

/// State values for the ADPCM encoder and decoder.
///
/// A fresh stream starts from zeros ([`AdpcmState::new()`]). Any other value means resuming
/// a stream, and an encoder and a decoder must start from the same values to interoperate.
/// Each encode and decode call updates the state, so subsequent calls should pass in the state
/// values from the previous call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdpcmState {
    /// The previous predicted (decoded) sample value.
    pub predictor: i32,
    /// Index to the step size table, valid values are 0..=88.
    pub step_index: u8,
}

impl AdpcmState {
    /// Creates a new AdpcmState with zero values.
    pub const fn new() -> AdpcmState {
        AdpcmState {
            predictor: 0,
            step_index: 0,
        }
    }

    /// Clamps the step index to 0..=88, logging a warning if it was out of range.
    pub(crate) fn sanitize(&mut self) {
        if self.step_index > MAX_STEP_INDEX {
            log::warn!("adpcm: step index {} out of range, clamping to {}",
                self.step_index, MAX_STEP_INDEX);
            self.step_index = MAX_STEP_INDEX;
        }
    }

    /// Adds (or subtracts, if `negative` is set) `delta` to the predictor, saturating to
    /// `PREDICTOR_MIN..=PREDICTOR_MAX`.
    #[inline(always)]
    pub(crate) fn apply_delta(&mut self, delta: i64, negative: bool) {
        let predictor = if negative {
            i64::from(self.predictor) - delta
        } else {
            i64::from(self.predictor) + delta
        };
        #[allow(clippy::cast_possible_truncation)] // value is clamped so truncation never happens
        {
        self.predictor = predictor.clamp(i64::from(PREDICTOR_MIN), i64::from(PREDICTOR_MAX)) as i32;
        }
    }
}

impl Default for AdpcmState {
    fn default() -> Self {
        Self::new()
    }
}
