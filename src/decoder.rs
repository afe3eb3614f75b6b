
#[cfg(feature = "internal-no-panic")]
use no_panic::no_panic;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::state::AdpcmState;
use crate::step_table::{adapt_step_index, step_size, MAX_STEP_INDEX};
use crate::Error;

/// Returns the number of 4-bit values stored in `byte_count` bytes.
///
/// The bitstream doesn't store the sample count, so this is the largest sample count
/// a buffer can be decoded to. If the original sample count was odd, the last decoded sample
/// is padding and can be dropped.
pub const fn max_decoded_len(byte_count: usize) -> usize {
    byte_count.saturating_mul(2)
}

/// Decodes a 4-bit encoded ADPCM value to a linear 32-bit signed integer sample value.
///
/// Only the lowest 4 bits of `encoded_nibble` are used and the top-most bits are ignored.
///
/// The `state` parameter should be initialized to zero or to values from the audio stream.
/// This method updates `state` with new values. Subsequent calls should pass in the state
/// values from the previous call.
#[cfg_attr(feature = "internal-no-panic", no_panic)]
#[inline(always)]
pub fn decode_adpcm_sample(encoded_nibble: u8, state: &mut AdpcmState) -> i32 {
    let nibble = encoded_nibble & 0x0f; // ensure nibble is in the range 0..=15
    state.step_index = state.step_index.min(MAX_STEP_INDEX); // validate step_index

    // the step of the previous index is used for this sample, the new index for the next one
    let step = i64::from(step_size(state.step_index));
    state.step_index = adapt_step_index(state.step_index, nibble);

    // same predictor_diff as the encoder computes while quantizing
    let mut predictor_diff = step >> 3;
    if (nibble & 4) != 0 { predictor_diff += step; }
    if (nibble & 2) != 0 { predictor_diff += step >> 1; }
    if (nibble & 1) != 0 { predictor_diff += step >> 2; }
    state.apply_delta(predictor_diff, (nibble & 8) != 0);

    // predictor is the decoded sample value
    state.predictor
}

// high nibble first, then low nibble
fn nibbles(buf: &[u8]) -> impl Iterator<Item = u8> + '_ {
    buf.iter().flat_map(|b| [b >> 4, b & 0x0f])
}

/// Decodes packed 4-bit ADPCM values to 32-bit signed integer samples.
///
/// Each byte of `buf` holds two encoded samples: the first sample in the high nibble and
/// the second sample in the low nibble.
///
/// The `state` parameter should be initialized to zero for the first call and subsequent calls
/// should pass in the state values from the previous call.
///
/// This function decodes `out_samples.len()` samples. The encoded data doesn't contain
/// the sample count, so the caller must know it. `out_samples.len()` must be less than or equal
/// to `max_decoded_len(buf.len())`.
///
/// An error is returned if `buf` doesn't contain enough data for `out_samples`.
/// If an error is returned, `out_samples` and `state` are left unmodified.
pub fn decode_adpcm(buf: &[u8], state: &mut AdpcmState, out_samples: &mut [i32])
    -> Result<(), Error> {

    if out_samples.len() > max_decoded_len(buf.len()) {
        return Err(Error::InvalidBufferSize);
    }
    state.sanitize();
    log::trace!("adpcm: decoding {} bytes to {} samples", buf.len(), out_samples.len());
    for (out_s, nibble) in out_samples.iter_mut().zip(nibbles(buf)) {
        *out_s = decode_adpcm_sample(nibble, state);
    }
    Ok(())
}

/// Decodes `sample_count` samples from packed 4-bit ADPCM values to a new vector.
///
/// This works like [`decode_adpcm()`], but allocates the output.
///
/// An error is returned if `sample_count` is greater than `max_decoded_len(buf.len())`.
/// If an error is returned, `state` is left unmodified.
#[cfg(feature = "alloc")]
pub fn decode_adpcm_to_vec(buf: &[u8], state: &mut AdpcmState, sample_count: usize)
    -> Result<Vec<i32>, Error> {

    if sample_count > max_decoded_len(buf.len()) {
        return Err(Error::InvalidBufferSize);
    }
    state.sanitize();
    log::trace!("adpcm: decoding {} bytes to {} samples", buf.len(), sample_count);
    Ok(nibbles(buf)
        .take(sample_count)
        .map(|nibble| decode_adpcm_sample(nibble, state))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{PREDICTOR_MAX, PREDICTOR_MIN};

    fn reference_samples() -> Vec<i32> {
        include_bytes!("../test-files/adpcm-reference-decoded.bin")
            .chunks_exact(4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    #[test]
    fn test_max_decoded_len() {
        assert_eq!(max_decoded_len(0), 0);
        assert_eq!(max_decoded_len(1), 2);
        assert_eq!(max_decoded_len(2048), 4096);
        assert_eq!(max_decoded_len(usize::MAX), usize::MAX);
    }

    #[test]
    fn test_decode_adpcm_sample() {
        // normal decoding
        let mut state = AdpcmState { predictor: 0, step_index: 0 };
        assert_eq!(decode_adpcm_sample(6, &mut state), 98826);
        assert_eq!(state, AdpcmState { predictor: 98826, step_index: 6 });

        // zero and the sign bit alone move the predictor by step/8
        let mut state = AdpcmState { predictor: 0, step_index: 0 };
        assert_eq!(decode_adpcm_sample(0, &mut state), 7602);
        assert_eq!(state, AdpcmState { predictor: 7602, step_index: 0 });
        let mut state = AdpcmState { predictor: 0, step_index: 0 };
        assert_eq!(decode_adpcm_sample(8, &mut state), -7602);
        assert_eq!(state, AdpcmState { predictor: -7602, step_index: 0 });

        // tests that resulting step index is clamped to 0
        let mut state = AdpcmState { predictor: 200000, step_index: 0 };
        assert_eq!(decode_adpcm_sample(3, &mut state), 253214);
        assert_eq!(state, AdpcmState { predictor: 253214, step_index: 0 });

        // tests that resulting step index is clamped to 88
        let mut state = AdpcmState { predictor: 2_000_000_000, step_index: 84 };
        assert_eq!(decode_adpcm_sample(14, &mut state), -289918345);
        assert_eq!(state, AdpcmState { predictor: -289918345, step_index: 88 });

        // tests that the returned sample is clamped to -0x7fffffff
        let mut state = AdpcmState { predictor: -2_000_000_000, step_index: 80 };
        assert_eq!(decode_adpcm_sample(15, &mut state), PREDICTOR_MIN);
        assert_eq!(state, AdpcmState { predictor: PREDICTOR_MIN, step_index: 88 });

        // tests that the returned sample is clamped to 0x7fffffff
        let mut state = AdpcmState { predictor: 2_000_000_000, step_index: 80 };
        assert_eq!(decode_adpcm_sample(7, &mut state), PREDICTOR_MAX);
        assert_eq!(state, AdpcmState { predictor: PREDICTOR_MAX, step_index: 88 });

        // the largest step doesn't overflow
        let mut state = AdpcmState { predictor: 0, step_index: 88 };
        assert_eq!(decode_adpcm_sample(10, &mut state), -1342136320);
        assert_eq!(state, AdpcmState { predictor: -1342136320, step_index: 87 });

        // check nibble value too large (greater than 15)
        let mut state = AdpcmState { predictor: 0, step_index: 0 };
        assert_eq!(decode_adpcm_sample(16, &mut state), 7602);
        assert_eq!(state, AdpcmState { predictor: 7602, step_index: 0 });

        // check input step index too large
        let mut state = AdpcmState { predictor: 0, step_index: 89 };
        assert_eq!(decode_adpcm_sample(10, &mut state), -1342136320);
        assert_eq!(state, AdpcmState { predictor: -1342136320, step_index: 87 });
    }

    #[test]
    fn test_decode_saturates() {
        let mut state = AdpcmState::new();
        let mut previous = state.predictor;
        for _ in 0..40 {
            let sample = decode_adpcm_sample(7, &mut state);
            assert!(sample > 0 && sample >= previous);
            previous = sample;
        }
        assert_eq!(state, AdpcmState { predictor: PREDICTOR_MAX, step_index: 88 });

        let mut state = AdpcmState::new();
        let mut previous = state.predictor;
        for _ in 0..40 {
            let sample = decode_adpcm_sample(15, &mut state);
            assert!(sample < 0 && sample <= previous);
            previous = sample;
        }
        assert_eq!(state, AdpcmState { predictor: PREDICTOR_MIN, step_index: 88 });
    }

    #[test]
    fn test_decode_adpcm() {
        // high nibble first
        let mut state = AdpcmState::new();
        let mut samples = [0i32; 4];
        assert!(decode_adpcm(&[0x08, 0x80], &mut state, &mut samples).is_ok());
        assert_eq!(samples, [7602, 0, -7602, 0]);
        assert_eq!(state, AdpcmState::new());

        // odd sample count stops before the last low nibble
        let mut state = AdpcmState::new();
        let mut samples = [0i32; 3];
        assert!(decode_adpcm(&[0xff, 0x00], &mut state, &mut samples).is_ok());
        assert_eq!(samples, [-114030, -529710, -448858]);
        assert_eq!(state, AdpcmState { predictor: -448858, step_index: 15 });

        // fewer samples than the buffer holds
        let mut state = AdpcmState::new();
        let mut samples = [0i32; 1];
        assert!(decode_adpcm(&[0x08, 0x80], &mut state, &mut samples).is_ok());
        assert_eq!(samples, [7602]);
        assert_eq!(state, AdpcmState { predictor: 7602, step_index: 0 });

        // zero samples is a no-op
        let mut state = AdpcmState { predictor: 123, step_index: 45 };
        assert!(decode_adpcm(&[], &mut state, &mut []).is_ok());
        assert_eq!(state, AdpcmState { predictor: 123, step_index: 45 });

        // not enough input data leaves everything unmodified
        let mut state = AdpcmState { predictor: 123, step_index: 100 };
        let mut samples = [1i32; 5];
        assert!(matches!(decode_adpcm(&[0x08, 0x80], &mut state, &mut samples),
            Err(Error::InvalidBufferSize)));
        assert_eq!(samples, [1; 5]);
        assert_eq!(state, AdpcmState { predictor: 123, step_index: 100 });
    }

    #[test]
    fn test_decode_adpcm_reference() {
        // the reference values were generated with the original C implementation
        let reference = reference_samples();
        assert_eq!(reference.len(), 4095);
        let mut state = AdpcmState::new();
        let mut samples = [0i32; 4095];
        assert!(decode_adpcm(include_bytes!("../test-files/adpcm-reference.bin"),
            &mut state, &mut samples).is_ok());
        assert_eq!(&samples[..8], &[
            -114030, -529710, -1742490, -5053770, -13696620, -35514000, -89401320, -219955560
        ]);
        assert_eq!(&samples[4091..], &[-519487299, -524673009, -528312934, -532855091]);
        assert_eq!(&samples[..], &reference[..]);
        assert_eq!(state, AdpcmState { predictor: -532855091, step_index: 32 });
    }

    #[test]
    fn test_decode_adpcm_split() {
        // decoding in two calls gives the same result as one call
        let buf = include_bytes!("../test-files/adpcm-reference.bin");
        let mut state = AdpcmState::new();
        let mut whole = [0i32; 4096];
        assert!(decode_adpcm(buf, &mut state, &mut whole).is_ok());

        let mut split_state = AdpcmState::new();
        let mut split = [0i32; 4096];
        assert!(decode_adpcm(&buf[..700], &mut split_state, &mut split[..1400]).is_ok());
        assert!(decode_adpcm(&buf[700..], &mut split_state, &mut split[1400..]).is_ok());
        assert_eq!(split, whole);
        assert_eq!(split_state, state);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_decode_adpcm_to_vec() {
        let mut state = AdpcmState::new();
        assert_eq!(decode_adpcm_to_vec(&[0x08, 0x80], &mut state, 4), Ok(vec![7602, 0, -7602, 0]));
        assert_eq!(state, AdpcmState::new());

        let mut state = AdpcmState::new();
        assert_eq!(decode_adpcm_to_vec(&[0xff, 0x00], &mut state, 3),
            Ok(vec![-114030, -529710, -448858]));
        assert_eq!(state, AdpcmState { predictor: -448858, step_index: 15 });

        // the whole buffer, including the padding nibble
        let buf = include_bytes!("../test-files/adpcm-reference.bin");
        let mut state = AdpcmState::new();
        let samples = decode_adpcm_to_vec(buf, &mut state, max_decoded_len(buf.len()));
        assert!(matches!(&samples, Ok(s) if s.len() == 4096 && s[..4095] == reference_samples()[..]));

        // sample count too large
        let mut state = AdpcmState { predictor: 1, step_index: 200 };
        assert_eq!(decode_adpcm_to_vec(&[0x08], &mut state, 3), Err(Error::InvalidBufferSize));
        assert_eq!(state, AdpcmState { predictor: 1, step_index: 200 });
    }
}
