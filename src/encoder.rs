
#[cfg(feature = "internal-no-panic")]
use no_panic::no_panic;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::state::AdpcmState;
use crate::step_table::{adapt_step_index, step_size, MAX_STEP_INDEX};
use crate::Error;

/// Returns the number of bytes needed to encode `sample_count` samples.
pub const fn encoded_len(sample_count: usize) -> usize {
    sample_count / 2 + sample_count % 2
}

/// Encodes a linear 32-bit signed integer sample value to a 4-bit encoded ADPCM value.
///
/// The `state` parameter should be initialized to zero or to values from the audio stream.
/// This method updates `state` with new values. Subsequent calls should pass in the state
/// values from the previous call.
#[cfg_attr(feature = "internal-no-panic", no_panic)]
#[inline(always)]
pub fn encode_adpcm_sample(sample_value: i32, state: &mut AdpcmState) -> u8 {
    state.step_index = state.step_index.min(MAX_STEP_INDEX); // validate step_index

    // calculate the output nibble using the sample value, previous predictor value and step
    let mut diff = i64::from(sample_value) - i64::from(state.predictor);
    let mut nibble: u8;
    if diff >= 0 {
        nibble = 0;
    } else {
        nibble = 8;
        diff = -diff;
    }
    // calculate nibble and predictor_diff with shifts only, so that the decoder can
    // reconstruct exactly the same predictor_diff from the nibble
    let mut step = i64::from(step_size(state.step_index));
    let mut predictor_diff = step >> 3;
    // nibble bit 4, predictor_diff step
    if diff >= step {
        nibble |= 4;
        diff -= step;
        predictor_diff += step;
    }
    // nibble bit 2, predictor_diff step/2
    step >>= 1;
    if diff >= step {
        nibble |= 2;
        diff -= step;
        predictor_diff += step;
    }
    // nibble bit 1, predictor_diff step/4
    step >>= 1;
    if diff >= step {
        nibble |= 1;
        predictor_diff += step;
    }

    // update the predicted sample (predictor), saturated to the 32-bit range
    state.apply_delta(predictor_diff, (nibble & 8) == 8);
    // adjust step index for the next sample
    state.step_index = adapt_step_index(state.step_index, nibble);
    // nibble is the encoded value
    nibble
}

// first sample goes to the high nibble, a missing second sample leaves the low nibble zero
#[inline(always)]
fn encode_pair(pair: &[i32], state: &mut AdpcmState) -> u8 {
    match pair {
        [first, second] => {
            let high = encode_adpcm_sample(*first, state);
            let low = encode_adpcm_sample(*second, state);
            high << 4 | low
        },
        [first] => encode_adpcm_sample(*first, state) << 4,
        _ => 0,
    }
}

/// Encodes 32-bit signed integer samples to packed 4-bit ADPCM values.
///
/// Each output byte holds two encoded samples: the first sample in the high nibble and
/// the second sample in the low nibble. If there is an odd number of samples, the low nibble
/// of the last byte is set to zero.
///
/// The `state` parameter should be initialized to zero for the first call and subsequent calls
/// should pass in the state values from the previous call. Note that an odd number of samples
/// ends with a padded byte, so splitting a stream to multiple calls should be done at even
/// sample counts.
///
/// This function writes `encoded_len(samples.len())` bytes to the beginning of `out_buf`
/// and returns the number of bytes written.
///
/// An error is returned if `out_buf` is too short.
/// If an error is returned, `out_buf` and `state` are left unmodified.
pub fn encode_adpcm(samples: &[i32], state: &mut AdpcmState, out_buf: &mut [u8])
    -> Result<usize, Error> {

    let len = encoded_len(samples.len());
    if out_buf.len() < len {
        return Err(Error::InvalidBufferSize);
    }
    state.sanitize();
    log::trace!("adpcm: encoding {} samples to {} bytes", samples.len(), len);
    for (pair, out_b) in samples.chunks(2).zip(out_buf.iter_mut()) {
        *out_b = encode_pair(pair, state);
    }
    Ok(len)
}

/// Encodes 32-bit signed integer samples to a new vector of packed 4-bit ADPCM values.
///
/// This works like [`encode_adpcm()`], but allocates the output, so it never fails.
/// The returned vector has `encoded_len(samples.len())` bytes.
#[cfg(feature = "alloc")]
pub fn encode_adpcm_to_vec(samples: &[i32], state: &mut AdpcmState) -> Vec<u8> {
    state.sanitize();
    log::trace!("adpcm: encoding {} samples", samples.len());
    let mut out = Vec::with_capacity(encoded_len(samples.len()));
    out.extend(samples.chunks(2).map(|pair| encode_pair(pair, state)));
    out
}
