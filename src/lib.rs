//!
//! This crate contains an [IMA/DVI ADPCM](https://en.wikipedia.org/wiki/Interactive_Multimedia_Association)
//! style codec for 32-bit linear samples.
//!
//! Each sample is compressed to 4 bits and two samples are packed to a byte, the first sample
//! in the high nibble. The step size table is scaled for 32-bit samples, so the encoded data
//! isn't compatible with 16-bit IMA ADPCM. The encoded data has no header or length field.
//!
//! ```
//! use wide_adpcm::{AdpcmState, decode_adpcm, encode_adpcm};
//!
//! let samples = [0, 1000000, 2000000, 1000000, 0];
//! let mut enc_state = AdpcmState::new();
//! let mut encoded = [0u8; 3];
//! encode_adpcm(&samples, &mut enc_state, &mut encoded).unwrap();
//!
//! let mut dec_state = AdpcmState::new();
//! let mut decoded = [0i32; 5];
//! decode_adpcm(&encoded, &mut dec_state, &mut decoded).unwrap();
//! assert_eq!(dec_state, enc_state);
//! ```
//!

#![cfg_attr(not(any(feature = "std", test)), no_std)]

#![forbid(
    unsafe_code,
    clippy::panic,
    clippy::exit,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unimplemented,
    clippy::todo,
    clippy::unreachable,
)]
#![deny(
    clippy::cast_ptr_alignment,
    clippy::char_lit_as_u8,
    clippy::unnecessary_cast,
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::checked_conversions,
)]
#![allow(clippy::manual_range_contains)]

#[cfg(feature = "alloc")]
extern crate alloc;

mod step_table;
pub use step_table::{index_adjustment, step_size, MAX_STEP_INDEX};

mod state;
pub use state::{AdpcmState, PREDICTOR_MAX, PREDICTOR_MIN};

mod encoder;
pub use encoder::{encode_adpcm, encode_adpcm_sample, encoded_len};
#[cfg(feature = "alloc")]
pub use encoder::encode_adpcm_to_vec;

mod decoder;
pub use decoder::{decode_adpcm, decode_adpcm_sample, max_decoded_len};
#[cfg(feature = "alloc")]
pub use decoder::decode_adpcm_to_vec;

use core::fmt;

/// Error values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Buffer has an invalid size.
    InvalidBufferSize,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidBufferSize => f.write_str("invalid buffer size"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
