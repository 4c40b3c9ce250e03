//! Interleaved 8-bit range coder with a 16-way SIMD decoder.
//!
//! This crate implements a classic byte-oriented arithmetic (range) coder
//! whose encoder round-robins its output across 16 independent lanes so
//! that the decoder can advance all 16 lanes' serial dependency chains in
//! parallel, four at a time, using SSE4.1 vector instructions. See
//! `spec.md` for the full design rationale.
//!
//! The public entry points are [`encode`] and [`decode`]. Most callers
//! build a model once with [`build_cum_probs`] / [`build_decode_table`] and
//! reuse it, since the decode table must accompany (or be rebuilt
//! identically alongside) the encoded payload.

pub mod error;
pub mod interleaved;
pub mod model;
pub mod scalar;
#[cfg(target_arch = "x86_64")]
pub mod simd;

pub use error::{CodecError, CodecResult};
pub use model::{build_cum_probs, build_decode_table, frequencies, CumProbs, DecodeTable, MAX_SYMS, PROB_SCALE};

/// Encodes `data` against the given cumulative-probability table.
///
/// `data` must be non-empty; an empty slice has no meaningful model and is
/// rejected rather than silently producing a degenerate payload.
pub fn encode(data: &[u8], cum: &CumProbs) -> CodecResult<Vec<u8>> {
    if data.is_empty() {
        return Err(CodecError::BadAlphabet("cannot encode an empty input"));
    }
    if data.len() > u32::MAX as usize {
        return Err(CodecError::SizeOverflow("input exceeds u32::MAX bytes"));
    }
    interleaved::encode_interleaved(data, cum)
}

/// Decodes `orig_size` bytes from `payload` using `table`.
///
/// Dispatches to the SSE4.1 SIMD decoder when the running CPU supports it,
/// falling back to the portable scalar decoder otherwise. Both paths are
/// required to produce byte-identical output for the same inputs.
pub fn decode(payload: &[u8], table: &DecodeTable, orig_size: usize) -> CodecResult<Vec<u8>> {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("sse4.1") {
            log::debug!("decoding {orig_size} bytes via the SSE4.1 SIMD path");
            // Safety: feature support was just checked.
            return unsafe { simd::decode_simd(payload, table, orig_size) };
        }
    }

    log::debug!("decoding {orig_size} bytes via the portable scalar path");
    decode_scalar(payload, table, orig_size)
}

/// Forces the portable scalar decode path regardless of what the running
/// CPU supports, for testing and for callers that need the two paths to be
/// directly comparable. Decodes the same 16-lane interleaved payload format
/// [`decode`] does (see [`interleaved::decode_interleaved`]), just without
/// SIMD.
pub fn decode_scalar(payload: &[u8], table: &DecodeTable, orig_size: usize) -> CodecResult<Vec<u8>> {
    if orig_size == 0 {
        return Ok(Vec::new());
    }
    interleaved::decode_interleaved(payload, table, orig_size)
}
