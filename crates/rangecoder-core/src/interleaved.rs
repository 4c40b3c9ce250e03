//! Sixteen-way interleaved range encoder/decoder. See `spec.md` sections
//! 4.5 and 4.6.

use crate::error::{CodecError, CodecResult};
use crate::model::{CumProbs, DecodeTable, LANES, LANE_MASK};
use crate::scalar::{RangeDecoder, RangeEncoder};

/// Encodes `data` into the "header-then-interleaved" payload format
/// described in `spec.md` section 6: 16 three-byte lane headers, followed
/// by renormalization bytes interleaved in original symbol order, followed
/// by two zero tail bytes.
pub fn encode_interleaved(data: &[u8], cum: &CumProbs) -> CodecResult<Vec<u8>> {
    if data.is_empty() {
        return Err(CodecError::BadAlphabet("cannot encode an empty input"));
    }

    let mut lanes: Vec<RangeEncoder> = (0..LANES)
        .map(|_| RangeEncoder::with_capacity(1 + data.len() / LANES))
        .collect();
    let mut bytes_written = vec![0u8; data.len()];

    for (i, &b) in data.iter().enumerate() {
        let lane = i & LANE_MASK;
        let before = lanes[lane].buf_len();
        lanes[lane].encode(cum[b as usize], cum[b as usize + 1]);
        bytes_written[i] = (lanes[lane].buf_len() - before) as u8;
    }

    for enc in &mut lanes {
        enc.flush();
    }

    let total_body: u64 = bytes_written.iter().map(|&b| b as u64).sum();
    let final_size = LANES * 3 + total_body as usize + 2;
    let mut out = Vec::with_capacity(final_size);

    let mut cursor = [0usize; LANES];
    for lane in 0..LANES {
        out.extend_from_slice(&lanes[lane].buf()[0..3]);
        cursor[lane] = 3;
    }

    for (i, &n) in bytes_written.iter().enumerate() {
        if n == 0 {
            continue;
        }
        let lane = i & LANE_MASK;
        let n = n as usize;
        out.extend_from_slice(&lanes[lane].buf()[cursor[lane]..cursor[lane] + n]);
        cursor[lane] += n;
    }

    out.push(0);
    out.push(0);

    debug_assert_eq!(out.len(), final_size);
    Ok(out)
}

/// Decodes `orig_size` bytes from the interleaved payload produced by
/// [`encode_interleaved`], using 16 independent `RangeDecoder` states
/// primed from the 48-byte lane header and then advanced round-robin
/// (`i & LANE_MASK`) over a single shared byte cursor — the same addressing
/// the SIMD decoder's scalar tail uses (see `simd::decode::decode_simd`).
/// This is the portable fallback for targets without the required SIMD
/// primitives, and must produce byte-identical output to the SIMD decoder
/// for the same payload.
pub fn decode_interleaved(payload: &[u8], table: &DecodeTable, orig_size: usize) -> CodecResult<Vec<u8>> {
    if payload.len() < LANES * 3 {
        return Err(CodecError::CorruptInput("payload shorter than the 16 lane headers"));
    }

    let mut decoders: Vec<RangeDecoder> = Vec::with_capacity(LANES);
    let mut pos = 0usize;
    for _ in 0..LANES {
        let (dec, consumed) = RangeDecoder::init(&payload[pos..])?;
        decoders.push(dec);
        pos += consumed;
    }

    let mut out = Vec::with_capacity(orig_size);
    for i in 0..orig_size {
        let lane = i & LANE_MASK;
        let sym = decoders[lane].decode(table, payload, &mut pos)?;
        out.push(sym as u8);
    }
    Ok(out)
}
