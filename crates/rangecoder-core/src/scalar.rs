//! Scalar range encoder and decoder. See `spec.md` sections 4.3 and 4.4.

use crate::error::{CodecError, CodecResult};
use crate::model::{unpack_entry, CumProbs, DecodeTable, MAX_LEN, MIN_LEN, PROB_BITS, PROB_SCALE};

/// A single scalar range encoder maintaining a `(base, length)` interval.
#[derive(Debug, Clone)]
pub struct RangeEncoder {
    base: u32,
    length: u32,
    buf: Vec<u8>,
}

impl Default for RangeEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RangeEncoder {
    pub fn new() -> Self {
        Self {
            base: 0,
            length: MAX_LEN,
            buf: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            base: 0,
            length: MAX_LEN,
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Bytes emitted so far.
    pub fn buf(&self) -> &[u8] {
        &self.buf
    }

    pub fn buf_len(&self) -> usize {
        self.buf.len()
    }

    /// Narrows the interval to `[cum_low, cum_high)` out of `PROB_SCALE` and
    /// renormalizes, emitting bytes as needed.
    pub fn encode(&mut self, cum_low: u32, cum_high: u32) {
        debug_assert!(cum_low < cum_high && cum_high <= PROB_SCALE);

        let r = self.length >> PROB_BITS;
        let l = cum_low * r;
        let h = cum_high * r;

        let prev_base = self.base;
        self.base = (self.base.wrapping_add(l)) & MAX_LEN;
        self.length = h - l;

        if self.base < prev_base {
            self.propagate_carry();
        }

        if self.length < MIN_LEN {
            self.renorm();
        }
    }

    fn propagate_carry(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let mut index = self.buf.len() - 1;
        loop {
            if self.buf[index] == 0xFF {
                self.buf[index] = 0x00;
            } else {
                self.buf[index] += 1;
                break;
            }
            if index == 0 {
                break;
            }
            index -= 1;
        }
    }

    fn renorm(&mut self) {
        loop {
            self.buf.push((self.base >> 16) as u8);
            self.base = (self.base << 8) & MAX_LEN;
            self.length <<= 8;
            if self.length >= MIN_LEN {
                break;
            }
        }
    }

    /// Terminates the stream: widens to a safe interval, renormalizes, and
    /// pads with trailing zero bytes so the decoder never reads past the end.
    pub fn flush(&mut self) {
        let prev_base = self.base;

        if self.length > 2 * MIN_LEN {
            self.base = (self.base.wrapping_add(MIN_LEN)) & MAX_LEN;
            self.length = MIN_LEN >> 1;
        } else {
            self.base = (self.base.wrapping_add(MIN_LEN >> 1)) & MAX_LEN;
            self.length = MIN_LEN >> 9;
        }

        if self.base < prev_base {
            self.propagate_carry();
        }

        self.renorm();

        while self.buf.len() < 3 {
            self.buf.push(0);
        }
        self.buf.push(0);
        self.buf.push(0);
    }
}

/// A single scalar range decoder maintaining a `(value, length)` interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeDecoder {
    pub value: u32,
    pub length: u32,
}

impl RangeDecoder {
    /// Primes the decoder from the first three bytes of `input`, returning
    /// the number of bytes consumed (always 3).
    pub fn init(input: &[u8]) -> CodecResult<(Self, usize)> {
        if input.len() < 3 {
            return Err(CodecError::CorruptInput("payload shorter than the initial 3-byte prime"));
        }
        let value = ((input[0] as u32) << 16) | ((input[1] as u32) << 8) | input[2] as u32;
        Ok((
            Self {
                value,
                length: MAX_LEN,
            },
            3,
        ))
    }

    /// Decodes one symbol, consuming `input[*pos..]` and advancing `*pos` by
    /// 0, 1, or 2 renormalization bytes. Returns `CorruptInput` rather than
    /// reading out of bounds if renormalization needs more bytes than
    /// `input` has left.
    pub fn decode(&mut self, table: &DecodeTable, input: &[u8], pos: &mut usize) -> CodecResult<u32> {
        let r = self.length >> PROB_BITS;
        let q = (self.value / r) & (PROB_SCALE - 1);

        let entry = table[q as usize];
        let (sym, cum_low, cum_range) = unpack_entry(entry);

        self.value -= cum_low * r;
        self.length = cum_range * r;

        while self.length < MIN_LEN {
            let byte = *input.get(*pos).ok_or(CodecError::CorruptInput("decoder ran past the end of the payload"))?;
            self.value = (self.value << 8) | byte as u32;
            *pos += 1;
            self.length <<= 8;
        }

        Ok(sym)
    }
}

/// Decodes `orig_size` bytes from a single non-interleaved range-coded
/// stream (one `RangeEncoder`'s output, not the 16-lane payload produced by
/// [`crate::interleaved::encode_interleaved`]). Used by this module's own
/// tests, which exercise `RangeEncoder`/`RangeDecoder` directly without
/// going through the interleaved lane format; see
/// [`crate::interleaved::decode_interleaved`] for the whole-payload scalar
/// fallback that mirrors the real wire format.
pub fn decode_all(payload: &[u8], table: &DecodeTable, orig_size: usize) -> CodecResult<Vec<u8>> {
    let mut out = Vec::with_capacity(orig_size);
    let (mut dec, mut pos) = RangeDecoder::init(payload)?;
    for _ in 0..orig_size {
        out.push(dec.decode(table, payload, &mut pos)? as u8);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{build_cum_probs, build_decode_table, frequencies, MAX_SYMS};

    fn encode_scalar(data: &[u8], cum: &CumProbs) -> Vec<u8> {
        let mut enc = RangeEncoder::new();
        for &b in data {
            enc.encode(cum[b as usize], cum[b as usize + 1]);
        }
        enc.flush();
        enc.buf().to_vec()
    }

    #[test]
    fn scalar_round_trip() {
        let data: Vec<u8> = (0..2000u32).map(|i| (i % 7) as u8).collect();
        let mut freq = [0u32; MAX_SYMS];
        for &b in &data {
            freq[b as usize] += 1;
        }
        let (cum, _) = build_cum_probs(freq).unwrap();
        let table = build_decode_table(&cum);

        let payload = encode_scalar(&data, &cum);
        let decoded = decode_all(&payload, &table, data.len()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn carry_propagation_round_trips() {
        // A run of 0xFF-adjacent bytes maximizes the chance renormalization
        // emits a 0xFF byte right before a later carry fires.
        let mut data = vec![0xFFu8; 64];
        data.extend(std::iter::repeat(0x00u8).take(64));
        data.push(0x01);
        let freq = frequencies(&data);
        let (cum, _) = build_cum_probs(freq).unwrap();
        let table = build_decode_table(&cum);

        let payload = encode_scalar(&data, &cum);
        let decoded = decode_all(&payload, &table, data.len()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn truncated_payload_reports_corrupt_input_instead_of_panicking() {
        let data: Vec<u8> = (0..500u32).map(|i| (i % 13) as u8).collect();
        let freq = frequencies(&data);
        let (cum, _) = build_cum_probs(freq).unwrap();
        let table = build_decode_table(&cum);

        let mut payload = encode_scalar(&data, &cum);
        payload.truncate(5);
        assert!(decode_all(&payload, &table, data.len()).is_err());
    }
}
