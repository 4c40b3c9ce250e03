//! Probability model construction: frequencies -> scaled cumulative
//! probabilities -> decode lookup table. See `spec.md` sections 3 and 4.1/4.2.

use crate::error::{CodecError, CodecResult};

/// Number of probability bits; the cumulative scale is `1 << PROB_BITS`.
pub const PROB_BITS: u32 = 12;
/// Fixed-point scale that every cumulative-probability table sums to.
pub const PROB_SCALE: u32 = 1 << PROB_BITS;

/// Lower bound of the range coder's working interval.
pub const MIN_LEN: u32 = 0x0001_0000;
/// Upper bound of the 24-bit interval domain.
pub const MAX_LEN: u32 = 0x00FF_FFFF;

/// Minimum number of distinct symbols the core alphabet can describe.
pub const MIN_SYMS: usize = 2;
/// The core is specified for exactly this many symbols.
pub const MAX_SYMS: usize = 256;

/// Number of interleaved lanes the encoder/decoder operate on.
pub const LANES: usize = 16;
/// Mask selecting a lane index from a byte position.
pub const LANE_MASK: usize = LANES - 1;

/// Scaled cumulative-probability table: `cum[0] == 0`, `cum[256] == PROB_SCALE`,
/// strictly non-decreasing, and `cum[s + 1] - cum[s] >= 1` for every symbol
/// with nonzero frequency.
pub type CumProbs = [u32; MAX_SYMS + 1];

/// Builds the cumulative-probability table from a length-256 frequency
/// vector, per `spec.md` section 4.1.
///
/// `freq` is taken by value and may be modified (a single symbol's count is
/// bumped from 0 to 1) when the input describes only one live symbol — the
/// decoder needs at least two symbols to make progress on any input.
/// Returns the table together with the (possibly adjusted) frequency vector.
pub fn build_cum_probs(mut freq: [u32; MAX_SYMS]) -> CodecResult<(CumProbs, [u32; MAX_SYMS])> {
    let total_freq: u64 = freq.iter().map(|&f| f as u64).sum();
    let mut used_syms = freq.iter().filter(|&&f| f != 0).count();

    if used_syms == 0 {
        return Err(CodecError::BadAlphabet("all frequencies are zero"));
    }

    let mut total_freq = total_freq;
    if used_syms == 1 {
        // Boost some other symbol from 0 to 1 so the decoder always has at
        // least two live symbols to choose between.
        let boost = freq.iter().position(|&f| f == 0).expect("used_syms == 1 implies a zero exists when MAX_SYMS > 1");
        log::debug!("only one live symbol in input; boosting symbol {boost} from 0 to 1");
        freq[boost] = 1;
        total_freq += 1;
        used_syms += 1;
    }

    // Find the largest scale S' <= PROB_SCALE for which no used symbol's
    // naive scaled count truncates to zero, recomputing until it stabilizes.
    let mut adjusted_scale = PROB_SCALE;
    loop {
        let truncated = freq
            .iter()
            .filter(|&&f| f != 0)
            .filter(|&&f| ((f as u64) * adjusted_scale as u64 / total_freq) == 0)
            .count() as u32;

        if truncated == 0 {
            break;
        }
        let next_scale = PROB_SCALE - truncated;
        if next_scale == adjusted_scale {
            break;
        }
        adjusted_scale = next_scale;
    }

    let mut cum = [0u32; MAX_SYMS + 1];
    let mut sym_to_boost = 0usize;
    let mut boost_amount = 0u32;

    for pass in 0..2 {
        let mut most_prob_freq = 0u32;
        let mut most_prob_sym = 0usize;
        let mut running = 0u32;

        for i in 0..MAX_SYMS {
            cum[i] = running;

            if freq[i] == 0 {
                continue;
            }
            if freq[i] > most_prob_freq {
                most_prob_freq = freq[i];
                most_prob_sym = i;
            }

            let mut l = ((freq[i] as u64) * adjusted_scale as u64 / total_freq) as u32;
            l = l.clamp(1, PROB_SCALE - (used_syms as u32 - 1));

            if pass == 1 && i == sym_to_boost {
                l += boost_amount;
            }

            running += l;
            if running > PROB_SCALE {
                return Err(CodecError::BadAlphabet("cumulative total exceeded scale"));
            }
        }
        cum[MAX_SYMS] = PROB_SCALE;

        if running == PROB_SCALE {
            return Ok((cum, freq));
        }
        if pass == 1 {
            return Err(CodecError::BadAlphabet(
                "second pass failed to reach the full probability scale",
            ));
        }

        sym_to_boost = most_prob_sym;
        boost_amount = PROB_SCALE - running;
    }

    unreachable!("loop above always returns within its two passes")
}

/// Decode lookup table: `table[q]` packs `(symbol, cum_low, cum_range)` for
/// the unique symbol whose scaled interval contains `q`. See `spec.md`
/// section 3/4.2 for the bit layout.
pub type DecodeTable = Vec<u32>;

/// Builds the decode lookup table from a cumulative-probability table, per
/// `spec.md` section 4.2. Symbols with zero scaled range contribute no
/// entries.
pub fn build_decode_table(cum: &CumProbs) -> DecodeTable {
    let mut table = vec![0u32; PROB_SCALE as usize];

    for sym in 0..MAX_SYMS {
        let range = cum[sym + 1] - cum[sym];
        if range == 0 {
            continue;
        }
        let packed = (sym as u32) | (cum[sym] << 8) | (range << 20);
        let start = cum[sym] as usize;
        let end = cum[sym + 1] as usize;
        table[start..end].fill(packed);
    }

    table
}

/// Unpacks a decode-table entry into `(symbol, cum_low, cum_range)`.
#[inline]
pub fn unpack_entry(entry: u32) -> (u32, u32, u32) {
    let symbol = entry & 0xFF;
    let cum_low = (entry >> 8) & (PROB_SCALE - 1);
    let cum_range = entry >> 20;
    (symbol, cum_low, cum_range)
}

/// Counts per-symbol frequencies of a byte slice into a length-256 table.
pub fn frequencies(data: &[u8]) -> [u32; MAX_SYMS] {
    let mut freq = [0u32; MAX_SYMS];
    for &b in data {
        freq[b as usize] += 1;
    }
    freq
}
