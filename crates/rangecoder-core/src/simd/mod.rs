//! SSE4.1 SIMD decoder and its supporting shuffle tables.

pub mod decode;
pub mod tables;

pub use decode::decode_simd;
