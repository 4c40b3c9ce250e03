//! `rangecoder` — pack/unpack files with the interleaved range coder, or
//! benchmark it in memory against a given input.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use thiserror::Error;

use rangecoder_container::{Container, ContainerError};

#[derive(Parser)]
#[command(name = "rangecoder")]
#[command(about = "Interleaved 8-bit range coder with a 16-way SIMD decoder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into the container format.
    Pack {
        /// File to compress.
        input: PathBuf,
        /// Where to write the container.
        output: PathBuf,
    },
    /// Decompress a container back to its original bytes.
    Unpack {
        /// Container file to decompress.
        input: PathBuf,
        /// Where to write the decompressed bytes.
        output: PathBuf,
    },
    /// Encode and decode a file in memory, reporting ratio and timing.
    Bench {
        /// File to benchmark against.
        input: PathBuf,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("container error: {0}")]
    Container(#[from] ContainerError),
}

fn main() -> Result<(), CliError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Pack { input, output } => pack(&input, &output),
        Commands::Unpack { input, output } => unpack(&input, &output),
        Commands::Bench { input } => bench(&input),
    }
}

fn pack(input: &PathBuf, output: &PathBuf) -> Result<(), CliError> {
    log::info!("reading {}", input.display());
    let data = fs::read(input)?;

    let mut buf = Vec::new();
    Container::write(&mut buf, &data)?;

    log::info!(
        "{} -> {} bytes ({:.1}%)",
        data.len(),
        buf.len(),
        100.0 * buf.len() as f64 / data.len().max(1) as f64
    );

    fs::write(output, &buf)?;
    log::info!("wrote {}", output.display());
    Ok(())
}

fn unpack(input: &PathBuf, output: &PathBuf) -> Result<(), CliError> {
    log::info!("reading {}", input.display());
    let buf = fs::read(input)?;

    let decoded = match Container::read(&buf) {
        Ok(decoded) => decoded,
        Err(err) => {
            log::error!("failed to unpack {}: {err}", input.display());
            return Err(err.into());
        }
    };

    fs::write(output, &decoded)?;
    log::info!("wrote {} ({} bytes)", output.display(), decoded.len());
    Ok(())
}

fn bench(input: &PathBuf) -> Result<(), CliError> {
    let data = fs::read(input)?;
    if data.is_empty() {
        log::warn!("{} is empty, nothing to benchmark", input.display());
        return Ok(());
    }

    let mut buf = Vec::new();
    let encode_start = Instant::now();
    Container::write(&mut buf, &data)?;
    let encode_elapsed = encode_start.elapsed();

    let decode_start = Instant::now();
    let decoded = Container::read(&buf)?;
    let decode_elapsed = decode_start.elapsed();

    assert_eq!(decoded, data, "bench round-trip produced different bytes than the input");

    println!("input:       {} bytes", data.len());
    println!("packed:      {} bytes ({:.1}%)", buf.len(), 100.0 * buf.len() as f64 / data.len() as f64);
    println!("encode time: {encode_elapsed:?}");
    println!("decode time: {decode_elapsed:?}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn pack_then_unpack_round_trips_through_files() {
        let data: Vec<u8> = (0..4000u32).map(|i| ((i * 13) % 180) as u8).collect();

        let mut src = tempfile::NamedTempFile::new().unwrap();
        src.write_all(&data).unwrap();

        let packed = tempfile::NamedTempFile::new().unwrap();
        pack(&src.path().to_path_buf(), &packed.path().to_path_buf()).unwrap();

        let unpacked = tempfile::NamedTempFile::new().unwrap();
        unpack(&packed.path().to_path_buf(), &unpacked.path().to_path_buf()).unwrap();

        let result = fs::read(unpacked.path()).unwrap();
        assert_eq!(result, data);
    }

    #[test]
    fn unpack_rejects_a_file_that_is_not_a_container() {
        let mut src = tempfile::NamedTempFile::new().unwrap();
        src.write_all(b"not a container").unwrap();

        let dest = tempfile::NamedTempFile::new().unwrap();
        let result = unpack(&src.path().to_path_buf(), &dest.path().to_path_buf());
        assert!(result.is_err());
    }
}
