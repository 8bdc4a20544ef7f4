//! ULC command-line interface.

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use ulc::config::CompressionLevel;
use ulc::dispatch::{self, Variant};
use ulc::error::UlcError;
use ulc::{variant_h, variant_s, variant_u};

#[derive(Parser)]
#[command(name = "ulc")]
#[command(author = "ext-sakamoro")]
#[command(version = "1.0.0")]
#[command(about = "Ultra Log Compressor - columnar codec + LZMA2 for structured log files")]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a log file
    Compress {
        /// Input file (use - for stdin)
        input: PathBuf,

        /// Output file (default: input.ulc | .ulcu | .ulch)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compression level: fast, balanced, best
        #[arg(short, long, default_value = "balanced")]
        level: String,

        /// Variant to use: s, u, h, or auto (classify the corpus)
        #[arg(long, default_value = "auto")]
        variant: String,
    },

    /// Decompress a ULC file
    Decompress {
        /// Input file (.ulc, .ulcu, or .ulch)
        input: PathBuf,

        /// Output file (default: input with its variant extension stripped,
        /// or `.decompressed` appended)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show file information (Variant S only; stub for U/H)
    Info {
        /// Input file
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    stderrlog::new()
        .module(module_path!())
        .verbosity(usize::from(cli.verbose) + 2)
        .init()
        .ok();

    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            level,
            variant,
        } => compress_file(&input, output, &level, &variant),
        Commands::Decompress { input, output } => decompress_file(&input, output),
        Commands::Info { input } => show_info(&input),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ulc: {err}");
            ExitCode::FAILURE
        }
    }
}

fn read_input(input: &Path) -> Result<String, UlcError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(UlcError::InputOpenFailed)?;
        Ok(buffer)
    } else {
        fs::read_to_string(input).map_err(UlcError::InputOpenFailed)
    }
}

fn parse_level(level: &str) -> CompressionLevel {
    match CompressionLevel::parse(&level.to_lowercase()) {
        Some(l) => l,
        None => {
            eprintln!("ulc: unknown level '{level}', using balanced");
            CompressionLevel::Balanced
        }
    }
}

fn parse_variant(variant: &str, text: &str) -> Variant {
    match variant.to_lowercase().as_str() {
        "s" => Variant::S,
        "u" => Variant::U,
        "h" => Variant::H,
        "auto" => {
            let lines: Vec<&str> = text.lines().collect();
            dispatch::classify(&lines)
        }
        other => {
            eprintln!("ulc: unknown variant '{other}', classifying automatically");
            let lines: Vec<&str> = text.lines().collect();
            dispatch::classify(&lines)
        }
    }
}

fn compress_file(
    input: &PathBuf,
    output: Option<PathBuf>,
    level: &str,
    variant: &str,
) -> Result<(), UlcError> {
    let text = read_input(input)?;
    let original_size = text.len();
    let level = parse_level(level);
    let chosen = parse_variant(variant, &text);

    let start = Instant::now();
    let compressed = match chosen {
        Variant::S => variant_s::compress(&text, level),
        Variant::U => variant_u::compress(&text, level),
        Variant::H => variant_h::compress(&text, level),
    }?;
    let elapsed = start.elapsed();
    let compressed_size = compressed.len();

    let output_path = output.unwrap_or_else(|| {
        let mut p = input.clone();
        p.set_extension(chosen.extension());
        p
    });
    fs::write(&output_path, &compressed).map_err(UlcError::OutputOpenFailed)?;

    let ratio = if original_size == 0 {
        0.0
    } else {
        compressed_size as f64 / original_size as f64 * 100.0
    };
    println!(
        "{} -> {} [{:?}] ({} -> {} bytes, {:.1}% ratio, {:.2}ms)",
        input.display(),
        output_path.display(),
        chosen,
        original_size,
        compressed_size,
        ratio,
        elapsed.as_secs_f64() * 1000.0
    );
    Ok(())
}

fn decompress_file(input: &PathBuf, output: Option<PathBuf>) -> Result<(), UlcError> {
    let data = fs::read(input).map_err(UlcError::InputOpenFailed)?;
    let variant = dispatch::variant_from_magic(&data).ok_or(UlcError::BadMagic)?;
    let text = match variant {
        Variant::S => variant_s::decompress(&data),
        Variant::U => variant_u::decompress(&data),
        Variant::H => variant_h::decompress(&data),
    }?;

    let output_path = output.unwrap_or_else(|| default_decompressed_path(input, variant));
    fs::write(&output_path, &text).map_err(UlcError::OutputOpenFailed)?;
    println!("Decompressed to: {}", output_path.display());
    Ok(())
}

/// Default output path when `-o` is omitted: strip the variant's own
/// extension (`.ulc`/`.ulcu`/`.ulch`), or append `.decompressed` when the
/// input doesn't carry it.
fn default_decompressed_path(input: &Path, variant: Variant) -> PathBuf {
    if input.extension().and_then(|e| e.to_str()) == Some(variant.extension()) {
        input.with_extension("")
    } else {
        let mut name = input.file_name().unwrap_or_default().to_os_string();
        name.push(".decompressed");
        input.with_file_name(name)
    }
}

/// Full columnar detail for Variant S; a stub notice for U/H, which
/// don't carry per-column stats in a form worth printing here.
fn show_info(input: &PathBuf) -> Result<(), UlcError> {
    let data = fs::read(input).map_err(UlcError::InputOpenFailed)?;
    let variant = dispatch::variant_from_magic(&data).ok_or(UlcError::BadMagic)?;

    println!("File:    {}", input.display());
    println!("Variant: {variant:?}");
    println!("Size:    {} bytes", data.len());

    match variant {
        Variant::S => {
            let body_offset = variant_s::MAGIC.len() + 1;
            let body = ulc::entropy::decompress(&data[body_offset..])?;
            let (row_count, columns) = ulc::codec::read_body(&body)?;
            println!("Rows:    {row_count}");
            println!("Columns: {}", columns.len());
            for (i, col) in columns.iter().enumerate() {
                println!("  [{i}] tag={}", col.tag());
            }
        }
        Variant::U | Variant::H => {
            println!("(detailed column info not available for this variant)");
        }
    }
    Ok(())
}
