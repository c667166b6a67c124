//! CLI argument parsing using clap.

use clap::Parser;
use std::path::PathBuf;
use unpack_core::Principal;

#[derive(Parser)]
#[command(name = "unpack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Archive source: http(s)/ftp URL, file:// path, or a path inside a
    /// bundle (see --from-bundle)
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Destination directory (created if missing)
    #[arg(value_name = "DEST")]
    pub dest: PathBuf,

    /// Owner of every extracted path (user name or numeric id)
    #[arg(long, value_name = "USER")]
    pub owner: Option<Principal>,

    /// Group of every extracted path (group name or numeric id)
    #[arg(long, value_name = "GROUP")]
    pub group: Option<Principal>,

    /// Mode applied to every extracted file, in octal
    #[arg(long, value_name = "OCTAL", value_parser = parse_mode)]
    pub mode: Option<u32>,

    /// Mode applied to every extracted directory, in octal
    #[arg(long, value_name = "OCTAL", value_parser = parse_mode)]
    pub dir_mode: Option<u32>,

    /// Re-include entries matching an exclusion (glob, can be repeated)
    #[arg(long = "include", short = 'i', value_name = "PATTERN")]
    pub include: Vec<String>,

    /// Exclude entries (glob, can be repeated)
    #[arg(long = "exclude", short = 'x', value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Number of leading path components to drop from every entry
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub strip: usize,

    /// Register a bundle root (can be repeated)
    #[arg(long = "bundle", value_name = "NAME=DIR", value_parser = parse_bundle)]
    pub bundles: Vec<(String, PathBuf)>,

    /// Bundle to resolve SOURCE in when it has no scheme
    #[arg(long, value_name = "NAME")]
    pub from_bundle: Option<String>,

    /// Directory remote archives are downloaded to (default: system temp dir)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Ignore ownership recorded in the archive
    #[arg(long)]
    pub no_same_owner: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long)]
    pub json: bool,
}

impl Cli {
    /// Default log filter when `RUST_LOG` is not set.
    pub const fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

/// Parse a permission mode written in octal, with or without a `0o`/`0`
/// prefix.
fn parse_mode(s: &str) -> Result<u32, String> {
    let digits = s.trim();
    let digits = digits.strip_prefix("0o").unwrap_or(digits);
    if digits.is_empty() {
        return Err("empty mode".to_string());
    }

    let mode = u32::from_str_radix(digits, 8).map_err(|_| format!("invalid octal mode: {s}"))?;
    if mode > 0o7777 {
        return Err(format!("mode out of range: {s}"));
    }
    Ok(mode)
}

/// Parse a `NAME=DIR` bundle registration.
fn parse_bundle(s: &str) -> Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((name, dir)) if !name.is_empty() && !dir.is_empty() => {
            Ok((name.to_string(), PathBuf::from(dir)))
        }
        _ => Err(format!("expected NAME=DIR, got '{s}'")),
    }
}
