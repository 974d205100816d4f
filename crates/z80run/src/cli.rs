use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum System {
    Basic,
    Cpm,
}

/// Run a Z80 binary against a minimal BASIC single-board computer or a
/// CP/M transient-program shell.
#[derive(Debug, Parser)]
#[command(name = "z80run", version, about)]
pub struct Args {
    /// Binary or Intel HEX file to load.
    pub file: PathBuf,

    /// Force the target system instead of auto-detecting from the file
    /// extension.
    #[arg(long)]
    pub system: Option<System>,

    /// Serial port base address override (BASIC system only), e.g. `0x80`.
    #[arg(long, value_parser = parse_port)]
    pub port: Option<u16>,
}

fn parse_port(s: &str) -> Result<u16, String> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    let radix = if digits.len() != s.len() { 16 } else { 10 };
    u16::from_str_radix(digits, radix).map_err(|e| format!("invalid port '{s}': {e}"))
}
