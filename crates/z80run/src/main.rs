mod cli;
mod error;
mod loader;
mod systems;

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use machine_basic_sbc::BasicSbc;

use cli::{Args, System};
use error::Error;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let exit_code = match run(args) {
        Ok(()) => 0,
        Err(Error::UserTermination) => 0,
        Err(e) => {
            eprintln!("z80run: {e}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(args: Args) -> Result<(), Error> {
    let raw = fs::read(&args.file).map_err(|e| Error::LoadFailure {
        path: args.file.clone(),
        reason: e.to_string(),
    })?;

    let system = args.system.unwrap_or_else(|| detect_system(&args.file));
    log::info!("target system: {system:?}");

    match system {
        System::Basic => run_basic(&raw, args.port),
        System::Cpm => run_cpm(&raw),
    }
}

fn detect_system(path: &Path) -> System {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("com") || ext.eq_ignore_ascii_case("cim") => {
            System::Cpm
        }
        _ => System::Basic,
    }
}

fn run_basic(raw: &[u8], port_override: Option<u16>) -> Result<(), Error> {
    let mut memory = [0u8; 65536];
    if loader::looks_like_intel_hex(raw) {
        let text = std::str::from_utf8(raw)
            .map_err(|e| Error::InvalidArgument(format!("not valid UTF-8 Intel HEX: {e}")))?;
        loader::load_intel_hex(&mut memory, text)?;
    } else {
        loader::load_raw(&mut memory, 0x0000, raw);
    }

    let port = port_override.unwrap_or_else(|| machine_basic_sbc::detect_uart_port(&memory));
    log::debug!("serial port base: {port:#04x}");

    let mut sbc = BasicSbc::new(port);
    sbc.load_rom(&memory[..machine_basic_sbc::ROM_SIZE as usize]);
    sbc.load_raw(machine_basic_sbc::ROM_SIZE, &memory[machine_basic_sbc::ROM_SIZE as usize..]);

    let quit = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&quit);
    ctrlc::set_handler(move || handler_flag.store(true, Ordering::Relaxed))
        .map_err(|e| Error::TerminalSetupFailure(e.to_string()))?;

    let result = systems::run_basic(sbc, quit);
    log::info!("basic system exited: {result:?}");
    result
}

fn run_cpm(raw: &[u8]) -> Result<(), Error> {
    let image = if loader::looks_like_intel_hex(raw) {
        let text = std::str::from_utf8(raw)
            .map_err(|e| Error::InvalidArgument(format!("not valid UTF-8 Intel HEX: {e}")))?;
        let mut memory = [0u8; 65536];
        loader::load_intel_hex(&mut memory, text)?;
        memory[0x0100..].to_vec()
    } else {
        raw.to_vec()
    };

    let outcome = systems::run_cpm(&image)?;
    log::info!("cpm program terminated: {outcome:?}");
    Ok(())
}
