//! The two host run-loops: the interactive BASIC single-board computer and
//! the batch CP/M transient-program shell.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use cpu_z80::Z80;
use machine_basic_sbc::BasicSbc;
use machine_cpm::{CpmSystem, Termination};

use crate::error::Error;

/// T-states per run-loop quantum, chosen so one quantum is roughly one
/// millisecond at the reference 7.3728 MHz clock.
const QUANTUM_CLOCKS: u32 = 7373;

/// Run the BASIC single-board computer interactively until the user quits
/// (Ctrl-] or Ctrl-C) or the CPU halts.
pub fn run_basic(mut sbc: BasicSbc, quit: Arc<AtomicBool>) -> Result<(), Error> {
    let raw_mode_enabled = terminal::enable_raw_mode().is_ok();
    if !raw_mode_enabled {
        log::warn!("stdin is not a TTY; continuing without raw mode");
    }

    let mut cpu = Z80::new();
    let result = run_basic_loop(&mut cpu, &mut sbc, &quit);

    if raw_mode_enabled {
        let _ = terminal::disable_raw_mode();
    }
    result
}

fn run_basic_loop(cpu: &mut Z80, sbc: &mut BasicSbc, quit: &AtomicBool) -> Result<(), Error> {
    loop {
        if quit.load(Ordering::Relaxed) {
            return Err(Error::UserTermination);
        }

        let mut used = 0u32;
        while used < QUANTUM_CLOCKS {
            if cpu.halted() {
                break;
            }
            used += cpu.step(sbc);
        }

        if let Some(key) = poll_key()? {
            if key == 0x1D {
                // Ctrl-]
                return Err(Error::UserTermination);
            }
            sbc.receive_byte(key);
        }

        if sbc.wants_interrupt() {
            cpu.interrupt_with_data(sbc, 0xFF);
        }

        if cpu.halted() {
            return Ok(());
        }
    }
}

fn poll_key() -> Result<Option<u8>, Error> {
    if !event::poll(Duration::from_millis(0))
        .map_err(|e| Error::TerminalSetupFailure(e.to_string()))?
    {
        return Ok(None);
    }
    match event::read().map_err(|e| Error::TerminalSetupFailure(e.to_string()))? {
        Event::Key(key) => match key.code {
            KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let byte = (c.to_ascii_uppercase() as u8) & 0x1F;
                Ok(Some(byte))
            }
            KeyCode::Char(c) => Ok(Some(c as u8)),
            KeyCode::Enter => Ok(Some(b'\r')),
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

/// Run a CP/M transient program to completion and return its exit status.
pub fn run_cpm(com_image: &[u8]) -> Result<Termination, Error> {
    let mut sys = CpmSystem::new();
    let mut cpu = Z80::new();
    sys.load_transient(&mut cpu, com_image);
    Ok(sys.run(&mut cpu))
}
