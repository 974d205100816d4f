//! Raw-binary and Intel HEX loaders.
//!
//! Both forms fill a caller-supplied 64 KiB memory image and perform no I/O
//! of their own; the only failure mode is a record that can't be parsed,
//! which only the Intel HEX path can produce.

use crate::error::Error;

/// Load `data` verbatim starting at `base`, truncating at the end of the
/// 64 KiB address space.
pub fn load_raw(memory: &mut [u8; 65536], base: u16, data: &[u8]) {
    let base = usize::from(base);
    let n = data.len().min(memory.len().saturating_sub(base));
    memory[base..base + n].copy_from_slice(&data[..n]);
}

/// Whether `data` looks like an Intel HEX file (its first non-whitespace
/// byte is `:`).
#[must_use]
pub fn looks_like_intel_hex(data: &[u8]) -> bool {
    data.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b':')
}

/// Parse Intel HEX records and write their data bytes into `memory`.
///
/// Only type `0x00` (data) records are consumed. A type `0x01` (EOF) record
/// stops parsing immediately. Any other record type is ignored. Checksums
/// are not verified: a record with a bad checksum still loads, matching
/// this loader's narrow error surface (malformed line structure only).
pub fn load_intel_hex(memory: &mut [u8; 65536], text: &str) -> Result<(), Error> {
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(rest) = line.strip_prefix(':') else {
            continue;
        };
        let bytes = decode_hex_bytes(rest)?;
        if bytes.len() < 5 {
            return Err(Error::InvalidArgument(format!(
                "truncated Intel HEX record: {line}"
            )));
        }

        let byte_count = bytes[0] as usize;
        let address = u16::from_be_bytes([bytes[1], bytes[2]]);
        let record_type = bytes[3];
        let data = &bytes[4..];

        if data.len() < byte_count {
            return Err(Error::InvalidArgument(format!(
                "short Intel HEX record: {line}"
            )));
        }

        match record_type {
            0x00 => load_raw(memory, address, &data[..byte_count]),
            0x01 => break,
            _ => {}
        }
    }
    Ok(())
}

fn decode_hex_bytes(hex: &str) -> Result<Vec<u8>, Error> {
    let hex = hex.trim_end();
    if hex.len() % 2 != 0 {
        return Err(Error::InvalidArgument(format!(
            "odd-length Intel HEX record: {hex}"
        )));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| Error::InvalidArgument(format!("bad hex digit in {hex}: {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_load_at_base_address() {
        let mut mem = [0u8; 65536];
        load_raw(&mut mem, 0x0100, &[0xAA, 0xBB, 0xCC]);
        assert_eq!(&mem[0x0100..0x0103], &[0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn raw_load_truncates_at_top_of_memory() {
        let mut mem = [0u8; 65536];
        load_raw(&mut mem, 0xFFFE, &[0x11, 0x22, 0x33]);
        assert_eq!(mem[0xFFFE], 0x11);
        assert_eq!(mem[0xFFFF], 0x22);
    }

    #[test]
    fn intel_hex_multi_record_load() {
        let text = "\
:10000000000102030405060708090A0B0C0D0E0F7C
:04001000AABBCCDD4F
:00000001FF
:10FFFF00DEADBEEF00000000000000000000000000
";
        let mut mem = [0u8; 65536];
        load_intel_hex(&mut mem, text).unwrap();
        assert_eq!(&mem[0x0000..0x0010], &[
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D,
            0x0E, 0x0F
        ]);
        assert_eq!(&mem[0x0010..0x0014], &[0xAA, 0xBB, 0xCC, 0xDD]);
        // The EOF record stops parsing before the trailing record is read.
        assert_eq!(mem[0xFFFF], 0x00);
    }

    #[test]
    fn unsupported_record_type_is_ignored() {
        let text = ":020000020000FC\n:00000001FF\n";
        let mut mem = [0u8; 65536];
        load_intel_hex(&mut mem, text).unwrap();
        assert!(mem.iter().all(|&b| b == 0));
    }

    #[test]
    fn detects_intel_hex_by_leading_colon() {
        assert!(looks_like_intel_hex(b":100000..."));
        assert!(!looks_like_intel_hex(&[0x3E, 0x01]));
    }
}
