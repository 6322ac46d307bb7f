//! Runs blargg-style instruction test ROMs.
//!
//! Usage: instr_tests <rom>...
//!
//! Each ROM reports through SRAM: byte 0 holds the status (0 = passed)
//! once bytes 0/1 settle to the completion marker, and the ASCII result
//! text starts at byte 5.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use famicore::nes::Nes;
use famicore::nes::cartridge::Cartridge;

const MAX_STEPS: u32 = 5_000_000;

fn status_text(nes: &Nes) -> String {
    let mut bytes = Vec::new();
    for index in 5..256 {
        let byte = nes.debug_peek_sram(index);
        if byte == 0 {
            break;
        }
        bytes.push(byte);
    }
    String::from_utf8_lossy(&bytes).trim().to_string()
}

fn run_rom(path: &PathBuf) -> Result<()> {
    let cart =
        Cartridge::from_file(path).with_context(|| format!("loading {}", path.display()))?;
    let mut nes = Nes::new(cart)?;
    nes.set_frame_pacing(false);

    for _ in 0..MAX_STEPS {
        nes.step()?;
        if nes.debug_peek_sram(0) == 0 && nes.debug_peek_sram(1) == 0xDE {
            break;
        }
    }

    let status = nes.debug_peek_sram(0);
    let text = status_text(&nes);
    if status != 0 {
        bail!(
            "{}: failed with status ${status:02X}: {text}",
            path.display()
        );
    }

    println!("{}: passed {text}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let roms: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if roms.is_empty() {
        bail!("usage: instr_tests <rom>...");
    }

    let mut failures = 0;
    for rom in &roms {
        if let Err(err) = run_rom(rom) {
            eprintln!("{err:#}");
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{failures} ROM(s) failed");
    }
    Ok(())
}
