//! Compares CPU execution against a nestest reference trace.
//!
//! Usage: nestest <nestest.nes> <nestest.log>
//!
//! Starts at $C000 per the log's automated mode and checks the tuple
//! (PC, instruction bytes, A, X, Y, P, SP, CYC, SL) before every step.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, bail};

use famicore::nes::Nes;
use famicore::nes::cartridge::Cartridge;

#[derive(Debug, PartialEq, Eq)]
struct TraceLine {
    pc: u16,
    instruction: Vec<u8>,
    a: u8,
    x: u8,
    y: u8,
    p: u8,
    sp: u8,
    cyc: u64,
    sl: u16,
}

// 0         1         2         3         4         5         6         7         8
// 0123456789012345678901234567890123456789012345678901234567890123456789012345678901234567
// C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD CYC:  0 SL:241
fn parse_trace_line(line: &str) -> Result<TraceLine> {
    if line.len() < 86 {
        bail!("trace line too short: {line:?}");
    }

    let instruction = line[6..14]
        .split_whitespace()
        .map(|byte| u8::from_str_radix(byte, 16))
        .collect::<Result<Vec<_>, _>>()?;

    let sl: i32 = line[85..].trim().parse()?;

    Ok(TraceLine {
        pc: u16::from_str_radix(&line[0..4], 16)?,
        instruction,
        a: u8::from_str_radix(&line[50..52], 16)?,
        x: u8::from_str_radix(&line[55..57], 16)?,
        y: u8::from_str_radix(&line[60..62], 16)?,
        p: u8::from_str_radix(&line[65..67], 16)?,
        sp: u8::from_str_radix(&line[71..73], 16)?,
        cyc: line[78..81].trim().parse()?,
        // The log reports the pre-render line as -1.
        sl: if sl == -1 { 261 } else { sl as u16 },
    })
}

fn run(rom: &PathBuf, log: &PathBuf) -> Result<usize> {
    let cart = Cartridge::from_file(rom)?;
    let mut nes = Nes::new(cart)?;
    nes.set_frame_pacing(false);
    nes.set_pc(0xC000);

    let file = File::open(log).with_context(|| format!("failed to open {}", log.display()))?;
    let mut previous: Option<TraceLine> = None;
    let mut lines = 0;

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let expected =
            parse_trace_line(&line).with_context(|| format!("log line {}", index + 1))?;

        let instruction = nes.next_instruction_bytes()?;
        let (a, x, y, p, sp, pc) = nes.debug_cpu_regs();
        let actual = TraceLine {
            pc,
            instruction,
            a,
            x,
            y,
            p,
            sp,
            cyc: nes.num_cycles() * 3 % 341,
            sl: nes.ppu_scanline(),
        };

        if actual != expected {
            eprintln!("mismatch at log line {}:", index + 1);
            if let Some(previous) = &previous {
                eprintln!("previous: {previous:X?}");
            }
            eprintln!("expected: {expected:X?}");
            eprintln!("actual  : {actual:X?}");
            process::exit(1);
        }

        previous = Some(expected);
        lines = index + 1;
        nes.step()?;
    }

    Ok(lines)
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let (Some(rom), Some(log)) = (args.next(), args.next()) else {
        bail!("usage: nestest <nestest.nes> <nestest.log>");
    };

    let lines = run(&PathBuf::from(rom), &PathBuf::from(log))?;
    println!("trace matched for {lines} lines");
    Ok(())
}
