pub mod cartridge;
pub mod cpu;
pub mod joypad;
pub mod mapper;
mod palette;
pub mod ppu;

use std::time::{Duration, Instant};

use thiserror::Error;

use cartridge::Cartridge;
use joypad::Joypad;
use mapper::{Mapper, create_mapper};
use ppu::Ppu;

pub(crate) const FLAG_CARRY: u8 = 0x01;
pub(crate) const FLAG_ZERO: u8 = 0x02;
pub(crate) const FLAG_INTERRUPT: u8 = 0x04;
pub(crate) const FLAG_DECIMAL: u8 = 0x08;
pub(crate) const FLAG_BREAK: u8 = 0x10;
pub(crate) const FLAG_UNUSED: u8 = 0x20;
pub(crate) const FLAG_OVERFLOW: u8 = 0x40;
pub(crate) const FLAG_NEGATIVE: u8 = 0x80;

pub(crate) const STACK_BASE: u16 = 0x0100;
pub(crate) const NMI_VECTOR: u16 = 0xFFFA;
pub(crate) const RESET_VECTOR: u16 = 0xFFFC;
pub(crate) const IRQ_VECTOR: u16 = 0xFFFE;

const FRAMES_PER_SECOND: u32 = 60;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NesError {
    #[error("invalid opcode ${opcode:02X} @ PC=${pc:04X}")]
    InvalidOpcode { pc: u16, opcode: u8 },
    #[error("mapper {id} not implemented")]
    UnimplementedMapper { id: u8 },
    #[error("unimplemented opcode {name}")]
    UnimplementedOpcode { name: &'static str },
}

/// Regulates frame delivery toward 60 Hz. Headless harnesses disable it
/// to run the core flat out.
struct FramePacer {
    enabled: bool,
    last_frame: Instant,
    frame_duration: Duration,
}

impl FramePacer {
    fn new() -> Self {
        Self {
            enabled: true,
            last_frame: Instant::now(),
            frame_duration: Duration::from_secs(1) / FRAMES_PER_SECOND,
        }
    }

    fn wait_for_next_frame(&mut self) {
        if self.enabled {
            let expected = self.last_frame + self.frame_duration;
            let now = Instant::now();
            if expected > now {
                std::thread::sleep(expected - now);
            }
        }
        self.last_frame = Instant::now();
    }
}

/// The console: CPU registers and work RAM live directly on this struct,
/// with the step/bus code in `cpu.rs`. The PPU, mapper, and joypads are
/// owned components reached through the bus.
pub struct Nes {
    pub(crate) a: u8,
    pub(crate) x: u8,
    pub(crate) y: u8,
    pub(crate) p: u8,
    pub(crate) sp: u8,
    pub(crate) pc: u16,

    pub(crate) ram: [u8; 2048],
    pub(crate) num_cycles: u64,

    pub(crate) ppu: Ppu,
    pub(crate) mapper: Box<dyn Mapper>,
    pub(crate) joypads: [Joypad; 2],

    pacer: FramePacer,
    frame_count: u64,
}

impl std::fmt::Debug for Nes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Nes")
            .field("a", &self.a)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("p", &self.p)
            .field("sp", &self.sp)
            .field("pc", &self.pc)
            .field("num_cycles", &self.num_cycles)
            .field("frame_count", &self.frame_count)
            .finish()
    }
}

impl Nes {
    /// Builds a console around a parsed cartridge. Fails when the
    /// cartridge names a mapper the core does not implement.
    pub fn new(cart: Cartridge) -> Result<Self, NesError> {
        let mapper = create_mapper(cart)?;

        let mut nes = Self {
            a: 0,
            x: 0,
            y: 0,
            p: FLAG_INTERRUPT | FLAG_UNUSED,
            sp: 0xFD,
            pc: 0,
            ram: [0; 2048],
            num_cycles: 0,
            ppu: Ppu::new(),
            mapper,
            joypads: [Joypad::new(), Joypad::new()],
            pacer: FramePacer::new(),
            frame_count: 0,
        };
        nes.pc = nes.read_u16(RESET_VECTOR);

        Ok(nes)
    }

    /// Runs the console for one CPU instruction, then lets the PPU catch
    /// up at three ticks per CPU cycle.
    ///
    /// Most calls return `None`. Roughly 60 times a second the PPU
    /// finishes a frame and a 256x240 RGBA buffer is returned; consume or
    /// copy it before the next call, the buffer is rewritten in place.
    /// When a frame is emitted this may sleep to pace output toward NTSC
    /// speed unless pacing has been disabled.
    pub fn step(&mut self) -> Result<Option<&[u8]>, NesError> {
        let cpu_cycles = self.step_cpu()?;

        let mut frame_ready = false;
        while self.ppu.num_cycles() < cpu_cycles * 3 {
            frame_ready = self.ppu.step(self.mapper.as_mut());
            if self.ppu.take_nmi() {
                self.nmi();
            }
            if frame_ready {
                break;
            }
        }

        if frame_ready {
            self.frame_count += 1;
            self.pacer.wait_for_next_frame();
            return Ok(Some(self.ppu.frame_buffer()));
        }

        Ok(None)
    }

    pub fn set_frame_pacing(&mut self, enabled: bool) {
        self.pacer.enabled = enabled;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn num_cycles(&self) -> u64 {
        self.num_cycles
    }

    pub fn frame_buffer(&self) -> &[u8] {
        self.ppu.frame_buffer()
    }

    pub fn joypad_mut(&mut self, index: usize) -> &mut Joypad {
        &mut self.joypads[index]
    }

    pub fn ppu_scanline(&self) -> u16 {
        self.ppu.scanline()
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    /// CPU register snapshot `(A, X, Y, P, SP, PC)`.
    pub fn debug_cpu_regs(&self) -> (u8, u8, u8, u8, u8, u16) {
        (self.a, self.x, self.y, self.p, self.sp, self.pc)
    }

    pub fn debug_peek_sram(&self, index: usize) -> u8 {
        self.mapper.debug_peek_sram(index)
    }

    /// Returns the raw bytes of the instruction at PC without advancing
    /// execution.
    pub fn next_instruction_bytes(&mut self) -> Result<Vec<u8>, NesError> {
        let opcode = self.cpu_read(self.pc);
        let entry = &cpu::OPCODES[opcode as usize];

        if entry.size == 0 {
            return Err(NesError::InvalidOpcode { pc: self.pc, opcode });
        }

        let mut bytes = Vec::with_capacity(entry.size as usize);
        for i in 0..entry.size {
            bytes.push(self.cpu_read(self.pc.wrapping_add(i)));
        }

        Ok(bytes)
    }

    pub(crate) fn cpu_read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF => match addr & 0x0007 {
                2 => self.ppu.read_status(),
                4 => self.ppu.read_oam(),
                7 => self.ppu.read_data(self.mapper.as_mut()),
                _ => {
                    log::debug!("unknown PPU register read @ ${addr:04X}");
                    0
                }
            },
            0x4016 => self.joypads[0].read(),
            0x4017 => self.joypads[1].read(),
            0x6000..=0xFFFF => self.mapper.cpu_read(addr),
            // Open bus; includes the APU/IO block the core stubs out.
            _ => 0xFF,
        }
    }

    /// Writes a byte to the bus. Returns the extra CPU cycles the write
    /// consumed; OAM DMA is the only write that costs any.
    pub(crate) fn cpu_write(&mut self, addr: u16, value: u8) -> u64 {
        match addr {
            0x0000..=0x1FFF => {
                self.ram[(addr & 0x07FF) as usize] = value;
            }
            0x2000..=0x3FFF => match addr & 0x0007 {
                0 => self.ppu.set_control(value),
                1 => self.ppu.set_mask(value),
                3 => self.ppu.set_oam_address(value),
                4 => self.ppu.write_oam(value),
                5 => self.ppu.write_scroll(value),
                6 => self.ppu.write_address(value),
                7 => self.ppu.write_data(value, self.mapper.as_mut()),
                _ => {
                    log::debug!("unknown PPU register write @ ${addr:04X}");
                }
            },
            0x4014 => return self.oam_dma(value),
            0x4016 => self.joypads[0].write(value),
            0x4017 => self.joypads[1].write(value),
            0x6000..=0xFFFF => self.mapper.cpu_write(addr, value),
            _ => {
                log::debug!("ignored CPU write @ ${addr:04X} (value=${value:02X})");
            }
        }

        0
    }

    fn oam_dma(&mut self, page: u8) -> u64 {
        self.ppu.set_oam_address(0);

        let base = (page as u16) << 8;
        for i in 0..0x100u16 {
            let value = self.cpu_read(base.wrapping_add(i));
            self.ppu.write_oam(value);
        }

        512
    }

    pub(crate) fn read_u16(&mut self, addr: u16) -> u16 {
        let lo = self.cpu_read(addr) as u16;
        let hi = self.cpu_read(addr.wrapping_add(1)) as u16;
        hi << 8 | lo
    }

    /// 16-bit read reproducing the 6502 page-boundary bug: when the low
    /// byte of the pointer is $FF, the high byte comes from the start of
    /// the same page.
    pub(crate) fn read_u16_bug(&mut self, addr: u16) -> u16 {
        let lo = self.cpu_read(addr) as u16;
        let hi_addr = if addr & 0x00FF == 0x00FF {
            addr & 0xFF00
        } else {
            addr.wrapping_add(1)
        };
        let hi = self.cpu_read(hi_addr) as u16;
        hi << 8 | lo
    }

    pub(crate) fn push(&mut self, value: u8) {
        self.cpu_write(STACK_BASE | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    pub(crate) fn pop(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.cpu_read(STACK_BASE | self.sp as u16)
    }

    pub(crate) fn push_u16(&mut self, value: u16) {
        self.push((value >> 8) as u8);
        self.push(value as u8);
    }

    pub(crate) fn pop_u16(&mut self) -> u16 {
        let lo = self.pop() as u16;
        let hi = self.pop() as u16;
        hi << 8 | lo
    }

    pub(crate) fn set_flag(&mut self, flag: u8, value: bool) {
        if value {
            self.p |= flag;
        } else {
            self.p &= !flag;
        }
        self.p |= FLAG_UNUSED;
    }

    pub(crate) fn get_flag(&self, flag: u8) -> bool {
        self.p & flag != 0
    }

    pub(crate) fn update_zn(&mut self, value: u8) {
        self.set_flag(FLAG_ZERO, value == 0);
        self.set_flag(FLAG_NEGATIVE, value & 0x80 != 0);
    }

    /// Services a mapper IRQ: push PC and P, vector through $FFFE, set
    /// the interrupt-disable flag. Costs 7 cycles.
    pub(crate) fn interrupt(&mut self) -> u64 {
        self.push_u16(self.pc);
        self.push(self.p);
        self.pc = self.read_u16(IRQ_VECTOR);
        self.set_flag(FLAG_INTERRUPT, true);
        7
    }

    /// Non-maskable interrupt, raised by the PPU at the start of VBlank.
    /// Not gated by the interrupt-disable flag.
    pub fn nmi(&mut self) -> u64 {
        self.push_u16(self.pc);
        self.push(self.p);
        self.pc = self.read_u16(NMI_VECTOR);
        self.set_flag(FLAG_INTERRUPT, true);
        7
    }
}

#[cfg(test)]
mod tests {
    use super::mapper::Mirroring;
    use super::*;

    fn test_cart() -> Cartridge {
        let mut cart = Cartridge::new(1, 1, 1, Mirroring::Horizontal, 0);
        // Reset vector -> $8000, where an infinite JMP $8000 loop sits.
        cart.prg[0][0x0000] = 0x4C;
        cart.prg[0][0x0001] = 0x00;
        cart.prg[0][0x0002] = 0x80;
        cart.prg[0][0x3FFC] = 0x00;
        cart.prg[0][0x3FFD] = 0x80;
        cart
    }

    fn test_nes() -> Nes {
        let mut nes = Nes::new(test_cart()).unwrap();
        nes.set_frame_pacing(false);
        nes
    }

    #[test]
    fn ram_mirrors_every_2k() {
        let mut nes = test_nes();

        for addr in (0x0000..0x2000u16).step_by(0x123) {
            nes.cpu_write(addr, (addr % 251) as u8);
        }
        for addr in (0x0000..0x2000u16).step_by(0x123) {
            let value = (addr % 251) as u8;
            assert_eq!(nes.cpu_read(addr & 0x07FF), value);
            assert_eq!(nes.cpu_read((addr & 0x07FF) | 0x0800), value);
            assert_eq!(nes.cpu_read((addr & 0x07FF) | 0x1800), value);
        }
    }

    #[test]
    fn ram_round_trips_every_byte_value() {
        let mut nes = test_nes();

        for value in 0..=0xFFu8 {
            nes.cpu_write(0x0300 + value as u16, value);
        }
        for value in 0..=0xFFu8 {
            assert_eq!(nes.cpu_read(0x0300 + value as u16), value);
        }
    }

    #[test]
    fn pc_starts_at_reset_vector() {
        let nes = test_nes();
        assert_eq!(nes.pc, 0x8000);
    }

    #[test]
    fn open_bus_reads_ff() {
        let mut nes = test_nes();
        assert_eq!(nes.cpu_read(0x4000), 0xFF);
        assert_eq!(nes.cpu_read(0x4015), 0xFF);
        assert_eq!(nes.cpu_read(0x5123), 0xFF);
    }

    #[test]
    fn oam_dma_copies_a_page_and_costs_512_cycles() {
        let mut nes = test_nes();

        for i in 0..0x100u16 {
            nes.cpu_write(0x0200 + i, i as u8);
        }

        let extra = nes.cpu_write(0x4014, 0x02);
        assert_eq!(extra, 512);
        for i in 0..0x100usize {
            assert_eq!(nes.ppu.debug_peek_oam(i), i as u8);
        }
    }

    #[test]
    fn first_frame_arrives_after_about_one_ntsc_frame() {
        let mut nes = test_nes();

        let mut frame_cycles = None;
        for _ in 0..100_000 {
            if nes.step().unwrap().is_some() {
                frame_cycles = Some(nes.num_cycles());
                break;
            }
        }

        let cycles = frame_cycles.expect("no frame emitted") as i64;
        assert!(
            (cycles - 29781).abs() <= 3,
            "first frame at {cycles} CPU cycles"
        );
    }

    #[test]
    fn frame_buffer_is_rgba_256x240() {
        let mut nes = test_nes();

        loop {
            if let Some(frame) = nes.step().unwrap() {
                assert_eq!(frame.len(), 256 * 240 * 4);
                break;
            }
        }
        assert_eq!(nes.frame_count(), 1);
    }

    #[test]
    fn unknown_mapper_is_rejected_at_construction() {
        let cart = Cartridge::new(1, 1, 1, Mirroring::Horizontal, 7);
        match Nes::new(cart) {
            Err(NesError::UnimplementedMapper { id: 7 }) => {}
            other => panic!("expected UnimplementedMapper, got {other:?}"),
        }
    }
}
