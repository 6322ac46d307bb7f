use super::{
    FLAG_BREAK, FLAG_CARRY, FLAG_DECIMAL, FLAG_INTERRUPT, FLAG_NEGATIVE, FLAG_OVERFLOW,
    FLAG_UNUSED, FLAG_ZERO, IRQ_VECTOR, Nes, NesError,
};

/// Memory addressing mode of an opcode. Resolution returns the effective
/// address plus whether a page boundary was crossed; accumulator and
/// implied modes return a dummy address the operation knows not to
/// dereference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AddrMode {
    Accumulator,
    Implied,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Aax,
    Adc,
    Alr,
    Anc,
    And,
    Arr,
    Asl,
    AslA,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dcp,
    Dec,
    Dex,
    Dey,
    Dop,
    Eor,
    Inc,
    Inx,
    Iny,
    Isc,
    Jmp,
    Jsr,
    Lax,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    LsrA,
    Lxa,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rla,
    Rol,
    RolA,
    Ror,
    RorA,
    Rra,
    Rti,
    Rts,
    Sax,
    Sbc,
    Sec,
    Sed,
    Sei,
    Slo,
    Sre,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Top,
    Tsx,
    Txa,
    Txs,
    Tya,
    Xxx,
}

/// One row of the opcode table. `size == 0` marks an opcode the core
/// does not execute; stepping onto one fails with `InvalidOpcode`.
pub(crate) struct Opcode {
    pub(crate) name: &'static str,
    pub(crate) op: Op,
    pub(crate) mode: AddrMode,
    pub(crate) size: u16,
    pub(crate) cycles: u64,
    pub(crate) page_cycles: u64,
}

impl Opcode {
    const fn new(
        name: &'static str,
        op: Op,
        mode: AddrMode,
        size: u16,
        cycles: u64,
        page_cycles: u64,
    ) -> Self {
        Self {
            name,
            op,
            mode,
            size,
            cycles,
            page_cycles,
        }
    }
}

use AddrMode::*;

#[rustfmt::skip]
pub(crate) static OPCODES: [Opcode; 256] = [
    /* 0x00 */ Opcode::new("BRK", Op::Brk, Implied, 1, 7, 0),
    /* 0x01 */ Opcode::new("ORA", Op::Ora, IndirectX, 2, 6, 0),
    /* 0x02 */ Opcode::new("x02", Op::Xxx, Implied, 0, 0, 0),
    /* 0x03 */ Opcode::new("SLO", Op::Slo, IndirectX, 2, 8, 0),
    /* 0x04 */ Opcode::new("DOP", Op::Dop, ZeroPage, 2, 3, 0),
    /* 0x05 */ Opcode::new("ORA", Op::Ora, ZeroPage, 2, 3, 0),
    /* 0x06 */ Opcode::new("ASL", Op::Asl, ZeroPage, 2, 5, 0),
    /* 0x07 */ Opcode::new("SLO", Op::Slo, ZeroPage, 2, 5, 0),
    /* 0x08 */ Opcode::new("PHP", Op::Php, Implied, 1, 3, 0),
    /* 0x09 */ Opcode::new("ORA", Op::Ora, Immediate, 2, 2, 0),
    /* 0x0A */ Opcode::new("ASL", Op::AslA, Accumulator, 1, 2, 0),
    /* 0x0B */ Opcode::new("ANC", Op::Anc, Immediate, 2, 2, 0),
    /* 0x0C */ Opcode::new("TOP", Op::Top, Absolute, 3, 4, 0),
    /* 0x0D */ Opcode::new("ORA", Op::Ora, Absolute, 3, 4, 0),
    /* 0x0E */ Opcode::new("ASL", Op::Asl, Absolute, 3, 6, 0),
    /* 0x0F */ Opcode::new("SLO", Op::Slo, Absolute, 3, 6, 0),
    /* 0x10 */ Opcode::new("BPL", Op::Bpl, Relative, 2, 2, 0),
    /* 0x11 */ Opcode::new("ORA", Op::Ora, IndirectY, 2, 5, 1),
    /* 0x12 */ Opcode::new("x12", Op::Xxx, Implied, 0, 0, 0),
    /* 0x13 */ Opcode::new("SLO", Op::Slo, IndirectY, 2, 8, 0),
    /* 0x14 */ Opcode::new("DOP", Op::Dop, ZeroPageX, 2, 4, 0),
    /* 0x15 */ Opcode::new("ORA", Op::Ora, ZeroPageX, 2, 4, 0),
    /* 0x16 */ Opcode::new("ASL", Op::Asl, ZeroPageX, 2, 6, 0),
    /* 0x17 */ Opcode::new("SLO", Op::Slo, ZeroPageX, 2, 6, 0),
    /* 0x18 */ Opcode::new("CLC", Op::Clc, Implied, 1, 2, 0),
    /* 0x19 */ Opcode::new("ORA", Op::Ora, AbsoluteY, 3, 4, 1),
    /* 0x1A */ Opcode::new("NOP", Op::Nop, Implied, 1, 2, 0),
    /* 0x1B */ Opcode::new("SLO", Op::Slo, AbsoluteY, 3, 7, 0),
    /* 0x1C */ Opcode::new("TOP", Op::Top, AbsoluteX, 3, 4, 1),
    /* 0x1D */ Opcode::new("ORA", Op::Ora, AbsoluteX, 3, 4, 1),
    /* 0x1E */ Opcode::new("ASL", Op::Asl, AbsoluteX, 3, 7, 0),
    /* 0x1F */ Opcode::new("SLO", Op::Slo, AbsoluteX, 3, 7, 0),
    /* 0x20 */ Opcode::new("JSR", Op::Jsr, Absolute, 3, 6, 0),
    /* 0x21 */ Opcode::new("AND", Op::And, IndirectX, 2, 6, 0),
    /* 0x22 */ Opcode::new("x22", Op::Xxx, Implied, 0, 0, 0),
    /* 0x23 */ Opcode::new("RLA", Op::Rla, IndirectX, 2, 8, 0),
    /* 0x24 */ Opcode::new("BIT", Op::Bit, ZeroPage, 2, 3, 0),
    /* 0x25 */ Opcode::new("AND", Op::And, ZeroPage, 2, 3, 0),
    /* 0x26 */ Opcode::new("ROL", Op::Rol, ZeroPage, 2, 5, 0),
    /* 0x27 */ Opcode::new("RLA", Op::Rla, ZeroPage, 2, 5, 0),
    /* 0x28 */ Opcode::new("PLP", Op::Plp, Implied, 1, 4, 0),
    /* 0x29 */ Opcode::new("AND", Op::And, Immediate, 2, 2, 0),
    /* 0x2A */ Opcode::new("ROL", Op::RolA, Accumulator, 1, 2, 0),
    /* 0x2B */ Opcode::new("ANC", Op::Anc, Immediate, 2, 2, 0),
    /* 0x2C */ Opcode::new("BIT", Op::Bit, Absolute, 3, 4, 0),
    /* 0x2D */ Opcode::new("AND", Op::And, Absolute, 3, 4, 0),
    /* 0x2E */ Opcode::new("ROL", Op::Rol, Absolute, 3, 6, 0),
    /* 0x2F */ Opcode::new("RLA", Op::Rla, Absolute, 3, 6, 0),
    /* 0x30 */ Opcode::new("BMI", Op::Bmi, Relative, 2, 2, 0),
    /* 0x31 */ Opcode::new("AND", Op::And, IndirectY, 2, 5, 1),
    /* 0x32 */ Opcode::new("x32", Op::Xxx, Implied, 0, 0, 0),
    /* 0x33 */ Opcode::new("RLA", Op::Rla, IndirectY, 2, 8, 0),
    /* 0x34 */ Opcode::new("DOP", Op::Dop, ZeroPageX, 2, 4, 0),
    /* 0x35 */ Opcode::new("AND", Op::And, ZeroPageX, 2, 4, 0),
    /* 0x36 */ Opcode::new("ROL", Op::Rol, ZeroPageX, 2, 6, 0),
    /* 0x37 */ Opcode::new("RLA", Op::Rla, ZeroPageX, 2, 6, 0),
    /* 0x38 */ Opcode::new("SEC", Op::Sec, Implied, 1, 2, 0),
    /* 0x39 */ Opcode::new("AND", Op::And, AbsoluteY, 3, 4, 1),
    /* 0x3A */ Opcode::new("NOP", Op::Nop, Implied, 1, 2, 0),
    /* 0x3B */ Opcode::new("RLA", Op::Rla, AbsoluteY, 3, 7, 0),
    /* 0x3C */ Opcode::new("TOP", Op::Top, AbsoluteX, 3, 4, 1),
    /* 0x3D */ Opcode::new("AND", Op::And, AbsoluteX, 3, 4, 1),
    /* 0x3E */ Opcode::new("ROL", Op::Rol, AbsoluteX, 3, 7, 0),
    /* 0x3F */ Opcode::new("RLA", Op::Rla, AbsoluteX, 3, 7, 0),
    /* 0x40 */ Opcode::new("RTI", Op::Rti, Implied, 1, 6, 0),
    /* 0x41 */ Opcode::new("EOR", Op::Eor, IndirectX, 2, 6, 0),
    /* 0x42 */ Opcode::new("x42", Op::Xxx, Implied, 0, 0, 0),
    /* 0x43 */ Opcode::new("SRE", Op::Sre, IndirectX, 2, 8, 0),
    /* 0x44 */ Opcode::new("DOP", Op::Dop, ZeroPage, 2, 3, 0),
    /* 0x45 */ Opcode::new("EOR", Op::Eor, ZeroPage, 2, 3, 0),
    /* 0x46 */ Opcode::new("LSR", Op::Lsr, ZeroPage, 2, 5, 0),
    /* 0x47 */ Opcode::new("SRE", Op::Sre, ZeroPage, 2, 5, 0),
    /* 0x48 */ Opcode::new("PHA", Op::Pha, Implied, 1, 3, 0),
    /* 0x49 */ Opcode::new("EOR", Op::Eor, Immediate, 2, 2, 0),
    /* 0x4A */ Opcode::new("LSR", Op::LsrA, Accumulator, 1, 2, 0),
    /* 0x4B */ Opcode::new("ALR", Op::Alr, Immediate, 2, 2, 0),
    /* 0x4C */ Opcode::new("JMP", Op::Jmp, Absolute, 3, 3, 0),
    /* 0x4D */ Opcode::new("EOR", Op::Eor, Absolute, 3, 4, 0),
    /* 0x4E */ Opcode::new("LSR", Op::Lsr, Absolute, 3, 6, 0),
    /* 0x4F */ Opcode::new("SRE", Op::Sre, Absolute, 3, 6, 0),
    /* 0x50 */ Opcode::new("BVC", Op::Bvc, Relative, 2, 2, 0),
    /* 0x51 */ Opcode::new("EOR", Op::Eor, IndirectY, 2, 5, 1),
    /* 0x52 */ Opcode::new("x52", Op::Xxx, Implied, 0, 0, 0),
    /* 0x53 */ Opcode::new("SRE", Op::Sre, IndirectY, 2, 8, 0),
    /* 0x54 */ Opcode::new("DOP", Op::Dop, ZeroPageX, 2, 4, 0),
    /* 0x55 */ Opcode::new("EOR", Op::Eor, ZeroPageX, 2, 4, 0),
    /* 0x56 */ Opcode::new("LSR", Op::Lsr, ZeroPageX, 2, 6, 0),
    /* 0x57 */ Opcode::new("SRE", Op::Sre, ZeroPageX, 2, 6, 0),
    /* 0x58 */ Opcode::new("CLI", Op::Cli, Implied, 1, 2, 0),
    /* 0x59 */ Opcode::new("EOR", Op::Eor, AbsoluteY, 3, 4, 1),
    /* 0x5A */ Opcode::new("NOP", Op::Nop, Implied, 1, 2, 0),
    /* 0x5B */ Opcode::new("SRE", Op::Sre, AbsoluteY, 3, 7, 0),
    /* 0x5C */ Opcode::new("TOP", Op::Top, AbsoluteX, 3, 4, 1),
    /* 0x5D */ Opcode::new("EOR", Op::Eor, AbsoluteX, 3, 4, 1),
    /* 0x5E */ Opcode::new("LSR", Op::Lsr, AbsoluteX, 3, 7, 0),
    /* 0x5F */ Opcode::new("SRE", Op::Sre, AbsoluteX, 3, 7, 0),
    /* 0x60 */ Opcode::new("RTS", Op::Rts, Implied, 1, 6, 0),
    /* 0x61 */ Opcode::new("ADC", Op::Adc, IndirectX, 2, 6, 0),
    /* 0x62 */ Opcode::new("x62", Op::Xxx, Implied, 0, 0, 0),
    /* 0x63 */ Opcode::new("RRA", Op::Rra, IndirectX, 2, 8, 0),
    /* 0x64 */ Opcode::new("DOP", Op::Dop, ZeroPage, 2, 3, 0),
    /* 0x65 */ Opcode::new("ADC", Op::Adc, ZeroPage, 2, 3, 0),
    /* 0x66 */ Opcode::new("ROR", Op::Ror, ZeroPage, 2, 5, 0),
    /* 0x67 */ Opcode::new("RRA", Op::Rra, ZeroPage, 2, 5, 0),
    /* 0x68 */ Opcode::new("PLA", Op::Pla, Implied, 1, 4, 0),
    /* 0x69 */ Opcode::new("ADC", Op::Adc, Immediate, 2, 2, 0),
    /* 0x6A */ Opcode::new("ROR", Op::RorA, Accumulator, 1, 2, 0),
    /* 0x6B */ Opcode::new("ARR", Op::Arr, Immediate, 2, 2, 0),
    /* 0x6C */ Opcode::new("JMP", Op::Jmp, Indirect, 3, 5, 0),
    /* 0x6D */ Opcode::new("ADC", Op::Adc, Absolute, 3, 4, 0),
    /* 0x6E */ Opcode::new("ROR", Op::Ror, Absolute, 3, 6, 0),
    /* 0x6F */ Opcode::new("RRA", Op::Rra, Absolute, 3, 6, 0),
    /* 0x70 */ Opcode::new("BVS", Op::Bvs, Relative, 2, 2, 0),
    /* 0x71 */ Opcode::new("ADC", Op::Adc, IndirectY, 2, 5, 1),
    /* 0x72 */ Opcode::new("x72", Op::Xxx, Implied, 0, 0, 0),
    /* 0x73 */ Opcode::new("RRA", Op::Rra, IndirectY, 2, 8, 0),
    /* 0x74 */ Opcode::new("DOP", Op::Dop, ZeroPageX, 2, 4, 0),
    /* 0x75 */ Opcode::new("ADC", Op::Adc, ZeroPageX, 2, 4, 0),
    /* 0x76 */ Opcode::new("ROR", Op::Ror, ZeroPageX, 2, 6, 0),
    /* 0x77 */ Opcode::new("RRA", Op::Rra, ZeroPageX, 2, 6, 0),
    /* 0x78 */ Opcode::new("SEI", Op::Sei, Implied, 1, 2, 0),
    /* 0x79 */ Opcode::new("ADC", Op::Adc, AbsoluteY, 3, 4, 1),
    /* 0x7A */ Opcode::new("NOP", Op::Nop, Implied, 1, 2, 0),
    /* 0x7B */ Opcode::new("RRA", Op::Rra, AbsoluteY, 3, 7, 0),
    /* 0x7C */ Opcode::new("TOP", Op::Top, AbsoluteX, 3, 4, 1),
    /* 0x7D */ Opcode::new("ADC", Op::Adc, AbsoluteX, 3, 4, 1),
    /* 0x7E */ Opcode::new("ROR", Op::Ror, AbsoluteX, 3, 7, 0),
    /* 0x7F */ Opcode::new("RRA", Op::Rra, AbsoluteX, 3, 7, 0),
    /* 0x80 */ Opcode::new("DOP", Op::Dop, Immediate, 2, 2, 0),
    /* 0x81 */ Opcode::new("STA", Op::Sta, IndirectX, 2, 6, 0),
    /* 0x82 */ Opcode::new("DOP", Op::Dop, Immediate, 2, 2, 0),
    /* 0x83 */ Opcode::new("AAX", Op::Aax, IndirectX, 2, 6, 0),
    /* 0x84 */ Opcode::new("STY", Op::Sty, ZeroPage, 2, 3, 0),
    /* 0x85 */ Opcode::new("STA", Op::Sta, ZeroPage, 2, 3, 0),
    /* 0x86 */ Opcode::new("STX", Op::Stx, ZeroPage, 2, 3, 0),
    /* 0x87 */ Opcode::new("AAX", Op::Aax, ZeroPage, 2, 3, 0),
    /* 0x88 */ Opcode::new("DEY", Op::Dey, Implied, 1, 2, 0),
    /* 0x89 */ Opcode::new("DOP", Op::Dop, Immediate, 2, 2, 0),
    /* 0x8A */ Opcode::new("TXA", Op::Txa, Implied, 1, 2, 0),
    /* 0x8B */ Opcode::new("x8B", Op::Xxx, Implied, 0, 0, 0),
    /* 0x8C */ Opcode::new("STY", Op::Sty, Absolute, 3, 4, 0),
    /* 0x8D */ Opcode::new("STA", Op::Sta, Absolute, 3, 4, 0),
    /* 0x8E */ Opcode::new("STX", Op::Stx, Absolute, 3, 4, 0),
    /* 0x8F */ Opcode::new("AAX", Op::Aax, Absolute, 3, 4, 0),
    /* 0x90 */ Opcode::new("BCC", Op::Bcc, Relative, 2, 2, 0),
    /* 0x91 */ Opcode::new("STA", Op::Sta, IndirectY, 2, 6, 0),
    /* 0x92 */ Opcode::new("x92", Op::Xxx, Implied, 0, 0, 0),
    /* 0x93 */ Opcode::new("x93", Op::Xxx, Implied, 0, 0, 0),
    /* 0x94 */ Opcode::new("STY", Op::Sty, ZeroPageX, 2, 4, 0),
    /* 0x95 */ Opcode::new("STA", Op::Sta, ZeroPageX, 2, 4, 0),
    /* 0x96 */ Opcode::new("STX", Op::Stx, ZeroPageY, 2, 4, 0),
    /* 0x97 */ Opcode::new("AAX", Op::Aax, ZeroPageY, 2, 4, 0),
    /* 0x98 */ Opcode::new("TYA", Op::Tya, Implied, 1, 2, 0),
    /* 0x99 */ Opcode::new("STA", Op::Sta, AbsoluteY, 3, 5, 0),
    /* 0x9A */ Opcode::new("TXS", Op::Txs, Implied, 1, 2, 0),
    /* 0x9B */ Opcode::new("x9B", Op::Xxx, Implied, 0, 0, 0),
    /* 0x9C */ Opcode::new("x9C", Op::Xxx, Implied, 0, 0, 0),
    /* 0x9D */ Opcode::new("STA", Op::Sta, AbsoluteX, 3, 5, 0),
    /* 0x9E */ Opcode::new("x9E", Op::Xxx, Implied, 0, 0, 0),
    /* 0x9F */ Opcode::new("x9F", Op::Xxx, Implied, 0, 0, 0),
    /* 0xA0 */ Opcode::new("LDY", Op::Ldy, Immediate, 2, 2, 0),
    /* 0xA1 */ Opcode::new("LDA", Op::Lda, IndirectX, 2, 6, 0),
    /* 0xA2 */ Opcode::new("LDX", Op::Ldx, Immediate, 2, 2, 0),
    /* 0xA3 */ Opcode::new("LAX", Op::Lax, IndirectX, 2, 6, 0),
    /* 0xA4 */ Opcode::new("LDY", Op::Ldy, ZeroPage, 2, 3, 0),
    /* 0xA5 */ Opcode::new("LDA", Op::Lda, ZeroPage, 2, 3, 0),
    /* 0xA6 */ Opcode::new("LDX", Op::Ldx, ZeroPage, 2, 3, 0),
    /* 0xA7 */ Opcode::new("LAX", Op::Lax, ZeroPage, 2, 3, 0),
    /* 0xA8 */ Opcode::new("TAY", Op::Tay, Implied, 1, 2, 0),
    /* 0xA9 */ Opcode::new("LDA", Op::Lda, Immediate, 2, 2, 0),
    /* 0xAA */ Opcode::new("TAX", Op::Tax, Implied, 1, 2, 0),
    /* 0xAB */ Opcode::new("LXA", Op::Lxa, Immediate, 2, 2, 0),
    /* 0xAC */ Opcode::new("LDY", Op::Ldy, Absolute, 3, 4, 0),
    /* 0xAD */ Opcode::new("LDA", Op::Lda, Absolute, 3, 4, 0),
    /* 0xAE */ Opcode::new("LDX", Op::Ldx, Absolute, 3, 4, 0),
    /* 0xAF */ Opcode::new("LAX", Op::Lax, Absolute, 3, 4, 0),
    /* 0xB0 */ Opcode::new("BCS", Op::Bcs, Relative, 2, 2, 0),
    /* 0xB1 */ Opcode::new("LDA", Op::Lda, IndirectY, 2, 5, 1),
    /* 0xB2 */ Opcode::new("xB2", Op::Xxx, Implied, 0, 0, 0),
    /* 0xB3 */ Opcode::new("LAX", Op::Lax, IndirectY, 2, 5, 1),
    /* 0xB4 */ Opcode::new("LDY", Op::Ldy, ZeroPageX, 2, 4, 0),
    /* 0xB5 */ Opcode::new("LDA", Op::Lda, ZeroPageX, 2, 4, 0),
    /* 0xB6 */ Opcode::new("LDX", Op::Ldx, ZeroPageY, 2, 4, 0),
    /* 0xB7 */ Opcode::new("LAX", Op::Lax, ZeroPageY, 2, 4, 0),
    /* 0xB8 */ Opcode::new("CLV", Op::Clv, Implied, 1, 2, 0),
    /* 0xB9 */ Opcode::new("LDA", Op::Lda, AbsoluteY, 3, 4, 1),
    /* 0xBA */ Opcode::new("TSX", Op::Tsx, Implied, 1, 2, 0),
    /* 0xBB */ Opcode::new("xBB", Op::Xxx, Implied, 0, 0, 0),
    /* 0xBC */ Opcode::new("LDY", Op::Ldy, AbsoluteX, 3, 4, 1),
    /* 0xBD */ Opcode::new("LDA", Op::Lda, AbsoluteX, 3, 4, 1),
    /* 0xBE */ Opcode::new("LDX", Op::Ldx, AbsoluteY, 3, 4, 1),
    /* 0xBF */ Opcode::new("LAX", Op::Lax, AbsoluteY, 3, 4, 1),
    /* 0xC0 */ Opcode::new("CPY", Op::Cpy, Immediate, 2, 2, 0),
    /* 0xC1 */ Opcode::new("CMP", Op::Cmp, IndirectX, 2, 6, 0),
    /* 0xC2 */ Opcode::new("DOP", Op::Dop, Immediate, 2, 2, 0),
    /* 0xC3 */ Opcode::new("DCP", Op::Dcp, IndirectX, 2, 8, 0),
    /* 0xC4 */ Opcode::new("CPY", Op::Cpy, ZeroPage, 2, 3, 0),
    /* 0xC5 */ Opcode::new("CMP", Op::Cmp, ZeroPage, 2, 3, 0),
    /* 0xC6 */ Opcode::new("DEC", Op::Dec, ZeroPage, 2, 5, 0),
    /* 0xC7 */ Opcode::new("DCP", Op::Dcp, ZeroPage, 2, 5, 0),
    /* 0xC8 */ Opcode::new("INY", Op::Iny, Implied, 1, 2, 0),
    /* 0xC9 */ Opcode::new("CMP", Op::Cmp, Immediate, 2, 2, 0),
    /* 0xCA */ Opcode::new("DEX", Op::Dex, Implied, 1, 2, 0),
    /* 0xCB */ Opcode::new("SAX", Op::Sax, Immediate, 2, 2, 0),
    /* 0xCC */ Opcode::new("CPY", Op::Cpy, Absolute, 3, 4, 0),
    /* 0xCD */ Opcode::new("CMP", Op::Cmp, Absolute, 3, 4, 0),
    /* 0xCE */ Opcode::new("DEC", Op::Dec, Absolute, 3, 6, 0),
    /* 0xCF */ Opcode::new("DCP", Op::Dcp, Absolute, 3, 6, 0),
    /* 0xD0 */ Opcode::new("BNE", Op::Bne, Relative, 2, 2, 0),
    /* 0xD1 */ Opcode::new("CMP", Op::Cmp, IndirectY, 2, 5, 1),
    /* 0xD2 */ Opcode::new("xD2", Op::Xxx, Implied, 0, 0, 0),
    /* 0xD3 */ Opcode::new("DCP", Op::Dcp, IndirectY, 2, 8, 0),
    /* 0xD4 */ Opcode::new("DOP", Op::Dop, ZeroPageX, 2, 4, 0),
    /* 0xD5 */ Opcode::new("CMP", Op::Cmp, ZeroPageX, 2, 4, 0),
    /* 0xD6 */ Opcode::new("DEC", Op::Dec, ZeroPageX, 2, 6, 0),
    /* 0xD7 */ Opcode::new("DCP", Op::Dcp, ZeroPageX, 2, 6, 0),
    /* 0xD8 */ Opcode::new("CLD", Op::Cld, Implied, 1, 2, 0),
    /* 0xD9 */ Opcode::new("CMP", Op::Cmp, AbsoluteY, 3, 4, 1),
    /* 0xDA */ Opcode::new("NOP", Op::Nop, Implied, 1, 2, 0),
    /* 0xDB */ Opcode::new("DCP", Op::Dcp, AbsoluteY, 3, 7, 0),
    /* 0xDC */ Opcode::new("TOP", Op::Top, AbsoluteX, 3, 4, 1),
    /* 0xDD */ Opcode::new("CMP", Op::Cmp, AbsoluteX, 3, 4, 1),
    /* 0xDE */ Opcode::new("DEC", Op::Dec, AbsoluteX, 3, 7, 0),
    /* 0xDF */ Opcode::new("DCP", Op::Dcp, AbsoluteX, 3, 7, 0),
    /* 0xE0 */ Opcode::new("CPX", Op::Cpx, Immediate, 2, 2, 0),
    /* 0xE1 */ Opcode::new("SBC", Op::Sbc, IndirectX, 2, 6, 0),
    /* 0xE2 */ Opcode::new("DOP", Op::Dop, Immediate, 2, 2, 0),
    /* 0xE3 */ Opcode::new("ISC", Op::Isc, IndirectX, 2, 8, 0),
    /* 0xE4 */ Opcode::new("CPX", Op::Cpx, ZeroPage, 2, 3, 0),
    /* 0xE5 */ Opcode::new("SBC", Op::Sbc, ZeroPage, 2, 3, 0),
    /* 0xE6 */ Opcode::new("INC", Op::Inc, ZeroPage, 2, 5, 0),
    /* 0xE7 */ Opcode::new("ISC", Op::Isc, ZeroPage, 2, 5, 0),
    /* 0xE8 */ Opcode::new("INX", Op::Inx, Implied, 1, 2, 0),
    /* 0xE9 */ Opcode::new("SBC", Op::Sbc, Immediate, 2, 2, 0),
    /* 0xEA */ Opcode::new("NOP", Op::Nop, Implied, 1, 2, 0),
    /* 0xEB */ Opcode::new("SBC", Op::Sbc, Immediate, 2, 2, 0),
    /* 0xEC */ Opcode::new("CPX", Op::Cpx, Absolute, 3, 4, 0),
    /* 0xED */ Opcode::new("SBC", Op::Sbc, Absolute, 3, 4, 0),
    /* 0xEE */ Opcode::new("INC", Op::Inc, Absolute, 3, 6, 0),
    /* 0xEF */ Opcode::new("ISC", Op::Isc, Absolute, 3, 6, 0),
    /* 0xF0 */ Opcode::new("BEQ", Op::Beq, Relative, 2, 2, 0),
    /* 0xF1 */ Opcode::new("SBC", Op::Sbc, IndirectY, 2, 5, 1),
    /* 0xF2 */ Opcode::new("xF2", Op::Xxx, Implied, 0, 0, 0),
    /* 0xF3 */ Opcode::new("ISC", Op::Isc, IndirectY, 2, 8, 0),
    /* 0xF4 */ Opcode::new("DOP", Op::Dop, ZeroPageX, 2, 4, 0),
    /* 0xF5 */ Opcode::new("SBC", Op::Sbc, ZeroPageX, 2, 4, 0),
    /* 0xF6 */ Opcode::new("INC", Op::Inc, ZeroPageX, 2, 6, 0),
    /* 0xF7 */ Opcode::new("ISC", Op::Isc, ZeroPageX, 2, 6, 0),
    /* 0xF8 */ Opcode::new("SED", Op::Sed, Implied, 1, 2, 0),
    /* 0xF9 */ Opcode::new("SBC", Op::Sbc, AbsoluteY, 3, 4, 1),
    /* 0xFA */ Opcode::new("NOP", Op::Nop, Implied, 1, 2, 0),
    /* 0xFB */ Opcode::new("ISC", Op::Isc, AbsoluteY, 3, 7, 0),
    /* 0xFC */ Opcode::new("TOP", Op::Top, AbsoluteX, 3, 4, 1),
    /* 0xFD */ Opcode::new("SBC", Op::Sbc, AbsoluteX, 3, 4, 1),
    /* 0xFE */ Opcode::new("INC", Op::Inc, AbsoluteX, 3, 7, 0),
    /* 0xFF */ Opcode::new("ISC", Op::Isc, AbsoluteX, 3, 7, 0),
];

fn pages_equal(p1: u16, p2: u16) -> bool {
    p1 & 0xFF00 == p2 & 0xFF00
}

impl Nes {
    /// Runs the CPU for one step.
    ///
    /// Normally this is one instruction; a pending mapper IRQ is serviced
    /// first within the same step. Returns the total number of CPU cycles
    /// executed over the lifetime of the CPU.
    pub(crate) fn step_cpu(&mut self) -> Result<u64, NesError> {
        let mut cycles: u64 = 0;

        if !self.get_flag(FLAG_INTERRUPT) && self.mapper.take_irq() {
            cycles += self.interrupt();
        }

        let opcode = self.cpu_read(self.pc);
        let entry = &OPCODES[opcode as usize];

        if entry.size == 0 {
            return Err(NesError::InvalidOpcode {
                pc: self.pc,
                opcode,
            });
        }

        cycles += entry.cycles;

        let (addr, page_crossed) = self.resolve_addr(entry.mode);
        self.pc = self.pc.wrapping_add(entry.size);

        if page_crossed {
            cycles += entry.page_cycles;
        }

        cycles += self.execute(entry, addr)?;

        self.num_cycles += cycles;
        Ok(self.num_cycles)
    }

    /// Resolves the operand for the addressing mode of the instruction at
    /// PC. Returns the effective address and whether a page boundary was
    /// crossed. Called before PC is advanced past the instruction.
    fn resolve_addr(&mut self, mode: AddrMode) -> (u16, bool) {
        match mode {
            Accumulator | Implied => (0, false),
            Immediate => (self.pc.wrapping_add(1), false),
            ZeroPage => (self.cpu_read(self.pc.wrapping_add(1)) as u16, false),
            ZeroPageX => {
                let base = self.cpu_read(self.pc.wrapping_add(1));
                (base.wrapping_add(self.x) as u16, false)
            }
            ZeroPageY => {
                let base = self.cpu_read(self.pc.wrapping_add(1));
                (base.wrapping_add(self.y) as u16, false)
            }
            Absolute => (self.read_u16(self.pc.wrapping_add(1)), false),
            AbsoluteX => {
                let base = self.read_u16(self.pc.wrapping_add(1));
                let addr = base.wrapping_add(self.x as u16);
                (addr, !pages_equal(base, addr))
            }
            AbsoluteY => {
                let base = self.read_u16(self.pc.wrapping_add(1));
                let addr = base.wrapping_add(self.y as u16);
                (addr, !pages_equal(base, addr))
            }
            Indirect => {
                let ptr = self.read_u16(self.pc.wrapping_add(1));
                (self.read_u16_bug(ptr), false)
            }
            IndirectX => {
                let ptr = self.cpu_read(self.pc.wrapping_add(1)).wrapping_add(self.x);
                (self.read_u16_bug(ptr as u16), false)
            }
            IndirectY => {
                let ptr = self.cpu_read(self.pc.wrapping_add(1)) as u16;
                let base = self.read_u16_bug(ptr);
                let addr = base.wrapping_add(self.y as u16);
                (addr, !pages_equal(base, addr))
            }
            Relative => {
                let offset = self.cpu_read(self.pc.wrapping_add(1)) as i8;
                let addr = self.pc.wrapping_add(2).wrapping_add(offset as i16 as u16);
                (addr, false)
            }
        }
    }

    /// Runs an instruction's operation. Returns the extra cycles it
    /// consumed beyond the table values (branch penalties and write-side
    /// cycles).
    fn execute(&mut self, entry: &Opcode, addr: u16) -> Result<u64, NesError> {
        let cycles = match entry.op {
            Op::Adc => self.adc(addr),
            Op::Alr => self.alr(addr),
            Op::Anc => self.anc(addr),
            Op::And => self.and(addr),
            Op::Arr => self.arr(addr),
            Op::Asl => self.asl(addr),
            Op::AslA => self.asl_a(),
            Op::Sax => self.sax(addr),
            Op::Bcc => self.branch_if(!self.get_flag(FLAG_CARRY), addr),
            Op::Bcs => self.branch_if(self.get_flag(FLAG_CARRY), addr),
            Op::Beq => self.branch_if(self.get_flag(FLAG_ZERO), addr),
            Op::Bit => self.bit(addr),
            Op::Bmi => self.branch_if(self.get_flag(FLAG_NEGATIVE), addr),
            Op::Bne => self.branch_if(!self.get_flag(FLAG_ZERO), addr),
            Op::Bpl => self.branch_if(!self.get_flag(FLAG_NEGATIVE), addr),
            Op::Brk => self.brk(),
            Op::Bvc => self.branch_if(!self.get_flag(FLAG_OVERFLOW), addr),
            Op::Bvs => self.branch_if(self.get_flag(FLAG_OVERFLOW), addr),
            Op::Clc => {
                self.set_flag(FLAG_CARRY, false);
                0
            }
            Op::Cld => {
                self.set_flag(FLAG_DECIMAL, false);
                0
            }
            Op::Cli => {
                self.set_flag(FLAG_INTERRUPT, false);
                0
            }
            Op::Clv => {
                self.set_flag(FLAG_OVERFLOW, false);
                0
            }
            Op::Cmp => self.cmp(addr),
            Op::Cpx => {
                let value = self.cpu_read(addr);
                self.compare(self.x, value);
                0
            }
            Op::Cpy => {
                let value = self.cpu_read(addr);
                self.compare(self.y, value);
                0
            }
            Op::Dcp => self.dec(addr) + self.cmp(addr),
            Op::Dec => self.dec(addr),
            Op::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.update_zn(self.x);
                0
            }
            Op::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.update_zn(self.y);
                0
            }
            Op::Dop => 0,
            Op::Eor => self.eor(addr),
            Op::Inc => self.inc(addr),
            Op::Inx => {
                self.x = self.x.wrapping_add(1);
                self.update_zn(self.x);
                0
            }
            Op::Iny => {
                self.y = self.y.wrapping_add(1);
                self.update_zn(self.y);
                0
            }
            Op::Isc => self.inc(addr) + self.sbc(addr),
            Op::Jmp => {
                self.pc = addr;
                0
            }
            Op::Jsr => {
                self.push_u16(self.pc.wrapping_sub(1));
                self.pc = addr;
                0
            }
            Op::Lax | Op::Lxa => {
                self.a = self.cpu_read(addr);
                self.x = self.a;
                self.update_zn(self.a);
                0
            }
            Op::Lda => {
                self.a = self.cpu_read(addr);
                self.update_zn(self.a);
                0
            }
            Op::Ldx => {
                self.x = self.cpu_read(addr);
                self.update_zn(self.x);
                0
            }
            Op::Ldy => {
                self.y = self.cpu_read(addr);
                self.update_zn(self.y);
                0
            }
            Op::Lsr => self.lsr(addr),
            Op::LsrA => self.lsr_a(),
            Op::Nop => 0,
            Op::Ora => self.ora(addr),
            Op::Pha => {
                self.push(self.a);
                0
            }
            Op::Php => {
                self.push(self.p | FLAG_BREAK);
                0
            }
            Op::Pla => {
                self.a = self.pop();
                self.update_zn(self.a);
                0
            }
            Op::Plp => {
                self.plp();
                0
            }
            Op::Rla => self.rol(addr) + self.and(addr),
            Op::Rol => self.rol(addr),
            Op::RolA => {
                self.a = self.rol_value(self.a);
                0
            }
            Op::Ror => self.ror(addr),
            Op::RorA => {
                self.a = self.ror_value(self.a);
                0
            }
            Op::Rra => self.ror(addr) + self.adc(addr),
            Op::Rti => {
                self.plp();
                self.pc = self.pop_u16();
                0
            }
            Op::Rts => {
                self.pc = self.pop_u16().wrapping_add(1);
                0
            }
            Op::Aax => {
                let value = self.a & self.x;
                self.cpu_write(addr, value)
            }
            Op::Sbc => self.sbc(addr),
            Op::Sec => {
                self.set_flag(FLAG_CARRY, true);
                0
            }
            Op::Sed => {
                self.set_flag(FLAG_DECIMAL, true);
                0
            }
            Op::Sei => {
                self.set_flag(FLAG_INTERRUPT, true);
                0
            }
            Op::Slo => self.asl(addr) + self.ora(addr),
            Op::Sre => self.lsr(addr) + self.eor(addr),
            Op::Sta => self.cpu_write(addr, self.a),
            Op::Stx => self.cpu_write(addr, self.x),
            Op::Sty => self.cpu_write(addr, self.y),
            Op::Tax => {
                self.x = self.a;
                self.update_zn(self.x);
                0
            }
            Op::Tay => {
                self.y = self.a;
                self.update_zn(self.y);
                0
            }
            Op::Top => 0,
            Op::Tsx => {
                self.x = self.sp;
                self.update_zn(self.x);
                0
            }
            Op::Txa => {
                self.a = self.x;
                self.update_zn(self.a);
                0
            }
            Op::Txs => {
                self.sp = self.x;
                0
            }
            Op::Tya => {
                self.a = self.y;
                self.update_zn(self.a);
                0
            }
            Op::Xxx => {
                return Err(NesError::UnimplementedOpcode { name: entry.name });
            }
        };

        Ok(cycles)
    }

    fn adc(&mut self, addr: u16) -> u64 {
        let value = self.cpu_read(addr);
        self.add_with_carry(value);
        0
    }

    // SBC is ADC of the operand's complement; carry and overflow fall out
    // with the documented 6502 semantics.
    fn sbc(&mut self, addr: u16) -> u64 {
        let value = self.cpu_read(addr);
        self.add_with_carry(value ^ 0xFF);
        0
    }

    fn add_with_carry(&mut self, value: u8) {
        let carry = self.get_flag(FLAG_CARRY) as u16;
        let sum = self.a as u16 + value as u16 + carry;
        let result = sum as u8;

        self.set_flag(FLAG_CARRY, sum > 0xFF);
        self.set_flag(FLAG_OVERFLOW, (self.a ^ result) & (value ^ result) & 0x80 != 0);

        self.a = result;
        self.update_zn(self.a);
    }

    fn and(&mut self, addr: u16) -> u64 {
        let value = self.cpu_read(addr);
        self.a &= value;
        self.update_zn(self.a);
        0
    }

    fn ora(&mut self, addr: u16) -> u64 {
        let value = self.cpu_read(addr);
        self.a |= value;
        self.update_zn(self.a);
        0
    }

    fn eor(&mut self, addr: u16) -> u64 {
        let value = self.cpu_read(addr);
        self.a ^= value;
        self.update_zn(self.a);
        0
    }

    fn cmp(&mut self, addr: u16) -> u64 {
        let value = self.cpu_read(addr);
        self.compare(self.a, value);
        0
    }

    fn compare(&mut self, a: u8, m: u8) {
        let result = a.wrapping_sub(m);
        self.update_zn(result);
        self.set_flag(FLAG_CARRY, a >= m);
    }

    fn bit(&mut self, addr: u16) -> u64 {
        let value = self.cpu_read(addr);
        self.set_flag(FLAG_ZERO, self.a & value == 0);
        self.set_flag(FLAG_OVERFLOW, value & 0x40 != 0);
        self.set_flag(FLAG_NEGATIVE, value & 0x80 != 0);
        0
    }

    fn asl(&mut self, addr: u16) -> u64 {
        let value = self.cpu_read(addr);
        self.set_flag(FLAG_CARRY, value & 0x80 != 0);
        let result = value << 1;
        self.update_zn(result);
        self.cpu_write(addr, result)
    }

    fn asl_a(&mut self) -> u64 {
        self.set_flag(FLAG_CARRY, self.a & 0x80 != 0);
        self.a <<= 1;
        self.update_zn(self.a);
        0
    }

    fn lsr(&mut self, addr: u16) -> u64 {
        let value = self.cpu_read(addr);
        self.set_flag(FLAG_CARRY, value & 0x01 != 0);
        let result = value >> 1;
        self.update_zn(result);
        self.cpu_write(addr, result)
    }

    fn lsr_a(&mut self) -> u64 {
        self.set_flag(FLAG_CARRY, self.a & 0x01 != 0);
        self.a >>= 1;
        self.update_zn(self.a);
        0
    }

    fn rol(&mut self, addr: u16) -> u64 {
        let value = self.cpu_read(addr);
        let result = self.rol_value(value);
        self.cpu_write(addr, result)
    }

    fn rol_value(&mut self, value: u8) -> u8 {
        let carry_in = self.get_flag(FLAG_CARRY) as u8;
        self.set_flag(FLAG_CARRY, value & 0x80 != 0);
        let result = value << 1 | carry_in;
        self.update_zn(result);
        result
    }

    fn ror(&mut self, addr: u16) -> u64 {
        let value = self.cpu_read(addr);
        let result = self.ror_value(value);
        self.cpu_write(addr, result)
    }

    fn ror_value(&mut self, value: u8) -> u8 {
        let carry_in = if self.get_flag(FLAG_CARRY) { 0x80 } else { 0 };
        self.set_flag(FLAG_CARRY, value & 0x01 != 0);
        let result = value >> 1 | carry_in;
        self.update_zn(result);
        result
    }

    fn dec(&mut self, addr: u16) -> u64 {
        let value = self.cpu_read(addr).wrapping_sub(1);
        let cycles = self.cpu_write(addr, value);
        self.update_zn(value);
        cycles
    }

    fn inc(&mut self, addr: u16) -> u64 {
        let value = self.cpu_read(addr).wrapping_add(1);
        let cycles = self.cpu_write(addr, value);
        self.update_zn(value);
        cycles
    }

    fn plp(&mut self) {
        self.p = (self.pop() | FLAG_UNUSED) & !FLAG_BREAK;
    }

    fn brk(&mut self) -> u64 {
        self.push_u16(self.pc.wrapping_add(1));
        self.push(self.p | FLAG_BREAK);
        self.pc = self.read_u16(IRQ_VECTOR);
        self.set_flag(FLAG_INTERRUPT, true);
        0
    }

    fn branch_if(&mut self, condition: bool, addr: u16) -> u64 {
        if condition { self.do_branch(addr) } else { 0 }
    }

    // Taken branches cost one extra cycle, two when the target sits on a
    // different page than the next instruction.
    fn do_branch(&mut self, addr: u16) -> u64 {
        let mut cycles = 1;
        if !pages_equal(self.pc, addr) {
            cycles += 1;
        }
        self.pc = addr;
        cycles
    }

    fn anc(&mut self, addr: u16) -> u64 {
        let cycles = self.and(addr);
        let negative = self.get_flag(FLAG_NEGATIVE);
        self.set_flag(FLAG_CARRY, negative);
        cycles
    }

    fn alr(&mut self, addr: u16) -> u64 {
        self.and(addr) + self.lsr_a()
    }

    fn arr(&mut self, addr: u16) -> u64 {
        let value = self.cpu_read(addr);

        self.a = (self.a & value) >> 1;
        if self.get_flag(FLAG_CARRY) {
            self.a |= 0x80;
        }

        self.update_zn(self.a);
        self.set_flag(FLAG_CARRY, self.a >> 6 & 0x1 != 0);
        self.set_flag(FLAG_OVERFLOW, (self.a >> 6 ^ self.a >> 5) & 0x1 != 0);
        0
    }

    fn sax(&mut self, addr: u16) -> u64 {
        let value = self.cpu_read(addr);
        let and = self.a & self.x;

        self.set_flag(FLAG_CARRY, and >= value);
        self.x = and.wrapping_sub(value);
        self.update_zn(self.x);
        0
    }
}

#[cfg(test)]
mod tests {
    use super::super::cartridge::Cartridge;
    use super::super::mapper::Mirroring;
    use super::*;

    /// Console with `program` at $8000 and the reset vector pointing at
    /// it. One PRG bank, so $C000 mirrors $8000.
    fn nes_with_program(program: &[u8]) -> Nes {
        let mut cart = Cartridge::new(1, 1, 1, Mirroring::Horizontal, 0);
        cart.prg[0][..program.len()].copy_from_slice(program);
        cart.prg[0][0x3FFC] = 0x00;
        cart.prg[0][0x3FFD] = 0x80;

        let mut nes = Nes::new(cart).unwrap();
        nes.set_frame_pacing(false);
        nes
    }

    fn run(nes: &mut Nes, instructions: usize) {
        for _ in 0..instructions {
            nes.step_cpu().unwrap();
        }
    }

    #[test]
    fn lda_immediate_sets_zero_and_negative_flags() {
        let mut nes = nes_with_program(&[0xA9, 0x00, 0xA9, 0x80, 0xA9, 0x01]);

        nes.step_cpu().unwrap();
        assert!(nes.get_flag(FLAG_ZERO));
        assert!(!nes.get_flag(FLAG_NEGATIVE));

        nes.step_cpu().unwrap();
        assert_eq!(nes.a, 0x80);
        assert!(!nes.get_flag(FLAG_ZERO));
        assert!(nes.get_flag(FLAG_NEGATIVE));

        nes.step_cpu().unwrap();
        assert_eq!(nes.a, 0x01);
        assert!(!nes.get_flag(FLAG_ZERO));
        assert!(!nes.get_flag(FLAG_NEGATIVE));
    }

    #[test]
    fn php_plp_preserves_every_flag() {
        // SEC, SED, LDA #$80 (sets N), PHP, CLC, CLD, LDA #$01, PLP
        let mut nes =
            nes_with_program(&[0x38, 0xF8, 0xA9, 0x80, 0x08, 0x18, 0xD8, 0xA9, 0x01, 0x28]);

        run(&mut nes, 4);
        let saved = nes.p;

        run(&mut nes, 3);
        assert_ne!(nes.p, saved);

        nes.step_cpu().unwrap();
        assert_eq!(nes.p, saved);
    }

    #[test]
    fn pha_pla_round_trips_the_accumulator() {
        // LDA #$C3, PHA, LDA #$00, PLA
        let mut nes = nes_with_program(&[0xA9, 0xC3, 0x48, 0xA9, 0x00, 0x68]);

        run(&mut nes, 4);
        assert_eq!(nes.a, 0xC3);
        assert!(nes.get_flag(FLAG_NEGATIVE));
        assert!(!nes.get_flag(FLAG_ZERO));
    }

    #[test]
    fn adc_then_sbc_of_same_operand_restores_a() {
        for (a, m) in [(0x00u8, 0x00u8), (0x12, 0x34), (0x7F, 0x01), (0x40, 0x3F), (0x00, 0xFE)] {
            // LDA #a, SEC, ADC #m, SBC #m
            let mut nes = nes_with_program(&[0xA9, a, 0x38, 0x69, m, 0xE9, m]);

            run(&mut nes, 4);
            assert_eq!(nes.a, a, "a={a:02X} m={m:02X}");
            assert!(nes.get_flag(FLAG_CARRY), "a={a:02X} m={m:02X}");
        }
    }

    #[test]
    fn adc_sets_carry_and_overflow() {
        // LDA #$7F, CLC, ADC #$01
        let mut nes = nes_with_program(&[0xA9, 0x7F, 0x18, 0x69, 0x01]);
        run(&mut nes, 3);
        assert_eq!(nes.a, 0x80);
        assert!(nes.get_flag(FLAG_OVERFLOW));
        assert!(!nes.get_flag(FLAG_CARRY));
        assert!(nes.get_flag(FLAG_NEGATIVE));

        // LDA #$FF, CLC, ADC #$01
        let mut nes = nes_with_program(&[0xA9, 0xFF, 0x18, 0x69, 0x01]);
        run(&mut nes, 3);
        assert_eq!(nes.a, 0x00);
        assert!(!nes.get_flag(FLAG_OVERFLOW));
        assert!(nes.get_flag(FLAG_CARRY));
        assert!(nes.get_flag(FLAG_ZERO));
    }

    #[test]
    fn cmp_sets_flags_from_register_and_operand() {
        // LDA #$40, CMP #$40, CMP #$41, CMP #$3F
        let mut nes = nes_with_program(&[0xA9, 0x40, 0xC9, 0x40, 0xC9, 0x41, 0xC9, 0x3F]);

        run(&mut nes, 2);
        assert!(nes.get_flag(FLAG_ZERO));
        assert!(nes.get_flag(FLAG_CARRY));

        nes.step_cpu().unwrap();
        assert!(!nes.get_flag(FLAG_ZERO));
        assert!(!nes.get_flag(FLAG_CARRY));
        assert!(nes.get_flag(FLAG_NEGATIVE));

        nes.step_cpu().unwrap();
        assert!(!nes.get_flag(FLAG_ZERO));
        assert!(nes.get_flag(FLAG_CARRY));
    }

    #[test]
    fn indirect_jmp_reproduces_the_page_boundary_bug() {
        // Pointer at $02FF: low byte from $02FF, high byte from $0200
        // rather than $0300.
        let mut nes = nes_with_program(&[0x6C, 0xFF, 0x02]);
        nes.cpu_write(0x02FF, 0x34);
        nes.cpu_write(0x0200, 0x12);
        nes.cpu_write(0x0300, 0x56);

        nes.step_cpu().unwrap();
        assert_eq!(nes.pc, 0x1234);
    }

    #[test]
    fn indirect_x_wraps_within_the_zero_page() {
        // LDX #$04, LDA ($FE,X) -> pointer read from $02/$03
        let mut nes = nes_with_program(&[0xA2, 0x04, 0xA1, 0xFE]);
        nes.cpu_write(0x0002, 0x80);
        nes.cpu_write(0x0003, 0x02);
        nes.cpu_write(0x0280, 0x5A);

        run(&mut nes, 2);
        assert_eq!(nes.a, 0x5A);
    }

    #[test]
    fn indirect_y_adds_y_and_reports_page_cross() {
        // LDY #$80, LDA ($10),Y with pointer $02C0 -> $0340, crossing a
        // page: 2 + (5 + 1) cycles.
        let mut nes = nes_with_program(&[0xA0, 0x80, 0xB1, 0x10]);
        nes.cpu_write(0x0010, 0xC0);
        nes.cpu_write(0x0011, 0x02);
        nes.cpu_write(0x0340, 0x77);

        run(&mut nes, 2);
        assert_eq!(nes.a, 0x77);
        assert_eq!(nes.num_cycles, 8);
    }

    #[test]
    fn taken_branches_cost_extra_cycles() {
        // SEC (2), BCS +0 (2 + 1 taken, same page).
        let mut nes = nes_with_program(&[0x38, 0xB0, 0x00]);
        run(&mut nes, 2);
        assert_eq!(nes.num_cycles, 5);

        // CLC (2), BCS not taken (2).
        let mut nes = nes_with_program(&[0x18, 0xB0, 0x10]);
        run(&mut nes, 2);
        assert_eq!(nes.num_cycles, 4);
    }

    #[test]
    fn branch_across_a_page_boundary_costs_two_extra_cycles() {
        // Run the branch from RAM so it can sit right at a page edge:
        // BNE +2 at $02FD lands on $0301, off the page of $02FF.
        let mut nes = nes_with_program(&[0xA9, 0x01, 0x4C, 0xFD, 0x02]);
        nes.cpu_write(0x02FD, 0xD0);
        nes.cpu_write(0x02FE, 0x02);

        run(&mut nes, 3);
        assert_eq!(nes.pc, 0x0301);
        // LDA (2) + JMP (3) + BNE taken across a page (2 + 1 + 1).
        assert_eq!(nes.num_cycles, 9);
    }

    #[test]
    fn absolute_x_page_cross_adds_a_cycle_for_reads() {
        // LDX #$01, LDA $02FF,X -> crosses into $0300: 2 + 4 + 1.
        let mut nes = nes_with_program(&[0xA2, 0x01, 0xBD, 0xFF, 0x02]);
        nes.cpu_write(0x0300, 0x42);
        run(&mut nes, 2);
        assert_eq!(nes.a, 0x42);
        assert_eq!(nes.num_cycles, 7);

        // Stores never take the page-cross penalty: STA $02FF,X is 5.
        let mut nes = nes_with_program(&[0xA2, 0x01, 0x9D, 0xFF, 0x02]);
        run(&mut nes, 2);
        assert_eq!(nes.num_cycles, 7);
    }

    #[test]
    fn jsr_rts_round_trip() {
        // JSR $8006; $8003: LDA #$11; $8006: RTS
        let mut nes = nes_with_program(&[0x20, 0x06, 0x80, 0xA9, 0x11, 0x00, 0x60]);

        nes.step_cpu().unwrap();
        assert_eq!(nes.pc, 0x8006);

        nes.step_cpu().unwrap();
        assert_eq!(nes.pc, 0x8003);

        nes.step_cpu().unwrap();
        assert_eq!(nes.a, 0x11);
    }

    #[test]
    fn brk_vectors_through_fffe_and_sets_interrupt_disable() {
        let mut cart = Cartridge::new(1, 1, 1, Mirroring::Horizontal, 0);
        cart.prg[0][0x0000] = 0x00; // BRK
        cart.prg[0][0x3FFC] = 0x00; // reset vector -> $8000
        cart.prg[0][0x3FFD] = 0x80;
        cart.prg[0][0x3FFE] = 0x10; // IRQ/BRK vector -> $8010
        cart.prg[0][0x3FFF] = 0x80;
        let mut nes = Nes::new(cart).unwrap();
        nes.set_frame_pacing(false);
        let sp_before = nes.sp;

        nes.step_cpu().unwrap();
        assert_eq!(nes.pc, 0x8010);
        assert!(nes.get_flag(FLAG_INTERRUPT));
        assert_eq!(nes.sp, sp_before.wrapping_sub(3));
        assert_eq!(nes.num_cycles, 7);
    }

    #[test]
    fn invalid_opcode_fails_with_pc_and_opcode() {
        let mut nes = nes_with_program(&[0x02]);
        match nes.step_cpu() {
            Err(NesError::InvalidOpcode { pc: 0x8000, opcode: 0x02 }) => {}
            other => panic!("expected InvalidOpcode, got {other:?}"),
        }
    }

    #[test]
    fn next_instruction_bytes_reads_without_stepping() {
        let mut nes = nes_with_program(&[0xAD, 0x34, 0x12]);
        assert_eq!(nes.next_instruction_bytes().unwrap(), vec![0xAD, 0x34, 0x12]);
        assert_eq!(nes.pc, 0x8000);
        assert_eq!(nes.num_cycles, 0);
    }

    #[test]
    fn unofficial_lax_loads_a_and_x() {
        let mut nes = nes_with_program(&[0xA7, 0x20]);
        nes.cpu_write(0x0020, 0x9C);
        nes.step_cpu().unwrap();
        assert_eq!(nes.a, 0x9C);
        assert_eq!(nes.x, 0x9C);
        assert!(nes.get_flag(FLAG_NEGATIVE));
        assert_eq!(nes.num_cycles, 3);
    }

    #[test]
    fn unofficial_dcp_decrements_then_compares() {
        // LDA #$40, DCP $20 where $20 holds $41 -> memory $40, Z set.
        let mut nes = nes_with_program(&[0xA9, 0x40, 0xC7, 0x20]);
        nes.cpu_write(0x0020, 0x41);
        run(&mut nes, 2);
        assert_eq!(nes.cpu_read(0x0020), 0x40);
        assert!(nes.get_flag(FLAG_ZERO));
        assert!(nes.get_flag(FLAG_CARRY));
        assert_eq!(nes.num_cycles, 7);
    }

    #[test]
    fn unofficial_slo_shifts_then_ors() {
        // SLO $20 with $20 = $40 -> memory $80, A |= $80.
        let mut nes = nes_with_program(&[0xA9, 0x01, 0x07, 0x20]);
        nes.cpu_write(0x0020, 0x40);
        run(&mut nes, 2);
        assert_eq!(nes.cpu_read(0x0020), 0x80);
        assert_eq!(nes.a, 0x81);
    }

    #[test]
    fn rmw_on_absolute_x_never_adds_page_cross_cycles() {
        // LDX #$01, INC $02FF,X -> 2 + 7 cycles, no page penalty.
        let mut nes = nes_with_program(&[0xA2, 0x01, 0xFE, 0xFF, 0x02]);
        run(&mut nes, 2);
        assert_eq!(nes.num_cycles, 9);
        assert_eq!(nes.cpu_read(0x0300), 0x01);
    }

    #[test]
    fn stack_pushes_wrap_within_page_one() {
        let mut nes = nes_with_program(&[0xA9, 0xAB, 0x48]);
        nes.sp = 0x00;
        run(&mut nes, 2);
        assert_eq!(nes.cpu_read(0x0100), 0xAB);
        assert_eq!(nes.sp, 0xFF);
    }
}
