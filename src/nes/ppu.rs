use super::mapper::{Mapper, Mirroring};
use super::palette::SYSTEM_PALETTE;

pub const FRAME_WIDTH: usize = 256;
pub const FRAME_HEIGHT: usize = 240;

const BACKGROUND_PALETTE_ADDRESS: u16 = 0x3F00;
const SPRITE_PALETTE_ADDRESS: u16 = 0x3F10;

type Rgb = [u8; 3];

/// The picture processing unit.
///
/// Rendering is strip-based: background tiles are decoded eight pixels at
/// a time into a 16-slot strip buffer that is consumed one pixel per tick
/// (offset by fine X), and the sprites for the next scanline are decoded
/// into a full 256-wide foreground line at tick 257.
pub struct Ppu {
    frame: u64,
    scanline: u16,
    tick: u16,
    num_cycles: u64,

    ram: [u8; 16384],
    oam: [u8; 256],

    // $2000 control register.
    sprite_table_address: u16,
    background_table_address: u16,
    increment_by_32: bool,
    large_sprites: bool,
    nmi_on_vblank: bool,

    // $2001 mask register.
    clip_background: bool,
    clip_sprites: bool,
    show_background: bool,
    show_sprites: bool,

    // $2002 status flags.
    sprite_overflow: bool,
    sprite0_hit: bool,
    vblank: bool,

    // Internal scroll registers: current VRAM address, temporary address,
    // fine X, and the shared first/second write toggle.
    v: u16,
    t: u16,
    x: u8,
    w: u8,

    oam_addr: u8,
    read_buffer: u8,
    nmi_pending: bool,

    // One full scanline of decoded sprite pixels for the line being
    // rendered, plus the 16-pixel background strip buffer.
    fg_pixels: [Option<Rgb>; 256],
    fg_is_sprite0: [bool; 256],
    fg_in_front: [bool; 256],
    bg_pixels: [Option<Rgb>; 16],

    frame_buffer: [u8; FRAME_WIDTH * FRAME_HEIGHT * 4],
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            frame: 0,
            scanline: 241,
            tick: 0,
            num_cycles: 0,
            ram: [0; 16384],
            oam: [0; 256],
            sprite_table_address: 0x0000,
            background_table_address: 0x0000,
            increment_by_32: false,
            large_sprites: false,
            nmi_on_vblank: false,
            clip_background: false,
            clip_sprites: false,
            show_background: true,
            show_sprites: false,
            sprite_overflow: false,
            sprite0_hit: false,
            vblank: false,
            v: 0,
            t: 0,
            x: 0,
            w: 0,
            oam_addr: 0,
            read_buffer: 0,
            nmi_pending: false,
            fg_pixels: [None; 256],
            fg_is_sprite0: [false; 256],
            fg_in_front: [false; 256],
            bg_pixels: [None; 16],
            frame_buffer: [0; FRAME_WIDTH * FRAME_HEIGHT * 4],
        }
    }

    /// Runs the PPU for one tick. Returns true when the frame buffer has
    /// just been completed and should be presented.
    pub(crate) fn step(&mut self, mapper: &mut dyn Mapper) -> bool {
        self.increment_tick();

        let mut frame_ready = false;

        let is_rendering = self.show_background || self.show_sprites;
        let is_visible = self.scanline <= 239;
        let is_vblank_line = self.scanline == 241;
        let is_prerender = self.scanline == 261;
        let in_pipeline_column =
            (1..=256).contains(&self.tick) || (321..=336).contains(&self.tick);

        if is_rendering && is_visible && in_pipeline_column {
            self.draw_pixel(mapper);
        }

        if is_rendering && (is_visible || is_prerender) && in_pipeline_column && self.tick % 8 == 0
        {
            self.load_tile(mapper);

            if self.tick == 256 {
                // Horizontal bits are reloaded from t at tick 257.
                self.increment_y();
            } else {
                self.increment_coarse_x();
            }
        }

        if is_vblank_line && self.tick == 1 {
            self.vblank = true;
            if self.nmi_on_vblank {
                self.nmi_pending = true;
            }
            // The VBlank tick of the truncated power-on frame sets the
            // flag but delivers no image; the first real frame lands one
            // full frame after reset.
            frame_ready = self.frame > 0;
        } else if is_prerender && self.tick == 1 {
            self.vblank = false;
            self.sprite_overflow = false;
            self.sprite0_hit = false;
        }

        if is_rendering && (is_visible || is_prerender) && self.tick == 257 {
            // The pre-render reload targets a line past the bottom of the
            // screen, leaving the buffer empty for scanline 0.
            self.load_sprites(mapper);
        }

        // Scanline-counting mappers are clocked late in every rendered line.
        if is_rendering && (is_visible || is_prerender) && self.tick == 260 {
            mapper.next_scanline();
        }

        if is_rendering {
            if (is_visible || is_prerender) && self.tick == 257 {
                self.copy_horizontal_bits();
            } else if is_prerender && (280..=304).contains(&self.tick) {
                self.copy_vertical_bits();
            }
        }

        self.num_cycles += 1;
        frame_ready
    }

    fn increment_tick(&mut self) {
        self.tick += 1;

        let is_odd_frame = self.frame & 0x1 != 0;
        let is_rendering = self.show_background || self.show_sprites;

        // Odd frames drop one pre-render tick, but only while rendering.
        if self.scanline == 261
            && (self.tick == 341 || (self.tick == 340 && is_odd_frame && is_rendering))
        {
            self.scanline = 0;
            self.tick = 0;
            self.frame += 1;
        } else if self.tick == 341 {
            self.scanline += 1;
            self.tick = 0;
        }
    }

    pub(crate) fn num_cycles(&self) -> u64 {
        self.num_cycles
    }

    pub(crate) fn take_nmi(&mut self) -> bool {
        let pending = self.nmi_pending;
        self.nmi_pending = false;
        pending
    }

    pub fn frame_buffer(&self) -> &[u8] {
        &self.frame_buffer
    }

    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    pub fn debug_peek_oam(&self, index: usize) -> u8 {
        self.oam[index % self.oam.len()]
    }

    /// $2000: control register.
    pub(crate) fn set_control(&mut self, value: u8) {
        // t: ...BA.. ........ = d: ......BA
        self.t = self.t & 0x73FF | ((value as u16 & 0x3) << 10);

        self.increment_by_32 = value & 0x04 != 0;
        self.sprite_table_address = if value & 0x08 != 0 { 0x1000 } else { 0x0000 };
        self.background_table_address = if value & 0x10 != 0 { 0x1000 } else { 0x0000 };
        self.large_sprites = value & 0x20 != 0;
        self.nmi_on_vblank = value & 0x80 != 0;
    }

    /// $2001: mask register.
    pub(crate) fn set_mask(&mut self, value: u8) {
        self.clip_background = value & 0x02 == 0;
        self.clip_sprites = value & 0x04 == 0;
        self.show_background = value & 0x08 != 0;
        self.show_sprites = value & 0x10 != 0;
    }

    /// $2002: status register. Reading clears the VBlank flag and resets
    /// the write toggle.
    pub(crate) fn read_status(&mut self) -> u8 {
        let mut result = 0;

        if self.sprite_overflow {
            result |= 0x20;
        }
        if self.sprite0_hit {
            result |= 0x40;
        }
        if self.vblank {
            result |= 0x80;
            self.vblank = false;
        }

        self.w = 0;
        result
    }

    /// $2003: sprite memory address.
    pub(crate) fn set_oam_address(&mut self, value: u8) {
        self.oam_addr = value;
    }

    /// $2004 write: store at the sprite address, then increment it.
    pub(crate) fn write_oam(&mut self, value: u8) {
        self.oam[self.oam_addr as usize] = value;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    /// $2004 read.
    pub(crate) fn read_oam(&self) -> u8 {
        self.oam[self.oam_addr as usize]
    }

    /// $2005: scroll register, written twice.
    pub(crate) fn write_scroll(&mut self, value: u8) {
        if self.w == 0 {
            // t: ....... ...HGFED = d: HGFED...
            // x:              CBA = d: .....CBA
            self.t = (self.t & 0xFFE0) | ((value as u16 & 0xF8) >> 3);
            self.x = value & 0x7;
            self.w = 1;
        } else {
            // t: CBA..HG FED..... = d: HGFEDCBA
            self.t =
                (self.t & 0x0C1F) | ((value as u16 & 0x7) << 12) | ((value as u16 & 0xF8) << 2);
            self.w = 0;
        }
    }

    /// $2006: data address register, written twice.
    pub(crate) fn write_address(&mut self, value: u8) {
        if self.w == 0 {
            // t: .FEDCBA ........ = d: ..FEDCBA, top bit cleared
            self.t = (self.t & 0x00FF) | ((value as u16 & 0x3F) << 8);
            self.t &= 0x7FFF;
            self.w = 1;
        } else {
            // t: ....... HGFEDCBA = d: HGFEDCBA, then v = t
            self.t = (self.t & 0xFF00) | value as u16;
            self.v = self.t;
            self.w = 0;
        }
    }

    /// $2007 write.
    pub(crate) fn write_data(&mut self, value: u8, mapper: &mut dyn Mapper) {
        self.write(mapper, self.v, value);
        self.increment_data_address();
    }

    /// $2007 read. Reads below the palette region go through the internal
    /// read buffer and return the previously latched value.
    pub(crate) fn read_data(&mut self, mapper: &mut dyn Mapper) -> u8 {
        let previous = self.read_buffer;
        self.read_buffer = self.read(mapper, self.v);

        let result = if self.v & 0x3FFF <= 0x3EFF {
            previous
        } else {
            self.read_buffer
        };

        self.increment_data_address();
        result
    }

    fn increment_data_address(&mut self) {
        if self.increment_by_32 {
            self.v = self.v.wrapping_add(32);
        } else {
            self.v = self.v.wrapping_add(1);
        }
    }

    fn draw_pixel(&mut self, mapper: &mut dyn Mapper) {
        // Pop the background pixel at fine X and move the strip along.
        let bg_pixel = self.bg_pixels[self.x as usize];
        self.bg_pixels.copy_within(self.x as usize + 1.., self.x as usize);

        let x = (self.tick - 1) as usize;
        if x > 255 {
            // Prefetch columns only shift the strip buffer.
            return;
        }

        let show_sprites = x >= 8 || !self.clip_sprites;
        let show_background = x >= 8 || !self.clip_background;
        let is_border = x < 8 || x > 247 || self.scanline < 8 || self.scanline > 231;

        let fg_pixel = self.fg_pixels[x];

        let colour = if is_border {
            SYSTEM_PALETTE[0x3F]
        } else {
            match (fg_pixel, bg_pixel) {
                (Some(fg), bg) if show_sprites && (self.fg_in_front[x] || bg.is_none()) => fg,
                (_, Some(bg)) if show_background => bg,
                _ => {
                    let universal = self.read(mapper, BACKGROUND_PALETTE_ADDRESS) & 0x3F;
                    SYSTEM_PALETTE[universal as usize]
                }
            }
        };

        if show_sprites
            && show_background
            && fg_pixel.is_some()
            && bg_pixel.is_some()
            && self.fg_is_sprite0[x]
            && x < 255
        {
            self.sprite0_hit = true;
        }

        let offset = (self.scanline as usize * FRAME_WIDTH + x) * 4;
        self.frame_buffer[offset..offset + 3].copy_from_slice(&colour);
        self.frame_buffer[offset + 3] = 0xFF;
    }

    fn load_tile(&mut self, mapper: &mut dyn Mapper) {
        // Attribute bits for the tile's quadrant.
        let attribute_address =
            0x23C0 | (self.v & 0x0C00) | ((self.v >> 4) & 0x38) | ((self.v >> 2) & 0x07);
        let shift = (self.v & 0x2) | ((self.v & 0x40) >> 4);
        let attribute_bits = (self.read(mapper, attribute_address) >> shift) & 0x3;

        let pattern_index = self.read(mapper, 0x2000 | (self.v & 0x0FFF));

        let fine_y = ((self.v & 0x7000) >> 12) as i32;
        let strip = self.pixel_strip(mapper, pattern_index, attribute_bits as u16, false, fine_y);
        self.bg_pixels[8..].copy_from_slice(&strip);
    }

    fn increment_coarse_x(&mut self) {
        if self.v & 0x001F == 31 {
            // Coarse X wraps into the next horizontal nametable.
            self.v &= !0x001F;
            self.v ^= 0x0400;
        } else {
            self.v += 1;
        }
    }

    fn increment_y(&mut self) {
        if self.v & 0x7000 != 0x7000 {
            self.v += 0x1000;
            return;
        }

        self.v &= !0x7000;
        let mut y = (self.v & 0x03E0) >> 5;

        if y == 29 {
            // Last tile row, wrap and switch the vertical nametable.
            y = 0;
            self.v ^= 0x0800;
        } else if y == 31 {
            // Out-of-bounds coarse Y wraps without the nametable switch.
            y = 0;
        } else {
            y += 1;
        }

        self.v = (self.v & !0x03E0) | (y << 5);
    }

    fn copy_horizontal_bits(&mut self) {
        // v: ....F.. ...EDCBA = t: ....F.. ...EDCBA
        self.v = (self.v & 0xFBE0) | (self.t & !0xFBE0);
    }

    fn copy_vertical_bits(&mut self) {
        // v: IHGF.ED CBA..... = t: IHGF.ED CBA.....
        self.v = (self.v & 0x041F) | (self.t & !0x041F);
    }

    /// Decodes the sprites overlapping the next scanline into the
    /// foreground line buffer. At most eight sprites are taken; any ninth
    /// sets the overflow flag. Earlier sprites win overlapping pixels.
    fn load_sprites(&mut self, mapper: &mut dyn Mapper) {
        self.fg_pixels = [None; 256];
        self.fg_is_sprite0 = [false; 256];
        self.fg_in_front = [false; 256];

        if !self.show_sprites || self.scanline == 0 {
            return;
        }

        let sprite_height: i32 = if self.large_sprites { 16 } else { 8 };
        let target = self.scanline as i32 + 1;

        let mut num_sprites = 0;
        for i in (0..self.oam.len()).step_by(4) {
            let y = self.oam[i] as i32 + 1;
            let x = self.oam[i + 3] as usize;

            if y >= 0xF0 || target < y || target >= y + sprite_height {
                continue;
            }

            num_sprites += 1;
            if num_sprites > 8 {
                self.sprite_overflow = true;
                break;
            }

            let mut y_offset = target - y;
            let pattern_index = self.oam[i + 1];
            let attributes = self.oam[i + 2];
            let flip_h = attributes & 0x40 != 0;
            let flip_v = attributes & 0x80 != 0;
            let in_front = attributes & 0x20 == 0;

            if flip_v {
                y_offset = sprite_height - 1 - y_offset;
            }

            let palette_bits = (attributes & 0x3) as u16;
            let strip = self.pixel_strip(mapper, pattern_index, palette_bits, true, y_offset);

            for k in 0..8usize {
                let pk = if flip_h { 7 - k } else { k };

                if x + k > 0xFF {
                    break;
                }

                // Only paint into still-empty slots; earlier sprites win.
                let pos = x + k;
                if self.fg_pixels[pos].is_none() && strip[pk].is_some() {
                    self.fg_pixels[pos] = strip[pk];
                    if i == 0 {
                        self.fg_is_sprite0[pos] = true;
                    }
                    self.fg_in_front[pos] = in_front;
                }
            }
        }
    }

    /// Decodes one 8-pixel row of a tile into resolved colours, with
    /// transparent pixels as None.
    fn pixel_strip(
        &mut self,
        mapper: &mut dyn Mapper,
        pattern_index: u8,
        attribute_bits: u16,
        is_foreground: bool,
        y_offset: i32,
    ) -> [Option<Rgb>; 8] {
        let mut pattern_index = pattern_index;
        let mut y_offset = y_offset;

        let (base_address, base_palette_address, show_pixels) = if is_foreground {
            let base_address = if self.large_sprites {
                // 8x16 sprites take their table from bit 0 of the index.
                let base = if pattern_index & 0x1 == 0 { 0x0000 } else { 0x1000 };
                if y_offset > 7 {
                    pattern_index |= 0x1;
                    y_offset -= 8;
                } else {
                    pattern_index &= !0x1;
                }
                base
            } else {
                self.sprite_table_address
            };
            (base_address, SPRITE_PALETTE_ADDRESS, self.show_sprites)
        } else {
            (
                self.background_table_address,
                BACKGROUND_PALETTE_ADDRESS,
                self.show_background,
            )
        };

        let row_address = base_address + pattern_index as u16 * 16 + y_offset as u16;
        let low = self.read(mapper, row_address);
        let high = self.read(mapper, row_address + 8);

        let mut result = [None; 8];
        for (i, slot) in result.iter_mut().enumerate() {
            let low_bit = (low >> (7 - i)) & 0x1;
            let high_bit = (high >> (7 - i)) & 0x1;
            let index = ((high_bit << 1) | low_bit) as u16;

            if index == 0 || !show_pixels {
                continue;
            }

            let palette_index =
                self.read(mapper, base_palette_address + (attribute_bits << 2) + index) & 0x3F;
            *slot = Some(SYSTEM_PALETTE[palette_index as usize]);
        }

        result
    }

    /// Folds a PPU address: 14-bit mask, sprite palette mirrors, and
    /// nametable mirroring per the cartridge's mode.
    fn map_address(&self, address: u16, mirroring: Mirroring) -> u16 {
        let mut address = address & 0x3FFF;

        if address == 0x3F10 || address == 0x3F14 || address == 0x3F18 || address == 0x3F1C {
            address -= 0x10;
        } else if (0x2000..=0x2FFF).contains(&address) {
            match mirroring {
                Mirroring::Horizontal => {
                    if (0x2400..0x2800).contains(&address) || (0x2C00..0x3000).contains(&address) {
                        address -= 0x400;
                    }
                }
                Mirroring::Vertical => {
                    if (0x2800..0x3000).contains(&address) {
                        address -= 0x800;
                    }
                }
                Mirroring::SingleLow => address = 0x2000 | (address & 0x3FF),
                Mirroring::SingleHigh => address = 0x2400 | (address & 0x3FF),
                Mirroring::FourScreen => {}
            }
        }

        address
    }

    fn read(&mut self, mapper: &mut dyn Mapper, address: u16) -> u8 {
        let address = self.map_address(address, mapper.mirroring());

        if address < 0x2000 {
            mapper.ppu_read(address)
        } else {
            self.ram[address as usize]
        }
    }

    fn write(&mut self, mapper: &mut dyn Mapper, address: u16, value: u8) {
        let address = self.map_address(address, mapper.mirroring());

        if address < 0x2000 {
            mapper.ppu_write(address, value);
        } else {
            self.ram[address as usize] = value;
        }
    }
}
