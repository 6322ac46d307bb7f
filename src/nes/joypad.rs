/// Snapshot of the eight standard controller buttons.
#[derive(Debug, Clone, Copy, Default)]
pub struct Buttons {
    pub a: bool,
    pub b: bool,
    pub select: bool,
    pub start: bool,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// A standard game controller.
///
/// The joypad performs no IO of its own; the host either registers a
/// key-sampling callback, which is invoked from the strobe write, or
/// pushes button state in with `set_buttons`.
pub struct Joypad {
    buttons: Buttons,
    read_keys: Option<Box<dyn FnMut() -> Buttons>>,
    index: u8,
    strobe: bool,
}

impl Joypad {
    pub fn new() -> Self {
        Self {
            buttons: Buttons::default(),
            read_keys: None,
            index: 0,
            strobe: false,
        }
    }

    pub fn set_read_keys<F>(&mut self, callback: F)
    where
        F: FnMut() -> Buttons + 'static,
    {
        self.read_keys = Some(Box::new(callback));
    }

    pub fn set_buttons(&mut self, buttons: Buttons) {
        self.buttons = buttons;
    }

    /// Reads the output register. While the strobe is high this always
    /// reports A; once it drops, successive reads walk A, B, Select,
    /// Start, Up, Down, Left, Right and wrap.
    pub fn read(&mut self) -> u8 {
        let pressed = if self.strobe {
            self.buttons.a
        } else {
            let pressed = match self.index {
                0 => self.buttons.a,
                1 => self.buttons.b,
                2 => self.buttons.select,
                3 => self.buttons.start,
                4 => self.buttons.up,
                5 => self.buttons.down,
                6 => self.buttons.left,
                _ => self.buttons.right,
            };
            self.index = (self.index + 1) & 0x7;
            pressed
        };

        pressed as u8
    }

    /// Writes the input register. Bit 0 is the strobe; the falling edge
    /// freezes button state for sequential reads.
    pub fn write(&mut self, value: u8) {
        self.index = 0;
        self.strobe = value & 0x1 != 0;

        if let Some(read_keys) = self.read_keys.as_mut() {
            self.buttons = read_keys();
        }
    }
}

impl Default for Joypad {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pressed(a: bool, start: bool, right: bool) -> Buttons {
        Buttons {
            a,
            start,
            right,
            ..Buttons::default()
        }
    }

    #[test]
    fn strobe_high_always_reports_a() {
        let mut joypad = Joypad::new();
        joypad.set_buttons(pressed(true, false, false));
        joypad.write(0x01);

        for _ in 0..12 {
            assert_eq!(joypad.read(), 1);
        }
    }

    #[test]
    fn strobe_low_walks_the_buttons_and_wraps() {
        let mut joypad = Joypad::new();
        joypad.set_buttons(pressed(true, true, true));
        joypad.write(0x01);
        joypad.write(0x00);

        let expected = [1, 0, 0, 1, 0, 0, 0, 1];
        for (i, &want) in expected.iter().enumerate() {
            assert_eq!(joypad.read(), want, "read {i}");
        }
        // Wrapped back to A.
        assert_eq!(joypad.read(), 1);
    }

    #[test]
    fn key_callback_is_sampled_on_write() {
        let mut joypad = Joypad::new();
        joypad.set_read_keys(|| pressed(false, true, false));

        joypad.write(0x01);
        joypad.write(0x00);

        assert_eq!(joypad.read(), 0); // A
        assert_eq!(joypad.read(), 0); // B
        assert_eq!(joypad.read(), 0); // Select
        assert_eq!(joypad.read(), 1); // Start
    }
}
