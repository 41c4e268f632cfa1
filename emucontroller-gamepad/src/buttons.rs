//! 128-button bitfield

use crate::descriptor::BUTTON_COUNT;
use crate::error::GamepadError;

/// Buttons per group in the touched-group map
const GROUP_SIZE: usize = 16;

/// Pressed state of all buttons
///
/// Besides the bits themselves, tracks which 16-button groups have been
/// touched since the last [`Buttons::take_touched`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Buttons {
    bits: [u8; BUTTON_COUNT / 8],
    touched: u8,
}

impl Buttons {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set button `index` (0-based)
    pub fn set(&mut self, index: usize, pressed: bool) -> Result<(), GamepadError> {
        if index >= BUTTON_COUNT {
            return Err(GamepadError::ButtonOutOfRange(index));
        }
        self.write_bit(index, pressed);
        Ok(())
    }

    /// Press button `index` wrapped into the button range
    pub fn press_wrapping(&mut self, index: u64) {
        self.write_bit((index % BUTTON_COUNT as u64) as usize, true);
    }

    fn write_bit(&mut self, index: usize, pressed: bool) {
        let (byte, bit) = (index / 8, index % 8);
        if pressed {
            self.bits[byte] |= 1 << bit;
        } else {
            self.bits[byte] &= !(1 << bit);
        }
        self.touched |= 1 << (index / GROUP_SIZE);
    }

    pub fn is_pressed(&self, index: usize) -> bool {
        index < BUTTON_COUNT && self.bits[index / 8] & (1 << (index % 8)) != 0
    }

    /// Release everything
    pub fn clear(&mut self) {
        for (group, chunk) in self.bits.chunks(GROUP_SIZE / 8).enumerate() {
            if chunk.iter().any(|&b| b != 0) {
                self.touched |= 1 << group;
            }
        }
        self.bits = [0; BUTTON_COUNT / 8];
    }

    /// Indices of pressed buttons
    pub fn pressed(&self) -> impl Iterator<Item = usize> + '_ {
        (0..BUTTON_COUNT).filter(|&i| self.is_pressed(i))
    }

    /// Bit per 16-button group touched since the last call; resets the map
    pub fn take_touched(&mut self) -> u8 {
        std::mem::take(&mut self.touched)
    }

    /// Wire bytes, button 0 in bit 0 of byte 0
    pub fn as_bytes(&self) -> [u8; BUTTON_COUNT / 8] {
        self.bits
    }
}
