//! Reader display settings
//!
//! Held in memory for the lifetime of a session and never persisted.

use serde::{Deserialize, Serialize};

pub const MIN_FONT_SIZE: u8 = 12;
pub const MAX_FONT_SIZE: u8 = 24;
pub const MIN_BRIGHTNESS: u8 = 20;
pub const MAX_BRIGHTNESS: u8 = 100;

/// Font size, brightness and colour scheme for the reader
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    font_size: u8,
    brightness: u8,
    dark_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_size: 16,
            brightness: 100,
            dark_mode: false,
        }
    }
}

impl Settings {
    pub fn font_size(&self) -> u8 {
        self.font_size
    }

    /// Brightness in percent
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Set the font size, clamped to 12..=24
    pub fn set_font_size(&mut self, size: u8) {
        self.font_size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
    }

    /// Set the brightness, clamped to 20..=100
    pub fn set_brightness(&mut self, percent: u8) {
        self.brightness = percent.clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS);
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.font_size(), 16);
        assert_eq!(settings.brightness(), 100);
        assert!(!settings.dark_mode());
    }

    #[test]
    fn test_font_size_clamped() {
        let mut settings = Settings::default();
        settings.set_font_size(40);
        assert_eq!(settings.font_size(), MAX_FONT_SIZE);
        settings.set_font_size(2);
        assert_eq!(settings.font_size(), MIN_FONT_SIZE);
        settings.set_font_size(18);
        assert_eq!(settings.font_size(), 18);
    }

    #[test]
    fn test_brightness_clamped() {
        let mut settings = Settings::default();
        settings.set_brightness(0);
        assert_eq!(settings.brightness(), MIN_BRIGHTNESS);
        settings.set_brightness(250);
        assert_eq!(settings.brightness(), MAX_BRIGHTNESS);
    }

    #[test]
    fn test_toggle_dark_mode() {
        let mut settings = Settings::default();
        settings.toggle_dark_mode();
        assert!(settings.dark_mode());
        settings.toggle_dark_mode();
        assert!(!settings.dark_mode());
    }
}
