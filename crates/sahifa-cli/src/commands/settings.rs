//! Settings command handler
//!
//! Reader settings live only for one invocation; flags adjust them.

use anyhow::Result;

use sahifa_core::Settings;

use crate::output::Output;

/// Reader settings from command-line flags, clamped to the allowed ranges
pub fn from_flags(font_size: Option<u8>, brightness: Option<u8>, dark: bool) -> Settings {
    let mut settings = Settings::default();
    if let Some(size) = font_size {
        settings.set_font_size(size);
    }
    if let Some(percent) = brightness {
        settings.set_brightness(percent);
    }
    if dark {
        settings.toggle_dark_mode();
    }
    settings
}

pub fn show(settings: &Settings, output: &Output) -> Result<()> {
    output.print_settings(settings);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags_clamps() {
        let settings = from_flags(Some(30), Some(5), true);
        assert_eq!(settings.font_size(), 24);
        assert_eq!(settings.brightness(), 20);
        assert!(settings.dark_mode());
    }

    #[test]
    fn test_from_flags_defaults() {
        assert_eq!(from_flags(None, None, false), Settings::default());
    }
}
