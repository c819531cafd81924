use supports_color::{Stream, on};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorMode {
    Rgb,        // True color (16M colors)
    Indexed256, // 256-color palette
}

impl ColorMode {
    /// Resolve a `--color-mode` / `ui.color_mode` value. `"auto"` and
    /// unknown values defer to detection.
    pub fn resolve(setting: &str, caps: &TerminalCapabilities) -> Self {
        match setting {
            "rgb" => ColorMode::Rgb,
            "256" => ColorMode::Indexed256,
            _ => caps.recommended_color_mode,
        }
    }
}

#[derive(Debug)]
pub struct TerminalCapabilities {
    pub supports_rgb: bool,
    pub is_terminal_app: bool,
    pub recommended_color_mode: ColorMode,
}

impl TerminalCapabilities {
    /// Detect terminal capabilities and recommend appropriate color mode
    pub fn detect() -> Self {
        let is_terminal_app = std::env::var("TERM_PROGRAM")
            .map(|v| v == "Apple_Terminal")
            .unwrap_or(false);

        let supports_rgb = on(Stream::Stdout)
            .map(|level| level.has_16m)
            .unwrap_or(false);

        Self::from_parts(supports_rgb, is_terminal_app)
    }

    fn from_parts(supports_rgb: bool, is_terminal_app: bool) -> Self {
        // Terminal.app garbles RGB escapes on older macOS releases
        let recommended_color_mode = if supports_rgb && !is_terminal_app {
            ColorMode::Rgb
        } else {
            ColorMode::Indexed256
        };

        Self {
            supports_rgb,
            is_terminal_app,
            recommended_color_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_detection() {
        let caps = TerminalCapabilities::detect();
        // Just ensure it doesn't panic
        println!("Detected capabilities: {:?}", caps);
    }

    #[test]
    fn test_recommendation() {
        assert_eq!(
            TerminalCapabilities::from_parts(true, false).recommended_color_mode,
            ColorMode::Rgb
        );
        assert_eq!(
            TerminalCapabilities::from_parts(true, true).recommended_color_mode,
            ColorMode::Indexed256
        );
        assert_eq!(
            TerminalCapabilities::from_parts(false, false).recommended_color_mode,
            ColorMode::Indexed256
        );
    }

    #[test]
    fn test_resolve_setting() {
        let caps = TerminalCapabilities::from_parts(true, false);
        assert_eq!(ColorMode::resolve("256", &caps), ColorMode::Indexed256);
        assert_eq!(ColorMode::resolve("rgb", &caps), ColorMode::Rgb);
        assert_eq!(ColorMode::resolve("auto", &caps), ColorMode::Rgb);
    }
}
