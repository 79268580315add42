//! Dashboard colours.

use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub primary: Color,
    pub secondary: Color,
    pub primary_background: Color,
    pub accent: Color,
    pub warning: Color,
    pub error: Color,
    pub success: Color,
    pub foreground: Color,
    pub background: Color,
    pub surface: Color,
}

impl Theme {
    pub const fn dark() -> Self {
        Self {
            primary: Color::from_u32(0x00ffff),
            secondary: Color::from_u32(0x008888),
            primary_background: Color::from_u32(0x225555),
            accent: Color::from_u32(0xffaa22),
            warning: Color::from_u32(0xffdd00),
            error: Color::from_u32(0xff0000),
            success: Color::from_u32(0x00ff00),
            foreground: Color::from_u32(0xeeeeee),
            background: Color::from_u32(0x111111),
            surface: Color::from_u32(0x222222),
        }
    }

    /// Colour for a utilization percentage: green, then yellow from 60%,
    /// red from 85%.
    pub fn load(&self, percent: f64) -> Color {
        if percent >= 85.0 {
            self.error
        } else if percent >= 60.0 {
            self.warning
        } else {
            self.success
        }
    }

    /// Darken a color by blending with black
    /// factor should be between 0.0 (no change) and 1.0 (black)
    pub fn darken(color: Color, factor: f32) -> Color {
        let factor = factor.clamp(0.0, 1.0);
        match color {
            Color::Rgb(r, g, b) => {
                let r = r as f32 * (1.0 - factor);
                let g = g as f32 * (1.0 - factor);
                let b = b as f32 * (1.0 - factor);
                Color::Rgb(r as u8, g as u8, b as u8)
            }
            _ => color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_darken() {
        let white = Color::Rgb(255, 255, 255);
        let darkened = Theme::darken(white, 0.5);
        assert_eq!(darkened, Color::Rgb(127, 127, 127));
        assert_eq!(Theme::darken(Color::Red, 0.5), Color::Red);
    }

    #[test]
    fn load_thresholds() {
        let theme = Theme::dark();
        assert_eq!(theme.load(0.0), theme.success);
        assert_eq!(theme.load(59.9), theme.success);
        assert_eq!(theme.load(60.0), theme.warning);
        assert_eq!(theme.load(85.0), theme.error);
        assert_eq!(theme.load(100.0), theme.error);
    }
}
