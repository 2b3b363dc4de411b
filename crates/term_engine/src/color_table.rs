use std::fmt::Display;

/// A 24-bit colour value.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    pub fn get_rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{Color: r={:02X}, g={:02X}, b={:02X}}}", self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from(value: (u8, u8, u8)) -> Self {
        Color::new(value.0, value.1, value.2)
    }
}

/// Palette index of the default foreground (near-white).
pub const DEFAULT_FOREGROUND: u8 = 7;
/// Palette index of the default background (black).
pub const DEFAULT_BACKGROUND: u8 = 0;

/// The xterm-256 colour cube uses a non-uniform first step.
const CUBE_STEPS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// The immutable 256-entry terminal palette:
/// 16 ANSI colours, a 6×6×6 colour cube and a 24-step grey ramp.
pub struct ColorTable {
    colors: [Color; 256],
}

impl ColorTable {
    pub fn new() -> Self {
        let mut colors = [Color::default(); 256];

        // normal
        colors[0] = Color::new(0, 0, 0);
        colors[1] = Color::new(210, 0, 0);
        colors[2] = Color::new(0, 210, 0);
        colors[3] = Color::new(210, 210, 0);
        colors[4] = Color::new(0, 0, 240);
        colors[5] = Color::new(210, 0, 210);
        colors[6] = Color::new(0, 210, 210);
        colors[7] = Color::new(235, 235, 235);

        // bright
        colors[8] = Color::new(127, 127, 127);
        colors[9] = Color::new(255, 0, 0);
        colors[10] = Color::new(0, 255, 0);
        colors[11] = Color::new(255, 255, 0);
        colors[12] = Color::new(92, 92, 255);
        colors[13] = Color::new(255, 0, 255);
        colors[14] = Color::new(0, 255, 255);
        colors[15] = Color::new(255, 255, 255);

        // colour cube
        let mut i = 16;
        for r in CUBE_STEPS {
            for g in CUBE_STEPS {
                for b in CUBE_STEPS {
                    colors[i] = Color::new(r, g, b);
                    i += 1;
                }
            }
        }

        // greyscale ramp
        for step in 0..24u16 {
            let v = (8 + step * 10) as u8;
            colors[i] = Color::new(v, v, v);
            i += 1;
        }
        debug_assert_eq!(256, i);

        ColorTable { colors }
    }

    pub fn at(&self, index: u8) -> Color {
        self.colors[index as usize]
    }

    pub fn default_foreground(&self) -> Color {
        self.at(DEFAULT_FOREGROUND)
    }

    pub fn default_background(&self) -> Color {
        self.at(DEFAULT_BACKGROUND)
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        ColorTable::new()
    }
}

lazy_static::lazy_static! {
    /// The process-wide palette. Immutable, safe to share.
    pub static ref COLOR_TABLE: ColorTable = ColorTable::new();
}
