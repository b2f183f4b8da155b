use serde::{Deserialize, Serialize};

/// Linear RGB colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };
    /// `#FFA500`
    pub const ORANGE: Color = Color {
        r: 1.0,
        g: 165.0 / 255.0,
        b: 0.0,
    };
    /// `#00008B`
    pub const DARK_BLUE: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 139.0 / 255.0,
    };

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
        }
    }

    pub fn lerp(self, other: Color, t: f32) -> Self {
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }
}

/// Light colour for an hour of the day. Dawn and dusk blend through orange,
/// night is dark blue.
pub fn color_for_hour(hour: u8) -> Color {
    let h = f32::from(hour);
    match hour {
        5..=6 => Color::ORANGE.lerp(Color::WHITE, (h - 5.0) / 2.0),
        7..=16 => Color::WHITE,
        17..=18 => Color::WHITE.lerp(Color::ORANGE, (h - 17.0) / 2.0),
        19..=20 => Color::ORANGE.lerp(Color::DARK_BLUE, (h - 19.0) / 2.0),
        _ => Color::DARK_BLUE,
    }
}

pub fn intensity_for_hour(hour: u8) -> f32 {
    match hour {
        7..=16 => 1.0,
        5..=6 | 17..=18 => 0.6,
        _ => 0.2,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub color: Color,
    pub intensity: f32,
}

/// Key (directional) and fill (ambient) lights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightRig {
    pub directional: Light,
    pub ambient: Light,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            directional: Light {
                color: Color::WHITE,
                intensity: 0.8,
            },
            ambient: Light {
                color: Color::WHITE,
                intensity: 0.5,
            },
        }
    }
}

impl LightRig {
    /// The ambient fill always runs at half the key intensity.
    pub fn apply(&mut self, hour: u8) {
        let color = color_for_hour(hour);
        let intensity = intensity_for_hour(hour);
        self.directional = Light { color, intensity };
        self.ambient = Light {
            color,
            intensity: intensity * 0.5,
        };
    }
}

/// Light rig plus the per-hour recomputation gate.
#[derive(Debug, Clone, Default)]
pub struct Lighting {
    rig: LightRig,
    last_processed_hour: Option<u8>,
    updates: u64,
}

impl Lighting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rig(&self) -> &LightRig {
        &self.rig
    }

    pub fn last_processed_hour(&self) -> Option<u8> {
        self.last_processed_hour
    }

    /// Number of times the rig has been recomputed.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Recomputes the rig only when `hour` differs from the last processed
    /// hour. Returns whether a recompute happened.
    pub fn sync(&mut self, hour: u8) -> bool {
        if self.last_processed_hour == Some(hour) {
            return false;
        }
        self.rig.apply(hour);
        self.last_processed_hour = Some(hour);
        self.updates += 1;
        tracing::debug!(hour, intensity = self.rig.directional.intensity, "lighting updated");
        true
    }
}
