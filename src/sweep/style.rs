use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stroke {
    Solid,
    Dashed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub color: Rgb,
    pub stroke: Stroke,
    pub markers: bool,
}

impl Style {
    pub fn curve(color: Rgb) -> Self {
        Self { color, stroke: Stroke::Solid, markers: true }
    }

    pub fn reference(color: Rgb) -> Self {
        Self { color, stroke: Stroke::Dashed, markers: false }
    }
}

pub const GREEN: Rgb = Rgb(44, 160, 44);
pub const ORANGE: Rgb = Rgb(255, 127, 14);
pub const RED: Rgb = Rgb(214, 39, 40);

// (curve, reference) shades of one hue family each.
const PAIRED: [(Rgb, Rgb); 8] = [
    (Rgb(44, 160, 44), Rgb(152, 223, 138)),
    (Rgb(31, 119, 180), Rgb(174, 199, 232)),
    (Rgb(214, 39, 40), Rgb(255, 152, 150)),
    (Rgb(148, 103, 189), Rgb(197, 176, 213)),
    (Rgb(255, 127, 14), Rgb(255, 187, 120)),
    (Rgb(140, 86, 75), Rgb(196, 156, 148)),
    (Rgb(227, 119, 194), Rgb(247, 182, 210)),
    (Rgb(23, 190, 207), Rgb(158, 218, 229)),
];

/// Maps a position in an ordered sweep to a style. The position is the only
/// input, so adding or removing an entry never changes another entry's style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// Green through orange to red in fixed steps, red from position
    /// [`RAMP_STEPS`] on.
    Ramp,
    /// One categorical hue family per position.
    #[default]
    Paired,
}

/// Positions from the first ramp colour to the last.
pub const RAMP_STEPS: usize = 10;

impl Palette {
    pub fn curve_style(&self, index: usize) -> Style {
        match self {
            Palette::Ramp => Style::curve(ramp(index)),
            Palette::Paired => Style::curve(PAIRED[index % PAIRED.len()].0),
        }
    }

    /// Style of a reference line paired with the curve at `index`.
    pub fn reference_style(&self, index: usize) -> Style {
        match self {
            Palette::Ramp => Style::reference(ramp(index)),
            Palette::Paired => Style::reference(PAIRED[index % PAIRED.len()].1),
        }
    }
}

fn ramp(index: usize) -> Rgb {
    let half = RAMP_STEPS / 2;
    let index = index.min(RAMP_STEPS);
    if index <= half {
        GREEN.lerp(ORANGE, index as f64 / half as f64)
    } else {
        ORANGE.lerp(RED, (index - half) as f64 / (RAMP_STEPS - half) as f64)
    }
}
