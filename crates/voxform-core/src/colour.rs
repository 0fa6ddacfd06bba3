//! Colour types and colour-space distance metrics.

use serde::{Deserialize, Serialize};

/// RGBA colour with components in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    /// Opaque white
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque black
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Fully transparent black
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Fallback colour for unresolvable materials (magenta)
    pub const FALLBACK: Self = Self::new(1.0, 0.0, 1.0, 1.0);

    /// Create a new colour from components
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a colour from 8-bit components
    #[inline]
    pub fn from_bytes(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }

    /// Clamp every component into [0, 1]
    #[inline]
    pub fn clamped(self) -> Self {
        Self::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
    }

    /// Component-wise linear interpolation between two colours
    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Convert to CIE L*a*b* (D65 white point), ignoring alpha.
    ///
    /// Components are treated as sRGB-encoded and linearized before the
    /// XYZ transform.
    pub fn to_lab(self) -> [f32; 3] {
        fn linearize(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }

        let r = linearize(self.r);
        let g = linearize(self.g);
        let b = linearize(self.b);

        // sRGB to XYZ (D65)
        let x = 0.412_456 * r + 0.357_576 * g + 0.180_437 * b;
        let y = 0.212_673 * r + 0.715_152 * g + 0.072_175 * b;
        let z = 0.019_334 * r + 0.119_192 * g + 0.950_304 * b;

        // Normalize by reference white
        let x = x / 0.950_47;
        let z = z / 1.088_83;

        fn f(t: f32) -> f32 {
            const DELTA: f32 = 6.0 / 29.0;
            if t > DELTA * DELTA * DELTA {
                t.cbrt()
            } else {
                t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
            }
        }

        let fx = f(x);
        let fy = f(y);
        let fz = f(z);

        [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
    }
}

/// Colour space used for palette distance comparisons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColourSpace {
    /// Euclidean distance over RGBA components.
    #[default]
    Rgb,
    /// Euclidean distance in CIE L*a*b* (perceptual, alpha ignored).
    Lab,
}

impl ColourSpace {
    /// Squared distance between two colours under this metric.
    pub fn distance_sq(self, a: Rgba, b: Rgba) -> f32 {
        match self {
            Self::Rgb => {
                let dr = a.r - b.r;
                let dg = a.g - b.g;
                let db = a.b - b.b;
                let da = a.a - b.a;
                dr * dr + dg * dg + db * db + da * da
            }
            Self::Lab => {
                let la = a.to_lab();
                let lb = b.to_lab();
                let dl = la[0] - lb[0];
                let da = la[1] - lb[1];
                let db = la[2] - lb[2];
                dl * dl + da * da + db * db
            }
        }
    }
}
