//! Colour access for drawn marks.

/// Interface for colours attached to letters and paths by the parser.
pub trait Color {
    /// Red, green and blue components in [0, 1].
    fn to_rgb_values(&self) -> (f64, f64, f64);

    /// CIELAB (L*, a*, b*) under the D65 illuminant.
    fn to_lab_values(&self) -> (f64, f64, f64);
}

/// A plain sRGB colour with components in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RgbColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl RgbColor {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }
}

impl Color for RgbColor {
    fn to_rgb_values(&self) -> (f64, f64, f64) {
        (self.r, self.g, self.b)
    }

    fn to_lab_values(&self) -> (f64, f64, f64) {
        // sRGB -> linear RGB -> XYZ (D65) -> L*a*b*.
        fn linearise(c: f64) -> f64 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        let (r, g, b) = (linearise(self.r), linearise(self.g), linearise(self.b));

        let x = 0.4124564 * r + 0.3575761 * g + 0.1804375 * b;
        let y = 0.2126729 * r + 0.7151522 * g + 0.0721750 * b;
        let z = 0.0193339 * r + 0.1191920 * g + 0.9503041 * b;

        // D65 reference white.
        let (xn, yn, zn) = (0.95047, 1.0, 1.08883);
        fn f(t: f64) -> f64 {
            const DELTA: f64 = 6.0 / 29.0;
            if t > DELTA * DELTA * DELTA {
                t.cbrt()
            } else {
                t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
            }
        }
        let (fx, fy, fz) = (f(x / xn), f(y / yn), f(z / zn));
        (116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_maps_to_l100() {
        let (l, a, b) = RgbColor::new(1.0, 1.0, 1.0).to_lab_values();
        assert!((l - 100.0).abs() < 0.01);
        assert!(a.abs() < 0.01);
        assert!(b.abs() < 0.01);
    }

    #[test]
    fn black_maps_to_l0() {
        let (l, _, _) = RgbColor::new(0.0, 0.0, 0.0).to_lab_values();
        assert!(l.abs() < 1e-9);
    }
}
