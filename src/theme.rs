//! Board colours. A random hue is picked on every start.

use rand::Rng;

/// An RGB colour.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Convert hue in degrees, saturation and lightness in `[0, 1]` to RGB.
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> Rgb {
    let hue = hue.rem_euclid(360.0) / 360.0;

    if saturation == 0.0 {
        let grey = channel(lightness);
        return Rgb(grey, grey, grey);
    }

    let q = if lightness < 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;

    Rgb(
        channel(hue_to_component(p, q, hue + 1.0 / 3.0)),
        channel(hue_to_component(p, q, hue)),
        channel(hue_to_component(p, q, hue - 1.0 / 3.0)),
    )
}

fn hue_to_component(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn channel(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Square colours of the terminal board.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Theme {
    pub hue: u16,
    pub dark: Rgb,
    pub light: Rgb,
    pub highlight: Rgb,
}

impl Theme {
    /// Muted dark squares: the given hue at 30% saturation and 30% lightness.
    pub fn with_hue(hue: u16) -> Self {
        let hue = hue % 360;
        Self {
            hue,
            dark: hsl_to_rgb(f64::from(hue), 0.3, 0.3),
            light: hsl_to_rgb(f64::from(hue), 0.3, 0.75),
            highlight: hsl_to_rgb(f64::from((hue + 180) % 360), 0.6, 0.55),
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_hue(rng.gen_range(0..360))
    }
}
