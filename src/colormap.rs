//! Rate-of-change colormap
//!
//! Standalone hue-interpolation utility so the numeric classification and its
//! visualization stay decoupled. The hue sweeps from 120 degrees (green, slow)
//! to 0 degrees (red, fast) as the normalized intensity goes from 0 to 1.

/// Rate magnitude (mmol/L per 5 min) at which the color clamps to full red
pub const ROC_COLOR_CAP: f64 = 0.15;

/// Fixed saturation for rate colors
pub const ROC_SATURATION: f64 = 0.8;

/// Fixed value (brightness) for rate colors
pub const ROC_VALUE: f64 = 0.9;

/// Hue for a normalized intensity in [0, 1]: 120 (green) down to 0 (red).
/// Out-of-range intensities clamp.
pub fn hue_for_intensity(intensity: f64) -> f64 {
    let t = intensity.clamp(0.0, 1.0);
    120.0 * (1.0 - t)
}

/// Convert HSV (hue 0-360, saturation 0-1, value 0-1) to RGB bytes
pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> (u8, u8, u8) {
    let c = value * saturation;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = value - c;

    let (r, g, b) = match (hue / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

/// Format RGB bytes as a lowercase hex color string
pub fn hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Hex color for an absolute rate of change (mmol/L per 5 min).
/// Rates at or beyond [`ROC_COLOR_CAP`] clamp to red.
pub fn roc_color(roc_abs: f64) -> String {
    let hue = hue_for_intensity(roc_abs / ROC_COLOR_CAP);
    let (r, g, b) = hsv_to_rgb(hue, ROC_SATURATION, ROC_VALUE);
    hex(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hue_endpoints() {
        assert_eq!(hue_for_intensity(0.0), 120.0);
        assert_eq!(hue_for_intensity(1.0), 0.0);
        assert_eq!(hue_for_intensity(0.5), 60.0);
    }

    #[test]
    fn test_hue_clamps() {
        assert_eq!(hue_for_intensity(-0.5), 120.0);
        assert_eq!(hue_for_intensity(2.0), 0.0);
    }

    #[test]
    fn test_hsv_primaries() {
        // Red at hue 0
        let (r, g, b) = hsv_to_rgb(0.0, 1.0, 1.0);
        assert_eq!((r, g, b), (255, 0, 0));

        // Green at hue 120
        let (r, g, b) = hsv_to_rgb(120.0, 1.0, 1.0);
        assert_eq!((r, g, b), (0, 255, 0));

        // Blue at hue 240
        let (r, g, b) = hsv_to_rgb(240.0, 1.0, 1.0);
        assert_eq!((r, g, b), (0, 0, 255));
    }

    #[test]
    fn test_hex_format() {
        assert_eq!(hex(255, 0, 10), "#ff000a");
        assert_eq!(hex(0, 0, 0), "#000000");
    }

    #[test]
    fn test_roc_color_slow_is_green_leaning() {
        // A zero rate sits at hue 120 with s=0.8, v=0.9
        let (r, g, b) = hsv_to_rgb(120.0, ROC_SATURATION, ROC_VALUE);
        assert_eq!(roc_color(0.0), hex(r, g, b));
        assert!(g > r && g > b);
    }

    #[test]
    fn test_roc_color_clamps_beyond_cap() {
        // Same red for cap and anything above it
        assert_eq!(roc_color(ROC_COLOR_CAP), roc_color(1.0));
        assert_eq!(roc_color(ROC_COLOR_CAP), roc_color(ROC_COLOR_CAP * 4.0));
    }
}
