use crate::error::DashError;

/// Default colors of overlay series, cycled by selection position.
pub const OVERLAY_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Default colors of experiments in the comparison view.
pub const COMPARISON_PALETTE: [&str; 10] = [
    "#1f77b4", "#d62728", "#2ca02c", "#ff7f0e", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// CSS color names accepted wherever a color is configured.
const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("black", (0, 0, 0)),
    ("white", (255, 255, 255)),
    ("red", (255, 0, 0)),
    ("green", (0, 128, 0)),
    ("blue", (0, 0, 255)),
    ("orange", (255, 165, 0)),
    ("yellow", (255, 255, 0)),
    ("purple", (128, 0, 128)),
    ("magenta", (255, 0, 255)),
    ("cyan", (0, 255, 255)),
    ("gray", (128, 128, 128)),
    ("brown", (165, 42, 42)),
    ("pink", (255, 192, 203)),
];

/// Color at `index` in `palette`, wrapping around.
pub fn cycle(palette: &[&'static str], index: usize) -> &'static str {
    if palette.is_empty() {
        return "#1f77b4";
    }
    palette[index % palette.len()]
}

/// RGB components of a named or `#rrggbb` color.
pub fn rgb(color: &str) -> Option<(u8, u8, u8)> {
    let color = color.trim().to_lowercase();
    if let Some(hex) = color.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some((channel(0)?, channel(2)?, channel(4)?));
    }
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == color)
        .map(|(_, rgb)| *rgb)
}

/// Validate a user-supplied color and return it in canonical lower case.
pub fn parse_color(color: &str) -> Result<String, DashError> {
    match rgb(color) {
        Some(_) => Ok(color.trim().to_lowercase()),
        None => Err(DashError::InvalidColor(color.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(cycle(&OVERLAY_PALETTE, 0), "#1f77b4");
        assert_eq!(cycle(&OVERLAY_PALETTE, 11), "#ff7f0e");
        assert_eq!(cycle(&COMPARISON_PALETTE, 1), "#d62728");
    }

    #[test]
    fn test_rgb_hex_and_named() {
        assert_eq!(rgb("#1F77B4"), Some((0x1f, 0x77, 0xb4)));
        assert_eq!(rgb("orange"), Some((255, 165, 0)));
        assert_eq!(rgb("#12345"), None);
        assert_eq!(rgb("chartreuse-ish"), None);
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color(" #FF0000 ").unwrap(), "#ff0000");
        assert!(matches!(
            parse_color("nope"),
            Err(DashError::InvalidColor(_))
        ));
    }
}
