use plotters::style::{FontDesc, FontFamily, FontStyle, RGBColor};
use tracing::{debug, warn};

const FALLBACK_COLOR: RGBColor = RGBColor(31, 119, 180);

/// `#rrggbb` (or `rrggbb`) to a color.
pub fn parse_hex_color(text: &str) -> Option<RGBColor> {
    let hex = text.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

pub fn parse_palette(entries: &[String]) -> Vec<RGBColor> {
    let palette: Vec<RGBColor> = entries
        .iter()
        .filter_map(|e| {
            let color = parse_hex_color(e);
            if color.is_none() {
                warn!("Ignoring palette entry {:?}", e);
            }
            color
        })
        .collect();

    if palette.is_empty() {
        vec![FALLBACK_COLOR]
    } else {
        palette
    }
}

/// First candidate family that loads. Glyph coverage is not checked, so
/// CJK-capable families belong at the front of the list.
pub fn pick_font(candidates: &[String]) -> String {
    for name in candidates {
        let font = FontDesc::new(FontFamily::from(name.as_str()), 14.0, FontStyle::Normal);
        match font.box_size("财务健康度") {
            Ok(_) => {
                debug!("Using chart font {}", name);
                return name.clone();
            }
            Err(e) => debug!("Font {} unavailable: {:?}", name, e),
        }
    }
    warn!("No configured chart font could be loaded, falling back to sans-serif");
    "sans-serif".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("#1f77b4", Some(RGBColor(31, 119, 180)))]
    #[case("ff7f0e", Some(RGBColor(255, 127, 14)))]
    #[case("#FFF", None)]
    #[case("#gg0000", None)]
    #[case("#红色红", None)]
    fn hex_colors(#[case] text: &str, #[case] expected: Option<RGBColor>) {
        assert_eq!(parse_hex_color(text), expected);
    }

    #[test]
    fn no_candidates_means_sans_serif() {
        assert_eq!(pick_font(&[]), "sans-serif");
    }

    #[test]
    fn bad_palette_falls_back() {
        assert_eq!(parse_palette(&["nope".to_string()]), vec![FALLBACK_COLOR]);
        assert_eq!(
            parse_palette(&["#000000".to_string(), "bad".to_string()]),
            vec![RGBColor(0, 0, 0)]
        );
    }
}
