//! Shape checks over many random samples.

use utilkit_color::{random_color, Color, ColorFormat};

fn parse_rgb(s: &str) -> Option<[u16; 3]> {
    let inner = s.strip_prefix("rgb(")?.strip_suffix(')')?;
    let parts: Vec<u16> = inner
        .split(',')
        .map(|p| p.parse::<u16>().ok())
        .collect::<Option<_>>()?;
    <[u16; 3]>::try_from(parts).ok()
}

#[test]
fn rgb_samples_match_pattern() {
    for _ in 0..1000 {
        let s = random_color(ColorFormat::Rgb);
        let channels = parse_rgb(&s).unwrap_or_else(|| panic!("bad rgb color: {s}"));
        assert!(channels.iter().all(|c| *c <= 255), "out of range: {s}");
    }
}

#[test]
fn hex_samples_are_unpadded_lowercase() {
    for _ in 0..1000 {
        let s = random_color(ColorFormat::Hex);
        let digits = s.strip_prefix('#').unwrap_or_else(|| panic!("missing #: {s}"));
        assert!((3..=6).contains(&digits.len()), "bad length: {s}");
        assert!(
            digits
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)),
            "not lowercase hex: {s}"
        );
    }
}

#[test]
fn default_selector_produces_hex() {
    let s = random_color(ColorFormat::from_selector(None));
    assert!(s.starts_with('#'));
}

#[test]
fn every_channel_value_renders() {
    for v in 0..=255u8 {
        let c = Color::new(v, v, v);
        assert_eq!(c.to_rgb_string(), format!("rgb({v},{v},{v})"));
        assert_eq!(c.to_hex_padded().len(), 7);
        let expected_len = if v < 16 { 4 } else { 7 };
        assert_eq!(c.to_hex_unpadded().len(), expected_len);
    }
}
