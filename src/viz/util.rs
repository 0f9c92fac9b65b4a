//! Colors, locale mapping, and tick formatting.

use num_format::{Locale, ToFormattedString};
use plotters::style::RGBColor;

/// Microsoft Office (2013+) chart series palette.
/// Order: Blue, Orange, Gray, Gold, Light Blue, Green, Dark Blue, Dark Orange, Dark Gray, Brownish Gold.
const OFFICE10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue      (#4472C4)
    RGBColor(237, 125, 49),  // orange    (#ED7D31)
    RGBColor(165, 165, 165), // gray      (#A5A5A5)
    RGBColor(255, 192, 0),   // gold      (#FFC000)
    RGBColor(91, 155, 213),  // light blue(#5B9BD5)
    RGBColor(112, 173, 71),  // green     (#70AD47)
    RGBColor(38, 68, 120),   // dark blue (#264478)
    RGBColor(158, 72, 14),   // dark org. (#9E480E)
    RGBColor(99, 99, 99),    // dark gray (#636363)
    RGBColor(153, 115, 0),   // brownish  (#997300)
];

/// Palette color for the n-th category, cycling past the palette end.
#[inline]
pub fn series_color(idx: usize) -> RGBColor {
    OFFICE10[idx % OFFICE10.len()]
}

/// Map a user-provided locale tag to a `num_format::Locale`.
///
/// Supported tags (case-insensitive): `en`, `de`, `fr`, `es`, `it`, `pt`,
/// `nl`, plus regional variants like `de_DE`. Defaults to English.
pub fn map_locale(tag: &str) -> &'static Locale {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => &Locale::de,
        "fr" | "fr_fr" => &Locale::fr,
        "es" | "es_es" => &Locale::es,
        "it" | "it_it" => &Locale::it,
        "pt" | "pt_pt" | "pt_br" => &Locale::pt,
        "nl" | "nl_nl" => &Locale::nl,
        _ => &Locale::en,
    }
}

/// Format a value-axis tick: locale group separators for whole numbers
/// (`30,000` vs `30.000`), magnitude-dependent precision otherwise.
pub fn format_tick(v: f64, locale: &'static Locale) -> String {
    if v.fract().abs() < 1e-9 && v.abs() < 9e15 {
        return (v.round() as i64).to_formatted_string(locale);
    }
    let a = v.abs();
    let prec = if a >= 100.0 {
        0
    } else if a >= 10.0 {
        1
    } else {
        2
    };
    format!("{:.*}", prec, v)
}

/// Format a year tick (never grouped, always a whole number).
pub fn format_year(v: f64) -> String {
    (v.round() as i32).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_cycles() {
        assert_eq!(series_color(0), series_color(10));
        assert_ne!(series_color(0), series_color(1));
    }

    #[test]
    fn ticks_use_locale_separators() {
        assert_eq!(format_tick(30_000.0, map_locale("en")), "30,000");
        assert_eq!(format_tick(30_000.0, map_locale("de")), "30.000");
        assert_eq!(format_tick(2.5, map_locale("en")), "2.50");
        assert_eq!(format_year(2021.0), "2021");
    }
}
