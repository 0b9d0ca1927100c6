use brewbook_domain::Amount;
use serde::{Deserialize, Serialize};

pub const LITERS_PER_GALLON: f64 = 3.78541;
pub const POUNDS_PER_KILOGRAM: f64 = 2.20462;
pub const GRAMS_PER_OUNCE: f64 = 28.3495;
pub const EBC_PER_SRM: f64 = 1.97;

/// Canonicalize a free-form unit string into the fixed vocabulary
/// `kilograms | pounds | grams | ounces | liters | gallons | minutes`.
///
/// Matching is prefix-based and order-sensitive: "lb" is tested before the
/// bare "l" liters prefix, and "gal" before the bare "g" grams prefix.
/// Unrecognized strings pass through trimmed/lowercased (best-effort,
/// e.g. "grains" in mash contexts); empty input stays empty.
pub fn canonical_unit(raw: &str) -> String {
    let u = raw.trim().trim_end_matches('.').to_lowercase();
    if u.is_empty() {
        return String::new();
    }
    if u.starts_with("kg") || u.starts_with("kilo") {
        return "kilograms".into();
    }
    if u.starts_with("lb") || u.starts_with("pound") {
        return "pounds".into();
    }
    if u.starts_with("oz") || u.starts_with("ounce") {
        return "ounces".into();
    }
    if u.starts_with("gal") {
        return "gallons".into();
    }
    // "grains" is a mash-context pseudo-unit, not a mass; let it fall
    // through to the passthrough branch.
    if u.starts_with("grain") {
        return u;
    }
    if u.starts_with('g') {
        return "grams".into();
    }
    if u.starts_with("min") {
        return "minutes".into();
    }
    if u.starts_with('l') {
        return "liters".into();
    }
    u
}

/// Convert an amount to kilograms. Unrecognized units are taken at face
/// value, matching the normalizer's no-failure policy.
pub fn to_kilograms(a: &Amount) -> f64 {
    match canonical_unit(&a.unit).as_str() {
        "pounds" => a.value / POUNDS_PER_KILOGRAM,
        "grams" => a.value / 1000.0,
        "ounces" => a.value * GRAMS_PER_OUNCE / 1000.0,
        _ => a.value,
    }
}

pub fn to_grams(a: &Amount) -> f64 {
    match canonical_unit(&a.unit).as_str() {
        "kilograms" => a.value * 1000.0,
        "pounds" => a.value * 1000.0 / POUNDS_PER_KILOGRAM,
        "ounces" => a.value * GRAMS_PER_OUNCE,
        _ => a.value,
    }
}

pub fn to_pounds(a: &Amount) -> f64 {
    match canonical_unit(&a.unit).as_str() {
        "kilograms" => a.value * POUNDS_PER_KILOGRAM,
        "grams" => a.value * POUNDS_PER_KILOGRAM / 1000.0,
        "ounces" => a.value / 16.0,
        _ => a.value,
    }
}

pub fn to_liters(a: &Amount) -> f64 {
    match canonical_unit(&a.unit).as_str() {
        "gallons" => a.value * LITERS_PER_GALLON,
        _ => a.value,
    }
}

pub fn to_gallons(a: &Amount) -> f64 {
    match canonical_unit(&a.unit).as_str() {
        "liters" => a.value / LITERS_PER_GALLON,
        _ => a.value,
    }
}

/// Semantic type of a displayed quantity; picks conversion and decimal
/// policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityKind {
    MassSmall,
    MassLarge,
    Volume,
    Temperature,
    Gravity,
    Abv,
    Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScale {
    #[default]
    Srm,
    Ebc,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayPrefs {
    pub system: UnitSystem,
    pub color_scale: ColorScale,
    /// Render "1,050" instead of "1.050" for comma-decimal locales.
    pub decimal_comma: bool,
}

/// Format a raw metric-side value for display, converting to the user's
/// preferred system. `source_unit` says what the value is expressed in
/// (e.g. a fermentable amount may arrive in pounds); temperature input is
/// always Celsius.
pub fn format_quantity(
    value: f64,
    kind: QuantityKind,
    source_unit: &str,
    prefs: &DisplayPrefs,
) -> String {
    let src = Amount::new(value, source_unit);
    // (converted value, max decimals, trim trailing zeros, unit label)
    let (num, max_dp, trim, label) = match (kind, prefs.system) {
        (QuantityKind::MassSmall, UnitSystem::Metric) => (to_grams(&src), 0, true, "g"),
        (QuantityKind::MassSmall, UnitSystem::Imperial) => {
            (to_grams(&src) / GRAMS_PER_OUNCE, 1, true, "oz")
        }
        (QuantityKind::MassLarge, UnitSystem::Metric) => (to_kilograms(&src), 3, true, "kg"),
        (QuantityKind::MassLarge, UnitSystem::Imperial) => (to_pounds(&src), 3, true, "lb"),
        (QuantityKind::Volume, UnitSystem::Metric) => (to_liters(&src), 1, true, "L"),
        (QuantityKind::Volume, UnitSystem::Imperial) => (to_gallons(&src), 1, true, "gal"),
        (QuantityKind::Temperature, UnitSystem::Metric) => (value, 1, true, "°C"),
        (QuantityKind::Temperature, UnitSystem::Imperial) => {
            (value * 9.0 / 5.0 + 32.0, 1, true, "°F")
        }
        (QuantityKind::Gravity, _) => (value, 3, false, ""),
        (QuantityKind::Abv, _) => (value, 1, false, "%"),
        (QuantityKind::Color, _) => match prefs.color_scale {
            ColorScale::Srm => (value, 1, true, "SRM"),
            ColorScale::Ebc => (value * EBC_PER_SRM, 1, true, "EBC"),
        },
    };

    let mut text = format_decimals(num, max_dp, trim);
    if prefs.decimal_comma {
        text = text.replace('.', ",");
    }
    if label.is_empty() {
        text
    } else if label == "%" {
        format!("{text}%")
    } else {
        format!("{text} {label}")
    }
}

/// Fixed decimals up to `max_dp`; when `trim` is set, trailing zeros and a
/// dangling separator are dropped. Gravity and ABV keep their zeros.
fn format_decimals(value: f64, max_dp: usize, trim: bool) -> String {
    if max_dp == 0 {
        return format!("{}", value.round() as i64);
    }
    let s = format!("{value:.max_dp$}");
    if !trim {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_mass_aliases() {
        assert_eq!(canonical_unit("Kg"), "kilograms");
        assert_eq!(canonical_unit("  kilograms "), "kilograms");
        assert_eq!(canonical_unit("KILOGRAM"), "kilograms");
        assert_eq!(canonical_unit("Kg."), "kilograms");
        assert_eq!(canonical_unit("Grams"), "grams");
        assert_eq!(canonical_unit("g"), "grams");
        assert_eq!(canonical_unit("OZ"), "ounces");
        assert_eq!(canonical_unit("ounce"), "ounces");
    }

    #[test]
    fn lb_is_not_liters() {
        assert_eq!(canonical_unit("lb"), "pounds");
        assert_eq!(canonical_unit("LBS"), "pounds");
        assert_eq!(canonical_unit("l"), "liters");
        assert_eq!(canonical_unit("Litre"), "liters");
    }

    #[test]
    fn gal_is_not_grams() {
        assert_eq!(canonical_unit("gal"), "gallons");
        assert_eq!(canonical_unit("Gallons"), "gallons");
        assert_eq!(canonical_unit("gram"), "grams");
    }

    #[test]
    fn unknown_units_pass_through() {
        assert_eq!(canonical_unit("grains"), "grains");
        assert_eq!(canonical_unit("cups"), "cups");
        assert_eq!(canonical_unit(""), "");
        assert_eq!(canonical_unit("   "), "");
    }

    #[test]
    fn converts_between_mass_units() {
        let five_lb = Amount::new(5.0, "lb");
        assert!((to_kilograms(&five_lb) - 2.26796).abs() < 1e-4);
        let kilo = Amount::new(1.0, "kg");
        assert!((to_grams(&kilo) - 1000.0).abs() < 1e-9);
        assert!((to_pounds(&kilo) - 2.20462).abs() < 1e-9);
        let oz = Amount::new(16.0, "oz");
        assert!((to_pounds(&oz) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn converts_between_volume_units() {
        let five_gal = Amount::new(5.0, "gal");
        assert!((to_liters(&five_gal) - 18.92705).abs() < 1e-5);
        let twenty_l = Amount::new(20.0, "L");
        assert!((to_gallons(&twenty_l) - 5.28344).abs() < 1e-4);
    }

    #[test]
    fn formats_metric_and_imperial() {
        let prefs = DisplayPrefs::default();
        assert_eq!(
            format_quantity(28.3495, QuantityKind::MassSmall, "grams", &prefs),
            "28 g"
        );
        let imperial = DisplayPrefs {
            system: UnitSystem::Imperial,
            ..Default::default()
        };
        assert_eq!(
            format_quantity(28.3495, QuantityKind::MassSmall, "grams", &imperial),
            "1 oz"
        );
        assert_eq!(
            format_quantity(20.0, QuantityKind::Volume, "liters", &imperial),
            "5.3 gal"
        );
        assert_eq!(
            format_quantity(65.0, QuantityKind::Temperature, "", &imperial),
            "149 °F"
        );
    }

    #[test]
    fn formats_gravity_color_and_abv() {
        let prefs = DisplayPrefs::default();
        assert_eq!(
            format_quantity(1.050, QuantityKind::Gravity, "", &prefs),
            "1.050"
        );
        assert_eq!(format_quantity(5.8, QuantityKind::Abv, "", &prefs), "5.8%");
        assert_eq!(format_quantity(5.0, QuantityKind::Abv, "", &prefs), "5.0%");
        let ebc = DisplayPrefs {
            color_scale: ColorScale::Ebc,
            ..Default::default()
        };
        assert_eq!(
            format_quantity(10.0, QuantityKind::Color, "", &ebc),
            "19.7 EBC"
        );
    }

    #[test]
    fn decimal_comma_locale() {
        let prefs = DisplayPrefs {
            decimal_comma: true,
            ..Default::default()
        };
        assert_eq!(
            format_quantity(1.050, QuantityKind::Gravity, "", &prefs),
            "1,050"
        );
    }
}
