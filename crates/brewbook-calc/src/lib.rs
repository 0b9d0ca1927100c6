//! Brewing-metric derivations: gravity, color, bitterness, alcohol and
//! priming-sugar dosing. Everything here is a pure function over the
//! domain types; degenerate input (zero batch size, empty ingredient
//! lists) yields finite, non-negative values instead of NaN.

use brewbook_domain::{Culture, HopUse, MeasuredValues, Recipe, RecipeStats};
use brewbook_units::{to_gallons, to_grams, to_kilograms, to_liters, to_pounds};
use std::collections::BTreeMap;

/// Gravity points contributed by one kilogram of pure extract in one
/// liter, per (potential-1)*1000.
const POINTS_PER_KG_LITER: f64 = 8.3454;

/// Morey equation coefficients.
const MOREY_COEFF: f64 = 1.4922;
const MOREY_EXP: f64 = 0.6859;

/// Tinseth equation coefficients.
const TINSETH_BIGNESS_COEFF: f64 = 1.65;
const TINSETH_BIGNESS_BASE: f64 = 0.000125;
const TINSETH_TIME_SCALE: f64 = 4.15;

fn batch_liters_or_one(recipe: &Recipe) -> f64 {
    let l = to_liters(&recipe.batch_size);
    if l > 0.0 {
        l
    } else {
        1.0
    }
}

/// Original gravity from the fermentable bill, brewhouse efficiency and
/// batch size.
pub fn original_gravity(recipe: &Recipe) -> f64 {
    let batch_l = batch_liters_or_one(recipe);
    let efficiency = recipe.efficiency_percent / 100.0;

    let mut points = 0.0;
    for f in &recipe.fermentables {
        let kg = to_kilograms(&f.amount);
        let pkl = (f.potential - 1.0) * 1000.0 * POINTS_PER_KG_LITER;
        points += kg * pkl * efficiency / batch_l;
    }
    1.0 + points / 1000.0
}

/// Final gravity from OG and the average culture attenuation. No cultures
/// means a single implicit culture at 75%.
pub fn final_gravity(og: f64, cultures: &[Culture]) -> f64 {
    let attenuation = if cultures.is_empty() {
        75.0
    } else {
        cultures
            .iter()
            .map(|c| c.attenuation_percent)
            .sum::<f64>()
            / cultures.len() as f64
    };
    1.0 + (og - 1.0) * (1.0 - attenuation / 100.0)
}

/// Extra fermentables introduced at bottling time, for the
/// bottle-conditioning ABV correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimingAddition {
    pub sugar_grams: f64,
    pub volume_liters: f64,
}

/// Alcohol by volume. `priming` switches on the bottle-conditioning mode:
/// the sugar fermented in the sealed bottle adds
/// `(sugar_g / volume_l) * 0.05` percent.
pub fn abv(og: f64, fg: f64, priming: Option<&PrimingAddition>) -> f64 {
    let mut abv = if og > fg { (og - fg) * 131.25 } else { 0.0 };
    if let Some(p) = priming {
        if p.volume_liters > 0.0 {
            abv += p.sugar_grams / p.volume_liters * 0.05;
        }
    }
    abv
}

/// Beer color via the Morey equation. The formula is calibrated to
/// imperial inputs, so fermentable weights and batch volume are bridged
/// to pounds/gallons here no matter what units the recipe declares.
pub fn color_srm(recipe: &Recipe) -> f64 {
    let gallons = {
        let g = to_gallons(&recipe.batch_size);
        if g > 0.0 {
            g
        } else {
            1.0
        }
    };
    let mcu: f64 = recipe
        .fermentables
        .iter()
        .map(|f| to_pounds(&f.amount) * f.color_srm / gallons)
        .sum();
    if mcu > 0.0 {
        MOREY_COEFF * mcu.powf(MOREY_EXP)
    } else {
        0.0
    }
}

fn tinseth_time_factor(minutes: f64) -> f64 {
    (1.0 - (-0.04 * minutes).exp()) / TINSETH_TIME_SCALE
}

/// Bitterness via the Tinseth equation, rounded to whole IBU.
///
/// Dry-hop and mash additions contribute nothing. Whirlpool additions use
/// a fixed 10-minute time factor scaled by 0.5 — a calibration choice
/// carried over for compatibility, not a published Tinseth variant.
///
/// `alpha_overrides` maps hop name to a measured alpha-acid percent and
/// wins over the recipe value, which itself falls back to 5 when unset.
pub fn bitterness_ibu(recipe: &Recipe, alpha_overrides: &BTreeMap<String, f64>) -> f64 {
    let og = original_gravity(recipe);
    let batch_l = batch_liters_or_one(recipe);
    let bigness = TINSETH_BIGNESS_COEFF * TINSETH_BIGNESS_BASE.powf(og - 1.0);

    let mut total = 0.0;
    for hop in &recipe.hops {
        let utilization = match hop.use_point {
            HopUse::Boil | HopUse::FirstWort => bigness * tinseth_time_factor(hop.time.value),
            HopUse::Whirlpool => bigness * tinseth_time_factor(10.0) * 0.5,
            HopUse::DryHop | HopUse::Mash => continue,
        };
        let alpha = alpha_overrides
            .get(&hop.name)
            .copied()
            .unwrap_or(if hop.alpha_percent > 0.0 {
                hop.alpha_percent
            } else {
                5.0
            });
        total += alpha * to_grams(&hop.amount) * utilization * 10.0 / batch_l;
    }
    total.round()
}

/// Sugar type used for bottle priming. Factors scale the table-sugar
/// baseline by fermentable-sugar density per gram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimingSugar {
    #[default]
    TableSugar,
    Glucose,
    DriedMaltExtract,
}

impl PrimingSugar {
    pub fn factor(self) -> f64 {
        match self {
            PrimingSugar::TableSugar => 1.0,
            PrimingSugar::Glucose => 1.15,
            PrimingSugar::DriedMaltExtract => 1.4,
        }
    }
}

impl std::str::FromStr for PrimingSugar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table_sugar" | "table-sugar" | "sucrose" => Ok(PrimingSugar::TableSugar),
            "glucose" | "dextrose" | "corn_sugar" | "corn-sugar" => Ok(PrimingSugar::Glucose),
            "dried_malt_extract" | "dried-malt-extract" | "dme" => Ok(PrimingSugar::DriedMaltExtract),
            other => Err(format!("unknown priming sugar: {other}")),
        }
    }
}

/// Grams of priming sugar to reach `target_co2_volumes` at bottling,
/// given the beer's temperature (residual CO2) and packaged volume.
/// Rounded to the nearest gram.
pub fn priming_sugar_grams(
    target_co2_volumes: f64,
    temp_c: f64,
    volume_liters: f64,
    sugar: PrimingSugar,
) -> f64 {
    let residual = 1.57 * 0.97_f64.powf(temp_c);
    let needed = (target_co2_volumes - residual).max(0.0);
    (needed * 4.0 * volume_liters * sugar.factor()).round()
}

/// Compute the full derived-specs block for a recipe. Brew-log
/// measurements, where present, replace the design values: measured
/// og/fg win outright, measured hop alphas feed the IBU recompute, and a
/// bottled batch with known sugar mass and volume gets the
/// bottle-conditioning ABV correction.
pub fn recipe_stats(recipe: &Recipe, measured: Option<&MeasuredValues>) -> RecipeStats {
    let og = measured
        .and_then(|m| m.og)
        .unwrap_or_else(|| original_gravity(recipe));
    let fg = measured
        .and_then(|m| m.fg)
        .unwrap_or_else(|| final_gravity(og, &recipe.cultures));

    let priming = measured.and_then(|m| {
        if !m.bottled {
            return None;
        }
        match (m.priming_sugar_grams, m.volume_liters) {
            (Some(sugar_grams), Some(volume_liters)) => Some(PrimingAddition {
                sugar_grams,
                volume_liters,
            }),
            _ => None,
        }
    });

    let empty = BTreeMap::new();
    let overrides = measured.map(|m| &m.hop_alpha).unwrap_or(&empty);

    RecipeStats {
        og,
        fg,
        abv: abv(og, fg, priming.as_ref()),
        ibu: bitterness_ibu(recipe, overrides),
        color_srm: color_srm(recipe),
    }
}
