use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A measured quantity: raw value plus the canonical unit token it was
/// declared in (empty string means "no unit / already canonical").
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Amount {
    pub value: f64,
    #[serde(default)]
    pub unit: String,
}

impl Amount {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Amount {
            value,
            unit: unit.into(),
        }
    }
}

/// Brewing process type. Serialized snake_case; the BeerXML exporter owns
/// the title-case mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecipeMethod {
    Extract,
    PartialMash,
    #[default]
    AllGrain,
}

/// Where a hop addition enters the process. Dry-hop and mash additions
/// contribute no bitterness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HopUse {
    #[default]
    Boil,
    DryHop,
    Mash,
    FirstWort,
    Whirlpool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MashStepType {
    #[default]
    Infusion,
    Temperature,
    Decoction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Fermentable {
    pub name: String,
    /// Loose BeerXML vocabulary: grain, extract, sugar, adjunct, ...
    #[serde(default)]
    pub kind: String,
    pub amount: Amount,
    /// Yield potential as specific gravity (1.037 when the source omits it).
    pub potential: f64,
    /// Lovibond/SRM-scale color (2 when the source omits it).
    pub color_srm: f64,
    #[serde(default)]
    pub library_id: Option<String>,
}

impl Default for Fermentable {
    fn default() -> Self {
        Fermentable {
            name: String::new(),
            kind: String::new(),
            amount: Amount::new(0.0, "kilograms"),
            potential: 1.037,
            color_srm: 2.0,
            library_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Hop {
    pub name: String,
    /// Stored in grams regardless of what the source declared.
    pub amount: Amount,
    pub alpha_percent: f64,
    #[serde(rename = "use")]
    pub use_point: HopUse,
    /// Minutes for boil-side uses, days for dry hopping.
    pub time: Amount,
    #[serde(default)]
    pub library_id: Option<String>,
}

impl Default for Hop {
    fn default() -> Self {
        Hop {
            name: String::new(),
            amount: Amount::new(0.0, "grams"),
            alpha_percent: 5.0,
            use_point: HopUse::Boil,
            time: Amount::new(0.0, "minutes"),
            library_id: None,
        }
    }
}

/// Yeast or other fermentation culture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Culture {
    pub name: String,
    /// ale | lager | wheat | wine | champagne
    #[serde(default)]
    pub kind: String,
    /// liquid | dry | slant | culture
    #[serde(default)]
    pub form: String,
    pub attenuation_percent: f64,
    #[serde(default)]
    pub library_id: Option<String>,
}

impl Default for Culture {
    fn default() -> Self {
        Culture {
            name: String::new(),
            kind: String::new(),
            form: String::new(),
            attenuation_percent: 75.0,
            library_id: None,
        }
    }
}

/// BeerXML's MISC vocabulary is open-ended, so everything here stays a
/// lowercased string rather than an enum.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Misc {
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub use_point: String,
    pub amount: Amount,
    pub time: Amount,
    #[serde(default)]
    pub library_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Water {
    pub name: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct MashStep {
    pub name: String,
    pub kind: MashStepType,
    pub temp_c: f64,
    pub duration_minutes: f64,
    #[serde(default)]
    pub infuse_amount_l: Option<f64>,
    #[serde(default)]
    pub ramp_minutes: Option<f64>,
    #[serde(default)]
    pub end_temp_c: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct MashProfile {
    pub name: String,
    pub steps: Vec<MashStep>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Style {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub notes: String,
}

/// Derived metrics block stored on a recipe after calculation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct RecipeStats {
    pub og: f64,
    pub fg: f64,
    pub abv: f64,
    pub ibu: f64,
    pub color_srm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Recipe {
    /// Assigned when the recipe is committed to a dataset; empty for
    /// freshly parsed recipes.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub author: String,
    pub method: RecipeMethod,
    /// liters or gallons
    pub batch_size: Amount,
    pub boil_time_minutes: f64,
    /// Brewhouse efficiency, percent 0-100.
    pub efficiency_percent: f64,
    #[serde(default)]
    pub fermentables: Vec<Fermentable>,
    #[serde(default)]
    pub hops: Vec<Hop>,
    #[serde(default)]
    pub cultures: Vec<Culture>,
    #[serde(default)]
    pub miscs: Vec<Misc>,
    #[serde(default)]
    pub waters: Vec<Water>,
    #[serde(default)]
    pub mash: Option<MashProfile>,
    #[serde(default)]
    pub style: Option<Style>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub specs: Option<RecipeStats>,
}

impl Default for Recipe {
    fn default() -> Self {
        Recipe {
            id: String::new(),
            name: String::new(),
            author: String::new(),
            method: RecipeMethod::AllGrain,
            batch_size: Amount::new(0.0, "liters"),
            boil_time_minutes: 60.0,
            efficiency_percent: 75.0,
            fermentables: Vec::new(),
            hops: Vec::new(),
            cultures: Vec::new(),
            miscs: Vec::new(),
            waters: Vec::new(),
            mash: None,
            style: None,
            notes: String::new(),
            specs: None,
        }
    }
}

/// What kind of library entry a record is. Forms the dedup key together
/// with the lowercased name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IngredientKind {
    Fermentable,
    Hop,
    Culture,
    Misc,
    Style,
    MashProfile,
}

/// Canonical, deduplicated ingredient record. Recipes reference it by id
/// but copy the key numeric fields at link time, so editing a library
/// entry never rewrites historical recipes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LibraryIngredient {
    pub id: String,
    pub name: String,
    pub kind: IngredientKind,
    #[serde(default)]
    pub color_srm: Option<f64>,
    #[serde(default)]
    pub potential: Option<f64>,
    #[serde(default)]
    pub alpha_percent: Option<f64>,
    #[serde(default)]
    pub attenuation_percent: Option<f64>,
    #[serde(default)]
    pub notes: String,
}

impl LibraryIngredient {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: IngredientKind) -> Self {
        LibraryIngredient {
            id: id.into(),
            name: name.into(),
            kind,
            color_srm: None,
            potential: None,
            alpha_percent: None,
            attenuation_percent: None,
            notes: String::new(),
        }
    }

    /// Dedup key: (lowercased name, kind).
    pub fn dedup_key(&self) -> (String, IngredientKind) {
        (self.name.to_lowercase(), self.kind)
    }
}

/// Actual-batch measurements supplied by a brew log. Where present they
/// take precedence over recipe-design values when recomputing stats.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct MeasuredValues {
    #[serde(default)]
    pub og: Option<f64>,
    #[serde(default)]
    pub fg: Option<f64>,
    #[serde(default)]
    pub volume_liters: Option<f64>,
    #[serde(default)]
    pub priming_sugar_grams: Option<f64>,
    #[serde(default)]
    pub bottled: bool,
    /// Hop name -> substitute alpha-acid percent.
    #[serde(default)]
    pub hop_alpha: BTreeMap<String, f64>,
}

/// In-memory dataset the reconciliation flow commits into. Persistence is
/// a collaborator concern; this crate only defines the shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Dataset {
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    #[serde(default)]
    pub library: Vec<LibraryIngredient>,
}

/// Whole-dataset backup object. Brew logs and tasting notes belong to
/// external collaborators and round-trip as opaque JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Backup {
    pub version: u32,
    #[serde(default)]
    pub export_date: String,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    #[serde(default)]
    pub brew_logs: Vec<serde_json::Value>,
    #[serde(default)]
    pub tasting_notes: Vec<serde_json::Value>,
    #[serde(default)]
    pub library: Vec<LibraryIngredient>,
}

/// Counters reported after a reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReconcileSummary {
    pub recipes_added: usize,
    pub recipes_skipped: usize,
    pub library_added: usize,
    pub library_skipped: usize,
    pub library_overwritten: usize,
    pub library_copied: usize,
}
