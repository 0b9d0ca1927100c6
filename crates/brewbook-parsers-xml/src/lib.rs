//! BeerXML import: XML text in, structured recipes plus document-global
//! library declarations out.
//!
//! The importer never fails on bad data. Unparseable documents come back
//! as an empty result (with a warning), missing text tags read as "",
//! missing numeric tags as 0, and the ingredient fields with sensible
//! brewing defaults (potential, color, alpha, attenuation) fall back to
//! those defaults. Callers distinguish "nothing to import" via
//! [`ImportResult::is_empty`].

use brewbook_core::Result;
use brewbook_domain::{
    Amount, Culture, Fermentable, Hop, HopUse, IngredientKind, LibraryIngredient, MashProfile,
    MashStep, MashStepType, Misc, Recipe, RecipeMethod, Style, Water,
};
use roxmltree::{Document, Node};
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub recipes: Vec<Recipe>,
    pub library: Vec<LibraryIngredient>,
}

impl ImportResult {
    /// Well-formed XML with no recognized elements is "nothing to
    /// import", not success.
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty() && self.library.is_empty()
    }

    pub fn merge(&mut self, other: ImportResult) {
        self.recipes.extend(other.recipes);
        self.library.extend(other.library);
    }
}

/// Parse a BeerXML document.
///
/// Two passes: first every `RECIPE` subtree becomes a [`Recipe`]; then
/// any `FERMENTABLE`/`HOP`/`YEAST`/`MISC`/`STYLE`/`MASH` element *outside*
/// those subtrees becomes a document-global library declaration.
pub fn parse_beerxml(xml: &str) -> ImportResult {
    let mut out = ImportResult::default();

    let doc = match Document::parse(xml) {
        Ok(d) => d,
        Err(e) => {
            warn!("unparseable BeerXML, importing nothing: {e}");
            return out;
        }
    };

    for node in doc
        .descendants()
        .filter(|n| n.is_element() && tag_is(*n, "RECIPE"))
    {
        out.recipes.push(parse_recipe(node));
    }

    for node in doc.descendants().filter(|n| n.is_element()) {
        if inside_recipe(node) {
            continue;
        }
        let name = node.tag_name().name();
        let entry = if name.eq_ignore_ascii_case("FERMENTABLE") {
            Some(library_fermentable(node))
        } else if name.eq_ignore_ascii_case("HOP") {
            Some(library_hop(node))
        } else if name.eq_ignore_ascii_case("YEAST") {
            Some(library_culture(node))
        } else if name.eq_ignore_ascii_case("MISC") {
            Some(library_misc(node))
        } else if name.eq_ignore_ascii_case("STYLE") {
            Some(library_style(node))
        } else if name.eq_ignore_ascii_case("MASH") {
            Some(library_mash(node))
        } else {
            None
        };
        if let Some(entry) = entry {
            out.library.push(entry);
        }
    }

    out
}

/// Walk a folder and aggregate every `.xml` file's import result.
/// Unreadable or unparseable files are skipped with a warning; the scan
/// itself only fails on a broken walk.
pub fn scan_beerxml(root: &Path) -> Result<ImportResult> {
    let mut out = ImportResult::default();
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("xml"))
            .unwrap_or(false)
        {
            match std::fs::read_to_string(path) {
                Ok(txt) => out.merge(parse_beerxml(&txt)),
                Err(e) => warn!("skipping {path:?}: {e}"),
            }
        }
    }
    Ok(out)
}

fn tag_is(node: Node, tag: &str) -> bool {
    node.tag_name().name().eq_ignore_ascii_case(tag)
}

fn inside_recipe(node: Node) -> bool {
    node.ancestors().skip(1).any(|a| tag_is(a, "RECIPE"))
}

fn child_text(node: Node, tag: &str) -> String {
    node.children()
        .find(|c| c.is_element() && tag_is(*c, tag))
        .and_then(|c| c.text())
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

fn child_f64(node: Node, tag: &str) -> f64 {
    child_opt_f64(node, tag).unwrap_or(0.0)
}

fn child_opt_f64(node: Node, tag: &str) -> Option<f64> {
    let raw = child_text(node, tag);
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok()
}

/// Lowercase an interchange enum string and replace internal spaces with
/// underscores: "First Wort" -> "first_wort".
fn enum_token(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

fn method_from(token: &str) -> RecipeMethod {
    match token {
        "extract" => RecipeMethod::Extract,
        "partial_mash" => RecipeMethod::PartialMash,
        _ => RecipeMethod::AllGrain,
    }
}

fn hop_use_from(token: &str) -> HopUse {
    match token {
        "dry_hop" => HopUse::DryHop,
        "mash" => HopUse::Mash,
        "first_wort" => HopUse::FirstWort,
        // "Aroma" is the dialect's name for post-boil steeping
        "whirlpool" | "aroma" => HopUse::Whirlpool,
        _ => HopUse::Boil,
    }
}

fn mash_step_type_from(token: &str) -> MashStepType {
    match token {
        "temperature" => MashStepType::Temperature,
        "decoction" => MashStepType::Decoction,
        _ => MashStepType::Infusion,
    }
}

fn parse_recipe(node: Node) -> Recipe {
    let mut recipe = Recipe {
        name: child_text(node, "NAME"),
        author: child_text(node, "BREWER"),
        method: method_from(&enum_token(&child_text(node, "TYPE"))),
        batch_size: Amount::new(child_f64(node, "BATCH_SIZE"), "liters"),
        boil_time_minutes: child_f64(node, "BOIL_TIME"),
        efficiency_percent: child_f64(node, "EFFICIENCY"),
        notes: child_text(node, "NOTES"),
        ..Default::default()
    };

    for n in descendant_elements(node, "FERMENTABLE") {
        recipe.fermentables.push(parse_fermentable(n));
    }
    for n in descendant_elements(node, "HOP") {
        recipe.hops.push(parse_hop(n));
    }
    for n in descendant_elements(node, "YEAST") {
        recipe.cultures.push(parse_culture(n));
    }
    for n in descendant_elements(node, "MISC") {
        recipe.miscs.push(parse_misc(n));
    }
    for n in descendant_elements(node, "WATER") {
        recipe.waters.push(Water {
            name: child_text(n, "NAME"),
            amount: Amount::new(child_f64(n, "AMOUNT"), "liters"),
        });
    }
    recipe.style = node
        .children()
        .find(|c| c.is_element() && tag_is(*c, "STYLE"))
        .map(parse_style);
    recipe.mash = node
        .children()
        .find(|c| c.is_element() && tag_is(*c, "MASH"))
        .map(parse_mash);

    recipe
}

fn descendant_elements<'a>(
    node: Node<'a, 'a>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'a>> + 'a {
    node.descendants()
        .filter(move |n| n.is_element() && tag_is(*n, tag))
}

fn parse_fermentable(node: Node) -> Fermentable {
    // POTENTIAL (specific gravity) wins; YIELD percent falls back through
    // the 46 pt/lb/gal sucrose ceiling; neither means 1.037.
    let potential = child_opt_f64(node, "POTENTIAL")
        .filter(|p| *p > 0.0)
        .or_else(|| {
            child_opt_f64(node, "YIELD")
                .filter(|y| *y > 0.0)
                .map(|y| 1.0 + y / 100.0 * 0.046)
        })
        .unwrap_or(1.037);

    Fermentable {
        name: child_text(node, "NAME"),
        kind: enum_token(&child_text(node, "TYPE")),
        amount: Amount::new(child_f64(node, "AMOUNT"), "kilograms"),
        potential,
        color_srm: child_opt_f64(node, "COLOR").unwrap_or(2.0),
        library_id: None,
    }
}

fn parse_hop(node: Node) -> Hop {
    let use_point = hop_use_from(&enum_token(&child_text(node, "USE")));
    // the dialect declares hop weights in kilograms; the model stores grams
    let grams = child_f64(node, "AMOUNT") * 1000.0;
    let time_unit = if use_point == HopUse::DryHop {
        "days"
    } else {
        "minutes"
    };
    Hop {
        name: child_text(node, "NAME"),
        amount: Amount::new(grams, "grams"),
        alpha_percent: child_opt_f64(node, "ALPHA").unwrap_or(5.0),
        use_point,
        time: Amount::new(child_f64(node, "TIME"), time_unit),
        library_id: None,
    }
}

fn parse_culture(node: Node) -> Culture {
    Culture {
        name: child_text(node, "NAME"),
        kind: enum_token(&child_text(node, "TYPE")),
        form: enum_token(&child_text(node, "FORM")),
        attenuation_percent: child_opt_f64(node, "ATTENUATION").unwrap_or(75.0),
        library_id: None,
    }
}

fn parse_misc(node: Node) -> Misc {
    Misc {
        name: child_text(node, "NAME"),
        kind: enum_token(&child_text(node, "TYPE")),
        use_point: enum_token(&child_text(node, "USE")),
        amount: Amount::new(child_f64(node, "AMOUNT") * 1000.0, "grams"),
        time: Amount::new(child_f64(node, "TIME"), "minutes"),
        library_id: None,
    }
}

fn parse_style(node: Node) -> Style {
    Style {
        name: child_text(node, "NAME"),
        category: child_text(node, "CATEGORY"),
        notes: child_text(node, "NOTES"),
    }
}

fn parse_mash(node: Node) -> MashProfile {
    let steps = descendant_elements(node, "MASH_STEP")
        .map(|n| MashStep {
            name: child_text(n, "NAME"),
            kind: mash_step_type_from(&enum_token(&child_text(n, "TYPE"))),
            temp_c: child_f64(n, "STEP_TEMP"),
            duration_minutes: child_f64(n, "STEP_TIME"),
            infuse_amount_l: child_opt_f64(n, "INFUSE_AMOUNT"),
            ramp_minutes: child_opt_f64(n, "RAMP_TIME"),
            end_temp_c: child_opt_f64(n, "END_TEMP"),
        })
        .collect();
    MashProfile {
        name: child_text(node, "NAME"),
        steps,
    }
}

fn library_fermentable(node: Node) -> LibraryIngredient {
    let f = parse_fermentable(node);
    LibraryIngredient {
        color_srm: Some(f.color_srm),
        potential: Some(f.potential),
        notes: child_text(node, "NOTES"),
        ..LibraryIngredient::new("", f.name, IngredientKind::Fermentable)
    }
}

fn library_hop(node: Node) -> LibraryIngredient {
    let h = parse_hop(node);
    LibraryIngredient {
        alpha_percent: Some(h.alpha_percent),
        notes: child_text(node, "NOTES"),
        ..LibraryIngredient::new("", h.name, IngredientKind::Hop)
    }
}

fn library_culture(node: Node) -> LibraryIngredient {
    let c = parse_culture(node);
    LibraryIngredient {
        attenuation_percent: Some(c.attenuation_percent),
        notes: child_text(node, "NOTES"),
        ..LibraryIngredient::new("", c.name, IngredientKind::Culture)
    }
}

fn library_misc(node: Node) -> LibraryIngredient {
    LibraryIngredient {
        notes: child_text(node, "NOTES"),
        ..LibraryIngredient::new("", child_text(node, "NAME"), IngredientKind::Misc)
    }
}

fn library_style(node: Node) -> LibraryIngredient {
    LibraryIngredient {
        notes: child_text(node, "NOTES"),
        ..LibraryIngredient::new("", child_text(node, "NAME"), IngredientKind::Style)
    }
}

fn library_mash(node: Node) -> LibraryIngredient {
    LibraryIngredient {
        notes: child_text(node, "NOTES"),
        ..LibraryIngredient::new("", child_text(node, "NAME"), IngredientKind::MashProfile)
    }
}
