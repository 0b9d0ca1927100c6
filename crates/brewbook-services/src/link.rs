use brewbook_domain::{IngredientKind, LibraryIngredient, Recipe};
use tracing::debug;
use uuid::Uuid;

/// Numeric fields copied onto a synthesized library entry. Recipes keep
/// their own inline copies, so a later library edit never rewrites a
/// historical recipe.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngredientDefaults {
    pub color_srm: Option<f64>,
    pub potential: Option<f64>,
    pub alpha_percent: Option<f64>,
    pub attenuation_percent: Option<f64>,
}

/// Find the library entry matching (kind, lowercased name) and return its
/// id; otherwise synthesize one from `defaults` with a fresh id.
///
/// Mutation contract: appends at most one entry, never edits existing
/// ones. Callers relying on "when was this created" can diff the library
/// length around the call.
pub fn resolve_or_create(
    library: &mut Vec<LibraryIngredient>,
    name: &str,
    kind: IngredientKind,
    defaults: IngredientDefaults,
) -> String {
    if let Some(hit) = library
        .iter()
        .find(|l| l.kind == kind && l.name.eq_ignore_ascii_case(name))
    {
        return hit.id.clone();
    }

    let id = Uuid::new_v4().to_string();
    debug!(name, ?kind, %id, "library entry synthesized during linking");
    library.push(LibraryIngredient {
        color_srm: defaults.color_srm,
        potential: defaults.potential,
        alpha_percent: defaults.alpha_percent,
        attenuation_percent: defaults.attenuation_percent,
        ..LibraryIngredient::new(id.clone(), name, kind)
    });
    id
}

/// Resolve every fermentable, hop and culture of a recipe against the
/// library, growing the library where needed. AI-drafted recipes go
/// through this same entrypoint before they are committed.
pub fn link_recipe(recipe: &mut Recipe, library: &mut Vec<LibraryIngredient>) {
    for f in &mut recipe.fermentables {
        if f.name.trim().is_empty() {
            continue;
        }
        let id = resolve_or_create(
            library,
            &f.name,
            IngredientKind::Fermentable,
            IngredientDefaults {
                color_srm: Some(f.color_srm),
                potential: Some(f.potential),
                ..Default::default()
            },
        );
        f.library_id = Some(id);
    }

    for h in &mut recipe.hops {
        if h.name.trim().is_empty() {
            continue;
        }
        let id = resolve_or_create(
            library,
            &h.name,
            IngredientKind::Hop,
            IngredientDefaults {
                alpha_percent: Some(h.alpha_percent),
                ..Default::default()
            },
        );
        h.library_id = Some(id);
    }

    for c in &mut recipe.cultures {
        if c.name.trim().is_empty() {
            continue;
        }
        let id = resolve_or_create(
            library,
            &c.name,
            IngredientKind::Culture,
            IngredientDefaults {
                attenuation_percent: Some(c.attenuation_percent),
                ..Default::default()
            },
        );
        c.library_id = Some(id);
    }
}
