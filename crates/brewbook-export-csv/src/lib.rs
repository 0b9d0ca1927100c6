use brewbook_core::Result;
use brewbook_domain::{LibraryIngredient, Recipe};
use std::io::Write;

/// Write one summary row per recipe: name, style, batch liters and the
/// derived specs (computed on the fly when the recipe carries none).
pub fn write_recipe_csv<W: Write>(writer: W, recipes: &[Recipe]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["name", "style", "batch_l", "og", "fg", "abv", "ibu", "srm"])?;

    for r in recipes {
        let stats = r
            .specs
            .clone()
            .unwrap_or_else(|| brewbook_calc::recipe_stats(r, None));
        wtr.write_record([
            r.name.as_str(),
            r.style.as_ref().map(|s| s.name.as_str()).unwrap_or(""),
            &format!("{:.1}", r.batch_size.value),
            &format!("{:.3}", stats.og),
            &format!("{:.3}", stats.fg),
            &format!("{:.1}", stats.abv),
            &format!("{:.0}", stats.ibu),
            &format!("{:.1}", stats.color_srm),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Flat dump of the ingredient library.
pub fn write_library_csv<W: Write>(writer: W, items: &[LibraryIngredient]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["id", "name", "kind", "color", "potential", "alpha", "attenuation"])?;

    for l in items {
        let kind = serde_plain_kind(l);
        wtr.write_record([
            l.id.as_str(),
            l.name.as_str(),
            kind,
            &opt(l.color_srm),
            &opt(l.potential),
            &opt(l.alpha_percent),
            &opt(l.attenuation_percent),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v}")).unwrap_or_default()
}

fn serde_plain_kind(l: &LibraryIngredient) -> &'static str {
    use brewbook_domain::IngredientKind::*;
    match l.kind {
        Fermentable => "fermentable",
        Hop => "hop",
        Culture => "culture",
        Misc => "misc",
        Style => "style",
        MashProfile => "mash_profile",
    }
}
