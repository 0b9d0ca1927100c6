//! BeerXML export: serialize recipes and library ingredients back into the
//! interchange dialect. Plain tag-per-line text, no attributes, no
//! namespaces. Every free-text field passes through [`escape_xml`] —
//! unescaped specials in the output are a correctness bug, not a runtime
//! error.

use brewbook_domain::{
    Culture, Fermentable, Hop, HopUse, IngredientKind, LibraryIngredient, MashProfile, Misc,
    Recipe, RecipeMethod, Style, Water,
};
use brewbook_units::{to_grams, to_kilograms, to_liters};
use std::fmt::Write;

/// Escape the five XML special characters for text content.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// The dialect writes "All Grain" where the model says `all_grain`. This
/// is a fixed table, deliberately not a generic case transform.
fn method_label(method: RecipeMethod) -> &'static str {
    match method {
        RecipeMethod::Extract => "Extract",
        RecipeMethod::PartialMash => "Partial Mash",
        RecipeMethod::AllGrain => "All Grain",
    }
}

fn hop_use_label(use_point: HopUse) -> &'static str {
    match use_point {
        HopUse::Boil => "Boil",
        HopUse::DryHop => "Dry Hop",
        HopUse::Mash => "Mash",
        HopUse::FirstWort => "First Wort",
        HopUse::Whirlpool => "Whirlpool",
    }
}

/// Title-case a stored snake_case token for loose vocabularies (culture
/// type/form, misc type/use): "first_wort" -> "First Wort".
fn title_label(token: &str) -> String {
    token
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trim a float to at most four decimals without scientific notation.
fn num(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{v:.4}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn tag(out: &mut String, indent: usize, name: &str, value: &str) {
    let pad = "  ".repeat(indent);
    let _ = writeln!(out, "{pad}<{name}>{value}</{name}>");
}

fn text_tag(out: &mut String, indent: usize, name: &str, value: &str) {
    tag(out, indent, name, &escape_xml(value));
}

fn open(out: &mut String, indent: usize, name: &str) {
    let _ = writeln!(out, "{}<{}>", "  ".repeat(indent), name);
}

fn close(out: &mut String, indent: usize, name: &str) {
    let _ = writeln!(out, "{}</{}>", "  ".repeat(indent), name);
}

/// Serialize one recipe as a standalone BeerXML document.
pub fn recipe_to_xml(recipe: &Recipe) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    open(&mut out, 0, "RECIPES");
    write_recipe(&mut out, 1, recipe);
    close(&mut out, 0, "RECIPES");
    out
}

fn write_recipe(out: &mut String, i: usize, recipe: &Recipe) {
    open(out, i, "RECIPE");
    text_tag(out, i + 1, "NAME", &recipe.name);
    tag(out, i + 1, "VERSION", "1");
    tag(out, i + 1, "TYPE", method_label(recipe.method));
    text_tag(out, i + 1, "BREWER", &recipe.author);
    tag(out, i + 1, "BATCH_SIZE", &num(to_liters(&recipe.batch_size)));
    tag(out, i + 1, "BOIL_TIME", &num(recipe.boil_time_minutes));
    tag(out, i + 1, "EFFICIENCY", &num(recipe.efficiency_percent));

    open(out, i + 1, "FERMENTABLES");
    for f in &recipe.fermentables {
        write_fermentable(out, i + 2, f);
    }
    close(out, i + 1, "FERMENTABLES");

    open(out, i + 1, "HOPS");
    for h in &recipe.hops {
        write_hop(out, i + 2, h);
    }
    close(out, i + 1, "HOPS");

    open(out, i + 1, "YEASTS");
    for c in &recipe.cultures {
        write_culture(out, i + 2, c);
    }
    close(out, i + 1, "YEASTS");

    open(out, i + 1, "MISCS");
    for m in &recipe.miscs {
        write_misc(out, i + 2, m);
    }
    close(out, i + 1, "MISCS");

    if !recipe.waters.is_empty() {
        open(out, i + 1, "WATERS");
        for w in &recipe.waters {
            write_water(out, i + 2, w);
        }
        close(out, i + 1, "WATERS");
    }

    if let Some(style) = &recipe.style {
        write_style(out, i + 1, style);
    }
    if let Some(mash) = &recipe.mash {
        write_mash(out, i + 1, mash);
    }
    if !recipe.notes.is_empty() {
        text_tag(out, i + 1, "NOTES", &recipe.notes);
    }
    close(out, i, "RECIPE");
}

fn write_fermentable(out: &mut String, i: usize, f: &Fermentable) {
    open(out, i, "FERMENTABLE");
    text_tag(out, i + 1, "NAME", &f.name);
    tag(out, i + 1, "VERSION", "1");
    tag(out, i + 1, "TYPE", &title_label(&f.kind));
    tag(out, i + 1, "AMOUNT", &num(to_kilograms(&f.amount)));
    tag(out, i + 1, "POTENTIAL", &num(f.potential));
    tag(out, i + 1, "COLOR", &num(f.color_srm));
    close(out, i, "FERMENTABLE");
}

fn write_hop(out: &mut String, i: usize, h: &Hop) {
    open(out, i, "HOP");
    text_tag(out, i + 1, "NAME", &h.name);
    tag(out, i + 1, "VERSION", "1");
    // stored grams, exported in the dialect's kilograms
    tag(out, i + 1, "AMOUNT", &num(to_grams(&h.amount) / 1000.0));
    tag(out, i + 1, "ALPHA", &num(h.alpha_percent));
    tag(out, i + 1, "USE", hop_use_label(h.use_point));
    tag(out, i + 1, "TIME", &num(h.time.value));
    close(out, i, "HOP");
}

fn write_culture(out: &mut String, i: usize, c: &Culture) {
    open(out, i, "YEAST");
    text_tag(out, i + 1, "NAME", &c.name);
    tag(out, i + 1, "VERSION", "1");
    tag(out, i + 1, "TYPE", &title_label(&c.kind));
    tag(out, i + 1, "FORM", &title_label(&c.form));
    tag(out, i + 1, "ATTENUATION", &num(c.attenuation_percent));
    close(out, i, "YEAST");
}

fn write_misc(out: &mut String, i: usize, m: &Misc) {
    open(out, i, "MISC");
    text_tag(out, i + 1, "NAME", &m.name);
    tag(out, i + 1, "VERSION", "1");
    tag(out, i + 1, "TYPE", &title_label(&m.kind));
    tag(out, i + 1, "USE", &title_label(&m.use_point));
    tag(out, i + 1, "AMOUNT", &num(to_grams(&m.amount) / 1000.0));
    tag(out, i + 1, "TIME", &num(m.time.value));
    close(out, i, "MISC");
}

fn write_water(out: &mut String, i: usize, w: &Water) {
    open(out, i, "WATER");
    text_tag(out, i + 1, "NAME", &w.name);
    tag(out, i + 1, "VERSION", "1");
    tag(out, i + 1, "AMOUNT", &num(to_liters(&w.amount)));
    close(out, i, "WATER");
}

fn write_style(out: &mut String, i: usize, s: &Style) {
    open(out, i, "STYLE");
    text_tag(out, i + 1, "NAME", &s.name);
    tag(out, i + 1, "VERSION", "1");
    text_tag(out, i + 1, "CATEGORY", &s.category);
    if !s.notes.is_empty() {
        text_tag(out, i + 1, "NOTES", &s.notes);
    }
    close(out, i, "STYLE");
}

fn write_mash(out: &mut String, i: usize, m: &MashProfile) {
    open(out, i, "MASH");
    text_tag(out, i + 1, "NAME", &m.name);
    tag(out, i + 1, "VERSION", "1");
    open(out, i + 1, "MASH_STEPS");
    for step in &m.steps {
        open(out, i + 2, "MASH_STEP");
        text_tag(out, i + 3, "NAME", &step.name);
        tag(out, i + 3, "VERSION", "1");
        let kind = match step.kind {
            brewbook_domain::MashStepType::Infusion => "Infusion",
            brewbook_domain::MashStepType::Temperature => "Temperature",
            brewbook_domain::MashStepType::Decoction => "Decoction",
        };
        tag(out, i + 3, "TYPE", kind);
        tag(out, i + 3, "STEP_TEMP", &num(step.temp_c));
        tag(out, i + 3, "STEP_TIME", &num(step.duration_minutes));
        if let Some(v) = step.infuse_amount_l {
            tag(out, i + 3, "INFUSE_AMOUNT", &num(v));
        }
        if let Some(v) = step.ramp_minutes {
            tag(out, i + 3, "RAMP_TIME", &num(v));
        }
        if let Some(v) = step.end_temp_c {
            tag(out, i + 3, "END_TEMP", &num(v));
        }
        close(out, i + 2, "MASH_STEP");
    }
    close(out, i + 1, "MASH_STEPS");
    close(out, i, "MASH");
}

/// Serialize a library as grouped ingredient sections under a single
/// root, importable by the same two-pass reader (every record element
/// sits outside any RECIPE subtree).
pub fn library_to_xml(items: &[LibraryIngredient]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    open(&mut out, 0, "INGREDIENTS");

    let sections: [(IngredientKind, &str, &str); 6] = [
        (IngredientKind::Fermentable, "FERMENTABLES", "FERMENTABLE"),
        (IngredientKind::Hop, "HOPS", "HOP"),
        (IngredientKind::Culture, "YEASTS", "YEAST"),
        (IngredientKind::Misc, "MISCS", "MISC"),
        (IngredientKind::Style, "STYLES", "STYLE"),
        (IngredientKind::MashProfile, "MASHS", "MASH"),
    ];

    for (kind, wrapper, element) in sections {
        let of_kind: Vec<&LibraryIngredient> = items.iter().filter(|l| l.kind == kind).collect();
        if of_kind.is_empty() {
            continue;
        }
        open(&mut out, 1, wrapper);
        for item in of_kind {
            open(&mut out, 2, element);
            text_tag(&mut out, 3, "NAME", &item.name);
            tag(&mut out, 3, "VERSION", "1");
            if let Some(v) = item.color_srm {
                tag(&mut out, 3, "COLOR", &num(v));
            }
            if let Some(v) = item.potential {
                tag(&mut out, 3, "POTENTIAL", &num(v));
            }
            if let Some(v) = item.alpha_percent {
                tag(&mut out, 3, "ALPHA", &num(v));
            }
            if let Some(v) = item.attenuation_percent {
                tag(&mut out, 3, "ATTENUATION", &num(v));
            }
            if !item.notes.is_empty() {
                text_tag(&mut out, 3, "NOTES", &item.notes);
            }
            close(&mut out, 2, element);
        }
        close(&mut out, 1, wrapper);
    }

    close(&mut out, 0, "INGREDIENTS");
    out
}
