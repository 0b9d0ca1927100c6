use brewbook_calc::PrimingSugar;
use brewbook_domain::{Dataset, MeasuredValues};
use brewbook_services::{ReconcileAction, Resolution, Status};
use brewbook_units::{ColorScale, DisplayPrefs, QuantityKind, UnitSystem};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser)]
#[command(name = "brewbook", version, about = "BeerXML recipe toolkit (Rust)")]
struct Cli {
    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a folder of BeerXML files and summarize the recipes found
    Scan {
        #[arg(short, long)]
        root: PathBuf,
        #[arg(long)]
        out_csv: Option<PathBuf>,
    },

    /// Import a BeerXML file into a dataset, reconciling duplicates
    Import {
        #[arg(long)]
        file: PathBuf,
        /// Dataset JSON; created when missing
        #[arg(long)]
        dataset: PathBuf,
        /// skip | overwrite | copy | cancel (default from config, then skip)
        #[arg(long)]
        on_conflict: Option<String>,
    },

    /// Export one recipe from a dataset as BeerXML
    Export {
        #[arg(long)]
        dataset: PathBuf,
        #[arg(long)]
        recipe: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Export the ingredient library as BeerXML
    ExportLibrary {
        #[arg(long)]
        dataset: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Compute og/fg/abv/ibu/srm for a BeerXML recipe
    Stats {
        #[arg(long)]
        file: PathBuf,
        /// Recipe name; defaults to the first recipe in the file
        #[arg(long)]
        recipe: Option<String>,
        /// Apply the bottle-conditioning ABV correction
        #[arg(long, default_value_t = false)]
        bottled: bool,
        /// Priming sugar mass in grams (with --bottled)
        #[arg(long)]
        sugar: Option<f64>,
        /// Packaged volume in liters (with --bottled)
        #[arg(long)]
        volume: Option<f64>,
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Priming sugar dose for bottle carbonation
    Prime {
        /// Target CO2 volumes
        #[arg(long)]
        volumes: f64,
        /// Beer temperature in °C
        #[arg(long)]
        temp: f64,
        /// Batch volume in liters
        #[arg(long)]
        batch: f64,
        /// table_sugar | glucose | dried_malt_extract
        #[arg(long, default_value = "table_sugar")]
        sugar: String,
    },

    /// Write a whole-dataset backup JSON
    Backup {
        #[arg(long)]
        dataset: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },

    /// Restore a dataset from a backup JSON
    Restore {
        #[arg(long)]
        backup: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
}

trait Runnable {
    fn run(self, use_color: bool) -> Result<()>;
}

impl Runnable for Commands {
    fn run(self, use_color: bool) -> Result<()> {
        let cmd_name = format!("{:?}", self);
        info!("starting command: {}", cmd_name);

        let result = match self {
            Commands::Scan { root, out_csv } => {
                debug!("Scan args: root={:?} out_csv={:?}", root, out_csv);
                let found = brewbook_parsers_xml::scan_beerxml(&root)?;
                if found.is_empty() {
                    eprintln!("nothing to import under {}", root.display());
                }
                if let Some(path) = out_csv {
                    let file = std::fs::File::create(path)?;
                    brewbook_export_csv::write_recipe_csv(file, &found.recipes)?;
                } else {
                    let stdout = std::io::stdout();
                    brewbook_export_csv::write_recipe_csv(stdout.lock(), &found.recipes)?;
                }
                Ok(())
            }

            Commands::Import {
                file,
                dataset,
                on_conflict,
            } => run_import(&file, &dataset, on_conflict),

            Commands::Export {
                dataset,
                recipe,
                out,
            } => {
                let ds = load_dataset(&dataset)?;
                let found = ds
                    .recipes
                    .iter()
                    .find(|r| r.name.eq_ignore_ascii_case(&recipe))
                    .ok_or_else(|| eyre!("no recipe named {recipe:?} in dataset"))?;
                let xml = brewbook_export_xml::recipe_to_xml(found);
                write_text(out.as_deref(), &xml)?;
                Ok(())
            }

            Commands::ExportLibrary { dataset, out } => {
                let ds = load_dataset(&dataset)?;
                let xml = brewbook_export_xml::library_to_xml(&ds.library);
                write_text(out.as_deref(), &xml)?;
                Ok(())
            }

            Commands::Stats {
                file,
                recipe,
                bottled,
                sugar,
                volume,
                format,
            } => run_stats(&file, recipe.as_deref(), bottled, sugar, volume, &format, use_color),

            Commands::Prime {
                volumes,
                temp,
                batch,
                sugar,
            } => {
                let sugar: PrimingSugar = sugar.parse().map_err(|e: String| eyre!(e))?;
                let grams = brewbook_calc::priming_sugar_grams(volumes, temp, batch, sugar);
                println!("{grams} g");
                Ok(())
            }

            Commands::Backup { dataset, out } => {
                let ds = load_dataset(&dataset)?;
                let stamp = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs()
                    .to_string();
                let backup =
                    brewbook_services::make_backup(&ds, Vec::new(), Vec::new(), stamp);
                std::fs::write(&out, brewbook_services::backup_to_json(&backup)?)?;
                println!("backup saved to {}", out.display());
                Ok(())
            }

            Commands::Restore { backup, out } => {
                let text = std::fs::read_to_string(&backup)?;
                let parsed = brewbook_services::backup_from_json(&text)?;
                let (ds, _logs, _notes) = brewbook_services::restore_backup(parsed);
                save_dataset(&out, &ds)?;
                println!("dataset restored to {}", out.display());
                Ok(())
            }
        };

        match &result {
            Ok(_) => info!("finished command: {}", cmd_name),
            Err(e) => error!("command {} failed: {:?}", cmd_name, e),
        }

        result
    }
}

fn run_import(file: &Path, dataset_path: &Path, on_conflict: Option<String>) -> Result<()> {
    let xml = std::fs::read_to_string(file)?;
    let import = brewbook_parsers_xml::parse_beerxml(&xml);
    if import.is_empty() {
        eprintln!("nothing to import in {}", file.display());
        std::process::exit(1);
    }

    let policy = resolve_policy(on_conflict)?;
    let dataset = load_dataset(dataset_path)?;
    let items = brewbook_services::pending_from_import(import);

    let mut state = brewbook_services::begin(dataset, items);
    while state.status == Status::AwaitingDecision {
        if let Some(conflict) = &state.conflict {
            debug!(
                name = %conflict.incoming.name,
                "library conflict resolved by policy {:?}", policy
            );
        }
        state = brewbook_services::step(state, ReconcileAction::Decide(policy));
    }

    save_dataset(dataset_path, &state.dataset)?;
    println!("{}", serde_json::to_string(&state.summary)?);
    Ok(())
}

fn resolve_policy(flag: Option<String>) -> Result<Resolution> {
    let from_config = || {
        brewbook_config::load_config()
            .ok()
            .and_then(|c| c.import)
            .and_then(|i| i.on_conflict)
    };
    let token = flag.or_else(from_config).unwrap_or_else(|| "skip".into());
    match token.as_str() {
        "skip" => Ok(Resolution::Skip),
        "overwrite" => Ok(Resolution::Overwrite),
        "copy" => Ok(Resolution::Copy),
        "cancel" => Ok(Resolution::Cancel),
        other => Err(eyre!("unknown conflict policy: {other}")),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_stats(
    file: &Path,
    recipe_name: Option<&str>,
    bottled: bool,
    sugar: Option<f64>,
    volume: Option<f64>,
    format: &str,
    use_color: bool,
) -> Result<()> {
    let xml = std::fs::read_to_string(file)?;
    let import = brewbook_parsers_xml::parse_beerxml(&xml);
    let recipe = match recipe_name {
        Some(name) => import
            .recipes
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| eyre!("no recipe named {name:?} in {}", file.display()))?,
        None => import
            .recipes
            .first()
            .ok_or_else(|| eyre!("no recipes in {}", file.display()))?,
    };

    let measured = MeasuredValues {
        bottled,
        priming_sugar_grams: sugar,
        volume_liters: volume,
        ..Default::default()
    };
    let stats = brewbook_calc::recipe_stats(recipe, Some(&measured));

    if format == "json" {
        println!("{}", serde_json::to_string(&stats)?);
        return Ok(());
    }

    let prefs = display_prefs();
    let og = brewbook_units::format_quantity(stats.og, QuantityKind::Gravity, "", &prefs);
    let fg = brewbook_units::format_quantity(stats.fg, QuantityKind::Gravity, "", &prefs);
    let abv = brewbook_units::format_quantity(stats.abv, QuantityKind::Abv, "", &prefs);
    let srm = brewbook_units::format_quantity(stats.color_srm, QuantityKind::Color, "", &prefs);

    if use_color {
        use owo_colors::OwoColorize;
        println!("{}", recipe.name.green().bold());
        println!("  OG   {}", og.cyan());
        println!("  FG   {}", fg.cyan());
        println!("  ABV  {}", abv.yellow());
        println!("  IBU  {}", format!("{:.0}", stats.ibu).magenta());
        println!("  SRM  {}", srm.blue());
    } else {
        println!("{}", recipe.name);
        println!("  OG   {og}");
        println!("  FG   {fg}");
        println!("  ABV  {abv}");
        println!("  IBU  {:.0}", stats.ibu);
        println!("  SRM  {srm}");
    }
    Ok(())
}

fn display_prefs() -> DisplayPrefs {
    let cfg = brewbook_config::load_config().unwrap_or_default();
    DisplayPrefs {
        system: match cfg.units.as_deref() {
            Some("imperial") => UnitSystem::Imperial,
            _ => UnitSystem::Metric,
        },
        color_scale: match cfg.color_scale.as_deref() {
            Some("ebc") => ColorScale::Ebc,
            _ => ColorScale::Srm,
        },
        decimal_comma: cfg.decimal_comma.unwrap_or(false),
    }
}

fn load_dataset(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Ok(Dataset::default());
    }
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn save_dataset(path: &Path, dataset: &Dataset) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, serde_json::to_string_pretty(dataset)?)?;
    Ok(())
}

fn write_text(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, text)?;
            println!("saved to {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = rolling::daily("logs", "brewbook.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")));

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(file_writer)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = init_tracing();

    let cli = Cli::parse();

    let use_color = !cli.no_color
        && std::io::stdout().is_terminal()
        && std::env::var_os("NO_COLOR").is_none();

    cli.cmd.run(use_color)
}
