use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};

use aeblend_core::TimeRangePolicy;
use aeblend_export::{
    export_composition, read_settings_file, write_settings_file, ExportSettings,
};
use aeblend_scene::{validate_composition, Composition};

#[derive(Parser)]
#[command(
    name = "aeblend",
    version,
    about = "aeblend — export animated composition data to Blender",
    long_about = "aeblend reads a composition snapshot (layers, keyframes, cameras, media\nsources) and exports a JSON document the companion Blender importer can\nrebuild the animation from."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a composition snapshot to an importable JSON document
    Export {
        /// Path to the composition snapshot file
        #[arg()]
        file: PathBuf,

        /// Output file path (default: output/<comp name>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Time range to sample: wholeComp, workArea, layerDuration
        #[arg(long)]
        time_range: Option<String>,

        /// Export only the selected layers: true or false
        #[arg(long)]
        selected_only: Option<bool>,

        /// Bake transforms to world-space matrices: true or false
        #[arg(long)]
        bake: Option<bool>,

        /// Samples per frame for baked and calculated channels
        #[arg(long)]
        supersampling: Option<u32>,

        /// Re-origin baked cameras to the composition center: true or false
        #[arg(long)]
        centered_camera: Option<bool>,
    },

    /// Summarize a composition snapshot without exporting it
    Inspect {
        /// Path to the composition snapshot file
        #[arg()]
        file: PathBuf,
    },

    /// Display version and format info
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Export {
            file,
            output,
            time_range,
            selected_only,
            bake,
            supersampling,
            centered_camera,
        } => cmd_export(
            file,
            output,
            time_range,
            selected_only,
            bake,
            supersampling,
            centered_camera,
        ),
        Commands::Inspect { file } => cmd_inspect(file),
        Commands::Info => cmd_info(),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_export(
    file: PathBuf,
    output: Option<PathBuf>,
    time_range: Option<String>,
    selected_only: Option<bool>,
    bake: Option<bool>,
    supersampling: Option<u32>,
    centered_camera: Option<bool>,
) -> Result<()> {
    let comp = load_snapshot(&file)?;

    if let Err(errors) = validate_composition(&comp) {
        let details: Vec<String> = errors.iter().map(|e| format!("  - {e}")).collect();
        bail!(
            "snapshot failed validation:\n{}",
            details.join("\n")
        );
    }

    // Settings from the last run seed the defaults; flags given on the
    // command line win.
    let mut settings: ExportSettings = settings_file_path()
        .as_deref()
        .and_then(read_settings_file)
        .unwrap_or_default();
    if let Some(time_range) = time_range {
        settings.time_range = parse_time_range(&time_range)?;
    }
    if let Some(selected_only) = selected_only {
        settings.selected_only = selected_only;
    }
    if let Some(bake) = bake {
        settings.bake_transforms = bake;
    }
    if let Some(supersampling) = supersampling {
        if supersampling == 0 {
            bail!("supersampling must be at least 1");
        }
        settings.supersampling = supersampling;
    }
    if let Some(centered_camera) = centered_camera {
        settings.centered_camera = centered_camera;
    }

    if comp.layers.is_empty() {
        bail!("composition \"{}\" has no layers to export", comp.name);
    }
    if settings.selected_only && comp.selected_layers().next().is_none() {
        bail!("selected-only export requested but no layers are selected");
    }

    let document = export_composition(&comp, &settings)
        .with_context(|| format!("failed to export composition \"{}\"", comp.name))?;

    let output = resolve_output_path(output, &comp.name);
    write_document(&document, &output)?;

    println!(
        "Exported {} layer(s) and {} source(s) to {}",
        document.layers.len(),
        document.sources.len(),
        output.display()
    );

    if let Some(path) = settings_file_path() {
        if let Err(error) = write_settings_file(&path, &settings) {
            // Not being able to remember settings never fails an export.
            tracing::warn!(%error, path = %path.display(), "could not save export settings");
        }
    }
    Ok(())
}

fn cmd_inspect(file: PathBuf) -> Result<()> {
    let comp = load_snapshot(&file)?;
    println!(
        "{}  {}x{}  {:.3} fps  {:.3}s",
        comp.name, comp.width, comp.height, comp.frame_rate, comp.duration
    );
    let work_area = comp.work_area();
    println!("work area: {:.3}s – {:.3}s", work_area[0], work_area[1]);
    println!("layers ({}):", comp.layers.len());
    let mut layers: Vec<_> = comp.layers.iter().collect();
    layers.sort_by_key(|l| l.index);
    for layer in layers {
        let marker = if layer.selected { "*" } else { " " };
        let kind = if layer.is_camera() { "camera" } else { "av" };
        let parent = layer
            .parent
            .map(|p| format!(" (parent {p})"))
            .unwrap_or_default();
        println!("{marker} [{}] {} — {kind}{parent}", layer.index, layer.name);
    }
    println!("sources ({}):", comp.sources.len());
    for source in &comp.sources {
        println!("  {} ({}x{})", source.name, source.width, source.height);
    }
    match validate_composition(&comp) {
        Ok(()) => println!("snapshot is valid"),
        Err(errors) => {
            println!("snapshot has {} problem(s):", errors.len());
            for error in errors {
                println!("  - {error}");
            }
        }
    }
    Ok(())
}

fn cmd_info() -> Result<()> {
    println!("aeblend {}", env!("CARGO_PKG_VERSION"));
    println!("export format version: {}", aeblend_export::FILE_VERSION);
    println!("settings version: {}", aeblend_export::SETTINGS_VERSION);
    if let Some(path) = settings_file_path() {
        println!("settings file: {}", path.display());
    }
    Ok(())
}

fn load_snapshot(path: &Path) -> Result<Composition> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))
}

fn parse_time_range(value: &str) -> Result<TimeRangePolicy> {
    match value {
        "wholeComp" => Ok(TimeRangePolicy::WholeComp),
        "workArea" => Ok(TimeRangePolicy::WorkArea),
        "layerDuration" => Ok(TimeRangePolicy::LayerDuration),
        other => Err(anyhow!(
            "unknown time range \"{other}\" (expected wholeComp, workArea or layerDuration)"
        )),
    }
}

fn settings_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|d| d.join(".aeblend").join("settings.json"))
}

/// The path the document is written to. The importer only picks up `.json`
/// files, so a user-supplied path has its extension replaced; a derived
/// default gets `.json` appended, since a dot in the composition name is
/// part of the name, not an extension.
fn resolve_output_path(output: Option<PathBuf>, comp_name: &str) -> PathBuf {
    match output {
        Some(mut path) => {
            path.set_extension("json");
            path
        }
        None => PathBuf::from("output").join(format!("{comp_name}.json")),
    }
}

/// Serialize and write the document, going through a sibling temp file so a
/// failed write never clobbers a previous good export.
fn write_document(document: &aeblend_export::ExportDocument, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let text = serde_json::to_string_pretty(document).context("failed to serialize document")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, text).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to move export into place at {}", path.display()))?;
    Ok(())
}
