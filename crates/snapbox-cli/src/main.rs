use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use snapbox_core::templates::{TemplateKind, TemplateStore, UploadedTemplate, save_uploaded};
use snapbox_core::{
    Helvetica, ImageAsset, LayoutConfig, LayoutItem, OUTPUT_FILE_NAME, PageSize, decode_all,
    generate, layout_items, mime_from_path,
};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "snapbox",
    about = "Lay out images four per page into a PDF",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the PDF
    Generate(GenerateArgs),
    /// Layout-only export (no PDF): compute placements and write JSON
    Layout(GenerateArgs),
    /// Spreadsheet templates
    Template(TemplateArgs),
}

#[derive(Parser, Debug, Clone)]
struct GenerateArgs {
    // Input/Output
    /// Input files or directories (directories are walked recursively)
    #[arg(required = true, help_heading = "Input/Output")]
    inputs: Vec<PathBuf>,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// YAML config file path (keys present there override flags)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Page
    /// Page size: a4 | a5 | letter | legal | WIDTHxHEIGHT (mm)
    #[arg(long, default_value = "a4", help_heading = "Page")]
    page_size: String,
    /// Top margin (mm)
    #[arg(long, default_value_t = 15.0, help_heading = "Page")]
    margin_top: f32,
    /// Bottom margin (mm)
    #[arg(long, default_value_t = 15.0, help_heading = "Page")]
    margin_bottom: f32,
    /// Left/right margin (mm)
    #[arg(long, default_value_t = 10.0, help_heading = "Page")]
    margin_x: f32,
    /// Gap between the two rows of images (mm)
    #[arg(long, default_value_t = 15.0, help_heading = "Page")]
    row_spacing: f32,

    // Numbering
    /// Do not label images
    #[arg(long, default_value_t = false, help_heading = "Numbering")]
    no_numbering: bool,
    /// Number of the first image
    #[arg(long, default_value_t = 1, allow_negative_numbers = true, help_heading = "Numbering")]
    start: i64,
    /// Label font size (pt)
    #[arg(long, default_value_t = 12.0, help_heading = "Numbering")]
    font_size: f32,
    /// Distance from image bottom to label baseline (mm)
    #[arg(long, default_value_t = 6.0, help_heading = "Numbering")]
    label_offset: f32,

    /// Decode images in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Performance")]
    parallel: bool,

    // Export
    /// Layout-only: compute placements and write JSON (no PDF)
    #[arg(long, default_value_t = false, help_heading = "Export")]
    layout_only: bool,
    /// Export layout stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct TemplateArgs {
    #[command(subcommand)]
    action: TemplateAction,
}

#[derive(Subcommand, Debug, Clone)]
enum TemplateAction {
    /// List bundled templates and whether they are present
    List {
        /// Directory holding the bundled templates
        #[arg(long, default_value = "templates")]
        dir: PathBuf,
    },
    /// Copy a bundled template: ledger | request
    Get {
        kind: String,
        /// Directory holding the bundled templates
        #[arg(long, default_value = "templates")]
        dir: PathBuf,
        /// Output directory
        #[arg(short, long, default_value = "out")]
        out_dir: PathBuf,
    },
    /// Take in an .xlsx file and write it back out as custom.xlsx
    Custom {
        /// Workbook to upload
        file: Option<PathBuf>,
        /// Output directory
        #[arg(short, long, default_value = "out")]
        out_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Generate(args) => run_generate(args, cli.progress && !cli.quiet),
        Commands::Layout(args) => {
            let mut a = args.clone();
            a.layout_only = true;
            run_generate(&a, cli.progress && !cli.quiet)
        }
        Commands::Template(t) => run_template(&t.action),
    }
}

fn run_generate(cli: &GenerateArgs, show_progress: bool) -> anyhow::Result<()> {
    let page_size: PageSize = cli
        .page_size
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown page size: {}", cli.page_size))?;
    let mut cfg = LayoutConfig::builder()
        .page_size(page_size)
        .margins(cli.margin_top, cli.margin_bottom, cli.margin_x)
        .row_spacing(cli.row_spacing)
        .label_offset(cli.label_offset)
        .font_size(cli.font_size)
        .numbering(!cli.no_numbering)
        .start_number(cli.start)
        .parallel(cli.parallel)
        .build();

    // Load config file if provided; present keys override flags
    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        cfg = y.into_layout_config(cfg)?;
    }

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }
    cfg.validate()?;

    let paths = gather_paths(&cli.inputs, &cli.include, &cli.exclude)?;
    let assets = load_assets(&paths)?;
    if assets.is_empty() {
        warn!(
            candidates = paths.len(),
            "no images selected; nothing to generate"
        );
        return Ok(());
    }
    info!(count = assets.len(), "selected images");

    if !cli.dry_run {
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
    }

    let bar = progress_bar(show_progress, "placing")?;
    let on_progress = |pct: u8| {
        if let Some(b) = &bar {
            b.set_position(pct as u64);
        }
    };

    let layout = if cli.layout_only {
        let decoded = decode_all(&assets, cfg.parallel)?;
        let items: Vec<LayoutItem<String>> = decoded
            .iter()
            .map(|d| {
                let (w, h) = d.dimensions();
                LayoutItem {
                    key: d.name().to_string(),
                    w,
                    h,
                }
            })
            .collect();
        let layout = layout_items(items, &cfg, &Helvetica, on_progress)?;
        if !cli.dry_run {
            let json_path = cli
                .out_dir
                .join(Path::new(OUTPUT_FILE_NAME).with_extension("json"));
            let json = serde_json::to_string_pretty(&snapbox_core::to_json(&layout))?;
            fs::write(&json_path, json)
                .with_context(|| format!("write {}", json_path.display()))?;
            info!(?json_path, pages = layout.pages.len(), "layout written");
        }
        layout
    } else {
        let doc = generate(&assets, &cfg, on_progress)?;
        if !cli.dry_run {
            let pdf_path = cli.out_dir.join(&doc.file_name);
            fs::write(&pdf_path, &doc.bytes)
                .with_context(|| format!("write {}", pdf_path.display()))?;
            info!(?pdf_path, pages = doc.page_count(), "pdf written");
        }
        doc.layout
    };
    if let Some(b) = &bar {
        b.finish_and_clear();
    }

    let stats = layout.stats();
    info!(
        pages = stats.num_pages,
        images = stats.num_images,
        empty_slots = stats.empty_slots,
        coverage = format!("{:.2}%", stats.coverage * 100.0),
        "stats"
    );

    if let Some(stats_path) = &cli.export_stats {
        let value = snapbox_core::stats_json(&layout);
        if !cli.dry_run {
            fs::write(stats_path, serde_json::to_string_pretty(&value)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        } else {
            println!("{}", stats.summary());
        }
    }
    Ok(())
}

fn run_template(action: &TemplateAction) -> anyhow::Result<()> {
    match action {
        TemplateAction::List { dir } => {
            let store = TemplateStore::new(dir);
            for (kind, present) in store.available() {
                println!(
                    "{:<16} {:<14} {}",
                    format!("{:?}", kind),
                    kind.file_name(),
                    if present { "available" } else { "missing" }
                );
            }
        }
        TemplateAction::Get { kind, dir, out_dir } => {
            let kind: TemplateKind = kind
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown template: {}", kind))?;
            let store = TemplateStore::new(dir);
            let path = store.download(kind, out_dir)?;
            println!("{}", path.display());
        }
        TemplateAction::Custom { file, out_dir } => {
            let upload = file
                .as_deref()
                .map(UploadedTemplate::from_path)
                .transpose()?;
            let path = save_uploaded(upload.as_ref(), out_dir)?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn gather_paths(
    inputs: &[PathBuf],
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    // Build glob matchers
    let mut inc_set = None;
    if !include.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in include {
            b.add(Glob::new(pat)?);
        }
        inc_set = Some(b.build()?);
    }
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }
    let mut list: Vec<PathBuf> = Vec::new();
    for path in inputs {
        if path.is_file() {
            if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) {
                list.push(path.to_path_buf());
            }
        } else {
            // sorted so selection order does not depend on the filesystem
            for entry in WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) {
                    list.push(p.to_path_buf());
                }
            }
        }
    }
    Ok(list)
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

/// Reads the image candidates, in order. Non-images are skipped by extension, unread.
fn load_assets(paths: &[PathBuf]) -> anyhow::Result<Vec<ImageAsset>> {
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let mime = mime_from_path(p);
        if !mime.starts_with("image/") {
            debug!(path = %p.display(), %mime, "not an image, skipped");
            continue;
        }
        let asset =
            ImageAsset::from_path(p).with_context(|| format!("read {}", p.display()))?;
        list.push(asset);
    }
    Ok(list)
}

fn progress_bar(show: bool, what: &str) -> anyhow::Result<Option<ProgressBar>> {
    if !show {
        return Ok(None);
    }
    let b = ProgressBar::new(100);
    b.set_style(ProgressStyle::with_template(
        "{spinner:.green} {msg} {pos}% [{elapsed_precise}] {wide_bar}",
    )?);
    b.set_message(what.to_string());
    Ok(Some(b))
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    page_size: Option<String>,
    margin_top: Option<f32>,
    margin_bottom: Option<f32>,
    margin_x: Option<f32>,
    row_spacing: Option<f32>,
    label_offset: Option<f32>,
    font_size: Option<f32>,
    numbering: Option<YamlNumbering>,
    start_number: Option<i64>,
    parallel: Option<bool>,
}

/// `numbering: false` or the `{ enabled, start }` table written by `--print-config`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum YamlNumbering {
    Flag(bool),
    Table {
        enabled: Option<bool>,
        start: Option<i64>,
    },
}

impl YamlConfig {
    fn into_layout_config(self, mut cfg: LayoutConfig) -> anyhow::Result<LayoutConfig> {
        if let Some(v) = self.page_size {
            cfg.page_size = v
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown page size in config: {}", v))?;
        }
        if let Some(v) = self.margin_top {
            cfg.margin_top = v;
        }
        if let Some(v) = self.margin_bottom {
            cfg.margin_bottom = v;
        }
        if let Some(v) = self.margin_x {
            cfg.margin_x = v;
        }
        if let Some(v) = self.row_spacing {
            cfg.row_spacing = v;
        }
        if let Some(v) = self.label_offset {
            cfg.label_offset = v;
        }
        if let Some(v) = self.font_size {
            cfg.font_size = v;
        }
        match self.numbering {
            Some(YamlNumbering::Flag(v)) => cfg.numbering.enabled = v,
            Some(YamlNumbering::Table { enabled, start }) => {
                if let Some(v) = enabled {
                    cfg.numbering.enabled = v;
                }
                if let Some(v) = start {
                    cfg.numbering.start = v;
                }
            }
            None => {}
        }
        if let Some(v) = self.start_number {
            cfg.numbering.start = v;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}
