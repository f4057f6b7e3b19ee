use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use scraper::ElementRef;
use tablegrab::{
    DirectorySink, DownloadSink, ExportFormat, ExtractOptions, ExtractionResult, Extractor,
    FallbackLocalizer, JsonSettingsFile, Localizer, MessageCatalog, Page, Scanner, Settings,
    SettingsStore, classify, export, export_file_name, sanitize_export_name, sheet_name_for,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "tablegrab",
    version,
    about = "Extract HTML and UI-framework tables into spreadsheets"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the tables that would get an export control.
    Scan(ScanArgs),
    /// Extract one table and write it as XLSX or CSV.
    Extract(ExtractArgs),
    /// Extract one table and print the grid, merges and links as JSON.
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
struct ScanArgs {
    /// Input HTML path.
    #[arg(short, long)]
    input: PathBuf,

    /// Address the page was saved from, checked against excluded urls.
    #[arg(long)]
    url: Option<String>,

    /// Settings JSON file.
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Input HTML path.
    #[arg(short, long)]
    input: PathBuf,

    /// Index of the discovered table, as listed by `scan`.
    #[arg(long, default_value_t = 0, conflicts_with = "selector")]
    target: usize,

    /// Start extraction from the first element matching this CSS selector.
    #[arg(long)]
    selector: Option<String>,

    /// Keep columns in which no cell is visible.
    #[arg(long)]
    all_columns: bool,

    /// Do not collect hyperlinks.
    #[arg(long)]
    no_links: bool,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output path.
    #[arg(short, long)]
    output: PathBuf,

    /// xlsx or csv; inferred from the output extension when omitted.
    #[arg(long)]
    format: Option<String>,

    /// Worksheet name; defaults to the table's caption or the page title.
    #[arg(long)]
    sheet_name: Option<String>,

    /// Base for resolving relative hyperlinks.
    #[arg(long)]
    base_url: Option<String>,

    /// Localized messages.json.
    #[arg(long)]
    messages: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct InspectArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Pretty-print the JSON.
    #[arg(long)]
    pretty: bool,
}

impl SourceArgs {
    fn options(&self) -> ExtractOptions {
        ExtractOptions {
            only_visible_columns: !self.all_columns,
            preserve_hyperlinks: !self.no_links,
        }
    }
}

fn load_page(path: &Path) -> Result<Page> {
    let page = Page::from_path(path)
        .with_context(|| format!("failed to load page '{}'", path.display()))?;
    debug!(encoding = page.encoding().name(), "decoded page");
    Ok(page)
}

fn select_source<'a>(page: &'a Page, args: &SourceArgs) -> Result<ElementRef<'a>> {
    if let Some(css) = &args.selector {
        return page
            .select_first(css)
            .context("failed to parse --selector")?
            .ok_or_else(|| anyhow!("no element matches selector '{css}'"));
    }

    let targets = Scanner::new().scan_document(page.html());
    let target = targets.get(args.target).ok_or_else(|| {
        anyhow!(
            "table {} not found, the page has {} exportable table(s)",
            args.target,
            targets.len()
        )
    })?;
    target
        .anchor_element(page.html())
        .ok_or_else(|| anyhow!("table {} is not an element", args.target))
}

fn extract_source<'a>(
    page: &'a Page,
    args: &SourceArgs,
) -> Result<(ElementRef<'a>, ExtractionResult)> {
    let node = select_source(page, args)?;
    let result = Extractor::new().extract(node, &args.options());
    info!(
        rows = result.row_count(),
        columns = result.column_count(),
        merges = result.merges.len(),
        links = result.links.len(),
        "extracted table"
    );
    Ok((node, result))
}

fn load_localizer(messages: Option<&Path>) -> Result<Box<dyn Localizer>> {
    match messages {
        Some(path) => {
            let catalog = MessageCatalog::from_path(path).context("failed to load --messages")?;
            Ok(Box::new(catalog))
        }
        None => Ok(Box::new(FallbackLocalizer)),
    }
}

fn parse_format(args: &ExtractArgs) -> Result<ExportFormat> {
    if let Some(value) = &args.format {
        return ExportFormat::from_str(value)
            .map_err(|error| anyhow!("{error}"))
            .context("failed to parse --format");
    }
    let inferred = args
        .output
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ExportFormat::from_str(ext).ok())
        .unwrap_or_default();
    Ok(inferred)
}

fn run_scan(args: &ScanArgs) -> Result<usize> {
    let settings = match &args.settings {
        Some(path) => JsonSettingsFile::new(path)
            .load()
            .context("failed to load --settings")?,
        None => Settings::default(),
    };
    if let Some(url) = &args.url
        && settings.is_excluded(url)
    {
        info!(%url, "page is excluded by settings");
        return Ok(0);
    }

    let page = load_page(&args.input)?;
    let targets = Scanner::new().scan_document(page.html());
    let title = page.title();
    for (index, target) in targets.iter().enumerate() {
        let name = page
            .element(target.container)
            .map(|container| sheet_name_for(container, title.as_deref(), &FallbackLocalizer))
            .unwrap_or_default();
        println!("{index}\t{}\t{name}", target.kind);
    }
    Ok(targets.len())
}

fn run_extract(args: &ExtractArgs) -> Result<usize> {
    let format = parse_format(args)?;
    let base_url = args
        .base_url
        .as_deref()
        .map(url::Url::parse)
        .transpose()
        .context("failed to parse --base-url")?;
    let localizer = load_localizer(args.messages.as_deref())?;

    let page = load_page(&args.source.input)?;
    let (node, result) = extract_source(&page, &args.source)?;
    if result.is_empty() {
        return Ok(0);
    }

    let sheet_name = match &args.sheet_name {
        Some(name) => sanitize_export_name(name, localizer.as_ref()),
        None => {
            let table = classify(node).element.unwrap_or(node);
            sheet_name_for(table, page.title().as_deref(), localizer.as_ref())
        }
    };
    let bytes = export(&result, &sheet_name, format, base_url.as_ref())
        .with_context(|| format!("failed to build {format} output"))?;

    let file_name = args
        .output
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| export_file_name(name, format))
        .ok_or_else(|| anyhow!("output path '{}' has no file name", args.output.display()))?;
    let dir = match args.output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let written = DirectorySink::new(dir)
        .deliver(&file_name, &bytes)
        .context("failed to write output")?;
    info!(path = %written.display(), %sheet_name, "wrote export");

    Ok(result.row_count())
}

fn run_inspect(args: &InspectArgs) -> Result<usize> {
    let page = load_page(&args.source.input)?;
    let (_, result) = extract_source(&page, &args.source)?;
    let json = if args.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    }
    .context("failed to serialize extraction result")?;
    println!("{json}");
    Ok(result.row_count())
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tablegrab=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    let outcome = match &cli.command {
        Commands::Scan(args) => run_scan(args),
        Commands::Extract(args) => run_extract(args),
        Commands::Inspect(args) => run_inspect(args),
    };
    match outcome {
        Ok(0) => {
            eprintln!("warning: nothing to export");
            ExitCode::from(2)
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}

