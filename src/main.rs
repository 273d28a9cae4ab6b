use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use csm_core::{
    extract_all, load_table, remove_table, ExtractOption, LoggerOption, ProgressKind,
    SelectorKind, DEFAULT_REST_MODULO,
};
use csm_transformer::{transform_assets, ForceReplace, TransformOption};
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_log() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("LOG")
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Shorten CSS class and id names across a build.
#[derive(Debug, Parser)]
#[command(name = "csm", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Collect selectors from stylesheets into the rename table.
    Extract(ExtractArgs),
    /// Rewrite class and id attribute values in generated assets.
    Rewrite(RewriteArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Stylesheets, processed in the given order.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    #[arg(long, default_value = "extracted-names-for-css.json")]
    output_css: PathBuf,

    #[arg(long, default_value = "extracted-names-for-js.json")]
    output_js: PathBuf,

    /// Name or prefix never renamed, `.name`/`#name` to restrict to one kind.
    #[arg(long)]
    ignore: Vec<String>,

    #[arg(long, default_value_t = DEFAULT_REST_MODULO)]
    rest_modulo: usize,

    /// Milliseconds to sleep every `rest-modulo` lines, otherwise only yield.
    #[arg(long)]
    rest_time: Option<u64>,

    /// bar, line, spinner, dots, dots2 or arc.
    #[arg(long, default_value = "bar")]
    progress: ProgressKind,

    #[arg(long)]
    no_progress: bool,

    #[arg(long)]
    display_result: bool,

    /// Drop existing tables before the first stylesheet.
    #[arg(long)]
    fresh: bool,
}

#[derive(Debug, Args)]
struct RewriteArgs {
    /// Generated assets to rewrite.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Sigil-less (JS) view of the rename table.
    #[arg(long)]
    table: PathBuf,

    /// Attribute rewritten on top of `className` and `id`.
    #[arg(long = "attribute")]
    attributes: Vec<String>,

    #[arg(long)]
    ignore: Vec<String>,

    /// Class name also replaced outside attribute values.
    #[arg(long)]
    force_class: Vec<String>,

    /// Id also replaced outside attribute values.
    #[arg(long)]
    force_id: Vec<String>,

    #[arg(long)]
    display_result: bool,

    /// Write results here instead of overwriting the inputs.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    if args.fresh {
        remove_table(&args.output_css)?;
        remove_table(&args.output_js)?;
    }

    let option = ExtractOption {
        rest_modulo: args.rest_modulo,
        rest_time: args.rest_time,
        ignore: args.ignore,
        logger: LoggerOption {
            logging: !args.no_progress,
            kind: args.progress,
            ..Default::default()
        },
        display_result: args.display_result,
        ..ExtractOption::new(
            String::new(),
            args.output_css.to_string_lossy(),
            args.output_js.to_string_lossy(),
        )
    };

    let sources = args
        .files
        .iter()
        .map(|file| file.to_string_lossy().to_string())
        .collect::<Vec<_>>();

    for source in &sources {
        if !Path::new(source).is_file() {
            bail!("stylesheet not found: {}", source);
        }
    }

    let table = extract_all(&option, &sources)?;

    info!(
        "{} selectors in {} and {}",
        table.len(),
        args.output_css.display(),
        args.output_js.display()
    );

    Ok(())
}

fn run_rewrite(args: RewriteArgs) -> Result<()> {
    let matches = load_table(&args.table);
    if matches.is_empty() {
        warn!("rename table {} is empty, assets stay as they are", args.table.display());
    }

    let force_replace = args
        .force_class
        .into_iter()
        .map(|find| (find, SelectorKind::Class))
        .chain(args.force_id.into_iter().map(|find| (find, SelectorKind::Id)))
        .map(|(find, kind)| ForceReplace { find, kind })
        .collect();

    let options = TransformOption {
        matches,
        attributes: args.attributes,
        ignore: args.ignore,
        force_replace,
        display_result: args.display_result,
    };

    let assets = args
        .files
        .iter()
        .map(|file| {
            let content = fs::read_to_string(file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            Ok((file.to_string_lossy().to_string(), content))
        })
        .collect::<Result<Vec<_>>>()?;

    let outputs = transform_assets(&assets, &options);

    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    }

    for (file, output) in args.files.iter().zip(outputs) {
        let target = match &args.out_dir {
            Some(dir) => dir.join(file.file_name().context("asset path has no file name")?),
            None => file.clone(),
        };

        fs::write(&target, output.content)
            .with_context(|| format!("cannot write {}", target.display()))?;
    }

    Ok(())
}

fn main() -> Result<()> {
    init_log();

    match Cli::parse().command {
        Command::Extract(args) => run_extract(args),
        Command::Rewrite(args) => run_rewrite(args),
    }
}
