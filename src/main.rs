use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use dre_reports::config::{
    config_dir, load_config, resolve_output_dir, snapshot_file, Config, CONFIG_TEMPLATE,
};
use dre_reports::dashboard::{
    load_snapshot, sample, Cenario, Comparacao, DashboardData, Entidade, FilterState, Moeda,
    Periodo, Snapshot,
};
use dre_reports::error::{ReportError, Result};
use dre_reports::export::{ExportRequest, Exporter, Notification};
use dre_reports::report::{
    get_template_by_id, get_templates_by_category, ExportFormat, OptionOverrides, Orientacao,
    TEMPLATES,
};

#[derive(Parser)]
#[command(name = "dre")]
#[command(version, about = "Income statement (DRE) reports in PDF, XLSX, CSV, TXT and XML", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.dre or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with template files
    Init,

    /// List report templates
    Templates {
        /// Only show one category (dre, analise, executivo)
        #[arg(long)]
        category: Option<String>,
    },

    /// Show the dashboard indicators for a filter selection
    Show {
        #[command(flatten)]
        filters: FilterArgs,

        /// Dashboard snapshot JSON (default: sample data for the filters)
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Export a report
    Export {
        /// Report title; resolves the template and names the file
        #[arg(short, long)]
        title: Option<String>,

        /// Template id (see 'dre templates')
        #[arg(long)]
        template: Option<String>,

        /// Output format: pdf, xlsx, csv, txt or xml
        #[arg(short, long, default_value = "pdf")]
        format: String,

        #[command(flatten)]
        filters: FilterArgs,

        /// Dashboard snapshot JSON (default: sample data for the filters)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Output directory (default: [export] output_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave out comparison columns
        #[arg(long)]
        no_comparison: bool,

        /// Leave out charts
        #[arg(long)]
        no_charts: bool,

        /// Leave out detail sections
        #[arg(long)]
        no_details: bool,

        /// Add the signature block
        #[arg(long)]
        signature: bool,

        /// Leave out the footer
        #[arg(long)]
        no_footer: bool,

        /// PDF page orientation: retrato or paisagem
        #[arg(long)]
        orientation: Option<String>,

        /// Open the exported file with the system default viewer
        #[arg(long)]
        open: bool,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Month, e.g. dezembro-2024 (default: current month)
    #[arg(long, conflicts_with_all = ["inicio", "fim"])]
    periodo: Option<String>,

    /// Range start (YYYY-MM-DD)
    #[arg(long, requires = "fim")]
    inicio: Option<String>,

    /// Range end (YYYY-MM-DD)
    #[arg(long, requires = "inicio")]
    fim: Option<String>,

    /// consolidado, individual, filial-1 or filial-2
    #[arg(long)]
    entidade: Option<String>,

    /// Cost center (not available for consolidado)
    #[arg(long)]
    centro_custo: Option<String>,

    /// real, orcado, forecast, projetado or realizado
    #[arg(long)]
    cenario: Option<String>,

    /// mes-anterior, ano-anterior, periodo-anterior, orcado or forecast
    #[arg(long)]
    comparacao: Option<String>,

    /// BRL, USD or EUR (default: [export] moeda)
    #[arg(long)]
    moeda: Option<String>,

    /// Decimal places, 0-4 (default: [export] precisao)
    #[arg(long)]
    precisao: Option<u8>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Templates { category } => cmd_templates(category.as_deref()),
        Commands::Show { filters, data } => cmd_show(&cfg_dir, &filters, data.as_deref()),
        Commands::Export {
            title,
            template,
            format,
            filters,
            data,
            output,
            no_comparison,
            no_charts,
            no_details,
            signature,
            no_footer,
            orientation,
            open,
        } => {
            let overrides = OptionOverrides {
                incluir_comparacao: no_comparison.then_some(false),
                incluir_graficos: no_charts.then_some(false),
                incluir_detalhamento: no_details.then_some(false),
                incluir_assinatura: signature.then_some(true),
                incluir_rodape: no_footer.then_some(false),
                orientacao: orientation
                    .as_deref()
                    .map(str::parse::<Orientacao>)
                    .transpose()?,
            };
            let args = ExportArgs {
                title,
                template,
                format: format.parse()?,
                data,
                output,
                overrides,
                open,
            };
            cmd_export(&cfg_dir, &filters, args)
        }
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(ReportError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    // Create directories
    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;

    // Write template files
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    let example = sample::generate(&FilterState::default());
    let json = serde_json::to_string_pretty(&example)
        .map_err(|e| ReportError::render("JSON", e))?;
    fs::write(snapshot_file(cfg_dir), json)?;

    println!("Initialized DRE config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your company details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!(
        "  2. Adjust the example figures: $EDITOR {}",
        snapshot_file(cfg_dir).display()
    );
    println!();
    println!("Then export your first report:");
    println!("  dre export --title \"DRE Gerencial\" --format pdf");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "FREQUENCY")]
    frequency: String,
    #[tabled(rename = "SECTIONS")]
    sections: usize,
}

#[derive(Tabled)]
struct IndicatorRow {
    #[tabled(rename = "INDICADOR")]
    label: String,
    #[tabled(rename = "VALOR")]
    value: String,
    #[tabled(rename = "VARIAÇÃO")]
    change: String,
    #[tabled(rename = "TENDÊNCIA")]
    trend: String,
}

/// List report templates
fn cmd_templates(category: Option<&str>) -> Result<()> {
    let templates: Vec<_> = match category {
        Some(category) => get_templates_by_category(category),
        None => TEMPLATES.iter().collect(),
    };

    if templates.is_empty() {
        println!("No templates in category '{}'.", category.unwrap_or_default());
        return Ok(());
    }

    let rows: Vec<TemplateRow> = templates
        .iter()
        .map(|t| TemplateRow {
            id: t.id.to_string(),
            name: t.name.to_string(),
            category: t.category.to_string(),
            frequency: t.frequency.to_string(),
            sections: t.sections.len(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ReportError::InvalidDateRange(format!("'{value}' is not a date (expected YYYY-MM-DD)"))
    })
}

/// Apply the filter flags in dashboard order: entity before cost center,
/// period mode before comparison.
fn build_filters(args: &FilterArgs, config: &Config) -> Result<FilterState> {
    let periodo = match &args.periodo {
        Some(p) => p.parse::<Periodo>()?,
        None => Periodo::current(),
    };
    let mut filters = FilterState::for_month(periodo);
    filters.moeda = config.export.moeda;
    filters.set_precisao(config.export.precisao)?;

    if let Some(entidade) = &args.entidade {
        filters.set_entidade(entidade.parse::<Entidade>()?);
    }
    if let Some(centro) = &args.centro_custo {
        filters.set_centro_custo(Some(centro.clone()))?;
    }
    if let Some(cenario) = &args.cenario {
        filters.cenario = cenario.parse::<Cenario>()?;
    }
    if let (Some(inicio), Some(fim)) = (&args.inicio, &args.fim) {
        filters.set_intervalo(parse_date(inicio)?, parse_date(fim)?)?;
    }
    if let Some(comparacao) = &args.comparacao {
        filters.set_comparacao(comparacao.parse::<Comparacao>()?)?;
    }
    if let Some(moeda) = &args.moeda {
        filters.moeda = moeda.parse::<Moeda>()?;
    }
    if let Some(precisao) = args.precisao {
        filters.set_precisao(precisao)?;
    }

    Ok(filters)
}

fn load_data(data: Option<&Path>, filters: &FilterState) -> Result<DashboardData> {
    match data {
        Some(path) => load_snapshot(path),
        None => Ok(sample::generate(filters)),
    }
}

fn load_snapshot_for(cfg_dir: &Path, args: &FilterArgs, data: Option<&Path>) -> Result<(Config, Snapshot)> {
    if !cfg_dir.exists() {
        return Err(ReportError::ConfigNotFound(cfg_dir.to_path_buf()));
    }

    let config = load_config(cfg_dir)?;
    let filters = build_filters(args, &config)?;
    let data = load_data(data, &filters)?;
    let snapshot = Snapshot::new(config.company.clone(), data, filters);
    Ok((config, snapshot))
}

/// Show the dashboard indicators
fn cmd_show(cfg_dir: &Path, args: &FilterArgs, data: Option<&Path>) -> Result<()> {
    let (_, snapshot) = load_snapshot_for(cfg_dir, args, data)?;

    println!(
        "{} • {} • {} • {}",
        snapshot.company.name,
        snapshot.filters.entidade().label(),
        snapshot.filters.cenario.label(),
        snapshot.filters.periodo_label()
    );

    let rows: Vec<IndicatorRow> = snapshot
        .data
        .indicators()
        .iter()
        .map(|(label, metric)| IndicatorRow {
            label: label.to_string(),
            value: metric.value.clone(),
            change: metric.change.clone(),
            trend: format!("{} {}", metric.trend.arrow(), metric.trend.label()),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

struct ExportArgs {
    title: Option<String>,
    template: Option<String>,
    format: ExportFormat,
    data: Option<PathBuf>,
    output: Option<PathBuf>,
    overrides: OptionOverrides,
    open: bool,
}

/// Export a report to the output directory
fn cmd_export(cfg_dir: &Path, filters: &FilterArgs, args: ExportArgs) -> Result<()> {
    let (config, snapshot) = load_snapshot_for(cfg_dir, filters, args.data.as_deref())?;

    let title = match (&args.title, &args.template) {
        (Some(title), _) => title.clone(),
        (None, Some(id)) => get_template_by_id(id)
            .map(|t| t.name.to_string())
            .ok_or_else(|| ReportError::TemplateNotFound(id.clone()))?,
        (None, None) => {
            return Err(ReportError::InvalidFilter(
                "either --title or --template is required".to_string(),
            ))
        }
    };

    let mut overrides = args.overrides;
    if overrides.orientacao.is_none() {
        overrides.orientacao = Some(config.pdf.orientation);
    }

    let mut request = ExportRequest::new(title, args.format).overrides(overrides);
    if let Some(id) = args.template {
        request = request.template(id);
    }

    let output_dir = match args.output {
        Some(dir) => dir,
        None => resolve_output_dir(&config.export.output_dir, cfg_dir),
    };

    let mut exporter = Exporter::new(output_dir);
    let outcome = exporter.export(&snapshot, &request).inspect_err(|e| {
        let notification = Notification::failure(e);
        eprintln!("{}: {}", notification.title, notification.description);
    })?;

    let notification = Notification::success(&outcome);
    println!("{}: {}", notification.title, notification.description);

    if args.open {
        open_path(&outcome.path)?;
    }

    Ok(())
}

fn open_path(path: &Path) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", ""])
            .arg(path)
            .spawn()?;
    }
    Ok(())
}
