// ==========================================
// avisos 看板 - 命令行入口
// ==========================================
// 职责: 解析命令行 → 加载配置 → 打开会话 → 执行子命令
// 错误: 库层为类型化错误，此处统一用 anyhow 汇总
// ==========================================

use anyhow::{Context, Result};
use avisos_dashboard::config::DashboardConfig;
use avisos_dashboard::domain::{Aviso, ManagedView, Schema};
use avisos_dashboard::engine::FilterCriteria;
use avisos_dashboard::i18n::{self, t, t_with_args};
use avisos_dashboard::{logging, ApiError, DashboardSession, OpenMode, SessionOrigin};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "avisos-dashboard")]
#[command(about = "Clasificación de avisos SAP PM (línea de comandos)")]
#[command(version)]
struct Cli {
    /// Archivo de configuración JSON
    #[arg(long, global = true, env = "AVISOS_CONFIG")]
    config: Option<PathBuf>,

    /// Archivo fuente de predicciones (sobrescribe la configuración)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Archivo de estado persistente (sobrescribe la configuración)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Reconstruir desde el archivo fuente, descartando el estado guardado
    #[arg(long, global = true)]
    rebuild: bool,

    /// Filtro COLUMNA=VALOR (repetible); "(Todos)" no filtra
    #[arg(long = "filter", value_name = "COL=VAL", value_parser = parse_filter, global = true)]
    filters: Vec<(String, String)>,

    /// Salida JSON
    #[arg(long, global = true)]
    json: bool,

    /// Idioma de salida (es, en)
    #[arg(long, global = true)]
    lang: Option<String>,

    /// Registros en formato JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Indicadores generales de la vista filtrada
    Summary,
    /// Listar avisos de la vista filtrada
    List {
        #[arg(long, value_enum, default_value = "all")]
        view: ViewArg,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Opciones de los filtros configurados
    Options,
    /// Promedio de una columna numérica por grupo
    Groups {
        #[arg(long, default_value = "Grupo planif.")]
        group: String,
        #[arg(long, default_value = "criticidad_final")]
        value: String,
    },
    /// Distribución de criticidad (1..100)
    Histogram,
    /// Marcar un aviso como gestionado (o desmarcarlo)
    Manage {
        id: String,
        #[arg(long)]
        unset: bool,
    },
    /// Asignar ticket a un aviso
    Ticket { id: String, value: String },
    /// Combinar Gestionado/Ticket desde un archivo exportado
    ImportState { path: PathBuf },
    /// Exportar la tabla completa a Excel
    ExportXlsx { path: PathBuf },
    /// Exportar la vista filtrada a CSV
    ExportCsv { path: PathBuf },
    /// Color de fondo para un valor de criticidad
    Color { value: Option<f64> },
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    All,
    Managed,
    Unmanaged,
}

impl From<ViewArg> for ManagedView {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::All => ManagedView::All,
            ViewArg::Managed => ManagedView::ManagedOnly,
            ViewArg::Unmanaged => ManagedView::UnmanagedOnly,
        }
    }
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("filtro inválido '{}', se espera COLUMNA=VALOR", raw)),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    let locale = match &cli.lang {
        Some(lang) => i18n::locale_from_env_value(lang),
        None => i18n::locale_from_env_value(&std::env::var("LANG").unwrap_or_default()),
    };
    i18n::set_locale(locale);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ApiError>() {
                Some(ApiError::SourceNotFound(path)) => {
                    eprintln!("{}", t_with_args("errors.source_not_found", &[("path", path.as_str())]));
                }
                _ => {
                    let message = format!("{:#}", err);
                    eprintln!("{}", t_with_args("errors.fatal", &[("message", message.as_str())]));
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = DashboardConfig::load(cli.config.as_deref()).context("configuración")?;
    if let Some(source) = cli.source {
        config.source_path = source;
    }
    if let Some(state) = cli.state {
        config.state_path = state;
    }

    // 取色不需要打开会话
    if let Command::Color { value } = cli.command {
        println!("{}", config.color_mapper().color_hex(value));
        return Ok(());
    }

    let mode = if cli.rebuild {
        OpenMode::Rebuild
    } else {
        OpenMode::Resume
    };
    let mut session = DashboardSession::open(config, mode)?;
    report_origin(&session);

    let criteria = session.criteria(cli.filters);

    match cli.command {
        Command::Summary => cmd_summary(&session, &criteria, cli.json),
        Command::List { view, limit } => cmd_list(&session, &criteria, view.into(), limit, cli.json),
        Command::Options => cmd_options(&session, cli.json),
        Command::Groups { group, value } => cmd_groups(&session, &group, &value, cli.json),
        Command::Histogram => cmd_histogram(&session, &criteria, cli.json),
        Command::Manage { id, unset } => {
            let found = session.set_managed(&id, !unset)?;
            report_edit(&id, found);
            Ok(())
        }
        Command::Ticket { id, value } => {
            let found = session.set_ticket(&id, &value)?;
            report_edit(&id, found);
            Ok(())
        }
        Command::ImportState { path } => {
            let updated = session.import_state(&path)?;
            let count = updated.to_string();
            let shown = path.display().to_string();
            println!("{}", t_with_args("state.merged", &[("count", count.as_str()), ("path", shown.as_str())]));
            Ok(())
        }
        Command::ExportXlsx { path } => {
            session.export_xlsx(&path)?;
            println!("{}", t_with_args("export.done", &[("path", path.display().to_string().as_str())]));
            Ok(())
        }
        Command::ExportCsv { path } => {
            session.export_csv(&path, &criteria)?;
            println!("{}", t_with_args("export.done", &[("path", path.display().to_string().as_str())]));
            Ok(())
        }
        Command::Color { .. } => Ok(()),
    }
}

fn report_origin(session: &DashboardSession) {
    let config = session.config();
    let message = match session.origin() {
        SessionOrigin::Persisted => {
            t_with_args("state.resumed", &[("path", session.state_path().display().to_string().as_str())])
        }
        SessionOrigin::Source => {
            t_with_args("state.rebuilt", &[("path", config.source_path.display().to_string().as_str())])
        }
        SessionOrigin::RebuiltAfterCorruption => {
            t_with_args("state.discarded", &[("path", session.state_path().display().to_string().as_str())])
        }
    };
    eprintln!("{}", message);
}

fn report_edit(id: &str, found: bool) {
    let key = if found { "edit.applied" } else { "edit.not_found" };
    println!("{}", t_with_args(key, &[("id", id)]));
}

fn cmd_summary(session: &DashboardSession, criteria: &FilterCriteria, json: bool) -> Result<()> {
    let summary = session.summary(criteria);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }
    println!("{}", t("summary.title"));
    println!("  {}: {}", t("summary.total"), summary.total);
    println!("  {}: {}", t("summary.mean_criticality"), summary.mean_criticality);
    println!("  {}: {}", t("summary.managed"), summary.managed);
    println!("  {}: {}", t("summary.managed_pct"), summary.managed_pct);
    Ok(())
}

fn print_rows(schema: &Schema, rows: &[&Aviso]) {
    println!("{}", schema.headers().join("\t"));
    for aviso in rows {
        let cells: Vec<String> = schema
            .fields()
            .iter()
            .map(|f| aviso.text_value(*f).unwrap_or_default())
            .collect();
        println!("{}", cells.join("\t"));
    }
}

fn cmd_list(
    session: &DashboardSession,
    criteria: &FilterCriteria,
    view: ManagedView,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let mut rows = session.view(view, criteria);
    let total = rows.len();
    if let Some(limit) = limit {
        rows.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("{}", t("list.empty"));
        return Ok(());
    }
    println!("{}", t_with_args("list.header", &[("count", total.to_string().as_str())]));
    print_rows(session.store().schema(), &rows);
    Ok(())
}

fn cmd_options(session: &DashboardSession, json: bool) -> Result<()> {
    let options = session.all_filter_options();
    if json {
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }
    for (column, values) in options {
        println!("{}: {}", column, values.join(" | "));
    }
    Ok(())
}

fn cmd_groups(session: &DashboardSession, group: &str, value: &str, json: bool) -> Result<()> {
    let stats = session.group_stats(group, value);
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    println!("{}", t_with_args("groups.header", &[("group", group)]));
    for stat in stats {
        println!(
            "  {}\t{}\t({} {})",
            stat.group,
            stat.mean,
            stat.records,
            t("groups.records")
        );
    }
    Ok(())
}

fn cmd_histogram(session: &DashboardSession, criteria: &FilterCriteria, json: bool) -> Result<()> {
    let buckets = session.histogram(criteria);
    if json {
        println!("{}", serde_json::to_string_pretty(&buckets)?);
        return Ok(());
    }
    println!("{}", t("histogram.header"));
    for bucket in buckets.iter().filter(|b| b.count > 0) {
        println!(
            "  {:>3}\t{}\t{}",
            bucket.level,
            bucket.count,
            session.color_for(Some(bucket.level as f64))
        );
    }
    Ok(())
}
