//! Kondukto CLI binary.
//!
//! A command-line interface for interacting with the Kondukto API.

use std::process::ExitCode;

use clap::Parser;
use kdt::cli::{
    Cli, Command, EndpointAction, Outcome, ProductAction, ProjectAction, ReleaseArgs,
    SbomAction, ScanAction, ScanParamsAction, ScanStartArgs,
};
use kdt::config::FileConfig;
use kdt::lifecycle::{ScanController, WaitMode};
use kdt::{
    Config, Create, CustomParams, Event, Get, KonduktoClient, KdtError, Label, List, ParamValue,
    PrettyPrint, Product, ProductCreateParams, ProductListQuery, Project, ProjectCreateParams,
    ProjectListQuery, ProjectRef, ProjectSource, ProjectUpdateParams, Scan, ScanParams,
    ScanParamsCreate, ScanParamsQuery, Team, TeamListQuery, Update,
};
use serde::Serialize;
use tabled::{Table, Tabled};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::Version { offline } = cli.command {
        return print_version(offline).await;
    }

    let client = match connect(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set KONDUKTO_HOST and KONDUKTO_TOKEN or run with --host/--token");
            return ExitCode::from(e.exit_code());
        }
    };

    match run(&client, cli).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "kdt=debug" } else { "kdt=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn connect(cli: &Cli) -> kdt::Result<KonduktoClient> {
    let file = FileConfig::discover(cli.config.as_deref())?;
    let config = Config::resolve(cli.overrides(), file)?;
    tracing::debug!(?config, "configuration resolved");
    KonduktoClient::new(&config)
}

async fn print_version(offline: bool) -> ExitCode {
    let current = env!("CARGO_PKG_VERSION");
    println!("kdt {current}");

    if !offline {
        match kdt::update_check::check_for_update(current).await {
            Ok(Some(latest)) => println!("A newer version is available: v{latest}"),
            Ok(None) => {}
            Err(e) => tracing::debug!(error = %e, "update check failed"),
        }
    }

    ExitCode::SUCCESS
}

async fn run(client: &KonduktoClient, cli: Cli) -> kdt::Result<Outcome> {
    let json = cli.json;
    match cli.command {
        Command::Project { action } => handle_project(client, action, json).await,
        Command::Product { action } => handle_product(client, action, json).await,
        Command::Teams => {
            let teams = Team::list_all(client, &TeamListQuery::default()).await?;
            output_list(&teams, json, |t| TeamRow::from(t))?;
            Ok(Outcome::Success)
        }
        Command::Labels => {
            let labels = Label::list_all(client, &()).await?;
            output_list(&labels, json, |l| LabelRow::from(l))?;
            Ok(Outcome::Success)
        }
        Command::Scan { action } => handle_scan(client, action, json).await,
        Command::Release(args) => handle_release(client, args, json).await,
        Command::Scanparams { action } => handle_scan_params(client, action, json).await,
        Command::Sbom { action } => handle_sbom(client, action, json).await,
        Command::Endpoint { action } => handle_endpoint(client, action, json).await,
        Command::Version { .. } => Ok(Outcome::Success),
    }
}

async fn handle_project(
    client: &KonduktoClient,
    action: ProjectAction,
    json: bool,
) -> kdt::Result<Outcome> {
    match action {
        ProjectAction::List { name, alm } => {
            let projects = Project::list(client, &ProjectListQuery { name, alm }).await?;
            output_list(&projects, json, |p| ProjectRow::from(p))?;
        }
        ProjectAction::Show { name } => {
            let project = Project::find_by_name(client, &name).await?;
            output_single(&project, json)?;
        }
        ProjectAction::Create {
            name,
            alm_tool,
            repo,
            team,
            labels,
            default_branch,
        } => {
            let params = ProjectCreateParams {
                name,
                source: ProjectSource {
                    tool: alm_tool,
                    url: repo,
                },
                team: team.map(Team::named),
                labels: labels.into_iter().map(Label::named).collect(),
                default_branch,
            };
            let project = Project::create(client, &params).await?;
            output_single(&project, json)?;
        }
        ProjectAction::Update {
            name,
            rename,
            default_branch,
            team,
            labels,
        } => {
            let project = Project::find_by_name(client, &name).await?;
            let params = ProjectUpdateParams {
                name: rename,
                default_branch,
                team: team.map(Team::named),
                labels: labels.map(|l| l.into_iter().map(Label::named).collect()),
            };
            let updated = Project::update(client, project.id, params).await?;
            output_single(&updated, json)?;
        }
    }
    Ok(Outcome::Success)
}

async fn handle_product(
    client: &KonduktoClient,
    action: ProductAction,
    json: bool,
) -> kdt::Result<Outcome> {
    match action {
        ProductAction::List { name } => {
            let products = Product::list_all(client, &ProductListQuery { name }).await?;
            output_list(&products, json, |p| ProductRow::from(p))?;
        }
        ProductAction::Create { name, projects } => {
            let mut refs = Vec::with_capacity(projects.len());
            for project in &projects {
                let project = Project::find_by_name(client, project).await?;
                refs.push(ProjectRef { id: project.id });
            }
            let product = Product::create(
                client,
                &ProductCreateParams {
                    name,
                    projects: refs,
                },
            )
            .await?;
            output_list(std::slice::from_ref(&product), json, |p| ProductRow::from(p))?;
        }
    }
    Ok(Outcome::Success)
}

async fn handle_scan(
    client: &KonduktoClient,
    action: ScanAction,
    json: bool,
) -> kdt::Result<Outcome> {
    match action {
        ScanAction::List { project } => {
            let project = Project::find_by_name(client, &project).await?;
            let scans = project.scans(client).await?;
            output_list(&scans, json, |s| ScanRow::from(s))?;
        }
        ScanAction::Show { scan_id } => {
            let scan = Scan::get(client, scan_id).await?;
            output_single(&scan, json)?;
        }
        ScanAction::Status { event_id } => {
            let event = Event::get_status(client, &event_id).await?;
            output_single(&event, json)?;
        }
        ScanAction::Start(args) => return start_scan(client, args, json).await,
    }
    Ok(Outcome::Success)
}

async fn start_scan(
    client: &KonduktoClient,
    args: ScanStartArgs,
    json: bool,
) -> kdt::Result<Outcome> {
    let target = args.target()?;
    let options = args.restart_options()?;
    let thresholds = args.thresholds();
    let mode = args.wait_mode();

    if mode == WaitMode::Async && (!thresholds.is_empty() || args.release_check) {
        tracing::warn!("--async skips threshold and release checks");
    }

    let controller = ScanController::new(client);
    let run = controller
        .run(&target, options.as_ref(), mode, |event| {
            // Keep stdout machine-readable in JSON mode
            if json {
                eprintln!("{}", event.pretty_print());
            } else {
                println!("{}", event.pretty_print());
            }
        })
        .await?;

    let Some(event) = run.completed else {
        if json {
            print_json(&serde_json::json!({
                "scan_id": run.scan_id,
                "event_id": run.event_id,
            }))?;
        } else {
            println!("Scan {} started (event {})", run.scan_id, run.event_id);
        }
        return Ok(Outcome::Success);
    };

    let finished_scan_id = if event.scan_id.is_empty() {
        run.scan_id.clone()
    } else {
        event.scan_id.clone()
    };
    if !json {
        println!("Scan {finished_scan_id} finished");
    }

    let mut outcome = Outcome::Success;

    if !thresholds.is_empty() {
        let scan = Scan::get(client, finished_scan_id).await?;
        let breaches = thresholds.check(&scan);
        if json {
            print_json(&breaches)?;
        } else {
            println!("{}", scan.pretty_print());
            println!("{}", breaches.pretty_print());
        }
        if !breaches.is_empty() {
            outcome = outcome.then(Outcome::ThresholdFailed);
        }
    }

    if args.release_check {
        let project = run.project.ok_or_else(|| {
            KdtError::InvalidArgument("--release-check needs --project".to_string())
        })?;
        let verdict = kdt::release::evaluate(client, &project.id, &args.release_categories).await?;
        output_single(&verdict, json)?;
        if !verdict.passed {
            outcome = outcome.then(Outcome::ReleaseFailed);
        }
    }

    Ok(outcome)
}

async fn handle_release(
    client: &KonduktoClient,
    args: ReleaseArgs,
    json: bool,
) -> kdt::Result<Outcome> {
    let project = Project::find_by_name(client, &args.project).await?;
    let verdict = kdt::release::evaluate(client, &project.id, &args.categories).await?;
    output_single(&verdict, json)?;

    if args.details {
        for failing in &verdict.failing {
            match failing.scan(client).await {
                Ok(scan) => output_single(&scan, json)?,
                Err(e) => tracing::warn!(category = %failing.category, error = %e, "no scan details"),
            }
        }
    }

    Ok(if verdict.passed {
        Outcome::Success
    } else {
        Outcome::ReleaseFailed
    })
}

async fn handle_scan_params(
    client: &KonduktoClient,
    action: ScanParamsAction,
    json: bool,
) -> kdt::Result<Outcome> {
    match action {
        ScanParamsAction::List {
            project,
            tool,
            branch,
        } => {
            let project = Project::find_by_name(client, &project).await?;
            let query = ScanParamsQuery {
                project: project.id,
                tool,
                branch,
            };
            let params = ScanParams::list_all(client, &query).await?;
            output_list(&params, json, |p| ScanParamsRow::from(p))?;
        }
        ScanParamsAction::Create {
            project,
            tool,
            branch,
            params,
        } => {
            let project = Project::find_by_name(client, &project).await?;
            let custom = if params.is_empty() {
                None
            } else {
                Some(CustomParams {
                    params: ParamValue::from_assignments(&params)?,
                })
            };
            let created = ScanParams::create(
                client,
                &ScanParamsCreate {
                    project: project.id,
                    tool,
                    branch,
                    custom,
                },
            )
            .await?;
            output_list(std::slice::from_ref(&created), json, |p| ScanParamsRow::from(p))?;
        }
    }
    Ok(Outcome::Success)
}

async fn handle_sbom(
    client: &KonduktoClient,
    action: SbomAction,
    json: bool,
) -> kdt::Result<Outcome> {
    match action {
        SbomAction::Import {
            file,
            project,
            branch,
        } => {
            let receipt =
                kdt::import::import_sbom(client, &file, &project, branch.as_deref()).await?;
            if json {
                print_json(&receipt)?;
            } else {
                println!("SBOM imported: {}", receipt.message);
            }
        }
    }
    Ok(Outcome::Success)
}

async fn handle_endpoint(
    client: &KonduktoClient,
    action: EndpointAction,
    json: bool,
) -> kdt::Result<Outcome> {
    match action {
        EndpointAction::Import {
            file,
            project,
            format,
            branch,
        } => {
            let project = Project::find_by_name(client, &project).await?;
            let receipt = kdt::import::import_endpoints(
                client,
                &project.id,
                &file,
                format,
                branch.as_deref(),
            )
            .await?;
            if json {
                print_json(&receipt)?;
            } else {
                println!("Endpoints imported: {}", receipt.message);
            }
        }
    }
    Ok(Outcome::Success)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> kdt::Result<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(KdtError::Encoding)?;
    println!("{rendered}");
    Ok(())
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> kdt::Result<()> {
    if json {
        print_json(item)
    } else {
        println!("{}", item.pretty_print());
        Ok(())
    }
}

fn output_list<T, R, F>(items: &[T], json: bool, to_row: F) -> kdt::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        print_json(items)
    } else {
        let rows: Vec<R> = items.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        println!("\n{} item(s)", items.len());
        Ok(())
    }
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct ProjectRow {
    id: String,
    name: String,
    team: String,
    labels: String,
    #[tabled(rename = "default branch")]
    default_branch: String,
}

impl From<&Project> for ProjectRow {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            team: p.team.as_ref().map(|t| t.name.clone()).unwrap_or_default(),
            labels: p.label_names().join(", "),
            default_branch: p.default_branch.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct ProductRow {
    id: String,
    name: String,
    projects: u32,
}

impl From<&Product> for ProductRow {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            projects: p.projects_count,
        }
    }
}

#[derive(Tabled)]
struct TeamRow {
    id: String,
    name: String,
}

impl From<&Team> for TeamRow {
    fn from(t: &Team) -> Self {
        Self {
            id: t.id.clone(),
            name: t.name.clone(),
        }
    }
}

#[derive(Tabled)]
struct LabelRow {
    id: String,
    name: String,
    color: String,
}

impl From<&Label> for LabelRow {
    fn from(l: &Label) -> Self {
        Self {
            id: l.id.clone(),
            name: l.name.clone(),
            color: l.color.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct ScanRow {
    id: String,
    name: String,
    tool: String,
    branch: String,
    crit: u32,
    high: u32,
    med: u32,
    low: u32,
    score: u32,
    date: String,
}

impl From<&Scan> for ScanRow {
    fn from(s: &Scan) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            tool: s.tool.clone(),
            branch: s.branch.clone().unwrap_or_default(),
            crit: s.summary.critical,
            high: s.summary.high,
            med: s.summary.medium,
            low: s.summary.low,
            score: s.score,
            date: s
                .date
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct ScanParamsRow {
    id: String,
    tool: String,
    branch: String,
    custom: String,
}

impl From<&ScanParams> for ScanParamsRow {
    fn from(p: &ScanParams) -> Self {
        Self {
            id: p.id.clone(),
            tool: p.tool.clone(),
            branch: p.branch.clone().unwrap_or_default(),
            custom: p
                .custom
                .as_ref()
                .and_then(|c| serde_json::to_string(&c.params).ok())
                .unwrap_or_default(),
        }
    }
}
