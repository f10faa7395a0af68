//! Cascade CLI entry point: loads config, wires the concrete adapters, and
//! dispatches to the [`Orchestrator`].

use std::path::PathBuf;
use std::sync::Arc;

use eyre::{Context, Result};
use tracing::{debug, info};

use cascade::broker::Broker;
use cascade::checker::{build_checker, CheckCache};
use cascade::cli::{Cli, Command, ManifestCommand, OutputFormat};
use cascade::codehost::GithubCodeHost;
use cascade::config::Config;
use cascade::domain::Target;
use cascade::error::CascadeError;
use cascade::executor::Executor;
use cascade::generator;
use cascade::manifest::{load_manifest, validate_manifest};
use cascade::modtool::GoModTool;
use cascade::notifier::NotificationDispatcher;
use cascade::orchestrator::Orchestrator;
use cascade::planner::Planner;
use cascade::runner::ShellCommandRunner;
use cascade::state_store::StateManager;
use cascade::templates::TemplateRenderer;
use cascade::vcs::GitVcs;
use cascade::workspace::Workspace;

use clap::Parser;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) {
    let level_str = cli_log_level.or(config_log_level);
    let level = match level_str.map(|s| s.to_uppercase()) {
        Some(s) if s == "TRACE" => tracing::Level::TRACE,
        Some(s) if s == "DEBUG" => tracing::Level::DEBUG,
        Some(s) if s == "INFO" => tracing::Level::INFO,
        Some(s) if s == "WARN" || s == "WARNING" => tracing::Level::WARN,
        Some(s) if s == "ERROR" => tracing::Level::ERROR,
        Some(s) => {
            eprintln!("Warning: unknown log-level '{s}', defaulting to INFO");
            tracing::Level::INFO
        }
        None => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
    info!(?level, "logging initialized");
}

struct Capabilities {
    orchestrator: Orchestrator,
}

fn build_capabilities(config: &Config) -> Result<Capabilities> {
    let workspace = Workspace::ensure(config.workspace_dir.clone()).context("failed to create workspace directory")?;

    let token = std::env::var(&config.code_host.token_env)
        .map_err(|_| CascadeError::Config(format!("missing env var {}", config.code_host.token_env)))?;
    let code_host = Arc::new(GithubCodeHost::new(config.code_host.base_url.clone(), token));
    let module_tool = Arc::new(GoModTool::new());
    let cache = Arc::new(CheckCache::new(std::time::Duration::from_secs(config.check.cache_ttl_secs)));
    let checker = build_checker(&config.check.strategy, module_tool.clone(), code_host.clone(), Some(cache))
        .map_err(CascadeError::Check)?;

    let planner = Planner::new(checker, TemplateRenderer::new(), workspace.clone());
    let vcs = Arc::new(GitVcs::new());
    let executor = Executor::new(vcs.clone(), module_tool, Arc::new(ShellCommandRunner::new()), workspace.clone());
    let broker = Broker::new(code_host);
    let notifications = NotificationDispatcher::new(Vec::new());
    let state = StateManager::spawn(config.state_dir.clone());

    let orchestrator = Orchestrator::new(planner, executor, broker, notifications, state, vcs, workspace);
    Ok(Capabilities { orchestrator })
}

fn print_plan(plan: &cascade::domain::Plan, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(plan)?),
        OutputFormat::Text => {
            println!(
                "Plan: {} dependents, {} work items, {} already up to date",
                plan.stats.total_dependents, plan.stats.work_items_created, plan.stats.skipped_up_to_date
            );
            for item in &plan.items {
                println!("  {} -> branch {}", item.repo, item.branch_name);
            }
        }
    }
    Ok(())
}

fn print_report(report: &cascade::orchestrator::RunReport, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "total": report.total,
                "completed": report.completed,
                "manual_review": report.manual_review,
                "skipped": report.skipped,
                "failed": report.failed,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!(
                "{} total: {} completed, {} manual review, {} skipped, {} failed",
                report.total, report.completed, report.manual_review, report.skipped, report.failed
            );
        }
    }
    Ok(())
}

fn target(module: String, version: String) -> Result<Target, CascadeError> {
    Target::new(module, version).map_err(|e| CascadeError::Validation(e.to_string()))
}

fn load_validated_manifest(path: &PathBuf) -> Result<cascade::manifest::Manifest, CascadeError> {
    Ok(load_manifest(path)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load(cli.config.as_deref()).ok().and_then(|c| c.log_level);
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref());

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    debug!(command = ?cli.command, "main: dispatching command");

    let result: Result<(), CascadeError> = match cli.command {
        Command::Version => {
            println!("cascade {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }

        Command::Plan { module, version, manifest, parallelism, force_all, format } => async {
            let target = target(module, version)?;
            let manifest = load_validated_manifest(&manifest)?;
            let caps = build_capabilities(&config).map_err(|e| CascadeError::Planning(e.to_string()))?;
            let plan = caps
                .orchestrator
                .plan(&manifest, &target, parallelism, force_all)
                .await
                .map_err(|e| CascadeError::Planning(e.to_string()))?;
            print_plan(&plan, &format).map_err(|e| CascadeError::Planning(e.to_string()))?;
            Ok(())
        }
        .await,

        Command::Release { module, version, manifest, parallelism, force_all, dry_run, format } => async {
            let target = target(module, version)?;
            let manifest = load_validated_manifest(&manifest)?;
            let caps = build_capabilities(&config).map_err(|e| CascadeError::Execution(e.to_string()))?;
            if dry_run {
                let plan = caps
                    .orchestrator
                    .plan(&manifest, &target, parallelism, force_all)
                    .await
                    .map_err(|e| CascadeError::Execution(e.to_string()))?;
                print_plan(&plan, &format).map_err(|e| CascadeError::Execution(e.to_string()))?;
                return Ok(());
            }
            let report = caps
                .orchestrator
                .release(&manifest, &target, parallelism, force_all)
                .await
                .map_err(|e| CascadeError::Execution(e.to_string()))?;
            print_report(&report, &format).map_err(|e| CascadeError::Execution(e.to_string()))?;
            Ok(())
        }
        .await,

        Command::Resume { module, version, manifest, parallelism, force_all, dry_run, format } => async {
            let target = target(module, version)?;
            let manifest = load_validated_manifest(&manifest)?;
            let caps = build_capabilities(&config).map_err(|e| CascadeError::Execution(e.to_string()))?;
            if dry_run {
                let plan = caps
                    .orchestrator
                    .plan(&manifest, &target, parallelism, force_all)
                    .await
                    .map_err(|e| CascadeError::Execution(e.to_string()))?;
                print_plan(&plan, &format).map_err(|e| CascadeError::Execution(e.to_string()))?;
                return Ok(());
            }
            let report = caps
                .orchestrator
                .resume(&manifest, &target, parallelism, force_all)
                .await
                .map_err(|e| CascadeError::Execution(e.to_string()))?;
            print_report(&report, &format).map_err(|e| CascadeError::Execution(e.to_string()))?;
            Ok(())
        }
        .await,

        Command::Revert { module, version } => async {
            let target = target(module, version)?;
            let caps = build_capabilities(&config).map_err(|e| CascadeError::Execution(e.to_string()))?;
            let reverted = caps.orchestrator.revert(&target).await.map_err(|e| CascadeError::Execution(e.to_string()))?;
            println!("reverted {reverted} branch(es)");
            Ok(())
        }
        .await,

        Command::Manifest { command } => match command {
            ManifestCommand::Generate { module, repo, out } => async {
                let code_host = {
                    let token = std::env::var(&config.code_host.token_env)
                        .map_err(|_| CascadeError::Config(format!("missing env var {}", config.code_host.token_env)))?;
                    Arc::new(GithubCodeHost::new(config.code_host.base_url.clone(), token))
                };
                let org = repo.split('/').next().unwrap_or(&repo).to_string();
                let module_tool: Arc<dyn cascade::modtool::ModuleTool> = Arc::new(GoModTool::new());
                let workspace = Workspace::ensure(config.workspace_dir.clone())?;
                let workspace_source = cascade::discovery::WorkspaceScanSource::new(
                    workspace.clone(),
                    config.discovery.max_depth,
                    config.discovery.include.clone(),
                    config.discovery.exclude.clone(),
                )
                .map_err(|e| CascadeError::Execution(e.to_string()))?;
                let engine = cascade::discovery::DiscoveryEngine::new(
                    vec![
                        (cascade::domain::DiscoverySource::Workspace, Box::new(workspace_source)),
                        (cascade::domain::DiscoverySource::Github, Box::new(cascade::discovery::CodehostSearchSource::new(code_host, org))),
                    ],
                    Some(workspace),
                    Some(module_tool),
                );
                let discovered = engine.discover(&module, &repo, None).await.map_err(|e| CascadeError::Execution(e.to_string()))?;
                let manifest = generator::generate(&out, &module, &repo, &discovered).map_err(|e| CascadeError::Execution(e.to_string()))?;
                println!("wrote {} ({} module(s))", out.display(), manifest.modules.len());
                Ok(())
            }
            .await,

            ManifestCommand::Validate { manifest } => {
                let manifest = load_manifest(&manifest)?;
                validate_manifest(&manifest)?;
                println!("manifest is valid ({} module(s))", manifest.modules.len());
                Ok(())
            }
        },
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
