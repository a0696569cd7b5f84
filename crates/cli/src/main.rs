use crate::{
    commands::Commands,
    config::AppConfig,
    conn::ConnTarget,
    env::EnvManager,
    error::CliError,
    output::{emit_json, emit_lines},
    shutdown::{ExitCode, ShutdownCoordinator},
};
use clap::Parser;
use connectors::{
    accounts::{AccountFinder, fetch_properties},
    adapter::Adapter,
    sql::base::catalog::{TableName, account_tables, load_catalog, property_tables},
};
use model::{core::value::Value, records::row::RowData};
use planner::{
    catalog::StaticCatalog,
    filter::{FilterCompiler, FilterNode},
    properties::PropertyPlanner,
    query::dialect::DialectKind,
};
use std::{path::PathBuf, str::FromStr};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod conn;
mod env;
mod error;
mod input;
mod output;
mod shutdown;

#[derive(Parser)]
#[command(
    name = "acctq",
    version = "0.1.0",
    about = "Compiles account filters to SQL and reads account properties"
)]
struct Cli {
    #[arg(long, global = true, help = "Config file path (default ~/.acctq/config.json)")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "KEY=VALUE file loaded on top of the environment")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout carries only command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let shutdown = ShutdownCoordinator::new(CancellationToken::new());
    shutdown.register_handlers();
    let cancel = shutdown.cancel_token();

    let result = tokio::select! {
        result = run(cli) => result,
        _ = cancel.cancelled() => Err(CliError::ShutdownRequested),
    };

    let code = match result {
        Ok(()) => ExitCode::Success,
        Err(_) if shutdown.is_shutdown_requested() => {
            info!("Shutdown requested, command cancelled");
            ExitCode::ShutdownRequested
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::GeneralError
        }
    };
    std::process::exit(code.as_i32());
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = AppConfig::load(cli.config.as_deref()).await?;
    let mut env = EnvManager::new();
    if let Some(path) = &cli.env_file {
        env.load_from_file(path)?;
    }

    match cli.command {
        Commands::Compile {
            filter,
            dialect,
            catalog,
            conn,
        } => {
            let tree = input::read_filter(&filter).await?;
            let target = ConnTarget::resolve(&conn, &env)?;
            let dialect = match dialect {
                Some(name) => DialectKind::from_str(&name).map_err(CliError::InvalidInput)?,
                None => target
                    .as_ref()
                    .map(|t| t.kind.dialect_kind())
                    .unwrap_or(DialectKind::Postgres),
            };

            // only connect when the catalog has to be read from the database
            let adapter = match &target {
                Some(target) if catalog.is_none() && config.catalog.is_none() => {
                    Some(target.connect().await?)
                }
                _ => None,
            };
            let catalog = resolve_catalog(
                catalog.as_deref(),
                &config,
                adapter.as_ref(),
                account_tables(&config.schema),
            )
            .await?;

            let compiled = FilterCompiler::new(&catalog, &config.schema).compile(&tree)?;
            println!("{}", compiled.sql(dialect.dialect()));
        }
        Commands::Accts {
            filter,
            catalog,
            output,
            plain,
            conn,
        } => {
            let tree = input::read_filter(&filter).await?;
            let adapter = ConnTarget::require(&conn, &env)?.connect().await?;
            let ids = find_accounts(&tree, catalog.as_deref(), &config, &adapter).await?;

            if plain {
                let lines: Vec<String> = ids.iter().filter_map(Value::as_string).collect();
                emit_lines(&lines, output.as_deref()).await?;
            } else {
                let json: Vec<_> = ids.iter().map(Value::to_json).collect();
                emit_json(&json, output.as_deref()).await?;
            }
        }
        Commands::Props {
            accts,
            filter,
            columns,
            catalog,
            output,
            conn,
        } => {
            let adapter = ConnTarget::require(&conn, &env)?.connect().await?;
            let ids = match (accts, filter) {
                (Some(accts), _) => input::read_acct_ids(&accts).await?,
                (None, Some(filter)) => {
                    let tree = input::read_filter(&filter).await?;
                    find_accounts(&tree, catalog.as_deref(), &config, &adapter).await?
                }
                (None, None) => {
                    return Err(CliError::InvalidInput(
                        "pass either --accts or --filter".to_string(),
                    ));
                }
            };

            let property_catalog = resolve_catalog(
                catalog.as_deref(),
                &config,
                Some(&adapter),
                property_tables(&config.properties),
            )
            .await?;
            let plan = PropertyPlanner::new(&property_catalog, &config.properties).plan(&columns)?;
            debug!("Property plan reads {} tables", plan.sources.len());

            let rows = fetch_properties(adapter.get_sql(), &plan, &ids).await?;
            let json: Vec<_> = rows.iter().map(RowData::to_json).collect();
            emit_json(&json, output.as_deref()).await?;
        }
        Commands::Catalog { output, conn } => {
            let adapter = ConnTarget::require(&conn, &env)?.connect().await?;

            let mut tables = account_tables(&config.schema);
            for table in property_tables(&config.properties) {
                if !tables.contains(&table) {
                    tables.push(table);
                }
            }
            let catalog = load_catalog(adapter.get_sql(), tables).await?;
            emit_json(&catalog, output.as_deref()).await?;
        }
        Commands::TestConn { conn } => {
            ConnTarget::require(&conn, &env)?.ping().await?;
        }
    }

    Ok(())
}

async fn find_accounts(
    tree: &FilterNode,
    catalog: Option<&str>,
    config: &AppConfig,
    adapter: &Adapter,
) -> Result<Vec<Value>, CliError> {
    let catalog = resolve_catalog(
        catalog,
        config,
        Some(adapter),
        account_tables(&config.schema),
    )
    .await?;

    let compiler = FilterCompiler::new(&catalog, &config.schema);
    let compiled = compiler.compile(tree)?;
    info!("Account query: {}", compiled.sql(adapter.get_sql().dialect()));

    let finder = AccountFinder::new(compiler, adapter.get_sql());
    Ok(finder.execute(&compiled).await?)
}

/// A catalog file wins over the configured snapshot, which wins over live
/// introspection of `tables`.
async fn resolve_catalog(
    path: Option<&str>,
    config: &AppConfig,
    adapter: Option<&Adapter>,
    tables: Vec<TableName<'_>>,
) -> Result<StaticCatalog, CliError> {
    if let Some(path) = path {
        let source = tokio::fs::read_to_string(path).await?;
        return Ok(serde_json::from_str(&source)?);
    }
    if let Some(catalog) = &config.catalog {
        return Ok(catalog.clone());
    }
    match adapter {
        Some(adapter) => Ok(load_catalog(adapter.get_sql(), tables).await?),
        None => Err(CliError::MissingCatalog),
    }
}
