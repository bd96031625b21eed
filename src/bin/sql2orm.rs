//! sql2orm: SQL to ORM code
//!
//! # Usage
//!
//! ```bash
//! # Both targets
//! sql2orm "SELECT * FROM users WHERE age > 18"
//!
//! # One target, JSON output
//! sql2orm "SELECT * FROM users" -t sequelize --json
//!
//! # From stdin
//! echo "DELETE FROM sessions" | sql2orm -t activerecord
//!
//! # Show how a statement was understood
//! sql2orm explain "SELECT * FROM users WHERE a = 1 OR b LIKE 'x%'"
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use serde_json::json;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use sql2orm::conditions::{extract_subqueries, parse_complex_conditions};
use sql2orm::config::{Config, parse_targets};
use sql2orm::parser::parse_where_expr;
use sql2orm::prelude::*;
use sql2orm::transpiler::WherePlan;

#[derive(Parser)]
#[command(name = "sql2orm")]
#[command(version)]
#[command(about = "Translate SQL into ActiveRecord and Sequelize code", long_about = None)]
#[command(after_help = "EXAMPLES:
    sql2orm 'SELECT name FROM users WHERE age > 18 ORDER BY name'
    sql2orm 'SELECT COUNT(*) FROM users' -t activerecord
    sql2orm explain 'SELECT * FROM users WHERE role IN (1, 2)'")]
struct Cli {
    /// SQL statement; read from stdin when omitted
    sql: Option<String>,

    /// Output target: activerecord, sequelize or all
    #[arg(short, long, env = "SQL2ORM_TARGET")]
    target: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the parsed statement and how its WHERE clause is handled
    Explain {
        /// SQL statement; read from stdin when omitted
        sql: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    init_logging(&config, cli.verbose);
    if cli.no_color || !config.color {
        colored::control::set_override(false);
    }

    match &cli.command {
        Some(Commands::Explain { sql }) => {
            let sql = read_sql(sql.as_deref())?;
            explain(&sql)
        }
        None => {
            let sql = read_sql(cli.sql.as_deref())?;
            let targets = match &cli.target {
                Some(name) => parse_targets(name)?,
                None => config.targets()?,
            };
            convert_to(&sql, &targets, cli.json)
        }
    }
}

fn init_logging(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("sql2orm=debug")
    } else {
        EnvFilter::try_from_env("SQL2ORM_LOG").unwrap_or_else(|_| EnvFilter::new(&config.log))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_sql(arg: Option<&str>) -> Result<String> {
    if let Some(sql) = arg {
        return Ok(sql.to_string());
    }
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        anyhow::bail!("no SQL given. Pass a statement or pipe one on stdin");
    }
    let mut sql = String::new();
    stdin
        .read_to_string(&mut sql)
        .context("failed to read SQL from stdin")?;
    if sql.trim().is_empty() {
        anyhow::bail!("stdin was empty");
    }
    Ok(sql)
}

fn convert_to(sql: &str, targets: &[Target], as_json: bool) -> Result<()> {
    let parsed = parse_sql(sql);
    let outputs: Vec<(Target, String)> = targets
        .iter()
        .map(|t| (*t, t.generator().generate_query(&parsed)))
        .collect();

    if as_json {
        let items: Vec<_> = outputs
            .iter()
            .map(|(target, code)| json!({ "sql": sql.trim(), "target": target, "code": code }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if outputs.len() == 1 {
        println!("{}", outputs[0].1);
        return Ok(());
    }
    for (idx, (target, code)) in outputs.iter().enumerate() {
        if idx > 0 {
            println!();
        }
        println!("{}", format!("{}:", target).cyan().bold());
        println!("{}", code);
    }
    Ok(())
}

fn explain(sql: &str) -> Result<()> {
    let parsed = parse_sql(sql);
    let plan = WherePlan::for_clause(&parsed.where_clause);
    let report = json!({
        "query": &parsed,
        "where_plan": plan.name(),
        "where_tree": parse_where_expr(&parsed.where_clause),
        "subqueries": extract_subqueries(&parsed.where_clause),
        "unparsed": parse_complex_conditions(&parsed.where_clause).unparsed,
    });

    println!("{}", "Parsed statement:".green().bold());
    println!("{}", serde_json::to_string_pretty(&report)?);
    if parsed.query_type == QueryType::Unknown {
        println!();
        println!("{}", "⚠ Statement type not recognized".yellow());
    }
    Ok(())
}
