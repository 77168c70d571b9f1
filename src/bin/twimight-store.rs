use std::process::exit;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::Level;
use twimight_store::*;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.twimight/twimight.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    /// Output format: table, markdown, json, json-pretty
    #[clap(short, long, default_value = "table")]
    format: OutputFormat,

    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show store location, schema version and per-table row counts (default)
    Status,

    /// Open the store, creating or upgrading the schema as needed
    Open,

    /// Delete all cached rows, keeping the schema
    Flush {
        /// Skip confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// Drop and recreate every table
    Reset {
        /// Skip confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// List table definitions and their columns
    Tables,
}

#[derive(Tabled, Serialize)]
struct ColumnRow {
    table: &'static str,
    column: &'static str,
    #[tabled(rename = "type")]
    #[serde(rename = "type")]
    ty: &'static str,
    constraints: String,
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            // filter spans/events with level INFO or higher.
            .with_max_level(Level::INFO)
            .init();
    }

    let config = match StoreConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => run_status(&config, cli.format),
        Commands::Tables => run_tables(cli.format),
        Commands::Open => {
            let ctx = open_context(config);
            match ctx.store().open() {
                Ok(()) => run_status(ctx.config(), cli.format),
                Err(e) => fail(e),
            }
        }
        Commands::Flush { yes } => {
            if !yes && !cli.format.is_json() && !confirm("This will delete all cached rows.") {
                return;
            }
            let ctx = open_context(config);
            if let Err(e) = ctx.store().flush_all() {
                fail(e);
            }
            report(cli.format, "flush", "All tables emptied");
        }
        Commands::Reset { yes } => {
            if !yes
                && !cli.format.is_json()
                && !confirm("This will drop and recreate every table.")
            {
                return;
            }
            let ctx = open_context(config);
            if let Err(e) = ctx.store().reset() {
                fail(e);
            }
            report(cli.format, "reset", "All tables recreated");
        }
    }
}

fn open_context(config: StoreConfig) -> AppContext {
    if let Err(e) = database::ensure_data_dir(&config.data_dir) {
        eprintln!("ERROR: {}", e);
        exit(1);
    }
    AppContext::new(config)
}

fn fail(e: StoreError) -> ! {
    eprintln!("ERROR: {}", e);
    exit(1);
}

fn confirm(message: &str) -> bool {
    eprintln!("{}", message);
    eprint!("Are you sure? [y/N] ");

    let mut input = String::new();
    if std::io::stdin().read_line(&mut input).is_ok() {
        let input = input.trim().to_lowercase();
        if input == "y" || input == "yes" {
            return true;
        }
    }
    eprintln!("Aborted.");
    false
}

fn report(format: OutputFormat, operation: &str, message: &str) {
    let value = serde_json::json!({
        "operation": operation,
        "success": true,
        "message": message,
    });
    match format.to_json(&value) {
        Some(Ok(json)) => println!("{}", json),
        Some(Err(e)) => eprintln!("Error serializing result: {}", e),
        None => println!("{}", message),
    }
}

fn run_status(config: &StoreConfig, format: OutputFormat) {
    let info = get_store_info(config);

    if let Some(json) = format.to_json(&info) {
        match json {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing status: {}", e),
        }
        return;
    }

    println!("Twimight Store Status");
    println!("=====================\n");
    println!("{}\n", config.summary());
    println!("  Path:           {}", info.path);
    println!(
        "  File:           {}",
        if info.exists { "exists" } else { "not created" }
    );
    if let Some(size) = info.size_bytes {
        println!("  Size:           {}", format_size(size));
    }
    if let Some(ref modified) = info.modified {
        println!("  Modified:       {}", modified);
    }
    match info.schema_version {
        Some(v) => println!(
            "  Schema:         v{} (expected v{}), {}",
            v, info.expected_version, info.status
        ),
        None => println!("  Schema:         {}", info.status),
    }

    if !info.tables.is_empty() {
        println!();
        println!("{}", styled(Table::new(&info.tables), format));
    }
}

fn run_tables(format: OutputFormat) {
    let rows: Vec<ColumnRow> = SchemaDefinitions::TABLES
        .iter()
        .flat_map(|table| {
            table.columns.iter().map(move |c| {
                let mut constraints = Vec::new();
                if c.not_null {
                    constraints.push("not null".to_string());
                }
                if c.unique {
                    constraints.push("unique".to_string());
                }
                if let Some(d) = c.default {
                    constraints.push(format!("default {}", d));
                }
                ColumnRow {
                    table: table.name,
                    column: c.name,
                    ty: c.ty.sql(),
                    constraints: constraints.join(", "),
                }
            })
        })
        .collect();

    match format.to_json(&rows) {
        Some(Ok(json)) => println!("{}", json),
        Some(Err(e)) => eprintln!("Error serializing tables: {}", e),
        None => println!("{}", styled(Table::new(rows), format)),
    }
}

fn styled(mut table: Table, format: OutputFormat) -> Table {
    match format {
        OutputFormat::Markdown => table.with(Style::markdown()),
        _ => table.with(Style::rounded()),
    };
    table
}
