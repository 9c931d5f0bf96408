//! stack-rds CLI - provision a stack's MySQL databases on RDS.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use stack_rds::request::{build_id_generator_request, build_stack_instances_request};
use stack_rds::{DbInstance, MySqlDatabaseSetup, Rds, StackConfig};

/// stack-rds CLI - provision a stack's MySQL databases on RDS.
#[derive(Parser)]
#[command(name = "stack-rds")]
#[command(about = "Ensure the ID generator and stack-instance databases exist")]
struct Cli {
    /// Stack configuration file (or set `STACK_RDS_CONFIG` env var).
    #[arg(long, env = "STACK_RDS_CONFIG")]
    config: PathBuf,

    /// AWS region, overrides the configuration file.
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// ID generator master password, overrides the configuration file.
    #[arg(long, env = "STACK_RDS_ID_GENERATOR_PASSWORD", hide_env_values = true)]
    id_generator_password: Option<String>,

    /// Stack-instance master password, overrides the configuration file.
    #[arg(long, env = "STACK_RDS_STACK_INSTANCE_PASSWORD", hide_env_values = true)]
    stack_instance_password: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the create requests without calling RDS.
    Plan,

    /// Create any database instance that does not exist yet.
    Setup {
        /// Wait for both instances to become available.
        #[arg(long, default_value = "false")]
        wait: bool,

        /// Timeout in seconds for each instance when waiting.
        #[arg(long, default_value = "1800")]
        timeout: u64,

        /// Write the resulting instances to this JSON file.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show the current state of both database instances.
    Describe,
}

fn print_instances(rows: &[(&str, Option<&DbInstance>)]) {
    println!(
        "\n{:<16} {:<32} {:<12} {:<14} {:<48}",
        "DATABASE", "IDENTIFIER", "STATUS", "CLASS", "ENDPOINT"
    );
    println!("{}", "-".repeat(124));
    for (label, instance) in rows {
        match instance {
            Some(db) => println!(
                "{:<16} {:<32} {:<12} {:<14} {:<48}",
                label,
                db.identifier,
                db.status,
                db.instance_class,
                db.endpoint
                    .as_ref()
                    .map(|e| format!("{}:{}", e.address, e.port))
                    .unwrap_or_default()
            ),
            None => println!("{label:<16} {:<32} {:<12}", "-", "not found"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = StackConfig::load(&cli.config)
        .context("Failed to load stack configuration")?
        .with_region(cli.region)
        .with_passwords(cli.id_generator_password, cli.stack_instance_password);
    config.validate().context("Invalid stack configuration")?;

    match cli.command {
        Commands::Plan => {
            let plan = serde_json::json!({
                "production": config.is_production_stack(),
                "region": config.region,
                "id_generator": build_id_generator_request(&config),
                "stack_instance": build_stack_instances_request(&config),
            });
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }

        Commands::Setup {
            wait,
            timeout,
            output,
        } => {
            let rds = Rds::new(config.region.clone())
                .await
                .context("Failed to create RDS client")?;
            info!(
                production = config.is_production_stack(),
                region = rds.region(),
                "Setting up stack databases"
            );
            let mut setup = MySqlDatabaseSetup::new(rds, config);
            if wait {
                setup = setup.with_wait(timeout);
            }

            let resources = setup
                .setup_all_database_instances()
                .await
                .context("Failed to set up database instances")?;

            print_instances(&[
                ("id-generator", Some(&resources.id_generator_database)),
                ("stack-instance", Some(&resources.stack_instances_database)),
            ]);

            if let Some(path) = output {
                resources.save(&path)?;
                println!("\nResources written to {}", path.display());
            }
        }

        Commands::Describe => {
            let rds = Rds::new(config.region.clone())
                .await
                .context("Failed to create RDS client")?;
            let setup = MySqlDatabaseSetup::new(rds, config);

            let id_generator = setup
                .lookup(&setup.config().id_generator.identifier)
                .await?;
            let stack_instance = setup
                .lookup(&setup.config().stack_instance.identifier)
                .await?;

            print_instances(&[
                ("id-generator", id_generator.instance()),
                ("stack-instance", stack_instance.instance()),
            ]);
        }
    }

    Ok(())
}
