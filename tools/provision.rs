//! Provision a tenant from a service template
//!
//! Loads the module catalog and a template definition, runs one provisioning
//! pass, and prints the report. Exit codes distinguish full success (0),
//! partial success with enumerated failures (1), and total failure where
//! resolution or setup failed and nothing was installed (2).

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

use app_provisioner::utils::init_logging;
use app_provisioner::{
    ExpandOptions, HookRegistry, ModuleCatalog, ProvisionError, Provisioner, ProvisionerConfig,
    ProvisioningReport, ServiceTemplate,
};

#[derive(Parser, Debug)]
#[command(
    name = "provision",
    about = "Install and activate platform modules for a tenant"
)]
struct Args {
    /// Provisioner configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Catalog directory (overrides the configured one)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Service template file (TOML)
    #[arg(long)]
    template: PathBuf,

    /// Tenant to provision
    #[arg(long)]
    tenant: String,

    /// Include the template's optional extension apps
    #[arg(long)]
    include_extensions: bool,

    /// Additional extension module (repeatable)
    #[arg(long = "extension")]
    extensions: Vec<String>,

    /// Module to leave out of the expansion (repeatable)
    #[arg(long = "skip")]
    skip: Vec<String>,

    /// Emit the report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match ProvisionerConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::from(2);
            }
        },
        None => ProvisionerConfig::default(),
    };

    init_logging(config.log_filter.as_deref());

    let catalog_dir = args
        .catalog
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.catalog_dir));
    let catalog = match ModuleCatalog::load_dir(&catalog_dir) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(2);
        }
    };

    let template = match ServiceTemplate::from_file(&args.template) {
        Ok(template) => template,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(2);
        }
    };

    let options = ExpandOptions {
        include_extensions: args.include_extensions,
        additional_extensions: args.extensions.clone(),
        skip: args.skip.clone(),
    };

    // Ctrl-C stops the batch between modules; partial results stay valid.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    let provisioner = Provisioner::new(catalog, HookRegistry::new(), config);
    match provisioner
        .provision(&template, &args.tenant, &options, &cancel)
        .await
    {
        Ok(report) => {
            print_report(&report, args.json);
            if report.is_full_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            print_fatal(&e);
            ExitCode::from(2)
        }
    }
}

fn print_report(report: &ProvisioningReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => eprintln!("error: failed to render report: {}", e),
        }
        return;
    }

    println!("run:       {}", report.run_id);
    println!("order:     {}", report.resolved_order.join(", "));
    println!("installed: {}", report.installed.join(", "));
    println!("skipped:   {}", report.skipped.join(", "));
    if report.failed.is_empty() {
        println!("failed:    none");
    } else {
        println!("failed:");
        for failure in &report.failed {
            println!(
                "  {} [{}]: {}",
                failure.module_id,
                failure.error.kind(),
                failure.error
            );
        }
    }
}

fn print_fatal(error: &ProvisionError) {
    match error {
        ProvisionError::CyclicDependency(modules) => {
            eprintln!(
                "error: resolution failed, circular dependency involving: {}",
                modules.join(", ")
            );
        }
        ProvisionError::MissingDependency(module) => {
            eprintln!(
                "error: resolution failed, missing dependency: {}",
                module
            );
        }
        other => eprintln!("error: {}", other),
    }
    eprintln!("no modules were installed");
}
