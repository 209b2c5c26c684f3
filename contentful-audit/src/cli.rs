///
/// This module implements the CLI interface for contentful-audit: command parsing,
/// wiring of real API clients into the core pipelines, and the user-visible summaries.
///
/// All core logic (data model, extraction, comparison, report writing) lives in the
/// [`contentful-audit-core`] crate. This module is strictly CLI glue.
///
/// ## How To Use
/// - For command-line users: run the `contentful-audit` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`contentful-audit-core`]: ../../contentful-audit-core/
use crate::load_config::{
    delivery_credentials, load_config, management_credentials, primary_space, second_space,
};
use crate::management::ManagementClient;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use contentful_audit_core::config::AuditConfig;
use contentful_audit_core::content_model::{self, compare_models, fetch_content_model};
use contentful_audit_core::delivery::DeliveryClient;
use contentful_audit_core::duplicate_titles::{self, find_duplicate_titles};
use contentful_audit_core::first_line::process_pages;
use contentful_audit_core::id_lists::compare_id_files;
use contentful_audit_core::published::{check_all_pages, read_page_ids, write_reports};
use std::path::PathBuf;

/// CLI for contentful-audit: reports on the content of a Contentful space.
#[derive(Parser)]
#[clap(
    name = "contentful-audit",
    version,
    about = "Audit a Contentful space: duplicate titles, publish status, content model differences"
)]
pub struct Cli {
    /// Optional YAML settings file (output_dir, locales, page_size, ...)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report pages whose heading equals the first text of their linked article
    DuplicateTitles,
    /// Split a list of page ids into published and unpublished reports
    PublishedStatus {
        /// File with one page id per line
        #[clap(long, default_value = "page_ids.txt")]
        ids: PathBuf,
    },
    /// Compare the content models of two spaces/environments
    CompareModels,
    /// Remove the duplicated heading from articles listed in the duplicate titles report
    RemoveFirstLine {
        /// Duplicate titles report to read (defaults to the one in the output directory)
        #[clap(long)]
        csv: Option<PathBuf>,
        /// Write changes to Contentful instead of only reporting them
        #[clap(long)]
        apply: bool,
    },
    /// List ids present in the first file but not in the second
    CompareLists {
        #[clap(long)]
        first: PathBuf,
        #[clap(long)]
        second: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::DuplicateTitles => run_duplicate_titles(&config).await,
        Commands::PublishedStatus { ids } => run_published_status(&config, ids).await,
        Commands::CompareModels => run_compare_models(&config).await,
        Commands::RemoveFirstLine { csv, apply } => {
            run_remove_first_line(&config, csv, !apply).await
        }
        Commands::CompareLists { first, second } => run_compare_lists(first, second),
    }
}

async fn run_duplicate_titles(config: &AuditConfig) -> Result<()> {
    tracing::info!(command = "duplicate-titles", "Starting duplicate title check");
    let client = DeliveryClient::new(&config.delivery_base_url, delivery_credentials()?);
    let scan = find_duplicate_titles(&client, config)
        .await
        .map_err(|e| anyhow::anyhow!("Fetching pages failed: {e}"))?;
    let path = duplicate_titles::write_report(&config.output_dir, &scan.matches)?;

    println!("Processed: {} pages", scan.processed);
    println!("Skipped: {} pages", scan.skipped);
    println!("Found {} pages with duplicate titles", scan.matches.len());
    println!("CSV report: {}", path.display());
    Ok(())
}

async fn run_published_status(config: &AuditConfig, ids: PathBuf) -> Result<()> {
    tracing::info!(command = "published-status", ids = %ids.display(), "Starting published status check");
    let page_ids = read_page_ids(&ids)
        .with_context(|| format!("Failed to read page ids from {}", ids.display()))?;
    let client = ManagementClient::new(
        &config.management_base_url,
        management_credentials(primary_space()?)?,
    );
    let split = check_all_pages(&client, &page_ids, &config.locale_fallback()).await;
    let (published_path, unpublished_path) = write_reports(&config.output_dir, &split)?;

    println!("Total pages checked: {}", page_ids.len());
    println!("Published: {} ({})", split.published.len(), published_path.display());
    println!("Unpublished: {} ({})", split.unpublished.len(), unpublished_path.display());
    Ok(())
}

async fn run_compare_models(config: &AuditConfig) -> Result<()> {
    tracing::info!(command = "compare-models", "Starting content model comparison");
    let space1 = primary_space()?;
    let space2 = second_space()?;
    let client1 = ManagementClient::new(
        &config.management_base_url,
        management_credentials(space1.clone())?,
    );
    let client2 = ManagementClient::new(
        &config.management_base_url,
        management_credentials(space2.clone())?,
    );

    let model1 = fetch_content_model(&client1, &space1, &config.output_dir)
        .await
        .map_err(|e| anyhow::anyhow!("Fetching content model of {space1} failed: {e}"))?;
    let model2 = fetch_content_model(&client2, &space2, &config.output_dir)
        .await
        .map_err(|e| anyhow::anyhow!("Fetching content model of {space2} failed: {e}"))?;

    let differences = compare_models(&model1, &model2);
    let rows = differences.rows(&space1, &space2);
    let path = content_model::write_report(&config.output_dir, &rows)?;
    let summary = differences.summary();

    println!("Missing types in Space 1: {}", summary.missing_types_space1);
    println!("Missing types in Space 2: {}", summary.missing_types_space2);
    println!("Types with field differences: {}", summary.types_with_field_differences);
    println!("Types with definition differences: {}", summary.types_with_definition_differences);
    println!("Total missing fields in Space 1: {}", summary.total_missing_fields_space1);
    println!("Total missing fields in Space 2: {}", summary.total_missing_fields_space2);
    println!("Total field definition differences: {}", summary.total_definition_differences);
    println!("CSV report: {} ({} rows)", path.display(), rows.len());
    Ok(())
}

async fn run_remove_first_line(
    config: &AuditConfig,
    csv: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    let csv = csv.unwrap_or_else(|| config.output_dir.join(duplicate_titles::REPORT_FILE));
    tracing::info!(command = "remove-first-line", csv = %csv.display(), dry_run, "Starting first line removal");
    let pages = duplicate_titles::read_report(&csv)
        .with_context(|| format!("Failed to read duplicate titles report {}", csv.display()))?;
    let client = ManagementClient::new(
        &config.management_base_url,
        management_credentials(primary_space()?)?,
    );
    let summary = process_pages(&client, &pages, &config.locale_fallback(), dry_run).await;

    if dry_run {
        println!("Mode: DRY RUN (no changes saved, pass --apply to write)");
    } else {
        println!("Mode: LIVE (changes saved)");
    }
    println!("Total pages: {}", summary.total);
    println!("Updated: {}", summary.updated);
    println!("Unchanged: {}", summary.unchanged);
    println!("Skipped: {}", summary.skipped);
    println!("Errors: {}", summary.errors);
    Ok(())
}

fn run_compare_lists(first: PathBuf, second: PathBuf) -> Result<()> {
    tracing::info!(command = "compare-lists", "Comparing id lists");
    let comparison = compare_id_files(&first, &second)
        .with_context(|| format!("Failed to read {} or {}", first.display(), second.display()))?;

    println!("Total ids in {}: {}", first.display(), comparison.first_total);
    println!("Total ids in {}: {}", second.display(), comparison.second_total);
    println!("Ids missing from {}: {}", second.display(), comparison.missing.len());
    for id in &comparison.missing {
        println!("{id}");
    }
    Ok(())
}
