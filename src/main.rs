mod error;
mod export;
mod fetch;
mod model;
mod parser;
mod settings;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;

use model::ScrapeResult;
use parser::{CountryFilter, Tables};
use settings::Settings;

#[derive(Parser)]
#[command(name = "oryx_scraper", about = "Oryx equipment loss scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the Oryx post, parse it and write CSV (and optionally JSON)
    Scrape {
        /// Page to fetch (default: settings / ORYX_URL)
        #[arg(long)]
        url: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Parse a saved copy of the post instead of fetching it
    Parse {
        /// Saved HTML file
        file: PathBuf,
        /// Input is plain text, one record per line
        #[arg(long)]
        text: bool,
        /// URL to record as the source
        #[arg(long)]
        url: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print totals_by_type.csv from a previous run
    Overview {
        /// Directory holding the CSV files
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        /// Only show this country
        #[arg(short, long)]
        country: Option<String>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Countries to keep, comma separated (default: all)
    #[arg(short, long, value_delimiter = ',')]
    countries: Vec<String>,
    /// Directory for daily_count.csv and totals_by_type.csv
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
    /// Also write the JSON report here (`-` prints it to stdout instead of the summary)
    #[arg(long)]
    json: Option<PathBuf>,
    /// JSON indentation in spaces
    #[arg(long, default_value_t = 2)]
    indent: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;

    let result = match cli.command {
        Commands::Scrape { url, output } => {
            let url = url.unwrap_or_else(|| settings.url.clone());

            let pb = ProgressBar::new_spinner();
            pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
            pb.set_message(format!("Fetching {}", url));
            pb.enable_steady_tick(Duration::from_millis(120));
            let fetched = fetch::fetch_page(&url, &settings).await;
            pb.finish_and_clear();

            let html = fetched?;
            let scraped = parser::parse_html(&html, &url, today(), filter(&output))?;
            finish(&scraped, &output, &settings)
        }
        Commands::Parse { file, text, url, output } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let url = url.unwrap_or_else(|| settings.url.clone());
            let scraped = if text {
                parser::parse_text(&raw, &url, today(), filter(&output))?
            } else {
                parser::parse_html(&raw, &url, today(), filter(&output))?
            };
            finish(&scraped, &output, &settings)
        }
        Commands::Overview { out_dir, country, limit } => {
            let dir = out_dir.unwrap_or_else(|| settings.out_dir.clone());
            overview(&dir, country.as_deref(), limit)
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn filter(output: &OutputArgs) -> CountryFilter {
    CountryFilter::from_names(&output.countries)
}

/// Aggregate, write every requested output and print a short summary.
fn finish(scraped: &ScrapeResult, output: &OutputArgs, settings: &Settings) -> anyhow::Result<()> {
    let tables = parser::aggregate(scraped);
    let dir = output.out_dir.as_deref().unwrap_or(settings.out_dir.as_path());
    let written = export::write_csv_dir(dir, &tables)?;
    if let Some(path) = &output.json {
        export::write_json(path, &export::Report::new(scraped, &tables), output.indent)?;
        if export::is_stdout(path) {
            return Ok(());
        }
    }

    print_summary(scraped, &tables);
    for path in &written {
        println!("Saved {}", path.display());
    }
    Ok(())
}

fn print_summary(scraped: &ScrapeResult, tables: &Tables) {
    println!("Total losses found: {}", scraped.countries.len());
    for c in &scraped.countries {
        println!("\n  {}:", c.country);
        println!("    Total:     {}", c.total);
        println!("    Destroyed: {}", c.status.destroyed);
        println!("    Damaged:   {}", c.status.damaged);
        println!("    Abandoned: {}", c.status.abandoned);
        println!("    Captured:  {}", c.status.captured);
    }

    println!("\nCategories found: {}", scraped.categories.len());
    for cat in scraped.categories.iter().take(5) {
        println!(
            "\n  {} ({}): total {}, {} equipment types",
            cat.label,
            cat.country.as_deref().unwrap_or("-"),
            cat.total,
            cat.equipment.len()
        );
        for e in cat.equipment.iter().take(3) {
            println!("    - {}: {}", e.type_name, e.count);
        }
    }

    println!(
        "\n{} rows by type, {} pieces of equipment.",
        tables.totals_by_type.len(),
        tables.total_entries()
    );
}

fn overview(dir: &Path, country: Option<&str>, limit: usize) -> anyhow::Result<()> {
    let rows = export::read_totals_by_type(dir)?;
    let wanted = CountryFilter::from_names(country);
    let rows: Vec<_> = rows
        .into_iter()
        .filter(|r| wanted.accepts(Some(r.country.as_str())))
        .sorted_by(|a, b| b.total.cmp(&a.total).then_with(|| a.type_name.cmp(&b.type_name)))
        .collect();
    if rows.is_empty() {
        println!("No rows found.");
        return Ok(());
    }

    println!(
        "{:>3} | {:<10} | {:<28} | {:>6} | {:>6} | {:>6} | {:>6} | {:>6}",
        "#", "Country", "Type", "Dest", "Aband", "Capt", "Dmg", "Total"
    );
    println!("{}", "-".repeat(92));
    for (i, r) in rows.iter().take(limit).enumerate() {
        println!(
            "{:>3} | {:<10} | {:<28} | {:>6} | {:>6} | {:>6} | {:>6} | {:>6}",
            i + 1,
            truncate(&r.country, 10),
            truncate(&r.type_name, 28),
            r.destroyed,
            r.abandoned,
            r.captured,
            r.damaged,
            r.total
        );
    }

    let total: u64 = rows.iter().map(|r| u64::from(r.total)).sum();
    println!("\n{} types | {} pieces", rows.len(), total);
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
