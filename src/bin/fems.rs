use anyhow::Result;
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use fems_rs::models::years_present;
use fems_rs::{loader, stats, storage, viz, Client, FilterSelection, SampleStore, Source};
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "fems",
    version,
    about = "Fetch, filter, summarize & chart fuel-moisture field samples"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download the full sample history from FEMS and write the split files.
    Fetch(FetchArgs),
    /// Load samples, apply filters, and compare current vs. historical years.
    Report(ReportArgs),
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Window start as an RFC 3339 instant.
    #[arg(long, default_value = "2005-01-01T00:00:00.000Z")]
    start: String,
    /// Window end as an RFC 3339 instant (default: now).
    #[arg(long)]
    end: Option<String>,
    /// Directory to write the two split files into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Input CSVs: URLs or local paths. Defaults to the published split files.
    #[arg(short, long)]
    input: Vec<String>,
    /// Site names separated by comma or semicolon.
    #[arg(long)]
    sites: Option<String>,
    /// Categories separated by comma or semicolon.
    #[arg(long)]
    categories: Option<String>,
    /// Fuel types separated by comma or semicolon.
    #[arg(long)]
    fuel_types: Option<String>,
    /// Months (1-12) separated by comma or semicolon. Default: all.
    #[arg(long)]
    months: Option<String>,
    /// Comparison year. Default: newest year in the filtered data.
    #[arg(long)]
    current_year: Option<i32>,
    /// Historical years separated by comma or semicolon.
    /// Default: every year present except the current one.
    #[arg(long)]
    historical_years: Option<String>,
    /// Save the filtered samples to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Write one chart per category into this directory.
    #[arg(long)]
    plot_dir: Option<PathBuf>,
    /// Chart format (svg or png).
    #[arg(long, default_value = "svg")]
    plot_format: String,
    /// Width of the plots (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the plots (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Print the comparison summary to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn parse_set(s: &Option<String>) -> BTreeSet<String> {
    s.as_deref().map(parse_list).unwrap_or_default().into_iter().collect()
}

fn fmt_val(x: f64) -> String {
    // Format up to 4 decimals, then trim trailing zeros and trailing dot.
    let s = format!("{:.4}", x);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Fetch(args) => cmd_fetch(args),
        Command::Report(args) => cmd_report(args),
    }
}

fn cmd_fetch(args: FetchArgs) -> Result<()> {
    let client = Client::default();
    let end = args
        .end
        .unwrap_or_else(|| Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string());
    let url = client.download_url(&args.start, &end);
    let samples = loader::load_source(&client, &Source::Remote(url))?;

    std::fs::create_dir_all(&args.out_dir)?;
    let older = args.out_dir.join("field_samples_2005_2014.csv");
    let recent = args.out_dir.join("field_samples_2015_present.csv");
    storage::save_split(&samples, &older, &recent)?;
    eprintln!(
        "Saved {} rows to {} and {}",
        samples.len(),
        older.display(),
        recent.display()
    );
    Ok(())
}

fn cmd_report(args: ReportArgs) -> Result<()> {
    let client = Client::default();
    let sources: Vec<Source> = if args.input.is_empty() {
        vec![
            Source::Remote(fems_rs::api::SPLIT_OLDER_URL.into()),
            Source::Remote(fems_rs::api::SPLIT_RECENT_URL.into()),
        ]
    } else {
        args.input.iter().map(|s| Source::from(s.as_str())).collect()
    };

    let mut store = SampleStore::new();
    let samples = store.load(&client, &sources)?;

    let months: BTreeSet<u32> = args
        .months
        .as_deref()
        .map(parse_list)
        .unwrap_or_default()
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    let selection = FilterSelection {
        sites: parse_set(&args.sites),
        categories: parse_set(&args.categories),
        fuel_types: parse_set(&args.fuel_types),
        months,
    };
    let filtered = selection.apply(&samples);
    if filtered.is_empty() {
        println!("No data matches your filter selections.");
        return Ok(());
    }

    // Year menus come from the full dataset, not the filtered subset, so a
    // month filter cannot shift the default comparison year.
    let years = years_present(&samples);
    let current_year = args
        .current_year
        .or_else(|| years.last().copied())
        .expect("loaded set is non-empty");
    let historical_years: BTreeSet<i32> = match &args.historical_years {
        Some(s) => parse_list(s).iter().filter_map(|y| y.parse().ok()).collect(),
        None => years.iter().copied().filter(|y| *y != current_year).collect(),
    };

    if let Some(path) = args.out.as_ref() {
        let fmt = match args.format {
            Some(OutFormat::Csv) => "csv",
            Some(OutFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
        }
        .to_ascii_lowercase();
        match fmt.as_str() {
            "csv" => storage::save_csv(&filtered, path)?,
            "json" => storage::save_json(&filtered, path)?,
            other => anyhow::bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} rows to {}", filtered.len(), path.display());
    }

    let Some(report) = stats::compare(&filtered, current_year, &historical_years) else {
        println!("No data matches your filter selections.");
        return Ok(());
    };

    if let Some(dir) = args.plot_dir.as_ref() {
        let written = viz::plot_all(&report, dir, args.width, args.height, &args.plot_format)?;
        eprintln!("Wrote {} chart(s) to {}", written.len(), dir.display());
    }

    if args.stats {
        for cat in &report.categories {
            for p in &cat.current {
                println!(
                    "{} • {}  {} current={}",
                    cat.category,
                    p.bucket,
                    current_year,
                    fmt_val(p.mean)
                );
            }
            match &cat.historical {
                stats::HistoricalSeries::SingleYear { year, points } => {
                    for p in points {
                        println!(
                            "{} • {}  {} mean={}",
                            cat.category,
                            p.bucket,
                            year,
                            fmt_val(p.mean)
                        );
                    }
                }
                stats::HistoricalSeries::Band(points) => {
                    for p in points {
                        println!(
                            "{} • {}  hist avg={} min={} max={}",
                            cat.category,
                            p.bucket,
                            fmt_val(p.mean),
                            fmt_val(p.min),
                            fmt_val(p.max)
                        );
                    }
                }
            }
        }
    }

    Ok(())
}
