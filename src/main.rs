use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use gazette_extract::config::{OutputFormat, Settings};
use gazette_extract::table::{format_percentage, render_grid, Table};
use gazette_extract::{document, report, ExtractMode, ExtractOptions, ResultStatus, Session};

#[derive(Parser)]
#[command(name = "gazette", about = "Extract student results from board gazette text dumps")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Extraction strategy (default from gazette.toml / GAZETTE_MODE)
    #[arg(short, long, global = true, value_enum)]
    mode: Option<ExtractMode>,

    /// Lines searched below a header for its marks
    #[arg(long, global = true)]
    lookahead: Option<usize>,

    /// Add the Performance Tier column
    #[arg(long, global = true)]
    tier: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the extracted table for one or more gazettes
    Extract {
        files: Vec<PathBuf>,
        /// Max rows to display per file
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// School summary, result and tier counts, subject averages
    Summary { file: PathBuf },
    /// Students for one subject code, best marks first (lists codes when omitted)
    Subject { file: PathBuf, code: Option<String> },
    /// Filter by roll/name, result status and percentage range
    Filter {
        file: PathBuf,
        /// Roll number or name fragment
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long, value_enum)]
        result: Option<ResultStatus>,
        #[arg(long, default_value = "0")]
        min: f64,
        #[arg(long, default_value = "100")]
        max: f64,
    },
}

struct Output {
    format: OutputFormat,
    include_tier: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let settings = Settings::load()?;
    info!(settings = ?settings, "settings loaded");

    let mut opts = settings.extract_options();
    if let Some(mode) = cli.mode {
        opts.mode = mode;
    }
    if let Some(n) = cli.lookahead {
        opts.lookahead_lines = n;
    }
    let out = Output {
        format: cli.format.unwrap_or(settings.format),
        include_tier: cli.tier || settings.include_tier,
    };
    let mut session = Session::new();

    let result = match cli.command {
        Commands::Extract { files, limit } => {
            if files.is_empty() {
                println!("No input files given.");
                return Ok(());
            }
            run_extract(&mut session, &files, &opts, &out, limit)
        }
        Commands::Summary { file } => {
            let table = load(&mut session, &file, &opts)?;
            print_summary(&table, &out)
        }
        Commands::Subject { file, code } => {
            let table = load(&mut session, &file, &opts)?;
            print_subject(&table, code.as_deref(), &out)
        }
        Commands::Filter {
            file,
            search,
            result,
            min,
            max,
        } => {
            let table = load(&mut session, &file, &opts)?;
            let rows = report::filter(table.records(), search.as_deref(), result, min, max)?;
            if rows.is_empty() {
                println!("No matching records found.");
                return Ok(());
            }
            let filtered = Table::new(rows.into_iter().cloned().collect());
            print_table(&filtered, &out, None)
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

fn load(session: &mut Session, path: &Path, opts: &ExtractOptions) -> Result<std::sync::Arc<Table>> {
    let text = document::read(path)?;
    let table = session.parse(&text, opts);
    if table.is_empty() {
        println!("No student records found in {}.", path.display());
    }
    Ok(table)
}

fn run_extract(
    session: &mut Session,
    files: &[PathBuf],
    opts: &ExtractOptions,
    out: &Output,
    limit: Option<usize>,
) -> Result<()> {
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut texts = Vec::with_capacity(files.len());
    for path in files {
        pb.set_message(path.display().to_string());
        texts.push(document::read(path)?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let docs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let tables = session.parse_all(&docs, opts);

    for (path, table) in files.iter().zip(&tables) {
        if files.len() > 1 && out.format == OutputFormat::Text {
            println!("== {} ({} records)", path.display(), table.len());
        }
        if table.is_empty() {
            println!("No student records found in {}.", path.display());
            continue;
        }
        print_table(table, out, limit)?;
    }
    Ok(())
}

fn print_table(table: &Table, out: &Output, limit: Option<usize>) -> Result<()> {
    match out.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&table.view(out.include_tier))?);
        }
        OutputFormat::Text => {
            print!("{}", table.render_text(out.include_tier, limit));
            println!("\n{} students", table.len());
        }
    }
    Ok(())
}

fn print_summary(table: &Table, out: &Output) -> Result<()> {
    let records = table.records();
    let summary = report::school_summary(records);
    let results = report::result_counts(records);
    let tiers = report::tier_counts(records);
    let subjects = report::subject_averages(records);

    if out.format == OutputFormat::Json {
        let json = serde_json::json!({
            "summary": summary,
            "results": results.iter().map(|(s, n)| serde_json::json!({ "Result": s, "Count": n })).collect::<Vec<_>>(),
            "tiers": tiers.iter().map(|(t, n)| serde_json::json!({ "Tier": t.label(), "Count": n })).collect::<Vec<_>>(),
            "subjects": subjects,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    println!("Total Students:     {}", summary.total_students);
    println!("Average Percentage: {}%", format_percentage(summary.average_percentage));
    println!("Pass:               {}", summary.pass);
    println!("Compartment:        {}", summary.comp);
    println!("Essential Repeat:   {}", summary.essential_repeat);
    println!("Fail:               {}", summary.fail);

    println!("\n--- Results ---");
    let rows: Vec<Vec<String>> = results
        .iter()
        .map(|(s, n)| vec![s.to_string(), n.to_string()])
        .collect();
    print!("{}", render_grid(&["Result", "Count"], &rows));

    println!("\n--- Performance Tiers ---");
    let rows: Vec<Vec<String>> = tiers
        .iter()
        .map(|(t, n)| vec![t.to_string(), n.to_string()])
        .collect();
    print!("{}", render_grid(&["Tier", "Count"], &rows));

    println!("\n--- Subject Averages ---");
    let rows: Vec<Vec<String>> = subjects
        .iter()
        .map(|a| vec![a.code.clone(), format_percentage(a.average), a.students.to_string()])
        .collect();
    print!("{}", render_grid(&["Subject Code", "Average Marks", "Students"], &rows));
    Ok(())
}

fn print_subject(table: &Table, code: Option<&str>, out: &Output) -> Result<()> {
    let Some(code) = code else {
        println!("Subject codes: {}", report::subject_codes(table.records()).join(", "));
        return Ok(());
    };

    let entries = report::subject_drilldown(table.records(), code);
    if entries.is_empty() {
        println!("No students took subject {}.", code);
        return Ok(());
    }

    if out.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| vec![e.roll_no.clone(), truncate(&e.name, 28), e.code.clone(), e.marks.to_string()])
        .collect();
    print!("{}", render_grid(&["Roll No", "Name", "Subject Code", "Marks"], &rows));
    println!("\n{} students for subject {}", entries.len(), code);
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
