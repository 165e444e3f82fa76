//! Operator CLI for CareerLens.
//!
//! Runs the resume and matching pipeline from a terminal without the HTTP server. Results go to
//! stdout; logs go to stderr and the log file.
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result, bail};
use careerlens::{
    config::{self, SearchMode},
    jobs::{JobBoard, RapidApiJobBoard},
    llm::ChatCompletionClient,
    logging,
    resume::{analyze_resume, parse_resume},
    service::{CareerService, MatchRequest},
    store::Store,
    usage::TokenUsageTracker,
};
use clap::{Parser, Subcommand};

const PREVIEW_CHARS: usize = 400;

#[derive(Parser)]
#[command(
    name = "careerlens-cli",
    about = "Resume analysis and job matching from the command line"
)]
struct Cli {
    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract text from a resume file without calling any API.
    Parse { file: PathBuf },
    /// Extract text and run the LLM role and skill analysis.
    Analyze { file: PathBuf },
    /// Process a resume, search the job board, and rank the postings.
    Match {
        file: PathBuf,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, default_value = "quick")]
        mode: String,
        #[arg(long)]
        keywords: Option<String>,
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Check the job board API key and quota.
    TestJobApi,
    /// Show stored match statistics for a job seeker.
    Stats { seeker: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing();
    // `parse` works offline and must not require API settings.
    if !matches!(cli.command, Command::Parse { .. }) {
        config::init_config();
    }

    match cli.command {
        Command::Parse { file } => parse(&file, cli.json),
        Command::Analyze { file } => analyze(&file, cli.json).await,
        Command::Match {
            file,
            location,
            mode,
            keywords,
            top_k,
        } => {
            let Ok(mode) = mode.parse::<SearchMode>() else {
                bail!("unknown search mode {mode:?}; use quick, standard, or deep");
            };
            let request = MatchRequest {
                job_seeker_id: String::new(),
                keywords,
                location,
                mode,
                top_k,
                min_salary: None,
            };
            run_match(&file, request, cli.json).await
        }
        Command::TestJobApi => test_job_api().await,
        Command::Stats { seeker } => stats(&seeker, cli.json).await,
    }
}

fn read_resume(file: &Path) -> Result<(Vec<u8>, String)> {
    let bytes = std::fs::read(file).with_context(|| format!("cannot read {}", file.display()))?;
    let filename = file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("resume.txt")
        .to_string();
    Ok((bytes, filename))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse(file: &Path, json: bool) -> Result<()> {
    let (bytes, filename) = read_resume(file)?;
    let parsed = parse_resume(&bytes, &filename)?;
    if json {
        return print_json(&serde_json::json!({
            "filename": parsed.filename,
            "textLength": parsed.text_length,
            "wordCount": parsed.word_count,
            "fingerprint": parsed.fingerprint,
            "text": parsed.raw_text,
        }));
    }
    println!("File:       {}", parsed.filename);
    println!("Characters: {}", parsed.text_length);
    println!("Words:      {}", parsed.word_count);
    println!();
    let preview: String = parsed.raw_text.chars().take(PREVIEW_CHARS).collect();
    println!("{preview}");
    if parsed.text_length > PREVIEW_CHARS {
        println!("...");
    }
    Ok(())
}

async fn analyze(file: &Path, json: bool) -> Result<()> {
    let (bytes, filename) = read_resume(file)?;
    let parsed = parse_resume(&bytes, &filename)?;
    let usage = Arc::new(TokenUsageTracker::new());
    let client = ChatCompletionClient::from_config(config::get_config(), usage.clone())?;
    let analysis = analyze_resume(&client, &parsed.raw_text).await;

    if json {
        return print_json(&analysis);
    }
    println!("Primary role:  {}", analysis.primary_role);
    println!("Seniority:     {}", analysis.seniority_level);
    println!("Confidence:    {:.2}", analysis.confidence);
    println!("Skills:        {}", analysis.skills.join(", "));
    println!("Search terms:  {}", analysis.simple_search_terms.join(", "));
    println!("Location:      {}", analysis.location_preference);
    println!("Industries:    {}", analysis.industries.join(", "));
    let summary = usage.summary();
    println!(
        "\nTokens used: {} (estimated ${:.4})",
        summary.total_tokens, summary.estimated_cost
    );
    Ok(())
}

async fn run_match(file: &Path, mut request: MatchRequest, json: bool) -> Result<()> {
    let (bytes, filename) = read_resume(file)?;
    let service = CareerService::new()
        .await
        .context("failed to initialise the career service")?;
    let resume = service.process_resume(bytes, &filename).await?;
    request.job_seeker_id = resume.profile.job_seeker_id.clone();

    eprintln!(
        "Searching {} postings (~{}s) for {}...",
        request.mode.job_count(),
        request.mode.estimated_seconds(),
        resume.profile.analysis.primary_role
    );
    let outcome = service.match_jobs(request).await?;

    if json {
        return print_json(&outcome);
    }
    println!("Job seeker: {}", outcome.job_seeker_id);
    println!(
        "Search:     {} in {} ({} mode)",
        outcome.keywords,
        outcome.location,
        outcome.mode.label()
    );
    println!(
        "Postings:   {} retrieved, {} indexed, {} saved",
        outcome.jobs_retrieved, outcome.jobs_indexed, outcome.matches_persisted
    );
    if let Some(band) = &outcome.salary_band {
        println!(
            "Salary:     {:.0} - {:.0} (median {:.0}, {} postings)",
            band.min, band.max, band.median, band.count
        );
    }
    println!();
    if outcome.matches.is_empty() {
        println!("No matches found.");
    }
    for (rank, scored) in outcome.matches.iter().enumerate() {
        println!(
            "{:>2}. {:5.1}%  {} at {} ({})",
            rank + 1,
            scored.combined_score,
            scored.job.title,
            scored.job.company,
            scored.job.location
        );
        if !scored.matched_skills.is_empty() {
            println!("      skills: {}", scored.matched_skills.join(", "));
        }
    }
    Ok(())
}

async fn test_job_api() -> Result<()> {
    let board = RapidApiJobBoard::from_config(config::get_config())?;
    let status = board.test_connection().await;
    match status.status {
        Some(code) => println!("HTTP {code}: {}", status.message),
        None => println!("{}", status.message),
    }
    if !status.ok {
        bail!("job board check failed");
    }
    Ok(())
}

async fn stats(seeker: &str, json: bool) -> Result<()> {
    let store = Store::from_config(config::get_config()).await?;
    let profile = store
        .get_profile(seeker)
        .await?
        .with_context(|| format!("no profile {seeker}"))?;
    let statistics = store.match_statistics(seeker).await?;
    let top = store.list_matches(seeker, 0.0, 5).await?;

    if json {
        return print_json(&serde_json::json!({
            "jobSeekerId": profile.job_seeker_id,
            "primaryRole": profile.analysis.primary_role,
            "statistics": statistics,
            "topMatches": top,
        }));
    }
    println!("{} ({})", profile.job_seeker_id, profile.analysis.primary_role);
    println!("Matches stored:      {}", statistics.total_matches);
    if let Some(avg) = statistics.avg_match_percentage {
        println!("Average match:       {avg:.1}%");
    }
    if let Some(max) = statistics.max_match_percentage {
        println!("Best match:          {max:.1}%");
    }
    if let Some(avg) = statistics.avg_similarity {
        println!("Average similarity:  {avg:.3}");
    }
    for record in &top {
        println!(
            "  {:5.1}%  {} at {}",
            record.match_percentage, record.job_title, record.company_name
        );
    }
    Ok(())
}
