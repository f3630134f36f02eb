use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;

use clipqa_core::{
    AnswerModel, ClipAnswer, DEFAULT_TOP_K, Provider, clip_filename, default_clips_dir,
    extract_clip, format_report_readable, format_segment, load_annotations, load_answers,
    load_predictions, load_references, load_selected, save_answers, save_report, save_selected,
    score_answers, select_topk,
};

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliProvider {
    #[default]
    Grok,
    Openai,
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Grok => Provider::Grok,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

#[derive(Parser)]
#[command(name = "clipqa")]
#[command(
    about = "Select video queries by temporal IoU, extract clips, answer them with a multimodal model, and score the answers"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rank predicted segments against ground truth and keep the top k
    Select {
        /// Prediction JSON file
        #[arg(long)]
        pred_file: PathBuf,

        /// Ground-truth annotation JSON file
        #[arg(long)]
        val_file: PathBuf,

        /// Output path for the selected queries
        #[arg(short, long)]
        output: PathBuf,

        /// Number of candidates to keep
        #[arg(short, long, default_value_t = DEFAULT_TOP_K)]
        k: usize,
    },

    /// Cut the predicted segment of each selected query out of its source video
    ExtractClips {
        /// Selected-queries JSON file
        #[arg(long)]
        queries: PathBuf,

        /// Directory containing the full source videos
        #[arg(long)]
        video_dir: PathBuf,

        /// Directory for the extracted clips (defaults to the user cache dir)
        #[arg(long)]
        clips_dir: Option<PathBuf>,

        /// Re-extract clips that already exist
        #[arg(short, long)]
        force: bool,
    },

    /// Answer each selected query by showing its clip to a multimodal model
    Answer {
        /// Selected-queries JSON file
        #[arg(long)]
        queries: PathBuf,

        /// Directory containing the extracted clips (defaults to the user cache dir)
        #[arg(long)]
        clips_dir: Option<PathBuf>,

        /// Output path for the generated answers
        #[arg(short, long)]
        output: PathBuf,

        /// AI provider answering the queries
        #[arg(short, long, default_value = "grok")]
        provider: CliProvider,
    },

    /// Score generated answers against references with BLEU, ROUGE-L and METEOR
    Score {
        /// Generated-answers JSON file
        #[arg(long)]
        answers: PathBuf,

        /// Ground-truth answers JSON file
        #[arg(long)]
        gt: PathBuf,

        /// Output path for the score report
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn create_progress(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap(),
    );
    pb
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    println!(
        "\n{}  {}\n",
        style("clipqa").cyan().bold(),
        style("Video QA Evaluator").dim()
    );

    match cli.command {
        Command::Select { pred_file, val_file, output, k } => {
            run_select(&pred_file, &val_file, &output, k).await
        }
        Command::ExtractClips { queries, video_dir, clips_dir, force } => {
            let clips_dir = clips_dir.unwrap_or_else(default_clips_dir);
            run_extract_clips(&queries, &video_dir, &clips_dir, force).await
        }
        Command::Answer { queries, clips_dir, output, provider } => {
            let clips_dir = clips_dir.unwrap_or_else(default_clips_dir);
            run_answer(&queries, &clips_dir, &output, provider.into()).await
        }
        Command::Score { answers, gt, output } => run_score(&answers, &gt, &output).await,
    }
}

async fn run_select(pred_file: &PathBuf, val_file: &PathBuf, output: &PathBuf, k: usize) -> Result<()> {
    let spinner = create_spinner("Ranking predictions by IoU...");
    let predictions = load_predictions(pred_file).await?;
    let annotations = load_annotations(val_file).await?;
    let selected = select_topk(&predictions, &annotations, k);
    save_selected(&selected, output).await?;
    spinner.finish_with_message(format!(
        "{} Selected top {} of {} candidates",
        style("✓").green().bold(),
        selected.len(),
        style(format!("k={k}")).dim()
    ));

    println!(
        "\n{} {}\n",
        style("Saved:").dim(),
        style(output.display()).cyan()
    );
    Ok(())
}

async fn run_extract_clips(
    queries: &PathBuf,
    video_dir: &PathBuf,
    clips_dir: &PathBuf,
    force: bool,
) -> Result<()> {
    let selected = load_selected(queries).await?;
    fs::create_dir_all(clips_dir).await?;

    let pb = create_progress(selected.len() as u64);
    pb.set_message("Extracting clips");

    let mut extracted = 0usize;
    let mut cached = 0usize;
    let mut skipped = 0usize;

    for (idx, item) in selected.iter().enumerate() {
        let video_path = video_dir.join(format!("{}.mp4", item.video_uid));
        let clip_path = clips_dir.join(clip_filename(&item.video_uid, idx));

        if !video_path.exists() {
            pb.println(format!(
                "{} Missing video: {}",
                style("!").yellow().bold(),
                item.video_uid
            ));
            skipped += 1;
            pb.inc(1);
            continue;
        }

        if clip_path.exists() && !force {
            cached += 1;
            pb.inc(1);
            continue;
        }

        match extract_clip(&video_path, &clip_path, item.pred).await {
            Ok(()) => extracted += 1,
            Err(e) => {
                pb.println(format!(
                    "{} Failed to extract {} [{}]: {}",
                    style("!").yellow().bold(),
                    item.video_uid,
                    format_segment(item.pred),
                    e
                ));
                skipped += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    println!(
        "{} Extracted {} clips ({} cached, {} skipped)",
        style("✓").green().bold(),
        extracted,
        cached,
        skipped
    );
    println!(
        "\n{} {}\n",
        style("Clips:").dim(),
        style(clips_dir.display()).cyan()
    );
    Ok(())
}

async fn run_answer(
    queries: &PathBuf,
    clips_dir: &PathBuf,
    output: &PathBuf,
    provider: Provider,
) -> Result<()> {
    // Validate the API key before touching any clip
    let model = match AnswerModel::new(provider) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    let selected = load_selected(queries).await?;

    let pb = create_progress(selected.len() as u64);
    pb.set_message(format!("Answering with {}", model.provider().name()));

    let mut answers: Vec<ClipAnswer> = Vec::new();
    let mut failed = 0usize;

    for (idx, item) in selected.iter().enumerate() {
        let clip_path = clips_dir.join(clip_filename(&item.video_uid, idx));

        if !clip_path.exists() {
            pb.println(format!(
                "{} Clip not found: {}",
                style("!").yellow().bold(),
                clip_path.display()
            ));
            pb.inc(1);
            continue;
        }

        // Per-item failures become empty answers, the batch keeps going
        let answer = match model.answer_query(&clip_path, &item.query).await {
            Ok(answer) => answer,
            Err(e) => {
                pb.println(format!(
                    "{} Error on clip {:02}: {}",
                    style("!").yellow().bold(),
                    idx,
                    e
                ));
                failed += 1;
                String::new()
            }
        };

        answers.push(ClipAnswer {
            query: item.query.clone(),
            video_uid: item.video_uid.clone(),
            clip_path: clip_path.clone(),
            pred: item.pred,
            answer,
        });
        pb.inc(1);
    }

    save_answers(&answers, output).await?;

    pb.finish_and_clear();
    println!(
        "{} Answered {} queries ({} failed)",
        style("✓").green().bold(),
        answers.len(),
        failed
    );
    println!(
        "\n{} {}\n",
        style("Saved:").dim(),
        style(output.display()).cyan()
    );
    Ok(())
}

async fn run_score(answers: &PathBuf, gt: &PathBuf, output: &PathBuf) -> Result<()> {
    let spinner = create_spinner("Scoring answers...");
    let answers = load_answers(answers).await?;
    let references = load_references(gt).await?;
    let (report, unmatched) = score_answers(&answers, &references);
    save_report(&report, output).await?;
    spinner.finish_with_message(format!(
        "{} Scored {} queries",
        style("✓").green().bold(),
        report.results.len()
    ));

    for query in &unmatched {
        println!(
            "{} No generated answer for: {}",
            style("!").yellow().bold(),
            query
        );
    }

    println!(
        "\n{} {}\n",
        style("Saved:").dim(),
        style(output.display()).cyan()
    );
    println!("{}", style("─".repeat(60)).dim());

    // Human-readable output
    let readable = format_report_readable(&report);
    println!("{}", readable);

    Ok(())
}
