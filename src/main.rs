use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use posecoach::{
    engine::{Engine, Timing},
    evaluate::{Evaluation, Evaluator, PoseCategory},
    input::{self, Format},
    Error,
};
use std::{
    io::{self, BufRead, Read, Write},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{channel, RecvTimeoutError},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};
use structopt::StructOpt;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;

/// How often the evaluator wakes up to check for Ctrl-C while no frames arrive.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, structopt::StructOpt)]
enum Command {
    /// Score a single keypoint set and print the result as JSON.
    Evaluate {
        #[structopt(flatten)]
        source: Source,

        /// JSON file holding the keypoints; stdin when omitted.
        #[structopt(parse(from_os_str))]
        file: Option<PathBuf>,
    },
    /// Score newline-delimited keypoint sets from stdin, newest first, at a bounded rate.
    Stream {
        #[structopt(flatten)]
        source: Source,

        /// Minimum time between two evaluations.
        #[structopt(short, long, default_value = "100")]
        interval_ms: u64,

        #[structopt(short, long)]
        show_progress: bool,
    },
}

#[derive(Debug, structopt::StructOpt)]
struct Source {
    /// Pose to score against.
    #[structopt(short, long, default_value = "front-double-biceps")]
    pose: PoseCategory,

    /// Read `[y, x, score]` detector rows instead of named keypoints.
    #[structopt(short, long)]
    raw: bool,
}

fn read_input(file: Option<&Path>) -> Result<String, Error> {
    match file {
        Some(path) => {
            std::fs::read_to_string(path).map_err(|e| Error::OpenInput(e, path.to_path_buf()))
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(Error::ReadInput)?;
            Ok(text)
        }
    }
}

fn evaluate(source: &Source, file: Option<&Path>) -> Result<()> {
    let strategy = source.pose.try_evaluator()?;
    let text = read_input(file)?;
    let keypoints = input::parse(&text, Format::from_raw_flag(source.raw))
        .context("failed parsing keypoints")?;

    let evaluation = strategy.evaluate(&keypoints);
    info!(
        pose = %source.pose,
        score = evaluation.score,
        keypoints = keypoints.len(),
        "evaluated pose"
    );

    let json = serde_json::to_string_pretty(&evaluation).map_err(Error::SerializeEvaluation)?;
    println!("{}", json);
    Ok(())
}

fn stream(source: &Source, interval: Duration, show_progress: bool) -> Result<()> {
    let strategy = source.pose.try_evaluator()?;
    let format = Format::from_raw_flag(source.raw);

    let running = Arc::new(AtomicBool::new(true));
    let running_ctrl_c = running.clone();

    ctrlc::set_handler(move || {
        running_ctrl_c.store(false, Ordering::SeqCst);
    })
    .context("failed setting Ctrl-C handler")?;

    let progress = if show_progress {
        Some(
            ProgressBar::new_spinner().with_style(
                ProgressStyle::default_spinner()
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                    .template("{prefix:.bold.dim} {spinner} {wide_msg}"),
            ),
        )
    } else {
        None
    };

    let (frames_tx, frames_rx) = channel();
    let (evaluations_tx, evaluations_rx) = channel::<Evaluation>();

    // Reading stdin cannot be interrupted, so the reader is left detached and dies with the
    // process.
    let running_read = running.clone();
    thread::spawn(move || {
        let stdin = io::stdin();
        for (line_num, line) in stdin.lock().lines().enumerate() {
            if !running_read.load(Ordering::SeqCst) {
                break;
            }
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "failed reading stdin");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match input::parse(&line, format) {
                Ok(keypoints) => {
                    if frames_tx.send(keypoints).is_err() {
                        break;
                    }
                }
                Err(e) => warn!(line = line_num + 1, error = %e, "skipping malformed frame"),
            }
        }
    });

    crossbeam::thread::scope(|scope| -> Result<()> {
        let running_eval = running.clone();
        let evaluator = scope.spawn(move |_| {
            let mut engine = Engine::new(strategy, interval);
            while running_eval.load(Ordering::SeqCst) {
                let mut frame = match engine.latest(&frames_rx, POLL_INTERVAL) {
                    Ok(frame) => frame,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                };

                let wait = engine.next_wait(Instant::now());
                if !wait.is_zero() {
                    thread::sleep(wait);
                    frame = engine.refresh(&frames_rx, frame);
                }

                if let Some(evaluation) = engine.offer(&frame, Instant::now()) {
                    evaluations_tx.send(evaluation)?;
                }
            }
            Ok::<Timing, anyhow::Error>(engine.timing)
        });

        let writer = scope.spawn(move |_| {
            let stdout = io::stdout();
            while let Ok(evaluation) = evaluations_rx.recv() {
                let mut out = stdout.lock();
                serde_json::to_writer(&mut out, &evaluation)
                    .map_err(Error::SerializeEvaluation)?;
                writeln!(out).context("failed writing evaluation")?;
                out.flush().context("failed flushing stdout")?;

                if let Some(progress) = progress.as_ref() {
                    progress.set_message(format!(
                        "score: {:>3}, feedback items: {}",
                        evaluation.score,
                        evaluation.feedback.len()
                    ));
                    progress.inc(1);
                }
            }
            if let Some(progress) = progress {
                progress.finish_and_clear();
            }
            Ok::<_, anyhow::Error>(())
        });

        let timing = evaluator
            .join()
            .map_err(|_| anyhow!("evaluator thread panicked"))??;
        writer
            .join()
            .map_err(|_| anyhow!("writer thread panicked"))??;

        info!(
            evaluated = timing.evaluated,
            dropped = timing.dropped,
            rate = timing.evaluation_rate(),
            "stream finished"
        );
        Ok(())
    })
    .map_err(|_| anyhow!("stream pipeline panicked"))?
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .with(opt.log_level),
    )?;

    match opt.command {
        Command::Evaluate { source, file } => evaluate(&source, file.as_deref()),
        Command::Stream {
            source,
            interval_ms,
            show_progress,
        } => stream(&source, Duration::from_millis(interval_ms), show_progress),
    }
}
