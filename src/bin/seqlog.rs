//! seqlog CLI
//!
//! Loads messages into an in-memory log, then drains it as JSON or live-tails
//! it while a writer thread appends from stdin.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use seqlog::drain::{self, DrainOptions, Message};
use seqlog::{CancelToken, Config, Entry, Log, SeqLogError};
use tracing_subscriber::{fmt, EnvFilter};

/// seqlog
#[derive(Parser, Debug)]
#[command(name = "seqlog")]
#[command(about = "Range and live-tail queries over an append-only log")]
#[command(version)]
struct Args {
    /// Largest accepted record in MB
    #[arg(long, default_value = "16")]
    max_record_mb: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a JSON-lines file and print it as a drained JSON array
    Drain {
        /// JSON-lines input, one message payload per line
        #[arg(short, long)]
        input: PathBuf,

        /// First sequence to print
        #[arg(short, long, default_value = "0")]
        seq: u64,

        /// Most positions to read
        #[arg(short, long)]
        limit: Option<usize>,

        /// Redact these sequences before draining
        #[arg(long = "null")]
        null: Vec<u64>,

        /// Leave out ReceiveLogSeq
        #[arg(long)]
        no_seq_wrap: bool,
    },

    /// Append stdin lines from a writer thread and live-tail them
    Tail {
        /// First sequence to print
        #[arg(short, long, default_value = "0")]
        from: u64,

        /// Stop waiting after this many milliseconds
        #[arg(short, long)]
        timeout_ms: Option<u64>,
    },
}

fn main() {
    // Logs go to stderr; stdout carries the output
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,seqlog=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!("seqlog v{}", seqlog::VERSION);

    let result = build_config(args.max_record_mb).and_then(|config| match args.command {
        Commands::Drain {
            input,
            seq,
            limit,
            null,
            no_seq_wrap,
        } => run_drain(config, &input, seq, limit, &null, !no_seq_wrap),
        Commands::Tail { from, timeout_ms } => run_tail(config, from, timeout_ms),
    });

    if let Err(e) = result {
        tracing::error!("seqlog failed: {}", e);
        std::process::exit(1);
    }
}

fn build_config(max_record_mb: usize) -> seqlog::Result<Config> {
    let max_record_size = max_record_mb
        .checked_mul(1024 * 1024)
        .ok_or_else(|| {
            SeqLogError::Config(format!("max record size of {} MB overflows", max_record_mb))
        })?;

    Ok(Config::builder().max_record_size(max_record_size).build())
}

fn run_drain(
    config: Config,
    input: &Path,
    seq: u64,
    limit: Option<usize>,
    null: &[u64],
    seq_wrap: bool,
) -> seqlog::Result<()> {
    let log: Log<Message> = Log::new(config)?;

    for msg in Message::read_jsonl(input)? {
        log.append(&msg)?;
    }
    for &s in null {
        log.null(s)?;
    }

    let options = DrainOptions {
        seq,
        limit,
        seq_wrap,
    };
    println!("{}", drain::drain(&log, options)?);
    Ok(())
}

fn run_tail(config: Config, from: u64, timeout_ms: Option<u64>) -> seqlog::Result<()> {
    let log: Log<Message> = Log::new(config)?;
    let cancel = match timeout_ms {
        Some(ms) => CancelToken::with_timeout(Duration::from_millis(ms)),
        None => CancelToken::new(),
    };

    let writer_log = log.clone();
    let writer_cancel = cancel.clone();
    let writer = thread::spawn(move || {
        let result = append_lines(&writer_log, io::stdin().lock());
        // End of input ends the tail once the reader catches up
        writer_cancel.cancel();
        result
    });

    let mut query = log.query();
    query.gte(from)?.live(true)?.seq_wrap(true)?;

    loop {
        match query.next(&cancel) {
            Ok(Some(entry)) => print_entry(entry),
            Ok(None) => break,
            Err(SeqLogError::Cancelled { seq }) => {
                // Flush whatever was written before the wait gave up
                let mut rest = log.query();
                rest.gte(seq)?.seq_wrap(true)?;
                for entry in rest.iter(&CancelToken::never()) {
                    print_entry(entry?);
                }
                break;
            }
            Err(e) => return Err(e),
        }
    }

    // A timeout can fire while the writer is still blocked on stdin
    if writer.is_finished() {
        writer
            .join()
            .map_err(|_| SeqLogError::Storage("writer thread panicked".to_string()))??;
    }
    Ok(())
}

fn print_entry(entry: Entry<Message>) {
    if let Entry::Sequenced(seq, msg) = entry {
        println!("{}\t{}\t{}", seq, msg.key, msg.content);
    }
}

fn append_lines(log: &Log<Message>, input: impl BufRead) -> seqlog::Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        log.append(&Message::new(line))?;
    }
    Ok(())
}
