//! zsink command line tool
//!
//! ## Usage
//!
//! ```bash
//! # Compress stdin to stdout
//! zsink pipe < input > input.gz
//!
//! # Compare adapters on a file, writing FILE.gz, FILE.qz and FILE.qz_s
//! zsink bench FILE
//! ```

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use zsink::metrics::{Throughput, Timings};
use zsink::{Adapter, Format, Kind, OpenMode, Options, SessionParams, StreamSink};

#[derive(Parser, Debug)]
#[command(name = "zsink")]
#[command(version)]
#[command(about = "Streaming compression adapters", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress stdin to stdout
    Pipe {
        /// Adapter to use
        #[arg(long, value_enum, default_value_t = KindArg::Streaming)]
        kind: KindArg,
        /// Output format
        #[arg(long, value_enum, default_value_t = FormatArg::Gzip)]
        format: FormatArg,
        /// Size of reads from stdin
        #[arg(long, default_value_t = 16 * 1024)]
        chunk: usize,
        /// Compression level
        #[arg(long, default_value_t = 1)]
        level: i32,
    },
    /// Compress file with every adapter and report timings
    Bench {
        /// File to compress
        file: PathBuf,
        /// 0 runs every case, 1 gzip baseline, 2 one-shot, 3 streaming
        #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
        case: u8,
        /// Size of reads from file
        #[arg(long, default_value_t = 1024 * 1024)]
        chunk: usize,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum KindArg {
    Oneshot,
    Streaming,
    Gzip,
}

impl From<KindArg> for Kind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Oneshot => Kind::OneShot,
            KindArg::Streaming => Kind::Streaming,
            KindArg::Gzip => Kind::Gzip,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatArg {
    Deflate,
    Zlib,
    Gzip,
    Zstd,
}

impl From<FormatArg> for Format {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Deflate => Format::Deflate,
            FormatArg::Zlib => Format::Zlib,
            FormatArg::Gzip => Format::Gzip,
            FormatArg::Zstd => Format::Zstd,
        }
    }
}

//Reads `input` in `chunk` sized pieces, writing each to `adapter`.
fn copy<R: Read, W: Write>(mut input: R, adapter: &mut Adapter<W>, chunk: usize) -> Result<u64, zsink::Error> {
    let mut buf = vec![0; chunk.max(1)];
    let mut total = 0u64;
    loop {
        let size = match input.read(&mut buf) {
            Ok(0) => break Ok(total),
            Ok(size) => size,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => break Err(error.into()),
        };

        let mut written = 0;
        while written < size {
            written += adapter.push(&buf[written..size])?;
        }
        total += size as u64;
    }
}

fn pipe(kind: Kind, format: Format, chunk: usize, level: i32) -> Result<(), zsink::Error> {
    let opts = Options::new().params(SessionParams::new().format(format).level(level));
    let stdout = io::stdout();
    let mut adapter = Adapter::open_on_existing(stdout.lock(), kind, &opts)?;
    let total = copy(io::stdin().lock(), &mut adapter, chunk)?;
    adapter.close()?;
    tracing::debug!("pipe: compressed {} bytes", total);
    Ok(())
}

fn print_stats(bytes: u64, elapsed: Duration, timings: Option<&Timings>) {
    println!("Time taken:     {:9.3} ms", elapsed.as_secs_f64() * 1000.0);
    println!("Throughput:     {:>9}", Throughput::new(bytes, elapsed).to_string());
    if let Some(timings) = timings {
        if let (Some(mean), Some(max)) = (timings.mean(), timings.max()) {
            println!("Engine calls:   {:9} (mean {:?}, max {:?})", timings.len(), mean, max);
        }
    }
}

fn bench_case(path: &Path, kind: Kind, chunk: usize) -> Result<(), zsink::Error> {
    let (extension, name) = match kind {
        Kind::Gzip => ("gz", "gzip"),
        Kind::OneShot => ("qz", "one-shot"),
        Kind::Streaming => ("qz_s", "streaming"),
    };

    let mut output = path.as_os_str().to_owned();
    output.push(".");
    output.push(extension);

    let input = fs::File::open(path).map_err(|source| zsink::Error::Open {
        path: path.to_owned(),
        source,
    })?;
    let opts = Options::new().record_timings(true);
    let mut adapter = Adapter::open_by_path(&output, OpenMode::Write, kind, &opts)?;

    let start = Instant::now();
    let total = copy(input, &mut adapter, chunk)?;
    let elapsed = start.elapsed();
    let timings = adapter.timings().cloned();
    adapter.close()?;

    println!("Test {} done", name);
    print_stats(total, elapsed, timings.as_ref());
    Ok(())
}

fn bench(path: &Path, case: u8, chunk: usize) -> Result<(), zsink::Error> {
    let cases: &[Kind] = match case {
        1 => &[Kind::Gzip],
        2 => &[Kind::OneShot],
        3 => &[Kind::Streaming],
        _ => &[Kind::Gzip, Kind::OneShot, Kind::Streaming],
    };

    for kind in cases {
        bench_case(path, *kind, chunk)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let result = match args.command {
        Command::Pipe { kind, format, chunk, level } => pipe(kind.into(), format.into(), chunk, level),
        Command::Bench { file, case, chunk } => bench(&file, case, chunk),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{}", error);
            eprintln!("zsink: {}", error);
            ExitCode::FAILURE
        }
    }
}
