// In: src/bin/partzip.rs

//! Command-line entry point.
//!
//! The binary is usually started once per rank by an external launcher. The
//! codec is taken from `--codec`, else from the name the program was invoked
//! as (`super_zlib`, `partzip-bz2`, ...), else from the job file, else deflate.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::Parser;
use log::LevelFilter;

use partzip::error::{EXIT_OK, EXIT_USAGE};
use partzip::part_pipeline::exit_status;
use partzip::{
    run_local_pool, run_worker, CodecKind, CompressionJob, PartzipError, WorkerIdentity,
    WorkerReport,
};

#[derive(Debug, Parser)]
#[clap(
    name = "partzip",
    about = "Split a file into byte-range parts and compress each part on its own",
    version = partzip::VERSION
)]
struct Cli {
    /// File to split and compress.
    input_file: PathBuf,

    /// Directory that receives the part files `1`..`parts`.
    output_directory: PathBuf,

    /// Number of parts to produce [default: 2].
    #[arg(short = 'p', long)]
    parts: Option<u32>,

    /// Compression level [default: codec specific].
    #[arg(short = 'l', long)]
    level: Option<u32>,

    /// Bytes read per compressor call [default: 4096].
    #[arg(short = 'b', long = "bs")]
    bs: Option<usize>,

    /// Backend: deflate, bzip2 or zstd.
    #[arg(short = 'c', long)]
    codec: Option<CodecKind>,

    /// This process's rank. Read from the launcher environment when omitted.
    #[arg(long)]
    rank: Option<u32>,

    /// Size of the worker pool. Read from the launcher environment when omitted.
    #[arg(long)]
    workers: Option<u32>,

    /// Run the whole pool inside this process, one thread per rank.
    #[arg(long, conflicts_with_all = ["rank", "workers"])]
    local_workers: Option<u32>,

    /// JSON job file; command-line flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the worker reports as JSON on stdout.
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,

    /// Append log output to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() {
    std::process::exit(run(std::env::args_os().collect()));
}

fn run(args: Vec<OsString>) -> i32 {
    let program = args
        .first()
        .map(|a| a.to_string_lossy().into_owned())
        .unwrap_or_default();

    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_OK,
                _ => EXIT_USAGE,
            };
            let _ = e.print();
            return code;
        }
    };

    init_logging(cli.verbose, cli.log_file.as_deref());

    match execute(cli, &program) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("partzip: {}", e);
            e.exit_code()
        }
    }
}

fn build_job(cli: &Cli, program: &str) -> Result<CompressionJob, PartzipError> {
    let mut job = match &cli.config {
        Some(path) => CompressionJob::from_json_file(path)?,
        None => CompressionJob::new(&cli.input_file, &cli.output_directory),
    };
    job.input = cli.input_file.clone();
    job.output_dir = cli.output_directory.clone();

    if let Some(codec) = cli.codec.or_else(|| CodecKind::from_program_name(program)) {
        job.codec = codec;
    }
    if let Some(parts) = cli.parts {
        job.parts = parts;
    }
    if let Some(level) = cli.level {
        job.level = Some(level);
    }
    if let Some(bs) = cli.bs {
        job.chunk_size = bs;
    }
    Ok(job)
}

fn execute(cli: Cli, program: &str) -> Result<i32, PartzipError> {
    let prepared = build_job(&cli, program)?.prepare()?;
    log::info!(
        "{} -> {}: {} bytes in {} parts, {} level {}, {} byte reads",
        prepared.job.input.display(),
        prepared.job.output_dir.display(),
        prepared.input_size,
        prepared.job.parts,
        prepared.job.codec,
        prepared.job.effective_level(),
        prepared.job.chunk_size
    );

    let reports: Vec<WorkerReport> = match cli.local_workers {
        Some(workers) => run_local_pool(&prepared, workers)?,
        None => {
            let identity = WorkerIdentity::resolve(cli.rank, cli.workers)?;
            vec![run_worker(&prepared, identity.rank, identity.workers)?]
        }
    };

    if cli.json {
        // The parts are already on disk; a report that fails to print does not change that.
        match serde_json::to_string_pretty(&reports) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("partzip: cannot print report: {}", e),
        }
    }
    for report in &reports {
        for failure in &report.failed {
            eprintln!("partzip: rank {}: {}", report.rank, failure.error);
        }
    }
    Ok(exit_status(&reports))
}

fn init_logging(verbose: bool, log_file: Option<&Path>) {
    let mut builder = env_logger::Builder::new();

    builder.filter_level(if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    });
    builder.parse_default_env();

    // Custom formatter: just print the level and message
    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(buf, "[{}] {}", record.level(), record.args())
    });

    if let Some(path) = log_file {
        match OpenOptions::new().append(true).create(true).open(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!(
                "partzip: cannot open log file {}: {}, logging to stderr",
                path.display(),
                e
            ),
        }
    }

    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_cli_flags_override_defaults() {
        let cli = Cli::try_parse_from(args(&[
            "partzip", "in.bin", "out", "-p", "8", "--bs", "65536", "-l", "3",
        ]))
        .unwrap();
        let job = build_job(&cli, "partzip").unwrap();
        assert_eq!(job.parts, 8);
        assert_eq!(job.chunk_size, 65536);
        assert_eq!(job.level, Some(3));
        assert_eq!(job.codec, CodecKind::Deflate);
    }

    #[test]
    fn test_program_name_selects_codec() {
        let cli = Cli::try_parse_from(args(&["super_bz2", "in.bin", "out"])).unwrap();
        assert_eq!(build_job(&cli, "super_bz2").unwrap().codec, CodecKind::Bzip2);

        let cli =
            Cli::try_parse_from(args(&["super_bz2", "in.bin", "out", "-c", "zstd"])).unwrap();
        assert_eq!(build_job(&cli, "super_bz2").unwrap().codec, CodecKind::Zstd);
    }

    #[test]
    fn test_usage_errors_map_to_usage_status() {
        assert_eq!(run(args(&["partzip", "only-one-arg"])), EXIT_USAGE);
        assert_eq!(run(args(&["partzip", "--help"])), EXIT_OK);
        assert_eq!(
            run(args(&["partzip", "in", "out", "--local-workers", "2", "--rank", "0"])),
            EXIT_USAGE
        );
    }

    #[test]
    fn test_missing_input_maps_to_input_status() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.bin");
        let code = run(vec![
            OsString::from("partzip"),
            missing.into_os_string(),
            dir.path().join("out").into_os_string(),
        ]);
        assert_eq!(code, partzip::error::EXIT_INPUT_UNAVAILABLE);
    }

    #[test]
    fn test_end_to_end_local_pool() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.bin");
        std::fs::write(&input, vec![3u8; 20_000]).unwrap();
        let out = dir.path().join("out");

        let code = run(vec![
            OsString::from("partzip-zstd"),
            input.into_os_string(),
            out.clone().into_os_string(),
            OsString::from("--parts"),
            OsString::from("5"),
            OsString::from("--local-workers"),
            OsString::from("2"),
        ]);
        assert_eq!(code, EXIT_OK);
        for number in 1..=5 {
            let bytes = std::fs::read(out.join(number.to_string())).unwrap();
            assert_eq!(zstd::stream::decode_all(&bytes[..]).unwrap(), vec![3u8; 4000]);
        }
    }

    #[test]
    fn test_job_file_layers_under_flags() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.bin");
        std::fs::write(&input, vec![8u8; 10_000]).unwrap();
        let job_file = dir.path().join("job.json");
        std::fs::write(&job_file, r#"{"parts": 4, "codec": "zstd"}"#).unwrap();
        let out = dir.path().join("out");

        let code = run(vec![
            OsString::from("partzip"),
            input.clone().into_os_string(),
            out.clone().into_os_string(),
            OsString::from("--config"),
            job_file.clone().into_os_string(),
            OsString::from("--bs"),
            OsString::from("1000"),
            OsString::from("--json"),
        ]);
        assert_eq!(code, EXIT_OK);
        for number in 1..=4 {
            let bytes = std::fs::read(out.join(number.to_string())).unwrap();
            assert_eq!(zstd::stream::decode_all(&bytes[..]).unwrap(), vec![8u8; 2500]);
        }

        let cli = Cli::try_parse_from(vec![
            OsString::from("partzip"),
            input.into_os_string(),
            out.into_os_string(),
            OsString::from("--config"),
            job_file.into_os_string(),
            OsString::from("-p"),
            OsString::from("6"),
        ])
        .unwrap();
        let job = build_job(&cli, "partzip").unwrap();
        assert_eq!(job.parts, 6);
        assert_eq!(job.codec, CodecKind::Zstd);
        assert_eq!(job.chunk_size, 4096);
    }

    #[test]
    fn test_bad_level_is_a_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.bin");
        std::fs::write(&input, b"x").unwrap();
        let code = run(vec![
            OsString::from("partzip"),
            input.into_os_string(),
            dir.path().join("out").into_os_string(),
            OsString::from("--level"),
            OsString::from("11"),
        ]);
        assert_eq!(code, EXIT_USAGE);
    }
}
