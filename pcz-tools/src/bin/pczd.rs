// Copyright 2026 Karpeles Lab Inc.
// PCZ2 decompression command-line tool

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scheduler {
    /// Single-threaded
    Seq,
    /// Bulk-synchronous static partitioning
    Bsp,
    /// Work-stealing deques
    Ws,
}

#[derive(Parser)]
#[command(name = "pczd")]
#[command(about = "PCZ2 block-parallel decompression tool", long_about = None)]
#[command(version)]
struct Args {
    /// Input containers to decompress
    #[arg(required = true)]
    files: Vec<String>,

    /// Output file (use with single input file)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Scheduling strategy
    #[arg(long = "impl", value_enum, default_value = "seq")]
    scheduler: Scheduler,

    /// Number of worker threads for the parallel schedulers
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Do not overwrite existing files
    #[arg(long)]
    safe: bool,

    /// Delete source files after successful decompression
    #[arg(long)]
    rm: bool,

    /// Quiet mode - don't print progress
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Verify containers only, don't keep output
    #[arg(long)]
    verify: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.files.len() > 1 && args.output.is_some() {
        anyhow::bail!("Cannot use -o with multiple input files");
    }

    let pb = if !args.quiet && args.files.len() > 1 {
        let pb = ProgressBar::new(args.files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    for file in &args.files {
        decompress_one(file, &args)?;
        if let Some(ref pb) = pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    Ok(())
}

fn decompress_one(input_path: &str, args: &Args) -> Result<()> {
    let input = PathBuf::from(input_path);

    if !input.exists() {
        anyhow::bail!("File not found: {}", input_path);
    }

    if args.verify {
        let restored = input.with_extension("verify-tmp");
        let result = run_decompress(args.scheduler, args.threads, &input, &restored)
            .with_context(|| format!("Verification failed: {}", input.display()));
        let _ = fs::remove_file(&restored);
        result?;
        if !args.quiet {
            println!("{}: ok", input.display());
        }
        return Ok(());
    }

    let output = if let Some(ref out) = args.output {
        out.clone()
    } else if input.extension().and_then(|s| s.to_str()) == Some("pcz") {
        input.with_extension("")
    } else {
        input.with_extension("out")
    };

    if args.safe && output.exists() {
        anyhow::bail!("Output file already exists: {}", output.display());
    }

    run_decompress(args.scheduler, args.threads, &input, &output)
        .with_context(|| format!("Failed to decompress {}", input.display()))?;

    if !args.quiet {
        let input_size = fs::metadata(&input)?.len();
        let output_size = fs::metadata(&output)?.len();
        println!(
            "{} -> {} ({} -> {} bytes)",
            input.display(),
            output.display(),
            input_size,
            output_size
        );
    }

    if args.rm {
        fs::remove_file(&input)
            .with_context(|| format!("Failed to remove source file: {}", input.display()))?;
    }

    Ok(())
}

fn run_decompress(
    scheduler: Scheduler,
    threads: usize,
    input: &Path,
    output: &Path,
) -> pcz::Result<()> {
    match scheduler {
        Scheduler::Seq => pcz::decompress_file(input, output),
        Scheduler::Bsp => pcz::decompress_file_bsp(input, output, threads),
        Scheduler::Ws => pcz::decompress_file_ws(input, output, threads),
    }
}
