// Copyright 2026 Karpeles Lab Inc.
// PCZ2 compression command-line tool

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
#[command(name = "pczc")]
#[command(about = "PCZ2 block-parallel compression tool", long_about = None)]
#[command(version)]
struct Args {
    /// Input files to compress
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

    /// Block size (e.g. 64K, 256K, 1M, 4M)
    #[arg(long, default_value = "1M")]
    blocksize: String,

    /// Do not overwrite existing files
    #[arg(long)]
    safe: bool,

    /// Delete source files after successful compression
    #[arg(long)]
    rm: bool,

    /// Quiet mode - don't print progress
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Verify written files by decompressing them
    #[arg(long)]
    verify: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.files.len() > 1 && args.output.is_some() {
        anyhow::bail!("Cannot use -o with multiple input files");
    }

    let block_size = parse_size(&args.blocksize).context("Invalid block size")?;
    pcz::set_block_size(block_size);

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
        compress_one(file, &args)?;
        if let Some(ref pb) = pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    Ok(())
}

fn compress_one(input_path: &str, args: &Args) -> Result<()> {
    let input = PathBuf::from(input_path);

    if !input.exists() {
        anyhow::bail!("File not found: {}", input_path);
    }
    if !input.is_file() {
        anyhow::bail!("Not a file: {}", input_path);
    }

    let output = if let Some(ref out) = args.output {
        out.clone()
    } else {
        input.with_extension(format!(
            "{}.pcz",
            input.extension().and_then(|s| s.to_str()).unwrap_or("")
        ))
    };

    if args.safe && output.exists() {
        anyhow::bail!("Output file already exists: {}", output.display());
    }

    run_compress(args.scheduler, args.threads, &input, &output)
        .with_context(|| format!("Failed to compress {}", input.display()))?;

    if !args.quiet {
        let input_size = fs::metadata(&input)?.len();
        let output_size = fs::metadata(&output)?.len();
        let ratio = if input_size > 0 {
            (output_size as f64 / input_size as f64) * 100.0
        } else {
            100.0
        };
        println!("{} -> {} ({:.2}%)", input.display(), output.display(), ratio);
    }

    if args.verify {
        verify_container(&input, &output)?;
        if !args.quiet {
            println!("{}: verified", output.display());
        }
    }

    if args.rm {
        fs::remove_file(&input)
            .with_context(|| format!("Failed to remove source file: {}", input.display()))?;
    }

    Ok(())
}

fn run_compress(
    scheduler: Scheduler,
    threads: usize,
    input: &Path,
    output: &Path,
) -> pcz::Result<()> {
    match scheduler {
        Scheduler::Seq => pcz::compress_file(input, output),
        Scheduler::Bsp => pcz::compress_file_bsp(input, output, threads),
        Scheduler::Ws => pcz::compress_file_ws(input, output, threads),
    }
}

/// Decompress next to the container and compare against the original.
fn verify_container(original: &Path, packed: &Path) -> Result<()> {
    let restored = packed.with_extension("verify-tmp");
    let result = (|| -> Result<()> {
        pcz::decompress_file(packed, &restored)
            .with_context(|| format!("Verification decompress failed: {}", packed.display()))?;
        let original_data = fs::read(original)?;
        let restored_data = fs::read(&restored)?;
        if original_data != restored_data {
            anyhow::bail!("Verification failed: {} does not restore", packed.display());
        }
        Ok(())
    })();
    let _ = fs::remove_file(&restored);
    result
}

fn parse_size(s: &str) -> Result<usize> {
    let s = s.trim().to_uppercase();

    if let Some(num) = s.strip_suffix('K') {
        Ok(num.parse::<usize>()? * 1024)
    } else if let Some(num) = s.strip_suffix('M') {
        Ok(num.parse::<usize>()? * 1024 * 1024)
    } else {
        s.parse::<usize>().context("Invalid size format")
    }
}
