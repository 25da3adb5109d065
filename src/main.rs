// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use markov_remix::config::RemixConfig;
use markov_remix::model::ModelError;
use markov_remix::pipeline::{mix_into_output, remix_file};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::Level;

fn print_usage() {
    println!("MARKOV-REMIX - Second-order Markov melody generator");
    println!();
    println!("Usage: markov-remix <input.mid> [OPTIONS]");
    println!("       markov-remix --mix <base.mid> <generated.mid> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <PATH>   Load settings from a YAML or TOML file");
    println!("  --seed <N>        Seed the random generator for a reproducible run");
    println!("  --length <N>      Number of events to generate (default 500)");
    println!("  --verbose         Show debug logging");
    println!("  --help            Show this help message");
}

/// Parsed command line
#[derive(Debug, Default)]
struct Options {
    positional: Vec<PathBuf>,
    mix: bool,
    config: Option<PathBuf>,
    seed: Option<u64>,
    length: Option<usize>,
    verbose: bool,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => options.help = true,
            "--mix" => options.mix = true,
            "--verbose" | "-v" => options.verbose = true,
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a path"))?;
                options.config = Some(PathBuf::from(value));
            }
            "--seed" => {
                let value = iter.next().ok_or_else(|| anyhow!("--seed requires a number"))?;
                options.seed = Some(
                    value
                        .parse()
                        .map_err(|_| anyhow!("Invalid seed: {}", value))?,
                );
            }
            "--length" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--length requires a number"))?;
                let length: usize = value
                    .parse()
                    .map_err(|_| anyhow!("Invalid length: {}", value))?;
                if length == 0 {
                    bail!("--length must be at least 1");
                }
                options.length = Some(length);
            }
            other if other.starts_with('-') => bail!("Unknown option: {}", other),
            path => options.positional.push(PathBuf::from(path)),
        }
    }

    Ok(options)
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        eprintln!("Error: no input file given");
        print_usage();
        std::process::exit(1);
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    if options.help {
        print_usage();
        return Ok(());
    }

    init_logging(options.verbose);

    let mut config = match &options.config {
        Some(path) => RemixConfig::load(path)?,
        None => RemixConfig::default(),
    };
    if let Some(seed) = options.seed {
        config.generation.seed = Some(seed);
    }
    if let Some(length) = options.length {
        config.generation.length = length;
    }

    if options.mix {
        if options.positional.len() != 2 {
            eprintln!("Error: --mix requires a base file and a generated file");
            std::process::exit(1);
        }
        let output = mix_into_output(&options.positional[0], &options.positional[1], &config)?;
        println!("Mix saved to {}", output.display());
        return Ok(());
    }

    let input = match options.positional.as_slice() {
        [input] => input,
        [] => {
            eprintln!("Error: no input file given");
            std::process::exit(1);
        }
        _ => {
            eprintln!("Error: expected a single input file");
            std::process::exit(1);
        }
    };

    let mut rng = match config.generation.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    match remix_file(input, &config, &mut rng) {
        Ok(outcome) => {
            for report in &outcome.reports {
                println!("Analysis saved to {}", report.display());
            }
            println!(
                "Generated {} events from {} source notes",
                outcome.generated.len(),
                outcome.source_events
            );
            println!("Remix saved to {}", outcome.output.display());
            Ok(())
        }
        Err(e) => {
            if let Some(model_error) = e.downcast_ref::<ModelError>() {
                eprintln!("Error: {}", model_error);
                std::process::exit(1);
            }
            Err(e)
        }
    }
}
