//! CLI tool for playing a chromosome as note events
//!
//! Usage: play <genome.fa> [script.txt]
//!
//! Without a script, alternates reads and steps and prints each step's
//! events. With a script, runs its commands and prints every reply.

use chromoseq::control::{parse_script, Command, Reply, Session};
use chromoseq::logging::init_tracing;
use chromoseq::ConductorConfig;
use std::env;
use std::fs;
use std::process;
use tracing::debug;

const USAGE: &str = "Usage: play <genome.fa> [script.txt]

Play a chromosome as step-sequenced note events.

Arguments:
  genome.fa     FASTA chromosome file (first line is skipped)
  script.txt    Control script (optional); one command per line

Environment:
  CHROMOSEQ_CONFIG   TOML conductor configuration (optional)
  CHROMOSEQ_STEPS    Steps to play without a script (default 256)
  CHROMOSEQ_READS    Amino acids read per step without a script (default 64)
  CHROMOSEQ_LOG      Log filter (default info)

Examples:
  play chr21.fa
  play chr21.fa session.txt
";

const DEFAULT_STEPS: u64 = 256;
const DEFAULT_READS_PER_STEP: u32 = 64;

fn env_number<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{} is not a number: {}", name, raw)),
        Err(_) => Ok(default),
    }
}

fn load_config() -> Result<ConductorConfig, Box<dyn std::error::Error>> {
    match env::var("CHROMOSEQ_CONFIG") {
        Ok(path) => Ok(ConductorConfig::load(path)?),
        Err(_) => Ok(ConductorConfig::default()),
    }
}

/// Alternate `/read` and `/step` the way a running transport would
fn default_commands(steps: u64, reads_per_step: u32) -> Vec<Command> {
    (0..steps)
        .flat_map(|step| [Command::Read(reads_per_step), Command::Step(step)])
        .collect()
}

fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let genome_path = &args[1];

    let config = load_config()?;
    debug!(config = %config.to_toml_string()?, "effective configuration");

    println!("Configuration:");
    for class in chromoseq::SizeClass::ALL {
        let group = config.group(class);
        println!(
            "  {:<6} slots={} size={} threshold>{} step_rate={}",
            class, group.capacity, group.size, group.length_threshold, group.sequence.step_rate
        );
    }
    println!();

    let commands = match args.get(2) {
        Some(script_path) => {
            let content = fs::read_to_string(script_path)
                .map_err(|e| format!("Error reading {}: {}", script_path, e))?;
            parse_script(&content)?
        }
        None => default_commands(
            env_number("CHROMOSEQ_STEPS", DEFAULT_STEPS)?,
            env_number("CHROMOSEQ_READS", DEFAULT_READS_PER_STEP)?,
        ),
    };
    println!("Running {} commands on {}", commands.len(), genome_path);

    let mut session = Session::open(genome_path, config)?;
    let scripted = args.len() >= 3;

    for command in &commands {
        let reply = session.execute(command)?;
        match (&reply, command) {
            (Reply::Events(events), Command::Step(step)) if !scripted => {
                if !events.is_empty() {
                    println!("step {:>5}: {}", step, reply);
                }
            }
            (Reply::Ready { .. }, _) if !scripted => {}
            _ => println!("{}", reply),
        }
    }

    let reader = session.reader();
    println!();
    println!(
        "✓ Read {} bases, {} amino acids",
        reader.bases_read(),
        reader.amino_acids_read()
    );
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("{}", USAGE);
        process::exit(1);
    }

    init_tracing();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
