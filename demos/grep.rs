use std::{
    fs::File,
    io::{BufRead, BufReader},
};

use anyhow::Result;
use clap::Parser;
use dfaregex::Regex;
use tracing_subscriber::EnvFilter;

/// Print the lines of FILE that contain a match of PATTERN.
#[derive(Parser)]
struct Cli {
    pattern: String,
    file: String,
    /// Only print the number of matching lines.
    #[arg(short, long)]
    count: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Cli::parse();

    let file = File::open(args.file)?;
    let reader = BufReader::new(file);
    let re = Regex::new(&args.pattern)?;

    let mut count = 0;
    for line in reader.lines() {
        let line = line?;
        // Prefix matching only, so try every starting position.
        let found = line
            .char_indices()
            .any(|(i, _)| re.looking_at(&line[i..]).is_some());
        if found {
            count += 1;
            if !args.count {
                println!("{line}");
            }
        }
    }

    if args.count {
        println!("{count}");
    }

    Ok(())
}
