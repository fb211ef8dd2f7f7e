//! Command-line builder: reads a newline-delimited word list and writes a
//! packed DAWG file.

use std::env;
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::process::ExitCode;

use tracing::info;
use wordgraph::dawg::DawgBuilder;

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: wordgraph-builder <infile> <outfile>");
        eprintln!("  infile  - newline-delimited list of words to put in the DAWG");
        eprintln!("  outfile - file to be created containing the packed DAWG data");
        return ExitCode::from(2);
    }

    match run(&args[1], &args[2]) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(infile: &str, outfile: &str) -> Result<(), Box<dyn Error>> {
    let mut builder = DawgBuilder::new();
    builder.add_lines(BufReader::new(File::open(infile)?))?;
    info!(
        words = builder.word_count(),
        trie_nodes = builder.node_count(),
        "word list read"
    );

    let dawg = builder.build();
    info!(cells = dawg.node_count(), "dawg packed");

    let mut out = BufWriter::new(File::create(outfile)?);
    dawg.store(&mut out)?;
    Ok(())
}
