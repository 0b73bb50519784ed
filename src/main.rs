use camino::Utf8PathBuf;
use ci_driver::{Driver, Outcome};
use ci_tree::program::Program;
use ci_utils::io::RealFileSystem;
use clap::{ArgAction, Parser};
use log::LevelFilter;
use owo_colors::OwoColorize;

/// Parses source files in order into one program and stops at the first error.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files to parse, in dependency order
    files: Vec<Utf8PathBuf>,
    /// Log more (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Print every unit's declarations before reporting success
    #[arg(long)]
    dump: bool,
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let Outcome {
        program, result, ..
    } = Driver::new(RealFileSystem, cli.files).run();
    result?;

    if cli.dump {
        dump(&program);
    }
    println!("PASSED");

    Ok(())
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn dump(program: &Program) {
    for (unit, decls) in program.iter_units() {
        println!("{} ({} declarations)", unit.name.bold(), decls.len());
        for decl in decls {
            println!("  {decl}");
        }
    }
}
