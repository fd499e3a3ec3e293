//! Command-line interface for the LALR(1) table builder.
//!
//! Reads a `.g` grammar file, builds its automaton and parse table, and
//! either writes a full text report or just checks for conflicts. Exits with
//! an error when the grammar has unresolved conflicts.

#[cfg(feature = "cli")]
mod real {
    use anyhow::bail;
    use clap::Parser;
    use lalr_gen::{GrammarSpec, dump};
    use std::path::PathBuf;

    #[derive(Parser)]
    #[command(about = "Build LALR(1) tables from a grammar file")]
    struct Args {
        /// Path to the input grammar file
        #[arg(short = 'g', long)]
        grammar: PathBuf,

        /// Path of the report to write; stdout when omitted.
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Only report conflicts, write nothing else.
        #[arg(long)]
        check: bool,

        /// Enable debug logging (off by default).
        #[arg(short = 'd', long)]
        debug: bool,
    }

    pub fn main() -> anyhow::Result<()> {
        let args = Args::parse();
        env_logger::Builder::new()
            .filter_level(if args.debug {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Warn
            })
            .parse_default_env()
            .init();

        let conflicts = if args.check {
            let spec = GrammarSpec::load(&args.grammar)?;
            let grammar: lalr::Grammar<()> = spec.build()?;
            let (_, table) = lalr::Automaton::build(&grammar);
            table.conflicts()
        } else if let Some(output) = &args.output {
            dump::report(&args.grammar, output)?
        } else {
            let spec = GrammarSpec::load(&args.grammar)?;
            let stdout = std::io::stdout();
            dump::write_report(&mut stdout.lock(), &spec)?
        };

        if !conflicts.is_empty() {
            bail!(
                "{}: {} unresolved conflict(s)",
                args.grammar.display(),
                conflicts.len()
            );
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    real::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("lalr-gen disabled (compiled without `cli` feature)");
}
