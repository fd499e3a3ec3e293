//! Command-line interface for `lalr-calc`.
//!
//! Evaluates the expressions given as arguments, or every non-blank line of
//! an input file, printing one result per line.

#[cfg(feature = "cli")]
mod real {
    use anyhow::Context;
    use clap::Parser;
    use lalr_calc::{Calculator, Evaluation};
    use std::path::PathBuf;

    #[derive(Parser)]
    #[command(version, about = "Evaluate integer expressions")]
    struct Args {
        /// Expressions to evaluate
        exprs: Vec<String>,

        /// Input file with one expression per line
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Enable debug logging (off by default).
        #[arg(short = 'd', long)]
        debug: bool,
    }

    fn show(ev: &Evaluation) -> String {
        match ev.value() {
            Some(n) => n.to_string(),
            None => match ev.span() {
                Some(span) => format!("error at {}", span.display()),
                None => "error at end of input".to_string(),
            },
        }
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

        let calc = Calculator::new()?;
        let mut lines = args.exprs;
        if let Some(path) = &args.input {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            lines.extend(
                text.lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(str::to_string),
            );
        }
        for line in &lines {
            println!("{}", show(&calc.eval(line)?));
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
    eprintln!("lalr-calc disabled (compiled without `cli` feature)");
}
