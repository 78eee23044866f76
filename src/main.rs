use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use clap::{Args, Parser as ClapParser, Subcommand};
use eson::cli::{self, CheckOptions, CheckResult, CliError};
use eson::output::{to_json, to_json_pretty};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "eson")]
#[command(about = "Eson - JSON with comments, annotations and string interpolation")]
#[command(version)]
struct Cli {
    /// Log parser and resolver activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Input {
    /// Document to read; '-' or omitted reads stdin
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate document syntax
    Check {
        #[command(flatten)]
        input: Input,
    },

    /// Resolve interpolations and print the document as JSON
    Resolve {
        #[command(flatten)]
        input: Input,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Context variable, NAME=VALUE (repeatable)
        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,

        /// Read context variables from environment variables with this prefix
        #[arg(long, value_name = "PREFIX")]
        env_prefix: Option<String>,

        /// JSON file whose top-level object provides context variables
        #[arg(long, value_name = "FILE")]
        context: Option<PathBuf>,

        /// Remove '...' placeholders instead of failing on them
        #[arg(long)]
        drop_placeholders: bool,
    },

    /// List annotations and the paths they are attached to
    Annotations {
        #[command(flatten)]
        input: Input,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check { input } => run_check(input),
        Commands::Resolve {
            input,
            pretty,
            vars,
            env_prefix,
            context,
            drop_placeholders,
        } => run_resolve(input, pretty, vars, env_prefix, context, drop_placeholders),
        Commands::Annotations { input } => run_annotations(input),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// `ESON_LOG` takes precedence; otherwise warnings only, or debug with `-v`.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env("ESON_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "eson=debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(input: &Input) -> Result<String, CliError> {
    match &input.file {
        Some(path) if path.as_os_str() != "-" => Ok(fs::read_to_string(path)?),
        Some(_) => read_stdin(),
        None if !atty::is(atty::Stream::Stdin) => read_stdin(),
        None => Err(CliError::NoInput),
    }
}

fn read_stdin() -> Result<String, CliError> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn run_check(input: Input) -> Result<(), CliError> {
    let options = CheckOptions {
        source: Some(read_input(&input)?),
        syntax_only: true,
        ..CheckOptions::default()
    };

    cli::execute_check(&options)?;
    println!("Syntax is valid");
    Ok(())
}

fn run_resolve(
    input: Input,
    pretty: bool,
    vars: Vec<String>,
    env_prefix: Option<String>,
    context: Option<PathBuf>,
    drop_placeholders: bool,
) -> Result<(), CliError> {
    let context_json = match context {
        Some(path) => Some(fs::read_to_string(path)?),
        None => None,
    };

    let options = CheckOptions {
        source: Some(read_input(&input)?),
        syntax_only: false,
        vars,
        env_prefix,
        context_json,
        drop_placeholders,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Success(value) => {
            let json = if pretty {
                to_json_pretty(&value)
            } else {
                to_json(&value)
            };
            println!("{}", json);
        }
    }
    Ok(())
}

fn run_annotations(input: Input) -> Result<(), CliError> {
    for entry in cli::list_annotations(&read_input(&input)?)? {
        println!("{}", entry);
    }
    Ok(())
}
