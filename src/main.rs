use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use went::ast_printer::AstPrinter;
use went::environment::Scope;
use went::interpreter::Interpreter;
use went::lexer::Lexer;
use went::token::TokenType;
use went::WentError;

const EXIT_SYNTAX: i32 = 65;
const EXIT_RUNTIME: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Went language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to went.log
    #[arg(long, global = true)]
    log: bool,

    /// Print tokens, syntax trees and values as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file (or stdin), printing each token
    Tokenize { filename: Option<PathBuf> },

    /// Parses input and prints every statement in prefix form
    Parse { filename: Option<PathBuf> },

    /// Evaluates input and prints the value of the last statement
    Evaluate {
        filename: Option<PathBuf>,

        /// Define NAME as the value of EXPR before evaluating
        #[arg(short = 'D', long = "define", value_name = "NAME=EXPR")]
        defines: Vec<String>,
    },
}

/// Reads the whole input, returning its display name and text.
fn read_input(filename: Option<&PathBuf>) -> Result<(String, String)> {
    let Some(filename) = filename else {
        info!("Reading stdin");

        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;

        return Ok(("<stdin>".to_owned(), text));
    };

    info!("Reading file: {:?}", filename);

    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    let text = String::from_utf8(buf).context(format!("File {:?} is not valid UTF-8", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok((filename.display().to_string(), text))
}

fn init_logger() -> Result<()> {
    let log_file = File::create("went.log").context("Failed to create went.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("went::").unwrap_or(module);

            writeln!(
                buf,
                "{} {:<5} [{}:{}] - {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to went.log");
    Ok(())
}

fn exit_code(err: &WentError) -> i32 {
    if err.is_syntactic() {
        EXIT_SYNTAX
    } else {
        EXIT_RUNTIME
    }
}

fn fail(err: &WentError) -> ! {
    debug!("{} debug: {}", err.kind(), err);

    eprintln!("{}", err);
    std::process::exit(exit_code(err));
}

fn tokenize(name: &str, src: &str, json: bool) -> Result<()> {
    info!("Running Tokenize subcommand");

    let mut lexer = Lexer::new(name, src);
    let tokens: Vec<_> = lexer.by_ref().collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in tokens.iter().filter(|t| t.kind != TokenType::EOF) {
            println!("{:<8}{:<14}{}", token.pos.to_string(), format!("{:?}", token.kind), token);
        }
    }

    let mut errors = lexer.take_errors();
    if !errors.is_empty() {
        errors.remove_multiples();

        for err in &errors {
            eprintln!("{}", err);
        }

        debug!("Tokenization failed, exiting with code {}", EXIT_SYNTAX);
        std::process::exit(EXIT_SYNTAX);
    }

    info!("Tokenization completed successfully");
    Ok(())
}

fn parse(name: &str, src: &str, json: bool) -> Result<()> {
    info!("Running Parse subcommand");

    let ast = went::parse(name, src).unwrap_or_else(|e| fail(&e));

    if json {
        println!("{}", serde_json::to_string_pretty(&ast)?);
    } else {
        for line in AstPrinter::print_program(&ast) {
            debug!("AST: {}", line);
            println!("{}", line);
        }
    }

    info!("Parse subcommand completed");
    Ok(())
}

fn evaluate(name: &str, src: &str, defines: &[String], json: bool) -> Result<()> {
    info!("Running Evaluate subcommand");

    let mut interpreter = Interpreter::new();

    for define in defines {
        let Some((var, expr)) = define.split_once('=') else {
            bail!("Invalid define {:?}, expected NAME=EXPR", define);
        };

        let source = format!("<define {}>", var);
        let ast = went::parse(&source, expr).unwrap_or_else(|e| fail(&e));
        let value = interpreter.evaluate(&ast).unwrap_or_else(|e| fail(&e));

        debug!("Defining {} = {}", var, value);
        interpreter.scope_mut().define(var.trim(), value);
    }

    let ast = went::parse(name, src).unwrap_or_else(|e| fail(&e));
    let value = interpreter.evaluate(&ast).unwrap_or_else(|e| fail(&e));

    debug!("Evaluated to: {}", value);

    if json {
        println!("{}", serde_json::to_string(&value)?);
    } else {
        println!("{}", value);
    }

    info!("Evaluate subcommand completed");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        Builder::new().filter_level(log::LevelFilter::Off).init();
    }

    info!("CLI arguments: {:?}", args);

    match &args.commands {
        Commands::Tokenize { filename } => {
            let (name, src) = read_input(filename.as_ref())?;
            tokenize(&name, &src, args.json)
        }

        Commands::Parse { filename } => {
            let (name, src) = read_input(filename.as_ref())?;
            parse(&name, &src, args.json)
        }

        Commands::Evaluate { filename, defines } => {
            let (name, src) = read_input(filename.as_ref())?;
            evaluate(&name, &src, defines, args.json)
        }
    }
}
