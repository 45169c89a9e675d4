use clap::{Parser as ClapParser, Subcommand};
use combo_compiler::source;
use combo_compiler::{
    CompilationResult, Compiler, CompilerError, Config, Parser, Scanner, TimedCommand, TokenKind,
};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(author, version, about = "Timed input sequence compiler")]
struct Cli {
    /// Log pipeline stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile source text (reads stdin when FILE is omitted or "-")
    Compile {
        file: Option<PathBuf>,
        /// Print the whole compilation result as JSON
        #[arg(long, conflicts_with = "ir")]
        json: bool,
        /// Print only the structured intermediate code as JSON
        #[arg(long)]
        ir: bool,
    },
    /// Compile a JSON array of {"command", "delayMs"} objects
    Sequence {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Show which moves a partial sequence can still become
    Prefix {
        #[arg(required = true)]
        commands: Vec<String>,
    },
    /// List every known move
    Moves,
    /// Timing statistics for a source file
    Stats { file: Option<PathBuf> },
    /// Dump the token stream of a source file
    Tokens { file: Option<PathBuf> },
    /// Turn a JSON sequence into source text
    Encode {
        file: PathBuf,
        /// Add a comment above every input
        #[arg(long)]
        annotate: bool,
    },
    /// Recover source text from generated intermediate code
    Decode { file: Option<PathBuf> },
    /// Manage the timing configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration, overrides included
    Show,
    /// Write a config file with defaults for the current environment
    Init,
    /// Print where the config file lives
    Path,
}

#[derive(Clone, Copy)]
enum Output {
    Text,
    Json,
    Ir,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(io::stderr)
        .init();
}

fn open_input(file: Option<&Path>) -> Result<Box<dyn Read>, CompilerError> {
    match file {
        Some(path) if path != Path::new("-") => {
            if !path.exists() {
                return Err(CompilerError::FileNotFound(path.to_path_buf()));
            }
            debug!("reading {}", path.display());
            Ok(Box::new(File::open(path)?))
        }
        _ => Ok(Box::new(io::stdin())),
    }
}

fn read_input(file: Option<&Path>) -> Result<String, CompilerError> {
    let mut contents = String::new();
    open_input(file)?.read_to_string(&mut contents)?;
    Ok(contents)
}

fn read_sequence(path: &Path) -> Result<Vec<TimedCommand>, CompilerError> {
    let contents = read_input(Some(path))?;
    Ok(serde_json::from_str(&contents)?)
}

fn load_compiler() -> Result<Compiler, CompilerError> {
    let config = Config::load()?;
    debug!(
        "timing: timeout {}ms, debounce {}ms, max {}ms",
        config.timing.timeout_ms, config.timing.debounce_ms, config.timing.max_sequence_ms
    );
    Ok(Compiler::new(config.timing))
}

fn report(result: &CompilationResult, output: Output) -> Result<ExitCode, CompilerError> {
    match output {
        Output::Json => println!("{}", serde_json::to_string_pretty(result)?),
        _ if !result.success => {
            for error in &result.errors {
                eprintln!("{}", error);
            }
        }
        Output::Ir => {
            if let Some(code) = &result.intermediate_code {
                println!("{}", serde_json::to_string_pretty(code)?);
            }
        }
        Output::Text => {
            if let Some(text) = &result.text_code {
                print!("{}", text);
            }
        }
    }

    Ok(if result.success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn print_prefix(compiler: &Compiler, commands: &[String]) {
    let partial: Vec<TimedCommand> = commands
        .iter()
        .map(|c| TimedCommand::new(c.to_uppercase(), 0))
        .collect();

    if !compiler.is_valid_prefix(&partial) {
        println!("no move continues from this sequence");
        return;
    }

    let possible = compiler.possible_moves(&partial);
    println!("valid prefix of {} move(s)", possible.len());
    for (name, next) in compiler.next_expected_inputs(&partial) {
        println!("  {} -> {}", name, next);
    }
}

fn print_moves(compiler: &Compiler) {
    for mv in compiler.catalog().iter() {
        let inputs: Vec<&str> = mv.sequence.iter().map(|c| c.name()).collect();
        println!(
            "{:<24} {:<10} {} ({}): {}",
            mv.id,
            mv.category,
            mv.name,
            mv.character_name,
            inputs.join(" ")
        );
    }
}

fn print_stats(compiler: &Compiler, file: Option<&Path>) -> Result<ExitCode, CompilerError> {
    let outcome = Parser::new(Scanner::new(open_input(file)?)).parse();
    for error in &outcome.errors {
        eprintln!("{}", error);
    }

    let stats = compiler.timing_statistics(&outcome.sequence);
    println!("inputs:   {}", stats.input_count);
    println!("total:    {}ms", stats.total_duration_ms);
    println!("average:  {:.2}ms", stats.average_ms);
    println!("min:      {}ms", stats.min_ms);
    println!("max:      {}ms", stats.max_ms);

    Ok(if outcome.is_clean() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn print_tokens(file: Option<&Path>) -> Result<(), CompilerError> {
    for token in Scanner::new(open_input(file)?) {
        let text = match token.kind {
            TokenKind::EndOfInput => String::new(),
            _ => format!("{:?}", token.text),
        };
        println!(
            "{:>4}:{:<4} {:>6}  {:<15} {}",
            token.line, token.column, token.byte_offset, token.kind, text
        );
    }
    Ok(())
}

fn run_config(command: ConfigCommands) -> Result<(), CompilerError> {
    match command {
        ConfigCommands::Show => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommands::Init => {
            let path = Config::get_config_path();
            if path.exists() {
                println!("Config file already exists at: {}", path.display());
            } else {
                Config::default().save()?;
                println!("Initialized new config file at: {}", path.display());
            }
        }
        ConfigCommands::Path => println!("{}", Config::get_config_path().display()),
    }
    Ok(())
}

fn run(cli: Cli) -> Result<ExitCode, CompilerError> {
    match cli.command {
        Commands::Compile { file, json, ir } => {
            let compiler = load_compiler()?;
            let result = compiler.compile_reader(open_input(file.as_deref())?);
            let output = if json {
                Output::Json
            } else if ir {
                Output::Ir
            } else {
                Output::Text
            };
            report(&result, output)
        }
        Commands::Sequence { file, json } => {
            let compiler = load_compiler()?;
            let sequence = read_sequence(&file)?;
            let result = compiler.compile_sequence(&sequence);
            report(&result, if json { Output::Json } else { Output::Text })
        }
        Commands::Prefix { commands } => {
            print_prefix(&Compiler::default(), &commands);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Moves => {
            print_moves(&Compiler::default());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Stats { file } => print_stats(&load_compiler()?, file.as_deref()),
        Commands::Tokens { file } => {
            print_tokens(file.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Encode { file, annotate } => {
            let sequence = read_sequence(&file)?;
            let text = if annotate {
                source::to_annotated_source(&sequence)
            } else {
                source::to_source(&sequence)
            };
            print!("{}", text);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Decode { file } => {
            let text = read_input(file.as_deref())?;
            print!("{}", source::from_generated_text(&text)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config { command } => {
            run_config(command)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
