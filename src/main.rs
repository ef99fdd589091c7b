use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use std::path::{Path, PathBuf};
use std::{fs::read_to_string, process::ExitCode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[clap(name = "lwalk", version)]
pub struct CLArgs {
    #[clap(subcommand)]
    pub routine: LwalkCommand,
}

#[derive(Debug, Subcommand)]
pub enum LwalkCommand {
    /// Print the tokens of a source file.
    Tokenize {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: TokenFormat,
    },
    /// Print the syntax tree of a source file.
    Parse {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "sexpr")]
        format: ProgramFormat,
    },
    /// Execute a source file.
    Run {
        path: PathBuf,
        /// Calls nested deeper than this fail with a stack exhaustion error.
        #[clap(long = "max-call-depth")]
        max_call_depth: Option<usize>,
        #[clap(long = "error-format", value_enum, default_value = "pretty")]
        error_format: ErrorFormat,
        /// Print the value of the program's last statement.
        #[clap(long = "print-result")]
        print_result: bool,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum TokenFormat {
    Debug,
    Basic,
    Line,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ProgramFormat {
    Debug,
    #[clap(name = "sexpr")]
    SExpr,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ErrorFormat {
    Basic,
    Pretty,
}

const EXIT_DATA_ERROR: u8 = 65;
const EXIT_SOFTWARE_ERROR: u8 = 70;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = CLArgs::parse();
    match args.routine {
        LwalkCommand::Tokenize { path, format } => {
            let src = read_source(&path)?;
            if !tokenize(&src, &format) {
                return Ok(ExitCode::from(EXIT_DATA_ERROR));
            }
        }
        LwalkCommand::Parse { path, format } => {
            let src = read_source(&path)?;
            if !parse(&src, &format) {
                return Ok(ExitCode::from(EXIT_DATA_ERROR));
            }
        }
        LwalkCommand::Run {
            path,
            max_call_depth,
            error_format,
            print_result,
        } => {
            let src = read_source(&path)?;
            return Ok(run(&src, &path, max_call_depth, &error_format, print_result));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn read_source(path: &Path) -> Result<String> {
    read_to_string(path).wrap_err_with(|| format!("Failed to read source file {path:?}"))
}

fn tokenize(src: &str, format: &TokenFormat) -> bool {
    use lwalk::lexer::formatter::{
        BasicFormatter, DebugFormatter, LineFormatter, ToFormatter, TokenFormatter,
    };
    use lwalk::lexer::{Lexer, TokenKind};

    let mut scanner = Lexer::new(src);
    let formatter: Box<dyn TokenFormatter + '_> = match format {
        TokenFormat::Debug => Box::new(ToFormatter::<DebugFormatter>::create_formatter(&scanner)),
        TokenFormat::Basic => Box::new(ToFormatter::<BasicFormatter>::create_formatter(&scanner)),
        TokenFormat::Line => Box::new(ToFormatter::<LineFormatter>::create_formatter(&scanner)),
    };
    let mut succeeded = true;
    loop {
        match scanner.next_token() {
            Ok(token) => {
                println!("{}", formatter.format(&token));
                if matches!(token.kind, TokenKind::Eof) {
                    return succeeded;
                }
            }
            Err(error) => {
                eprintln!("{}", formatter.format_lexical_error(&error));
                succeeded = false;
            }
        };
    }
}

fn parse(src: &str, format: &ProgramFormat) -> bool {
    use lwalk::parser::formatter::{DebugFormatter, ProgramFormatter, SExpressionFormatter};
    use lwalk::parser::Parser;

    let formatter: Box<dyn ProgramFormatter> = match format {
        ProgramFormat::Debug => Box::new(DebugFormatter),
        ProgramFormat::SExpr => Box::new(SExpressionFormatter::new(src)),
    };
    match Parser::new(src).parse() {
        Ok(program) => {
            println!("{}", formatter.format(&program));
            true
        }
        Err(error) => {
            eprintln!("{}", formatter.format_error(&error));
            false
        }
    }
}

fn run(
    src: &str,
    path: &Path,
    max_call_depth: Option<usize>,
    error_format: &ErrorFormat,
    print_result: bool,
) -> ExitCode {
    use lwalk::interpreter::{context::StdioContext, InterpreterConfig, TreeWalkInterpreter};
    use lwalk::parser::formatter::{ProgramFormatter, SExpressionFormatter};
    use lwalk::parser::Parser;
    use lwalk::value::formatter::{BasicFormatter, PrettyFormatter, ValueFormatter};

    let program = match Parser::new(src).parse() {
        Ok(program) => program,
        Err(error) => {
            let message = match error_format {
                ErrorFormat::Basic => SExpressionFormatter::new(src).format_error(&error),
                ErrorFormat::Pretty => {
                    lwalk::parser::formatter::PrettyFormatter::new(src, path).format_error(&error)
                }
            };
            eprintln!("{message}");
            return ExitCode::from(EXIT_DATA_ERROR);
        }
    };

    let mut config = InterpreterConfig::default();
    if let Some(depth) = max_call_depth {
        config = config.with_max_call_depth(depth);
    }
    let formatter: Box<dyn ValueFormatter + '_> = match error_format {
        ErrorFormat::Basic => Box::new(BasicFormatter::new(src)),
        ErrorFormat::Pretty => Box::new(PrettyFormatter::new(src, path)),
    };

    let mut interpreter = TreeWalkInterpreter::with_config(StdioContext, config);
    match interpreter.run(&program) {
        Ok(value) => {
            if print_result {
                println!("{}", formatter.format(&value));
            }
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{}", formatter.format_error(&error));
            ExitCode::from(EXIT_SOFTWARE_ERROR)
        }
    }
}
