//! funcy CLI
//!
//! A thin wrapper around the funcy library.

use clap::{Args, Parser, Subcommand};
use funcy::{Env, LiteralStyle, Symbols, Transpiler, eval};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "funcy")]
#[command(about = "Transpile color-organ expressions to GLSL")]
#[command(after_help = "\
EXAMPLES:
    # Rectangular function of x, y and the slider value n
    funcy transpile '(x^2 + y^2) * n'
    # -> (pow(x, 2.) + pow(y, 2.)) * n

    # Only allow the color organ's variables and functions
    funcy transpile --strict 'pow(pow(r,2.0) + t,2.0) / (100.0 * n)'

    # Evaluate one pixel in polar mode
    funcy eval --polar --x 30 --y 40 --n 50 'r * n'
")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the GLSL expression for EXPR
    Transpile {
        expr: String,

        #[command(flatten)]
        grammar: GrammarArgs,

        /// Append `.` to every literal, not only integral ones
        #[arg(long)]
        always_suffix: bool,

        /// Print a JSON object instead of the bare expression
        #[arg(long)]
        json: bool,
    },

    /// Parse EXPR and print it back in normalized source form
    Check {
        expr: String,

        #[command(flatten)]
        grammar: GrammarArgs,
    },

    /// Evaluate EXPR at one point
    Eval {
        expr: String,

        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        x: f64,

        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        y: f64,

        /// Slider value
        #[arg(long, default_value = "50", allow_negative_numbers = true)]
        n: f64,

        /// Also bind r and t from x and y
        #[arg(long)]
        polar: bool,

        #[command(flatten)]
        grammar: GrammarArgs,
    },
}

#[derive(Args)]
struct GrammarArgs {
    /// Reject variables and functions the color organ does not define
    #[arg(long)]
    strict: bool,
}

impl GrammarArgs {
    fn transpiler(&self) -> Transpiler {
        if self.strict {
            Transpiler::new().with_symbols(Symbols::color_organ())
        } else {
            Transpiler::new()
        }
    }
}

#[derive(Serialize)]
struct TranspileOutput<'a> {
    source: &'a str,
    glsl: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    println!("{}", run(cli.command)?);
    Ok(())
}

fn run(command: Command) -> anyhow::Result<String> {
    match command {
        Command::Transpile {
            expr,
            grammar,
            always_suffix,
            json,
        } => {
            let style = if always_suffix {
                LiteralStyle::AlwaysSuffix
            } else {
                LiteralStyle::IntegralSuffix
            };
            let transpiler = grammar.transpiler().with_literal_style(style);
            let glsl = transpiler.transpile(&expr)?;
            if json {
                Ok(serde_json::to_string(&TranspileOutput {
                    source: &expr,
                    glsl,
                })?)
            } else {
                Ok(glsl)
            }
        }
        Command::Check { expr, grammar } => {
            let node = grammar.transpiler().parse(&expr)?;
            log::info!("variables used: {:?}", node.variables());
            Ok(node.to_string())
        }
        Command::Eval {
            expr,
            x,
            y,
            n,
            polar,
            grammar,
        } => {
            let node = grammar.transpiler().parse(&expr)?;
            let env = if polar {
                Env::polar(x, y, n)
            } else {
                Env::rectangular(x, y, n)
            };
            Ok(eval(&node, &env)?.to_string())
        }
    }
}
