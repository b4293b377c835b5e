use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use billing_normalizer::config::{init_tracing, Settings};
use billing_normalizer::{excel, ProcessingError, Processor};

#[derive(Parser)]
#[command(name = "billing-normalizer")]
#[command(about = "Normalize hospital billing workbooks into the claim export schema")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the structure analysis of a workbook as JSON
    Preview {
        file: PathBuf,
    },
    /// Normalize a workbook and write the result
    Process {
        file: PathBuf,
        /// Directory for the output workbook (overrides BILLING_OUTPUT_DIR)
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
}

fn run(cli: Cli, settings: Settings) -> Result<(), ProcessingError> {
    let processor = Processor::with_options(settings.engine.clone());
    match cli.command {
        Command::Preview { file } => {
            let workbook = excel::read_workbook(&file)?;
            let analysis = processor.preview(&workbook)?;
            let json = analysis
                .to_json()
                .map_err(|e| ProcessingError::Write(e.to_string()))?;
            println!("{json}");
        }
        Command::Process { file, output_dir } => {
            let dir = output_dir.unwrap_or(settings.output_dir);
            let path = processor.process_file(&file, &dir)?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&settings.log_filter);

    match run(cli, settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
