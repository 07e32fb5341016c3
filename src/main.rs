use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{bom, config, doctor, generate, push, resolve};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "fabhand")]
#[command(version = VERSION)]
#[command(about = "CLI tool for generating and publishing PCBA release artifacts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate every release artifact for a board and upload the results
    Push(push::PushArgs),
    /// Generate artifacts locally without uploading
    Generate(generate::GenerateArgs),
    /// Look up the remote assembly record for a part number and revision
    Resolve(resolve::ResolveArgs),
    /// Normalize a BOM CSV in place
    Bom(bom::BomArgs),
    /// Check configuration, tool availability and service reachability
    Doctor(doctor::DoctorArgs),
    /// Manage fabhand configuration
    Config(config::ConfigArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let (json_result, exit_code) = commands::run_json(cli.command);

    if let Err(err) = output::print_json_result(json_result) {
        eprintln!("{}", err.message);
        return std::process::ExitCode::from(exit_code_to_u8(1));
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    code.clamp(0, 255) as u8
}
