use clap::Args;

use fabhand::core::{paths, tool};
use fabhand::{Config, DesignFiles, DesignIdentity, Pipeline, RunReport};

use super::CmdResult;

#[derive(Args)]
pub struct PushArgs {
    /// Board layout file (.kicad_pcb)
    pub layout: String,

    /// Assembly part number (e.g. PCBA1234)
    #[arg(long)]
    pub part_number: String,

    /// Revision label (e.g. A)
    #[arg(long)]
    pub revision: String,

    /// Schematic file, when it does not sit beside the layout
    #[arg(long)]
    pub schematic: Option<String>,

    /// Also generate and upload an SVG board thumbnail
    #[arg(long)]
    pub thumbnail: bool,

    /// kicad-cli executable to invoke
    #[arg(long)]
    pub tool: Option<String>,
}

pub fn run(args: PushArgs) -> CmdResult<RunReport> {
    let config = Config::load()?;
    let identity = DesignIdentity::new(&args.part_number, &args.revision)?;

    let mut files = DesignFiles::discover(&args.layout)?;
    if let Some(schematic) = &args.schematic {
        files = files.with_schematic(schematic)?;
    }

    let program = match args.tool {
        Some(program) => program,
        None => tool::require()?,
    };

    let pipeline = Pipeline::new(config, identity, files, program, paths::work_dir()?);
    let report = pipeline.run(args.thumbnail)?;
    let exit_code = report.exit_code();

    Ok((report, exit_code))
}
