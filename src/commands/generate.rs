use clap::Args;

use fabhand::core::{paths, tool};
use fabhand::{ArtifactKind, Config, DesignFiles, DesignIdentity, Pipeline, RunReport};

use super::CmdResult;

#[derive(Args)]
pub struct GenerateArgs {
    /// Board layout file (.kicad_pcb)
    pub layout: String,

    /// Assembly part number (e.g. PCBA1234)
    #[arg(long)]
    pub part_number: String,

    /// Revision label (e.g. A)
    #[arg(long)]
    pub revision: String,

    /// Artifact kind to generate; repeat for several (default: the full push set)
    #[arg(long = "kind", value_name = "KIND")]
    pub kinds: Vec<String>,

    /// Schematic file, when it does not sit beside the layout
    #[arg(long)]
    pub schematic: Option<String>,

    /// kicad-cli executable to invoke
    #[arg(long)]
    pub tool: Option<String>,
}

pub fn run(args: GenerateArgs) -> CmdResult<RunReport> {
    let config = Config::load()?;
    let identity = DesignIdentity::new(&args.part_number, &args.revision)?;

    let mut files = DesignFiles::discover(&args.layout)?;
    if let Some(schematic) = &args.schematic {
        files = files.with_schematic(schematic)?;
    }

    let kinds = if args.kinds.is_empty() {
        ArtifactKind::push_order().to_vec()
    } else {
        args.kinds
            .iter()
            .map(|kind| kind.parse())
            .collect::<fabhand::Result<Vec<ArtifactKind>>>()?
    };

    let program = match args.tool {
        Some(program) => program,
        None => tool::require()?,
    };

    let pipeline = Pipeline::new(config, identity, files, program, paths::work_dir()?);
    let report = pipeline.generate_only(&kinds)?;
    let exit_code = report.exit_code();

    Ok((report, exit_code))
}
