use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use fabhand::core::bom;

use super::CmdResult;

#[derive(Args)]
pub struct BomArgs {
    /// BOM CSV to normalize in place
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BomOutput {
    pub file: String,
    pub normalized: bool,
}

pub fn run(args: BomArgs) -> CmdResult<BomOutput> {
    bom::normalize_in_place(&args.file)?;

    Ok((
        BomOutput {
            file: args.file.display().to_string(),
            normalized: true,
        },
        0,
    ))
}
