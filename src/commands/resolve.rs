use clap::Args;
use serde::Serialize;

use fabhand::{AssetClient, Config, DesignIdentity, RemoteRecord};

use super::CmdResult;

#[derive(Args)]
pub struct ResolveArgs {
    /// Assembly part number (e.g. PCBA1234)
    #[arg(long)]
    pub part_number: String,

    /// Revision label (e.g. A)
    #[arg(long)]
    pub revision: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOutput {
    pub identity: DesignIdentity,
    pub record: RemoteRecord,
}

pub fn run(args: ResolveArgs) -> CmdResult<ResolveOutput> {
    let config = Config::load()?;
    let identity = DesignIdentity::new(&args.part_number, &args.revision)?;

    let client = AssetClient::new(&config)?;
    let record = client.fetch_record(&identity)?;

    Ok((ResolveOutput { identity, record }, 0))
}
