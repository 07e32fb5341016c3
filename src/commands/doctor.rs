use clap::Args;
use serde::Serialize;

use fabhand::core::{paths, tool};
use fabhand::{AssetClient, Config};

use super::CmdResult;

#[derive(Args)]
pub struct DoctorArgs {
    /// kicad-cli executable to probe instead of the auto-detected one
    #[arg(long)]
    pub tool: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorOutput {
    pub config_path: String,
    pub config_ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    pub service_reachable: bool,
    pub healthy: bool,
}

pub fn run(args: DoctorArgs) -> CmdResult<DoctorOutput> {
    let config_path = paths::config_json()?;

    let mut output = DoctorOutput {
        config_path: config_path.display().to_string(),
        config_ok: false,
        config_error: None,
        tool: None,
        tool_version: None,
        service: None,
        service_reachable: false,
        healthy: false,
    };

    match Config::load() {
        Ok(config) => {
            match config.validate_for_push() {
                Ok(()) => output.config_ok = true,
                Err(e) => output.config_error = Some(e.message),
            }
            if let Ok(client) = AssetClient::new(&config) {
                output.service = Some(client.endpoints().base().to_string());
                output.service_reachable = client.is_reachable();
            }
        }
        Err(e) => output.config_error = Some(e.message),
    }

    let program = args.tool.or_else(tool::locate);
    if let Some(program) = program {
        output.tool_version = tool::version(&program).ok();
        if output.tool_version.is_some() {
            output.tool = Some(program);
        }
    }

    output.healthy = output.config_ok && output.tool.is_some() && output.service_reachable;
    let exit_code = if output.healthy { 0 } else { 1 };

    Ok((output, exit_code))
}
