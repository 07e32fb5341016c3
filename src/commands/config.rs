use clap::{Args, Subcommand};
use serde::Serialize;

use fabhand::core::paths;
use fabhand::Config;

use super::CmdResult;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Display the effective configuration (file merged with environment)
    Show,
    /// Show the path to config.json
    Path,
}

#[derive(Debug, Default, Serialize)]
pub struct ConfigOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<Config>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
}

pub fn run(args: ConfigArgs) -> CmdResult<ConfigOutput> {
    let output = match args.command {
        ConfigCommand::Show => ConfigOutput {
            command: "config.show".to_string(),
            config: Some(Config::load()?.redacted()),
            ..ConfigOutput::default()
        },
        ConfigCommand::Path => {
            let file = paths::config_json()?;
            ConfigOutput {
                command: "config.path".to_string(),
                path: Some(file.display().to_string()),
                exists: Some(file.is_file()),
                ..ConfigOutput::default()
            }
        }
    };

    Ok((output, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_output_omits_the_config_key() {
        let output = ConfigOutput {
            command: "config.path".to_string(),
            path: Some("/tmp/config.json".to_string()),
            exists: Some(false),
            ..ConfigOutput::default()
        };
        let text = serde_json::to_string(&output).unwrap();
        assert!(text.contains("config.path"));
        assert!(!text.contains("\"config\":"));
    }
}
