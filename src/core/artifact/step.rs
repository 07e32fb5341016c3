//! 3D model (STEP) export.
//!
//! Five variants run from richest options down to the bare positional form;
//! a variant wins as soon as the output file exists with content, whatever
//! the exporter's exit code. The winning file gets a version tag spliced
//! into its header and a durable copy next to the source layout.

use std::path::Path;

use chrono::Local;

use super::{path_arg, ArtifactKind, GenerateContext, GeneratedArtifact, STEP_TIMEOUT};
use crate::core::chain::{self, CommandVariant};
use crate::error::Result;
use crate::log_status;
use crate::utils::io;

const HEADER_MARKER: &str = "ISO-10303-21";
const SECTION_END: &str = "ENDSEC;";

/// `{part}_{rev}_{yymmddhhmm}`, embedded in the file and used as its name.
fn version_tag(base_name: &str) -> String {
    format!("{}_{}", base_name, Local::now().format("%y%m%d%H%M"))
}

fn variants(output: &Path, layout: &Path, tag: &str) -> Vec<CommandVariant> {
    let out = path_arg(output);
    let pcb = path_arg(layout);
    let define = format!("STEP_VERSION={}", tag);
    let prefix = |rest: &[String]| {
        let mut args = vec![
            "pcb".to_string(),
            "export".to_string(),
            "step".to_string(),
            "--output".to_string(),
            out.clone(),
        ];
        args.extend_from_slice(rest);
        args.push(pcb.clone());
        args
    };

    vec![
        CommandVariant::new(
            "full options",
            prefix(&[
                "--subst-models".to_string(),
                "--min-distance".to_string(),
                "0.1".to_string(),
                "--max-distance".to_string(),
                "2.0".to_string(),
                "--define-var".to_string(),
                define.clone(),
            ]),
            STEP_TIMEOUT,
        ),
        CommandVariant::new(
            "subst-models",
            prefix(&[
                "--subst-models".to_string(),
                "--define-var".to_string(),
                define.clone(),
            ]),
            STEP_TIMEOUT,
        ),
        CommandVariant::new(
            "version only",
            prefix(&["--define-var".to_string(), define]),
            STEP_TIMEOUT,
        ),
        CommandVariant::new("plain", prefix(&[]), STEP_TIMEOUT),
        CommandVariant::new(
            "positional output",
            vec![
                "pcb".to_string(),
                "export".to_string(),
                "step".to_string(),
                out,
                pcb,
            ],
            STEP_TIMEOUT,
        ),
    ]
}

/// Splice `/* VERSION_INFO: <tag> */` in right after the header section.
///
/// Returns `Ok(false)` when the content does not look like a STEP file.
fn embed_version_tag(path: &Path, tag: &str) -> Result<bool> {
    let content = io::read_file(path, "read step file")?;

    if !content.contains(HEADER_MARKER) {
        return Ok(false);
    }
    let Some(index) = content.find(SECTION_END) else {
        return Ok(false);
    };

    let split = index + SECTION_END.len();
    let tagged = format!(
        "{}\n/* VERSION_INFO: {} */\n{}",
        &content[..split],
        tag,
        &content[split..]
    );
    io::write_file_atomic(path, &tagged, "tag step file")?;
    Ok(true)
}

pub(super) fn generate(ctx: &GenerateContext<'_>) -> Result<GeneratedArtifact> {
    let tag = version_tag(&ctx.identity.base_name());
    let file_name = format!("{}.step", tag);
    let output = ctx.work_dir.join(&file_name);

    let variants = variants(&output, &ctx.files.layout, &tag);
    chain::run("step", ctx.program, &variants, |_| {
        io::non_empty_file(&output)
    })?;

    // Tagging failure never discards a usable model.
    match embed_version_tag(&output, &tag) {
        Ok(true) => {}
        Ok(false) => log_status!("step", "Version tag skipped, format not recognized"),
        Err(e) => log_status!("step", "Version tag failed: {}", e.message),
    }

    let durable = ctx.files.project_dir().join(&file_name);
    io::copy_file(&output, &durable, "save step beside layout")?;
    log_status!("step", "Saved {}", durable.display());

    Ok(GeneratedArtifact {
        kind: ArtifactKind::StepModel,
        path: output,
        display_name: file_name,
        gerber_bundle: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn tag_lands_right_after_the_header_section() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.step");
        fs::write(
            &path,
            "ISO-10303-21;\nHEADER;\nFILE_NAME('x');\nENDSEC;\nDATA;\nENDSEC;\nEND-ISO-10303-21;",
        )
        .unwrap();

        assert!(embed_version_tag(&path, "PCBA77_A_2501011200").unwrap());

        let tagged = fs::read_to_string(&path).unwrap();
        let expected = "ENDSEC;\n/* VERSION_INFO: PCBA77_A_2501011200 */\n\nDATA;";
        assert!(tagged.contains(expected));
        assert_eq!(tagged.matches("VERSION_INFO").count(), 1);
    }

    #[test]
    fn non_step_content_is_left_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.step");
        fs::write(&path, "not a step file ENDSEC;").unwrap();

        assert!(!embed_version_tag(&path, "tag").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "not a step file ENDSEC;");
    }

    #[test]
    fn header_without_section_end_is_left_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.step");
        fs::write(&path, "ISO-10303-21;\nHEADER;").unwrap();

        assert!(!embed_version_tag(&path, "tag").unwrap());
    }

    #[test]
    fn version_tag_carries_the_base_name_and_a_timestamp() {
        let tag = version_tag("PCBA1234_B");
        assert!(tag.starts_with("PCBA1234_B_"));
        let stamp = tag.trim_start_matches("PCBA1234_B_");
        assert_eq!(stamp.len(), 10);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    }
}
