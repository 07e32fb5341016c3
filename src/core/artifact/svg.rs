//! SVG board thumbnail, front copper and silkscreen only.

use super::{path_arg, wrote, ArtifactKind, GenerateContext, GeneratedArtifact, EXPORT_TIMEOUT};
use crate::core::chain::{self, CommandVariant};
use crate::error::Result;

pub(super) fn generate(ctx: &GenerateContext<'_>) -> Result<GeneratedArtifact> {
    let output = ctx.work_dir.join("thumbnail.svg");

    let variant = CommandVariant::new(
        "thumbnail",
        vec![
            "pcb".to_string(),
            "export".to_string(),
            "svg".to_string(),
            path_arg(&ctx.files.layout),
            "--output".to_string(),
            path_arg(&output),
            "--layers".to_string(),
            "F.Cu,F.SilkS".to_string(),
            "--page-size-mode".to_string(),
            "2".to_string(),
            "--exclude-drawing-sheet".to_string(),
        ],
        EXPORT_TIMEOUT,
    );

    chain::run("svg thumbnail", ctx.program, &[variant], |invocation| {
        wrote(invocation, &output)
    })?;

    Ok(GeneratedArtifact {
        kind: ArtifactKind::SvgThumbnail,
        path: output,
        display_name: format!("{}_thumbnail", ctx.identity.part_number),
        gerber_bundle: false,
    })
}
