//! Bill-of-materials export.
//!
//! Three variants of decreasing field richness are tried; the normalizer
//! runs as part of each variant's success check, so a variant whose output
//! cannot be normalized falls through to the next one.

use std::path::Path;

use super::{path_arg, wrote, ArtifactKind, GenerateContext, GeneratedArtifact, EXPORT_TIMEOUT};
use crate::core::bom;
use crate::core::chain::{self, CommandVariant};
use crate::error::Result;
use crate::log_status;

fn variants(output: &Path, schematic: &Path) -> Vec<CommandVariant> {
    let base = |fields: &[(&str, &str)], exclude_dnp: bool| {
        let mut args = vec![
            "sch".to_string(),
            "export".to_string(),
            "bom".to_string(),
            "--output".to_string(),
            path_arg(output),
        ];
        for (flag, value) in fields {
            args.push(flag.to_string());
            args.push(value.to_string());
        }
        args.push("--field-delimiter".to_string());
        args.push(",".to_string());
        args.push("--string-delimiter".to_string());
        args.push("\"".to_string());
        if exclude_dnp {
            args.push("--exclude-dnp".to_string());
        }
        args.push(path_arg(schematic));
        args
    };

    vec![
        CommandVariant::new(
            "full field map",
            base(
                &[
                    ("--fields", "Reference,Value,Footprint,${QUANTITY},${DNP}"),
                    ("--labels", "Reference,MPN,Footprint,QUANTITY,DNP"),
                ],
                true,
            ),
            EXPORT_TIMEOUT,
        ),
        CommandVariant::new(
            "partial field map",
            base(
                &[
                    ("--fields", "Reference,Value,${QUANTITY},${DNP}"),
                    ("--labels", "Reference,MPN,QUANTITY,DNP"),
                ],
                false,
            ),
            EXPORT_TIMEOUT,
        ),
        CommandVariant::new("tool defaults", base(&[], false), EXPORT_TIMEOUT),
    ]
}

/// Export the BOM to `output` and normalize it in place.
pub(super) fn export(ctx: &GenerateContext<'_>, output: &Path) -> Result<()> {
    let schematic = ctx.files.require_schematic()?;
    let variants = variants(output, schematic);

    chain::run("bom", ctx.program, &variants, |invocation| {
        if !wrote(invocation, output) {
            return false;
        }
        match bom::normalize_in_place(output) {
            Ok(()) => true,
            Err(e) => {
                log_status!("bom", "normalize failed: {}", e.message);
                false
            }
        }
    })?;
    Ok(())
}

pub(super) fn generate(ctx: &GenerateContext<'_>) -> Result<GeneratedArtifact> {
    let output = ctx.work_dir.join("bom.csv");
    export(ctx, &output)?;

    Ok(GeneratedArtifact {
        kind: ArtifactKind::Bom,
        path: output,
        display_name: format!("{}_bom", ctx.identity.part_number),
        gerber_bundle: false,
    })
}
