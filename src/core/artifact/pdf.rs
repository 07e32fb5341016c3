//! Schematic and board documentation PDFs.

use std::path::Path;

use super::{path_arg, wrote, ArtifactKind, GenerateContext, GeneratedArtifact, EXPORT_TIMEOUT};
use crate::core::chain::{self, CommandVariant};
use crate::error::Result;

/// Board PDF pages. The back page renders mirrored.
#[derive(Debug, Clone, Copy)]
pub(super) enum BoardPage {
    Front,
    Back,
}

impl BoardPage {
    fn layers(&self) -> &'static str {
        match self {
            BoardPage::Front => "Edge.Cuts,F.Fab",
            BoardPage::Back => "Edge.Cuts,B.Fab",
        }
    }

    fn file_name(&self) -> &'static str {
        match self {
            BoardPage::Front => "pcb_front.pdf",
            BoardPage::Back => "pcb_back.pdf",
        }
    }

    fn kind(&self) -> ArtifactKind {
        match self {
            BoardPage::Front => ArtifactKind::BoardPdfFront,
            BoardPage::Back => ArtifactKind::BoardPdfBack,
        }
    }

    fn display_suffix(&self) -> &'static str {
        match self {
            BoardPage::Front => "pcb_front",
            BoardPage::Back => "pcb_back",
        }
    }
}

/// Render the schematic to `output`.
pub(super) fn export_schematic(ctx: &GenerateContext<'_>, output: &Path) -> Result<()> {
    let schematic = ctx.files.require_schematic()?;

    let variant = CommandVariant::new(
        "schematic pdf",
        vec![
            "sch".to_string(),
            "export".to_string(),
            "pdf".to_string(),
            "--output".to_string(),
            path_arg(output),
            "--drawing-sheet".to_string(),
            ctx.config.drawing_sheet_path.clone(),
            "--theme".to_string(),
            ctx.config.theme_path.clone(),
            path_arg(schematic),
        ],
        EXPORT_TIMEOUT,
    );

    chain::run("schematic pdf", ctx.program, &[variant], |invocation| {
        wrote(invocation, output)
    })?;
    Ok(())
}

/// Render one board page to `output`.
///
/// The theme and drawing sheet must exist before any invocation; a missing
/// file is a configuration error and the exporter never runs.
pub(super) fn export_board_page(
    ctx: &GenerateContext<'_>,
    page: BoardPage,
    output: &Path,
) -> Result<()> {
    ctx.config.validate_for_generate()?;

    let mut args = vec![
        "pcb".to_string(),
        "export".to_string(),
        "pdf".to_string(),
        "--output".to_string(),
        path_arg(output),
        "--layers".to_string(),
        page.layers().to_string(),
        "--drawing-sheet".to_string(),
        ctx.config.drawing_sheet_path.clone(),
        "--theme".to_string(),
        ctx.config.theme_path.clone(),
    ];
    if matches!(page, BoardPage::Back) {
        args.push("--mirror".to_string());
    }
    args.push("--include-border-title".to_string());
    args.push(path_arg(&ctx.files.layout));

    let variant = CommandVariant::new(page.display_suffix(), args, EXPORT_TIMEOUT);
    chain::run("board pdf", ctx.program, &[variant], |invocation| {
        wrote(invocation, output)
    })?;
    Ok(())
}

pub(super) fn generate_schematic(ctx: &GenerateContext<'_>) -> Result<GeneratedArtifact> {
    let output = ctx.work_dir.join("schematic.pdf");
    export_schematic(ctx, &output)?;

    Ok(GeneratedArtifact {
        kind: ArtifactKind::SchematicPdf,
        path: output,
        display_name: format!("{}_schematic", ctx.identity.base_name()),
        gerber_bundle: false,
    })
}

pub(super) fn generate_board(
    ctx: &GenerateContext<'_>,
    page: BoardPage,
) -> Result<GeneratedArtifact> {
    let output = ctx.work_dir.join(page.file_name());
    export_board_page(ctx, page, &output)?;

    Ok(GeneratedArtifact {
        kind: page.kind(),
        path: output,
        display_name: format!("{}_{}", ctx.identity.base_name(), page.display_suffix()),
        gerber_bundle: false,
    })
}
