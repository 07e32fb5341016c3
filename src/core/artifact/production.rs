//! Manufacturing package: every production output under one archive.
//!
//! Gerbers, drill, position, and BOM are required; a failure in any of them
//! aborts the package before an archive is produced. Board PDFs are
//! included only when both pages render.

use std::path::Path;

use super::{bom, fresh_dir, gerber, pdf, position};
use super::{ArtifactKind, GenerateContext, GeneratedArtifact};
use crate::core::package;
use crate::error::{Error, Result};
use crate::log_status;
use crate::utils::io;

pub(super) fn generate(ctx: &GenerateContext<'_>) -> Result<GeneratedArtifact> {
    let tree = ctx.work_dir.join("production_upload");
    fresh_dir(&tree, "prepare production tree")?;

    let gerber_dir = tree.join("gerbers");
    io::ensure_dir(&gerber_dir, "create gerbers dir")?;
    gerber::export_layers(ctx, &gerber_dir)?;

    let drill_dir = tree.join("drill");
    io::ensure_dir(&drill_dir, "create drill dir")?;
    gerber::export_drill(ctx, &drill_dir)?;

    let position_dir = tree.join("position");
    io::ensure_dir(&position_dir, "create position dir")?;
    position::export_csv_pair(ctx, &position_dir)?;

    bom::export(ctx, &tree.join("bom.csv"))?;

    add_board_pdfs(ctx, &tree)?;

    let file_name = format!("{}_PRODUCTION.zip", ctx.identity.base_name());
    let archive = ctx.work_dir.join(&file_name);
    package::zip_dir(&archive, &tree)?;
    if !io::non_empty_file(&archive) {
        return Err(Error::package_failed(
            archive.display().to_string(),
            "archive missing or empty",
        ));
    }

    let durable = ctx.files.project_dir().join(&file_name);
    io::copy_file(&archive, &durable, "save production zip beside layout")?;
    log_status!("production", "Saved {}", durable.display());

    Ok(GeneratedArtifact {
        kind: ArtifactKind::ProductionZip,
        path: archive,
        display_name: file_name,
        gerber_bundle: false,
    })
}

/// Both pages or none; a PDF failure never blocks the package.
fn add_board_pdfs(ctx: &GenerateContext<'_>, tree: &Path) -> Result<()> {
    let front = ctx.work_dir.join("pcb_front.pdf");
    let back = ctx.work_dir.join("pcb_back.pdf");

    let rendered = pdf::export_board_page(ctx, pdf::BoardPage::Front, &front)
        .and_then(|_| pdf::export_board_page(ctx, pdf::BoardPage::Back, &back));

    match rendered {
        Ok(()) => {
            let pdf_dir = tree.join("pdfs");
            io::ensure_dir(&pdf_dir, "create pdfs dir")?;
            io::copy_file(&front, &pdf_dir.join("pcb_front.pdf"), "copy front pdf")?;
            io::copy_file(&back, &pdf_dir.join("pcb_back.pdf"), "copy back pdf")?;
        }
        Err(e) => log_status!("production", "Board PDFs skipped: {}", e.message),
    }
    Ok(())
}
