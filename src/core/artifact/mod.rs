//! Artifact generators, one per deliverable kind.
//!
//! Every generator drives the external exporter through a fallback chain
//! and returns a [`GeneratedArtifact`] pointing at a file in the working
//! directory, ready for upload.

mod bom;
mod gerber;
mod pdf;
mod position;
mod production;
mod step;
mod svg;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::config::Config;
use crate::core::design::DesignFiles;
use crate::core::identity::DesignIdentity;
use crate::error::{Error, Result};
use crate::utils::command::Invocation;
use crate::utils::io;

const EXPORT_TIMEOUT: Duration = Duration::from_secs(30);
const STEP_TIMEOUT: Duration = Duration::from_secs(120);

/// One deliverable the pipeline can produce and upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    GerberDrill,
    Position,
    SchematicPdf,
    BoardPdfFront,
    BoardPdfBack,
    Bom,
    StepModel,
    ProductionZip,
    SvgThumbnail,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 9] = [
        ArtifactKind::GerberDrill,
        ArtifactKind::Position,
        ArtifactKind::SchematicPdf,
        ArtifactKind::BoardPdfFront,
        ArtifactKind::BoardPdfBack,
        ArtifactKind::Bom,
        ArtifactKind::StepModel,
        ArtifactKind::ProductionZip,
        ArtifactKind::SvgThumbnail,
    ];

    /// Upload-flow order. The SVG thumbnail is opt-in and appended by the
    /// pipeline when requested.
    pub fn push_order() -> [ArtifactKind; 8] {
        [
            ArtifactKind::BoardPdfFront,
            ArtifactKind::BoardPdfBack,
            ArtifactKind::GerberDrill,
            ArtifactKind::SchematicPdf,
            ArtifactKind::Bom,
            ArtifactKind::Position,
            ArtifactKind::StepModel,
            ArtifactKind::ProductionZip,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::GerberDrill => "gerber_drill",
            ArtifactKind::Position => "position",
            ArtifactKind::SchematicPdf => "schematic_pdf",
            ArtifactKind::BoardPdfFront => "board_pdf_front",
            ArtifactKind::BoardPdfBack => "board_pdf_back",
            ArtifactKind::Bom => "bom",
            ArtifactKind::StepModel => "step_model",
            ArtifactKind::ProductionZip => "production_zip",
            ArtifactKind::SvgThumbnail => "svg_thumbnail",
        }
    }

    /// STEP and the production archive get the long upload deadline.
    pub fn archive_upload(&self) -> bool {
        matches!(self, ArtifactKind::StepModel | ArtifactKind::ProductionZip)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ArtifactKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = ArtifactKind::ALL.iter().map(|k| k.as_str()).collect();
                Error::validation_invalid_argument(
                    "kind",
                    format!("Unknown artifact kind '{}'", s),
                )
                .with_hint(format!("Valid kinds: {}", names.join(", ")))
            })
    }
}

/// A produced file ready for upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub display_name: String,
    /// Flags the payload as a gerber bundle on the service side.
    pub gerber_bundle: bool,
}

/// Everything a generator needs for one run.
pub struct GenerateContext<'a> {
    pub program: &'a str,
    pub identity: &'a DesignIdentity,
    pub files: &'a DesignFiles,
    pub config: &'a Config,
    pub work_dir: &'a Path,
}

/// Produce one artifact kind into the working directory.
pub fn generate(ctx: &GenerateContext<'_>, kind: ArtifactKind) -> Result<GeneratedArtifact> {
    match kind {
        ArtifactKind::GerberDrill => gerber::generate(ctx),
        ArtifactKind::Position => position::generate(ctx),
        ArtifactKind::SchematicPdf => pdf::generate_schematic(ctx),
        ArtifactKind::BoardPdfFront => pdf::generate_board(ctx, pdf::BoardPage::Front),
        ArtifactKind::BoardPdfBack => pdf::generate_board(ctx, pdf::BoardPage::Back),
        ArtifactKind::Bom => bom::generate(ctx),
        ArtifactKind::StepModel => step::generate(ctx),
        ArtifactKind::ProductionZip => production::generate(ctx),
        ArtifactKind::SvgThumbnail => svg::generate(ctx),
    }
}

/// Exit 0 and the expected output file on disk.
fn wrote(invocation: &Invocation, output: &Path) -> bool {
    invocation.exited_ok() && output.is_file()
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

/// Recreate `dir` empty, clearing leftovers from an earlier run.
fn fresh_dir(dir: &Path, operation: &str) -> Result<()> {
    if dir.exists() {
        io::remove_dir_all(dir, operation)?;
    }
    io::ensure_dir(dir, operation)
}
