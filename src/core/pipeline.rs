//! Pipeline orchestrator: resolve, then generate and upload each artifact.
//!
//! Every generate/upload pair is isolated. A failure in either stage is
//! recorded in the run report and the next artifact kind still runs; the
//! run always completes with a full per-stage ledger.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::artifact::{self, ArtifactKind, GenerateContext, GeneratedArtifact};
use crate::core::client::{AssetClient, FileUpload};
use crate::core::config::Config;
use crate::core::design::DesignFiles;
use crate::core::identity::DesignIdentity;
use crate::core::remote::RemoteRecord;
use crate::error::Result;
use crate::log_status;
use crate::utils::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Generate,
    Upload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
    Skipped,
}

/// One stage outcome for one artifact kind.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunEntry {
    pub kind: ArtifactKind,
    pub stage: Stage,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Outcome tally across every recorded stage.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// End-of-run ledger of every stage outcome.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub identity: DesignIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_error: Option<String>,
    pub entries: Vec<RunEntry>,
    pub summary: RunSummary,
}

impl RunReport {
    fn new(identity: DesignIdentity) -> Self {
        Self {
            identity,
            resolve_error: None,
            entries: Vec::new(),
            summary: RunSummary::default(),
        }
    }

    fn record(&mut self, kind: ArtifactKind, stage: Stage, outcome: Outcome, message: Option<String>) {
        self.summary.total += 1;
        match outcome {
            Outcome::Success => self.summary.succeeded += 1,
            Outcome::Failure => self.summary.failed += 1,
            Outcome::Skipped => self.summary.skipped += 1,
        }
        self.entries.push(RunEntry {
            kind,
            stage,
            outcome,
            message,
        });
    }

    pub fn all_succeeded(&self) -> bool {
        self.resolve_error.is_none() && self.summary.succeeded == self.summary.total
    }

    pub fn exit_code(&self) -> i32 {
        if self.all_succeeded() {
            0
        } else {
            1
        }
    }
}

/// One run over one design. Config, identity, and file locations are fixed
/// at construction; only the remote record and the report mutate.
pub struct Pipeline {
    config: Config,
    identity: DesignIdentity,
    files: DesignFiles,
    program: String,
    work_dir: PathBuf,
}

impl Pipeline {
    pub fn new(
        config: Config,
        identity: DesignIdentity,
        files: DesignFiles,
        program: String,
        work_dir: PathBuf,
    ) -> Self {
        Self {
            config,
            identity,
            files,
            program,
            work_dir,
        }
    }

    /// Full push: resolve the remote record, then generate and upload every
    /// artifact kind in order. Configuration problems abort before any
    /// generation or network activity; everything after that is isolated
    /// per artifact.
    pub fn run(&self, thumbnail: bool) -> Result<RunReport> {
        self.config.validate_for_push()?;
        io::ensure_dir(&self.work_dir, "create work dir")?;

        let client = AssetClient::new(&self.config)?;
        let mut report = RunReport::new(self.identity.clone());

        log_status!("push", "Resolving {} at {}", self.identity, client.endpoints().base());
        let record = match client.fetch_record(&self.identity) {
            Ok(record) => {
                log_status!("push", "Resolved record {}", record.pk);
                record
            }
            Err(e) => {
                log_status!("push", "Resolve failed, uploads will be skipped: {}", e.message);
                report.resolve_error = Some(e.message.clone());
                RemoteRecord::unresolved()
            }
        };

        let mut kinds: Vec<ArtifactKind> = ArtifactKind::push_order().to_vec();
        if thumbnail {
            kinds.push(ArtifactKind::SvgThumbnail);
        }

        for kind in kinds {
            self.run_artifact(kind, &client, &record, &mut report);
        }

        log_status!(
            "push",
            "Complete: {} succeeded, {} failed, {} skipped",
            report.summary.succeeded,
            report.summary.failed,
            report.summary.skipped
        );
        Ok(report)
    }

    /// Local generation only: no resolve, no uploads, artifacts stay in the
    /// working directory.
    pub fn generate_only(&self, kinds: &[ArtifactKind]) -> Result<RunReport> {
        io::ensure_dir(&self.work_dir, "create work dir")?;

        let mut report = RunReport::new(self.identity.clone());
        for kind in kinds {
            log_status!("generate", "Generating {}", kind);
            match artifact::generate(&self.context(), *kind) {
                Ok(artifact) => {
                    report.record(
                        *kind,
                        Stage::Generate,
                        Outcome::Success,
                        Some(artifact.path.display().to_string()),
                    );
                }
                Err(e) => {
                    log_status!("generate", "{} failed: {}", kind, e.message);
                    report.record(*kind, Stage::Generate, Outcome::Failure, Some(e.message));
                }
            }
        }
        Ok(report)
    }

    fn context(&self) -> GenerateContext<'_> {
        GenerateContext {
            program: &self.program,
            identity: &self.identity,
            files: &self.files,
            config: &self.config,
            work_dir: &self.work_dir,
        }
    }

    fn run_artifact(
        &self,
        kind: ArtifactKind,
        client: &AssetClient,
        record: &RemoteRecord,
        report: &mut RunReport,
    ) {
        log_status!("push", "Generating {}", kind);
        let artifact = match artifact::generate(&self.context(), kind) {
            Ok(artifact) => {
                report.record(
                    kind,
                    Stage::Generate,
                    Outcome::Success,
                    Some(artifact.path.display().to_string()),
                );
                artifact
            }
            Err(e) => {
                log_status!("push", "{} generation failed: {}", kind, e.message);
                report.record(kind, Stage::Generate, Outcome::Failure, Some(e.message));
                report.record(
                    kind,
                    Stage::Upload,
                    Outcome::Skipped,
                    Some("generation failed".to_string()),
                );
                return;
            }
        };

        if !record.is_resolved() {
            report.record(
                kind,
                Stage::Upload,
                Outcome::Skipped,
                Some("remote record not resolved".to_string()),
            );
            return;
        }

        match self.upload(client, record, &artifact) {
            Ok(()) => {
                report.record(kind, Stage::Upload, Outcome::Success, None);
                // Keep the local copy only when the upload did not land.
                if let Err(e) = io::remove_file(&artifact.path, "clean uploaded artifact") {
                    log_status!("push", "Failed to delete {}: {}", artifact.path.display(), e.message);
                }
            }
            Err(e) => {
                log_status!("push", "{} upload failed: {}", kind, e.message);
                report.record(kind, Stage::Upload, Outcome::Failure, Some(e.message));
            }
        }
    }

    fn upload(
        &self,
        client: &AssetClient,
        record: &RemoteRecord,
        artifact: &GeneratedArtifact,
    ) -> Result<()> {
        match artifact.kind {
            ArtifactKind::Bom => {
                client.upload_bom(record.pk, &artifact.path, &artifact.display_name)
            }
            ArtifactKind::SvgThumbnail => {
                client.upload_thumbnail(record.pk, &artifact.path, &artifact.display_name)
            }
            _ => client.upload_file(FileUpload {
                pk: record.pk,
                file: &artifact.path,
                display_name: artifact.display_name.clone(),
                gerber: artifact.gerber_bundle,
                archive: artifact.kind.archive_upload(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn design(dir: &TempDir) -> DesignFiles {
        let layout = dir.path().join("board.kicad_pcb");
        fs::write(&layout, "(kicad_pcb)").unwrap();
        DesignFiles::discover(&layout).unwrap()
    }

    fn pipeline(dir: &TempDir, config: Config) -> Pipeline {
        Pipeline::new(
            config,
            DesignIdentity::new("PCBA1234", "A").unwrap(),
            design(dir),
            "/nonexistent/fab-exporter".to_string(),
            dir.path().join("work"),
        )
    }

    #[test]
    fn push_refuses_to_start_without_configuration() {
        let dir = TempDir::new().unwrap();
        let err = pipeline(&dir, Config::default()).run(false).unwrap_err();
        assert_eq!(err.code.as_str(), "config.missing_key");
        assert!(!dir.path().join("work").exists());
    }

    #[test]
    fn failed_generation_never_stops_later_artifacts() {
        let dir = TempDir::new().unwrap();
        let report = pipeline(&dir, Config::default())
            .generate_only(&[
                ArtifactKind::GerberDrill,
                ArtifactKind::Position,
                ArtifactKind::StepModel,
            ])
            .unwrap();

        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.entries[0].kind, ArtifactKind::GerberDrill);
        assert_eq!(report.entries[2].kind, ArtifactKind::StepModel);
        assert!(report.entries.iter().all(|e| e.outcome == Outcome::Failure));
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn unreachable_service_still_generates_and_skips_uploads() {
        let dir = TempDir::new().unwrap();
        let theme = dir.path().join("theme.json");
        let sheet = dir.path().join("sheet.kicad_wks");
        fs::write(&theme, "{}").unwrap();
        fs::write(&sheet, "(kicad_wks)").unwrap();

        let config = Config {
            api_key: "key".to_string(),
            host: "127.0.0.1:9".to_string(),
            theme_path: theme.display().to_string(),
            drawing_sheet_path: sheet.display().to_string(),
            ..Config::default()
        };

        let report = pipeline(&dir, config).run(false).unwrap();

        assert!(report.resolve_error.is_some());
        let uploads: Vec<&RunEntry> = report
            .entries
            .iter()
            .filter(|e| e.stage == Stage::Upload)
            .collect();
        assert_eq!(uploads.len(), 8);
        assert!(uploads.iter().all(|e| e.outcome == Outcome::Skipped));
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn report_counts_an_all_success_run_as_exit_zero() {
        let mut report = RunReport::new(DesignIdentity::new("PCBA1", "A").unwrap());
        report.record(ArtifactKind::Bom, Stage::Generate, Outcome::Success, None);
        report.record(ArtifactKind::Bom, Stage::Upload, Outcome::Success, None);
        assert!(report.all_succeeded());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.succeeded, 2);

        report.record(
            ArtifactKind::Position,
            Stage::Upload,
            Outcome::Failure,
            Some("403".to_string()),
        );
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.exit_code(), 1);
    }
}
