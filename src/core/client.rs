//! Authenticated client for the asset service.
//!
//! Every call carries the `Api-Key` header. Uploads are multipart posts; a
//! 200 or 201 is the only success signal, and the local file is never
//! touched here so the caller keeps it on failure.

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{multipart, Client, RequestBuilder};

use crate::core::config::Config;
use crate::core::identity::DesignIdentity;
use crate::core::remote::{Endpoints, FetchRequest, RemoteRecord};
use crate::error::{Error, Result};
use crate::log_status;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);
const ARCHIVE_UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

const APP: &str = "pcbas";

fn network_error(e: reqwest::Error) -> Error {
    Error::remote_network(e.to_string())
}

/// Form fields for the generic file endpoint.
#[derive(Debug)]
pub struct FileUpload<'a> {
    pub pk: i64,
    pub file: &'a Path,
    pub display_name: String,
    /// Marks the payload as a gerber bundle on the service side.
    pub gerber: bool,
    /// Archives get the longer deadline.
    pub archive: bool,
}

pub struct AssetClient {
    client: Client,
    endpoints: Endpoints,
    api_key: String,
    replace_files: bool,
}

impl AssetClient {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate_for_remote()?;

        let client = Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()
            .map_err(network_error)?;

        Ok(Self {
            client,
            endpoints: Endpoints::from_config(config),
            api_key: config.api_key.clone(),
            replace_files: config.replace_files,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("Authorization", format!("Api-Key {}", self.api_key))
    }

    /// Resolve a design identity to its service record.
    pub fn fetch_record(&self, identity: &DesignIdentity) -> Result<RemoteRecord> {
        let url = self.endpoints.fetch_by_part_number_revision();
        let body = FetchRequest::for_identity(identity);

        let response = self
            .authed(self.client.put(&url))
            .json(&body)
            .timeout(FETCH_TIMEOUT)
            .send()
            .map_err(network_error)?;

        let status = response.status().as_u16();
        let text = response.text().map_err(network_error)?;

        if status != 200 {
            return Err(Error::remote_fetch_failed(Some(status), text)
                .with_hint("Create the assembly record in the service first"));
        }

        serde_json::from_str(&text)
            .map_err(|e| Error::internal_json(e.to_string(), Some("parse record".to_string())))
    }

    /// Post a file to the generic upload endpoint.
    pub fn upload_file(&self, upload: FileUpload<'_>) -> Result<()> {
        let form = multipart_base(upload.file, &upload.display_name, upload.pk)?
            .text("gerber", bool_field(upload.gerber))
            .text("replace_files", bool_field(self.replace_files));

        let timeout = if upload.archive {
            ARCHIVE_UPLOAD_TIMEOUT
        } else {
            UPLOAD_TIMEOUT
        };

        self.send_upload(
            &self.endpoints.upload_file(upload.pk),
            form,
            timeout,
            &upload.display_name,
        )
    }

    /// Post the normalized BOM to its dedicated endpoint.
    pub fn upload_bom(&self, pk: i64, file: &Path, display_name: &str) -> Result<()> {
        let form = multipart_base(file, display_name, pk)?;
        self.send_upload(&self.endpoints.upload_bom(pk), form, UPLOAD_TIMEOUT, display_name)
    }

    /// Post the thumbnail to its dedicated endpoint.
    pub fn upload_thumbnail(&self, pk: i64, file: &Path, display_name: &str) -> Result<()> {
        let form = multipart_base(file, display_name, pk)?;
        self.send_upload(
            &self.endpoints.upload_thumbnail(pk),
            form,
            UPLOAD_TIMEOUT,
            display_name,
        )
    }

    fn send_upload(
        &self,
        url: &str,
        form: multipart::Form,
        timeout: Duration,
        display_name: &str,
    ) -> Result<()> {
        log_status!("upload", "sending {}", display_name);

        let response = self
            .authed(self.client.post(url))
            .multipart(form)
            .timeout(timeout)
            .send()
            .map_err(network_error)?;

        let status = response.status().as_u16();
        if status == 200 || status == 201 {
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        Err(Error::remote_rejected(status, body))
    }

    /// Walk the probe endpoints; any HTTP answer counts as reachable, auth
    /// rejections included.
    pub fn is_reachable(&self) -> bool {
        for url in self.endpoints.probes() {
            let response = self
                .authed(self.client.get(&url))
                .timeout(PROBE_TIMEOUT)
                .send();
            if let Ok(response) = response {
                if matches!(response.status().as_u16(), 200 | 401 | 403) {
                    return true;
                }
            }
        }
        false
    }
}

fn multipart_base(file: &Path, display_name: &str, pk: i64) -> Result<multipart::Form> {
    multipart::Form::new()
        .file("file", file)
        .map_err(|e| {
            Error::internal_io(
                e.to_string(),
                Some(format!("open upload {}", file.display())),
            )
        })
        .map(|form| {
            form.text("app", APP)
                .text("display_name", display_name.to_string())
                .text("item_id", pk.to_string())
        })
}

fn bool_field(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
