//! SBOM and API endpoint imports.
//!
//! Both upload a local file as `multipart/form-data` with a `file` part and
//! plain-text fields.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::client::KonduktoClient;
use crate::error::{KdtError, Result};
use crate::models::Project;

/// Server acknowledgement of an import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReceipt {
    #[serde(default)]
    pub message: String,
}

/// Formats accepted by the endpoint import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EndpointFormat {
    Openapi,
    Postman,
    Har,
}

impl EndpointFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Openapi => "openapi",
            Self::Postman => "postman",
            Self::Har => "har",
        }
    }
}

async fn file_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path).await?;
    if bytes.is_empty() {
        return Err(KdtError::InvalidArgument(format!(
            "{} is empty",
            path.display()
        )));
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    Ok(Part::bytes(bytes).file_name(file_name))
}

/// Upload an SBOM for the project named `project_name`.
///
/// The project is resolved with [`Project::find_by_name`], so the same
/// first-exact-match rule applies when names are ambiguous.
#[tracing::instrument(skip(client))]
pub async fn import_sbom(
    client: &KonduktoClient,
    file: &Path,
    project_name: &str,
    branch: Option<&str>,
) -> Result<ImportReceipt> {
    let project = Project::find_by_name(client, project_name).await?;

    let mut form = Form::new()
        .part("file", file_part(file).await?)
        .text("project", project.id.clone());
    if let Some(branch) = branch {
        form = form.text("branch", branch.to_string());
    }

    let response = client.post_multipart("api/v2/sbom/upload", form).await?;
    let receipt: ImportReceipt = KonduktoClient::json(response).await?;
    tracing::info!(project = %project.id, message = %receipt.message, "SBOM imported");
    Ok(receipt)
}

/// Upload an API definition to a project's endpoint inventory.
#[tracing::instrument(skip(client))]
pub async fn import_endpoints(
    client: &KonduktoClient,
    project_id: &str,
    file: &Path,
    format: EndpointFormat,
    branch: Option<&str>,
) -> Result<ImportReceipt> {
    if project_id.is_empty() {
        return Err(KdtError::InvalidArgument(
            "a project id is required for endpoint import".to_string(),
        ));
    }

    let mut form = Form::new()
        .part("file", file_part(file).await?)
        .text("type", format.as_str());
    if let Some(branch) = branch {
        form = form.text("branch", branch.to_string());
    }

    let path = format!(
        "api/v2/projects/{}/endpoints/import",
        urlencoding::encode(project_id)
    );
    let response = client.post_multipart(&path, form).await?;
    KonduktoClient::json(response).await
}
