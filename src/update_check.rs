//! Check GitHub for a newer kdt release.

use std::time::Duration;

use semver::Version;
use serde::Deserialize;

use crate::client::USER_AGENT;
use crate::error::{KdtError, Result};

/// Latest-release endpoint of the kdt repository.
pub const RELEASES_URL: &str = "https://api.github.com/repos/kondukto-io/kdt/releases/latest";

const TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: String,
}

/// Return the latest published version if it is newer than `current`.
pub async fn check_for_update(current: &str) -> Result<Option<Version>> {
    check_against(RELEASES_URL, current).await
}

/// Same as [`check_for_update`] against an arbitrary endpoint.
#[tracing::instrument]
pub async fn check_against(url: &str, current: &str) -> Result<Option<Version>> {
    let current = parse_version(current)
        .map_err(|e| KdtError::InvalidArgument(format!("current version: {e}")))?;

    let http = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(TIMEOUT)
        .build()
        .map_err(KdtError::Network)?;

    let response = http
        .get(url)
        .send()
        .await
        .map_err(KdtError::Network)?;

    if !response.status().is_success() {
        return Err(KdtError::Upstream {
            message: format!("release lookup returned HTTP {}", response.status()),
            status_code: Some(response.status().as_u16()),
        });
    }

    let release: LatestRelease = response
        .json()
        .await
        .map_err(|e| KdtError::Decoding(e.to_string()))?;
    let latest = parse_version(&release.tag_name)
        .map_err(|e| KdtError::Decoding(format!("release tag '{}': {e}", release.tag_name)))?;

    Ok((latest > current).then_some(latest))
}

fn parse_version(raw: &str) -> std::result::Result<Version, semver::Error> {
    Version::parse(raw.trim().trim_start_matches('v'))
}
