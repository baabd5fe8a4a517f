//! Fetches the canonical compose manifest and reads image tags off it. This
//! is the one piece of the self-update check that talks to the network
//! directly rather than through `sekin-rpc`, since the manifest isn't JSON.

use regex::Regex;
use sekin_config::{SupervisorError, Version, Versions};
use sekin_upgrade::{ControllerError, SelfUpdateSource};

#[derive(Debug, Clone)]
pub struct ComposeManifestSource {
    pub manifest_url: String,
}

#[async_trait::async_trait]
impl SelfUpdateSource for ComposeManifestSource {
    async fn latest_versions(&self) -> Result<Versions, ControllerError> {
        let body = reqwest::get(&self.manifest_url)
            .await
            .map_err(|e| ControllerError::Net(SupervisorError::NetworkUnreachable(e.to_string())))?
            .text()
            .await
            .map_err(|e| ControllerError::Net(SupervisorError::NetworkUnreachable(e.to_string())))?;

        let sekai = image_version(&body, "sekai")?;
        let interx = image_version(&body, "interx")?;
        let supervisor = image_version(&body, "shidai")?;

        // sekai/interx tags read here are for logging only; only `supervisor`
        // drives this check's upgrade decision.
        tracing::debug!(%sekai, %interx, %supervisor, "fetched upstream compose manifest versions");

        Ok(Versions { sekai, interx, supervisor })
    }
}

fn image_version(compose_body: &str, service: &str) -> Result<Version, ControllerError> {
    let pattern = format!(r"(?s){service}:.*?image:\s*\S*:(v\d+\.\d+\.\d+)");
    let re = Regex::new(&pattern).map_err(|e| ControllerError::Decode(e.to_string()))?;
    let tag = re
        .captures(compose_body)
        .and_then(|c| c.get(1))
        .ok_or_else(|| ControllerError::Decode(format!("no image tag found for service {service}")))?
        .as_str();
    Version::parse(tag).map_err(|e| ControllerError::VersionParse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_version_from_service_block() {
        let body = "services:\n  sekai:\n    image: ghcr.io/kiracore/sekin/sekai:v0.4.12\n";
        let v = image_version(body, "sekai").unwrap();
        assert_eq!(v.to_string(), "v0.4.12");
    }

    #[test]
    fn missing_service_is_an_error() {
        let body = "services:\n  interx:\n    image: ghcr.io/kiracore/sekin/interx:v0.3.0\n";
        assert!(image_version(body, "sekai").is_err());
    }
}
