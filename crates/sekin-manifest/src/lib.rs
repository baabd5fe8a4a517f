//! Compose-file (`compose.yml`) editing. Unknown keys round-trip untouched
//! because the whole document is kept as a `serde_yaml::Value` rather than
//! deserialized into a fixed struct; only the handful of fields this
//! supervisor actually needs to read or rewrite are addressed directly.

mod backed;
mod diff;

pub use backed::BackedManifest;
pub use diff::diff_values;

use std::path::Path;

use sekin_config::SupervisorError;
use serde_yaml::Value;

#[derive(Debug, Clone)]
pub struct Manifest {
    document: Value,
}

impl Manifest {
    pub async fn load(path: &Path) -> Result<Self, SupervisorError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SupervisorError::ManifestIo(format!("{}: {e}", path.display())))?;
        let document: Value =
            serde_yaml::from_str(&raw).map_err(|e| SupervisorError::ManifestIo(format!("{}: {e}", path.display())))?;
        Ok(Manifest { document })
    }

    pub async fn save(&self, path: &Path) -> Result<(), SupervisorError> {
        let raw = serde_yaml::to_string(&self.document)
            .map_err(|e| SupervisorError::ManifestIo(format!("{}: {e}", path.display())))?;
        tokio::fs::write(path, raw)
            .await
            .map_err(|e| SupervisorError::ManifestIo(format!("{}: {e}", path.display())))
    }

    fn service_mapping_mut(&mut self, service: &str) -> Result<&mut serde_yaml::Mapping, SupervisorError> {
        self.document
            .get_mut("services")
            .and_then(|s| s.get_mut(service))
            .and_then(|s| s.as_mapping_mut())
            .ok_or_else(|| SupervisorError::ManifestIo(format!("service {service} not found in manifest")))
    }

    pub fn service_image(&self, service: &str) -> Result<&str, SupervisorError> {
        self.document
            .get("services")
            .and_then(|s| s.get(service))
            .and_then(|s| s.get("image"))
            .and_then(Value::as_str)
            .ok_or_else(|| SupervisorError::ManifestIo(format!("service {service} has no image field")))
    }

    pub fn set_service_image(&mut self, service: &str, image: &str) -> Result<(), SupervisorError> {
        let mapping = self.service_mapping_mut(service)?;
        mapping.insert(Value::String("image".to_string()), Value::String(image.to_string()));
        Ok(())
    }

    pub fn diff(&self, other: &Manifest) -> Vec<String> {
        diff::diff_values("", &self.document, &other.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture() -> &'static str {
        "services:\n  sekai:\n    image: ghcr.io/kiracore/sekin/sekai:v0.4.1\n    restart: always\n  interx:\n    image: ghcr.io/kiracore/sekin/interx:v0.4.1\n"
    }

    #[tokio::test]
    async fn reads_and_rewrites_service_image() {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("compose.yml");
        tokio::fs::write(&path, fixture()).await.unwrap();

        let mut manifest = Manifest::load(&path).await.unwrap();
        assert_eq!(manifest.service_image("sekai").unwrap(), "ghcr.io/kiracore/sekin/sekai:v0.4.1");

        manifest.set_service_image("sekai", "ghcr.io/kiracore/sekin/sekai:v0.4.2").unwrap();
        manifest.save(&path).await.unwrap();

        let reloaded = Manifest::load(&path).await.unwrap();
        assert_eq!(reloaded.service_image("sekai").unwrap(), "ghcr.io/kiracore/sekin/sekai:v0.4.2");
        // untouched keys survive the round trip
        assert_eq!(reloaded.service_image("interx").unwrap(), "ghcr.io/kiracore/sekin/interx:v0.4.1");
    }

    #[tokio::test]
    async fn set_service_image_errors_on_unknown_service() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compose.yml");
        tokio::fs::write(&path, fixture()).await.unwrap();
        let mut manifest = Manifest::load(&path).await.unwrap();
        assert!(manifest.set_service_image("shidai", "x").is_err());
    }

    #[tokio::test]
    async fn diff_reports_changed_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compose.yml");
        tokio::fs::write(&path, fixture()).await.unwrap();
        let before = Manifest::load(&path).await.unwrap();
        let mut after = before.clone();
        after.set_service_image("sekai", "ghcr.io/kiracore/sekin/sekai:v0.4.2").unwrap();
        let lines = before.diff(&after);
        assert!(lines.iter().any(|l| l.contains("services.sekai.image")));
    }
}
