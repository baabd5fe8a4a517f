use std::path::Path;

use sekin_config::SupervisorError;
use toml::Value;

use crate::types::{JoinOptions, PruningProfile, SyncPlan};

fn io_err(path: &Path, e: impl std::fmt::Display) -> SupervisorError {
    SupervisorError::ManifestIo(format!("{}: {e}", path.display()))
}

async fn load_toml(path: &Path) -> Result<Value, SupervisorError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| io_err(path, e))?;
    raw.parse::<Value>().map_err(|e| io_err(path, e))
}

fn set_path(doc: &mut Value, dotted: &str, value: Value) {
    let mut cursor = doc;
    let parts: Vec<&str> = dotted.split('.').collect();
    for part in &parts[..parts.len() - 1] {
        if !cursor.as_table().map(|t| t.contains_key(*part)).unwrap_or(false) {
            cursor
                .as_table_mut()
                .expect("config root must be a table")
                .insert((*part).to_string(), Value::Table(Default::default()));
        }
        cursor = cursor.get_mut(*part).expect("just inserted");
    }
    cursor
        .as_table_mut()
        .expect("config root must be a table")
        .insert(parts[parts.len() - 1].to_string(), value);
}

fn pruning_fields(profile: &PruningProfile) -> Vec<(&'static str, Value)> {
    match profile {
        PruningProfile::Default => vec![("pruning", Value::String("default".to_string()))],
        PruningProfile::Nothing => vec![("pruning", Value::String("nothing".to_string()))],
        PruningProfile::Everything => vec![("pruning", Value::String("everything".to_string()))],
        PruningProfile::Custom { keep_recent, interval, keep_every } => vec![
            ("pruning", Value::String("custom".to_string())),
            ("pruning-keep-recent", Value::String(keep_recent.to_string())),
            ("pruning-interval", Value::String(interval.to_string())),
            ("pruning-keep-every", Value::String(keep_every.to_string())),
        ],
    }
}

/// Rewrites `config.toml` and `app.toml` under `home/config` in place,
/// preserving every untouched key. Both documents must serialize
/// successfully before either file on disk is replaced — the write goes
/// through a same-directory temp file and an atomic rename per file, so a
/// serialization failure never leaves a half-written config behind.
pub async fn write_node_configs(
    home: &Path,
    chain_id: &str,
    seeds: &[String],
    sync_plan: &SyncPlan,
    opts: &JoinOptions,
) -> Result<(), SupervisorError> {
    let config_path = home.join("config/config.toml");
    let app_path = home.join("config/app.toml");

    let mut config_doc = load_toml(&config_path).await?;
    let mut app_doc = load_toml(&app_path).await?;

    if !chain_id.is_empty() {
        set_path(&mut config_doc, "chain-id", Value::String(chain_id.to_string()));
    }
    set_path(&mut config_doc, "p2p.seeds", Value::String(seeds.join(",")));
    set_path(&mut config_doc, "statesync.enable", Value::Boolean(sync_plan.enabled));
    if sync_plan.enabled {
        set_path(&mut config_doc, "statesync.rpc_servers", Value::String(sync_plan.rpc_servers.join(",")));
        set_path(&mut config_doc, "statesync.trust_height", Value::Integer(sync_plan.trust_height as i64));
        set_path(&mut config_doc, "statesync.trust_hash", Value::String(sync_plan.trust_hash.clone()));
    }

    for (key, value) in pruning_fields(&opts.pruning) {
        set_path(&mut app_doc, key, value);
    }
    set_path(&mut app_doc, "state-sync.snapshot-interval", Value::Integer(200));
    set_path(&mut app_doc, "state-sync.snapshot-keep-recent", Value::Integer(2));
    set_path(&mut app_doc, "grpc.address", Value::String(format!("0.0.0.0:{}", opts.grpc_port)));

    let config_rendered = toml::to_string_pretty(&config_doc).map_err(|e| io_err(&config_path, e))?;
    let app_rendered = toml::to_string_pretty(&app_doc).map_err(|e| io_err(&app_path, e))?;

    atomic_write(&config_path, &config_rendered).await?;
    atomic_write(&app_path, &app_rendered).await?;
    Ok(())
}

async fn atomic_write(path: &Path, contents: &str) -> Result<(), SupervisorError> {
    let tmp_path = path.with_extension("toml.tmp");
    tokio::fs::write(&tmp_path, contents).await.map_err(|e| io_err(&tmp_path, e))?;
    tokio::fs::rename(&tmp_path, path).await.map_err(|e| io_err(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JoinOptions;

    #[tokio::test]
    async fn preserves_untouched_keys_and_writes_new_ones() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join("config");
        tokio::fs::create_dir_all(&config_dir).await.unwrap();
        tokio::fs::write(config_dir.join("config.toml"), "moniker = \"node\"\n\n[p2p]\nladdr = \"tcp://0.0.0.0:26656\"\n")
            .await
            .unwrap();
        tokio::fs::write(config_dir.join("app.toml"), "minimum-gas-prices = \"0ukex\"\n").await.unwrap();

        let sync_plan = SyncPlan {
            enabled: true,
            rpc_servers: vec!["http://1.2.3.4:26657".to_string(), "http://5.6.7.8:26657".to_string()],
            trust_height: 100,
            trust_hash: "ABCD".to_string(),
        };
        write_node_configs(dir.path(), "test-1", &["tcp://aa@1.2.3.4:26656".to_string()], &sync_plan, &JoinOptions::default())
            .await
            .unwrap();

        let config_text = tokio::fs::read_to_string(config_dir.join("config.toml")).await.unwrap();
        assert!(config_text.contains("moniker"));
        assert!(config_text.contains("trust_hash"));
        let app_text = tokio::fs::read_to_string(config_dir.join("app.toml")).await.unwrap();
        assert!(app_text.contains("minimum-gas-prices"));
        assert!(app_text.contains("pruning"));
    }
}
