//! The player's stable id and display name, kept in a small JSON file.

use crate::error::ClientError;
use log::info;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_PLAYER_NAME: &str = "Default";
const PLAYER_ID_LENGTH: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerIdentity {
    pub player_id: String,
    pub player_name: String,
}

impl PlayerIdentity {
    pub fn generate(player_name: &str) -> Self {
        let player_id = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(PLAYER_ID_LENGTH)
            .map(char::from)
            .collect();

        Self {
            player_id,
            player_name: player_name.to_string(),
        }
    }

    /// Reads the identity at `path`, creating it on first run. A name
    /// override replaces the stored display name and is written back.
    pub fn load_or_create(path: &Path, name_override: Option<&str>) -> Result<Self, ClientError> {
        let mut identity = if path.exists() {
            let contents = fs::read_to_string(path)?;
            serde_json::from_str::<PlayerIdentity>(&contents)?
        } else {
            let identity = Self::generate(name_override.unwrap_or(DEFAULT_PLAYER_NAME));
            info!("Created player id {}", identity.player_id);
            identity.save(path)?;
            identity
        };

        if let Some(name) = name_override {
            if name != identity.player_name {
                identity.player_name = name.to_string();
                identity.save(path)?;
            }
        }

        Ok(identity)
    }

    pub fn save(&self, path: &Path) -> Result<(), ClientError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
