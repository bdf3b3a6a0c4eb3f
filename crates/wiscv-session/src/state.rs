//! Per-session state: the loaded norm tables and the open database
//! connection. Single user, single process, synchronous.

use std::sync::Mutex;

use tracing::warn;

use wiscv_norms::NormSet;
use wiscv_storage::Connection;

use crate::config::SessionConfig;
use crate::error::SessionError;

pub struct SessionState {
    pub config: SessionConfig,
    pub norms: NormSet,
    pub conn: Mutex<Connection>,
}

impl SessionState {
    /// Open the database and load norm tables. A broken or missing table
    /// directory falls back to the bundled defaults rather than failing the
    /// session.
    pub fn init(config: SessionConfig) -> Result<Self, SessionError> {
        let norms = match &config.norms_dir {
            Some(dir) => match NormSet::load(dir) {
                Ok(set) => set,
                Err(err) => {
                    warn!(
                        dir = %dir.display(),
                        error = %err,
                        "norm tables failed to load; using bundled defaults"
                    );
                    NormSet::bundled()
                }
            },
            None => NormSet::bundled(),
        };
        let conn = wiscv_storage::open(config.database_path()?)?;
        Ok(SessionState {
            config,
            norms,
            conn: Mutex::new(conn),
        })
    }

    /// Bundled norms over an in-memory database.
    pub fn in_memory() -> Result<Self, SessionError> {
        Ok(SessionState {
            config: SessionConfig::default(),
            norms: NormSet::bundled(),
            conn: Mutex::new(wiscv_storage::open_in_memory()?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_norms_dir_falls_back_to_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionConfig {
            data_dir: Some(dir.path().to_path_buf()),
            norms_dir: Some(dir.path().join("missing-tables")),
            ..Default::default()
        };
        let state = SessionState::init(config).unwrap();
        // Bundled band is 8:6-8:11; scoring there must work.
        let scaled = state
            .norms
            .scaled_score("8:6".parse().unwrap(), wiscv_core::Subtest::Cc, 25)
            .unwrap();
        assert_eq!(scaled, 12);
    }
}
