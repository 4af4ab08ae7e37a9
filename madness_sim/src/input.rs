//! Loading normalized team records and projection configs from JSON.

use madness_core::{ProjectionConfig, TeamId, TeamRecord};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading CLI inputs.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Duplicate team id: {0}")]
    DuplicateTeam(TeamId),
}

fn read(path: &Path) -> Result<String, InputError> {
    fs::read_to_string(path).map_err(|source| InputError::Io { path: path.to_path_buf(), source })
}

/// Reads a JSON array of team records.
///
/// Derived fields present in the file are cleared; the projector owns them.
pub fn load_teams(path: &Path) -> Result<Vec<TeamRecord>, InputError> {
    let raw = read(path)?;
    let mut teams: Vec<TeamRecord> = serde_json::from_str(&raw)
        .map_err(|source| InputError::Parse { path: path.to_path_buf(), source })?;

    let mut seen = HashSet::new();
    for team in &mut teams {
        if !seen.insert(team.id.clone()) {
            return Err(InputError::DuplicateTeam(team.id.clone()));
        }
        team.reset_projection();
    }

    debug!("Loaded {} teams from {}", teams.len(), path.display());
    Ok(teams)
}

/// Reads a projection config. Missing keys take their defaults.
pub fn load_config(path: &Path) -> Result<ProjectionConfig, InputError> {
    let raw = read(path)?;
    serde_json::from_str(&raw).map_err(|source| InputError::Parse { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use madness_core::team::UNRANKED;
    use madness_core::ProjectedSeed;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_teams_fills_defaults() {
        let file = write_temp(r#"[{"id": "duke", "name": "Duke", "wins": 25, "losses": 5}]"#);
        let teams = load_teams(file.path()).unwrap();

        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].id, TeamId::new("duke"));
        assert_eq!(teams[0].net_rank, UNRANKED);
        assert_eq!(teams[0].sos, 0.5);
    }

    #[test]
    fn test_load_teams_clears_derived_fields() {
        let file = write_temp(r#"[{"id": "a", "seed_score": 88.0, "projected_seed": {"seed": 3}}]"#);
        let teams = load_teams(file.path()).unwrap();

        assert_eq!(teams[0].seed_score, 0.0);
        assert_eq!(teams[0].projected_seed, ProjectedSeed::NotInField);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let file = write_temp(r#"[{"id": "a"}, {"id": "b"}, {"id": "a"}]"#);
        let err = load_teams(file.path()).unwrap_err();
        assert!(matches!(err, InputError::DuplicateTeam(id) if id == TeamId::new("a")));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let file = write_temp("[{\"id\": ");
        assert!(matches!(load_teams(file.path()), Err(InputError::Parse { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_teams(Path::new("/nonexistent/teams.json")).unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
    }

    #[test]
    fn test_load_config_partial() {
        let file = write_temp(r#"{"simulation": {"simulations": 250, "regions": ["North", "South"]}}"#);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.simulation.simulations, 250);
        assert_eq!(config.simulation.regions.len(), 2);
        assert_eq!(config.simulation.chunk_size, 64);
        assert_eq!(config.weights, ProjectionConfig::default().weights);
    }

    #[test]
    fn test_load_config_rejects_duplicate_regions() {
        let file = write_temp(r#"{"simulation": {"regions": ["East", "East"]}}"#);
        assert!(matches!(load_config(file.path()), Err(InputError::Parse { .. })));
    }
}
