use std::fs;
use std::path::{Path, PathBuf};

use engine::{GraphError, SceneGraph};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub(crate) enum GraphFileError {
    #[error("read graph '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse graph '{}' at {location}: {source}", path.display())]
    Parse {
        path: PathBuf,
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("graph '{}' is invalid: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: GraphError,
    },
}

/// Loads a compiled scene graph and validates its event-list handles.
pub(crate) fn load_graph(path: &Path) -> Result<SceneGraph, GraphFileError> {
    let raw = fs::read_to_string(path).map_err(|source| GraphFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let graph = parse_graph(path, &raw)?;
    graph.validate().map_err(|source| GraphFileError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        scenes = graph.scenes.len(),
        scripts = graph.scripts.len(),
        variables = graph.variables.len(),
        "graph_loaded"
    );
    Ok(graph)
}

fn parse_graph(path: &Path, raw: &str) -> Result<SceneGraph, GraphFileError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, SceneGraph>(&mut deserializer).map_err(|error| {
        let location = match error.path().to_string() {
            path if path.is_empty() || path == "." => "root".to_string(),
            path => path,
        };
        GraphFileError::Parse {
            path: path.to_path_buf(),
            location,
            source: error.into_inner(),
        }
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const COMPILED: &str = r#"{
        "starting_scene": "yard",
        "variables": [{ "name": "met_guard", "value": "false" }],
        "scenes": [{
            "name": "yard",
            "events": 1,
            "map": { "width": 4, "height": 2, "collisions": [0, 0, 0, 0, 1, 1, 1, 1] },
            "player": {
                "x": { "type": "value", "value": 1 },
                "y": { "type": "value", "value": 0 }
            }
        }],
        "event_lists": [
            [],
            [{ "type": "fade-in" }, { "type": "show-dialog", "text": "Hello" }]
        ]
    }"#;

    #[test]
    fn loads_compiled_graph_with_editor_defaults() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("game.json");
        fs::write(&path, COMPILED).expect("write graph");

        let graph = load_graph(&path).expect("load");

        assert_eq!(graph.starting_scene(), "yard");
        assert_eq!(graph.variables.len(), 1);
        let scene = graph.scene("yard");
        assert_eq!(graph.events(scene.events).len(), 2);
        assert!(scene.map.as_ref().is_some_and(|map| map.grid_size() == 16));
    }

    #[test]
    fn missing_file_reports_read_error() {
        let temp = TempDir::new().expect("tempdir");
        let error = load_graph(&temp.path().join("absent.json")).expect_err("missing");
        assert!(matches!(error, GraphFileError::Read { .. }));
    }

    #[test]
    fn parse_error_names_the_failing_field() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("broken.json");
        fs::write(
            &path,
            r#"{ "scenes": [{ "name": "yard", "actors": [{ "name": 7 }] }] }"#,
        )
        .expect("write graph");

        let error = load_graph(&path).expect_err("parse");
        match error {
            GraphFileError::Parse { location, .. } => {
                assert_eq!(location, "scenes[0].actors[0].name");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn dangling_event_list_fails_validation() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("dangling.json");
        fs::write(&path, r#"{ "scenes": [{ "name": "yard", "events": 9 }] }"#)
            .expect("write graph");

        let error = load_graph(&path).expect_err("invalid");
        assert!(matches!(
            error,
            GraphFileError::Invalid {
                source: GraphError::DanglingEventList { list: 9, .. },
                ..
            }
        ));
    }
}
