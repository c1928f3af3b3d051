use std::path::PathBuf;

use engine::{GraphError, RuntimeConfig, SceneGraph, ScriptedInput};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::demo::demo_graph;
use super::graph_file::{load_graph, GraphFileError};
use super::input_script::{parse_input_script, InputScriptError};

const GRAPH_ENV_VAR: &str = "TILESCRIPT_GRAPH";
const MAX_FRAMES_ENV_VAR: &str = "TILESCRIPT_MAX_FRAMES";
const INPUT_ENV_VAR: &str = "TILESCRIPT_INPUT";
const MAX_EVENT_DEPTH_ENV_VAR: &str = "TILESCRIPT_MAX_EVENT_DEPTH";
const DEFAULT_MAX_FRAMES: u64 = 600;

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    GraphFile(#[from] GraphFileError),
    #[error("built-in demo graph is invalid: {0}")]
    Demo(#[from] GraphError),
    #[error("{var} is not a valid input script: {source}")]
    Input {
        var: &'static str,
        #[source]
        source: InputScriptError,
    },
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

/// Launch options gathered from the command line and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LaunchSettings {
    pub(crate) graph_path: Option<PathBuf>,
    pub(crate) max_frames: u64,
    pub(crate) input_script: Option<String>,
    pub(crate) max_event_depth: Option<usize>,
}

impl LaunchSettings {
    fn from_env() -> Result<Self, BootstrapError> {
        let first_arg = std::env::args().nth(1);
        Self::resolve(first_arg, |key| std::env::var(key).ok())
    }

    /// The first CLI argument wins over the graph env var.
    fn resolve(
        first_arg: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, BootstrapError> {
        let graph_path = first_arg
            .or_else(|| lookup(GRAPH_ENV_VAR))
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);
        let max_frames = parse_positive(MAX_FRAMES_ENV_VAR, lookup(MAX_FRAMES_ENV_VAR))?
            .unwrap_or(DEFAULT_MAX_FRAMES);
        let max_event_depth = parse_positive(
            MAX_EVENT_DEPTH_ENV_VAR,
            lookup(MAX_EVENT_DEPTH_ENV_VAR),
        )?
        .map(|depth| depth as usize);

        Ok(Self {
            graph_path,
            max_frames,
            input_script: lookup(INPUT_ENV_VAR),
            max_event_depth,
        })
    }
}

pub(crate) struct AppWiring {
    pub(crate) config: RuntimeConfig,
    pub(crate) graph: SceneGraph,
    pub(crate) input: ScriptedInput,
    pub(crate) max_frames: u64,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Tilescript Startup ===");
    wire(LaunchSettings::from_env()?)
}

fn wire(settings: LaunchSettings) -> Result<AppWiring, BootstrapError> {
    let graph = match &settings.graph_path {
        Some(path) => load_graph(path)?,
        None => {
            info!("graph_path_not_set_using_demo");
            demo_graph()?
        }
    };

    let input = match &settings.input_script {
        Some(raw) => parse_input_script(raw).map_err(|source| BootstrapError::Input {
            var: INPUT_ENV_VAR,
            source,
        })?,
        None => ScriptedInput::new(),
    };

    let mut config = RuntimeConfig::default();
    if let Some(depth) = settings.max_event_depth {
        config.max_event_depth = depth;
    }

    info!(
        max_frames = settings.max_frames,
        scripted_frames = input.len(),
        max_event_depth = config.max_event_depth,
        "app_wired"
    );
    Ok(AppWiring {
        config,
        graph,
        input,
        max_frames: settings.max_frames,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_positive(var: &'static str, raw: Option<String>) -> Result<Option<u64>, BootstrapError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(BootstrapError::InvalidNumber { var, value: raw }),
    }
}
