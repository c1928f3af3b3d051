use std::process::ExitCode;

use engine::{Director, HeadlessHost};
use tracing::{error, info};

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let host = HeadlessHost::new(app.input).with_frame_budget(app.max_frames);
    let mut director = match Director::new(&app.graph, app.config, host) {
        Ok(director) => director,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };

    match director.run() {
        Ok(summary) => {
            let host = director.host();
            info!(
                frames = summary.frames,
                scenes_entered = summary.scenes_entered,
                last_scene = %summary.last_scene,
                stop = %summary.stop,
                dialogs = host.dialogs().len(),
                sounds = host.sounds().len(),
                "run_complete"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "runtime_failed");
            ExitCode::FAILURE
        }
    }
}
