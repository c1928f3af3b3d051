use engine::{Button, ScriptedInput};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum InputScriptError {
    #[error("input step '{step}' must look like 'button:frames'")]
    MalformedStep { step: String },
    #[error("unknown button '{name}' in input step '{step}'")]
    UnknownButton { name: String, step: String },
    #[error("frame count in input step '{step}' is not a number")]
    InvalidFrames { step: String },
}

/// Parses a comma separated input script such as `right:12,a:1,idle:4`.
///
/// Each step holds its buttons for the given number of frames. `idle` holds
/// nothing, `a+right` holds both buttons, and a step without a count lasts
/// one frame.
pub(crate) fn parse_input_script(raw: &str) -> Result<ScriptedInput, InputScriptError> {
    let mut input = ScriptedInput::new();
    for step in raw.split(',').map(str::trim).filter(|step| !step.is_empty()) {
        let (names, frames) = match step.split_once(':') {
            Some((names, frames)) => {
                let frames = frames
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| InputScriptError::InvalidFrames {
                        step: step.to_string(),
                    })?;
                (names.trim(), frames)
            }
            None => (step, 1),
        };
        if names.is_empty() {
            return Err(InputScriptError::MalformedStep {
                step: step.to_string(),
            });
        }

        if names.eq_ignore_ascii_case("idle") {
            input = input.idle(frames);
            continue;
        }

        let buttons = names
            .split('+')
            .map(str::trim)
            .map(|name| {
                Button::from_token(name).ok_or_else(|| InputScriptError::UnknownButton {
                    name: name.to_string(),
                    step: step.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        input = input.hold_all(&buttons, frames);
    }
    Ok(input)
}
