//! Blocking screen fades. The blend factor is the strength of the black
//! overlay: 1.0 hides the scene, 0.0 shows it.

use super::host::{BackgroundState, Host, HostError};

/// Fades the scene in over `frames` frames. Zero frames snaps to fully shown.
pub fn enter(
    host: &mut dyn Host,
    background: &mut BackgroundState,
    frames: u32,
) -> Result<(), HostError> {
    background.visible = true;
    if frames == 0 {
        host.set_blend_alpha(0.0);
        background.blending = false;
        host.set_background(background);
        return Ok(());
    }

    host.set_blend_alpha(1.0);
    background.blending = true;
    host.set_background(background);
    animate(host, frames, |t| 1.0 - t)?;

    host.set_blend_alpha(0.0);
    background.blending = false;
    host.set_background(background);
    Ok(())
}

/// Fades the scene out over `frames` frames and leaves the background hidden.
pub fn exit(
    host: &mut dyn Host,
    background: &mut BackgroundState,
    frames: u32,
) -> Result<(), HostError> {
    if frames > 0 {
        host.set_blend_alpha(0.0);
        background.blending = true;
        host.set_background(background);
        animate(host, frames, |t| t)?;
    }

    host.set_blend_alpha(1.0);
    background.blending = false;
    background.visible = false;
    host.set_background(background);
    Ok(())
}

fn animate(
    host: &mut dyn Host,
    frames: u32,
    alpha_at: impl Fn(f32) -> f32,
) -> Result<(), HostError> {
    for step in 1..=frames {
        host.set_blend_alpha(alpha_at(step as f32 / frames as f32));
        host.advance_frame()?;
    }
    Ok(())
}
