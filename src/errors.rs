//! Error Types
//!
//! This module defines the error types used throughout the renderer.
//!
//! # Overview
//!
//! The main error type [`MarqueeError`] covers every failure mode:
//! - GPU initialization failures and device loss
//! - Invalid surface dimensions (fatal, never clamped)
//! - Shader template and pipeline creation failures
//! - Resources and commands the device rejects (validation, out of memory)
//! - Scene population errors (empty meshes, empty instance lists)
//! - Configuration parsing errors
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, MarqueeError>`.
//!
//! ```rust,ignore
//! use marquee::errors::{MarqueeError, Result};
//!
//! fn resize_everything(renderer: &mut SceneRenderer) -> Result<()> {
//!     renderer.resize(1280, 720)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the renderer.
///
/// Every variant is considered fatal for the component that produced it:
/// nothing in the crate retries after returning one of these.
#[derive(Error, Debug)]
pub enum MarqueeError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create a presentation surface for a window.
    #[error("Failed to create surface: {0}")]
    SurfaceCreateFailed(String),

    /// Window system error.
    #[error("Window system error: {0}")]
    WindowError(#[from] raw_window_handle::HandleError),

    /// The surface could not hand out a frame texture.
    #[error("Surface frame acquisition failed: {0}")]
    SurfaceAcquireFailed(String),

    /// A render target was requested with a zero dimension.
    #[error("Invalid dimensions for {target}: {width}x{height}")]
    InvalidDimensions {
        /// Which resource rejected the size
        target: &'static str,
        width: u32,
        height: u32,
    },

    /// A shader template failed to load or render.
    #[error("Shader compilation failed for '{name}': {reason}")]
    ShaderCompilation {
        /// Template name (e.g. `passes/fxaa`)
        name: String,
        reason: String,
    },

    /// The device rejected resources or commands created by `operation`.
    #[error("GPU validation failed during {operation}: {reason}")]
    GpuValidation {
        operation: &'static str,
        reason: String,
    },

    /// The GPU device was lost. The renderer refuses all further frames.
    #[error("GPU device lost: {0}")]
    DeviceLost(String),

    /// The renderer was used after `destroy()`.
    #[error("Renderer has been destroyed")]
    Destroyed,

    /// An operation was attempted in a state that does not allow it.
    #[error("Invalid renderer state: expected {expected}, found {found}")]
    InvalidState {
        expected: &'static str,
        found: &'static str,
    },

    // ========================================================================
    // Scene Errors
    // ========================================================================
    /// The scene description handed to the renderer is unusable.
    #[error("Invalid scene data: {0}")]
    InvalidScene(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unknown tone mapping preset name.
    #[error("Unknown tone mapping preset: {0}")]
    UnknownPreset(String),
}

impl From<minijinja::Error> for MarqueeError {
    fn from(err: minijinja::Error) -> Self {
        MarqueeError::ShaderCompilation {
            name: err.name().unwrap_or("<unknown>").to_string(),
            reason: err.to_string(),
        }
    }
}

/// Alias for `Result<T, MarqueeError>`.
pub type Result<T> = std::result::Result<T, MarqueeError>;

/// Rejects zero-sized render targets.
///
/// All size-dependent resources funnel their dimensions through this check so
/// that a zero width or height fails fast instead of being clamped.
pub(crate) fn ensure_dimensions(target: &'static str, width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        log::error!("Rejecting {width}x{height} for {target}");
        return Err(MarqueeError::InvalidDimensions {
            target,
            width,
            height,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(ensure_dimensions("test", 0, 10).is_err());
        assert!(ensure_dimensions("test", 10, 0).is_err());
        assert!(ensure_dimensions("test", 1, 1).is_ok());
    }

    #[test]
    fn invalid_dimensions_message_names_target() {
        let err = ensure_dimensions("G-Buffer", 0, 600).unwrap_err();
        assert_eq!(err.to_string(), "Invalid dimensions for G-Buffer: 0x600");
    }
}
