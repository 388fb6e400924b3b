//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`LumenError`] covers all failure modes including:
//! - GPU initialization failures
//! - Shadow-map and render-target allocation errors
//! - Settings loading and persistence errors
//! - UI size-compilation errors
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, LumenError>`.
//!
//! Per-frame failures never abort a frame: they degrade the dependent feature
//! (a light loses its shadow map, a mesh is skipped) and surface through the
//! logging channel. Only critical subsystem initialization failures at startup
//! propagate out of [`crate::app::App::run`].

use thiserror::Error;

/// The main error type for the Lumen engine.
///
/// This enum covers all possible error conditions that can occur
/// during engine operation. Each variant provides specific context
/// about what went wrong.
#[derive(Error, Debug)]
pub enum LumenError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Window system error.
    #[error("Window system error: {0}")]
    WindowError(#[from] raw_window_handle::HandleError),

    /// Event loop error (winit).
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    /// A render target (shadow map, MSAA target) could not be allocated.
    #[error("Render target allocation failed: {0}")]
    RenderTargetFailed(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// The persisted settings file could not be parsed.
    #[error("Malformed settings file {path}: {reason}")]
    ConfigParseFailed {
        /// Path of the offending file
        path: String,
        /// Parser diagnostic
        reason: String,
    },

    /// A settings path does not exist in the default tree.
    #[error("Unknown settings path: {0}")]
    UnknownSettingsPath(String),

    /// A settings value did not have the expected type.
    #[error("Settings type mismatch at {path}: expected {expected}")]
    SettingsTypeMismatch {
        /// Dot path of the key
        path: String,
        /// Expected type name
        expected: &'static str,
    },

    /// The requested graphics preset does not exist.
    #[error("Unknown graphics preset: {0}")]
    UnknownPreset(String),

    // ========================================================================
    // Asset & Resource Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// An asset decoder reported a failure.
    #[error("Asset decode error: {0}")]
    AssetDecodeFailed(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ========================================================================
    // UI Errors
    // ========================================================================
    /// A UI calc expression divided by zero. The offending dimension
    /// compiles to 0 and the error is logged once per component.
    #[error("UI calc division by zero")]
    UiDivisionByZero,

    /// A UI component compiled to a negative size.
    #[error("Negative compiled size for UI component: {0}")]
    UiNegativeSize(f32),
}

/// Alias for `Result<T, LumenError>`.
pub type Result<T> = std::result::Result<T, LumenError>;
