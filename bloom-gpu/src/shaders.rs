//! Shader source code embedded at compile time.
//!
//! This module exposes WGSL shader sources for use in pipelines. The shaders
//! are embedded using `include_str!` at compile time, so they're available as
//! static string constants.

/// Instanced cube scene - camera uniform plus simple directional shading.
pub const SCENE: &str = include_str!("../shaders/scene.wgsl");

/// Single-axis weighted blur driven by a texel-offset and attenuation uniform.
pub const BLUR: &str = include_str!("../shaders/blur.wgsl");

/// Fullscreen textured draw used for the window tiles.
pub const BLIT: &str = include_str!("../shaders/blit.wgsl");

/// Solid-color line strip for the tile borders.
pub const BORDER: &str = include_str!("../shaders/border.wgsl");
