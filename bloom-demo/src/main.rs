//! Gaussian blur demo.
//!
//! Renders a small 3-D scene into an offscreen target, blurs it with two
//! separable passes through downsampled targets, and shows four tiles side
//! by side: the raw scene, the horizontal-only blur, the full blur, and the
//! scene with the blur composited additively on top.

mod demo;
mod passes;
mod scene;

use bloom_window::{WindowConfig, run_with_delegate};
use demo::BlurDemo;

fn main() {
    let config = WindowConfig {
        title: "Gaussian blur demo".to_string(),
        width: demo::WINDOW_WIDTH,
        height: demo::WINDOW_HEIGHT,
    };

    if let Err(e) = run_with_delegate::<BlurDemo>(config) {
        eprintln!("Application error: {e}");
        std::process::exit(1);
    }
}
