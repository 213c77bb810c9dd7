#![forbid(unsafe_code)]

pub mod blend;
pub mod blur;
pub mod color;
pub mod config;
pub mod core;
pub mod error;
pub mod layer;
pub mod layout;
pub mod motion;
pub mod phase;
pub mod pixmap;
pub mod processor;
pub mod render;
pub mod session;
pub mod store;
pub mod surface;

pub use blend::{blend, composite_pixel};
pub use color::hsv_to_rgb;
pub use config::{
    BlendMode, CaptureParams, EngineOptions, HsvControls, HueShiftMode, LayeringMode,
    RenderConfig, SettingsDoc, ViewMode,
};
pub use crate::core::{Canvas, PixelBuffer, Rgba};
pub use error::{SedimentaError, SedimentaResult};
pub use layer::SedimentLayer;
pub use layout::{Placement, layout};
pub use motion::{Channel, ColorProfile, MotionAnalysis, analyze};
pub use phase::{PhaseClock, PhaseSample};
pub use pixmap::Pixmap;
pub use processor::{EngineStats, SedimentProcessor, SlitOutcome};
pub use render::Renderer;
pub use session::{CaptureSource, Session, SlitCapture, SyntheticSource};
pub use store::LayerStore;
pub use surface::{GradientStop, Surface};
