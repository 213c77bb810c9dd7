use std::f64::consts::TAU;

use crate::config::CaptureParams;
use crate::core::PixelBuffer;
use crate::processor::{SedimentProcessor, SlitOutcome};

/// One slit delivered by a capture source.
#[derive(Clone, Debug)]
pub struct SlitCapture {
    pub pixels: PixelBuffer,
    /// Scan position in [0, 100].
    pub position: f64,
    pub timestamp_ms: u64,
}

/// Boundary to the camera-side collaborator. Returns `None` once the source
/// is exhausted (a live camera never is; synthetic sources are).
pub trait CaptureSource {
    fn next_slit(&mut self) -> Option<SlitCapture>;
}

/// Cooperative frame-loop driver: capture → analyze → append → age, one
/// frame per call. Stopping is synchronous, and a frame call issued after
/// `stop()` is a no-op — the guard sits at the top of the loop body.
pub struct Session {
    processor: SedimentProcessor,
    capturing: bool,
}

impl Session {
    pub fn new(processor: SedimentProcessor) -> Self {
        Self {
            processor,
            capturing: false,
        }
    }

    pub fn start(&mut self) {
        self.capturing = true;
    }

    pub fn stop(&mut self) {
        self.capturing = false;
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Runs one frame. Returns `None` without touching any state when the
    /// session is stopped or the source runs dry (which also stops it).
    pub fn frame(
        &mut self,
        source: &mut dyn CaptureSource,
        params: &CaptureParams,
    ) -> Option<SlitOutcome> {
        if !self.capturing {
            return None;
        }
        let Some(capture) = source.next_slit() else {
            self.capturing = false;
            return None;
        };
        Some(self.processor.process_slit(
            capture.pixels,
            capture.position,
            capture.timestamp_ms,
            params,
        ))
    }

    pub fn processor(&self) -> &SedimentProcessor {
        &self.processor
    }

    pub fn processor_mut(&mut self) -> &mut SedimentProcessor {
        &mut self.processor
    }
}

/// Camera-free capture source producing a deterministic drifting interference
/// pattern. Scan position sweeps 0→100 and wraps; timestamps advance at a
/// fixed frame interval.
pub struct SyntheticSource {
    slit_width: u32,
    frame_height: u32,
    frames_left: u64,
    frame_interval_ms: u64,
    scan_speed: f64,
    position: f64,
    timestamp_ms: u64,
    frame: u64,
}

impl SyntheticSource {
    pub fn new(slit_width: u32, frame_height: u32, frames: u64) -> Self {
        Self {
            slit_width: slit_width.max(1),
            frame_height: frame_height.max(1),
            frames_left: frames,
            frame_interval_ms: 33,
            scan_speed: 1.5,
            position: 0.0,
            timestamp_ms: 0,
            frame: 0,
        }
    }

    pub fn with_scan_speed(mut self, scan_speed: f64) -> Self {
        self.scan_speed = scan_speed.max(0.0);
        self
    }
}

impl CaptureSource for SyntheticSource {
    fn next_slit(&mut self) -> Option<SlitCapture> {
        if self.frames_left == 0 {
            return None;
        }
        self.frames_left -= 1;

        let t = self.frame as f64 * 0.08;
        let mut data = Vec::with_capacity((self.slit_width * self.frame_height * 4) as usize);
        for y in 0..self.frame_height {
            let fy = f64::from(y) / f64::from(self.frame_height);
            for x in 0..self.slit_width {
                let fx = f64::from(x) / f64::from(self.slit_width);
                let r = ((fy * TAU * 3.0 + t).sin() * 0.5 + 0.5) * 255.0;
                let g = ((fy * TAU * 5.0 - t * 1.3 + fx).cos() * 0.5 + 0.5) * 255.0;
                let b = (((fy + fx) * TAU * 2.0 + t * 0.7).sin() * 0.5 + 0.5) * 255.0;
                data.extend_from_slice(&[r as u8, g as u8, b as u8, 255]);
            }
        }
        let pixels = PixelBuffer::from_rgba8(self.slit_width, self.frame_height, data)
            .expect("synthetic buffer dimensions are consistent");

        let capture = SlitCapture {
            pixels,
            position: self.position,
            timestamp_ms: self.timestamp_ms,
        };

        self.frame += 1;
        self.timestamp_ms += self.frame_interval_ms;
        self.position = (self.position + self.scan_speed).rem_euclid(100.0);
        Some(capture)
    }
}
