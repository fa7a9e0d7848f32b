//! Progressive render driver.
//!
//! A background worker repeatedly sweeps the pixel buffer in shuffled
//! order, blending each sample pass into the running per-pixel mean.
//! In preview mode every sweep is a single cheap pass, the worker keeps
//! re-rendering while restart requests arrive, and it retires itself
//! once the camera has been idle for a while.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rand::Rng;
use rayon::prelude::*;

use lumen_math::{Vec2, Vec3};
use lumen_scene::{Camera, Scene};

use crate::buffer::{shuffle_table, Pixel, PixelBuffer};
use crate::tracer::PathTracer;

/// Workers re-check the control flags every time the loop index passes
/// this mask, so a stop lands within 256 pixels of being requested.
const CANCEL_POLL_MASK: usize = 0xFF;

/// Minimum time a preview pass runs before a restart may cancel it.
/// Keeps a stream of restart requests from starving the buffer of
/// finished frames.
const PREVIEW_PASS_BUDGET: Duration = Duration::from_millis(30);

/// Preview frames without a restart request before the worker exits.
const MAX_IDLE_PREVIEW_FRAMES: usize = 15;

/// Offset applied to the shuffle table per preview frame, so successive
/// preview frames resolve pixels in different orders. Coprime with any
/// realistic buffer size.
const SHUFFLE_STRIDE: usize = 9001;

/// Render resolution and sampling budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Sample passes per full (non-preview) render.
    pub samples_per_pixel: u32,
    /// Ray recursion budget handed to the tracing strategy.
    pub max_depth: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 450,
            samples_per_pixel: 100,
            max_depth: 4,
        }
    }
}

/// Snapshot of a running (or finished) render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Index of the pass currently being accumulated.
    pub pass_index: usize,
    /// Pixels resolved so far within that pass.
    pub pixels_in_pass: usize,
    /// Passes the current run will execute in total.
    pub pass_total: usize,
    /// Wall time since the run started, frozen once it finishes.
    pub elapsed: Duration,
}

#[derive(Debug)]
struct RunTiming {
    started: Instant,
    finished: Option<Instant>,
}

/// Control flags and counters shared between the owner and the worker.
///
/// `stop` doubles as the worker's exited marker: the worker sets it on
/// a natural exit, and `start` treats a set flag as permission to join
/// and relaunch.
#[derive(Debug)]
struct Signals {
    stop: AtomicBool,
    restart: AtomicBool,
    preview: AtomicBool,
    pass_index: AtomicUsize,
    pixels_in_pass: AtomicUsize,
    timing: Mutex<RunTiming>,
}

impl Signals {
    fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
            restart: AtomicBool::new(false),
            preview: AtomicBool::new(false),
            pass_index: AtomicUsize::new(0),
            pixels_in_pass: AtomicUsize::new(0),
            timing: Mutex::new(RunTiming {
                started: Instant::now(),
                finished: None,
            }),
        }
    }

    /// Arm for a fresh run. Preview mode persists across runs.
    fn reset(&self) {
        self.stop.store(false, Ordering::Relaxed);
        self.restart.store(false, Ordering::Relaxed);
        self.pass_index.store(0, Ordering::Relaxed);
        self.pixels_in_pass.store(0, Ordering::Relaxed);
        self.begin_timing();
    }

    fn lock_timing(&self) -> std::sync::MutexGuard<'_, RunTiming> {
        self.timing.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin_timing(&self) {
        let mut timing = self.lock_timing();
        timing.started = Instant::now();
        timing.finished = None;
    }

    fn end_timing(&self) {
        let mut timing = self.lock_timing();
        timing.finished = Some(Instant::now());
    }

    fn elapsed(&self) -> Duration {
        let timing = self.lock_timing();
        timing
            .finished
            .unwrap_or_else(Instant::now)
            .duration_since(timing.started)
    }
}

/// Everything the worker thread owns for one run.
struct RenderJob {
    buffer: Arc<PixelBuffer>,
    shuffle: Arc<Vec<usize>>,
    scene: Arc<Scene>,
    camera: Camera,
    tracer: PathTracer,
    settings: RenderSettings,
    signals: Arc<Signals>,
}

impl RenderJob {
    fn run(self) {
        log::debug!(
            "render worker up: {}x{}, {} spp",
            self.buffer.width(),
            self.buffer.height(),
            self.settings.samples_per_pixel
        );

        let pixel_count = self.buffer.len();
        let mut frame_time = 0.0f32;
        let mut preview_frames: usize = 0;
        let mut idle_preview_frames: usize = 0;
        let mut pass_cancelled = false;

        loop {
            if idle_preview_frames > MAX_IDLE_PREVIEW_FRAMES {
                break;
            }
            let was_preview = self.signals.preview.load(Ordering::Relaxed);
            self.signals.begin_timing();

            // The scene clock only advances after an interrupted pass,
            // so a still image converging in place keeps one timestamp.
            if pass_cancelled {
                frame_time = (frame_time + 0.03) % 100.0;
            }
            pass_cancelled = false;

            let pass_budget = if was_preview {
                1
            } else {
                self.settings.samples_per_pixel as usize
            };

            let mut pass = 0;
            while pass < pass_budget && !pass_cancelled && pixel_count > 0 {
                self.signals.pass_index.store(pass, Ordering::Relaxed);
                self.signals.pixels_in_pass.store(0, Ordering::Relaxed);

                pass_cancelled = self.run_pass(pass, preview_frames, was_preview, frame_time);
                pass += 1;
            }

            self.signals.end_timing();
            if self.signals.stop.load(Ordering::Relaxed) {
                break;
            }

            if was_preview {
                preview_frames = preview_frames.wrapping_add(1);
            }
            let restarted = self.signals.restart.swap(false, Ordering::Relaxed);
            if restarted {
                idle_preview_frames = 0;
            } else if was_preview {
                idle_preview_frames += 1;
            }

            let preview_now = self.signals.preview.load(Ordering::Relaxed);
            if !(was_preview || preview_now) {
                // Full render ran to completion.
                break;
            }
        }

        // Natural exit: mark ourselves stopped so `start` can relaunch.
        self.signals.stop.store(true, Ordering::Relaxed);
        log::debug!("render worker done");
    }

    /// Run one sample pass over every pixel. Returns whether the pass
    /// was cancelled before completing.
    fn run_pass(
        &self,
        pass: usize,
        preview_frames: usize,
        was_preview: bool,
        frame_time: f32,
    ) -> bool {
        let pixel_count = self.buffer.len();
        let width = self.buffer.width() as usize;
        let offset = preview_frames.wrapping_mul(SHUFFLE_STRIDE);

        // The first pass samples pixel centers; later passes fade the
        // jitter in so early noise settles quickly.
        let jitter_damp = 1.0 - (-0.4 * pass as f32).exp();
        let mix_factor = pass as f32 / (pass as f32 + 1.0);

        let cancel = AtomicBool::new(false);
        let pass_start = Instant::now();

        (0..pixel_count).into_par_iter().for_each(|i| {
            if cancel.load(Ordering::Relaxed) {
                return;
            }
            if i & CANCEL_POLL_MASK == 0 {
                // Only the hard stop cancels a full render; restart
                // requests may interrupt preview passes alone, and only
                // once the pass has had its minimum time.
                let preview_restart = was_preview
                    && self.signals.restart.load(Ordering::Relaxed)
                    && pass_start.elapsed() > PREVIEW_PASS_BUDGET;
                if self.signals.stop.load(Ordering::Relaxed) || preview_restart {
                    cancel.store(true, Ordering::Relaxed);
                    return;
                }
            }

            let index = self.shuffle[(i + offset) % pixel_count];
            let x = (index % width) as f32;
            let y = (index / width) as f32;

            let mut rng = rand::thread_rng();
            let jitter = Vec2::new(
                (rng.gen::<f32>() - 0.5) * jitter_damp + 0.5,
                (rng.gen::<f32>() - 0.5) * jitter_damp + 0.5,
            );

            let ray = self.camera.generate_ray(Vec2::new(x, y) + jitter);
            let sample = self
                .tracer
                .sample_ray(&self.scene, &ray, self.settings.max_depth);

            let previous = self.buffer.load(index);
            let mean = sample.lerp(Vec3::new(previous.r, previous.g, previous.b), mix_factor);
            self.buffer.store(
                index,
                Pixel {
                    r: mean.x,
                    g: mean.y,
                    b: mean.z,
                    time: frame_time,
                },
            );
            self.signals.pixels_in_pass.fetch_add(1, Ordering::Relaxed);
        });

        cancel.into_inner()
    }
}

/// Owns the accumulation buffer and the background render worker.
///
/// The buffer is shared out by `Arc`, so a display loop can read it
/// while the worker writes; reads may tear per channel but are never
/// unsound.
pub struct ProgressiveRenderer {
    settings: RenderSettings,
    scene: Arc<Scene>,
    camera: Camera,
    tracer: PathTracer,
    buffer: Arc<PixelBuffer>,
    shuffle: Arc<Vec<usize>>,
    signals: Arc<Signals>,
    worker: Option<JoinHandle<()>>,
}

impl ProgressiveRenderer {
    /// Set up a renderer. No worker runs until `start`.
    pub fn new(scene: Scene, camera: Camera, tracer: PathTracer, settings: RenderSettings) -> Self {
        let mut camera = camera;
        camera.set_image_size(settings.width, settings.height);
        let buffer = Arc::new(PixelBuffer::new(settings.width, settings.height));
        let shuffle = Arc::new(shuffle_table(buffer.len()));
        Self {
            settings,
            scene: Arc::new(scene),
            camera,
            tracer,
            buffer,
            shuffle,
            signals: Arc::new(Signals::new()),
            worker: None,
        }
    }

    /// Launch the worker. A worker that exited on its own is joined and
    /// replaced; a live worker is left alone.
    pub fn start(&mut self) {
        if let Some(worker) = self.worker.take() {
            if self.signals.stop.load(Ordering::Relaxed) {
                let _ = worker.join();
            } else {
                self.worker = Some(worker);
                return;
            }
        }

        self.signals.reset();
        let job = RenderJob {
            buffer: Arc::clone(&self.buffer),
            shuffle: Arc::clone(&self.shuffle),
            scene: Arc::clone(&self.scene),
            camera: self.camera.clone(),
            tracer: self.tracer,
            settings: self.settings,
            signals: Arc::clone(&self.signals),
        };
        self.worker = Some(std::thread::spawn(move || job.run()));
    }

    /// Hard-stop the worker and wait for it to exit.
    pub fn stop(&mut self) {
        self.signals.stop.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    /// Block until the worker exits on its own.
    pub fn wait(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some() && !self.signals.stop.load(Ordering::Relaxed)
    }

    /// Apply new render settings and restart. Resizing reallocates the
    /// buffer and shuffle table; a same-size change just clears.
    pub fn configure_render(
        &mut self,
        width: u32,
        height: u32,
        samples_per_pixel: u32,
        max_depth: u32,
    ) {
        self.stop();

        let resized = width != self.settings.width || height != self.settings.height;
        self.settings = RenderSettings {
            width,
            height,
            samples_per_pixel,
            max_depth,
        };

        if resized {
            log::info!("render target resized to {width}x{height}");
            self.buffer = Arc::new(PixelBuffer::new(width, height));
            self.shuffle = Arc::new(shuffle_table(self.buffer.len()));
            self.camera.set_image_size(width, height);
        } else {
            self.buffer.clear();
        }

        self.start();
    }

    /// Swap the scene and restart from scratch.
    pub fn set_scene(&mut self, scene: Scene) {
        self.stop();
        self.scene = Arc::new(scene);
        self.buffer.clear();
        self.start();
    }

    /// Swap the tracing strategy and restart from scratch.
    pub fn set_strategy(&mut self, tracer: PathTracer) {
        self.stop();
        self.tracer = tracer;
        self.buffer.clear();
        self.start();
    }

    /// Move the camera and restart from scratch. Preview-mode camera
    /// motion should go through `request_restart` instead, which keeps
    /// the worker alive.
    pub fn set_camera(&mut self, camera: Camera) {
        self.stop();
        self.camera = camera;
        self.camera
            .set_image_size(self.settings.width, self.settings.height);
        self.buffer.clear();
        self.start();
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Toggle preview mode. Takes effect at the next frame boundary.
    pub fn set_preview(&self, enabled: bool) {
        self.signals.preview.store(enabled, Ordering::Relaxed);
    }

    /// Ask the worker to abandon the current pass and start a fresh
    /// frame. Cheap; safe to call every input event. Only preview
    /// passes honor it; a full render runs to completion regardless.
    pub fn request_restart(&self) {
        self.signals.restart.store(true, Ordering::Relaxed);
    }

    pub fn poll_progress(&self) -> Progress {
        let pass_total = if self.signals.preview.load(Ordering::Relaxed) {
            1
        } else {
            self.settings.samples_per_pixel as usize
        };
        Progress {
            pass_index: self.signals.pass_index.load(Ordering::Relaxed),
            pixels_in_pass: self.signals.pixels_in_pass.load(Ordering::Relaxed),
            pass_total,
            elapsed: self.signals.elapsed(),
        }
    }

    pub fn settings(&self) -> RenderSettings {
        self.settings
    }

    /// Shared handle to the accumulation buffer.
    pub fn buffer(&self) -> Arc<PixelBuffer> {
        Arc::clone(&self.buffer)
    }
}

impl Drop for ProgressiveRenderer {
    fn drop(&mut self) {
        self.stop();
    }
}
