//! Animated frame engine
//!
//! Owns a frame renderer and the shared pixel buffer for one animated
//! image, and drives frame advancement from a dedicated worker thread
//! consuming a command queue. The owning thread only enqueues commands and
//! flips scheduling state; only the worker ever mutates the renderer or
//! the buffer. Teardown runs on the worker's own exit path, strictly after
//! any in-flight render has completed.

mod queue;

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use broadview_core::{Animatable, Bitmap, FrameHost, FrameRenderer, ImageData, PixelFormat};

use queue::{Command, CommandKind, CommandQueue};

/// Renderer and buffer, guarded together so a render is atomic with
/// respect to teardown
struct FrameBuffers {
    bitmap: Option<Bitmap>,
    renderer: Option<Box<dyn FrameRenderer>>,
}

/// Drives an animated image: one lazily-spawned worker per instance,
/// visibility/timing state on the owning thread
pub struct AnimatedFrameEngine {
    shared: Arc<Mutex<FrameBuffers>>,
    queue: Arc<CommandQueue>,
    worker: Option<JoinHandle<()>>,
    host: Arc<dyn FrameHost>,
    /// Whether the source declares more than one frame
    animated: bool,
    /// Whether a scheduled frame callback is outstanding
    running: bool,
    /// Whether the engine should animate while visible
    animating: bool,
    visible: bool,
    first_set_visible: bool,
}

impl AnimatedFrameEngine {
    /// Build an engine over decoded container data
    ///
    /// Allocates the buffer in the format implied by the data's opacity
    /// and renders frame 0 before returning. `None` on allocation failure;
    /// the container data is released with the dropped handle if nothing
    /// else references it.
    pub fn from_image_data(data: ImageData, host: Arc<dyn FrameHost>) -> Option<Self> {
        let format = if data.opaque() { PixelFormat::Rgb565 } else { PixelFormat::Rgba8888 };
        let mut bitmap = match Bitmap::new(data.width(), data.height(), format) {
            Ok(bitmap) => bitmap,
            Err(err) => {
                tracing::debug!(error = %err, "animated buffer allocation failed");
                return None;
            }
        };
        let mut renderer: Box<dyn FrameRenderer> = Box::new(data.create_renderer());
        let (width, height) = (bitmap.width(), bitmap.height());
        renderer.render_into(&mut bitmap, 0, 0, 0, 0, width, height, 1, false);
        Some(Self::new(renderer, bitmap, host))
    }

    /// Build an engine from an already-rendered renderer and buffer
    pub fn new(
        renderer: Box<dyn FrameRenderer>,
        bitmap: Bitmap,
        host: Arc<dyn FrameHost>,
    ) -> Self {
        let animated = renderer.image_data().frame_count() > 1;
        let shared = Arc::new(Mutex::new(FrameBuffers {
            bitmap: Some(bitmap),
            renderer: Some(renderer),
        }));
        let queue = Arc::new(CommandQueue::new());
        let worker = animated.then(|| {
            spawn_worker(Arc::clone(&shared), Arc::clone(&queue), Arc::clone(&host))
        });
        Self {
            shared,
            queue,
            worker,
            host,
            animated,
            running: false,
            animating: true,
            visible: true,
            first_set_visible: true,
        }
    }

    pub fn is_animated(&self) -> bool {
        self.animated
    }

    /// Buffer dimensions, while the buffer is alive
    pub fn size(&self) -> Option<(u32, u32)> {
        let buffers = self.shared.lock().unwrap();
        buffers.bitmap.as_ref().map(|bitmap| (bitmap.width(), bitmap.height()))
    }

    /// Run a closure against the current buffer contents
    ///
    /// Blocks a concurrent render for the duration of the closure; `None`
    /// once the buffer has been released.
    pub fn with_bitmap<R>(&self, f: impl FnOnce(&Bitmap) -> R) -> Option<R> {
        let buffers = self.shared.lock().unwrap();
        buffers.bitmap.as_ref().map(f)
    }

    /// Update visibility; returns whether the value changed
    ///
    /// Becoming visible on the first-ever call, or on a hidden-to-visible
    /// change, re-asserts the last requested frame intent so a freshly
    /// attached view shows correct content immediately. Becoming hidden
    /// cancels the pending callback only; animation intent survives.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        let changed = self.visible != visible;
        self.visible = visible;
        if self.animated {
            if visible {
                if changed || self.first_set_visible {
                    self.first_set_visible = false;
                    let advance = self.running;
                    let animate = self.animating;
                    self.set_frame(advance, animate);
                }
            } else {
                self.unschedule();
            }
        }
        changed
    }

    /// Host-fired scheduled callback: advance one frame and keep looping
    pub fn on_frame_tick(&mut self) {
        self.set_frame(true, true);
    }

    /// True once `recycle()` has been accepted
    pub fn is_recycled(&self) -> bool {
        self.queue.is_recycled()
    }

    /// Irreversibly release the engine
    ///
    /// With a worker, the `Recycle` command clears the queue and is the
    /// last command the worker executes; renderer and buffer are released
    /// on the worker after the loop exits. Without a worker, resources are
    /// released synchronously.
    pub fn recycle(&mut self) {
        self.running = false;
        self.host.unschedule_callback();
        self.queue.push(Command::new(CommandKind::Recycle));
        if self.worker.is_none() {
            release_buffers(&self.shared);
        }
    }

    fn set_frame(&mut self, advance: bool, animate: bool) {
        if self.queue.is_recycled() {
            return;
        }
        self.animating = animate;
        self.unschedule();
        if animate {
            self.running = true;
        }
        let kind = match (advance, animate) {
            (false, false) => CommandKind::Reset,
            (false, true) => CommandKind::ResetAnimate,
            (true, false) => CommandKind::Advance,
            (true, true) => CommandKind::AdvanceAnimate,
        };
        self.queue.push(Command::new(kind));
    }

    fn unschedule(&mut self) {
        self.running = false;
        self.host.unschedule_callback();
    }
}

impl Animatable for AnimatedFrameEngine {
    /// Restart animation at frame 0
    fn start(&mut self) {
        self.animating = true;
        if self.animated && !self.running {
            self.set_frame(false, true);
        }
    }

    /// Suppress future scheduling; the last rendered frame stays displayed
    fn stop(&mut self) {
        self.animating = false;
        if self.animated && self.running {
            self.unschedule();
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

impl Drop for AnimatedFrameEngine {
    fn drop(&mut self) {
        self.recycle();
    }
}

fn spawn_worker(
    shared: Arc<Mutex<FrameBuffers>>,
    queue: Arc<CommandQueue>,
    host: Arc<dyn FrameHost>,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name("broadview-frame".to_string())
        .spawn(move || {
            loop {
                let command = queue.wait_pop();
                let advance = match command.kind {
                    CommandKind::Reset | CommandKind::ResetAnimate => false,
                    CommandKind::Advance | CommandKind::AdvanceAnimate => true,
                    CommandKind::Recycle => break,
                };
                let delay = render_frame(&shared, advance);
                host.invalidate();
                let reschedule = matches!(
                    command.kind,
                    CommandKind::ResetAnimate | CommandKind::AdvanceAnimate
                );
                if reschedule {
                    // Skip when the buffer was recycled during execution.
                    if let Some(delay) = delay {
                        host.schedule_callback(command.queued_at + delay);
                    }
                }
            }
            // Strictly after the loop: any in-flight render has finished.
            release_buffers(&shared);
            tracing::debug!("frame worker exited");
        })
        .expect("failed to spawn frame worker")
}

/// Render the next frame; `None` when the buffer or renderer is gone
fn render_frame(
    shared: &Mutex<FrameBuffers>,
    advance: bool,
) -> Option<std::time::Duration> {
    let mut buffers = shared.lock().unwrap();
    let buffers = &mut *buffers;
    let (Some(bitmap), Some(renderer)) = (buffers.bitmap.as_mut(), buffers.renderer.as_mut())
    else {
        return None;
    };
    if advance {
        renderer.advance();
    } else {
        renderer.reset();
    }
    // Read the buffer's current dimensions, not cached ones.
    let (width, height) = (bitmap.width(), bitmap.height());
    renderer.render_into(bitmap, 0, 0, 0, 0, width, height, 1, false);
    Some(renderer.current_delay())
}

fn release_buffers(shared: &Mutex<FrameBuffers>) {
    let mut buffers = shared.lock().unwrap();
    buffers.bitmap = None;
    if let Some(mut renderer) = buffers.renderer.take() {
        renderer.recycle();
    }
    // Dropping the renderer drops its ImageData handle; the container data
    // is freed when the last holder goes away.
}
