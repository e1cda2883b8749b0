//! The [`Adapter`]: binds one toolkit window and one graphics context to a
//! GUI [`Context`](imbridge_core::Context).

use std::{cell::RefCell, rc::Rc};

use imbridge_core::{ClipboardBackend, Context as GuiContext};

use crate::{
    backend::Backend,
    config::AdapterConfig,
    device::{DeviceObjects, TextureRegistry},
    error::Result,
    graphics::{Context, Framebuffer, Renderer},
    input::PendingInput,
    toolkit::{Event, MonotonicClock, RegionRect, SystemClock, Window},
};

/// Name published in [`Io::backend_name`](imbridge_core::Io::backend_name).
pub const BACKEND_NAME: &str = "imbridge_adapter";

// ─── Clipboard bridge ────────────────────────────────────────────────────────

struct WindowClipboard<W: Window>(W);

impl<W: Window> ClipboardBackend for WindowClipboard<W> {
    fn get(&mut self) -> Option<String> { self.0.clipboard_text() }
    fn set(&mut self, text: &str) { self.0.set_clipboard_text(text) }
}

// ─── Adapter ─────────────────────────────────────────────────────────────────

/// Drives a GUI context from a toolkit window `W` and renders it through a
/// graphics context `C`.
///
/// ```rust,ignore
/// let mut gui = imbridge_core::Context::new();
/// let mut adapter = Adapter::new(window, renderer, &mut gui, AdapterConfig::default())?;
/// loop {
///     // window.dispatch(...) -> adapter.handle_event(&event)
///     adapter.new_frame(&mut gui);
///     build_ui(&mut gui);
///     adapter.render(&mut gui);
///     adapter.framebuffer_mut().swap_buffers();
/// }
/// ```
pub struct Adapter<W: Window, C: Context> {
    // Graphics objects first: fields drop in declaration order.
    pub(crate) device:      Option<DeviceObjects<C>>,
    pub(crate) textures:    TextureRegistry<C::Texture>,
    pub(crate) framebuffer: C::Onscreen,
    pub(crate) context:     C,
    pub(crate) window:      W,

    pub(crate) config:  AdapterConfig,
    pub(crate) backend: Backend,
    pub(crate) clock:   Box<dyn MonotonicClock>,

    pub(crate) pending:           PendingInput,
    pub(crate) redraws:           u32,
    pub(crate) last_frame_micros: Option<u64>,
    pub(crate) device_created:    bool,
    pub(crate) hook_installed:    bool,
}

impl<W: Window + 'static, C: Context> Adapter<W, C> {
    /// Create the graphics context and an onscreen framebuffer bound to
    /// `window`, and attach to `ctx`.
    pub fn new<R>(window: W, renderer: R, ctx: &mut GuiContext, config: AdapterConfig) -> Result<Self>
    where
        R: Renderer<Context = C>,
    {
        let backend = config.backend.unwrap_or_else(|| Backend::detect(window.windowing()));
        let (_, _, width, height) = window.geometry();
        let scale = window.scale_factor();

        prepare_window(&window, &config);
        window.ensure_native();

        let mut context = renderer.connect(backend.winsys())?;
        let mut onscreen = context.new_onscreen(width * scale, height * scale)?;
        onscreen.set_resizable(true);
        backend.bind_window(&mut onscreen, &window, config.event_mask);

        log::info!("Adapter::new: {} backend, {width}x{height} @{scale}x", backend.name());
        Ok(Self::assemble(window, context, onscreen, backend, ctx, config))
    }

    /// Attach to a context and framebuffer the caller already owns, e.g. a
    /// widget's GL area. Nothing is bound to native windows.
    pub fn with_framebuffer(
        window:      W,
        context:     C,
        framebuffer: C::Onscreen,
        ctx:         &mut GuiContext,
        config:      AdapterConfig,
    ) -> Self {
        let backend = config.backend.unwrap_or_else(|| Backend::detect(window.windowing()));
        prepare_window(&window, &config);
        log::info!("Adapter::with_framebuffer: {} backend", backend.name());
        Self::assemble(window, context, framebuffer, backend, ctx, config)
    }

    fn assemble(
        window:      W,
        context:     C,
        framebuffer: C::Onscreen,
        backend:     Backend,
        ctx:         &mut GuiContext,
        config:      AdapterConfig,
    ) -> Self {
        let io = ctx.io_mut();
        io.backend_name = Some(BACKEND_NAME);
        ctx.set_clipboard_backend(Some(Box::new(WindowClipboard(window.clone()))));

        Self {
            device:            None,
            textures:          TextureRegistry::new(),
            framebuffer,
            context,
            window,
            config,
            backend,
            clock:             Box::new(SystemClock::default()),
            pending:           PendingInput::default(),
            redraws:           0,
            last_frame_micros: None,
            device_created:    false,
            hook_installed:    false,
        }
    }
}

impl<W: Window + 'static, C: Context + 'static> Adapter<W, C> {
    /// [`new`](Self::new), shared, with the window event hook installed when
    /// `config.handle_events` is set.
    pub fn new_shared<R>(window: W, renderer: R, ctx: &mut GuiContext, config: AdapterConfig) -> Result<Rc<RefCell<Self>>>
    where
        R: Renderer<Context = C>,
    {
        let handle_events = config.handle_events;
        let adapter = Rc::new(RefCell::new(Self::new(window, renderer, ctx, config)?));
        if handle_events {
            Self::install_event_handler(&adapter);
        }
        Ok(adapter)
    }

    /// Route the window's events into [`handle_event`](Self::handle_event).
    ///
    /// The hook holds a weak reference; once the adapter is gone events
    /// fall through untouched.
    pub fn install_event_handler(this: &Rc<RefCell<Self>>) {
        let weak = Rc::downgrade(this);
        let window = {
            let mut adapter = this.borrow_mut();
            adapter.hook_installed = true;
            adapter.window.clone()
        };
        window.set_event_handler(Some(Box::new(move |event: &Event| {
            let Some(adapter) = weak.upgrade() else { return };
            match adapter.try_borrow_mut() {
                Ok(mut adapter) => { adapter.handle_event(event); }
                Err(_) => log::warn!("event hook: adapter busy, dropped {event:?}"),
            };
        })));
    }
}

impl<W: Window, C: Context> Adapter<W, C> {
    /// Release every graphics object, remove the event hook and detach from
    /// `ctx`. The window, framebuffer and context are dropped last.
    pub fn shutdown(mut self, ctx: &mut GuiContext) {
        self.invalidate_device_objects(ctx);
        self.release_textures();
        if self.hook_installed {
            self.window.set_event_handler(None);
        }
        ctx.set_clipboard_backend(None);
        ctx.io_mut().backend_name = None;
        log::info!("Adapter::shutdown: {} backend released", self.backend.name());
    }

    /// Replace the time source used for delta time.
    pub fn set_clock(&mut self, clock: impl MonotonicClock + 'static) {
        self.clock = Box::new(clock);
        self.last_frame_micros = None;
    }

    pub fn window(&self)  -> &W       { &self.window }
    pub fn backend(&self) -> Backend  { self.backend }
    pub fn config(&self)  -> &AdapterConfig { &self.config }

    pub fn context(&self)         -> &C     { &self.context }
    pub fn context_mut(&mut self) -> &mut C { &mut self.context }

    pub fn framebuffer(&self)         -> &C::Onscreen     { &self.framebuffer }
    pub fn framebuffer_mut(&mut self) -> &mut C::Onscreen { &mut self.framebuffer }

    /// Input gathered since the last frame setup.
    pub fn pending(&self) -> &PendingInput { &self.pending }

    /// Frames of paint requests still scheduled.
    pub fn redraws_pending(&self) -> u32 { self.redraws }
}

fn prepare_window<W: Window>(window: &W, config: &AdapterConfig) {
    if config.opaque_region {
        let (_, _, width, height) = window.geometry();
        window.set_opaque_region(Some(RegionRect { x: 0, y: 0, width, height }));
    }
    window.set_events(window.events() | config.event_mask);
}
