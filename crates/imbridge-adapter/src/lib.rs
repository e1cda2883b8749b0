//! # imbridge-adapter
//!
//! Platform adapter for the **imbridge** immediate-mode GUI. It sits between
//! three parties:
//!
//! * a windowing toolkit ([`toolkit::Window`]) that delivers events and
//!   owns the native window,
//! * a scene-graphics library ([`graphics::Context`]) that owns pipelines,
//!   textures and framebuffers,
//! * the GUI ([`imbridge_core::Context`]) that consumes per-frame input and
//!   produces draw data.
//!
//! Per frame the host calls [`Adapter::handle_event`] for each event (or
//! lets [`Adapter::install_event_handler`] do it), then
//! [`Adapter::new_frame`], builds its UI, and finally [`Adapter::render`].

pub mod adapter;
pub mod backend;
pub mod config;
pub mod device;
pub mod error;
mod frame;
pub mod graphics;
pub mod input;
pub mod render;
pub mod toolkit;

pub use adapter::{Adapter, BACKEND_NAME};
pub use backend::Backend;
pub use config::AdapterConfig;
pub use device::DeviceState;
pub use error::{AdapterError, PipelineStage, Result};
pub use graphics::GraphicsError;
pub use input::PendingInput;
