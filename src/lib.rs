#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod binder;
pub mod canvas;
pub mod command;
pub mod config;
pub mod document;
pub mod drag;
pub mod error;
pub mod event;
pub mod geometry;
pub mod observable;
pub mod overlay;
pub mod selection;
pub mod shape;
pub mod transform;

pub use app::SketchApp;
pub use binder::{ListSelection, SelectionBinder, SelectionSide};
pub use canvas::{CanvasContext, CanvasInput, DragMode, InputEvent, SelectionOutline};
pub use command::{Command, CommandContext, CommandHistory};
pub use config::EditorConfig;
pub use document::Document;
pub use drag::{CancelAction, DragHandler, DragSession, DragSupport};
pub use error::{CommandError, ConfigError};
pub use event::{EditorEvent, EventBus, EventKind};
pub use overlay::{OverlayLayer, OverlayState};
pub use selection::SelectionModel;
pub use shape::{Shape, ShapeBounds, ShapeId, ShapeKind};
pub use transform::CanvasTransform;
