//! # Node Editor Core
//!
//! A backend-agnostic interactive node-graph editor core for immediate-mode
//! GUIs. The host feeds the editor a declarative description of its graph
//! every frame; the editor lays it out on a pannable, zoomable canvas,
//! classifies pointer and keyboard input into coherent interactions, renders
//! into a channelled display list the host rasterizes, and persists node
//! positions, view and selection as JSON.
//!
//! ## Features
//!
//! - **Toolkit-agnostic** - The host supplies input and consumes draw
//!   commands; no rendering or OS integration inside
//! - **Query protocol** - Link creation and deletion are proposed by the
//!   editor and explicitly accepted or rejected by the host
//! - **Stable ids** - Entities are addressed only by host-assigned ids;
//!   internal storage is an arena, never exposed pointers
//! - **Persistent** - Positions, sizes, selection, view and an id counter
//!   round-trip through a tolerant JSON schema
//!
//! ## Quick Start
//!
//! ```no_run
//! use node_editor_core::{Color, Config, Editor, FrameInput, LinkId, NodeId, PinId, PinKind, Rect, Vec2};
//!
//! let mut editor = Editor::new(Config::default());
//!
//! // Every frame:
//! editor.begin(FrameInput::default());
//!
//! editor.begin_node(NodeId::new(1));
//! editor.begin_pin(PinId::new(11), PinKind::Output);
//! editor.pin_rect(Rect::from_min_size(Vec2::new(90.0, 20.0), Vec2::new(10.0, 10.0)));
//! editor.end_pin();
//! editor.end_node();
//!
//! editor.link(LinkId::new(100), PinId::new(11), PinId::new(12), Color::WHITE, 2.0);
//!
//! editor.end();
//! // ... hand editor.draw_list() to the renderer.
//! ```
//!
//! ## Core Components
//!
//! - [`Editor`] - The per-frame front door: submission, queries, actions
//! - [`Canvas`] - Screen/client/canvas coordinate transforms
//! - [`DrawList`] - Channelled command buffer merged at end of frame
//! - [`Style`] - Color table and variable set with push/pop stacks
//! - [`Settings`] - Dirty-tracked persistence with a JSON round trip

pub mod actions;
pub mod animation;
pub mod bezier;
pub mod builder;
pub mod canvas;
pub mod config;
pub mod draw_list;
pub mod editor;
pub mod geometry;
pub mod grid;
pub mod input;
pub mod object;
pub mod settings;
pub mod style;

pub use animation::{FlowDirection, NavigateAnimation, Timeline};
pub use bezier::{CubicBezier, Projection};
pub use canvas::Canvas;
pub use config::{
    CanvasSizeMode, Config, FileSettingsBackend, LinkCandidate, LinkEvent, SettingsBackend,
};
pub use draw_list::{Color, CornerFlags, DrawCmd, DrawList, Vertex};
pub use editor::Editor;
pub use geometry::{Rect, RectRegion, Vec2};
pub use input::{ButtonInput, Control, CursorKind, FrameInput, KeysPressed, Modifiers};
pub use object::{
    LinkAccept, LinkId, LinkRejection, NodeId, NodeKind, ObjectId, PinId, PinKind, ValueType,
};
pub use settings::{DirtyReason, Settings, SettingsError, ViewSettings};
pub use style::{Style, StyleColor, StyleVar, VarValue};
