//! Test harness driving the editor with synthetic frames.
//!
//! Holds a host-side graph model (nodes, pins, links) that is resubmitted
//! every frame, plus simulated mouse and keyboard state with helpers for
//! clicks, drags, wheel scrolls and key taps. Each helper runs one frame, so
//! multi-step gestures match what a real immediate-mode host would deliver.

#![allow(dead_code)]

use node_editor_core::{
    Color, Config, Editor, FrameInput, KeysPressed, LinkId, Modifiers, NodeId, PinId, PinKind,
    Rect, Vec2,
};

pub const WINDOW_SIZE: Vec2 = Vec2::new(800.0, 600.0);
pub const FRAME_DT: f32 = 1.0 / 60.0;

/// A pin the host lays out relative to its node's origin.
#[derive(Clone, Copy, Debug)]
pub struct TestPin {
    pub id: i64,
    pub kind: PinKind,
    pub offset: Vec2,
    pub size: Vec2,
}

/// A node the host submits every frame.
#[derive(Clone, Debug)]
pub struct TestNode {
    pub id: i64,
    pub size: Vec2,
    pub pins: Vec<TestPin>,
    /// Interior size when the node is a group.
    pub group_size: Option<Vec2>,
}

/// A link the host submits every frame.
#[derive(Clone, Copy, Debug)]
pub struct TestLink {
    pub id: i64,
    pub start_pin: i64,
    pub end_pin: i64,
}

/// The host's retained graph.
#[derive(Default)]
pub struct GraphModel {
    pub nodes: Vec<TestNode>,
    pub links: Vec<TestLink>,
}

impl GraphModel {
    pub fn remove_node(&mut self, id: i64) {
        self.nodes.retain(|node| node.id != id);
    }

    pub fn remove_link(&mut self, id: i64) {
        self.links.retain(|link| link.id != id);
    }

    pub fn add_link(&mut self, id: i64, start_pin: i64, end_pin: i64) {
        self.links.push(TestLink {
            id,
            start_pin,
            end_pin,
        });
    }
}

/// Frame-driving harness around an [`Editor`] instance.
pub struct Harness {
    pub editor: Editor,
    pub graph: GraphModel,
    mouse_pos: Vec2,
    buttons_down: [bool; 4],
    prev_buttons_down: [bool; 4],
    double_click: [bool; 4],
    pub modifiers: Modifiers,
    keys: KeysPressed,
    wheel: f32,
    pub window_focused: bool,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            editor: Editor::new(config),
            graph: GraphModel::default(),
            mouse_pos: Vec2::ZERO,
            buttons_down: [false; 4],
            prev_buttons_down: [false; 4],
            double_click: [false; 4],
            modifiers: Modifiers::default(),
            keys: KeysPressed::default(),
            wheel: 0.0,
            window_focused: true,
        }
    }

    /// Register a node and position it in the editor.
    pub fn add_node(&mut self, id: i64, pos: Vec2, size: Vec2, pins: Vec<TestPin>) {
        self.editor.set_node_position(NodeId::new(id), pos);
        self.graph.nodes.push(TestNode {
            id,
            size,
            pins,
            group_size: None,
        });
    }

    /// Register a node without positioning it; the editor's persisted or
    /// default position applies.
    pub fn add_node_unpositioned(&mut self, id: i64, size: Vec2, pins: Vec<TestPin>) {
        self.graph.nodes.push(TestNode {
            id,
            size,
            pins,
            group_size: None,
        });
    }

    /// Register a group node: a header strip of `size` above an interior of
    /// `group_size`.
    pub fn add_group(&mut self, id: i64, pos: Vec2, size: Vec2, group_size: Vec2) {
        self.editor.set_node_position(NodeId::new(id), pos);
        self.graph.nodes.push(TestNode {
            id,
            size,
            pins: Vec::new(),
            group_size: Some(group_size),
        });
    }

    pub fn add_link(&mut self, id: i64, start_pin: i64, end_pin: i64) {
        self.graph.add_link(id, start_pin, end_pin);
    }

    fn make_input(&self) -> FrameInput {
        let mut input = FrameInput {
            mouse_pos: self.mouse_pos,
            wheel: self.wheel,
            modifiers: self.modifiers,
            keys: self.keys,
            window_focused: self.window_focused,
            window_hovered: true,
            window_pos: Vec2::ZERO,
            window_size: WINDOW_SIZE,
            dt: FRAME_DT,
            ..FrameInput::default()
        };
        for button in 0..4 {
            input.buttons[button].down = self.buttons_down[button];
            input.buttons[button].pressed =
                self.buttons_down[button] && !self.prev_buttons_down[button];
            input.buttons[button].released =
                !self.buttons_down[button] && self.prev_buttons_down[button];
            input.buttons[button].double_clicked = self.double_click[button];
        }
        input
    }

    fn submit_graph(editor: &mut Editor, graph: &GraphModel) {
        for node in &graph.nodes {
            editor.begin_node(NodeId::new(node.id));
            let origin = editor.node_origin();
            editor.item_rect(Rect::from_min_size(origin, node.size));
            for pin in &node.pins {
                editor.begin_pin(PinId::new(pin.id), pin.kind);
                editor.pin_rect(Rect::from_min_size(origin + pin.offset, pin.size));
                editor.end_pin();
            }
            if let Some(group_size) = node.group_size {
                // Adopt the editor-authoritative interior once it exists so
                // user resizes survive resubmission.
                let size = editor.group_size(NodeId::new(node.id)).unwrap_or(group_size);
                editor.group(size);
            }
            editor.end_node();
        }
        for link in &graph.links {
            editor.link(
                LinkId::new(link.id),
                PinId::new(link.start_pin),
                PinId::new(link.end_pin),
                Color::WHITE,
                2.0,
            );
        }
    }

    fn post_frame(&mut self) {
        self.prev_buttons_down = self.buttons_down;
        self.double_click = [false; 4];
        self.keys = KeysPressed::default();
        self.wheel = 0.0;
    }

    /// Run one frame: submit the graph, run `host` between submission and
    /// `end`, then clear one-shot input.
    pub fn frame_with(&mut self, host: impl FnOnce(&mut Editor, &mut GraphModel)) {
        let input = self.make_input();
        self.editor.begin(input);
        Self::submit_graph(&mut self.editor, &self.graph);
        host(&mut self.editor, &mut self.graph);
        self.editor.end();
        self.post_frame();
    }

    /// Run one frame with no host block.
    pub fn frame(&mut self) {
        self.frame_with(|_, _| {});
    }

    // === Gesture helpers; each runs one frame ===

    pub fn mouse_move(&mut self, pos: Vec2) {
        self.mouse_pos = pos;
        self.frame();
    }

    pub fn mouse_down(&mut self, button: usize) {
        self.buttons_down[button] = true;
        self.frame();
    }

    pub fn mouse_up(&mut self, button: usize) {
        self.buttons_down[button] = false;
        self.frame();
    }

    /// Release a button and run the host block in the same frame, the way a
    /// real host's create/delete loop sees the release.
    pub fn mouse_up_with(
        &mut self,
        button: usize,
        host: impl FnOnce(&mut Editor, &mut GraphModel),
    ) {
        self.buttons_down[button] = false;
        self.frame_with(host);
    }

    /// Move, press and release in place.
    pub fn click(&mut self, pos: Vec2, button: usize) {
        self.mouse_move(pos);
        self.mouse_down(button);
        self.mouse_up(button);
    }

    /// Press at `from`, drag to `to`, release there.
    pub fn drag(&mut self, from: Vec2, to: Vec2, button: usize) {
        self.mouse_move(from);
        self.mouse_down(button);
        self.mouse_pos = to;
        self.frame();
        self.mouse_up(button);
    }

    /// Like [`Harness::drag`] but runs `host` in the release frame.
    pub fn drag_with(
        &mut self,
        from: Vec2,
        to: Vec2,
        button: usize,
        host: impl FnOnce(&mut Editor, &mut GraphModel),
    ) {
        self.mouse_move(from);
        self.mouse_down(button);
        self.mouse_pos = to;
        self.frame();
        self.mouse_up_with(button, host);
    }

    pub fn scroll_wheel(&mut self, notches: f32) {
        self.wheel = notches;
        self.frame();
    }

    pub fn key_tap(&mut self, set: impl FnOnce(&mut KeysPressed)) {
        set(&mut self.keys);
        self.frame();
    }

    pub fn double_click_at(&mut self, pos: Vec2, button: usize) {
        self.mouse_move(pos);
        self.double_click[button] = true;
        self.frame();
    }

    // === Convenience queries ===

    pub fn node_position(&self, id: i64) -> Vec2 {
        self.editor
            .node_position(NodeId::new(id))
            .expect("node exists")
    }

    pub fn selected_node_ids(&self) -> Vec<i64> {
        self.editor
            .selected_nodes()
            .iter()
            .map(|id| id.raw())
            .collect()
    }

    pub fn selected_link_ids(&self) -> Vec<i64> {
        self.editor
            .selected_links()
            .iter()
            .map(|id| id.raw())
            .collect()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
