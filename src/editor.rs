//! The editor context: the front door the host talks to.
//!
//! A frame is bracketed by [`Editor::begin`] and [`Editor::end`]. Between
//! them the host submits nodes, pins and links, runs its query blocks
//! (create/delete/context-menu/shortcut) and reads hover state. Inside
//! `end` the editor assembles the frame's pointer targets, arbitrates
//! actions, draws everything into channels, composes and merges the display
//! list, and commits dirty settings.
//!
//! Hover and click queries reflect the state resolved by the previous
//! `end`; actions and hit tests inside `end` always see the geometry
//! submitted in the current frame.

use crate::actions::{
    next_zoom, snap_offset, AcceptResult, ActionKind, ContextMenuState, ContextMenuTarget,
    CreateQuery, CreateStage, CreateState, DeleteCandidate, DeleteState, DragState,
    NavigateState, SelectMode, SelectState, ShortcutKind, ShortcutState, SizeState,
    ACTION_PRIORITY, NAVIGATION_ZOOM_MARGIN, SELECTION_FADE_OUT_DURATION, SNAP_GRID,
    ZOOM_LEVELS,
};
use crate::animation::{FlowAnimation, FlowDirection, NavigateAnimation};
use crate::builder::{hint_alpha, resolve_pivot, HintState, NodeBuilderState};
use crate::canvas::Canvas;
use crate::config::{CanvasSizeMode, Config};
use crate::draw_list::{Color, DrawList};
use crate::geometry::{Rect, RectRegion, Vec2};
use crate::grid::{draw_grid, GRID_SPACING};
use crate::input::{Control, CursorKind, FrameInput, MouseTracker, BUTTON_COUNT};
use crate::object::{
    link_curve, LinkId, NodeId, NodeKind, ObjectId, Objects, PinId, PinKind, ValueType,
    GROUP_SELECT_THICKNESS, LINK_SELECT_THICKNESS,
};
use crate::settings::{DirtyReason, Settings};
use crate::style::{Style, StyleColor, StyleStacks, StyleVar, VarValue};

// Channel layout: a fixed prefix of shared channels followed by one
// five-channel block per submitted node.
pub(crate) const USER_CHANNEL_CONTENT: usize = 0;
pub(crate) const USER_CHANNEL_GRID: usize = 1;
pub(crate) const USER_CHANNEL_HINTS_BACKGROUND: usize = 2;
pub(crate) const USER_CHANNEL_HINTS_FOREGROUND: usize = 3;
pub(crate) const BACKGROUND_CHANNEL_SEL_RECT: usize = 4;
pub(crate) const LINK_CHANNEL_SELECTION: usize = 5;
pub(crate) const LINK_CHANNEL_LINKS: usize = 6;
pub(crate) const LINK_CHANNEL_FLOW: usize = 7;
pub(crate) const LINK_CHANNEL_NEW_LINK: usize = 8;
pub(crate) const NODE_START_CHANNEL: usize = 9;
pub(crate) const CHANNELS_PER_NODE: usize = 5;
pub(crate) const NODE_BASE_CHANNEL: usize = 0;
pub(crate) const NODE_BACKGROUND_CHANNEL: usize = 1;
pub(crate) const NODE_USER_BACKGROUND_CHANNEL: usize = 2;
pub(crate) const NODE_PIN_CHANNEL: usize = 3;
pub(crate) const NODE_CONTENT_CHANNEL: usize = 4;

/// The interactive node-graph editor core.
pub struct Editor {
    config: Config,
    style: Style,
    style_stacks: StyleStacks,
    objects: Objects,
    settings: Settings,
    draw: DrawList,

    scroll: Vec2,
    zoom: f32,
    canvas: Canvas,

    frame_active: bool,
    first_frame: bool,
    input: FrameInput,
    prev_window_size: Vec2,
    mouse: MouseTracker,
    control: Control,
    pressed_object: [Option<ObjectId>; BUTTON_COUNT],
    pressed_background: [bool; BUTTON_COUNT],
    cursor: CursorKind,

    builder: NodeBuilderState,
    hint: HintState,
    /// Live node arena indices in submission order, this frame.
    node_order: Vec<usize>,
    /// Live link arena indices in submission order, this frame.
    link_order: Vec<usize>,

    current_action: Option<ActionKind>,
    nav: NavigateState,
    size_action: SizeState,
    drag_action: DragState,
    select_action: SelectState,
    context_menu: ContextMenuState,
    shortcut: ShortcutState,
    create_action: CreateState,
    delete_action: DeleteState,

    selection: Vec<ObjectId>,
    last_selection: Vec<ObjectId>,
    selection_id: u64,
    selection_changed: bool,
    pending_selection_restore: Option<Vec<i64>>,

    flows: Vec<FlowAnimation>,

    shortcuts_enabled: bool,
    suspend_count: u32,
}

impl Editor {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            style: Style::default(),
            style_stacks: StyleStacks::default(),
            objects: Objects::new(),
            settings: Settings::new(),
            draw: DrawList::new(),
            scroll: Vec2::ZERO,
            zoom: 1.0,
            canvas: Canvas::default(),
            frame_active: false,
            first_frame: true,
            input: FrameInput::default(),
            prev_window_size: Vec2::ZERO,
            mouse: MouseTracker::default(),
            control: Control::default(),
            pressed_object: [None; BUTTON_COUNT],
            pressed_background: [false; BUTTON_COUNT],
            cursor: CursorKind::Arrow,
            builder: NodeBuilderState::default(),
            hint: HintState::default(),
            node_order: Vec::new(),
            link_order: Vec::new(),
            current_action: None,
            nav: NavigateState::default(),
            size_action: SizeState::default(),
            drag_action: DragState::default(),
            select_action: SelectState::default(),
            context_menu: ContextMenuState::default(),
            shortcut: ShortcutState::default(),
            create_action: CreateState::default(),
            delete_action: DeleteState::default(),
            selection: Vec::new(),
            last_selection: Vec::new(),
            selection_id: 0,
            selection_changed: false,
            pending_selection_restore: None,
            flows: Vec::new(),
            shortcuts_enabled: true,
            suspend_count: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    pub fn push_style_color(&mut self, which: StyleColor, color: Color) {
        self.style_stacks.push_color(&mut self.style, which, color);
    }

    pub fn pop_style_color(&mut self, count: usize) {
        self.style_stacks.pop_color(&mut self.style, count);
    }

    pub fn push_style_var(&mut self, var: StyleVar, value: VarValue) {
        self.style_stacks.push_var(&mut self.style, var, value);
    }

    pub fn pop_style_var(&mut self, count: usize) {
        self.style_stacks.pop_var(&mut self.style, count);
    }

    /// Fresh editor-generated id, persisted through the settings counter.
    pub fn generate_id(&mut self) -> i64 {
        self.settings.generator_state += 1;
        self.settings.make_dirty(DirtyReason::USER, None);
        self.settings.generator_state as i64
    }

    // === Frame lifecycle ===

    pub fn begin(&mut self, input: FrameInput) {
        debug_assert!(!self.frame_active, "begin without matching end");

        if self.first_frame {
            self.load_settings();
        }

        self.handle_window_resize(input.window_size);

        self.frame_active = true;
        self.input = input;
        self.mouse.begin_frame(&self.input);
        self.rebuild_canvas();

        self.objects.reset_frame();
        self.node_order.clear();
        self.link_order.clear();
        self.builder.reset();
        self.hint = HintState::default();
        self.cursor = CursorKind::Arrow;

        self.draw.clear();
        self.draw.push_clip_rect(self.canvas.window_rect(), false);
        self.draw.channels_grow(NODE_START_CHANNEL);

        self.draw_background_and_grid();
        self.draw.set_current_channel(USER_CHANNEL_CONTENT);
    }

    pub fn end(&mut self) {
        debug_assert!(self.frame_active, "end without matching begin");
        debug_assert!(!self.builder.in_node(), "end inside an open node");
        debug_assert!(self.suspend_count == 0, "end while suspended");
        debug_assert!(
            self.style_stacks.is_balanced(),
            "unbalanced style push/pop at end of frame"
        );

        // Last frame's shortcut had its one-frame window; retire it.
        self.shortcut.active = None;

        self.assemble_control();

        self.advance_navigate_animation();
        self.handle_wheel_zoom();
        self.handle_navigation_keys();

        self.dispatch_actions();

        self.advance_flows();
        self.draw_frame();

        self.restore_selection_if_pending();
        self.detect_selection_change();

        self.compose_and_merge();
        self.run_save_cycle();

        self.prev_window_size = self.input.window_size;
        self.first_frame = false;
        self.frame_active = false;
    }

    /// Whether an action is processing input this frame.
    pub fn is_active(&self) -> bool {
        self.current_action.is_some()
    }

    pub fn cursor(&self) -> CursorKind {
        self.cursor
    }

    /// The display list with this frame's merged output. Valid after `end`.
    pub fn draw_list(&self) -> &DrawList {
        &self.draw
    }

    // === View ===

    pub fn current_zoom(&self) -> f32 {
        self.zoom
    }

    pub fn screen_size(&self) -> Vec2 {
        self.input.window_size
    }

    pub fn screen_to_canvas(&self, p: Vec2) -> Vec2 {
        self.canvas.from_screen(p)
    }

    pub fn canvas_to_screen(&self, p: Vec2) -> Vec2 {
        self.canvas.to_screen(p)
    }

    pub fn visible_bounds(&self) -> Rect {
        self.canvas.visible_bounds()
    }

    pub fn navigate_to_content(&mut self, duration: Option<f32>) {
        let bounds = self.content_bounds();
        self.navigate_to_bounds(bounds, true, duration);
    }

    pub fn navigate_to_selection(&mut self, zoom_in: bool, duration: Option<f32>) {
        let bounds = self.selection_bounds();
        if bounds.is_empty() {
            self.navigate_to_content(duration);
        } else {
            self.navigate_to_bounds(bounds, zoom_in, duration);
        }
    }

    // === Node state ===

    pub fn set_node_position(&mut self, id: NodeId, position: Vec2) {
        let index = self.ensure_node(id);
        let delta = position - self.objects.nodes[index].full_bounds().min;
        let node = &mut self.objects.nodes[index];
        node.bounds = node.bounds.translated(delta);
        node.group_bounds = node.group_bounds.translated(delta);

        let full = self.objects.nodes[index].full_bounds();
        let record = self.settings.node_mut(id);
        record.location = full.min;
        self.settings.make_dirty(DirtyReason::POSITION, Some(id));
    }

    pub fn node_position(&self, id: NodeId) -> Option<Vec2> {
        self.objects
            .find_node(id)
            .map(|index| self.objects.nodes[index].full_bounds().min)
    }

    pub fn node_size(&self, id: NodeId) -> Option<Vec2> {
        self.objects
            .find_node(id)
            .map(|index| self.objects.nodes[index].full_bounds().size())
    }

    /// Interior size of a group node, if `id` names one.
    pub fn group_size(&self, id: NodeId) -> Option<Vec2> {
        self.objects.find_node(id).and_then(|index| {
            let node = &self.objects.nodes[index];
            node.is_group().then(|| node.group_bounds.size())
        })
    }

    pub fn set_group_size(&mut self, id: NodeId, size: Vec2) {
        let index = self.ensure_node(id);
        let node = &mut self.objects.nodes[index];
        node.kind = NodeKind::Group;
        node.group_bounds = Rect::from_min_size(node.group_bounds.min, size);
        let record = self.settings.node_mut(id);
        record.group_size = Some(size);
        self.settings.make_dirty(DirtyReason::SIZE, Some(id));
    }

    pub fn center_node_on_screen(&mut self, id: NodeId) {
        let index = self.ensure_node(id);
        self.objects.nodes[index].center_on_screen_pending = true;
    }

    pub fn set_node_z_position(&mut self, id: NodeId, z: f32) {
        let index = self.ensure_node(id);
        self.objects.nodes[index].z_position = z;
    }

    pub fn node_z_position(&self, id: NodeId) -> f32 {
        self.objects
            .find_node(id)
            .map(|index| self.objects.nodes[index].z_position)
            .unwrap_or(0.0)
    }

    /// Re-apply persisted state to `id` on its next submission.
    pub fn restore_node_state(&mut self, id: NodeId) {
        let index = self.ensure_node(id);
        self.objects.nodes[index].restore_state_pending = true;
    }

    /// Number of nodes submitted since `begin`.
    pub fn node_count(&self) -> usize {
        self.node_order.len()
    }

    /// Node ids in the order they are drawn: groups first, then regular
    /// nodes, ascending z within each class.
    pub fn ordered_node_ids(&self) -> Vec<NodeId> {
        let order = self.objects.nodes_in_draw_order();
        let (groups, regular): (Vec<usize>, Vec<usize>) = order
            .into_iter()
            .partition(|&index| self.objects.nodes[index].is_group());
        groups
            .into_iter()
            .chain(regular)
            .map(|index| self.objects.nodes[index].id)
            .collect()
    }

    // === Submission: nodes and pins ===

    pub fn begin_node(&mut self, id: NodeId) {
        debug_assert!(self.frame_active, "begin_node outside a frame");
        debug_assert!(!self.builder.in_node(), "begin_node inside an open node");

        let index = self.ensure_node(id);

        if self.objects.nodes[index].restore_state_pending {
            self.apply_node_settings(index);
            self.objects.nodes[index].restore_state_pending = false;
        }

        let channel = NODE_START_CHANNEL + self.node_order.len() * CHANNELS_PER_NODE;
        self.draw.channels_grow(channel + CHANNELS_PER_NODE);

        let node = &mut self.objects.nodes[index];
        node.live = true;
        node.channel = channel;
        node.pins.clear();
        node.color = self.style.color(StyleColor::NodeBg);
        node.border_color = self.style.color(StyleColor::NodeBorder);
        node.border_width = self.style.node_border_width;
        node.rounding = self.style.node_rounding;
        node.group_color = self.style.color(StyleColor::GroupBg);
        node.group_border_color = self.style.color(StyleColor::GroupBorder);
        node.group_border_width = self.style.group_border_width;
        node.group_rounding = self.style.group_rounding;

        self.node_order.push(index);

        self.builder.reset();
        self.builder.node = Some(index);
        self.builder.origin = self.objects.nodes[index].bounds.min;
        self.builder.content_bounds = Rect::NOTHING;
        self.builder.previous_size = self.objects.nodes[index].full_bounds().size();

        self.draw.set_current_channel(channel + NODE_CONTENT_CHANNEL);
    }

    pub fn end_node(&mut self) {
        debug_assert!(self.builder.in_node(), "end_node without begin_node");
        debug_assert!(!self.builder.in_pin(), "end_node inside an open pin");
        let Some(index) = self.builder.node else {
            return;
        };

        let origin = self.builder.origin;
        let content = if self.builder.content_bounds == Rect::NOTHING {
            Rect::from_min_size(origin, Vec2::ZERO)
        } else {
            self.builder.content_bounds
        };

        {
            let node = &mut self.objects.nodes[index];
            node.bounds = content;
            if let Some(size) = self.builder.group_size {
                node.kind = NodeKind::Group;
                let interior_top = if self.builder.content_bounds == Rect::NOTHING {
                    origin.y
                } else {
                    content.max.y
                };
                node.group_bounds =
                    Rect::from_min_size(Vec2::new(origin.x, interior_top), size);
            }
        }

        let id = self.objects.nodes[index].id;
        let full = self.objects.nodes[index].full_bounds();
        let group_size = if self.objects.nodes[index].is_group() {
            Some(self.objects.nodes[index].group_bounds.size())
        } else {
            None
        };

        let record = self.settings.node_mut(id);
        record.location = full.min;
        record.group_size = group_size;
        let size_changed = record.size != full.size();
        record.size = full.size();
        if size_changed {
            self.settings.make_dirty(DirtyReason::SIZE, Some(id));
        }

        if self.objects.nodes[index].center_on_screen_pending {
            self.objects.nodes[index].center_on_screen_pending = false;
            self.scroll = full.center() * self.zoom - self.input.window_size * 0.5;
            self.rebuild_canvas();
            self.settings.make_dirty(DirtyReason::NAVIGATION, None);
        }

        self.builder.reset();
        self.draw.set_current_channel(USER_CHANNEL_CONTENT);
    }

    /// Editor-space origin the host should lay node content out from.
    pub fn node_origin(&self) -> Vec2 {
        self.builder.origin
    }

    pub fn begin_pin(&mut self, id: PinId, kind: PinKind) {
        debug_assert!(self.builder.in_node(), "begin_pin outside a node");
        debug_assert!(!self.builder.in_pin(), "begin_pin inside an open pin");
        let Some(node_index) = self.builder.node else {
            return;
        };

        let pin_index = self.objects.get_or_create_pin(id, kind, node_index);
        {
            let pin = &mut self.objects.pins[pin_index];
            pin.live = true;
            pin.direction = match kind {
                PinKind::Output => self.style.source_direction,
                PinKind::Input => self.style.target_direction,
            };
            pin.strength = self.style.link_strength;
            pin.radius = self.style.pin_radius;
            pin.arrow_size = self.style.pin_arrow_size;
            pin.arrow_width = self.style.pin_arrow_width;
            pin.corners = self.style.pin_corners;
            pin.rounding = self.style.pin_rounding;
            pin.border_width = self.style.pin_border_width;
            pin.color = self.style.color(StyleColor::PinRect);
            pin.border_color = self.style.color(StyleColor::PinRectBorder);
        }
        self.objects.nodes[node_index].pins.push(pin_index);
        self.builder.pin = Some(pin_index);
    }

    pub fn end_pin(&mut self) {
        debug_assert!(self.builder.in_pin(), "end_pin without begin_pin");
        let Some(pin_index) = self.builder.pin else {
            return;
        };

        let bounds = self
            .builder
            .pin_rect
            .unwrap_or(Rect::from_min_size(self.builder.origin, Vec2::ZERO));
        let pivot = resolve_pivot(bounds, &self.style, &self.builder.pivot);

        let pin = &mut self.objects.pins[pin_index];
        pin.bounds = bounds;
        pin.pivot = pivot;

        self.builder.reset_pin();
    }

    /// Report the pin's laid-out rectangle in editor space.
    pub fn pin_rect(&mut self, rect: Rect) {
        debug_assert!(self.builder.in_pin(), "pin_rect outside a pin");
        self.builder.pin_rect = Some(rect);
        self.builder.add_item_rect(rect);
    }

    pub fn pin_pivot_rect(&mut self, a: Vec2, b: Vec2) {
        debug_assert!(self.builder.in_pin(), "pin_pivot_rect outside a pin");
        self.builder.pivot.rect = Some(Rect::from_min_max(a.min(b), a.max(b)));
    }

    pub fn pin_pivot_size(&mut self, size: Vec2) {
        debug_assert!(self.builder.in_pin(), "pin_pivot_size outside a pin");
        self.builder.pivot.size = Some(size);
    }

    pub fn pin_pivot_scale(&mut self, scale: Vec2) {
        debug_assert!(self.builder.in_pin(), "pin_pivot_scale outside a pin");
        self.builder.pivot.scale = Some(scale);
    }

    pub fn pin_pivot_alignment(&mut self, alignment: Vec2) {
        debug_assert!(self.builder.in_pin(), "pin_pivot_alignment outside a pin");
        self.builder.pivot.alignment = Some(alignment);
    }

    /// Tag the pin with a value type used by link compatibility checks.
    pub fn pin_value_type(&mut self, value_type: ValueType) {
        if let Some(pin_index) = self.builder.pin {
            self.objects.pins[pin_index].value_type = value_type;
        }
    }

    /// Report an arbitrary content rectangle so the node measures around it.
    pub fn item_rect(&mut self, rect: Rect) {
        debug_assert!(self.builder.in_node(), "item_rect outside a node");
        self.builder.add_item_rect(rect);
    }

    /// Mark the node as a group with an interior of `size`.
    pub fn group(&mut self, size: Vec2) {
        debug_assert!(self.builder.in_node(), "group outside a node");
        self.builder.group_size = Some(size);
    }

    /// Draw into the node's background channel (under host content).
    pub fn node_background_draw_list(&mut self, id: NodeId) -> Option<&mut DrawList> {
        let index = self.objects.find_node(id)?;
        let node = &self.objects.nodes[index];
        if !node.live {
            return None;
        }
        self.draw
            .set_current_channel(node.channel + NODE_USER_BACKGROUND_CHANNEL);
        Some(&mut self.draw)
    }

    // === Submission: links ===

    /// Submit a link between two live pins. Returns false if either pin is
    /// unknown.
    pub fn link(
        &mut self,
        id: LinkId,
        start_pin: PinId,
        end_pin: PinId,
        color: Color,
        thickness: f32,
    ) -> bool {
        debug_assert!(self.frame_active, "link outside a frame");
        let (Some(start), Some(end)) =
            (self.objects.find_pin(start_pin), self.objects.find_pin(end_pin))
        else {
            return false;
        };
        if !self.objects.pins[start].live || !self.objects.pins[end].live {
            return false;
        }

        let index = self.objects.get_or_create_link(id);
        {
            let link = &mut self.objects.links[index];
            link.live = true;
            link.start_pin = start;
            link.end_pin = end;
            link.color = color;
            link.thickness = thickness.max(0.5);
        }
        self.objects.pins[start].has_connection = true;
        self.objects.pins[end].has_connection = true;
        self.objects.update_link_endpoints(index);
        self.link_order.push(index);
        true
    }

    /// Trigger a flow pulse along a live link.
    pub fn flow(&mut self, id: LinkId, direction: FlowDirection) {
        let duration = self.style.flow_duration;
        if let Some(existing) = self.flows.iter_mut().find(|flow| flow.link == id) {
            existing.retrigger(direction, duration);
        } else {
            self.flows.push(FlowAnimation::new(id, direction, duration));
        }
    }

    pub fn link_pins_of(&self, id: LinkId) -> Option<(PinId, PinId)> {
        let index = self.objects.find_link(id)?;
        let link = &self.objects.links[index];
        Some((
            self.objects.pins[link.start_pin].id,
            self.objects.pins[link.end_pin].id,
        ))
    }

    pub fn has_any_node_links(&self, id: NodeId) -> bool {
        self.objects
            .find_node(id)
            .map(|index| !self.objects.links_of_node(index).is_empty())
            .unwrap_or(false)
    }

    pub fn has_any_pin_links(&self, id: PinId) -> bool {
        self.objects
            .find_pin(id)
            .map(|index| !self.objects.links_of_pin(index).is_empty())
            .unwrap_or(false)
    }

    /// Whether the pin has ever had a connection, as of the last frame
    /// boundary.
    pub fn pin_had_any_links(&self, id: PinId) -> bool {
        self.objects
            .find_pin(id)
            .map(|index| self.objects.pins[index].had_connection)
            .unwrap_or(false)
    }

    /// Immediately break all links touching a node; returns how many.
    pub fn break_node_links(&mut self, id: NodeId) -> usize {
        let Some(index) = self.objects.find_node(id) else {
            return 0;
        };
        let links = self.objects.links_of_node(index);
        self.break_links(&links)
    }

    /// Immediately break all links touching a pin; returns how many.
    pub fn break_pin_links(&mut self, id: PinId) -> usize {
        let Some(index) = self.objects.find_pin(id) else {
            return 0;
        };
        let links = self.objects.links_of_pin(index);
        self.break_links(&links)
    }

    fn break_links(&mut self, link_indices: &[usize]) -> usize {
        let ids: Vec<LinkId> = link_indices
            .iter()
            .map(|&index| self.objects.links[index].id)
            .collect();
        for id in &ids {
            self.remove_link_object(*id);
        }
        ids.len()
    }

    // === Create protocol ===

    /// Enter the create query block; true while a create interaction is in
    /// flight.
    pub fn begin_create(&mut self, color: Color, thickness: f32) -> bool {
        debug_assert!(self.frame_active, "begin_create outside a frame");
        self.create_action.in_block = true;
        self.create_action.color = color;
        self.create_action.thickness = thickness.max(0.5);
        self.create_action.stage != CreateStage::None
    }

    /// While a candidate link spans two pins, the (provider, receiver)
    /// ordered pair. Compatibility is not judged here.
    pub fn query_new_link(&mut self) -> Option<(PinId, PinId)> {
        debug_assert!(self.create_action.in_block, "query outside begin_create");
        if self.create_action.stage != CreateStage::Possible {
            return None;
        }
        let origin = self.create_action.origin_pin?;
        let candidate = self.create_action.candidate_pin?;
        self.create_action.last_query = Some(CreateQuery::Link);

        let origin_kind = self
            .objects
            .find_pin(origin)
            .map(|index| self.objects.pins[index].kind);
        // Output side first when kinds differ; origin first otherwise.
        let candidate_kind = self
            .objects
            .find_pin(candidate)
            .map(|index| self.objects.pins[index].kind);
        match (origin_kind, candidate_kind) {
            (Some(PinKind::Input), Some(PinKind::Output)) => Some((candidate, origin)),
            _ => Some((origin, candidate)),
        }
    }

    /// While the candidate endpoint floats over empty canvas, the origin pin.
    pub fn query_new_node(&mut self) -> Option<PinId> {
        debug_assert!(self.create_action.in_block, "query outside begin_create");
        if self.create_action.stage != CreateStage::Possible {
            return None;
        }
        if self.create_action.candidate_pin.is_some() {
            return None;
        }
        self.create_action.last_query = Some(CreateQuery::Node);
        self.create_action.origin_pin
    }

    /// Accept the last queried item. For a link query this validates
    /// compatibility and returns false when the pins cannot be joined.
    pub fn accept_new_item(&mut self) -> bool {
        debug_assert!(self.create_action.in_block, "accept outside begin_create");
        match self.create_action.last_query {
            Some(CreateQuery::Link) => {
                let (Some(origin), Some(candidate)) = (
                    self.create_action.origin_pin,
                    self.create_action.candidate_pin,
                ) else {
                    return false;
                };
                let (Some(a), Some(b)) = (
                    self.objects.find_pin(origin),
                    self.objects.find_pin(candidate),
                ) else {
                    return false;
                };
                if self
                    .objects
                    .can_link(a, b, self.config.accept_link.as_ref())
                    .is_err()
                {
                    return false;
                }
                self.create_action.reset();
                true
            }
            Some(CreateQuery::Node) => {
                self.create_action.stage = CreateStage::Create;
                true
            }
            None => false,
        }
    }

    /// Decline the last queried item; the interaction continues.
    pub fn reject_new_item(&mut self) {
        debug_assert!(self.create_action.in_block, "reject outside begin_create");
        self.create_action.last_query = None;
    }

    pub fn end_create(&mut self) {
        debug_assert!(self.create_action.in_block, "end_create without begin");
        self.create_action.in_block = false;
        self.create_action.last_query = None;
    }

    // === Delete protocol ===

    /// Queue a node for deletion through the delete protocol.
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        if self.objects.find_node(id).is_none() {
            return false;
        }
        self.delete_action.queue_node(id);
        true
    }

    /// Queue a link for deletion through the delete protocol.
    pub fn delete_link(&mut self, id: LinkId) -> bool {
        if self.objects.find_link(id).is_none() {
            return false;
        }
        self.delete_action.queue_link(id);
        true
    }

    /// Enter the delete query block; true when anything is queued.
    pub fn begin_delete(&mut self) -> bool {
        debug_assert!(self.frame_active, "begin_delete outside a frame");
        self.delete_action.in_block = true;

        // Queue link dependencies up front so links are always served before
        // the nodes that own their pins.
        let queued_nodes = self.delete_action.node_queue.clone();
        for node_id in queued_nodes {
            if let Some(index) = self.objects.find_node(node_id) {
                for link_index in self.objects.links_of_node(index) {
                    let link_id = self.objects.links[link_index].id;
                    self.delete_action.queue_link(link_id);
                }
            }
        }

        !self.delete_action.is_empty()
    }

    /// Next link queued for deletion, if any. Links drain before nodes.
    pub fn query_deleted_link(&mut self) -> Option<LinkId> {
        debug_assert!(self.delete_action.in_block, "query outside begin_delete");
        while !self.delete_action.link_queue.is_empty() {
            let id = self.delete_action.link_queue.remove(0);
            if self.objects.find_link(id).is_some() {
                self.delete_action.current = Some(DeleteCandidate::Link(id));
                return Some(id);
            }
        }
        None
    }

    /// Next node queued for deletion, if any.
    pub fn query_deleted_node(&mut self) -> Option<NodeId> {
        debug_assert!(self.delete_action.in_block, "query outside begin_delete");
        while !self.delete_action.node_queue.is_empty() {
            let id = self.delete_action.node_queue.remove(0);
            if self.objects.find_node(id).is_some() {
                self.delete_action.current = Some(DeleteCandidate::Node(id));
                return Some(id);
            }
        }
        None
    }

    /// Confirm deletion of the current candidate. For nodes,
    /// `delete_dependencies` additionally queues every link still touching
    /// the node; those are offered through later link queries.
    pub fn accept_deleted_item(&mut self, delete_dependencies: bool) -> bool {
        debug_assert!(self.delete_action.in_block, "accept outside begin_delete");
        let Some(candidate) = self.delete_action.current.take() else {
            return false;
        };
        match candidate {
            DeleteCandidate::Link(id) => {
                self.remove_link_object(id);
            }
            DeleteCandidate::Node(id) => {
                if delete_dependencies {
                    if let Some(index) = self.objects.find_node(id) {
                        for link_index in self.objects.links_of_node(index) {
                            let link_id = self.objects.links[link_index].id;
                            self.delete_action.queue_link(link_id);
                        }
                    }
                }
                self.objects.remove_node(id);
                self.settings.remove_node(id);
                self.selection.retain(|obj| *obj != ObjectId::Node(id));
                self.settings.make_dirty(DirtyReason::REMOVE_NODE, None);
            }
        }
        true
    }

    /// Leave the current candidate alone.
    pub fn reject_deleted_item(&mut self) {
        debug_assert!(self.delete_action.in_block, "reject outside begin_delete");
        self.delete_action.current = None;
    }

    pub fn end_delete(&mut self) {
        debug_assert!(self.delete_action.in_block, "end_delete without begin");
        self.delete_action.in_block = false;
        self.delete_action.current = None;
    }

    // === Selection ===

    pub fn has_selection_changed(&self) -> bool {
        self.selection_changed
    }

    pub fn selection_id(&self) -> u64 {
        self.selection_id
    }

    pub fn selected_object_count(&self) -> usize {
        self.selection.len()
    }

    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.selection
            .iter()
            .filter_map(|obj| obj.as_node())
            .collect()
    }

    pub fn selected_links(&self) -> Vec<LinkId> {
        self.selection
            .iter()
            .filter_map(|obj| obj.as_link())
            .collect()
    }

    pub fn is_node_selected(&self, id: NodeId) -> bool {
        self.selection.contains(&ObjectId::Node(id))
    }

    pub fn is_link_selected(&self, id: LinkId) -> bool {
        self.selection.contains(&ObjectId::Link(id))
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn select_node(&mut self, id: NodeId, append: bool) {
        self.select_object(ObjectId::Node(id), append);
    }

    pub fn select_link(&mut self, id: LinkId, append: bool) {
        self.select_object(ObjectId::Link(id), append);
    }

    pub fn deselect_node(&mut self, id: NodeId) {
        self.selection.retain(|obj| *obj != ObjectId::Node(id));
    }

    pub fn deselect_link(&mut self, id: LinkId) {
        self.selection.retain(|obj| *obj != ObjectId::Link(id));
    }

    fn select_object(&mut self, object: ObjectId, append: bool) {
        if !append {
            self.selection.clear();
        } else {
            // Selections stay homogeneous: a mix of nodes and links clears
            // the older class first.
            let mixing = match object {
                ObjectId::Node(_) => self.selection.iter().any(|o| o.as_link().is_some()),
                ObjectId::Link(_) => self.selection.iter().any(|o| o.as_node().is_some()),
                ObjectId::Pin(_) => false,
            };
            if mixing {
                self.selection.clear();
            }
        }
        if !self.selection.contains(&object) {
            self.selection.push(object);
        }
    }

    // === Context menu ===

    pub fn show_node_context_menu(&mut self) -> Option<NodeId> {
        match self.context_menu.pending {
            Some(ContextMenuTarget::Node(id)) => {
                self.context_menu.pending = None;
                Some(id)
            }
            _ => None,
        }
    }

    pub fn show_pin_context_menu(&mut self) -> Option<PinId> {
        match self.context_menu.pending {
            Some(ContextMenuTarget::Pin(id)) => {
                self.context_menu.pending = None;
                Some(id)
            }
            _ => None,
        }
    }

    pub fn show_link_context_menu(&mut self) -> Option<LinkId> {
        match self.context_menu.pending {
            Some(ContextMenuTarget::Link(id)) => {
                self.context_menu.pending = None;
                Some(id)
            }
            _ => None,
        }
    }

    pub fn show_background_context_menu(&mut self) -> bool {
        if self.context_menu.pending == Some(ContextMenuTarget::Background) {
            self.context_menu.pending = None;
            true
        } else {
            false
        }
    }

    // === Shortcuts ===

    pub fn enable_shortcuts(&mut self, enable: bool) {
        self.shortcuts_enabled = enable;
    }

    pub fn are_shortcuts_enabled(&self) -> bool {
        self.shortcuts_enabled
    }

    /// True when a shortcut fired and awaits the host's response.
    pub fn begin_shortcut(&mut self) -> bool {
        self.shortcut.in_block = true;
        self.shortcut.active.is_some()
    }

    pub fn accept_cut(&self) -> bool {
        self.shortcut.active == Some(ShortcutKind::Cut)
    }

    pub fn accept_copy(&self) -> bool {
        self.shortcut.active == Some(ShortcutKind::Copy)
    }

    pub fn accept_paste(&self) -> bool {
        self.shortcut.active == Some(ShortcutKind::Paste)
    }

    pub fn accept_duplicate(&self) -> bool {
        self.shortcut.active == Some(ShortcutKind::Duplicate)
    }

    pub fn accept_create_node(&self) -> bool {
        self.shortcut.active == Some(ShortcutKind::CreateNode)
    }

    pub fn action_context_size(&self) -> usize {
        self.shortcut.context_nodes.len() + self.shortcut.context_links.len()
    }

    pub fn action_context_nodes(&self) -> &[NodeId] {
        &self.shortcut.context_nodes
    }

    pub fn action_context_links(&self) -> &[LinkId] {
        &self.shortcut.context_links
    }

    pub fn end_shortcut(&mut self) {
        self.shortcut.in_block = false;
    }

    // === Hover queries (state as of the last `end`) ===

    pub fn hovered_node(&self) -> Option<NodeId> {
        self.control.hot_node()
    }

    pub fn hovered_pin(&self) -> Option<PinId> {
        self.control.hot_pin()
    }

    pub fn hovered_link(&self) -> Option<LinkId> {
        self.control.hot_link()
    }

    pub fn double_clicked_node(&self) -> Option<NodeId> {
        self.control.double_clicked_node()
    }

    pub fn double_clicked_pin(&self) -> Option<PinId> {
        self.control.double_clicked_pin()
    }

    pub fn double_clicked_link(&self) -> Option<LinkId> {
        self.control.double_clicked_link()
    }

    pub fn is_background_clicked(&self) -> bool {
        self.control.background_clicked.is_some()
    }

    pub fn is_background_double_clicked(&self) -> bool {
        self.control.background_double_clicked.is_some()
    }

    pub fn background_click_button_index(&self) -> Option<usize> {
        self.control.background_clicked
    }

    pub fn background_double_click_button_index(&self) -> Option<usize> {
        self.control.background_double_clicked
    }

    // === Group hints ===

    /// Begin the zoomed-out hint overlay for a group; true when the hint is
    /// visible at the current zoom.
    pub fn begin_group_hint(&mut self, id: NodeId) -> bool {
        debug_assert!(self.hint.node.is_none(), "nested group hint");
        if self.zoom >= crate::builder::HINT_ZOOM_THRESHOLD {
            return false;
        }
        let Some(index) = self.objects.find_node(id) else {
            return false;
        };
        if !self.objects.nodes[index].live || !self.objects.nodes[index].is_group() {
            return false;
        }
        self.hint.node = Some(index);
        true
    }

    /// Screen-space top-left of the hinted group.
    pub fn group_min(&self) -> Vec2 {
        self.hint
            .node
            .map(|index| {
                self.canvas
                    .to_screen(self.objects.nodes[index].full_bounds().min)
            })
            .unwrap_or(Vec2::ZERO)
    }

    /// Screen-space bottom-right of the hinted group.
    pub fn group_max(&self) -> Vec2 {
        self.hint
            .node
            .map(|index| {
                self.canvas
                    .to_screen(self.objects.nodes[index].full_bounds().max)
            })
            .unwrap_or(Vec2::ZERO)
    }

    /// Hint opacity at the current zoom.
    pub fn group_hint_alpha(&self) -> f32 {
        hint_alpha(self.zoom)
    }

    /// Hint channels stay in screen space; draw the hint frame here.
    pub fn hint_background_draw_list(&mut self) -> &mut DrawList {
        self.draw
            .set_current_channel(USER_CHANNEL_HINTS_BACKGROUND);
        &mut self.draw
    }

    pub fn hint_foreground_draw_list(&mut self) -> &mut DrawList {
        self.draw
            .set_current_channel(USER_CHANNEL_HINTS_FOREGROUND);
        &mut self.draw
    }

    pub fn end_group_hint(&mut self) {
        self.hint.node = None;
        self.draw.set_current_channel(USER_CHANNEL_CONTENT);
    }

    // === Suspension ===

    pub fn suspend(&mut self) {
        debug_assert!(self.frame_active, "suspend outside a frame");
        self.suspend_count += 1;
    }

    pub fn resume(&mut self) {
        debug_assert!(self.suspend_count > 0, "resume without suspend");
        self.suspend_count = self.suspend_count.saturating_sub(1);
    }

    pub fn is_suspended(&self) -> bool {
        self.suspend_count > 0
    }

    // === Pin-level links ===

    /// Check link compatibility between two pins.
    pub fn can_link(&self, a: PinId, b: PinId) -> Result<crate::object::LinkAccept, crate::object::LinkRejection> {
        let (Some(ai), Some(bi)) = (self.objects.find_pin(a), self.objects.find_pin(b)) else {
            return Err(crate::object::LinkRejection::SameNode);
        };
        self.objects.can_link(ai, bi, self.config.accept_link.as_ref())
    }

    /// Join two pins at the pin level (receiver keeps the reference).
    pub fn pin_link(&mut self, a: PinId, b: PinId) -> Result<crate::object::LinkAccept, crate::object::LinkRejection> {
        let (Some(ai), Some(bi)) = (self.objects.find_pin(a), self.objects.find_pin(b)) else {
            return Err(crate::object::LinkRejection::SameNode);
        };
        self.objects.link_pins(
            ai,
            bi,
            self.config.accept_link.as_ref(),
            self.config.link_notify.as_mut(),
        )
    }

    /// Break a receiver pin's outgoing reference.
    pub fn pin_unlink(&mut self, receiver: PinId) {
        if let Some(index) = self.objects.find_pin(receiver) {
            self.objects
                .unlink_pin(index, self.config.link_notify.as_mut());
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn zoom_levels(&self) -> &[f32] {
        if self.config.custom_zoom_levels.is_empty() {
            &ZOOM_LEVELS
        } else {
            &self.config.custom_zoom_levels
        }
    }

    fn rebuild_canvas(&mut self) {
        self.canvas = Canvas::new(
            self.input.window_pos,
            self.input.window_size,
            Vec2::splat(self.zoom),
            -self.scroll,
            true,
        );
    }

    fn mouse_canvas(&self) -> Vec2 {
        self.canvas.from_screen(self.input.mouse_pos)
    }

    fn load_settings(&mut self) {
        let Some(backend) = self.config.settings_backend.as_mut() else {
            return;
        };
        let Some(json) = backend.load() else {
            return;
        };
        match Settings::from_json(&json) {
            Ok(loaded) => {
                self.scroll = loaded.view.scroll;
                self.zoom = loaded.view.zoom;
                self.pending_selection_restore = Some(loaded.selection.clone());
                self.settings = loaded;
                log::debug!("settings loaded: zoom {}, scroll {:?}", self.zoom, self.scroll);
            }
            Err(err) => {
                log::warn!("ignoring malformed settings: {err}");
            }
        }
    }

    fn handle_window_resize(&mut self, new_size: Vec2) {
        let old = self.prev_window_size;
        if self.first_frame || old == new_size || old == Vec2::ZERO || new_size == Vec2::ZERO {
            return;
        }
        let center_canvas = self.canvas.from_screen(
            self.canvas.window_screen_pos() + old * 0.5,
        );
        match self.config.canvas_size_mode {
            CanvasSizeMode::FitVerticalView => {
                self.zoom *= new_size.y / old.y;
            }
            CanvasSizeMode::FitHorizontalView => {
                self.zoom *= new_size.x / old.x;
            }
            CanvasSizeMode::CenterOnly => {}
        }
        self.scroll = center_canvas * self.zoom - new_size * 0.5;
    }

    fn apply_node_settings(&mut self, index: usize) {
        let id = self.objects.nodes[index].id;
        let Some(record) = self.settings.node(id).copied() else {
            return;
        };
        let node = &mut self.objects.nodes[index];
        match record.group_size {
            Some(group_size) => {
                node.kind = NodeKind::Group;
                let header = Vec2::new(record.size.x, (record.size.y - group_size.y).max(0.0));
                node.bounds = Rect::from_min_size(record.location, header);
                node.group_bounds = Rect::from_min_size(
                    Vec2::new(record.location.x, record.location.y + header.y),
                    group_size,
                );
            }
            None => {
                node.bounds = Rect::from_min_size(record.location, record.size);
            }
        }
    }

    fn ensure_node(&mut self, id: NodeId) -> usize {
        if let Some(index) = self.objects.find_node(id) {
            return index;
        }
        let index = self.objects.get_or_create_node(id);
        if self.settings.contains_node(id) {
            self.apply_node_settings(index);
        } else {
            self.settings.make_dirty(DirtyReason::ADD_NODE, Some(id));
        }
        index
    }

    fn content_bounds(&self) -> Rect {
        let mut bounds = Rect::NOTHING;
        for node in &self.objects.nodes {
            if node.live {
                bounds = bounds.union(node.full_bounds());
            }
        }
        if bounds == Rect::NOTHING {
            Rect::default()
        } else {
            bounds
        }
    }

    fn selection_bounds(&self) -> Rect {
        let mut bounds = Rect::NOTHING;
        for object in &self.selection {
            match object {
                ObjectId::Node(id) => {
                    if let Some(index) = self.objects.find_node(*id) {
                        bounds = bounds.union(self.objects.nodes[index].full_bounds());
                    }
                }
                ObjectId::Link(id) => {
                    if let Some(index) = self.objects.find_link(*id) {
                        if self.objects.links[index].live {
                            bounds = bounds.union(self.objects.link_curve(index).bounds());
                        }
                    }
                }
                ObjectId::Pin(_) => {}
            }
        }
        if bounds == Rect::NOTHING {
            Rect::default()
        } else {
            bounds
        }
    }

    fn navigate_to_bounds(&mut self, bounds: Rect, zoom_in: bool, duration: Option<f32>) {
        if bounds.is_empty() || bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return;
        }
        let window = self.input.window_size;
        if window.x <= 0.0 || window.y <= 0.0 {
            return;
        }

        let usable = 1.0 - NAVIGATION_ZOOM_MARGIN;
        let fit = (window.x * usable / bounds.width())
            .min(window.y * usable / bounds.height());
        let levels = self.zoom_levels();
        let (lo, hi) = (levels[0], levels[levels.len() - 1]);
        let mut target_zoom = fit.clamp(lo, hi);
        if !zoom_in {
            target_zoom = target_zoom.min(self.zoom);
        }
        let target_scroll = bounds.center() * target_zoom - window * 0.5;

        let duration = duration.unwrap_or(self.style.scroll_duration);
        if duration <= 0.0 {
            self.scroll = target_scroll;
            self.zoom = target_zoom;
            self.rebuild_canvas();
            self.settings.make_dirty(DirtyReason::NAVIGATION, None);
        } else {
            self.nav.animation = Some(NavigateAnimation::new(
                self.scroll,
                self.zoom,
                target_scroll,
                target_zoom,
                duration,
            ));
        }
    }

    // === Frame internals ===

    fn draw_background_and_grid(&mut self) {
        self.draw.set_current_channel(USER_CHANNEL_GRID);
        let visible = self.canvas.visible_bounds();
        self.draw.add_rect_filled(
            visible,
            self.style.color(StyleColor::Bg),
            0.0,
            crate::draw_list::CornerFlags::empty(),
        );
        draw_grid(
            &mut self.draw,
            visible,
            GRID_SPACING,
            self.zoom,
            self.style.color(StyleColor::Grid),
        );
    }

    fn assemble_control(&mut self) {
        let mouse_canvas = self.mouse_canvas();
        let mut hot: Option<ObjectId> = None;

        if self.input.window_hovered {
            let draw_order = self.objects.nodes_in_draw_order();
            for &node_index in draw_order.iter().rev() {
                let node = &self.objects.nodes[node_index];
                for &pin_index in node.pins.iter() {
                    if self.objects.pins[pin_index].test_hit_point(mouse_canvas) {
                        hot = Some(ObjectId::Pin(self.objects.pins[pin_index].id));
                        break;
                    }
                }
                if hot.is_none() && node.test_hit_point(mouse_canvas) {
                    hot = Some(ObjectId::Node(node.id));
                }
                if hot.is_some() {
                    break;
                }
            }

            if hot.is_none() {
                let extra = LINK_SELECT_THICKNESS;
                for &link_index in self.link_order.iter().rev() {
                    if self.objects.link_test_hit_point(link_index, mouse_canvas, extra) {
                        hot = Some(ObjectId::Link(self.objects.links[link_index].id));
                        break;
                    }
                }
            }
        }

        let background_hot = self.input.window_hovered && hot.is_none();

        let mut control = Control {
            hot,
            background_hot,
            ..Control::default()
        };

        for button in 0..BUTTON_COUNT {
            if self.input.buttons[button].pressed {
                self.pressed_object[button] = hot;
                self.pressed_background[button] = background_hot;
            }
        }

        control.active = (0..BUTTON_COUNT)
            .find(|&button| self.mouse.is_down(button))
            .and_then(|button| self.pressed_object[button]);

        for button in 0..BUTTON_COUNT {
            if self.mouse.clicked(button) {
                if let Some(object) = self.pressed_object[button] {
                    control.clicked = Some(object);
                    control.clicked_button = Some(button);
                } else if self.pressed_background[button] {
                    control.background_clicked = Some(button);
                }
            }
            if self.input.buttons[button].double_clicked {
                if let Some(object) = hot {
                    control.double_clicked = Some(object);
                } else if background_hot {
                    control.background_double_clicked = Some(button);
                }
            }
        }

        for button in 0..BUTTON_COUNT {
            if self.input.buttons[button].released {
                self.pressed_object[button] = None;
                self.pressed_background[button] = false;
            }
        }

        self.control = control;
    }

    fn advance_navigate_animation(&mut self) {
        if let Some(animation) = self.nav.animation.as_mut() {
            let finished = animation.timeline.update(self.input.dt);
            let (scroll, zoom) = animation.current();
            self.scroll = scroll;
            self.zoom = zoom;
            if finished {
                self.nav.animation = None;
                self.settings.make_dirty(DirtyReason::NAVIGATION, None);
            }
            self.rebuild_canvas();
        }
    }

    fn handle_wheel_zoom(&mut self) {
        let wheel = self.input.wheel;
        if wheel == 0.0 || !self.input.window_hovered {
            return;
        }
        let anchor = self.mouse_canvas();

        let new_zoom = if self.config.enable_smooth_zoom {
            let levels = self.zoom_levels();
            (self.zoom * self.config.smooth_zoom_power.powf(wheel))
                .clamp(levels[0], levels[levels.len() - 1])
        } else {
            let steps = if wheel > 0.0 {
                wheel.ceil() as i32
            } else {
                wheel.floor() as i32
            };
            next_zoom(self.zoom, steps, self.zoom_levels())
        };

        if (new_zoom - self.zoom).abs() < 1e-6 {
            return;
        }
        self.zoom = new_zoom;
        // Keep the canvas point under the cursor fixed through the zoom.
        self.scroll = anchor * self.zoom - (self.input.mouse_pos - self.input.window_pos);
        self.rebuild_canvas();
        self.settings.make_dirty(DirtyReason::NAVIGATION, None);
    }

    fn handle_navigation_keys(&mut self) {
        if !self.input.window_focused || !self.input.keys.f || self.current_action.is_some() {
            return;
        }
        if self.selection.is_empty() {
            self.navigate_to_content(None);
        } else {
            self.navigate_to_selection(false, None);
        }
    }

    fn dispatch_actions(&mut self) {
        if let Some(kind) = self.current_action {
            let still_active = match kind {
                ActionKind::Navigate => self.navigate_process(),
                ActionKind::Size => self.size_process(),
                ActionKind::Drag => self.drag_process(),
                ActionKind::Select => self.select_process(),
                ActionKind::CreateItem => self.create_process(),
                // These never hold current-action status across frames.
                ActionKind::ContextMenu | ActionKind::Shortcut | ActionKind::DeleteItems => false,
            };
            if !still_active {
                self.current_action = None;
            }
            return;
        }

        for kind in ACTION_PRIORITY {
            let result = match kind {
                ActionKind::Navigate => self.navigate_accept(),
                ActionKind::ContextMenu => self.context_menu_accept(),
                ActionKind::Shortcut => self.shortcut_accept(),
                ActionKind::Size => self.size_accept(),
                ActionKind::Drag => self.drag_accept(),
                ActionKind::Select => self.select_accept(),
                ActionKind::CreateItem => self.create_accept(),
                ActionKind::DeleteItems => self.delete_accept(),
            };
            match result {
                AcceptResult::True => {
                    // The accepted action also processes the current frame.
                    let still_active = match kind {
                        ActionKind::Navigate => self.navigate_process(),
                        ActionKind::Size => self.size_process(),
                        ActionKind::Drag => self.drag_process(),
                        ActionKind::Select => self.select_process(),
                        ActionKind::CreateItem => self.create_process(),
                        ActionKind::ContextMenu
                        | ActionKind::Shortcut
                        | ActionKind::DeleteItems => false,
                    };
                    self.current_action = if still_active { Some(kind) } else { None };
                    break;
                }
                AcceptResult::Possible | AcceptResult::False => {}
            }
        }
    }

    // === Navigate ===

    fn navigate_accept(&mut self) -> AcceptResult {
        let button = self.config.navigate_button;
        if self.input.window_hovered
            && self.mouse.is_dragging(button)
            && self.pressed_background[button]
        {
            self.nav.active = true;
            self.nav.scroll_start = self.scroll;
            self.nav.animation = None;
            return AcceptResult::True;
        }
        AcceptResult::False
    }

    fn navigate_process(&mut self) -> bool {
        let button = self.config.navigate_button;
        if !self.mouse.is_down(button) {
            self.nav.active = false;
            self.settings.make_dirty(DirtyReason::NAVIGATION, None);
            return false;
        }
        self.scroll = self.nav.scroll_start - self.mouse.drag_delta(button);
        self.rebuild_canvas();
        true
    }

    // === Context menu ===

    fn context_menu_accept(&mut self) -> AcceptResult {
        let button = self.config.context_menu_button;
        if self.control.clicked_button == Some(button) {
            if let Some(object) = self.control.clicked {
                self.context_menu.pending = Some(match object {
                    ObjectId::Node(id) => ContextMenuTarget::Node(id),
                    ObjectId::Pin(id) => ContextMenuTarget::Pin(id),
                    ObjectId::Link(id) => ContextMenuTarget::Link(id),
                });
            }
        } else if self.control.background_clicked == Some(button) {
            self.context_menu.pending = Some(ContextMenuTarget::Background);
        }
        AcceptResult::False
    }

    // === Shortcut ===

    fn shortcut_accept(&mut self) -> AcceptResult {
        if !self.input.window_focused || !self.shortcuts_enabled {
            return AcceptResult::False;
        }
        let keys = self.input.keys;
        let modifiers = self.input.modifiers;

        let kind = if modifiers.ctrl && keys.x {
            Some(ShortcutKind::Cut)
        } else if modifiers.ctrl && keys.c {
            Some(ShortcutKind::Copy)
        } else if modifiers.ctrl && keys.v {
            Some(ShortcutKind::Paste)
        } else if modifiers.ctrl && keys.d {
            Some(ShortcutKind::Duplicate)
        } else if keys.space && !modifiers.ctrl {
            Some(ShortcutKind::CreateNode)
        } else {
            None
        };

        if let Some(kind) = kind {
            self.shortcut.active = Some(kind);
            self.shortcut.context_nodes = self.selected_nodes();
            self.shortcut.context_links = self.selected_links();
        }
        AcceptResult::False
    }

    // === Size ===

    /// Border region of a live group under `canvas_pos`, if close enough to
    /// grab.
    fn group_border_region(&self, node_index: usize, canvas_pos: Vec2) -> Option<RectRegion> {
        let node = &self.objects.nodes[node_index];
        if !node.live || !node.is_group() {
            return None;
        }
        // The header strip moves, it does not resize.
        if node.bounds.contains(canvas_pos) && !node.group_bounds.contains(canvas_pos) {
            return None;
        }
        let reach = node.group_rounding.max(GROUP_SELECT_THICKNESS * 2.0);
        let (point, region) = node.group_bounds.closest_border_point(canvas_pos, reach);
        if canvas_pos.distance(point) <= GROUP_SELECT_THICKNESS * 2.0 {
            Some(region)
        } else {
            None
        }
    }

    fn resize_cursor(region: RectRegion) -> CursorKind {
        match region {
            RectRegion::Left | RectRegion::Right => CursorKind::ResizeHorizontal,
            RectRegion::Top | RectRegion::Bottom => CursorKind::ResizeVertical,
            RectRegion::TopLeft | RectRegion::BottomRight => CursorKind::ResizeDiagonalNwSe,
            RectRegion::TopRight | RectRegion::BottomLeft => CursorKind::ResizeDiagonalNeSw,
        }
    }

    fn size_accept(&mut self) -> AcceptResult {
        let button = self.config.drag_button;

        if self.mouse.is_dragging(button) {
            if let Some(ObjectId::Node(id)) = self.pressed_object[button] {
                if let Some(index) = self.objects.find_node(id) {
                    let press_canvas = self.canvas.from_screen(self.mouse.press_pos(button));
                    if let Some(region) = self.group_border_region(index, press_canvas) {
                        let node = &self.objects.nodes[index];
                        self.size_action.active = true;
                        self.size_action.node = Some(id);
                        self.size_action.region = Some(region);
                        self.size_action.start_bounds = node.bounds;
                        self.size_action.start_group_bounds = node.group_bounds;
                        self.size_action.stable = true;
                        self.cursor = Self::resize_cursor(region);
                        return AcceptResult::True;
                    }
                }
            }
        }

        // Hovering a group border shows the resize cursor without claiming
        // input.
        if let Some(id) = self.control.hot_node() {
            if let Some(index) = self.objects.find_node(id) {
                if let Some(region) = self.group_border_region(index, self.mouse_canvas()) {
                    self.cursor = Self::resize_cursor(region);
                    return AcceptResult::Possible;
                }
            }
        }

        AcceptResult::False
    }

    fn size_process(&mut self) -> bool {
        let button = self.config.drag_button;
        let Some(id) = self.size_action.node else {
            return false;
        };
        let Some(index) = self.objects.find_node(id) else {
            self.size_action.active = false;
            return false;
        };
        let Some(region) = self.size_action.region else {
            return false;
        };

        if !self.mouse.is_down(button) {
            self.size_action.active = false;
            let full = self.objects.nodes[index].full_bounds();
            let record = self.settings.node_mut(id);
            record.location = full.min;
            record.size = full.size();
            record.group_size = Some(self.objects.nodes[index].group_bounds.size());
            self.settings.make_dirty(DirtyReason::SIZE, Some(id));
            return false;
        }

        self.cursor = Self::resize_cursor(region);

        let pointer = self.mouse_canvas();
        let start = self.size_action.start_group_bounds;
        let header = self.size_action.start_bounds;

        // Content keeps its claim on the rect: the header width and a small
        // floor bound the minimum size.
        let min_width = header.width().max(GROUP_SELECT_THICKNESS * 4.0);
        let min_height = GROUP_SELECT_THICKNESS * 4.0;

        let mut rect = start;
        let mut stable = true;
        if region.moves_left() {
            rect.min.x = pointer.x;
            if rect.max.x - rect.min.x < min_width {
                rect.min.x = rect.max.x - min_width;
                stable = false;
            }
        }
        if region.moves_right() {
            rect.max.x = pointer.x;
            if rect.max.x - rect.min.x < min_width {
                rect.max.x = rect.min.x + min_width;
                stable = false;
            }
        }
        if region.moves_top() {
            rect.min.y = pointer.y;
            if rect.max.y - rect.min.y < min_height {
                rect.min.y = rect.max.y - min_height;
                stable = false;
            }
        }
        if region.moves_bottom() {
            rect.max.y = pointer.y;
            if rect.max.y - rect.min.y < min_height {
                rect.max.y = rect.min.y + min_height;
                stable = false;
            }
        }
        self.size_action.stable = stable;

        let node = &mut self.objects.nodes[index];
        node.group_bounds = rect;
        // Header follows the interior's top-left corner.
        node.bounds = header.translated(rect.min - start.min);
        true
    }

    // === Drag ===

    fn drag_accept(&mut self) -> AcceptResult {
        let button = self.config.drag_button;
        if !self.mouse.is_dragging(button) {
            return AcceptResult::False;
        }
        let Some(ObjectId::Node(id)) = self.pressed_object[button] else {
            return AcceptResult::False;
        };
        let Some(index) = self.objects.find_node(id) else {
            return AcceptResult::False;
        };
        if !self.objects.nodes[index].live {
            return AcceptResult::False;
        }

        // Dragging an unselected node selects it alone first.
        if !self.is_node_selected(id) {
            self.selection.clear();
            self.selection.push(ObjectId::Node(id));
        }

        let mut set: Vec<NodeId> = self.selected_nodes();
        if !self.input.modifiers.shift {
            // Groups pick up their grouped nodes.
            for node_id in set.clone() {
                if let Some(group_index) = self.objects.find_node(node_id) {
                    if self.objects.nodes[group_index].is_group() {
                        for grouped in self.objects.grouped_nodes(group_index) {
                            let grouped_id = self.objects.nodes[grouped].id;
                            if !set.contains(&grouped_id) {
                                set.push(grouped_id);
                            }
                        }
                    }
                }
            }
        }

        for node_id in &set {
            if let Some(node_index) = self.objects.find_node(*node_id) {
                self.objects.nodes[node_index].accept_drag();
            }
        }

        self.drag_action.active = true;
        self.drag_action.primary = Some(id);
        self.drag_action.nodes = set;
        AcceptResult::True
    }

    fn drag_process(&mut self) -> bool {
        let button = self.config.drag_button;

        if !self.mouse.is_down(button) {
            self.drag_action.active = false;
            let nodes = std::mem::take(&mut self.drag_action.nodes);
            for node_id in nodes {
                if let Some(index) = self.objects.find_node(node_id) {
                    if self.objects.nodes[index].end_drag() {
                        let full = self.objects.nodes[index].full_bounds();
                        let record = self.settings.node_mut(node_id);
                        record.location = full.min;
                        self.settings
                            .make_dirty(DirtyReason::POSITION, Some(node_id));
                    }
                }
            }
            self.drag_action.primary = None;
            return false;
        }

        let delta_screen = self.mouse.drag_delta(button);
        let mut offset = delta_screen.scale(self.canvas.inv_zoom());

        if !self.input.modifiers.alt {
            if let Some(primary) = self.drag_action.primary {
                if let Some(index) = self.objects.find_node(primary) {
                    let node = &self.objects.nodes[index];
                    let candidate_delta = node.drag_start + offset - node.bounds.min;
                    let pivots: Vec<Vec2> = node
                        .pins
                        .iter()
                        .map(|&pin| self.objects.pins[pin].pivot.center() + candidate_delta)
                        .collect();
                    let correction = if pivots.is_empty() {
                        snap_offset(&[node.drag_start + offset], SNAP_GRID)
                    } else {
                        snap_offset(&pivots, SNAP_GRID)
                    };
                    offset += correction;
                }
            }
        }

        let nodes = self.drag_action.nodes.clone();
        for node_id in nodes {
            if let Some(index) = self.objects.find_node(node_id) {
                self.objects.nodes[index].update_drag(offset);
            }
        }
        true
    }

    // === Select ===

    fn select_accept(&mut self) -> AcceptResult {
        let button = self.config.select_button;

        if self.mouse.is_dragging(button) && self.pressed_background[button] {
            let start = self.canvas.from_screen(self.mouse.press_pos(button));
            self.select_action.active = true;
            self.select_action.start = start;
            self.select_action.rect = Rect::from_min_max(start, start);
            self.select_action.mode = if self.input.modifiers.shift {
                SelectMode::Groups
            } else if self.input.modifiers.alt {
                SelectMode::Links
            } else {
                SelectMode::Nodes
            };
            self.select_action.xor_merge = self.input.modifiers.ctrl;
            self.select_action.initial = self.selection.clone();
            return AcceptResult::True;
        }

        if self.control.clicked_button == Some(button) {
            if let Some(object) = self.control.clicked {
                if self.input.modifiers.alt {
                    if let ObjectId::Link(link) = object {
                        self.delete_action.queue_link(link);
                        return AcceptResult::False;
                    }
                }
                match object {
                    ObjectId::Pin(_) => {}
                    _ if self.input.modifiers.ctrl && self.selection.contains(&object) => {
                        // Ctrl+click on a selected object toggles it off.
                        self.selection.retain(|o| *o != object);
                    }
                    _ => self.select_object(object, self.input.modifiers.ctrl),
                }
                return AcceptResult::False;
            }
        }

        if self.control.background_clicked == Some(button) && !self.input.modifiers.ctrl {
            self.selection.clear();
            return AcceptResult::False;
        }

        AcceptResult::False
    }

    fn select_process(&mut self) -> bool {
        let button = self.config.select_button;
        let pointer = self.mouse_canvas();

        if self.mouse.is_down(button) {
            self.select_action.rect = Rect::from_min_max(
                self.select_action.start.min(pointer),
                self.select_action.start.max(pointer),
            );
            return true;
        }

        // Released: resolve the rectangle into a selection.
        let rect = self.select_action.rect;
        let mut picked: Vec<ObjectId> = Vec::new();
        match self.select_action.mode {
            SelectMode::Nodes => {
                for &index in self.objects.nodes_in_draw_order().iter() {
                    let node = &self.objects.nodes[index];
                    if !node.is_group() && node.test_hit_rect(rect, true) {
                        picked.push(ObjectId::Node(node.id));
                    }
                }
            }
            SelectMode::Groups => {
                for &index in self.objects.nodes_in_draw_order().iter() {
                    let node = &self.objects.nodes[index];
                    if node.is_group() && node.test_hit_rect(rect, true) {
                        picked.push(ObjectId::Node(node.id));
                    }
                }
            }
            SelectMode::Links => {
                for &index in self.link_order.iter() {
                    if self.objects.link_test_hit_rect(index, rect, true) {
                        picked.push(ObjectId::Link(self.objects.links[index].id));
                    }
                }
            }
        }

        self.selection = if self.select_action.xor_merge {
            let initial = self.select_action.initial.clone();
            let mut merged: Vec<ObjectId> = initial
                .iter()
                .filter(|object| !picked.contains(object))
                .copied()
                .collect();
            merged.extend(picked.iter().filter(|object| !initial.contains(object)));
            merged
        } else {
            picked
        };

        self.select_action.active = false;
        self.select_action.fade.play(SELECTION_FADE_OUT_DURATION);
        self.select_action.fade_rect = rect;
        false
    }

    // === Create item ===

    fn create_accept(&mut self) -> AcceptResult {
        let button = self.config.drag_button;
        if !self.mouse.is_dragging(button) {
            return AcceptResult::False;
        }
        let Some(ObjectId::Pin(pin)) = self.pressed_object[button] else {
            return AcceptResult::False;
        };
        if self.objects.find_pin(pin).is_none() {
            return AcceptResult::False;
        }
        self.create_action.stage = CreateStage::Possible;
        self.create_action.origin_pin = Some(pin);
        self.create_action.candidate_pin = self
            .control
            .hot_pin()
            .filter(|candidate| *candidate != pin);
        AcceptResult::True
    }

    fn create_process(&mut self) -> bool {
        let button = self.config.drag_button;
        if self.create_action.stage == CreateStage::None {
            return false;
        }
        if !self.mouse.is_down(button) {
            // The host's create block already ran this frame and had its
            // chance to accept; drop the interaction.
            self.create_action.reset();
            return false;
        }

        let origin = self.create_action.origin_pin;
        self.create_action.candidate_pin = self
            .control
            .hot_pin()
            .filter(|candidate| Some(*candidate) != origin);
        true
    }

    // === Delete items ===

    fn delete_accept(&mut self) -> AcceptResult {
        if !self.input.keys.delete || self.selection.is_empty() {
            return AcceptResult::False;
        }
        for object in self.selection.clone() {
            match object {
                ObjectId::Link(id) => self.delete_action.queue_link(id),
                ObjectId::Node(id) => {
                    if let Some(index) = self.objects.find_node(id) {
                        for link_index in self.objects.links_of_node(index) {
                            let link_id = self.objects.links[link_index].id;
                            self.delete_action.queue_link(link_id);
                        }
                    }
                    self.delete_action.queue_node(id);
                }
                ObjectId::Pin(_) => {}
            }
        }
        AcceptResult::False
    }

    fn remove_link_object(&mut self, id: LinkId) {
        let Some(index) = self.objects.find_link(id) else {
            return;
        };
        let end_pin = self.objects.links[index].end_pin;
        let start_pin = self.objects.links[index].start_pin;
        if self.objects.pins[end_pin].link == Some(start_pin) {
            self.objects
                .unlink_pin(end_pin, self.config.link_notify.as_mut());
        }
        self.objects.remove_link(id);
        self.selection.retain(|object| *object != ObjectId::Link(id));
    }

    // === Drawing ===

    fn advance_flows(&mut self) {
        let dt = self.input.dt;
        let speed = self.style.flow_speed;
        let marker_distance = self.style.flow_marker_distance;
        let objects = &self.objects;
        self.flows.retain_mut(|flow| {
            let Some(index) = objects.find_link(flow.link) else {
                return false;
            };
            if !objects.links[index].live {
                return false;
            }
            let finished = flow.advance(dt, speed, marker_distance);
            let link = &objects.links[index];
            flow.refresh_path_key(link.start, link.end);
            !finished
        });
    }

    fn draw_frame(&mut self) {
        let visible = self.canvas.visible_bounds();

        // Nodes: backgrounds, pins and overlay borders per node block.
        for position in 0..self.node_order.len() {
            let index = self.node_order[position];
            let channel = self.objects.nodes[index].channel;

            self.draw
                .set_current_channel(channel + NODE_BACKGROUND_CHANNEL);
            let node = &self.objects.nodes[index];
            node.draw_background(&mut self.draw);

            self.draw.set_current_channel(channel + NODE_PIN_CHANNEL);
            let pins: Vec<usize> = self.objects.nodes[index].pins.iter().copied().collect();
            for pin_index in pins {
                let pin = &self.objects.pins[pin_index];
                pin.draw(&mut self.draw);
            }

            self.draw.set_current_channel(channel + NODE_BASE_CHANNEL);
            let node = &self.objects.nodes[index];
            let id = node.id;
            if self.selection.contains(&ObjectId::Node(id)) {
                node.draw_overlay_border(
                    &mut self.draw,
                    self.style.color(StyleColor::SelNodeBorder),
                    self.style.selected_node_border_width,
                    self.style.selected_node_border_offset,
                );
            } else if self.control.hot == Some(ObjectId::Node(id)) && !node.is_group() {
                node.draw_overlay_border(
                    &mut self.draw,
                    self.style.color(StyleColor::HovNodeBorder),
                    self.style.hovered_node_border_width,
                    self.style.hovered_node_border_offset,
                );
            }
        }

        // Links.
        let highlight_connected = self.style.highlight_connected_links != 0.0;
        let selected_nodes: Vec<usize> = self
            .selected_nodes()
            .iter()
            .filter_map(|id| self.objects.find_node(*id))
            .collect();

        for position in 0..self.link_order.len() {
            let index = self.link_order[position];
            let link = &self.objects.links[index];
            if !self.objects.pins[link.start_pin].live || !self.objects.pins[link.end_pin].live {
                continue;
            }
            let curve = self.objects.link_curve(index);
            if !curve.bounds().expanded(link.thickness).intersects(visible) {
                continue;
            }

            let id = link.id;
            let color = link.color;
            let thickness = link.thickness;

            let overlay = if self.selection.contains(&ObjectId::Link(id)) {
                Some(self.style.color(StyleColor::SelLinkBorder))
            } else if self.control.hot == Some(ObjectId::Link(id)) {
                Some(self.style.color(StyleColor::HovLinkBorder))
            } else if highlight_connected
                && (selected_nodes.contains(&self.objects.pins[link.start_pin].node)
                    || selected_nodes.contains(&self.objects.pins[link.end_pin].node))
            {
                Some(self.style.color(StyleColor::HighlightLinkBorder))
            } else {
                None
            };

            if let Some(overlay_color) = overlay {
                self.draw.set_current_channel(LINK_CHANNEL_SELECTION);
                self.objects
                    .draw_link(index, &mut self.draw, overlay_color, thickness + 3.0);
            }

            self.draw.set_current_channel(LINK_CHANNEL_LINKS);
            self.objects.draw_link(index, &mut self.draw, color, thickness);
        }

        // Flow pulses.
        self.draw.set_current_channel(LINK_CHANNEL_FLOW);
        for flow_index in 0..self.flows.len() {
            let flow = self.flows[flow_index];
            if let Some(index) = self.objects.find_link(flow.link) {
                if self.objects.links[index].live {
                    let curve = self.objects.link_curve(index);
                    flow.draw(&curve, &mut self.draw, &self.style);
                }
            }
        }

        // Candidate link while creating.
        if self.create_action.stage == CreateStage::Possible {
            self.draw_create_candidate();
        }

        // Rubber band, live or fading.
        self.draw_selection_rect();
    }

    fn draw_create_candidate(&mut self) {
        let Some(origin_id) = self.create_action.origin_pin else {
            return;
        };
        let Some(origin) = self.objects.find_pin(origin_id) else {
            return;
        };

        let target_point;
        let target_dir;
        let target_strength;
        if let Some(candidate_id) = self.create_action.candidate_pin {
            if let Some(candidate) = self.objects.find_pin(candidate_id) {
                let (_, point) = {
                    let a = &self.objects.pins[origin];
                    let b = &self.objects.pins[candidate];
                    a.closest_line(b)
                };
                target_point = point;
                target_dir = self.objects.pins[candidate].direction;
                target_strength = self.objects.pins[candidate].strength;
            } else {
                return;
            }
        } else {
            target_point = self.mouse_canvas();
            target_dir = -self.objects.pins[origin].direction;
            target_strength = self.objects.pins[origin].strength;
        }

        let origin_pin = &self.objects.pins[origin];
        let start = origin_pin.closest_point(target_point);
        let curve = link_curve(
            start,
            target_point,
            origin_pin.direction,
            target_dir,
            origin_pin.strength,
            target_strength,
        );

        self.draw.set_current_channel(LINK_CHANNEL_NEW_LINK);
        self.draw.add_bezier(
            &curve,
            self.create_action.color,
            self.create_action.thickness,
        );
    }

    fn draw_selection_rect(&mut self) {
        let (rect, alpha) = if self.select_action.active {
            (self.select_action.rect, 1.0)
        } else if self.select_action.fade.is_playing() {
            let alpha = 1.0 - self.select_action.fade.progress();
            self.select_action.fade.update(self.input.dt);
            (self.select_action.fade_rect, alpha)
        } else {
            return;
        };

        let (fill, border) = match self.select_action.mode {
            SelectMode::Links => (
                self.style.color(StyleColor::LinkSelRect),
                self.style.color(StyleColor::LinkSelRectBorder),
            ),
            _ => (
                self.style.color(StyleColor::NodeSelRect),
                self.style.color(StyleColor::NodeSelRectBorder),
            ),
        };

        self.draw.set_current_channel(BACKGROUND_CHANNEL_SEL_RECT);
        self.draw.add_rect_filled(
            rect,
            fill.with_alpha_scaled(alpha),
            0.0,
            crate::draw_list::CornerFlags::empty(),
        );
        self.draw.add_rect(
            rect,
            border.with_alpha_scaled(alpha),
            0.0,
            crate::draw_list::CornerFlags::empty(),
            1.0 / self.zoom.max(f32::EPSILON),
        );
    }

    // === Composition and persistence ===

    fn compose_and_merge(&mut self) {
        let draw_order = self.objects.nodes_in_draw_order();
        let (groups, regular): (Vec<usize>, Vec<usize>) = draw_order
            .into_iter()
            .partition(|&index| self.objects.nodes[index].is_group());

        let mut order = vec![
            USER_CHANNEL_CONTENT,
            USER_CHANNEL_GRID,
            BACKGROUND_CHANNEL_SEL_RECT,
        ];
        let push_block = |order: &mut Vec<usize>, node_index: usize| {
            let base = self.objects.nodes[node_index].channel;
            for offset in 0..CHANNELS_PER_NODE {
                order.push(base + offset);
            }
        };
        for index in groups {
            push_block(&mut order, index);
        }
        order.extend([
            LINK_CHANNEL_SELECTION,
            LINK_CHANNEL_LINKS,
            LINK_CHANNEL_FLOW,
        ]);
        for index in regular {
            push_block(&mut order, index);
        }
        order.push(LINK_CHANNEL_NEW_LINK);
        order.extend([USER_CHANNEL_HINTS_BACKGROUND, USER_CHANNEL_HINTS_FOREGROUND]);

        // Canvas-space channels into screen space; hint channels are already
        // there.
        let zoom = self.canvas.zoom();
        let post = self.canvas.client_origin() + self.canvas.window_screen_pos();
        self.draw
            .transform_channels(0, USER_CHANNEL_HINTS_BACKGROUND, Vec2::ZERO, zoom, post);
        let channel_count = self.draw.channel_count();
        self.draw.transform_channels(
            BACKGROUND_CHANNEL_SEL_RECT,
            channel_count,
            Vec2::ZERO,
            zoom,
            post,
        );

        let window = self.canvas.window_rect();
        self.draw
            .translate_and_clamp_clips(0, channel_count, Vec2::ZERO, window);

        self.draw.merge(&order);
    }

    fn restore_selection_if_pending(&mut self) {
        let Some(ids) = self.pending_selection_restore.take() else {
            return;
        };
        let mut restored = Vec::new();
        for raw in ids {
            if let Some(index) = self.objects.find_node(NodeId::new(raw)) {
                restored.push(ObjectId::Node(self.objects.nodes[index].id));
            } else if let Some(index) = self.objects.find_link(LinkId::new(raw)) {
                restored.push(ObjectId::Link(self.objects.links[index].id));
            }
        }
        self.selection = restored.clone();
        // A restore is not a user selection change.
        self.last_selection = restored;
    }

    fn detect_selection_change(&mut self) {
        if self.selection != self.last_selection {
            self.selection_id += 1;
            self.selection_changed = true;
            self.last_selection = self.selection.clone();
            self.settings.selection = self.selection.iter().map(|object| object.raw()).collect();
            self.settings.make_dirty(DirtyReason::SELECTION, None);
        } else {
            self.selection_changed = false;
        }
    }

    fn run_save_cycle(&mut self) {
        if self.current_action.is_some() || !self.settings.is_dirty() {
            return;
        }

        // Keep the persisted view in sync before writing.
        self.settings.view.scroll = self.scroll;
        self.settings.view.zoom = self.zoom;

        let Some(backend) = self.config.settings_backend.as_mut() else {
            for node in self.settings.dirty_nodes() {
                self.settings.clear_node_dirty(node);
            }
            self.settings.clear_dirty();
            return;
        };

        backend.begin_save();
        for node_id in self.settings.dirty_nodes() {
            let json = self.settings.node_to_json(node_id);
            let reason = self
                .settings
                .node(node_id)
                .map(|record| record.reason)
                .unwrap_or_default();
            if backend.save_node(node_id, &json, reason) {
                self.settings.clear_node_dirty(node_id);
            } else {
                log::debug!("node {:?} settings save failed; retrying next frame", node_id);
            }
        }
        let json = self.settings.to_json();
        if backend.save(&json, self.settings.dirty_reason()) {
            self.settings.clear_dirty();
        } else {
            log::debug!("settings save failed; retrying next frame");
        }
        backend.end_save();
    }
}
