//! The graph object model: nodes, pins and links.
//!
//! Entities live in arenas owned by [`Objects`]; cross-references are arena
//! indices, never pointers, so growing the arenas cannot invalidate anything
//! and ids remain the stable host-facing reference. Hosts address entities
//! exclusively by the ids they supplied at submission time.

use crate::bezier::CubicBezier;
use crate::config::{AcceptLinkFn, LinkCandidate, LinkEvent, LinkNotifyFn};
use crate::draw_list::{Color, CornerFlags, DrawList};
use crate::geometry::{Rect, Vec2};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use thiserror::Error;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(i64);

        impl $name {
            pub fn new(raw: i64) -> Self {
                debug_assert!(raw != 0, concat!(stringify!($name), " must be non-zero"));
                Self(raw)
            }

            pub fn raw(self) -> i64 {
                self.0
            }
        }
    };
}

id_type!(
    /// Host-assigned node identifier, non-zero and stable across frames.
    NodeId
);
id_type!(
    /// Host-assigned pin identifier, non-zero and stable across frames.
    PinId
);
id_type!(
    /// Host-assigned link identifier, non-zero and stable across frames.
    LinkId
);

/// Any entity the editor can hover, select or click.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectId {
    Node(NodeId),
    Pin(PinId),
    Link(LinkId),
}

impl ObjectId {
    pub fn as_node(self) -> Option<NodeId> {
        match self {
            ObjectId::Node(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_pin(self) -> Option<PinId> {
        match self {
            ObjectId::Pin(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_link(self) -> Option<LinkId> {
        match self {
            ObjectId::Link(id) => Some(id),
            _ => None,
        }
    }

    pub fn raw(self) -> i64 {
        match self {
            ObjectId::Node(id) => id.raw(),
            ObjectId::Pin(id) => id.raw(),
            ObjectId::Link(id) => id.raw(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PinKind {
    #[default]
    Input,
    Output,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeKind {
    #[default]
    Node,
    Group,
}

/// Pin value type tag. [`ValueType::ANY`] links to everything and morphs to
/// the partner's type when connected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValueType(pub i32);

impl ValueType {
    pub const ANY: ValueType = ValueType(0);

    pub fn is_any(self) -> bool {
        self == Self::ANY
    }
}

/// Why two pins cannot be linked.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LinkRejection {
    #[error("pins belong to the same node")]
    SameNode,
    #[error("pins have the same kind; links join an input to an output")]
    SameKind,
    #[error("value types differ: {receiver:?} vs {provider:?}")]
    TypeMismatch {
        receiver: ValueType,
        provider: ValueType,
    },
    #[error("link vetoed by the receiving node")]
    Vetoed,
}

/// Successful link-compatibility result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkAccept {
    pub receiver: PinId,
    pub provider: PinId,
    /// The any-typed side that will adopt the partner's value type, if any.
    pub morphing_pin: Option<PinId>,
}

/// Hollow-border thickness used for group hit testing, in canvas pixels.
pub const GROUP_SELECT_THICKNESS: f32 = 3.0;
/// Extra reach around links for pointer hit testing, in canvas pixels.
pub const LINK_SELECT_THICKNESS: f32 = 5.0;

/// A node: bounds, styling, pins and transient per-frame state.
#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub bounds: Rect,
    /// Hollow interior for group nodes; untouched for plain nodes.
    pub group_bounds: Rect,
    pub z_position: f32,
    /// First channel of this node's per-node channel block, this frame.
    pub channel: usize,
    /// Pin arena indices in submission order (newest last).
    pub pins: SmallVec<[usize; 8]>,
    pub color: Color,
    pub border_color: Color,
    pub border_width: f32,
    pub rounding: f32,
    pub group_color: Color,
    pub group_border_color: Color,
    pub group_border_width: f32,
    pub group_rounding: f32,
    pub live: bool,
    pub restore_state_pending: bool,
    pub center_on_screen_pending: bool,
    pub drag_start: Vec2,
}

impl Node {
    fn new(id: NodeId) -> Self {
        Self {
            id,
            kind: NodeKind::Node,
            bounds: Rect::from_min_size(Vec2::ZERO, Vec2::ZERO),
            group_bounds: Rect::from_min_size(Vec2::ZERO, Vec2::ZERO),
            z_position: 0.0,
            channel: 0,
            pins: SmallVec::new(),
            color: Color::TRANSPARENT,
            border_color: Color::TRANSPARENT,
            border_width: 0.0,
            rounding: 0.0,
            group_color: Color::TRANSPARENT,
            group_border_color: Color::TRANSPARENT,
            group_border_width: 0.0,
            group_rounding: 0.0,
            live: false,
            restore_state_pending: false,
            center_on_screen_pending: false,
            drag_start: Vec2::ZERO,
        }
    }

    pub fn is_group(&self) -> bool {
        self.kind == NodeKind::Group
    }

    /// Full footprint: node bounds united with the group interior.
    pub fn full_bounds(&self) -> Rect {
        if self.is_group() {
            self.bounds.union(self.group_bounds)
        } else {
            self.bounds
        }
    }

    pub fn accept_drag(&mut self) {
        self.drag_start = self.bounds.min;
    }

    /// Move to the drag anchor plus `offset`; groups carry their interior.
    pub fn update_drag(&mut self, offset: Vec2) {
        let delta = self.drag_start + offset - self.bounds.min;
        self.bounds = self.bounds.translated(delta);
        if self.is_group() {
            self.group_bounds = self.group_bounds.translated(delta);
        }
    }

    /// Whether the drag moved the node at all.
    pub fn end_drag(&self) -> bool {
        self.bounds.min != self.drag_start
    }

    /// Containment-or-intersection test against `rect`.
    pub fn test_hit_rect(&self, rect: Rect, allow_intersect: bool) -> bool {
        if !self.live {
            return false;
        }
        let bounds = self.full_bounds();
        if allow_intersect {
            rect.intersects(bounds)
        } else {
            rect.contains_rect(bounds)
        }
    }

    /// Pointer test. Group interiors are transparent so nested content can
    /// take the hit; only the hollow border (and the group's header strip,
    /// i.e. its node bounds) is hot.
    pub fn test_hit_point(&self, p: Vec2) -> bool {
        if !self.live {
            return false;
        }
        if self.is_group() {
            if self.bounds.contains(p) && !self.group_bounds.contains(p) {
                return true;
            }
            let outer = self.group_bounds.expanded(GROUP_SELECT_THICKNESS);
            let inner = self.group_bounds.expanded(-GROUP_SELECT_THICKNESS);
            outer.contains(p) && !inner.contains(p)
        } else {
            self.bounds.contains(p)
        }
    }

    /// Fill and plain border, plus group interior fill for groups.
    pub fn draw_background(&self, list: &mut DrawList) {
        if self.is_group() {
            list.add_rect_filled(
                self.group_bounds,
                self.group_color,
                self.group_rounding,
                CornerFlags::ALL,
            );
            if self.group_border_width > 0.0 {
                list.add_rect(
                    self.group_bounds,
                    self.group_border_color,
                    self.group_rounding,
                    CornerFlags::ALL,
                    self.group_border_width,
                );
            }
        }
        list.add_rect_filled(self.bounds, self.color, self.rounding, CornerFlags::ALL);
        if self.border_width > 0.0 {
            list.add_rect(
                self.bounds,
                self.border_color,
                self.rounding,
                CornerFlags::ALL,
                self.border_width,
            );
        }
    }

    /// Hover/selection border around the full footprint.
    pub fn draw_overlay_border(&self, list: &mut DrawList, color: Color, width: f32, offset: f32) {
        if width <= 0.0 {
            return;
        }
        let rect = self.full_bounds().expanded(offset + width * 0.5);
        let rounding = if self.is_group() {
            self.group_rounding
        } else {
            self.rounding
        };
        list.add_rect(rect, color, rounding, CornerFlags::ALL, width);
    }
}

/// A pin: link anchor owned by a node.
#[derive(Clone, Debug)]
pub struct Pin {
    pub id: PinId,
    pub kind: PinKind,
    /// Arena index of the owning node.
    pub node: usize,
    pub bounds: Rect,
    /// Logical anchor rect links attach to.
    pub pivot: Rect,
    pub direction: Vec2,
    /// Bézier tangent magnitude for links hooked to this pin.
    pub strength: f32,
    pub value_type: ValueType,
    pub color: Color,
    pub border_color: Color,
    pub border_width: f32,
    pub radius: f32,
    pub arrow_size: f32,
    pub arrow_width: f32,
    pub corners: CornerFlags,
    pub rounding: f32,
    /// Receiver-side reference to the provider pin's arena index.
    pub link: Option<usize>,
    pub live: bool,
    pub has_connection: bool,
    pub had_connection: bool,
}

impl Pin {
    fn new(id: PinId, kind: PinKind, node: usize) -> Self {
        Self {
            id,
            kind,
            node,
            bounds: Rect::from_min_size(Vec2::ZERO, Vec2::ZERO),
            pivot: Rect::from_min_size(Vec2::ZERO, Vec2::ZERO),
            direction: Vec2::ZERO,
            strength: 0.0,
            value_type: ValueType::ANY,
            color: Color::TRANSPARENT,
            border_color: Color::TRANSPARENT,
            border_width: 0.0,
            radius: 0.0,
            arrow_size: 0.0,
            arrow_width: 0.0,
            corners: CornerFlags::ALL,
            rounding: 0.0,
            link: None,
            live: false,
            has_connection: false,
            had_connection: false,
        }
    }

    /// Nearest point on the pivot inflated by radius and arrow size.
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        self.pivot
            .expanded(self.radius + self.arrow_size)
            .closest_point(p)
    }

    /// Shortest segment between this pin's inflated pivot and another's.
    pub fn closest_line(&self, other: &Pin) -> (Vec2, Vec2) {
        self.pivot.closest_line(
            &other.pivot,
            self.radius + self.arrow_size,
            other.radius + other.arrow_size,
        )
    }

    pub fn test_hit_point(&self, p: Vec2) -> bool {
        self.live && self.bounds.contains(p)
    }

    pub fn draw(&self, list: &mut DrawList) {
        if self.color.a > 0 {
            list.add_rect_filled(self.bounds, self.color, self.rounding, self.corners);
        }
        if self.border_width > 0.0 && self.border_color.a > 0 {
            list.add_rect(
                self.bounds,
                self.border_color,
                self.rounding,
                self.corners,
                self.border_width,
            );
        }
    }
}

/// A link between two pins, rendered as a cubic Bézier.
#[derive(Clone, Debug)]
pub struct Link {
    pub id: LinkId,
    /// Provider-side pin arena index.
    pub start_pin: usize,
    /// Receiver-side pin arena index.
    pub end_pin: usize,
    pub color: Color,
    pub thickness: f32,
    pub start: Vec2,
    pub end: Vec2,
    pub live: bool,
}

impl Link {
    fn new(id: LinkId) -> Self {
        Self {
            id,
            start_pin: usize::MAX,
            end_pin: usize::MAX,
            color: Color::WHITE,
            thickness: 1.0,
            start: Vec2::ZERO,
            end: Vec2::ZERO,
            live: false,
        }
    }
}

/// Ease the tangent magnitude down when endpoints are close, so short links
/// do not loop back on themselves.
pub fn eased_strength(a: Vec2, b: Vec2, strength: f32) -> f32 {
    let half_distance = a.distance(b) * 0.5;
    if half_distance < strength {
        strength * (std::f32::consts::FRAC_PI_2 * half_distance / strength).sin()
    } else {
        strength
    }
}

/// Curve for a link given endpoint anchors, directions and strengths.
pub fn link_curve(
    start: Vec2,
    end: Vec2,
    start_dir: Vec2,
    end_dir: Vec2,
    start_strength: f32,
    end_strength: f32,
) -> CubicBezier {
    let cp0 = start + start_dir * eased_strength(start, end, start_strength);
    let cp1 = end + end_dir * eased_strength(start, end, end_strength);
    CubicBezier::new(start, cp0, cp1, end)
}

/// Arena storage for every entity the host ever submitted.
///
/// Entities are created lazily on first submission, marked not-live at frame
/// start and live again when (re)submitted; arena slots are reused when a
/// deleted id is submitted again.
#[derive(Default)]
pub struct Objects {
    pub nodes: Vec<Node>,
    pub pins: Vec<Pin>,
    pub links: Vec<Link>,
    node_index: FxHashMap<NodeId, usize>,
    pin_index: FxHashMap<PinId, usize>,
    link_index: FxHashMap<LinkId, usize>,
}

impl Objects {
    pub fn new() -> Self {
        Self::default()
    }

    // === Lookup ===

    pub fn find_node(&self, id: NodeId) -> Option<usize> {
        self.node_index.get(&id).copied()
    }

    pub fn find_pin(&self, id: PinId) -> Option<usize> {
        self.pin_index.get(&id).copied()
    }

    pub fn find_link(&self, id: LinkId) -> Option<usize> {
        self.link_index.get(&id).copied()
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn node_mut(&mut self, index: usize) -> &mut Node {
        &mut self.nodes[index]
    }

    pub fn pin(&self, index: usize) -> &Pin {
        &self.pins[index]
    }

    pub fn pin_mut(&mut self, index: usize) -> &mut Pin {
        &mut self.pins[index]
    }

    pub fn link(&self, index: usize) -> &Link {
        &self.links[index]
    }

    pub fn link_mut(&mut self, index: usize) -> &mut Link {
        &mut self.links[index]
    }

    // === Creation ===

    /// Find or lazily create the node for `id`.
    pub fn get_or_create_node(&mut self, id: NodeId) -> usize {
        if let Some(&index) = self.node_index.get(&id) {
            return index;
        }
        let index = self.nodes.len();
        self.nodes.push(Node::new(id));
        self.node_index.insert(id, index);
        index
    }

    /// Find or lazily create the pin for `id`, attached to `node`.
    pub fn get_or_create_pin(&mut self, id: PinId, kind: PinKind, node: usize) -> usize {
        if let Some(&index) = self.pin_index.get(&id) {
            let pin = &mut self.pins[index];
            pin.kind = kind;
            pin.node = node;
            return index;
        }
        let index = self.pins.len();
        self.pins.push(Pin::new(id, kind, node));
        self.pin_index.insert(id, index);
        index
    }

    pub fn get_or_create_link(&mut self, id: LinkId) -> usize {
        if let Some(&index) = self.link_index.get(&id) {
            return index;
        }
        let index = self.links.len();
        self.links.push(Link::new(id));
        self.link_index.insert(id, index);
        index
    }

    // === Removal ===

    /// Forget a link id. The arena slot stays but is no longer addressable.
    pub fn remove_link(&mut self, id: LinkId) -> bool {
        if let Some(index) = self.link_index.remove(&id) {
            self.links[index].live = false;
            true
        } else {
            false
        }
    }

    /// Forget a node id along with its pins.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(index) = self.node_index.remove(&id) else {
            return false;
        };
        self.nodes[index].live = false;
        let pins = std::mem::take(&mut self.nodes[index].pins);
        for pin_index in pins {
            let pin_id = self.pins[pin_index].id;
            self.pins[pin_index].live = false;
            self.pin_index.remove(&pin_id);
        }
        true
    }

    // === Frame lifecycle ===

    /// Frame start: everything goes not-live and connection history rolls
    /// over (`had_connection` reflects any connection seen in prior frames).
    pub fn reset_frame(&mut self) {
        for node in &mut self.nodes {
            node.live = false;
        }
        for pin in &mut self.pins {
            pin.live = false;
            pin.had_connection |= pin.has_connection;
            pin.has_connection = false;
        }
        for link in &mut self.links {
            link.live = false;
        }
    }

    /// Refresh a live link's cached endpoints from its pins' pivots.
    pub fn update_link_endpoints(&mut self, link_index: usize) {
        let link = &self.links[link_index];
        let (start, end) = {
            let start_pin = &self.pins[link.start_pin];
            let end_pin = &self.pins[link.end_pin];
            start_pin.closest_line(end_pin)
        };
        let link = &mut self.links[link_index];
        link.start = start;
        link.end = end;
    }

    /// Curve of a live link, honoring pin directions and strengths.
    pub fn link_curve(&self, link_index: usize) -> CubicBezier {
        let link = &self.links[link_index];
        let start_pin = &self.pins[link.start_pin];
        let end_pin = &self.pins[link.end_pin];
        link_curve(
            link.start,
            link.end,
            start_pin.direction,
            end_pin.direction,
            start_pin.strength,
            end_pin.strength,
        )
    }

    /// Pointer hit test for a link: bounding-box reject, then projection.
    pub fn link_test_hit_point(&self, link_index: usize, p: Vec2, extra_thickness: f32) -> bool {
        let link = &self.links[link_index];
        if !link.live {
            return false;
        }
        let curve = self.link_curve(link_index);
        let bounds = curve.bounds().expanded(link.thickness + extra_thickness);
        if !bounds.contains(p) {
            return false;
        }
        let projection = curve.project_point(p, 50);
        projection.distance <= link.thickness + extra_thickness
    }

    /// Rectangle hit test for a link: containment, or edge intersection when
    /// `allow_intersect`.
    pub fn link_test_hit_rect(&self, link_index: usize, rect: Rect, allow_intersect: bool) -> bool {
        let link = &self.links[link_index];
        if !link.live {
            return false;
        }
        let curve = self.link_curve(link_index);
        let bounds = curve.bounds();
        if rect.contains_rect(bounds) {
            return true;
        }
        if !allow_intersect || !rect.intersects(bounds) {
            return false;
        }

        let tl = rect.min;
        let tr = Vec2::new(rect.max.x, rect.min.y);
        let br = rect.max;
        let bl = Vec2::new(rect.min.x, rect.max.y);
        for (a, b) in [(tl, tr), (tr, br), (br, bl), (bl, tl)] {
            if !curve.line_intersections(a, b).is_empty() {
                return true;
            }
        }
        false
    }

    /// Draw a live link, with filled arrow heads where pins request them.
    pub fn draw_link(&self, link_index: usize, list: &mut DrawList, color: Color, thickness: f32) {
        let curve = self.link_curve(link_index);
        list.add_bezier(&curve, color, thickness);

        let link = &self.links[link_index];
        for (pin_index, at_end) in [(link.start_pin, false), (link.end_pin, true)] {
            let pin = &self.pins[pin_index];
            if pin.arrow_size <= 0.0 {
                continue;
            }
            let t = if at_end { 1.0 } else { 0.0 };
            let tip = curve.eval(t);
            // Arrow points along the travel direction at its own end.
            let dir = if at_end {
                curve.tangent(1.0)
            } else {
                -curve.tangent(0.0)
            };
            let half_width = pin.arrow_width.max(thickness) * 0.5;
            let normal = Vec2::new(-dir.y, dir.x) * half_width;
            let back = tip - dir * pin.arrow_size;
            list.add_triangle_filled(tip, back + normal, back - normal, color);
        }
    }

    // === Link compatibility ===

    /// Check whether two pins may be linked, per the standard rule order:
    /// different nodes, complementary kinds, matching (or any) value types,
    /// then the node-side veto.
    pub fn can_link(
        &self,
        a_index: usize,
        b_index: usize,
        accept: Option<&AcceptLinkFn>,
    ) -> Result<LinkAccept, LinkRejection> {
        let a = &self.pins[a_index];
        let b = &self.pins[b_index];

        if a.node == b.node {
            return Err(LinkRejection::SameNode);
        }
        if a.kind == b.kind {
            return Err(LinkRejection::SameKind);
        }

        let (receiver, provider) = if a.kind == PinKind::Input {
            (a, b)
        } else {
            (b, a)
        };

        let morphing_pin = if receiver.value_type.is_any() && !provider.value_type.is_any() {
            Some(receiver.id)
        } else if provider.value_type.is_any() && !receiver.value_type.is_any() {
            Some(provider.id)
        } else if receiver.value_type != provider.value_type {
            return Err(LinkRejection::TypeMismatch {
                receiver: receiver.value_type,
                provider: provider.value_type,
            });
        } else {
            None
        };

        if let Some(accept) = accept {
            let candidate = LinkCandidate {
                receiver_pin: receiver.id,
                provider_pin: provider.id,
                receiver_node: self.nodes[receiver.node].id,
                provider_node: self.nodes[provider.node].id,
            };
            if !accept(&candidate) {
                return Err(LinkRejection::Vetoed);
            }
        }

        Ok(LinkAccept {
            receiver: receiver.id,
            provider: provider.id,
            morphing_pin,
        })
    }

    /// Link two pins at the pin level: validates, clears any prior link on
    /// the receiver, stores the provider reference and notifies.
    pub fn link_pins(
        &mut self,
        a_index: usize,
        b_index: usize,
        accept: Option<&AcceptLinkFn>,
        notify: Option<&mut LinkNotifyFn>,
    ) -> Result<LinkAccept, LinkRejection> {
        let result = self.can_link(a_index, b_index, accept)?;
        let (receiver_index, provider_index) = if self.pins[a_index].id == result.receiver {
            (a_index, b_index)
        } else {
            (b_index, a_index)
        };

        self.pins[receiver_index].link = Some(provider_index);
        if let Some(morph) = result.morphing_pin {
            let (morph_index, partner_index) = if morph == result.receiver {
                (receiver_index, provider_index)
            } else {
                (provider_index, receiver_index)
            };
            self.pins[morph_index].value_type = self.pins[partner_index].value_type;
        }

        if let Some(notify) = notify {
            notify(LinkEvent {
                receiver_pin: result.receiver,
                provider_pin: result.provider,
                linked: true,
            });
        }
        Ok(result)
    }

    /// Break the receiver-side reference, notifying if one existed.
    pub fn unlink_pin(&mut self, receiver_index: usize, notify: Option<&mut LinkNotifyFn>) {
        let Some(provider_index) = self.pins[receiver_index].link.take() else {
            return;
        };
        if let Some(notify) = notify {
            notify(LinkEvent {
                receiver_pin: self.pins[receiver_index].id,
                provider_pin: self.pins[provider_index].id,
                linked: false,
            });
        }
    }

    // === Graph queries ===

    /// Live links touching `node` (by either pin).
    pub fn links_of_node(&self, node_index: usize) -> Vec<usize> {
        self.links
            .iter()
            .enumerate()
            .filter(|(_, link)| {
                link.live
                    && (self.pins[link.start_pin].node == node_index
                        || self.pins[link.end_pin].node == node_index)
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Live links touching `pin`.
    pub fn links_of_pin(&self, pin_index: usize) -> Vec<usize> {
        self.links
            .iter()
            .enumerate()
            .filter(|(_, link)| {
                link.live && (link.start_pin == pin_index || link.end_pin == pin_index)
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Nodes fully contained in a group's interior, including nodes grouped
    /// by nested groups.
    pub fn grouped_nodes(&self, group_index: usize) -> Vec<usize> {
        let mut result = Vec::new();
        self.collect_grouped(group_index, &mut result);
        result
    }

    fn collect_grouped(&self, group_index: usize, out: &mut Vec<usize>) {
        let group = &self.nodes[group_index];
        if !group.is_group() {
            return;
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if index == group_index || !node.live || out.contains(&index) {
                continue;
            }
            if group.group_bounds.contains_rect(node.full_bounds()) {
                out.push(index);
                if node.is_group() {
                    self.collect_grouped(index, out);
                }
            }
        }
    }

    /// Live node arena indices in draw order: ascending z, submission order
    /// within equal z.
    pub fn nodes_in_draw_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| self.nodes[i].live)
            .collect();
        order.sort_by(|&a, &b| {
            self.nodes[a]
                .z_position
                .partial_cmp(&self.nodes[b].z_position)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        order
    }
}
