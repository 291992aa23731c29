//! Visual style: a named color table and a named variable set, both with
//! push/pop override stacks so hosts can restyle single nodes or links
//! mid-frame.

use crate::draw_list::{Color, CornerFlags};
use crate::geometry::Vec2;

/// Named entries of the style color table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum StyleColor {
    Bg,
    Grid,
    NodeBg,
    NodeBorder,
    HovNodeBorder,
    SelNodeBorder,
    NodeSelRect,
    NodeSelRectBorder,
    HovLinkBorder,
    SelLinkBorder,
    HighlightLinkBorder,
    LinkSelRect,
    LinkSelRectBorder,
    PinRect,
    PinRectBorder,
    Flow,
    FlowMarker,
    GroupBg,
    GroupBorder,
}

impl StyleColor {
    pub const COUNT: usize = 19;

    pub fn name(self) -> &'static str {
        match self {
            Self::Bg => "Bg",
            Self::Grid => "Grid",
            Self::NodeBg => "NodeBg",
            Self::NodeBorder => "NodeBorder",
            Self::HovNodeBorder => "HovNodeBorder",
            Self::SelNodeBorder => "SelNodeBorder",
            Self::NodeSelRect => "NodeSelRect",
            Self::NodeSelRectBorder => "NodeSelRectBorder",
            Self::HovLinkBorder => "HovLinkBorder",
            Self::SelLinkBorder => "SelLinkBorder",
            Self::HighlightLinkBorder => "HighlightLinkBorder",
            Self::LinkSelRect => "LinkSelRect",
            Self::LinkSelRectBorder => "LinkSelRectBorder",
            Self::PinRect => "PinRect",
            Self::PinRectBorder => "PinRectBorder",
            Self::Flow => "Flow",
            Self::FlowMarker => "FlowMarker",
            Self::GroupBg => "GroupBg",
            Self::GroupBorder => "GroupBorder",
        }
    }
}

/// Named style variables; the value shape each expects is fixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleVar {
    NodePadding,
    NodeRounding,
    NodeBorderWidth,
    HoveredNodeBorderWidth,
    HoveredNodeBorderOffset,
    SelectedNodeBorderWidth,
    SelectedNodeBorderOffset,
    PinRounding,
    PinBorderWidth,
    LinkStrength,
    SourceDirection,
    TargetDirection,
    ScrollDuration,
    FlowMarkerDistance,
    FlowSpeed,
    FlowDuration,
    PivotAlignment,
    PivotSize,
    PivotScale,
    PinCorners,
    PinRadius,
    PinArrowSize,
    PinArrowWidth,
    GroupRounding,
    GroupBorderWidth,
    HighlightConnectedLinks,
    SnapLinkToPinDir,
}

/// A style variable value; the variant must match the variable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VarValue {
    Float(f32),
    Vec2(Vec2),
    Vec4([f32; 4]),
}

impl VarValue {
    fn expect_float(self) -> f32 {
        match self {
            VarValue::Float(v) => v,
            other => {
                debug_assert!(false, "expected float style var, got {other:?}");
                0.0
            }
        }
    }

    fn expect_vec2(self) -> Vec2 {
        match self {
            VarValue::Vec2(v) => v,
            other => {
                debug_assert!(false, "expected vec2 style var, got {other:?}");
                Vec2::ZERO
            }
        }
    }

    fn expect_vec4(self) -> [f32; 4] {
        match self {
            VarValue::Vec4(v) => v,
            other => {
                debug_assert!(false, "expected vec4 style var, got {other:?}");
                [0.0; 4]
            }
        }
    }
}

/// The complete visual style. Defaults give the familiar dark graph look.
#[derive(Clone, Debug)]
pub struct Style {
    /// Left/top/right/bottom content padding inside a node.
    pub node_padding: [f32; 4],
    pub node_rounding: f32,
    pub node_border_width: f32,
    pub hovered_node_border_width: f32,
    pub hovered_node_border_offset: f32,
    pub selected_node_border_width: f32,
    pub selected_node_border_offset: f32,
    pub pin_rounding: f32,
    pub pin_border_width: f32,
    pub link_strength: f32,
    pub source_direction: Vec2,
    pub target_direction: Vec2,
    pub scroll_duration: f32,
    pub flow_marker_distance: f32,
    pub flow_speed: f32,
    pub flow_duration: f32,
    pub pivot_alignment: Vec2,
    pub pivot_size: Vec2,
    pub pivot_scale: Vec2,
    pub pin_corners: CornerFlags,
    pub pin_radius: f32,
    pub pin_arrow_size: f32,
    pub pin_arrow_width: f32,
    pub group_rounding: f32,
    pub group_border_width: f32,
    /// Float for table symmetry; nonzero means on.
    pub highlight_connected_links: f32,
    /// Float for table symmetry; nonzero means on.
    pub snap_link_to_pin_dir: f32,
    pub colors: [Color; StyleColor::COUNT],
}

impl Default for Style {
    fn default() -> Self {
        let mut colors = [Color::WHITE; StyleColor::COUNT];
        colors[StyleColor::Bg as usize] = Color::rgba(60, 60, 70, 200);
        colors[StyleColor::Grid as usize] = Color::rgba(120, 120, 120, 40);
        colors[StyleColor::NodeBg as usize] = Color::rgba(32, 32, 32, 200);
        colors[StyleColor::NodeBorder as usize] = Color::rgba(255, 255, 255, 96);
        colors[StyleColor::HovNodeBorder as usize] = Color::rgba(50, 176, 255, 255);
        colors[StyleColor::SelNodeBorder as usize] = Color::rgba(255, 176, 50, 255);
        colors[StyleColor::NodeSelRect as usize] = Color::rgba(5, 130, 255, 64);
        colors[StyleColor::NodeSelRectBorder as usize] = Color::rgba(5, 130, 255, 128);
        colors[StyleColor::HovLinkBorder as usize] = Color::rgba(50, 176, 255, 255);
        colors[StyleColor::SelLinkBorder as usize] = Color::rgba(255, 176, 50, 255);
        colors[StyleColor::HighlightLinkBorder as usize] = Color::rgba(204, 105, 0, 255);
        colors[StyleColor::LinkSelRect as usize] = Color::rgba(5, 130, 255, 64);
        colors[StyleColor::LinkSelRectBorder as usize] = Color::rgba(5, 130, 255, 128);
        colors[StyleColor::PinRect as usize] = Color::rgba(60, 180, 255, 100);
        colors[StyleColor::PinRectBorder as usize] = Color::rgba(60, 180, 255, 128);
        colors[StyleColor::Flow as usize] = Color::rgba(255, 128, 64, 255);
        colors[StyleColor::FlowMarker as usize] = Color::rgba(255, 128, 64, 255);
        colors[StyleColor::GroupBg as usize] = Color::rgba(0, 0, 0, 160);
        colors[StyleColor::GroupBorder as usize] = Color::rgba(255, 255, 255, 32);

        Self {
            node_padding: [8.0, 8.0, 8.0, 8.0],
            node_rounding: 12.0,
            node_border_width: 1.5,
            hovered_node_border_width: 3.5,
            hovered_node_border_offset: 0.0,
            selected_node_border_width: 3.5,
            selected_node_border_offset: 0.0,
            pin_rounding: 4.0,
            pin_border_width: 0.0,
            link_strength: 100.0,
            source_direction: Vec2::new(1.0, 0.0),
            target_direction: Vec2::new(-1.0, 0.0),
            scroll_duration: 0.35,
            flow_marker_distance: 30.0,
            flow_speed: 150.0,
            flow_duration: 2.0,
            pivot_alignment: Vec2::new(0.5, 0.5),
            pivot_size: Vec2::ZERO,
            pivot_scale: Vec2::new(1.0, 1.0),
            pin_corners: CornerFlags::ALL,
            pin_radius: 0.0,
            pin_arrow_size: 0.0,
            pin_arrow_width: 0.0,
            group_rounding: 6.0,
            group_border_width: 1.0,
            highlight_connected_links: 0.0,
            snap_link_to_pin_dir: 0.0,
            colors,
        }
    }
}

impl Style {
    pub fn color(&self, which: StyleColor) -> Color {
        self.colors[which as usize]
    }

    pub fn set_color(&mut self, which: StyleColor, color: Color) {
        self.colors[which as usize] = color;
    }

    pub fn var(&self, var: StyleVar) -> VarValue {
        use StyleVar::*;
        match var {
            NodePadding => VarValue::Vec4(self.node_padding),
            NodeRounding => VarValue::Float(self.node_rounding),
            NodeBorderWidth => VarValue::Float(self.node_border_width),
            HoveredNodeBorderWidth => VarValue::Float(self.hovered_node_border_width),
            HoveredNodeBorderOffset => VarValue::Float(self.hovered_node_border_offset),
            SelectedNodeBorderWidth => VarValue::Float(self.selected_node_border_width),
            SelectedNodeBorderOffset => VarValue::Float(self.selected_node_border_offset),
            PinRounding => VarValue::Float(self.pin_rounding),
            PinBorderWidth => VarValue::Float(self.pin_border_width),
            LinkStrength => VarValue::Float(self.link_strength),
            SourceDirection => VarValue::Vec2(self.source_direction),
            TargetDirection => VarValue::Vec2(self.target_direction),
            ScrollDuration => VarValue::Float(self.scroll_duration),
            FlowMarkerDistance => VarValue::Float(self.flow_marker_distance),
            FlowSpeed => VarValue::Float(self.flow_speed),
            FlowDuration => VarValue::Float(self.flow_duration),
            PivotAlignment => VarValue::Vec2(self.pivot_alignment),
            PivotSize => VarValue::Vec2(self.pivot_size),
            PivotScale => VarValue::Vec2(self.pivot_scale),
            PinCorners => VarValue::Float(self.pin_corners.bits() as f32),
            PinRadius => VarValue::Float(self.pin_radius),
            PinArrowSize => VarValue::Float(self.pin_arrow_size),
            PinArrowWidth => VarValue::Float(self.pin_arrow_width),
            GroupRounding => VarValue::Float(self.group_rounding),
            GroupBorderWidth => VarValue::Float(self.group_border_width),
            HighlightConnectedLinks => VarValue::Float(self.highlight_connected_links),
            SnapLinkToPinDir => VarValue::Float(self.snap_link_to_pin_dir),
        }
    }

    pub fn set_var(&mut self, var: StyleVar, value: VarValue) {
        use StyleVar::*;
        match var {
            NodePadding => self.node_padding = value.expect_vec4(),
            NodeRounding => self.node_rounding = value.expect_float(),
            NodeBorderWidth => self.node_border_width = value.expect_float(),
            HoveredNodeBorderWidth => self.hovered_node_border_width = value.expect_float(),
            HoveredNodeBorderOffset => self.hovered_node_border_offset = value.expect_float(),
            SelectedNodeBorderWidth => self.selected_node_border_width = value.expect_float(),
            SelectedNodeBorderOffset => self.selected_node_border_offset = value.expect_float(),
            PinRounding => self.pin_rounding = value.expect_float(),
            PinBorderWidth => self.pin_border_width = value.expect_float(),
            LinkStrength => self.link_strength = value.expect_float(),
            SourceDirection => self.source_direction = value.expect_vec2(),
            TargetDirection => self.target_direction = value.expect_vec2(),
            ScrollDuration => self.scroll_duration = value.expect_float(),
            FlowMarkerDistance => self.flow_marker_distance = value.expect_float(),
            FlowSpeed => self.flow_speed = value.expect_float(),
            FlowDuration => self.flow_duration = value.expect_float(),
            PivotAlignment => self.pivot_alignment = value.expect_vec2(),
            PivotSize => self.pivot_size = value.expect_vec2(),
            PivotScale => self.pivot_scale = value.expect_vec2(),
            PinCorners => {
                self.pin_corners =
                    CornerFlags::from_bits_truncate(value.expect_float() as u8)
            }
            PinRadius => self.pin_radius = value.expect_float(),
            PinArrowSize => self.pin_arrow_size = value.expect_float(),
            PinArrowWidth => self.pin_arrow_width = value.expect_float(),
            GroupRounding => self.group_rounding = value.expect_float(),
            GroupBorderWidth => self.group_border_width = value.expect_float(),
            HighlightConnectedLinks => self.highlight_connected_links = value.expect_float(),
            SnapLinkToPinDir => self.snap_link_to_pin_dir = value.expect_float(),
        }
    }
}

/// Push/pop override stacks over a [`Style`].
#[derive(Default)]
pub struct StyleStacks {
    colors: Vec<(StyleColor, Color)>,
    vars: Vec<(StyleVar, VarValue)>,
}

impl StyleStacks {
    pub fn push_color(&mut self, style: &mut Style, which: StyleColor, color: Color) {
        self.colors.push((which, style.color(which)));
        style.set_color(which, color);
    }

    pub fn pop_color(&mut self, style: &mut Style, count: usize) {
        for _ in 0..count {
            let Some((which, previous)) = self.colors.pop() else {
                debug_assert!(false, "style color stack underflow");
                return;
            };
            style.set_color(which, previous);
        }
    }

    pub fn push_var(&mut self, style: &mut Style, var: StyleVar, value: VarValue) {
        self.vars.push((var, style.var(var)));
        style.set_var(var, value);
    }

    pub fn pop_var(&mut self, style: &mut Style, count: usize) {
        for _ in 0..count {
            let Some((var, previous)) = self.vars.pop() else {
                debug_assert!(false, "style var stack underflow");
                return;
            };
            style.set_var(var, previous);
        }
    }

    pub fn is_balanced(&self) -> bool {
        self.colors.is_empty() && self.vars.is_empty()
    }
}
