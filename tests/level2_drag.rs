//! Level 2: Click, Drag & Resize Tests
//!
//! Click selection, node dragging with grid snapping, group pickup and
//! group resizing.

mod common;

use common::harness::{Harness, TestPin};
use common::RecordingBackend;
use node_editor_core::{Config, CursorKind, DirtyReason, NodeId, PinKind, Vec2};

fn two_nodes(harness: &mut Harness) {
    harness.add_node(
        1,
        Vec2::new(100.0, 100.0),
        Vec2::new(100.0, 50.0),
        vec![TestPin {
            id: 11,
            kind: PinKind::Output,
            offset: Vec2::new(90.0, 20.0),
            size: Vec2::new(10.0, 10.0),
        }],
    );
    harness.add_node(
        2,
        Vec2::new(400.0, 200.0),
        Vec2::new(100.0, 50.0),
        vec![TestPin {
            id: 12,
            kind: PinKind::Input,
            offset: Vec2::new(0.0, 20.0),
            size: Vec2::new(10.0, 10.0),
        }],
    );
}

// ============================================================================
// Click selection
// ============================================================================

#[test]
fn test_click_selects_node() {
    let mut harness = Harness::new();
    two_nodes(&mut harness);
    harness.frame();

    harness.click(Vec2::new(150.0, 110.0), 0);

    assert_eq!(harness.selected_node_ids(), vec![1]);
    assert!(harness.editor.has_selection_changed());
}

#[test]
fn test_click_replaces_selection() {
    let mut harness = Harness::new();
    two_nodes(&mut harness);
    harness.frame();

    harness.click(Vec2::new(150.0, 110.0), 0);
    harness.click(Vec2::new(450.0, 210.0), 0);

    assert_eq!(harness.selected_node_ids(), vec![2]);
}

#[test]
fn test_ctrl_click_appends_and_toggles() {
    let mut harness = Harness::new();
    two_nodes(&mut harness);
    harness.frame();

    harness.click(Vec2::new(150.0, 110.0), 0);
    harness.modifiers.ctrl = true;
    harness.click(Vec2::new(450.0, 210.0), 0);

    let mut selected = harness.selected_node_ids();
    selected.sort();
    assert_eq!(selected, vec![1, 2]);

    // Ctrl+click on an already-selected node removes it.
    harness.click(Vec2::new(150.0, 110.0), 0);
    assert_eq!(harness.selected_node_ids(), vec![2]);
}

#[test]
fn test_background_click_clears_selection() {
    let mut harness = Harness::new();
    two_nodes(&mut harness);
    harness.frame();

    harness.click(Vec2::new(150.0, 110.0), 0);
    assert_eq!(harness.selected_node_ids().len(), 1);

    harness.click(Vec2::new(700.0, 500.0), 0);
    assert!(harness.selected_node_ids().is_empty());
}

// ============================================================================
// Dragging with snapping
// ============================================================================

#[test]
fn test_drag_moves_node_with_pivot_snap() {
    let mut harness = Harness::new();
    two_nodes(&mut harness);
    harness.frame();

    // Grab the node body away from its pin and drag by (30, 10).
    harness.drag(Vec2::new(150.0, 110.0), Vec2::new(180.0, 120.0), 0);

    // The pin pivot center (node position + (95, 25)) lands on the 16px grid.
    let position = harness.node_position(1);
    let pivot = position + Vec2::new(95.0, 25.0);
    assert_eq!(pivot.x % 16.0, 0.0, "pivot x {} not grid aligned", pivot.x);
    assert_eq!(pivot.y % 16.0, 0.0, "pivot y {} not grid aligned", pivot.y);
    assert_eq!(position, Vec2::new(129.0, 103.0));
}

#[test]
fn test_alt_drag_disables_snap() {
    let mut harness = Harness::new();
    two_nodes(&mut harness);
    harness.frame();

    harness.modifiers.alt = true;
    harness.drag(Vec2::new(150.0, 110.0), Vec2::new(180.0, 120.0), 0);

    assert_eq!(harness.node_position(1), Vec2::new(130.0, 110.0));
}

#[test]
fn test_drag_moves_whole_selection() {
    let mut harness = Harness::new();
    two_nodes(&mut harness);
    harness.frame();

    harness.click(Vec2::new(150.0, 110.0), 0);
    harness.modifiers.ctrl = true;
    harness.click(Vec2::new(450.0, 210.0), 0);
    harness.modifiers.ctrl = false;

    let before_1 = harness.node_position(1);
    let before_2 = harness.node_position(2);

    harness.modifiers.alt = true; // exact offsets for the assertion
    harness.drag(Vec2::new(150.0, 110.0), Vec2::new(170.0, 140.0), 0);

    let delta_1 = harness.node_position(1) - before_1;
    let delta_2 = harness.node_position(2) - before_2;
    assert_eq!(delta_1, Vec2::new(20.0, 30.0));
    assert_eq!(delta_2, Vec2::new(20.0, 30.0));
}

#[test]
fn test_drag_unselected_node_selects_it_alone() {
    let mut harness = Harness::new();
    two_nodes(&mut harness);
    harness.frame();

    harness.click(Vec2::new(450.0, 210.0), 0); // select node 2
    harness.modifiers.alt = true;
    harness.drag(Vec2::new(150.0, 110.0), Vec2::new(160.0, 120.0), 0); // drag node 1

    assert_eq!(harness.selected_node_ids(), vec![1]);
    // Node 2 did not move.
    assert_eq!(harness.node_position(2), Vec2::new(400.0, 200.0));
}

#[test]
fn test_drag_marks_position_dirty() {
    let backend = RecordingBackend::new();
    let config = Config {
        settings_backend: Some(Box::new(backend.clone())),
        ..Config::default()
    };
    let mut harness = Harness::with_config(config);
    two_nodes(&mut harness);
    harness.frame();

    harness.modifiers.alt = true;
    harness.drag(Vec2::new(150.0, 110.0), Vec2::new(180.0, 130.0), 0);
    harness.frame();

    assert!(backend.reasons().contains(DirtyReason::POSITION));
    assert!(backend
        .state
        .borrow()
        .node_saves
        .iter()
        .any(|(id, reason)| *id == 1 && reason.contains(DirtyReason::POSITION)));
}

// ============================================================================
// Group drag pickup
// ============================================================================

fn group_with_child(harness: &mut Harness) {
    // Header strip (50,50)-(250,70), interior (50,70)-(250,220).
    harness.add_group(
        10,
        Vec2::new(50.0, 50.0),
        Vec2::new(200.0, 20.0),
        Vec2::new(200.0, 150.0),
    );
    harness.add_node(
        1,
        Vec2::new(100.0, 100.0),
        Vec2::new(100.0, 50.0),
        vec![],
    );
}

#[test]
fn test_group_drag_carries_grouped_nodes() {
    let mut harness = Harness::new();
    group_with_child(&mut harness);
    harness.frame();

    let group_before = harness.node_position(10);
    let child_before = harness.node_position(1);

    harness.drag(Vec2::new(150.0, 60.0), Vec2::new(170.0, 90.0), 0);

    let group_delta = harness.node_position(10) - group_before;
    let child_delta = harness.node_position(1) - child_before;
    assert!(group_delta.length() > 0.0);
    assert_eq!(group_delta, child_delta);
}

#[test]
fn test_shift_group_drag_leaves_children() {
    let mut harness = Harness::new();
    group_with_child(&mut harness);
    harness.frame();

    let child_before = harness.node_position(1);

    harness.modifiers.shift = true;
    harness.drag(Vec2::new(150.0, 60.0), Vec2::new(170.0, 90.0), 0);

    assert_eq!(harness.node_position(1), child_before);
    assert!(harness.node_position(10) != Vec2::new(50.0, 50.0));
}

// ============================================================================
// Group resize
// ============================================================================

#[test]
fn test_group_border_hover_shows_resize_cursor() {
    let mut harness = Harness::new();
    group_with_child(&mut harness);
    harness.frame();

    harness.mouse_move(Vec2::new(250.0, 140.0)); // right border
    assert_eq!(harness.editor.cursor(), CursorKind::ResizeHorizontal);

    harness.mouse_move(Vec2::new(150.0, 220.0)); // bottom border
    assert_eq!(harness.editor.cursor(), CursorKind::ResizeVertical);
}

#[test]
fn test_group_resize_right_edge() {
    let backend = RecordingBackend::new();
    let config = Config {
        settings_backend: Some(Box::new(backend.clone())),
        ..Config::default()
    };
    let mut harness = Harness::with_config(config);
    group_with_child(&mut harness);
    harness.frame();

    harness.drag(Vec2::new(250.0, 140.0), Vec2::new(300.0, 140.0), 0);

    // Interior grew from 200 to 250 wide; the full node follows.
    let size = harness.editor.node_size(NodeId::new(10)).unwrap();
    assert_eq!(size.x, 250.0);

    harness.frame();
    assert!(backend.reasons().contains(DirtyReason::SIZE));
}

#[test]
fn test_group_resize_respects_minimum() {
    let mut harness = Harness::new();
    group_with_child(&mut harness);
    harness.frame();

    // Try to collapse the interior to nothing from the right edge; the
    // header width bounds the minimum.
    harness.drag(Vec2::new(250.0, 140.0), Vec2::new(60.0, 140.0), 0);

    let size = harness.editor.node_size(NodeId::new(10)).unwrap();
    assert!(size.x >= 200.0);
}
