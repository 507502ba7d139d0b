//! End-to-end resize gestures against small canvases.
//!
//! Each test drives a [`ResizeController`] through a full pointer gesture,
//! then applies the resulting commit to the tree and checks the committed
//! layout.

use gridflow_core::{
    CancelReason, FlexLayer, GridRect, LayerAlignment, MAX_GRID_ROWS, ResizeEvent, ResizeHandle,
    SizeLimits, WidgetId, WidgetSnapshot, WidgetTree,
};
use gridflow_layout::{
    ReflowAction, ReflowedSpace, ReflowedSpaceMap, ResizeCommit, ResizeConfig, ResizeController,
    ResizeOutcome, ResizePhase, ResizeTransition, find_overlap,
};

const ROOT: u64 = 1;
const A: u64 = 2;
const B: u64 = 3;
const F1: u64 = 4;
const F2: u64 = 5;

fn id(raw: u64) -> WidgetId {
    WidgetId::new(raw).expect("test ID must be non-zero")
}

fn child(raw: u64, rect: GridRect) -> WidgetSnapshot {
    WidgetSnapshot::new(id(raw), rect)
        .parent(id(ROOT))
        .spacing(10.0, 10.0)
}

/// Auto-layout row of 8 columns holding A then B.
fn row_tree(b_fill: bool) -> WidgetTree {
    let root = WidgetSnapshot::new(id(ROOT), GridRect::new(0, 0, 8, 40))
        .columns(8)
        .canvas_rows(10)
        .flex_layers(vec![FlexLayer::new([
            (id(A), LayerAlignment::Start),
            (id(B), LayerAlignment::Start),
        ])]);
    let a = child(A, GridRect::new(0, 0, 4, 4));
    let mut b = child(B, GridRect::new(4, 0, 8, 4));
    if b_fill {
        b = b.fill().limits(SizeLimits {
            min_columns: 2,
            ..SizeLimits::default()
        });
    }
    WidgetTree::from_widgets([root, a, b]).expect("valid tree")
}

/// Free canvas with B stacked directly under A.
fn stacked_tree() -> WidgetTree {
    let root = WidgetSnapshot::new(id(ROOT), GridRect::new(0, 0, 64, 100)).canvas_rows(10);
    let a = child(A, GridRect::new(0, 0, 4, 5));
    let b = child(B, GridRect::new(0, 5, 4, 10));
    WidgetTree::from_widgets([root, a, b]).expect("valid tree")
}

/// Full-width auto-layout row built from `(id, left, right, fill minimum)`,
/// where a `None` minimum marks a fixed member.
fn layer_tree(members: &[(u64, i32, i32, Option<i32>)]) -> WidgetTree {
    let root = WidgetSnapshot::new(id(ROOT), GridRect::new(0, 0, 64, 100))
        .canvas_rows(10)
        .flex_layers(vec![FlexLayer::new(
            members
                .iter()
                .map(|&(raw, ..)| (id(raw), LayerAlignment::Start)),
        )]);
    let mut widgets = vec![root];
    for &(raw, left, right, fill_min) in members {
        let mut widget = child(raw, GridRect::new(left, 0, right, 4));
        if let Some(min_columns) = fill_min {
            widget = widget.fill().limits(SizeLimits {
                min_columns,
                ..SizeLimits::default()
            });
        }
        widgets.push(widget);
    }
    WidgetTree::from_widgets(widgets).expect("valid tree")
}

fn frame_moves(transition: &ResizeTransition) -> ReflowedSpaceMap {
    transition
        .actions
        .iter()
        .find_map(|action| match action {
            ReflowAction::ReflowMove { moves } => Some(moves.clone()),
            _ => None,
        })
        .expect("reflow move dispatched")
}

/// Where the presentation layer draws each row member for a frame.
fn drawn_spans(tree: &WidgetTree, moves: &ReflowedSpaceMap, members: &[u64]) -> Vec<(i32, i32)> {
    members
        .iter()
        .map(|&raw| {
            let rect = rect_of(tree, raw);
            let (left, columns) = moves.get(&id(raw)).map_or(
                (rect.left, rect.columns()),
                |space| {
                    (
                        rect.left + space.x.map_or(0, |x| (x / 10.0) as i32),
                        space.width.map_or(rect.columns(), |w| (w / 10.0) as i32),
                    )
                },
            );
            (left, left + columns)
        })
        .collect()
}

fn gesture(
    ctl: &mut ResizeController,
    tree: &WidgetTree,
    handle: ResizeHandle,
    drags: &[(f64, f64)],
) -> Vec<ResizeTransition> {
    let mut transitions = vec![ctl.apply_event(
        tree,
        &ResizeEvent::HandleDown {
            widget: ctl.widget(),
            handle,
        },
    )];
    for &(x, y) in drags {
        transitions.push(ctl.apply_event(tree, &ResizeEvent::Drag { x, y }));
    }
    transitions.push(ctl.apply_event(tree, &ResizeEvent::HandleUp));
    transitions
}

fn committed(transitions: &[ResizeTransition]) -> Option<ResizeCommit> {
    transitions.last().and_then(ResizeTransition::commit).cloned()
}

fn rect_of(tree: &WidgetTree, raw: u64) -> GridRect {
    tree.get(id(raw)).expect("widget present").rect
}

#[test]
fn fixed_neighbour_in_row_blocks_growth() {
    let tree = row_tree(false);
    let mut ctl = ResizeController::new(id(A), ResizeConfig::default());
    let transitions = gesture(&mut ctl, &tree, ResizeHandle::Right, &[(20.0, 0.0)]);

    let ResizeOutcome::Updated { rect, limit, .. } = transitions[1].outcome else {
        panic!("expected update, got {:?}", transitions[1].outcome);
    };
    assert_eq!(rect, GridRect::new(0, 0, 4, 4));
    assert!(!limit.can_horizontal_move);
    assert_eq!(transitions[2].outcome, ResizeOutcome::Released);
    assert!(committed(&transitions).is_none());
    assert_eq!(rect_of(&tree, A), GridRect::new(0, 0, 4, 4));
    assert_eq!(rect_of(&tree, B), GridRect::new(4, 0, 8, 4));
}

#[test]
fn fill_neighbour_absorbs_growth() {
    let mut tree = row_tree(true);
    let mut ctl = ResizeController::new(id(A), ResizeConfig::default());
    let transitions = gesture(&mut ctl, &tree, ResizeHandle::Right, &[(20.0, 0.0)]);

    let moves = transitions[1]
        .actions
        .iter()
        .find_map(|action| match action {
            ReflowAction::ReflowMove { moves } => Some(moves.clone()),
            _ => None,
        })
        .expect("reflow move dispatched");
    let b_move = moves.get(&id(B)).expect("B displaced");
    assert_eq!(b_move.width, Some(20.0));
    assert_eq!(b_move.x, Some(20.0));

    let commit = committed(&transitions).expect("commit");
    assert_eq!(commit.rect, GridRect::new(0, 0, 6, 4));
    assert_eq!(commit.reflowed, vec![(id(B), GridRect::new(6, 0, 8, 4))]);
    tree.apply_commit(&commit.to_tree_commit()).expect("apply");
    assert_eq!(rect_of(&tree, A), GridRect::new(0, 0, 6, 4));
    assert_eq!(rect_of(&tree, B), GridRect::new(6, 0, 8, 4));
}

#[test]
fn fill_neighbour_stops_at_minimum() {
    let tree = row_tree(true);
    let mut ctl = ResizeController::new(id(A), ResizeConfig::default());
    let transitions = gesture(&mut ctl, &tree, ResizeHandle::Right, &[(40.0, 0.0)]);

    let ResizeOutcome::Updated { rect, limit, .. } = transitions[1].outcome else {
        panic!("expected update, got {:?}", transitions[1].outcome);
    };
    assert_eq!(rect, GridRect::new(0, 0, 6, 4));
    assert!(!limit.can_horizontal_move);
    let commit = committed(&transitions).expect("partial growth commits");
    assert_eq!(commit.reflowed, vec![(id(B), GridRect::new(6, 0, 8, 4))]);
}

#[test]
fn fill_members_share_growth_and_commit_what_was_drawn() {
    let mut tree = layer_tree(&[(A, 0, 4, None), (F1, 4, 34, Some(1)), (F2, 34, 64, Some(1))]);
    let mut ctl = ResizeController::new(id(A), ResizeConfig::default());
    let transitions = gesture(&mut ctl, &tree, ResizeHandle::Right, &[(100.0, 0.0)]);

    let moves = frame_moves(&transitions[1]);
    assert_eq!(
        moves.get(&id(F1)),
        Some(&ReflowedSpace {
            width: Some(250.0),
            x: Some(100.0),
            ..ReflowedSpace::default()
        })
    );
    assert_eq!(
        moves.get(&id(F2)),
        Some(&ReflowedSpace {
            width: Some(250.0),
            x: Some(50.0),
            ..ReflowedSpace::default()
        })
    );
    assert_eq!(
        drawn_spans(&tree, &moves, &[A, F1, F2]),
        vec![(0, 4), (14, 39), (39, 64)]
    );

    let commit = committed(&transitions).expect("commit");
    assert_eq!(commit.rect, GridRect::new(0, 0, 14, 4));
    assert_eq!(
        commit.reflowed,
        vec![
            (id(F1), GridRect::new(14, 0, 39, 4)),
            (id(F2), GridRect::new(39, 0, 64, 4)),
        ]
    );
    // Every committed sibling matches the override drawn on the last frame.
    for (sibling, rect) in &commit.reflowed {
        let before = rect_of(&tree, sibling.get());
        let spacing = tree.get(*sibling).and_then(|w| w.grid_spacing().ok()).expect("spacing");
        assert_eq!(moves.get(sibling), Some(&ReflowedSpace::between(&before, rect, spacing)));
    }

    tree.apply_commit(&commit.to_tree_commit()).expect("apply");
    let spans: Vec<_> = [A, F1, F2].iter().map(|&raw| rect_of(&tree, raw)).collect();
    assert_eq!(spans.iter().map(GridRect::columns).sum::<i32>(), 64);
    let layout: Vec<_> = tree.children_of(id(ROOT)).map(|w| (w.id, w.rect)).collect();
    assert_eq!(find_overlap(&layout), None);
}

#[test]
fn fill_at_minimum_freezes_horizontal_axis() {
    let tree = layer_tree(&[(F1, 0, 30, Some(30)), (A, 30, 34, None), (F2, 34, 64, Some(1))]);
    let mut ctl = ResizeController::new(id(A), ResizeConfig::default());
    let transitions = gesture(&mut ctl, &tree, ResizeHandle::Right, &[(60.0, 0.0)]);

    let ResizeOutcome::Updated { rect, limit, .. } = transitions[1].outcome else {
        panic!("expected update, got {:?}", transitions[1].outcome);
    };
    assert_eq!(rect, GridRect::new(30, 0, 34, 4));
    assert!(!limit.can_horizontal_move);
    assert!(frame_moves(&transitions[1]).is_empty());
    assert_eq!(transitions[2].outcome, ResizeOutcome::Released);
    assert!(committed(&transitions).is_none());
}

#[test]
fn frozen_axis_holds_last_legal_width() {
    let mut tree = layer_tree(&[(F1, 0, 30, Some(28)), (A, 30, 34, None), (F2, 34, 64, Some(1))]);
    let mut ctl = ResizeController::new(id(A), ResizeConfig::default());
    let transitions = gesture(
        &mut ctl,
        &tree,
        ResizeHandle::Right,
        &[(20.0, 0.0), (60.0, 0.0)],
    );

    // Two extra columns leave 29 for each fill member; six would leave 27,
    // under F1's minimum, so the second frame keeps the first frame's span.
    let ResizeOutcome::Updated { rect: first, .. } = transitions[1].outcome else {
        panic!("expected update, got {:?}", transitions[1].outcome);
    };
    let ResizeOutcome::Updated { rect: held, limit, .. } = transitions[2].outcome else {
        panic!("expected update, got {:?}", transitions[2].outcome);
    };
    assert_eq!(first, GridRect::new(29, 0, 35, 4));
    assert_eq!(held, first);
    assert!(!limit.can_horizontal_move);
    assert_eq!(frame_moves(&transitions[2]), frame_moves(&transitions[1]));

    let commit = committed(&transitions).expect("commit");
    assert_eq!(commit.rect, GridRect::new(29, 0, 35, 4));
    assert_eq!(
        commit.reflowed,
        vec![
            (id(F1), GridRect::new(0, 0, 29, 4)),
            (id(F2), GridRect::new(35, 0, 64, 4)),
        ]
    );
    tree.apply_commit(&commit.to_tree_commit()).expect("apply");
    assert!(tree.get(id(F1)).is_some_and(|w| w.rect.columns() >= 28));
    let layout: Vec<_> = tree.children_of(id(ROOT)).map(|w| (w.id, w.rect)).collect();
    assert_eq!(find_overlap(&layout), None);
}

#[test]
fn huge_pointer_delta_is_clamped_not_fatal() {
    let mut tree = stacked_tree();
    let mut ctl = ResizeController::new(id(A), ResizeConfig::default());
    let transitions = gesture(&mut ctl, &tree, ResizeHandle::Bottom, &[(0.0, 1e12)]);
    let ResizeOutcome::Updated { rect, clamped, .. } = transitions[1].outcome else {
        panic!("expected update, got {:?}", transitions[1].outcome);
    };
    assert_eq!(rect, GridRect::new(0, 0, 4, MAX_GRID_ROWS));
    assert!(clamped);

    let commit = committed(&transitions).expect("commit");
    tree.apply_commit(&commit.to_tree_commit()).expect("apply");
    assert_eq!(rect_of(&tree, B), GridRect::new(0, MAX_GRID_ROWS, 4, MAX_GRID_ROWS + 5));
    assert_eq!(commit.canvas_rows, MAX_GRID_ROWS + 5);
}

#[test]
fn pushing_down_grows_canvas_mid_drag() {
    let mut tree = stacked_tree();
    let mut ctl = ResizeController::new(id(A), ResizeConfig::default());
    let transitions = gesture(&mut ctl, &tree, ResizeHandle::Bottom, &[(0.0, 50.0)]);

    let update = &transitions[1];
    assert!(update.actions.contains(&ReflowAction::UpdateBottomRow {
        container: id(ROOT),
        rows: 15,
    }));
    let grew = tree.extend_canvas_rows(id(ROOT), 15).expect("container");
    assert!(grew);
    assert_eq!(tree.get(id(ROOT)).map(|w| w.canvas_rows), Some(15));

    let commit = committed(&transitions).expect("commit");
    assert_eq!(commit.rect, GridRect::new(0, 0, 4, 10));
    assert_eq!(commit.canvas_rows, 15);
    assert_eq!(commit.size.height, 100.0);
    tree.apply_commit(&commit.to_tree_commit()).expect("apply");
    assert_eq!(rect_of(&tree, B), GridRect::new(0, 10, 4, 15));

    let rects: Vec<_> = tree
        .children_of(id(ROOT))
        .map(|widget| (widget.id, widget.rect))
        .collect();
    assert_eq!(find_overlap(&rects), None);
}

#[test]
fn growth_event_fires_once_per_new_bottom() {
    let tree = stacked_tree();
    let mut ctl = ResizeController::new(id(A), ResizeConfig::default());
    let transitions = gesture(
        &mut ctl,
        &tree,
        ResizeHandle::Bottom,
        &[(0.0, 50.0), (0.0, 50.0), (0.0, 60.0)],
    );
    let rows: Vec<i32> = transitions
        .iter()
        .flat_map(|t| t.actions.iter())
        .filter_map(|action| match action {
            ReflowAction::UpdateBottomRow { rows, .. } => Some(*rows),
            _ => None,
        })
        .collect();
    assert_eq!(rows, vec![15, 16]);
}

#[test]
fn removing_widget_mid_drag_cancels_cleanly() {
    let mut tree = stacked_tree();
    let mut ctl = ResizeController::new(id(A), ResizeConfig::default());
    ctl.apply_event(
        &tree,
        &ResizeEvent::HandleDown {
            widget: id(A),
            handle: ResizeHandle::Bottom,
        },
    );
    ctl.apply_event(&tree, &ResizeEvent::Drag { x: 0.0, y: 30.0 });
    assert!(!ctl.pending_reflow().is_empty());

    tree.remove(id(A)).expect("remove");
    let t = ctl.sync_tree(&tree).expect("gesture cancelled");
    assert_eq!(t.from, ResizePhase::Dragging);
    assert_eq!(t.to, ResizePhase::Idle);
    assert_eq!(
        t.outcome,
        ResizeOutcome::Cancelled {
            reason: CancelReason::WidgetRemoved
        }
    );
    assert!(t.actions.contains(&ReflowAction::StopReflow));
    assert!(t.commit().is_none());
    assert!(ctl.pending_reflow().is_empty());

    // Later input for the stale gesture is ignored.
    let t = ctl.apply_event(&tree, &ResizeEvent::HandleUp);
    assert!(t.is_noop());
    assert_eq!(rect_of(&tree, B), GridRect::new(0, 5, 4, 10));
}

#[test]
fn removal_seen_through_pointer_input_also_cancels() {
    let mut tree = stacked_tree();
    let mut ctl = ResizeController::new(id(A), ResizeConfig::default());
    ctl.apply_event(
        &tree,
        &ResizeEvent::HandleDown {
            widget: id(A),
            handle: ResizeHandle::Bottom,
        },
    );
    tree.remove(id(A)).expect("remove");
    let t = ctl.apply_event(&tree, &ResizeEvent::Drag { x: 0.0, y: 30.0 });
    assert!(matches!(t.outcome, ResizeOutcome::Cancelled { .. }));
}

#[test]
fn mobile_gesture_writes_mobile_fields() {
    let root = WidgetSnapshot::new(id(ROOT), GridRect::new(0, 0, 64, 100)).canvas_rows(10);
    let a = child(A, GridRect::new(0, 0, 4, 4)).mobile_rect(GridRect::new(0, 0, 32, 4));
    let mut tree = WidgetTree::from_widgets([root, a]).expect("valid tree");
    let config = ResizeConfig {
        mobile: true,
        ..ResizeConfig::default()
    };
    let mut ctl = ResizeController::new(id(A), config);
    let transitions = gesture(&mut ctl, &tree, ResizeHandle::Right, &[(80.0, 0.0)]);
    let commit = committed(&transitions).expect("commit");
    assert_eq!(commit.rect, GridRect::new(0, 0, 40, 4));

    tree.apply_commit(&commit.to_tree_commit()).expect("apply");
    let a = tree.get(id(A)).expect("widget");
    assert_eq!(a.rect, GridRect::new(0, 0, 4, 4));
    assert_eq!(a.mobile_rect, Some(GridRect::new(0, 0, 40, 4)));
}

#[test]
fn transitions_serialize_for_host_dispatch() {
    let tree = row_tree(true);
    let mut ctl = ResizeController::new(id(A), ResizeConfig::default());
    let transitions = gesture(&mut ctl, &tree, ResizeHandle::Right, &[(20.0, 0.0)]);
    let json = serde_json::to_string(&transitions).expect("serialize");
    assert!(json.contains("\"action\":\"start_reflow\""));
    assert!(json.contains("\"action\":\"reflow_move\""));
    assert!(json.contains("\"outcome\":\"updated\""));

    let last = transitions.last().expect("release transition");
    let json = serde_json::to_string(last).expect("serialize");
    assert!(json.contains("\"action\":\"commit\""));
    let back: ResizeTransition = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(&back, last);
}
