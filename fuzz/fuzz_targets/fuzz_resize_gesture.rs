#![no_main]

use arbitrary::Arbitrary;
use gridflow_core::{
    CancelReason, GridRect, MAX_GRID_ROWS, ResizeEvent, ResizeHandle, WidgetId, WidgetSnapshot,
    WidgetTree,
};
use gridflow_layout::{ResizeConfig, ResizeController, ResizeOutcome, find_overlap};
use libfuzzer_sys::fuzz_target;

const COLUMNS: i32 = 32;

#[derive(Debug, Arbitrary)]
struct Placement {
    left: u8,
    top: u8,
    width: u8,
    height: u8,
    pinned: bool,
}

#[derive(Debug, Arbitrary)]
enum Input {
    Down { widget: u8, handle: u8 },
    Drag { x: f64, y: f64 },
    Up,
    Cancel,
}

#[derive(Debug, Arbitrary)]
struct Case {
    placements: Vec<Placement>,
    target: u8,
    inputs: Vec<Input>,
}

fn id(raw: u64) -> WidgetId {
    WidgetId::new(raw).expect("non-zero ID")
}

/// Keep only placements that do not overlap the ones already accepted.
fn build_tree(placements: &[Placement]) -> WidgetTree {
    let mut widgets = vec![
        WidgetSnapshot::new(id(1), GridRect::new(0, 0, COLUMNS, 256)).columns(COLUMNS),
    ];
    let mut placed: Vec<GridRect> = Vec::new();
    for p in placements.iter().take(16) {
        let left = i32::from(p.left) % (COLUMNS - 1);
        let right = (left + 1 + i32::from(p.width) % 8).min(COLUMNS);
        let top = i32::from(p.top) % 32;
        let rect = GridRect::new(left, top, right, top + 1 + i32::from(p.height) % 6);
        if placed.iter().any(|other| other.overlaps(&rect)) {
            continue;
        }
        placed.push(rect);
        let raw = u64::try_from(widgets.len()).unwrap_or(u64::MAX) + 1;
        let mut widget = WidgetSnapshot::new(id(raw), rect)
            .parent(id(1))
            .spacing(8.0, 10.0);
        if p.pinned {
            widget = widget.pinned();
        }
        widgets.push(widget);
    }
    WidgetTree::from_widgets(widgets).expect("fuzz tree is valid")
}

fuzz_target!(|case: Case| {
    let mut tree = build_tree(&case.placements);
    let count = tree.len() as u64 - 1;
    if count == 0 {
        return;
    }
    let target = id(2 + u64::from(case.target) % count);
    let mut ctl = ResizeController::new(target, ResizeConfig::default());

    for input in case.inputs.iter().take(64) {
        let event = match *input {
            Input::Down { widget, handle } => ResizeEvent::HandleDown {
                widget: id(1 + u64::from(widget) % (count + 1)),
                handle: ResizeHandle::ALL[usize::from(handle) % 5],
            },
            Input::Drag { x, y } => ResizeEvent::Drag { x, y },
            Input::Up => ResizeEvent::HandleUp,
            Input::Cancel => ResizeEvent::Cancel {
                reason: CancelReason::PointerCaptureLost,
            },
        };
        let transition = ctl.apply_event(&tree, &event);

        if let ResizeOutcome::Updated { rect, .. } = transition.outcome {
            assert!(rect.left >= 0 && rect.right <= COLUMNS, "rect {rect} left the walls");
            assert!(rect.bottom <= MAX_GRID_ROWS, "rect {rect} passed the deepest row");
        }
        if let Some(commit) = transition.commit() {
            tree.apply_commit(&commit.to_tree_commit())
                .expect("commit applies");
            let layout: Vec<_> = tree
                .widgets()
                .filter(|w| w.parent.is_some())
                .map(|w| (w.id, w.rect))
                .collect();
            assert_eq!(find_overlap(&layout), None, "commit produced overlap");
        }
    }
});
