use tessella_engine::{
    AutoScroll, BlockData, BlockId, Editor, EngineOptions, LayoutRect, MemorySurface, Registry,
    Viewport,
};

fn editor_with_blocks(n: usize) -> (Editor, MemorySurface, Vec<BlockId>) {
    let mut editor = Editor::new(Registry::with_builtins(), EngineOptions::default());
    let mut surface = MemorySurface::new();
    let first = editor.document().first_id();
    let mut ids = vec![first];
    for i in 1..n {
        let id = editor.insert_block(
            &mut surface,
            "paragraph",
            ids.last().copied(),
            &BlockData::with_text(format!("block {i}")),
        );
        ids.push(id);
    }
    surface.blur();
    (editor, surface, ids)
}

fn layout_for(ids: &[BlockId]) -> Vec<LayoutRect> {
    ids.iter()
        .enumerate()
        .map(|(i, &id)| LayoutRect {
            id,
            top: i as f64 * 50.0,
            height: 50.0,
        })
        .collect()
}

const VIEWPORT: Viewport = Viewport {
    top: 0.0,
    height: 1000.0,
};

#[test]
fn dragging_a_selection_between_its_own_members_is_rejected() {
    let (mut editor, mut surface, ids) = editor_with_blocks(5);
    let depth_before = editor.undo_depth();
    // Three selected blocks with a stationary block (3) inside their span.
    editor.toggle_select(ids[1]);
    editor.toggle_select(ids[2]);
    editor.toggle_select(ids[4]);

    assert!(editor.drag_start(ids[1]));
    // Pointer targets "insert before block 3", a slot between the
    // selection's own members, which would interleave stationary content.
    let layout = layout_for(editor.document().block_ids());
    editor.drag_track(150.0, &layout, VIEWPORT);

    let order_before = editor.document().block_ids().to_vec();
    assert!(!editor.drag_drop(&mut surface));
    assert_eq!(editor.document().block_ids(), order_before.as_slice());
    assert_eq!(editor.undo_depth(), depth_before, "no history entry");
}

#[test]
fn dragging_a_selection_outside_the_group_moves_it_atomically() {
    let (mut editor, mut surface, ids) = editor_with_blocks(5);
    editor.toggle_select(ids[3]);
    editor.toggle_select(ids[1]);
    editor.toggle_select(ids[2]);

    assert!(editor.drag_start(ids[2]));
    let layout = layout_for(editor.document().block_ids());
    // Pointer above block 0's midpoint: insert before the first block.
    editor.drag_track(10.0, &layout, VIEWPORT);
    assert!(editor.drag_drop(&mut surface));

    // Relative order preserved, group contiguous at the front.
    assert_eq!(
        editor.document().block_ids(),
        &[ids[1], ids[2], ids[3], ids[0], ids[4]]
    );
}

#[test]
fn rejected_drop_then_valid_drop_still_works() {
    let (mut editor, mut surface, ids) = editor_with_blocks(4);
    editor.toggle_select(ids[0]);
    editor.toggle_select(ids[2]);

    editor.drag_start(ids[0]);
    let layout = layout_for(editor.document().block_ids());
    editor.drag_track(60.0, &layout, VIEWPORT); // inside the selection span
    assert!(!editor.drag_drop(&mut surface));

    editor.drag_start(ids[0]);
    editor.drag_track(2000.0, &layout, VIEWPORT); // past everything
    assert!(editor.drag_drop(&mut surface));
    assert_eq!(
        editor.document().block_ids(),
        &[ids[1], ids[3], ids[0], ids[2]]
    );
}

#[test]
fn single_block_drag_to_bottom() {
    let (mut editor, mut surface, ids) = editor_with_blocks(3);
    editor.drag_start(ids[0]);
    let layout = layout_for(editor.document().block_ids());
    editor.drag_track(500.0, &layout, VIEWPORT);
    assert!(editor.drag_drop(&mut surface));
    assert_eq!(editor.document().block_ids(), &[ids[1], ids[2], ids[0]]);
}

#[test]
fn successful_drop_is_one_undoable_step() {
    let (mut editor, mut surface, ids) = editor_with_blocks(3);
    let depth_before = editor.undo_depth();
    editor.drag_start(ids[2]);
    let layout = layout_for(editor.document().block_ids());
    editor.drag_track(10.0, &layout, VIEWPORT);
    assert!(editor.drag_drop(&mut surface));
    assert_eq!(editor.document().block_ids(), &[ids[2], ids[0], ids[1]]);
    assert_eq!(editor.undo_depth(), depth_before + 1);

    assert!(editor.undo(&mut surface));
    assert_eq!(editor.document().block_ids(), &[ids[0], ids[1], ids[2]]);
}

#[test]
fn auto_scroll_directives_follow_the_pointer() {
    let (mut editor, _surface, ids) = editor_with_blocks(3);
    editor.drag_start(ids[0]);
    let layout = layout_for(editor.document().block_ids());
    let viewport = Viewport {
        top: 0.0,
        height: 400.0,
    };
    assert_eq!(editor.drag_track(10.0, &layout, viewport), AutoScroll::Up);
    assert_eq!(editor.drag_track(395.0, &layout, viewport), AutoScroll::Down);
    assert_eq!(editor.drag_track(200.0, &layout, viewport), AutoScroll::None);
}

#[test]
fn drag_of_unknown_block_never_starts() {
    let (mut editor, mut surface, _) = editor_with_blocks(2);
    assert!(!editor.drag_start(BlockId::new()));
    assert!(!editor.drag_drop(&mut surface));
}

#[test]
fn gesture_ending_without_release_leaves_the_tree_unchanged() {
    let (mut editor, mut surface, ids) = editor_with_blocks(3);
    let depth_before = editor.undo_depth();
    editor.toggle_select(ids[0]);
    editor.toggle_select(ids[2]);
    editor.drag_start(ids[0]);
    let layout = layout_for(editor.document().block_ids());
    editor.drag_track(500.0, &layout, VIEWPORT);
    editor.drag_cancel();

    assert!(!editor.drag_drop(&mut surface));
    assert_eq!(editor.document().block_ids(), &[ids[0], ids[1], ids[2]]);
    assert_eq!(editor.undo_depth(), depth_before);
}
