use std::time::{Duration, Instant};

use tessella_engine::{
    BlockData, BlockId, DeleteOutcome, Editor, EngineOptions, MemorySurface, Payload, Registry,
};

fn fresh_editor() -> (Editor, MemorySurface) {
    let editor = Editor::new(Registry::with_builtins(), EngineOptions::default());
    let mut surface = MemorySurface::new();
    editor.mount(&mut surface);
    (editor, surface)
}

fn texts(editor: &Editor) -> Vec<String> {
    editor
        .document()
        .iter()
        .map(|b| b.payload.primary_text().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn hundred_structural_edits_leave_exactly_fifty_undo_entries() {
    let (mut editor, mut surface) = fresh_editor();
    let mut after = Some(editor.document().first_id());
    for i in 0..100 {
        let id = editor.insert_block(
            &mut surface,
            "paragraph",
            after,
            &BlockData::with_text(format!("p{i}")),
        );
        after = Some(id);
    }
    assert_eq!(editor.undo_depth(), 50);
}

#[test]
fn fifty_undos_return_to_first_captured_state_and_the_fifty_first_is_a_noop() {
    let (mut editor, mut surface) = fresh_editor();
    let mut after = Some(editor.document().first_id());
    for i in 0..100 {
        let id = editor.insert_block(
            &mut surface,
            "paragraph",
            after,
            &BlockData::with_text(format!("p{i}")),
        );
        after = Some(id);
    }
    for _ in 0..50 {
        assert!(editor.undo(&mut surface));
    }
    // The first captured state still on the stack was taken before edit 51,
    // i.e. a document of the seed block plus p0..=p49.
    assert_eq!(editor.document().len(), 51);
    assert!(!editor.undo(&mut surface), "51st undo must be a no-op");
    assert_eq!(editor.document().len(), 51);
}

#[test]
fn undo_and_redo_against_empty_stacks_are_silent_noops() {
    let (mut editor, mut surface) = fresh_editor();
    assert!(!editor.undo(&mut surface));
    assert!(!editor.redo(&mut surface));
    assert_eq!(editor.document().len(), 1);
}

#[test]
fn insert_heading_then_undo_restores_document_and_cursor() {
    // [Paragraph:"Hello"] + insert(heading, level 2) gives
    // [Paragraph, Heading2:""]; undo returns the original document with
    // the cursor back at its pre-insert offset.
    let (mut editor, mut surface) = fresh_editor();
    let p1 = editor.document().first_id();
    editor.update_block_data(
        &mut surface,
        p1,
        &BlockData::with_text("Hello"),
        Instant::now(),
    );
    surface.place_caret(p1, 2, true);

    let heading = editor.insert_block(
        &mut surface,
        "heading",
        Some(p1),
        &BlockData::default().level(2),
    );
    assert_eq!(texts(&editor), vec!["Hello".to_string(), String::new()]);
    match &editor.document().get(heading).unwrap().payload {
        Payload::Heading { level, .. } => assert_eq!(*level, 2),
        other => panic!("expected heading, got {other:?}"),
    }

    assert!(editor.undo(&mut surface));
    assert_eq!(texts(&editor), vec!["Hello".to_string()]);
    assert!(!editor.document().contains(heading));
    assert_eq!(surface.caret(), Some((p1, 2, true)));
}

#[test]
fn two_consecutive_identical_saves_yield_one_entry() {
    let (mut editor, mut surface) = fresh_editor();
    let first = editor.document().first_id();
    // A no-op "edit" (same content) pushed twice through the structural
    // path: the second snapshot equals the first and is dropped.
    editor.transform_block(&mut surface, first, "paragraph", None);
    editor.transform_block(&mut surface, first, "paragraph", None);
    assert_eq!(editor.undo_depth(), 1);
}

#[test]
fn redo_stack_clears_on_new_edit() {
    let (mut editor, mut surface) = fresh_editor();
    let first = editor.document().first_id();
    editor.insert_block(&mut surface, "paragraph", Some(first), &BlockData::with_text("a"));
    editor.undo(&mut surface);
    assert!(editor.can_redo());
    editor.insert_block(&mut surface, "paragraph", Some(first), &BlockData::with_text("b"));
    assert!(!editor.can_redo());
}

#[test]
fn debounced_burst_is_one_undo_step() {
    let (mut editor, mut surface) = fresh_editor();
    let first = editor.document().first_id();
    let t0 = Instant::now();
    for (i, text) in ["H", "He", "Hel", "Hell", "Hello"].iter().enumerate() {
        editor.update_block_data(
            &mut surface,
            first,
            &BlockData::with_text(*text),
            t0 + Duration::from_millis(100 * i as u64),
        );
    }
    // Quiet window not elapsed: nothing recorded yet.
    editor.tick(t0 + Duration::from_millis(900));
    assert_eq!(editor.undo_depth(), 0);
    // One second after the last edit the single deferred entry fires.
    editor.tick(t0 + Duration::from_millis(1500));
    assert_eq!(editor.undo_depth(), 1);

    assert!(editor.undo(&mut surface));
    assert_eq!(texts(&editor), vec![String::new()]);
}

#[test]
fn structural_edit_never_merges_with_a_pending_burst() {
    let (mut editor, mut surface) = fresh_editor();
    let first = editor.document().first_id();
    let t0 = Instant::now();
    editor.update_block_data(&mut surface, first, &BlockData::with_text("typed"), t0);
    // Structural edit arrives before the debounce fires: both the burst
    // boundary and the structural pre-state are recorded separately.
    editor.insert_block(&mut surface, "divider", Some(first), &BlockData::default());
    assert_eq!(editor.undo_depth(), 2);

    assert!(editor.undo(&mut surface));
    assert_eq!(texts(&editor), vec!["typed".to_string()]);
    assert!(editor.undo(&mut surface));
    assert_eq!(texts(&editor), vec![String::new()]);
}

#[test]
fn undo_restores_multi_selection() {
    let (mut editor, mut surface) = fresh_editor();
    let first = editor.document().first_id();
    let second =
        editor.insert_block(&mut surface, "paragraph", Some(first), &BlockData::with_text("b"));
    editor.toggle_select(first);
    editor.toggle_select(second);
    editor.delete_selection(&mut surface);
    assert!(editor.selection().is_empty());

    assert!(editor.undo(&mut surface));
    assert_eq!(editor.document().len(), 2);
    assert_eq!(editor.selection().len(), 2);
}

#[test]
fn deleting_sole_block_clears_it_and_document_stays_non_empty() {
    let (mut editor, mut surface) = fresh_editor();
    let only = editor.document().first_id();
    editor.update_block_data(
        &mut surface,
        only,
        &BlockData::with_text("content"),
        Instant::now(),
    );
    let outcome = editor.delete_block(&mut surface, only);
    assert_eq!(outcome, DeleteOutcome::ClearedLast);
    assert_eq!(editor.document().len(), 1);
    assert!(editor.document().get(only).unwrap().payload.is_empty());
}

#[test]
fn deleting_unknown_block_is_missing_and_records_nothing() {
    let (mut editor, mut surface) = fresh_editor();
    let outcome = editor.delete_block(&mut surface, BlockId::new());
    assert_eq!(outcome, DeleteOutcome::Missing);
    assert_eq!(editor.undo_depth(), 0);
}

#[test]
fn caret_always_lands_on_an_existing_block_after_swaps() {
    let (mut editor, mut surface) = fresh_editor();
    let first = editor.document().first_id();
    let second =
        editor.insert_block(&mut surface, "paragraph", Some(first), &BlockData::with_text("b"));
    // Caret sits in the second block; capture happens on the next push.
    surface.place_caret(second, 1, true);
    editor.delete_block(&mut surface, second);

    // Undo restores the two-block state; redo goes forward again, and its
    // captured caret (on the deleted block) must fall back gracefully.
    editor.undo(&mut surface);
    editor.redo(&mut surface);
    assert_eq!(editor.document().len(), 1);
    let (caret_block, _, _) = surface.caret().expect("caret must land somewhere");
    assert!(editor.document().contains(caret_block));
}
