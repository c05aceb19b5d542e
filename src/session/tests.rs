use chrono::Utc;
use embassy_futures::block_on;
use quickread_core::MemoryProgressStore;

use super::*;
use crate::HostCodecs;

fn session_with(store: MemoryProgressStore) -> ReaderSession<MemoryProgressStore> {
    let settings = ReaderSettings::default();
    let driver = Arc::new(PlaybackDriver::new(settings.reader_config()));
    ReaderSession::new(driver, store, &settings)
}

fn session() -> ReaderSession<MemoryProgressStore> {
    session_with(MemoryProgressStore::new())
}

fn numbered_words(count: usize) -> String {
    (0..count)
        .map(|idx| format!("w{idx}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn opening_a_file_resets_playback() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut session = session();
    let doc = block_on(session.open_file(
        &mut HostCodecs,
        "notes.txt",
        b"Chapter 1 : Start here\nand keep reading".to_vec(),
    ))
    .unwrap();
    assert_eq!(doc.id, "notes.txt");
    assert_eq!(doc.len(), 8);

    let state = session.driver().state();
    assert_eq!(state.current_index, 0);
    assert!(!state.is_playing);
    assert_eq!(state.total_words, 8);
    assert_eq!(session.sections()[0].title, "Chapter 1 - Start here and keep reading");
}

#[test]
fn stored_position_is_resumed() {
    let mut store = MemoryProgressStore::new();
    store
        .save(&ProgressRecord::new("book.txt", 42, 100, Utc::now()).unwrap())
        .unwrap();
    let mut session = session_with(store);

    block_on(session.open_file(&mut HostCodecs, "book.txt", numbered_words(100).into_bytes()))
        .unwrap();
    assert_eq!(session.current_index(), 42);
    assert!(!session.driver().state().is_playing);
    assert_eq!(session.current_word().unwrap().focus, "4");
}

#[test]
fn position_zero_is_not_a_resume() {
    let mut store = MemoryProgressStore::new();
    store
        .save(&ProgressRecord::new("book.txt", 0, 100, Utc::now()).unwrap())
        .unwrap();
    let mut session = session_with(store);

    block_on(session.open_file(&mut HostCodecs, "book.txt", numbered_words(100).into_bytes()))
        .unwrap();
    assert_eq!(session.current_index(), 0);
}

#[test]
fn last_load_wins() {
    let mut session = session();
    let first = session.begin_load("first.txt");
    let second = session.begin_load("second.txt");

    let committed = session
        .commit(second, Document::from_text("second.txt", "newer text"))
        .unwrap();
    assert_eq!(committed.id, "second.txt");

    let stale = session.commit(first, Document::from_text("first.txt", "older text"));
    assert!(matches!(stale, Err(SessionError::Superseded(name)) if name == "first.txt"));
    assert_eq!(session.document().unwrap().id, "second.txt");
}

#[test]
fn stale_failure_is_also_dropped() {
    let mut session = session();
    let first = session.begin_load("broken.epub");
    let second = session.begin_load("fine.txt");
    session
        .commit(second, Document::from_text("fine.txt", "ok"))
        .unwrap();

    let stale = session.commit(first, Err(ExtractError::EmptyDocument));
    assert!(matches!(stale, Err(SessionError::Superseded(_))));
}

#[test]
fn failed_load_keeps_current_document() {
    let mut session = session();
    block_on(session.open_file(&mut HostCodecs, "a.txt", b"one two three".to_vec())).unwrap();
    session.go_to_word_index(2);

    let err = block_on(session.open_file(&mut HostCodecs, "b.epub", b"not a zip".to_vec()))
        .unwrap_err();
    assert!(matches!(err, SessionError::Extract(ExtractError::ArchiveRead(_))));
    assert!(err.to_string().contains("try a different file"));
    assert_eq!(session.document().unwrap().id, "a.txt");
    assert_eq!(session.current_index(), 2);
}

#[test]
fn pasted_text_gets_dated_identity() {
    let mut session = session();
    let doc = session.open_pasted("  a quick   note ").unwrap();
    assert!(doc.id.starts_with("Pasted text - "));
    assert_eq!(doc.len(), 3);

    assert!(matches!(
        session.open_pasted("   "),
        Err(SessionError::Extract(ExtractError::EmptyDocument))
    ));
}

#[test]
fn navigation_surface() {
    let mut session = session();
    let mut text = numbered_words(200);
    text.push_str(" Part II - The Return of the long lost words");
    block_on(session.open_file(&mut HostCodecs, "story.txt", text.into_bytes())).unwrap();

    let sections = session.sections().to_vec();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].title, "Beginning");
    assert_eq!(sections[1].word_index, 200);
    assert_eq!(sections[1].title, "Part II - The Return of the long");

    let total = session.document().unwrap().len();
    assert_eq!(total, 210);
    session.go_to_percent(50.0);
    assert_eq!(session.current_index(), total / 2);
    assert_eq!(session.current_section().unwrap().title, "Beginning");

    session.go_to_word_index(sections[1].word_index);
    assert_eq!(session.current_section().unwrap().word_index, 200);
    assert_eq!(
        session.section_preview(1).unwrap(),
        "Part II - The Return of the long lost words..."
    );
    assert_eq!(session.section_preview(5), None);
    assert_eq!(session.current_section_for(3).unwrap().title, "Beginning");
}

#[test]
fn autosave_runs_on_its_own_period() {
    let mut session = session();
    block_on(session.open_file(&mut HostCodecs, "book.txt", numbered_words(50).into_bytes()))
        .unwrap();
    assert!(!session.poll_autosave(0));

    session.go_to_word_index(10);
    assert!(session.poll_autosave(60_000));
    assert_eq!(session.next_autosave_ms(), 65_000);
    assert!(!session.poll_autosave(60_001));
    assert!(!session.poll_autosave(65_000));

    session.apply(ReaderAction::SkipForward);
    assert!(session.poll_autosave(70_000));

    let history = session.history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].current_index, 20);
    assert_eq!(history[0].percent, 40);
}

#[test]
fn switching_documents_saves_the_previous_one() {
    let mut session = session();
    block_on(session.open_file(&mut HostCodecs, "a.txt", numbered_words(30).into_bytes())).unwrap();
    session.go_to_word_index(12);
    block_on(session.open_file(&mut HostCodecs, "b.txt", numbered_words(30).into_bytes())).unwrap();

    let mut store = session.close();
    assert_eq!(store.load("a.txt").unwrap().unwrap().current_index, 12);
    assert_eq!(store.load("b.txt").unwrap().unwrap().current_index, 0);
}

#[test]
fn close_writes_final_position() {
    let mut session = session();
    block_on(session.open_file(&mut HostCodecs, "a.txt", numbered_words(30).into_bytes())).unwrap();
    session.go_to_word_index(29);
    assert!(session.forget("missing").is_ok_and(|existed| !existed));

    let mut store = session.close();
    let record = store.load("a.txt").unwrap().unwrap();
    assert_eq!(record.current_index, 29);
    assert_eq!(record.percent, 97);
}
