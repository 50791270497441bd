use goodboy::lessons::{score_lesson, LessonStore, LESSONS_FILE};
use goodboy::GoodBoyError;

#[test]
fn test_tag_and_instruction_overlap_scoring() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LessonStore::open(dir.path()).unwrap();
    let lesson = store
        .add_lesson("deploys", "always run tests first", ["ci"])
        .unwrap();

    // tag "ci" (2) + shared word "tests" (1), times 0.5 + 0.5
    assert!((score_lesson(&lesson, "what about ci tests") - 3.0).abs() < 1e-6);

    let found = store.get_relevant_lessons("what about ci tests", 3);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, lesson.id);
}

#[test]
fn test_topic_match_and_ranking() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LessonStore::open(dir.path()).unwrap();
    let weak = store.add_lesson("cooking", "use less salt", Vec::<String>::new()).unwrap();
    let strong = store
        .add_lesson("deploys", "never deploy on friday", ["release"])
        .unwrap();
    store.add_lesson("gardening", "water at dawn", ["plants"]).unwrap();

    let found = store.get_relevant_lessons("any deploys planned for friday release", 5);
    let ids: Vec<_> = found.iter().map(|l| l.id.clone()).collect();
    assert_eq!(ids, vec![strong.id.clone()]);
    assert!(store.get_relevant_lessons("salt please", 5)[0].id == weak.id);
}

#[test]
fn test_zero_scores_are_excluded_and_k_is_respected() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LessonStore::open(dir.path()).unwrap();
    for i in 0..5 {
        store
            .add_lesson(&format!("topic{}", i), "format code with rustfmt", ["style"])
            .unwrap();
    }
    assert!(store.get_relevant_lessons("weather tomorrow", 10).is_empty());
    assert_eq!(store.get_relevant_lessons("style check", 2).len(), 2);
}

#[test]
fn test_equal_scores_keep_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LessonStore::open(dir.path()).unwrap();
    let first = store.add_lesson("a1", "prefer tabs", ["editor"]).unwrap();
    let second = store.add_lesson("a2", "prefer spaces", ["editor"]).unwrap();
    let found = store.get_relevant_lessons("editor", 2);
    assert_eq!(found[0].id, first.id);
    assert_eq!(found[1].id, second.id);
}

#[test]
fn test_feedback_clamps_effectiveness() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LessonStore::open(dir.path()).unwrap();
    let lesson = store.add_lesson("t", "be concise", ["style"]).unwrap();

    for _ in 0..10 {
        assert!(store.mark_lesson_used(&lesson.id, true).unwrap());
    }
    let stored = store.get(&lesson.id).unwrap();
    assert_eq!(stored.effectiveness_score, 1.0);
    assert_eq!(stored.use_count, 10);

    for _ in 0..15 {
        store.mark_lesson_used(&lesson.id, false).unwrap();
    }
    assert_eq!(store.get(&lesson.id).unwrap().effectiveness_score, 0.0);
}

#[test]
fn test_unknown_lesson_id_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LessonStore::open(dir.path()).unwrap();
    store.add_lesson("t", "be concise", ["style"]).unwrap();
    assert!(!store.mark_lesson_used("missing", true).unwrap());
    assert_eq!(store.get_relevant_lessons("style", 1)[0].use_count, 0);
}

#[test]
fn test_lessons_survive_reopen_with_feedback() {
    let dir = tempfile::tempdir().unwrap();
    let id = {
        let mut store = LessonStore::open(dir.path()).unwrap();
        let lesson = store.add_lesson("deploys", "tag releases", ["git", "Git"]).unwrap();
        assert_eq!(lesson.tags.len(), 1);
        store.mark_lesson_used(&lesson.id, false).unwrap();
        lesson.id
    };
    assert!(dir.path().join(LESSONS_FILE).exists());

    let store = LessonStore::open(dir.path()).unwrap();
    assert_eq!(store.len(), 1);
    let lesson = store.get(&id).unwrap();
    assert!((lesson.effectiveness_score - 0.4).abs() < 1e-6);
    assert_eq!(lesson.use_count, 1);
}

#[test]
fn test_empty_instruction_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LessonStore::open(dir.path()).unwrap();
    let err = store.add_lesson("t", "   ", ["x"]).unwrap_err();
    assert!(matches!(err, GoodBoyError::Validation(_)));
    assert!(store.is_empty());
}

#[test]
fn test_punctuated_tags_match_their_word_parts() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LessonStore::open(dir.path()).unwrap();
    let lesson = store
        .add_lesson("builds", "pin toolchain versions", ["CI-CD", "node.js"])
        .unwrap();

    // both tags (2 + 2), nothing else, times 0.5 + 0.5
    assert!((score_lesson(&lesson, "set up ci-cd for Node.js") - 4.0).abs() < 1e-6);
    // half a tag is no match
    assert_eq!(score_lesson(&lesson, "check ci logs"), 0.0);
}
