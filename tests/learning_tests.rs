use goodboy::learning::{extract_keywords, LearningEngine, PATTERNS_FILE};

fn agents(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_no_hint_without_matching_patterns() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = LearningEngine::open(dir.path()).unwrap();
    assert!(engine.get_routing_hint(&extract_keywords("schedule standup")).is_none());

    engine
        .learn_from_interaction("brainstorm logo ideas", &agents(&["DaVinci", "Architect"]), 0.8)
        .unwrap();
    assert!(engine.get_routing_hint(&extract_keywords("schedule standup")).is_none());
}

#[test]
fn test_hint_returns_two_most_frequent_personas() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = LearningEngine::open(dir.path()).unwrap();
    engine
        .learn_from_interaction("schedule standup", &agents(&["Alfred", "Jarvis"]), 0.8)
        .unwrap();
    engine
        .learn_from_interaction("schedule review", &agents(&["Alfred", "Analyst"]), 0.7)
        .unwrap();
    engine
        .learn_from_interaction("schedule retro", &agents(&["Alfred", "Analyst"]), 0.9)
        .unwrap();

    let hint = engine
        .get_routing_hint(&extract_keywords("schedule planning"))
        .unwrap();
    assert_eq!(hint, agents(&["Alfred", "Analyst"]));
}

#[test]
fn test_hint_only_scans_five_most_recent_matches() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = LearningEngine::open(dir.path()).unwrap();
    for _ in 0..6 {
        engine
            .learn_from_interaction("deploy service", &agents(&["Batman"]), 0.5)
            .unwrap();
    }
    for _ in 0..5 {
        engine
            .learn_from_interaction("deploy website", &agents(&["DaVinci", "Architect"]), 0.9)
            .unwrap();
    }
    let hint = engine.get_routing_hint(&agents(&["deploy"])).unwrap();
    assert_eq!(hint, agents(&["DaVinci", "Architect"]));
}

#[test]
fn test_optimization_needs_ten_patterns() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = LearningEngine::open(dir.path()).unwrap();
    for _ in 0..9 {
        engine
            .learn_from_interaction("fix bug", &agents(&["Architect", "Analyst"]), 0.8)
            .unwrap();
    }
    assert!(engine.suggest_routing_optimization().is_none());

    engine
        .learn_from_interaction("plan party", &agents(&["DaVinci", "Alfred"]), 0.95)
        .unwrap();
    let best = engine.suggest_routing_optimization().unwrap();
    assert_eq!(best.suggested_agents, agents(&["Alfred", "DaVinci"]));
    assert_eq!(best.frequency, 1);
    assert!((best.avg_quality - 0.95).abs() < 1e-6);
}

#[test]
fn test_patterns_persist() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut engine = LearningEngine::open(dir.path()).unwrap();
        let pattern = engine
            .learn_from_interaction("Draft the quarterly report", &agents(&["Analyst"]), 0.75)
            .unwrap();
        assert_eq!(pattern.keywords, vec!["draft", "quarterly", "report"]);
        assert_eq!(pattern.message_length, 26);
    }
    assert!(dir.path().join(PATTERNS_FILE).exists());
    let engine = LearningEngine::open(dir.path()).unwrap();
    assert_eq!(engine.len(), 1);
    assert_eq!(engine.patterns()[0].agents, agents(&["Analyst"]));
}
