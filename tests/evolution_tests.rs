use goodboy::evolution::{
    EvolutionLedger, Priority, ReflectionKind, EVOLUTION_FILE, OVERSEER_FILE, PROCESSED_FILE,
    REFLECTIONS_FILE,
};
use serde_json::json;

fn council() -> Vec<String> {
    ["Batman", "Alfred", "Jarvis", "DaVinci", "Architect", "Analyst"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn used(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_fresh_ledger_starts_at_full_proficiency() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = EvolutionLedger::open(dir.path(), &council()).unwrap();
    let status = ledger.status();
    assert_eq!(status.generation, 0);
    assert_eq!(status.total_interactions, 0);
    assert_eq!(status.success_rate, 0.0);
    assert_eq!(status.agent_proficiency.len(), 6);
    assert!(status.agent_proficiency.values().all(|p| *p == 1.0));
    assert!(dir.path().join(EVOLUTION_FILE).exists());
}

#[test]
fn test_proficiency_steps_and_clamps() {
    let dir = tempfile::tempdir().unwrap();
    let mut ledger = EvolutionLedger::open(dir.path(), &council()).unwrap();

    ledger
        .record_interaction("m", "r", &used(&["Alfred"]), false)
        .unwrap();
    let alfred = ledger.state().agent_proficiency["Alfred"];
    assert!((alfred - 0.97).abs() < 1e-6);

    ledger
        .record_interaction("m", "r", &used(&["Alfred"]), true)
        .unwrap();
    assert_eq!(ledger.state().agent_proficiency["Alfred"], 1.0);

    for _ in 0..100 {
        ledger
            .record_interaction("m", "r", &used(&["Batman"]), false)
            .unwrap();
    }
    assert!((ledger.state().agent_proficiency["Batman"] - 0.1).abs() < 1e-6);
    // untouched personas keep their score
    assert_eq!(ledger.state().agent_proficiency["DaVinci"], 1.0);
}

#[test]
fn test_unknown_persona_names_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mut ledger = EvolutionLedger::open(dir.path(), &council()).unwrap();
    ledger
        .record_interaction("m", "r", &used(&["Robin"]), false)
        .unwrap();
    assert!(!ledger.state().agent_proficiency.contains_key("Robin"));
    assert_eq!(ledger.state().total_interactions, 1);
}

#[test]
fn test_memory_consolidation_on_hundredth_interaction() {
    let dir = tempfile::tempdir().unwrap();
    let mut ledger = EvolutionLedger::open(dir.path(), &council()).unwrap();

    for _ in 0..99 {
        ledger
            .record_interaction("m", "r", &used(&["Jarvis"]), true)
            .unwrap();
    }
    let before = ledger.suggest_actions().unwrap();
    assert!(before.iter().all(|s| s.id != "memory_optimize"));

    ledger
        .record_interaction("m", "r", &used(&["Jarvis"]), true)
        .unwrap();
    let at_hundred = ledger.suggest_actions().unwrap();
    let consolidation = at_hundred
        .iter()
        .find(|s| s.id == "memory_optimize")
        .expect("consolidation suggested at 100");
    assert_eq!(consolidation.priority, Priority::Medium);

    ledger
        .record_interaction("m", "r", &used(&["Jarvis"]), true)
        .unwrap();
    assert!(ledger
        .suggest_actions()
        .unwrap()
        .iter()
        .all(|s| s.id != "memory_optimize"));

    let history = ledger.suggestion_history().unwrap();
    assert_eq!(history.len(), 1);
    assert!(dir.path().join(OVERSEER_FILE).exists());
}

#[test]
fn test_rebalance_targets_lowest_persona() {
    let dir = tempfile::tempdir().unwrap();
    let mut ledger = EvolutionLedger::open(dir.path(), &council()).unwrap();
    for _ in 0..10 {
        ledger
            .record_interaction("m", "r", &used(&["Analyst"]), false)
            .unwrap();
    }
    let suggestions = ledger.suggest_actions().unwrap();
    assert_eq!(suggestions.len(), 1);
    let rebalance = &suggestions[0];
    assert_eq!(rebalance.id, "rebalance_agents");
    assert_eq!(rebalance.priority, Priority::High);
    assert_eq!(rebalance.target_agent.as_deref(), Some("Analyst"));
    assert_eq!(rebalance.description, "Improve Analyst performance (0.70)");
}

#[test]
fn test_generation_increment_and_status() {
    let dir = tempfile::tempdir().unwrap();
    let mut ledger = EvolutionLedger::open(dir.path(), &council()).unwrap();
    ledger
        .record_interaction("m", "r", &used(&["Jarvis"]), true)
        .unwrap();
    ledger
        .record_interaction("m", "r", &used(&["Jarvis"]), false)
        .unwrap();

    let info = ledger.trigger_generation_increment().unwrap();
    assert_eq!(info.generation, 1);
    assert_eq!(info.interactions_this_gen, 2);
    assert_eq!(ledger.trigger_generation_increment().unwrap().generation, 2);

    let status = ledger.status();
    assert_eq!(status.success_rate, 0.5);

    let reopened = EvolutionLedger::open(dir.path(), &council()).unwrap();
    assert_eq!(reopened.state().generation, 2);
    assert_eq!(reopened.state().total_interactions, 2);
}

#[test]
fn test_reflections_and_processed_actions_are_logged() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = EvolutionLedger::open(dir.path(), &council()).unwrap();

    let low = ledger
        .reflect_on_performance("hello", "[Error] offline", 0.1)
        .unwrap();
    assert_eq!(low.kind, ReflectionKind::Limitation);
    assert!(low.analysis.contains("flagged for improvement"));
    assert_eq!(
        low.next_steps,
        vec![
            "Increase certainty in responses",
            "Consult more agents for edge cases",
            "Provide more detailed explanations"
        ]
    );

    let high = ledger
        .reflect_on_performance("hello", &"fine detail ".repeat(30), 0.95)
        .unwrap();
    assert_eq!(high.kind, ReflectionKind::Evolution);
    assert!(high.analysis.contains("Comprehensive"));
    assert!(high.next_steps.is_empty());

    let processed = ledger
        .process_and_log_action("memory_optimize", json!({"removed": 3}))
        .unwrap();
    assert_eq!(processed.generation, 0);

    let reflections = std::fs::read_to_string(dir.path().join(REFLECTIONS_FILE)).unwrap();
    assert_eq!(reflections.lines().count(), 2);
    assert!(dir.path().join(PROCESSED_FILE).exists());
}
