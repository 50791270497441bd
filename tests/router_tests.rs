use goodboy::persona::PersonaRegistry;
use goodboy::router::{detect_signals, Router, RoutingMode, Signal};

fn router() -> Router {
    Router::new(&PersonaRegistry::council())
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_reflex_mode_uses_only_jarvis() {
    let decision = router().route("explain quantum computing in depth", RoutingMode::Reflex, None);
    assert_eq!(decision.mode, RoutingMode::Reflex);
    assert_eq!(decision.personas, names(&["Jarvis"]));
}

#[test]
fn test_council_mode_uses_every_persona_in_order() {
    let decision = router().route("anything", RoutingMode::Council, None);
    assert_eq!(
        decision.personas,
        names(&["Batman", "Alfred", "Jarvis", "DaVinci", "Architect", "Analyst"])
    );
}

#[test]
fn test_strategic_mode_uses_fixed_three() {
    let decision = router().route("schedule a meeting", RoutingMode::Strategic, None);
    assert_eq!(decision.personas, names(&["Batman", "Architect", "Analyst"]));
}

#[test]
fn test_auto_schedule_and_email_goes_to_alfred_and_jarvis() {
    let decision = router().route(
        "Can you schedule a meeting and also write the invite email?",
        RoutingMode::Auto,
        None,
    );
    assert_eq!(decision.personas, names(&["Alfred", "Jarvis"]));
    assert!(decision.rationale.contains("Alfred"));
}

#[test]
fn test_auto_code_outranks_other_signals() {
    // "design" and "data" are present too, but code comes first.
    let decision = router().route("debug the data pipeline design", RoutingMode::Auto, None);
    assert_eq!(decision.personas, names(&["Architect", "Analyst"]));
}

#[test]
fn test_auto_signal_pairs() {
    let r = router();
    let cases = [
        ("brainstorm a logo concept", &["DaVinci", "Architect"][..]),
        ("is my password safe", &["Batman", "Analyst"][..]),
        ("show me the stats", &["Analyst", "Jarvis"][..]),
        ("tell me a joke", &["Jarvis", "Analyst"][..]),
    ];
    for (message, expected) in cases {
        let decision = r.route(message, RoutingMode::Auto, None);
        assert_eq!(decision.personas, names(expected), "message: {}", message);
    }
}

#[test]
fn test_default_pair_rationale() {
    let decision = router().route("tell me a joke", RoutingMode::Auto, None);
    assert_eq!(decision.rationale, "General query -> Jarvis (core) + Analyst");
}

#[test]
fn test_hint_overrides_keywords_in_auto_mode() {
    let hint = names(&["DaVinci", "Batman"]);
    let decision = router().route("fix my code", RoutingMode::Auto, Some(&hint));
    assert_eq!(decision.personas, hint);
    assert_eq!(decision.rationale, "Optimized routing from learned patterns");
}

#[test]
fn test_hint_ignored_outside_auto_and_when_unknown() {
    let r = router();
    let hint = names(&["DaVinci"]);
    let strategic = r.route("fix my code", RoutingMode::Strategic, Some(&hint));
    assert_eq!(strategic.personas, names(&["Batman", "Architect", "Analyst"]));

    let bogus = names(&["Robin"]);
    let auto = r.route("fix my code", RoutingMode::Auto, Some(&bogus));
    assert_eq!(auto.personas, names(&["Architect", "Analyst"]));
}

#[test]
fn test_routing_is_case_insensitive() {
    let decision = router().route("SCHEDULE A CALL", RoutingMode::Auto, None);
    assert_eq!(decision.personas, names(&["Alfred", "Jarvis"]));
    assert_eq!(detect_signals("SCHEDULE"), vec![Signal::Scheduling]);
}
