//! Instinct layer: canned replies for greetings, thanks and goodbyes.
//!
//! A reflex only fires on very short messages where one of its trigger
//! phrases appears as whole words, so "hi" fires but "which file" does not.

/// Longest message (in words) a reflex will answer.
pub const MAX_REFLEX_WORDS: usize = 4;

#[derive(Clone, Debug)]
pub struct Reflex {
    pub name: &'static str,
    triggers: &'static [&'static str],
    pub response: &'static str,
    pub times_activated: u64,
    pub inhibited: bool,
}

/// Result of a reflex check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReflexHit {
    pub name: &'static str,
    pub response: &'static str,
}

#[derive(Clone, Debug)]
pub struct InstinctLayer {
    reflexes: Vec<Reflex>,
}

impl Default for InstinctLayer {
    fn default() -> Self {
        InstinctLayer {
            reflexes: vec![
                Reflex {
                    name: "greeting",
                    triggers: &["hello", "hi", "hey"],
                    response: "Hello! How can I help you today?",
                    times_activated: 0,
                    inhibited: false,
                },
                Reflex {
                    name: "thanks",
                    triggers: &["thank", "thanks", "appreciate"],
                    response: "You're welcome! Happy to help.",
                    times_activated: 0,
                    inhibited: false,
                },
                Reflex {
                    name: "goodbye",
                    triggers: &["bye", "goodbye", "see you"],
                    response: "Goodbye! Take care.",
                    times_activated: 0,
                    inhibited: false,
                },
            ],
        }
    }
}

fn tokens(message: &str) -> Vec<String> {
    message
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

fn contains_phrase(words: &[String], phrase: &str) -> bool {
    let parts: Vec<&str> = phrase.split(' ').collect();
    words
        .windows(parts.len())
        .any(|window| window.iter().zip(&parts).all(|(w, p)| w == p))
}

impl InstinctLayer {
    /// The first non-inhibited reflex matching `message`, counting the activation.
    pub fn check(&mut self, message: &str) -> Option<ReflexHit> {
        let words = tokens(message);
        if words.is_empty() || words.len() > MAX_REFLEX_WORDS {
            return None;
        }
        let reflex = self
            .reflexes
            .iter_mut()
            .filter(|r| !r.inhibited)
            .find(|r| r.triggers.iter().any(|t| contains_phrase(&words, t)))?;
        reflex.times_activated += 1;
        log::info!("goodboy::reflex: '{}' fired", reflex.name);
        Some(ReflexHit {
            name: reflex.name,
            response: reflex.response,
        })
    }

    /// Stop a reflex from firing. Returns false for an unknown name.
    pub fn inhibit(&mut self, name: &str) -> bool {
        self.set_inhibited(name, true)
    }

    pub fn disinhibit(&mut self, name: &str) -> bool {
        self.set_inhibited(name, false)
    }

    fn set_inhibited(&mut self, name: &str, value: bool) -> bool {
        match self.reflexes.iter_mut().find(|r| r.name == name) {
            Some(reflex) => {
                reflex.inhibited = value;
                true
            }
            None => false,
        }
    }

    pub fn reflexes(&self) -> &[Reflex] {
        &self.reflexes
    }
}
