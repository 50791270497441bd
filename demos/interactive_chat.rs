use std::io::{self, Write};

use tokio::sync::watch;
use tokio::time::{sleep, Duration};

use goodboy::config::DEFAULT_CONFIG_PATH;
use goodboy::{Brain, ChatRequest, GoodBoyConfig, RoutingMode};

// Run from the root folder of the repo as follows:
// GOODBOY_ENGINE=cloud GOODBOY_API_KEY=your-key cargo run --example interactive_chat
//
// Commands: `/mode auto|reflex|council|strategic`, `/status`, `/maintain`, `/quit`.

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut config = GoodBoyConfig::load(DEFAULT_CONFIG_PATH)?;
    config.apply_env_overrides();
    goodboy::init_logger_with_default(&config.log_level);

    let brain = Brain::open(config)?;
    let mut mode: Option<RoutingMode> = None;

    loop {
        print!("\nYou: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" => break,
            "/status" => {
                let status = brain.evolution_status().await;
                println!(
                    "generation {} | {} interactions | success rate {:.2}",
                    status.generation, status.total_interactions, status.success_rate
                );
                for (persona, score) in &status.agent_proficiency {
                    println!("  {:<10} {:.2}", persona, score);
                }
                continue;
            }
            "/maintain" => {
                let report = brain.run_maintenance().await?;
                println!("removed {} old turns", report.removed_turns);
                for suggestion in report.suggestions {
                    println!("  suggestion: {}", suggestion.description);
                }
                continue;
            }
            _ => {}
        }

        if let Some(raw) = input.strip_prefix("/mode ") {
            match raw.parse::<RoutingMode>() {
                Ok(m) => {
                    mode = Some(m);
                    println!("mode set to {}", m);
                }
                Err(e) => println!("{}", e),
            }
            continue;
        }

        let mut request = ChatRequest::new(input);
        if let Some(m) = mode {
            request = request.with_mode(m);
        }

        let (tx, rx) = watch::channel(true);
        let dots = tokio::spawn(display_waiting_dots(rx, 3));
        let result = brain.chat(request).await;
        let _ = tx.send(false);
        let _ = dots.await;

        match result {
            Ok(reply) => {
                let meta = &reply.route_metadata;
                println!(
                    "[{} -> {}]",
                    meta.mode,
                    meta.agents.join(", ")
                );
                println!("\nGoodBoy:\n{}", reply.output);
                for action in &reply.suggested_actions {
                    println!("  -> {}", action.description);
                }
            }
            Err(e) => println!("error: {}", e),
        }
    }
    Ok(())
}

async fn display_waiting_dots(rx: watch::Receiver<bool>, num_dots: usize) {
    while *rx.borrow() {
        for _ in 0..num_dots {
            if !*rx.borrow() {
                break;
            }
            print!(".");
            let _ = io::stdout().flush();
            sleep(Duration::from_millis(500)).await;
        }
        print!("\r{}\r", " ".repeat(num_dots));
        let _ = io::stdout().flush();
    }
}
