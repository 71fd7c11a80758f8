use colloquy::prelude::*;
use colloquy_example::{config::AppConfig, init_logging};
use std::sync::Arc;
use std::time::Duration;

// Fragments of the reply, deliberately out of order with one redelivery
const FRAGMENTS: &[(u64, &str)] = &[
    (1, "is failing its liveness probe, "),
    (0, "The pod `api-7f9c` "),
    (3, "Raise `initialDelaySeconds` or speed up startup."),
    (1, "is failing its liveness probe, "),
    (2, "so the kubelet restarts it before it finishes booting. "),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    init_logging(&config);

    let explain = ExplainContext::new(config.preferences.store());
    explain.set_verbosity(VerbosityLevel::Medium)?;
    let _prompt = explain.set_prompt("Explain why pod api-7f9c keeps restarting");

    let backend = Arc::new(InMemoryBackend::new());
    let key = GenerationKey::insight("ins-crashloop");

    let mut reassembler = StreamReassembler::new(key.clone());
    let mut partial = reassembler.subscribe();
    tokio::spawn(async move {
        while partial.changed().await.is_ok() {
            println!("... {}", partial.borrow_and_update().as_str());
        }
    });

    let producer = {
        let backend = Arc::clone(&backend);
        let key = key.clone();
        tokio::spawn(async move {
            while backend.subscriber_count(&key) == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            for (seq, text) in FRAGMENTS {
                backend.publish(&key, StreamDelta::new(*seq, *text));
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            let full: String = {
                let mut ordered: Vec<_> = FRAGMENTS.to_vec();
                ordered.sort_by_key(|(seq, _)| *seq);
                ordered.dedup_by_key(|(seq, _)| *seq);
                ordered.into_iter().map(|(_, text)| text).collect()
            };
            backend.resolve_completion(&key, Ok(full));
        })
    };

    let throttle = ScrollThrottle::new(config.chatbot.scroll_batch_size);
    let outcome = explain
        .explain(backend.as_ref(), backend.as_ref(), &mut reassembler, Some(&throttle))
        .await?;
    producer.await?;

    tracing::info!(authoritative = outcome.is_authoritative(), "Explanation finished");
    println!("\n{}", outcome.text());
    Ok(())
}
