use colloquy_chat::ExplainContext;
use colloquy_client::{ClientError, InMemoryBackend, MemoryPreferences, Operation};
use colloquy_stream::StreamReassembler;
use colloquy_types::{GenerationKey, StreamDelta};
use std::sync::Arc;
use std::time::Duration;

async fn wait_for_subscriber(backend: &InMemoryBackend, key: &GenerationKey) {
    while backend.subscriber_count(key) == 0 {
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

#[tokio::test]
async fn test_explain_requires_prompt() {
    let backend = InMemoryBackend::new();
    let ctx = ExplainContext::new(Arc::new(MemoryPreferences::new()));
    let mut reassembler = StreamReassembler::new(GenerationKey::insight("ins-1"));

    let result = ctx.explain(&backend, &backend, &mut reassembler, None).await;

    assert!(matches!(result, Err(ClientError::Rejected(_))));
    assert_eq!(backend.calls(Operation::Complete), 0);
}

#[tokio::test]
async fn test_explain_streams_then_takes_final_text() {
    let backend = Arc::new(InMemoryBackend::new());
    let ctx = Arc::new(ExplainContext::new(Arc::new(MemoryPreferences::new())));
    let key = GenerationKey::insight("ins-crash");

    let task = {
        let backend = Arc::clone(&backend);
        let ctx = Arc::clone(&ctx);
        let key = key.clone();
        tokio::spawn(async move {
            let _prompt = ctx.set_prompt("Why is the pod restarting?");
            let mut reassembler = StreamReassembler::new(key);
            let outcome = ctx
                .explain(backend.as_ref(), backend.as_ref(), &mut reassembler, None)
                .await;
            (outcome, reassembler.text())
        })
    };

    wait_for_subscriber(&backend, &key).await;
    backend.publish(&key, StreamDelta::new(1, "probe fails"));
    backend.publish(&key, StreamDelta::new(0, "The liveness "));
    tokio::time::sleep(Duration::from_millis(20)).await;
    backend.resolve_completion(&key, Ok("The liveness probe fails too early.".to_string()));

    let (outcome, streamed) = task.await.unwrap();
    let outcome = outcome.unwrap();
    assert!(outcome.is_authoritative());
    assert_eq!(outcome.text(), "The liveness probe fails too early.");
    assert_eq!(streamed, "The liveness probe fails");
    assert_eq!(ctx.prompt(), None);
}

#[tokio::test]
async fn test_failed_completion_keeps_streamed_text() {
    let backend = Arc::new(InMemoryBackend::new());
    let ctx = Arc::new(ExplainContext::new(Arc::new(MemoryPreferences::new())));
    let key = GenerationKey::scope("stack-run");

    let task = {
        let backend = Arc::clone(&backend);
        let ctx = Arc::clone(&ctx);
        let key = key.clone();
        tokio::spawn(async move {
            let _prompt = ctx.set_prompt("Summarise this plan");
            let mut reassembler = StreamReassembler::new(key);
            ctx.explain(backend.as_ref(), backend.as_ref(), &mut reassembler, None)
                .await
        })
    };

    wait_for_subscriber(&backend, &key).await;
    backend.publish(&key, StreamDelta::new(0, "Two resources "));
    backend.publish(&key, StreamDelta::new(1, "change."));
    tokio::time::sleep(Duration::from_millis(20)).await;
    backend.resolve_completion(&key, Err(ClientError::Transport("gateway timeout".to_string())));

    let outcome = task.await.unwrap().unwrap();
    assert!(!outcome.is_authoritative());
    assert_eq!(outcome.text(), "Two resources change.");
}
