use colloquy::prelude::*;
use colloquy_example::{config::AppConfig, init_logging};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    init_logging(&config);

    tracing::info!("Starting scripted chat session");

    let backend = Arc::new(InMemoryBackend::new());
    let cache = Arc::new(ThreadCache::new());
    let store = ThreadStore::new(backend.clone(), cache, config.chatbot.clone());
    let pins = PinIndex::new(backend.clone(), store.notifier().clone(), &config.chatbot);

    let mut notifications = store.notifier().subscribe();
    tokio::spawn(async move {
        while let Ok(notification) = notifications.recv().await {
            println!("[{:?}] {}", notification.severity, notification.message);
        }
    });

    let mut views = store.subscribe();
    tokio::spawn(async move {
        while views.changed().await.is_ok() {
            let view = views.borrow_and_update().view();
            println!("view -> {:?}", view);
        }
    });

    store.open();
    store.send_message("Why does my ingress return 502?").await?;
    store.send_message("It started after the last deploy").await?;

    let Some(thread_id) = store.state().current_thread_id else {
        anyhow::bail!("no thread after sending a message");
    };
    let thread = store
        .thread(&thread_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("thread {} vanished", thread_id))?;
    for message in &thread.messages {
        println!("  #{} {:?}: {}", message.seq, message.role, message.content);
    }

    let target = PinTarget::Thread(thread.id.clone());
    pins.scan(&target).await?;
    pins.toggle_thread(&thread).await?;
    println!("pinned: {}", pins.is_pinned(&target));

    let fork = store.fork_thread(&thread.id, 2).await?;
    println!("forked {} with {} messages", fork.id, fork.messages.len());

    store.select_agent(AgentKind::Kubernetes);
    store.send_message("Restart the crashlooping pods in staging").await?;

    let back = store.deselect_agent().await?;
    println!("back on {}", back);

    store.delete_thread(&fork.id).await?;
    let listed = store.threads(Page::first(config.chatbot.thread_page_size)).await?;
    println!("{} threads remain", listed.items.len());

    store.close_chatbot();
    tokio::task::yield_now().await;
    Ok(())
}
