use colloquy_client::{DeltaChannel, DeltaStream, Result};
use futures::StreamExt;
use std::future::Future;

use crate::reassembler::StreamReassembler;
use crate::throttle::ScrollThrottle;

/// How a generation finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The one-shot request resolved with the final text
    Authoritative(String),
    /// The request failed; the text assembled from deltas is final
    Assembled(String),
}

impl GenerationOutcome {
    pub fn text(&self) -> &str {
        match self {
            GenerationOutcome::Authoritative(text) | GenerationOutcome::Assembled(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            GenerationOutcome::Authoritative(text) | GenerationOutcome::Assembled(text) => text,
        }
    }

    pub fn is_authoritative(&self) -> bool {
        matches!(self, GenerationOutcome::Authoritative(_))
    }
}

async fn next_delta(
    deltas: &mut Option<DeltaStream>,
) -> Option<Result<colloquy_types::StreamDelta>> {
    match deltas {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

/// Follow the delta channel for the reassembler's key until `final_fetch` resolves
///
/// The channel has no end marker, so completion is the owning request
/// finishing. A channel error only stops the text from growing; the
/// subscription is dropped as soon as the request resolves.
pub async fn run_generation<F>(
    channel: &dyn DeltaChannel,
    reassembler: &mut StreamReassembler,
    final_fetch: F,
    throttle: Option<&ScrollThrottle>,
) -> GenerationOutcome
where
    F: Future<Output = Result<String>>,
{
    let key = reassembler.key().clone();

    let mut deltas = match channel.subscribe(&key).await {
        Ok(stream) => Some(stream),
        Err(e) => {
            tracing::warn!(%key, error = %e, "Failed to subscribe to generation stream");
            None
        }
    };

    tokio::pin!(final_fetch);

    loop {
        tokio::select! {
            result = &mut final_fetch => {
                drop(deltas.take());
                if let Some(throttle) = throttle {
                    throttle.flush();
                }
                return match result {
                    Ok(text) => {
                        tracing::debug!(%key, received = reassembler.len(), "Generation completed");
                        GenerationOutcome::Authoritative(text)
                    }
                    Err(e) => {
                        tracing::warn!(%key, error = %e, "Final fetch failed, using assembled text");
                        GenerationOutcome::Assembled(reassembler.text())
                    }
                };
            }
            item = next_delta(&mut deltas) => {
                match item {
                    Some(Ok(delta)) => {
                        let sequence = delta.sequence;
                        reassembler.push(delta);
                        if let Some(throttle) = throttle {
                            throttle.observe(sequence);
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!(%key, error = %e, "Generation stream failed");
                        deltas = None;
                    }
                    None => {
                        tracing::debug!(%key, "Generation stream closed");
                        deltas = None;
                    }
                }
            }
        }
    }
}
