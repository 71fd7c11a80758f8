use colloquy_client::{ClientError, QueryClient, Result};
use colloquy_types::{ChatbotConfig, InsightRef, Page, Pin, PinAttributes, PinTarget, Thread};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::notify::Notifier;

/// Pinned state of one target as far as the index knows
#[derive(Debug, Clone, PartialEq)]
pub enum PinStatus {
    /// Scan not finished, render as unpinned
    Unknown,
    Pinned(Pin),
    Unpinned,
}

impl PinStatus {
    pub fn is_pinned(&self) -> bool {
        matches!(self, PinStatus::Pinned(_))
    }

    pub fn pin(&self) -> Option<&Pin> {
        match self {
            PinStatus::Pinned(pin) => Some(pin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PinToggle {
    Created(Pin),
    Deleted(Pin),
}

impl PinToggle {
    pub fn pin(&self) -> &Pin {
        match self {
            PinToggle::Created(pin) | PinToggle::Deleted(pin) => pin,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    epoch: u64,
    status: PinStatus,
}

/// Pin lookup by paging through the whole pin collection
///
/// The backend has no lookup by target, so every scan walks pages until
/// all requested targets are found or the pages run out. Each scan takes
/// a fresh epoch; a scan only records its result if no newer scan of the
/// same target started meanwhile.
///
/// Toggling acts on whatever status is known at that moment. A toggle
/// racing an unfinished scan may create a duplicate pin.
pub struct PinIndex {
    client: Arc<dyn QueryClient>,
    notifier: Arc<Notifier>,
    page_size: usize,
    name_max_len: usize,
    entries: RwLock<HashMap<PinTarget, Entry>>,
    epoch: AtomicU64,
}

impl PinIndex {
    pub fn new(client: Arc<dyn QueryClient>, notifier: Arc<Notifier>, config: &ChatbotConfig) -> Self {
        Self {
            client,
            notifier,
            page_size: config.pin_page_size.max(1),
            name_max_len: config.pin_name_max_len,
            entries: RwLock::new(HashMap::new()),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn status(&self, target: &PinTarget) -> PinStatus {
        match self.entries.read() {
            Ok(entries) => entries
                .get(target)
                .map(|entry| entry.status.clone())
                .unwrap_or(PinStatus::Unknown),
            Err(_) => PinStatus::Unknown,
        }
    }

    pub fn is_pinned(&self, target: &PinTarget) -> bool {
        self.status(target).is_pinned()
    }

    /// Targets the index has been asked about
    pub fn tracked(&self) -> Vec<PinTarget> {
        match self.entries.read() {
            Ok(entries) => entries.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Stop tracking a target; later refreshes skip it
    pub fn untrack(&self, target: &PinTarget) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(target);
        }
    }

    /// Look up one target, page by page
    pub async fn scan(&self, target: &PinTarget) -> Result<PinStatus> {
        self.scan_targets(vec![target.clone()]).await?;
        Ok(self.status(target))
    }

    /// Rescan every tracked target in a single pass over the collection
    pub async fn refresh(&self) -> Result<()> {
        let targets = self.tracked();
        if targets.is_empty() {
            return Ok(());
        }
        self.scan_targets(targets).await
    }

    fn begin_scan(&self, targets: &[PinTarget]) -> u64 {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut entries) = self.entries.write() {
            // Known statuses stand until the scan replaces them
            for target in targets {
                entries
                    .entry(target.clone())
                    .and_modify(|entry| entry.epoch = epoch)
                    .or_insert(Entry {
                        epoch,
                        status: PinStatus::Unknown,
                    });
            }
        }
        epoch
    }

    fn record(&self, epoch: u64, target: &PinTarget, status: PinStatus) {
        if let Ok(mut entries) = self.entries.write() {
            match entries.get_mut(target) {
                Some(entry) if entry.epoch > epoch => {
                    tracing::debug!(%target, epoch, "Dropping stale pin scan result");
                }
                Some(entry) => {
                    entry.epoch = epoch;
                    entry.status = status;
                }
                None => {
                    entries.insert(target.clone(), Entry { epoch, status });
                }
            }
        }
    }

    async fn scan_targets(&self, targets: Vec<PinTarget>) -> Result<()> {
        let epoch = self.begin_scan(&targets);
        let mut found: HashMap<PinTarget, Pin> = HashMap::new();
        let mut page = Some(Page::first(self.page_size));
        let mut pages = 0usize;

        while let Some(request) = page.take() {
            let connection = match self.client.fetch_pins(request).await {
                Ok(connection) => connection,
                Err(e) => {
                    tracing::warn!(error = %e, pages, "Pin scan failed");
                    return Err(e);
                }
            };
            pages += 1;

            for pin in &connection.items {
                if let Some(target) = pin.target() {
                    if targets.contains(&target) && !found.contains_key(&target) {
                        found.insert(target, pin.clone());
                    }
                }
            }

            if found.len() == targets.len() {
                break;
            }
            page = connection.next_page(self.page_size);
        }

        tracing::debug!(targets = targets.len(), found = found.len(), pages, "Pin scan finished");
        for target in &targets {
            let status = match found.remove(target) {
                Some(pin) => PinStatus::Pinned(pin),
                None => PinStatus::Unpinned,
            };
            self.record(epoch, target, status);
        }
        Ok(())
    }

    /// Pin the target if it is not known to be pinned, unpin it otherwise
    pub async fn toggle(&self, attributes: PinAttributes) -> Result<PinToggle> {
        let Some(target) = attributes.target() else {
            let error = ClientError::Rejected("pin needs a thread or an insight".to_string());
            self.notifier.error(format!("Failed to pin: {error}"));
            return Err(error);
        };

        let result = match self.status(&target) {
            PinStatus::Pinned(pin) => self.client.delete_pin(&pin.id).await.map(PinToggle::Deleted),
            PinStatus::Unknown | PinStatus::Unpinned => {
                self.client.create_pin(attributes).await.map(PinToggle::Created)
            }
        };

        let toggle = match result {
            Ok(toggle) => toggle,
            Err(e) => {
                tracing::warn!(%target, error = %e, "Pin toggle failed");
                self.notifier.error(format!("Failed to update pin: {e}"));
                return Err(e);
            }
        };

        tracing::info!(
            %target,
            pin_id = %toggle.pin().id,
            created = matches!(toggle, PinToggle::Created(_)),
            "Pin toggled"
        );
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let status = match &toggle {
            PinToggle::Created(pin) => PinStatus::Pinned(pin.clone()),
            PinToggle::Deleted(_) => PinStatus::Unpinned,
        };
        self.record(epoch, &target, status);

        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "Pin refetch after toggle failed");
        }
        Ok(toggle)
    }

    pub async fn toggle_thread(&self, thread: &Thread) -> Result<PinToggle> {
        self.toggle(PinAttributes::for_thread(thread, self.name_max_len)).await
    }

    pub async fn toggle_insight(&self, insight: &InsightRef) -> Result<PinToggle> {
        self.toggle(PinAttributes::for_insight(insight, self.name_max_len)).await
    }
}
