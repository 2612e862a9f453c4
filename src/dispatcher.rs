use anyhow::{Error, Result};
use tracing::{debug, error, warn};

use crate::{
    clients::{
        mailer::{MailProcessor, ProcessError},
        queue::QueueStore,
    },
    models::record::NotificationRecord,
};

/// Enqueues notification records and immediately drains the queue inline, on
/// the task that triggered the event. There is no background worker: by the
/// time [`QueueDispatcher::dispatch`] returns, every claimable item has been
/// handed to the mail processor or the drain has hit a suspend signal.
pub struct QueueDispatcher<Q: QueueStore, M: MailProcessor> {
    queue: Q,
    mailer: M,
}

impl<Q: QueueStore, M: MailProcessor> QueueDispatcher<Q, M> {
    pub fn new(queue: Q, mailer: M) -> Self {
        Self { queue, mailer }
    }

    pub fn mailer(&self) -> &M {
        &self.mailer
    }

    /// Enqueues the wave in order, then drains. A storage error while
    /// enqueueing is fatal to this call and propagates; nothing that happens
    /// during the drain is.
    pub async fn dispatch(&self, records: Vec<NotificationRecord>) -> Result<(), Error> {
        let wave_size = records.len();

        for record in &records {
            self.queue.enqueue(record).await?;
        }

        debug!(wave_size, "Notification records enqueued, draining queue");

        self.drain().await;
        Ok(())
    }

    /// Claims and processes items until the queue offers none. The drain is
    /// queue-wide: it also picks up leftovers from earlier waves.
    ///
    /// Per-item outcomes:
    /// - delivered: the item is deleted;
    /// - suspend: the item is released back to pending and the drain stops
    ///   immediately, leaving the rest of the queue for a later pass;
    /// - any other failure: logged, the item stays claimed until its lease
    ///   expires, and the drain continues with the next item.
    pub async fn drain(&self) {
        loop {
            let item = match self.queue.claim().await {
                Ok(Some(item)) => item,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to claim queue item, stopping drain");
                    break;
                }
            };

            match self.mailer.process(&item.record).await {
                Ok(()) => {
                    if let Err(e) = self.queue.delete(&item).await {
                        warn!(
                            item_id = %item.item_id,
                            error = %e,
                            "Failed to delete processed queue item"
                        );
                    }
                }
                Err(ProcessError::Suspend) => {
                    if let Err(e) = self.queue.release(&item).await {
                        warn!(
                            item_id = %item.item_id,
                            error = %e,
                            "Failed to release queue item after suspend"
                        );
                    }
                    debug!(item_id = %item.item_id, "Processing suspended, drain stopped");
                    break;
                }
                Err(ProcessError::Failed(e)) => {
                    error!(
                        item_id = %item.item_id,
                        recipient = %item.record.recipient,
                        error = %e,
                        "Failed to process queue item, continuing drain"
                    );
                }
            }
        }
    }
}
