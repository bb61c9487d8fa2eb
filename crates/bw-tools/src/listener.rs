//! Delivery of core notifications to a shared handler

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use bw_memory::{ConsoleNotification, NotificationHandler};
use crossbeam::channel::Receiver;
use parking_lot::Mutex;

/// Forward every notification from `notifications` to `handler` on its own thread
///
/// The thread exits once all senders are dropped.
pub fn spawn_listener<H>(
    notifications: Receiver<ConsoleNotification>,
    handler: Arc<Mutex<H>>,
) -> io::Result<JoinHandle<()>>
where
    H: NotificationHandler + Send + 'static,
{
    thread::Builder::new()
        .name("bw-notifications".to_string())
        .spawn(move || {
            for notification in notifications.iter() {
                tracing::trace!("Notification: {:?}", notification);
                handler.lock().process_notification(notification);
            }
            tracing::debug!("Notification listener stopped");
        })
}
