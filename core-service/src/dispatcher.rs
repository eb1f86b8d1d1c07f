//! Reply marshalling for the method channel.
//!
//! Hosts require every reply on the thread that owns the channel. The
//! dispatcher handles each call on the worker pool and forwards the finished
//! [`MethodResponse`] to one delivery task, which is the only code that
//! touches a [`MethodResult`].

use bridge_traits::{MethodCall, MethodResponse, MethodResult};
use core_async::sync::mpsc;
use core_async::task::{self, JoinHandle};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::service::HealthService;

type Reply = (MethodResponse, Box<dyn MethodResult>);

pub struct MethodDispatcher {
    service: HealthService,
    replies: mpsc::UnboundedSender<Reply>,
    delivery: JoinHandle<usize>,
}

impl MethodDispatcher {
    /// Start the delivery task. Must be called inside a runtime.
    pub fn start(service: HealthService) -> Self {
        let (replies, mut inbox) = mpsc::unbounded_channel::<Reply>();
        let delivery = task::spawn(async move {
            let mut delivered = 0usize;
            let mut unsuccessful = 0usize;
            while let Some((response, result)) = inbox.recv().await {
                if !response.is_success() {
                    unsuccessful += 1;
                }
                response.deliver(result);
                delivered += 1;
            }
            debug!(delivered, unsuccessful, "Reply delivery finished");
            delivered
        });

        Self {
            service,
            replies,
            delivery,
        }
    }

    /// Handle `call` on the worker pool; its reply goes through the delivery
    /// task.
    pub fn dispatch(&self, call: MethodCall, result: Box<dyn MethodResult>) -> JoinHandle<()> {
        let service = self.service.clone();
        let replies = self.replies.clone();
        task::spawn(async move {
            let response = service.handle(&call).await;
            if replies.send((response, result)).is_err() {
                warn!(method = %call.method, "Delivery task gone, reply dropped");
            }
        })
    }

    /// Stop accepting calls and wait until every in-flight reply has been
    /// delivered. Returns the number of replies delivered.
    pub async fn shutdown(self) -> Result<usize> {
        let Self {
            replies, delivery, ..
        } = self;
        drop(replies);
        let delivered = delivery
            .await
            .map_err(|e| core_runtime::Error::Internal(format!("delivery task failed: {}", e)))?;
        info!(delivered, "Method dispatcher stopped");
        Ok(delivered)
    }
}
