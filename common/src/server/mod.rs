use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::warn;

use crate::err::CdcError;

/// Anything with a start/shutdown lifecycle the process should track and
/// tear down together (the admin HTTP surface, a connector supervisor
/// task handle, ...).
#[async_trait::async_trait]
pub trait Server: Send {
    async fn start(&mut self);

    async fn shutdown(&mut self, graceful: bool) -> Result<(), CdcError>;
}

pub struct ShutdownHandle {
    shutdown: Arc<AtomicBool>,
    services: Vec<Box<dyn Server>>,
}

impl ShutdownHandle {
    #[inline]
    pub fn create() -> Self {
        Self {
            shutdown: Arc::new(AtomicBool::new(false)),
            services: vec![],
        }
    }

    #[inline]
    pub fn add_service(&mut self, server: Box<dyn Server>) {
        self.services.push(server);
    }

    pub async fn shutdown_services(&mut self, graceful: bool) -> Result<(), CdcError> {
        self.shutdown.store(true, Ordering::SeqCst);

        let mut futures = vec![];
        for s in &mut self.services {
            futures.push(s.shutdown(graceful));
        }
        let results = join_all(futures).await;
        results.into_iter().find(|r| r.is_err()).unwrap_or(Ok(()))
    }
}

impl Drop for ShutdownHandle {
    fn drop(&mut self) {
        if !self.shutdown.load(Ordering::SeqCst) {
            warn!("shutdown handle dropped without an explicit shutdown_services call; services left running");
        }
    }
}
