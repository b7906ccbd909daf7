//! System service, presents operational information

use futures::future;

use services::types::ServiceFuture;

pub trait SystemService {
    /// Healthcheck
    fn healthcheck(&self) -> ServiceFuture<String>;
}

#[derive(Clone, Copy, Default)]
pub struct SystemServiceImpl;

impl SystemService for SystemServiceImpl {
    /// Healthcheck
    fn healthcheck(&self) -> ServiceFuture<String> {
        Box::new(future::ok("Ok".to_string()))
    }
}
