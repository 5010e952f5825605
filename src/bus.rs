use crate::connman::error::Result;
use crate::model::ServicePath;
use crate::variant::{PropertyMap, Variant};

/// The calls the command layer makes against the connection manager.
///
/// Every call is awaited before the next one is issued; implementations
/// never retry.
#[allow(async_fn_in_trait)] // only used through generics, never as `dyn`
pub trait ServiceBus {
    /// Object paths of every known service.
    async fn service_paths(&self) -> Result<Vec<ServicePath>>;

    /// Resolve a user supplied name or identifier.
    async fn lookup_service(&self, name: &str) -> Result<ServicePath>;

    /// Full property bag of one service.
    async fn properties(&self, service: &ServicePath) -> Result<PropertyMap>;

    async fn set_property(&self, service: &ServicePath, name: &str, value: &Variant) -> Result<()>;

    async fn connect(&self, service: &ServicePath) -> Result<()>;

    async fn disconnect(&self, service: &ServicePath) -> Result<()>;

    async fn remove(&self, service: &ServicePath) -> Result<()>;
}
