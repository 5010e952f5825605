//! ConnMan implementation of [`ServiceBus`] over the D-Bus.

mod client;
pub mod translation;

pub mod consts {
    /// D-Bus well-known name owned by the ConnMan daemon
    pub const CONNMAN_DEST: &str = "net.connman";

    /// Object path of the ConnMan manager
    pub const CONNMAN_MANAGER_PATH: &str = "/";

    /// ConnMan manager interface (global operations)
    pub const CONNMAN_MANAGER_IFACE: &str = "net.connman.Manager";

    /// ConnMan service interface (Wi-Fi, Ethernet, etc.)
    pub const CONNMAN_SERVICE_IFACE: &str = "net.connman.Service";

    pub const PROP_NAME: &str = "Name";
    pub const PROP_TYPE: &str = "Type";
    pub const PROP_STATE: &str = "State";
    pub const PROP_AUTOCONNECT: &str = "AutoConnect";
    pub const PROP_FAVORITE: &str = "Favorite";
    pub const PROP_IPV4: &str = "IPv4";
    pub const PROP_IPV4_CONFIG: &str = "IPv4.Configuration";
    pub const PROP_IPV6: &str = "IPv6";
    pub const PROP_NAMESERVERS: &str = "Nameservers";
    pub const PROP_NAMESERVERS_CONFIG: &str = "Nameservers.Configuration";
    pub const PROP_DOMAINS: &str = "Domains";
    pub const PROP_SECURITY: &str = "Security";
    pub const PROP_PASSPHRASE: &str = "Passphrase";
    pub const PROP_ETHERNET: &str = "Ethernet";

    pub const IP_METHOD: &str = "Method";
    pub const IP_ADDRESS: &str = "Address";
    pub const IP_NETMASK: &str = "Netmask";
    pub const IP_GATEWAY: &str = "Gateway";

    pub const ETH_INTERFACE: &str = "Interface";
    pub const ETH_ADDRESS: &str = "Address";
    pub const ETH_MTU: &str = "MTU";
}

pub mod error {
    use crate::variant::VariantError;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum ConnManError {
        #[error("could not connect to connman on D-Bus: {0}. Is connmand running?")]
        Unavailable(String),

        #[error("DBus error: {0}")]
        DBus(#[from] zbus::Error),

        #[error("error looking for service '{name}': {message}")]
        LookupFailed { name: String, message: String },

        /// The daemon rejected or failed a call; `message` is its own text.
        #[error("{message}")]
        CallFailed {
            method: &'static str,
            message: String,
        },

        #[error("invalid reply to {method}: {source}")]
        InvalidReply {
            method: &'static str,
            #[source]
            source: VariantError,
        },

        #[error("invalid value for {0}: {1}")]
        InvalidValue(String, #[source] VariantError),
    }

    pub type Result<T> = std::result::Result<T, ConnManError>;

    /// The human readable part of a failed call, as the daemon sent it.
    pub(crate) fn daemon_message(err: &zbus::Error) -> String {
        match err {
            zbus::Error::MethodError(_, Some(message), _) => message.clone(),
            zbus::Error::MethodError(name, None, _) => name.to_string(),
            other => other.to_string(),
        }
    }

    pub(crate) fn call_failed(method: &'static str, err: ConnManError) -> ConnManError {
        match err {
            ConnManError::DBus(e) => ConnManError::CallFailed {
                method,
                message: daemon_message(&e),
            },
            other => other,
        }
    }
}

use crate::bus::ServiceBus;
use crate::model::ServicePath;
use crate::variant::{PropertyMap, Variant};
use consts::*;
use error::{ConnManError, Result, call_failed, daemon_message};
use tracing::debug;
use zbus::Connection;
use zbus::names::BusName;

/// Which message bus to look for the daemon on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum BusKind {
    #[default]
    System,
    Session,
}

pub struct ConnManConnection {
    connection: Connection,
}

impl ConnManConnection {
    /// Opens the bus and checks that ConnMan owns its well-known name.
    ///
    /// # Errors
    ///
    /// `Unavailable` if the bus cannot be reached or nobody owns
    /// `net.connman`.
    pub async fn new(bus: BusKind) -> Result<Self> {
        let connection = match bus {
            BusKind::System => Connection::system().await,
            BusKind::Session => Connection::session().await,
        }
        .map_err(|e| ConnManError::Unavailable(e.to_string()))?;

        let dbus = zbus::fdo::DBusProxy::new(&connection)
            .await
            .map_err(|e| ConnManError::Unavailable(e.to_string()))?;

        let name = BusName::try_from(CONNMAN_DEST)
            .map_err(|e| ConnManError::Unavailable(e.to_string()))?;

        let has_owner = dbus
            .name_has_owner(name)
            .await
            .map_err(|e| ConnManError::Unavailable(e.to_string()))?;

        if !has_owner {
            return Err(ConnManError::Unavailable(format!(
                "{} is not on the {:?} bus",
                CONNMAN_DEST, bus
            )));
        }

        debug!(?bus, "connected to {}", CONNMAN_DEST);
        Ok(Self { connection })
    }

    fn connection(&self) -> &Connection {
        &self.connection
    }
}

impl ServiceBus for ConnManConnection {
    async fn service_paths(&self) -> Result<Vec<ServicePath>> {
        let paths = client::service_paths(self.connection())
            .await
            .map_err(|e| call_failed("ServicePaths", e))?;

        Ok(paths
            .into_iter()
            .map(|p| ServicePath::new(p.as_str()))
            .collect())
    }

    async fn lookup_service(&self, name: &str) -> Result<ServicePath> {
        let path = client::lookup_service(self.connection(), name)
            .await
            .map_err(|e| match e {
                ConnManError::DBus(e) => ConnManError::LookupFailed {
                    name: name.to_string(),
                    message: daemon_message(&e),
                },
                other => other,
            })?;

        Ok(ServicePath::new(path.as_str()))
    }

    async fn properties(&self, service: &ServicePath) -> Result<PropertyMap> {
        let props = client::service_properties(self.connection(), service.as_str())
            .await
            .map_err(|e| call_failed("GetProperties", e))?;

        translation::property_map(&props).map_err(|source| ConnManError::InvalidReply {
            method: "GetProperties",
            source,
        })
    }

    async fn set_property(&self, service: &ServicePath, name: &str, value: &Variant) -> Result<()> {
        let value = translation::value_from_variant(value)
            .map_err(|e| ConnManError::InvalidValue(name.to_string(), e))?;

        client::service_set_property(self.connection(), service.as_str(), name, value)
            .await
            .map_err(|e| call_failed("SetProperty", e))
    }

    async fn connect(&self, service: &ServicePath) -> Result<()> {
        client::service_connect(self.connection(), service.as_str())
            .await
            .map_err(|e| call_failed("Connect", e))
    }

    async fn disconnect(&self, service: &ServicePath) -> Result<()> {
        client::service_disconnect(self.connection(), service.as_str())
            .await
            .map_err(|e| call_failed("Disconnect", e))
    }

    async fn remove(&self, service: &ServicePath) -> Result<()> {
        client::service_remove(self.connection(), service.as_str())
            .await
            .map_err(|e| call_failed("Remove", e))
    }
}
