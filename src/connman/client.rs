//! Thin connman dbus wrapper
//! Acts like the raw `dbus-send` calls, no interpretation.

use super::consts::*;
use super::error::Result;
use std::collections::HashMap;
use tracing::trace;
use zbus::{Connection, Proxy};
use zvariant::{OwnedObjectPath, OwnedValue, Value};

pub(super) type DBusDict = HashMap<String, OwnedValue>;

async fn manager_proxy(conn: &Connection) -> Result<Proxy<'_>> {
    Ok(Proxy::new(
        conn,
        CONNMAN_DEST,
        CONNMAN_MANAGER_PATH,
        CONNMAN_MANAGER_IFACE,
    )
    .await?)
}

async fn service_proxy<'a>(conn: &'a Connection, service_path: &'a str) -> Result<Proxy<'a>> {
    Ok(Proxy::new(conn, CONNMAN_DEST, service_path, CONNMAN_SERVICE_IFACE).await?)
}

/// List the object paths of all ConnMan services.
///
/// ```text
/// dbus-send --system --print-reply \
///   --dest=net.connman / net.connman.Manager.ServicePaths
/// ```
///
/// # Errors
///
/// Returns an error if D-Bus fails or the reply is not `ao`.
pub async fn service_paths(conn: &Connection) -> Result<Vec<OwnedObjectPath>> {
    let proxy = manager_proxy(conn).await?;
    trace!("Manager.ServicePaths");

    // ServicePaths → ao
    let paths: Vec<OwnedObjectPath> = proxy.call("ServicePaths", &()).await?;
    Ok(paths)
}

/// Resolve a service name or identifier to its object path.
///
/// ```text
/// dbus-send --system --print-reply \
///   --dest=net.connman / net.connman.Manager.LookupService string:"<name>"
/// ```
///
/// # Errors
///
/// Returns an error if ConnMan knows no such service or D-Bus fails.
pub async fn lookup_service(conn: &Connection, name: &str) -> Result<OwnedObjectPath> {
    let proxy = manager_proxy(conn).await?;
    trace!(name, "Manager.LookupService");

    // LookupService(s) → o
    let path: OwnedObjectPath = proxy.call("LookupService", &(name,)).await?;
    Ok(path)
}

/// Get the properties of a ConnMan service.
///
/// ```text
/// dbus-send --system --print-reply \
///   --dest=net.connman \
///   /net/connman/service/<service> \
///   net.connman.Service.GetProperties
/// ```
///
/// Returns a dictionary mapping property names to zvariant values (`a{sv}`).
///
/// # Errors
///
/// Returns an error if:
/// - the service path is invalid
/// - D-Bus communication fails
/// - ConnMan rejects the request
pub async fn service_properties(conn: &Connection, service_path: &str) -> Result<DBusDict> {
    let proxy = service_proxy(conn, service_path).await?;
    trace!(service_path, "Service.GetProperties");

    let props: DBusDict = proxy.call("GetProperties", &()).await?;
    Ok(props)
}

/// Set a property on a ConnMan service.
///
/// ```text
/// dbus-send --system --dest=net.connman /net/connman/service/wifi_<uid>_managed_psk \
///   net.connman.Service.SetProperty string:"AutoConnect" variant:boolean:true
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - the service path is invalid
/// - D-Bus fails
/// - ConnMan rejects the request
pub async fn service_set_property(
    conn: &Connection,
    service_path: &str,
    key: &str,
    value: Value<'_>,
) -> Result<()> {
    let proxy = service_proxy(conn, service_path).await?;
    trace!(service_path, key, "Service.SetProperty");

    proxy
        .call::<&str, (&str, Value<'_>), ()>("SetProperty", &(key, value))
        .await?;

    Ok(())
}

/// Connect a ConnMan service.
///
/// ```text
/// dbus-send --system --print-reply \
///   --dest=net.connman \
///   /net/connman/service/<service> \
///   net.connman.Service.Connect
/// ```
pub async fn service_connect(conn: &Connection, service_path: &str) -> Result<()> {
    let proxy = service_proxy(conn, service_path).await?;
    trace!(service_path, "Service.Connect");

    // Connect has no arguments and no return value
    proxy.call::<&str, (), ()>("Connect", &()).await?;

    Ok(())
}

/// Disconnect a ConnMan service.
pub async fn service_disconnect(conn: &Connection, service_path: &str) -> Result<()> {
    let proxy = service_proxy(conn, service_path).await?;
    trace!(service_path, "Service.Disconnect");

    proxy.call::<&str, (), ()>("Disconnect", &()).await?;

    Ok(())
}

/// Remove (forget) a ConnMan service.
///
/// ```text
/// dbus-send --system --print-reply \
///   --dest=net.connman \
///   /net/connman/service/<service> \
///   net.connman.Service.Remove
/// ```
pub async fn service_remove(conn: &Connection, service_path: &str) -> Result<()> {
    let proxy = service_proxy(conn, service_path).await?;
    trace!(service_path, "Service.Remove");

    proxy.call::<&str, (), ()>("Remove", &()).await?;
    Ok(())
}
