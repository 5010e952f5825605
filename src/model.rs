use crate::connman::consts::*;
use crate::variant::{self, FromVariant, PropertyMap, Variant, get, get_or_default};
use serde::Serialize;
use std::fmt::{self, Display};

/// D-Bus object path of a ConnMan service, e.g.
/// `/net/connman/service/ethernet_0800271a2b3c_cable`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ServicePath(String);

impl ServicePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ServicePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum ServiceType {
    Wifi,
    Ethernet,
    Other(String),
}

impl ServiceType {
    pub fn as_str(&self) -> &str {
        match self {
            ServiceType::Wifi => "wifi",
            ServiceType::Ethernet => "ethernet",
            ServiceType::Other(other) => other,
        }
    }
}

impl From<String> for ServiceType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "wifi" => ServiceType::Wifi,
            "ethernet" => ServiceType::Ethernet,
            _ => ServiceType::Other(value),
        }
    }
}

impl From<ServiceType> for String {
    fn from(value: ServiceType) -> Self {
        value.as_str().to_string()
    }
}

impl Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The `IPv4` block of a service. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ipv4Settings {
    method: String,
    address: String,
    netmask: String,
    gateway: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WifiDetails {
    security: Vec<String>,
    passphrase: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EthernetDetails {
    interface: String,
    address: String,
    mtu: u16,
}

/// ConnMan reports `Security` as `as`; very old daemons used a plain string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SecurityList(Vec<String>);

impl FromVariant for SecurityList {
    const EXPECTED: &'static str = "string or string list";

    fn from_variant(value: &Variant) -> Option<Self> {
        match value {
            Variant::Str(s) => Some(SecurityList(vec![s.clone()])),
            Variant::List(_) => Vec::<String>::from_variant(value).map(SecurityList),
            _ => None,
        }
    }
}

/// A decoded snapshot of one service's property bag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    path: ServicePath,
    name: String,
    #[serde(rename = "type")]
    kind: ServiceType,
    state: String,
    auto_connect: bool,
    favorite: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    ipv4: Option<Ipv4Settings>,
    #[serde(skip)]
    ipv6: Option<PropertyMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nameservers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wifi: Option<WifiDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ethernet: Option<EthernetDetails>,
}

impl Service {
    /// Decode a `GetProperties` reply.
    ///
    /// Missing keys mean "not applicable" and fall back to empty values.
    ///
    /// # Errors
    ///
    /// `InvalidProperty` if a present key has an unexpected shape.
    pub fn from_properties(path: ServicePath, props: &PropertyMap) -> variant::Result<Self> {
        let kind = ServiceType::from(get_or_default::<String>(props, PROP_TYPE)?);

        let ipv4 = get::<PropertyMap>(props, PROP_IPV4)?
            .map(|dict| parse_ipv4(&dict))
            .transpose()?;

        let wifi = match kind {
            ServiceType::Wifi => Some(WifiDetails {
                security: get_or_default::<SecurityList>(props, PROP_SECURITY)?.0,
                passphrase: get_or_default(props, PROP_PASSPHRASE)?,
            }),
            _ => None,
        };

        let ethernet = match kind {
            ServiceType::Ethernet => {
                let dict = get_or_default::<PropertyMap>(props, PROP_ETHERNET)?;
                Some(EthernetDetails {
                    interface: get_or_default(&dict, ETH_INTERFACE)?,
                    address: get_or_default(&dict, ETH_ADDRESS)?,
                    mtu: get_or_default(&dict, ETH_MTU)?,
                })
            }
            _ => None,
        };

        Ok(Self {
            path,
            name: get_or_default(props, PROP_NAME)?,
            kind,
            state: get_or_default(props, PROP_STATE)?,
            auto_connect: get_or_default(props, PROP_AUTOCONNECT)?,
            favorite: get_or_default(props, PROP_FAVORITE)?,
            ipv4,
            ipv6: get(props, PROP_IPV6)?,
            nameservers: get(props, PROP_NAMESERVERS)?,
            domains: get(props, PROP_DOMAINS)?,
            wifi,
            ethernet,
        })
    }

    pub fn path(&self) -> &ServicePath {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ServiceType {
        &self.kind
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn auto_connect(&self) -> bool {
        self.auto_connect
    }

    pub fn favorite(&self) -> bool {
        self.favorite
    }

    pub fn ipv4(&self) -> Option<&Ipv4Settings> {
        self.ipv4.as_ref()
    }

    pub fn ipv6(&self) -> Option<&PropertyMap> {
        self.ipv6.as_ref()
    }

    pub fn nameservers(&self) -> Option<&[String]> {
        self.nameservers.as_deref()
    }

    pub fn domains(&self) -> Option<&[String]> {
        self.domains.as_deref()
    }

    pub fn wifi(&self) -> Option<&WifiDetails> {
        self.wifi.as_ref()
    }

    pub fn ethernet(&self) -> Option<&EthernetDetails> {
        self.ethernet.as_ref()
    }

    /// Replace a non-empty passphrase with a fixed mask.
    pub fn redact_secrets(&mut self) {
        if let Some(wifi) = self.wifi.as_mut() {
            if !wifi.passphrase.is_empty() {
                wifi.passphrase = SECRET_MASK.to_string();
            }
        }
    }
}

pub const SECRET_MASK: &str = "********";

fn parse_ipv4(dict: &PropertyMap) -> variant::Result<Ipv4Settings> {
    Ok(Ipv4Settings {
        method: get_or_default(dict, IP_METHOD)?,
        address: get_or_default(dict, IP_ADDRESS)?,
        netmask: get_or_default(dict, IP_NETMASK)?,
        gateway: get_or_default(dict, IP_GATEWAY)?,
    })
}

impl Ipv4Settings {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn netmask(&self) -> &str {
        &self.netmask
    }

    pub fn gateway(&self) -> &str {
        &self.gateway
    }
}

impl WifiDetails {
    pub fn security(&self) -> &[String] {
        &self.security
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }
}

impl EthernetDetails {
    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn mtu(&self) -> u16 {
        self.mtu
    }
}
