//! Assembly of an `IPv4.Configuration` request from command line tokens.
//!
//! Tokens are classified first (bare address, bare CIDR, keyword, anything
//! else) and then fed through a two-state machine: either scanning for the
//! next item, or expecting the value of a keyword seen just before.
//!
//! Precedence while scanning:
//! 1. a bare dotted quad fills the next unfilled slot (address, netmask,
//!    gateway, in that order)
//! 2. a bare CIDR sets the address and the derived netmask
//! 3. `addr`/`address`, `mask`/`netmask`, `gw`/`gateway` take the next
//!    token as their value
//! 4. `dhcp`/`auto` switch the method to DHCP, `ipv4` is ignored
//! 5. anything else is skipped with a warning
//!
//! A non-address after `addr` is dropped, and a keyword at the very end
//! leaves its slot unset. Both are logged.

use crate::address::{AddressError, Cidr, is_dotted_quad, parse_cidr};
use crate::connman::consts::*;
use crate::variant::{PropertyMap, Variant};
use std::fmt::{self, Display};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Ipv4Error {
    #[error(transparent)]
    Prefix(#[from] AddressError),

    #[error("no address slot left for '{0}'")]
    TooManyAddresses(String),
}

pub type Result<T> = std::result::Result<T, Ipv4Error>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Manual,
    Dhcp,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Manual => "manual",
            Method::Dhcp => "dhcp",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The `IPv4.Configuration` map the tool submits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ipv4Request {
    method: Method,
    address: Option<String>,
    netmask: Option<String>,
    gateway: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Address,
    Netmask,
    Gateway,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Ipv4,
    Dhcp,
    Value(Slot),
}

#[derive(Debug)]
enum Token<'a> {
    Address(&'a str),
    Cidr(Cidr<'a>),
    Keyword(Keyword),
    Other(&'a str),
}

enum State<'a> {
    Scanning,
    Expecting(Slot, &'a str),
}

fn classify(token: &str) -> Token<'_> {
    if is_dotted_quad(token) {
        return Token::Address(token);
    }
    if let Some(cidr) = parse_cidr(token) {
        return Token::Cidr(cidr);
    }

    match token.to_ascii_lowercase().as_str() {
        "ipv4" => Token::Keyword(Keyword::Ipv4),
        "dhcp" | "auto" => Token::Keyword(Keyword::Dhcp),
        "addr" | "address" => Token::Keyword(Keyword::Value(Slot::Address)),
        "mask" | "netmask" => Token::Keyword(Keyword::Value(Slot::Netmask)),
        "gw" | "gateway" => Token::Keyword(Keyword::Value(Slot::Gateway)),
        _ => Token::Other(token),
    }
}

impl Ipv4Request {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Build a request from the operation token and everything after it.
    ///
    /// # Errors
    ///
    /// See [`Ipv4Error`]; an out of range CIDR prefix is `Prefix`.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let mut request = Self::default();
        let mut state = State::Scanning;

        for token in tokens {
            let token = token.as_ref();

            state = match state {
                State::Scanning => match classify(token) {
                    Token::Address(address) => {
                        request.fill_next_slot(address)?;
                        State::Scanning
                    }
                    Token::Cidr(cidr) => {
                        request.set_cidr(cidr)?;
                        State::Scanning
                    }
                    Token::Keyword(Keyword::Ipv4) => State::Scanning,
                    Token::Keyword(Keyword::Dhcp) => {
                        request.method = Method::Dhcp;
                        State::Scanning
                    }
                    Token::Keyword(Keyword::Value(slot)) => State::Expecting(slot, token),
                    Token::Other(other) => {
                        warn!(token = other, "ignoring unknown ipv4 argument");
                        State::Scanning
                    }
                },
                State::Expecting(Slot::Address, _) => {
                    if is_dotted_quad(token) {
                        request.address = Some(token.to_string());
                    } else if let Some(cidr) = parse_cidr(token) {
                        request.set_cidr(cidr)?;
                    } else {
                        warn!(token, "ignoring non-address after address keyword");
                    }
                    State::Scanning
                }
                State::Expecting(Slot::Netmask, _) => {
                    request.netmask = Some(token.to_string());
                    State::Scanning
                }
                State::Expecting(Slot::Gateway, _) => {
                    request.gateway = Some(token.to_string());
                    State::Scanning
                }
            };
        }

        if let State::Expecting(_, keyword) = state {
            warn!(keyword, "ipv4 keyword without a value, ignoring it");
        }

        Ok(request)
    }

    fn fill_next_slot(&mut self, address: &str) -> Result<()> {
        let slot = [&mut self.address, &mut self.netmask, &mut self.gateway]
            .into_iter()
            .find(|slot| slot.is_none())
            .ok_or_else(|| Ipv4Error::TooManyAddresses(address.to_string()))?;

        *slot = Some(address.to_string());
        Ok(())
    }

    fn set_cidr(&mut self, cidr: Cidr<'_>) -> Result<()> {
        let netmask = cidr.netmask()?;
        self.address = Some(cidr.address().to_string());
        self.netmask = Some(netmask.to_string());
        Ok(())
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn netmask(&self) -> Option<&str> {
        self.netmask.as_deref()
    }

    pub fn gateway(&self) -> Option<&str> {
        self.gateway.as_deref()
    }

    /// The `a{sv}` map sent to the daemon. `Method` is always present,
    /// the other keys only when they hold a non-empty value.
    pub fn to_properties(&self) -> PropertyMap {
        let mut props = PropertyMap::new();
        props.insert(IP_METHOD.to_string(), Variant::from(self.method.as_str()));

        let fields = [
            (IP_ADDRESS, &self.address),
            (IP_NETMASK, &self.netmask),
            (IP_GATEWAY, &self.gateway),
        ];
        for (key, value) in fields {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                props.insert(key.to_string(), Variant::from(value));
            }
        }

        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Ipv4Request> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        Ipv4Request::from_tokens(&tokens)
    }

    fn request(
        method: Method,
        address: Option<&str>,
        netmask: Option<&str>,
        gateway: Option<&str>,
    ) -> Ipv4Request {
        Ipv4Request {
            method,
            address: address.map(String::from),
            netmask: netmask.map(String::from),
            gateway: gateway.map(String::from),
        }
    }

    mod from_tokens {
        use super::*;

        #[test]
        fn cidr_with_gateway_keyword() {
            assert_eq!(
                parse("ipv4 10.0.0.5/24 gw 10.0.0.1").unwrap(),
                request(
                    Method::Manual,
                    Some("10.0.0.5"),
                    Some("255.255.255.0"),
                    Some("10.0.0.1")
                )
            );
        }

        #[test]
        fn bare_addresses_fill_slots_in_order() {
            assert_eq!(
                parse("ipv4 192.168.1.20 255.255.255.0 192.168.1.1").unwrap(),
                request(
                    Method::Manual,
                    Some("192.168.1.20"),
                    Some("255.255.255.0"),
                    Some("192.168.1.1")
                )
            );
        }

        #[test]
        fn operation_token_can_be_the_address() {
            assert_eq!(
                parse("10.0.0.5 255.0.0.0").unwrap(),
                request(Method::Manual, Some("10.0.0.5"), Some("255.0.0.0"), None)
            );
            assert_eq!(
                parse("10.0.0.5/8").unwrap(),
                request(Method::Manual, Some("10.0.0.5"), Some("255.0.0.0"), None)
            );
        }

        #[test]
        fn bare_address_skips_slots_filled_by_keywords() {
            assert_eq!(
                parse("ipv4 addr 10.0.0.5 10.0.0.1").unwrap(),
                request(Method::Manual, Some("10.0.0.5"), Some("10.0.0.1"), None)
            );
            assert_eq!(
                parse("ipv4 10.0.0.5/24 10.0.0.1").unwrap(),
                request(
                    Method::Manual,
                    Some("10.0.0.5"),
                    Some("255.255.255.0"),
                    Some("10.0.0.1")
                )
            );
        }

        #[test]
        fn cidr_overrides_earlier_slots() {
            assert_eq!(
                parse("ipv4 1.1.1.1 2.2.2.2 10.0.0.5/16").unwrap(),
                request(Method::Manual, Some("10.0.0.5"), Some("255.255.0.0"), None)
            );
        }

        #[test]
        fn keywords_take_values_verbatim() {
            assert_eq!(
                parse("ipv4 netmask 255.255.0.0 gateway 10.0.0.1 address 10.0.0.7").unwrap(),
                request(
                    Method::Manual,
                    Some("10.0.0.7"),
                    Some("255.255.0.0"),
                    Some("10.0.0.1")
                )
            );
        }

        #[test]
        fn address_keyword_accepts_cidr() {
            assert_eq!(
                parse("ipv4 addr 172.16.0.9/12").unwrap(),
                request(Method::Manual, Some("172.16.0.9"), Some("255.240.0.0"), None)
            );
        }

        #[test]
        fn dhcp_keeps_given_fields() {
            assert_eq!(
                parse("ipv4 dhcp").unwrap(),
                request(Method::Dhcp, None, None, None)
            );
            assert_eq!(
                parse("ipv4 auto gw 10.0.0.1").unwrap(),
                request(Method::Dhcp, None, None, Some("10.0.0.1"))
            );
        }

        #[test]
        fn keywords_ignore_case() {
            assert_eq!(
                parse("IPv4 DHCP GW 10.0.0.1").unwrap(),
                request(Method::Dhcp, None, None, Some("10.0.0.1"))
            );
        }

        #[test]
        fn bad_prefix_is_reported() {
            assert_eq!(
                parse("ipv4 10.0.0.5/32").unwrap_err(),
                Ipv4Error::Prefix(AddressError::InvalidPrefix("32".into()))
            );
            assert_eq!(
                parse("ipv4 addr 10.0.0.5/0").unwrap_err(),
                Ipv4Error::Prefix(AddressError::InvalidPrefix("0".into()))
            );
        }

        #[test]
        fn dangling_keyword_is_ignored() {
            assert_eq!(
                parse("ipv4 10.0.0.5 gw").unwrap(),
                request(Method::Manual, Some("10.0.0.5"), None, None)
            );
        }

        #[test]
        fn non_address_after_address_keyword_is_dropped() {
            // The value is consumed, so `dhcp` here is not a method switch.
            assert_eq!(
                parse("ipv4 addr dhcp gw 10.0.0.1").unwrap(),
                request(Method::Manual, None, None, Some("10.0.0.1"))
            );
        }

        #[test]
        fn fourth_bare_address_is_an_error() {
            assert_eq!(
                parse("ipv4 1.1.1.1 2.2.2.2 3.3.3.3 4.4.4.4").unwrap_err(),
                Ipv4Error::TooManyAddresses("4.4.4.4".into())
            );
        }

        #[test]
        fn unknown_tokens_are_skipped() {
            assert_eq!(
                parse("ipv4 dhcp foo").unwrap(),
                request(Method::Dhcp, None, None, None)
            );
            // A misspelt keyword is skipped and its value fills the next slot.
            assert_eq!(
                parse("ipv4 10.0.0.5 gatway 10.0.0.1").unwrap(),
                request(Method::Manual, Some("10.0.0.5"), Some("10.0.0.1"), None)
            );
        }
    }

    mod to_properties {
        use super::*;

        #[test]
        fn method_is_always_present() {
            let props = Ipv4Request::new(Method::Dhcp).to_properties();

            assert_eq!(props.len(), 1);
            assert_eq!(props["Method"], Variant::from("dhcp"));
        }

        #[test]
        fn full_manual_request() {
            let props = parse("ipv4 10.0.0.5/24 gw 10.0.0.1").unwrap().to_properties();

            let expected: PropertyMap = [
                ("Method", "manual"),
                ("Address", "10.0.0.5"),
                ("Netmask", "255.255.255.0"),
                ("Gateway", "10.0.0.1"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), Variant::from(v)))
            .collect();

            assert_eq!(props, expected);
        }

        #[test]
        fn empty_values_are_left_out() {
            let tokens = ["ipv4", "gw", ""];
            let props = Ipv4Request::from_tokens(&tokens).unwrap().to_properties();

            assert!(!props.contains_key("Gateway"));
        }
    }
}
