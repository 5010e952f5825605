//! Dotted-quad and CIDR token handling for the IPv4 command.
//!
//! The address pattern only checks the shape of a token (four groups of one
//! to three digits). Octet ranges are not validated, so `999.999.999.999`
//! is accepted and left for the daemon to reject.

use regex::Regex;
use std::net::Ipv4Addr;
use std::sync::LazyLock;
use thiserror::Error;

static DOTTED_QUAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}$").unwrap()
});

static CIDR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3})/([0-9]+)$").unwrap()
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("could not process CIDR-style mask '{0}'")]
    InvalidPrefix(String),
}

/// An `address/prefix` token split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cidr<'a> {
    address: &'a str,
    prefix: &'a str,
}

impl<'a> Cidr<'a> {
    pub fn address(&self) -> &'a str {
        self.address
    }

    /// The prefix length exactly as written.
    pub fn prefix(&self) -> &'a str {
        self.prefix
    }

    pub fn netmask(&self) -> Result<Ipv4Addr, AddressError> {
        prefix_to_netmask(self.prefix)
    }
}

pub fn is_dotted_quad(token: &str) -> bool {
    DOTTED_QUAD.is_match(token)
}

pub fn parse_cidr(token: &str) -> Option<Cidr<'_>> {
    let caps = CIDR.captures(token)?;
    Some(Cidr {
        address: caps.get(1)?.as_str(),
        prefix: caps.get(2)?.as_str(),
    })
}

/// Convert a prefix length (1 to 31) into a netmask.
///
/// # Errors
///
/// `InvalidPrefix` if the input is not a number or lies outside 1..=31.
pub fn prefix_to_netmask(prefix: &str) -> Result<Ipv4Addr, AddressError> {
    let bits: u32 = prefix
        .parse()
        .map_err(|_| AddressError::InvalidPrefix(prefix.to_string()))?;

    if !(1..=31).contains(&bits) {
        return Err(AddressError::InvalidPrefix(prefix.to_string()));
    }

    Ok(Ipv4Addr::from(u32::MAX << (32 - bits)))
}
