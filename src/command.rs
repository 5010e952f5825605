//! Classification of the command line and the D-Bus sequence behind it.
//!
//! [`Request::parse`] looks only at the tokens, so malformed invocations
//! are rejected before the bus is touched. [`execute`] then runs the
//! request against a [`ServiceBus`].

use crate::address::{is_dotted_quad, parse_cidr};
use crate::bus::ServiceBus;
use crate::connman::consts::*;
use crate::error::{AppError, Result};
use crate::ipv4::{Ipv4Error, Ipv4Request};
use crate::model::{Service, ServicePath};
use crate::printer::{self, RenderOptions};
use crate::variant::Variant;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("'{operation}' needs {what}")]
    MissingArgument {
        operation: String,
        what: &'static str,
    },

    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),

    #[error("'{0}' is not one of on, off, yes, no, true, false")]
    InvalidSwitch(String),

    #[error(transparent)]
    Ipv4(#[from] Ipv4Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Show,
    Connect,
    Disconnect,
    Remove,
    SetPassphrase(String),
    SetAutoConnect(bool),
    SetNameservers(Vec<String>),
    ConfigureIpv4(Ipv4Request),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Print every service the daemon knows.
    List,
    /// Act on one named service.
    Service { name: String, operation: Operation },
}

impl Request {
    /// Classify an invocation.
    ///
    /// `service` is the first positional argument, `args` everything after
    /// it. An absent or empty service name lists all services; anything
    /// after an empty name is ignored.
    ///
    /// # Errors
    ///
    /// Any [`CommandError`]; no I/O happens here.
    pub fn parse<S: AsRef<str>>(service: Option<&str>, args: &[S]) -> std::result::Result<Self, CommandError> {
        let name = match service {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                if !args.is_empty() {
                    warn!(count = args.len(), "ignoring arguments after an empty service name");
                }
                return Ok(Request::List);
            }
        };

        let operation = match args.split_first() {
            None => Operation::Show,
            Some((op, rest)) => parse_operation(op.as_ref(), rest, args)?,
        };

        Ok(Request::Service { name, operation })
    }
}

fn parse_operation<S: AsRef<str>>(
    op: &str,
    rest: &[S],
    all: &[S],
) -> std::result::Result<Operation, CommandError> {
    let keyword = op.to_ascii_lowercase();

    let operation = match keyword.as_str() {
        "up" | "connect" => {
            no_more_args(rest)?;
            Operation::Connect
        }
        "down" | "disconnect" => {
            no_more_args(rest)?;
            Operation::Disconnect
        }
        "remove" => {
            no_more_args(rest)?;
            Operation::Remove
        }
        "pass" | "pwd" | "passphrase" => {
            Operation::SetPassphrase(single_arg(op, rest, "a passphrase")?.to_string())
        }
        "autoconnect" => {
            let value = single_arg(op, rest, "on or off")?;
            Operation::SetAutoConnect(parse_switch(value)?)
        }
        "ns" | "nameservers" => Operation::SetNameservers(
            rest.iter().map(|s| s.as_ref().to_string()).collect(),
        ),
        "ipv4" => Operation::ConfigureIpv4(Ipv4Request::from_tokens(all)?),
        _ if is_dotted_quad(op) || parse_cidr(op).is_some() => {
            Operation::ConfigureIpv4(Ipv4Request::from_tokens(all)?)
        }
        _ => return Err(CommandError::UnknownOperation(op.to_string())),
    };

    Ok(operation)
}

fn no_more_args<S: AsRef<str>>(rest: &[S]) -> std::result::Result<(), CommandError> {
    match rest.first() {
        Some(extra) => Err(CommandError::UnexpectedArgument(extra.as_ref().to_string())),
        None => Ok(()),
    }
}

fn single_arg<'a, S: AsRef<str>>(
    op: &str,
    rest: &'a [S],
    what: &'static str,
) -> std::result::Result<&'a str, CommandError> {
    match rest {
        [value] => Ok(value.as_ref()),
        [] => Err(CommandError::MissingArgument {
            operation: op.to_string(),
            what,
        }),
        [_, extra, ..] => Err(CommandError::UnexpectedArgument(extra.as_ref().to_string())),
    }
}

fn parse_switch(value: &str) -> std::result::Result<bool, CommandError> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" => Ok(true),
        "off" | "no" | "false" => Ok(false),
        _ => Err(CommandError::InvalidSwitch(value.to_string())),
    }
}

async fn fetch_service<B: ServiceBus>(bus: &B, path: &ServicePath) -> Result<Service> {
    let props = bus
        .properties(path)
        .await
        .map_err(AppError::operation("reading service properties"))?;

    debug!(%path, count = props.len(), "decoding service properties");
    Ok(Service::from_properties(path.clone(), &props)?)
}

/// Run a classified request.
///
/// Returns the text to print on stdout: the rendered services for `List`
/// and `Show`, nothing for mutations. Output is only produced once every
/// call has succeeded.
pub async fn execute<B: ServiceBus>(bus: &B, request: &Request, options: &RenderOptions) -> Result<String> {
    let (name, operation) = match request {
        Request::List => {
            let paths = bus
                .service_paths()
                .await
                .map_err(AppError::operation("listing services"))?;
            info!(count = paths.len(), "listing services");

            let mut services = Vec::with_capacity(paths.len());
            for path in &paths {
                services.push(fetch_service(bus, path).await?);
            }
            return Ok(printer::render(services, options)?);
        }
        Request::Service { name, operation } => (name, operation),
    };

    let path = bus.lookup_service(name).await?;
    debug!(name, %path, "resolved service");

    match operation {
        Operation::Show => {
            let service = fetch_service(bus, &path).await?;
            return Ok(printer::render(vec![service], options)?);
        }
        Operation::Connect => {
            bus.connect(&path)
                .await
                .map_err(AppError::operation("connecting service"))?;
            info!(%path, "connected");
        }
        Operation::Disconnect => {
            bus.disconnect(&path)
                .await
                .map_err(AppError::operation("disconnecting service"))?;
            info!(%path, "disconnected");
        }
        Operation::Remove => {
            bus.remove(&path)
                .await
                .map_err(AppError::operation("removing service"))?;
            info!(%path, "removed");
        }
        Operation::SetPassphrase(secret) => {
            bus.set_property(&path, PROP_PASSPHRASE, &Variant::from(secret.as_str()))
                .await
                .map_err(AppError::operation("setting passphrase"))?;
            info!(%path, "passphrase set");
        }
        Operation::SetAutoConnect(enabled) => {
            bus.set_property(&path, PROP_AUTOCONNECT, &Variant::Bool(*enabled))
                .await
                .map_err(AppError::operation("setting autoconnect"))?;
            info!(%path, enabled, "autoconnect set");
        }
        Operation::SetNameservers(servers) => {
            bus.set_property(&path, PROP_NAMESERVERS_CONFIG, &Variant::from(servers.clone()))
                .await
                .map_err(AppError::operation("setting nameservers"))?;
            info!(%path, ?servers, "nameservers set");
        }
        Operation::ConfigureIpv4(config) => {
            let props = config.to_properties();
            debug!(%path, method = %config.method(), "submitting ipv4 configuration");

            bus.set_property(&path, PROP_IPV4_CONFIG, &Variant::Map(props))
                .await
                .map_err(AppError::operation("setting new configuration"))?;
            info!(%path, "ipv4 configuration submitted");
        }
    }

    Ok(String::new())
}
