use crate::connman::BusKind;
use crate::printer::{OutputFormat, RenderOptions};
use clap::Parser;

/// Inspect and configure ConnMan services.
///
/// Without arguments every service is listed. With a service name the
/// service is shown, or the given operation is applied to it:
///
///   up | connect, down | disconnect, remove,
///   pass | pwd | passphrase <secret>,
///   autoconnect on|off,
///   ns | nameservers [<addr>...],
///   ipv4 [dhcp] [addr <a>] [mask <m>] [gw <g>] [<a>/<prefix>]
#[derive(Debug, Parser)]
#[command(name = "cm", version, verbatim_doc_comment)]
pub struct Cli {
    /// Service name or identifier, as accepted by the daemon
    pub service: Option<String>,

    /// Operation and its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Message bus the daemon listens on
    #[arg(long, value_enum, default_value_t = BusKind::System)]
    pub bus: BusKind,

    /// Print services as JSON
    #[arg(long)]
    pub json: bool,

    /// Mask passphrases in the output
    #[arg(long)]
    pub hide_secrets: bool,

    /// More log output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            format: if self.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            hide_secrets: self.hide_secrets,
        }
    }

    /// Default log filter for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn service_and_operation_are_split() {
        let cli = Cli::parse_from(["cm", "eth0", "ipv4", "10.0.0.5/24", "gw", "10.0.0.1"]);

        assert_eq!(cli.service.as_deref(), Some("eth0"));
        assert_eq!(cli.args, ["ipv4", "10.0.0.5/24", "gw", "10.0.0.1"]);
        assert_eq!(cli.bus, BusKind::System);
    }

    #[test]
    fn flags_before_the_service() {
        let cli = Cli::parse_from(["cm", "--json", "--hide-secrets", "-vv", "--bus", "session"]);

        assert!(cli.service.is_none());
        assert_eq!(cli.bus, BusKind::Session);
        assert_eq!(cli.log_level(), "debug");

        let options = cli.render_options();
        assert_eq!(options.format, OutputFormat::Json);
        assert!(options.hide_secrets);
    }

    #[test]
    fn quiet_by_default() {
        let cli = Cli::parse_from(["cm"]);
        assert_eq!(cli.log_level(), "warn");
        assert_eq!(cli.render_options().format, OutputFormat::Text);
    }
}
