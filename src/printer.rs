//! Human readable and JSON renderings of decoded services.

use crate::model::{Service, ServiceType};
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub format: OutputFormat,
    pub hide_secrets: bool,
}

/// Multi-line summary of one service, followed by a blank line.
pub struct ServiceSummary<'a>(pub &'a Service);

impl Display for ServiceSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let service = self.0;

        writeln!(f, "{}\t{}", service.name(), service.path())?;

        write!(f, "\ttype:{} state:{}", service.kind(), service.state())?;
        if service.auto_connect() {
            write!(f, " auto")?;
        }
        if service.favorite() {
            write!(f, " fav")?;
        }
        writeln!(f)?;

        if let Some(ipv4) = service.ipv4() {
            writeln!(
                f,
                "\tipv4 method:{} addr:{} mask:{} gw:{}",
                ipv4.method(),
                ipv4.address(),
                ipv4.netmask(),
                ipv4.gateway()
            )?;
        }

        // IPv6 is decoded but has no line of its own.

        if let Some(nameservers) = service.nameservers() {
            writeln!(f, "\tns: {}", nameservers.join(" "))?;
        }

        if let Some(domains) = service.domains() {
            writeln!(f, "\tdomains: {}", domains.join(" "))?;
        }

        match (service.kind(), service.wifi(), service.ethernet()) {
            (ServiceType::Wifi, Some(wifi), _) => writeln!(
                f,
                "\twifi sec:{} pass:{}",
                wifi.security().join(" "),
                wifi.passphrase()
            )?,
            (ServiceType::Ethernet, _, Some(eth)) => writeln!(
                f,
                "\ton:{} mac:{} mtu:{}",
                eth.interface(),
                eth.address(),
                eth.mtu()
            )?,
            _ => {}
        }

        writeln!(f)
    }
}

pub fn render_text(services: &[Service]) -> String {
    services
        .iter()
        .map(|service| ServiceSummary(service).to_string())
        .collect()
}

pub fn render_json(services: &[Service]) -> serde_json::Result<String> {
    let mut out = serde_json::to_string_pretty(services)?;
    out.push('\n');
    Ok(out)
}

/// Render `services` according to `options`, masking secrets if asked to.
pub fn render(mut services: Vec<Service>, options: &RenderOptions) -> serde_json::Result<String> {
    if options.hide_secrets {
        services.iter_mut().for_each(Service::redact_secrets);
    }

    match options.format {
        OutputFormat::Text => Ok(render_text(&services)),
        OutputFormat::Json => render_json(&services),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SECRET_MASK, ServicePath};
    use crate::variant::{PropertyMap, Variant};

    fn service(path: &str, entries: Vec<(&str, Variant)>) -> Service {
        let props: PropertyMap = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Service::from_properties(ServicePath::new(path), &props).unwrap()
    }

    fn map(entries: Vec<(&str, Variant)>) -> Variant {
        Variant::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    #[test]
    fn ethernet_without_ipv4() {
        let eth0 = service(
            "/net/connman/service/ethernet_eth0",
            vec![
                ("Name", Variant::from("eth0")),
                ("Type", Variant::from("ethernet")),
                ("AutoConnect", Variant::Bool(true)),
            ],
        );

        let text = render_text(&[eth0]);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "eth0\t/net/connman/service/ethernet_eth0");
        assert_eq!(lines[1], "\ttype:ethernet state: auto");
        assert!(!text.contains("ipv4"));
        assert_eq!(lines[2], "\ton: mac: mtu:0");
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn ethernet_details() {
        let eth0 = service(
            "/net/connman/service/ethernet_0800271a2b3c_cable",
            vec![
                ("Name", Variant::from("Wired")),
                ("Type", Variant::from("ethernet")),
                ("State", Variant::from("ready")),
                (
                    "Ethernet",
                    map(vec![
                        ("Method", Variant::from("auto")),
                        ("Interface", Variant::from("eth0")),
                        ("Address", Variant::from("08:00:27:1A:2B:3C")),
                        ("MTU", Variant::UInt16(1500)),
                    ]),
                ),
            ],
        );

        assert_eq!(
            render_text(&[eth0]),
            "Wired\t/net/connman/service/ethernet_0800271a2b3c_cable\n\
             \ttype:ethernet state:ready\n\
             \ton:eth0 mac:08:00:27:1A:2B:3C mtu:1500\n\
             \n"
        );
    }

    #[test]
    fn full_wifi_service() {
        let wifi = service(
            "/net/connman/service/wifi_1_managed_psk",
            vec![
                ("Name", Variant::from("Home")),
                ("Type", Variant::from("wifi")),
                ("State", Variant::from("online")),
                ("AutoConnect", Variant::Bool(true)),
                ("Favorite", Variant::Bool(true)),
                (
                    "IPv4",
                    map(vec![
                        ("Method", Variant::from("dhcp")),
                        ("Address", Variant::from("192.168.1.20")),
                        ("Netmask", Variant::from("255.255.255.0")),
                        ("Gateway", Variant::from("192.168.1.1")),
                    ]),
                ),
                ("IPv6", map(vec![("Method", Variant::from("auto"))])),
                (
                    "Nameservers",
                    Variant::from(vec!["192.168.1.1".to_string(), "8.8.8.8".to_string()]),
                ),
                ("Domains", Variant::from(vec!["lan".to_string()])),
                ("Security", Variant::from(vec!["psk".to_string()])),
                ("Passphrase", Variant::from("hunter22")),
            ],
        );

        let expected = "Home\t/net/connman/service/wifi_1_managed_psk\n\
                        \ttype:wifi state:online auto fav\n\
                        \tipv4 method:dhcp addr:192.168.1.20 mask:255.255.255.0 gw:192.168.1.1\n\
                        \tns: 192.168.1.1 8.8.8.8\n\
                        \tdomains: lan\n\
                        \twifi sec:psk pass:hunter22\n\
                        \n";

        assert_eq!(render_text(&[wifi]), expected);
    }

    #[test]
    fn flags_are_omitted_when_false() {
        let svc = service(
            "/s",
            vec![
                ("Name", Variant::from("cell")),
                ("Type", Variant::from("cellular")),
                ("State", Variant::from("idle")),
            ],
        );

        assert_eq!(render_text(&[svc]), "cell\t/s\n\ttype:cellular state:idle\n\n");
    }

    #[test]
    fn services_are_separated_by_blank_lines() {
        let a = service("/a", vec![("Name", Variant::from("a"))]);
        let b = service("/b", vec![("Name", Variant::from("b"))]);

        assert_eq!(
            render_text(&[a, b]),
            "a\t/a\n\ttype: state:\n\nb\t/b\n\ttype: state:\n\n"
        );
    }

    #[test]
    fn hidden_secrets_are_masked_in_both_formats() {
        let wifi = || {
            service(
                "/w",
                vec![
                    ("Type", Variant::from("wifi")),
                    ("Passphrase", Variant::from("hunter22")),
                ],
            )
        };
        let options = RenderOptions {
            format: OutputFormat::Text,
            hide_secrets: true,
        };

        let text = render(vec![wifi()], &options).unwrap();
        assert!(text.contains(&format!("pass:{}", SECRET_MASK)));
        assert!(!text.contains("hunter22"));

        let json = render(
            vec![wifi()],
            &RenderOptions {
                format: OutputFormat::Json,
                ..options
            },
        )
        .unwrap();
        assert!(!json.contains("hunter22"));
    }

    #[test]
    fn json_shape() {
        let eth0 = service(
            "/net/connman/service/ethernet_eth0",
            vec![
                ("Name", Variant::from("eth0")),
                ("Type", Variant::from("ethernet")),
                ("State", Variant::from("ready")),
            ],
        );

        let json = render_json(&[eth0]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["name"], "eth0");
        assert_eq!(value[0]["type"], "ethernet");
        assert_eq!(value[0]["path"], "/net/connman/service/ethernet_eth0");
        assert_eq!(value[0]["autoConnect"], false);
        assert_eq!(value[0]["ethernet"]["mtu"], 0);
        assert!(value[0].get("ipv4").is_none());
    }
}
