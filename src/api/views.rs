// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! HTML rendering for the web UI
//!
//! The index page loads htmx; every other view is a fragment swapped into
//! one of three targets: `#device-list`, `#device-detail`, `#resource-view`.
//! Everything interpolated into markup goes through [`escape`].

use std::fmt::Write;

use crate::mikrotik::{DeviceSnapshot, InterfaceInfo, Resource};
use crate::registry::{Device, DeviceStatus};
use crate::service::DeviceView;

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@2.0.4";

/// Resources offered as one-click links on the detail view
const QUICK_RESOURCES: [(&str, &str); 6] = [
    ("ip/address", "IP addresses"),
    ("ip/route", "Routes"),
    ("ip/dhcp-server/lease", "DHCP leases"),
    ("interface/bridge", "Bridges"),
    ("system/routerboard", "RouterBOARD"),
    ("log", "Log"),
];

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:2rem;color:#222}\
table{border-collapse:collapse;margin:.5rem 0}\
th,td{border:1px solid #ccc;padding:.25rem .5rem;text-align:left}\
th{background:#f3f3f3}\
.notice{padding:.5rem;margin:.5rem 0;border-radius:4px}\
.notice.success{background:#e6f4e6}\
.notice.error{background:#fbe4e4}\
.status-online{color:#18794e}\
.status-unreachable,.status-auth-failed,.status-error{color:#b42318}\
.status-unknown{color:#777}\
form label{margin-right:.5rem}";

/// Inline message shown above a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Escapes text for HTML element content and quoted attribute values
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

fn notice_html(notice: &Notice) -> String {
    let (class, text) = match notice {
        Notice::Success(text) => ("success", text),
        Notice::Error(text) => ("error", text),
    };
    format!(
        r#"<div class="notice {class}" role="status">{}</div>"#,
        escape(text)
    )
}

fn error_block(message: &str) -> String {
    notice_html(&Notice::Error(message.to_string()))
}

fn status_badge(status: &DeviceStatus) -> String {
    let label = status.label();
    match status.reason() {
        Some(reason) => format!(
            r#"<span class="status-{label}" title="{}">{label}</span>"#,
            escape(reason)
        ),
        None => format!(r#"<span class="status-{label}">{label}</span>"#),
    }
}

fn or_dash(value: Option<&str>) -> String {
    value.map_or_else(|| "-".to_string(), escape)
}

/// Human readable byte count using binary units
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Full page: add form, device list and empty detail pane
pub fn index_page(devices: &[Device]) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>MikroTik Web UI</title>
<script src="{HTMX_SRC}"></script>
<style>{STYLE}</style>
</head>
<body>
<h1>MikroTik devices</h1>
<form hx-post="/devices" hx-target="#device-list" hx-swap="outerHTML" hx-on::after-request="if(event.detail.successful) this.reset()">
<label>Address <input name="address" required placeholder="192.168.88.1"></label>
<label>Port <input name="port" inputmode="numeric" placeholder="default"></label>
<label>Username <input name="username" autocomplete="username" placeholder="default"></label>
<label>Password <input name="password" type="password" autocomplete="current-password"></label>
<button type="submit">Add device</button>
</form>
{list}
<div id="device-detail"></div>
</body>
</html>
"##,
        list = device_list(devices, None),
    )
}

/// Device table, optionally preceded by a notice
pub fn device_list(devices: &[Device], notice: Option<&Notice>) -> String {
    let mut html = String::from(r#"<div id="device-list">"#);
    if let Some(notice) = notice {
        html.push_str(&notice_html(notice));
    }

    if devices.is_empty() {
        html.push_str("<p>No devices registered yet.</p></div>");
        return html;
    }

    html.push_str(
        "<table><thead><tr><th>Address</th><th>Identity</th><th>Board</th>\
         <th>RouterOS</th><th>Status</th><th>Added</th><th></th></tr></thead><tbody>",
    );
    for device in devices {
        let id = device.id;
        let _ = write!(
            html,
            r##"<tr><td>{address}</td><td>{identity}</td><td>{board}</td><td>{version}</td><td>{status}</td><td>{added}</td><td><button hx-get="/devices/{id}" hx-target="#device-detail" hx-swap="outerHTML">View</button> <button hx-delete="/devices/{id}" hx-target="#device-list" hx-swap="outerHTML" hx-confirm="Remove {address}?">Remove</button></td></tr>"##,
            address = escape(&device.endpoint.to_string()),
            identity = or_dash(device.metadata.identity.as_deref()),
            board = or_dash(device.metadata.board_name.as_deref()),
            version = or_dash(device.metadata.version.as_deref()),
            status = status_badge(&device.status),
            added = device.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        );
    }
    html.push_str("</tbody></table></div>");
    html
}

fn detail_header(device: &Device) -> String {
    format!(
        "<h2>{} {}</h2>",
        escape(&device.endpoint.to_string()),
        status_badge(&device.status)
    )
}

/// Live snapshot of one device, or the reason it could not be fetched
pub fn device_detail(view: &DeviceView<DeviceSnapshot>) -> String {
    let device = &view.device;
    let mut html = String::from(r#"<div id="device-detail">"#);
    html.push_str(&detail_header(device));

    match &view.data {
        Err(message) => html.push_str(&error_block(message)),
        Ok(snapshot) => {
            html.push_str(&system_table(snapshot));
            html.push_str(&interface_table(&snapshot.interfaces));
        }
    }

    html.push_str("<h3>Browse</h3><p>");
    for (path, title) in QUICK_RESOURCES {
        let _ = write!(
            html,
            r##"<button hx-get="/devices/{}/rest/{path}" hx-target="#resource-view" hx-swap="outerHTML">{title}</button> "##,
            device.id
        );
    }
    html.push_str(r#"</p><div id="resource-view"></div></div>"#);
    html
}

fn system_table(snapshot: &DeviceSnapshot) -> String {
    let system = &snapshot.system;
    let used = system.total_memory.saturating_sub(system.free_memory);
    format!(
        "<table><tbody>\
         <tr><th>Identity</th><td>{identity}</td></tr>\
         <tr><th>Board</th><td>{board}</td></tr>\
         <tr><th>Architecture</th><td>{arch}</td></tr>\
         <tr><th>RouterOS</th><td>{version}</td></tr>\
         <tr><th>Uptime</th><td>{uptime}</td></tr>\
         <tr><th>CPU load</th><td>{cpu}%</td></tr>\
         <tr><th>Memory</th><td>{used} / {total}</td></tr>\
         <tr><th>Fetched</th><td>{fetched}</td></tr>\
         </tbody></table>",
        identity = or_dash(snapshot.identity.as_deref()),
        board = escape(&system.board_name),
        arch = escape(&system.architecture),
        version = escape(&system.version),
        uptime = escape(&system.uptime),
        cpu = system.cpu_load,
        used = format_bytes(used),
        total = format_bytes(system.total_memory),
        fetched = snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

fn interface_table(interfaces: &[InterfaceInfo]) -> String {
    let mut html = String::from("<h3>Interfaces</h3>");
    if interfaces.is_empty() {
        html.push_str("<p>No interfaces reported.</p>");
        return html;
    }
    html.push_str(
        "<table><thead><tr><th>Name</th><th>Type</th><th>MAC</th><th>State</th>\
         <th>RX</th><th>TX</th><th>Errors (rx/tx)</th><th>Comment</th></tr></thead><tbody>",
    );
    for iface in interfaces {
        let state = match (iface.disabled, iface.running) {
            (true, _) => "disabled",
            (false, true) => "running",
            (false, false) => "down",
        };
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{state}</td><td>{}</td><td>{}</td><td>{}/{}</td><td>{}</td></tr>",
            escape(&iface.name),
            escape(&iface.kind),
            or_dash(iface.mac_address.as_deref()),
            format_bytes(iface.rx_bytes),
            format_bytes(iface.tx_bytes),
            iface.rx_errors,
            iface.tx_errors,
            or_dash(iface.comment.as_deref()),
        );
    }
    html.push_str("</tbody></table>");
    html
}

/// Generic table of a REST resource
pub fn resource_view(view: &DeviceView<Resource>, path: &str) -> String {
    let mut html = String::from(r#"<div id="resource-view">"#);
    let _ = write!(html, "<h3>/{}</h3>", escape(path.trim_matches('/')));

    match &view.data {
        Err(message) => html.push_str(&error_block(message)),
        Ok(resource) if resource.is_empty() => html.push_str("<p>No entries.</p>"),
        Ok(resource) => {
            let columns = resource.columns();
            html.push_str("<table><thead><tr>");
            for column in &columns {
                let _ = write!(html, "<th>{}</th>", escape(column));
            }
            html.push_str("</tr></thead><tbody>");
            for record in &resource.records {
                html.push_str("<tr>");
                for column in &columns {
                    let value = record.get(column).map_or("", String::as_str);
                    let _ = write!(html, "<td>{}</td>", escape(value));
                }
                html.push_str("</tr>");
            }
            html.push_str("</tbody></table>");
        }
    }

    html.push_str("</div>");
    html
}

/// Detail pane holding only an error message
pub fn detail_error(message: &str) -> String {
    format!(r#"<div id="device-detail">{}</div>"#, error_block(message))
}

/// Fragment for an unknown or malformed device id
pub fn not_found(id: &str) -> String {
    detail_error(&format!("Device '{id}' not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mikrotik::{Credentials, DeviceEndpoint, Record, SystemResource};
    use crate::registry::NewDevice;

    fn device(host: &str) -> Device {
        Device::new(NewDevice {
            endpoint: DeviceEndpoint::new(host, 80),
            credentials: Credentials::new("admin", "hunter2"),
        })
    }

    fn snapshot() -> DeviceSnapshot {
        DeviceSnapshot {
            identity: Some("<core>".to_string()),
            system: SystemResource {
                uptime: "1d".to_string(),
                cpu_load: 3,
                free_memory: 1024,
                total_memory: 4096,
                version: "7.16".to_string(),
                board_name: "hAP ax2".to_string(),
                architecture: "arm64".to_string(),
            },
            interfaces: Vec::new(),
            fetched_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }

    #[test]
    fn test_index_page_loads_htmx_and_form() {
        let html = index_page(&[]);
        assert!(html.contains(HTMX_SRC));
        assert!(html.contains(r#"hx-post="/devices""#));
        assert!(html.contains("No devices registered yet."));
    }

    #[test]
    fn test_device_list_never_renders_password() {
        let html = device_list(&[device("192.0.2.1")], None);
        assert!(html.contains("192.0.2.1:80"));
        assert!(html.contains("status-unknown"));
        assert!(!html.contains("hunter2"));
    }

    #[test]
    fn test_device_list_escapes_notice() {
        let notice = Notice::Error("<script>".to_string());
        let html = device_list(&[], Some(&notice));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_device_detail_renders_snapshot() {
        let view = DeviceView {
            device: device("192.0.2.1"),
            data: Ok(snapshot()),
        };
        let html = device_detail(&view);
        assert!(html.contains("hAP ax2"));
        assert!(html.contains("&lt;core&gt;"));
        assert!(html.contains("3.0 KiB / 4.0 KiB"));
        assert!(html.contains("/rest/ip/address"));
    }

    #[test]
    fn test_device_detail_renders_inline_error() {
        let view: DeviceView<DeviceSnapshot> = DeviceView {
            device: device("192.0.2.1"),
            data: Err("Device 192.0.2.1:80 is unreachable".to_string()),
        };
        let html = device_detail(&view);
        assert!(html.contains(r#"class="notice error""#));
        assert!(html.contains("is unreachable"));
    }

    #[test]
    fn test_not_found_escapes_id() {
        let html = not_found("<x>");
        assert!(html.contains("Device &#x27;&lt;x&gt;&#x27; not found"));
    }

    #[test]
    fn test_resource_view_table() {
        let mut record = Record::new();
        record.insert(".id".to_string(), "*1".to_string());
        record.insert("address".to_string(), "10.0.0.1/24".to_string());
        let view = DeviceView {
            device: device("192.0.2.1"),
            data: Ok(Resource {
                path: "ip/address".to_string(),
                records: vec![record],
            }),
        };
        let html = resource_view(&view, "ip/address");
        assert!(html.contains("<h3>/ip/address</h3>"));
        assert!(html.contains("<th>.id</th><th>address</th>"));
        assert!(html.contains("<td>10.0.0.1/24</td>"));
    }
}
