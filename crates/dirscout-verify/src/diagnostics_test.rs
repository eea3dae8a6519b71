use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn probe(host: &str, port: u16) -> ProbeSettings {
    ProbeSettings {
        host: host.to_string(),
        port,
        timeout_secs: 2,
    }
}

/// Binds and immediately releases a local port, leaving nothing listening on it.
fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

// -----------------------------------------------------------------------
// preflight
// -----------------------------------------------------------------------

#[tokio::test]
async fn preflight_reaches_listening_port() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let status = preflight(&probe("127.0.0.1", port)).await;

    assert_eq!(status, PreflightStatus::Reachable);
}

#[tokio::test]
async fn preflight_reports_refused_connection() {
    let port = closed_port();

    let status = preflight(&probe("127.0.0.1", port)).await;

    assert!(
        matches!(status, PreflightStatus::Unreachable { ref reason } if reason.contains("cannot connect")),
        "expected Unreachable, got: {status:?}"
    );
}

#[test]
fn network_diagnostics_blocks_on_runtime() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let diagnostics = NetworkDiagnostics::new(probe("127.0.0.1", port), runtime.handle().clone());

    assert_eq!(diagnostics.check(), PreflightStatus::Reachable);
}

#[tokio::test]
async fn resolve_host_accepts_ip_literals() {
    let addrs = resolve_host("10.1.2.3").await.unwrap();
    assert_eq!(addrs, vec!["10.1.2.3".parse::<IpAddr>().unwrap()]);
}

// -----------------------------------------------------------------------
// http_probe
// -----------------------------------------------------------------------

#[tokio::test]
async fn http_probe_returns_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let status = http_probe(&client, &format!("{}/", server.uri())).await;

    assert_eq!(status, Ok(200));
}

#[tokio::test]
async fn http_probe_counts_error_statuses_as_responses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let status = http_probe(&client, &format!("{}/missing", server.uri())).await;

    assert_eq!(status, Ok(404));
}

#[tokio::test]
async fn http_probe_reports_connection_failure() {
    let port = closed_port();
    let client = reqwest::Client::new();

    let status = http_probe(&client, &format!("http://127.0.0.1:{port}/")).await;

    assert!(status.is_err());
}

// -----------------------------------------------------------------------
// report
// -----------------------------------------------------------------------

fn report(probe_dns: Result<Vec<IpAddr>, String>, tcp_results: [bool; 2]) -> DiagnosticReport {
    let tcp_result = |ok: bool| {
        if ok {
            Ok(Duration::from_millis(12))
        } else {
            Err("connection refused".to_string())
        }
    };
    let mut report = DiagnosticReport {
        probe_host: "wa.me".to_string(),
        probe_port: 80,
        dns: vec![DnsCheck {
            host: "wa.me".to_string(),
            result: probe_dns,
        }],
        tcp: vec![
            TcpCheck {
                host: "wa.me".to_string(),
                port: 80,
                result: tcp_result(tcp_results[0]),
            },
            TcpCheck {
                host: "google.com".to_string(),
                port: 80,
                result: tcp_result(tcp_results[1]),
            },
        ],
        http: HttpCheck {
            url: "https://wa.me/".to_string(),
            result: Ok(200),
        },
        recommendations: Vec::new(),
    };
    report.recommend();
    report
}

#[test]
fn healthy_report_has_no_recommendations() {
    let r = report(Ok(vec!["1.2.3.4".parse().unwrap()]), [true, true]);
    assert!(r.probe_reachable());
    assert!(r.recommendations.is_empty());
    assert!(r.to_string().contains("No problems found."));
}

#[test]
fn blocked_probe_recommends_firewall_check() {
    let r = report(Ok(vec!["1.2.3.4".parse().unwrap()]), [false, true]);
    assert!(!r.probe_reachable());
    assert_eq!(r.recommendations.len(), 1);
    assert!(r.recommendations[0].contains("wa.me:80"));
}

#[test]
fn total_outage_lists_every_recommendation() {
    let r = report(Err("NXDOMAIN".to_string()), [false, false]);
    assert_eq!(r.recommendations.len(), 3);
    let rendered = r.to_string();
    assert!(rendered.contains("FAILED (NXDOMAIN)"));
    assert!(rendered.contains("No outbound connectivity"));
}
