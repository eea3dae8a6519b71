//! Network checks run before verification, plus a fuller diagnostic report.
//!
//! The pre-flight answers one question: can the verification host be
//! resolved and connected to right now? [`diagnose`] runs the same checks
//! against a few reference hosts and suggests what to fix.

use std::fmt;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use dirscout_core::ProbeSettings;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use tokio::net::TcpStream;

/// Reference endpoints checked by [`diagnose`] besides the configured probe.
pub const DIAGNOSTIC_TARGETS: [(&str, u16); 3] =
    [("wa.me", 80), ("google.com", 80), ("web.whatsapp.com", 443)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreflightStatus {
    Reachable,
    Unreachable { reason: String },
}

/// Blocking pre-flight used by the pipeline before the verification stage.
pub trait Preflight {
    fn check(&self) -> PreflightStatus;
}

/// [`Preflight`] backed by real DNS and TCP checks.
///
/// The checks are async; `check` drives them on `runtime` and must be called
/// from outside that runtime's worker threads (e.g. from `spawn_blocking`).
#[derive(Debug, Clone)]
pub struct NetworkDiagnostics {
    probe: ProbeSettings,
    runtime: tokio::runtime::Handle,
}

impl NetworkDiagnostics {
    #[must_use]
    pub fn new(probe: ProbeSettings, runtime: tokio::runtime::Handle) -> Self {
        Self { probe, runtime }
    }
}

impl Preflight for NetworkDiagnostics {
    fn check(&self) -> PreflightStatus {
        self.runtime.block_on(preflight(&self.probe))
    }
}

/// Resolves the probe host, then opens a TCP connection to it.
pub async fn preflight(probe: &ProbeSettings) -> PreflightStatus {
    if let Err(e) = resolve_host(&probe.host).await {
        tracing::warn!(host = %probe.host, error = %e, "pre-flight DNS resolution failed");
        return PreflightStatus::Unreachable {
            reason: format!("cannot resolve {}: {e}", probe.host),
        };
    }
    match tcp_connect(&probe.host, probe.port, probe.timeout()).await {
        Ok(elapsed) => {
            tracing::info!(
                host = %probe.host,
                port = probe.port,
                elapsed_ms = elapsed.as_millis(),
                "pre-flight connection succeeded"
            );
            PreflightStatus::Reachable
        }
        Err(e) => {
            tracing::warn!(host = %probe.host, port = probe.port, error = %e, "pre-flight connection failed");
            PreflightStatus::Unreachable {
                reason: format!("cannot connect to {}:{}: {e}", probe.host, probe.port),
            }
        }
    }
}

/// Resolves `host` to its addresses. IP literals are returned as is.
///
/// # Errors
///
/// Returns a description of the failure if the lookup fails or yields nothing.
pub async fn resolve_host(host: &str) -> Result<Vec<IpAddr>, String> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(vec![ip]);
    }

    let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
        tracing::debug!(error = %e, "system resolver config unavailable, using defaults");
        TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
    });

    let lookup = resolver.lookup_ip(host).await.map_err(|e| e.to_string())?;
    let addrs: Vec<IpAddr> = lookup.iter().collect();
    if addrs.is_empty() {
        return Err("no addresses returned".to_string());
    }
    Ok(addrs)
}

/// Opens (and immediately drops) a TCP connection, returning how long it took.
///
/// # Errors
///
/// Returns a description of the failure on refusal or timeout.
pub async fn tcp_connect(host: &str, port: u16, timeout: Duration) -> Result<Duration, String> {
    let start = Instant::now();
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => Ok(start.elapsed()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("timed out after {}ms", timeout.as_millis())),
    }
}

/// Issues a GET against `url` and returns the HTTP status. Any status counts
/// as a response.
///
/// # Errors
///
/// Returns a description of the failure if no response is received.
pub async fn http_probe(client: &reqwest::Client, url: &str) -> Result<u16, String> {
    client
        .get(url)
        .send()
        .await
        .map(|resp| resp.status().as_u16())
        .map_err(|e| e.to_string())
}

#[derive(Debug, Clone)]
pub struct DnsCheck {
    pub host: String,
    pub result: Result<Vec<IpAddr>, String>,
}

#[derive(Debug, Clone)]
pub struct TcpCheck {
    pub host: String,
    pub port: u16,
    pub result: Result<Duration, String>,
}

#[derive(Debug, Clone)]
pub struct HttpCheck {
    pub url: String,
    pub result: Result<u16, String>,
}

#[derive(Debug, Clone)]
pub struct DiagnosticReport {
    pub probe_host: String,
    pub probe_port: u16,
    pub dns: Vec<DnsCheck>,
    pub tcp: Vec<TcpCheck>,
    pub http: HttpCheck,
    pub recommendations: Vec<String>,
}

impl DiagnosticReport {
    /// `true` when the configured probe target resolved and accepted a connection.
    #[must_use]
    pub fn probe_reachable(&self) -> bool {
        let dns_ok = self
            .dns
            .iter()
            .any(|c| c.host == self.probe_host && c.result.is_ok());
        let tcp_ok = self
            .tcp
            .iter()
            .any(|c| c.host == self.probe_host && c.port == self.probe_port && c.result.is_ok());
        dns_ok && tcp_ok
    }

    fn recommend(&mut self) {
        let mut recs = Vec::new();
        let probe_tcp_failed = self
            .tcp
            .iter()
            .any(|c| c.host == self.probe_host && c.port == self.probe_port && c.result.is_err());
        let probe_dns_failed = self
            .dns
            .iter()
            .any(|c| c.host == self.probe_host && c.result.is_err());

        if probe_tcp_failed {
            recs.push(format!(
                "Cannot connect to {}:{}. Check firewall or proxy settings.",
                self.probe_host, self.probe_port
            ));
        }
        if probe_dns_failed {
            recs.push(format!(
                "Cannot resolve {}. Check DNS settings or try a public resolver such as 8.8.8.8.",
                self.probe_host
            ));
        }
        if !self.tcp.is_empty() && self.tcp.iter().all(|c| c.result.is_err()) {
            recs.push("No outbound connectivity at all. Check the network connection.".to_string());
        }
        self.recommendations = recs;
    }
}

fn status_label<T, E: fmt::Display>(result: &Result<T, E>) -> String {
    match result {
        Ok(_) => "ok".to_string(),
        Err(e) => format!("FAILED ({e})"),
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DNS")?;
        for check in &self.dns {
            match &check.result {
                Ok(addrs) => {
                    let shown: Vec<String> = addrs.iter().map(ToString::to_string).collect();
                    writeln!(f, "  {:<20} ok ({})", check.host, shown.join(", "))?;
                }
                Err(_) => writeln!(f, "  {:<20} {}", check.host, status_label(&check.result))?,
            }
        }
        writeln!(f, "TCP")?;
        for check in &self.tcp {
            let target = format!("{}:{}", check.host, check.port);
            match &check.result {
                Ok(elapsed) => writeln!(f, "  {target:<24} ok ({}ms)", elapsed.as_millis())?,
                Err(_) => writeln!(f, "  {target:<24} {}", status_label(&check.result))?,
            }
        }
        writeln!(f, "HTTP")?;
        match &self.http.result {
            Ok(status) => writeln!(f, "  {} -> {status}", self.http.url)?,
            Err(_) => writeln!(f, "  {} {}", self.http.url, status_label(&self.http.result))?,
        }
        if self.recommendations.is_empty() {
            writeln!(f, "No problems found.")?;
        } else {
            writeln!(f, "Recommendations")?;
            for rec in &self.recommendations {
                writeln!(f, "  - {rec}")?;
            }
        }
        Ok(())
    }
}

/// Runs DNS and TCP checks for the probe target and the reference hosts,
/// plus an HTTP request to `http_url`.
pub async fn diagnose(probe: &ProbeSettings, http_url: &str) -> DiagnosticReport {
    let mut targets: Vec<(String, u16)> = vec![(probe.host.clone(), probe.port)];
    for (host, port) in DIAGNOSTIC_TARGETS {
        if !targets.iter().any(|(h, p)| h == host && *p == port) {
            targets.push((host.to_string(), port));
        }
    }

    let mut dns = Vec::new();
    for (host, _) in &targets {
        if dns.iter().any(|c: &DnsCheck| &c.host == host) {
            continue;
        }
        dns.push(DnsCheck {
            host: host.clone(),
            result: resolve_host(host).await,
        });
    }

    let mut tcp = Vec::new();
    for (host, port) in &targets {
        tcp.push(TcpCheck {
            host: host.clone(),
            port: *port,
            result: tcp_connect(host, *port, probe.timeout()).await,
        });
    }

    let http_result = match reqwest::Client::builder().timeout(probe.timeout()).build() {
        Ok(client) => http_probe(&client, http_url).await,
        Err(e) => Err(e.to_string()),
    };

    let mut report = DiagnosticReport {
        probe_host: probe.host.clone(),
        probe_port: probe.port,
        dns,
        tcp,
        http: HttpCheck {
            url: http_url.to_string(),
            result: http_result,
        },
        recommendations: Vec::new(),
    };
    report.recommend();
    report
}

#[cfg(test)]
#[path = "diagnostics_test.rs"]
mod tests;
