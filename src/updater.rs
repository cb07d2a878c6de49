use std::net::IpAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::provider::{DnsProvider, ProviderError};

pub const MAX_HOSTNAME_LEN: usize = 64;

static HOSTNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((?:[a-zA-Z0-9\-]+\.)+)([a-zA-Z0-9\-]+\.[a-zA-Z]+)$").unwrap()
});

/// Result of one update attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    Unchanged,
    BadRequest(String),
    NotFound(String),
    InternalError(String),
}

impl UpdateOutcome {
    pub fn status(&self) -> StatusCode {
        match self {
            UpdateOutcome::Updated => StatusCode::OK,
            UpdateOutcome::Unchanged => StatusCode::NOT_MODIFIED,
            UpdateOutcome::BadRequest(_) => StatusCode::BAD_REQUEST,
            UpdateOutcome::NotFound(_) => StatusCode::NOT_FOUND,
            UpdateOutcome::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log line for this outcome of updating `host` to `ip`.
    pub fn message(&self, host: &str, ip: IpAddr) -> String {
        match self {
            UpdateOutcome::Updated => format!("updated {} to {}", host, ip),
            UpdateOutcome::Unchanged => format!("{} already up to date", host),
            UpdateOutcome::BadRequest(reason) => reason.clone(),
            UpdateOutcome::NotFound(_) => format!("domain {} not registered", host),
            UpdateOutcome::InternalError(err) => err.clone(),
        }
    }
}

impl From<ProviderError> for UpdateOutcome {
    fn from(err: ProviderError) -> Self {
        UpdateOutcome::InternalError(err.to_string())
    }
}

/// A hostname split into the record name and its registrable domain.
#[derive(Debug, PartialEq, Eq)]
pub struct HostParts<'a> {
    pub prefix: &'a str,
    pub domain: &'a str,
}

pub fn split_hostname(hostname: &str) -> Result<HostParts<'_>, String> {
    if hostname.len() > MAX_HOSTNAME_LEN {
        return Err(format!(
            "hostname length of {} is longer than {} and invalid",
            hostname.len(),
            MAX_HOSTNAME_LEN
        ));
    }

    let caps = HOSTNAME_RE
        .captures(hostname)
        .ok_or_else(|| format!("hostname {} is not a valid format", hostname))?;

    let (Some(prefix), Some(domain)) = (caps.get(1), caps.get(2)) else {
        return Err(format!("hostname {} is not a valid format", hostname));
    };

    Ok(HostParts {
        prefix: prefix.as_str().trim_end_matches('.'),
        domain: domain.as_str(),
    })
}

fn record_type(ip: IpAddr) -> &'static str {
    match ip {
        IpAddr::V4(_) => "A",
        IpAddr::V6(_) => "AAAA",
    }
}

#[derive(Clone)]
pub struct RecordUpdater {
    provider: Arc<dyn DnsProvider>,
}

impl RecordUpdater {
    pub fn new(provider: Arc<dyn DnsProvider>) -> Self {
        Self { provider }
    }

    /// Points the existing record for `hostname` at `ip`, writing only when
    /// the stored value differs.
    pub async fn update(&self, hostname: &str, ip: IpAddr) -> UpdateOutcome {
        let parts = match split_hostname(hostname) {
            Ok(parts) => parts,
            Err(reason) => return UpdateOutcome::BadRequest(reason),
        };

        let page = match self.provider.list_records(parts.domain).await {
            Ok(page) => page,
            Err(e) if e.is_not_found() => return UpdateOutcome::NotFound(e.to_string()),
            Err(e) => return e.into(),
        };

        if let Some(total) = page.total.filter(|&t| t > page.records.len()) {
            warn!(
                "{} has {} records but only {} were fetched, matches beyond the first page are missed",
                parts.domain,
                total,
                page.records.len()
            );
        }

        let wanted_type = record_type(ip);
        // first match wins when duplicates exist
        let Some(record) = page
            .records
            .iter()
            .find(|r| r.record_type == wanted_type && r.name == parts.prefix)
        else {
            return UpdateOutcome::NotFound(format!(
                "no {} record named {} in {}",
                wanted_type, parts.prefix, parts.domain
            ));
        };

        let ip = ip.to_string();
        if record.data == ip {
            return UpdateOutcome::Unchanged;
        }

        match self.provider.edit_record(parts.domain, record.id, &ip).await {
            Ok(()) => UpdateOutcome::Updated,
            Err(e) => e.into(),
        }
    }
}
