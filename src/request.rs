use std::net::IpAddr;

use axum::http::HeaderMap;

use crate::error::UpdateError;

/// Query string of a dyndns2 `/nic/update` call.
#[derive(Debug, Default)]
pub struct UpdateQuery {
    pub hostname: Option<String>,
    pub ip: Option<String>,
}

impl UpdateQuery {
    /// Picks the fields out of decoded query pairs. The first occurrence of a
    /// key wins, and `ip` wins over the dyndns2 `myip`.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = UpdateQuery::default();
        let mut myip = None;
        for (key, value) in pairs {
            match key.as_str() {
                "hostname" if query.hostname.is_none() => query.hostname = Some(value),
                "ip" if query.ip.is_none() => query.ip = Some(value),
                "myip" if myip.is_none() => myip = Some(value),
                _ => {}
            }
        }
        query.ip = query.ip.or(myip);
        query
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UpdateRequest {
    pub hostname: String,
    pub ip: IpAddr,
    /// Set when the proxy did not supply the origin-IP header, which points
    /// at a reverse proxy misconfiguration even if the query had an address.
    pub origin_missing: bool,
}

impl UpdateRequest {
    /// Builds the request from the query, taking the address from
    /// `origin_header` when the query does not carry a usable one.
    pub fn parse(
        query: UpdateQuery,
        headers: &HeaderMap,
        origin_header: &str,
    ) -> Result<Self, UpdateError> {
        let hostname = query
            .hostname
            .filter(|h| !h.is_empty())
            .ok_or_else(|| UpdateError::MalformedRequest("no hostname given".to_string()))?;

        let explicit = query.ip.as_deref().and_then(|ip| ip.trim().parse::<IpAddr>().ok());
        let origin = headers.get(origin_header).map(|v| v.to_str().unwrap_or(""));
        let origin_missing = origin.is_none();

        if let Some(ip) = explicit {
            return Ok(Self {
                hostname,
                ip,
                origin_missing,
            });
        }

        let origin = origin.ok_or_else(|| UpdateError::MissingAddress(origin_header.to_string()))?;
        // present but garbled is a client error
        let ip = origin.trim().parse::<IpAddr>().map_err(|_| {
            UpdateError::MalformedRequest(format!("invalid address in {} header", origin_header))
        })?;

        Ok(Self {
            hostname,
            ip,
            origin_missing,
        })
    }
}
