//! Per-document build outcomes.

use std::collections::BTreeMap;

use crate::Meta;

pub const STATUS_VALID: &str = "valid";
pub const STATUS_INVALID: &str = "invalid";
pub const STATUS_ORPHANED: &str = "orphaned";

/// The routing document kinds that carry a status subresource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocKind {
    IngressRoute,
    HTTPProxy,
}

impl DocKind {
    /// The kind as written in status descriptions.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocKind::IngressRoute => "IngressRoute",
            DocKind::HTTPProxy => "HTTPProxy",
        }
    }

    /// Lower-cased kind, used by the delegation error messages.
    pub fn lower(&self) -> &'static str {
        match self {
            DocKind::IngressRoute => "ingressroute",
            DocKind::HTTPProxy => "httpproxy",
        }
    }

    /// Plural kind, used by the FQDN conflict message.
    pub fn plural(&self) -> &'static str {
        match self {
            DocKind::IngressRoute => "IngressRoutes",
            DocKind::HTTPProxy => "HTTPProxies",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub status: &'static str,
    pub description: String,
    /// The FQDN this status applies to, when one is known.
    pub vhost: String,
}

impl Status {
    pub fn valid(kind: DocKind, vhost: impl Into<String>) -> Self {
        Status {
            status: STATUS_VALID,
            description: format!("valid {}", kind.as_str()),
            vhost: vhost.into(),
        }
    }

    pub fn invalid(description: impl Into<String>, vhost: impl Into<String>) -> Self {
        Status {
            status: STATUS_INVALID,
            description: description.into(),
            vhost: vhost.into(),
        }
    }

    pub fn orphaned(kind: DocKind) -> Self {
        Status {
            status: STATUS_ORPHANED,
            description: format!(
                "this {k} is not part of a delegation chain from a root {k}",
                k = kind.as_str()
            ),
            vhost: String::new(),
        }
    }
}

/// One status per routing document, keyed by kind then identity.
pub type StatusMap = BTreeMap<(DocKind, Meta), Status>;
