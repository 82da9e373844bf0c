//! Cross-namespace TLS secret grants.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Permits routing documents in the target namespaces to reference TLS
/// secrets from this object's namespace as `<ns>/<name>`.
#[derive(Clone, Debug, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "contour.heptio.com",
    version = "v1beta1",
    kind = "TLSCertificateDelegation",
    plural = "tlscertificatedelegations",
    namespaced
)]
pub struct TLSCertificateDelegationSpec {
    #[serde(default)]
    pub delegations: Vec<CertificateDelegation>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDelegation {
    pub secret_name: String,
    /// `*` grants every namespace.
    #[serde(default)]
    pub target_namespaces: Vec<String>,
}
