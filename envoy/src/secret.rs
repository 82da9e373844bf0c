//! SDS secrets and TLS contexts.

use gangway_core::{Secret as SecretVertex, TlsVersion, UpstreamValidation};

use crate::pb::core::{data_source, DataSource};
use crate::pb::tls::{
    common_tls_context, secret, string_matcher, tls_parameters, CertificateValidationContext,
    CommonTlsContext, DownstreamTlsContext, Secret, StringMatcher, TlsCertificate, TlsParameters,
    UpstreamTlsContext,
};

pub fn secret(s: &SecretVertex) -> Secret {
    Secret {
        name: s.wire_name(),
        r#type: Some(secret::Type::TlsCertificate(tls_certificate(s))),
    }
}

fn tls_certificate(s: &SecretVertex) -> TlsCertificate {
    TlsCertificate {
        certificate_chain: Some(inline(&s.cert)),
        private_key: Some(inline(&s.key)),
    }
}

fn inline(data: &[u8]) -> DataSource {
    DataSource {
        specifier: Some(data_source::Specifier::InlineBytes(data.to_vec())),
    }
}

fn tls_version(v: TlsVersion) -> tls_parameters::TlsProtocol {
    match v {
        TlsVersion::V1_1 => tls_parameters::TlsProtocol::TlSv11,
        TlsVersion::V1_2 => tls_parameters::TlsProtocol::TlSv12,
        TlsVersion::V1_3 => tls_parameters::TlsProtocol::TlSv13,
    }
}

/// The server-side TLS context of a terminating filter chain. The key pair
/// is delivered inline; rotation shows up as a new SDS name instead.
pub fn downstream_tls_context(
    s: &SecretVertex,
    min_tls_version: TlsVersion,
    alpn: &[&str],
) -> DownstreamTlsContext {
    DownstreamTlsContext {
        common_tls_context: Some(CommonTlsContext {
            tls_params: Some(TlsParameters {
                tls_minimum_protocol_version: tls_version(min_tls_version) as i32,
                tls_maximum_protocol_version: tls_parameters::TlsProtocol::TlsAuto as i32,
            }),
            tls_certificates: vec![tls_certificate(s)],
            alpn_protocols: alpn.iter().map(|s| s.to_string()).collect(),
            validation_context_type: None,
        }),
    }
}

/// The client-side TLS context of an upstream cluster. With a validation
/// policy the upstream certificate is checked against the CA bundle and
/// subject name; without one the connection is encrypted but unverified.
pub fn upstream_tls_context(
    validation: Option<&UpstreamValidation>,
    alpn: &[&str],
) -> UpstreamTlsContext {
    UpstreamTlsContext {
        common_tls_context: Some(CommonTlsContext {
            tls_params: None,
            tls_certificates: Vec::new(),
            alpn_protocols: alpn.iter().map(|s| s.to_string()).collect(),
            validation_context_type: validation.map(|uv| {
                common_tls_context::ValidationContextType::ValidationContext(
                    CertificateValidationContext {
                        trusted_ca: Some(inline(&uv.ca)),
                        match_subject_alt_names: vec![StringMatcher {
                            match_pattern: Some(string_matcher::MatchPattern::Exact(
                                uv.subject_name.clone(),
                            )),
                        }],
                    },
                )
            }),
        }),
        sni: validation
            .map(|uv| uv.subject_name.clone())
            .unwrap_or_default(),
    }
}
