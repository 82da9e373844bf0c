//! The SDS projection.

use std::collections::BTreeMap;

use gangway_core::Dag;
use gangway_envoy::pb::tls::Secret;

/// One SDS secret per secret vertex. Secrets reach the graph only through
/// terminating secure virtual hosts, so everything emitted here is
/// referenced by a filter chain in the listener projection.
pub fn secrets(dag: &Dag) -> BTreeMap<String, Secret> {
    let mut out = BTreeMap::new();
    for vertex in dag.secrets() {
        out.entry(vertex.wire_name())
            .or_insert_with(|| gangway_envoy::secret(vertex));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use gangway_core::{Secret as SecretVertex, SecureVirtualHost, TlsVersion};
    use gangway_envoy::pb::core::data_source::Specifier;
    use gangway_envoy::pb::tls::secret::Type;

    fn vertex(name: &str, cert: &str, key: &str) -> SecretVertex {
        SecretVertex {
            namespace: "default".to_string(),
            name: name.to_string(),
            cert: cert.as_bytes().to_vec(),
            key: key.as_bytes().to_vec(),
        }
    }

    fn dag_with_secrets(secrets: Vec<SecretVertex>) -> Dag {
        let mut dag = Dag::default();
        for (i, secret) in secrets.into_iter().enumerate() {
            let fqdn = format!("vhost-{i}.example.com");
            let mut route = gangway_core::Route::new("/");
            route.clusters = vec![crate::project::testutil::cluster("default", "backend", 80)];
            dag.secure_virtual_hosts.insert(
                fqdn.clone(),
                SecureVirtualHost {
                    fqdn,
                    routes: [(route.prefix.clone(), route)].into_iter().collect(),
                    secret: Some(secret),
                    min_tls_version: TlsVersion::V1_1,
                    tcp_proxy: None,
                },
            );
        }
        dag
    }

    #[test]
    fn nothing_is_projected_from_an_empty_graph() {
        assert!(secrets(&Dag::default()).is_empty());
    }

    #[test]
    fn names_encode_the_certificate_digest() {
        let dag = dag_with_secrets(vec![vertex("secret", "cert", "key")]);
        let got = secrets(&dag);
        assert_eq!(got.len(), 1);
        let s = &got["default/secret/cd1b506996"];
        match s.r#type.as_ref().unwrap() {
            Type::TlsCertificate(cert) => {
                assert_eq!(
                    cert.certificate_chain.as_ref().unwrap().specifier,
                    Some(Specifier::InlineBytes(b"cert".to_vec()))
                );
                assert_eq!(
                    cert.private_key.as_ref().unwrap().specifier,
                    Some(Specifier::InlineBytes(b"key".to_vec()))
                );
            }
        }
    }

    #[test]
    fn shared_secrets_are_stored_once() {
        let dag = dag_with_secrets(vec![
            vertex("secret", "cert", "key"),
            vertex("secret", "cert", "key"),
        ]);
        assert_eq!(secrets(&dag).len(), 1);
    }

    #[test]
    fn distinct_secrets_get_distinct_names() {
        let dag = dag_with_secrets(vec![
            vertex("secret-a", "cert-a", "key-a"),
            vertex("secret-b", "cert-b", "key-b"),
        ]);
        let got = secrets(&dag);
        assert!(got.contains_key("default/secret-a/ff2a9f58ca"));
        assert!(got.contains_key("default/secret-b/0a068be4ba"));
    }

    #[test]
    fn rotation_produces_a_new_name() {
        let before = dag_with_secrets(vec![vertex("secret", "cert", "key")]);
        let after = dag_with_secrets(vec![vertex("secret", "cert-rotated", "key")]);
        let before = secrets(&before);
        let after = secrets(&after);
        assert!(before.keys().ne(after.keys()));
    }
}
