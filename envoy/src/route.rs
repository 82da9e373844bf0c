//! Route (RDS) message construction.

use gangway_core::{Route as RouteVertex, Timeout};

use crate::pb::core as pbcore;
use crate::pb::route::{
    redirect_action, route, route_action, route_match, RedirectAction, RetryPolicy, Route,
    RouteAction, RouteMatch, WeightedCluster,
};

const HSTS_HEADER: &str = "Strict-Transport-Security";
const HSTS_VALUE: &str = "max-age=31536000";

/// A forwarding route for the given vertex.
pub fn route_route(r: &RouteVertex) -> Route {
    Route {
        r#match: Some(prefix_match(&r.prefix)),
        action: Some(route::Action::Route(route_action(r))),
        response_headers_to_add: if r.hsts {
            vec![pbcore::HeaderValueOption {
                header: Some(pbcore::HeaderValue {
                    key: HSTS_HEADER.to_string(),
                    value: HSTS_VALUE.to_string(),
                }),
            }]
        } else {
            Vec::new()
        },
    }
}

/// A 301-to-https route, used on the insecure listener for routes that
/// require TLS.
pub fn route_upgrade_https(prefix: &str) -> Route {
    Route {
        r#match: Some(prefix_match(prefix)),
        action: Some(route::Action::Redirect(RedirectAction {
            scheme_rewrite_specifier: Some(redirect_action::SchemeRewriteSpecifier::HttpsRedirect(
                true,
            )),
        })),
        response_headers_to_add: Vec::new(),
    }
}

fn prefix_match(prefix: &str) -> RouteMatch {
    RouteMatch {
        path_specifier: Some(route_match::PathSpecifier::Prefix(prefix.to_string())),
    }
}

fn route_action(r: &RouteVertex) -> RouteAction {
    let cluster_specifier = if r.clusters.len() == 1 {
        route_action::ClusterSpecifier::Cluster(r.clusters[0].name())
    } else {
        route_action::ClusterSpecifier::WeightedClusters(weighted_clusters(r))
    };

    let mut action = RouteAction {
        cluster_specifier: Some(cluster_specifier),
        ..Default::default()
    };

    if let Some(rewrite) = &r.prefix_rewrite {
        action.prefix_rewrite = rewrite.clone();
    }
    if let Some(tp) = &r.timeout_policy {
        action.timeout = Some(match tp.request {
            // A zero timeout tells the proxy the route timeout is disabled.
            Timeout::Infinite => prost_types::Duration {
                seconds: 0,
                nanos: 0,
            },
            Timeout::Duration(d) => prost_types::Duration {
                seconds: d.as_secs() as i64,
                nanos: d.subsec_nanos() as i32,
            },
        });
    }
    if let Some(rp) = &r.retry_policy {
        action.retry_policy = Some(RetryPolicy {
            retry_on: rp.retry_on.clone(),
            num_retries: if rp.num_retries > 0 {
                Some(rp.num_retries)
            } else {
                None
            },
            per_try_timeout: rp.per_try_timeout.map(|d| prost_types::Duration {
                seconds: d.as_secs() as i64,
                nanos: d.subsec_nanos() as i32,
            }),
        });
    }
    if r.websocket {
        action.upgrade_configs = vec![route_action::UpgradeConfig {
            upgrade_type: "websocket".to_string(),
            enabled: None,
        }];
    }

    action
}

/// Weighted cluster set for a multi-upstream route. All-zero weights are
/// normalized to one each so the proxy accepts the set.
fn weighted_clusters(r: &RouteVertex) -> WeightedCluster {
    let every_weight_is_zero = r.clusters.iter().all(|c| c.weight == 0);
    let mut clusters: Vec<_> = r
        .clusters
        .iter()
        .map(|c| crate::pb::route::weighted_cluster::ClusterWeight {
            name: c.name(),
            weight: Some(if every_weight_is_zero { 1 } else { c.weight }),
        })
        .collect();
    clusters.sort_by(|a, b| a.name.cmp(&b.name));
    WeightedCluster { clusters }
}
