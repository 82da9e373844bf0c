//! The streaming discovery server.
//!
//! Five bi-directional streaming services share one per-stream driver. Each
//! stream answers its first request immediately with the family's current
//! contents (version 0 included), then wakes on cache version advances or
//! on subscription changes. Responses are stamped with
//! `version_info = nonce = version`; an incoming request with a matching
//! nonce and no error is an ACK, a mismatched nonce is stale and ignored,
//! and a NACK is logged and otherwise ignored — the server never rolls
//! back.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::codegen::*;

use gangway_envoy::pb::discovery::{DiscoveryRequest, DiscoveryResponse};

use crate::cache::{Caches, ResourceCache};
use crate::resource::ResourceType;

/// Per-stream response buffer; the proxy paces us via ACKs, so this stays
/// small.
const STREAM_BUFFER: usize = 8;

/// Drives one discovery stream until the client goes away or the cache
/// notifier shuts down.
pub(crate) async fn stream_discovery<T, S>(
    cache: Arc<ResourceCache<T>>,
    mut requests: S,
    tx: mpsc::Sender<Result<DiscoveryResponse, tonic::Status>>,
) where
    T: ResourceType,
    S: Stream<Item = Result<DiscoveryRequest, tonic::Status>> + Unpin,
{
    let mut versions = cache.subscribe();

    let mut names = match requests.next().await {
        Some(Ok(first)) => first.resource_names,
        // cancelled or errored before the first request
        _ => return,
    };

    let mut last_sent: Option<u64>;
    let mut last_nonce: String;

    loop {
        let version = cache.version();
        let resources = if names.is_empty() {
            cache.contents()
        } else {
            cache.query(&names)
        };
        let response = DiscoveryResponse {
            version_info: version.to_string(),
            resources: resources
                .iter()
                .map(|r| gangway_envoy::any(T::TYPE_URL, r))
                .collect(),
            type_url: T::TYPE_URL.to_string(),
            nonce: version.to_string(),
        };
        last_sent = Some(version);
        last_nonce = version.to_string();
        if tx.send(Ok(response)).await.is_err() {
            return;
        }
        tracing::debug!(type_url = T::TYPE_URL, version, "sent");

        // block until the cache moves past what we sent or the
        // subscription changes
        loop {
            tokio::select! {
                request = requests.next() => {
                    let request = match request {
                        Some(Ok(request)) => request,
                        // client cancel or transport error
                        _ => return,
                    };
                    if request.response_nonce != last_nonce {
                        // stale response to an earlier config; last write wins
                        tracing::debug!(
                            type_url = T::TYPE_URL,
                            nonce = %request.response_nonce,
                            "ignoring stale request"
                        );
                        continue;
                    }
                    if let Some(error) = &request.error_detail {
                        tracing::warn!(
                            type_url = T::TYPE_URL,
                            version = %request.version_info,
                            error = %error.message,
                            "config rejected by client"
                        );
                        continue;
                    }
                    // an ACK; it may also narrow or widen the subscription
                    if request.resource_names != names {
                        names = request.resource_names;
                        break;
                    }
                }
                changed = versions.changed() => {
                    if changed.is_err() {
                        // shutdown: the caches are gone
                        return;
                    }
                    if last_sent.map(|sent| cache.version() > sent).unwrap_or(true) {
                        break;
                    }
                }
            }
        }
    }
}

macro_rules! discovery_service {
    ($(#[$doc:meta])* $server:ident, $resource:ty, $family:ident, $service:literal, $method:literal) => {
        $(#[$doc])*
        #[derive(Clone, Debug)]
        pub struct $server {
            cache: Arc<ResourceCache<$resource>>,
        }

        impl $server {
            pub fn new(caches: &Caches) -> Self {
                Self {
                    cache: caches.$family.clone(),
                }
            }
        }

        impl<B> Service<http::Request<B>> for $server
        where
            B: Body + Send + 'static,
            B::Error: Into<StdError> + Send + 'static,
        {
            type Response = http::Response<tonic::body::BoxBody>;
            type Error = std::convert::Infallible;
            type Future = BoxFuture<Self::Response, Self::Error>;

            fn poll_ready(
                &mut self,
                _cx: &mut std::task::Context<'_>,
            ) -> std::task::Poll<Result<(), Self::Error>> {
                std::task::Poll::Ready(Ok(()))
            }

            fn call(&mut self, req: http::Request<B>) -> Self::Future {
                match req.uri().path() {
                    concat!("/", $service, "/", $method) => {
                        struct Svc(Arc<ResourceCache<$resource>>);

                        impl tonic::server::StreamingService<DiscoveryRequest> for Svc {
                            type Response = DiscoveryResponse;
                            type ResponseStream =
                                ReceiverStream<Result<DiscoveryResponse, tonic::Status>>;
                            type Future = BoxFuture<
                                tonic::Response<Self::ResponseStream>,
                                tonic::Status,
                            >;

                            fn call(
                                &mut self,
                                request: tonic::Request<tonic::Streaming<DiscoveryRequest>>,
                            ) -> Self::Future {
                                let cache = self.0.clone();
                                Box::pin(async move {
                                    let requests = request.into_inner();
                                    let (tx, rx) = mpsc::channel(STREAM_BUFFER);
                                    tokio::spawn(stream_discovery(cache, requests, tx));
                                    Ok(tonic::Response::new(ReceiverStream::new(rx)))
                                })
                            }
                        }

                        let cache = self.cache.clone();
                        Box::pin(async move {
                            let codec = tonic::codec::ProstCodec::default();
                            let mut grpc = tonic::server::Grpc::new(codec);
                            let res = grpc.streaming(Svc(cache), req).await;
                            Ok(res)
                        })
                    }
                    _ => Box::pin(async move {
                        Ok(http::Response::builder()
                            .status(200)
                            .header("grpc-status", "12")
                            .header("content-type", "application/grpc")
                            .body(empty_body())
                            .unwrap())
                    }),
                }
            }
        }

        impl tonic::server::NamedService for $server {
            const NAME: &'static str = $service;
        }
    };
}

discovery_service!(
    /// CDS.
    ClusterDiscoveryServer,
    gangway_envoy::pb::cluster::Cluster,
    clusters,
    "envoy.service.cluster.v3.ClusterDiscoveryService",
    "StreamClusters"
);

discovery_service!(
    /// EDS.
    EndpointDiscoveryServer,
    gangway_envoy::pb::endpoint::ClusterLoadAssignment,
    endpoints,
    "envoy.service.endpoint.v3.EndpointDiscoveryService",
    "StreamEndpoints"
);

discovery_service!(
    /// LDS.
    ListenerDiscoveryServer,
    gangway_envoy::pb::listener::Listener,
    listeners,
    "envoy.service.listener.v3.ListenerDiscoveryService",
    "StreamListeners"
);

discovery_service!(
    /// RDS.
    RouteDiscoveryServer,
    gangway_envoy::pb::route::RouteConfiguration,
    routes,
    "envoy.service.route.v3.RouteDiscoveryService",
    "StreamRoutes"
);

discovery_service!(
    /// SDS.
    SecretDiscoveryServer,
    gangway_envoy::pb::tls::Secret,
    secrets,
    "envoy.service.secret.v3.SecretDiscoveryService",
    "StreamSecrets"
);

#[cfg(test)]
mod tests {
    use super::*;
    use gangway_envoy::pb::cluster::Cluster;
    use gangway_envoy::pb::core::Status as RpcStatus;
    use std::collections::BTreeMap;
    use tokio_stream::wrappers::ReceiverStream;

    fn cluster(name: &str) -> Cluster {
        Cluster {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn contents(names: &[&str]) -> BTreeMap<String, Cluster> {
        names.iter().map(|n| (n.to_string(), cluster(n))).collect()
    }

    fn request(names: &[&str], nonce: &str) -> DiscoveryRequest {
        DiscoveryRequest {
            resource_names: names.iter().map(|n| n.to_string()).collect(),
            response_nonce: nonce.to_string(),
            type_url: <Cluster as ResourceType>::TYPE_URL.to_string(),
            ..Default::default()
        }
    }

    struct TestStream {
        cache: Arc<ResourceCache<Cluster>>,
        requests: mpsc::Sender<Result<DiscoveryRequest, tonic::Status>>,
        responses: mpsc::Receiver<Result<DiscoveryResponse, tonic::Status>>,
    }

    fn start() -> TestStream {
        let cache = Arc::new(ResourceCache::<Cluster>::default());
        let (req_tx, req_rx) = mpsc::channel(8);
        let (resp_tx, resp_rx) = mpsc::channel(8);
        tokio::spawn(stream_discovery(
            cache.clone(),
            ReceiverStream::new(req_rx),
            resp_tx,
        ));
        TestStream {
            cache,
            requests: req_tx,
            responses: resp_rx,
        }
    }

    impl TestStream {
        async fn send(&self, req: DiscoveryRequest) {
            self.requests.send(Ok(req)).await.expect("stream alive");
        }

        async fn recv(&mut self) -> DiscoveryResponse {
            self.responses
                .recv()
                .await
                .expect("response")
                .expect("no status error")
        }
    }

    #[tokio::test]
    async fn the_first_request_is_answered_even_at_version_zero() {
        let mut stream = start();
        stream.send(request(&[], "")).await;
        let response = stream.recv().await;
        assert_eq!(response.version_info, "0");
        assert_eq!(response.nonce, "0");
        assert!(response.resources.is_empty());
        assert_eq!(response.type_url, <Cluster as ResourceType>::TYPE_URL);
    }

    #[tokio::test]
    async fn version_advances_are_streamed_and_acks_are_quiet() {
        let mut stream = start();
        stream.send(request(&[], "")).await;
        assert_eq!(stream.recv().await.version_info, "0");

        stream.cache.update(contents(&["default/kuard/80/da39a3ee5e"]));
        let response = stream.recv().await;
        assert_eq!(response.version_info, "1");
        assert_eq!(response.resources.len(), 1);

        // ACK: same names, matching nonce; nothing more is sent until the
        // cache moves again
        stream.send(request(&[], "1")).await;
        stream.cache.update(contents(&["default/kuard/80/da39a3ee5e", "other"]));
        let response = stream.recv().await;
        assert_eq!(response.version_info, "2");
        assert_eq!(response.resources.len(), 2);
    }

    #[tokio::test]
    async fn subscription_changes_answer_immediately() {
        let mut stream = start();
        stream.cache.update(contents(&["a", "b"]));
        stream.send(request(&[], "")).await;
        let response = stream.recv().await;
        assert_eq!(response.resources.len(), 2);

        // narrow to one resource: answered at the same version
        stream.send(request(&["a"], "1")).await;
        let response = stream.recv().await;
        assert_eq!(response.version_info, "1");
        assert_eq!(response.resources.len(), 1);
    }

    #[tokio::test]
    async fn unknown_names_produce_empty_responses() {
        let mut stream = start();
        stream.cache.update(contents(&["a"]));
        stream.send(request(&["missing"], "")).await;
        let response = stream.recv().await;
        assert_eq!(response.version_info, "1");
        assert!(response.resources.is_empty());
    }

    #[tokio::test]
    async fn stale_nonces_are_ignored() {
        let mut stream = start();
        stream.cache.update(contents(&["a"]));
        stream.send(request(&[], "")).await;
        assert_eq!(stream.recv().await.version_info, "1");

        // a response to some older config; changing names here must not
        // produce a response
        stream.send(request(&["a"], "0")).await;
        stream.cache.update(contents(&["a", "b"]));
        let response = stream.recv().await;
        // the next response still reflects the full subscription
        assert_eq!(response.resources.len(), 2);
    }

    #[tokio::test]
    async fn nacks_do_not_roll_back() {
        let mut stream = start();
        stream.cache.update(contents(&["a"]));
        stream.send(request(&[], "")).await;
        assert_eq!(stream.recv().await.version_info, "1");

        let mut nack = request(&[], "1");
        nack.error_detail = Some(RpcStatus {
            code: 3,
            message: "bad config".to_string(),
        });
        stream.send(nack).await;

        // the server keeps serving the rejected version and newer ones
        stream.cache.update(contents(&["a", "b"]));
        assert_eq!(stream.recv().await.version_info, "2");
    }

    #[tokio::test]
    async fn versions_are_monotonic_within_a_stream() {
        let mut stream = start();
        stream.send(request(&[], "")).await;
        let mut last = stream.recv().await.version_info.parse::<u64>().unwrap();
        for round in 0..3u64 {
            stream.cache.update(contents(&[&format!("cluster-{round}")]));
            let version = stream.recv().await.version_info.parse::<u64>().unwrap();
            assert!(version > last);
            last = version;
        }
    }
}
