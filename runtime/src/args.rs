use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use futures::prelude::*;
use kube::runtime::watcher;
use tonic::transport::Server;
use tracing::{info, info_span, instrument, Instrument};

use gangway_core::TlsVersion;
use gangway_k8s_api as k8s;
use gangway_k8s_index::Index;
use gangway_k8s_status as status;
use gangway_xds::server::{
    ClusterDiscoveryServer, EndpointDiscoveryServer, ListenerDiscoveryServer,
    RouteDiscoveryServer, SecretDiscoveryServer,
};
use gangway_xds::{Caches, EndpointsTranslator, EventHandler, ListenerConfig};

#[derive(Debug, Parser)]
#[clap(name = "gangway", about = "An ingress controller serving xDS to Envoy")]
pub struct Args {
    #[clap(long, default_value = "gangway=info,warn", env = "GANGWAY_LOG")]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// The ingress class this controller serves.
    #[clap(long, default_value = "contour")]
    ingress_class_name: String,

    /// Namespaces allowed to contain root routing documents. Empty allows
    /// every namespace.
    #[clap(long, value_delimiter = ',')]
    root_namespaces: Vec<String>,

    #[clap(long, default_value = "0.0.0.0:8001")]
    xds_addr: SocketAddr,

    #[clap(long, default_value = "0.0.0.0")]
    envoy_http_address: String,

    #[clap(long, default_value = "8080")]
    envoy_http_port: u16,

    #[clap(long, default_value = "0.0.0.0")]
    envoy_https_address: String,

    #[clap(long, default_value = "8443")]
    envoy_https_port: u16,

    #[clap(long, default_value = "/dev/stdout")]
    http_access_log: String,

    #[clap(long, default_value = "/dev/stdout")]
    https_access_log: String,

    #[clap(long, default_value = "0.0.0.0")]
    stats_address: String,

    #[clap(long, default_value = "8002")]
    stats_port: u16,

    /// Expect a PROXY protocol header on both Envoy listeners.
    #[clap(long)]
    use_proxy_proto: bool,

    /// Cluster-wide minimum TLS version (1.1, 1.2 or 1.3).
    #[clap(long, default_value = "1.1")]
    tls_minimum_protocol_version: String,

    /// Cache events within this window coalesce into a single rebuild.
    #[clap(long, default_value = "100")]
    debounce_interval_ms: u64,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            client,
            admin,
            ingress_class_name,
            root_namespaces,
            xds_addr,
            envoy_http_address,
            envoy_http_port,
            envoy_https_address,
            envoy_https_port,
            http_access_log,
            https_access_log,
            stats_address,
            stats_port,
            use_proxy_proto,
            tls_minimum_protocol_version,
            debounce_interval_ms,
        } = self;

        let mut runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_admin(admin)
            .with_client(client)
            .build()
            .await?;

        let listener_config = ListenerConfig {
            http_address: envoy_http_address,
            http_port: envoy_http_port,
            http_access_log,
            https_address: envoy_https_address,
            https_port: envoy_https_port,
            https_access_log,
            stats_address,
            stats_port,
            use_proxy_proto,
            minimum_tls_version: TlsVersion::parse(&tls_minimum_protocol_version),
        };

        // The object cache fed by every watch, and the trigger that wakes
        // the rebuild loop.
        let (index, trigger) = Index::shared(ingress_class_name, root_namespaces);
        let caches = Arc::new(Caches::default());

        // Spawn resource watches feeding the object cache.
        let ingresses = runtime.watch_all::<k8s::Ingress>(watcher::Config::default());
        tokio::spawn(
            kubert::index::namespaced(index.clone(), ingresses).instrument(info_span!("ingresses")),
        );

        let ingress_routes = runtime.watch_all::<k8s::IngressRoute>(watcher::Config::default());
        tokio::spawn(
            kubert::index::namespaced(index.clone(), ingress_routes)
                .instrument(info_span!("ingressroutes")),
        );

        let http_proxies = runtime.watch_all::<k8s::HTTPProxy>(watcher::Config::default());
        tokio::spawn(
            kubert::index::namespaced(index.clone(), http_proxies)
                .instrument(info_span!("httpproxies")),
        );

        let services = runtime.watch_all::<k8s::Service>(watcher::Config::default());
        tokio::spawn(
            kubert::index::namespaced(index.clone(), services).instrument(info_span!("services")),
        );

        let secrets = runtime.watch_all::<k8s::Secret>(watcher::Config::default());
        tokio::spawn(
            kubert::index::namespaced(index.clone(), secrets).instrument(info_span!("secrets")),
        );

        let delegations =
            runtime.watch_all::<k8s::TLSCertificateDelegation>(watcher::Config::default());
        tokio::spawn(
            kubert::index::namespaced(index.clone(), delegations)
                .instrument(info_span!("tlscertificatedelegations")),
        );

        // Endpoints feed the EDS cache directly, bypassing the graph.
        let endpoints_translator = EndpointsTranslator::shared(caches.endpoints.clone());
        let endpoints = runtime.watch_all::<k8s::Endpoints>(watcher::Config::default());
        tokio::spawn(
            kubert::index::namespaced(endpoints_translator, endpoints)
                .instrument(info_span!("endpoints")),
        );

        // The status writer consumes the batch emitted after each build.
        let (status_tx, status_rx) = status::channel();
        let controller = status::Controller::new(runtime.client(), status_rx);
        tokio::spawn(controller.run().instrument(info_span!("status")));

        // The rebuild loop.
        let handler = EventHandler::new(
            index,
            trigger,
            caches.clone(),
            listener_config,
            status_tx,
            Duration::from_millis(debounce_interval_ms),
        );
        tokio::spawn(handler.run().instrument(info_span!("rebuild")));

        // The discovery server.
        tokio::spawn(grpc(xds_addr, caches, runtime.shutdown_handle()));

        // Block on the shutdown signal, then wait for the background tasks
        // to wind down.
        if runtime.run().await.is_err() {
            bail!("aborted");
        }

        Ok(())
    }
}

#[instrument(skip_all, fields(port = %addr.port()))]
async fn grpc(addr: SocketAddr, caches: Arc<Caches>, drain: drain::Watch) -> Result<()> {
    let (close_tx, close_rx) = tokio::sync::oneshot::channel();
    tokio::pin! {
        let srv = Server::builder()
            .add_service(ClusterDiscoveryServer::new(&caches))
            .add_service(EndpointDiscoveryServer::new(&caches))
            .add_service(ListenerDiscoveryServer::new(&caches))
            .add_service(RouteDiscoveryServer::new(&caches))
            .add_service(SecretDiscoveryServer::new(&caches))
            .serve_with_shutdown(addr, close_rx.map(|_| {}));
    }

    info!(%addr, "xDS gRPC server listening");
    tokio::select! {
        res = (&mut srv) => res?,
        handle = drain.signaled() => {
            let _ = close_tx.send(());
            handle.release_after(srv).await?
        }
    }
    Ok(())
}
