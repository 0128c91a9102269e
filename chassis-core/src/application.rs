// Application bootstrap and HTTP server
//
// Boot is single-threaded and runs to completion before the listener opens:
// migrate registered models, compile the route table, install hooks and
// gates, then freeze everything into an immutable Application. Request-time
// code never touches the registry again.

use crate::compiler;
use crate::pipeline::{ApiGroup, Gate, GateDecision};
use crate::registry::Registry;
use crate::routing::{Router, parse_query_string};
use crate::store::DataStore;
use crate::{Error, HttpRequest, HttpResponse};
use http_body_util::{BodyExt, Full};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, body::Incoming as IncomingBody};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

const DEFAULT_API_PREFIX: &str = "/api";
const DEFAULT_TABLE_PREFIX: &str = "ci";

/// Builder consumed to produce an [`Application`].
pub struct ApplicationBuilder {
    registry: Registry,
    store: Option<Arc<dyn DataStore>>,
    gates: Vec<Arc<dyn Gate>>,
    api_prefix: String,
    table_prefix: String,
}

impl ApplicationBuilder {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            store: None,
            gates: Vec::new(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            table_prefix: DEFAULT_TABLE_PREFIX.to_string(),
        }
    }

    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn store(mut self, store: Arc<dyn DataStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Install a gate. Gates run for every request in installation order;
    /// the auth gate must be installed before the tenant gate.
    pub fn gate(mut self, gate: Arc<dyn Gate>) -> Self {
        self.gates.push(gate);
        self
    }

    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    pub fn table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    /// Run the boot sequence. Any failure here is boot-fatal: no partial
    /// state is ever served.
    pub async fn build(self) -> Result<Application, Error> {
        let store = self
            .store
            .ok_or_else(|| Error::Boot("no data store configured".to_string()))?;

        // Migrate global models, then each namespace pool in order.
        for (identifier, model) in self.registry.models() {
            let table = format!("{}_{}", self.table_prefix, model.table());
            store
                .migrate(&table, model.as_ref())
                .await
                .map_err(|e| Error::Boot(format!("migrating {identifier}: {e}")))?;
        }
        for (namespace, models) in self.registry.module_pool() {
            for model in models {
                let table = format!("{}_{}_{}", self.table_prefix, namespace, model.table());
                store
                    .migrate(&table, model.as_ref())
                    .await
                    .map_err(|e| Error::Boot(format!("migrating pool {namespace}: {e}")))?;
            }
        }

        let table = compiler::compile(&self.registry, &self.api_prefix);
        info!(routes = table.len(), "route table compiled");

        let mut group = ApiGroup::new(normalized_prefix(&self.api_prefix));
        group.install(&self.registry);

        Ok(Application {
            registry: self.registry,
            router: Router::new(table),
            gates: self.gates,
            group,
            store,
        })
    }
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn normalized_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// A fully booted application: immutable registry, route table, gates, and
/// hooks.
pub struct Application {
    registry: Registry,
    router: Router,
    gates: Vec<Arc<dyn Gate>>,
    group: ApiGroup,
    store: Arc<dyn DataStore>,
}

impl Application {
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    /// The frozen registry. Post-boot reads need no synchronization because
    /// nothing mutates it once the application is built.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn store(&self) -> Arc<dyn DataStore> {
        self.store.clone()
    }

    /// Run the full request pipeline: before-hooks (API group only), gates
    /// in install order, dispatch, after-hooks. Errors are converted into
    /// the JSON failure body here, so callers always get a response.
    pub async fn handle(&self, mut request: HttpRequest) -> HttpResponse {
        if let Some((path, query)) = request.path.split_once('?') {
            let path = path.to_string();
            request.query_params.extend(parse_query_string(query));
            request.path = path;
        }

        let in_group = self.group.applies_to(&request.path);
        if in_group {
            self.group.run_before(&mut request);
        }

        for gate in &self.gates {
            match gate.apply(&mut request).await {
                Ok(GateDecision::Continue) => {}
                Ok(GateDecision::Respond(response)) => return response,
                Err(e) => return failure_response(e),
            }
        }

        // The after-hooks receive the request context, so keep a copy of it
        // across dispatch when any are installed.
        let mut tail = (in_group && self.group.has_after_hooks()).then(|| request.clone());

        let response = match self.router.dispatch(request).await {
            Ok(response) => response,
            Err(e) => failure_response(e),
        };

        if let Some(ref mut ctx) = tail {
            self.group.run_after(ctx);
        }

        response
    }

    /// Start the HTTP server; one task per connection.
    pub async fn listen(self, port: u16) -> Result<(), Error> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "server listening");

        let app = Arc::new(self);
        loop {
            let (stream, _) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let app = app.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<IncomingBody>| {
                    let app = app.clone();
                    async move { serve_one(req, app).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!(error = %err, "error serving connection");
                }
            });
        }
    }
}

/// Convert an error into the `{code, msg}` failure body.
fn failure_response(err: Error) -> HttpResponse {
    HttpResponse::failure(err.status_code(), err.to_string())
}

/// Bridge one hyper request through the pipeline and back.
async fn serve_one(
    req: Request<IncomingBody>,
    app: Arc<Application>,
) -> Result<Response<Full<bytes::Bytes>>, hyper::Error> {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    let mut request = HttpRequest::new(method, path);
    if let Some(query) = query {
        request.query_params = parse_query_string(&query);
    }
    for (name, value) in req.headers() {
        if let Ok(value) = value.to_str() {
            request.headers.insert(name.to_string(), value.to_string());
        }
    }
    request.body = req.collect().await?.to_bytes().to_vec();

    let response = app.handle(request).await;

    let mut builder = Response::builder().status(response.status);
    for (key, value) in response.headers {
        builder = builder.header(key, value);
    }
    let body = Full::new(bytes::Bytes::from(response.body));
    Ok(builder
        .body(body)
        .unwrap_or_else(|_| Response::new(Full::new(bytes::Bytes::new()))))
}
