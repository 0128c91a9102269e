// Integration tests for the boot-then-serve pipeline: hook ordering around
// the gates and the route group boundary.

use async_trait::async_trait;
use chassis_core::{
    AfterHook, Application, BeforeHook, Controller, Error, Gate, GateDecision, HttpRequest,
    HttpResponse, MemoryStore, Middleware, Operation, Registry,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Trace {
    steps: Mutex<Vec<&'static str>>,
}

impl Trace {
    fn record(&self, step: &'static str) {
        self.steps.lock().unwrap().push(step);
    }

    fn steps(&self) -> Vec<&'static str> {
        self.steps.lock().unwrap().clone()
    }
}

struct TracingMiddleware {
    trace: Arc<Trace>,
}

impl BeforeHook for TracingMiddleware {
    fn before_request(&self, ctx: &mut HttpRequest) {
        ctx.headers.insert("x-traced".into(), "1".into());
        self.trace.record("before");
    }
}

impl AfterHook for TracingMiddleware {
    fn after_request(&self, ctx: &mut HttpRequest) {
        assert_eq!(ctx.headers.get("x-traced").map(String::as_str), Some("1"));
        self.trace.record("after");
    }
}

impl Middleware for TracingMiddleware {
    fn probe_before(self: Arc<Self>) -> Option<Arc<dyn BeforeHook>> {
        Some(self)
    }

    fn probe_after(self: Arc<Self>) -> Option<Arc<dyn AfterHook>> {
        Some(self)
    }
}

struct TracingGate {
    trace: Arc<Trace>,
    saw_hook_effect: Arc<AtomicBool>,
}

#[async_trait]
impl Gate for TracingGate {
    async fn apply(&self, request: &mut HttpRequest) -> Result<GateDecision, Error> {
        self.trace.record("gate");
        if request.headers.contains_key("x-traced") {
            self.saw_hook_effect.store(true, Ordering::SeqCst);
        }
        Ok(GateDecision::Continue)
    }
}

struct EchoController {
    trace: Arc<Trace>,
}

impl Controller for EchoController {
    fn operations(&self) -> Vec<Operation> {
        let trace = self.trace.clone();
        vec![Operation::new("GetEcho", move |_request| {
            let trace = trace.clone();
            async move {
                trace.record("handler");
                Ok(HttpResponse::ok())
            }
        })]
    }
}

async fn build(trace: Arc<Trace>, saw_hook_effect: Arc<AtomicBool>) -> Application {
    let mut registry = Registry::new();
    assert!(registry.register_controller("shop", EchoController {
        trace: trace.clone(),
    }));
    assert!(registry.register_middleware(TracingMiddleware {
        trace: trace.clone(),
    }));

    Application::builder()
        .registry(registry)
        .store(Arc::new(MemoryStore::new()))
        .gate(Arc::new(TracingGate {
            trace,
            saw_hook_effect,
        }))
        .build()
        .await
        .expect("boot succeeds")
}

#[tokio::test]
async fn hooks_bracket_the_gates_and_handler() {
    let trace = Arc::new(Trace::default());
    let saw = Arc::new(AtomicBool::new(false));
    let app = build(trace.clone(), saw.clone()).await;

    let response = app
        .handle(HttpRequest::new("GET", "/api/shop/echo/get/echo"))
        .await;
    assert_eq!(response.status, 200);

    assert_eq!(trace.steps(), vec!["before", "gate", "handler", "after"]);
    // The gate observed the before-hook's mutation of the request context.
    assert!(saw.load(Ordering::SeqCst));
}

#[tokio::test]
async fn hooks_skip_requests_outside_the_group() {
    let trace = Arc::new(Trace::default());
    let saw = Arc::new(AtomicBool::new(false));
    let app = build(trace.clone(), saw.clone()).await;

    let response = app.handle(HttpRequest::new("GET", "/healthz")).await;
    assert_eq!(response.status, 404);

    // Gates still ran, hooks did not.
    assert_eq!(trace.steps(), vec!["gate"]);
    assert!(!saw.load(Ordering::SeqCst));
}
