// Boots an application from a parsed configuration document, the way a
// binary crate wires the pieces together.

use chassis::prelude::*;
use chassis_config::ChassisConfig;
use chassis_jwt::{AuthConfig, AuthGate, TokenService, UserClaims, Whitelist};
use chassis_log::LogLevel;
use chassis_tenancy::TenantGate;
use serde_json::json;
use std::sync::Arc;

const CONFIG: &str = r#"
[app]
name = "shop"
log_level = "debug"

[server]
port = 9097

[store]
engine = "memory"
table_prefix = "ci"

[auth]
secret = "config-secret"
effective_minutes = 45

[whitelist]
items = "/login"

[tenant]
enforce = false
api_prefix = "/api"
"#;

struct HealthController;

impl Controller for HealthController {
    fn operations(&self) -> Vec<Operation> {
        vec![Operation::new("GetStatus", |_request| async move {
            Ok(Reply::ok(json!({"status": "up"})))
        })]
    }
}

async fn boot(config: &ChassisConfig) -> (Application, TokenService) {
    let mut registry = Registry::new();
    assert!(registry.register_controller("shop", HealthController));

    let store = Arc::new(MemoryStore::new());
    let tokens = TokenService::new(
        AuthConfig::new(&config.auth.secret)
            .with_effective_minutes(config.auth.effective_minutes),
    );
    let auth = AuthGate::new(tokens.clone(), Whitelist::parse(&config.whitelist.items));
    let tenant = TenantGate::new(
        config.tenant.enforce,
        &config.tenant.api_prefix,
        store.clone(),
    );

    let app = Application::builder()
        .registry(registry)
        .store(store)
        .gate(Arc::new(auth))
        .gate(Arc::new(tenant))
        .api_prefix(&config.tenant.api_prefix)
        .table_prefix(&config.store.table_prefix)
        .build()
        .await
        .expect("boot succeeds");

    (app, tokens)
}

#[tokio::test]
async fn config_document_drives_the_boot() {
    let config = ChassisConfig::parse(CONFIG).unwrap();
    assert_eq!(LogLevel::parse(&config.app.log_level), LogLevel::Debug);
    assert_eq!(config.server.port, 9097);

    let (app, tokens) = boot(&config).await;

    // The configured lifetime flows into issued tokens.
    let claims = UserClaims {
        id: 1,
        ..Default::default()
    };
    let token = tokens.issue(&claims).unwrap();
    let parsed = tokens.verify(&token).unwrap();
    assert!(parsed.exp - parsed.iat >= 44 * 60);
    assert!(parsed.exp - parsed.iat <= 46 * 60);

    // Whitelisted path bypasses auth; the guarded route requires the token.
    let response = app.handle(HttpRequest::new("POST", "/login")).await;
    assert_eq!(response.status, 404);

    let response = app
        .handle(HttpRequest::new("GET", "/api/shop/health/get/status"))
        .await;
    assert_eq!(response.status, 401);

    let response = app
        .handle(
            HttpRequest::new("GET", "/api/shop/health/get/status")
                .with_header("Authorization", format!("Bearer {token}")),
        )
        .await;
    assert_eq!(response.status, 200);
}
