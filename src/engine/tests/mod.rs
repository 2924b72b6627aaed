use std::sync::Arc;

use super::*;
use crate::types::AttributeName;
use yare::parameterized;


const ORDERS_POLICY: &str = r#"
permit (
    principal in Group::"buyers",
    action == Action::"read",
    resource == Resource::"orders"
) when {
    context.order.createdBy == principal.id
};

permit (
    principal in Group::"auditors",
    action == Action::"read",
    resource == Resource::"orders"
);

permit (
    principal in Group::"buyers",
    action == Action::"create",
    resource == Resource::"orders"
) when {
    context.product.category == "accessory" && context.order.total <= 100
};

forbid (
    principal,
    action == Action::"read",
    resource == Resource::"orders"
) when {
    context.order.archived
};
"#;

const PRODUCTS_POLICY: &str = r#"
permit (
    principal,
    action == Action::"read",
    resource == Resource::"products"
);

permit (
    principal in Group::"merchants",
    action in [Action::"create", Action::"update", Action::"delete"],
    resource == Resource::"products"
) when {
    principal.region == context.product.region
};
"#;

const REGIONAL_POLICY: &str = r#"
permit (
    principal,
    action == Action::"read",
    resource == Resource::"reports"
) when {
    principal.region == "eu" && context.report.confidential == false
};

permit (
    principal == User::"carol",
    action == Action::"read",
    resource == Resource::"reports"
);
"#;

const UNSUPPORTED_POLICY: &str = r#"
permit (
    principal,
    action == Action::"read",
    resource == Resource::"hosts"
) when {
    context.host.name like "web*"
};
"#;

#[derive(Clone)]
struct SharedLogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

struct SharedLogWriter(Arc<std::sync::Mutex<Vec<u8>>>);

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedLogBuffer {
    type Writer = SharedLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SharedLogWriter(Arc::clone(&self.0))
    }
}

impl std::io::Write for SharedLogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return what it logged.
fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let sink = SharedLogBuffer(Arc::new(std::sync::Mutex::new(Vec::new())));
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(sink.clone())
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
    (out, logs)
}

fn pdp_from_policy(policy_text: &str) -> CedarPolicyDecisionPoint {
    CedarPolicyDecisionPoint::new_from_str(policy_text).expect("policy should load")
}

fn name(raw: &str) -> AttributeName {
    raw.parse().unwrap()
}

fn buyer(id: &str) -> Principal {
    Principal::new(id).with_group("buyers")
}

fn request(action: &str, resource: &str) -> Attributes {
    Attributes::new().with_action(action).with_resource(resource)
}

#[test]
fn test_new_from_str_rejects_bad_policy() {
    let result = CedarPolicyDecisionPoint::new_from_str("permit (principal, action");
    assert!(matches!(result, Err(AuthzError::ParseError(_))));
}

#[test]
fn test_policies() {
    let pdp = pdp_from_policy(ORDERS_POLICY);
    assert_eq!(pdp.policies().unwrap().len(), 4);
}

#[test]
fn test_request_needs_action_and_resource() {
    let pdp = pdp_from_policy(ORDERS_POLICY);
    let principal = buyer("bob");

    let err = pdp
        .evaluate(&principal, &Attributes::new().with_resource("orders"))
        .unwrap_err();
    assert!(matches!(err, AuthzError::InvalidFormat(_)));

    let err = pdp
        .evaluate(&principal, &Attributes::new().with_action("read"))
        .unwrap_err();
    assert!(matches!(err, AuthzError::InvalidFormat(_)));
}

#[test]
fn test_evaluation_logs_policy_matches() {
    let pdp = pdp_from_policy(ORDERS_POLICY);
    let (result, logs) = capture_logs(|| pdp.evaluate(&buyer("bob"), &request("read", "orders")));
    assert!(result.is_ok());
    assert!(logs.contains("Evaluation"), "logs: {logs}");
    assert!(logs.contains("PrincipalIn"), "logs: {logs}");
}
