use async_trait::async_trait;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha512};

use mehfil_http::error::AppError;
use mehfil_kernel::settings::PaymentsSettings;
use mehfil_kernel::{AppState, Module};

/// Fields the gateway form posts back to PayU.
#[derive(Debug, Clone, Deserialize)]
pub struct PayuRequest {
    #[serde(default)]
    pub txnid: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub productinfo: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub surl: Option<String>,
    pub furl: Option<String>,
}

/// Payments module: builds the signed redirect payload for the gateway.
/// The gateway validates the hash itself; this side only constructs it.
pub struct PaymentsModule;

impl PaymentsModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for PaymentsModule {
    fn name(&self) -> &'static str {
        "payments"
    }

    fn routes(&self) -> Router<AppState> {
        Router::new().route("/payu", post(build_payu_payload))
    }
}

/// Sign the request and answer with the gateway form action plus parameters.
pub async fn build_payu_payload(
    State(state): State<AppState>,
    Json(req): Json<PayuRequest>,
) -> Result<Json<Value>, AppError> {
    let mut missing = Vec::new();
    for (field, value) in [
        ("txnid", &req.txnid),
        ("amount", &req.amount),
        ("productinfo", &req.productinfo),
        ("firstname", &req.firstname),
        ("email", &req.email),
    ] {
        if value.trim().is_empty() {
            missing.push(json!({"field": field, "error": "required"}));
        }
    }
    if !missing.is_empty() {
        return Err(AppError::validation(
            missing,
            "txnid, amount, productinfo, firstname, and email are all required",
        ));
    }

    let payments = &state.settings.payments;
    let hash = payu_hash(payments, &req);

    let mut params = json!({
        "key": payments.key,
        "txnid": req.txnid,
        "amount": req.amount,
        "productinfo": req.productinfo,
        "firstname": req.firstname,
        "email": req.email,
        "hash": hash,
    });
    if let Some(phone) = req.phone {
        params["phone"] = Value::String(phone);
    }
    if let Some(surl) = req.surl {
        params["surl"] = Value::String(surl);
    }
    if let Some(furl) = req.furl {
        params["furl"] = Value::String(furl);
    }

    Ok(Json(json!({
        "action": payments.action_url,
        "params": params,
    })))
}

/// Gateway hash: sha512 over the pipe-joined fields, with the five udf slots
/// and six reserved slots left empty, hex-encoded.
fn payu_hash(payments: &PaymentsSettings, req: &PayuRequest) -> String {
    let payload = format!(
        "{}|{}|{}|{}|{}|{}|||||||||||{}",
        payments.key, req.txnid, req.amount, req.productinfo, req.firstname, req.email,
        payments.salt,
    );
    hex::encode(Sha512::digest(payload.as_bytes()))
}

/// Create a new instance of the payments module.
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(PaymentsModule::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::test_support;

    fn request() -> PayuRequest {
        PayuRequest {
            txnid: "txn-0042".to_string(),
            amount: "499.00".to_string(),
            productinfo: "mehfil-pass".to_string(),
            firstname: "Mirza".to_string(),
            email: "mirza@example.com".to_string(),
            phone: None,
            surl: Some("https://mehfil.example.com/pay/ok".to_string()),
            furl: Some("https://mehfil.example.com/pay/fail".to_string()),
        }
    }

    #[test]
    fn hash_matches_the_documented_layout() {
        let payments = PaymentsSettings {
            key: "gtKFFx".to_string(),
            salt: "eCwWELxi".to_string(),
            ..PaymentsSettings::default()
        };
        let req = request();

        let expected_payload =
            "gtKFFx|txn-0042|499.00|mehfil-pass|Mirza|mirza@example.com|||||||||||eCwWELxi";
        let expected = hex::encode(Sha512::digest(expected_payload.as_bytes()));

        assert_eq!(payu_hash(&payments, &req), expected);
        // sha512 hex digest is always 128 characters.
        assert_eq!(payu_hash(&payments, &req).len(), 128);
    }

    #[tokio::test]
    async fn payload_carries_action_and_signed_params() {
        let state = test_support::state();
        let Json(body) = build_payu_payload(State(state), Json(request()))
            .await
            .unwrap();

        assert_eq!(body["action"], "https://secure.payu.in/_payment");
        assert_eq!(body["params"]["txnid"], "txn-0042");
        assert_eq!(body["params"]["surl"], "https://mehfil.example.com/pay/ok");
        assert_eq!(body["params"]["hash"].as_str().unwrap().len(), 128);
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let state = test_support::state();
        let mut req = request();
        req.amount = String::new();
        req.email = "  ".to_string();

        let err = build_payu_payload(State(state), Json(req)).await.err().unwrap();
        match err {
            AppError::Validation { details, .. } => assert_eq!(details.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
