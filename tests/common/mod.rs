#![allow(dead_code)]

use myenovos::error::{EnovosError, Result};
use myenovos::portal::{Credentials, MyEnovos, PortalEndpoints};
use myenovos::transport::{HttpRequest, HttpResponse, HttpTransport, Method};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const AUTH_BASE: &str = "https://auth.test";
pub const PORTAL_BASE: &str = "https://portal.test/v3/cp";
pub const TOKEN: &str = "tok-123";

/// Replays canned responses in order and records every request
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<HttpResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn push(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests whose path ends with `suffix`
    pub fn requests_to(&self, suffix: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.path().ends_with(suffix))
            .collect()
    }
}

impl HttpTransport for ScriptedTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses.lock().unwrap().pop_front().ok_or_else(|| {
            EnovosError::network(format!(
                "unscripted {} {}",
                request.method.as_str(),
                request.url
            ))
        })
    }
}

pub fn response(status: u16, headers: &[(&str, &str)], body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: headers
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect(),
        body: body.to_string(),
    }
}

pub fn redirect(status: u16, location: &str) -> HttpResponse {
    response(status, &[("Location", location)], "")
}

pub fn json_response(value: &Value) -> HttpResponse {
    response(200, &[("Content-Type", "application/json")], &value.to_string())
}

pub fn html_ok() -> HttpResponse {
    response(200, &[("Content-Type", "text/html")], "<html></html>")
}

/// Successful login: authorize hop, then a callback carrying the token
pub fn login_ok(token: &str) -> Vec<HttpResponse> {
    vec![
        redirect(302, "https://auth.test/oauth/authorize?client_id=cp"),
        redirect(
            302,
            &format!("https://my.enovos.test/callback#access_token={}&token_type=Bearer", token),
        ),
        html_ok(),
    ]
}

pub fn userinfo(customer_nrs: &[&str]) -> HttpResponse {
    json_response(&json!({
        "partner_id": customer_nrs,
        "first_name": "Jane",
        "last_name": "Doe",
        "email": "jane@example.lu"
    }))
}

pub fn contract(contract_nr: &str, customer_nr: &str, kind: &str, open: bool) -> Value {
    json!({
        "vkont": contract_nr,
        "customerid": customer_nr,
        "devicedesignation": format!("LU-POD-{}", contract_nr),
        "productname": format!("{} {}", kind, contract_nr),
        "installationid": format!("INST-{}", contract_nr),
        "installation_service_type": kind,
        "open": open
    })
}

pub fn contracts(items: Vec<Value>) -> HttpResponse {
    json_response(&Value::Array(items))
}

pub fn reading(ts: &str, status: &str, value: Value) -> Value {
    json!({ "ts": ts, "status": status, "value": value })
}

pub fn client(transport: &Arc<ScriptedTransport>) -> MyEnovos {
    let endpoints = PortalEndpoints::new(AUTH_BASE, PORTAL_BASE).unwrap();
    let credentials = Credentials::new("jane", "secret").unwrap();
    MyEnovos::new(credentials, endpoints, transport.clone())
}

pub fn is_get(request: &HttpRequest) -> bool {
    request.method == Method::Get
}
