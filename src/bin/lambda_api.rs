//! AWS Lambda handler for the Enomy-Finances HTTP API
//!
//! Dispatches the public JSON routes (auth, currency, investment) and keeps
//! every record in process-local stores shared across warm invocations.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use enomy_finances::auth::{self, password, AuthError, Claims};
use enomy_finances::config::Config;
use enomy_finances::currency::{self, ConversionRecord, Currency, ExchangeRates};
use enomy_finances::investment::{self, InvestmentPlan, QuoteRecord};
use enomy_finances::store::{RecordLog, Role, StoreError, User, UserDirectory};

/// Shared state for the process lifetime
struct AppState {
    config: Config,
    rates: ExchangeRates,
    users: UserDirectory,
    conversions: RecordLog<ConversionRecord>,
    quotes: RecordLog<QuoteRecord>,
}

impl AppState {
    fn new(config: Config) -> Self {
        let users = UserDirectory::with_demo_accounts(&config.token_secret);
        Self {
            config,
            rates: ExchangeRates::fixed_table(),
            users,
            conversions: RecordLog::new(),
            quotes: RecordLog::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    full_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConvertRequest {
    #[serde(default)]
    from_currency: String,
    #[serde(default)]
    to_currency: String,
    #[serde(default)]
    amount: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalculateRequest {
    #[serde(default)]
    investment_type: String,
    #[serde(default)]
    initial_amount: Value,
    #[serde(default)]
    monthly_contribution: Value,
}

/// Account fields exposed to clients; createdAt only on the profile route
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserView {
    id: u64,
    email: String,
    full_name: String,
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
}

impl UserView {
    fn summary(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            created_at: None,
        }
    }

    fn profile(user: &User) -> Self {
        Self {
            created_at: Some(user.created_at),
            ..Self::summary(user)
        }
    }
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    success: bool,
    token: String,
    user: UserView,
}

/// One row of the plan table served to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanDescriptor {
    value: InvestmentPlan,
    label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_initial: Option<f64>,
    min_monthly: f64,
    max_yearly: Option<f64>,
    returns: String,
    fees: String,
}

fn error_response(status: u16, message: &str) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::Text(json!({ "error": message }).to_string()))
        .unwrap()
}

fn json_response<T: Serialize>(body: &T) -> Response<Body> {
    Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .body(Body::Text(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn read_body(event: &Request) -> String {
    match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    }
}

/// Numeric wire values arrive as numbers or numeric strings; anything else
/// becomes NaN and fails amount validation downstream.
fn amount_from(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn bearer_token(event: &Request) -> Option<&str> {
    event
        .headers()
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolve the caller's claims or produce the matching auth response
fn authorize(state: &AppState, event: &Request) -> Result<Claims, Response<Body>> {
    match bearer_token(event) {
        None => Err(error_response(401, &AuthError::MissingToken.to_string())),
        Some(token) => auth::verify_token(&state.config.token_secret, token)
            .map_err(|err| error_response(403, &err.to_string())),
    }
}

fn query_param(event: &Request, key: &str) -> Option<String> {
    event.uri().query()?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| v.to_string())
    })
}

/// Trailing user id of a `/history/{userId}` route
fn path_user_id(path: &str, prefix: &str) -> Option<u64> {
    path.strip_prefix(prefix)?.parse().ok()
}

async fn route(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(Response::builder()
            .status(200)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
            .body(Body::Empty)
            .unwrap());
    }

    let method = event.method().as_str().to_string();
    let path = event.uri().path().to_string();

    let response = match (method.as_str(), path.as_str()) {
        ("GET", "/") => health(),
        ("POST", "/api/auth/login") => login(&state, &event),
        ("POST", "/api/auth/register") => register(&state, &event),
        ("GET", "/api/auth/me") => current_user(&state, &event),
        ("GET", "/api/currency/rates") => currency_rates(&state, &event),
        ("GET", "/api/currency/supported") => supported_currencies(),
        ("POST", "/api/currency/convert") => convert_currency(&state, &event),
        ("GET", "/api/investment/types") => investment_types(),
        ("POST", "/api/investment/calculate") => calculate_investment(&state, &event),
        ("GET", p) if p.starts_with("/api/currency/history/") => {
            history(&state, &event, p, "/api/currency/history/", |owner| {
                json_response(&state.conversions.list_by_owner(owner))
            })
        }
        ("GET", p) if p.starts_with("/api/investment/history/") => {
            history(&state, &event, p, "/api/investment/history/", |owner| {
                json_response(&state.quotes.list_by_owner(owner))
            })
        }
        _ => error_response(404, "Not found"),
    };

    Ok(response)
}

fn health() -> Response<Body> {
    json_response(&json!({
        "message": "Enomy-Finances API v1.0",
        "status": "running",
        "timestamp": Utc::now(),
    }))
}

fn login(state: &AppState, event: &Request) -> Response<Body> {
    let request: LoginRequest = match serde_json::from_str(&read_body(event)) {
        Ok(r) => r,
        Err(e) => return error_response(400, &format!("Invalid JSON: {e}")),
    };

    let user = match state.users.find_by_email(&request.email) {
        Some(user) => user,
        None => return error_response(401, &AuthError::InvalidCredentials.to_string()),
    };

    let valid = password::verify(
        &state.config.token_secret,
        &user.email,
        &request.password,
        &user.password_digest,
    );
    if !valid {
        return error_response(401, &AuthError::InvalidCredentials.to_string());
    }

    session_response(state, &user)
}

fn register(state: &AppState, event: &Request) -> Response<Body> {
    let request: RegisterRequest = match serde_json::from_str(&read_body(event)) {
        Ok(r) => r,
        Err(e) => return error_response(400, &format!("Invalid JSON: {e}")),
    };

    let digest = password::digest(&state.config.token_secret, &request.email, &request.password);
    match state
        .users
        .insert(&request.email, digest, &request.full_name, Role::User)
    {
        Ok(user) => session_response(state, &user),
        Err(err @ StoreError::EmailTaken) => error_response(400, &err.to_string()),
    }
}

fn session_response(state: &AppState, user: &User) -> Response<Body> {
    let token = auth::issue_token(
        &state.config.token_secret,
        user.id,
        user.role,
        state.config.token_ttl_hours,
    );
    json_response(&SessionResponse {
        success: true,
        token,
        user: UserView::summary(user),
    })
}

fn current_user(state: &AppState, event: &Request) -> Response<Body> {
    let claims = match authorize(state, event) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    match state.users.find_by_id(claims.user_id) {
        Some(user) => json_response(&UserView::profile(&user)),
        None => error_response(404, "User not found"),
    }
}

fn currency_rates(state: &AppState, event: &Request) -> Response<Body> {
    let base = match query_param(event, "base") {
        Some(code) => match code.parse::<Currency>() {
            Ok(base) => base,
            Err(err) => return error_response(400, &err.to_string()),
        },
        None => Currency::Gbp,
    };

    let mut rates = serde_json::Map::new();
    for currency in Currency::ALL {
        if currency != base {
            rates.insert(
                format!("{}_{}", base.as_str(), currency.as_str()),
                json!(state.rates.rate(base, currency)),
            );
        }
    }

    json_response(&Value::Object(rates))
}

fn supported_currencies() -> Response<Body> {
    json_response(&Currency::ALL)
}

fn convert_currency(state: &AppState, event: &Request) -> Response<Body> {
    let claims = match authorize(state, event) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let request: ConvertRequest = match serde_json::from_str(&read_body(event)) {
        Ok(r) => r,
        Err(e) => return error_response(400, &format!("Invalid JSON: {e}")),
    };

    let from: Currency = match request.from_currency.parse() {
        Ok(currency) => currency,
        Err(err) => return error_response(400, &format!("{err}")),
    };
    let to: Currency = match request.to_currency.parse() {
        Ok(currency) => currency,
        Err(err) => return error_response(400, &format!("{err}")),
    };

    let outcome = match currency::convert(
        &state.rates,
        from,
        to,
        amount_from(&request.amount),
        claims.user_id,
    ) {
        Ok(outcome) => outcome,
        Err(err) => return error_response(400, &err.to_string()),
    };

    let record = state.conversions.append(|id| ConversionRecord {
        id,
        created_at: Utc::now(),
        outcome: outcome.clone(),
    });

    json_response(&record)
}

/// Shared guard for the two history routes: the caller must own the history
/// or hold the admin role.
fn history<F>(state: &AppState, event: &Request, path: &str, prefix: &str, list: F) -> Response<Body>
where
    F: FnOnce(u64) -> Response<Body>,
{
    let claims = match authorize(state, event) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let owner = match path_user_id(path, prefix) {
        Some(owner) => owner,
        None => return error_response(400, "Invalid user id"),
    };

    if claims.user_id != owner && !claims.role.is_admin() {
        return error_response(403, "Access denied");
    }

    list(owner)
}

fn investment_types() -> Response<Body> {
    let descriptors: Vec<PlanDescriptor> = InvestmentPlan::ALL
        .iter()
        .map(|&plan| {
            let terms = plan.terms();
            PlanDescriptor {
                value: plan,
                label: terms.label,
                min_initial: (terms.min_initial > 0.0).then_some(terms.min_initial),
                min_monthly: terms.min_monthly,
                max_yearly: terms.max_yearly_contribution,
                returns: format!("{}% - {}%", terms.min_return_pct, terms.max_return_pct),
                fees: format!("{}% monthly", terms.monthly_fee_pct),
            }
        })
        .collect();

    json_response(&descriptors)
}

fn calculate_investment(state: &AppState, event: &Request) -> Response<Body> {
    let claims = match authorize(state, event) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let request: CalculateRequest = match serde_json::from_str(&read_body(event)) {
        Ok(r) => r,
        Err(e) => return error_response(400, &format!("Invalid JSON: {e}")),
    };

    let quote = match investment::compute_quote(
        &request.investment_type,
        amount_from(&request.initial_amount),
        amount_from(&request.monthly_contribution),
        claims.user_id,
    ) {
        Ok(quote) => quote,
        Err(err) => return error_response(400, &err.to_string()),
    };

    let record = state.quotes.append(|id| QuoteRecord {
        id,
        created_at: Utc::now(),
        quote: quote.clone(),
    });

    json_response(&record)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let state = Arc::new(AppState::new(Config::from_env()));
    log::info!(
        "Enomy-Finances API ready with {} seeded accounts",
        state.users.len()
    );

    run(service_fn(move |event: Request| {
        let state = Arc::clone(&state);
        async move { route(state, event).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::http;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(Config {
            token_secret: "test-secret".to_string(),
            token_ttl_hours: 24,
        }))
    }

    fn request(method: &str, path: &str, token: Option<&str>, body: Option<Value>) -> Request {
        let mut builder = http::Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => Body::Text(value.to_string()),
            None => Body::Empty,
        };
        builder.body(body).unwrap()
    }

    fn body_json(response: &Response<Body>) -> Value {
        match response.body() {
            Body::Text(s) => serde_json::from_str(s).unwrap(),
            _ => panic!("expected a text body"),
        }
    }

    async fn login_token(state: &Arc<AppState>, email: &str) -> String {
        let response = route(
            Arc::clone(state),
            request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": "password123" })),
            ),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), 200);
        body_json(&response)["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_route() {
        let state = test_state();
        let response = route(state, request("GET", "/", None, None)).await.unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(body_json(&response)["status"], "running");
    }

    #[tokio::test]
    async fn test_login_and_profile() {
        let state = test_state();
        let token = login_token(&state, "user@example.com").await;

        let response = route(
            Arc::clone(&state),
            request("GET", "/api/auth/me", Some(&token), None),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), 200);
        let profile = body_json(&response);
        assert_eq!(profile["email"], "user@example.com");
        assert_eq!(profile["role"], "USER");
        assert!(profile["createdAt"].is_string());

        let response = route(
            state,
            request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "user@example.com", "password": "wrong" })),
            ),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), 401);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let state = test_state();

        let response = route(
            Arc::clone(&state),
            request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": "new@example.com",
                    "password": "hunter22",
                    "fullName": "New User"
                })),
            ),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(body_json(&response)["success"], true);

        let response = route(
            state,
            request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": "new@example.com",
                    "password": "other",
                    "fullName": "Dup"
                })),
            ),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), 400);
        assert_eq!(body_json(&response)["error"], "User already exists");
    }

    #[tokio::test]
    async fn test_calculate_requires_token() {
        let state = test_state();
        let response = route(
            state,
            request(
                "POST",
                "/api/investment/calculate",
                None,
                Some(json!({
                    "investmentType": "BASIC_SAVINGS",
                    "initialAmount": 1000,
                    "monthlyContribution": 100
                })),
            ),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 401);
        assert_eq!(body_json(&response)["error"], "Access token required");
    }

    #[tokio::test]
    async fn test_calculate_creates_quote() {
        let state = test_state();
        let token = login_token(&state, "user@example.com").await;

        let response = route(
            Arc::clone(&state),
            request(
                "POST",
                "/api/investment/calculate",
                Some(&token),
                Some(json!({
                    "investmentType": "BASIC_SAVINGS",
                    "initialAmount": 1000,
                    "monthlyContribution": 100
                })),
            ),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 200);
        let quote = body_json(&response);
        assert_eq!(quote["id"], 1);
        assert_eq!(quote["userId"], 1);
        let one_year = quote["projectedValue1Year"].as_f64().unwrap();
        assert!((one_year - 2212.46).abs() < 0.01);
        assert_eq!(state.quotes.len(), 1);
    }

    #[tokio::test]
    async fn test_calculate_rejects_unknown_plan_without_storing() {
        let state = test_state();
        let token = login_token(&state, "user@example.com").await;

        let response = route(
            Arc::clone(&state),
            request(
                "POST",
                "/api/investment/calculate",
                Some(&token),
                Some(json!({
                    "investmentType": "CRYPTO",
                    "initialAmount": 1000,
                    "monthlyContribution": 100
                })),
            ),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 400);
        assert_eq!(body_json(&response)["error"], "Invalid investment type");
        assert!(state.quotes.is_empty());
    }

    #[tokio::test]
    async fn test_string_amounts_are_accepted() {
        let state = test_state();
        let token = login_token(&state, "user@example.com").await;

        let response = route(
            Arc::clone(&state),
            request(
                "POST",
                "/api/investment/calculate",
                Some(&token),
                Some(json!({
                    "investmentType": "BASIC_SAVINGS",
                    "initialAmount": "1000",
                    "monthlyContribution": "100"
                })),
            ),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), 200);

        let response = route(
            state,
            request(
                "POST",
                "/api/investment/calculate",
                Some(&token),
                Some(json!({
                    "investmentType": "BASIC_SAVINGS",
                    "initialAmount": "lots",
                    "monthlyContribution": 100
                })),
            ),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), 400);
        assert_eq!(body_json(&response)["error"], "Invalid amount");
    }

    #[tokio::test]
    async fn test_history_access_control() {
        let state = test_state();
        let user_token = login_token(&state, "user@example.com").await;
        let admin_token = login_token(&state, "admin@enomy.com").await;

        // A user may not read someone else's history
        let response = route(
            Arc::clone(&state),
            request(
                "GET",
                "/api/investment/history/2",
                Some(&user_token),
                None,
            ),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), 403);
        assert_eq!(body_json(&response)["error"], "Access denied");

        // An admin may read anyone's
        let response = route(
            Arc::clone(&state),
            request(
                "GET",
                "/api/investment/history/1",
                Some(&admin_token),
                None,
            ),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(body_json(&response), json!([]));

        let response = route(
            state,
            request(
                "GET",
                "/api/currency/history/abc",
                Some(&admin_token),
                None,
            ),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn test_convert_appends_record() {
        let state = test_state();
        let token = login_token(&state, "user@example.com").await;

        let response = route(
            Arc::clone(&state),
            request(
                "POST",
                "/api/currency/convert",
                Some(&token),
                Some(json!({
                    "fromCurrency": "GBP",
                    "toCurrency": "USD",
                    "amount": 1000
                })),
            ),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 200);
        let conversion = body_json(&response);
        assert_eq!(conversion["exchangeRate"], 1.25);
        assert_eq!(conversion["feePercentage"], 2.7);
        let final_amount = conversion["finalAmount"].as_f64().unwrap();
        assert!((final_amount - 1216.25).abs() < 0.01);
        assert_eq!(state.conversions.len(), 1);

        // The owner sees it in history, newest first
        let response = route(
            state,
            request("GET", "/api/currency/history/1", Some(&token), None),
        )
        .await
        .unwrap();
        let history = body_json(&response);
        assert_eq!(history.as_array().unwrap().len(), 1);
        assert_eq!(history[0]["fromCurrency"], "GBP");
    }

    #[tokio::test]
    async fn test_currency_rates_and_supported() {
        let state = test_state();

        let response = route(
            Arc::clone(&state),
            request("GET", "/api/currency/rates?base=USD", None, None),
        )
        .await
        .unwrap();
        let rates = body_json(&response);
        assert_eq!(rates["USD_GBP"], 0.80);
        assert!(rates.get("USD_USD").is_none());

        let response = route(
            state,
            request("GET", "/api/currency/supported", None, None),
        )
        .await
        .unwrap();
        assert_eq!(
            body_json(&response),
            json!(["GBP", "USD", "EUR", "BRL", "JPY", "TRY"])
        );
    }

    #[tokio::test]
    async fn test_investment_types_table() {
        let state = test_state();
        let response = route(state, request("GET", "/api/investment/types", None, None))
            .await
            .unwrap();

        let types = body_json(&response);
        let types = types.as_array().unwrap();
        assert_eq!(types.len(), 3);

        // Basic savings has no minimum initial on the wire
        assert_eq!(types[0]["value"], "BASIC_SAVINGS");
        assert!(types[0].get("minInitial").is_none());
        assert_eq!(types[0]["maxYearly"], 20000.0);
        assert_eq!(types[0]["returns"], "1.2% - 2.4%");
        assert_eq!(types[0]["fees"], "0.25% monthly");

        // Managed stock advertises an explicit null cap
        assert_eq!(types[2]["value"], "MANAGED_STOCK");
        assert!(types[2]["maxYearly"].is_null());
        assert_eq!(types[2]["returns"], "4% - 23%");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let state = test_state();
        let response = route(state, request("GET", "/api/nope", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }
}
