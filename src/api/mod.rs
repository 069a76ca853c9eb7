/*
 * REST API module driving the swap workflow
 */

use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{get, post, put, routes, State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use crate::config::Config;
use crate::models::{AuthSession, SwapOutcome, TokenDescriptor, WalletError};
use crate::notify::Notice;
use crate::portfolio::Portfolio;
use crate::service::WalletService;
use crate::swap::SwapSnapshot;

pub struct ApiState {
    pub config: Config,
    pub wallet_service: Arc<WalletService>,
}

type ApiResult<T> = std::result::Result<Json<T>, Custom<String>>;

#[derive(Debug, Deserialize)]
pub struct PairBody {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize)]
pub struct AmountBody {
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub session: AuthSession,
    pub swap: Option<SwapOutcome>,
}

fn reject(e: &WalletError) -> Custom<String> {
    let status = match e {
        WalletError::InputInvalid(_) => Status::UnprocessableEntity,
        WalletError::AuthCancelled | WalletError::AuthFailed(_) => Status::Unauthorized,
        WalletError::ServiceUnavailable(_) => Status::ServiceUnavailable,
        WalletError::ConfigError(_) => Status::InternalServerError,
        _ => Status::BadGateway,
    };
    Custom(status, e.to_string())
}

#[get("/health")]
pub async fn health_check() -> &'static str {
    "OK"
}

#[get("/api/v1/tokens")]
pub async fn list_tokens(state: &State<ApiState>) -> Json<Vec<TokenDescriptor>> {
    Json(state.wallet_service.orchestrator().registry().tokens().to_vec())
}

#[get("/api/v1/swap")]
pub async fn get_swap(state: &State<ApiState>) -> Json<SwapSnapshot> {
    Json(state.wallet_service.orchestrator().snapshot())
}

#[put("/api/v1/swap/pair", data = "<body>")]
pub async fn put_pair(body: Json<PairBody>, state: &State<ApiState>) -> ApiResult<SwapSnapshot> {
    let swap = state.wallet_service.orchestrator();
    swap.set_pair(&body.from, &body.to).map_err(|e| reject(&e))?;
    Ok(Json(swap.snapshot()))
}

#[put("/api/v1/swap/amount", data = "<body>")]
pub async fn put_amount(body: Json<AmountBody>, state: &State<ApiState>) -> ApiResult<SwapSnapshot> {
    let swap = state.wallet_service.orchestrator();
    if !swap.set_from_amount(&body.amount).await {
        return Err(reject(&WalletError::InputInvalid(format!(
            "Not a non-negative number: {}",
            body.amount
        ))));
    }
    Ok(Json(swap.snapshot()))
}

#[post("/api/v1/swap/switch")]
pub async fn switch_tokens(state: &State<ApiState>) -> Json<SwapSnapshot> {
    let swap = state.wallet_service.orchestrator();
    swap.switch_tokens();
    Json(swap.snapshot())
}

#[post("/api/v1/swap/refresh")]
pub async fn refresh(state: &State<ApiState>) -> Json<SwapSnapshot> {
    let swap = state.wallet_service.orchestrator();
    swap.refresh();
    swap.refresh_price().await;
    Json(swap.snapshot())
}

#[post("/api/v1/swap")]
pub async fn request_swap(state: &State<ApiState>) -> Json<SwapOutcome> {
    Json(state.wallet_service.orchestrator().request_swap().await)
}

#[post("/api/v1/auth/login")]
pub async fn login(state: &State<ApiState>) -> ApiResult<AuthResponse> {
    let swap_service = state.wallet_service.orchestrator();
    let outcome = swap_service.confirm_authenticate().await.map_err(|e| {
        error!("Login failed: {e}");
        reject(&e)
    })?;
    Ok(Json(AuthResponse { session: swap_service.session(), swap: outcome }))
}

#[post("/api/v1/auth/register")]
pub async fn register(state: &State<ApiState>) -> ApiResult<AuthResponse> {
    let swap_service = state.wallet_service.orchestrator();
    let outcome = swap_service.confirm_register().await.map_err(|e| {
        error!("Registration failed: {e}");
        reject(&e)
    })?;
    Ok(Json(AuthResponse { session: swap_service.session(), swap: outcome }))
}

#[post("/api/v1/auth/cancel")]
pub async fn cancel(state: &State<ApiState>) -> Json<AuthSession> {
    let swap = state.wallet_service.orchestrator();
    swap.cancel_authenticate();
    Json(swap.session())
}

#[post("/api/v1/auth/logout")]
pub async fn logout(state: &State<ApiState>) -> Json<AuthSession> {
    let swap = state.wallet_service.orchestrator();
    swap.logout();
    Json(swap.session())
}

#[get("/api/v1/auth/address")]
pub async fn copy_address(state: &State<ApiState>) -> ApiResult<String> {
    state
        .wallet_service
        .orchestrator()
        .copy_address()
        .map(Json)
        .ok_or_else(|| Custom(Status::NotFound, "Not signed in".to_string()))
}

#[get("/api/v1/notices")]
pub async fn notices(state: &State<ApiState>) -> Json<Vec<Notice>> {
    Json(state.wallet_service.notices().recent())
}

#[get("/api/v1/portfolio")]
pub async fn portfolio(state: &State<ApiState>) -> Json<Portfolio> {
    Json(state.wallet_service.orchestrator().portfolio().clone())
}

#[must_use]
pub fn create_rocket(state: ApiState) -> rocket::Rocket<rocket::Build> {
    let figment = rocket::Config::figment()
        .merge(("address", state.config.server.host.clone()))
        .merge(("port", state.config.server.port));

    rocket::custom(figment)
        .manage(state)
        .mount(
            "/",
            routes![
                health_check,
                list_tokens,
                get_swap,
                put_pair,
                put_amount,
                switch_tokens,
                refresh,
                request_swap,
                login,
                register,
                cancel,
                logout,
                copy_address,
                notices,
                portfolio,
            ],
        )
}
