use mockito::{Matcher, Server, ServerGuard};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use swapgate::api::{self, ApiState};
use swapgate::config::{
    AuthConfig, AuthProviderKind, ChainConfig, Config, JupiterConfig, ServerConfig, SwapConfig,
};
use swapgate::WalletService;

const SOL: &str = "So11111111111111111111111111111111111111112";

async fn jupiter_and_rpc() -> ServerGuard {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/price")
        .match_query(Matcher::Any)
        .with_body(format!(r#"{{"data":{{"{SOL}":{{"id":"{SOL}","price":20.5}}}}}}"#))
        .create_async()
        .await;
    server
        .mock("GET", "/quote")
        .match_query(Matcher::Any)
        .with_body(
            r#"{"inAmount":"500000000","outAmount":"10250000","routePlan":[{"swapInfo":{"label":"Whirlpool","inAmount":"500000000","feeAmount":"1500000"},"percent":100}]}"#,
        )
        .create_async()
        .await;
    server
        .mock("POST", "/swap")
        .with_body(r#"{"swapTransaction":"AQID"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJsonString(r#"{"method":"getHealth"}"#.to_string()))
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"ok"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJsonString(r#"{"method":"sendTransaction"}"#.to_string()))
        .with_body(r#"{"jsonrpc":"2.0","id":2,"result":"5xSig"}"#)
        .create_async()
        .await;
    server
}

fn config_for(url: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            log_level: "debug".to_string(),
        },
        solana: ChainConfig { rpc_url: url.to_string() },
        jupiter: JupiterConfig {
            price_api_url: url.to_string(),
            quote_api_url: url.to_string(),
        },
        swap: SwapConfig {
            price_poll_secs: 60,
            quote_debounce_ms: 10,
            ..SwapConfig::default()
        },
        auth: AuthConfig {
            provider: AuthProviderKind::Test,
            passkey_service_url: None,
        },
    }
}

async fn client_for(server: &ServerGuard) -> Client {
    let config = config_for(&server.url());
    let service = WalletService::new(config.clone()).await.expect("service");
    let state = ApiState { config, wallet_service: Arc::new(service) };
    Client::tracked(api::create_rocket(state)).await.expect("rocket")
}

async fn json(response: rocket::local::asynchronous::LocalResponse<'_>) -> Value {
    serde_json::from_str(&response.into_string().await.unwrap()).unwrap()
}

#[rocket::async_test]
async fn health_and_tokens() {
    let server = jupiter_and_rpc().await;
    let client = client_for(&server).await;

    let health = client.get("/health").dispatch().await;
    assert_eq!(health.status(), Status::Ok);
    assert_eq!(health.into_string().await.unwrap(), "OK");

    let tokens = json(client.get("/api/v1/tokens").dispatch().await).await;
    let symbols: Vec<&str> = tokens
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["symbol"].as_str().unwrap())
        .collect();
    assert_eq!(symbols, ["SOL", "USDC", "BONK", "RAY"]);
}

#[rocket::async_test]
async fn swap_waits_for_login_then_executes() {
    let server = jupiter_and_rpc().await;
    let client = client_for(&server).await;

    let response = client
        .put("/api/v1/swap/amount")
        .header(ContentType::JSON)
        .body(r#"{"amount":"0.5"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    tokio::time::sleep(Duration::from_millis(200)).await;

    let form = json(client.get("/api/v1/swap").dispatch().await).await;
    assert_eq!(form["estimated_output"], "10.2500");
    assert_eq!(form["route"]["label"], "Whirlpool");
    assert_eq!(form["from_balance"], "1.5");

    let outcome = json(client.post("/api/v1/swap").dispatch().await).await;
    assert_eq!(outcome["status"], "AUTH_REQUIRED");

    let login = json(client.post("/api/v1/auth/login").dispatch().await).await;
    assert_eq!(login["session"]["is_authenticated"], true);
    assert_eq!(login["swap"]["status"], "EXECUTED");
    assert_eq!(login["swap"]["signature"], "5xSig");

    let form = json(client.get("/api/v1/swap").dispatch().await).await;
    assert_eq!(form["from_amount"], "");

    let notices = json(client.get("/api/v1/notices").dispatch().await).await;
    let titles: Vec<&str> = notices
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert!(titles.contains(&"Swap executed!"));
}

#[rocket::async_test]
async fn cancel_and_logout() {
    let server = jupiter_and_rpc().await;
    let client = client_for(&server).await;

    let address = client.get("/api/v1/auth/address").dispatch().await;
    assert_eq!(address.status(), Status::NotFound);

    let cancelled = json(client.post("/api/v1/auth/cancel").dispatch().await).await;
    assert_eq!(cancelled["is_authenticated"], false);

    client.post("/api/v1/auth/register").dispatch().await;
    let address = client.get("/api/v1/auth/address").dispatch().await;
    assert_eq!(address.status(), Status::Ok);

    let first = json(client.post("/api/v1/auth/logout").dispatch().await).await;
    let second = json(client.post("/api/v1/auth/logout").dispatch().await).await;
    assert_eq!(first, second);
    assert_eq!(first["is_authenticated"], false);
}

#[rocket::async_test]
async fn bad_form_input_is_unprocessable() {
    let server = jupiter_and_rpc().await;
    let client = client_for(&server).await;

    let response = client
        .put("/api/v1/swap/amount")
        .header(ContentType::JSON)
        .body(r#"{"amount":"-3"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);

    let response = client
        .put("/api/v1/swap/pair")
        .header(ContentType::JSON)
        .body(r#"{"from":"SOL","to":"DOGE"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);

    let portfolio = json(client.get("/api/v1/portfolio").dispatch().await).await;
    assert_eq!(portfolio["transactions"].as_array().unwrap().len(), 3);
}
