//! Reusable test helpers for HTTP integration tests.
//!
//! Provides [`MockDiscord`], an in-process stand-in for the Discord REST API
//! and incoming webhooks, served by [`spawn_test_server()`] on a random port.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use exposure_watch::audit::{AuditOptions, AuditRunner};
use exposure_watch::config::GuildConfig;
use exposure_watch::discord::DiscordClient;
use exposure_watch::notify::{AlertDestination, Notifier};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

pub const BOT_TOKEN: &str = "test-bot-token";

// ============================================================================
// Test Server
// ============================================================================

/// A running test server bound to a random port.
pub struct TestServer {
    /// Server address (127.0.0.1:PORT).
    pub addr: SocketAddr,
    /// Base URL for HTTP requests (e.g., `http://127.0.0.1:12345`).
    pub url: String,
    /// Handle to the server task for cleanup.
    _handle: JoinHandle<()>,
}

/// Spawn a real HTTP server on a random port.
pub async fn spawn_test_server(router: Router) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local addr");
    let url = format!("http://{addr}");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });

    TestServer {
        addr,
        url,
        _handle: handle,
    }
}

// ============================================================================
// Mock Discord API
// ============================================================================

/// A message received by the mock, from either a webhook or a channel post.
#[derive(Debug, Clone)]
pub struct Delivered {
    pub path: String,
    pub content: String,
    pub authorization: Option<String>,
}

/// Canned response for one endpoint.
#[derive(Debug, Clone)]
struct Canned {
    status: StatusCode,
    body: String,
}

#[derive(Default)]
struct MockInner {
    channels: HashMap<String, Canned>,
    roles: HashMap<String, Canned>,
    rejected_paths: HashMap<String, Canned>,
    delivered: Vec<Delivered>,
    requests: Vec<(String, Option<String>)>,
}

/// In-memory Discord API.
#[derive(Clone, Default)]
pub struct MockDiscord {
    inner: Arc<Mutex<MockInner>>,
}

impl MockDiscord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `channels` (a JSON array) for `GET /guilds/{guild_id}/channels`.
    pub fn set_channels(&self, guild_id: &str, channels: Value) {
        self.inner.lock().unwrap().channels.insert(
            guild_id.into(),
            Canned {
                status: StatusCode::OK,
                body: channels.to_string(),
            },
        );
    }

    /// Answer `GET /guilds/{guild_id}/channels` with an arbitrary status and body.
    pub fn fail_channels(&self, guild_id: &str, status: u16, body: &str) {
        self.inner.lock().unwrap().channels.insert(
            guild_id.into(),
            Canned {
                status: StatusCode::from_u16(status).unwrap(),
                body: body.into(),
            },
        );
    }

    /// Serve `roles` (a JSON array) for `GET /guilds/{guild_id}/roles`.
    pub fn set_roles(&self, guild_id: &str, roles: Value) {
        self.inner.lock().unwrap().roles.insert(
            guild_id.into(),
            Canned {
                status: StatusCode::OK,
                body: roles.to_string(),
            },
        );
    }

    /// Answer `GET /guilds/{guild_id}/roles` with an arbitrary status and body.
    pub fn fail_roles(&self, guild_id: &str, status: u16, body: &str) {
        self.inner.lock().unwrap().roles.insert(
            guild_id.into(),
            Canned {
                status: StatusCode::from_u16(status).unwrap(),
                body: body.into(),
            },
        );
    }

    /// Reject posts to `path` (e.g. `/webhooks/1/abc`) with HTTP `status`.
    pub fn reject_deliveries(&self, path: &str, status: u16, body: &str) {
        self.inner.lock().unwrap().rejected_paths.insert(
            path.into(),
            Canned {
                status: StatusCode::from_u16(status).unwrap(),
                body: body.into(),
            },
        );
    }

    /// Messages accepted so far, in arrival order.
    pub fn delivered(&self) -> Vec<Delivered> {
        self.inner.lock().unwrap().delivered.clone()
    }

    /// Messages accepted at `path`.
    pub fn delivered_to(&self, path: &str) -> Vec<Delivered> {
        self.delivered()
            .into_iter()
            .filter(|d| d.path == path)
            .collect()
    }

    /// Every GET path requested, with its Authorization header.
    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/guilds/{guild_id}/channels", get(guild_channels))
            .route("/guilds/{guild_id}/roles", get(guild_roles))
            .route("/channels/{channel_id}/messages", post(channel_message))
            .route("/webhooks/{webhook_id}/{token}", post(webhook))
            .with_state(self.clone())
    }

    /// Serve the mock on a random port.
    pub async fn spawn(&self) -> TestServer {
        spawn_test_server(self.router()).await
    }

    fn record_request(&self, path: String, headers: &HeaderMap) {
        self.inner
            .lock()
            .unwrap()
            .requests
            .push((path, authorization(headers)));
    }

    fn deliver(&self, path: String, headers: &HeaderMap, body: &Value) -> (StatusCode, String) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(canned) = inner.rejected_paths.get(&path) {
            return (canned.status, canned.body.clone());
        }
        inner.delivered.push(Delivered {
            path,
            content: body["content"].as_str().unwrap_or_default().to_string(),
            authorization: authorization(headers),
        });
        (StatusCode::OK, json!({ "id": "1" }).to_string())
    }
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn unknown_guild() -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        json!({ "message": "Unknown Guild", "code": 10004 }).to_string(),
    )
}

fn canned(entry: Option<&Canned>) -> (StatusCode, String) {
    entry.map_or_else(unknown_guild, |c| (c.status, c.body.clone()))
}

async fn guild_channels(
    State(mock): State<MockDiscord>,
    Path(guild_id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    mock.record_request(format!("/guilds/{guild_id}/channels"), &headers);
    canned(mock.inner.lock().unwrap().channels.get(&guild_id))
}

async fn guild_roles(
    State(mock): State<MockDiscord>,
    Path(guild_id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    mock.record_request(format!("/guilds/{guild_id}/roles"), &headers);
    canned(mock.inner.lock().unwrap().roles.get(&guild_id))
}

async fn channel_message(
    State(mock): State<MockDiscord>,
    Path(channel_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    mock.deliver(format!("/channels/{channel_id}/messages"), &headers, &body)
}

async fn webhook(
    State(mock): State<MockDiscord>,
    Path((webhook_id, token)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    mock.deliver(format!("/webhooks/{webhook_id}/{token}"), &headers, &body)
}

// ============================================================================
// Fixtures
// ============================================================================

/// Discord client pointed at a mock server.
pub fn discord_client(server: &TestServer) -> DiscordClient {
    DiscordClient::new(reqwest::Client::new(), &server.url, BOT_TOKEN)
}

/// Runner over `guilds` backed by the mock server.
pub fn runner(server: &TestServer, guilds: Vec<GuildConfig>, role_baseline: bool) -> AuditRunner {
    let discord = discord_client(server);
    AuditRunner::new(
        guilds,
        discord.clone(),
        Notifier::new(discord),
        AuditOptions::default(),
        role_baseline,
    )
}

/// Guild alerting through a mock webhook at `/webhooks/{guild_id}/token`.
pub fn webhook_guild(server: &TestServer, guild_id: &str, whitelist: &[&str]) -> GuildConfig {
    GuildConfig {
        guild_id: guild_id.into(),
        guild_name: format!("Guild {guild_id}"),
        whitelist_channel_ids: whitelist.iter().map(|s| (*s).to_string()).collect(),
        alert: AlertDestination::Webhook {
            url: format!("{}{}", server.url, webhook_path(guild_id)),
        },
    }
}

pub fn webhook_path(guild_id: &str) -> String {
    format!("/webhooks/{guild_id}/token")
}

/// Channel JSON as Discord sends it, with one @everyone overwrite.
pub fn channel_json(id: &str, kind: u8, guild_id: &str, allow: u64, deny: u64) -> Value {
    json!({
        "id": id,
        "type": kind,
        "guild_id": guild_id,
        "name": format!("channel-{id}"),
        "topic": null,
        "permission_overwrites": [
            { "id": guild_id, "type": 0, "allow": allow.to_string(), "deny": deny.to_string() }
        ]
    })
}

/// Channel JSON without any overwrites.
pub fn bare_channel_json(id: &str, kind: u8) -> Value {
    json!({ "id": id, "type": kind, "name": format!("channel-{id}") })
}

/// The @everyone role of `guild_id` with the given permissions.
pub fn everyone_role_json(guild_id: &str, permissions: u64) -> Value {
    json!({
        "id": guild_id,
        "name": "@everyone",
        "permissions": permissions.to_string(),
        "position": 0
    })
}
