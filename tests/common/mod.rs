#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use tempfile::TempDir;

pub const LIST_PAGE_1: &str = "/api/fleet/agent_policies?full=true&page=1&perPage=100";
pub const LIST_PAGE_2: &str = "/api/fleet/agent_policies?full=true&page=2&perPage=100";

/// Request seen by the fixture server: path plus the `authorization` header.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub xsrf: bool,
}

struct FixtureState {
    routes: HashMap<String, (u16, String)>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

/// Loopback axum server answering canned bodies per request path and query.
pub struct FleetFixture {
    pub url: String,
    pub seen: Arc<Mutex<Vec<SeenRequest>>>,
}

async fn answer(
    State(state): State<Arc<FixtureState>>,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    state.seen.lock().expect("lock").push(SeenRequest {
        path: path.clone(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        xsrf: headers.contains_key("kbn-xsrf"),
    });

    let (status, body) = state
        .routes
        .get(&path)
        .cloned()
        .unwrap_or((404, r#"{"statusCode":404,"message":"Not Found"}"#.to_string()));
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
}

impl FleetFixture {
    pub fn start(routes: Vec<(&str, u16, Value)>) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let state = Arc::new(FixtureState {
            routes: routes
                .into_iter()
                .map(|(p, s, b)| (p.to_string(), (s, b.to_string())))
                .collect(),
            seen: Arc::clone(&seen),
        });
        let app = Router::new().fallback(answer).with_state(state);

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("fixture runtime");
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind fixture server");
                tx.send(listener.local_addr().expect("local addr"))
                    .expect("report fixture address");
                axum::serve(listener, app).await.expect("fixture server");
            });
        });
        let addr = rx.recv().expect("fixture server address");

        Self {
            url: format!("http://{}", addr),
            seen,
        }
    }

    pub fn paths(&self) -> Vec<String> {
        self.seen
            .lock()
            .expect("lock")
            .iter()
            .map(|r| r.path.clone())
            .collect()
    }
}

pub fn policy(id: &str, packages: &[&str]) -> Value {
    let package_policies: Vec<Value> = packages
        .iter()
        .enumerate()
        .map(|(i, name)| {
            serde_json::json!({
                "id": format!("{}-pp-{}", id, i),
                "name": format!("{}-{}", name, i),
                "package": {"name": name, "title": name.to_uppercase(), "version": "1.0.0"}
            })
        })
        .collect();
    serde_json::json!({
        "id": id,
        "name": format!("Policy {}", id),
        "namespace": "default",
        "package_policies": package_policies
    })
}

pub fn list_page(items: Vec<Value>, total: usize, page: usize) -> Value {
    serde_json::json!({"items": items, "total": total, "page": page, "perPage": 100})
}

pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub out: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).expect("create isolated home");
        let out = tmp.path().join("dump");
        Self {
            _tmp: tmp,
            home,
            out,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("fleetdump");
        cmd.env("HOME", &self.home)
            .env_remove("FLEETDUMP_KIBANA_HOST")
            .env_remove("FLEETDUMP_USERNAME")
            .env_remove("FLEETDUMP_PASSWORD")
            .env_remove("FLEETDUMP_API_KEY")
            .env_remove("RUST_LOG")
            .env("NO_PROXY", "127.0.0.1,localhost")
            .env("no_proxy", "127.0.0.1,localhost");
        cmd
    }

    pub fn dump_cmd(&self, fleet: &FleetFixture) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("--kibana-host")
            .arg(&fleet.url)
            .args(["dump", "agent-policies", "--output"])
            .arg(&self.out);
        cmd
    }

    pub fn run_json(&self, fleet: &FleetFixture, args: &[&str]) -> Value {
        let out = self
            .dump_cmd(fleet)
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn policies_dir(&self) -> PathBuf {
        self.out.join("agent_policies")
    }

    pub fn dumped_names(&self) -> Vec<String> {
        let dir = self.policies_dir();
        if !dir.exists() {
            return vec![];
        }
        let mut names: Vec<String> = fs::read_dir(dir)
            .expect("read dump dir")
            .map(|e| e.expect("entry").file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    pub fn write_settings(&self, settings: Value) {
        let path = self.home.join(".config/fleetdump/config.json");
        fs::create_dir_all(path.parent().expect("parent")).expect("create config dir");
        fs::write(path, settings.to_string()).expect("write settings");
    }
}
