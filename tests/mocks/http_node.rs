use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

type Handler = dyn Fn(&Value) -> Value + Send + Sync;

/// JSON-over-HTTP node on a local port. Each POST body is handed to the
/// handler and its return value is sent back as the response body.
pub struct HttpNode {
    pub url: String,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl HttpNode {
    pub async fn start(handler: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let seen = requests.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let handler = handler.clone();
                let seen = seen.clone();
                tokio::spawn(async move {
                    let _ = respond(socket, handler, seen).await;
                });
            }
        });
        Self { url, requests }
    }

    /// Rippled style: the handler returns the `result` object.
    pub async fn rippled(handler: impl Fn(&str, &Value) -> Value + Send + Sync + 'static) -> Self {
        Self::start(move |request| {
            let method = request["method"].as_str().unwrap_or_default();
            serde_json::json!({ "result": handler(method, &request["params"][0]) })
        })
        .await
    }

    /// JSON-RPC 2.0 style: the handler returns `result`, the id is echoed.
    pub async fn json_rpc(handler: impl Fn(&str, &Value) -> Value + Send + Sync + 'static) -> Self {
        Self::start(move |request| {
            let method = request["method"].as_str().unwrap_or_default();
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": request["id"].clone(),
                "result": handler(method, &request["params"]),
            })
        })
        .await
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r["method"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

async fn respond(
    mut socket: TcpStream,
    handler: Arc<Handler>,
    seen: Arc<Mutex<Vec<Value>>>,
) -> std::io::Result<()> {
    let body = read_body(&mut socket).await?;
    let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let reply = handler(&request).to_string();
    seen.lock().unwrap().push(request);

    let response = format!(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{reply}",
        reply.len()
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

async fn read_body(socket: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(Vec::new());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Ok(buf[header_end..].to_vec())
}
