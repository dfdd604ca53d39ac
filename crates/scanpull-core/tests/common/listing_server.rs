//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed set of routes (directory listings, archives, redirects) and
//! counts GET requests per path so tests can assert what was fetched.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub enum Route {
    /// 200 with the given body.
    Body(Vec<u8>),
    /// 302 to another path on the same server.
    Redirect(String),
    /// Bare status with empty body.
    Status(u16),
}

/// Handle to a running server.
#[derive(Clone)]
pub struct ListingServer {
    pub base: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl ListingServer {
    /// Full URL for a path (`/ipv6/` → `http://127.0.0.1:PORT/ipv6/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Number of GETs served for `path`.
    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

/// Autoindex-style page linking each name (plus the usual `../`).
pub fn listing_page(names: &[&str]) -> Vec<u8> {
    let mut html = String::from("<html><head><title>Index</title></head><body><pre>\n");
    html.push_str("<a href=\"../\">../</a>\n");
    for n in names {
        html.push_str(&format!(
            "<a href=\"{0}\">{0}</a>                 30-May-2024 02:00       -\n",
            n
        ));
    }
    html.push_str("</pre><hr></body></html>\n");
    html.into_bytes()
}

/// Starts the server in a background thread. Unknown paths get 404. The
/// server runs until the process exits.
pub fn start(routes: HashMap<String, Route>) -> ListingServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes = Arc::new(routes);
    let hits = Arc::new(Mutex::new(HashMap::new()));
    let server_hits = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&server_hits);
            thread::spawn(move || handle(stream, &routes, &hits));
        }
    });
    ListingServer {
        base: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &HashMap<String, Route>,
    hits: &Mutex<HashMap<String, usize>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("").to_string();
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }
    *hits.lock().unwrap().entry(path.clone()).or_insert(0) += 1;

    let empty: &[u8] = &[];
    let (status, extra, body) = match routes.get(&path) {
        Some(Route::Body(b)) => ("200 OK", String::new(), b.as_slice()),
        Some(Route::Redirect(to)) => ("302 Found", format!("Location: {}\r\n", to), empty),
        Some(Route::Status(404)) | None => ("404 Not Found", String::new(), empty),
        Some(Route::Status(500)) => ("500 Internal Server Error", String::new(), empty),
        Some(Route::Status(_)) => ("503 Service Unavailable", String::new(), empty),
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
        status,
        body.len(),
        extra
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body);
}
