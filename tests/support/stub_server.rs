//! Minimal single-threaded HTTP stub for exercising the prediction client.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

/// Serves a fixed list of canned responses, one per connection, and records
/// the raw request text for assertions.
pub struct StubServer {
    addr: SocketAddr,
    handle: Option<JoinHandle<Vec<String>>>,
}

impl StubServer {
    /// Start a server that answers each incoming connection with the next
    /// canned response, then stops listening.
    pub fn serve(responses: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let addr = listener.local_addr().expect("stub server addr");
        let handle = thread::spawn(move || {
            let mut requests = Vec::new();
            for response in responses {
                let (mut stream, _) = listener.accept().expect("accept connection");
                requests.push(read_request(&mut stream));
                stream
                    .write_all(response.as_bytes())
                    .expect("write canned response");
                let _ = stream.shutdown(std::net::Shutdown::Write);
            }
            requests
        });
        Self {
            addr,
            handle: Some(handle),
        }
    }

    /// Base URL for a client pointed at this server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Wait for all responses to be served and return the captured requests.
    pub fn finish(mut self) -> Vec<String> {
        self.handle
            .take()
            .expect("stub server already finished")
            .join()
            .expect("stub server thread panicked")
    }
}

/// An address that refuses connections: bind a port, then release it.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe listener");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    format!("http://{addr}")
}

/// Build an HTTP/1.1 response with a JSON body and `Connection: close` so
/// the client opens a fresh connection for each request.
pub fn json_response(status: u16, body: &str) -> String {
    let reason = match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    };
    format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// Build a response whose body is not JSON.
pub fn text_response(status: u16, body: &str) -> String {
    format!(
        "HTTP/1.1 {status} OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut reader = BufReader::new(stream);
    let mut head = String::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).expect("read request line") == 0 {
            break;
        }
        let done = line == "\r\n" || line == "\n";
        head.push_str(&line);
        if done {
            break;
        }
    }
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())?
        })
        .unwrap_or(0);
    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body).expect("read request body");
    }
    head + &String::from_utf8_lossy(&body)
}
