//! One-shot HTTP server on a loopback port.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

/// Serves exactly one request with a canned response.
pub struct OneShotServer {
    pub url: String,
    handle: JoinHandle<()>,
}

impl OneShotServer {
    /// Start a server that answers the next request with `status` and `body`.
    ///
    /// # Panics
    ///
    /// Panics if no loopback port can be bound.
    #[must_use]
    pub fn start(status: u16, reason: &str, body: Vec<u8>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind loopback port");
        let addr = listener.local_addr().expect("No local address");
        let head = format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Type: application/zip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );

        let handle = thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            // Read until the end of the request head.
            let mut request = Vec::new();
            let mut buf = [0_u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
            let _ = stream.flush();
        });

        Self {
            url: format!("http://{addr}/bundles/Sepia.zip"),
            handle,
        }
    }

    /// Wait for the response to be sent.
    ///
    /// # Panics
    ///
    /// Panics if the server thread panicked.
    pub fn join(self) {
        self.handle.join().expect("Server thread panicked");
    }
}
