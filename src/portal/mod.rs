//! The configuration portal HTTP endpoint.
//!
//! A deliberately tiny HTTP/1.x surface: one client served at a time, two
//! routes, and every other request is closed without a response byte.
//!
//! - `GET /` serves the credential form
//! - `POST /save.html` stores the submitted credential and serves the
//!   confirmation page
//!
//! Uses `std::net` directly, which works on both host and ESP32 (via lwIP).
//! The response byte shapes are fixed; clients of older firmware revisions
//! see identical output.

pub mod request;

use crate::pages::{Pages, INDEX_PAGE, SAVE_PAGE};
use crate::store::{Credential, CredentialStore};
use log::{debug, info, warn};
use request::{parse_form_pair, LineReader, RequestHead};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::time::{Duration, Instant};

/// TCP port the portal listens on.
pub const PORTAL_PORT: u16 = 80;

/// Wall-clock budget for reading one request.
pub const CLIENT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Success header block. `Connection: close` tells the client not to wait
/// around: the portal serves one request per connection.
const OK_RESPONSE_HEAD: &str =
    "HTTP/1.1 200 OK\r\nContent-type: text/html\r\nConnection: close\r\n\r\n";

/// Failure header block.
const ERROR_RESPONSE_HEAD: &str =
    "HTTP/1.1 500 Internal Server Error\r\nContent-type: text/html\r\n\r\n";

/// Fixed bodies for the failure paths.
const MISSING_FORM_BODY: &str = "<h2>index could not be retrieved</h2>";
const SAVE_FAILED_BODY: &str = "<h2>could not save credentials</h2>";
const MISSING_CONFIRMATION_BODY: &str = "<h2>save could not be retrieved</h2>";

/// Portal timing knobs.
///
/// Tests shrink these so bound-tripping cases run fast.
#[derive(Debug, Clone, Copy)]
pub struct PortalConfig {
    /// Wall-clock budget for reading one request.
    pub read_timeout: Duration,
    /// OS-level timeout for one read call while waiting for request bytes.
    pub read_slice: Duration,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            read_timeout: CLIENT_READ_TIMEOUT,
            read_slice: Duration::from_millis(50),
        }
    }
}

/// What one served connection produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a credential save must collapse the session deadline"]
pub enum ServeOutcome {
    /// `GET /` answered with the form page.
    FormServed,
    /// `GET /` with the form asset missing: 500.
    FormMissing,
    /// `POST /save.html` stored the credential and served the confirmation.
    CredentialsSaved,
    /// The store rejected the credential: 500.
    SaveFailed,
    /// Credential stored but the confirmation asset is missing: 500.
    ConfirmationMissing,
    /// Anything else: closed without a response.
    Dropped,
}

/// Single-client portal listener.
pub struct PortalServer {
    listener: TcpListener,
    config: PortalConfig,
}

impl PortalServer {
    /// Bind the portal listener. The socket accepts without blocking so the
    /// firmware tick stays responsive while nobody connects.
    pub fn bind(addr: SocketAddr, config: PortalConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        info!("Portal listening on {}", listener.local_addr()?);
        Ok(Self { listener, config })
    }

    /// Address the listener actually bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Close the listener.
    pub fn shutdown(self) {
        match self.listener.local_addr() {
            Ok(addr) => info!("Portal closed: {}", addr),
            Err(_) => info!("Portal closed"),
        }
    }

    /// Accept and serve at most one waiting client.
    ///
    /// Returns `None` when nobody is waiting.
    pub fn poll(
        &mut self,
        pages: &dyn Pages,
        store: &mut dyn CredentialStore,
    ) -> Option<ServeOutcome> {
        let (mut stream, peer) = match self.listener.accept() {
            Ok(accepted) => accepted,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return None,
            Err(e) => {
                warn!("Portal accept failed: {}", e);
                return None;
            }
        };

        debug!("Portal client connected: {}", peer);

        // Accepted sockets can inherit the listener's non-blocking flag;
        // reads must block for one slice at a time instead
        let _ = stream.set_nonblocking(false);
        if let Err(e) = stream.set_read_timeout(Some(self.config.read_slice)) {
            warn!("Could not set client read timeout: {}", e);
        }

        let deadline = Instant::now() + self.config.read_timeout;
        let outcome = serve_client(&mut stream, deadline, pages, store);
        debug!("Portal request outcome: {:?}", outcome);
        Some(outcome)
    }
}

/// Serve one connection: parse under the read bounds, dispatch the two
/// routes, drop everything else without a response.
fn serve_client<S: Read + Write>(
    stream: &mut S,
    deadline: Instant,
    pages: &dyn Pages,
    store: &mut dyn CredentialStore,
) -> ServeOutcome {
    let mut reader = LineReader::new(stream, deadline);

    let head = match reader.read_line().as_deref().and_then(RequestHead::parse) {
        Some(head) => head,
        None => return ServeOutcome::Dropped,
    };

    match (head.method.as_str(), head.path.as_str()) {
        ("GET", "/") => {
            if !skim_headers(&mut reader) {
                return ServeOutcome::Dropped;
            }
            serve_form(reader.into_inner(), pages)
        }
        ("POST", "/save.html") => {
            if !skim_headers(&mut reader) {
                return ServeOutcome::Dropped;
            }
            let body = reader.read_line();
            store_submission(reader.into_inner(), body, pages, store)
        }
        _ => {
            debug!("Unmatched request: {} {}", head.method, head.path);
            ServeOutcome::Dropped
        }
    }
}

/// Consume header lines up to the blank separator. False when the stream
/// ends first.
fn skim_headers<R: Read>(reader: &mut LineReader<R>) -> bool {
    while let Some(line) = reader.read_line() {
        if line.is_empty() {
            return true;
        }
    }
    false
}

fn serve_form<S: Write>(stream: &mut S, pages: &dyn Pages) -> ServeOutcome {
    match pages.fetch(INDEX_PAGE) {
        Some(body) => {
            if let Err(e) = write_page(stream, &body) {
                warn!("Failed to send form page: {}", e);
            }
            ServeOutcome::FormServed
        }
        None => {
            warn!("Form page asset is missing");
            if let Err(e) = write_failure(stream, MISSING_FORM_BODY) {
                warn!("Failed to send error page: {}", e);
            }
            ServeOutcome::FormMissing
        }
    }
}

fn store_submission<S: Write>(
    stream: &mut S,
    body: Option<String>,
    pages: &dyn Pages,
    store: &mut dyn CredentialStore,
) -> ServeOutcome {
    let (network_id, secret) = match body.as_deref().and_then(parse_form_pair) {
        Some(pair) => pair,
        None => {
            debug!("Malformed credential submission");
            return ServeOutcome::Dropped;
        }
    };

    info!("Received credentials for network: {}", network_id);
    let credential = Credential::new(network_id, secret);

    if let Err(e) = store.save(&credential) {
        warn!("Could not save credentials: {}", e);
        if let Err(e) = write_failure(stream, SAVE_FAILED_BODY) {
            warn!("Failed to send error page: {}", e);
        }
        return ServeOutcome::SaveFailed;
    }

    match pages.fetch(SAVE_PAGE) {
        Some(page) => {
            if let Err(e) = write_page(stream, &page) {
                warn!("Failed to send confirmation page: {}", e);
            }
            ServeOutcome::CredentialsSaved
        }
        None => {
            warn!("Confirmation page asset is missing");
            if let Err(e) = write_failure(stream, MISSING_CONFIRMATION_BODY) {
                warn!("Failed to send error page: {}", e);
            }
            ServeOutcome::ConfirmationMissing
        }
    }
}

fn write_page<W: Write>(stream: &mut W, body: &str) -> io::Result<()> {
    stream.write_all(OK_RESPONSE_HEAD.as_bytes())?;
    stream.write_all(body.as_bytes())?;
    stream.write_all(b"\r\n")?;
    stream.flush()
}

fn write_failure<W: Write>(stream: &mut W, body: &str) -> io::Result<()> {
    stream.write_all(ERROR_RESPONSE_HEAD.as_bytes())?;
    stream.write_all(body.as_bytes())?;
    stream.write_all(b"\r\n")?;
    stream.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::EmbeddedPages;
    use crate::store::{BlockStore, MemoryBlock, StoreError};
    use std::net::{Shutdown, TcpStream};

    fn test_config() -> PortalConfig {
        PortalConfig {
            read_timeout: Duration::from_millis(250),
            read_slice: Duration::from_millis(20),
        }
    }

    fn bind_portal() -> PortalServer {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        PortalServer::bind(addr, test_config()).unwrap()
    }

    fn connect(portal: &PortalServer) -> TcpStream {
        let stream = TcpStream::connect(portal.local_addr().unwrap()).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        stream
    }

    /// Read whatever the server sent until it closes the connection.
    fn read_response(stream: &mut TcpStream) -> Vec<u8> {
        let mut buf = Vec::new();
        let _ = stream.read_to_end(&mut buf);
        buf
    }

    fn memory_store() -> BlockStore<MemoryBlock> {
        BlockStore::new(MemoryBlock::new())
    }

    /// Pages provider with no assets at all.
    struct NoPages;

    impl Pages for NoPages {
        fn fetch(&self, _name: &str) -> Option<String> {
            None
        }
    }

    /// Store that rejects every save.
    struct FailStore;

    impl CredentialStore for FailStore {
        fn load(&self) -> Result<Option<Credential>, StoreError> {
            Ok(None)
        }

        fn save(&mut self, _credential: &Credential) -> Result<(), StoreError> {
            Err(StoreError::Corrupt("write failure"))
        }
    }

    #[test]
    fn test_poll_without_client_is_none() {
        let mut portal = bind_portal();
        let mut store = memory_store();
        assert!(portal.poll(&EmbeddedPages, &mut store).is_none());
    }

    #[test]
    fn test_get_root_serves_form_bytes() {
        let mut portal = bind_portal();
        let mut store = memory_store();

        let mut client = connect(&portal);
        client
            .write_all(b"GET / HTTP/1.1\r\nHost: portal\r\n\r\n")
            .unwrap();

        let outcome = portal.poll(&EmbeddedPages, &mut store).unwrap();
        assert_eq!(outcome, ServeOutcome::FormServed);

        let expected = format!(
            "HTTP/1.1 200 OK\r\nContent-type: text/html\r\nConnection: close\r\n\r\n{}\r\n",
            EmbeddedPages.fetch(INDEX_PAGE).unwrap()
        );
        assert_eq!(read_response(&mut client), expected.into_bytes());
    }

    #[test]
    fn test_get_root_with_missing_asset_is_500() {
        let mut portal = bind_portal();
        let mut store = memory_store();

        let mut client = connect(&portal);
        client
            .write_all(b"GET / HTTP/1.1\r\nHost: portal\r\n\r\n")
            .unwrap();

        let outcome = portal.poll(&NoPages, &mut store).unwrap();
        assert_eq!(outcome, ServeOutcome::FormMissing);

        let expected = "HTTP/1.1 500 Internal Server Error\r\nContent-type: text/html\r\n\r\n\
                        <h2>index could not be retrieved</h2>\r\n";
        assert_eq!(read_response(&mut client), expected.as_bytes());
    }

    #[test]
    fn test_post_save_stores_credential() {
        let mut portal = bind_portal();
        let mut store = memory_store();

        let mut client = connect(&portal);
        // No trailing newline after the body, like a browser
        client
            .write_all(
                b"POST /save.html HTTP/1.1\r\nHost: portal\r\n\
                  Content-Length: 22\r\n\r\nssid=home&pass=hunter2",
            )
            .unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        let outcome = portal.poll(&EmbeddedPages, &mut store).unwrap();
        assert_eq!(outcome, ServeOutcome::CredentialsSaved);

        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved, Credential::new("home", "hunter2"));

        let expected = format!(
            "HTTP/1.1 200 OK\r\nContent-type: text/html\r\nConnection: close\r\n\r\n{}\r\n",
            EmbeddedPages.fetch(SAVE_PAGE).unwrap()
        );
        assert_eq!(read_response(&mut client), expected.into_bytes());
    }

    #[test]
    fn test_post_with_terminated_body() {
        let mut portal = bind_portal();
        let mut store = memory_store();

        let mut client = connect(&portal);
        client
            .write_all(b"POST /save.html HTTP/1.1\r\n\r\nssid=net&pass=word\r\n")
            .unwrap();

        let outcome = portal.poll(&EmbeddedPages, &mut store).unwrap();
        assert_eq!(outcome, ServeOutcome::CredentialsSaved);

        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved, Credential::new("net", "word"));
    }

    #[test]
    fn test_unknown_route_dropped_silently() {
        let mut portal = bind_portal();
        let mut store = memory_store();

        let mut client = connect(&portal);
        client
            .write_all(b"GET /other HTTP/1.1\r\nHost: portal\r\n\r\n")
            .unwrap();

        let outcome = portal.poll(&EmbeddedPages, &mut store).unwrap();
        assert_eq!(outcome, ServeOutcome::Dropped);
        assert!(read_response(&mut client).is_empty());
    }

    #[test]
    fn test_unknown_method_dropped_silently() {
        let mut portal = bind_portal();
        let mut store = memory_store();

        let mut client = connect(&portal);
        client
            .write_all(b"DELETE / HTTP/1.1\r\nHost: portal\r\n\r\n")
            .unwrap();

        let outcome = portal.poll(&EmbeddedPages, &mut store).unwrap();
        assert_eq!(outcome, ServeOutcome::Dropped);
        assert!(read_response(&mut client).is_empty());
    }

    #[test]
    fn test_malformed_body_dropped_silently() {
        let mut portal = bind_portal();
        let mut store = memory_store();

        let mut client = connect(&portal);
        client
            .write_all(b"POST /save.html HTTP/1.1\r\n\r\nnot-a-form")
            .unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        let outcome = portal.poll(&EmbeddedPages, &mut store).unwrap();
        assert_eq!(outcome, ServeOutcome::Dropped);
        assert!(read_response(&mut client).is_empty());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_silent_client_dropped_after_deadline() {
        let mut portal = bind_portal();
        let mut store = memory_store();

        let mut client = connect(&portal);

        let started = Instant::now();
        let outcome = portal.poll(&EmbeddedPages, &mut store).unwrap();
        assert_eq!(outcome, ServeOutcome::Dropped);
        assert!(started.elapsed() >= test_config().read_timeout);

        assert!(read_response(&mut client).is_empty());
    }

    #[test]
    fn test_store_failure_is_500() {
        let mut portal = bind_portal();
        let mut store = FailStore;

        let mut client = connect(&portal);
        client
            .write_all(b"POST /save.html HTTP/1.1\r\n\r\nssid=home&pass=p\r\n")
            .unwrap();

        let outcome = portal.poll(&EmbeddedPages, &mut store).unwrap();
        assert_eq!(outcome, ServeOutcome::SaveFailed);

        let expected = "HTTP/1.1 500 Internal Server Error\r\nContent-type: text/html\r\n\r\n\
                        <h2>could not save credentials</h2>\r\n";
        assert_eq!(read_response(&mut client), expected.as_bytes());
    }

    #[test]
    fn test_saved_but_confirmation_missing_is_500() {
        let mut portal = bind_portal();
        let mut store = memory_store();

        let mut client = connect(&portal);
        client
            .write_all(b"POST /save.html HTTP/1.1\r\n\r\nssid=home&pass=p\r\n")
            .unwrap();

        let outcome = portal.poll(&NoPages, &mut store).unwrap();
        assert_eq!(outcome, ServeOutcome::ConfirmationMissing);

        // The credential was stored even though the confirmation failed
        assert!(store.load().unwrap().is_some());

        let expected = "HTTP/1.1 500 Internal Server Error\r\nContent-type: text/html\r\n\r\n\
                        <h2>save could not be retrieved</h2>\r\n";
        assert_eq!(read_response(&mut client), expected.as_bytes());
    }

    #[test]
    fn test_form_values_stored_raw() {
        let mut portal = bind_portal();
        let mut store = memory_store();

        let mut client = connect(&portal);
        client
            .write_all(b"POST /save.html HTTP/1.1\r\n\r\nssid=my%20net&pass=a+b\r\n")
            .unwrap();

        let outcome = portal.poll(&EmbeddedPages, &mut store).unwrap();
        assert_eq!(outcome, ServeOutcome::CredentialsSaved);

        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved, Credential::new("my%20net", "a+b"));
    }

    #[test]
    fn test_consecutive_clients_served() {
        let mut portal = bind_portal();
        let mut store = memory_store();

        let mut first = connect(&portal);
        first
            .write_all(b"GET / HTTP/1.1\r\n\r\n")
            .unwrap();
        let outcome = portal.poll(&EmbeddedPages, &mut store).unwrap();
        assert_eq!(outcome, ServeOutcome::FormServed);

        let mut second = connect(&portal);
        second
            .write_all(b"POST /save.html HTTP/1.1\r\n\r\nssid=n&pass=s\r\n")
            .unwrap();
        let outcome = portal.poll(&EmbeddedPages, &mut store).unwrap();
        assert_eq!(outcome, ServeOutcome::CredentialsSaved);
    }
}
