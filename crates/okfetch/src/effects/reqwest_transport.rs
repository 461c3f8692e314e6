use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use futures_util::{StreamExt, stream};
use reqwest::{Client, StatusCode, Url};
use tokio::sync::Mutex;

use crate::data::{Headers, Method, RequestOptions, ResponseType};
use crate::effects::transport::{BoxStream, RawResponse, Transport};
use crate::error::Error;

const ABORTED: &str = "The operation was aborted.";
const BODY_USED: &str = "body stream already read";
const CLONE_USED: &str = "Response.clone: Body has already been consumed.";

/// Production transport using `reqwest`.
///
/// Timeouts, proxies and connection pooling are configured on the
/// [`Client`] passed to [`with_client`](Self::with_client).
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with default client configuration.
    pub fn new() -> Result<Self, Error> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self { Self { client } }

    pub fn client(&self) -> &Client { &self.client }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

impl Transport for ReqwestTransport {
    type Response = ReqwestResponse;
    type Error = Error;

    async fn request(&self, url: &str, options: RequestOptions) -> Result<ReqwestResponse, Error> {
        let mut request = self.client.request(to_reqwest_method(options.method), url);

        for (name, value) in options.headers.iter() {
            request = request.header(name, value);
        }

        if let Some(body) = options.body {
            request = request.body(body);
        }

        let send = request.send();
        let response = match options.signal {
            Some(signal) => tokio::select! {
                biased;
                _ = signal.cancelled() => return Err(Error::new(ABORTED)),
                response = send => response?,
            },
            None => send.await?,
        };

        Ok(ReqwestResponse::new(Url::parse(url).ok(), response))
    }
}

enum BodyState {
    Pending(reqwest::Response),
    Buffered(Bytes),
    Failed(String),
    Streamed,
}

/// Response produced by [`ReqwestTransport`].
///
/// Siblings created with [`try_clone`](RawResponse::try_clone) share the
/// underlying connection; whichever reads first buffers the body so each
/// sibling still sees it in full, exactly once.
pub struct ReqwestResponse {
    requested: Option<Url>,
    url:       Url,
    status:    StatusCode,
    headers:   Headers,
    body:      Arc<Mutex<BodyState>>,
    used:      AtomicBool,
}

impl ReqwestResponse {
    fn new(requested: Option<Url>, response: reqwest::Response) -> Self {
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| (name.as_str(), String::from_utf8_lossy(value.as_bytes()).into_owned()))
            .collect();

        Self {
            requested,
            url: response.url().clone(),
            status: response.status(),
            headers,
            body: Arc::new(Mutex::new(BodyState::Pending(response))),
            used: AtomicBool::new(false),
        }
    }

    fn has_body(&self) -> bool { !matches!(self.status.as_u16(), 204 | 205 | 304) }
}

async fn read_shared(body: &Mutex<BodyState>) -> Result<Bytes, Error> {
    let mut state = body.lock().await;
    match std::mem::replace(&mut *state, BodyState::Streamed) {
        BodyState::Pending(response) => match response.bytes().await {
            Ok(bytes) => {
                *state = BodyState::Buffered(bytes.clone());
                Ok(bytes)
            }
            Err(e) => {
                *state = BodyState::Failed(e.to_string());
                Err(e.into())
            }
        },
        BodyState::Buffered(bytes) => {
            *state = BodyState::Buffered(bytes.clone());
            Ok(bytes)
        }
        BodyState::Failed(message) => {
            *state = BodyState::Failed(message.clone());
            Err(Error::new(message))
        }
        BodyState::Streamed => Err(Error::new(BODY_USED)),
    }
}

impl RawResponse for ReqwestResponse {
    type Error = Error;

    fn status(&self) -> u16 { self.status.as_u16() }

    fn status_text(&self) -> String { self.status.canonical_reason().unwrap_or_default().to_owned() }

    fn headers(&self) -> Headers { self.headers.clone() }

    fn url(&self) -> String { self.url.to_string() }

    fn redirected(&self) -> bool { self.requested.as_ref().is_some_and(|requested| *requested != self.url) }

    fn response_type(&self) -> ResponseType { ResponseType::Basic }

    fn body_used(&self) -> bool { self.used.load(Ordering::SeqCst) }

    fn body(&self) -> Option<BoxStream<'static, Result<Bytes, Error>>> {
        if !self.has_body() || self.used.swap(true, Ordering::SeqCst) {
            return None;
        }

        // Sole owner: stream straight from the connection.
        if Arc::strong_count(&self.body) == 1
            && let Ok(mut state) = self.body.try_lock()
            && matches!(*state, BodyState::Pending(_))
            && let BodyState::Pending(response) = std::mem::replace(&mut *state, BodyState::Streamed)
        {
            return Some(Box::pin(response.bytes_stream().map(|chunk| chunk.map_err(Error::from))));
        }

        let shared = Arc::clone(&self.body);
        Some(Box::pin(stream::once(async move { read_shared(&shared).await })))
    }

    async fn bytes(&self) -> Result<Bytes, Error> {
        if self.used.swap(true, Ordering::SeqCst) {
            return Err(Error::new(BODY_USED));
        }
        read_shared(&self.body).await
    }

    fn try_clone(&self) -> Result<Self, Error> {
        if self.body_used() {
            return Err(Error::new(CLONE_USED));
        }
        Ok(Self {
            requested: self.requested.clone(),
            url:       self.url.clone(),
            status:    self.status,
            headers:   self.headers.clone(),
            body:      Arc::clone(&self.body),
            used:      AtomicBool::new(false),
        })
    }
}

impl fmt::Debug for ReqwestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestResponse")
            .field("url", &self.url.as_str())
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_used", &self.body_used())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Fetcher;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio_util::sync::CancellationToken;

    const ROUTES: &[(&str, &str)] = &[
        ("/hello", "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\ncontent-length: 11\r\nconnection: close\r\n\r\nhello world"),
        ("/abc", "HTTP/1.1 200 OK\r\ncontent-length: 3\r\nconnection: close\r\n\r\nabc"),
        ("/moved", "HTTP/1.1 302 Found\r\nlocation: /hello\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"),
        ("/empty", "HTTP/1.1 204 No Content\r\nconnection: close\r\n\r\n"),
    ];
    const NOT_FOUND: &str = "HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";

    /// Serve [`ROUTES`] on an ephemeral port and return its base URL.
    async fn serve() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut head = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => head.extend_from_slice(&buf[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&head);
                    let path = head.split_whitespace().nth(1).unwrap_or("/");
                    let reply = ROUTES.iter().find(|(p, _)| *p == path).map_or(NOT_FOUND, |(_, r)| *r);
                    let _ = socket.write_all(reply.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(to_reqwest_method(Method::Get), reqwest::Method::GET);
        assert_eq!(to_reqwest_method(Method::Delete), reqwest::Method::DELETE);
        assert_eq!(to_reqwest_method(Method::Options), reqwest::Method::OPTIONS);
    }

    #[tokio::test]
    async fn test_invalid_url_is_failure() {
        let fetcher = Fetcher::new(ReqwestTransport::default());
        let result = fetcher.get("not a url").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_cancelled_signal_aborts() {
        let signal = CancellationToken::new();
        signal.cancel();
        let fetcher = Fetcher::new(ReqwestTransport::default());
        let options = RequestOptions::default().signal(signal);
        let error = fetcher.fetch("http://127.0.0.1:9/", options).await.unwrap_err();
        assert_eq!(error.message(), ABORTED);
    }

    #[tokio::test]
    async fn test_clones_read_full_body_once() {
        let base = serve().await;
        let fetcher = Fetcher::new(ReqwestTransport::default());
        let original = fetcher.get(&format!("{base}/hello")).await.unwrap();
        let sibling = original.try_clone().unwrap();

        assert_eq!(original.text().await.unwrap(), "hello world");
        assert_eq!(sibling.text().await.unwrap(), "hello world");
        assert_eq!(original.text().await.unwrap_err().message(), BODY_USED);
        assert_eq!(sibling.array_buffer().await.unwrap_err().message(), BODY_USED);
    }

    #[tokio::test]
    async fn test_stream_original_then_read_clone() {
        let base = serve().await;
        let fetcher = Fetcher::new(ReqwestTransport::default());
        let original = fetcher.get(&format!("{base}/abc")).await.unwrap();
        let sibling = original.try_clone().unwrap();

        let mut streamed = Vec::new();
        let mut stream = original.body().unwrap();
        while let Some(chunk) = stream.next().await {
            streamed.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(streamed, b"abc");
        assert!(original.body_used());
        assert!(!sibling.body_used());
        assert_eq!(sibling.text().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_sole_owner_streams_from_connection() {
        let base = serve().await;
        let response = ReqwestTransport::default()
            .request(&format!("{base}/abc"), RequestOptions::default())
            .await
            .unwrap();

        let mut stream = response.body().unwrap();
        assert!(matches!(*response.body.lock().await, BodyState::Streamed));
        let mut streamed = Vec::new();
        while let Some(chunk) = stream.next().await {
            streamed.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(streamed, b"abc");
        assert!(response.body().is_none());
        assert_eq!(response.bytes().await.unwrap_err().message(), BODY_USED);
    }

    #[tokio::test]
    async fn test_clone_after_read_fails() {
        let base = serve().await;
        let fetcher = Fetcher::new(ReqwestTransport::default());
        let response = fetcher.get(&format!("{base}/hello")).await.unwrap();
        response.array_buffer().await.unwrap();

        assert_eq!(response.try_clone().unwrap_err().message(), CLONE_USED);
    }

    #[tokio::test]
    async fn test_redirect_is_reported() {
        let base = serve().await;
        let fetcher = Fetcher::new(ReqwestTransport::default());

        let direct = fetcher.get(&format!("{base}/hello")).await.unwrap();
        assert!(!direct.redirected());

        let moved = fetcher.get(&format!("{base}/moved")).await.unwrap();
        assert!(moved.redirected());
        assert_eq!(moved.status(), 200);
        assert_eq!(moved.url(), format!("{base}/hello"));
        assert_eq!(moved.text().await.unwrap(), "hello world");
    }

    #[tokio::test]
    async fn test_no_content_has_no_body() {
        let base = serve().await;
        let fetcher = Fetcher::new(ReqwestTransport::default());
        let response = fetcher.get(&format!("{base}/empty")).await.unwrap();

        assert_eq!(response.status(), 204);
        assert_eq!(response.status_text(), "No Content");
        assert!(response.body().is_none());
        assert!(!response.body_used());
    }
}
