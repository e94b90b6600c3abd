use std::{
    thread,
    time::{Duration, Instant},
};

use rand::{rngs::StdRng, seq::SliceRandom as _};
use reqwest::{
    blocking::Client,
    header::{self, HeaderMap, HeaderValue},
    StatusCode,
};
use thiserror::Error;
use url::Url;

use crate::config::ScraperSettings;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{url} responded with {status}")]
    Status { url: Url, status: StatusCode },
}

/// Something that can load the HTML of a results page.
pub trait PageFetcher {
    fn fetch(&mut self, url: &Url) -> Result<String, FetchError>;
}

impl<F: PageFetcher + ?Sized> PageFetcher for &mut F {
    fn fetch(&mut self, url: &Url) -> Result<String, FetchError> {
        (**self).fetch(url)
    }
}

/// Enforces a minimum interval between consecutive requests by sleeping the calling thread.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    pub fn wait(&mut self) {
        if let Some(last_request) = self.last_request {
            let elapsed = last_request.elapsed();
            if elapsed < self.min_interval {
                thread::sleep(self.min_interval - elapsed);
            }
        }
        self.last_request = Some(Instant::now());
    }
}

/// A blocking HTTP fetcher that throttles itself and varies its browser fingerprint.
pub struct HttpFetcher {
    client: Client,
    throttle: Throttle,
    user_agents: Vec<String>,
    referer: Option<HeaderValue>,
    rng: StdRng,
}

impl HttpFetcher {
    pub fn new(settings: &ScraperSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .timeout(settings.request_timeout())
            .build()?;
        let referer = HeaderValue::from_str(&settings.referer).ok();
        if referer.is_none() {
            log::warn!("Ignoring invalid referer: {:?}", settings.referer);
        }

        Ok(Self {
            client,
            throttle: Throttle::new(settings.min_request_interval()),
            user_agents: settings.user_agents.clone(),
            referer,
            rng: settings.rng(),
        })
    }

    fn headers(&mut self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(user_agent) = self
            .user_agents
            .choose(&mut self.rng)
            .and_then(|x| HeaderValue::from_str(x).ok())
        {
            headers.insert(header::USER_AGENT, user_agent);
        }
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.5"),
        );
        if let Some(referer) = &self.referer {
            headers.insert(header::REFERER, referer.clone());
        }
        headers.insert(header::DNT, HeaderValue::from_static("1"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(
            header::UPGRADE_INSECURE_REQUESTS,
            HeaderValue::from_static("1"),
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        headers
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&mut self, url: &Url) -> Result<String, FetchError> {
        self.throttle.wait();
        log::debug!("GET {}", url);

        let headers = self.headers();
        let response = self.client.get(url.clone()).headers(headers).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status,
            });
        }

        Ok(response.text()?)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Read as _, Write as _},
        net::{SocketAddr, TcpListener, TcpStream},
        thread::JoinHandle,
    };

    use super::*;

    fn settings() -> ScraperSettings {
        ScraperSettings {
            min_request_interval_ms: 0,
            request_timeout_secs: 5,
            seed: Some(1),
            ..Default::default()
        }
    }

    /// Answers every request with `response` until asked for `/stop`, then returns how many
    /// requests it answered.
    fn serve(response: &'static str) -> (SocketAddr, JoinHandle<usize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let mut count = 0;
            for stream in listener.incoming() {
                let mut stream = stream.unwrap();
                let mut request = vec![];
                let mut buf = [0; 1024];
                while !request.windows(4).any(|x| x == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                if request.starts_with(b"GET /stop") {
                    break;
                }
                count += 1;
                stream.write_all(response.as_bytes()).unwrap();
            }
            count
        });
        (addr, server)
    }

    fn stop(addr: SocketAddr, server: JoinHandle<usize>) -> usize {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(b"GET /stop HTTP/1.1\r\n\r\n").unwrap();
        server.join().unwrap()
    }

    fn url(addr: SocketAddr) -> Url {
        Url::parse(&format!("http://{addr}/jobs?q=data")).unwrap()
    }

    #[test]
    fn fetches_the_page_body() {
        let (addr, server) = serve(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 13\r\nConnection: close\r\n\r\n<html></html>",
        );
        let mut fetcher = HttpFetcher::new(&settings()).unwrap();
        let body = fetcher.fetch(&url(addr)).unwrap();
        assert_eq!(body, "<html></html>");
        assert_eq!(stop(addr, server), 1);
    }

    #[test]
    fn error_statuses_fail_without_retrying() {
        let (addr, server) = serve(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let mut fetcher = HttpFetcher::new(&settings()).unwrap();
        let result = fetcher.fetch(&url(addr));
        assert!(
            matches!(
                &result,
                Err(FetchError::Status { status, .. }) if *status == StatusCode::SERVICE_UNAVAILABLE,
            ),
            "{result:?}",
        );
        assert_eq!(stop(addr, server), 1);
    }

    #[test]
    fn refused_connections_are_transport_errors() {
        let addr = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let mut fetcher = HttpFetcher::new(&settings()).unwrap();
        let result = fetcher.fetch(&url(addr));
        assert!(matches!(result, Err(FetchError::Transport(_))), "{result:?}");
    }

    #[test]
    fn throttle_spaces_out_requests() {
        let mut throttle = Throttle::new(Duration::from_millis(60));

        let start = Instant::now();
        throttle.wait();
        assert!(start.elapsed() < Duration::from_millis(60));

        throttle.wait();
        throttle.wait();
        assert!(start.elapsed() >= Duration::from_millis(120));
    }

    #[test]
    fn throttle_does_not_delay_after_a_long_gap() {
        let mut throttle = Throttle::new(Duration::from_millis(20));
        throttle.wait();
        thread::sleep(Duration::from_millis(40));

        let start = Instant::now();
        throttle.wait();
        assert!(start.elapsed() < Duration::from_millis(20));
    }

    #[test]
    fn headers_look_like_a_browser() {
        let settings = ScraperSettings {
            seed: Some(1),
            ..Default::default()
        };
        let mut fetcher = HttpFetcher::new(&settings).unwrap();
        let headers = fetcher.headers();

        let user_agent = headers[header::USER_AGENT].to_str().unwrap();
        assert!(settings.user_agents.iter().any(|x| x == user_agent));
        assert_eq!(headers[header::DNT], "1");
        assert_eq!(headers[header::REFERER], settings.referer.as_str());
        assert!(headers.contains_key(header::ACCEPT));
        assert!(headers.contains_key(header::ACCEPT_LANGUAGE));
    }
}
