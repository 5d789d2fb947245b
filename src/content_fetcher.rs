use crate::log_util::log_debug;
use color_eyre::eyre::{Context, Result, eyre};
use reqwest::Client;
use std::{
    path::{Path, PathBuf},
    sync::mpsc::Sender,
    thread,
};
use tokio::runtime::Runtime;

/// Where a relative resource name is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRoot {
    Directory(PathBuf),
    Remote(String),
}

impl ContentRoot {
    pub fn parse(root: &str) -> Self {
        let trimmed = root.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Remote(trimmed.trim_end_matches('/').to_string())
        } else {
            Self::Directory(PathBuf::from(trimmed))
        }
    }

    /// Human-readable location of `relative` under this root.
    pub fn locate(&self, relative: &str) -> String {
        let relative = relative.trim_start_matches("./");
        match self {
            Self::Directory(dir) => dir.join(relative).display().to_string(),
            Self::Remote(base) => format!("{}/{}", base, relative.trim_start_matches('/')),
        }
    }
}

/// Fetches catalog and table documents from disk or over HTTP.
#[derive(Debug, Clone)]
pub struct ContentFetcher {
    client: Client,
    root: ContentRoot,
}

impl ContentFetcher {
    pub fn new(root: &str) -> Self {
        Self {
            client: Client::new(),
            root: ContentRoot::parse(root),
        }
    }

    pub fn root(&self) -> &ContentRoot {
        &self.root
    }

    /// Fetch `relative` as text. A single attempt, no retries.
    pub async fn fetch_text(&self, relative: &str) -> Result<String> {
        let location = self.root.locate(relative);
        log_debug(&format!("ContentFetcher: fetching {}", location));
        match &self.root {
            ContentRoot::Directory(_) => read_local(Path::new(&location)).await,
            ContentRoot::Remote(_) => self.read_remote(&location).await,
        }
    }

    async fn read_remote(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .wrap_err_with(|| format!("failed to request {}", url))?;

        log_debug(&format!("ContentFetcher: {} returned {}", url, response.status()));
        if !response.status().is_success() {
            return Err(eyre!("{} returned {}", url, response.status()));
        }

        response
            .text()
            .await
            .wrap_err_with(|| format!("failed to read body of {}", url))
    }
}

async fn read_local(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .wrap_err_with(|| format!("failed to read {}", path.display()))
}

/// Messages delivered from background fetches to the event loop.
#[derive(Debug)]
pub enum FetchMessage {
    /// `generation` identifies the catalog request, so superseded responses can be dropped.
    Catalog {
        generation: u64,
        result: Result<String, String>,
    },
    Table {
        request: TableRequest,
        result: Result<String, String>,
    },
}

/// A table fetch tagged with the navigation path that asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRequest {
    pub path: Vec<String>,
    pub file: String,
}

/// Fetch the catalog on a background thread and report through `sender`.
pub fn spawn_catalog_fetch(
    fetcher: ContentFetcher,
    catalog_file: String,
    generation: u64,
    sender: Sender<FetchMessage>,
) {
    spawn_fetch(
        fetcher,
        catalog_file,
        move |result| FetchMessage::Catalog { generation, result },
        sender,
    );
}

pub fn spawn_table_fetch(
    fetcher: ContentFetcher,
    request: TableRequest,
    sender: Sender<FetchMessage>,
) {
    let file = request.file.clone();
    spawn_fetch(
        fetcher,
        file,
        move |result| FetchMessage::Table { request, result },
        sender,
    );
}

fn spawn_fetch<F>(
    fetcher: ContentFetcher,
    relative: String,
    wrap: F,
    sender: Sender<FetchMessage>,
) where
    F: FnOnce(Result<String, String>) -> FetchMessage + Send + 'static,
{
    thread::spawn(move || {
        let runtime = match Runtime::new() {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = sender.send(wrap(Err(format!(
                    "Failed to build Tokio runtime: {}",
                    err
                ))));
                return;
            }
        };

        let result = runtime.block_on(fetcher.fetch_text(&relative));
        drop(runtime);

        let message = match result {
            Ok(text) => wrap(Ok(text)),
            Err(err) => {
                log_debug(&format!("ContentFetcher: {} failed: {:#}", relative, err));
                wrap(Err(format!("{:#}", err)))
            }
        };
        let _ = sender.send(message);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        fs,
        sync::mpsc,
        time::{Duration, SystemTime},
    };

    #[test]
    fn parses_directory_and_remote_roots() {
        assert_eq!(
            ContentRoot::parse("content"),
            ContentRoot::Directory(PathBuf::from("content"))
        );
        assert_eq!(
            ContentRoot::parse(" https://example.org/app/ "),
            ContentRoot::Remote("https://example.org/app".to_string())
        );
    }

    #[test]
    fn locates_relative_files() {
        let remote = ContentRoot::parse("https://example.org/app/");
        assert_eq!(
            remote.locate("./irregular_verbs.json"),
            "https://example.org/app/irregular_verbs.json"
        );
        let local = ContentRoot::parse("content");
        assert_eq!(
            local.locate("tree.json"),
            Path::new("content").join("tree.json").display().to_string()
        );
    }

    #[test]
    fn background_fetch_reads_local_files() {
        let unique = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("grammar-trail-fetch-{unique}"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("tree.json"), "{\"A\": {}}").unwrap();

        let fetcher = ContentFetcher::new(dir.to_str().unwrap());
        let (sender, receiver) = mpsc::channel();
        spawn_catalog_fetch(fetcher.clone(), "tree.json".to_string(), 3, sender.clone());
        match receiver.recv_timeout(Duration::from_secs(10)).unwrap() {
            FetchMessage::Catalog {
                generation: 3,
                result: Ok(text),
            } => assert_eq!(text, "{\"A\": {}}"),
            other => panic!("unexpected message {:?}", other),
        }

        let request = TableRequest {
            path: vec!["Verbs".to_string()],
            file: "missing.json".to_string(),
        };
        spawn_table_fetch(fetcher, request.clone(), sender);
        match receiver.recv_timeout(Duration::from_secs(10)).unwrap() {
            FetchMessage::Table {
                request: received,
                result: Err(_),
            } => assert_eq!(received, request),
            other => panic!("unexpected message {:?}", other),
        }

        fs::remove_dir_all(&dir).unwrap();
    }
}
