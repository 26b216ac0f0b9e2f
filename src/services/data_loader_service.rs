use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info};

use crate::api_client::{parse_members, MembersClient};
use crate::config::config::Config;
use crate::data::record::Record;

/// Where the member list comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Url(String),
    File(PathBuf),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{}", url),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Records plus some facts about how they were obtained
#[derive(Debug)]
pub struct DataLoadResult {
    pub records: Vec<Record>,
    pub source: DataSource,
    pub load_time: Duration,
}

/// Loads the member list once, from the network or a local file
pub struct DataLoaderService {
    timeout: Option<Duration>,
}

impl DataLoaderService {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.source.timeout_secs.map(Duration::from_secs))
    }

    pub fn load(&self, source: &DataSource) -> Result<DataLoadResult> {
        let start = Instant::now();
        let records = match source {
            DataSource::Url(url) => self.client(url)?.fetch_members()?,
            DataSource::File(path) => Self::load_file(path)?,
        };

        let load_time = start.elapsed();
        info!(
            target: "fetch",
            "Loaded {} members from {} in {:?}",
            records.len(),
            source,
            load_time
        );

        Ok(DataLoadResult {
            records,
            source: source.clone(),
            load_time,
        })
    }

    /// Run `load` on a worker thread; the single result arrives on the channel
    pub fn spawn_load(self, source: DataSource) -> Receiver<Result<DataLoadResult>> {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = self.load(&source);
            if let Err(e) = &result {
                error!(target: "fetch", "Error fetching data from {}: {:#}", source, e);
            }
            // receiver gone means the UI already quit
            let _ = tx.send(result);
        });
        rx
    }

    fn client(&self, url: &str) -> Result<MembersClient> {
        match self.timeout {
            Some(timeout) => MembersClient::with_timeout(url, timeout),
            None => Ok(MembersClient::new(url)),
        }
    }

    fn load_file(path: &Path) -> Result<Vec<Record>> {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        parse_members(&body).with_context(|| format!("loading {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id":"1","name":"A"}},{{"id":"2","name":"B"}}]"#).unwrap();

        let result = DataLoaderService::new(None)
            .load(&DataSource::File(file.path().to_path_buf()))
            .unwrap();
        assert_eq!(result.records.len(), 2);
    }

    #[test]
    fn test_spawn_load_reports_missing_file() {
        let rx = DataLoaderService::new(None)
            .spawn_load(DataSource::File(PathBuf::from("/definitely/not/here.json")));
        let result = rx.recv().unwrap();
        assert!(result.is_err());
    }
}
