//! Filesystem discovery of filter files.
//!
//! `FilterDirectoryPoller` periodically lists the configured directories and hands every file
//! with the configured suffix to [`FilterLoader::load_from_file`]. The loader's timestamp
//! check turns unchanged files into cheap no-ops, so rescanning is always safe. When watching
//! is enabled, filesystem events trigger an immediate rescan in addition to the interval.
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use eyre::{Result, WrapErr};
use notify::{RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};
use tracing::{Instrument, debug, error, info, warn};

use crate::{
    config::models::EngineConfig,
    core::{filter_file::FilterFile, loader::FilterLoader},
    tracing_setup::create_scan_span,
};

/// Summary of one pass over the filter directories.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    /// Files matching the suffix
    pub scanned: usize,
    /// Files compiled and registered during this pass
    pub registered: usize,
    /// Files that failed to stat, compile or instantiate
    pub failed: usize,
    /// Directories that could not be listed
    pub failed_directories: usize,
}

impl ScanReport {
    fn merge(&mut self, other: ScanReport) {
        self.scanned += other.scanned;
        self.registered += other.registered;
        self.failed += other.failed;
        self.failed_directories += other.failed_directories;
    }
}

/// Feeds filter files from disk into a [`FilterLoader`].
pub struct FilterDirectoryPoller {
    loader: Arc<FilterLoader>,
    directories: Vec<PathBuf>,
    suffix: String,
    poll_interval: Duration,
    watch: bool,
}

impl FilterDirectoryPoller {
    pub fn new(
        loader: Arc<FilterLoader>,
        directories: Vec<PathBuf>,
        suffix: impl Into<String>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            loader,
            directories,
            suffix: suffix.into(),
            poll_interval,
            watch: false,
        }
    }

    /// Build a poller from the `directories` section of the engine configuration.
    pub fn from_config(loader: Arc<FilterLoader>, config: &EngineConfig) -> Result<Self> {
        let poll_interval = config.poll_interval().wrap_err_with(|| {
            format!(
                "Invalid poll interval '{}'",
                config.directories.poll_interval
            )
        })?;
        let directories = config.directories.paths.iter().map(PathBuf::from).collect();
        Ok(Self::new(
            loader,
            directories,
            config.directories.suffix.clone(),
            poll_interval,
        )
        .with_watch(config.directories.watch))
    }

    /// Enable or disable rescans triggered by filesystem events.
    pub fn with_watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    /// Scan every directory once. A directory that cannot be listed is logged and counted in
    /// [`ScanReport::failed_directories`]; the remaining directories are still scanned.
    pub async fn scan_once(&self) -> ScanReport {
        let mut report = ScanReport::default();
        for directory in &self.directories {
            let span = create_scan_span(&directory.display().to_string());
            let directory_report = match self
                .scan_directory(directory)
                .instrument(span.clone())
                .await
                .wrap_err_with(|| format!("Failed to scan {}", directory.display()))
            {
                Ok(directory_report) => directory_report,
                Err(e) => {
                    error!("{:#}", e);
                    ScanReport {
                        failed_directories: 1,
                        ..ScanReport::default()
                    }
                }
            };
            span.record("registered", directory_report.registered);
            span.record("failed", directory_report.failed);
            report.merge(directory_report);
        }

        if report.registered > 0 {
            info!(
                registered = report.registered,
                total = self.loader.total_filter_count(),
                "Loaded new or changed filters"
            );
        }
        if report.failed > 0 || report.failed_directories > 0 {
            warn!(
                failed = report.failed,
                failed_directories = report.failed_directories,
                "Filter scan finished with failures"
            );
        }
        report
    }

    async fn scan_directory(&self, directory: &Path) -> Result<ScanReport> {
        let mut report = ScanReport::default();
        let mut entries = tokio::fs::read_dir(directory).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !self.matches_suffix(&path) {
                continue;
            }
            match entry.file_type().await {
                Ok(file_type) if file_type.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read file type");
                    report.scanned += 1;
                    report.failed += 1;
                    continue;
                }
            }
            report.scanned += 1;

            let file = match FilterFile::open(&path) {
                Ok(file) => file,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to stat filter file");
                    report.failed += 1;
                    continue;
                }
            };

            match self.loader.load_from_file(&file).await {
                Ok(true) => report.registered += 1,
                Ok(false) => {}
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Failed to load filter");
                    report.failed += 1;
                }
            }
        }

        debug!(
            directory = %directory.display(),
            scanned = report.scanned,
            "Scanned filter directory"
        );
        Ok(report)
    }

    fn matches_suffix(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(&self.suffix))
    }

    /// Scan on every interval tick (and on filesystem events when watching) until `shutdown`
    /// fires. Failed files and directories are retried on the next tick.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        let (event_tx, mut event_rx) = mpsc::channel(1);
        let _watcher = if self.watch {
            Some(self.init_watcher(event_tx)?)
        } else {
            None
        };

        let mut interval = tokio::time::interval(self.poll_interval);
        info!(
            directories = self.directories.len(),
            interval = ?self.poll_interval,
            watch = self.watch,
            "Filter directory poller started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                Some(()) = event_rx.recv() => {
                    debug!("Filter directory changed");
                }
                _ = shutdown.recv() => {
                    info!("Filter directory poller stopping");
                    return Ok(());
                }
            }

            let report = self.scan_once().await;
            debug!(
                scanned = report.scanned,
                registered = report.registered,
                "Filter directory scan complete"
            );
        }
    }

    fn init_watcher(&self, tx: mpsc::Sender<()>) -> Result<notify::RecommendedWatcher> {
        let suffix = self.suffix.clone();
        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                match res {
                    Ok(event) => {
                        if (event.kind.is_modify()
                            || event.kind.is_create()
                            || event.kind.is_remove())
                            && event.paths.iter().any(|p| {
                                p.file_name()
                                    .and_then(|name| name.to_str())
                                    .is_some_and(|name| name.ends_with(&suffix))
                            })
                        {
                            // Channel full means a rescan is already pending
                            let _ = tx.try_send(());
                        }
                    }
                    Err(e) => error!("Filter watch error: {:?}", e),
                }
            })?;

        for directory in &self.directories {
            watcher
                .watch(directory, RecursiveMode::NonRecursive)
                .wrap_err_with(|| format!("Failed to watch {}", directory.display()))?;
        }
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        time::{Duration, SystemTime},
    };

    use tempfile::TempDir;

    use super::*;
    use crate::{
        adapters::{
            memory_store::InMemoryFilterStore,
            native_compiler::{DefaultFilterFactory, FilterBlueprint, NativeFilterCompiler},
        },
        core::{filter::Filter, result::FilterPayload},
    };

    struct Header;

    impl Filter for Header {
        fn filter_type(&self) -> &str {
            "post"
        }

        fn filter_order(&self) -> i32 {
            10
        }

        fn should_run(&self) -> bool {
            true
        }

        fn run(&self) -> eyre::Result<FilterPayload> {
            Ok(Box::new("x-zuul: true"))
        }
    }

    fn loader() -> Arc<FilterLoader> {
        let compiler = NativeFilterCompiler::new()
            .with(FilterBlueprint::new("Header", || Header))
            .with(FilterBlueprint::abstract_definition("Base"));
        Arc::new(FilterLoader::new(
            Arc::new(compiler),
            Arc::new(DefaultFilterFactory),
            Arc::new(InMemoryFilterStore::new()),
        ))
    }

    fn poller(loader: Arc<FilterLoader>, dir: &TempDir) -> FilterDirectoryPoller {
        FilterDirectoryPoller::new(
            loader,
            vec![dir.path().to_path_buf()],
            ".filter",
            Duration::from_millis(20),
        )
    }

    #[tokio::test]
    async fn test_scan_registers_matching_files_once() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Header.filter"), "post").unwrap();
        fs::write(dir.path().join("Base.filter"), "abstract").unwrap();
        fs::write(dir.path().join("README.md"), "ignored").unwrap();
        let loader = loader();
        let poller = poller(loader.clone(), &dir);

        let first = poller.scan_once().await;
        assert_eq!(
            first,
            ScanReport {
                scanned: 2,
                registered: 1,
                failed: 0,
                failed_directories: 0,
            }
        );
        assert_eq!(loader.filters_by_type("post").await.len(), 1);

        let second = poller.scan_once().await;
        assert_eq!(second.registered, 0);
        assert_eq!(loader.total_filter_count(), 1);
    }

    #[tokio::test]
    async fn test_modified_file_is_reloaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Header.filter");
        fs::write(&path, "post").unwrap();
        let loader = loader();
        let poller = poller(loader.clone(), &dir);
        poller.scan_once().await;
        let before = loader.filters_by_type("post").await[0].clone();

        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(60))
            .unwrap();

        let report = poller.scan_once().await;
        assert_eq!(report.registered, 1);
        let after = loader.filters_by_type("post").await[0].clone();
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[tokio::test]
    async fn test_unknown_filter_counts_as_failure() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Mystery.filter"), "").unwrap();
        let poller = poller(loader(), &dir);

        let report = poller.scan_once().await;
        assert_eq!(report.failed, 1);
        assert_eq!(report.registered, 0);
    }

    #[tokio::test]
    async fn test_missing_directory_is_counted() {
        let poller = FilterDirectoryPoller::new(
            loader(),
            vec![PathBuf::from("/definitely/not/here")],
            ".filter",
            Duration::from_secs(1),
        );
        let report = poller.scan_once().await;
        assert_eq!(report.failed_directories, 1);
        assert_eq!(report.scanned, 0);
    }

    #[tokio::test]
    async fn test_missing_directory_does_not_skip_later_ones() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Header.filter"), "post").unwrap();
        let loader = loader();
        let poller = FilterDirectoryPoller::new(
            loader.clone(),
            vec![
                PathBuf::from("/definitely/not/here"),
                dir.path().to_path_buf(),
            ],
            ".filter",
            Duration::from_secs(1),
        );

        let report = poller.scan_once().await;
        assert_eq!(report.failed_directories, 1);
        assert_eq!(report.registered, 1);
        assert_eq!(loader.filters_by_type("post").await.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_file_does_not_abort_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Mystery.filter"), "").unwrap();
        fs::write(dir.path().join("Header.filter"), "post").unwrap();
        fs::create_dir(dir.path().join("nested.filter")).unwrap();
        let loader = loader();
        let poller = poller(loader.clone(), &dir);

        let report = poller.scan_once().await;
        assert_eq!(report.scanned, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.registered, 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Header.filter"), "post").unwrap();
        let loader = loader();
        let poller = Arc::new(poller(loader.clone(), &dir));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let task = {
            let poller = poller.clone();
            tokio::spawn(async move { poller.run(shutdown_rx).await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown_tx.send(()).unwrap();
        task.await.unwrap().unwrap();

        assert_eq!(loader.total_filter_count(), 1);
    }
}
