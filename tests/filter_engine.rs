// End-to-end behaviour of the loader, runtime and processor wired with the default adapters
#[cfg(test)]
mod test {
    use std::{
        sync::Arc,
        time::{Duration, SystemTime},
    };

    use zuul_filters::{
        adapters::{
            DefaultFilterFactory, FilterBlueprint, InMemoryFilterStore, InMemoryPropertySource,
            MetricsUsageNotifier, NativeFilterCompiler, NoopTracer,
        },
        core::{
            ExecutionStatus, Filter, FilterFile, FilterLoader, FilterPayload, FilterProcessor,
            FilterRuntime,
        },
    };

    struct AuthFilter;

    impl Filter for AuthFilter {
        fn filter_type(&self) -> &str {
            "pre"
        }

        fn filter_order(&self) -> i32 {
            5
        }

        fn should_run(&self) -> bool {
            true
        }

        fn run(&self) -> eyre::Result<FilterPayload> {
            Ok(Box::new("authenticated"))
        }
    }

    struct DecodeFilter;

    impl Filter for DecodeFilter {
        fn filter_type(&self) -> &str {
            "pre"
        }

        fn filter_order(&self) -> i32 {
            1
        }

        fn should_run(&self) -> bool {
            true
        }

        fn run(&self) -> eyre::Result<FilterPayload> {
            eyre::bail!("malformed request body")
        }
    }

    struct Engine {
        loader: Arc<FilterLoader>,
        properties: Arc<InMemoryPropertySource>,
        notifier: Arc<MetricsUsageNotifier>,
        processor: FilterProcessor,
    }

    fn engine() -> Engine {
        let compiler = NativeFilterCompiler::new()
            .with(FilterBlueprint::new("AuthFilter", || AuthFilter))
            .with(FilterBlueprint::new("DecodeFilter", || DecodeFilter));
        let loader = Arc::new(FilterLoader::new(
            Arc::new(compiler),
            Arc::new(DefaultFilterFactory),
            Arc::new(InMemoryFilterStore::new()),
        ));
        let properties = Arc::new(InMemoryPropertySource::new());
        let notifier = Arc::new(MetricsUsageNotifier::new());
        let processor = FilterProcessor::new(
            loader.clone(),
            FilterRuntime::new(properties.clone(), Arc::new(NoopTracer)),
            notifier.clone(),
        );
        Engine {
            loader,
            properties,
            notifier,
            processor,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_pre_chain_runs_in_order_and_isolates_failures() {
        let engine = engine();
        let t1 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let auth = FilterFile::new("/etc/zuul/pre/AuthFilter.filter", t1);
        let decode = FilterFile::new("/etc/zuul/pre/DecodeFilter.filter", t1);

        assert!(engine.loader.load_from_file(&auth).await.unwrap());
        assert!(engine.loader.load_from_file(&decode).await.unwrap());
        assert!(!engine.loader.load_from_file(&auth).await.unwrap());

        let report = engine.processor.run_filters("pre").await;
        let statuses: Vec<(i32, ExecutionStatus)> = report
            .executions()
            .iter()
            .map(|execution| (execution.filter.filter_order(), execution.result.status()))
            .collect();

        assert_eq!(
            statuses,
            vec![(1, ExecutionStatus::Failed), (5, ExecutionStatus::Success)]
        );
        let failure = report.failures().next().unwrap();
        assert_eq!(
            failure.result.error().unwrap().to_string(),
            "malformed request body"
        );
        assert_eq!(engine.notifier.grand_total(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_disable_property_switches_filter_off_live() {
        let engine = engine();
        let auth = FilterFile::new("/etc/zuul/pre/AuthFilter.filter", SystemTime::UNIX_EPOCH);
        engine.loader.load_from_file(&auth).await.unwrap();
        let filter = engine.loader.filters_by_type("pre").await[0].clone();
        assert_eq!(
            filter.disable_property_key(),
            "zuul.AuthFilter.pre.disable"
        );

        engine.properties.set("zuul.AuthFilter.pre.disable", true);
        assert_eq!(
            engine.processor.run_filter(&filter).status(),
            ExecutionStatus::Disabled
        );

        engine.properties.set("zuul.AuthFilter.pre.disable", false);
        assert!(engine.processor.run_filter(&filter).is_success());
        assert_eq!(engine.notifier.total(ExecutionStatus::Disabled), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_touched_file_replaces_instance() {
        let engine = engine();
        let t1 = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        let t2 = t1 + Duration::from_secs(1);

        let original = FilterFile::new("/etc/zuul/pre/AuthFilter.filter", t1);
        assert!(engine.loader.load_from_file(&original).await.unwrap());
        let before = engine.loader.filters_by_type("pre").await;

        let touched = FilterFile::new("/etc/zuul/pre/AuthFilter.filter", t2);
        assert!(engine.loader.load_from_file(&touched).await.unwrap());
        let after = engine.loader.filters_by_type("pre").await;

        assert_eq!(engine.loader.total_filter_count(), 1);
        assert_eq!(after.len(), 1);
        assert!(!Arc::ptr_eq(&before[0], &after[0]));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_source_load_requires_explicit_registration() {
        let engine = engine();

        let filter = engine
            .loader
            .load_from_source("// auth", "AuthFilter")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(engine.loader.total_filter_count(), 0);
        assert!(engine.loader.filters_by_type("pre").await.is_empty());

        engine.loader.register_filter("AuthFilter", filter).await;
        assert_eq!(engine.loader.filters_by_type("pre").await.len(), 1);
    }
}
