use futures::future::join_all;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::SourceError;
use crate::models::Observation;
use crate::sources::ObservationSource;

#[derive(Debug, Default)]
pub struct CollectorStats {
    pub total_requests: AtomicU64,
    pub successful: AtomicU64,
    pub failed: AtomicU64,
    pub observations_collected: AtomicU64,
}

/// Result of one pass over every source.
#[derive(Debug, Default)]
pub struct Collection {
    pub observations: Vec<Observation>,
    pub successful: usize,
    pub failed: Vec<&'static str>,
}

/// Fans out to every source concurrently. A source that errors or times out
/// contributes nothing; the rest of the batch is kept.
pub struct ObservationCollector {
    sources: Vec<Arc<dyn ObservationSource>>,
    timeout: Duration,
    stats: CollectorStats,
}

impl ObservationCollector {
    pub fn new(sources: Vec<Arc<dyn ObservationSource>>, timeout: Duration) -> Self {
        Self {
            sources,
            timeout,
            stats: CollectorStats::default(),
        }
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub async fn collect_all(&self) -> Collection {
        let fetches = self.sources.iter().map(|source| {
            let source = source.clone();
            let timeout = self.timeout;
            async move {
                let result = match tokio::time::timeout(timeout, source.fetch_observations()).await {
                    Ok(result) => result,
                    Err(_) => Err(SourceError::Timeout(timeout.as_secs())),
                };
                (source.name(), result)
            }
        });

        let mut collection = Collection::default();

        // join_all keeps source order, so the batch order is stable
        for (name, result) in join_all(fetches).await {
            self.stats.total_requests.fetch_add(1, Ordering::Relaxed);
            match result {
                Ok(observations) => {
                    tracing::debug!("Source {} returned {} observations", name, observations.len());
                    self.stats.successful.fetch_add(1, Ordering::Relaxed);
                    self.stats
                        .observations_collected
                        .fetch_add(observations.len() as u64, Ordering::Relaxed);
                    collection.successful += 1;
                    collection.observations.extend(observations);
                }
                Err(e) => {
                    tracing::warn!("Source {} unavailable: {}", name, e);
                    self.stats.failed.fetch_add(1, Ordering::Relaxed);
                    collection.failed.push(name);
                }
            }
        }

        collection
    }

    pub fn get_stats(&self) -> &CollectorStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceResult;
    use crate::models::{GasPrice, Observation};
    use async_trait::async_trait;

    struct Fixed(Vec<Observation>);
    struct Broken;
    struct Slow;

    #[async_trait]
    impl ObservationSource for Fixed {
        fn name(&self) -> &'static str { "fixed" }
        async fn fetch_observations(&self) -> SourceResult<Vec<Observation>> {
            Ok(self.0.clone())
        }
    }

    #[async_trait]
    impl ObservationSource for Broken {
        fn name(&self) -> &'static str { "broken" }
        async fn fetch_observations(&self) -> SourceResult<Vec<Observation>> {
            Err(SourceError::Network("connection refused".to_string()))
        }
    }

    #[async_trait]
    impl ObservationSource for Slow {
        fn name(&self) -> &'static str { "slow" }
        async fn fetch_observations(&self) -> SourceResult<Vec<Observation>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![])
        }
    }

    fn gas(gwei: f64) -> Observation {
        Observation::GasPrice(GasPrice { chain: "Ethereum".to_string(), gwei })
    }

    #[tokio::test]
    async fn test_failed_sources_do_not_drop_batch() {
        let sources: Vec<Arc<dyn ObservationSource>> = vec![
            Arc::new(Broken),
            Arc::new(Fixed(vec![gas(10.0), gas(90.0)])),
            Arc::new(Slow),
        ];
        let collector = ObservationCollector::new(sources, Duration::from_millis(100));

        let collection = collector.collect_all().await;

        assert_eq!(collection.observations.len(), 2);
        assert_eq!(collection.successful, 1);
        assert_eq!(collection.failed, vec!["broken", "slow"]);

        let stats = collector.get_stats();
        assert_eq!(stats.total_requests.load(Ordering::Relaxed), 3);
        assert_eq!(stats.failed.load(Ordering::Relaxed), 2);
        assert_eq!(stats.observations_collected.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_no_sources_is_empty_batch() {
        let collector = ObservationCollector::new(vec![], Duration::from_secs(1));
        let collection = collector.collect_all().await;
        assert!(collection.observations.is_empty());
        assert!(collection.failed.is_empty());
    }
}
