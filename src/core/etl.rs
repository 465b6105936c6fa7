use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Wall-clock duration of each phase of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PhaseTimings {
    #[serde(with = "crate::utils::duration_ms")]
    pub extract: Duration,
    #[serde(with = "crate::utils::duration_ms")]
    pub transform: Duration,
    #[serde(with = "crate::utils::duration_ms")]
    pub load: Duration,
    #[serde(with = "crate::utils::duration_ms")]
    pub total: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport<L> {
    pub loaded: L,
    pub timings: PhaseTimings,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Runs extract, transform and load strictly in sequence. The first
    /// failing phase ends the run and its error is returned unchanged.
    pub async fn run(&self) -> Result<RunReport<P::Loaded>> {
        tracing::info!("Starting ETL process");
        self.monitor.log_stats("Start");
        let run_started = Instant::now();
        let mut timings = PhaseTimings::default();

        tracing::info!("Extracting data...");
        let phase = Instant::now();
        let extracted = self.pipeline.extract().await?;
        timings.extract = phase.elapsed();
        tracing::info!("Extraction phase took {:?}", timings.extract);
        self.monitor.log_stats("Extract");

        tracing::info!("Transforming data...");
        let phase = Instant::now();
        let transformed = self.pipeline.transform(extracted).await?;
        timings.transform = phase.elapsed();
        tracing::info!("Transformation phase took {:?}", timings.transform);
        self.monitor.log_stats("Transform");

        tracing::info!("Loading data...");
        let phase = Instant::now();
        let loaded = self.pipeline.load(transformed).await?;
        timings.load = phase.elapsed();
        tracing::info!("Load phase took {:?}", timings.load);
        self.monitor.log_stats("Load");

        timings.total = run_started.elapsed();
        tracing::info!("✅ ETL process finished in {:?}", timings.total);
        self.monitor.log_final_stats();

        Ok(RunReport { loaded, timings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPipeline {
        calls: Mutex<Vec<&'static str>>,
        fail_transform: bool,
    }

    impl RecordingPipeline {
        fn record(&self, phase: &'static str) {
            self.calls.lock().unwrap().push(phase);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for RecordingPipeline {
        type Extracted = Vec<i64>;
        type Transformed = Vec<i64>;
        type Loaded = usize;

        async fn extract(&self) -> Result<Vec<i64>> {
            self.record("extract");
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(vec![1, 2, 3, 4])
        }

        async fn transform(&self, data: Vec<i64>) -> Result<Vec<i64>> {
            self.record("transform");
            if self.fail_transform {
                return Err(EtlError::ConfigError {
                    message: "transform rejected".to_string(),
                });
            }
            Ok(data.into_iter().filter(|n| n % 2 == 0).collect())
        }

        async fn load(&self, data: Vec<i64>) -> Result<usize> {
            self.record("load");
            Ok(data.len())
        }
    }

    #[tokio::test]
    async fn test_phases_run_in_order_and_are_timed() {
        let engine = EtlEngine::new(RecordingPipeline::default());

        let report = engine.run().await.unwrap();

        assert_eq!(report.loaded, 2);
        assert_eq!(engine.pipeline().calls(), vec!["extract", "transform", "load"]);
        assert!(report.timings.extract >= Duration::from_millis(5));
        assert!(
            report.timings.total
                >= report.timings.extract + report.timings.transform + report.timings.load
        );
    }

    #[tokio::test]
    async fn test_failed_phase_stops_the_run() {
        let engine = EtlEngine::new(RecordingPipeline {
            fail_transform: true,
            ..Default::default()
        });

        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, EtlError::ConfigError { .. }));
        assert_eq!(engine.pipeline().calls(), vec!["extract", "transform"]);
    }

    #[test]
    fn test_timings_serialize_as_milliseconds() {
        let timings = PhaseTimings {
            extract: Duration::from_millis(1500),
            transform: Duration::from_millis(20),
            load: Duration::from_secs(3),
            total: Duration::from_millis(4521),
        };

        let json = serde_json::to_value(timings).unwrap();

        assert_eq!(json["extract"], 1500);
        assert_eq!(json["load"], 3000);
        assert_eq!(json["total"], 4521);
    }
}
