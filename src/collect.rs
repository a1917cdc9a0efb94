use std::future::Future;
use std::time;

use futures::future::BoxFuture;
use futures::prelude::*;

use crate::db;
use crate::model;
use crate::sensors;
use crate::util;

/// Destination of collected readings.
pub trait Sink {
    fn insert<'a>(
        &'a self,
        reading: &'a model::EnvironmentReading,
    ) -> BoxFuture<'a, Result<(), failure::Error>>;
}

impl Sink for db::TableStore {
    fn insert<'a>(
        &'a self,
        reading: &'a model::EnvironmentReading,
    ) -> BoxFuture<'a, Result<(), failure::Error>> {
        self.insert_reading(reading).err_into().boxed()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub stored: usize,
    pub failed: usize,
}

/// Periodically reads the sensor board and stores each reading.
pub struct Collector<E, S> {
    log: slog::Logger,
    environment: E,
    sink: S,
    period: time::Duration,
}

impl<E, S> Collector<E, S>
where
    E: sensors::Environment,
    S: Sink,
{
    pub fn new(log: slog::Logger, environment: E, sink: S, period: time::Duration) -> Self {
        Collector {
            log,
            environment,
            sink,
            period,
        }
    }

    /// Collects until `shutdown` resolves.
    ///
    /// A failed tick is logged and the next tick proceeds as usual.
    pub async fn run<F>(mut self, shutdown: F) -> Summary
    where
        F: Future<Output = ()>,
    {
        let mut summary = Summary::default();
        let ticks = util::every(self.log.clone(), "collect readings".to_owned(), self.period);

        futures::pin_mut!(ticks);
        futures::pin_mut!(shutdown);

        info!(self.log, "collector started"; "period" => ?self.period);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                Some(()) = ticks.next() => {
                    match self.collect_once().await {
                        Ok(()) => summary.stored += 1,
                        Err(e) => {
                            summary.failed += 1;
                            warn!(self.log, "collecting a reading failed, will retry next tick"; "error" => %e);
                        }
                    }
                }
            }
        }
        info!(self.log, "collector stopped"; "stored" => summary.stored, "failed" => summary.failed);

        summary
    }

    async fn collect_once(&mut self) -> Result<(), failure::Error> {
        let reading = self.environment.read_environment()?;
        debug!(self.log, "read environment";
               "temperature" => reading.temperature,
               "pressure" => reading.pressure,
               "humidity" => reading.humidity,
               "brightness" => reading.brightness);

        self.sink.insert(&reading).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync;

    struct FakeBoard {
        reads: usize,
        fail_on: Option<usize>,
    }

    impl sensors::Environment for FakeBoard {
        fn read_environment(&mut self) -> Result<model::EnvironmentReading, failure::Error> {
            self.reads += 1;
            if self.fail_on == Some(self.reads) {
                bail!("bus error");
            }
            Ok(model::EnvironmentReading {
                temperature: 20.0 + self.reads as f64,
                pressure: 1013.0,
                humidity: 45.0,
                brightness: 12.0,
                collected_at: chrono::Utc::now(),
            })
        }
    }

    #[derive(Clone, Default)]
    struct Recorder {
        rows: sync::Arc<sync::Mutex<Vec<model::EnvironmentReading>>>,
        reject_all: bool,
    }

    impl Sink for Recorder {
        fn insert<'a>(
            &'a self,
            reading: &'a model::EnvironmentReading,
        ) -> BoxFuture<'a, Result<(), failure::Error>> {
            let result = if self.reject_all {
                Err(failure::err_msg("store unavailable"))
            } else {
                self.rows.lock().unwrap().push(reading.clone());
                Ok(())
            };
            future::ready(result).boxed()
        }
    }

    fn discard() -> slog::Logger {
        slog::Logger::root(slog::Discard, o!())
    }

    fn collector(
        fail_on: Option<usize>,
        sink: Recorder,
    ) -> Collector<FakeBoard, Recorder> {
        Collector::new(
            discard(),
            FakeBoard { reads: 0, fail_on },
            sink,
            time::Duration::from_secs(60),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn collects_on_every_tick_until_shutdown() {
        let sink = Recorder::default();

        let summary = collector(None, sink.clone())
            .run(tokio::time::sleep(time::Duration::from_secs(150)))
            .await;

        assert_eq!(summary, Summary { stored: 3, failed: 0 });
        let temperatures = sink
            .rows
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.temperature)
            .collect::<Vec<_>>();
        assert_eq!(temperatures, vec![21.0, 22.0, 23.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn sensor_failure_skips_one_tick() {
        let sink = Recorder::default();

        let summary = collector(Some(2), sink.clone())
            .run(tokio::time::sleep(time::Duration::from_secs(150)))
            .await;

        assert_eq!(summary, Summary { stored: 2, failed: 1 });
        assert_eq!(sink.rows.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn store_failures_do_not_stop_the_loop() {
        let sink = Recorder {
            reject_all: true,
            ..Recorder::default()
        };

        let summary = collector(None, sink)
            .run(tokio::time::sleep(time::Duration::from_secs(90)))
            .await;

        assert_eq!(summary, Summary { stored: 0, failed: 2 });
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_shutdown_stops_without_collecting_more() {
        let summary = collector(None, Recorder::default())
            .run(future::ready(()))
            .await;

        assert!(summary.stored <= 1);
        assert_eq!(summary.failed, 0);
    }
}
