use std::time;

use futures::stream;
use futures::Stream;

/// Ticks immediately and then once per `period`, logging each tick.
///
/// Must be called from within a tokio runtime.
pub fn every(log: slog::Logger, name: String, period: time::Duration) -> impl Stream<Item = ()> {
    debug!(log, "starting timer"; "name" => &name, "period" => ?period);

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    stream::unfold((interval, log, name), |(mut interval, log, name)| async move {
        interval.tick().await;
        debug!(log, "timer tick"; "name" => &name);
        Some(((), (interval, log, name)))
    })
}

/// Runs blocking bus I/O on the current worker after handing its other tasks off.
///
/// Needs the multi-threaded runtime.
pub fn blocking<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    tokio::task::block_in_place(f)
}
