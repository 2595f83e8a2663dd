// serve.rs — Start the HTTP daemon.
//
// Same server as the `rt-daemon` binary, reachable as `rt serve`.

use rt_progress::{Tracker, TrackerConfig};

pub fn execute(config: TrackerConfig, bind: Option<&str>) -> anyhow::Result<()> {
    let bind = bind
        .map(str::to_string)
        .unwrap_or_else(|| config.settings.http.bind.clone());
    let tracker = Tracker::open(config)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(rt_daemon::serve(tracker, &bind))
}
