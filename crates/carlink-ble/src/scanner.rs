//! Device discovery with in-process name filtering
//!
//! The radio scan itself runs unfiltered; no UUID filter is handed to the
//! adapter. Every advertisement is checked against a predicate in-process,
//! and the first match ends the scan. The peripheral firmware advertises its
//! local name but not the telemetry service UUID, which is why filtering on
//! the adapter would never match.

use btleplug::api::{Central, CentralEvent, ScanFilter};
use btleplug::platform::{Adapter, Peripheral};
use futures::{Future, Stream, StreamExt};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use carlink_core::Result;

use crate::error::scan_failed;

/// Predicate matching an advertised local name exactly.
pub fn name_matches(target: &str) -> impl Fn(Option<&str>) -> bool + '_ {
    move |name| name == Some(target)
}

// ----------------------------------------------------------------------------
// Matching Loop
// ----------------------------------------------------------------------------

/// Consume advertisement events until `predicate` accepts one or `cancel`
/// flips to `true`.
///
/// `resolve` turns one raw event into a peripheral handle plus its advertised
/// local name, or `None` for events that carry no advertisement. Cancellation
/// is honored before the first event is consumed and takes priority over a
/// ready advertisement, so no further predicate evaluation happens once the
/// cancel is observed. The stream ending is a scan failure: discovery is
/// open-ended and only a match or a cancel may end it cleanly.
async fn first_match<S, R, Fut, P, F>(
    mut events: S,
    mut resolve: R,
    predicate: F,
    mut cancel: watch::Receiver<bool>,
) -> Result<Option<P>>
where
    S: Stream + Unpin,
    R: FnMut(S::Item) -> Fut,
    Fut: Future<Output = Option<(P, Option<String>)>>,
    F: Fn(Option<&str>) -> bool,
{
    if *cancel.borrow() {
        return Ok(None);
    }

    loop {
        tokio::select! {
            biased;

            changed = cancel.changed() => {
                if changed.is_err() || *cancel.borrow() {
                    debug!("scan cancelled");
                    return Ok(None);
                }
            }
            event = events.next() => {
                match event {
                    Some(event) => {
                        if let Some((peripheral, name)) = resolve(event).await {
                            if predicate(name.as_deref()) {
                                info!(
                                    name = name.as_deref().unwrap_or("<unnamed>"),
                                    "peripheral matched"
                                );
                                return Ok(Some(peripheral));
                            }
                        }
                    }
                    None => return Err(scan_failed("advertisement stream ended")),
                }
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Scanner
// ----------------------------------------------------------------------------

/// Runs one discovery scan and yields the first matching peripheral.
pub struct Scanner {
    adapter: Adapter,
}

impl Scanner {
    pub fn new(adapter: Adapter) -> Self {
        Self { adapter }
    }

    /// Scan until `predicate` accepts an advertisement or `cancel` flips to
    /// `true`.
    ///
    /// Returns `Ok(Some(peripheral))` on the first match, `Ok(None)` when
    /// cancelled. With a predicate that never matches the scan runs
    /// indefinitely; there is no scan timeout by design. The radio scan is
    /// stopped before returning on every path, and cancellation is honored
    /// even when requested before the scan started.
    pub async fn scan_first<F>(
        &self,
        predicate: F,
        cancel: watch::Receiver<bool>,
    ) -> Result<Option<Peripheral>>
    where
        F: Fn(Option<&str>) -> bool,
    {
        let events = self.adapter.events().await.map_err(scan_failed)?;
        self.adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(scan_failed)?;
        info!("scanning for peripheral");

        let adapter = &self.adapter;
        let outcome = first_match(
            events,
            |event| async move {
                let id = match event {
                    CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => id,
                    _ => return None,
                };
                match adapter.peripheral(&id).await {
                    Ok(peripheral) => {
                        let name = advertised_name(&peripheral).await;
                        Some((peripheral, name))
                    }
                    Err(e) => {
                        debug!("discovered peripheral vanished: {}", e);
                        None
                    }
                }
            },
            predicate,
            cancel,
        )
        .await;

        if let Err(e) = self.adapter.stop_scan().await {
            warn!("failed to stop scan: {}", e);
        }
        outcome
    }
}

async fn advertised_name(peripheral: &Peripheral) -> Option<String> {
    use btleplug::api::Peripheral as _;

    match peripheral.properties().await {
        Ok(Some(properties)) => properties.local_name,
        _ => None,
    }
}
