//! Link establishment, the per-link read loop and teardown

use std::sync::Arc;

use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info, warn};

use super::frame::{parse_frame, Frame, FrameReader};
use super::state::{LinkState, LinkStats};
use super::LinkError;
use crate::config::LinkConfig;
use crate::decode::{Decode, Station};
use crate::forward::{Consumer, RecordForwarder};

/// Live link, owning the cancellation signal and completion acknowledgment
/// of its read loop
///
/// Dropping the handle without [`LinkHandle::teardown`] also stops the loop,
/// but nothing waits for it.
pub struct LinkHandle {
    station: Station,
    state: watch::Receiver<LinkState>,
    stats: Arc<LinkStats>,
    cancel: oneshot::Sender<()>,
    done: oneshot::Receiver<LinkState>,
}

impl LinkHandle {
    pub fn station(&self) -> &Station {
        &self.station
    }

    pub fn state(&self) -> LinkState {
        *self.state.borrow()
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    /// Stop the read loop and wait until it has released the connection
    ///
    /// Resolves to the final state: `Closed`, or `Failed` if the loop had
    /// already died on its own.
    pub async fn teardown(self) -> LinkState {
        let LinkHandle {
            station,
            state,
            cancel,
            done,
            ..
        } = self;

        info!("Tearing down link for station {} ({})", station.name, station.id);
        let _ = cancel.send(());

        let final_state = match done.await {
            Ok(final_state) => final_state,
            Err(_) => *state.borrow(),
        };

        info!("Connection to feed for station {} closed ({})", station.name, final_state);
        final_state
    }
}

/// Open the feed stream and start the link's read loop
///
/// On success the link is already `Streaming`.
pub async fn establish<D, C>(
    config: &LinkConfig,
    decoder: D,
    consumer: C,
) -> Result<LinkHandle, LinkError>
where
    D: Decode + 'static,
    C: Consumer + 'static,
{
    let settings = config.validate()?;
    let addr = settings.feed_addr();

    info!("Connecting to feed {} for station {}", addr, settings.station_name);
    let stream = TcpStream::connect(&addr)
        .await
        .map_err(|source| LinkError::Connect {
            addr: addr.clone(),
            source,
        })?;

    let station = Station::new(settings.station_name, settings.latitude, settings.longitude);
    info!(
        "Link established: station {} ({}) at ({}, {}) <- {}",
        station.name, station.id, station.latitude, station.longitude, addr
    );

    let (state_tx, state_rx) = watch::channel(LinkState::Established);
    let (cancel_tx, cancel_rx) = oneshot::channel();
    let (done_tx, done_rx) = oneshot::channel();
    let stats = Arc::new(LinkStats::default());

    let task = LinkTask {
        station: station.clone(),
        frames: FrameReader::new(BufReader::new(stream)),
        decoder,
        forwarder: RecordForwarder::new(consumer),
        stats: stats.clone(),
        state: state_tx,
    };
    task.state.send_replace(LinkState::Streaming);
    tokio::spawn(task.run(cancel_rx, done_tx));

    Ok(LinkHandle {
        station,
        state: state_rx,
        stats,
        cancel: cancel_tx,
        done: done_rx,
    })
}

enum Step {
    Continue,
    Cancelled,
    Failed,
}

struct LinkTask<D, C> {
    station: Station,
    frames: FrameReader<BufReader<TcpStream>>,
    decoder: D,
    forwarder: RecordForwarder<C>,
    stats: Arc<LinkStats>,
    state: watch::Sender<LinkState>,
}

impl<D: Decode, C: Consumer> LinkTask<D, C> {
    async fn run(mut self, mut cancel: oneshot::Receiver<()>, done: oneshot::Sender<LinkState>) {
        info!("Waiting for frames for station {}...", self.station.name);

        // Each step (read, decode, forward) races cancellation, so teardown
        // completes even while a read or a consumer call is pending.
        let final_state = loop {
            let step = tokio::select! {
                biased;
                _ = &mut cancel => Step::Cancelled,
                step = self.step() => step,
            };

            match step {
                Step::Continue => {}
                Step::Cancelled => {
                    self.state.send_replace(LinkState::Closing);
                    break LinkState::Closed;
                }
                Step::Failed => break LinkState::Failed,
            }
        };

        let LinkTask {
            station,
            frames,
            stats,
            state,
            ..
        } = self;
        drop(frames);

        info!(
            "Read loop for station {} stopped ({}). {}",
            station.name, final_state, stats
        );
        state.send_replace(final_state);
        let _ = done.send(final_state);
    }

    async fn step(&mut self) -> Step {
        match self.frames.next_frame().await {
            Ok(Some(Frame::Line(line))) => {
                self.handle_line(&line).await;
                Step::Continue
            }
            Ok(Some(Frame::Oversized(len))) => {
                self.stats.record_framing_error();
                debug!("Discarded oversized line ({} bytes)", len);
                Step::Continue
            }
            Ok(None) => {
                warn!("Feed for station {} closed the stream", self.station.name);
                Step::Failed
            }
            Err(e) => {
                error!("Error reading feed for station {}: {}", self.station.name, e);
                Step::Failed
            }
        }
    }

    async fn handle_line(&mut self, line: &str) {
        self.stats.record_line();

        let frame = match parse_frame(line) {
            Ok(Some(frame)) => frame,
            Ok(None) => return,
            Err(e) => {
                self.stats.record_decode_error();
                debug!("Failed to parse line {:?}: {}", line.trim(), e);
                return;
            }
        };

        // Most lines on a live feed are not positional; these are expected
        match self.decoder.decode(&frame, &self.station) {
            Ok(record) => {
                if self.forwarder.forward(&record).await {
                    self.stats.record_forwarded();
                } else {
                    self.stats.record_forward_error();
                }
            }
            Err(e) => {
                self.stats.record_decode_error();
                debug!("Failed to decode msg {}: {}", line.trim(), e);
            }
        }
    }
}
