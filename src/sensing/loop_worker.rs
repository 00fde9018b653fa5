use std::sync::Arc;

use log::{error, info, warn};
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::events::{emit, EventSender, ExamEvent};
use crate::exam::controller::{finish_and_submit, ExamState};
use crate::session::ResultSink;
use crate::vision::{analyze_frame, build_overlay, Frame};

use super::FrameSource;

/// Pull cadence for the frame source, roughly 15 Hz.
const FRAME_INTERVAL_MS: u64 = 66;
/// Consecutive pull failures after which the device is considered lost and
/// the session falls back to a partial submission.
const MAX_CONSECUTIVE_FAILURES: u32 = 30;

pub async fn analysis_loop(
    mut source: Box<dyn FrameSource>,
    state: Arc<Mutex<ExamState>>,
    events: EventSender,
    sink: Arc<dyn ResultSink>,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(Duration::from_millis(FRAME_INTERVAL_MS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut consecutive_failures: u32 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match source.next_frame() {
                    Ok(Some(frame)) => {
                        consecutive_failures = 0;
                        process_frame(&frame, &state, &events).await;
                    }
                    Ok(None) => {}
                    Err(err) => {
                        consecutive_failures += 1;
                        error!(
                            "frame pull failed ({consecutive_failures} consecutive): {err:?}"
                        );
                        if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                            warn!("frame source lost; falling back to partial submission");
                            let mut guard = state.lock().await;
                            emit(
                                &events,
                                ExamEvent::FrameSourceLost {
                                    reason: err.to_string(),
                                },
                            );
                            finish_and_submit(&mut guard, &events, sink.as_ref());
                            break;
                        }
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                info!("frame analysis loop shutting down");
                break;
            }
        }
    }
}

/// Classify and aggregate outside the lock, commit inside it. A timer tick
/// interleaving with this never sees a half-updated zonal state.
async fn process_frame(frame: &Frame, state: &Arc<Mutex<ExamState>>, events: &EventSender) {
    let snapshot = analyze_frame(frame);
    let now = Instant::now();

    let mut guard = state.lock().await;
    let overlay = build_overlay(&snapshot, &guard.config.thresholds, &guard.config.confidence);
    guard.latest_overlay = Some(overlay);
    emit(events, ExamEvent::PresenceUpdated { overlay });

    if !guard.verification_bypassed && !guard.verification.is_complete() {
        let thresholds = guard.config.thresholds.clone();
        for event in guard.verification.observe(&snapshot, &thresholds, now) {
            emit(events, event);
        }
    }
}
