use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

use crate::engine::{DecodeEvent, EngineSignal};
use crate::error::ScanError;
use crate::models::format_scan_result;
use crate::session::SessionShared;
use crate::utils::logging::debug_mode;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Drain engine signals into session state until cancelled or the engine
/// drops its sink.
pub(crate) async fn decode_loop(
    mut signals: UnboundedReceiver<EngineSignal>,
    shared: Arc<SessionShared>,
    generation: u64,
    device_id: String,
    cancel_token: CancellationToken,
) {
    let verbose = debug_mode();
    let mut noise_frames: u64 = 0;
    let mut decoded: u64 = 0;

    loop {
        tokio::select! {
            // Cancellation wins over anything already queued
            biased;
            _ = cancel_token.cancelled() => {
                log_info!(
                    "decode loop on {} shutting down ({} decoded, {} empty frames)",
                    device_id, decoded, noise_frames
                );
                break;
            }
            signal = signals.recv() => {
                let Some(signal) = signal else {
                    log_warn!("decode engine closed its sink for {}", device_id);
                    apply_loop_ended(&shared, generation, &cancel_token, &device_id).await;
                    break;
                };

                if signal.is_noise() {
                    noise_frames += 1;
                    if verbose {
                        log_debug!("no code in frame #{} on {}", noise_frames, device_id);
                    }
                    continue;
                }

                match signal {
                    EngineSignal::Decoded(event) => {
                        if apply_decode(&shared, generation, &cancel_token, event).await {
                            decoded += 1;
                        }
                    }
                    EngineSignal::Failed(message) => {
                        apply_engine_error(&shared, generation, &cancel_token, message).await;
                    }
                }
            }
        }
    }
}

async fn apply_decode(
    shared: &SessionShared,
    generation: u64,
    cancel_token: &CancellationToken,
    event: DecodeEvent,
) -> bool {
    let mut state = shared.state.lock().await;
    if cancel_token.is_cancelled() || !state.accepts_events(generation) {
        log_debug!("discarding decode delivered after stop");
        return false;
    }

    let result = format_scan_result(event.text, event.symbology.as_deref());
    shared.history.append(result.clone());
    state.last_result = Some(result);
    shared.publish(&state);
    true
}

/// Runtime engine errors surface through `last_error`; the phase is left
/// alone.
async fn apply_engine_error(
    shared: &SessionShared,
    generation: u64,
    cancel_token: &CancellationToken,
    message: String,
) {
    let mut state = shared.state.lock().await;
    if cancel_token.is_cancelled() || !state.accepts_events(generation) {
        return;
    }

    log_warn!("decode engine error: {}", message);
    state.last_error = Some(ScanError::Decode(message).info());
    shared.publish(&state);
}

/// The engine dropped its sink without being asked to stop. The session must
/// not stay `Active` on a loop that no longer runs.
async fn apply_loop_ended(
    shared: &SessionShared,
    generation: u64,
    cancel_token: &CancellationToken,
    device_id: &str,
) {
    let mut state = shared.state.lock().await;
    if cancel_token.is_cancelled() || !state.accepts_events(generation) {
        return;
    }

    let err = ScanError::Engine(format!("decode loop on {device_id} ended unexpectedly"));
    state.fail(&err);
    shared.publish(&state);
}
