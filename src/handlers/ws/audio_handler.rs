//! Binary audio message processing

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::messages::OutgoingMessage;
use super::state::ConnectionState;
use crate::core::pipeline::{ChunkOutcome, PipelineError};

/// Feed one binary audio message through the connection's pipeline and queue
/// the response. Returns `false` when the connection should stop processing.
pub async fn handle_audio_message(
    data: Bytes,
    state: &mut ConnectionState,
    message_tx: &mpsc::Sender<OutgoingMessage>,
) -> bool {
    let outcome = match state.pipeline.process_chunk(&data).await {
        Ok(outcome) => outcome,
        Err(PipelineError::Closed) => {
            debug!("Dropping audio message received after pipeline close");
            return false;
        }
    };

    let message = match outcome {
        ChunkOutcome::Buffering { bytes_received } => OutgoingMessage::Buffering {
            size: bytes_received,
        },
        ChunkOutcome::Output(output) => {
            if output.is_harmful {
                warn!(
                    "Harmful speech detected: text={:?}, confidence={:.2}",
                    output.text, output.confidence
                );
            }
            OutgoingMessage::from_output(output)
        }
    };

    if message_tx.send(message).await.is_err() {
        debug!("Response channel closed, stopping audio processing");
        return false;
    }

    true
}
