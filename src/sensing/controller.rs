use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::events::EventSender;
use crate::exam::controller::ExamState;
use crate::session::ResultSink;

use super::loop_worker::analysis_loop;
use super::FrameSource;

/// Owns the frame-analysis task. Stopping is cancellation-token based: the
/// loop samples the token every iteration, so shutdown is deterministic even
/// when a frame is mid-analysis.
pub(crate) struct AnalysisController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl AnalysisController {
    pub(crate) fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub(crate) async fn start_analysis(
        &mut self,
        source: Box<dyn FrameSource>,
        state: Arc<Mutex<ExamState>>,
        events: EventSender,
        sink: Arc<dyn ResultSink>,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("frame analysis already active");
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        info!("starting frame analysis loop");
        let handle = tokio::spawn(analysis_loop(source, state, events, sink, token_clone));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub(crate) async fn stop_analysis(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("frame analysis task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}
