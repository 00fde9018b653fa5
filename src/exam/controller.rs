use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Duration, Instant},
};
use uuid::Uuid;

use crate::{
    audio::ChimeHandle,
    config::ExamConfig,
    events::{emit, EventSender, ExamEvent},
    keys::{KeyMonitor, KeySignal},
    sensing::{AnalysisController, FrameSource},
    session::{Question, QuestionOutcome, ResultSink, SessionTimeline},
    verification::{VerificationMachine, VerificationState},
    vision::Overlay,
};

use super::phase::{ExamPhase, PhaseState};

/// Which presence precondition gates the exam. A `Visual` exam runs the
/// gesture challenge before its first question; a `Keystroke` exam enforces
/// the held-key requirement during every thinking phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ExamKind {
    Visual,
    Keystroke,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExamSnapshot {
    pub session_id: String,
    pub kind: ExamKind,
    pub phase: ExamPhase,
    pub remaining_ms: i64,
    pub question_index: usize,
    pub question_count: usize,
    pub verification: VerificationState,
    pub verification_bypassed: bool,
    pub exam_started: bool,
    pub submitted: bool,
    pub overlay: Option<Overlay>,
}

/// All mutable session state. Frame callbacks and clock ticks both funnel
/// through the one mutex wrapping this struct, so a timer tick never sees a
/// half-committed frame update.
pub(crate) struct ExamState {
    pub(crate) config: ExamConfig,
    pub(crate) kind: ExamKind,
    pub(crate) phase: PhaseState,
    pub(crate) keys: KeyMonitor,
    pub(crate) timeline: SessionTimeline,
    pub(crate) verification: VerificationMachine,
    pub(crate) verification_bypassed: bool,
    pub(crate) exam_started: bool,
    pub(crate) session_active: bool,
    pub(crate) global_deadline: Option<Instant>,
    pub(crate) latest_overlay: Option<Overlay>,
}

#[derive(Clone)]
pub struct ExamController {
    session_id: String,
    state: Arc<Mutex<ExamState>>,
    events: EventSender,
    sink: Arc<dyn ResultSink>,
    chime: ChimeHandle,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
    analysis: Arc<Mutex<AnalysisController>>,
}

impl ExamController {
    pub fn new(
        config: ExamConfig,
        kind: ExamKind,
        questions: Vec<Question>,
        sink: Arc<dyn ResultSink>,
        events: EventSender,
    ) -> Self {
        let session_id = Uuid::new_v4().to_string();
        let timeline = SessionTimeline::new(session_id.clone(), questions, Utc::now());
        let keys = KeyMonitor::new(
            &config.left_hand_keys,
            &config.right_hand_keys,
            config.grace_period_ms,
        );
        let verification = VerificationMachine::new(config.settle_delay_ms);

        Self {
            session_id,
            state: Arc::new(Mutex::new(ExamState {
                config,
                kind,
                phase: PhaseState::new(),
                keys,
                timeline,
                verification,
                verification_bypassed: false,
                exam_started: false,
                session_active: false,
                global_deadline: None,
                latest_overlay: None,
            })),
            events,
            sink,
            chime: ChimeHandle::new(),
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
            analysis: Arc::new(Mutex::new(AnalysisController::new())),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Begin the session. A `Visual` exam starts the frame-analysis loop and
    /// waits for verification before its first question; with no frame source
    /// available it degrades to an ungated exam with a surfaced warning.
    pub async fn start(&self, frame_source: Option<Box<dyn FrameSource>>) -> Result<()> {
        let start_analysis = {
            let mut state = self.state.lock().await;
            if state.session_active {
                bail!("exam session already active");
            }
            state.session_active = true;

            let now = Instant::now();
            state.global_deadline = state
                .config
                .total_exam_secs
                .map(|secs| now + Duration::from_secs(secs));

            info!(
                "starting {:?} exam session {} ({} questions)",
                state.kind,
                self.session_id,
                state.timeline.question_count()
            );

            match (state.kind, frame_source.is_some()) {
                (ExamKind::Keystroke, _) => {
                    begin_question(&mut state, &self.events, now);
                    None
                }
                (ExamKind::Visual, true) => {
                    let events = state.verification.start(now);
                    for event in events {
                        emit(&self.events, event);
                    }
                    frame_source
                }
                (ExamKind::Visual, false) => {
                    warn!("camera unavailable; exam proceeds without visual verification");
                    state.verification_bypassed = true;
                    emit(
                        &self.events,
                        ExamEvent::VerificationBypassed {
                            reason: "camera unavailable".into(),
                        },
                    );
                    begin_question(&mut state, &self.events, now);
                    None
                }
            }
        };

        if let Some(source) = start_analysis {
            self.analysis
                .lock()
                .await
                .start_analysis(
                    source,
                    Arc::clone(&self.state),
                    self.events.clone(),
                    Arc::clone(&self.sink),
                )
                .await?;
        }

        self.spawn_ticker().await;
        Ok(())
    }

    pub async fn snapshot(&self) -> ExamSnapshot {
        let mut state = self.state.lock().await;
        state.phase.sync_active_from_anchor();
        ExamSnapshot {
            session_id: self.session_id.clone(),
            kind: state.kind,
            phase: state.phase.phase,
            remaining_ms: state.phase.remaining_ms(),
            question_index: state.timeline.index(),
            question_count: state.timeline.question_count(),
            verification: state.verification.state(),
            verification_bypassed: state.verification_bypassed,
            exam_started: state.exam_started,
            submitted: state.timeline.is_submitted(),
            overlay: state.latest_overlay,
        }
    }

    /// Key press from the candidate's keyboard. Ignored outside keystroke
    /// exams; extraneous keys are dropped by the monitor.
    pub async fn key_down(&self, key: &str) {
        let mut state = self.state.lock().await;
        if !state.exam_started || state.kind != ExamKind::Keystroke {
            return;
        }
        if state.keys.key_down(key) {
            self.poll_keys_locked(&mut state);
        }
    }

    pub async fn key_up(&self, key: &str) {
        let mut state = self.state.lock().await;
        if !state.exam_started || state.kind != ExamKind::Keystroke {
            return;
        }
        if state.keys.key_up(key) {
            self.poll_keys_locked(&mut state);
        }
    }

    fn poll_keys_locked(&self, state: &mut ExamState) {
        state.phase.sync_active_from_anchor();
        let in_thinking = state.phase.phase == ExamPhase::Thinking && !state.phase.expired();
        let signals = state.keys.poll(Instant::now(), in_thinking);
        process_key_signals(state, &self.events, self.sink.as_ref(), &self.chime, signals);
    }

    /// Record an answer for the current question. Only accepted during the
    /// answering window; for visual exams the window cannot open before
    /// verification completed or was bypassed, so no extra gate is needed.
    pub async fn record_answer(&self, answer: String) -> Result<()> {
        let mut state = self.state.lock().await;
        state.phase.sync_active_from_anchor();
        if !state.exam_started {
            bail!("exam has not started");
        }
        if state.timeline.is_submitted() {
            bail!("exam already submitted");
        }
        if state.phase.phase != ExamPhase::Answering || state.phase.expired() {
            bail!("answers are only accepted during the answering window");
        }
        if !state.timeline.record_answer(answer) {
            bail!("no active question");
        }
        Ok(())
    }

    /// End the session now, submitting whatever answers exist. Also the safe
    /// fallback for fatal conditions surfaced by the caller.
    pub async fn stop(&self) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            if !state.session_active {
                bail!("no active session to end");
            }
            finish_and_submit(&mut state, &self.events, self.sink.as_ref());
            state.session_active = false;
        }

        if let Err(err) = self.analysis.lock().await.stop_analysis().await {
            error!("failed to stop frame analysis: {err:?}");
        }
        self.cancel_ticker().await;
        Ok(())
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let sink = Arc::clone(&self.sink);
        let chime = self.chime.clone();
        let analysis = Arc::clone(&self.analysis);
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;

                let finished = {
                    let mut guard = state.lock().await;
                    if !guard.session_active {
                        break;
                    }
                    tick_once(&mut guard, &events, sink.as_ref(), &chime);
                    guard.timeline.is_submitted()
                };

                if finished {
                    if let Err(err) = analysis.lock().await.stop_analysis().await {
                        error!("failed to stop frame analysis on completion: {err:?}");
                    }
                    break;
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }
}

/// One clock tick over the shared state: global deadline, verification
/// unlock, key grace, phase expiry.
fn tick_once(state: &mut ExamState, events: &EventSender, sink: &dyn ResultSink, chime: &ChimeHandle) {
    let now = Instant::now();

    if state.timeline.is_submitted() {
        return;
    }

    if let Some(deadline) = state.global_deadline {
        if now >= deadline {
            warn!("global exam countdown expired; forcing submission");
            finish_and_submit(state, events, sink);
            return;
        }
    }

    if !state.exam_started {
        // Visual exam waiting on the gesture sequence
        if state.verification.is_complete() || state.verification_bypassed {
            begin_question(state, events, now);
        } else if let Some(max_secs) = state.config.max_verification_wait_secs {
            if state.verification.waited(now) >= Duration::from_secs(max_secs) {
                warn!("verification stalled for {max_secs}s; bypassing");
                state.verification_bypassed = true;
                emit(
                    events,
                    ExamEvent::VerificationBypassed {
                        reason: "verification wait limit reached".into(),
                    },
                );
                begin_question(state, events, now);
            }
        }
        return;
    }

    state.phase.sync_active_from_anchor();

    if state.kind == ExamKind::Keystroke {
        let in_thinking = state.phase.phase == ExamPhase::Thinking && !state.phase.expired();
        let signals = state.keys.poll(now, in_thinking);
        process_key_signals(state, events, sink, chime, signals);
        if state.timeline.is_submitted() {
            return;
        }
    }

    if state.phase.expired() {
        match state.phase.phase {
            ExamPhase::Thinking => {
                let target = state.config.answering_secs.saturating_mul(1_000);
                state.phase.begin_phase(ExamPhase::Answering, target, now);
                emit(
                    events,
                    ExamEvent::PhaseChanged {
                        question_index: state.timeline.index(),
                        phase: ExamPhase::Answering,
                        remaining_ms: state.phase.remaining_ms(),
                    },
                );
                emit(
                    events,
                    ExamEvent::Instruction {
                        text: "Time is up. Lock in your answer now.".into(),
                    },
                );
            }
            ExamPhase::Answering => {
                let outcome = if state.timeline.answer_for_current().is_some() {
                    QuestionOutcome::Answered
                } else {
                    QuestionOutcome::Skipped
                };
                advance_question(state, events, sink, outcome, now);
            }
            ExamPhase::Finished => {}
        }
    }
}

fn begin_question(state: &mut ExamState, events: &EventSender, now: Instant) {
    state.exam_started = true;
    state.keys.clear_for_next_question();
    let target = state.config.thinking_secs.saturating_mul(1_000);
    state.phase.begin_phase(ExamPhase::Thinking, target, now);
    emit(
        events,
        ExamEvent::PhaseChanged {
            question_index: state.timeline.index(),
            phase: ExamPhase::Thinking,
            remaining_ms: state.phase.remaining_ms(),
        },
    );
}

fn advance_question(
    state: &mut ExamState,
    events: &EventSender,
    sink: &dyn ResultSink,
    outcome: QuestionOutcome,
    now: Instant,
) {
    let from_index = state.timeline.index();
    emit(events, ExamEvent::QuestionAdvanced { from_index, outcome });

    match state.timeline.advance(outcome) {
        Some(_) => begin_question(state, events, now),
        None => finish_and_submit(state, events, sink),
    }
}

fn process_key_signals(
    state: &mut ExamState,
    events: &EventSender,
    sink: &dyn ResultSink,
    chime: &ChimeHandle,
    signals: Vec<KeySignal>,
) {
    for signal in signals {
        match signal {
            KeySignal::Satisfied => {
                emit(events, ExamEvent::KeysSatisfied);
                if state.config.chime_enabled {
                    chime.play();
                }
            }
            KeySignal::GraceArmed => {
                warn!(
                    "required keys released on question {}; grace countdown armed",
                    state.timeline.index()
                );
                emit(
                    events,
                    ExamEvent::GraceArmed {
                        grace_ms: state.keys.grace_period_ms(),
                    },
                );
            }
            KeySignal::GraceRestored => {
                emit(events, ExamEvent::GraceRestored);
            }
            KeySignal::GraceExpired => {
                warn!(
                    "grace period expired on question {}; forcing advance",
                    state.timeline.index()
                );
                emit(events, ExamEvent::GraceExpired);
                advance_question(
                    state,
                    events,
                    sink,
                    QuestionOutcome::TimeoutSkipped,
                    Instant::now(),
                );
            }
        }
    }
}

/// Freeze the answer map and hand it to the result sink. The timeline's
/// freeze guard makes this safe to call from any trigger: only the first
/// caller gets a payload.
pub(crate) fn finish_and_submit(state: &mut ExamState, events: &EventSender, sink: &dyn ResultSink) {
    let Some(submission) = state.timeline.freeze(Utc::now()) else {
        return;
    };
    state.phase.finish();

    let session_id = submission.session_id.clone();
    info!(
        "submitting session {} ({} answers, {} outcomes)",
        session_id,
        submission.answers.len(),
        submission.outcomes.len()
    );
    if let Err(err) = sink.submit(submission) {
        error!("result sink rejected submission for {session_id}: {err:?}");
    }
    emit(events, ExamEvent::SessionSubmitted { session_id });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events;
    use crate::session::ExamSubmission;
    use std::sync::Mutex as StdMutex;
    use tokio::time::timeout;

    struct CountingSink {
        submissions: StdMutex<Vec<ExamSubmission>>,
    }

    impl CountingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                submissions: StdMutex::new(Vec::new()),
            })
        }

        fn count(&self) -> usize {
            self.submissions.lock().unwrap().len()
        }

        fn last(&self) -> ExamSubmission {
            self.submissions.lock().unwrap().last().unwrap().clone()
        }
    }

    impl ResultSink for CountingSink {
        fn submit(&self, submission: ExamSubmission) -> anyhow::Result<()> {
            self.submissions.lock().unwrap().push(submission);
            Ok(())
        }
    }

    fn questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question {
                id: format!("q{i}"),
                prompt: format!("Question {i}"),
                options: None,
            })
            .collect()
    }

    fn fast_config() -> ExamConfig {
        ExamConfig {
            thinking_secs: 3,
            answering_secs: 3,
            grace_period_ms: 4_000,
            chime_enabled: false,
            ..ExamConfig::default()
        }
    }

    const ALL_KEYS: [&str; 8] = ["a", "z", "e", "r", "j", "k", "l", "m"];

    async fn next_event(rx: &mut events::EventReceiver) -> ExamEvent {
        timeout(Duration::from_secs(600), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    async fn wait_for(
        rx: &mut events::EventReceiver,
        mut pred: impl FnMut(&ExamEvent) -> bool,
    ) -> ExamEvent {
        loop {
            let event = next_event(rx).await;
            if pred(&event) {
                return event;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn keystroke_exam_cycles_thinking_answering_and_submits() {
        let sink = CountingSink::new();
        let (tx, mut rx) = events::channel();
        let controller = ExamController::new(
            fast_config(),
            ExamKind::Keystroke,
            questions(2),
            sink.clone(),
            tx,
        );

        controller.start(None).await.unwrap();
        for key in ALL_KEYS {
            controller.key_down(key).await;
        }

        // Question 0: answer during the answering window
        wait_for(&mut rx, |e| {
            matches!(e, ExamEvent::PhaseChanged { phase: ExamPhase::Answering, question_index: 0, .. })
        })
        .await;
        controller.record_answer("first answer".into()).await.unwrap();

        let advanced = wait_for(&mut rx, |e| matches!(e, ExamEvent::QuestionAdvanced { .. })).await;
        assert!(matches!(
            advanced,
            ExamEvent::QuestionAdvanced { from_index: 0, outcome: QuestionOutcome::Answered }
        ));

        // Question 1: keys were cleared on advance, press them again and let
        // the answering window lapse unanswered
        for key in ALL_KEYS {
            controller.key_down(key).await;
        }
        let advanced = wait_for(&mut rx, |e| {
            matches!(e, ExamEvent::QuestionAdvanced { from_index: 1, .. })
        })
        .await;
        assert!(matches!(
            advanced,
            ExamEvent::QuestionAdvanced { outcome: QuestionOutcome::Skipped, .. }
        ));

        wait_for(&mut rx, |e| matches!(e, ExamEvent::SessionSubmitted { .. })).await;
        assert_eq!(sink.count(), 1);
        let submission = sink.last();
        assert_eq!(submission.answers["q0"], "first answer");
        assert_eq!(submission.outcomes["q0"], QuestionOutcome::Answered);
        assert_eq!(submission.outcomes["q1"], QuestionOutcome::Skipped);
    }

    #[tokio::test(start_paused = true)]
    async fn answers_are_rejected_outside_the_answering_window() {
        let sink = CountingSink::new();
        let (tx, mut rx) = events::channel();
        let controller = ExamController::new(
            fast_config(),
            ExamKind::Keystroke,
            questions(1),
            sink.clone(),
            tx,
        );

        controller.start(None).await.unwrap();
        wait_for(&mut rx, |e| {
            matches!(e, ExamEvent::PhaseChanged { phase: ExamPhase::Thinking, .. })
        })
        .await;

        let err = controller.record_answer("too early".into()).await;
        assert!(err.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_keys_force_a_timeout_skip() {
        let sink = CountingSink::new();
        let (tx, mut rx) = events::channel();
        // Long thinking phase so the grace timer, not phase expiry, decides
        let config = ExamConfig {
            thinking_secs: 120,
            grace_period_ms: 4_000,
            chime_enabled: false,
            ..ExamConfig::default()
        };
        let controller =
            ExamController::new(config, ExamKind::Keystroke, questions(1), sink.clone(), tx);

        controller.start(None).await.unwrap();
        // Never press a key: grace arms on the first tick, expires 4s later
        wait_for(&mut rx, |e| matches!(e, ExamEvent::GraceArmed { .. })).await;
        wait_for(&mut rx, |e| matches!(e, ExamEvent::GraceExpired)).await;

        let advanced = wait_for(&mut rx, |e| matches!(e, ExamEvent::QuestionAdvanced { .. })).await;
        assert!(matches!(
            advanced,
            ExamEvent::QuestionAdvanced { outcome: QuestionOutcome::TimeoutSkipped, .. }
        ));

        wait_for(&mut rx, |e| matches!(e, ExamEvent::SessionSubmitted { .. })).await;
        let submission = sink.last();
        assert!(submission.answers.is_empty());
        assert_eq!(submission.outcomes["q0"], QuestionOutcome::TimeoutSkipped);
    }

    #[tokio::test(start_paused = true)]
    async fn restoring_keys_cancels_the_grace_timer() {
        let sink = CountingSink::new();
        let (tx, mut rx) = events::channel();
        let config = ExamConfig {
            thinking_secs: 20,
            answering_secs: 2,
            grace_period_ms: 8_000,
            chime_enabled: false,
            ..ExamConfig::default()
        };
        let controller =
            ExamController::new(config, ExamKind::Keystroke, questions(1), sink.clone(), tx);

        controller.start(None).await.unwrap();
        wait_for(&mut rx, |e| matches!(e, ExamEvent::GraceArmed { .. })).await;

        for key in ALL_KEYS {
            controller.key_down(key).await;
        }
        wait_for(&mut rx, |e| matches!(e, ExamEvent::GraceRestored)).await;
        wait_for(&mut rx, |e| matches!(e, ExamEvent::KeysSatisfied)).await;

        // The question resolves by phase expiry, not by grace timeout
        wait_for(&mut rx, |e| matches!(e, ExamEvent::SessionSubmitted { .. })).await;
        assert_eq!(sink.last().outcomes["q0"], QuestionOutcome::Skipped);
    }

    #[tokio::test(start_paused = true)]
    async fn global_countdown_forces_a_single_submission() {
        let sink = CountingSink::new();
        let (tx, mut rx) = events::channel();
        let config = ExamConfig {
            thinking_secs: 600,
            total_exam_secs: Some(5),
            // Keys held throughout so no grace skip interferes
            grace_period_ms: 60_000,
            chime_enabled: false,
            ..ExamConfig::default()
        };
        let controller =
            ExamController::new(config, ExamKind::Keystroke, questions(3), sink.clone(), tx);

        controller.start(None).await.unwrap();
        for key in ALL_KEYS {
            controller.key_down(key).await;
        }

        wait_for(&mut rx, |e| matches!(e, ExamEvent::SessionSubmitted { .. })).await;
        assert_eq!(sink.count(), 1);
        let submission = sink.last();
        assert_eq!(submission.outcomes.len(), 3);
        assert!(submission
            .outcomes
            .values()
            .all(|o| *o == QuestionOutcome::Skipped));

        // A late manual stop must not double-submit
        controller.stop().await.unwrap();
        assert_eq!(sink.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn visual_exam_without_camera_degrades_with_warning() {
        let sink = CountingSink::new();
        let (tx, mut rx) = events::channel();
        let controller = ExamController::new(
            fast_config(),
            ExamKind::Visual,
            questions(1),
            sink.clone(),
            tx,
        );

        controller.start(None).await.unwrap();
        wait_for(&mut rx, |e| matches!(e, ExamEvent::VerificationBypassed { .. })).await;
        // Exam proceeds ungated
        wait_for(&mut rx, |e| {
            matches!(e, ExamEvent::PhaseChanged { phase: ExamPhase::Thinking, .. })
        })
        .await;

        let snapshot = controller.snapshot().await;
        assert!(snapshot.exam_started);
        assert!(snapshot.verification_bypassed);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_stop_submits_partial_answers() {
        let sink = CountingSink::new();
        let (tx, mut rx) = events::channel();
        let config = ExamConfig {
            thinking_secs: 600,
            grace_period_ms: 600_000,
            chime_enabled: false,
            ..ExamConfig::default()
        };
        let controller =
            ExamController::new(config, ExamKind::Keystroke, questions(2), sink.clone(), tx);

        controller.start(None).await.unwrap();
        for key in ALL_KEYS {
            controller.key_down(key).await;
        }
        wait_for(&mut rx, |e| matches!(e, ExamEvent::KeysSatisfied)).await;

        controller.stop().await.unwrap();
        assert_eq!(sink.count(), 1);
        let submission = sink.last();
        assert!(submission.answers.is_empty());
        assert_eq!(submission.outcomes.len(), 2);

        // Stopping twice is an error, and never a second submission
        assert!(controller.stop().await.is_err());
        assert_eq!(sink.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn start_rejects_a_second_call() {
        let sink = CountingSink::new();
        let (tx, _rx) = events::channel();
        let controller = ExamController::new(
            fast_config(),
            ExamKind::Keystroke,
            questions(1),
            sink,
            tx,
        );
        controller.start(None).await.unwrap();
        assert!(controller.start(None).await.is_err());
    }
}
