pub mod chime;

use chime::ChimeTone;

use log::warn;
use rodio::{OutputStream, Sink};
use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;

enum AudioCommand {
    Chime,
    SetVolume(f32),
}

/// Handle to the confirmation-tone engine. The chime is purely cosmetic:
/// every failure path logs and returns, nothing propagates to the exam.
#[derive(Clone)]
pub struct ChimeHandle {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
}

impl ChimeHandle {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>, String> {
        if let Some(tx) = self.tx.lock().map_err(|e| e.to_string())?.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();

        // Dedicated thread holding the non-Send audio objects
        thread::Builder::new()
            .name("exam-chime".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<(), String> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| format!("Failed to create audio output stream: {}", e))?;
                        let new_sink = Sink::try_new(&handle)
                            .map_err(|e| format!("Failed to create audio sink: {}", e))?;
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::Chime => {
                            if let Err(e) = ensure_sink(&mut _stream, &mut sink) {
                                warn!("chime unavailable: {e}");
                                continue;
                            }
                            if let Some(ref s) = sink {
                                s.append(ChimeTone::confirmation());
                            }
                        }
                        AudioCommand::SetVolume(v) => {
                            if let Some(ref s) = sink {
                                s.set_volume(v.clamp(0.0, 1.0));
                            }
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        let tx_clone = tx.clone();
        *self.tx.lock().map_err(|e| e.to_string())? = Some(tx);
        Ok(tx_clone)
    }

    /// Play the confirmation tone. Best-effort: the exam never waits on audio.
    pub fn play(&self) {
        match self.ensure_thread() {
            Ok(tx) => {
                if tx.send(AudioCommand::Chime).is_err() {
                    warn!("chime thread is gone");
                }
            }
            Err(e) => warn!("failed to start chime thread: {e}"),
        }
    }

    pub fn set_volume(&self, volume: f32) {
        if let Ok(tx) = self.ensure_thread() {
            let _ = tx.send(AudioCommand::SetVolume(volume));
        }
    }
}

impl Default for ChimeHandle {
    fn default() -> Self {
        Self::new()
    }
}
