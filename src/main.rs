//! Application entry point — DictaPad.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Load the Whisper model (degrade to an error-reporting stub when the
//!    model file is missing, so the app still launches).
//! 4. Create the session event channel and the [`SessionController`].
//! 5. Run [`eframe::run_native`] — blocks the main thread until the
//!    window is closed. Recording starts only when the user presses the
//!    toggle; the controller spawns the capture worker on demand.

use std::sync::{mpsc, Arc};

use dictapad::{
    app::DictapadApp,
    audio::{CpalInput, FrameSpec},
    config::{AppConfig, AppPaths},
    session::{SessionController, SessionEvent},
    stt::{Segment, SttEngine, SttError, TranscribeParams, WhisperEngine},
};

use eframe::egui;

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let mut vp = egui::ViewportBuilder::default()
        .with_inner_size([500.0, 300.0])
        .with_min_inner_size([360.0, 200.0]);

    if let Some((x, y)) = config.ui.window_position {
        vp = vp.with_position(egui::pos2(x, y));
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("DictaPad starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. STT engine (may fail if model not present — degrade gracefully)
    let model_path = AppPaths::new()
        .models_dir
        .join(format!("{}.bin", config.stt.model));

    let params = TranscribeParams {
        language: config.stt.language.clone(),
        ..TranscribeParams::default()
    };

    let stt: Arc<dyn SttEngine> = match WhisperEngine::load(&model_path, params) {
        Ok(engine) => {
            log::info!("Whisper model loaded: {}", model_path.display());
            Arc::new(engine)
        }
        Err(e) => {
            log::warn!(
                "Could not load Whisper model ({}): {e}. Transcription will return an error.",
                model_path.display()
            );
            // Use a stub that always returns an explanatory error so the
            // app still launches without a model file present.
            Arc::new(NoModelStt {
                path: model_path.display().to_string(),
            })
        }
    };

    // 4. Session controller + event channel
    let (event_tx, event_rx) = mpsc::channel::<SessionEvent>();
    let spec = FrameSpec::new(config.audio.sample_rate, config.audio.chunk_secs);
    let controller = SessionController::new(
        Arc::new(CpalInput::new()),
        stt,
        event_tx,
        spec,
        config.stt.beam_size,
    );

    // 5. Build the egui app and run it (blocks until the window is closed)
    let app = DictapadApp::new(controller, event_rx);
    let options = native_options(&config);

    eframe::run_native(
        "Speech to Text",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
}

// ---------------------------------------------------------------------------
// NoModelStt — fallback SttEngine when the model file is not present
// ---------------------------------------------------------------------------

struct NoModelStt {
    path: String,
}

impl SttEngine for NoModelStt {
    fn transcribe(&self, _audio: &[f32], _beam_size: i32) -> Result<Vec<Segment>, SttError> {
        Err(SttError::ModelNotFound(self.path.clone()))
    }
}
