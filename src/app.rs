//! DictaPad window — egui/eframe application.
//!
//! # Architecture
//!
//! [`DictapadApp`] owns the [`SessionController`] and the receiving end of
//! the session event channel. Each frame it drains pending
//! [`SessionEvent`]s (non-blocking), appends recognized segments to the
//! [`TranscriptBuffer`], and renders:
//!
//! * an editable transcript panel (scrolled to the end as text arrives),
//! * a Start/Stop toggle (green when idle, red while recording),
//! * Copy and Clear buttons,
//! * a status label for session errors.
//!
//! All transcript mutation happens here, on the UI thread — the capture
//! worker only ever talks to this app through the channel.

use std::sync::mpsc;
use std::time::Duration;

use eframe::egui;

use crate::clipboard;
use crate::session::{SessionController, SessionEvent};
use crate::transcript::TranscriptBuffer;

// ---------------------------------------------------------------------------
// DictapadApp
// ---------------------------------------------------------------------------

/// eframe application — the dictation pad window.
pub struct DictapadApp {
    /// Accumulated transcript shown in the editable panel.
    transcript: TranscriptBuffer,
    /// Recording session state machine and worker owner.
    controller: SessionController,
    /// Receives segments and errors from the capture worker.
    events_rx: mpsc::Receiver<SessionEvent>,
    /// Last session error, shown until the next recording starts.
    error_message: Option<String>,
}

impl DictapadApp {
    /// Create a new [`DictapadApp`].
    ///
    /// * `controller` — session controller wired to the capture worker.
    /// * `events_rx`  — receiver end of the session event channel.
    pub fn new(controller: SessionController, events_rx: mpsc::Receiver<SessionEvent>) -> Self {
        Self {
            transcript: TranscriptBuffer::new(),
            controller,
            events_rx,
            error_message: None,
        }
    }

    // ── Channel polling ──────────────────────────────────────────────────

    /// Drain all pending session events (non-blocking).
    fn poll_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                SessionEvent::Transcribed { segments } => {
                    for segment in &segments {
                        self.transcript.append(&segment.text);
                    }
                }
                SessionEvent::Error { message } => {
                    self.error_message = Some(message);
                }
            }
        }
    }

    // ── Control actions ──────────────────────────────────────────────────

    fn on_toggle(&mut self) {
        if !self.controller.is_recording() {
            // A fresh session clears the previous failure.
            self.error_message = None;
        }
        self.controller.toggle();
    }

    fn on_copy(&mut self) {
        if let Err(e) = clipboard::copy_text(self.transcript.as_str()) {
            log::warn!("copy failed: {e}");
            self.error_message = Some(e.to_string());
        }
    }

    fn on_clear(&mut self) {
        self.transcript.clear();
    }

    // ── Panels ───────────────────────────────────────────────────────────

    /// The bottom control row: toggle, Copy, Clear, status label.
    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let recording = self.controller.is_recording();
            let (label, fill) = if recording {
                ("Stop", egui::Color32::from_rgb(190, 50, 50))
            } else {
                ("Start", egui::Color32::from_rgb(40, 140, 70))
            };

            let toggle = egui::Button::new(
                egui::RichText::new(label).color(egui::Color32::WHITE),
            )
            .fill(fill)
            .min_size(egui::vec2(80.0, 0.0));

            if ui.add(toggle).clicked() {
                self.on_toggle();
            }
            if ui.button("Copy").clicked() {
                self.on_copy();
            }
            if ui.button("Clear").clicked() {
                self.on_clear();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(ref msg) = self.error_message {
                    ui.label(
                        egui::RichText::new(msg.as_str())
                            .color(egui::Color32::from_rgb(255, 136, 68))
                            .size(12.0),
                    );
                } else if recording {
                    ui.label(
                        egui::RichText::new("Recording…")
                            .color(egui::Color32::from_rgb(255, 80, 80))
                            .size(12.0),
                    );
                }
            });
        });
    }

    /// The editable transcript panel, kept scrolled to the newest text.
    fn draw_transcript(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.add_sized(
                    ui.available_size(),
                    egui::TextEdit::multiline(self.transcript.text_mut())
                        .hint_text("Press Start and speak…"),
                );
            });
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for DictapadApp {
    /// Called every frame by eframe. Polls the event channel, then renders
    /// the window.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events();

        // The event channel has no UI waker, so schedule periodic repaints:
        // fast while the worker is producing, slow otherwise (still often
        // enough to pick up an in-flight result delivered after Stop).
        if self.controller.is_recording() {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else {
            ctx.request_repaint_after(Duration::from_millis(500));
        }

        egui::TopBottomPanel::bottom("controls")
            .show(ctx, |ui| {
                ui.add_space(4.0);
                self.draw_controls(ui);
                ui.add_space(4.0);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_transcript(ui);
        });
    }

    /// Stop any active session and join the worker before the process
    /// exits.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("DictaPad closing");
        self.controller.shutdown();
    }
}
