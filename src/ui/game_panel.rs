use std::time::{Duration, Instant};

use egui::RichText;

use gift_oracle::engine::engine::SubmissionKind;
use gift_oracle::engine::protocol::EngineEvent;
use gift_oracle::engine::runner::EngineHandle;
use gift_oracle::model::session::{Phase, SessionSnapshot};
use gift_oracle::model::turn::Turn;

use super::theme::Theme;

/// Local mirror of one running game, fed by engine events.
pub struct GameStage {
    handle: EngineHandle,
    turns: Vec<Turn>,
    input: String,
    ready: bool,
    awaiting_reply: bool,
    snapshot: Option<SessionSnapshot>,
    reveal_at: Option<Instant>,
    reveal_delay: Duration,
}

impl GameStage {
    pub fn new(handle: EngineHandle, reveal_delay: Duration) -> Self {
        let snapshot = handle.initial_snapshot().clone();
        Self {
            ready: snapshot.phase == Phase::Active,
            handle,
            turns: Vec::new(),
            input: String::new(),
            awaiting_reply: false,
            snapshot: Some(snapshot),
            reveal_at: None,
            reveal_delay,
        }
    }

    /// Pulls engine events. Returns true once the reveal delay is over.
    pub fn poll(&mut self) -> bool {
        for event in self.handle.drain_events() {
            match event {
                EngineEvent::TurnAppended(turn) => self.turns.push(turn),
                EngineEvent::ReadinessChanged(ready) => self.ready = ready,
                EngineEvent::SessionChanged(snapshot) => {
                    self.awaiting_reply = snapshot.in_flight;
                    if snapshot.phase == Phase::Active {
                        self.ready = true;
                    }
                    self.snapshot = Some(snapshot);
                }
                EngineEvent::Terminal(_) => {
                    self.reveal_at = Some(Instant::now() + self.reveal_delay);
                }
            }
        }

        match self.reveal_at {
            Some(at) if Instant::now() >= at => {
                self.handle.reveal_finished();
                true
            }
            _ => false,
        }
    }

    fn is_revealing(&self) -> bool {
        self.reveal_at.is_some()
    }

    pub fn draw(&mut self, ui: &mut egui::Ui, theme: &Theme) {
        if !self.ready {
            self.draw_waking(ui, theme);
            return;
        }

        self.draw_header(ui, theme);
        ui.separator();

        egui::ScrollArea::vertical()
            .max_height(280.0)
            .stick_to_bottom(true)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for turn in &self.turns {
                    theme.draw_turn(ui, turn);
                }
                if self.awaiting_reply {
                    ui.add_space(6.0);
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(RichText::new("thinking...").color(theme.muted));
                    });
                }
            });

        ui.add_space(8.0);
        if self.is_revealing() {
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new("Unveiling the mystery...")
                        .strong()
                        .color(theme.warning),
                );
            });
        } else {
            self.draw_input(ui);
        }
    }

    fn draw_waking(&self, ui: &mut egui::Ui, theme: &Theme) {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading("Waking up the Oracle...");
            ui.add_space(8.0);
            ui.spinner();
            ui.add_space(8.0);
            ui.label(
                RichText::new("The oracle is preparing itself. This can take a minute on first load.")
                    .small()
                    .color(theme.muted),
            );
        });
    }

    fn draw_header(&self, ui: &mut egui::Ui, theme: &Theme) {
        ui.horizontal(|ui| {
            ui.heading("Mystery Oracle");
            let status = if self.awaiting_reply { "thinking..." } else { "listening" };
            ui.label(RichText::new(status).small().color(theme.muted));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let Some(snapshot) = &self.snapshot else {
                    return;
                };
                if let (Some(limit), Some(left)) = (snapshot.turn_limit, snapshot.turns_left()) {
                    let color = if left <= 5 { theme.warning } else { theme.accent };
                    ui.label(
                        RichText::new(format!("Q {} / {limit}", snapshot.turn_count))
                            .strong()
                            .color(color),
                    );
                } else if let Some(confidence) = snapshot.confidence {
                    ui.add(
                        egui::ProgressBar::new(confidence as f32 / 100.0)
                            .desired_width(120.0)
                            .text(format!("certainty {confidence}%")),
                    );
                }
            });
        });

        let rules = match self.snapshot.as_ref().and_then(SessionSnapshot::turns_left) {
            Some(left) if left <= 5 => format!(
                "I'm thinking of something. Ask me yes/no questions to figure it out! Only {left} questions left!"
            ),
            Some(left) => format!(
                "I'm thinking of something. Ask me yes/no questions to figure it out! You have {left} questions left."
            ),
            None => "I'm thinking of something. Describe it to me and I'll tell you how close you are!".to_string(),
        };
        ui.label(rules);
        if self.handle.has_guess_channel() {
            ui.label(
                RichText::new("Think you know? Use the Guess button.")
                    .small()
                    .color(theme.muted),
            );
        }
    }

    fn draw_input(&mut self, ui: &mut egui::Ui) {
        let input_id = egui::Id::new("oracle_input");
        let mut action = None;

        ui.horizontal(|ui| {
            let width = (ui.available_width() - 130.0).max(120.0);
            let edit = ui.add_enabled(
                !self.awaiting_reply,
                egui::TextEdit::singleline(&mut self.input)
                    .id(input_id)
                    .hint_text("Ask a yes/no question...")
                    .desired_width(width),
            );
            let has_text = !self.input.trim().is_empty();
            let enabled = has_text && !self.awaiting_reply;

            if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) && enabled {
                action = Some(SubmissionKind::Question);
            }
            if ui.add_enabled(enabled, egui::Button::new("Ask")).clicked() {
                action = Some(SubmissionKind::Question);
            }
            if self.handle.has_guess_channel()
                && ui.add_enabled(enabled, egui::Button::new("Guess")).clicked()
            {
                action = Some(SubmissionKind::Guess);
            }
        });

        if let Some(kind) = action {
            self.submit(kind);
            ui.memory_mut(|m| m.request_focus(input_id));
        }
    }

    fn submit(&mut self, kind: SubmissionKind) {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return;
        }
        match kind {
            SubmissionKind::Question => self.handle.ask(text),
            SubmissionKind::Guess => self.handle.guess(text),
        }
        self.input.clear();
        self.awaiting_reply = true;
    }
}
