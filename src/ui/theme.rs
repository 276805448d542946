use egui::{Color32, Layout, RichText};

use gift_oracle::model::turn::{Speaker, Turn};

#[derive(Clone)]
pub struct Theme {
    pub player: Color32,
    pub oracle: Color32,
    pub highlight: Color32,
    pub accent: Color32,
    pub warning: Color32,
    pub muted: Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            player: Color32::from_rgb(40, 70, 120),
            oracle: Color32::from_rgb(55, 60, 75),
            highlight: Color32::from_rgb(120, 85, 20),
            accent: Color32::from_rgb(96, 165, 250),
            warning: Color32::from_rgb(251, 191, 36),
            muted: Color32::from_rgb(148, 163, 184),
        }
    }
}

impl Theme {
    pub fn draw_turn(&self, ui: &mut egui::Ui, turn: &Turn) {
        ui.add_space(6.0);
        match turn.speaker {
            Speaker::Player => {
                ui.with_layout(Layout::right_to_left(egui::Align::TOP), |ui| {
                    bubble(ui, self.player, &turn.text, None);
                });
            }
            Speaker::Engine => {
                let fill = if turn.emphasized { self.highlight } else { self.oracle };
                let note = turn.outcome.map(|o| format!("[{o}]"));
                bubble(ui, fill, &turn.text, note.as_deref());
            }
        }
    }
}

fn bubble(ui: &mut egui::Ui, color: Color32, text: &str, note: Option<&str>) {
    egui::Frame::new()
        .fill(color)
        .corner_radius(8)
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.label(RichText::new(text).color(Color32::WHITE));
            if let Some(note) = note {
                ui.label(RichText::new(note).italics().small().color(Color32::LIGHT_GRAY));
            }
        });
}
