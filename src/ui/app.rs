use std::time::Duration;

use egui::RichText;
use log::error;

use gift_oracle::config::GameConfig;
use gift_oracle::engine::runner::EngineHandle;

use super::game_panel::GameStage;
use super::theme::Theme;

/* =========================
   Stages
   ========================= */

enum Stage {
    Gift,
    Game(GameStage),
    Reveal,
}

/* =========================
   App
   ========================= */

pub struct GiftApp {
    config: GameConfig,
    stage: Stage,
    theme: Theme,
    start_failed: bool,
}

impl GiftApp {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            stage: Stage::Gift,
            theme: Theme::default(),
            start_failed: false,
        }
    }

    fn open_gift(&mut self) {
        match EngineHandle::from_config(&self.config) {
            Ok(handle) => {
                let delay = Duration::from_millis(self.config.reveal_delay_ms);
                self.stage = Stage::Game(GameStage::new(handle, delay));
                self.start_failed = false;
            }
            Err(err) => {
                error!("could not start the game: {err:#}");
                self.start_failed = true;
            }
        }
    }
}

fn draw_gift(ui: &mut egui::Ui, theme: &Theme, start_failed: bool) -> bool {
    let mut open = false;
    ui.vertical_centered(|ui| {
        ui.add_space(80.0);
        ui.heading("Someone left you a gift");
        ui.add_space(12.0);
        ui.label(
            RichText::new("Open it to meet the oracle guarding what's inside.").color(theme.muted),
        );
        ui.add_space(24.0);
        open = ui.button(RichText::new("Open the box").size(20.0)).clicked();
        if start_failed {
            ui.add_space(12.0);
            ui.label(
                RichText::new("The box is stuck. Try again in a moment.").color(theme.warning),
            );
        }
    });
    open
}

fn draw_reveal(ui: &mut egui::Ui, theme: &Theme) {
    ui.vertical_centered(|ui| {
        ui.add_space(80.0);
        ui.heading(RichText::new("A rose, just for you").size(28.0).color(theme.warning));
        ui.add_space(12.0);
        ui.label("Every question brought you a little closer.");
        ui.label(RichText::new("Happy Rose Day!").strong());
    });
}

/* =========================
   egui App
   ========================= */

impl eframe::App for GiftApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_zoom_factor(self.config.ui_scale);

        let mut reveal_due = false;
        if let Stage::Game(game) = &mut self.stage {
            reveal_due = game.poll();
            // engine events arrive from another thread
            ctx.request_repaint_after(Duration::from_millis(100));
        }
        if reveal_due {
            // drops the engine handle, which shuts the game down
            self.stage = Stage::Reveal;
        }

        let mut open_clicked = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.set_max_width(520.0);
            match &mut self.stage {
                Stage::Gift => open_clicked = draw_gift(ui, &self.theme, self.start_failed),
                Stage::Game(game) => game.draw(ui, &self.theme),
                Stage::Reveal => draw_reveal(ui, &self.theme),
            }
        });

        if open_clicked {
            self.open_gift();
        }
    }
}
