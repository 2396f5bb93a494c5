/*
 * UI Module
 *
 * Control panel for the viewer, built with nannou_egui. Edits a copy of the
 * run settings and reports what the user asked for; the caller decides how
 * to apply it.
 */

use nannou_egui::{egui, Egui};

use crate::config::Settings;
use crate::debug::DebugInfo;
use crate::flock::UpdateMode;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UiActions {
    /// Population or optimisation settings were edited.
    pub settings_changed: bool,
    pub reset: bool,
    pub clear_target: bool,
}

pub struct PanelState<'a> {
    pub settings: &'a mut Settings,
    pub paused: &'a mut bool,
    pub show_debug: &'a mut bool,
}

pub fn update_ui(egui: &mut Egui, state: PanelState<'_>, debug_info: &DebugInfo) -> UiActions {
    let mut actions = UiActions::default();
    let before = state.settings.clone();
    let settings = state.settings;

    let ctx = egui.begin_frame();

    egui::Window::new("Flock Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Population", |ui| {
                ui.add(egui::Slider::new(&mut settings.population.count, 2..=2000).text("Agents"));
                ui.add(egui::Slider::new(&mut settings.population.groups, 1..=10).text("Groups"));
                if ui.button("Reset").clicked() {
                    actions.reset = true;
                }
            });

            ui.collapsing("Optimisations", |ui| {
                ui.checkbox(&mut settings.optimizations.copy, "Copy nearby force");
                ui.checkbox(&mut settings.optimizations.neighbor_cap, "Neighbour cap");
                ui.checkbox(&mut settings.optimizations.half_update, "Half update");

                let mut synchronized = settings.optimizations.mode == UpdateMode::Synchronized;
                if ui.checkbox(&mut synchronized, "Synchronized (parallel)").changed() {
                    settings.optimizations.mode = if synchronized {
                        UpdateMode::Synchronized
                    } else {
                        UpdateMode::Sequential
                    };
                }
            });

            ui.collapsing("Target", |ui| {
                ui.label("Right click: steer every flock to that point");
                if ui.button("Clear Target").clicked() {
                    actions.clear_target = true;
                }
            });

            ui.separator();

            ui.label(format!("FPS: {:.1}", debug_info.fps));
            ui.label(format!("Ticks: {}", debug_info.ticks));
            ui.label(format!("Copy ratio: {:.1}%", debug_info.copy_ratio() * 100.0));
            ui.label(format!("Mean speed: {:.2}", debug_info.mean_speed));

            ui.checkbox(state.show_debug, "Show Debug Info");
            ui.checkbox(state.paused, "Pause Simulation");
        });

    actions.settings_changed = *settings != before;
    actions
}
