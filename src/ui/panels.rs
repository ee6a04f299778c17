use std::path::Path;

use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::loader::{self, Fingerprint};
use crate::export::deliver::{deliver_to_dir, Artifact};
use crate::export::xlsx::XlsxRenderer;
use crate::state::{AppState, LoadedFile, Slot};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open first file…").clicked() {
                open_file_dialog(state, Slot::First);
                ui.close_menu();
            }
            if ui.button("Open second file…").clicked() {
                open_file_dialog(state, Slot::Second);
                ui.close_menu();
            }
        });

        let can_export = state.comparison.is_some();
        ui.menu_button("Export", |ui: &mut Ui| {
            if ui
                .add_enabled(can_export, egui::Button::new("Save first highlighted…"))
                .clicked()
            {
                save_one_dialog(state, Slot::First);
                ui.close_menu();
            }
            if ui
                .add_enabled(can_export, egui::Button::new("Save second highlighted…"))
                .clicked()
            {
                save_one_dialog(state, Slot::Second);
                ui.close_menu();
            }
            if ui
                .add_enabled(can_export, egui::Button::new("Send both to folder…"))
                .clicked()
            {
                deliver_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if ui
            .add_enabled(state.ready_to_compare(), egui::Button::new("Compare"))
            .clicked()
        {
            state.run_compare();
        }

        ui.separator();

        ui.label("Rounding decimals:");
        let mut decimals = state.options.decimals;
        if ui
            .add(egui::DragValue::new(&mut decimals).range(0..=6).speed(0.1))
            .changed()
        {
            state.set_decimals(decimals);
        }

        ui.separator();

        for (label, file) in [("1:", &state.first), ("2:", &state.second)] {
            match file {
                Some(f) => {
                    ui.label(format!(
                        "{label} {} ({}×{})",
                        f.dataset.name,
                        f.dataset.row_count(),
                        f.dataset.column_count()
                    ));
                }
                None => {
                    ui.label(format!("{label} —"));
                }
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn open_file_dialog(state: &mut AppState, slot: Slot) {
    let title = match slot {
        Slot::First => "Open first file",
        Slot::Second => "Open second file",
    };
    let file = rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Supported files", &["csv", "xlsx", "xlsm", "xls", "ods", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx", "xlsm", "xls", "ods"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match load_input(&path) {
            Ok(loaded) => {
                log::info!(
                    "loaded {} ({} rows × {} columns)",
                    loaded.dataset.name,
                    loaded.dataset.row_count(),
                    loaded.dataset.column_count()
                );
                state.set_file(slot, loaded);
            }
            Err(e) => {
                log::error!("failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

fn load_input(path: &Path) -> anyhow::Result<LoadedFile> {
    let dataset = loader::load_file(path)?;
    let fingerprint = Fingerprint::for_path(path)?;
    Ok(LoadedFile { dataset, fingerprint })
}

/// Save one highlighted copy through a save dialog.
fn save_one_dialog(state: &mut AppState, slot: Slot) {
    let Some(comparison) = &state.comparison else {
        return;
    };
    let (annotated, suggested) = match slot {
        Slot::First => (&comparison.first, "file1_highlighted.xlsx"),
        Slot::Second => (&comparison.second, "file2_highlighted.xlsx"),
    };

    let target = rfd::FileDialog::new()
        .set_title("Save highlighted copy")
        .set_file_name(suggested)
        .add_filter("Excel workbook", &["xlsx"])
        .save_file();

    if let Some(path) = target {
        match XlsxRenderer::write_file(annotated, &path) {
            Ok(()) => {
                log::info!("saved highlighted copy to {}", path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("failed to save highlighted copy: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

/// Render both artifacts and hand them to a destination folder. Delivery
/// failure is a warning; the comparison stays usable.
fn deliver_dialog(state: &mut AppState) {
    let Some(comparison) = &state.comparison else {
        return;
    };

    let Some(dest) = rfd::FileDialog::new()
        .set_title("Send highlighted copies to folder")
        .pick_folder()
    else {
        return;
    };

    let rendered = XlsxRenderer::to_bytes(&comparison.first)
        .and_then(|first| Ok((first, XlsxRenderer::to_bytes(&comparison.second)?)));

    match rendered {
        Ok((first, second)) => {
            let artifacts = [
                Artifact::new("file1_highlighted.xlsx", first),
                Artifact::new("file2_highlighted.xlsx", second),
            ];
            match deliver_to_dir(&dest, &artifacts) {
                Ok(written) => {
                    log::info!("delivered {} artifacts to {}", written.len(), dest.display());
                    state.status_message = None;
                }
                Err(e) => {
                    log::warn!("delivery failed (comparison kept): {e:#}");
                    state.status_message = Some(format!("Delivery failed: {e:#}"));
                }
            }
        }
        Err(e) => {
            log::error!("failed to render artifacts: {e}");
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}
