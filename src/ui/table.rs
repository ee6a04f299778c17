use eframe::egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::compare::AnnotatedDataset;
use crate::state::AppState;

/// Background for flagged cells, matching the FF9999 fill in the exported
/// workbooks.
const HIGHLIGHT: Color32 = Color32::from_rgb(0xFF, 0x99, 0x99);

// ---------------------------------------------------------------------------
// Central panel – the two annotated grids
// ---------------------------------------------------------------------------

/// Render the comparison view in the central panel.
pub fn comparison_view(ui: &mut Ui, state: &AppState) {
    let comparison = match &state.comparison {
        Some(c) => c,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open two files and press Compare  (File → Open…)");
            });
            return;
        }
    };

    ui.columns(2, |columns| {
        annotated_table(&mut columns[0], "first_table", &comparison.first);
        annotated_table(&mut columns[1], "second_table", &comparison.second);
    });
}

fn annotated_table(ui: &mut Ui, id: &str, annotated: &AnnotatedDataset) {
    ui.vertical(|ui: &mut Ui| {
        ui.strong(format!(
            "{}  —  {} rows, {} orphan cells",
            annotated.name,
            annotated.row_count(),
            annotated.flagged_count()
        ));
        ui.separator();

        if annotated.columns.is_empty() {
            ui.label("No columns.");
            return;
        }

        ui.push_id(id, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(true)
                .columns(Column::auto().at_least(60.0).resizable(true), annotated.column_count())
                .header(20.0, |mut header| {
                    for name in &annotated.columns {
                        header.col(|ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, annotated.row_count(), |mut row| {
                        let cells = &annotated.rows[row.index()];
                        for cell in cells {
                            row.col(|ui| {
                                if cell.flagged {
                                    ui.label(
                                        RichText::new(&cell.value)
                                            .background_color(HIGHLIGHT)
                                            .color(Color32::BLACK),
                                    );
                                } else {
                                    ui.label(&cell.value);
                                }
                            });
                        }
                    });
                });
        });
    });
}
