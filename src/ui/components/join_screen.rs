use eframe::egui;

pub fn render(
    ui: &mut egui::Ui,
    name_input: &mut String,
    error: &Option<String>,
) -> Option<String> {
    let mut join = false;

    ui.vertical_centered(|ui| {
        ui.add_space(48.0);
        ui.heading("Choose your username");
        ui.add_space(8.0);

        let response = ui.add_sized(
            [220.0, 20.0],
            egui::TextEdit::singleline(name_input).hint_text("Username"),
        );
        ui.add_space(8.0);
        if ui.button("Join").clicked() {
            join = true;
        }
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            join = true;
        }

        if let Some(message) = error {
            ui.add_space(8.0);
            ui.colored_label(egui::Color32::RED, message);
        }
    });

    if join {
        return Some(name_input.clone());
    }
    None
}
