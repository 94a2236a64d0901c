use eframe::egui;

use crate::common::ChatMessage;

pub fn render(ui: &mut egui::Ui, messages: &[ChatMessage]) {
    egui::ScrollArea::vertical()
        .stick_to_bottom(true)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            if messages.is_empty() {
                ui.weak("No messages yet. Say hello!");
                return;
            }
            for message in messages {
                ui.horizontal_wrapped(|ui| {
                    ui.strong(format!("{}:", message.username));
                    ui.label(&message.content);
                    ui.weak(message.created_at.format("%H:%M:%S").to_string());
                });
            }
        });
}
