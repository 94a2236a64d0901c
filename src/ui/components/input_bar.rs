use eframe::egui;

pub fn render(ui: &mut egui::Ui, input_text: &mut String) -> Option<String> {
    let mut send = false;
    ui.horizontal(|ui| {
        let width = ui.available_width() - 60.0;
        let response = ui.add_sized(
            [width, 20.0],
            egui::TextEdit::singleline(input_text).hint_text("Type a message..."),
        );
        if ui.button("Send").clicked() {
            send = true;
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
            // Giữ focus để gõ tiếp tin sau.
            response.request_focus();
        }
    });

    if send {
        return take_submission(input_text);
    }

    None
}

/// Lấy nội dung gửi đi khỏi ô nhập. Nội dung trắng thì giữ nguyên
/// buffer để người dùng sửa tiếp.
fn take_submission(input_text: &mut String) -> Option<String> {
    let message = input_text.trim().to_string();
    if message.is_empty() {
        return None;
    }
    input_text.clear();
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_trims_and_clears_the_buffer() {
        let mut input = "  hello  ".to_string();
        assert_eq!(take_submission(&mut input), Some("hello".to_string()));
        assert!(input.is_empty());
    }

    #[test]
    fn whitespace_only_input_is_kept_for_editing() {
        let mut input = "   ".to_string();
        assert_eq!(take_submission(&mut input), None);
        assert_eq!(input, "   ");
    }
}
