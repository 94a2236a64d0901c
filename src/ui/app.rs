use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{SyncCommand, SyncEvent};

use super::components::{chat_area, input_bar, join_screen};
use super::state::AppState;

pub struct ChatApp {
    state: AppState,
    command_sender: mpsc::Sender<SyncCommand>,
    event_receiver: mpsc::Receiver<SyncEvent>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        command_sender: mpsc::Sender<SyncCommand>,
        event_receiver: mpsc::Receiver<SyncEvent>,
    ) -> Self {
        Self {
            state: AppState::new(),
            command_sender,
            event_receiver,
        }
    }

    fn handle_sync_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            match event {
                SyncEvent::HistorySynced(history) => self.state.replace_history(history),
                SyncEvent::MessageAppended(message) => self.state.push_message(message),
                SyncEvent::ChannelLive => self.state.set_channel_live(true),
                SyncEvent::ChannelOffline => self.state.set_channel_live(false),
            }
        }
    }

    fn send_command(&mut self, command: SyncCommand) {
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Failed to send command to synchronizer: {err}");
        }
    }

    fn try_join(&mut self, name: String) {
        let name = name.trim().to_string();
        if name.is_empty() {
            self.state.join_error = Some("Please enter a username.".to_string());
            return;
        }
        self.state.join_error = None;
        self.state.username = Some(name.clone());
        self.send_command(SyncCommand::SetAuthor(name));
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_sync_events();

        if !self.state.joined() {
            egui::CentralPanel::default().show(ctx, |ui| {
                if let Some(name) =
                    join_screen::render(ui, &mut self.state.username_input, &self.state.join_error)
                {
                    self.try_join(name);
                }
            });
            ctx.request_repaint();
            return;
        }

        egui::TopBottomPanel::top("chat_header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Realtime Chat");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.state.channel_live {
                        ui.colored_label(egui::Color32::GREEN, "● live");
                    } else {
                        ui.colored_label(egui::Color32::GRAY, "● offline");
                    }
                    if let Some(name) = &self.state.username {
                        ui.label(format!("Username: {name}"));
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("compose_bar").show(ctx, |ui| {
            if let Some(content) = input_bar::render(ui, &mut self.state.input_text) {
                self.send_command(SyncCommand::Submit(content));
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            chat_area::render(ui, &self.state.messages);
        });

        ctx.request_repaint();
    }
}
