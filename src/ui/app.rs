//! Main application for the Gobang GUI

use std::time::Duration;

use eframe::egui;
use egui::{CentralPanel, Context, CornerRadius, Frame, RichText, SidePanel, TopBottomPanel, Vec2};

use super::board_view::{BoardSnapshot, BoardView};
use super::theme::*;
use crate::config::Config;
use crate::game::GameMode;
use crate::session::{Screen, Session};
use crate::Stone;

/// Repaint cadence while network events or the move timer need polling
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Main Gobang application
pub struct GobangApp {
    session: Session,
    board_view: BoardView,
    show_debug: bool,
}

impl GobangApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: &Config) -> Self {
        Self {
            session: Session::new(config),
            board_view: BoardView::default(),
            show_debug: true,
        }
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &Context) {
        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Game", |ui| {
                    if ui.button("Restart (N)").clicked() {
                        self.session.restart();
                        ui.close_menu();
                    }
                    if ui.add_enabled(self.session.can_undo(), egui::Button::new("Undo (U)")).clicked() {
                        self.session.undo();
                        ui.close_menu();
                    }
                    if ui.add_enabled(self.session.can_redo(), egui::Button::new("Redo (R)")).clicked() {
                        self.session.redo();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Exit to menu").clicked() {
                        self.session.exit_to_menu();
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.show_debug, "Debug Panel (D)");
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let game = self.session.game();
                    let mode_text = match game.mode() {
                        GameMode::VersusAi => format!("{} - You: {}", game.mode().label(), game.local_color().name()),
                        mode => mode.label().to_string(),
                    };
                    ui.label(mode_text);
                });
            });
        });
    }

    /// Render the side panel with game info and debug
    fn render_side_panel(&mut self, ctx: &Context) {
        SidePanel::right("info_panel")
            .min_width(240.0)
            .max_width(280.0)
            .frame(Frame::new().fill(PANEL_BG))
            .show(ctx, |ui| {
                ui.add_space(12.0);

                self.render_title_card(ui);
                ui.add_space(12.0);

                self.render_turn_card(ui);
                ui.add_space(10.0);

                self.render_timer_card(ui);
                ui.add_space(10.0);

                self.render_actions_card(ui);

                if let Some(info) = self.session.network_info() {
                    ui.add_space(10.0);
                    self.render_network_card(ui, &info);
                }

                if self.show_debug && self.session.game().mode() == GameMode::VersusAi {
                    ui.add_space(10.0);
                    self.render_debug_card(ui);
                }

                if self.session.game().is_over() || self.session.game().board().is_full() {
                    ui.add_space(10.0);
                    self.render_game_over_card(ui);
                }

                if let Some(msg) = self.session.message() {
                    ui.add_space(10.0);
                    Self::render_message_card(ui, msg);
                }
            });
    }

    /// Helper to create a card frame
    fn card_frame() -> Frame {
        Frame::new()
            .fill(CARD_BG)
            .corner_radius(CornerRadius::same(8))
            .inner_margin(12.0)
    }

    /// Clickable label styled as a button. Greyed out when disabled.
    fn action_button(ui: &mut egui::Ui, text: &str, enabled: bool) -> bool {
        let color = if enabled { TEXT_PRIMARY } else { TEXT_MUTED };
        Frame::new()
            .fill(BUTTON_BG)
            .corner_radius(CornerRadius::same(6))
            .inner_margin(8.0)
            .show(ui, |ui| {
                let label = egui::Label::new(RichText::new(text).size(12.0).color(color));
                enabled && ui.add(label.sense(egui::Sense::click())).clicked()
            })
            .inner
    }

    fn menu_button(ui: &mut egui::Ui, text: &str, enabled: bool) -> bool {
        let button = egui::Button::new(RichText::new(text).size(16.0).color(TEXT_PRIMARY)).fill(BUTTON_BG);
        ui.add_enabled(enabled, |ui: &mut egui::Ui| ui.add_sized(MENU_BUTTON_SIZE, button))
            .clicked()
    }

    fn render_title_card(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_space(8.0);
            ui.label(RichText::new("●○").size(20.0).color(TEXT_SECONDARY));
            ui.add_space(4.0);
            ui.label(RichText::new("GOBANG").size(22.0).strong().color(TEXT_PRIMARY));
        });
        ui.horizontal(|ui| {
            ui.add_space(8.0);
            ui.label(RichText::new("Five in a row, 15x15").size(11.0).color(TEXT_MUTED));
        });
    }

    /// Render turn indicator card
    fn render_turn_card(&self, ui: &mut egui::Ui) {
        let game = self.session.game();
        Self::card_frame().show(ui, |ui| {
            let turn = game.winner().unwrap_or(game.current_turn());
            let (stone_char, accent, stone_color) = if turn == Stone::Black {
                ("●", STATUS_BLACK, TEXT_PRIMARY)
            } else {
                ("○", STATUS_WHITE, BLACK_STONE)
            };

            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(Vec2::new(48.0, 48.0), egui::Sense::hover());
                ui.painter().circle_filled(rect.center(), 22.0, accent);
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    stone_char,
                    egui::FontId::proportional(28.0),
                    stone_color,
                );

                ui.add_space(12.0);

                ui.vertical(|ui| {
                    ui.add_space(4.0);
                    ui.label(RichText::new(game.name(turn)).size(18.0).strong().color(TEXT_PRIMARY));
                    let color = if game.is_over() {
                        WIN_HIGHLIGHT
                    } else if game.is_local_turn() {
                        TIMER_NORMAL
                    } else {
                        TIMER_WARNING
                    };
                    ui.label(RichText::new(self.session.status_text()).size(12.0).color(color));
                });
            });

            ui.add_space(8.0);
            for color in [Stone::Black, Stone::White] {
                let you = game.mode() != GameMode::Hotseat && color == game.local_color();
                let text = format!("{}  {}{}", color.name(), game.name(color), if you { " (you)" } else { "" });
                ui.label(RichText::new(text).size(11.0).color(TEXT_SECONDARY));
            }
        });
    }

    /// Render timer card
    fn render_timer_card(&self, ui: &mut egui::Ui) {
        let timer = &self.session.move_timer;
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("TIMER").size(10.0).color(TEXT_MUTED));
            ui.add_space(6.0);

            let elapsed = timer.elapsed();
            ui.label(RichText::new(format!("{:.1}s", elapsed.as_secs_f32())).size(24.0).color(TEXT_PRIMARY));

            if let Some(ai_time) = timer.ai_thinking_time {
                ui.add_space(4.0);
                ui.label(RichText::new(format!("Last AI: {:.3}s", ai_time.as_secs_f32())).size(10.0).color(TEXT_SECONDARY));
            }
        });
    }

    /// Render actions card
    fn render_actions_card(&mut self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("ACTIONS").size(10.0).color(TEXT_MUTED));
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                if Self::action_button(ui, "Undo", self.session.can_undo()) {
                    self.session.undo();
                }
                ui.add_space(4.0);
                if Self::action_button(ui, "Redo", self.session.can_redo()) {
                    self.session.redo();
                }
            });
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                if Self::action_button(ui, "Restart", true) {
                    self.session.restart();
                }
                ui.add_space(4.0);
                if Self::action_button(ui, "Exit", true) {
                    self.session.exit_to_menu();
                }
            });

            ui.add_space(8.0);
            let moves = self.session.game().history().len();
            ui.label(RichText::new(format!("Move #{moves}")).size(11.0).color(TEXT_SECONDARY));
        });
    }

    fn render_network_card(&self, ui: &mut egui::Ui, info: &str) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("NETWORK").size(10.0).color(TEXT_MUTED));
            ui.add_space(6.0);
            ui.label(RichText::new(info).size(14.0).strong().color(TEXT_PRIMARY));
            let role = if self.session.coordinator().is_host() { "Hosting" } else { "Joined" };
            ui.label(
                RichText::new(format!("{role} - {}", self.session.coordinator().link_state().label()))
                    .size(10.0)
                    .color(TEXT_SECONDARY),
            );
        });
    }

    /// Render debug card
    fn render_debug_card(&self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("AI DEBUG").size(10.0).color(TEXT_MUTED));
            ui.add_space(6.0);

            let Some(result) = self.session.last_ai_result() else {
                ui.label(RichText::new("Waiting for AI...").size(10.0).color(TEXT_MUTED));
                return;
            };
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label(RichText::new(format!("Score: {}", result.score)).size(11.0).strong().color(TIMER_NORMAL));
                    ui.label(RichText::new(format!("{} tied", result.ties)).size(10.0).color(TEXT_SECONDARY));
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
                    ui.label(RichText::new(format!("{}ms", result.time_ms)).size(10.0).color(TEXT_SECONDARY));
                });
            });
            if let Some(pos) = result.best_move {
                ui.add_space(4.0);
                ui.label(RichText::new(format!("-> ({}, {})", pos.x, pos.y)).size(12.0).strong().color(WIN_HIGHLIGHT));
            }
        });
    }

    /// Render game over card
    fn render_game_over_card(&mut self, ui: &mut egui::Ui) {
        let headline = match self.session.game().winner() {
            Some(winner) => format!("{} WINS!", self.session.game().name(winner)),
            None => "DRAW".to_string(),
        };

        Frame::new()
            .fill(GAME_OVER_BG)
            .corner_radius(CornerRadius::same(8))
            .inner_margin(16.0)
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new("GAME OVER").size(12.0).color(TEXT_SECONDARY));
                    ui.add_space(8.0);
                    ui.label(RichText::new(headline).size(18.0).strong().color(WIN_HIGHLIGHT));
                    ui.add_space(12.0);
                    if Self::action_button(ui, "New Game", true) {
                        self.session.restart();
                    }
                });
            });
    }

    /// Render status message card
    fn render_message_card(ui: &mut egui::Ui, msg: &str) {
        Frame::new()
            .fill(MESSAGE_BG)
            .corner_radius(CornerRadius::same(8))
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.label(RichText::new(msg).size(11.0).color(TEXT_PRIMARY));
            });
    }

    /// Render the main board
    fn render_board(&mut self, ctx: &Context) {
        CentralPanel::default().frame(Frame::new().fill(BOARD_AREA_BG)).show(ctx, |ui| {
            let game = self.session.game();
            let snapshot = BoardSnapshot {
                board: game.board(),
                current_turn: game.current_turn(),
                last_move: game.last_move(),
                winning_line: game.winning_line(),
                interactive: !game.is_over() && game.is_local_turn(),
            };

            let clicked = ui
                .vertical_centered(|ui| self.board_view.show(ui, &snapshot))
                .inner;

            if let Some(pos) = clicked {
                self.session.click_cell(pos);
            }
        });
    }

    /// Main menu and the pre-game screens
    fn render_screen(&mut self, ctx: &Context) {
        CentralPanel::default().frame(Frame::new().fill(PANEL_BG)).show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.2);
                ui.label(RichText::new("●○ GOBANG").size(36.0).strong().color(TEXT_PRIMARY));
                ui.add_space(24.0);

                match self.session.screen() {
                    Screen::Menu => self.render_main_menu(ui),
                    Screen::AiConfig => self.render_ai_config(ui),
                    Screen::LanLobby => self.render_lan_lobby(ui),
                    Screen::NameInput => self.render_name_input(ui),
                    Screen::Playing => {}
                }

                if let Some(msg) = self.session.message() {
                    ui.add_space(16.0);
                    ui.label(RichText::new(msg).size(12.0).color(TIMER_WARNING));
                }
            });
        });
    }

    fn render_main_menu(&mut self, ui: &mut egui::Ui) {
        if Self::menu_button(ui, "Two Players", true) {
            self.session.choose_mode(GameMode::Hotseat);
        }
        ui.add_space(8.0);
        if Self::menu_button(ui, "Versus AI", true) {
            self.session.choose_mode(GameMode::VersusAi);
        }
        ui.add_space(8.0);
        if Self::menu_button(ui, "LAN Game", true) {
            self.session.choose_mode(GameMode::Lan);
        }
        ui.add_space(8.0);
        if Self::menu_button(ui, "Quit", true) {
            self.session.quit();
        }
    }

    fn render_ai_config(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("Choose your color").size(14.0).color(TEXT_SECONDARY));
        ui.add_space(12.0);
        if Self::menu_button(ui, "Play Black (first)", true) {
            self.session.pick_ai_color(Stone::Black);
        }
        ui.add_space(8.0);
        if Self::menu_button(ui, "Play White", true) {
            self.session.pick_ai_color(Stone::White);
        }
        ui.add_space(8.0);
        if Self::menu_button(ui, "Back", true) {
            self.session.back();
        }
    }

    fn render_lan_lobby(&mut self, ui: &mut egui::Ui) {
        let hosts = self.session.found_hosts();
        let status = match hosts.first() {
            Some(ip) => format!("Found game at {ip}"),
            None if self.session.can_host() => "No games found".to_string(),
            None => format!("Searching for games... {:.0}s", self.session.scan_elapsed().as_secs_f32()),
        };
        ui.label(RichText::new(status).size(14.0).color(TEXT_SECONDARY));
        ui.add_space(12.0);

        if Self::menu_button(ui, "Join", self.session.can_join()) {
            if let Err(e) = self.session.join_game() {
                tracing::warn!(error = %e, "join failed");
            }
        }
        ui.add_space(8.0);
        if Self::menu_button(ui, "New Game", self.session.can_host()) {
            if let Err(e) = self.session.host_game() {
                tracing::warn!(error = %e, "host failed");
            }
        }
        ui.add_space(8.0);
        if Self::menu_button(ui, "Back", true) {
            self.session.back();
        }
    }

    fn render_name_input(&mut self, ui: &mut egui::Ui) {
        let color = self.session.game().local_color();
        ui.label(RichText::new(format!("You play {}. Pick a name", color.name())).size(14.0).color(TEXT_SECONDARY));
        ui.add_space(12.0);

        let selected = self.session.selected_name_index();
        for (i, name) in self.session.prefilled_names().iter().enumerate() {
            let text = if i == selected {
                RichText::new(format!("> {name} <")).size(16.0).strong().color(WIN_HIGHLIGHT)
            } else {
                RichText::new(name).size(14.0).color(TEXT_SECONDARY)
            };
            ui.label(text);
        }

        ui.add_space(12.0);
        ui.label(RichText::new("Up/Down to choose, Enter to confirm").size(10.0).color(TEXT_MUTED));
        ui.add_space(8.0);
        if Self::menu_button(ui, "Confirm", true) {
            self.session.confirm_name();
        }
    }

    /// Handle keyboard shortcuts
    fn handle_input(&mut self, ctx: &Context) {
        let (up, down, enter, escape, debug, undo, redo, restart) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::ArrowUp),
                i.key_pressed(egui::Key::ArrowDown),
                i.key_pressed(egui::Key::Enter),
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::D),
                i.key_pressed(egui::Key::U),
                i.key_pressed(egui::Key::R),
                i.key_pressed(egui::Key::N),
            )
        });

        match self.session.screen() {
            Screen::NameInput => {
                if up {
                    self.session.previous_name();
                }
                if down {
                    self.session.next_name();
                }
                if enter {
                    self.session.confirm_name();
                }
            }
            Screen::AiConfig | Screen::LanLobby if escape => self.session.back(),
            Screen::Playing => {
                if debug {
                    self.show_debug = !self.show_debug;
                }
                if undo {
                    self.session.undo();
                }
                if redo {
                    self.session.redo();
                }
                if restart {
                    self.session.restart();
                }
            }
            _ => {}
        }
    }
}

impl eframe::App for GobangApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.handle_input(ctx);

        // Apply network events before drawing
        self.session.tick();

        if self.session.quit_requested() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        if self.session.screen() == Screen::Playing {
            self.render_menu_bar(ctx);
            self.render_side_panel(ctx);
            self.render_board(ctx);
        } else {
            self.render_screen(ctx);
        }

        // Network events and the move timer arrive without input
        if self.session.screen() != Screen::Menu {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
    }
}
