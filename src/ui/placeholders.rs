use egui::{RichText, TextEdit, Ui};

const RADIO_PLACEHOLDER: &str = "Team radio is not available for this session.";
const INTERVAL_PLACEHOLDER: &str = "Interval to leader: not available";

pub fn radio_messages_panel(ui: &mut Ui) {
    ui.label(RichText::new("Radio Messages").strong());
    let mut text = RADIO_PLACEHOLDER;
    ui.add_sized(
        ui.available_size(),
        TextEdit::multiline(&mut text).interactive(false),
    );
}

pub fn interval_panel(ui: &mut Ui) {
    ui.label(RichText::new(INTERVAL_PLACEHOLDER).weak());
}
