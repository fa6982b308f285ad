use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ReplyMarkup,
};

use crate::router::{Keyboard, MenuButton, PlanButton};

pub fn main_menu(admin: bool) -> KeyboardMarkup {
    let rows = if admin {
        vec![
            vec![
                KeyboardButton::new(MenuButton::AddPlan.label()),
                KeyboardButton::new(MenuButton::ListPlans.label()),
            ],
            vec![
                KeyboardButton::new(MenuButton::PanelSettings.label()),
                KeyboardButton::new(MenuButton::BuyService.label()),
            ],
        ]
    } else {
        vec![vec![KeyboardButton::new(MenuButton::BuyService.label())]]
    };
    KeyboardMarkup::new(rows).resize_keyboard()
}

/// One plan per row.
pub fn plan_picker(buttons: &[PlanButton]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        buttons
            .iter()
            .map(|b| vec![InlineKeyboardButton::callback(b.label.clone(), b.data.clone())]),
    )
}

pub fn render(keyboard: &Keyboard) -> ReplyMarkup {
    match keyboard {
        Keyboard::MainMenu { admin } => ReplyMarkup::Keyboard(main_menu(*admin)),
        Keyboard::PlanPicker(buttons) => ReplyMarkup::InlineKeyboard(plan_picker(buttons)),
    }
}
