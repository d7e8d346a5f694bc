//! Keyboards: main reply menu and inline buttons

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};

use super::callbacks::{CallbackAction, Decision};

pub const BUTTON_INVITE: &str = "👥 Do'st taklif qilish";
pub const BUTTON_BALANCE: &str = "💰 Balans";
pub const BUTTON_SUPPORT: &str = "🆘 Support";
pub const BUTTON_NEWS: &str = "📢 Yangiliklar kanali";

/// Main menu entries, matched against incoming message text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuButton {
    Invite,
    Balance,
    Support,
    News,
}

impl MenuButton {
    pub fn from_text(text: &str) -> Option<Self> {
        match text.trim() {
            BUTTON_INVITE => Some(MenuButton::Invite),
            BUTTON_BALANCE => Some(MenuButton::Balance),
            BUTTON_SUPPORT => Some(MenuButton::Support),
            BUTTON_NEWS => Some(MenuButton::News),
            _ => None,
        }
    }
}

pub fn main_menu_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(BUTTON_INVITE), KeyboardButton::new(BUTTON_BALANCE)],
        vec![KeyboardButton::new(BUTTON_SUPPORT), KeyboardButton::new(BUTTON_NEWS)],
    ])
    .resize_keyboard()
}

pub fn withdraw_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "💸 Pul yechish",
        CallbackAction::Withdraw.to_data(),
    )]])
}

pub fn admin_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("Foydalanuvchilar ro'yxati", CallbackAction::UserList.to_data()),
        InlineKeyboardButton::callback("Admin panel", CallbackAction::AdminPanel.to_data()),
    ]])
}

pub fn adjudication_keyboard(user_id: i64, amount: i64) -> InlineKeyboardMarkup {
    let approve = CallbackAction::Adjudicate {
        decision: Decision::Approve,
        user_id,
        amount,
    };
    let reject = CallbackAction::Adjudicate {
        decision: Decision::Reject,
        user_id,
        amount,
    };
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("✅ Tasdiqlash", approve.to_data()),
        InlineKeyboardButton::callback("❌ Rad etish", reject.to_data()),
    ]])
}
