//! User-facing message texts (Uzbek)

use chrono::{DateTime, Utc};
use refcore::{Adjudication, UserAccount, UserSummary, WithdrawalRequest, WithdrawalStatus};

pub const MAIN_MENU: &str = "Asosiy menyu:";
pub const ADMIN_MENU: &str = "Admin panel:";
pub const CARD_EXAMPLE: &str = "8600 1234 5678 9012";

/// Formats a sum with thousands separators: `12000` -> `12,000`
pub fn format_sum(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn referral_welcome(bonus: i64) -> String {
    format!(
        "Tabriklaymiz! Siz referal tizimi orqali qo'shildingiz. Sizga {} so'm bonus berildi!",
        format_sum(bonus)
    )
}

pub fn referral_link(bot_username: &str, user_id: i64) -> String {
    format!("https://t.me/{}?start={}", bot_username, user_id)
}

pub fn invite(link: &str, reward: i64, bonus: i64, referral_count: usize) -> String {
    format!(
        "Do'stlaringizni taklif qiling va har bir taklif uchun {} so'm oling!\n\n\
         Sizning referal havolangiz:\n{}\n\n\
         Har bir do'stingiz ham {} so'm bonus oladi!\n\n\
         Taklif qilgan do'stlaringiz soni: {} ta",
        format_sum(reward),
        link,
        format_sum(bonus),
        referral_count
    )
}

pub fn balance(account: &UserAccount) -> String {
    format!(
        "💰 Sizning balansingiz: {} so'm\n\n👥 Taklif qilgan do'stlaringiz soni: {} ta",
        format_sum(account.balance),
        account.referrals.len()
    )
}

pub fn support(username: &str) -> String {
    format!("Savollar va takliflaringiz bo'lsa {} ga yozishingiz mumkin.", username)
}

pub fn news(channel: &str) -> String {
    format!("Bizning yangiliklar kanalimiz: {}", channel)
}

pub fn insufficient_balance(minimum: i64) -> String {
    format!(
        "Minimal yechish miqdori {} so'm. Sizda yetarli mablag' mavjud emas.",
        format_sum(minimum)
    )
}

pub const WITHDRAWAL_ALREADY_ACTIVE: &str =
    "Sizda yakunlanmagan pul yechish so'rovi bor. Davom eting yoki /cancel buyrug'ini yuboring.";

pub fn ask_card() -> String {
    format!(
        "💳 Iltimos, pul o'tkazib beriladigan 16 xonali karta raqamingizni yuboring:\n\n\
         Namuna: {}\n\n\
         (UzCard yoki Humo)",
        CARD_EXAMPLE
    )
}

pub fn invalid_card() -> String {
    format!(
        "❌ Noto'g'ri karta raqami formati!\n\n\
         Iltimos, 16 xonali UzCard yoki Humo raqamingizni kiriting.\n\
         Namuna: {}",
        CARD_EXAMPLE
    )
}

pub fn ask_amount(card_number: &str, minimum: i64) -> String {
    format!(
        "✅ Karta raqamingiz qabul qilindi: {}\n\n\
         Endi yechmoqchi bo'lgan miqdoringizni kiriting (minimal {} so'm):",
        card_number,
        format_sum(minimum)
    )
}

pub const INVALID_AMOUNT: &str = "Iltimos, faqat raqam kiriting. Masalan: 15000";

pub fn below_minimum(minimum: i64) -> String {
    format!(
        "Minimal yechish miqdori {} so'm. Iltimos, kattaroq miqdor kiriting.",
        format_sum(minimum)
    )
}

pub fn exceeds_balance(balance: i64) -> String {
    format!(
        "Sizning balansingizda faqat {} so'm mavjud. Iltimos, kichikroq miqdor kiriting.",
        format_sum(balance)
    )
}

pub const TRY_LATER: &str = "Xatolik yuz berdi. Iltimos, keyinroq urunib ko'ring.";

pub fn request_submitted(request: &WithdrawalRequest) -> String {
    format!(
        "📨 Sizning pul yechish so'rovingiz adminlarga yuborildi:\n\n\
         💳 Karta raqam: {}\n\
         💵 Miqdor: {} so'm\n\n\
         ⏳ So'rovingiz tez orada ko'rib chiqiladi.",
        request.card_number,
        format_sum(request.amount)
    )
}

pub const WITHDRAWAL_CANCELLED: &str = "Pul yechish bekor qilindi.";
pub const NOTHING_TO_CANCEL: &str = "Bekor qilinadigan jarayon yo'q.";

/// Notification sent to every administrator about a new request
pub fn admin_new_request(display_name: &str, user_id: i64, request: &WithdrawalRequest, balance_after: i64) -> String {
    format!(
        "💰 Yangi pul yechish so'rovi:\n\n\
         👤 Foydalanuvchi: {}\n\
         🆔 ID: {}\n\
         💳 Karta: {}\n\
         💵 Miqdor: {} so'm\n\
         📊 Joriy balans: {} so'm",
        display_name,
        user_id,
        request.card_number,
        format_sum(request.amount),
        format_sum(balance_after)
    )
}

fn status_label(status: WithdrawalStatus) -> &'static str {
    match status {
        WithdrawalStatus::Pending => "Kutilmoqda",
        WithdrawalStatus::Approved => "Tasdiqlandi",
        WithdrawalStatus::Rejected => "Rad etildi",
    }
}

/// Admin's notification after a decision, edited in place
pub fn adjudicated_message(original: &str, admin_name: &str, status: WithdrawalStatus, at: DateTime<Utc>) -> String {
    let mark = match status {
        WithdrawalStatus::Rejected => "❌",
        _ => "✅",
    };
    format!(
        "{} {}\n\nAdmin: {}\nHolat: {}\nSana: {}",
        mark,
        original,
        admin_name,
        status_label(status),
        at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Footer for a notification whose request was resolved by an earlier press
pub fn already_handled_message(original: &str, admin_name: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}\n\nAdmin: {}\nHolat: Allaqachon ko'rib chiqilgan\nSana: {}",
        original,
        admin_name,
        at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Short callback answer shown to the acting admin
pub fn adjudication_ack(amount: i64, outcome: &Adjudication) -> String {
    if !outcome.applied {
        return "Bu so'rov allaqachon ko'rib chiqilgan.".to_string();
    }
    match outcome.status {
        WithdrawalStatus::Rejected => "Pul yechish rad etildi. Mablag' foydalanuvchi balansiga qaytarildi.".to_string(),
        _ => format!("Pul yechish tasdiqlandi: {} so'm", format_sum(amount)),
    }
}

/// Message to the requesting user after an admin decision
pub fn user_adjudicated(amount: i64, outcome: &Adjudication) -> String {
    match outcome.status {
        WithdrawalStatus::Rejected => format!(
            "❌ Sizning {} so'm miqdordagi pul yechish so'rovingiz rad etildi.\n\n\
             💰 Mablag' balansingizga qaytarildi. Yangi balans: {} so'm",
            format_sum(amount),
            format_sum(outcome.balance)
        ),
        _ => format!(
            "🎉 Sizning {} so'm miqdordagi pul yechish so'rovingiz tasdiqlandi!\n\n\
             💸 Mablag' 1-3 ish kunida kartangizga o'tkaziladi.",
            format_sum(amount)
        ),
    }
}

pub fn user_list(users: &[UserSummary]) -> String {
    if users.is_empty() {
        return "Foydalanuvchilar yo'q.".to_string();
    }
    let mut text = String::from("Foydalanuvchilar ro'yxati:\n\n");
    for user in users {
        text.push_str(&format!(
            "🆔 ID: {}\n💰 Balans: {} so'm\n👥 Referallar: {} ta\n💳 So'nggi karta: {}\n\n",
            user.user_id,
            format_sum(user.balance),
            user.referral_count,
            user.last_card.as_deref().unwrap_or("Noma'lum")
        ));
    }
    text
}

pub const ADMIN_HELP: &str = "Admin panel buyruqlari:\n\n\
    /setbalance [user_id] [amount] - Balansni o'zgartirish\n\
    /userinfo [user_id] - Foydalanuvchi ma'lumotlari\n\n\
    Misol:\n\
    /setbalance 123456789 5000";

pub const SETBALANCE_USAGE: &str =
    "Noto'g'ri format. Iltimos, /setbalance [user_id] [amount] formatida yuboring.";
pub const SETBALANCE_NOT_NUMBERS: &str = "User ID va miqdor raqam bo'lishi kerak.";

pub fn balance_changed_admin(user_id: i64, delta: i64, balance: i64) -> String {
    format!(
        "Foydalanuvchi {} balansi {}{} so'mga o'zgartirildi. Yangi balans: {} so'm",
        user_id,
        if delta > 0 { "+" } else { "" },
        format_sum(delta),
        format_sum(balance)
    )
}

pub fn balance_change_refused(user_id: i64, delta: i64) -> String {
    format!(
        "Foydalanuvchi {} balansini {} so'mga o'zgartirib bo'lmaydi: balans manfiy bo'lib qoladi.",
        user_id,
        format_sum(delta)
    )
}

pub fn balance_changed_user(delta: i64, balance: i64) -> String {
    format!(
        "🔔 Admin tomonidan balansingiz {}{} so'mga o'zgartirildi.\n\n💰 Yangi balans: {} so'm",
        if delta > 0 { "+" } else { "" },
        format_sum(delta),
        format_sum(balance)
    )
}

pub const USERINFO_USAGE: &str = "Iltimos, /userinfo [user_id] formatida yuboring.";

pub fn user_not_found(user_id: i64) -> String {
    format!("Foydalanuvchi {} topilmadi.", user_id)
}

pub fn user_info(account: &UserAccount) -> String {
    let mut text = format!(
        "🆔 ID: {}\n💰 Balans: {} so'm\n🤝 Taklif qilgan: {}\n👥 Referallar: {} ta\n",
        account.user_id,
        format_sum(account.balance),
        account
            .referrer
            .map(|id| id.to_string())
            .unwrap_or_else(|| "yo'q".to_string()),
        account.referrals.len()
    );

    if account.withdrawal_requests.is_empty() {
        text.push_str("💳 So'rovlar: yo'q");
        return text;
    }

    text.push_str(&format!(
        "⏳ Kutilayotgan: {} so'm\n\n💳 So'rovlar:\n",
        format_sum(account.pending_total())
    ));
    for (idx, request) in account.withdrawal_requests.iter().enumerate() {
        text.push_str(&format!(
            "{}. {} so'm - {} - {} ({})\n",
            idx + 1,
            format_sum(request.amount),
            request.card_number,
            status_label(request.status),
            request.created_at.format("%Y-%m-%d %H:%M")
        ));
    }
    text
}
