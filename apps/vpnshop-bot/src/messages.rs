//! User-facing texts (Persian).

use vpnshop_db::models::{Order, PanelCredential, Plan};

pub const PLAN_ADDED: &str = "✅ پلن با موفقیت اضافه شد!";
pub const PANEL_SAVED: &str = "✅ اتصال با موفقیت برقرار شد و اطلاعات پنل در حساب شما ذخیره شد!";
pub const PANEL_CONNECT_FAILED: &str =
    "❌ اتصال به پنل با این مشخصات ناموفق بود. لطفا دوباره تلاش کنید.";
pub const NO_PLANS: &str = "هیچ پلنی یافت نشد.";
pub const NO_PLANS_FOR_SALE: &str = "در حال حاضر پلنی برای فروش موجود نیست.";
pub const CHOOSE_PLAN: &str = "🛍️ لطفا یکی از پلن‌های زیر را انتخاب کنید:";
pub const PLAN_UNAVAILABLE: &str = "این پلن در دسترس نیست.";
pub const GENERIC_FAILURE: &str = "⚠️ خطایی رخ داد. لطفا بعدا دوباره تلاش کنید.";

pub fn welcome(first_name: Option<&str>, is_admin: bool) -> String {
    let name = first_name.unwrap_or("کاربر");
    if is_admin {
        format!("👋 سلام {}! به پنل مدیریت فروشگاه خوش آمدید.", name)
    } else {
        format!(
            "👋 سلام {}! به فروشگاه سرویس VPN خوش آمدید.\nبرای خرید از منوی زیر استفاده کنید.",
            name
        )
    }
}

/// `1500000` -> `1,500,000`.
pub fn format_toman(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn plan_line(plan: &Plan) -> String {
    format!(
        "🔹 {} - {} تومان - {} روز - {} گیگ",
        plan.title,
        format_toman(plan.price),
        plan.duration_days,
        plan.data_limit_label()
    )
}

pub fn plan_list(plans: &[Plan]) -> String {
    let lines: Vec<String> = plans
        .iter()
        .map(|plan| {
            if plan.is_active {
                plan_line(plan)
            } else {
                format!("{} (غیرفعال)", plan_line(plan))
            }
        })
        .collect();
    format!("لیست پلن‌ها:\n\n{}", lines.join("\n"))
}

pub fn plan_button(plan: &Plan) -> String {
    format!("{} - {} تومان", plan.title, format_toman(plan.price))
}

pub fn current_panel(cred: &PanelCredential) -> String {
    format!(
        "🔗 پنل فعلی: {}\n👤 نام کاربری: {}\n\nبرای تغییر، اطلاعات جدید را وارد کنید.",
        cred.url, cred.username
    )
}

pub fn order_summary(order: &Order, plan: &Plan) -> String {
    format!(
        "🧾 سفارش #{}\n\n📦 پلن: {}\n📝 {}\n💰 مبلغ: {} تومان\n⏳ مدت: {} روز\n📊 حجم: {} گیگ\n\nوضعیت: در انتظار پرداخت",
        order.id,
        plan.title,
        plan.description,
        format_toman(order.amount),
        plan.duration_days,
        plan.data_limit_label()
    )
}
