//! User-facing reply rendering. All outbound text is zh-TW, matching the one
//! locale the business operates in; every function is a pure mapping from
//! domain values to the string the transport collaborator will deliver.

use chrono::NaiveDate;

use crate::parse::DateRange;
use crate::pricing::Quote;

const DATE_FORMAT_HELP: &str = "3/20\n3月20日\n或日期範圍：\n3/20-3/22\n3月20日-3月22日";

pub fn format_date_zh(date: NaiveDate) -> String {
    date.format("%Y年%m月%d日").to_string()
}

pub fn format_month_day(date: NaiveDate) -> String {
    date.format("%m/%d").to_string()
}

/// Initial-stage reply for anything that is not the trigger keyword.
pub fn greeting(trigger_keyword: &str) -> String {
    format!(
        "您好！如需查詢房價，請輸入「{trigger_keyword}」開始查詢流程，或等待小編盡快為您服務，謝謝！"
    )
}

/// Sent when the quote flow starts (or restarts).
pub fn date_prompt() -> String {
    format!("歡迎查詢房價！\n\n請先輸入您計劃的入住日期，格式為：\n{DATE_FORMAT_HELP}")
}

pub fn date_retry() -> String {
    format!("抱歉，無法識別您輸入的日期格式。請使用以下格式：\n{DATE_FORMAT_HELP}")
}

/// Acknowledges the stored range and asks for the party size.
pub fn guest_prompt(range: DateRange) -> String {
    format!(
        "感謝您提供入住日期！\n入住日期: {}\n退房日期: {}\n\n請問有幾位旅客入住？(請輸入1-8的數字)",
        format_date_zh(range.start()),
        format_date_zh(range.end()),
    )
}

pub fn guest_retry() -> String {
    "抱歉，請輸入有效的人數（1-8人）。例如：4人".to_owned()
}

/// Guest count parsed but no room bracket covers it.
pub fn guest_uncovered_retry() -> String {
    "抱歉，無法計算該人數的房價。請輸入1-8之間的人數。".to_owned()
}

/// The full quote breakdown plus booking instructions.
pub fn quote_reply(quote: &Quote, trigger_keyword: &str, booking_keyword: &str) -> String {
    let mut reply = String::from("您的住宿報價如下：\n\n");

    reply.push_str(&format!("入住日期：{}\n", format_date_zh(quote.range.start())));
    reply.push_str(&format!("退房日期：{}\n", format_date_zh(quote.range.end())));
    reply.push_str(&format!("入住人數：{}人\n", quote.guest_count.get()));
    reply.push_str(&format!("住宿天數：{}晚\n", quote.nights()));
    reply.push_str(&format!("房間需求：{}\n\n", room_description(quote)));

    reply.push_str("每日價格明細：\n");
    for charge in &quote.charges {
        let mut breakdown = format!("{}元 x {}間", charge.base_price, charge.rooms);
        if charge.extra_bed {
            breakdown.push_str(&format!(" + 加床{}元", charge.extra_bed_fee()));
        }
        reply.push_str(&format!(
            "{} ({})：{} = {}元\n",
            format_month_day(charge.date),
            charge.category.label_zh(),
            breakdown,
            charge.subtotal,
        ));
    }

    reply.push_str(&format!("\n總價：${}元", quote.total));
    reply.push_str(&format!(
        "\n\n如需預訂，請回覆「{booking_keyword}」。如有其他問題，請回覆「{trigger_keyword}」重新查詢。"
    ));

    reply
}

/// Booking acknowledgment rendered from the stored quote.
pub fn booking_confirmation(quote: &Quote) -> String {
    format!(
        "感謝您的預訂！\n\n入住日期：{}\n退房日期：{}\n入住人數：{}人\n總價：${}元\n\n我們已收到您的預訂請求，客服人員將盡快與您聯繫確認詳情。",
        format_date_zh(quote.range.start()),
        format_date_zh(quote.range.end()),
        quote.guest_count.get(),
        quote.total,
    )
}

fn room_description(quote: &Quote) -> String {
    let mut description = format!("{}間房", quote.requirement.rooms);
    if quote.requirement.needs_extra_bed {
        description.push_str(" + 加床");
    }
    description
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::config::PricingConfig;
    use crate::parse::DateRange;
    use crate::pricing::{GuestCount, Quote};

    use super::{booking_confirmation, format_date_zh, greeting, guest_prompt, quote_reply};

    fn quote_for(start: (u32, u32), end: (u32, u32), guests: u32) -> Quote {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, start.0, start.1).expect("start"),
            NaiveDate::from_ymd_opt(2025, end.0, end.1).expect("end"),
        )
        .expect("range");
        PricingConfig::default()
            .rate_table()
            .quote(range, GuestCount::new(guests).expect("guests"))
            .expect("quote")
    }

    #[test]
    fn dates_render_zero_padded_chinese_form() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 5).expect("date");
        assert_eq!(format_date_zh(date), "2025年03月05日");
    }

    #[test]
    fn greeting_names_the_configured_trigger_keyword() {
        assert!(greeting("房價").contains("「房價」"));
    }

    #[test]
    fn guest_prompt_echoes_check_in_and_check_out() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 3, 20).expect("start"),
            NaiveDate::from_ymd_opt(2025, 3, 22).expect("end"),
        )
        .expect("range");
        let prompt = guest_prompt(range);

        assert!(prompt.contains("入住日期: 2025年03月20日"));
        assert!(prompt.contains("退房日期: 2025年03月22日"));
        assert!(prompt.contains("1-8"));
    }

    #[test]
    fn quote_reply_lists_each_night_with_its_breakdown() {
        // Thu 2000, Fri 2500, Sat 2800 at 2 rooms for 4 guests.
        let reply = quote_reply(&quote_for((3, 20), (3, 22), 4), "房價", "預訂");

        assert!(reply.contains("入住人數：4人"));
        assert!(reply.contains("住宿天數：3晚"));
        assert!(reply.contains("房間需求：2間房"));
        assert!(reply.contains("03/20 (平日)：2000元 x 2間 = 4000元"));
        assert!(reply.contains("03/21 (週五)：2500元 x 2間 = 5000元"));
        assert!(reply.contains("03/22 (週六)：2800元 x 2間 = 5600元"));
        assert!(reply.contains("總價：$14600元"));
        assert!(reply.contains("「預訂」"));
        assert!(reply.contains("「房價」"));
    }

    #[test]
    fn quote_reply_breaks_out_the_extra_bed_fee() {
        let reply = quote_reply(&quote_for((3, 17), (3, 17), 7), "房價", "預訂");

        assert!(reply.contains("房間需求：3間房 + 加床"));
        assert!(reply.contains("2000元 x 3間 + 加床800元 = 6800元"));
    }

    #[test]
    fn booking_confirmation_repeats_the_stored_totals() {
        let confirmation = booking_confirmation(&quote_for((3, 20), (3, 22), 4));

        assert!(confirmation.contains("感謝您的預訂！"));
        assert!(confirmation.contains("入住日期：2025年03月20日"));
        assert!(confirmation.contains("退房日期：2025年03月22日"));
        assert!(confirmation.contains("總價：$14600元"));
    }
}
