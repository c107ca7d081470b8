//! CSV 导出
//!
//! 固定列顺序，时间为 RFC 3339 (UTC)，缺失值留空。

use shared::models::Order;
use shared::util::millis_to_rfc3339;
use std::borrow::Cow;
use std::fmt::Write;

pub const CSV_HEADER: &str = "Order Number,Customer Name,Customer Email,Order Details,Status,Created At,Driver Name,Driver Company,Picked Up At,Delivered At";

/// Quote a field when it contains a comma, quote, CR or LF
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn opt_time(ms: Option<i64>) -> String {
    ms.map(millis_to_rfc3339).unwrap_or_default()
}

/// Header row plus one row per order, in the given order
pub fn orders_to_csv(orders: &[Order]) -> String {
    let mut csv = String::with_capacity(CSV_HEADER.len() + 1 + orders.len() * 160);
    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for order in orders {
        let company = order
            .driver_company
            .map(|c| c.display_name())
            .unwrap_or_default();
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{},{},{},{},{}",
            escape_field(&order.order_number),
            escape_field(&order.customer_name),
            escape_field(&order.customer_email),
            escape_field(&order.order_details),
            order.status,
            millis_to_rfc3339(order.created_at),
            escape_field(order.driver_name.as_deref().unwrap_or_default()),
            escape_field(company),
            opt_time(order.picked_up_at),
            opt_time(order.delivered_at),
        );
    }
    csv
}

/// `orders-YYYYMMDD-HHMMSS.csv`
pub fn export_filename(now_millis: i64) -> String {
    let stamp = chrono::DateTime::from_timestamp_millis(now_millis)
        .map(|dt| dt.format("%Y%m%d-%H%M%S").to_string())
        .unwrap_or_else(|| "export".to_string());
    format!("orders-{stamp}.csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{DriverCompany, OrderStatus};

    fn order(number: &str, details: &str) -> Order {
        Order {
            id: format!("id-{number}"),
            order_number: number.into(),
            customer_name: "Marcia Griffiths".into(),
            customer_email: "marcia@example.com".into(),
            order_details: details.into(),
            items: vec![],
            status: OrderStatus::Pending,
            created_at: 1_700_000_000_000,
            driver_name: None,
            driver_company: None,
            picked_up_at: None,
            delivered_at: None,
            location: None,
            archived: false,
            updated_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_row_count_matches_orders() {
        let orders: Vec<Order> = (1..=4).map(|i| order(&format!("A{i}"), "1x Festival")).collect();
        let csv = orders_to_csv(&orders);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), orders.len() + 1);
        assert_eq!(lines[0], CSV_HEADER);

        assert_eq!(orders_to_csv(&[]).lines().count(), 1);
    }

    #[test]
    fn test_row_layout() {
        let mut o = order("A1", "2x Jerk Chicken, 1x Rice and Peas");
        o.status = OrderStatus::Delivered;
        o.driver_name = Some("Bob".into());
        o.driver_company = Some(DriverCompany::UberEats);
        o.picked_up_at = Some(1_700_000_060_000);
        o.delivered_at = Some(1_700_000_120_000);

        let csv = orders_to_csv(&[o]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "A1,Marcia Griffiths,marcia@example.com,\"2x Jerk Chicken, 1x Rice and Peas\",delivered,\
             2023-11-14T22:13:20Z,Bob,Uber Eats,2023-11-14T22:14:20Z,2023-11-14T22:15:20Z"
        );
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename(1_700_000_000_000), "orders-20231114-221320.csv");
    }
}
