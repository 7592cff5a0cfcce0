//! Report command handler

use anyhow::Context;

use crate::config::Config;
use crate::services::{MonthRange, MonthView};
use crate::state::SharedState;

pub async fn cmd_report(config: Config, email: &str, month: Option<&str>) -> anyhow::Result<()> {
    let range = match month {
        Some(month) => MonthRange::parse(month)
            .with_context(|| format!("Invalid month '{month}', expected YYYY-MM"))?,
        None => MonthRange::current(),
    };

    let state = SharedState::new(config).await?;
    let user = state
        .store
        .get_user_by_email(email.trim())
        .await?
        .with_context(|| format!("No account for {email}"))?;

    let view = state.ledger_service.month_view(user.id, range).await?;
    print!("{}", render(range, &view));
    Ok(())
}

fn render(range: MonthRange, view: &MonthView) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "Focus report for {range}");
    let _ = writeln!(out, "{:-<42}", "");
    let _ = writeln!(out, "  Sun   Mon   Tue   Wed   Thu   Fri   Sat");

    for week in view.days.chunks(7) {
        let mut line = String::new();
        for cell in week {
            match cell {
                Some(day) if day.total_minutes > 0 => {
                    let _ = write!(line, " {:>2}:{:<3}", &day.date[8..], day.total_minutes);
                }
                Some(day) => {
                    let _ = write!(line, " {:>2}    ", &day.date[8..]);
                }
                None => line.push_str("       "),
            }
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }

    let _ = writeln!(out);
    if view.subjects.is_empty() {
        let _ = writeln!(out, "No focus sessions this month.");
    } else {
        for slice in &view.subjects {
            let _ = writeln!(out, "  {:<20} {:>5} min", slice.name, slice.minutes);
        }
    }
    let _ = writeln!(out, "  {:<20} {:>5} min", "Total", view.total_minutes);

    out
}
