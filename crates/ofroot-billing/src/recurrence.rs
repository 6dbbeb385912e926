use chrono::{DateTime, Months, NaiveDate, NaiveDateTime};
use ofroot_core::{Invoice, RecurrenceEvery, RecurringSchedule};

use crate::draft::non_blank;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS`
/// timestamps; only the calendar date is kept.
pub fn parse_base_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|ts| ts.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|ts| ts.date())
        })
}

/// Moves `base` forward by `periods` recurrence periods. Day-of-month is
/// clamped to the target month's last day (Jan 31 + 1 month = Feb 28/29).
pub fn advance(base: NaiveDate, every: RecurrenceEvery, periods: u32) -> Option<NaiveDate> {
    let months = match every {
        RecurrenceEvery::Month => Some(periods),
        RecurrenceEvery::Quarter => periods.checked_mul(3),
        RecurrenceEvery::Year => periods.checked_mul(12),
    }?;
    base.checked_add_months(Months::new(months))
}

pub fn next_due_date(base: NaiveDate, schedule: &RecurringSchedule) -> Option<NaiveDate> {
    advance(base, schedule.every, schedule.generated.max(1))
}

/// Date the next recurring copy falls due, formatted `YYYY-MM-DD`. `None`
/// when the base date is missing or unparseable.
pub fn compute_next_due(base: Option<&str>, schedule: &RecurringSchedule) -> Option<String> {
    let base = parse_base_date(non_blank(base)?)?;
    next_due_date(base, schedule).map(|date| date.format(DATE_FORMAT).to_string())
}

/// Next copy date for a stored invoice, based on its due date or, failing
/// that, its creation time. `None` for non-recurring invoices.
pub fn next_due_for(invoice: &Invoice) -> Option<String> {
    let schedule = invoice.recurring()?;
    let base = non_blank(invoice.due_date.as_deref()).or(non_blank(invoice.created_at.as_deref()));
    compute_next_due(base, schedule)
}

#[cfg(test)]
mod tests {
    use ofroot_core::{Currency, InvoiceMeta, InvoiceStatus};

    use super::*;

    fn schedule(every: RecurrenceEvery, generated: u32) -> RecurringSchedule {
        RecurringSchedule {
            every,
            count: 12,
            generated,
        }
    }

    #[test]
    fn quarter_after_two_generated_copies() {
        assert_eq!(
            compute_next_due(Some("2024-01-15"), &schedule(RecurrenceEvery::Quarter, 2)),
            Some("2024-07-15".to_string())
        );
    }

    #[test]
    fn zero_generated_counts_as_one_period() {
        assert_eq!(
            compute_next_due(Some("2024-01-15"), &schedule(RecurrenceEvery::Month, 0)),
            Some("2024-02-15".to_string())
        );
        assert_eq!(
            compute_next_due(Some("2024-01-15"), &schedule(RecurrenceEvery::Year, 0)),
            Some("2025-01-15".to_string())
        );
    }

    #[test]
    fn months_roll_over_year_end() {
        assert_eq!(
            compute_next_due(Some("2024-11-30"), &schedule(RecurrenceEvery::Month, 3)),
            Some("2025-02-28".to_string())
        );
    }

    #[test]
    fn leap_day_clamps_on_yearly_schedules() {
        assert_eq!(
            compute_next_due(Some("2024-02-29"), &schedule(RecurrenceEvery::Year, 1)),
            Some("2025-02-28".to_string())
        );
    }

    #[test]
    fn accepts_timestamps_as_base() {
        assert_eq!(
            compute_next_due(
                Some("2024-03-10T18:45:00Z"),
                &schedule(RecurrenceEvery::Month, 1)
            ),
            Some("2024-04-10".to_string())
        );
        assert_eq!(
            compute_next_due(
                Some("2024-03-10T18:45:00.123"),
                &schedule(RecurrenceEvery::Month, 1)
            ),
            Some("2024-04-10".to_string())
        );
    }

    #[test]
    fn missing_or_garbage_base_yields_none() {
        let monthly = schedule(RecurrenceEvery::Month, 1);
        assert_eq!(compute_next_due(None, &monthly), None);
        assert_eq!(compute_next_due(Some(""), &monthly), None);
        assert_eq!(compute_next_due(Some("next tuesday"), &monthly), None);
        assert_eq!(compute_next_due(Some("2024-13-01"), &monthly), None);
    }

    #[test]
    fn same_input_same_output() {
        let quarterly = schedule(RecurrenceEvery::Quarter, 5);
        let first = compute_next_due(Some("2023-08-31"), &quarterly);
        let second = compute_next_due(Some("2023-08-31"), &quarterly);
        assert_eq!(first, second);
        assert_eq!(first, Some("2024-11-30".to_string()));
    }

    #[test]
    fn invoice_falls_back_to_created_at() {
        let mut invoice = Invoice {
            id: 1,
            number: None,
            status: InvoiceStatus::Sent,
            currency: Currency::Usd,
            items: Vec::new(),
            amount_cents: 0,
            amount_paid_cents: 0,
            amount_due_cents: 0,
            due_date: None,
            created_at: Some("2024-05-02T09:00:00Z".to_string()),
            tenant_id: None,
            user_id: None,
            meta: InvoiceMeta {
                recurring: Some(schedule(RecurrenceEvery::Month, 0)),
                ..InvoiceMeta::default()
            },
            payments: Vec::new(),
        };
        assert_eq!(next_due_for(&invoice), Some("2024-06-02".to_string()));

        invoice.due_date = Some("2024-05-20".to_string());
        assert_eq!(next_due_for(&invoice), Some("2024-06-20".to_string()));

        invoice.meta.recurring = None;
        assert_eq!(next_due_for(&invoice), None);
    }
}
